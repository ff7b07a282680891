// Prompt templates for player lookups, proposal parsing and trade analysis.
//
// Every numeric answer the model returns is treated as a hint: replies pass
// back through the validator, so the prompts ask for plain, easily parsed
// shapes rather than prose.

use huddle_core::{Fairness, Side, TradeVerdict};

// ---------------------------------------------------------------------------
// Player attribute lookup
// ---------------------------------------------------------------------------

/// System prompt for single-player rating lookups.
pub fn lookup_system_prompt() -> String {
    "You are a Madden NFL ratings expert. Provide the most recent Madden ratings you know \
     for the player asked about. Answer only in the requested format, one field per line. \
     If you do not know the player, answer exactly: Unknown"
        .to_string()
}

/// Ask for a player's overall, age, position and development trait.
pub fn build_lookup_prompt(player_name: &str) -> String {
    format!(
        "What are the current Madden ratings for {player_name}?\n\
         Provide: overall rating (50-99), age, position (QB/HB/WR/TE/LT/LG/C/RG/RT/LE/RE/DT/LOLB/MLB/ROLB/CB/FS/SS/K/P), \
         development trait (normal/star/superstar/x-factor).\n\
         \n\
         Response format:\n\
         Overall: 95\n\
         Age: 28\n\
         Position: QB\n\
         Dev Trait: superstar\n"
    )
}

// ---------------------------------------------------------------------------
// Structured proposal parsing
// ---------------------------------------------------------------------------

/// System prompt for turning a free-text proposal into JSON.
pub fn parser_system_prompt() -> String {
    "You are a precise data parser for Madden franchise trades. Interpret \"sends\" as what \
     a team gives away. Return only valid JSON, with no commentary."
        .to_string()
}

/// Ask the model to split a proposal into players and picks per team.
pub fn build_parser_prompt(proposal: &str) -> String {
    let mut prompt = String::with_capacity(1024 + proposal.len());
    prompt.push_str(
        "Parse this trade proposal into structured JSON. Extract every player and draft pick.\n\
         For each player: name, ovr, age, dev (x-factor/superstar/star/normal), position.\n\
         For each draft pick: year, round, pick.\n\n",
    );
    prompt.push_str("Input: ");
    prompt.push_str(proposal.trim());
    prompt.push_str(
        "\n\n\
         Notes:\n\
         - The first team listed is team1; what it sends goes under team1.\n\
         - A pick without a pick number (e.g. \"2nd round\") has \"pick\": null.\n\
         - A pick without a year has \"year\": null. \"next\" picks set \"next_year\": true.\n\
         - xf = x-factor, ss = superstar, RB = HB, \"ovl\" = overall, \"yrs\" = years old.\n\
         - Use null for anything not stated. Do not guess ratings.\n\n\
         Return ONLY a JSON object with this structure:\n\
         {\"team1\": {\"players\": [{\"name\": \"Player Name\", \"ovr\": 95, \"age\": 28, \"dev\": \"superstar\", \"position\": \"qb\"}],\n\
         \"picks\": [{\"year\": 2025, \"round\": 1, \"pick\": 15}]},\n\
         \"team2\": {\"players\": [], \"picks\": []}}\n",
    );
    prompt
}

// ---------------------------------------------------------------------------
// Trade analysis narrative
// ---------------------------------------------------------------------------

/// System prompt for the short trade write-up.
pub fn narrative_system_prompt() -> String {
    "You are a Madden franchise league trade committee member. Given a computed trade \
     verdict, explain in 2-3 sentences why it is imbalanced and what would even it out. \
     Use the numbers provided; do not recompute them."
        .to_string()
}

/// Summarise a verdict for the narrative prompt.
pub fn build_narrative_prompt(verdict: &TradeVerdict) -> String {
    let mut prompt = String::with_capacity(1024);

    for (side, summary) in [(Side::A, &verdict.side_a), (Side::B, &verdict.side_b)] {
        prompt.push_str(&format!("## {} SENDS (total {})\n", side.label().to_uppercase(), summary.total));
        if summary.assets.is_empty() {
            prompt.push_str("- nothing\n");
        }
        for asset in &summary.assets {
            prompt.push_str(&format!("- {}: {}\n", asset.description, asset.value));
        }
        prompt.push('\n');
    }

    prompt.push_str("## VERDICT\n");
    prompt.push_str(&format!(
        "Difference: {} ({:.1}%) | {}\n",
        verdict.difference,
        verdict.percent_diff,
        verdict.fairness.label(),
    ));
    match verdict.favored {
        Some(side) => prompt.push_str(&format!("{side} receives more value.\n")),
        None => prompt.push_str("Both sides receive equal value.\n"),
    }

    let guessed = verdict.warnings.iter().filter(|w| w.is_guess()).count();
    if guessed > 0 {
        prompt.push_str(&format!(
            "Note: {guessed} attribute(s) were assumed or looked up, not stated.\n"
        ));
    }
    if verdict.fairness == Fairness::Unfair {
        prompt.push_str("\nSuggest one concrete adjustment that would bring it within range.\n");
    }
    prompt
}
