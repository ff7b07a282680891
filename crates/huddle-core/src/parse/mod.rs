// Free-text trade proposal parsing.
//
// Text goes through three stages: chat markup is stripped, each side is cut
// into fragments on separators, and each fragment is classified as a pick
// or a player and handed to the matching sub-parser.

pub mod pick;
pub mod player;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::evaluate::AssetKind;
use crate::proposal::{ParsedTradeProposal, RawAsset, Side};
use crate::validate::ValidationWarning;

pub use pick::parse_pick_fragment;
pub use player::{parse_player_fragment, tokenize_player, PlayerToken};

/// Words that split a side into separate assets. `&` only counts when it
/// stands alone, so `A&M` survives.
const JOINER_WORDS: &[&str] = &["and", "plus", "&"];

/// Words that mark a leading "Team A sends:" style label.
const LABEL_HEADS: &[&str] = &["team", "side"];
const LABEL_VERBS: &[&str] = &[
    "send", "sends", "get", "gets", "give", "gives", "receive", "receives", "trade", "trades",
    "offer", "offers",
];

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

/// Discord inline markup: custom emoji (`<:name:id>`, `<a:name:id>`),
/// user/role mentions (`<@id>`, `<@!id>`, `<@&id>`) and channel links
/// (`<#id>`).
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:a?:\w+:\d+|@[!&]?\d+|#\d+)>").expect("markup pattern compiles")
});

/// Remove Discord inline markup. Anything else in angle brackets is left
/// alone.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Trim punctuation that never carries meaning at token edges.
pub(crate) fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| "()[]{}:;!?\"|*•,".contains(c))
}

pub(crate) fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// `1st`..`7th` style ordinals and the spelled-out words up to seventh.
/// Digit ordinals of any size are accepted ("15th pick").
pub(crate) fn ordinal(token: &str) -> Option<i64> {
    let words = ["first", "second", "third", "fourth", "fifth", "sixth", "seventh"];
    if let Some(idx) = words.iter().position(|w| *w == token) {
        return Some(idx as i64 + 1);
    }
    let digits = token
        .strip_suffix("st")
        .or_else(|| token.strip_suffix("nd"))
        .or_else(|| token.strip_suffix("rd"))
        .or_else(|| token.strip_suffix("th"))?;
    if is_all_digits(digits) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Digits following one of `prefixes`, e.g. `r1`, `rd2`, `p15`, `#7`.
pub(crate) fn prefixed_number(token: &str, prefixes: &[&str]) -> Option<i64> {
    prefixes.iter().find_map(|prefix| {
        token
            .strip_prefix(prefix)
            .filter(|rest| is_all_digits(rest))
            .and_then(|rest| rest.parse().ok())
    })
}

/// `round.pick` shorthand such as `1.15`.
pub(crate) fn dotted_slot(token: &str) -> Option<(i64, i64)> {
    let (round, pick) = token.split_once('.')?;
    if round.len() == 1 && is_all_digits(round) && (1..=2).contains(&pick.len()) && is_all_digits(pick) {
        Some((round.parse().ok()?, pick.parse().ok()?))
    } else {
        None
    }
}

pub(crate) const ROUND_WORDS: &[&str] = &["round", "rd", "rnd", "rounder"];
pub(crate) const PICK_WORDS: &[&str] = &["pick", "picks", "pk", "#", "selection"];
pub(crate) const ROUND_PREFIXES: &[&str] = &["round", "rd", "r"];
pub(crate) const PICK_PREFIXES: &[&str] = &["pick", "pk", "p", "#"];

/// How strongly a lower-cased token suggests its fragment is a draft pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickCue {
    /// `round`, `pick`, an ordinal up to 7th, a 4-digit year, `rd2`,
    /// `pick15`, `1.15`.
    Strong,
    /// Single-letter shorthand (`r1`, `p15`) that also shows up in names and
    /// jersey tags.
    Weak,
    Absent,
}

fn pick_cue(token: &str) -> PickCue {
    let strong = ROUND_WORDS.contains(&token)
        || (PICK_WORDS.contains(&token) && token != "#")
        || ordinal(token).is_some_and(|n| (1..=7).contains(&n))
        || (token.len() == 4 && is_all_digits(token))
        || prefixed_number(token, &["round", "rd"]).is_some()
        || prefixed_number(token, &["pick", "pk"]).is_some()
        || dotted_slot(token).is_some();
    if strong {
        PickCue::Strong
    } else if prefixed_number(token, &["r", "p"]).is_some() {
        PickCue::Weak
    } else {
        PickCue::Absent
    }
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Cut one side's text into asset fragments on `,` `;` `+`, line breaks,
/// a free-standing `&`, and the words `and` / `plus`.
pub fn split_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    for piece in text.split(|c: char| matches!(c, ',' | ';' | '+' | '\n' | '\r')) {
        let mut current: Vec<&str> = Vec::new();
        for word in piece.split_whitespace() {
            if JOINER_WORDS.contains(&word.to_lowercase().as_str()) {
                push_fragment(&mut fragments, &current);
                current.clear();
            } else {
                current.push(word);
            }
        }
        push_fragment(&mut fragments, &current);
    }
    fragments
}

fn push_fragment(fragments: &mut Vec<String>, words: &[&str]) {
    let joined = words.join(" ");
    let trimmed = joined.trim_start_matches(['-', '*', '•', '>']).trim();
    if !trimmed.is_empty() {
        fragments.push(trimmed.to_string());
    }
}

/// A fragment is a pick when one of its tokens is a clear draft cue
/// (`round`, `pick`, an ordinal up to 7th, a 4-digit year, `1.15`) or when
/// it carries both halves of `R1 P15` shorthand. `#88` alone is a jersey
/// number, not a pick.
pub fn classify_fragment(fragment: &str) -> AssetKind {
    let cues: Vec<PickCue> = fragment
        .split_whitespace()
        .map(|t| clean_token(t).to_lowercase())
        .map(|t| pick_cue(t.trim_end_matches("'s")))
        .collect();
    let strong = cues.contains(&PickCue::Strong);
    let weak = cues.iter().filter(|c| **c == PickCue::Weak).count();
    if strong || weak >= 2 {
        AssetKind::Pick
    } else {
        AssetKind::Player
    }
}

/// Parse one side. Fragments that yield nothing are dropped with a warning.
pub fn parse_side(text: &str, side: Side) -> (Vec<RawAsset>, Vec<ValidationWarning>) {
    let cleaned = strip_markup(text);
    let mut assets = Vec::new();
    let mut warnings = Vec::new();

    for line_fragment in split_fragments(&cleaned) {
        let fragment = strip_side_label(&line_fragment).unwrap_or(&line_fragment);
        if fragment.is_empty() {
            continue;
        }
        let kind = classify_fragment(fragment);
        let asset = match kind {
            AssetKind::Pick => parse_pick_fragment(fragment).map(RawAsset::Pick),
            AssetKind::Player => parse_player_fragment(fragment).map(RawAsset::Player),
        };
        match asset {
            Some(asset) => {
                debug!(%side, fragment, ?kind, "parsed fragment");
                assets.push(asset);
            }
            None => {
                warn!(%side, fragment, "dropped unparsable fragment");
                warnings.push(ValidationWarning::FragmentDropped {
                    side,
                    fragment: fragment.to_string(),
                });
            }
        }
    }
    (assets, warnings)
}

/// Parse two sides given as separate strings.
pub fn parse_sides(side_a: &str, side_b: &str) -> (ParsedTradeProposal, Vec<ValidationWarning>) {
    let (a, mut warnings) = parse_side(side_a, Side::A);
    let (b, warnings_b) = parse_side(side_b, Side::B);
    warnings.extend(warnings_b);
    (
        ParsedTradeProposal {
            side_a: a,
            side_b: b,
        },
        warnings,
    )
}

/// Parse a whole proposal message (see [`split_proposal`]).
pub fn parse_proposal(text: &str) -> (ParsedTradeProposal, Vec<ValidationWarning>) {
    let (a, b) = split_proposal(text);
    parse_sides(&a, &b)
}

// ---------------------------------------------------------------------------
// Proposal layout
// ---------------------------------------------------------------------------

/// If `line` starts with a side label (`Team A sends:`, `Bears give:`,
/// `Side 1 -`), return what follows it.
pub fn strip_side_label(line: &str) -> Option<&str> {
    let line = line.trim();
    let (prefix, rest) = line
        .split_once(':')
        .or_else(|| line.split_once(" - "))
        .or_else(|| line.split_once(" -> "))?;
    let words: Vec<String> = prefix
        .split_whitespace()
        .map(|w| clean_token(w).to_lowercase())
        .collect();
    if words.is_empty() || words.len() > 4 {
        return None;
    }
    let headed = LABEL_HEADS.contains(&words[0].as_str());
    let verbed = words
        .last()
        .is_some_and(|w| LABEL_VERBS.contains(&w.as_str()));
    let has_digits = prefix.chars().any(|c| c.is_ascii_digit());
    if headed || (verbed && !has_digits) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Split a full proposal into side A and side B text.
///
/// Blank-line separated paragraphs are the primary layout; extra paragraphs
/// all belong to side B. Inside a single paragraph a labelled line starts
/// side B, two bare lines are one side each, and a single line is split on
/// the word `for`.
pub fn split_proposal(text: &str) -> (String, String) {
    let cleaned = strip_markup(text);
    let paragraphs: Vec<Vec<&str>> = cleaned
        .split("\n\n")
        .flat_map(|p| p.split("\r\n\r\n"))
        .map(|p| p.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>())
        .filter(|lines: &Vec<&str>| !lines.is_empty())
        .collect();

    if paragraphs.len() >= 2 {
        let side_a = paragraphs[0].join("\n");
        let side_b = paragraphs[1..]
            .iter()
            .map(|p| p.join("\n"))
            .collect::<Vec<_>>()
            .join("\n");
        return (side_a, side_b);
    }

    let Some(lines) = paragraphs.into_iter().next() else {
        return (String::new(), String::new());
    };

    if let Some(split) = lines
        .iter()
        .skip(1)
        .position(|l| strip_side_label(l).is_some())
    {
        let (a, b) = lines.split_at(split + 1);
        return (a.join("\n"), b.join("\n"));
    }

    match lines.as_slice() {
        [a, b] => (a.to_string(), b.to_string()),
        [single] => split_on_for(single),
        _ => (lines.join("\n"), String::new()),
    }
}

fn split_on_for(line: &str) -> (String, String) {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.iter().position(|w| w.eq_ignore_ascii_case("for")) {
        Some(idx) if idx > 0 && idx + 1 < words.len() => {
            (words[..idx].join(" "), words[idx + 1..].join(" "))
        }
        _ => (line.to_string(), String::new()),
    }
}
