// Player fragment parsing.
//
// Every whitespace token is classified into exactly one `PlayerToken`.
// `NameFragment` is the catch-all: league members write ratings in
// inconsistent shorthand, so anything unrecognised becomes part of the name
// rather than an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::{clean_token, is_all_digits};
use crate::player::{DevTrait, Position};
use crate::proposal::RawPlayer;

const OVERALL_UNITS: &[&str] = &["overall", "ovr", "ovl"];
const AGE_UNITS: &[&str] = &["years", "year", "yrs", "yr", "y/o", "yo", "age"];

/// Bare-number ranges that read as an overall or an age without a unit.
const BARE_OVERALL: std::ops::RangeInclusive<i64> = 50..=99;
const BARE_AGE: std::ops::RangeInclusive<i64> = 18..=45;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerToken {
    Overall(i64),
    Age(i64),
    Dev(DevTrait),
    Position(Position),
    /// Cap hit in millions (`$25m`, `25m`, `$25`).
    CapHit(f64),
    NameFragment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Overall,
    Age,
}

/// A number glued to a rating unit on either side: `99ovr`, `ovr99`,
/// `28yo`, `age-28`, or a bare `ovr`.
static UNIT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[-=.]*(?P<before>[0-9]*)[-=.]*(?P<unit>overall|years|year|yrs|y/o|ovr|ovl|yr|yo|age)[-=.]*(?P<after>[0-9]*)[-=.]*$",
    )
    .expect("unit pattern compiles")
});

/// `$25m`, `25.5m`, `$25`. A bare number is never a cap hit.
static CAP_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<dollar>\$)?(?P<amount>[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?P<millions>m)?$")
        .expect("cap hit pattern compiles")
});

/// Split a token into its number and unit. Names that merely end in a unit
/// (`Page`) do not match because only digits may sit next to the unit.
fn split_unit(token: &str) -> Option<(Option<i64>, Unit)> {
    let caps = UNIT_TOKEN.captures(token)?;
    let unit_text = caps.name("unit")?.as_str();
    let unit = if OVERALL_UNITS.contains(&unit_text) {
        Unit::Overall
    } else if AGE_UNITS.contains(&unit_text) {
        Unit::Age
    } else {
        return None;
    };
    let before = caps.name("before").map_or("", |m| m.as_str());
    let after = caps.name("after").map_or("", |m| m.as_str());
    match (before, after) {
        ("", "") => Some((None, unit)),
        (n, "") | ("", n) => Some((n.parse().ok(), unit)),
        _ => None,
    }
}

fn parse_cap_hit(token: &str) -> Option<f64> {
    let caps = CAP_HIT.captures(token)?;
    if caps.name("dollar").is_none() && caps.name("millions").is_none() {
        return None;
    }
    caps.name("amount")?.as_str().parse().ok()
}

/// Classify the tokens of one player fragment, in order.
pub fn tokenize_player(fragment: &str) -> Vec<PlayerToken> {
    let words: Vec<&str> = fragment
        .split_whitespace()
        .map(clean_token)
        .filter(|w| !w.is_empty())
        .collect();
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

    let mut tokens = Vec::with_capacity(words.len());
    let mut have_overall = false;
    let mut have_age = false;
    let mut have_dev = false;
    let mut have_position = false;

    let mut i = 0;
    while i < words.len() {
        let tok = lower[i].as_str();
        let next = lower.get(i + 1).map(String::as_str);

        // "95 ovr" / "ovr 95" / "28 years" / "age 28" span two tokens.
        if let Some((number, unit)) = split_unit(tok) {
            let (number, consumed) = match number {
                Some(n) => (Some(n), 1),
                None => match next.filter(|n| is_all_digits(n)).and_then(|n| n.parse().ok()) {
                    Some(n) => (Some(n), 2),
                    None => (None, 1),
                },
            };
            if let Some(n) = number {
                push_unit(&mut tokens, unit, n, &mut have_overall, &mut have_age);
            }
            i += consumed;
            continue;
        }

        if is_all_digits(tok) {
            if let Some((None, unit)) = next.and_then(split_unit) {
                if let Ok(n) = tok.parse() {
                    push_unit(&mut tokens, unit, n, &mut have_overall, &mut have_age);
                    i += 2;
                    // "28 years old"
                    if unit == Unit::Age && lower.get(i).is_some_and(|w| w == "old") {
                        i += 1;
                    }
                    continue;
                }
            }
            let n: i64 = tok.parse().unwrap_or(-1);
            if BARE_OVERALL.contains(&n) && !have_overall {
                have_overall = true;
                tokens.push(PlayerToken::Overall(n));
            } else if BARE_AGE.contains(&n) && !have_age {
                have_age = true;
                tokens.push(PlayerToken::Age(n));
            } else {
                tokens.push(PlayerToken::NameFragment(words[i].to_string()));
            }
            i += 1;
            continue;
        }

        if tok == "old" && matches!(tokens.last(), Some(PlayerToken::Age(_))) {
            i += 1;
            continue;
        }

        // The first "ss" is the dev trait; once a trait is known it is the
        // strong-safety position.
        if tok == "ss" {
            if !have_dev {
                have_dev = true;
                tokens.push(PlayerToken::Dev(DevTrait::Superstar));
            } else if !have_position {
                have_position = true;
                tokens.push(PlayerToken::Position(Position::StrongSafety));
            } else {
                tokens.push(PlayerToken::NameFragment(words[i].to_string()));
            }
            i += 1;
            continue;
        }

        if !have_dev {
            if tok == "x" && next == Some("factor") {
                have_dev = true;
                tokens.push(PlayerToken::Dev(DevTrait::XFactor));
                i += 2;
                continue;
            }
            if let Some(dev) = DevTrait::from_alias(tok) {
                have_dev = true;
                tokens.push(PlayerToken::Dev(dev));
                i += 1;
                continue;
            }
        }

        if !have_position {
            if let Some((pos, width)) = position_at(&lower[i..]) {
                have_position = true;
                tokens.push(PlayerToken::Position(pos));
                i += width;
                continue;
            }
        }

        if let Some(cap) = parse_cap_hit(tok) {
            tokens.push(PlayerToken::CapHit(cap));
            i += 1;
            continue;
        }

        tokens.push(PlayerToken::NameFragment(words[i].to_string()));
        i += 1;
    }
    tokens
}

fn push_unit(
    tokens: &mut Vec<PlayerToken>,
    unit: Unit,
    n: i64,
    have_overall: &mut bool,
    have_age: &mut bool,
) {
    match unit {
        Unit::Overall => {
            *have_overall = true;
            tokens.push(PlayerToken::Overall(n));
        }
        Unit::Age => {
            *have_age = true;
            tokens.push(PlayerToken::Age(n));
        }
    }
}

/// Longest position phrase starting at `words[0]`: three words
/// ("left outside linebacker"), two ("running back"), or one ("qb").
fn position_at(words: &[String]) -> Option<(Position, usize)> {
    (1..=3.min(words.len())).rev().find_map(|width| {
        let phrase = words[..width].join(" ");
        Position::from_alias(&phrase).map(|pos| (pos, width))
    })
}

/// Parse a player fragment into a raw record. Returns `None` when the
/// fragment has no attribute and no name with a letter in it.
pub fn parse_player_fragment(fragment: &str) -> Option<RawPlayer> {
    let mut raw = RawPlayer::default();
    let mut name_parts: Vec<String> = Vec::new();

    for token in tokenize_player(fragment) {
        match token {
            // A later explicit unit overrides an earlier guess.
            PlayerToken::Overall(n) => raw.overall = Some(n),
            PlayerToken::Age(n) => raw.age = Some(n),
            PlayerToken::Dev(d) => raw.dev_trait = Some(d.code().to_string()),
            PlayerToken::Position(p) => raw.position = Some(p.code().to_string()),
            PlayerToken::CapHit(c) => raw.cap_hit = Some(c),
            PlayerToken::NameFragment(s) => name_parts.push(s),
        }
    }

    let name = name_parts.join(" ");
    let has_name = name.chars().any(char::is_alphabetic);
    let has_attribute = raw.overall.is_some()
        || raw.age.is_some()
        || raw.dev_trait.is_some()
        || raw.position.is_some();
    if !has_name && !has_attribute {
        return None;
    }
    if has_name {
        raw.name = Some(name);
    }
    Some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> RawPlayer {
        parse_player_fragment(s).unwrap_or_else(|| panic!("no player parsed from {s:?}"))
    }

    #[test]
    fn shorthand_player() {
        let p = parse("Mahomes 99ovr 28yo xfactor qb");
        assert_eq!(p.name.as_deref(), Some("Mahomes"));
        assert_eq!(p.overall, Some(99));
        assert_eq!(p.age, Some(28));
        assert_eq!(p.dev_trait.as_deref(), Some("x-factor"));
        assert_eq!(p.position.as_deref(), Some("qb"));
    }

    #[test]
    fn spaced_units_and_words() {
        let p = parse("Patrick Mahomes 99 OVR 28 years old X-Factor Quarterback");
        assert_eq!(p.name.as_deref(), Some("Patrick Mahomes"));
        assert_eq!(p.overall, Some(99));
        assert_eq!(p.age, Some(28));
        assert_eq!(p.dev_trait.as_deref(), Some("x-factor"));
        assert_eq!(p.position.as_deref(), Some("qb"));
    }

    #[test]
    fn bare_numbers_by_range() {
        let p = parse("Bijan Robinson 92 23 ss rb");
        assert_eq!(p.overall, Some(92));
        assert_eq!(p.age, Some(23));
        assert_eq!(p.dev_trait.as_deref(), Some("superstar"));
        assert_eq!(p.position.as_deref(), Some("hb"));
    }

    #[test]
    fn unit_overrides_range_guess() {
        // 45 alone would read as an age.
        let p = parse("Backup 45 ovr 30");
        assert_eq!(p.overall, Some(45));
        assert_eq!(p.age, Some(30));
    }

    #[test]
    fn second_ss_is_strong_safety() {
        let p = parse("Kyle Hamilton 94 ss ss");
        assert_eq!(p.dev_trait.as_deref(), Some("superstar"));
        assert_eq!(p.position.as_deref(), Some("ss"));

        let p = parse("Kyle Hamilton star ss");
        assert_eq!(p.dev_trait.as_deref(), Some("star"));
        assert_eq!(p.position.as_deref(), Some("ss"));
    }

    #[test]
    fn multi_word_positions() {
        assert_eq!(parse("Someone running back").position.as_deref(), Some("hb"));
        assert_eq!(
            parse("Someone left outside linebacker").position.as_deref(),
            Some("lolb")
        );
        assert_eq!(parse("Someone x factor").dev_trait.as_deref(), Some("x-factor"));
    }

    #[test]
    fn names_ending_in_unit_letters_stay_names() {
        let p = parse("Jordan Page 80");
        assert_eq!(p.name.as_deref(), Some("Jordan Page"));
        assert_eq!(p.overall, Some(80));
    }

    #[test]
    fn unrecognised_tokens_become_name() {
        let p = parse("CeeDee Lamb #88 wideout 97");
        assert_eq!(p.name.as_deref(), Some("CeeDee Lamb #88 wideout"));
        assert_eq!(p.overall, Some(97));
        assert_eq!(p.position, None);
    }

    #[test]
    fn out_of_range_numbers_are_absorbed() {
        let p = parse("Rookie 12 100");
        assert_eq!(p.name.as_deref(), Some("Rookie 12 100"));
        assert_eq!(p.overall, None);
        assert_eq!(p.age, None);
    }

    #[test]
    fn glued_unit_forms() {
        let p = parse("Fred Warner ovr-93 age28");
        assert_eq!(p.name.as_deref(), Some("Fred Warner"));
        assert_eq!(p.overall, Some(93));
        assert_eq!(p.age, Some(28));

        assert_eq!(split_unit("99ovr"), Some((Some(99), Unit::Overall)));
        assert_eq!(split_unit("y/o"), Some((None, Unit::Age)));
        assert_eq!(split_unit("99ovr28"), None);
        assert_eq!(split_unit("sage"), None);
    }

    #[test]
    fn cap_hit_tokens() {
        let p = parse("Dak Prescott 88 qb $60m");
        assert_eq!(p.cap_hit, Some(60.0));
        assert_eq!(parse("X 25.5m").cap_hit, Some(25.5));
        assert_eq!(parse("X 25").cap_hit, None);
    }

    #[test]
    fn name_only_and_attribute_only() {
        let p = parse("Trevon Diggs");
        assert_eq!(p, RawPlayer::named("Trevon Diggs"));

        let p = parse("99 qb");
        assert_eq!(p.name, None);
        assert_eq!(p.overall, Some(99));
    }

    #[test]
    fn nothing_usable_is_none() {
        assert_eq!(parse_player_fragment("???"), None);
        assert_eq!(parse_player_fragment("-- 7 --"), None);
        assert_eq!(parse_player_fragment(""), None);
    }

    #[test]
    fn token_stream_is_tagged() {
        assert_eq!(
            tokenize_player("Kelce 95 te"),
            vec![
                PlayerToken::NameFragment("Kelce".into()),
                PlayerToken::Overall(95),
                PlayerToken::Position(Position::TightEnd),
            ]
        );
    }
}
