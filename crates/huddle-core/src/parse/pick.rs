// Draft pick fragment parsing.
//
// Accepted shapes include `2025 R1 P15`, `2025 1st round 15th pick`,
// `1.15`, `2nd round`, `Next 1st`, `round 3 pick 7`, `2026's 2nd`.

use crate::parse::{
    clean_token, dotted_slot, is_all_digits, ordinal, prefixed_number, PICK_PREFIXES,
    PICK_WORDS, ROUND_PREFIXES, ROUND_WORDS,
};
use crate::proposal::RawPick;

const NEXT_WORDS: &[&str] = &["next", "nexts", "next's"];

#[derive(Default)]
struct PickState {
    year: Option<i64>,
    round: Option<i64>,
    pick: Option<i64>,
    next_year: bool,
}

impl PickState {
    /// A number with no explicit label: a round if none is known yet and
    /// it fits, otherwise the pick within the round.
    fn unlabelled(&mut self, n: i64) -> bool {
        if self.round.is_none() && (1..=7).contains(&n) {
            self.round = Some(n);
            true
        } else if self.round.is_some() && self.pick.is_none() && (1..=32).contains(&n) {
            self.pick = Some(n);
            true
        } else {
            false
        }
    }

    fn is_empty(&self) -> bool {
        self.year.is_none() && self.round.is_none() && self.pick.is_none() && !self.next_year
    }
}

fn normalize(token: &str) -> String {
    let lower = clean_token(token).to_lowercase();
    let lower = lower.strip_suffix("'s").unwrap_or(&lower);
    // Keep the dot only for `1.15` shorthand.
    if dotted_slot(lower).is_some() {
        lower.to_string()
    } else {
        lower.trim_end_matches('.').to_string()
    }
}

fn number(token: Option<&String>) -> Option<i64> {
    token
        .filter(|t| is_all_digits(t))
        .and_then(|t| t.parse().ok())
}

/// Parse one pick fragment. Returns `None` when nothing in the fragment
/// reads as a year, round, pick number, or "next".
pub fn parse_pick_fragment(fragment: &str) -> Option<RawPick> {
    let tokens: Vec<String> = fragment
        .split_whitespace()
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect();

    let mut state = PickState::default();
    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i].as_str();
        let next = tokens.get(i + 1);
        let next_is = |words: &[&str]| next.is_some_and(|n| words.contains(&n.as_str()));

        if NEXT_WORDS.contains(&tok) {
            state.next_year = true;
        } else if tok.len() == 4 && is_all_digits(tok) {
            state.year = tok.parse().ok();
        } else if let Some((round, pick)) = dotted_slot(tok) {
            state.round = Some(round);
            state.pick = Some(pick);
        } else if ROUND_WORDS.contains(&tok) {
            // "round 3"
            if let Some(n) = number(next) {
                state.round = Some(n);
                i += 1;
            }
        } else if PICK_WORDS.contains(&tok) {
            // "pick 15"
            if let Some(n) = number(next) {
                state.pick = Some(n);
                i += 1;
            }
        } else if let Some(n) = ordinal(tok) {
            // "1st round", "15th pick", or a bare "2nd".
            if next_is(ROUND_WORDS) {
                state.round = Some(n);
                i += 1;
            } else if next_is(PICK_WORDS) {
                state.pick = Some(n);
                i += 1;
            } else if !state.unlabelled(n) && state.pick.is_none() {
                // "15th" with no round yet
                state.pick = Some(n);
            }
        } else if let Some(n) = prefixed_number(tok, ROUND_PREFIXES) {
            state.round = Some(n);
        } else if let Some(n) = prefixed_number(tok, PICK_PREFIXES) {
            state.pick = Some(n);
        } else if is_all_digits(tok) {
            if let Ok(n) = tok.parse::<i64>() {
                if next_is(ROUND_WORDS) {
                    state.round = Some(n);
                    i += 1;
                } else if next_is(PICK_WORDS) {
                    state.pick = Some(n);
                    i += 1;
                } else {
                    state.unlabelled(n);
                }
            }
        }
        // Anything else ("a", "the", team names) is filler.
        i += 1;
    }

    if state.is_empty() {
        return None;
    }
    Some(RawPick {
        year: state.year,
        round: state.round,
        pick_number: state.pick,
        next_year: state.next_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(year: Option<i64>, round: Option<i64>, pick: Option<i64>, next: bool) -> RawPick {
        RawPick {
            year,
            round,
            pick_number: pick,
            next_year: next,
        }
    }

    #[test]
    fn compact_form() {
        assert_eq!(
            parse_pick_fragment("2025 R1 P15"),
            Some(pick(Some(2025), Some(1), Some(15), false))
        );
        assert_eq!(
            parse_pick_fragment("2026 rd2 pk7"),
            Some(pick(Some(2026), Some(2), Some(7), false))
        );
    }

    #[test]
    fn spelled_out_form() {
        assert_eq!(
            parse_pick_fragment("2025 1st round 15th pick"),
            Some(pick(Some(2025), Some(1), Some(15), false))
        );
        assert_eq!(
            parse_pick_fragment("round 3 pick 7"),
            Some(pick(None, Some(3), Some(7), false))
        );
        assert_eq!(
            parse_pick_fragment("2027 third round"),
            Some(pick(Some(2027), Some(3), None, false))
        );
    }

    #[test]
    fn dotted_shorthand() {
        assert_eq!(
            parse_pick_fragment("1.15"),
            Some(pick(None, Some(1), Some(15), false))
        );
        assert_eq!(
            parse_pick_fragment("2026 3.2"),
            Some(pick(Some(2026), Some(3), Some(2), false))
        );
    }

    #[test]
    fn bare_number_after_round_is_pick() {
        assert_eq!(
            parse_pick_fragment("2025 2nd 20"),
            Some(pick(Some(2025), Some(2), Some(20), false))
        );
        assert_eq!(
            parse_pick_fragment("2025 1 15"),
            Some(pick(Some(2025), Some(1), Some(15), false))
        );
    }

    #[test]
    fn next_year_marker() {
        assert_eq!(
            parse_pick_fragment("Next 1st"),
            Some(pick(None, Some(1), None, true))
        );
        assert_eq!(
            parse_pick_fragment("nexts 2nd round pick"),
            Some(pick(None, Some(2), None, true))
        );
    }

    #[test]
    fn possessive_year() {
        assert_eq!(
            parse_pick_fragment("Chiefs 2026's 2nd"),
            Some(pick(Some(2026), Some(2), None, false))
        );
    }

    #[test]
    fn out_of_range_values_pass_through_for_validation() {
        assert_eq!(
            parse_pick_fragment("2040 R9 P40"),
            Some(pick(Some(2040), Some(9), Some(40), false))
        );
    }

    #[test]
    fn lone_late_ordinal_is_a_pick_number() {
        assert_eq!(
            parse_pick_fragment("2025 15th"),
            Some(pick(Some(2025), None, Some(15), false))
        );
    }

    #[test]
    fn nothing_recognised_is_none() {
        assert_eq!(parse_pick_fragment("pick"), None);
        assert_eq!(parse_pick_fragment("a round"), None);
    }
}
