// Raw record validation: default missing fields, clamp out-of-range ones,
// and keep a trail of every guess so callers can show it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::pick::{DraftPick, Season, MAX_ROUND, PICKS_PER_ROUND};
use crate::player::{DevTrait, Player, Position};
use crate::proposal::{RawPick, RawPlayer, Side};

pub const OVERALL_RANGE: (i64, i64) = (50, 99);
pub const AGE_RANGE: (i64, i64) = (18, 45);
pub const YEARS_LEFT_RANGE: (i64, i64) = (0, 10);

pub const UNKNOWN_PLAYER_NAME: &str = "Unknown Player";

/// Attribute a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Overall,
    Age,
    DevTrait,
    Position,
    YearsLeft,
    CapHit,
    Year,
    Round,
    PickNumber,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Overall => "overall",
            Field::Age => "age",
            Field::DevTrait => "dev trait",
            Field::Position => "position",
            Field::YearsLeft => "years left",
            Field::CapHit => "cap hit",
            Field::Year => "year",
            Field::Round => "round",
            Field::PickNumber => "pick number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal note attached to a successful result. `subject` names the
/// player or pick the note is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Field was missing; a default was used.
    Defaulted {
        subject: String,
        field: Field,
        value: String,
    },
    /// Field was out of range and clamped to the nearest bound.
    Clamped {
        subject: String,
        field: Field,
        from: String,
        to: String,
    },
    /// Field text did not map to a known value.
    Unrecognized {
        subject: String,
        field: Field,
        raw: String,
        fallback: String,
    },
    /// Field was filled in by an external lookup. Still guessed data.
    Enriched {
        subject: String,
        field: Field,
        value: String,
        source: String,
    },
    /// A proposal fragment yielded no asset and was skipped.
    FragmentDropped { side: Side, fragment: String },
}

impl ValidationWarning {
    pub fn field(&self) -> Option<Field> {
        match self {
            ValidationWarning::Defaulted { field, .. }
            | ValidationWarning::Clamped { field, .. }
            | ValidationWarning::Unrecognized { field, .. }
            | ValidationWarning::Enriched { field, .. } => Some(*field),
            ValidationWarning::FragmentDropped { .. } => None,
        }
    }

    /// Whether the evaluated value rests on a guess rather than user input.
    pub fn is_guess(&self) -> bool {
        matches!(
            self,
            ValidationWarning::Defaulted { .. }
                | ValidationWarning::Unrecognized { .. }
                | ValidationWarning::Enriched { .. }
        )
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::Defaulted {
                subject,
                field,
                value,
            } => write!(f, "{subject}: no {field} given, assumed {value}"),
            ValidationWarning::Clamped {
                subject,
                field,
                from,
                to,
            } => write!(f, "{subject}: {field} {from} is out of range, used {to}"),
            ValidationWarning::Unrecognized {
                subject,
                field,
                raw,
                fallback,
            } => write!(f, "{subject}: unknown {field} \"{raw}\", used {fallback}"),
            ValidationWarning::Enriched {
                subject,
                field,
                value,
                source,
            } => write!(f, "{subject}: {field} {value} looked up from {source}"),
            ValidationWarning::FragmentDropped { side, fragment } => {
                write!(f, "{side}: could not read \"{fragment}\", skipped")
            }
        }
    }
}

/// A validated value plus the warnings produced while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

impl<T> Validated<T> {
    pub fn into_parts(self) -> (T, Vec<ValidationWarning>) {
        (self.value, self.warnings)
    }
}

/// Values substituted for missing player fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerDefaults {
    pub overall: u8,
    pub age: u8,
    pub dev_trait: DevTrait,
    pub position: Position,
    pub years_left: u8,
    pub cap_hit: f64,
}

impl Default for PlayerDefaults {
    fn default() -> Self {
        Self {
            overall: 70,
            age: 25,
            dev_trait: DevTrait::Normal,
            position: Position::Halfback,
            years_left: 3,
            cap_hit: 0.0,
        }
    }
}

/// Turns raw records into value-model inputs. Pure apart from logging.
#[derive(Debug, Clone)]
pub struct Validator {
    season: Season,
    defaults: PlayerDefaults,
}

impl Validator {
    pub fn new(season: Season) -> Self {
        Self {
            season,
            defaults: PlayerDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: PlayerDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn defaults(&self) -> &PlayerDefaults {
        &self.defaults
    }

    pub fn validate_player(&self, raw: &RawPlayer) -> Validated<Player> {
        let mut notes = Notes::default();

        let name = match raw.display_name() {
            Some(name) => name.to_string(),
            None => {
                notes.defaulted(UNKNOWN_PLAYER_NAME, Field::Name, UNKNOWN_PLAYER_NAME);
                UNKNOWN_PLAYER_NAME.to_string()
            }
        };
        let subject = name.as_str();

        let overall = notes.ranged(
            subject,
            Field::Overall,
            raw.overall,
            OVERALL_RANGE,
            i64::from(self.defaults.overall),
            true,
        );
        let age = notes.ranged(
            subject,
            Field::Age,
            raw.age,
            AGE_RANGE,
            i64::from(self.defaults.age),
            true,
        );
        let years_left = notes.ranged(
            subject,
            Field::YearsLeft,
            raw.years_left,
            YEARS_LEFT_RANGE,
            i64::from(self.defaults.years_left),
            false,
        );

        let dev_trait = match raw.dev_trait.as_deref() {
            None => {
                notes.defaulted(subject, Field::DevTrait, self.defaults.dev_trait.label());
                self.defaults.dev_trait
            }
            Some(text) => DevTrait::from_alias(text).unwrap_or_else(|| {
                notes.unrecognized(subject, Field::DevTrait, text, self.defaults.dev_trait.label());
                self.defaults.dev_trait
            }),
        };

        let position = match raw.position.as_deref() {
            None => {
                notes.defaulted(subject, Field::Position, &self.defaults.position.display_str());
                self.defaults.position
            }
            Some(text) => Position::from_alias(text).unwrap_or_else(|| {
                notes.unrecognized(
                    subject,
                    Field::Position,
                    text,
                    &self.defaults.position.display_str(),
                );
                self.defaults.position
            }),
        };

        let cap_hit = match raw.cap_hit {
            None => self.defaults.cap_hit,
            Some(c) if c.is_finite() && c >= 0.0 => c,
            Some(c) => {
                notes.clamped(subject, Field::CapHit, c.to_string(), "0".to_string());
                0.0
            }
        };

        let player = Player {
            name,
            overall: to_u8(overall),
            age: to_u8(age),
            dev_trait,
            position,
            years_left: to_u8(years_left),
            cap_hit,
        };
        Validated {
            value: player,
            warnings: notes.into_inner(),
        }
    }

    /// Validate a pick. A round with no pick number becomes a mid-round
    /// estimate; a pick with neither defaults to round 1 pick 1.
    pub fn validate_pick(&self, raw: &RawPick) -> Validated<DraftPick> {
        let mut notes = Notes::default();
        let subject = raw.label();
        let subject = subject.as_str();

        let year = match raw.year {
            // "next 1st" carries its year implicitly.
            None if raw.next_year => i64::from(self.season.current),
            None => {
                let current = self.season.current;
                notes.defaulted(subject, Field::Year, &current.to_string());
                i64::from(current)
            }
            Some(y) => {
                let (lo, hi) = (
                    i64::from(self.season.current),
                    i64::from(self.season.last_year()),
                );
                let clamped = y.clamp(lo, hi);
                if clamped != y {
                    notes.clamped(subject, Field::Year, y.to_string(), clamped.to_string());
                }
                clamped
            }
        };

        let round = notes.ranged(
            subject,
            Field::Round,
            raw.round,
            (1, i64::from(MAX_ROUND)),
            1,
            true,
        );

        let pick_number = match (raw.round, raw.pick_number) {
            (_, Some(p)) => {
                let clamped = p.clamp(1, i64::from(PICKS_PER_ROUND));
                if clamped != p {
                    notes.clamped(subject, Field::PickNumber, p.to_string(), clamped.to_string());
                }
                Some(to_u8(clamped))
            }
            (Some(_), None) => {
                notes.defaulted(subject, Field::PickNumber, "mid-round (16)");
                None
            }
            (None, None) => {
                notes.defaulted(subject, Field::PickNumber, "1");
                Some(1)
            }
        };

        let year = i32::try_from(year).unwrap_or(self.season.current);
        let pick = DraftPick::new(&self.season, year, to_u8(round), pick_number, raw.next_year);
        Validated {
            value: pick,
            warnings: notes.into_inner(),
        }
    }
}

fn to_u8(v: i64) -> u8 {
    u8::try_from(v.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX)
}

// ---------------------------------------------------------------------------
// Warning collection
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Notes(Vec<ValidationWarning>);

impl Notes {
    fn into_inner(self) -> Vec<ValidationWarning> {
        self.0
    }

    fn defaulted(&mut self, subject: &str, field: Field, value: &str) {
        info!(subject, %field, value, "defaulted missing field");
        self.0.push(ValidationWarning::Defaulted {
            subject: subject.to_string(),
            field,
            value: value.to_string(),
        });
    }

    fn clamped(&mut self, subject: &str, field: Field, from: String, to: String) {
        warn!(subject, %field, %from, %to, "clamped out-of-range field");
        self.0.push(ValidationWarning::Clamped {
            subject: subject.to_string(),
            field,
            from,
            to,
        });
    }

    fn unrecognized(&mut self, subject: &str, field: Field, raw: &str, fallback: &str) {
        warn!(subject, %field, raw, fallback, "unrecognized field value");
        self.0.push(ValidationWarning::Unrecognized {
            subject: subject.to_string(),
            field,
            raw: raw.to_string(),
            fallback: fallback.to_string(),
        });
    }

    /// Default a missing integer (optionally noting it) or clamp a present
    /// one into `range`.
    fn ranged(
        &mut self,
        subject: &str,
        field: Field,
        value: Option<i64>,
        range: (i64, i64),
        default: i64,
        note_default: bool,
    ) -> i64 {
        match value {
            None => {
                if note_default {
                    self.defaulted(subject, field, &default.to_string());
                }
                default
            }
            Some(v) => {
                let clamped = v.clamp(range.0, range.1);
                if clamped != v {
                    self.clamped(subject, field, v.to_string(), clamped.to_string());
                }
                clamped
            }
        }
    }
}
