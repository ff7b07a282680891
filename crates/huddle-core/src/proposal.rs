// Intermediate records between parsing and validation.
//
// Raw records hold whatever the parser (or an external structured parser)
// could extract: every field is optional and unvalidated.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::pick::DraftPick;
use crate::player::Player;

/// Which party of a trade an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::A => "Team 1",
            Side::B => "Team 2",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unvalidated player attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPlayer {
    pub name: Option<String>,
    #[serde(alias = "ovr", alias = "overall_rating", deserialize_with = "lenient_int")]
    pub overall: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub age: Option<i64>,
    #[serde(alias = "dev", alias = "development_trait")]
    pub dev_trait: Option<String>,
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub years_left: Option<i64>,
    #[serde(deserialize_with = "lenient_float")]
    pub cap_hit: Option<f64>,
}

impl RawPlayer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when any rating attribute the value model needs is absent.
    pub fn is_incomplete(&self) -> bool {
        self.overall.is_none()
            || self.age.is_none()
            || self.dev_trait.is_none()
            || self.position.is_none()
    }

    /// Name with surrounding whitespace removed, if any is left.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

impl From<&Player> for RawPlayer {
    fn from(p: &Player) -> Self {
        Self {
            name: Some(p.name.clone()),
            overall: Some(i64::from(p.overall)),
            age: Some(i64::from(p.age)),
            dev_trait: Some(p.dev_trait.code().to_string()),
            position: Some(p.position.code().to_string()),
            years_left: Some(i64::from(p.years_left)),
            cap_hit: Some(p.cap_hit),
        }
    }
}

/// Unvalidated draft pick attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPick {
    #[serde(deserialize_with = "lenient_int")]
    pub year: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub round: Option<i64>,
    #[serde(alias = "pick", deserialize_with = "lenient_int")]
    pub pick_number: Option<i64>,
    #[serde(alias = "is_next_year")]
    pub next_year: bool,
}

impl RawPick {
    /// Short label for warnings, e.g. `2026 R2 P?`.
    pub fn label(&self) -> String {
        let year = self.year.map_or_else(|| "????".to_string(), |y| y.to_string());
        let round = self.round.map_or_else(|| "?".to_string(), |r| r.to_string());
        let pick = self.pick_number.map_or_else(|| "?".to_string(), |p| p.to_string());
        let next = if self.next_year { "next " } else { "" };
        format!("{next}{year} R{round} P{pick}")
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.round.is_none() && self.pick_number.is_none()
    }
}

impl From<&DraftPick> for RawPick {
    fn from(p: &DraftPick) -> Self {
        Self {
            year: Some(i64::from(p.year())),
            round: Some(i64::from(p.requested_round())),
            pick_number: (!p.is_estimated()).then(|| i64::from(p.pick_number())),
            next_year: p.is_next_year(),
        }
    }
}

/// A raw asset tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawAsset {
    Player(RawPlayer),
    Pick(RawPick),
}

/// Two ordered lists of raw assets, one per side. Enrichment mutates the
/// player records in place before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTradeProposal {
    pub side_a: Vec<RawAsset>,
    pub side_b: Vec<RawAsset>,
}

impl ParsedTradeProposal {
    pub fn side(&self, side: Side) -> &[RawAsset] {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Vec<RawAsset> {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.side_a.is_empty() && self.side_b.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.side_a.len() + self.side_b.len()
    }
}

// ---------------------------------------------------------------------------
// Lenient numeric deserialization
// ---------------------------------------------------------------------------

/// Structured parsers hand back numbers as ints, floats, or strings
/// ("95", "28 yrs"). Anything without a usable number becomes `None`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    fn to_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Int(n) => Some(*n as f64),
            LooseNumber::Float(f) if f.is_finite() => Some(*f),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => {
                let numeric: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                numeric.parse().ok()
            }
        }
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.to_f64()).map(|f| f.round() as i64))
}

fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseNumber> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.to_f64()))
}
