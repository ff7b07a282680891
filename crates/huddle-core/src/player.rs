// Tradable athletes: position and development-trait vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Madden roster positions a player can be traded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Quarterback,
    Halfback,
    WideReceiver,
    TightEnd,
    LeftTackle,
    LeftGuard,
    Center,
    RightGuard,
    RightTackle,
    LeftEnd,
    RightEnd,
    DefensiveTackle,
    LeftOutsideLinebacker,
    MiddleLinebacker,
    RightOutsideLinebacker,
    Cornerback,
    FreeSafety,
    StrongSafety,
    Kicker,
    Punter,
}

impl Position {
    pub const ALL: [Position; 20] = [
        Position::Quarterback,
        Position::Halfback,
        Position::WideReceiver,
        Position::TightEnd,
        Position::LeftTackle,
        Position::LeftGuard,
        Position::Center,
        Position::RightGuard,
        Position::RightTackle,
        Position::LeftEnd,
        Position::RightEnd,
        Position::DefensiveTackle,
        Position::LeftOutsideLinebacker,
        Position::MiddleLinebacker,
        Position::RightOutsideLinebacker,
        Position::Cornerback,
        Position::FreeSafety,
        Position::StrongSafety,
        Position::Kicker,
        Position::Punter,
    ];

    /// Parse an exact position code ("qb", "LOLB", ...). Case-insensitive.
    pub fn from_code(s: &str) -> Option<Self> {
        let code = s.trim().to_lowercase();
        Position::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Parse a position code or one of the spelled-out synonyms league
    /// members use ("running back", "rb", "Free-Safety", ...).
    pub fn from_alias(s: &str) -> Option<Self> {
        if let Some(pos) = Self::from_code(s) {
            return Some(pos);
        }
        let normalized = s
            .to_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "quarterback" => Some(Position::Quarterback),
            "rb" | "running back" | "runningback" | "halfback" | "half back" => {
                Some(Position::Halfback)
            }
            "wide receiver" | "receiver" => Some(Position::WideReceiver),
            "tight end" => Some(Position::TightEnd),
            "left tackle" => Some(Position::LeftTackle),
            "left guard" => Some(Position::LeftGuard),
            "center" | "centre" => Some(Position::Center),
            "right guard" => Some(Position::RightGuard),
            "right tackle" => Some(Position::RightTackle),
            "left end" => Some(Position::LeftEnd),
            "right end" => Some(Position::RightEnd),
            "defensive tackle" => Some(Position::DefensiveTackle),
            "left outside linebacker" => Some(Position::LeftOutsideLinebacker),
            "middle linebacker" => Some(Position::MiddleLinebacker),
            "right outside linebacker" => Some(Position::RightOutsideLinebacker),
            "cornerback" | "corner" => Some(Position::Cornerback),
            "free safety" => Some(Position::FreeSafety),
            "strong safety" => Some(Position::StrongSafety),
            "kicker" => Some(Position::Kicker),
            "punter" => Some(Position::Punter),
            _ => None,
        }
    }

    /// Lower-case code used in configuration and raw attribute records.
    pub fn code(&self) -> &'static str {
        match self {
            Position::Quarterback => "qb",
            Position::Halfback => "hb",
            Position::WideReceiver => "wr",
            Position::TightEnd => "te",
            Position::LeftTackle => "lt",
            Position::LeftGuard => "lg",
            Position::Center => "c",
            Position::RightGuard => "rg",
            Position::RightTackle => "rt",
            Position::LeftEnd => "le",
            Position::RightEnd => "re",
            Position::DefensiveTackle => "dt",
            Position::LeftOutsideLinebacker => "lolb",
            Position::MiddleLinebacker => "mlb",
            Position::RightOutsideLinebacker => "rolb",
            Position::Cornerback => "cb",
            Position::FreeSafety => "fs",
            Position::StrongSafety => "ss",
            Position::Kicker => "k",
            Position::Punter => "p",
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> String {
        self.code().to_uppercase()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_str())
    }
}

/// Development trait tiers, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DevTrait {
    Normal,
    Star,
    Superstar,
    XFactor,
}

impl DevTrait {
    pub const ALL: [DevTrait; 4] = [
        DevTrait::Normal,
        DevTrait::Star,
        DevTrait::Superstar,
        DevTrait::XFactor,
    ];

    /// Parse a dev trait from the shorthand used in league chat.
    pub fn from_alias(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(DevTrait::Normal),
            "star" => Some(DevTrait::Star),
            "superstar" | "ss" => Some(DevTrait::Superstar),
            "x-factor" | "xfactor" | "xf" | "x factor" | "x_factor" => Some(DevTrait::XFactor),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DevTrait::Normal => "normal",
            DevTrait::Star => "star",
            DevTrait::Superstar => "superstar",
            DevTrait::XFactor => "x-factor",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DevTrait::Normal => "Normal",
            DevTrait::Star => "Star",
            DevTrait::Superstar => "Superstar",
            DevTrait::XFactor => "X-Factor",
        }
    }
}

impl fmt::Display for DevTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated, tradable athlete. Built fresh per calculation by the
/// validator; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub overall: u8,
    pub age: u8,
    pub dev_trait: DevTrait,
    pub position: Position,
    /// Contract years remaining. Informational only.
    pub years_left: u8,
    /// Cap hit in millions of dollars.
    pub cap_hit: f64,
}

impl Player {
    /// One-line summary, e.g. `Patrick Mahomes (99 QB, 28yo, X-Factor)`.
    pub fn description(&self) -> String {
        format!(
            "{} ({} {}, {}yo, {})",
            self.name, self.overall, self.position, self.age, self.dev_trait
        )
    }
}
