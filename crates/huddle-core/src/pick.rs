// Draft pick representation and the season window picks are valued in.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PICKS_PER_ROUND: u8 = 32;
pub const MAX_ROUND: u8 = 7;
/// Pick number assumed when only the round is known.
pub const MID_ROUND_PICK: u8 = 16;

/// The league's current draft season and how many future years of picks
/// can be traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub current: i32,
    pub window_years: u8,
}

impl Season {
    pub const DEFAULT_WINDOW_YEARS: u8 = 6;

    pub fn new(current: i32) -> Self {
        Self {
            current,
            window_years: Self::DEFAULT_WINDOW_YEARS,
        }
    }

    /// Last draft year inside the tradable window.
    pub fn last_year(&self) -> i32 {
        self.current + i32::from(self.window_years.max(1)) - 1
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.current..=self.last_year()).contains(&year)
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.current, self.last_year())
    }

    /// Whole years between the current season and `year` (0 for past years).
    pub fn years_from_now(&self, year: i32) -> u32 {
        u32::try_from(year - self.current).unwrap_or(0)
    }
}

/// Overall selection number for a round/pick slot.
pub fn overall_pick(round: u8, pick_number: u8) -> u16 {
    (u16::from(round) - 1) * u16::from(PICKS_PER_ROUND) + u16::from(pick_number)
}

/// A tradable draft selection. Fields are read-only so `overall_pick` can
/// never drift from `round`/`pick_number`. `round` is the valued round after
/// the future-year shift; `requested_round` and `next_year` keep what was
/// asked for so the pick can be rebuilt without shifting twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    year: i32,
    requested_round: u8,
    next_year: bool,
    round: u8,
    pick_number: u8,
    overall_pick: u16,
    estimated_pick: bool,
}

impl DraftPick {
    /// Build a pick inside `season`'s window.
    ///
    /// Future picks are discounted by shifting the round: one round later
    /// per year beyond the current season, plus one more when the request
    /// was phrased as "next year's" pick. A missing pick number is
    /// estimated as the middle of the round.
    pub fn new(
        season: &Season,
        year: i32,
        round: u8,
        pick_number: Option<u8>,
        next_year: bool,
    ) -> Self {
        let year = season.clamp(year);
        let requested_round = round.clamp(1, MAX_ROUND);
        let shift = season.years_from_now(year) + u32::from(next_year);
        let round = (u32::from(requested_round) + shift).min(u32::from(MAX_ROUND)) as u8;
        let (pick_number, estimated_pick) = match pick_number {
            Some(p) => (p.clamp(1, PICKS_PER_ROUND), false),
            None => (MID_ROUND_PICK, true),
        };
        Self {
            year,
            requested_round,
            next_year,
            round,
            pick_number,
            overall_pick: overall_pick(round, pick_number),
            estimated_pick,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn round(&self) -> u8 {
        self.round
    }

    /// The round as stated, before the future-year shift.
    pub fn requested_round(&self) -> u8 {
        self.requested_round
    }

    pub fn is_next_year(&self) -> bool {
        self.next_year
    }

    pub fn pick_number(&self) -> u8 {
        self.pick_number
    }

    pub fn overall_pick(&self) -> u16 {
        self.overall_pick
    }

    /// Whether the pick number is the mid-round estimate rather than a
    /// number the user supplied.
    pub fn is_estimated(&self) -> bool {
        self.estimated_pick
    }

    /// e.g. `2025 Round 1 Pick 15` or `2026 Round 3 Mid-Round Pick`.
    pub fn description(&self) -> String {
        if self.estimated_pick {
            format!("{} Round {} Mid-Round Pick", self.year, self.round)
        } else {
            format!("{} Round {} Pick {}", self.year, self.round, self.pick_number)
        }
    }
}

impl fmt::Display for DraftPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
