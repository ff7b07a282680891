// Rating tables and coefficients injected into the value model.
//
// Defaults are the league's shipped numbers; `valuation.toml` can override
// any subset of them.

use serde::{Deserialize, Serialize};

use crate::player::{DevTrait, Position};

/// Log-value offset per development trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevOffsets {
    pub normal: f64,
    pub star: f64,
    pub superstar: f64,
    #[serde(alias = "x-factor")]
    pub x_factor: f64,
}

impl DevOffsets {
    pub fn get(&self, dev: DevTrait) -> f64 {
        match dev {
            DevTrait::Normal => self.normal,
            DevTrait::Star => self.star,
            DevTrait::Superstar => self.superstar,
            DevTrait::XFactor => self.x_factor,
        }
    }
}

impl Default for DevOffsets {
    fn default() -> Self {
        Self {
            normal: -0.400,
            star: 0.0,
            superstar: 0.400,
            x_factor: 0.800,
        }
    }
}

/// Log-value offset per position. Field names match the lower-case
/// position codes used in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOffsets {
    pub qb: f64,
    pub hb: f64,
    pub wr: f64,
    pub te: f64,
    pub lt: f64,
    pub lg: f64,
    pub c: f64,
    pub rg: f64,
    pub rt: f64,
    pub le: f64,
    pub re: f64,
    pub dt: f64,
    pub lolb: f64,
    pub mlb: f64,
    pub rolb: f64,
    pub cb: f64,
    pub fs: f64,
    pub ss: f64,
    pub k: f64,
    pub p: f64,
    /// Offset for a position that could not be resolved. Kept distinct from
    /// every real position so it reads as "mid-tier unknown".
    pub unknown: f64,
}

impl PositionOffsets {
    pub fn get(&self, pos: Position) -> f64 {
        match pos {
            Position::Quarterback => self.qb,
            Position::Halfback => self.hb,
            Position::WideReceiver => self.wr,
            Position::TightEnd => self.te,
            Position::LeftTackle => self.lt,
            Position::LeftGuard => self.lg,
            Position::Center => self.c,
            Position::RightGuard => self.rg,
            Position::RightTackle => self.rt,
            Position::LeftEnd => self.le,
            Position::RightEnd => self.re,
            Position::DefensiveTackle => self.dt,
            Position::LeftOutsideLinebacker => self.lolb,
            Position::MiddleLinebacker => self.mlb,
            Position::RightOutsideLinebacker => self.rolb,
            Position::Cornerback => self.cb,
            Position::FreeSafety => self.fs,
            Position::StrongSafety => self.ss,
            Position::Kicker => self.k,
            Position::Punter => self.p,
        }
    }

    /// Offset for an optional position, falling back to `unknown`.
    pub fn get_or_unknown(&self, pos: Option<Position>) -> f64 {
        pos.map_or(self.unknown, |p| self.get(p))
    }
}

impl Default for PositionOffsets {
    fn default() -> Self {
        Self {
            qb: 1.0,
            hb: 0.5,
            wr: 0.3,
            te: 0.2,
            lt: 0.4,
            lg: 0.2,
            c: 0.2,
            rg: 0.2,
            rt: 0.4,
            le: 0.3,
            re: 0.3,
            dt: 0.2,
            lolb: 0.3,
            mlb: 0.3,
            rolb: 0.3,
            cb: 0.4,
            fs: 0.3,
            ss: 0.3,
            k: -0.5,
            p: -0.5,
            unknown: -1.0,
        }
    }
}

/// Cap-hit dampener: a player whose cap hit is strictly above `above`
/// (millions) is multiplied by `factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapHitTier {
    pub above: f64,
    pub factor: f64,
}

/// Every constant the value model reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueTables {
    pub base_constant: f64,
    pub ovr_coefficient: f64,
    pub age_baseline: u8,
    /// Log-value gained per year younger than the baseline.
    pub youth_bonus: f64,
    /// Log-value lost per year older than the baseline.
    pub aging_penalty: f64,
    pub dev_offsets: DevOffsets,
    pub position_offsets: PositionOffsets,
    /// Global inflation applied to players only. Picks never see it.
    pub player_multiplier: f64,
    pub cap_hit_tiers: Vec<CapHitTier>,
    /// Base values for overall picks 1..=len.
    pub pick_chart: Vec<u32>,
    /// Value for overall picks beyond the chart.
    pub pick_floor: u32,
    /// Per-year multiplier for future picks.
    pub future_discount: f64,
    /// Lower bound on the compounded future discount.
    pub min_discount: f64,
}

impl ValueTables {
    /// Base chart value for an overall pick number.
    pub fn chart_value(&self, overall_pick: u16) -> u32 {
        usize::from(overall_pick)
            .checked_sub(1)
            .and_then(|idx| self.pick_chart.get(idx))
            .copied()
            .unwrap_or(self.pick_floor)
    }

    /// Cap-hit multiplier. Tiers are exclusive: only the highest threshold
    /// the cap hit exceeds applies.
    pub fn cap_hit_factor(&self, cap_hit: f64) -> f64 {
        self.cap_hit_tiers
            .iter()
            .filter(|tier| cap_hit > tier.above)
            .max_by(|a, b| a.above.total_cmp(&b.above))
            .map_or(1.0, |tier| tier.factor)
    }
}

impl Default for ValueTables {
    fn default() -> Self {
        Self {
            base_constant: 0.0,
            ovr_coefficient: 0.1,
            age_baseline: 26,
            youth_bonus: 0.138,
            aging_penalty: 0.138,
            dev_offsets: DevOffsets::default(),
            position_offsets: PositionOffsets::default(),
            player_multiplier: 1.0,
            cap_hit_tiers: vec![
                CapHitTier {
                    above: 30.0,
                    factor: 0.8,
                },
                CapHitTier {
                    above: 20.0,
                    factor: 0.9,
                },
            ],
            pick_chart: vec![
                100, 80, 70, 60, 55, 50, 45, 40, 35, 30, 28, 26, 24, 22, 20, 18, 16, 14, 12, 10, 9,
                8, 7, 6, 5, 4, 3, 2, 1, 1, 1, 1,
            ],
            pick_floor: 1,
            future_discount: 0.9,
            min_discount: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_position_offset_is_distinct() {
        let offsets = PositionOffsets::default();
        for pos in Position::ALL {
            assert_ne!(offsets.get(pos), offsets.unknown, "{pos} collides with unknown");
        }
        assert_eq!(offsets.get_or_unknown(None), -1.0);
        assert_eq!(offsets.get_or_unknown(Some(Position::Quarterback)), 1.0);
    }

    #[test]
    fn quarterbacks_weighted_highest_and_specialists_negative() {
        let offsets = PositionOffsets::default();
        let qb = offsets.get(Position::Quarterback);
        for pos in Position::ALL {
            assert!(offsets.get(pos) <= qb);
        }
        assert!(offsets.get(Position::Kicker) < 0.0);
        assert!(offsets.get(Position::Punter) < 0.0);
    }

    #[test]
    fn chart_value_floors_beyond_coverage() {
        let tables = ValueTables::default();
        assert_eq!(tables.chart_value(1), 100);
        assert_eq!(tables.chart_value(32), 1);
        assert_eq!(tables.chart_value(33), tables.pick_floor);
        assert_eq!(tables.chart_value(224), tables.pick_floor);
        assert_eq!(tables.chart_value(0), tables.pick_floor);
    }

    #[test]
    fn default_chart_is_front_loaded_and_non_increasing() {
        let chart = ValueTables::default().pick_chart;
        assert_eq!(chart.len(), 32);
        assert!(chart.windows(2).all(|w| w[0] >= w[1]));
        assert!(chart[0] > chart[31] * 50);
    }

    #[test]
    fn cap_hit_penalty_is_exclusive_not_cumulative() {
        let tables = ValueTables::default();
        assert_eq!(tables.cap_hit_factor(0.0), 1.0);
        assert_eq!(tables.cap_hit_factor(20.0), 1.0);
        assert_eq!(tables.cap_hit_factor(25.0), 0.9);
        assert_eq!(tables.cap_hit_factor(30.0), 0.9);
        // Both thresholds exceeded: only the higher one applies (0.8, not 0.72).
        assert_eq!(tables.cap_hit_factor(35.0), 0.8);
    }

    #[test]
    fn cap_hit_tiers_do_not_depend_on_declaration_order() {
        let mut tables = ValueTables::default();
        tables.cap_hit_tiers.reverse();
        assert_eq!(tables.cap_hit_factor(35.0), 0.8);
        assert_eq!(tables.cap_hit_factor(25.0), 0.9);
    }
}
