// Trade value functions for players and draft picks.
//
// Players are valued on a log scale so that a few points of OVR near the
// elite tier open a much wider gap than the same points in the mid tier.
// Picks come from a front-loaded chart with a compounding future discount.

use crate::evaluate::{AssetKind, PricedAsset};
use crate::pick::{DraftPick, Season};
use crate::player::{DevTrait, Player, Position};
use crate::valuation::tables::ValueTables;

/// Prices validated players and picks against a fixed set of tables.
#[derive(Debug, Clone)]
pub struct ValueModel {
    tables: ValueTables,
    season: Season,
}

impl ValueModel {
    pub fn new(tables: ValueTables, season: Season) -> Self {
        Self { tables, season }
    }

    pub fn tables(&self) -> &ValueTables {
        &self.tables
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Log-scale term contributed by age.
    ///
    /// Younger than the baseline is always a bonus and older is always a
    /// penalty, each growing linearly with the distance from the baseline.
    pub fn age_term(&self, age: u8) -> f64 {
        let baseline = i32::from(self.tables.age_baseline);
        let delta = i32::from(age) - baseline;
        if delta < 0 {
            self.tables.youth_bonus * f64::from(-delta)
        } else {
            -self.tables.aging_penalty * f64::from(delta)
        }
    }

    /// `base + ovr_coef * overall + age_term + dev_offset + pos_offset`.
    ///
    /// An unresolved dev trait prices as `normal`; an unresolved position
    /// uses the `unknown` offset.
    pub fn log_value(
        &self,
        overall: u8,
        age: u8,
        dev_trait: Option<DevTrait>,
        position: Option<Position>,
    ) -> f64 {
        let t = &self.tables;
        t.base_constant
            + t.ovr_coefficient * f64::from(overall)
            + self.age_term(age)
            + t.dev_offsets.get(dev_trait.unwrap_or(DevTrait::Normal))
            + t.position_offsets.get_or_unknown(position)
    }

    /// Player value from individual attributes. Never less than 1.
    pub fn attribute_value(
        &self,
        overall: u8,
        age: u8,
        dev_trait: Option<DevTrait>,
        position: Option<Position>,
        cap_hit: f64,
    ) -> u32 {
        let raw = self.log_value(overall, age, dev_trait, position).exp() - 1.0;
        let value = raw * self.tables.player_multiplier * self.tables.cap_hit_factor(cap_hit);
        finalize(value.round())
    }

    pub fn player_value(&self, player: &Player) -> u32 {
        self.attribute_value(
            player.overall,
            player.age,
            Some(player.dev_trait),
            Some(player.position),
            player.cap_hit,
        )
    }

    /// Chart value for the pick's overall slot, discounted per year out.
    /// The player multiplier does not apply to picks.
    pub fn pick_value(&self, pick: &DraftPick) -> u32 {
        let base = f64::from(self.tables.chart_value(pick.overall_pick()));
        let years_out = self.season.years_from_now(pick.year());
        let discount = self
            .tables
            .future_discount
            .powi(i32::try_from(years_out).unwrap_or(i32::MAX))
            .max(self.tables.min_discount);
        finalize((base * discount).floor())
    }

    pub fn price_player(&self, player: &Player) -> PricedAsset {
        PricedAsset {
            description: player.description(),
            value: self.player_value(player),
            kind: AssetKind::Player,
        }
    }

    pub fn price_pick(&self, pick: &DraftPick) -> PricedAsset {
        PricedAsset {
            description: pick.description(),
            value: self.pick_value(pick),
            kind: AssetKind::Pick,
        }
    }
}

/// Clamp a computed value into `1..=u32::MAX`.
fn finalize(value: f64) -> u32 {
    if value.is_nan() || value < 1.0 {
        1
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
