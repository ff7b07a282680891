// Trade comparison: totals, percentage imbalance, fairness label.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proposal::Side;
use crate::validate::ValidationWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Player,
    Pick,
}

/// A validated asset with its computed trade value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedAsset {
    pub description: String,
    pub value: u32,
    pub kind: AssetKind,
}

/// Three-way fairness label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fairness {
    Fair,
    Okay,
    Unfair,
}

impl Fairness {
    pub fn label(&self) -> &'static str {
        match self {
            Fairness::Fair => "FAIR TRADE",
            Fairness::Okay => "OKAY TRADE",
            Fairness::Unfair => "UNFAIR TRADE",
        }
    }
}

impl fmt::Display for Fairness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage thresholds for the fairness label. Both bounds are inclusive
/// on their own side: `pct <= fair_max_pct` is fair, `pct >= unfair_min_pct`
/// is unfair, anything strictly between is okay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessPolicy {
    pub fair_max_pct: f64,
    pub unfair_min_pct: f64,
}

impl Default for FairnessPolicy {
    fn default() -> Self {
        Self {
            fair_max_pct: 10.0,
            unfair_min_pct: 30.0,
        }
    }
}

impl FairnessPolicy {
    pub fn classify(&self, percent_diff: f64) -> Fairness {
        if percent_diff <= self.fair_max_pct {
            Fairness::Fair
        } else if percent_diff >= self.unfair_min_pct {
            Fairness::Unfair
        } else {
            Fairness::Okay
        }
    }
}

/// One side's itemised assets and their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    pub assets: Vec<PricedAsset>,
    pub total: u64,
}

impl SideSummary {
    pub fn new(assets: Vec<PricedAsset>) -> Self {
        let total = assets.iter().map(|a| u64::from(a.value)).sum();
        Self { assets, total }
    }
}

/// The outcome of comparing what each side sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeVerdict {
    /// What side A sends.
    pub side_a: SideSummary,
    /// What side B sends.
    pub side_b: SideSummary,
    pub difference: u64,
    pub percent_diff: f64,
    pub fairness: Fairness,
    /// The side that receives more value, `None` when perfectly even.
    pub favored: Option<Side>,
    pub warnings: Vec<ValidationWarning>,
}

/// `|a - b| / max(a, b, 1) * 100`. Both totals zero is a 0% difference.
pub fn percent_difference(total_a: u64, total_b: u64) -> f64 {
    let difference = total_a.abs_diff(total_b);
    let denominator = total_a.max(total_b).max(1);
    difference as f64 * 100.0 / denominator as f64
}

/// Compare two priced sides. Pure; no lookups, no side effects.
pub fn evaluate(
    side_a: Vec<PricedAsset>,
    side_b: Vec<PricedAsset>,
    policy: &FairnessPolicy,
) -> TradeVerdict {
    let side_a = SideSummary::new(side_a);
    let side_b = SideSummary::new(side_b);
    let percent_diff = percent_difference(side_a.total, side_b.total);

    // A side that sends more value leaves the other side better off.
    let favored = match side_a.total.cmp(&side_b.total) {
        std::cmp::Ordering::Greater => Some(Side::B),
        std::cmp::Ordering::Less => Some(Side::A),
        std::cmp::Ordering::Equal => None,
    };

    TradeVerdict {
        difference: side_a.total.abs_diff(side_b.total),
        percent_diff,
        fairness: policy.classify(percent_diff),
        favored,
        side_a,
        side_b,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(value: u32) -> PricedAsset {
        PricedAsset {
            description: format!("asset worth {value}"),
            value,
            kind: AssetKind::Player,
        }
    }

    #[test]
    fn even_trade_is_fair_with_no_favored_side() {
        let verdict = evaluate(vec![asset(1000)], vec![asset(1000)], &FairnessPolicy::default());
        assert_eq!(verdict.side_a.total, 1000);
        assert_eq!(verdict.side_b.total, 1000);
        assert_eq!(verdict.difference, 0);
        assert_eq!(verdict.percent_diff, 0.0);
        assert_eq!(verdict.fairness, Fairness::Fair);
        assert_eq!(verdict.favored, None);
    }

    #[test]
    fn exactly_ten_percent_is_fair() {
        let verdict = evaluate(vec![asset(1000)], vec![asset(900)], &FairnessPolicy::default());
        assert_eq!(verdict.percent_diff, 10.0);
        assert_eq!(verdict.fairness, Fairness::Fair);
    }

    #[test]
    fn between_thresholds_is_okay() {
        let policy = FairnessPolicy::default();
        let verdict = evaluate(vec![asset(1000)], vec![asset(899)], &policy);
        assert_eq!(verdict.fairness, Fairness::Okay);
        let verdict = evaluate(vec![asset(1000)], vec![asset(701)], &policy);
        assert_eq!(verdict.fairness, Fairness::Okay);
    }

    #[test]
    fn exactly_thirty_percent_is_unfair() {
        let verdict = evaluate(vec![asset(700)], vec![asset(1000)], &FairnessPolicy::default());
        assert_eq!(verdict.percent_diff, 30.0);
        assert_eq!(verdict.fairness, Fairness::Unfair);
    }

    #[test]
    fn both_sides_empty_is_zero_percent() {
        let verdict = evaluate(vec![], vec![], &FairnessPolicy::default());
        assert_eq!(verdict.percent_diff, 0.0);
        assert_eq!(verdict.fairness, Fairness::Fair);
        assert_eq!(verdict.favored, None);
    }

    #[test]
    fn one_empty_side_is_fully_unbalanced() {
        let verdict = evaluate(vec![asset(50)], vec![], &FairnessPolicy::default());
        assert_eq!(verdict.percent_diff, 100.0);
        assert_eq!(verdict.fairness, Fairness::Unfair);
        assert_eq!(verdict.favored, Some(Side::B));
    }

    #[test]
    fn favored_side_is_the_one_receiving_more() {
        let verdict = evaluate(
            vec![asset(100), asset(50)],
            vec![asset(400)],
            &FairnessPolicy::default(),
        );
        assert_eq!(verdict.side_a.total, 150);
        assert_eq!(verdict.difference, 250);
        assert_eq!(verdict.favored, Some(Side::A));
        assert_eq!(verdict.side_a.assets.len(), 2);
    }

    #[test]
    fn custom_policy_thresholds() {
        let strict = FairnessPolicy {
            fair_max_pct: 5.0,
            unfair_min_pct: 15.0,
        };
        assert_eq!(strict.classify(5.0), Fairness::Fair);
        assert_eq!(strict.classify(10.0), Fairness::Okay);
        assert_eq!(strict.classify(15.0), Fairness::Unfair);
    }
}
