// Pipeline entry points: parse, enrich, validate, price, compare.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::TradeError;
use crate::evaluate::{evaluate, FairnessPolicy, PricedAsset, TradeVerdict};
use crate::lookup::{enrich_proposal, NullLookup, PlayerLookup};
use crate::parse::{self, parse_pick_fragment, parse_player_fragment, strip_markup};
use crate::pick::Season;
use crate::proposal::{ParsedTradeProposal, RawAsset, Side};
use crate::validate::{PlayerDefaults, ValidationWarning, Validator};
use crate::valuation::{ValueModel, ValueTables};

/// The ways a trade can be handed to the calculator.
#[derive(Debug, Clone)]
pub enum TradeInput {
    /// One free-text string per side.
    Sides { a: String, b: String },
    /// A whole proposal message; sides are found by layout.
    Proposal(String),
    /// Already structured, e.g. by an external parser.
    Parsed(ParsedTradeProposal),
}

/// One priced asset with the warnings raised while validating it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetQuote {
    pub asset: PricedAsset,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Clone)]
pub struct TradeCalculator {
    model: ValueModel,
    validator: Validator,
    policy: FairnessPolicy,
    lookup: Arc<dyn PlayerLookup>,
    lookup_timeout: Duration,
}

impl TradeCalculator {
    pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(tables: ValueTables, season: Season, policy: FairnessPolicy) -> Self {
        Self {
            model: ValueModel::new(tables, season),
            validator: Validator::new(season),
            policy,
            lookup: Arc::new(NullLookup),
            lookup_timeout: Self::DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_player_defaults(mut self, defaults: PlayerDefaults) -> Self {
        self.validator = self.validator.with_defaults(defaults);
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn PlayerLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn model(&self) -> &ValueModel {
        &self.model
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn policy(&self) -> &FairnessPolicy {
        &self.policy
    }

    pub fn lookup_name(&self) -> &str {
        self.lookup.name()
    }

    /// Validate then price one raw asset.
    pub fn evaluate_single_asset(&self, raw: &RawAsset) -> AssetQuote {
        match raw {
            RawAsset::Player(p) => {
                let (player, warnings) = self.validator.validate_player(p).into_parts();
                AssetQuote {
                    asset: self.model.price_player(&player),
                    warnings,
                }
            }
            RawAsset::Pick(p) => {
                let (pick, warnings) = self.validator.validate_pick(p).into_parts();
                AssetQuote {
                    asset: self.model.price_pick(&pick),
                    warnings,
                }
            }
        }
    }

    /// Price a single free-text player, filling gaps from the lookup.
    pub async fn quote_player_text(&self, text: &str) -> Result<AssetQuote, TradeError> {
        let cleaned = strip_markup(text);
        if cleaned.trim().is_empty() {
            return Err(TradeError::EmptyProposal);
        }
        let raw = parse_player_fragment(&cleaned).ok_or_else(|| dropped(&cleaned))?;
        let mut proposal = ParsedTradeProposal {
            side_a: vec![RawAsset::Player(raw)],
            side_b: Vec::new(),
        };
        let mut warnings =
            enrich_proposal(&mut proposal, self.lookup.as_ref(), self.lookup_timeout).await;

        let mut quote = match proposal.side_a.first() {
            Some(asset) => self.evaluate_single_asset(asset),
            None => return Err(dropped(&cleaned)),
        };
        warnings.append(&mut quote.warnings);
        quote.warnings = warnings;
        Ok(quote)
    }

    /// Price a single free-text draft pick.
    pub fn quote_pick_text(&self, text: &str) -> Result<AssetQuote, TradeError> {
        let cleaned = strip_markup(text);
        if cleaned.trim().is_empty() {
            return Err(TradeError::EmptyProposal);
        }
        let raw = parse_pick_fragment(&cleaned).ok_or_else(|| dropped(&cleaned))?;
        Ok(self.evaluate_single_asset(&RawAsset::Pick(raw)))
    }

    /// Full pipeline. Only a proposal with no usable asset on either side
    /// is an error; everything else comes back as warnings on the verdict.
    pub async fn evaluate_trade(&self, input: TradeInput) -> Result<TradeVerdict, TradeError> {
        let (proposal, warnings) = match input {
            TradeInput::Sides { a, b } => {
                if a.trim().is_empty() && b.trim().is_empty() {
                    return Err(TradeError::EmptyProposal);
                }
                parse::parse_sides(&a, &b)
            }
            TradeInput::Proposal(text) => {
                if text.trim().is_empty() {
                    return Err(TradeError::EmptyProposal);
                }
                parse::parse_proposal(&text)
            }
            TradeInput::Parsed(proposal) => (proposal, Vec::new()),
        };

        self.evaluate_proposal(proposal, warnings).await
    }

    /// Enrich then evaluate a proposal produced by some other parser,
    /// keeping the warnings that parser raised.
    pub async fn evaluate_proposal(
        &self,
        mut proposal: ParsedTradeProposal,
        mut warnings: Vec<ValidationWarning>,
    ) -> Result<TradeVerdict, TradeError> {
        if proposal.is_empty() {
            return Err(TradeError::NoValidAssets { warnings });
        }

        warnings.extend(
            enrich_proposal(&mut proposal, self.lookup.as_ref(), self.lookup_timeout).await,
        );
        self.evaluate_parsed(&proposal, warnings)
    }

    /// Validate, price and compare an already-enriched proposal.
    pub fn evaluate_parsed(
        &self,
        proposal: &ParsedTradeProposal,
        mut warnings: Vec<ValidationWarning>,
    ) -> Result<TradeVerdict, TradeError> {
        if proposal.is_empty() {
            return Err(TradeError::NoValidAssets { warnings });
        }

        let mut price_side = |side: Side| -> Vec<PricedAsset> {
            proposal
                .side(side)
                .iter()
                .map(|raw| {
                    let quote = self.evaluate_single_asset(raw);
                    warnings.extend(quote.warnings);
                    quote.asset
                })
                .collect()
        };
        let side_a = price_side(Side::A);
        let side_b = price_side(Side::B);

        let mut verdict = evaluate(side_a, side_b, &self.policy);
        verdict.warnings = warnings;
        info!(
            total_a = verdict.side_a.total,
            total_b = verdict.side_b.total,
            percent_diff = verdict.percent_diff,
            fairness = ?verdict.fairness,
            warnings = verdict.warnings.len(),
            "trade evaluated"
        );
        Ok(verdict)
    }
}

fn dropped(fragment: &str) -> TradeError {
    TradeError::NoValidAssets {
        warnings: vec![ValidationWarning::FragmentDropped {
            side: Side::A,
            fragment: fragment.trim().to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{AssetKind, Fairness};
    use crate::proposal::{RawPick, RawPlayer};

    fn calculator() -> TradeCalculator {
        TradeCalculator::new(ValueTables::default(), Season::new(2025), FairnessPolicy::default())
    }

    #[test]
    fn single_pick_asset() {
        let quote = calculator().evaluate_single_asset(&RawAsset::Pick(RawPick {
            year: Some(2025),
            round: Some(1),
            pick_number: Some(1),
            next_year: false,
        }));
        assert_eq!(quote.asset.kind, AssetKind::Pick);
        assert_eq!(quote.asset.value, 100);
        assert_eq!(quote.asset.description, "2025 Round 1 Pick 1");
        assert!(quote.warnings.is_empty());
    }

    #[test]
    fn single_player_asset_carries_default_warnings() {
        let quote = calculator().evaluate_single_asset(&RawAsset::Player(RawPlayer::named("Someone")));
        assert_eq!(quote.asset.kind, AssetKind::Player);
        assert!(quote.asset.value >= 1);
        assert_eq!(quote.warnings.len(), 4);
    }

    #[test]
    fn pick_text_quote() {
        let quote = calculator().quote_pick_text("2025 R1 P32").ok();
        assert_eq!(quote.map(|q| q.asset.value), Some(1));
        assert_eq!(
            calculator().quote_pick_text("   ").err(),
            Some(TradeError::EmptyProposal)
        );
        assert!(matches!(
            calculator().quote_pick_text("pick"),
            Err(TradeError::NoValidAssets { .. })
        ));
    }

    #[tokio::test]
    async fn player_text_quote() {
        let quote = calculator()
            .quote_player_text("Patrick Mahomes 99 ovr 28yo xf qb")
            .await
            .ok();
        let quote = quote.map(|q| (q.asset.description, q.warnings.len()));
        assert_eq!(
            quote,
            Some(("Patrick Mahomes (99 QB, 28yo, X-Factor)".to_string(), 0))
        );
    }

    #[test]
    fn evaluate_parsed_rejects_empty() {
        let err = calculator()
            .evaluate_parsed(&ParsedTradeProposal::default(), Vec::new())
            .err();
        assert_eq!(err, Some(TradeError::NoValidAssets { warnings: vec![] }));
    }

    #[tokio::test]
    async fn one_sided_trade_is_still_evaluated() {
        let verdict = calculator()
            .evaluate_trade(TradeInput::Sides {
                a: "2025 R1 P1".into(),
                b: "???".into(),
            })
            .await
            .ok();
        let verdict = verdict.map(|v| (v.fairness, v.favored, v.warnings.len()));
        assert_eq!(verdict, Some((Fairness::Unfair, Some(Side::B), 1)));
    }
}
