// Assembles the calculator and its collaborators from configuration and
// exposes the four user-facing operations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use huddle_core::parse::parse_proposal;
use huddle_core::{
    AssetQuote, LookupChain, PlayerLookup, TradeCalculator, TradeError, TradeInput, TradeVerdict,
};
use huddle_llm::{LlmClient, LlmLookup, LlmProposalParser, TradeNarrator};

use crate::cache::SqliteLookupCache;
use crate::config::Config;
use crate::roster::RosterLookup;

/// A verdict plus the optional written analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeReport {
    pub verdict: TradeVerdict,
    pub narrative: Option<String>,
}

pub struct TradeDesk {
    calculator: TradeCalculator,
    parser: Option<LlmProposalParser>,
    narrator: Option<TradeNarrator>,
}

impl TradeDesk {
    /// A desk with no language-model features.
    pub fn new(calculator: TradeCalculator) -> Self {
        Self {
            calculator,
            parser: None,
            narrator: None,
        }
    }

    /// Build everything the config asks for. Missing optional pieces (no
    /// ratings sheet, no API key, an unopenable cache) are logged and skipped.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(LlmClient::from_key(
            config.credentials.anthropic_api_key.as_deref(),
            &config.llm.model,
        ));
        info!(
            season = config.league.current_season,
            llm = client.is_active(),
            "building trade desk"
        );

        let mut chain = LookupChain::new();
        if let Some(csv) = config.lookup.ratings_csv.as_deref().filter(|p| !p.is_empty()) {
            match RosterLookup::load(&config.resolve(csv)) {
                Ok(roster) => chain.push(Arc::new(roster)),
                Err(e) => warn!(error = %e, "ratings sheet unavailable"),
            }
        }
        if config.lookup.use_llm && client.is_active() {
            let llm: Arc<dyn PlayerLookup> = Arc::new(
                LlmLookup::new(client.clone()).with_max_tokens(config.llm.lookup_max_tokens),
            );
            chain.push(cached(config, llm));
        }

        let calculator = TradeCalculator::new(config.tables.clone(), config.season(), config.fairness)
            .with_player_defaults(config.player_defaults.clone())
            .with_lookup(Arc::new(chain))
            .with_lookup_timeout(config.lookup.timeout());

        let parser = (config.llm.parse_proposals && client.is_active())
            .then(|| LlmProposalParser::new(client.clone()));
        let narrator = (config.llm.narrate && client.is_active()).then(|| {
            TradeNarrator::new(client.clone()).with_max_tokens(config.llm.narrative_max_tokens)
        });

        Ok(Self {
            calculator,
            parser,
            narrator,
        })
    }

    pub fn calculator(&self) -> &TradeCalculator {
        &self.calculator
    }

    pub async fn quote_player(&self, text: &str) -> Result<AssetQuote, TradeError> {
        self.calculator.quote_player_text(text).await
    }

    pub fn quote_pick(&self, text: &str) -> Result<AssetQuote, TradeError> {
        self.calculator.quote_pick_text(text)
    }

    /// Compare two free-text sides.
    pub async fn trade(&self, side_a: &str, side_b: &str) -> Result<TradeReport, TradeError> {
        let verdict = self
            .calculator
            .evaluate_trade(TradeInput::Sides {
                a: side_a.to_string(),
                b: side_b.to_string(),
            })
            .await?;
        Ok(self.report(verdict).await)
    }

    /// Evaluate a whole proposal message, using the model to split it when
    /// configured.
    pub async fn committee(&self, text: &str) -> Result<TradeReport, TradeError> {
        if text.trim().is_empty() {
            return Err(TradeError::EmptyProposal);
        }
        let (proposal, warnings) = match &self.parser {
            Some(parser) => parser.parse(text).await,
            None => parse_proposal(text),
        };
        let verdict = self.calculator.evaluate_proposal(proposal, warnings).await?;
        Ok(self.report(verdict).await)
    }

    async fn report(&self, verdict: TradeVerdict) -> TradeReport {
        let narrative = match &self.narrator {
            Some(narrator) => narrator.narrate(&verdict).await,
            None => None,
        };
        TradeReport { verdict, narrative }
    }
}

/// Wrap `lookup` in the SQLite cache when one is configured.
fn cached(config: &Config, lookup: Arc<dyn PlayerLookup>) -> Arc<dyn PlayerLookup> {
    let Some(path) = config.lookup.cache_path.as_deref().filter(|p| !p.is_empty()) else {
        return lookup;
    };
    let path = config.resolve(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(error = %e, dir = %parent.display(), "cannot create cache directory");
            return lookup;
        }
    }
    match SqliteLookupCache::open(&path_str(&path), lookup.clone(), config.lookup.cache_max_age_days) {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "lookup cache unavailable, lookups will not be cached");
            lookup
        }
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
