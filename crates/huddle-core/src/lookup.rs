// External player-attribute lookup seam and proposal enrichment.
//
// Lookups are best-effort collaborators: a failed or slow lookup only means
// the validator's defaults get used.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::player::{DevTrait, Position};
use crate::proposal::{ParsedTradeProposal, RawAsset, RawPlayer, Side};
use crate::validate::{Field, ValidationWarning};

/// Partial attributes returned by a lookup. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttributes {
    pub overall: Option<i64>,
    pub age: Option<i64>,
    pub dev_trait: Option<DevTrait>,
    pub position: Option<Position>,
    /// Where the answer came from ("ratings sheet", "claude", ...).
    #[serde(default)]
    pub source: String,
}

impl PlayerAttributes {
    pub fn is_empty(&self) -> bool {
        self.overall.is_none()
            && self.age.is_none()
            && self.dev_trait.is_none()
            && self.position.is_none()
    }
}

#[async_trait]
pub trait PlayerLookup: Send + Sync {
    /// Best-effort attributes for `name`. `Ok(None)` means "not known".
    async fn lookup_player_attributes(&self, name: &str) -> anyhow::Result<Option<PlayerAttributes>>;

    fn name(&self) -> &str;
}

/// Knows nothing; every player falls through to validator defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLookup;

#[async_trait]
impl PlayerLookup for NullLookup {
    async fn lookup_player_attributes(&self, _name: &str) -> anyhow::Result<Option<PlayerAttributes>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Tries each lookup in order; the first non-empty answer wins. Errors are
/// logged and the next lookup is tried.
#[derive(Clone, Default)]
pub struct LookupChain {
    lookups: Vec<Arc<dyn PlayerLookup>>,
}

impl LookupChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, lookup: Arc<dyn PlayerLookup>) -> Self {
        self.lookups.push(lookup);
        self
    }

    pub fn push(&mut self, lookup: Arc<dyn PlayerLookup>) {
        self.lookups.push(lookup);
    }

    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }
}

#[async_trait]
impl PlayerLookup for LookupChain {
    async fn lookup_player_attributes(&self, name: &str) -> anyhow::Result<Option<PlayerAttributes>> {
        for lookup in &self.lookups {
            match lookup.lookup_player_attributes(name).await {
                Ok(Some(attrs)) if !attrs.is_empty() => return Ok(Some(attrs)),
                Ok(_) => debug!(lookup = lookup.name(), name, "lookup had no answer"),
                Err(e) => warn!(lookup = lookup.name(), name, error = %e, "lookup failed"),
            }
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        "chain"
    }
}

/// Fill only the fields `raw` is missing. User-supplied fields are never
/// overwritten. Returns one `Enriched` warning per filled field.
pub fn fill_missing(raw: &mut RawPlayer, attrs: &PlayerAttributes) -> Vec<ValidationWarning> {
    let subject = raw.display_name().unwrap_or_default().to_string();
    let mut warnings = Vec::new();
    let mut note = |field: Field, value: String| {
        warnings.push(ValidationWarning::Enriched {
            subject: subject.clone(),
            field,
            value,
            source: attrs.source.clone(),
        });
    };

    if let Some(ovr) = attrs.overall.filter(|_| raw.overall.is_none()) {
        raw.overall = Some(ovr);
        note(Field::Overall, ovr.to_string());
    }
    if let Some(age) = attrs.age.filter(|_| raw.age.is_none()) {
        raw.age = Some(age);
        note(Field::Age, age.to_string());
    }
    if let Some(dev) = attrs.dev_trait.filter(|_| raw.dev_trait.is_none()) {
        raw.dev_trait = Some(dev.code().to_string());
        note(Field::DevTrait, dev.label().to_string());
    }
    if let Some(pos) = attrs.position.filter(|_| raw.position.is_none()) {
        raw.position = Some(pos.code().to_string());
        note(Field::Position, pos.display_str());
    }
    warnings
}

/// Look up every incomplete, named player in the proposal concurrently and
/// fill their missing fields in place. Each lookup is bounded by `timeout`;
/// failures and timeouts leave the player untouched.
pub async fn enrich_proposal(
    proposal: &mut ParsedTradeProposal,
    lookup: &dyn PlayerLookup,
    timeout: Duration,
) -> Vec<ValidationWarning> {
    let targets: Vec<(Side, usize, String)> = [Side::A, Side::B]
        .into_iter()
        .flat_map(|side| {
            proposal
                .side(side)
                .iter()
                .enumerate()
                .filter_map(move |(idx, asset)| match asset {
                    RawAsset::Player(p) if p.is_incomplete() => {
                        p.display_name().map(|n| (side, idx, n.to_string()))
                    }
                    _ => None,
                })
        })
        .collect();

    if targets.is_empty() {
        return Vec::new();
    }
    info!(count = targets.len(), lookup = lookup.name(), "enriching players");

    let results = join_all(targets.iter().map(|(_, _, name)| async move {
        match tokio::time::timeout(timeout, lookup.lookup_player_attributes(name)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!(name = name.as_str(), error = %e, "player lookup failed, using defaults");
                None
            }
            Err(_) => {
                warn!(name = name.as_str(), ?timeout, "player lookup timed out, using defaults");
                None
            }
        }
    }))
    .await;

    let mut warnings = Vec::new();
    for ((side, idx, _), found) in targets.into_iter().zip(results) {
        let Some(attrs) = found else { continue };
        if let Some(RawAsset::Player(raw)) = proposal.side_mut(side).get_mut(idx) {
            warnings.extend(fill_missing(raw, &attrs));
        }
    }
    warnings
}
