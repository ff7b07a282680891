// Structured proposal parsing through the Claude API, with the
// deterministic parser as the fallback for every failure mode.

use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use huddle_core::parse::{parse_proposal, strip_markup};
use huddle_core::{ParsedTradeProposal, RawAsset, RawPick, RawPlayer, ValidationWarning};

use crate::client::{LlmClient, MessageRequest};
use crate::prompt;

const PARSER_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TeamAssets {
    players: Vec<RawPlayer>,
    picks: Vec<RawPick>,
}

impl TeamAssets {
    fn into_assets(self) -> Vec<RawAsset> {
        self.players
            .into_iter()
            .filter(|p| p.display_name().is_some() || p.overall.is_some())
            .map(RawAsset::Player)
            .chain(
                self.picks
                    .into_iter()
                    .filter(|p| !p.is_empty() || p.next_year)
                    .map(RawAsset::Pick),
            )
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProposalJson {
    team1: TeamAssets,
    team2: TeamAssets,
}

/// Splits a proposal with the model's help. The deterministic parser is used
/// when the client is disabled, the call fails, the reply is not JSON, or the
/// reply has no assets.
pub struct LlmProposalParser {
    client: Arc<LlmClient>,
}

impl LlmProposalParser {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }

    pub async fn parse(&self, text: &str) -> (ParsedTradeProposal, Vec<ValidationWarning>) {
        if !self.client.is_active() || text.trim().is_empty() {
            return parse_proposal(text);
        }
        match self.structured(text).await {
            Ok(proposal) if !proposal.is_empty() => {
                info!(assets = proposal.asset_count(), "proposal parsed by llm");
                (proposal, Vec::new())
            }
            Ok(_) => {
                warn!("llm parse found no assets, using text parser");
                parse_proposal(text)
            }
            Err(e) => {
                warn!(error = %e, "llm parse failed, using text parser");
                parse_proposal(text)
            }
        }
    }

    async fn structured(&self, text: &str) -> anyhow::Result<ParsedTradeProposal> {
        let cleaned = strip_markup(text);
        let request = MessageRequest::new(
            prompt::parser_system_prompt(),
            prompt::build_parser_prompt(&cleaned),
            PARSER_MAX_TOKENS,
        );
        let reply = self.client.complete(&request).await?;
        if reply.is_truncated() {
            anyhow::bail!("reply hit the {PARSER_MAX_TOKENS} token limit");
        }
        proposal_from_reply(&reply.text)
    }
}

/// Decode the model's JSON reply, tolerating code fences and chatter around
/// the object.
pub fn proposal_from_reply(reply: &str) -> anyhow::Result<ParsedTradeProposal> {
    let json = extract_json_object(reply).context("reply contains no JSON object")?;
    let parsed: ProposalJson = serde_json::from_str(json).context("reply JSON has the wrong shape")?;
    Ok(ParsedTradeProposal {
        side_a: parsed.team1.into_assets(),
        side_b: parsed.team2.into_assets(),
    })
}

/// The span from the first `{` to the last `}`.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
