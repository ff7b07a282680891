// Player attribute lookup backed by the Claude API.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use huddle_core::{DevTrait, PlayerAttributes, PlayerLookup, Position};

use crate::client::{LlmClient, MessageRequest};
use crate::prompt;

pub const DEFAULT_LOOKUP_MAX_TOKENS: u32 = 150;
const SOURCE: &str = "claude";

/// Asks the model for a player's ratings. A disabled client knows nothing.
pub struct LlmLookup {
    client: Arc<LlmClient>,
    max_tokens: u32,
}

impl LlmLookup {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_LOOKUP_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn request(&self, name: &str) -> MessageRequest {
        MessageRequest::new(
            prompt::lookup_system_prompt(),
            prompt::build_lookup_prompt(name),
            self.max_tokens,
        )
    }
}

#[async_trait]
impl PlayerLookup for LlmLookup {
    async fn lookup_player_attributes(
        &self,
        name: &str,
    ) -> anyhow::Result<Option<PlayerAttributes>> {
        if !self.client.is_active() {
            return Ok(None);
        }
        let reply = self.client.complete(&self.request(name)).await?;
        let attrs = parse_rating_reply(&reply.text);
        debug!(name, found = attrs.is_some(), "llm lookup reply parsed");
        Ok(attrs)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}

/// Read `Overall:` / `Age:` / `Position:` / `Dev Trait:` lines. Keys are
/// case-insensitive, the colon is optional, and unreadable values are
/// skipped. `None` when no field could be read.
pub fn parse_rating_reply(reply: &str) -> Option<PlayerAttributes> {
    let mut attrs = PlayerAttributes {
        source: SOURCE.to_string(),
        ..PlayerAttributes::default()
    };

    for line in reply.lines() {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        let lower = line.to_lowercase();
        if let Some(rest) = value_after(&lower, &["overall rating", "overall", "ovr"]) {
            attrs.overall = attrs.overall.or_else(|| leading_number(rest));
        } else if let Some(rest) = value_after(&lower, &["age"]) {
            attrs.age = attrs.age.or_else(|| leading_number(rest));
        } else if let Some(rest) = value_after(&lower, &["position", "pos"]) {
            attrs.position = attrs.position.or_else(|| Position::from_alias(rest));
        } else if let Some(rest) =
            value_after(&lower, &["dev trait", "development trait", "dev"])
        {
            attrs.dev_trait = attrs.dev_trait.or_else(|| DevTrait::from_alias(rest));
        }
    }

    (!attrs.is_empty()).then_some(attrs)
}

/// The value part of `key: value` for the first key `line` starts with.
fn value_after<'a>(line: &'a str, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        let rest = line.strip_prefix(key)?;
        // "overall" must not match "overalls", "age" must not match "agent".
        if rest.starts_with(|c: char| c.is_alphanumeric()) {
            return None;
        }
        Some(rest.trim_start_matches([':', ' ', '\t', '=']).trim())
    })
}

fn leading_number(s: &str) -> Option<i64> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
