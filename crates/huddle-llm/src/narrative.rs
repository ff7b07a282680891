// Short written analysis of an imbalanced trade.

use std::sync::Arc;
use tracing::{debug, warn};

use huddle_core::{Fairness, TradeVerdict};

use crate::client::{LlmClient, MessageRequest};
use crate::prompt;

pub const DEFAULT_NARRATIVE_MAX_TOKENS: u32 = 300;

pub struct TradeNarrator {
    client: Arc<LlmClient>,
    max_tokens: u32,
}

impl TradeNarrator {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_NARRATIVE_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Two or three sentences on why the trade is off. `None` for fair
    /// trades, a disabled client, or any API failure.
    pub async fn narrate(&self, verdict: &TradeVerdict) -> Option<String> {
        if verdict.fairness == Fairness::Fair || !self.client.is_active() {
            return None;
        }
        let request = MessageRequest::new(
            prompt::narrative_system_prompt(),
            prompt::build_narrative_prompt(verdict),
            self.max_tokens,
        );
        match self.client.complete(&request).await {
            Ok(reply) if !reply.text.trim().is_empty() => {
                debug!(chars = reply.text.len(), "trade narrative received");
                Some(reply.text.trim().to_string())
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "trade narrative unavailable");
                None
            }
        }
    }
}
