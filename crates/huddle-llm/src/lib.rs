// Claude-backed collaborators for the trade calculator: attribute lookup,
// structured proposal parsing, and trade narratives. All of them degrade to
// "no answer" when the API is unavailable.

pub mod client;
pub mod lookup;
pub mod narrative;
pub mod parser;
pub mod prompt;

pub use client::{ClaudeClient, Completion, LlmClient, LlmError, MessageRequest};
pub use lookup::LlmLookup;
pub use narrative::TradeNarrator;
pub use parser::LlmProposalParser;
