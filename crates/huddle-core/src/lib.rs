// Library root for the trade-value core: value model, proposal parsing,
// validation, and trade evaluation. No network or file access lives here.

pub mod calculator;
pub mod error;
pub mod evaluate;
pub mod lookup;
pub mod parse;
pub mod pick;
pub mod player;
pub mod proposal;
pub mod validate;
pub mod valuation;

pub use calculator::{AssetQuote, TradeCalculator, TradeInput};
pub use error::TradeError;
pub use evaluate::{AssetKind, Fairness, FairnessPolicy, PricedAsset, SideSummary, TradeVerdict};
pub use lookup::{LookupChain, NullLookup, PlayerAttributes, PlayerLookup};
pub use pick::{DraftPick, Season};
pub use player::{DevTrait, Player, Position};
pub use proposal::{ParsedTradeProposal, RawAsset, RawPick, RawPlayer, Side};
pub use validate::{Field, PlayerDefaults, Validated, ValidationWarning, Validator};
pub use valuation::{ValueModel, ValueTables};
