// Fatal trade evaluation errors. Everything recoverable is a
// `ValidationWarning` instead.

use thiserror::Error;

use crate::validate::ValidationWarning;

#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    /// Neither side yielded a single asset. Carries the dropped-fragment
    /// warnings so the caller can show what could not be read.
    #[error("no valid assets found on either side of the trade")]
    NoValidAssets { warnings: Vec<ValidationWarning> },

    #[error("trade proposal is empty")]
    EmptyProposal,
}
