//! Error types for boundary validation and the share store.

use crate::types::{PositionId, Symbol};

/// Rejections raised when position input is validated at the boundary.
///
/// The calculators themselves never validate — garbage in, garbage out,
/// deterministically. Hosts call [`crate::Position::validate`] (or
/// [`crate::apply_rebalance`]) before committing state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("shares must be a positive number, got {0}")]
    NonPositiveShares(f64),

    #[error("cost price must be non-negative, got {0}")]
    NegativeCostPrice(f64),

    #[error("current price must be non-negative, got {0}")]
    NegativeCurrentPrice(f64),

    #[error("target allocation must be within [0, 100], got {0}")]
    AllocationOutOfRange(f64),

    #[error("numeric field is not finite")]
    NotFinite,

    #[error("rebalance would leave {symbol} with {new_shares} shares (over-sell)")]
    OverSell { symbol: Symbol, new_shares: f64 },

    #[error("rebalance result references unknown position {0}")]
    UnknownPosition(PositionId),
}

/// Errors from the share-link store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShareError {
    #[error("no shared portfolio with id '{0}'")]
    NotFound(String),

    #[error("share link '{0}' has expired")]
    Expired(String),

    #[error("comparison needs at least 2 portfolios, got {0}")]
    TooFewPortfolios(usize),
}
