//! Quote provider error types.

/// Errors that can occur while fetching market data.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("{0}")]
    Other(String),
}
