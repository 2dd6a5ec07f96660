//! Quote provider trait and implementations for folio.
//!
//! Provides a generic `QuoteProvider` trait that abstracts over market data
//! sources. Implementations:
//!
//! - **Finnhub** (feature `finnhub`): Finnhub stock REST API
//! - **FixedQuotes**: in-memory provider for tests and offline use

pub mod error;
pub mod mock;
pub mod types;

#[cfg(feature = "finnhub")]
pub mod finnhub;

pub use error::QuoteError;
pub use mock::FixedQuotes;
pub use types::*;

use folio::Symbol;

/// A market data source that can quote symbols and look up companies.
pub trait QuoteProvider {
    /// Get the current quote for a symbol.
    fn quote(&self, symbol: &Symbol) -> Result<Quote, QuoteError>;

    /// Get the company profile for a symbol.
    fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile, QuoteError>;

    /// Quote the market overview tickers. Per-ticker failures are skipped
    /// rather than failing the whole overview.
    fn market_overview(&self) -> Vec<(MarketIndex, Quote)> {
        MARKET_INDICES
            .iter()
            .filter_map(|idx| {
                self.quote(&Symbol::new(idx.symbol))
                    .ok()
                    .map(|q| (*idx, q))
            })
            .collect()
    }
}

/// Refresh each position's `current_price` from the provider, in place.
///
/// Symbols the provider fails on keep their last known price. Returns how
/// many positions were updated.
pub fn refresh_prices<P: QuoteProvider + ?Sized>(
    provider: &P,
    positions: &mut [folio::Position],
) -> usize {
    let mut updated = 0;
    for pos in positions {
        if let Ok(quote) = provider.quote(&pos.symbol) {
            pos.current_price = quote.current;
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{Position, PositionId};

    #[test]
    fn refresh_updates_known_symbols_only() {
        let provider = FixedQuotes::builder()
            .with_price(Symbol::new("AAPL"), 155.0)
            .build();

        let mut positions = vec![
            Position::new(PositionId(1), Symbol::new("AAPL"), 10.0, 100.0, 150.0, 50.0),
            Position::new(PositionId(2), Symbol::new("MSFT"), 5.0, 300.0, 270.0, 50.0),
        ];

        assert_eq!(refresh_prices(&provider, &mut positions), 1);
        assert_eq!(positions[0].current_price, 155.0);
        assert_eq!(positions[1].current_price, 270.0);
    }

    #[test]
    fn refresh_with_failing_provider_changes_nothing() {
        let provider = FixedQuotes::builder().fail_all().build();
        let mut positions = vec![Position::new(
            PositionId(1),
            Symbol::new("AAPL"),
            10.0,
            100.0,
            150.0,
            50.0,
        )];

        assert_eq!(refresh_prices(&provider, &mut positions), 0);
        assert_eq!(positions[0].current_price, 150.0);
    }
}
