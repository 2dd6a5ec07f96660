//! Fixed quote provider for testing — implements `QuoteProvider` from an
//! in-memory table, no network calls.
//!
//! ```
//! use folio_quotes::{FixedQuotes, QuoteProvider};
//! use folio::Symbol;
//!
//! let provider = FixedQuotes::builder()
//!     .with_price(Symbol::new("AAPL"), 150.0)
//!     .build();
//!
//! let quote = provider.quote(&Symbol::new("AAPL")).unwrap();
//! assert_eq!(quote.current, 150.0);
//! ```

use folio::Symbol;

use crate::QuoteProvider;
use crate::error::QuoteError;
use crate::types::{CompanyProfile, Quote};

/// Builder for `FixedQuotes`.
pub struct FixedQuotesBuilder {
    quotes: Vec<(Symbol, Quote)>,
    profiles: Vec<(Symbol, CompanyProfile)>,
    fail_all: bool,
}

impl FixedQuotesBuilder {
    /// Add a flat quote: current price only, no intraday movement.
    pub fn with_price(mut self, symbol: Symbol, price: f64) -> Self {
        self.quotes.push((
            symbol,
            Quote {
                symbol,
                current: price,
                change: 0.0,
                percent_change: 0.0,
                high: price,
                low: price,
                open: price,
                previous_close: price,
            },
        ));
        self
    }

    /// Add a fully specified quote.
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.push((quote.symbol, quote));
        self
    }

    pub fn with_profile(mut self, profile: CompanyProfile) -> Self {
        self.profiles.push((profile.symbol, profile));
        self
    }

    /// Make every lookup fail with a connection error.
    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn build(self) -> FixedQuotes {
        FixedQuotes {
            quotes: self.quotes,
            profiles: self.profiles,
            fail_all: self.fail_all,
        }
    }
}

/// A quote provider backed by a fixed in-memory table.
pub struct FixedQuotes {
    quotes: Vec<(Symbol, Quote)>,
    profiles: Vec<(Symbol, CompanyProfile)>,
    fail_all: bool,
}

impl FixedQuotes {
    pub fn builder() -> FixedQuotesBuilder {
        FixedQuotesBuilder {
            quotes: Vec::new(),
            profiles: Vec::new(),
            fail_all: false,
        }
    }
}

impl QuoteProvider for FixedQuotes {
    fn quote(&self, symbol: &Symbol) -> Result<Quote, QuoteError> {
        if self.fail_all {
            return Err(QuoteError::Connection("fixed: failing all lookups".into()));
        }
        self.quotes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, q)| q.clone())
            .ok_or_else(|| QuoteError::UnknownSymbol(symbol.as_str().to_string()))
    }

    fn profile(&self, symbol: &Symbol) -> Result<CompanyProfile, QuoteError> {
        if self.fail_all {
            return Err(QuoteError::Connection("fixed: failing all lookups".into()));
        }
        self.profiles
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| QuoteError::UnknownSymbol(symbol.as_str().to_string()))
    }
}
