//! Shared market data types: quotes, company profiles, index tickers.

use folio::Symbol;

/// A point-in-time quote for one symbol. All prices in the listing currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: Symbol,
    /// Last traded price.
    pub current: f64,
    /// Absolute change since the previous close.
    pub change: f64,
    /// Percent change since the previous close.
    pub percent_change: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
}

/// Descriptive company data for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub symbol: Symbol,
    pub name: String,
    pub exchange: String,
    pub currency: String,
    pub industry: String,
    /// Market capitalization in millions of the listing currency.
    pub market_cap: f64,
}

/// A broad-market ticker shown alongside portfolio data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketIndex {
    pub symbol: &'static str,
    pub label: &'static str,
}

/// The market overview tickers, quoted via their ETF proxies.
pub const MARKET_INDICES: [MarketIndex; 4] = [
    MarketIndex { symbol: "SPY", label: "S&P 500" },
    MarketIndex { symbol: "QQQ", label: "NASDAQ" },
    MarketIndex { symbol: "TSLA", label: "Tesla" },
    MarketIndex { symbol: "GLD", label: "Gold" },
];
