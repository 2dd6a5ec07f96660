//! # folio
//!
//! Portfolio metrics, allocation, and rebalancing calculations for personal
//! investment tracking.
//!
//! ## Features
//!
//! - **Metrics aggregation**: total value, invested, gain, and per-position
//!   allocation in one pass
//! - **Rebalance solver**: share deltas toward target allocations, with
//!   optional per-position trade price overrides
//! - **Sub-portfolios**: named groupings with group-relative metrics
//! - **Share snapshots**: immutable read-only copies with expiry, and
//!   side-by-side comparison of two or more snapshots
//! - **Deterministic**: pure functions over `f64`, no clocks or I/O in the
//!   calculators; time is always passed in
//!
//! ## Quick Start
//!
//! ```
//! use folio::{Position, PositionId, Symbol, compute_metrics};
//!
//! // 10 shares of AAPL bought at $100, now trading at $150.
//! let positions = vec![Position::new(
//!     PositionId(1),
//!     Symbol::new("AAPL"),
//!     10.0,
//!     100.0,
//!     150.0,
//!     100.0,
//! )];
//!
//! let report = compute_metrics(&positions);
//! assert_eq!(report.metrics.total_value, 1500.0);
//! assert_eq!(report.metrics.total_gain, 500.0);
//! assert_eq!(report.metrics.total_gain_percent, 50.0);
//! assert_eq!(report.positions[0].current_allocation, 100.0);
//! ```
//!
//! ## Rebalancing
//!
//! The solver proposes trades; nothing moves until the caller applies them:
//!
//! ```
//! use folio::{Position, PositionId, Symbol, apply_rebalance, compute_rebalance};
//! use rustc_hash::FxHashMap;
//!
//! let mut positions = vec![
//!     Position::new(PositionId(1), Symbol::new("VTI"), 10.0, 100.0, 100.0, 70.0),
//!     Position::new(PositionId(2), Symbol::new("BND"), 10.0, 100.0, 100.0, 30.0),
//! ];
//!
//! let proposal = compute_rebalance(&positions, &FxHashMap::default());
//! assert_eq!(proposal[0].share_change, 4.0);   // buy 4 VTI
//! assert_eq!(proposal[1].share_change, -4.0);  // sell 4 BND
//!
//! apply_rebalance(&mut positions, &proposal).unwrap();
//! assert_eq!(positions[0].shares, 14.0);
//! ```
//!
//! ## Degenerate input
//!
//! Divisions that would produce NaN or infinity are pinned to zero: a zero
//! cost basis yields a 0% gain, a zero-value portfolio yields 0%
//! allocations, and a zero trade price yields no trade.
//!
//! ## Feature flags
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `serde` | `Serialize`/`Deserialize` on all public types |
//! | `persistence` | JSON save/load on [`Portfolio`] (implies `serde`) |

mod error;
mod metrics;
mod position;
mod rebalance;
pub mod share;
mod store;
pub mod subportfolio;
mod types;

// Re-export public API
pub use error::{ShareError, ValidationError};
pub use metrics::{EnrichedPosition, PortfolioMetrics, PortfolioReport, compute_metrics};
pub use position::{Position, next_id};
pub use rebalance::{RebalanceResult, apply_rebalance, compute_rebalance};
pub use share::{
    AllocationEntry, AllocationRow, ComparedPortfolio, Expiry, Performer, PerformanceSummary,
    PortfolioComparison, ShareId, ShareStore, SharedPortfolio,
};
#[cfg(feature = "persistence")]
pub use store::JsonStore;
pub use store::{MemoryStore, Portfolio, PortfolioStore};
pub use subportfolio::SubPortfolio;
pub use types::{PositionId, SubPortfolioId, Symbol};
