//! Mutable portfolio state: positions, groups, and persistence.
//!
//! [`Portfolio`] is the aggregate the calculators operate on. It owns the
//! position list and sub-portfolio groups, validates input at the boundary,
//! and hands out slices to the pure functions in [`crate::metrics`] and
//! [`crate::rebalance`].

use rustc_hash::FxHashMap;

use crate::error::ValidationError;
use crate::metrics::{PortfolioReport, compute_metrics};
use crate::position::{self, Position};
use crate::rebalance::{RebalanceResult, apply_rebalance, compute_rebalance};
use crate::subportfolio::{self, SubPortfolio};
use crate::types::{PositionId, SubPortfolioId, Symbol};

/// The positions and groups of one user's portfolio.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    positions: Vec<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    sub_portfolios: Vec<SubPortfolio>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn sub_portfolios(&self) -> &[SubPortfolio] {
        &self.sub_portfolios
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn find_symbol(&self, symbol: Symbol) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Add a validated position under a freshly assigned id.
    pub fn add(
        &mut self,
        symbol: Symbol,
        shares: f64,
        cost_price: f64,
        current_price: f64,
        target_allocation: f64,
    ) -> Result<PositionId, ValidationError> {
        let id = position::next_id(&self.positions);
        let pos = Position::new(id, symbol, shares, cost_price, current_price, target_allocation);
        pos.validate()?;
        self.positions.push(pos);
        Ok(id)
    }

    /// Insert an already-built position after validating it.
    pub fn insert(&mut self, position: Position) -> Result<(), ValidationError> {
        position.validate()?;
        self.positions.push(position);
        Ok(())
    }

    /// Remove a position; returns it if it existed.
    pub fn remove(&mut self, id: PositionId) -> Option<Position> {
        let idx = self.positions.iter().position(|p| p.id == id)?;
        Some(self.positions.remove(idx))
    }

    /// Replace a position's fields in place after validating the result.
    pub fn update(&mut self, updated: Position) -> Result<(), ValidationError> {
        updated.validate()?;
        let pos = self
            .positions
            .iter_mut()
            .find(|p| p.id == updated.id)
            .ok_or(ValidationError::UnknownPosition(updated.id))?;
        *pos = updated;
        Ok(())
    }

    /// Refresh current prices from a symbol -> price map.
    ///
    /// Symbols absent from the map keep their last known price. Returns how
    /// many positions were updated.
    pub fn set_prices(&mut self, prices: &FxHashMap<Symbol, f64>) -> usize {
        let mut updated = 0;
        for pos in &mut self.positions {
            if let Some(&price) = prices.get(&pos.symbol) {
                pos.current_price = price;
                updated += 1;
            }
        }
        updated
    }

    /// Create a named sub-portfolio group.
    pub fn add_group(
        &mut self,
        name: &str,
        description: Option<&str>,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> SubPortfolioId {
        let id = subportfolio::next_id(&self.sub_portfolios);
        let mut group = SubPortfolio::new(id, name, created_at);
        if let Some(desc) = description {
            group = group.with_description(desc);
        }
        self.sub_portfolios.push(group);
        id
    }

    /// Remove a group; member positions are detached, not deleted.
    pub fn remove_group(&mut self, id: SubPortfolioId) -> Option<SubPortfolio> {
        let idx = self.sub_portfolios.iter().position(|g| g.id == id)?;
        for pos in &mut self.positions {
            if pos.portfolio_id == Some(id) {
                pos.portfolio_id = None;
            }
        }
        Some(self.sub_portfolios.remove(idx))
    }

    /// Assign a position to a group (or detach with `None`).
    pub fn assign_group(
        &mut self,
        position: PositionId,
        group: Option<SubPortfolioId>,
    ) -> Result<(), ValidationError> {
        let pos = self
            .positions
            .iter_mut()
            .find(|p| p.id == position)
            .ok_or(ValidationError::UnknownPosition(position))?;
        pos.portfolio_id = group;
        Ok(())
    }

    /// Aggregate metrics over the whole portfolio.
    pub fn report(&self) -> PortfolioReport {
        compute_metrics(&self.positions)
    }

    /// Aggregate metrics over one group's slice.
    pub fn group_report(&self, id: SubPortfolioId) -> PortfolioReport {
        subportfolio::group_report(&self.positions, id)
    }

    /// Propose trades toward target allocations. Read-only.
    pub fn rebalance(
        &self,
        override_prices: &FxHashMap<PositionId, f64>,
    ) -> Vec<RebalanceResult> {
        compute_rebalance(&self.positions, override_prices)
    }

    /// Commit an accepted rebalance proposal.
    pub fn apply(&mut self, results: &[RebalanceResult]) -> Result<(), ValidationError> {
        apply_rebalance(&mut self.positions, results)
    }

    // === Persistence ===

    /// Save the portfolio to a JSON file.
    #[cfg(feature = "persistence")]
    pub fn save_json(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load a portfolio from a JSON file.
    #[cfg(feature = "persistence")]
    pub fn load_json(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Where a portfolio is persisted between runs.
///
/// Hosts pick the backing: [`MemoryStore`] for tests and embedded use,
/// [`JsonStore`] for a file on disk.
pub trait PortfolioStore {
    fn load(&self) -> std::io::Result<Portfolio>;
    fn save(&self, portfolio: &Portfolio) -> std::io::Result<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<Portfolio>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortfolioStore for MemoryStore {
    fn load(&self) -> std::io::Result<Portfolio> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("portfolio store lock poisoned"))?;
        Ok(inner.clone())
    }

    fn save(&self, portfolio: &Portfolio) -> std::io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| std::io::Error::other("portfolio store lock poisoned"))?;
        *inner = portfolio.clone();
        Ok(())
    }
}

/// File-backed store: one pretty-printed JSON document per portfolio.
///
/// Loading a path that does not exist yet yields an empty portfolio, so
/// fresh hosts work without a setup step.
#[cfg(feature = "persistence")]
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: std::path::PathBuf,
}

#[cfg(feature = "persistence")]
impl JsonStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(feature = "persistence")]
impl PortfolioStore for JsonStore {
    fn load(&self) -> std::io::Result<Portfolio> {
        if !self.path.exists() {
            return Ok(Portfolio::new());
        }
        Portfolio::load_json(&self.path)
    }

    fn save(&self, portfolio: &Portfolio) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        portfolio.save_json(&self.path)
    }
}
