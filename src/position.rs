//! A held stock lot and its boundary validation.

use crate::error::ValidationError;
use crate::types::{PositionId, SubPortfolioId, Symbol};

/// One held stock lot.
///
/// `current_price` is refreshed by the host from a quote provider; this
/// module never fetches prices. `shares` is a positive real number —
/// fractional shares are allowed. All arithmetic is `f64`; display layers
/// are expected to round to 2 decimal places.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Assigned at creation, immutable thereafter.
    pub id: PositionId,
    pub symbol: Symbol,
    /// Display name; defaults to the symbol when unknown.
    pub name: String,
    /// Quantity held. Fractional shares allowed.
    pub shares: f64,
    /// Average cost basis per share at acquisition.
    pub cost_price: f64,
    /// Latest known market price per share.
    pub current_price: f64,
    /// Desired percentage (0-100) of total portfolio value.
    pub target_allocation: f64,
    /// Optional grouping. Has no effect on the math, which always operates
    /// over whatever slice of positions is passed in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub portfolio_id: Option<SubPortfolioId>,
}

impl Position {
    /// Create a position; the display name defaults to the symbol.
    pub fn new(
        id: PositionId,
        symbol: Symbol,
        shares: f64,
        cost_price: f64,
        current_price: f64,
        target_allocation: f64,
    ) -> Self {
        Self {
            id,
            symbol,
            name: symbol.as_str().to_string(),
            shares,
            cost_price,
            current_price,
            target_allocation,
            portfolio_id: None,
        }
    }

    /// Builder-style display name override.
    pub fn with_name(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.name = name.to_string();
        }
        self
    }

    /// Builder-style sub-portfolio association.
    pub fn in_portfolio(mut self, portfolio_id: SubPortfolioId) -> Self {
        self.portfolio_id = Some(portfolio_id);
        self
    }

    /// Market value at the latest known price.
    #[inline]
    pub fn current_value(&self) -> f64 {
        self.current_price * self.shares
    }

    /// Total cost basis of the lot.
    #[inline]
    pub fn cost_value(&self) -> f64 {
        self.cost_price * self.shares
    }

    /// Unrealized gain (positive) or loss (negative).
    #[inline]
    pub fn profit_loss(&self) -> f64 {
        self.current_value() - self.cost_value()
    }

    /// Boundary validation for host input.
    ///
    /// The aggregator and solver stay pure and do not validate; hosts are
    /// expected to call this before persisting a new or edited position.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        for v in [
            self.shares,
            self.cost_price,
            self.current_price,
            self.target_allocation,
        ] {
            if !v.is_finite() {
                return Err(ValidationError::NotFinite);
            }
        }
        if self.shares <= 0.0 {
            return Err(ValidationError::NonPositiveShares(self.shares));
        }
        if self.cost_price < 0.0 {
            return Err(ValidationError::NegativeCostPrice(self.cost_price));
        }
        if self.current_price < 0.0 {
            return Err(ValidationError::NegativeCurrentPrice(self.current_price));
        }
        if !(0.0..=100.0).contains(&self.target_allocation) {
            return Err(ValidationError::AllocationOutOfRange(
                self.target_allocation,
            ));
        }
        Ok(())
    }
}

/// Next free position id given the existing positions.
pub fn next_id(positions: &[Position]) -> PositionId {
    PositionId(positions.iter().map(|p| p.id.0).max().map_or(1, |m| m + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aapl() -> Position {
        Position::new(PositionId(1), Symbol::new("AAPL"), 10.0, 100.0, 150.0, 50.0)
    }

    #[test]
    fn derived_values() {
        let pos = aapl();
        assert_eq!(pos.current_value(), 1500.0);
        assert_eq!(pos.cost_value(), 1000.0);
        assert_eq!(pos.profit_loss(), 500.0);
    }

    #[test]
    fn name_defaults_to_symbol() {
        assert_eq!(aapl().name, "AAPL");
        assert_eq!(aapl().with_name("Apple Inc").name, "Apple Inc");
        assert_eq!(aapl().with_name("").name, "AAPL");
    }

    #[test]
    fn fractional_shares_allowed() {
        let pos = Position::new(PositionId(1), Symbol::new("VOO"), 2.5, 400.0, 410.0, 100.0);
        assert!(pos.validate().is_ok());
        assert_eq!(pos.current_value(), 1025.0);
    }

    #[test]
    fn validate_rejects_bad_input() {
        let mut pos = aapl();
        pos.shares = 0.0;
        assert_eq!(
            pos.validate(),
            Err(ValidationError::NonPositiveShares(0.0))
        );

        let mut pos = aapl();
        pos.cost_price = -1.0;
        assert!(matches!(
            pos.validate(),
            Err(ValidationError::NegativeCostPrice(_))
        ));

        let mut pos = aapl();
        pos.target_allocation = 130.0;
        assert!(matches!(
            pos.validate(),
            Err(ValidationError::AllocationOutOfRange(_))
        ));

        let mut pos = aapl();
        pos.current_price = f64::NAN;
        assert_eq!(pos.validate(), Err(ValidationError::NotFinite));

        let pos = Position::new(PositionId(1), Symbol::new(""), 1.0, 1.0, 1.0, 1.0);
        assert_eq!(pos.validate(), Err(ValidationError::EmptySymbol));
    }

    #[test]
    fn next_id_increments_past_max() {
        assert_eq!(next_id(&[]), PositionId(1));

        let positions = vec![
            Position::new(PositionId(3), Symbol::new("A"), 1.0, 1.0, 1.0, 0.0),
            Position::new(PositionId(7), Symbol::new("B"), 1.0, 1.0, 1.0, 0.0),
        ];
        assert_eq!(next_id(&positions), PositionId(8));
    }
}
