//! Portfolio metrics aggregation.
//!
//! [`compute_metrics`] is a pure, single-pass projection: it never mutates
//! its input, never fails, and calling it twice with the same positions
//! yields identical output. Degenerate divisions (zero cost basis, zero
//! total value) are pinned to 0 rather than NaN or infinity.

use crate::position::Position;

/// A position enriched with the derived valuation fields.
///
/// Derived fields are ephemeral projections, recomputed on every
/// aggregation call — they are never a source of truth.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnrichedPosition {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub position: Position,
    /// `current_price * shares`
    pub current_value: f64,
    /// `cost_price * shares`
    pub cost_value: f64,
    /// `current_value - cost_value`
    pub profit_loss: f64,
    /// Percent gain over cost basis; 0 when the cost basis is 0.
    pub profit_loss_percent: f64,
    /// Percent of total portfolio value; 0 when the total is 0.
    pub current_allocation: f64,
}

/// Aggregate metrics over a list of positions.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioMetrics {
    pub total_value: f64,
    pub total_invested: f64,
    pub total_gain: f64,
    pub total_gain_percent: f64,
    pub stock_count: usize,
}

impl std::fmt::Display for PortfolioMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Portfolio Metrics")?;
        writeln!(f, "  Total value:     ${:>12.2}", self.total_value)?;
        writeln!(f, "  Total invested:  ${:>12.2}", self.total_invested)?;
        writeln!(
            f,
            "  Total gain:      ${:>12.2} ({:+.2}%)",
            self.total_gain, self.total_gain_percent
        )?;
        writeln!(f, "  Holdings:        {:>13}", self.stock_count)
    }
}

/// The aggregator output: the five headline metrics plus the input list
/// with derived per-position fields attached, in input order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioReport {
    pub metrics: PortfolioMetrics,
    pub positions: Vec<EnrichedPosition>,
}

/// Compute aggregate metrics and per-position allocation/gain fields.
///
/// Empty input yields all-zero aggregates and an empty enriched list.
/// Malformed numeric input (NaN, negative shares) is not validated here
/// and propagates through the arithmetic; validation belongs to the
/// boundary ([`Position::validate`]).
pub fn compute_metrics(positions: &[Position]) -> PortfolioReport {
    let total_value: f64 = positions.iter().map(Position::current_value).sum();
    let total_invested: f64 = positions.iter().map(Position::cost_value).sum();
    let total_gain = total_value - total_invested;
    let total_gain_percent = if total_invested > 0.0 {
        total_gain / total_invested * 100.0
    } else {
        0.0
    };

    let enriched = positions
        .iter()
        .map(|pos| {
            let current_value = pos.current_value();
            let cost_value = pos.cost_value();
            let profit_loss = current_value - cost_value;
            let profit_loss_percent = if cost_value > 0.0 {
                profit_loss / cost_value * 100.0
            } else {
                0.0
            };
            let current_allocation = if total_value > 0.0 {
                current_value / total_value * 100.0
            } else {
                0.0
            };

            EnrichedPosition {
                position: pos.clone(),
                current_value,
                cost_value,
                profit_loss,
                profit_loss_percent,
                current_allocation,
            }
        })
        .collect();

    PortfolioReport {
        metrics: PortfolioMetrics {
            total_value,
            total_invested,
            total_gain,
            total_gain_percent,
            stock_count: positions.len(),
        },
        positions: enriched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PositionId, Symbol};

    fn pos(id: u64, sym: &str, shares: f64, cost: f64, current: f64, target: f64) -> Position {
        Position::new(PositionId(id), Symbol::new(sym), shares, cost, current, target)
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let report = compute_metrics(&[]);
        assert_eq!(report.metrics, PortfolioMetrics::default());
        assert!(report.positions.is_empty());
    }

    #[test]
    fn single_position_example() {
        // 10 AAPL @ $100 cost, $150 current.
        let report = compute_metrics(&[pos(1, "AAPL", 10.0, 100.0, 150.0, 100.0)]);

        assert_eq!(report.metrics.total_value, 1500.0);
        assert_eq!(report.metrics.total_invested, 1000.0);
        assert_eq!(report.metrics.total_gain, 500.0);
        assert_eq!(report.metrics.total_gain_percent, 50.0);
        assert_eq!(report.metrics.stock_count, 1);

        let enriched = &report.positions[0];
        assert_eq!(enriched.current_value, 1500.0);
        assert_eq!(enriched.cost_value, 1000.0);
        assert_eq!(enriched.profit_loss, 500.0);
        assert_eq!(enriched.profit_loss_percent, 50.0);
        assert_eq!(enriched.current_allocation, 100.0);
    }

    #[test]
    fn allocations_sum_to_hundred() {
        let positions = vec![
            pos(1, "AAPL", 10.0, 90.0, 100.0, 70.0),
            pos(2, "MSFT", 10.0, 280.0, 300.0, 30.0),
            pos(3, "GLD", 5.0, 180.0, 200.0, 0.0),
        ];
        let report = compute_metrics(&positions);
        let sum: f64 = report.positions.iter().map(|p| p.current_allocation).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_cost_basis_pins_percent_to_zero() {
        // Free shares: profit exists, percent is pinned by convention.
        let report = compute_metrics(&[pos(1, "SPIN", 10.0, 0.0, 25.0, 0.0)]);
        let enriched = &report.positions[0];
        assert_eq!(enriched.profit_loss, 250.0);
        assert_eq!(enriched.profit_loss_percent, 0.0);
        assert_eq!(report.metrics.total_gain_percent, 0.0);
    }

    #[test]
    fn zero_total_value_pins_allocations() {
        let positions = vec![
            pos(1, "A", 10.0, 5.0, 0.0, 50.0),
            pos(2, "B", 10.0, 5.0, 0.0, 50.0),
        ];
        let report = compute_metrics(&positions);
        for p in &report.positions {
            assert_eq!(p.current_allocation, 0.0);
        }
        assert_eq!(report.metrics.total_value, 0.0);
        assert_eq!(report.metrics.total_gain, -100.0);
    }

    #[test]
    fn losses_are_negative() {
        let report = compute_metrics(&[pos(1, "DIP", 10.0, 100.0, 80.0, 100.0)]);
        assert_eq!(report.metrics.total_gain, -200.0);
        assert_eq!(report.metrics.total_gain_percent, -20.0);
        assert_eq!(report.positions[0].profit_loss_percent, -20.0);
    }

    #[test]
    fn idempotent_on_unchanged_input() {
        let positions = vec![
            pos(1, "AAPL", 10.0, 100.0, 150.0, 60.0),
            pos(2, "MSFT", 3.5, 250.0, 240.0, 40.0),
        ];
        let first = compute_metrics(&positions);
        // Re-aggregate the underlying positions from the enriched list.
        let underlying: Vec<_> = first.positions.iter().map(|e| e.position.clone()).collect();
        let second = compute_metrics(&underlying);
        assert_eq!(first, second);
    }

    #[test]
    fn output_preserves_input_order() {
        let positions = vec![
            pos(9, "ZZZ", 1.0, 1.0, 1.0, 0.0),
            pos(1, "AAA", 1.0, 1.0, 1.0, 0.0),
        ];
        let report = compute_metrics(&positions);
        assert_eq!(report.positions[0].position.symbol, Symbol::new("ZZZ"));
        assert_eq!(report.positions[1].position.symbol, Symbol::new("AAA"));
    }

    #[test]
    fn display_format() {
        let report = compute_metrics(&[pos(1, "AAPL", 10.0, 100.0, 150.0, 100.0)]);
        let s = format!("{}", report.metrics);
        assert!(s.contains("Total value:"));
        assert!(s.contains("+50.00%"));
    }
}
