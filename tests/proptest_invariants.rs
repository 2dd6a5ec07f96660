//! Property-based tests for calculator invariants.
//!
//! These tests use proptest to verify that key invariants hold
//! across randomly generated portfolios.

use folio::{Position, PositionId, Symbol, compute_metrics, compute_rebalance};
use proptest::prelude::*;
use rustc_hash::FxHashMap;

/// Generate a valid share count (positive, fractional allowed)
fn shares_strategy() -> impl Strategy<Value = f64> {
    0.01f64..10_000.0
}

/// Generate a valid price (non-negative, reasonable range)
fn price_strategy() -> impl Strategy<Value = f64> {
    0.0f64..100_000.0
}

/// Generate a target allocation in percent
fn allocation_strategy() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

/// Generate a portfolio of 1 to 30 positions
fn portfolio_strategy() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec(
        (
            shares_strategy(),
            price_strategy(),
            price_strategy(),
            allocation_strategy(),
        ),
        1..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (shares, cost, current, target))| {
                Position::new(
                    PositionId(i as u64 + 1),
                    Symbol::new(&format!("S{i:03}")),
                    shares,
                    cost,
                    current,
                    target,
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // ========================================================================
    // METRICS INVARIANTS
    // ========================================================================

    /// Allocations sum to ~100% whenever the portfolio has any value,
    /// and are all exactly 0 otherwise.
    #[test]
    fn allocations_sum_to_hundred_or_zero(positions in portfolio_strategy()) {
        let report = compute_metrics(&positions);
        let sum: f64 = report.positions.iter().map(|p| p.current_allocation).sum();

        if report.metrics.total_value > 0.0 {
            prop_assert!((sum - 100.0).abs() < 1e-6, "allocation sum {} != 100", sum);
        } else {
            prop_assert_eq!(sum, 0.0);
        }
    }

    /// total_gain is exactly total_value - total_invested, and the
    /// per-position profits sum to it.
    #[test]
    fn gain_identity(positions in portfolio_strategy()) {
        let report = compute_metrics(&positions);
        let m = &report.metrics;

        prop_assert_eq!(m.total_gain, m.total_value - m.total_invested);

        let per_position: f64 = report.positions.iter().map(|p| p.profit_loss).sum();
        let tolerance = 1e-9 * m.total_value.abs().max(1.0);
        prop_assert!((per_position - m.total_gain).abs() < tolerance);
    }

    /// Aggregation never panics and never produces NaN or infinity from
    /// valid input, even with zero prices.
    #[test]
    fn metrics_are_finite(positions in portfolio_strategy()) {
        let report = compute_metrics(&positions);
        prop_assert!(report.metrics.total_gain_percent.is_finite());
        for p in &report.positions {
            prop_assert!(p.profit_loss_percent.is_finite());
            prop_assert!(p.current_allocation.is_finite());
        }
    }

    /// Aggregating twice over unchanged input yields identical output.
    #[test]
    fn metrics_idempotent(positions in portfolio_strategy()) {
        let first = compute_metrics(&positions);
        let second = compute_metrics(&positions);
        prop_assert_eq!(first, second);
    }

    // ========================================================================
    // SOLVER INVARIANTS
    // ========================================================================

    /// The solver emits one result per input position, in input order,
    /// and never mutates its input.
    #[test]
    fn solver_shape_and_purity(positions in portfolio_strategy()) {
        let before = positions.clone();
        let results = compute_rebalance(&positions, &FxHashMap::default());

        prop_assert_eq!(results.len(), positions.len());
        for (pos, result) in positions.iter().zip(&results) {
            prop_assert_eq!(result.id, pos.id);
            prop_assert_eq!(result.symbol, pos.symbol);
        }
        prop_assert_eq!(positions, before);
    }

    /// Every solver output is finite: zero trade prices must not leak
    /// infinity or NaN into the results.
    #[test]
    fn solver_outputs_are_finite(positions in portfolio_strategy()) {
        for r in compute_rebalance(&positions, &FxHashMap::default()) {
            prop_assert!(r.share_change.is_finite());
            prop_assert!(r.new_shares.is_finite());
            prop_assert!(r.avg_cost.is_finite());
        }
    }

    /// Selling (or holding) never changes the cost basis; buying blends it
    /// between the old basis and the trade price.
    #[test]
    fn cost_basis_bounds(positions in portfolio_strategy()) {
        let results = compute_rebalance(&positions, &FxHashMap::default());

        for (pos, r) in positions.iter().zip(&results) {
            if r.share_change <= 0.0 {
                // A tiny buy that rounds to a 0.00 share change can still
                // nudge the blended cost by a cent, hence the tolerance.
                let expected = (pos.cost_price * 100.0).round() / 100.0;
                prop_assert!((r.avg_cost - expected).abs() <= 0.01,
                    "sell changed cost basis: {} vs {}", r.avg_cost, expected);
            } else {
                let lo = pos.cost_price.min(pos.current_price) - 0.01;
                let hi = pos.cost_price.max(pos.current_price) + 0.01;
                prop_assert!(r.avg_cost >= lo && r.avg_cost <= hi,
                    "blended cost {} outside [{}, {}]", r.avg_cost, lo, hi);
            }
        }
    }

    /// All result fields are rounded to 2 decimal places.
    #[test]
    fn solver_results_are_rounded(positions in portfolio_strategy()) {
        for r in compute_rebalance(&positions, &FxHashMap::default()) {
            prop_assert_eq!(r.share_change, (r.share_change * 100.0).round() / 100.0);
            prop_assert_eq!(r.new_shares, (r.new_shares * 100.0).round() / 100.0);
            prop_assert_eq!(r.avg_cost, (r.avg_cost * 100.0).round() / 100.0);
        }
    }
}
