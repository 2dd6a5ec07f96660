//! Rebalance solver: share deltas to move each position to its target weight.
//!
//! [`compute_rebalance`] produces a *proposal*, not a transaction. The
//! solver never mutates its input; callers commit accepted proposals with
//! [`apply_rebalance`], which overwrites `shares` and `cost_price` on the
//! matching positions and rejects over-sells.

use rustc_hash::FxHashMap;

use crate::error::ValidationError;
use crate::position::Position;
use crate::types::{PositionId, Symbol};

/// One proposed trade, per input position, in input order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceResult {
    pub id: PositionId,
    pub symbol: Symbol,
    pub name: String,
    /// Signed shares to buy (+) or sell (-). Rounded to 2 decimals.
    pub share_change: f64,
    /// `shares + share_change`, rounded to 2 decimals. May be negative when
    /// the target implies selling more than is held; [`apply_rebalance`]
    /// rejects that, but the solver reports it as computed.
    pub new_shares: f64,
    /// Blended average cost basis after the trade, rounded to 2 decimals.
    pub avg_cost: f64,
    /// Echo of the target allocation used, not a measured post-trade value.
    pub new_allocation: f64,
}

/// Display-grade rounding for result records. Not used for chained math.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute the trades that would move each position to its target weight.
///
/// `override_prices` maps position ids to the price at which the
/// hypothetical trade executes. The portfolio's total value and each
/// position's current value always use `current_price` — the override only
/// affects how a value difference converts to shares and the blended cost.
///
/// Guards: a trade price of zero yields `share_change = 0` (no trade)
/// instead of infinity. Selling never changes the average cost basis of the
/// remaining shares (standard average-cost accounting); a full sell retains
/// the prior `cost_price` rather than producing NaN.
pub fn compute_rebalance(
    positions: &[Position],
    override_prices: &FxHashMap<PositionId, f64>,
) -> Vec<RebalanceResult> {
    let total_value: f64 = positions.iter().map(Position::current_value).sum();

    positions
        .iter()
        .map(|pos| {
            let buy_price = override_prices
                .get(&pos.id)
                .copied()
                .unwrap_or(pos.current_price);

            let target_value = pos.target_allocation / 100.0 * total_value;
            let value_difference = target_value - pos.current_value();

            let share_change = if buy_price == 0.0 {
                0.0
            } else {
                value_difference / buy_price
            };
            let new_shares = pos.shares + share_change;

            let avg_cost = if share_change > 0.0 {
                (pos.cost_price * pos.shares + buy_price * share_change) / new_shares
            } else {
                pos.cost_price
            };

            RebalanceResult {
                id: pos.id,
                symbol: pos.symbol,
                name: pos.name.clone(),
                share_change: round2(share_change),
                new_shares: round2(new_shares),
                avg_cost: round2(avg_cost),
                new_allocation: pos.target_allocation,
            }
        })
        .collect()
}

/// Commit an accepted rebalance proposal.
///
/// Overwrites `shares` and `cost_price` on each referenced position. The
/// whole batch is checked first: a result that references an unknown
/// position or leaves negative shares rejects the entire apply, leaving the
/// positions untouched.
pub fn apply_rebalance(
    positions: &mut [Position],
    results: &[RebalanceResult],
) -> Result<(), ValidationError> {
    for result in results {
        if result.new_shares < 0.0 {
            return Err(ValidationError::OverSell {
                symbol: result.symbol,
                new_shares: result.new_shares,
            });
        }
        if !positions.iter().any(|p| p.id == result.id) {
            return Err(ValidationError::UnknownPosition(result.id));
        }
    }

    for result in results {
        if let Some(pos) = positions.iter_mut().find(|p| p.id == result.id) {
            pos.shares = result.new_shares;
            pos.cost_price = result.avg_cost;
        }
    }
    Ok(())
}
