//! Named sub-portfolios: grouping only, no effect on the math.

use chrono::{DateTime, Utc};

use crate::metrics::{PortfolioReport, compute_metrics};
use crate::position::Position;
use crate::types::SubPortfolioId;

/// A named grouping of positions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubPortfolio {
    pub id: SubPortfolioId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SubPortfolio {
    pub fn new(id: SubPortfolioId, name: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            created_at,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Next free sub-portfolio id given the existing groups.
pub fn next_id(groups: &[SubPortfolio]) -> SubPortfolioId {
    SubPortfolioId(groups.iter().map(|g| g.id.0).max().map_or(1, |m| m + 1))
}

/// The slice of positions belonging to one sub-portfolio.
pub fn positions_in(positions: &[Position], id: SubPortfolioId) -> Vec<Position> {
    positions
        .iter()
        .filter(|p| p.portfolio_id == Some(id))
        .cloned()
        .collect()
}

/// Metrics over a single sub-portfolio's slice.
///
/// Allocations in the result are relative to the group's own total, not
/// the whole portfolio — the aggregator always operates over whatever
/// slice it is handed.
pub fn group_report(positions: &[Position], id: SubPortfolioId) -> PortfolioReport {
    compute_metrics(&positions_in(positions, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PositionId, Symbol};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn pos(id: u64, sym: &str, group: Option<u64>) -> Position {
        let mut p = Position::new(PositionId(id), Symbol::new(sym), 10.0, 100.0, 110.0, 50.0);
        p.portfolio_id = group.map(SubPortfolioId);
        p
    }

    #[test]
    fn filters_by_group() {
        let positions = vec![pos(1, "A", Some(1)), pos(2, "B", Some(2)), pos(3, "C", None)];
        let group = positions_in(&positions, SubPortfolioId(1));
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].symbol, Symbol::new("A"));
    }

    #[test]
    fn group_allocations_are_relative_to_group() {
        let positions = vec![pos(1, "A", Some(1)), pos(2, "B", Some(1)), pos(3, "C", None)];
        let report = group_report(&positions, SubPortfolioId(1));
        assert_eq!(report.metrics.stock_count, 2);
        // Two equal positions inside the group: 50% each.
        assert!((report.positions[0].current_allocation - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_group_yields_empty_report() {
        let positions = vec![pos(1, "A", None)];
        let report = group_report(&positions, SubPortfolioId(9));
        assert_eq!(report.metrics.stock_count, 0);
        assert_eq!(report.metrics.total_value, 0.0);
    }

    #[test]
    fn next_id_increments() {
        assert_eq!(next_id(&[]), SubPortfolioId(1));
        let groups = vec![
            SubPortfolio::new(SubPortfolioId(2), "Growth", now()),
            SubPortfolio::new(SubPortfolioId(5), "Income", now()),
        ];
        assert_eq!(next_id(&groups), SubPortfolioId(6));
    }

    #[test]
    fn builder_description() {
        let g = SubPortfolio::new(SubPortfolioId(1), "Tech", now()).with_description("FAANG-ish");
        assert_eq!(g.description.as_deref(), Some("FAANG-ish"));
    }
}
