//! Read-only share snapshots and portfolio comparison.
//!
//! A share snapshot is an immutable, time-stamped copy of portfolio data
//! exposed under an opaque share id. The store is in-memory; hosts that
//! need links to survive a restart persist the store themselves. Time is
//! passed in explicitly so expiry behavior stays deterministic in tests.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, Utc};
use rustc_hash::{FxHashMap, FxHasher};

use crate::error::ShareError;
use crate::metrics::{EnrichedPosition, compute_metrics};
use crate::position::Position;
use crate::subportfolio::SubPortfolio;
use crate::types::Symbol;

/// Opaque share-link identifier (8 alphanumeric characters).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShareId(String);

impl ShareId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShareId {
    fn from(s: &str) -> Self {
        ShareId(s.to_string())
    }
}

/// How long a share link stays valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Expiry {
    OneHour,
    OneDay,
    #[default]
    SevenDays,
    ThirtyDays,
    Never,
}

impl Expiry {
    /// Lifetime as a duration; `None` for links that never expire.
    pub fn duration(self) -> Option<Duration> {
        match self {
            Expiry::OneHour => Some(Duration::hours(1)),
            Expiry::OneDay => Some(Duration::hours(24)),
            Expiry::SevenDays => Some(Duration::days(7)),
            Expiry::ThirtyDays => Some(Duration::days(30)),
            Expiry::Never => None,
        }
    }
}

impl std::fmt::Display for Expiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Expiry::OneHour => "1h",
            Expiry::OneDay => "24h",
            Expiry::SevenDays => "7d",
            Expiry::ThirtyDays => "30d",
            Expiry::Never => "never",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Expiry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Expiry::OneHour),
            "24h" => Ok(Expiry::OneDay),
            "7d" => Ok(Expiry::SevenDays),
            "30d" => Ok(Expiry::ThirtyDays),
            "never" => Ok(Expiry::Never),
            other => Err(format!(
                "unknown expiry '{other}' (expected 1h, 24h, 7d, 30d, or never)"
            )),
        }
    }
}

/// An immutable snapshot of portfolio data behind a share link.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedPortfolio {
    pub share_id: ShareId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `None` means the link never expires.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expires_at: Option<DateTime<Utc>>,
    pub positions: Vec<EnrichedPosition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sub_portfolios: Vec<SubPortfolio>,
    pub total_value: f64,
    pub total_gain: f64,
    pub total_gain_percent: f64,
}

impl SharedPortfolio {
    /// True if the link is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }
}

const ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

/// Encode a hash as an 8-character alphanumeric id.
fn encode_id(mut n: u64) -> String {
    let base = ID_ALPHABET.len() as u64;
    let mut out = String::with_capacity(8);
    for _ in 0..8 {
        out.push(ID_ALPHABET[(n % base) as usize] as char);
        n /= base;
    }
    out
}

/// In-memory share-link store.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShareStore {
    shares: FxHashMap<String, SharedPortfolio>,
    next_seq: u64,
}

impl ShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Snapshot the given positions and groups under a fresh share id.
    ///
    /// The snapshot captures enriched positions and headline totals as of
    /// `now`; later edits to the live portfolio do not affect it.
    pub fn share(
        &mut self,
        name: &str,
        description: Option<&str>,
        expiry: Expiry,
        positions: &[Position],
        sub_portfolios: &[SubPortfolio],
        now: DateTime<Utc>,
    ) -> ShareId {
        let report = compute_metrics(positions);
        let share_id = self.fresh_id(name, now);

        let snapshot = SharedPortfolio {
            share_id: share_id.clone(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            expires_at: expiry.duration().map(|d| now + d),
            positions: report.positions,
            sub_portfolios: sub_portfolios.to_vec(),
            total_value: report.metrics.total_value,
            total_gain: report.metrics.total_gain,
            total_gain_percent: report.metrics.total_gain_percent,
        };

        self.shares.insert(share_id.as_str().to_string(), snapshot);
        share_id
    }

    /// Look up a share link. Expired links behave as errors, not data.
    pub fn get(&self, id: &str, now: DateTime<Utc>) -> Result<&SharedPortfolio, ShareError> {
        let snapshot = self
            .shares
            .get(id)
            .ok_or_else(|| ShareError::NotFound(id.to_string()))?;
        if snapshot.is_expired(now) {
            return Err(ShareError::Expired(id.to_string()));
        }
        Ok(snapshot)
    }

    /// All unexpired links, newest first.
    pub fn list(&self, now: DateTime<Utc>) -> Vec<&SharedPortfolio> {
        let mut out: Vec<_> = self
            .shares
            .values()
            .filter(|s| !s.is_expired(now))
            .collect();
        out.sort_by_key(|s| std::cmp::Reverse(s.created_at));
        out
    }

    /// Drop expired links; returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.shares.len();
        self.shares.retain(|_, s| !s.is_expired(now));
        before - self.shares.len()
    }

    /// Compare two or more shared portfolios.
    pub fn compare(
        &self,
        ids: &[&str],
        now: DateTime<Utc>,
    ) -> Result<PortfolioComparison, ShareError> {
        if ids.len() < 2 {
            return Err(ShareError::TooFewPortfolios(ids.len()));
        }
        let snapshots: Vec<&SharedPortfolio> = ids
            .iter()
            .map(|id| self.get(id, now))
            .collect::<Result<_, _>>()?;
        Ok(compare_portfolios(&snapshots))
    }

    fn fresh_id(&mut self, name: &str, now: DateTime<Utc>) -> ShareId {
        // Not cryptographic: share ids are opaque handles, not secrets
        // against a determined attacker. Collisions are resolved by
        // bumping the sequence and rehashing.
        loop {
            self.next_seq += 1;
            let mut hasher = FxHasher::default();
            name.hash(&mut hasher);
            now.timestamp_nanos_opt().unwrap_or(0).hash(&mut hasher);
            self.next_seq.hash(&mut hasher);
            let id = encode_id(hasher.finish());
            if !self.shares.contains_key(&id) {
                return ShareId(id);
            }
        }
    }
}

/// Side-by-side comparison of shared portfolios.
///
/// Every record is explicitly shaped; index-aligned vectors tie allocation
/// entries back to `portfolios`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioComparison {
    pub portfolios: Vec<ComparedPortfolio>,
    pub allocations: Vec<AllocationRow>,
    pub performance: Vec<PerformanceSummary>,
}

/// Headline totals for one compared portfolio.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparedPortfolio {
    pub share_id: ShareId,
    pub name: String,
    pub total_value: f64,
    pub total_gain: f64,
    pub total_gain_percent: f64,
}

/// One symbol's allocation across all compared portfolios.
///
/// `entries[i]` corresponds to `portfolios[i]`; `None` when that portfolio
/// does not hold the symbol.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationRow {
    pub symbol: Symbol,
    pub name: String,
    pub entries: Vec<Option<AllocationEntry>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationEntry {
    pub allocation: f64,
    pub value: f64,
}

/// Top and bottom holdings of one portfolio, by gain percent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceSummary {
    pub share_id: ShareId,
    pub name: String,
    pub top_performers: Vec<Performer>,
    pub bottom_performers: Vec<Performer>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Performer {
    pub symbol: Symbol,
    pub gain_percent: f64,
}

const PERFORMER_COUNT: usize = 3;

fn compare_portfolios(snapshots: &[&SharedPortfolio]) -> PortfolioComparison {
    let portfolios = snapshots
        .iter()
        .map(|s| ComparedPortfolio {
            share_id: s.share_id.clone(),
            name: s.name.clone(),
            total_value: s.total_value,
            total_gain: s.total_gain,
            total_gain_percent: s.total_gain_percent,
        })
        .collect();

    // Union of symbols in first-seen order.
    let mut symbols: Vec<(Symbol, String)> = Vec::new();
    for snapshot in snapshots {
        for pos in &snapshot.positions {
            if !symbols.iter().any(|(s, _)| *s == pos.position.symbol) {
                symbols.push((pos.position.symbol, pos.position.name.clone()));
            }
        }
    }

    let allocations = symbols
        .into_iter()
        .map(|(symbol, name)| {
            let entries = snapshots
                .iter()
                .map(|snapshot| {
                    snapshot
                        .positions
                        .iter()
                        .find(|p| p.position.symbol == symbol)
                        .map(|p| AllocationEntry {
                            allocation: p.current_allocation,
                            value: p.current_value,
                        })
                })
                .collect();
            AllocationRow {
                symbol,
                name,
                entries,
            }
        })
        .collect();

    let performance = snapshots
        .iter()
        .map(|snapshot| {
            let mut by_gain: Vec<Performer> = snapshot
                .positions
                .iter()
                .map(|p| Performer {
                    symbol: p.position.symbol,
                    gain_percent: p.profit_loss_percent,
                })
                .collect();
            by_gain.sort_by(|a, b| {
                b.gain_percent
                    .partial_cmp(&a.gain_percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let top_performers = by_gain.iter().take(PERFORMER_COUNT).cloned().collect();
            let bottom_performers = by_gain.iter().rev().take(PERFORMER_COUNT).cloned().collect();

            PerformanceSummary {
                share_id: snapshot.share_id.clone(),
                name: snapshot.name.clone(),
                top_performers,
                bottom_performers,
            }
        })
        .collect();

    PortfolioComparison {
        portfolios,
        allocations,
        performance,
    }
}
