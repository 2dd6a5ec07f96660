//! folio-tracker: command-line portfolio tracker built on folio.
//!
//! Keeps a portfolio in a JSON file, refreshes prices from a quote
//! provider, proposes and applies rebalances, and manages read-only share
//! snapshots, with a JSONL audit trail of every change.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
