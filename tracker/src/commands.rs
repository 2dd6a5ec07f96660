//! Command orchestration: load state, run the calculators, persist, audit.
//!
//! Each command follows the same shape: load the portfolio JSON, do the
//! work through the folio calculators, save, and append to the audit
//! trail. Read-only commands skip the last two steps.

use chrono::Utc;
use folio::{
    Expiry, JsonStore, Portfolio, PortfolioStore, Position, PositionId, ShareStore,
    SubPortfolioId, Symbol, compute_rebalance,
};
use folio_quotes::QuoteProvider;
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};

/// Options for the rebalance command.
pub struct RebalanceOptions {
    pub dry_run: bool,
    pub force: bool,
    /// Trade price overrides, position id -> price.
    pub overrides: Vec<(PositionId, f64)>,
}

// === State loading ===

/// Load the portfolio file; a missing file is an empty portfolio.
pub fn load_portfolio(config: &Config) -> Result<Portfolio> {
    JsonStore::new(config.portfolio_path())
        .load()
        .map_err(|e| Error::Data {
            path: config.portfolio_path(),
            source: e,
        })
}

fn save_portfolio(config: &Config, portfolio: &Portfolio) -> Result<()> {
    JsonStore::new(config.portfolio_path())
        .save(portfolio)
        .map_err(|e| Error::Data {
            path: config.portfolio_path(),
            source: e,
        })
}

/// Load the share snapshot store; a missing file is an empty store.
pub fn load_shares(config: &Config) -> Result<ShareStore> {
    let path = config.shares_path();
    if !path.exists() {
        return Ok(ShareStore::new());
    }
    let json = std::fs::read_to_string(&path).map_err(|e| Error::Data {
        path: path.clone(),
        source: e,
    })?;
    Ok(serde_json::from_str(&json)?)
}

fn save_shares(config: &Config, store: &ShareStore) -> Result<()> {
    let path = config.shares_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(store)?;
    std::fs::write(&path, json).map_err(|e| Error::Data { path, source: e })
}

// === Quote provider ===

#[cfg(feature = "finnhub")]
fn provider(config: &Config) -> Result<impl QuoteProvider> {
    let key = config.quotes.api_key.as_deref().ok_or(Error::NoProvider)?;
    Ok(folio_quotes::finnhub::FinnhubClient::with_timeout(
        key,
        std::time::Duration::from_secs(config.quotes.timeout_secs),
    ))
}

#[cfg(not(feature = "finnhub"))]
fn provider(_config: &Config) -> Result<folio_quotes::FixedQuotes> {
    Err(Error::NoProvider)
}

// === Commands ===

/// Print the portfolio report, optionally with a market overview.
pub fn show(config: &Config, market: bool) -> Result<()> {
    let portfolio = load_portfolio(config)?;
    let report = portfolio.report();

    display_positions(&report);
    print!("{}", report.metrics);

    if market {
        let provider = provider(config)?;
        println!("\nMarket");
        for (index, quote) in provider.market_overview() {
            println!(
                "  {:<8} {:>10.2}  {:+.2} ({:+.2}%)",
                index.label, quote.current, quote.change, quote.percent_change
            );
        }
    }
    Ok(())
}

/// Print the report for one sub-portfolio group.
pub fn show_group(config: &Config, group: u64) -> Result<()> {
    let portfolio = load_portfolio(config)?;
    let id = SubPortfolioId(group);

    let name = portfolio
        .sub_portfolios()
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.name.clone())
        .ok_or_else(|| Error::Config(format!("no sub-portfolio {id}")))?;

    println!("Sub-portfolio {id}: {name}");
    let report = portfolio.group_report(id);
    display_positions(&report);
    print!("{}", report.metrics);
    Ok(())
}

/// Add a position. The current price comes from the quote provider when
/// one is configured, otherwise it starts at the cost price.
pub fn add(
    config: &Config,
    symbol: &str,
    shares: f64,
    cost_price: f64,
    target_allocation: f64,
    name: Option<&str>,
) -> Result<()> {
    let symbol = Symbol::new(symbol);
    let mut portfolio = load_portfolio(config)?;

    let (current_price, display_name) = match provider(config) {
        Ok(provider) => {
            let price = match provider.quote(&symbol) {
                Ok(q) => q.current,
                Err(e) => {
                    warn!("quote for {symbol} failed, using cost price: {e}");
                    cost_price
                }
            };
            let fetched_name = name
                .map(str::to_string)
                .or_else(|| provider.profile(&symbol).ok().map(|p| p.name));
            (price, fetched_name)
        }
        Err(_) => (cost_price, name.map(str::to_string)),
    };

    let id = folio::next_id(portfolio.positions());
    let mut pos = Position::new(id, symbol, shares, cost_price, current_price, target_allocation);
    if let Some(n) = &display_name {
        pos = pos.with_name(n);
    }
    portfolio.insert(pos.clone())?;
    save_portfolio(config, &portfolio)?;

    let mut log = AuditLog::open(&config.audit_path())?;
    audit::log_position_added(&mut log, &pos)?;

    println!("Added {id}: {} x {symbol} @ ${cost_price:.2}", pos.shares);
    Ok(())
}

/// Remove a position by id.
pub fn remove(config: &Config, id: u64) -> Result<()> {
    let id = PositionId(id);
    let mut portfolio = load_portfolio(config)?;

    let removed = portfolio
        .remove(id)
        .ok_or(folio::ValidationError::UnknownPosition(id))?;
    save_portfolio(config, &portfolio)?;

    let mut log = AuditLog::open(&config.audit_path())?;
    audit::log_position_removed(&mut log, &removed)?;

    println!("Removed {id}: {}", removed.symbol);
    Ok(())
}

/// Refresh current prices for every held symbol.
pub fn refresh(config: &Config) -> Result<()> {
    let mut portfolio = load_portfolio(config)?;
    if portfolio.is_empty() {
        println!("Portfolio is empty.");
        return Ok(());
    }
    let provider = provider(config)?;

    let mut prices: FxHashMap<Symbol, f64> = FxHashMap::default();
    let mut failed: Vec<String> = Vec::new();
    for pos in portfolio.positions() {
        if prices.contains_key(&pos.symbol) {
            continue;
        }
        match provider.quote(&pos.symbol) {
            Ok(q) => {
                prices.insert(pos.symbol, q.current);
            }
            Err(e) => {
                warn!("quote for {} failed: {e}", pos.symbol);
                failed.push(pos.symbol.as_str().to_string());
            }
        }
    }

    let updated = portfolio.set_prices(&prices);
    save_portfolio(config, &portfolio)?;

    let mut log = AuditLog::open(&config.audit_path())?;
    audit::log_prices_refreshed(&mut log, updated, &failed)?;

    info!("refreshed {updated} positions, {} failed", failed.len());
    println!("Refreshed {updated} of {} positions.", portfolio.len());
    Ok(())
}

/// Compute, display, confirm, and apply a rebalance.
pub fn rebalance(config: &Config, opts: &RebalanceOptions) -> Result<()> {
    let mut portfolio = load_portfolio(config)?;
    if portfolio.is_empty() {
        println!("Portfolio is empty — nothing to rebalance.");
        return Ok(());
    }

    for (id, _) in &opts.overrides {
        if portfolio.get(*id).is_none() {
            return Err(folio::ValidationError::UnknownPosition(*id).into());
        }
    }
    let overrides: FxHashMap<PositionId, f64> = opts.overrides.iter().copied().collect();

    let results = compute_rebalance(portfolio.positions(), &overrides);

    let mut log = AuditLog::open(&config.audit_path())?;
    audit::log_rebalance_proposed(&mut log, &results)?;

    display_plan(portfolio.positions(), &results);

    if results.iter().all(|r| r.share_change == 0.0) {
        println!("\nNo trades needed — portfolio matches targets.");
        return Ok(());
    }

    if opts.dry_run {
        println!("\n[DRY RUN] Portfolio unchanged.");
        return Ok(());
    }

    if !opts.force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Apply these trades?")
            .default(false)
            .interact()
            .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))?;

        if !confirmed {
            println!("Aborted.");
            log.log("user_confirmed", serde_json::json!({"approved": false}))?;
            return Ok(());
        }
        log.log("user_confirmed", serde_json::json!({"approved": true}))?;
    }

    portfolio.apply(&results)?;
    save_portfolio(config, &portfolio)?;
    audit::log_rebalance_applied(&mut log, &results)?;

    println!("\nApplied {} trades.", results.len());
    Ok(())
}

/// Create a read-only share snapshot of the current portfolio.
pub fn share(
    config: &Config,
    name: &str,
    description: Option<&str>,
    expiry: Expiry,
) -> Result<()> {
    let portfolio = load_portfolio(config)?;
    let mut store = load_shares(config)?;

    let now = Utc::now();
    let id = store.share(
        name,
        description,
        expiry,
        portfolio.positions(),
        portfolio.sub_portfolios(),
        now,
    );
    save_shares(config, &store)?;

    let shared = store.get(id.as_str(), now)?;
    let mut log = AuditLog::open(&config.audit_path())?;
    audit::log_share_created(&mut log, shared)?;

    match shared.expires_at {
        Some(t) => println!("Created share {id} (expires {t})"),
        None => println!("Created share {id} (never expires)"),
    }
    Ok(())
}

/// List unexpired share snapshots, purging expired ones.
pub fn list_shares(config: &Config) -> Result<()> {
    let mut store = load_shares(config)?;

    let now = Utc::now();
    let purged = store.purge_expired(now);
    if purged > 0 {
        info!("purged {purged} expired shares");
        save_shares(config, &store)?;
    }

    let shares = store.list(now);
    if shares.is_empty() {
        println!("No active shares.");
        return Ok(());
    }

    println!(
        "{:<10} {:<20} {:>12} {:>10}  {}",
        "ID", "NAME", "VALUE", "HOLDINGS", "EXPIRES"
    );
    for s in shares {
        let expires = s
            .expires_at
            .map_or("never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        println!(
            "{:<10} {:<20} {:>12.2} {:>10}  {}",
            s.share_id,
            s.name,
            s.total_value,
            s.positions.len(),
            expires
        );
    }
    Ok(())
}

/// Compare two or more share snapshots side by side.
pub fn compare(config: &Config, ids: &[String]) -> Result<()> {
    let store = load_shares(config)?;
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let cmp = store.compare(&id_refs, Utc::now())?;

    println!("Totals");
    for p in &cmp.portfolios {
        println!(
            "  {:<20} ${:>12.2}  {:+.2} ({:+.2}%)",
            p.name, p.total_value, p.total_gain, p.total_gain_percent
        );
    }

    println!("\nAllocations");
    print!("  {:<8}", "SYMBOL");
    for p in &cmp.portfolios {
        print!(" {:>15}", p.name);
    }
    println!();
    for row in &cmp.allocations {
        print!("  {:<8}", row.symbol);
        for entry in &row.entries {
            match entry {
                Some(e) => print!(" {:>14.1}%", e.allocation),
                None => print!(" {:>15}", "-"),
            }
        }
        println!();
    }

    println!("\nPerformance");
    for perf in &cmp.performance {
        println!("  {}", perf.name);
        for p in &perf.top_performers {
            println!("    best  {:<8} {:+.2}%", p.symbol, p.gain_percent);
        }
        for p in &perf.bottom_performers {
            println!("    worst {:<8} {:+.2}%", p.symbol, p.gain_percent);
        }
    }
    Ok(())
}

/// Create a sub-portfolio group.
pub fn group_create(config: &Config, name: &str, description: Option<&str>) -> Result<()> {
    let mut portfolio = load_portfolio(config)?;
    let id = portfolio.add_group(name, description, Utc::now());
    save_portfolio(config, &portfolio)?;
    println!("Created sub-portfolio {id}: {name}");
    Ok(())
}

/// Delete a sub-portfolio group, detaching its positions.
pub fn group_delete(config: &Config, group: u64) -> Result<()> {
    let id = SubPortfolioId(group);
    let mut portfolio = load_portfolio(config)?;
    let removed = portfolio
        .remove_group(id)
        .ok_or_else(|| Error::Config(format!("no sub-portfolio {id}")))?;
    save_portfolio(config, &portfolio)?;
    println!("Deleted sub-portfolio {id}: {}", removed.name);
    Ok(())
}

/// Assign a position to a group, or detach it.
pub fn group_assign(config: &Config, position: u64, group: Option<u64>) -> Result<()> {
    let mut portfolio = load_portfolio(config)?;
    portfolio.assign_group(PositionId(position), group.map(SubPortfolioId))?;
    save_portfolio(config, &portfolio)?;
    match group {
        Some(g) => println!("Assigned P{position} to G{g}"),
        None => println!("Detached P{position}"),
    }
    Ok(())
}

// === Display ===

fn display_positions(report: &folio::PortfolioReport) {
    if report.positions.is_empty() {
        println!("Portfolio is empty.");
        return;
    }

    println!(
        "{:<5} {:<8} {:>10} {:>10} {:>12} {:>12} {:>9} {:>7}",
        "ID", "SYMBOL", "SHARES", "PRICE", "VALUE", "P/L", "P/L%", "ALLOC%"
    );
    for p in &report.positions {
        println!(
            "{:<5} {:<8} {:>10.2} {:>10.2} {:>12.2} {:>+12.2} {:>+8.2}% {:>6.1}%",
            p.position.id.to_string(),
            p.position.symbol,
            p.position.shares,
            p.position.current_price,
            p.current_value,
            p.profit_loss,
            p.profit_loss_percent,
            p.current_allocation,
        );
    }
    println!();
}

fn display_plan(positions: &[Position], results: &[folio::RebalanceResult]) {
    println!(
        "{:<5} {:<8} {:>8} {:>8} {:>10} {:>10} {:>10}",
        "ID", "SYMBOL", "ALLOC%", "TARGET%", "TRADE", "SHARES", "AVG COST"
    );
    let report = folio::compute_metrics(positions);
    for (enriched, r) in report.positions.iter().zip(results) {
        let action = if r.share_change > 0.0 {
            format!("BUY {:.2}", r.share_change)
        } else if r.share_change < 0.0 {
            format!("SELL {:.2}", -r.share_change)
        } else {
            "-".to_string()
        };
        println!(
            "{:<5} {:<8} {:>7.1}% {:>7.1}% {:>10} {:>10.2} {:>10.2}",
            r.id.to_string(),
            r.symbol,
            enriched.current_allocation,
            r.new_allocation,
            action,
            r.new_shares,
            r.avg_cost,
        );
    }
}

/// Parse a `--price ID=PRICE` override argument.
pub fn parse_override(arg: &str) -> Result<(PositionId, f64)> {
    let (id, price) = arg
        .split_once('=')
        .ok_or_else(|| Error::Config(format!("invalid override '{arg}', expected ID=PRICE")))?;
    let id: u64 = id
        .trim_start_matches(['P', 'p'])
        .parse()
        .map_err(|_| Error::Config(format!("invalid position id in override '{arg}'")))?;
    let price: f64 = price
        .parse()
        .map_err(|_| Error::Config(format!("invalid price in override '{arg}'")))?;
    if !(price >= 0.0 && price.is_finite()) {
        return Err(Error::Config(format!(
            "override price must be a non-negative number, got '{price}'"
        )));
    }
    Ok((PositionId(id), price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_config(dir: &std::path::Path) -> Config {
        let toml = format!(
            r#"
[data]
dir = "{0}"

[logging]
dir = "{0}/logs"
"#,
            dir.display()
        );
        toml::from_str(&toml).unwrap()
    }

    fn seed(config: &Config) {
        let mut pf = Portfolio::new();
        pf.add(Symbol::new("AAPL"), 10.0, 100.0, 100.0, 70.0).unwrap();
        pf.add(Symbol::new("MSFT"), 10.0, 100.0, 100.0, 30.0).unwrap();
        pf.save_json(&config.portfolio_path()).unwrap();
    }

    #[test]
    fn load_missing_portfolio_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        assert!(load_portfolio(&config).unwrap().is_empty());
    }

    #[test]
    fn rebalance_dry_run_leaves_portfolio_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);

        let opts = RebalanceOptions {
            dry_run: true,
            force: true,
            overrides: vec![],
        };
        rebalance(&config, &opts).unwrap();

        let pf = load_portfolio(&config).unwrap();
        assert_eq!(pf.get(PositionId(1)).unwrap().shares, 10.0);
    }

    #[test]
    fn rebalance_force_applies_and_audits() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);

        let opts = RebalanceOptions {
            dry_run: false,
            force: true,
            overrides: vec![],
        };
        rebalance(&config, &opts).unwrap();

        let pf = load_portfolio(&config).unwrap();
        assert_eq!(pf.get(PositionId(1)).unwrap().shares, 14.0);
        assert_eq!(pf.get(PositionId(2)).unwrap().shares, 6.0);

        let audit = std::fs::read_to_string(config.audit_path()).unwrap();
        assert!(audit.contains("rebalance_proposed"));
        assert!(audit.contains("rebalance_applied"));
    }

    #[test]
    fn rebalance_rejects_unknown_override_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);

        let opts = RebalanceOptions {
            dry_run: true,
            force: true,
            overrides: vec![(PositionId(99), 10.0)],
        };
        assert!(matches!(
            rebalance(&config, &opts),
            Err(Error::Validation(folio::ValidationError::UnknownPosition(_)))
        ));
    }

    #[test]
    fn share_list_compare_flow() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);

        share(&config, "First", None, Expiry::SevenDays).unwrap();
        share(&config, "Second", Some("copy"), Expiry::Never).unwrap();

        let store = load_shares(&config).unwrap();
        assert_eq!(store.len(), 2);

        let now = Utc::now();
        let ids: Vec<String> = store
            .list(now)
            .iter()
            .map(|s| s.share_id.as_str().to_string())
            .collect();
        compare(&config, &ids).unwrap();
    }

    #[test]
    fn compare_needs_two_shares() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);
        share(&config, "Only", None, Expiry::Never).unwrap();

        let store = load_shares(&config).unwrap();
        let id = store.list(Utc::now())[0].share_id.as_str().to_string();
        assert!(matches!(
            compare(&config, &[id]),
            Err(Error::Share(folio::ShareError::TooFewPortfolios(1)))
        ));
    }

    #[test]
    fn group_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed(&config);

        group_create(&config, "Tech", Some("big tech")).unwrap();
        group_assign(&config, 1, Some(1)).unwrap();
        show_group(&config, 1).unwrap();

        group_delete(&config, 1).unwrap();
        let pf = load_portfolio(&config).unwrap();
        assert!(pf.sub_portfolios().is_empty());
        assert_eq!(pf.get(PositionId(1)).unwrap().portfolio_id, None);
    }

    #[test]
    fn parse_override_accepts_prefixed_ids() {
        assert_eq!(parse_override("1=150.5").unwrap(), (PositionId(1), 150.5));
        assert_eq!(parse_override("P3=99").unwrap(), (PositionId(3), 99.0));
        assert!(parse_override("AAPL").is_err());
        assert!(parse_override("1=abc").is_err());
        assert!(parse_override("1=-5").is_err());
    }
}
