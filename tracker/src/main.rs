//! CLI entry point for the folio portfolio tracker.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use folio::Expiry;

use folio_tracker::commands::{self, RebalanceOptions};
use folio_tracker::config::Config;
use folio_tracker::error::Error;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Personal portfolio tracker: metrics, rebalancing, sharing")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the portfolio report
    Show {
        /// Also show the market overview tickers
        #[arg(long)]
        market: bool,

        /// Restrict to one sub-portfolio
        #[arg(long)]
        group: Option<u64>,
    },

    /// Add a position
    Add {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// Number of shares (fractional allowed)
        shares: f64,

        /// Average cost per share
        cost: f64,

        /// Target allocation in percent (0-100)
        #[arg(long, default_value_t = 0.0)]
        target: f64,

        /// Display name (defaults to the company name, then the symbol)
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a position by id
    Remove {
        /// Position id, e.g. 3
        id: u64,
    },

    /// Refresh current prices from the quote provider
    Refresh,

    /// Compute share deltas toward target allocations, confirm, and apply
    Rebalance {
        /// Trade price override, ID=PRICE (repeatable)
        #[arg(long = "price", value_name = "ID=PRICE")]
        prices: Vec<String>,

        /// Show the plan without applying
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Create a read-only share snapshot
    Share {
        /// Name shown to viewers
        name: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,

        /// Link lifetime: 1h, 24h, 7d, 30d, or never
        #[arg(long, default_value = "7d")]
        expiry: String,
    },

    /// List active share snapshots
    Shares,

    /// Compare two or more share snapshots
    Compare {
        /// Share ids to compare
        #[arg(num_args = 2..)]
        ids: Vec<String>,
    },

    /// Manage sub-portfolio groups
    #[command(subcommand)]
    Group(GroupCommand),
}

#[derive(Subcommand)]
enum GroupCommand {
    /// Create a sub-portfolio
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a sub-portfolio (positions are detached, not removed)
    Delete { id: u64 },

    /// Assign a position to a sub-portfolio
    Assign {
        position: u64,
        /// Target group id; omit to detach
        #[arg(long)]
        group: Option<u64>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Show { market, group } => match group {
            Some(g) => commands::show_group(&config, g),
            None => commands::show(&config, market),
        },
        Command::Add {
            symbol,
            shares,
            cost,
            target,
            name,
        } => commands::add(&config, &symbol, shares, cost, target, name.as_deref()),
        Command::Remove { id } => commands::remove(&config, id),
        Command::Refresh => commands::refresh(&config),
        Command::Rebalance {
            prices,
            dry_run,
            force,
        } => {
            let overrides = match prices
                .iter()
                .map(|p| commands::parse_override(p))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(o) => o,
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
            let opts = RebalanceOptions {
                dry_run,
                force,
                overrides,
            };
            commands::rebalance(&config, &opts)
        }
        Command::Share {
            name,
            description,
            expiry,
        } => {
            let expiry: Expiry = match expiry.parse() {
                Ok(e) => e,
                Err(msg) => {
                    eprintln!("Error: {msg}");
                    process::exit(1);
                }
            };
            commands::share(&config, &name, description.as_deref(), expiry)
        }
        Command::Shares => commands::list_shares(&config),
        Command::Compare { ids } => commands::compare(&config, &ids),
        Command::Group(group) => match group {
            GroupCommand::Create { name, description } => {
                commands::group_create(&config, &name, description.as_deref())
            }
            GroupCommand::Delete { id } => commands::group_delete(&config, id),
            GroupCommand::Assign { position, group } => {
                commands::group_assign(&config, position, group)
            }
        },
    };

    if let Err(e) = result {
        match &e {
            Error::Validation(msg) => {
                eprintln!("Invalid input: {msg}");
                process::exit(2);
            }
            Error::Aborted(msg) => {
                eprintln!("{msg}");
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
