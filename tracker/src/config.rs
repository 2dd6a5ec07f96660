//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: String,
    #[serde(default = "default_portfolio_file")]
    pub portfolio_file: String,
    #[serde(default = "default_shares_file")]
    pub shares_file: String,
}

fn default_data_dir() -> String {
    ".".into()
}
fn default_portfolio_file() -> String {
    "portfolio.json".into()
}
fn default_shares_file() -> String {
    "shares.json".into()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            portfolio_file: default_portfolio_file(),
            shares_file: default_shares_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesConfig {
    /// Finnhub API key. Quote-dependent commands fail without one.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. A missing file yields the defaults so
    /// the tracker works out of the box.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.data.dir.is_empty() {
            return Err(Error::Config("data.dir must not be empty".into()));
        }
        if self.data.portfolio_file.is_empty() {
            return Err(Error::Config("data.portfolio_file must not be empty".into()));
        }
        if let Some(key) = &self.quotes.api_key {
            if key.is_empty() {
                return Err(Error::Config("quotes.api_key must not be empty".into()));
            }
        }
        if self.quotes.timeout_secs == 0 {
            return Err(Error::Config("quotes.timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Full path to the portfolio data file.
    pub fn portfolio_path(&self) -> PathBuf {
        Path::new(&self.data.dir).join(&self.data.portfolio_file)
    }

    /// Full path to the share snapshot file.
    pub fn shares_path(&self) -> PathBuf {
        Path::new(&self.data.dir).join(&self.data.shares_file)
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
