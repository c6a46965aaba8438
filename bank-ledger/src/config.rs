//! Configuration for the ledger

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bank name shown in listings
    pub bank_name: String,

    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Transfer fee configuration
    pub fees: FeeConfig,

    /// Input validation toggles
    pub validation: ValidationConfig,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_name: "MyBank".to_string(),
            service_name: "bank-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            fees: FeeConfig::default(),
            validation: ValidationConfig::default(),
            actor: ActorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Flat fee per transfer
    #[serde(with = "rust_decimal::serde::str")]
    pub flat_fee: Decimal,

    /// Percentage of the principal, in percentage points
    #[serde(with = "rust_decimal::serde::str")]
    pub percent_fee: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            flat_fee: Decimal::from(10),     // 10.00 per transfer
            percent_fee: Decimal::new(25, 1), // 2.5%
        }
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fail `add_account` on an already registered id instead of replacing it
    pub reject_duplicate_accounts: bool,

    /// Permit transfers where source and destination are the same account
    pub allow_self_transfer: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_accounts: false,
            allow_self_transfer: true,
        }
    }
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded mailbox size (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("LEDGER_BANK_NAME") {
            config.bank_name = name;
        }

        if let Ok(fee) = std::env::var("LEDGER_FLAT_FEE") {
            config.fees.flat_fee = parse_decimal("LEDGER_FLAT_FEE", &fee)?;
        }

        if let Ok(fee) = std::env::var("LEDGER_PERCENT_FEE") {
            config.fees.percent_fee = parse_decimal("LEDGER_PERCENT_FEE", &fee)?;
        }

        if let Ok(json) = std::env::var("LEDGER_LOG_JSON") {
            config.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> crate::Result<()> {
        crate::FeePolicy::try_from(&self.fees)?;

        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "actor.mailbox_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_decimal(var: &str, value: &str) -> crate::Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| crate::Error::Config(format!("{} is not a decimal ({}): {}", var, value, e)))
}
