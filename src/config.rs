use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::amount::{AmountRange, parse_decimal};
use crate::error::ConfigError;
use crate::gas::GasMultiplier;
use crate::schedule::DelayRange;

/// Public newline-delimited address feed used when `address_url` is not set.
pub const DEFAULT_ADDRESS_URL: &str =
    "https://raw.githubusercontent.com/clwkevin/LayerOS/refs/heads/main/addressteasepoliakyc.txt";

pub const SAMPLE_CONFIG: &str = r#"# JSON-RPC endpoint of the target chain
rpc: "https://rpc.example.org"

# Hex private key of the funded sending account
private_key: "0xYOUR_PRIVATE_KEY"

# Every transfer sends a random amount in this range (18 decimals)
amount:
  min: "0.0001"
  max: "0.001"

# Multiplier applied to the network gas price
gas: 3

# Seconds to wait between two transfers; a single number means a fixed delay
delay:
  min: 10
  max: 15

# Set to send ERC-20 tokens instead of the native currency
# token_contract_address: "0x0000000000000000000000000000000000000000"

# Hours to wait after a full pass over the address pool
cycle_time: 24

# Newline-delimited address feed used by the URL source
# address_url: "https://example.org/addresses.txt"

# Re-fetch and reshuffle the URL feed before every pass
refresh_addresses: true
"#;

/// Either `"0.25"` or a bare YAML number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DecimalValue {
    Text(String),
    Integer(u64),
    Float(f64),
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalValue::Text(text) => f.write_str(text),
            DecimalValue::Integer(value) => write!(f, "{value}"),
            DecimalValue::Float(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AmountSection {
    min: DecimalValue,
    max: DecimalValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DelaySection {
    Range { min: f64, max: f64 },
    Fixed(f64),
}

#[derive(Deserialize)]
struct ConfigFile {
    rpc: String,
    private_key: String,
    amount: AmountSection,
    #[serde(default = "default_gas")]
    gas: DecimalValue,
    #[serde(default = "default_delay")]
    delay: DelaySection,
    #[serde(default)]
    token_contract_address: Option<String>,
    #[serde(default = "default_cycle_hours")]
    cycle_time: f64,
    #[serde(default = "default_address_url")]
    address_url: String,
    #[serde(default = "default_refresh")]
    refresh_addresses: bool,
}

fn default_gas() -> DecimalValue {
    DecimalValue::Integer(3)
}

fn default_delay() -> DelaySection {
    DelaySection::Range {
        min: 10.0,
        max: 15.0,
    }
}

fn default_cycle_hours() -> f64 {
    24.0
}

fn default_address_url() -> String {
    DEFAULT_ADDRESS_URL.to_string()
}

fn default_refresh() -> bool {
    true
}

/// Validated run parameters. Built once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub signer: PrivateKeySigner,
    pub amount: AmountRange,
    pub gas_multiplier: GasMultiplier,
    pub delay: DelayRange,
    pub token_contract: Option<Address>,
    pub cycle_interval: Duration,
    pub address_url: String,
    pub refresh_addresses: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("account", &self.signer.address())
            .field("private_key", &"<redacted>")
            .field("amount", &self.amount)
            .field("gas_multiplier", &self.gas_multiplier)
            .field("delay", &self.delay)
            .field("token_contract", &self.token_contract)
            .field("cycle_interval", &self.cycle_interval)
            .field("address_url", &self.address_url)
            .field("refresh_addresses", &self.refresh_addresses)
            .finish()
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        Self::from_file(file)
    }

    /// Resolves the token contract for token mode.
    pub fn require_token_contract(&self) -> Result<Address, ConfigError> {
        self.token_contract.ok_or(ConfigError::MissingTokenAddress)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let rpc_url = file
            .rpc
            .parse::<Url>()
            .map_err(|_| ConfigError::RpcUrl(file.rpc.clone()))?;

        let key = file.private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer = PrivateKeySigner::from_str(key)
            .map_err(|e| ConfigError::PrivateKey(e.to_string()))?;

        let amount = AmountRange::new(
            parse_decimal("amount.min", &file.amount.min.to_string())?,
            parse_decimal("amount.max", &file.amount.max.to_string())?,
        )?;

        let gas_multiplier = GasMultiplier::parse(&file.gas.to_string())?;

        let delay = match file.delay {
            DelaySection::Range { min, max } => DelayRange::new(min, max)?,
            DelaySection::Fixed(secs) => DelayRange::fixed(secs)?,
        };

        let token_contract = file
            .token_contract_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Address::from_str(s).map_err(|_| ConfigError::TokenAddress(s.to_string())))
            .transpose()?;

        let cycle_interval = Duration::try_from_secs_f64(file.cycle_time * 3600.0)
            .map_err(|_| ConfigError::CycleTime)?;

        Ok(Self {
            rpc_url,
            signer,
            amount,
            gas_multiplier,
            delay,
            token_contract,
            cycle_interval,
            address_url: file.address_url,
            refresh_addresses: file.refresh_addresses,
        })
    }
}
