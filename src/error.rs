use std::path::PathBuf;
use thiserror::Error;

/// Malformed or missing configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid decimal `{value}` for `{field}`: {reason}")]
    Decimal {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("amount.min ({min}) is greater than amount.max ({max})")]
    AmountRange { min: String, max: String },

    #[error("gas multiplier must be greater than zero")]
    GasMultiplier,

    #[error("invalid delay: {0}")]
    Delay(String),

    #[error("cycle_time must be a finite, non-negative number of hours")]
    CycleTime,

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("invalid token contract address `{0}`")]
    TokenAddress(String),

    #[error("token transfers selected but `token_contract_address` is not set")]
    MissingTokenAddress,

    #[error("invalid rpc url `{0}`")]
    RpcUrl(String),
}

/// Failure to obtain the recipient address pool.
#[derive(Debug, Error)]
pub enum AddressSourceError {
    #[error("address file {path:?} could not be read: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch addresses from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no usable addresses were loaded")]
    Empty,
}

/// The configured token contract could not be bound.
#[derive(Debug, Error)]
pub enum TokenContractError {
    #[error("call to {function}() on {address} failed: {reason}")]
    Call {
        function: &'static str,
        address: String,
        reason: String,
    },

    #[error("{function}() on {address} returned data that does not match the ABI: {reason}")]
    Decode {
        function: &'static str,
        address: String,
        reason: String,
    },
}

/// A single send attempt failed. The dispatcher logs it, resyncs the nonce and moves on.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("address pool is empty")]
    EmptyPool,

    #[error("network error while {stage}: {reason}")]
    Network { stage: &'static str, reason: String },

    #[error("gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("signing failed: {0}")]
    Sign(String),

    #[error("broadcast rejected: {0}")]
    Broadcast(String),
}
