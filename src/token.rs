use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use tracing::info;

use crate::chain::ChainClient;
use crate::error::TokenContractError;

sol! {
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
        function name() external view returns (string);
        function symbol() external view returns (string);
    }
}

/// ERC-20 contract bound at startup, with its metadata already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContract {
    address: Address,
    name: String,
    symbol: String,
}

impl TokenContract {
    pub fn new(address: Address, name: String, symbol: String) -> Self {
        Self {
            address,
            name,
            symbol,
        }
    }

    /// Reads `name()` and `symbol()` to make sure the address really is a token.
    pub async fn load(chain: &dyn ChainClient, address: Address) -> Result<Self, TokenContractError> {
        let raw = eth_call(chain, address, "name", IERC20::nameCall {}.abi_encode()).await?;
        let name = IERC20::nameCall::abi_decode_returns(&raw, true)
            .map(|ret| ret._0)
            .map_err(|e| decode_error("name", address, e))?;

        let raw = eth_call(chain, address, "symbol", IERC20::symbolCall {}.abi_encode()).await?;
        let symbol = IERC20::symbolCall::abi_decode_returns(&raw, true)
            .map(|ret| ret._0)
            .map_err(|e| decode_error("symbol", address, e))?;

        info!("Loaded token contract at address: {}", address);
        info!("Token Name: {}, Symbol: {}", name, symbol);

        Ok(Self::new(address, name, symbol))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// ABI-encoded `transfer(to, value)` calldata.
    pub fn transfer_calldata(&self, to: Address, value: U256) -> Bytes {
        IERC20::transferCall { to, value }.abi_encode().into()
    }
}

async fn eth_call(
    chain: &dyn ChainClient,
    address: Address,
    function: &'static str,
    calldata: Vec<u8>,
) -> Result<Bytes, TokenContractError> {
    let request = TransactionRequest::default()
        .with_to(address)
        .with_input(calldata);

    chain
        .call(&request)
        .await
        .map_err(|e| TokenContractError::Call {
            function,
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn decode_error(
    function: &'static str,
    address: Address,
    err: alloy::sol_types::Error,
) -> TokenContractError {
    TokenContractError::Decode {
        function,
        address: address.to_string(),
        reason: err.to_string(),
    }
}
