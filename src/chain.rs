use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::Http;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};

/// JSON-RPC calls the dispatcher relies on. Lets tests swap in a scripted chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn gas_price(&self) -> Result<u128>;

    async fn chain_id(&self) -> Result<u64>;

    async fn transaction_count(&self, account: Address) -> Result<u64>;

    async fn balance(&self, account: Address) -> Result<U256>;

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64>;

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash>;
}

/// HTTP JSON-RPC endpoint.
pub struct RpcChain {
    provider: RootProvider<Http<Client>>,
}

impl RpcChain {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            provider: ProviderBuilder::new().on_http(rpc_url),
        }
    }
}

#[async_trait]
impl ChainClient for RpcChain {
    async fn gas_price(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64> {
        Ok(self.provider.get_transaction_count(account).await?)
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        Ok(self.provider.estimate_gas(request).await?)
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        Ok(self.provider.call(request).await?)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending.tx_hash())
    }
}
