//! In-memory stand-ins for the chain and the timer.

use alloy::primitives::{Address, Bytes, TxHash, U256, keccak256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::chain::ChainClient;
use crate::schedule::Pacer;
use crate::token::IERC20;

/// Scripted chain. Records every estimate request and broadcast.
pub struct MockChain {
    gas_price: Option<u128>,
    chain_id: u64,
    gas_estimate: Option<u64>,
    transaction_count: Option<AtomicU64>,
    call_outputs: HashMap<[u8; 4], Bytes>,
    default_call_output: Option<Bytes>,
    rejections_left: Mutex<usize>,
    estimates: Mutex<Vec<TransactionRequest>>,
    broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            gas_price: Some(1_000_000_000),
            chain_id: 1,
            gas_estimate: Some(21_000),
            transaction_count: Some(AtomicU64::new(0)),
            call_outputs: HashMap::new(),
            default_call_output: None,
            rejections_left: Mutex::new(0),
            estimates: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gas_price(mut self, price: u128) -> Self {
        self.gas_price = Some(price);
        self
    }

    pub fn failing_gas_price(mut self) -> Self {
        self.gas_price = None;
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_gas_estimate(mut self, gas: u64) -> Self {
        self.gas_estimate = Some(gas);
        self
    }

    pub fn failing_estimate(mut self) -> Self {
        self.gas_estimate = None;
        self
    }

    pub fn with_transaction_count(mut self, count: u64) -> Self {
        self.transaction_count = Some(AtomicU64::new(count));
        self
    }

    pub fn failing_transaction_count(mut self) -> Self {
        self.transaction_count = None;
        self
    }

    /// Rejects the first `count` broadcasts.
    pub fn rejecting_broadcasts(self, count: usize) -> Self {
        *self.rejections_left.lock().unwrap() = count;
        self
    }

    pub fn with_call_output(mut self, output: Bytes) -> Self {
        self.default_call_output = Some(output);
        self
    }

    pub fn with_token_metadata(mut self, name: &str, symbol: &str) -> Self {
        self.call_outputs.insert(
            IERC20::nameCall::SELECTOR,
            IERC20::nameCall::abi_encode_returns(&(name.to_string(),)).into(),
        );
        self.call_outputs.insert(
            IERC20::symbolCall::SELECTOR,
            IERC20::symbolCall::abi_encode_returns(&(symbol.to_string(),)).into(),
        );
        self
    }

    /// Moves the on-chain transaction count, as if transactions were mined or dropped.
    pub fn set_transaction_count(&self, count: u64) {
        if let Some(current) = &self.transaction_count {
            current.store(count, Ordering::SeqCst);
        }
    }

    pub fn estimates(&self) -> Vec<TransactionRequest> {
        self.estimates.lock().unwrap().clone()
    }

    pub fn estimated_nonces(&self) -> Vec<u64> {
        self.estimates()
            .iter()
            .filter_map(|request| request.nonce)
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn gas_price(&self) -> Result<u128> {
        self.gas_price.ok_or_else(|| anyhow!("gas price unavailable"))
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, _account: Address) -> Result<u64> {
        match &self.transaction_count {
            Some(count) => Ok(count.load(Ordering::SeqCst)),
            None => bail!("connection refused"),
        }
    }

    async fn balance(&self, _account: Address) -> Result<U256> {
        Ok(U256::ZERO)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        self.estimates.lock().unwrap().push(request.clone());
        self.gas_estimate
            .ok_or_else(|| anyhow!("execution reverted: insufficient funds"))
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes> {
        let selector = request
            .input
            .input()
            .and_then(|input| input.get(..4))
            .and_then(|bytes| <[u8; 4]>::try_from(bytes).ok());
        selector
            .and_then(|selector| self.call_outputs.get(&selector).cloned())
            .or_else(|| self.default_call_output.clone())
            .ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
        {
            let mut left = self.rejections_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                bail!("nonce too low");
            }
        }
        self.broadcasts.lock().unwrap().push(raw.to_vec());
        Ok(keccak256(raw))
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Loopback HTTP server answering every request with the same body.
pub struct FeedServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FeedServer {
    pub async fn start(body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/addresses.txt", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Self { url, hits }
    }

    /// Shared view of the request counter.
    pub fn hits(&self) -> Arc<AtomicUsize> {
        self.hits.clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// URL of a port nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/gone", listener.local_addr().unwrap());
    drop(listener);
    url
}
