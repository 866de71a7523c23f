use alloy::primitives::Address;
use anyhow::Result;
use tracing::{debug, warn};

use crate::chain::ChainClient;

/// Next nonce for the sending account.
///
/// Only ever advanced after a broadcast was accepted, and overwritten from the
/// chain after any failure, so it never runs ahead of the account's real count.
#[derive(Debug)]
pub struct NonceTracker {
    account: Address,
    next: u64,
}

impl NonceTracker {
    pub fn new(account: Address, next: u64) -> Self {
        Self { account, next }
    }

    /// Starts from the account's current transaction count.
    pub async fn fetch(chain: &dyn ChainClient, account: Address) -> Result<Self> {
        let next = chain.transaction_count(account).await?;
        Ok(Self::new(account, next))
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn advance(&mut self) {
        self.next += 1;
    }

    /// Replaces the local value with the chain's transaction count. If the
    /// query itself fails the current value is kept.
    pub async fn resync(&mut self, chain: &dyn ChainClient) {
        match chain.transaction_count(self.account).await {
            Ok(next) => {
                debug!(previous = self.next, next, "Nonce resynced");
                self.next = next;
            }
            Err(e) => {
                warn!(nonce = self.next, error = %e, "Nonce resync failed, keeping local value");
            }
        }
    }
}
