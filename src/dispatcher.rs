use alloy::primitives::{Address, TxHash};
use chrono::Local;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::addresses::AddressPool;
use crate::amount::{Amount, AmountRange};
use crate::chain::ChainClient;
use crate::error::SendError;
use crate::nonce::NonceTracker;
use crate::schedule::{DelayRange, Pacer, format_hours};
use crate::transaction::{TransactionSender, TransferKind};

/// Cadence of the dispatch loop.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub amount: AmountRange,
    pub delay: DelayRange,
    pub cycle_interval: Duration,
    pub refresh_addresses: bool,
}

/// Runs transfers pass after pass over the address pool.
pub struct Dispatcher<C, P> {
    chain: C,
    pacer: P,
    sender: TransactionSender,
    pool: AddressPool,
    nonce: NonceTracker,
    schedule: Schedule,
    sent: u64,
}

impl<C: ChainClient, P: Pacer> Dispatcher<C, P> {
    pub fn new(
        chain: C,
        pacer: P,
        sender: TransactionSender,
        pool: AddressPool,
        nonce: NonceTracker,
        schedule: Schedule,
    ) -> Self {
        Self {
            chain,
            pacer,
            sender,
            pool,
            nonce,
            schedule,
            sent: 0,
        }
    }

    /// Number of transfers accepted by the network so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn next_nonce(&self) -> u64 {
        self.nonce.peek()
    }

    /// Never returns. Stop it by dropping the future.
    pub async fn run(&mut self) {
        info!("Using address: {}", self.sender.account());
        if let TransferKind::Token(token) = self.sender.kind() {
            info!("Sending {} ({}) from contract {}", token.name(), token.symbol(), token.address());
        }
        info!(
            "{} recipients, amounts {} - {}, delay {:?} - {:?}, next nonce {}",
            self.pool.len(),
            self.schedule.amount.min(),
            self.schedule.amount.max(),
            self.schedule.delay.min(),
            self.schedule.delay.max(),
            self.next_nonce()
        );
        loop {
            self.run_cycle().await;
        }
    }

    /// One pass, the cycle pause, then a pool refresh when the pool is remote.
    pub async fn run_cycle(&mut self) {
        self.run_pass().await;

        let resume_at = chrono::Duration::from_std(self.schedule.cycle_interval)
            .ok()
            .and_then(|delta| Local::now().checked_add_signed(delta))
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "an unrepresentable time".to_string());
        info!(
            "All transactions for this cycle are done. Waiting for {} hours before the next cycle (resuming at {}).",
            format_hours(self.schedule.cycle_interval),
            resume_at
        );
        self.pacer.pause(self.schedule.cycle_interval).await;

        if self.schedule.refresh_addresses && self.pool.source().is_remote() {
            if let Err(e) = self.pool.refresh().await {
                warn!(error = %e, "Address refresh failed, keeping the previous pool");
            }
        }
    }

    /// One send attempt per pool slot, each followed by a random delay.
    pub async fn run_pass(&mut self) {
        if self.pool.is_empty() {
            warn!("Address pool is empty, nothing to send this pass");
        }
        for _ in 0..self.pool.len() {
            self.dispatch_one().await;
            let delay = self.schedule.delay.sample(&mut rand::thread_rng());
            self.pacer.pause(delay).await;
        }
    }

    /// A failure is logged and followed by a nonce resync; it never stops the loop.
    async fn dispatch_one(&mut self) {
        match self.try_send().await {
            Ok((recipient, amount, hash)) => {
                info!(
                    "[#{}] Sent {} {} to {}. Tx: {}",
                    self.sent,
                    amount,
                    self.sender.kind().unit(),
                    shorten_address(&recipient),
                    shorten_hash(&hash, self.sender.kind())
                );
                self.nonce.advance();
                self.sent += 1;
            }
            Err(e) => {
                error!("Transaction failed: {}", e);
                self.nonce.resync(&self.chain).await;
            }
        }
    }

    async fn try_send(&self) -> Result<(Address, Amount, TxHash), SendError> {
        let recipient = self.pool.choose()?;
        let amount = self.schedule.amount.sample(&mut rand::thread_rng());
        let hash = self
            .sender
            .send(&self.chain, recipient, amount, self.nonce.peek())
            .await?;
        Ok((recipient, amount, hash))
    }
}

/// `0x1234...abc`
pub fn shorten_address(address: &Address) -> String {
    let text = address.to_string();
    format!("{}...{}", &text[..7], &text[text.len() - 3..])
}

/// `0x12345678...` for native sends, a longer prefix for token sends.
pub fn shorten_hash(hash: &TxHash, kind: &TransferKind) -> String {
    let keep = match kind {
        TransferKind::Native => 10,
        TransferKind::Token(_) => 15,
    };
    let text = hash.to_string();
    format!("{}...", &text[..keep])
}
