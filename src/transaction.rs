use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use tracing::debug;

use crate::amount::Amount;
use crate::chain::ChainClient;
use crate::error::SendError;
use crate::gas::GasMultiplier;
use crate::token::TokenContract;

/// What a single send moves. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferKind {
    Native,
    Token(TokenContract),
}

impl TransferKind {
    /// Unit shown in the per-send summary line.
    pub fn unit(&self) -> &str {
        match self {
            TransferKind::Native => "ETH",
            TransferKind::Token(token) => token.symbol(),
        }
    }
}

/// Builds, signs and broadcasts transfers from the configured account.
pub struct TransactionSender {
    wallet: EthereumWallet,
    account: Address,
    kind: TransferKind,
    gas_multiplier: GasMultiplier,
}

impl TransactionSender {
    pub fn new(signer: PrivateKeySigner, kind: TransferKind, gas_multiplier: GasMultiplier) -> Self {
        let account = signer.address();
        Self {
            wallet: EthereumWallet::from(signer),
            account,
            kind,
            gas_multiplier,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn kind(&self) -> &TransferKind {
        &self.kind
    }

    /// Fills gas price, nonce, chain id and the estimated gas limit. Nothing
    /// is returned unless every field could be filled.
    pub async fn build(
        &self,
        chain: &dyn ChainClient,
        recipient: Address,
        amount: Amount,
        nonce: u64,
    ) -> Result<TransactionRequest, SendError> {
        let network_price = chain.gas_price().await.map_err(|e| SendError::Network {
            stage: "fetching gas price",
            reason: e.to_string(),
        })?;
        let gas_price = self.gas_multiplier.apply(network_price);

        let chain_id = chain.chain_id().await.map_err(|e| SendError::Network {
            stage: "fetching chain id",
            reason: e.to_string(),
        })?;

        let request = match &self.kind {
            TransferKind::Native => TransactionRequest::default()
                .with_to(recipient)
                .with_value(amount.wei()),
            TransferKind::Token(token) => TransactionRequest::default()
                .with_to(token.address())
                .with_input(token.transfer_calldata(recipient, amount.wei())),
        }
        .with_from(self.account)
        .with_gas_price(gas_price)
        .with_nonce(nonce)
        .with_chain_id(chain_id);

        let gas_limit = chain
            .estimate_gas(&request)
            .await
            .map_err(|e| SendError::GasEstimation(e.to_string()))?;

        debug!(
            %recipient,
            nonce,
            gas_price,
            gas_limit,
            chain_id,
            "Built transfer"
        );

        Ok(request.with_gas_limit(gas_limit))
    }

    /// Signs into a legacy EIP-155 envelope and returns its EIP-2718 bytes.
    pub async fn sign(&self, request: TransactionRequest) -> Result<Vec<u8>, SendError> {
        let envelope = request
            .build(&self.wallet)
            .await
            .map_err(|e| SendError::Sign(e.to_string()))?;
        Ok(envelope.encoded_2718())
    }

    /// Broadcasts a signed transaction. Once this succeeds the transfer is out
    /// of our hands; the caller's nonce discipline prevents duplicates.
    pub async fn submit(&self, chain: &dyn ChainClient, raw: &[u8]) -> Result<TxHash, SendError> {
        chain
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SendError::Broadcast(e.to_string()))
    }

    /// Build, sign and broadcast in one go.
    pub async fn send(
        &self,
        chain: &dyn ChainClient,
        recipient: Address,
        amount: Amount,
        nonce: u64,
    ) -> Result<TxHash, SendError> {
        debug!("Preparing to send {} {} to {}", amount, self.kind.unit(), recipient);
        let request = self.build(chain, recipient, amount, nonce).await?;
        let raw = self.sign(request).await?;
        self.submit(chain, &raw).await
    }
}
