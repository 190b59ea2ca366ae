//! Provider/signer abstraction over an injected wallet.
//!
//! Mirrors the browser-provider shape dapps are used to: look up the
//! network, get a signer bound to the active account, send, then wait for
//! the receipt.

use std::time::Duration;

use alloy_primitives::B256;
use async_trait::async_trait;
use chain_eth::chains::{get_chain, parse_chain_id};
use chain_eth::transaction::{TransactionReceipt, TransactionRequest};
use tracing::{debug, info};

use crate::error::{ConnectError, ProviderError};
use crate::provider::{Eip1193Provider, WalletApi};

/// Suspends the current task; the browser build backs this with a JS timer.
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// The network the wallet is currently connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub chain_id: u64,
    /// Known chain name, or `"unknown"`.
    pub name: &'static str,
}

pub struct BrowserProvider<'a, P> {
    wallet: &'a P,
}

impl<'a, P: Eip1193Provider> BrowserProvider<'a, P> {
    pub fn new(wallet: &'a P) -> Self {
        Self { wallet }
    }

    pub async fn get_network(&self) -> Result<Network, ConnectError> {
        let raw = self
            .wallet
            .chain_id()
            .await
            .map_err(ConnectError::ChainReadFailed)?;
        let chain_id = parse_chain_id(&raw)
            .map_err(|e| ConnectError::ChainReadFailed(ProviderError::other(e.to_string())))?;
        let name = get_chain(chain_id).map_or("unknown", |c| c.name);
        debug!(chain_id, name, "resolved network");
        Ok(Network { chain_id, name })
    }

    /// Returns a signer bound to the wallet's primary account.
    pub async fn get_signer(&self) -> Result<JsonRpcSigner<'a, P>, ConnectError> {
        let accounts = self
            .wallet
            .request_accounts()
            .await
            .map_err(ConnectError::Request)?;
        let address = accounts.into_iter().next().ok_or(ConnectError::NoAccounts)?;
        Ok(JsonRpcSigner {
            wallet: self.wallet,
            address,
        })
    }
}

/// A signer whose keys live in the wallet.
pub struct JsonRpcSigner<'a, P> {
    wallet: &'a P,
    address: String,
}

impl<'a, P: Eip1193Provider> JsonRpcSigner<'a, P> {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<PendingTransaction<'a, P>, ConnectError> {
        let hash = self
            .wallet
            .send_transaction(&tx)
            .await
            .map_err(ConnectError::Transaction)?;
        info!(%hash, from = %self.address, "transaction sent");
        Ok(PendingTransaction {
            wallet: self.wallet,
            hash,
        })
    }
}

/// A broadcast transaction awaiting inclusion.
pub struct PendingTransaction<'a, P> {
    wallet: &'a P,
    hash: B256,
}

impl<P: Eip1193Provider> PendingTransaction<'_, P> {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Polls for the receipt every `poll_interval` until the transaction is
    /// mined. A reverted transaction is an error.
    pub async fn wait<T: Timer + ?Sized>(
        &self,
        timer: &T,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, ConnectError> {
        loop {
            let receipt = self
                .wallet
                .transaction_receipt(self.hash)
                .await
                .map_err(ConnectError::Transaction)?;
            match receipt {
                Some(receipt) if receipt.is_success() => return Ok(receipt),
                Some(_) => {
                    return Err(ConnectError::Reverted {
                        hash: self.hash.to_string(),
                    })
                }
                None => {
                    debug!(hash = %self.hash, "receipt not available yet");
                    timer.sleep(poll_interval).await;
                }
            }
        }
    }
}
