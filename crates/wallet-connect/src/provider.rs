//! The injected wallet capability.
//!
//! [`Eip1193Provider`] is the one primitive a wallet has to offer: a
//! `request(method, params)` call plus optional event subscription.
//! [`WalletApi`] layers the typed calls the connector makes on top of it and
//! is implemented for every provider.

use std::fmt;

use alloy_primitives::B256;
use async_trait::async_trait;
use chain_eth::chains::{format_chain_id, EvmChain};
use chain_eth::transaction::{parse_tx_hash, TransactionReceipt, TransactionRequest};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ProviderError;

/// JSON-RPC methods the connector sends to the wallet.
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Provider events the connector listens to.
pub mod events {
    pub const CHAIN_CHANGED: &str = "chainChanged";
}

/// Callback invoked with the raw event payload.
pub type EventHandler = Box<dyn Fn(Value)>;

/// A registered listener. Dropping the handle (or calling
/// [`Subscription::unsubscribe`]) removes the listener.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// An EIP-1193 wallet provider.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    /// Sends one JSON-RPC request to the wallet. `params` is a JSON array, or
    /// `Value::Null` for methods without parameters.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Registers `handler` for `event`. Returns `None` when the wallet does
    /// not support event subscription.
    fn on(&self, _event: &str, _handler: EventHandler) -> Option<Subscription> {
        None
    }
}

/// Typed wallet calls, available on every [`Eip1193Provider`].
#[async_trait(?Send)]
pub trait WalletApi: Eip1193Provider {
    /// `eth_requestAccounts`: prompts for authorization and returns the
    /// authorized accounts, primary account first.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        debug!(method = methods::REQUEST_ACCOUNTS, "wallet request");
        let value = self.request(methods::REQUEST_ACCOUNTS, Value::Null).await?;
        serde_json::from_value(value)
            .map_err(|e| ProviderError::malformed(methods::REQUEST_ACCOUNTS, e))
    }

    /// `eth_chainId`: the active chain as a hex quantity.
    async fn chain_id(&self) -> Result<String, ProviderError> {
        debug!(method = methods::CHAIN_ID, "wallet request");
        let value = self.request(methods::CHAIN_ID, Value::Null).await?;
        chain_id_from_value(&value)
            .ok_or_else(|| ProviderError::malformed(methods::CHAIN_ID, value))
    }

    /// EIP-3326 `wallet_switchEthereumChain`.
    async fn switch_chain(&self, chain: &EvmChain) -> Result<(), ProviderError> {
        debug!(method = methods::SWITCH_CHAIN, chain_id = %chain.chain_id_hex(), "wallet request");
        self.request(methods::SWITCH_CHAIN, json!([chain.switch_chain_params()]))
            .await
            .map(|_| ())
    }

    /// EIP-3085 `wallet_addEthereumChain` with the full chain descriptor.
    async fn add_chain(&self, chain: &EvmChain) -> Result<(), ProviderError> {
        debug!(method = methods::ADD_CHAIN, chain_id = %chain.chain_id_hex(), "wallet request");
        self.request(methods::ADD_CHAIN, json!([chain.add_chain_params()]))
            .await
            .map(|_| ())
    }

    /// `eth_sendTransaction`: the wallet signs and broadcasts, returning the hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        debug!(method = methods::SEND_TRANSACTION, "wallet request");
        let value = self.request(methods::SEND_TRANSACTION, json!([tx])).await?;
        let raw = value
            .as_str()
            .ok_or_else(|| ProviderError::malformed(methods::SEND_TRANSACTION, &value))?;
        parse_tx_hash(raw).map_err(|e| ProviderError::malformed(methods::SEND_TRANSACTION, e))
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let value = self
            .request(methods::TRANSACTION_RECEIPT, json!([hash]))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ProviderError::malformed(methods::TRANSACTION_RECEIPT, e))
    }

    /// Subscribes to `chainChanged`; the handler receives the new chain ID.
    fn on_chain_changed(&self, handler: Box<dyn Fn(String)>) -> Option<Subscription> {
        self.on(
            events::CHAIN_CHANGED,
            Box::new(move |payload| match chain_id_from_value(&payload) {
                Some(chain_id) => handler(chain_id),
                None => debug!(%payload, "ignoring malformed chainChanged payload"),
            }),
        )
    }
}

impl<P: Eip1193Provider> WalletApi for P {}

/// Reads a chain ID out of an RPC result or event payload. Wallets send a hex
/// string; a bare number is tolerated.
fn chain_id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_u64().map(format_chain_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Answers every request with a canned value and remembers the calls.
    struct Canned {
        reply: Value,
        calls: RefCell<Vec<(String, Value)>>,
    }

    impl Canned {
        fn new(reply: Value) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl Eip1193Provider for Canned {
        async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
            self.calls.borrow_mut().push((method.to_string(), params));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn subscription_releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let sub = Subscription::new(move || counter.set(counter.get() + 1));
        assert_eq!(released.get(), 0);
        sub.unsubscribe();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn subscription_debug_shows_state() {
        let sub = Subscription::new(|| {});
        assert!(format!("{sub:?}").contains("active: true"));
    }

    #[test]
    fn default_on_is_unsupported() {
        let wallet = Canned::new(Value::Null);
        assert!(wallet.on(events::CHAIN_CHANGED, Box::new(|_| {})).is_none());
        assert!(wallet.on_chain_changed(Box::new(|_| {})).is_none());
    }

    #[tokio::test]
    async fn request_accounts_decodes_list() {
        let wallet = Canned::new(json!(["0xabc", "0xdef"]));
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(accounts, vec!["0xabc".to_string(), "0xdef".to_string()]);
        assert_eq!(wallet.calls.borrow()[0].0, methods::REQUEST_ACCOUNTS);
    }

    #[tokio::test]
    async fn request_accounts_rejects_non_list() {
        let wallet = Canned::new(json!({ "accounts": [] }));
        let err = wallet.request_accounts().await.unwrap_err();
        assert!(err.message.starts_with("malformed eth_requestAccounts"));
    }

    #[tokio::test]
    async fn chain_id_accepts_hex_string() {
        let wallet = Canned::new(json!("0x2612"));
        assert_eq!(wallet.chain_id().await.unwrap(), "0x2612");
    }

    #[tokio::test]
    async fn chain_id_tolerates_number() {
        let wallet = Canned::new(json!(9746));
        assert_eq!(wallet.chain_id().await.unwrap(), "0x2612");
    }

    #[tokio::test]
    async fn switch_chain_sends_hex_id() {
        let wallet = Canned::new(Value::Null);
        wallet
            .switch_chain(&chain_eth::chains::PLASMA_TESTNET)
            .await
            .unwrap();
        let calls = wallet.calls.borrow();
        assert_eq!(calls[0].0, methods::SWITCH_CHAIN);
        assert_eq!(calls[0].1, json!([{ "chainId": "0x2612" }]));
    }

    #[tokio::test]
    async fn send_transaction_parses_hash() {
        let hash = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
        let wallet = Canned::new(json!(hash));
        let tx = chain_eth::transaction::build_self_transfer(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        )
        .unwrap();
        let got = wallet.send_transaction(&tx).await.unwrap();
        assert_eq!(got.to_string(), hash);
    }

    #[tokio::test]
    async fn pending_receipt_is_none() {
        let wallet = Canned::new(Value::Null);
        assert!(wallet.transaction_receipt(B256::ZERO).await.unwrap().is_none());
    }
}
