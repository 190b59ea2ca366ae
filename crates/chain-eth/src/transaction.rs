use alloy_primitives::{Address, B256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::address::parse_account;
use crate::error::EthError;

/// An `eth_sendTransaction` request object.
///
/// Only the fields the connector sets are modelled; gas, fees and nonce are
/// left for the wallet to fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    /// Transfer value in wei, serialized as a hex quantity.
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U64>,
}

impl TransactionRequest {
    /// Pins the request to a chain so the wallet refuses it on any other network.
    pub fn on_chain(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(U64::from(chain_id));
        self
    }
}

/// Builds a zero-value transfer from `account` back to itself.
pub fn build_self_transfer(account: &str) -> Result<TransactionRequest, EthError> {
    let addr = parse_account(account)?;
    Ok(TransactionRequest {
        from: addr,
        to: addr,
        value: U256::ZERO,
        chain_id: None,
    })
}

/// The subset of an `eth_getTransactionReceipt` result the connector reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    /// `0x1` on success, `0x0` on revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |s| s == U64::from(1))
    }
}

/// Parses a 0x-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(raw: &str) -> Result<B256, EthError> {
    raw.parse::<B256>()
        .map_err(|e| EthError::EncodingError(format!("invalid transaction hash {raw}: {e}")))
}
