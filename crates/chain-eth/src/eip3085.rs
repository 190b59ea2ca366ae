//! EIP-3085 `wallet_addEthereumChain` / EIP-3326 `wallet_switchEthereumChain`
//! request parameters.

use serde::{Deserialize, Serialize};

use crate::chains::EvmChain;

/// Native currency metadata shown by the wallet for an added chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The single parameter object of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// The single parameter object of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchEthereumChainParameter {
    pub chain_id: String,
}

impl EvmChain {
    pub fn add_chain_params(&self) -> AddEthereumChainParameter {
        AddEthereumChainParameter {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.to_string(),
            native_currency: NativeCurrency {
                name: self.currency_name.to_string(),
                symbol: self.symbol.to_string(),
                decimals: self.decimals,
            },
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }

    pub fn switch_chain_params(&self) -> SwitchEthereumChainParameter {
        SwitchEthereumChainParameter {
            chain_id: self.chain_id_hex(),
        }
    }
}
