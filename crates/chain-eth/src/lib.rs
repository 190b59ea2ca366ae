//! EVM chain data for the wallet connector.
//!
//! This crate provides:
//! - Known EVM network definitions, including the Plasma Testnet target
//! - Chain ID hex encoding as used by wallets (`eth_chainId`, EIP-3326)
//! - EIP-3085 `wallet_addEthereumChain` parameters
//! - Account parsing with EIP-55 checksum checks
//! - `eth_sendTransaction` request and receipt wire types

pub mod address;
pub mod chains;
pub mod eip3085;
pub mod error;
pub mod transaction;
