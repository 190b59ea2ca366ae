use crate::error::EthError;

/// Definition of an EVM-compatible blockchain network.
#[derive(Debug, Clone)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    /// Native currency display name (e.g. "Ether").
    pub currency_name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

impl EvmChain {
    /// The chain ID as a 0x-prefixed hex quantity, the form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format_chain_id(self.chain_id)
    }
}

/// Plasma Testnet (chain ID 9746 / 0x2612).
pub const PLASMA_TESTNET: EvmChain = EvmChain {
    chain_id: 0x2612,
    name: "Plasma Testnet",
    currency_name: "XPL",
    symbol: "XPL",
    decimals: 18,
    rpc_url: "https://testnet-rpc.plasma.to",
    explorer_url: "https://testnet.plasmascan.to",
};

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    currency_name: "Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://eth.llamarpc.com",
    explorer_url: "https://etherscan.io",
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    currency_name: "Sepolia Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
};

/// All chains the connector can name or target.
const ALL_CHAINS: &[&EvmChain] = &[&PLASMA_TESTNET, &ETHEREUM, &SEPOLIA];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS
        .iter()
        .find(|c| c.chain_id == chain_id)
        .copied()
}

/// Formats a chain ID as a lowercase 0x-prefixed hex quantity (no leading zeros).
pub fn format_chain_id(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

/// Parses a chain ID as reported by a wallet.
///
/// Wallets report `eth_chainId` as a hex quantity, but some older providers
/// hand back a decimal string, so both are accepted.
pub fn parse_chain_id(raw: &str) -> Result<u64, EthError> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_part) if !hex_part.is_empty() => u64::from_str_radix(hex_part, 16),
        Some(_) => return Err(EthError::InvalidChainId(raw.to_string())),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| EthError::InvalidChainId(raw.to_string()))
}
