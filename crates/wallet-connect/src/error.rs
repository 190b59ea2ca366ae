use thiserror::Error;

/// An EIP-1193 provider RPC error as raised by the injected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Numeric error code, when the wallet supplied one.
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// An error with no code, e.g. a transport failure or a malformed response.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn malformed(method: &str, detail: impl std::fmt::Display) -> Self {
        Self::other(format!("malformed {method} response: {detail}"))
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Some(Self::UNRECOGNIZED_CHAIN)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(Self::USER_REJECTED)
    }
}

/// Connector operation failures.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("no wallet found")]
    WalletAbsent,

    #[error("{0}")]
    Request(ProviderError),

    #[error("wallet returned no accounts")]
    NoAccounts,

    #[error("{0}")]
    SwitchFailed(ProviderError),

    #[error("{0}")]
    AddNetworkFailed(ProviderError),

    #[error("{0}")]
    ChainReadFailed(ProviderError),

    #[error("{0}")]
    Transaction(ProviderError),

    #[error("transaction reverted: {hash}")]
    Reverted { hash: String },

    #[error("invalid account: {0}")]
    InvalidAccount(#[from] chain_eth::error::EthError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported target chain: {0}")]
    UnsupportedChain(u64),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_message_only() {
        let err = ProviderError::new(4001, "User rejected the request.");
        assert_eq!(err.to_string(), "User rejected the request.");
    }

    #[test]
    fn unrecognized_chain_code() {
        assert!(ProviderError::new(4902, "Unrecognized chain ID").is_unrecognized_chain());
        assert!(!ProviderError::new(4001, "rejected").is_unrecognized_chain());
        assert!(!ProviderError::other("boom").is_unrecognized_chain());
    }

    #[test]
    fn user_rejection_code() {
        assert!(ProviderError::new(4001, "rejected").is_user_rejection());
        assert!(!ProviderError::new(-32603, "internal").is_user_rejection());
    }

    #[test]
    fn malformed_names_method() {
        let err = ProviderError::malformed("eth_chainId", "expected string");
        assert_eq!(err.code, None);
        assert_eq!(
            err.to_string(),
            "malformed eth_chainId response: expected string"
        );
    }

    #[test]
    fn connect_error_forwards_wallet_message() {
        let err = ConnectError::SwitchFailed(ProviderError::new(-32002, "Request already pending"));
        assert_eq!(err.to_string(), "Request already pending");
    }

    #[test]
    fn invalid_account_converts_from_eth_error() {
        let err: ConnectError = chain_eth::error::EthError::InvalidAddress("short".into()).into();
        assert_eq!(err.to_string(), "invalid account: invalid address: short");
    }

    #[test]
    fn display_config_errors() {
        assert_eq!(
            ConfigError::UnsupportedChain(7).to_string(),
            "unsupported target chain: 7"
        );
        assert_eq!(
            ConfigError::InvalidLogLevel("loud".into()).to_string(),
            "invalid log level: loud"
        );
    }
}
