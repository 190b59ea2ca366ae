use thiserror::Error;

/// EVM chain data errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = EthError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_invalid_chain_id() {
        let err = EthError::InvalidChainId("0xzz".into());
        assert_eq!(err.to_string(), "invalid chain id: 0xzz");
    }

    #[test]
    fn display_encoding_error() {
        let err = EthError::EncodingError("missing field".into());
        assert_eq!(err.to_string(), "encoding error: missing field");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(EthError::InvalidChainId("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
