use alloy_primitives::Address;

use crate::error::EthError;

/// Parses an account string handed back by a wallet into an [`Address`].
///
/// Wallets usually return lowercase addresses; mixed-case input must carry a
/// valid EIP-55 checksum.
pub fn parse_account(account: &str) -> Result<Address, EthError> {
    let hex_part = strip_prefix(account)?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if is_all_lower || is_all_upper {
        return hex_part
            .to_ascii_lowercase()
            .parse::<Address>()
            .map_err(|e| EthError::InvalidAddress(e.to_string()));
    }

    Address::parse_checksummed(format!("0x{hex_part}"), None)
        .map_err(|_| EthError::InvalidAddress(format!("bad EIP-55 checksum: {account}")))
}

fn strip_prefix(account: &str) -> Result<&str, EthError> {
    account
        .strip_prefix("0x")
        .or_else(|| account.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}
