use std::str::FromStr;
use std::time::Duration;

use chain_eth::chains::{get_chain, EvmChain, PLASMA_TESTNET};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::ConfigError;

/// Connector settings. Every field has a default, so a page only passes what
/// it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectorConfig {
    /// Chain the connector switches the wallet to.
    pub target_chain_id: u64,
    /// Element that shows the active chain.
    pub chain_status_id: String,
    /// Element that shows transaction progress.
    pub tx_status_id: String,
    /// Button that triggers the self-transfer.
    pub send_button_id: String,
    pub receipt_poll_interval_ms: u64,
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            target_chain_id: PLASMA_TESTNET.chain_id,
            chain_status_id: "chainStatus".to_string(),
            tx_status_id: "txStatus".to_string(),
            send_button_id: "sendBtn".to_string(),
            receipt_poll_interval_ms: 1_000,
            log_level: "info".to_string(),
        }
    }
}

impl ConnectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target_chain()?;
        self.log_level()?;
        for (field, id) in [
            ("chainStatusId", &self.chain_status_id),
            ("txStatusId", &self.tx_status_id),
            ("sendButtonId", &self.send_button_id),
        ] {
            if id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        if self.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "receiptPollIntervalMs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn target_chain(&self) -> Result<&'static EvmChain, ConfigError> {
        get_chain(self.target_chain_id).ok_or(ConfigError::UnsupportedChain(self.target_chain_id))
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}
