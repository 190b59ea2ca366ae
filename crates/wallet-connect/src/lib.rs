//! Platform-independent core of the Plasma wallet connector.
//!
//! The injected wallet, the page and the timer are all traits, so the same
//! flows run against `window.ethereum` in the browser and against in-memory
//! doubles in tests.

pub mod config;
pub mod connector;
pub mod error;
pub mod page;
pub mod provider;
pub mod signer;

pub use config::ConnectorConfig;
pub use connector::{Connector, NetworkOutcome, SubmitOutcome};
pub use error::{ConfigError, ConnectError, ProviderError};
pub use page::Page;
pub use provider::{Eip1193Provider, EventHandler, Subscription, WalletApi};
pub use signer::{BrowserProvider, Timer};
