use std::cell::Cell;

use chain_eth::chains::EvmChain;
use chain_eth::transaction::{build_self_transfer, TransactionReceipt};
use tracing::{debug, error, info, warn};

use crate::config::ConnectorConfig;
use crate::error::{ConfigError, ConnectError};
use crate::page::Page;
use crate::provider::{Eip1193Provider, Subscription, WalletApi};
use crate::signer::{BrowserProvider, Timer};

pub const NO_WALLET: &str = "No wallet found. Install MetaMask.";
pub const WALLET_DETECTED: &str = "Wallet detected";
pub const NO_WALLET_STATUS: &str = "No wallet detected";
pub const CHAIN_UNREADABLE_STATUS: &str = "Could not read chain";

/// How a successful [`Connector::ensure_network`] call got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkOutcome {
    /// The wallet already knew the chain and switched to it.
    Switched,
    /// The chain was unknown and has been added to the wallet.
    Added,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Confirmed(TransactionReceipt),
    /// No account could be connected; nothing was sent.
    NoAccount,
    /// Another submission is still pending; this trigger was ignored.
    Busy,
}

/// Wallet page glue: presence check, account connection, network switching,
/// chain status display and the self-transfer flow.
///
/// The wallet is injected as `Option<P>`; `None` means no wallet was found
/// and every operation short-circuits without touching it.
pub struct Connector<P, U, T> {
    wallet: Option<P>,
    page: U,
    timer: T,
    config: ConnectorConfig,
    target: &'static EvmChain,
    submitting: Cell<bool>,
}

impl<P, U, T> Connector<P, U, T>
where
    P: Eip1193Provider,
    U: Page,
    T: Timer,
{
    pub fn new(
        wallet: Option<P>,
        page: U,
        timer: T,
        config: ConnectorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let target = config.target_chain()?;
        Ok(Self {
            wallet,
            page,
            timer,
            config,
            target,
            submitting: Cell::new(false),
        })
    }

    pub fn wallet(&self) -> Option<&P> {
        self.wallet.as_ref()
    }

    pub fn page(&self) -> &U {
        &self.page
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn target_chain(&self) -> &'static EvmChain {
        self.target
    }

    pub fn check_wallet(&self) -> bool {
        let present = self.wallet.is_some();
        debug!(present, "wallet presence check");
        self.page
            .alert(if present { WALLET_DETECTED } else { NO_WALLET });
        present
    }

    /// Requests account access and returns the primary account.
    pub async fn connect_account(&self) -> Option<String> {
        match self.request_account().await {
            Ok(account) => {
                info!(%account, "wallet connected");
                self.page
                    .alert(&format!("Connected address:\n{account}"));
                Some(account)
            }
            Err(ConnectError::WalletAbsent) => {
                self.page.alert(NO_WALLET);
                None
            }
            Err(ConnectError::Request(err)) if err.is_user_rejection() => {
                info!(%err, "account request rejected by user");
                self.page.alert(&format!("Could not connect: {err}"));
                None
            }
            Err(err) => {
                error!(%err, "could not connect");
                self.page.alert(&format!("Could not connect: {err}"));
                None
            }
        }
    }

    async fn request_account(&self) -> Result<String, ConnectError> {
        let wallet = self.wallet.as_ref().ok_or(ConnectError::WalletAbsent)?;
        let accounts = wallet
            .request_accounts()
            .await
            .map_err(ConnectError::Request)?;
        accounts.into_iter().next().ok_or(ConnectError::NoAccounts)
    }

    /// Switches the wallet to the target chain, adding the chain first when
    /// the wallet reports it as unrecognized (4902).
    ///
    /// Every terminal state notifies the user. Nothing is retried and each
    /// call starts from scratch.
    pub async fn ensure_network(&self) -> Result<NetworkOutcome, ConnectError> {
        let Some(wallet) = self.wallet.as_ref() else {
            self.page.alert(NO_WALLET);
            return Err(ConnectError::WalletAbsent);
        };
        let chain = self.target;
        let chain_id = chain.chain_id_hex();

        info!(%chain_id, "switching network");
        let switch_err = match wallet.switch_chain(chain).await {
            Ok(()) => {
                info!(%chain_id, "network switched");
                self.page.alert(&format!("Switched to {}", chain.name));
                return Ok(NetworkOutcome::Switched);
            }
            Err(err) => err,
        };

        if !switch_err.is_unrecognized_chain() {
            error!(code = ?switch_err.code, err = %switch_err, "could not switch network");
            self.page
                .alert(&format!("Could not switch network: {switch_err}"));
            return Err(ConnectError::SwitchFailed(switch_err));
        }

        warn!(%chain_id, "chain unknown to wallet, adding it");
        match wallet.add_chain(chain).await {
            Ok(()) => {
                info!(%chain_id, "network added");
                self.page
                    .alert(&format!("{} added. Try connecting again.", chain.name));
                self.refresh_chain_status().await;
                Ok(NetworkOutcome::Added)
            }
            Err(add_err) => {
                error!(code = ?add_err.code, err = %add_err, "could not add network");
                self.page
                    .alert(&format!("Could not add {}: {add_err}", chain.name));
                Err(ConnectError::AddNetworkFailed(add_err))
            }
        }
    }

    /// Renders the active chain into the chain status element.
    ///
    /// Returns the text written, or `None` when the element is missing.
    pub async fn refresh_chain_status(&self) -> Option<String> {
        let element_id = &self.config.chain_status_id;
        if !self.page.has_element(element_id) {
            return None;
        }

        let text = match self.wallet.as_ref() {
            None => NO_WALLET_STATUS.to_string(),
            Some(wallet) => match wallet.chain_id().await {
                Ok(chain_id) => format!("Chain ID: {chain_id}"),
                Err(err) => {
                    error!(%err, "error fetching chain id");
                    CHAIN_UNREADABLE_STATUS.to_string()
                }
            },
        };
        self.page.set_text(element_id, &text);
        Some(text)
    }

    /// Forwards the wallet's `chainChanged` events to `handler`. `None` when
    /// there is no wallet or it cannot emit events.
    pub fn watch_chain_changes(&self, handler: Box<dyn Fn(String)>) -> Option<Subscription> {
        let wallet = self.wallet.as_ref()?;
        let subscription = wallet.on_chain_changed(handler);
        if subscription.is_none() {
            debug!("wallet does not support chainChanged events");
        }
        subscription
    }

    /// Connects, then sends a zero-value transfer from the account to itself
    /// and tracks it to confirmation in the transaction status element.
    ///
    /// At most one submission runs at a time; the send button is disabled
    /// while it does. Failures are logged, shown and returned.
    pub async fn submit_self_transfer(&self) -> Result<SubmitOutcome, ConnectError> {
        let Some(_in_flight) = InFlight::enter(&self.submitting) else {
            debug!("submission already in flight, ignoring trigger");
            return Ok(SubmitOutcome::Busy);
        };

        let button = &self.config.send_button_id;
        self.page.set_disabled(button, true);
        let result = self.send_self_transfer().await;
        self.page.set_disabled(button, false);

        if let Err(err) = &result {
            error!(%err, "transaction failed");
            let message = format!("Transaction failed: {err}");
            self.set_tx_status(&message);
            self.page.alert(&message);
        }
        result
    }

    async fn send_self_transfer(&self) -> Result<SubmitOutcome, ConnectError> {
        let Some(account) = self.connect_account().await else {
            return Ok(SubmitOutcome::NoAccount);
        };
        let wallet = self.wallet.as_ref().ok_or(ConnectError::WalletAbsent)?;
        let provider = BrowserProvider::new(wallet);

        self.set_tx_status("Opening wallet...");
        let network = provider.get_network().await?;
        let tx = build_self_transfer(&account)?.on_chain(network.chain_id);
        let signer = provider.get_signer().await?;
        info!(
            chain_id = network.chain_id,
            network = network.name,
            from = signer.address(),
            "submitting self-transfer"
        );

        let pending = signer.send_transaction(tx).await?;
        self.set_tx_status(&format!("Submitted: {} (waiting...)", pending.hash()));

        let receipt = pending
            .wait(&self.timer, self.config.receipt_poll_interval())
            .await?;
        info!(hash = %receipt.transaction_hash, "transaction confirmed");
        self.set_tx_status("Confirmed.");
        Ok(SubmitOutcome::Confirmed(receipt))
    }

    fn set_tx_status(&self, text: &str) {
        if !self.page.set_text(&self.config.tx_status_id, text) {
            debug!(text, "no transaction status element");
        }
    }
}

/// Holds the in-flight flag for the lifetime of one submission.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
