//! Browser bindings for the Plasma wallet connector.
//!
//! The module mounts itself on load with the default configuration: it
//! detects `window.ethereum`, fills the chain status element once the
//! document is ready, keeps it current on `chainChanged`, and wires the send
//! button to the self-transfer flow. The same operations are exported for
//! page buttons:
//!
//! ```js
//! import init, { checkWallet, checkAddress, switchPlasma } from "./wallet_web.js";
//! await init();
//! connectBtn.onclick = () => checkAddress();
//! ```

pub mod dom;
pub mod injected;
pub mod logging;
pub mod timer;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};
use wallet_connect::{Connector, ConnectorConfig, SubmitOutcome, Subscription};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use crate::dom::{DomPage, EventListener};
use crate::injected::InjectedWallet;
use crate::timer::GlooTimer;

pub type WebConnector = Connector<InjectedWallet, DomPage, GlooTimer>;

/// Everything a mount owns. Dropping it detaches every listener.
struct App {
    connector: Rc<WebConnector>,
    _chain_watch: Option<Subscription>,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    mount_with(ConnectorConfig::default()).map_err(JsValue::from)
}

/// Re-mounts with a page-supplied configuration (camelCase keys, all optional).
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<(), JsError> {
    let config = if config.is_undefined() || config.is_null() {
        ConnectorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    mount_with(config)
}

/// Detaches the connector from the page and the wallet.
#[wasm_bindgen]
pub fn unmount() {
    let previous = APP.with(|app| app.borrow_mut().take());
    if previous.is_some() {
        debug!("connector unmounted");
    }
}

#[wasm_bindgen(js_name = checkWallet)]
pub fn check_wallet() -> Result<bool, JsError> {
    Ok(current()?.check_wallet())
}

/// Requests accounts and resolves to the connected address, or `undefined`
/// when the user was already told why not.
#[wasm_bindgen(js_name = checkAddress)]
pub async fn check_address() -> Result<Option<String>, JsError> {
    Ok(current()?.connect_account().await)
}

/// Switches the wallet to the configured chain, adding it when unknown.
/// Failures have already been alerted, so the promise still resolves.
#[wasm_bindgen(js_name = switchPlasma)]
pub async fn switch_plasma() -> Result<(), JsError> {
    let connector = current()?;
    if let Err(err) = connector.ensure_network().await {
        debug!(%err, "network switch did not complete");
    }
    Ok(())
}

#[wasm_bindgen(js_name = testChainStatus)]
pub async fn test_chain_status() -> Result<Option<String>, JsError> {
    Ok(current()?.refresh_chain_status().await)
}

/// Runs the self-transfer flow. Resolves to the confirmed hash, `undefined`
/// when nothing was sent, and rejects when the transaction failed.
#[wasm_bindgen(js_name = sendSelfTransfer)]
pub async fn send_self_transfer() -> Result<Option<String>, JsError> {
    match current()?.submit_self_transfer().await? {
        SubmitOutcome::Confirmed(receipt) => Ok(Some(receipt.transaction_hash.to_string())),
        SubmitOutcome::NoAccount | SubmitOutcome::Busy => Ok(None),
    }
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The mounted connector. After `unmount()` every export refuses to run until
/// the page mounts again. A wallet injected after the mount is picked up by
/// re-mounting with the same configuration.
fn current() -> Result<Rc<WebConnector>, JsError> {
    let connector = mounted().ok_or_else(|| JsError::new("connector is not mounted"))?;
    if connector.wallet().is_some() || InjectedWallet::detect().is_none() {
        return Ok(connector);
    }
    info!("wallet injected after mount, remounting");
    mount_with(connector.config().clone())?;
    mounted().ok_or_else(|| JsError::new("connector is not mounted"))
}

fn mounted() -> Option<Rc<WebConnector>> {
    APP.with(|app| app.borrow().as_ref().map(|app| app.connector.clone()))
}

/// Builds and wires the new mount, then swaps it in. Any failure leaves the
/// previous mount in place.
fn mount_with(config: ConnectorConfig) -> Result<(), JsError> {
    config.validate()?;
    logging::init(config.log_level()?);

    let page = DomPage::new().ok_or_else(|| JsError::new("no browser window"))?;
    let document = page.document().clone();
    let loading = page.is_loading();

    let wallet = InjectedWallet::detect();
    if wallet.is_none() {
        info!("no injected wallet");
    }
    let connector = Rc::new(Connector::new(wallet, page, GlooTimer, config)?);
    let app = attach(connector, &document, loading)?;

    info!(chain = app.connector.target_chain().name, "connector mounted");
    let previous = APP.with(|slot| slot.borrow_mut().replace(app));
    drop(previous);
    Ok(())
}

/// Hooks the connector up to the page-ready event (or refreshes right away
/// when the document has already loaded), the send button and the wallet's
/// `chainChanged` event.
fn attach(connector: Rc<WebConnector>, document: &Document, loading: bool) -> Result<App, JsError> {
    let mut listeners = Vec::new();
    if loading {
        let on_ready = connector.clone();
        listeners.push(
            EventListener::new(document, "DOMContentLoaded", move |_| {
                spawn_refresh(&on_ready)
            })
            .map_err(listener_error)?,
        );
    } else {
        spawn_refresh(&connector);
    }

    if let Some(button) = document.get_element_by_id(&connector.config().send_button_id) {
        let on_click = connector.clone();
        listeners.push(
            EventListener::new(&button, "click", move |_| {
                let connector = on_click.clone();
                spawn_local(async move {
                    // Already logged, shown and alerted by the connector.
                    let _ = connector.submit_self_transfer().await;
                });
            })
            .map_err(listener_error)?,
        );
    }

    let on_change = connector.clone();
    let chain_watch = connector.watch_chain_changes(Box::new(move |chain_id| {
        debug!(%chain_id, "chain changed");
        spawn_refresh(&on_change);
    }));

    Ok(App {
        connector,
        _chain_watch: chain_watch,
        _listeners: listeners,
    })
}

fn spawn_refresh(connector: &Rc<WebConnector>) {
    let connector = connector.clone();
    spawn_local(async move {
        connector.refresh_chain_status().await;
    });
}

fn listener_error(err: JsValue) -> JsError {
    JsError::new(&format!("could not attach listener: {err:?}"))
}
