//! In-memory doubles for the wallet, the page and the timer.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use wallet_connect::{
    Connector, ConnectorConfig, Eip1193Provider, EventHandler, Page, ProviderError, Subscription,
    Timer,
};

pub const ACCOUNT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const OTHER_ACCOUNT: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
pub const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

type Listeners = Rc<RefCell<Vec<(u64, String, Rc<dyn Fn(Value)>)>>>;

/// A scripted EIP-1193 wallet that records every request.
pub struct MockWallet {
    queued: RefCell<HashMap<String, VecDeque<Result<Value, ProviderError>>>>,
    sticky: HashMap<String, Result<Value, ProviderError>>,
    calls: RefCell<Vec<(String, Value)>>,
    listeners: Listeners,
    next_listener: Cell<u64>,
    supports_events: bool,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            queued: RefCell::new(HashMap::new()),
            sticky: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
            supports_events: true,
        }
    }

    /// Answers the next `method` call with `result`.
    pub fn reply(self, method: &str, result: Result<Value, ProviderError>) -> Self {
        self.queued
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Answers every `method` call without a queued reply with `result`.
    pub fn always(mut self, method: &str, result: Result<Value, ProviderError>) -> Self {
        self.sticky.insert(method.to_string(), result);
        self
    }

    pub fn without_events(mut self) -> Self {
        self.supports_events = false;
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn emit(&self, event: &str, payload: Value) {
        let handlers: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| e == event)
            .map(|(_, _, h)| h.clone())
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push((method.to_string(), params));
        let queued = self
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(|q| q.pop_front());
        match queued {
            Some(result) => result,
            None => self.sticky.get(method).cloned().unwrap_or_else(|| {
                Err(ProviderError::new(
                    4200,
                    format!("The requested method is not supported: {method}"),
                ))
            }),
        }
    }

    fn on(&self, event: &str, handler: EventHandler) -> Option<Subscription> {
        if !self.supports_events {
            return None;
        }
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners
            .borrow_mut()
            .push((id, event.to_string(), Rc::from(handler)));
        let listeners = self.listeners.clone();
        Some(Subscription::new(move || {
            listeners.borrow_mut().retain(|(other, _, _)| *other != id);
        }))
    }
}

/// A page with a fixed set of elements that records every update.
pub struct MockPage {
    elements: HashSet<String>,
    alerts: RefCell<Vec<String>>,
    texts: RefCell<HashMap<String, Vec<String>>>,
    disabled: RefCell<Vec<(String, bool)>>,
}

impl MockPage {
    pub fn with_elements(ids: &[&str]) -> Self {
        Self {
            elements: ids.iter().map(|id| id.to_string()).collect(),
            alerts: RefCell::new(Vec::new()),
            texts: RefCell::new(HashMap::new()),
            disabled: RefCell::new(Vec::new()),
        }
    }

    /// The element ids of the default configuration.
    pub fn standard() -> Self {
        Self::with_elements(&["chainStatus", "txStatus", "sendBtn"])
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.texts.borrow().get(id).and_then(|h| h.last().cloned())
    }

    pub fn history(&self, id: &str) -> Vec<String> {
        self.texts.borrow().get(id).cloned().unwrap_or_default()
    }

    pub fn disabled_history(&self) -> Vec<(String, bool)> {
        self.disabled.borrow().clone()
    }
}

impl Page for MockPage {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn has_element(&self, element_id: &str) -> bool {
        self.elements.contains(element_id)
    }

    fn set_text(&self, element_id: &str, text: &str) -> bool {
        if !self.has_element(element_id) {
            return false;
        }
        self.texts
            .borrow_mut()
            .entry(element_id.to_string())
            .or_default()
            .push(text.to_string());
        true
    }

    fn set_disabled(&self, element_id: &str, disabled: bool) {
        if self.has_element(element_id) {
            self.disabled
                .borrow_mut()
                .push((element_id.to_string(), disabled));
        }
    }
}

/// Yields to the runtime once per sleep so concurrent triggers interleave.
#[derive(Default)]
pub struct YieldTimer {
    pub sleeps: Cell<u32>,
}

#[async_trait(?Send)]
impl Timer for YieldTimer {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        tokio::task::yield_now().await;
    }
}

pub type TestConnector = Connector<MockWallet, MockPage, YieldTimer>;

pub fn connector(wallet: Option<MockWallet>, page: MockPage) -> TestConnector {
    Connector::new(wallet, page, YieldTimer::default(), ConnectorConfig::default())
        .expect("default config is valid")
}
