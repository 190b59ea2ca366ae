//! `window.ethereum` as an [`Eip1193Provider`].

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;
use wallet_connect::{Eip1193Provider, EventHandler, ProviderError, Subscription};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// The wallet object a browser extension injects into the page.
pub struct InjectedWallet {
    provider: JsValue,
}

impl InjectedWallet {
    /// Looks up `window.ethereum`. `None` when no wallet is installed.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let provider = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        Self::from_js(provider)
    }

    pub fn from_js(provider: JsValue) -> Option<Self> {
        if provider.is_undefined() || provider.is_null() {
            return None;
        }
        Some(Self { provider })
    }

    fn function(&self, name: &str) -> Option<Function> {
        get_function(&self.provider, name)
    }
}

#[async_trait(?Send)]
impl Eip1193Provider for InjectedWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request_fn = self
            .function("request")
            .ok_or_else(|| ProviderError::other("window.ethereum.request is unavailable"))?;

        let mut body = Map::new();
        body.insert("method".into(), Value::String(method.to_string()));
        if !params.is_null() {
            body.insert("params".into(), params);
        }
        // Plain objects, not `Map`s: wallets read the request with property access.
        let args = Value::Object(body)
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::other(format!("failed to encode {method} request: {e}")))?;

        let returned = request_fn
            .call1(&self.provider, &args)
            .map_err(rpc_error)?;
        let promise = returned
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::other(format!("{method} did not return a Promise")))?;
        let result = JsFuture::from(promise).await.map_err(rpc_error)?;

        if result.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::malformed(method, e))
    }

    fn on(&self, event: &str, handler: EventHandler) -> Option<Subscription> {
        let on_fn = self.function("on")?;
        let callback = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
            handler(serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null));
        });

        if let Err(err) = on_fn.call2(
            &self.provider,
            &JsValue::from_str(event),
            callback.as_ref(),
        ) {
            warn!(event, error = ?err, "wallet rejected event subscription");
            return None;
        }

        let provider = self.provider.clone();
        let event = event.to_string();
        Some(Subscription::new(move || {
            if let Some(remove) = get_function(&provider, "removeListener") {
                let _ = remove.call2(&provider, &JsValue::from_str(&event), callback.as_ref());
            }
            drop(callback);
        }))
    }
}

fn get_function(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

/// Converts a thrown or rejected JS value into a [`ProviderError`], keeping the
/// EIP-1193 `code` when present.
pub(crate) fn rpc_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64);
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    ProviderError { code, message }
}
