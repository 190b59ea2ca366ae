use tracing::warn;
use wallet_connect::Page;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, Window};

/// The live document.
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }
}

impl Page for DomPage {
    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            warn!(error = ?err, "alert failed");
        }
    }

    fn has_element(&self, element_id: &str) -> bool {
        self.document.get_element_by_id(element_id).is_some()
    }

    fn set_text(&self, element_id: &str, text: &str) -> bool {
        match self.document.get_element_by_id(element_id) {
            Some(element) => {
                element.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }

    fn set_disabled(&self, element_id: &str, disabled: bool) {
        let Some(element) = self.document.get_element_by_id(element_id) else {
            return;
        };
        let result = if disabled {
            element.set_attribute("disabled", "")
        } else {
            element.remove_attribute("disabled")
        };
        if let Err(err) = result {
            warn!(element_id, error = ?err, "could not toggle disabled");
        }
    }
}

/// A DOM event listener, removed from its target on drop.
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}
