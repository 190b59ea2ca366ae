//! Routes `tracing` events to the browser console.
//!
//! Each formatted event is buffered and handed to `console.error`,
//! `console.warn`, `console.info` or `console.debug` according to its level.
//! Timestamps are left to the devtools. The level sits behind a reload
//! handle so a re-mount can change it.

use std::cell::RefCell;
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};
use wasm_bindgen::JsValue;
use web_sys::console;

thread_local! {
    static LEVEL: RefCell<Option<reload::Handle<LevelFilter, Registry>>> = const { RefCell::new(None) };
}

/// Installs the console subscriber on first call. Later calls (e.g. a
/// re-mount with a new `logLevel`) swap the level in place.
pub fn init(level: Level) {
    let filter = LevelFilter::from_level(level);
    let reloaded = LEVEL.with(|slot| slot.borrow().as_ref().map(|handle| handle.reload(filter)));
    match reloaded {
        Some(Ok(())) => tracing::debug!(%level, "console log level changed"),
        Some(Err(err)) => tracing::warn!(%err, "could not change console log level"),
        None => install(filter),
    }
}

fn install(filter: LevelFilter) {
    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(MakeConsoleWriter)
                .with_ansi(false)
                .without_time()
                .with_target(false),
        )
        .try_init();
    match installed {
        Ok(()) => LEVEL.with(|slot| *slot.borrow_mut() = Some(handle)),
        Err(err) => console::warn_1(&JsValue::from_str(&format!(
            "console subscriber not installed: {err}"
        ))),
    }
}

pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Collects one formatted event; emits it on drop.
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buffer: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer);
        let message = JsValue::from_str(line.trim_end());
        if self.level == Level::ERROR {
            console::error_1(&message);
        } else if self.level == Level::WARN {
            console::warn_1(&message);
        } else if self.level == Level::INFO {
            console::info_1(&message);
        } else {
            console::debug_1(&message);
        }
    }
}
