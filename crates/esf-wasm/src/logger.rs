//! Console logging backend for the `log` facade.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Set to `false` to silence all console output.
const ENABLE_CONSOLE_OUTPUT: bool = true;

const APP_NAME: &str = "Steam: Extra search filters";
const HEADER_STYLE: &str = "color:#c5c;font-weight:bold;";
const TEXT_STYLE: &str = "color:#ddd;font-weight:normal;";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = JsValue::from_str(&format!("%c[{APP_NAME}]%c {}", record.args()));
        let header = JsValue::from_str(HEADER_STYLE);
        match record.level() {
            Level::Error => console::error_3(&message, &header, &TEXT_STYLE.into()),
            Level::Warn => console::warn_3(&message, &header, &TEXT_STYLE.into()),
            Level::Info => console::info_3(&message, &header, &format!("{TEXT_STYLE}font-style:italic;").into()),
            Level::Debug | Level::Trace => console::debug_3(&message, &header, &TEXT_STYLE.into()),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Safe to call more than once.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if ENABLE_CONSOLE_OUTPUT { level } else { LevelFilter::Off });
    }
}
