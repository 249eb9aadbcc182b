//! WebAssembly overlay for Steam store search filters
//!
//! Loaded into the store search page. Adds the extra filter controls, filters
//! the rendered result list, and screens results loaded by infinite scroll.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use esf_core::host::{
    is_search_page, OPTIONS_PANEL_ID, PRICE_STOPS_GLOBAL, RESULT_CONTAINER_ID, RESULT_ROWS_ID,
};
use esf_core::{FilterOptions, FilterSession, PendingHide, PollPolicy, PriceStops};

pub mod dom;
mod form;
mod hook;
pub mod logger;
mod poll;
mod style;

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

/// Error type for overlay startup.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Not a store search page: {0}")]
    NotSearchPage(String),
    #[error("Running inside a frame")]
    InFrame,
    #[error("Host element not found: {0}")]
    MissingElement(&'static str),
    #[error("Browser API failure: {0}")]
    Js(String),
}

impl From<JsValue> for InitError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Per-page overlay state shared by every event handler.
pub(crate) struct App {
    pub session: FilterSession,
    pub stops: PriceStops,
    pub policy: PollPolicy,
    pub pending: Vec<PendingHide>,
    pub timer: Option<poll::PollTimer>,
}

impl App {
    pub(crate) fn shared(stops: PriceStops) -> SharedApp {
        Rc::new(RefCell::new(Self {
            session: FilterSession::new(FilterOptions::new()),
            stops,
            policy: PollPolicy::default(),
            pending: Vec::new(),
            timer: None,
        }))
    }
}

pub(crate) type SharedApp = Rc<RefCell<App>>;

thread_local! {
    static APP: RefCell<Option<SharedApp>> = const { RefCell::new(None) };
}

pub(crate) fn window() -> Result<Window, InitError> {
    web_sys::window().ok_or(InitError::MissingElement("window"))
}

pub(crate) fn document() -> Result<Document, InitError> {
    window()?.document().ok_or(InitError::MissingElement("document"))
}

/// Re-run the scanner over the rendered result list.
pub(crate) fn refilter(app: &SharedApp) {
    let Ok(document) = document() else { return };
    let mut rows = dom::DomRow::collect(&document);
    let mut app = app.borrow_mut();
    if let Some(summary) = app.session.refilter(rows.iter_mut()) {
        log::info!("{} of {} results hidden", summary.hidden, rows.len());
    }
}

/// Read the host's price tier table from its page global.
fn read_price_stops(window: &Window) -> PriceStops {
    let Ok(value) = js_sys::Reflect::get(window, &PRICE_STOPS_GLOBAL.into()) else {
        return PriceStops::default();
    };
    if value.is_undefined() || value.is_null() {
        log::warn!("Host price table {PRICE_STOPS_GLOBAL} is missing");
        return PriceStops::default();
    }
    let stops = js_sys::JSON::stringify(&value)
        .ok()
        .and_then(|json| json.as_string())
        .and_then(|json| PriceStops::from_json(&json).ok())
        .unwrap_or_default();
    if stops.is_empty() {
        log::warn!("Host price table {PRICE_STOPS_GLOBAL} is unreadable");
    } else {
        log::debug!("{} host price tiers", stops.len());
    }
    stops
}

fn init() -> Result<SharedApp, InitError> {
    let window = window()?;

    let href = window.location().href()?;
    if !is_search_page(&href) {
        return Err(InitError::NotSearchPage(href));
    }

    let top = window.top()?.ok_or(InitError::InFrame)?;
    if !js_sys::Object::is(&top, &window) {
        return Err(InitError::InFrame);
    }

    let document = document()?;
    if document.get_element_by_id(OPTIONS_PANEL_ID).is_none() {
        return Err(InitError::MissingElement("filter panel"));
    }
    let container = document
        .get_element_by_id(RESULT_CONTAINER_ID)
        .ok_or(InitError::MissingElement("result container"))?;
    if container.query_selector(&format!("#{RESULT_ROWS_ID}"))?.is_none() {
        return Err(InitError::MissingElement("result list"));
    }

    let app = App::shared(read_price_stops(&window));

    style::inject(&document)?;
    form::render(&app, &document)?;
    hook::install(&app)?;
    refilter(&app);

    Ok(app)
}

/// Start the overlay on the current page.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    logger::init(log::LevelFilter::Info);

    if is_started() {
        return Err(JsValue::from_str("Already started. Reload the page to restart."));
    }

    match init() {
        Ok(app) => {
            APP.with(|slot| *slot.borrow_mut() = Some(app));
            log::info!("App loaded.");
            Ok(())
        }
        Err(e) => {
            log::error!("{e}");
            Err(JsValue::from_str(&e.to_string()))
        }
    }
}

#[wasm_bindgen]
pub fn is_started() -> bool {
    APP.with(|slot| slot.borrow().is_some())
}

/// Rows currently hidden by the overlay.
#[wasm_bindgen]
pub fn hidden_count() -> u32 {
    APP.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(0, |app| app.borrow().session.hidden_count() as u32)
    })
}

/// Abandon every pending wait for loaded results.
#[wasm_bindgen]
pub fn cancel_pending() {
    APP.with(|slot| {
        if let Some(app) = slot.borrow().as_ref() {
            poll::cancel_all(&mut app.borrow_mut());
        }
    });
}

/// App IDs in a results fragment that the given options hide.
///
/// `options_json` uses the same shape as the CLI's `--options` file.
#[wasm_bindgen]
pub fn evaluate_fragment(html: &str, options_json: &str) -> Result<JsValue, JsValue> {
    let options = FilterOptions::from_json(options_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let ids = js_sys::Array::new();
    for id in esf_markup::screen_fragment(html, &options) {
        ids.push(&JsValue::from_str(&id));
    }
    Ok(ids.into())
}
