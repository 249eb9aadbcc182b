//! Live DOM adapters
//!
//! Wraps host elements so the core evaluator and scanner can read and
//! toggle them.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, EventTarget, HtmlElement};

use esf_core::host::{
    app_row_selector, APP_ID_ATTR, BASE_PRICE_SELECTOR, DISCOUNT_SELECTOR, LIVE_ROW_SELECTOR,
    PRICE_FINAL_ATTR, PRICE_SELECTOR, REVIEW_SELECTOR, REVIEW_TOOLTIP_ATTR, TITLE_SELECTOR,
};
use esf_core::{HostMarkers, ResultContainer, ResultItem, ResultRow};

// =============================================================================
// Helpers
// =============================================================================

/// First descendant matching `selector`.
pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

/// First element in the document matching `selector`.
pub fn query_doc(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// Every element in the document matching `selector`.
pub fn query_all<T: JsCast>(document: &Document, selector: &str) -> Vec<T> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Every descendant of `root` matching `selector`.
pub fn query_all_in<T: JsCast>(root: &Element, selector: &str) -> Vec<T> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// Dispatch a plain event, like jQuery's `trigger`.
pub fn fire(target: &EventTarget, event: &str) {
    if let Ok(event) = web_sys::Event::new(event) {
        let _ = target.dispatch_event(&event);
    }
}

pub fn text_of(el: Option<Element>) -> Option<String> {
    el.map(|el| el.text_content().unwrap_or_default().trim().to_string())
}

/// Build a detached element from markup.
pub fn element_from_html(document: &Document, html: &str) -> Result<HtmlElement, JsValue> {
    let holder = document.create_element("div")?;
    holder.set_inner_html(html);
    holder
        .first_element_child()
        .ok_or_else(|| JsValue::from_str("empty markup"))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str("markup is not an HTML element"))
}

pub fn is_displayed(el: &HtmlElement) -> bool {
    el.style().get_property_value("display").map_or(true, |d| d != "none")
}

pub fn set_displayed(el: &HtmlElement, displayed: bool) {
    let style = el.style();
    let _ = if displayed {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
}

/// Attach an event handler for the lifetime of the page.
pub fn on<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::Event) + 'static,
{
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// =============================================================================
// Rows
// =============================================================================

/// One rendered search result row.
#[derive(Debug, Clone)]
pub struct DomRow {
    el: HtmlElement,
}

impl DomRow {
    pub fn new(el: HtmlElement) -> Self {
        Self { el }
    }

    /// Rows currently rendered in the result list.
    pub fn collect(document: &Document) -> Vec<Self> {
        query_all::<HtmlElement>(document, LIVE_ROW_SELECTOR)
            .into_iter()
            .map(Self::new)
            .collect()
    }

    fn price_element(&self) -> Option<Element> {
        query(&self.el, PRICE_SELECTOR)
    }
}

impl ResultItem for DomRow {
    fn markers(&self) -> HostMarkers {
        HostMarkers::from_class_list(&self.el.class_name())
    }

    fn final_price(&self) -> Option<String> {
        self.price_element()?.get_attribute(PRICE_FINAL_ATTR)
    }

    fn base_price_text(&self) -> Option<String> {
        text_of(query(&self.price_element()?, BASE_PRICE_SELECTOR))
    }

    fn discount_text(&self) -> Option<String> {
        text_of(query(&self.el, DISCOUNT_SELECTOR))
    }

    fn title(&self) -> Option<String> {
        text_of(query(&self.el, TITLE_SELECTOR))
    }

    fn rating_tooltip(&self) -> Option<String> {
        query(&self.el, REVIEW_SELECTOR)?.get_attribute(REVIEW_TOOLTIP_ATTR)
    }

    fn app_id(&self) -> Option<String> {
        self.el.get_attribute(APP_ID_ATTR)
    }
}

impl ResultRow for DomRow {
    /// No layout box, like jQuery's `:hidden`.
    fn is_hidden(&self) -> bool {
        self.el.offset_width() == 0 && self.el.offset_height() == 0
    }

    fn set_hidden(&mut self, hidden: bool) {
        set_displayed(&self.el, !hidden);
    }
}

// =============================================================================
// Live List
// =============================================================================

/// The host's live result list, addressed by app ID.
pub struct LiveList {
    document: Document,
}

impl LiveList {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ResultContainer for LiveList {
    fn contains(&self, app_id: &str) -> bool {
        query_doc(&self.document, &app_row_selector(app_id)).is_some()
    }

    fn hide(&mut self, app_id: &str) -> bool {
        let rows = query_all::<HtmlElement>(&self.document, &app_row_selector(app_id));
        for row in &rows {
            set_displayed(row, false);
        }
        !rows.is_empty()
    }
}
