//! Request hook
//!
//! The host loads further results with `XMLHttpRequest`. Its `send` is wrapped
//! once so every completed request is handed to an [`Interceptor`]; only the
//! interceptor decides what is relevant.

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::XmlHttpRequest;

use esf_core::{CompletedRequest, Interceptor, PendingHide, SearchResponse};

use crate::{poll, InitError, SharedApp};

/// Wraps `send` so a `load` listener reports the request back to Rust.
const WRAP_SEND: &str = "return function() { \
    this.addEventListener('load', () => observe(this)); \
    return send.apply(this, arguments); \
};";

/// Screen a response fragment and schedule hiding of the failing rows.
pub(crate) fn on_results(app: &SharedApp, response: SearchResponse) {
    let (app_ids, policy) = {
        let app = app.borrow();
        if !app.session.is_engaged() {
            return;
        }
        let ids = esf_markup::screen_fragment(&response.results_html, app.session.options());
        (ids, app.policy)
    };

    let Some(pending) = PendingHide::new(app_ids, policy) else {
        return;
    };
    log::debug!("{} loaded results to hide", pending.app_ids().len());

    if let Err(e) = poll::schedule(app, pending) {
        log::error!("Failed to schedule hiding of loaded results: {e}");
    }
}

pub(crate) fn install(app: &SharedApp) -> Result<(), InitError> {
    let global = js_sys::global();
    let ctor = Reflect::get(&global, &"XMLHttpRequest".into())?;
    let proto = Reflect::get(&ctor, &"prototype".into())?;
    let send: Function = Reflect::get(&proto, &"send".into())?
        .dyn_into()
        .map_err(|_| InitError::MissingElement("XMLHttpRequest.prototype.send"))?;

    let app = app.clone();
    let mut interceptor =
        Interceptor::for_search_results(move |response: SearchResponse| on_results(&app, response));

    let observe = Closure::<dyn FnMut(XmlHttpRequest)>::new(move |xhr: XmlHttpRequest| {
        let url = xhr.response_url();
        let body = xhr.response_text().ok().flatten().unwrap_or_default();
        interceptor.observe(&CompletedRequest {
            url: &url,
            status: xhr.status().unwrap_or(0),
            done: xhr.ready_state() == XmlHttpRequest::DONE,
            body: &body,
        });
    });

    let wrap = Function::new_with_args("send, observe", WRAP_SEND);
    let patched = wrap.call2(&JsValue::NULL, &send, observe.as_ref())?;
    Reflect::set(&proto, &"send".into(), &patched)?;
    observe.forget();

    log::debug!("Request hook installed");
    Ok(())
}
