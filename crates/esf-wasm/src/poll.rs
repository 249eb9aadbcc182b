//! Interval driver for [`PendingHide`].
//!
//! One interval per page polls every pending wait. It is cleared once the
//! last wait finishes and restarted by the next response.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use esf_core::{PendingHide, PollState};

use crate::dom::LiveList;
use crate::{document, window, App, InitError, SharedApp};

/// Interval callback and the handle of the running interval, if any.
pub(crate) struct PollTimer {
    callback: Closure<dyn FnMut()>,
    handle: Option<i32>,
}

impl PollTimer {
    fn new(app: Weak<RefCell<App>>) -> Self {
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(app) = app.upgrade() {
                tick(&app);
            }
        });
        Self {
            callback,
            handle: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

/// Queue a wait and make sure the interval is running.
pub(crate) fn schedule(app: &SharedApp, pending: PendingHide) -> Result<(), InitError> {
    let interval_ms = pending.policy().interval_ms as i32;
    let mut state = app.borrow_mut();
    state.pending.push(pending);

    let timer = state
        .timer
        .get_or_insert_with(|| PollTimer::new(Rc::downgrade(app)));
    if timer.is_running() {
        return Ok(());
    }
    let handle = window()?.set_interval_with_callback_and_timeout_and_arguments_0(
        timer.callback.as_ref().unchecked_ref(),
        interval_ms,
    )?;
    timer.handle = Some(handle);
    Ok(())
}

/// Poll every pending wait once.
pub(crate) fn tick(app: &SharedApp) {
    let Ok(document) = document() else { return };
    let mut list = LiveList::new(document);
    let mut state = app.borrow_mut();

    let mut hidden = 0;
    state.pending.retain_mut(|pending| {
        let poll = pending.poll(&mut list);
        if let PollState::Applied(count) = poll {
            hidden += count;
        }
        !poll.is_finished()
    });

    if hidden > 0 {
        state.session.record_hidden(hidden);
        log::info!(
            "{hidden} loaded results hidden ({} in total)",
            state.session.hidden_count()
        );
    }
    if state.pending.is_empty() {
        stop(&mut state);
    }
}

/// Cancel every wait and stop the interval.
pub(crate) fn cancel_all(app: &mut App) {
    for pending in app.pending.drain(..) {
        pending.cancel_token().cancel();
    }
    stop(app);
}

fn stop(app: &mut App) {
    let Some(handle) = app.timer.as_mut().and_then(|timer| timer.handle.take()) else {
        return;
    };
    if let Ok(window) = window() {
        window.clear_interval_with_handle(handle);
    }
}
