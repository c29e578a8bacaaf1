//! Turn-readiness polling. The poller owns its phase: `Idle` until the
//! server first reports ready, `Polling` while the repeating timer is live.
//! A not-ready answer during `Polling` reloads the page, which restarts the
//! whole client fresh.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::dto::ReadyStatus;
use crate::net;
use crate::{error, log};

pub const POLL_PERIOD_MS: i32 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Polling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollDirective {
    StartTimer,
    Continue,
    ReloadPage,
}

/// What a readiness answer means in a given phase. Kept pure so the loop
/// behavior is testable without a timer or a browser.
pub fn transition(phase: PollPhase, ready: bool) -> (PollPhase, PollDirective) {
    match (phase, ready) {
        (PollPhase::Idle, true) => (PollPhase::Polling, PollDirective::StartTimer),
        (PollPhase::Idle, false) => (PollPhase::Idle, PollDirective::Continue),
        (PollPhase::Polling, true) => (PollPhase::Polling, PollDirective::Continue),
        (PollPhase::Polling, false) => (PollPhase::Polling, PollDirective::ReloadPage),
    }
}

struct PollerInner {
    url: String,
    interval_id: Cell<Option<i32>>,
}

#[derive(Clone)]
pub struct ReadyPoller {
    inner: Rc<PollerInner>,
}

impl ReadyPoller {
    pub fn new(url: &str) -> ReadyPoller {
        ReadyPoller {
            inner: Rc::new(PollerInner {
                url: url.to_string(),
                interval_id: Cell::new(None),
            }),
        }
    }

    pub fn phase(&self) -> PollPhase {
        if self.inner.interval_id.get().is_some() {
            PollPhase::Polling
        } else {
            PollPhase::Idle
        }
    }

    /// One readiness request on page load; starts the timer only if the
    /// colony is already ready.
    pub fn kick_off(&self) {
        let poller = self.clone();
        spawn_local(async move {
            log("checking initial colony status");
            match net::fetch_json::<ReadyStatus>(&poller.inner.url).await {
                Ok(status) => poller.dispatch(status.ready),
                Err(e) => error(&format!("initial ready check failed: {e}")),
            }
        });
    }

    /// Idempotent: a no-op while a timer is already live.
    pub fn start(&self) {
        if self.inner.interval_id.get().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            error("no window, polling unavailable");
            return;
        };
        let poller = self.clone();
        let cb = Closure::wrap(Box::new(move || poller.tick()) as Box<dyn FnMut()>);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            POLL_PERIOD_MS,
        ) {
            Ok(id) => {
                cb.forget();
                self.inner.interval_id.set(Some(id));
                log("readiness polling started");
            }
            Err(_) => error("failed to start readiness polling"),
        }
    }

    /// Clears any live timer before starting a fresh one. Used by the
    /// end-turn control so at most one interval ever runs.
    pub fn restart(&self) {
        if let Some(id) = self.inner.interval_id.take() {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(id);
            }
        }
        self.start();
    }

    fn tick(&self) {
        let poller = self.clone();
        spawn_local(async move {
            match net::fetch_json::<ReadyStatus>(&poller.inner.url).await {
                Ok(status) => poller.dispatch(status.ready),
                Err(e) => error(&format!("ready check failed: {e}")),
            }
        });
    }

    fn dispatch(&self, ready: bool) {
        let (_, directive) = transition(self.phase(), ready);
        match directive {
            PollDirective::StartTimer => self.start(),
            PollDirective::Continue => {}
            PollDirective::ReloadPage => {
                log("colony is no longer ready, reloading page");
                reload_page();
            }
        }
    }
}

fn reload_page() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if window.location().reload().is_err() {
        error("page reload failed");
    }
}
