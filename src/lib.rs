//! Browser client for the Hereditus colony view: breeding selection,
//! turn-readiness polling, and the filter/sort/tooltip behavior of the torb
//! table. Game rules and persistence live on the server; this crate only
//! renders what the colony endpoints report.

mod dto;
mod net;
mod poll;
mod render;
mod vm;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::poll::ReadyPoller;
use crate::vm::ViewState;

// --- LOGGING ---
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub(crate) fn log(s: &str);
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub(crate) fn error(s: &str);
}

/// Entry point, called by the colony page with its per-colony endpoint URLs:
/// the readiness check and the filtered torb list.
#[wasm_bindgen]
pub fn run_colony_view(ready_url: &str, torbs_url: &str) -> Result<(), JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("no global `window` exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document on window"))?;

    let view = Rc::new(RefCell::new(ViewState::default()));
    let poller = ReadyPoller::new(ready_url);

    // The server-rendered table is live until the first fetch lands.
    render::attach_row_handlers(&document);
    render::refresh_breed_button(&document);

    render::wire_sort_headers(&document, &view);
    render::wire_fertility_filter(&document, &view);
    render::wire_action_filters(&document, torbs_url, &view);
    render::wire_end_turn(&document, &poller);
    render::scroll_story_console(&document);

    poller.kick_off();
    render::refresh_table(&document, torbs_url, &view);

    Ok(())
}
