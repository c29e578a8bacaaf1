//! DOM side of the colony view: table rebuild, sort/filter application,
//! breeding selector, tooltips, end-turn wiring. Rows are thrown away and
//! rebuilt on every fetch, so row handlers are re-attached as part of
//! rendering rather than relied on to survive.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use crate::dto::{TorbListResponse, TorbRecord};
use crate::net;
use crate::poll::ReadyPoller;
use crate::vm::{self, FertilityFilter, RowSelection, SortSpec, ViewState};
use crate::{error, log};

const ROW_SELECTOR: &str = "#torb-table tbody tr";
const HEADER_SELECTOR: &str = "#torb-table thead th";
const TOOLTIP_CLASS: &str = "torb-tooltip";
const WAITING_LABEL: &str = "Waiting for other players...";

// Column 0 holds the selection checkboxes and is not sortable.
const SELECT_COLUMN: usize = 0;

// --- FETCH & RENDER ---

pub(crate) fn refresh_table(document: &Document, torbs_url: &str, view: &Rc<RefCell<ViewState>>) {
    let url = net::filter_url(torbs_url, &selected_actions(document));
    let document = document.clone();
    let view = Rc::clone(view);
    spawn_local(async move {
        match net::fetch_json::<TorbListResponse>(&url).await {
            Ok(list) => {
                log(&format!("rendering {} torbs", list.torbs.len()));
                if let Err(e) = rebuild_rows(&document, &list.torbs, &view) {
                    error(&format!("table render failed: {e}"));
                }
            }
            Err(e) => error(&format!("torb list fetch failed: {e}")),
        }
    });
}

fn selected_actions(document: &Document) -> Vec<String> {
    select_all(document, ".action-filter")
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
        .filter(|checkbox| checkbox.checked())
        .map(|checkbox| checkbox.value())
        .collect()
}

fn rebuild_rows(
    document: &Document,
    torbs: &[TorbRecord],
    view: &Rc<RefCell<ViewState>>,
) -> Result<(), String> {
    let tbody = table_body(document).ok_or("torb table body not found")?;
    tbody.set_inner_html("");
    for torb in torbs {
        let row = build_row(document, torb)?;
        tbody
            .append_child(&row)
            .map_err(|_| "row append failed".to_string())?;
    }

    attach_row_handlers(document);
    let (sort, filter) = {
        let view = view.borrow();
        (view.sort, view.filter)
    };
    if let Some(spec) = sort {
        apply_sort(document, spec);
    }
    apply_fertility_filter(document, filter);
    refresh_breed_button(document);
    Ok(())
}

fn build_row(document: &Document, torb: &TorbRecord) -> Result<Element, String> {
    let row = create(document, "tr")?;
    row.set_attribute("data-fertile", if torb.fertile { "true" } else { "false" })
        .map_err(|_| "row attribute failed".to_string())?;

    let select_cell = create(document, "td")?;
    let checkbox = create(document, "input")?;
    checkbox.set_class_name("torb-checkbox");
    checkbox
        .set_attribute("type", "checkbox")
        .map_err(|_| "checkbox type failed".to_string())?;
    append(&select_cell, &checkbox)?;
    append(&row, &select_cell)?;

    for text in vm::torb_cells(torb) {
        let cell = create(document, "td")?;
        cell.set_text_content(Some(&text));
        append(&row, &cell)?;
    }

    let status_cell = create(document, "td")?;
    let icon = create(document, "span")?;
    icon.set_class_name("status-icon");
    icon.set_text_content(Some("ℹ️"));
    icon.set_attribute("data-status", &torb.status)
        .map_err(|_| "status attribute failed".to_string())?;
    append(&status_cell, &icon)?;
    append(&row, &status_cell)?;

    Ok(row)
}

/// Selection-checkbox and tooltip handlers for every current row. Called
/// once at startup for the server-rendered table and again after every
/// rebuild.
pub(crate) fn attach_row_handlers(document: &Document) {
    for row in select_all(document, ROW_SELECTOR) {
        if let Some(checkbox) = row.query_selector(".torb-checkbox").ok().flatten() {
            let doc = document.clone();
            listen(&checkbox, "change", Box::new(move |_| refresh_breed_button(&doc)));
        }
        if let Some(icon) = row.query_selector(".status-icon").ok().flatten() {
            let doc = document.clone();
            let hover_icon = icon.clone();
            listen(
                &icon,
                "mouseenter",
                Box::new(move |_| {
                    if let Err(e) = show_tooltip(&doc, &hover_icon) {
                        error(&format!("tooltip failed: {e}"));
                    }
                }),
            );
            let doc = document.clone();
            listen(&icon, "mouseleave", Box::new(move |_| hide_tooltip(&doc)));
        }
    }
}

// --- BREEDING SELECTOR ---

pub(crate) fn refresh_breed_button(document: &Document) {
    let selections: Vec<RowSelection> = select_all(document, ROW_SELECTOR)
        .iter()
        .map(|row| RowSelection {
            checked: row
                .query_selector(".torb-checkbox")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|checkbox| checkbox.checked())
                .unwrap_or(false),
            fertile: row_is_fertile(row),
        })
        .collect();

    let enabled = vm::breed_enabled(&selections);
    if let Some(button) = document
        .get_element_by_id("breed-button")
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    {
        button.set_disabled(!enabled);
    }
}

fn row_is_fertile(row: &Element) -> bool {
    // Server-rendered rows capitalize the flag; client-rendered rows don't.
    row.get_attribute("data-fertile")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

// --- SORT ---

pub(crate) fn wire_sort_headers(document: &Document, view: &Rc<RefCell<ViewState>>) {
    for (col, th) in select_all(document, HEADER_SELECTOR).into_iter().enumerate() {
        if col == SELECT_COLUMN {
            continue;
        }
        let doc = document.clone();
        let view = Rc::clone(view);
        listen(
            &th,
            "click",
            Box::new(move |_| {
                let spec = view.borrow_mut().toggle_sort(col);
                apply_sort(&doc, spec);
            }),
        );
    }
}

/// Reorders the existing row elements by the view-model's permutation;
/// re-appending moves each row, so checkbox state is preserved.
pub(crate) fn apply_sort(document: &Document, spec: SortSpec) {
    let Some(tbody) = table_body(document) else {
        return;
    };
    let rows = select_all(document, ROW_SELECTOR);
    let keys: Vec<String> = rows.iter().map(|row| cell_text(row, spec.col)).collect();
    for idx in vm::sorted_order(&keys, spec.dir) {
        if tbody.append_child(&rows[idx]).is_err() {
            error("sort reorder failed");
            return;
        }
    }
    update_sort_arrows(document, spec);
}

fn cell_text(row: &Element, col: usize) -> String {
    row.children()
        .item(col as u32)
        .and_then(|cell| cell.text_content())
        .unwrap_or_default()
}

fn update_sort_arrows(document: &Document, spec: SortSpec) {
    for (col, th) in select_all(document, HEADER_SELECTOR).into_iter().enumerate() {
        let arrow = match th.query_selector(".sort-arrow").ok().flatten() {
            Some(el) => el,
            None => {
                let Ok(el) = document.create_element("span") else {
                    continue;
                };
                el.set_class_name("sort-arrow");
                if th.append_child(&el).is_err() {
                    continue;
                }
                el
            }
        };
        arrow.set_text_content(Some(if col == spec.col { spec.dir.arrow() } else { "" }));
    }
}

// --- FERTILITY FILTER ---

pub(crate) fn wire_fertility_filter(document: &Document, view: &Rc<RefCell<ViewState>>) {
    let Some(button) = document.get_element_by_id("fertility-filter") else {
        return;
    };
    button.set_text_content(Some(view.borrow().filter.label()));

    let doc = document.clone();
    let view = Rc::clone(view);
    let label_target = button.clone();
    listen(
        &button,
        "click",
        Box::new(move |_| {
            let mode = view.borrow_mut().cycle_filter();
            label_target.set_text_content(Some(mode.label()));
            apply_fertility_filter(&doc, mode);
        }),
    );
}

pub(crate) fn apply_fertility_filter(document: &Document, mode: FertilityFilter) {
    for row in select_all(document, ROW_SELECTOR) {
        let visible = mode.matches(row_is_fertile(&row));
        let Ok(row) = row.dyn_into::<HtmlElement>() else {
            continue;
        };
        let updated = if visible {
            row.style().remove_property("display").map(|_| ())
        } else {
            row.style().set_property("display", "none")
        };
        if updated.is_err() {
            error("fertility filter style update failed");
        }
    }
}

// --- ACTION FILTERS ---

pub(crate) fn wire_action_filters(
    document: &Document,
    torbs_url: &str,
    view: &Rc<RefCell<ViewState>>,
) {
    for checkbox in select_all(document, ".action-filter") {
        let doc = document.clone();
        let url = torbs_url.to_string();
        let view = Rc::clone(view);
        listen(
            &checkbox,
            "change",
            Box::new(move |_| refresh_table(&doc, &url, &view)),
        );
    }
}

// --- TOOLTIP ---

fn show_tooltip(document: &Document, icon: &Element) -> Result<(), String> {
    hide_tooltip(document);

    let status = icon.get_attribute("data-status").unwrap_or_default();
    let tip = create(document, "div")?;
    tip.set_class_name(TOOLTIP_CLASS);
    // Status strings carry <br> separators.
    tip.set_inner_html(&status);
    let body = document.body().ok_or("no document body")?;
    body.append_child(&tip)
        .map_err(|_| "tooltip append failed".to_string())?;

    let tip: HtmlElement = tip
        .dyn_into()
        .map_err(|_| "tooltip element cast failed".to_string())?;
    let window = web_sys::window().ok_or("no global window")?;
    let rect = icon.get_bounding_client_rect();
    let scroll_x = window.scroll_x().unwrap_or(0.0);
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let top = rect.top() + scroll_y - f64::from(tip.offset_height()) - 8.0;
    let left = rect.left() + scroll_x + rect.width() / 2.0 - f64::from(tip.offset_width()) / 2.0;

    let style = tip.style();
    style
        .set_property("position", "absolute")
        .and_then(|_| style.set_property("top", &format!("{top}px")))
        .and_then(|_| style.set_property("left", &format!("{left}px")))
        .and_then(|_| style.set_property("visibility", "visible"))
        .map_err(|_| "tooltip position failed".to_string())
}

fn hide_tooltip(document: &Document) {
    if let Some(tip) = document
        .query_selector(&format!(".{TOOLTIP_CLASS}"))
        .ok()
        .flatten()
    {
        tip.remove();
    }
}

// --- END TURN ---

pub(crate) fn wire_end_turn(document: &Document, poller: &ReadyPoller) {
    let Some(button) = document.get_element_by_id("endTurnButton") else {
        return;
    };
    let Ok(Some(form)) = button.closest("form") else {
        return;
    };

    let doc = document.clone();
    let poller = poller.clone();
    let form_target = form.clone();
    listen(
        &form,
        "submit",
        Box::new(move |_| {
            if let Err(e) = mark_turn_ended(&doc, &form_target) {
                error(&format!("end turn submit failed: {e}"));
            }
            poller.restart();
        }),
    );
}

fn mark_turn_ended(document: &Document, form: &Element) -> Result<(), String> {
    let hidden = create(document, "input")?;
    hidden
        .set_attribute("type", "hidden")
        .and_then(|_| hidden.set_attribute("name", "action"))
        .and_then(|_| hidden.set_attribute("value", "end_turn"))
        .map_err(|_| "hidden action field failed".to_string())?;
    append(form, &hidden)?;

    if let Some(button) = document
        .get_element_by_id("endTurnButton")
        .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    {
        button.set_disabled(true);
        button.set_inner_text(WAITING_LABEL);
    }
    Ok(())
}

// --- STORY CONSOLE ---

pub(crate) fn scroll_story_console(document: &Document) {
    if let Some(console_el) = document.get_element_by_id("story-console") {
        console_el.set_scroll_top(console_el.scroll_height());
    }
}

// --- DOM HELPERS ---

fn table_body(document: &Document) -> Option<Element> {
    document.query_selector("#torb-table tbody").ok().flatten()
}

fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn create(document: &Document, tag: &str) -> Result<Element, String> {
    document
        .create_element(tag)
        .map_err(|_| format!("create_element({tag}) failed"))
}

fn append(parent: &Element, child: &Element) -> Result<(), String> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|_| "append_child failed".to_string())
}

fn listen(target: &Element, event: &str, handler: Box<dyn FnMut(web_sys::Event)>) {
    let closure = Closure::wrap(handler);
    if target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        error(&format!("failed to attach {event} listener"));
    }
    // Handlers live until the row (or page) is torn down.
    closure.forget();
}
