//! Fetch plumbing for the two colony endpoints. Failures collapse into a
//! `String` message that callers log and otherwise swallow.

use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Torb-list URL for the current action filter selection. No selection means
/// no query parameter, which the server treats as "everything".
pub fn filter_url(base: &str, actions: &[String]) -> String {
    if actions.is_empty() {
        return base.to_string();
    }
    let list = actions
        .iter()
        .map(|action| action.trim().to_lowercase())
        .collect::<Vec<String>>()
        .join(",");
    format!("{base}?action={list}")
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let window = web_sys::window().ok_or("no global window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|_| format!("GET {url}: request failed"))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| format!("GET {url}: not a Response"))?;
    if !response.ok() {
        return Err(format!("GET {url}: HTTP {}", response.status()));
    }

    let body = JsFuture::from(
        response
            .text()
            .map_err(|_| format!("GET {url}: body unavailable"))?,
    )
    .await
    .map_err(|_| format!("GET {url}: body read failed"))?;
    let body: String = body
        .dyn_into::<js_sys::JsString>()
        .map_err(|_| format!("GET {url}: body is not a string"))?
        .into();

    serde_json::from_str(&body).map_err(|e| format!("GET {url}: bad JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_omits_the_query_parameter() {
        assert_eq!(filter_url("/play/3/torbs/", &[]), "/play/3/torbs/");
    }

    #[test]
    fn selected_actions_are_lowercased_and_comma_joined() {
        let actions = vec!["Gathering".to_string(), "BREEDING".to_string()];
        assert_eq!(
            filter_url("/play/3/torbs/", &actions),
            "/play/3/torbs/?action=gathering,breeding"
        );
    }

    #[test]
    fn action_names_are_trimmed() {
        let actions = vec![" resting ".to_string()];
        assert_eq!(
            filter_url("/play/3/torbs/", &actions),
            "/play/3/torbs/?action=resting"
        );
    }
}
