use crate::config::RESET_PROMPT;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Medal shown in front of the first three places.
pub fn medal(rank: usize) -> &'static str {
    match rank {
        0 => "🥇",
        1 => "🥈",
        2 => "🥉",
        _ => "",
    }
}

/// Ask the operator to confirm a reset. A dialog that cannot be shown counts as "no".
pub fn confirm_reset() -> bool {
    gloo_utils::window()
        .confirm_with_message(RESET_PROMPT)
        .unwrap_or(false)
}

pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn textarea_value(e: &InputEvent) -> String {
    let area: HtmlTextAreaElement = e.target_unchecked_into();
    area.value()
}

pub fn checkbox_checked(e: &Event) -> bool {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.checked()
}

/// `onerror` handler that hides a broken image instead of showing the browser placeholder.
pub fn hide_broken_image() -> Callback<Event> {
    Callback::from(|e: Event| {
        if let Some(img) = e.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
            let _ = img.style().set_property("display", "none");
        }
    })
}
