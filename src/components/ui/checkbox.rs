#![allow(dead_code)]

use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

#[component]
pub fn Checkbox(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] id: String,
    #[prop(optional)] disabled: bool,

    // Same manual two-way wiring as Input.
    #[prop(into)] bind_value: RwSignal<bool>,
) -> impl IntoView {
    let merged_class = tw_merge!("size-4 cursor-pointer disabled:cursor-not-allowed", class);

    let on_change = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                bind_value.set(input.checked());
            }
        }
    };

    view! {
        <input
            data-name="Checkbox"
            type="checkbox"
            class=merged_class
            id=id
            disabled=disabled
            prop:checked=move || bind_value.get()
            on:change=on_change
        />
    }
    .into_any()
}
