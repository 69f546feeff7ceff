#![allow(dead_code)]

use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Native `<select>` with the Input's look. The memo forms only need a
/// closed option list, not a searchable listbox.
#[component]
pub fn Select(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] id: String,
    #[prop(optional)] required: bool,
    #[prop(optional)] disabled: bool,

    /// (value, label) pairs rendered in order.
    #[prop(into)] options: Vec<(String, String)>,

    /// First entry shown for the empty value.
    #[prop(into, optional)] placeholder: String,

    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm",
        "focus-visible:border-ring focus-visible:ring-ring/50",
        "focus-visible:ring-2",
        class
    );

    let on_change = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(select) = target.dyn_ref::<web_sys::HtmlSelectElement>() {
                bind_value.set(select.value());
            }
        }
    };

    view! {
        <select
            data-name="Select"
            class=merged_class
            id=id
            required=required
            disabled=disabled
            prop:value=move || bind_value.get()
            on:change=on_change
        >
            {(!placeholder.is_empty()).then(|| view! { <option value="">{placeholder}</option> })}
            {options
                .into_iter()
                .map(|(value, label)| {
                    let selected = {
                        let value = value.clone();
                        move || bind_value.get() == value
                    };
                    view! {
                        <option value=value selected=selected>{label}</option>
                    }
                })
                .collect_view()}
        </select>
    }
    .into_any()
}
