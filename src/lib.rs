mod api;
mod app;
mod cache;
mod components;
mod drafts;
mod editor;
mod filter;
mod markdown;
mod models;
mod pages;
mod state;
mod storage;
mod util;
mod webhook;

use leptos::prelude::mount_to_body;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(app::App);
}
