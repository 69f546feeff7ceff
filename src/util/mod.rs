/// Synchronous browser confirmation; false when no window (native tests).
pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .map(|w| w.confirm_with_message(message).unwrap_or(false))
        .unwrap_or(false)
}

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Format an ISO-8601 timestamp from the datastore for display.
///
/// Uses the browser's locale (the datastore returns UTC).
pub(crate) fn format_timestamp(iso: &str) -> String {
    let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_str(iso));
    if d.get_time().is_nan() {
        return iso.to_string();
    }
    format!(
        "{:04}/{:02}/{:02} {:02}:{:02}",
        d.get_full_year(),
        d.get_month() + 1,
        d.get_date(),
        d.get_hours(),
        d.get_minutes()
    )
}
