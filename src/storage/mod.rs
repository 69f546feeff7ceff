use crate::models::Session;
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_KEY: &str = "procon_memo_session";

/// Local storage: survives restarts. Used only for the session mirror.
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Session storage: scoped to the browser tab. Used for drafts and the
/// memo-view cache.
fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.session_storage().ok().flatten())
}

pub(crate) fn save_session_to_storage(session: &Session) {
    if let Ok(json) = serde_json::to_string(session) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(SESSION_KEY, &json);
        }
    }
}

pub(crate) fn load_session_from_storage() -> Option<Session> {
    let storage = local_storage()?;
    let json = storage.get_item(SESSION_KEY).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn clear_session_storage() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SESSION_KEY);
    }
}

pub(crate) fn load_json_from_session<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = session_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_session<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = session_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_session(key: &str) {
    if let Some(storage) = session_storage() {
        let _ = storage.remove_item(key);
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::models::UserInfo;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_session_storage_roundtrip() {
        clear_session_storage();
        assert!(load_session_from_storage().is_none());

        let session = Session {
            token: "t1".to_string(),
            user: UserInfo {
                id: "u1".to_string(),
                email: Some("u@example.com".to_string()),
                metadata: serde_json::json!({}),
            },
        };
        save_session_to_storage(&session);

        let loaded = load_session_from_storage().expect("session should load");
        assert_eq!(loaded.token, "t1");
        assert_eq!(loaded.user_id(), "u1");

        clear_session_storage();
        assert!(load_session_from_storage().is_none());
    }

    #[wasm_bindgen_test]
    fn test_session_scoped_json_roundtrip() {
        remove_from_session("procon_memo_test_key");
        assert!(load_json_from_session::<Vec<String>>("procon_memo_test_key").is_none());

        save_json_to_session("procon_memo_test_key", &vec!["a".to_string()]);
        let v = load_json_from_session::<Vec<String>>("procon_memo_test_key")
            .expect("value should load");
        assert_eq!(v, vec!["a".to_string()]);

        remove_from_session("procon_memo_test_key");
    }
}
