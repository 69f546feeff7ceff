use crate::models::MemoDraft;
use crate::storage::{load_json_from_session, remove_from_session, save_json_to_session};

/// Draft key: an existing memo id, or the sentinel for new-memo creation.
/// At most one draft per (tab session, key) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DraftKey {
    New,
    Memo(String),
}

impl DraftKey {
    fn storage_key(&self) -> String {
        match self {
            DraftKey::New => "procon_memo_draft::new".to_string(),
            DraftKey::Memo(id) => format!("procon_memo_draft::{id}"),
        }
    }

    pub fn for_memo_id(id: &str) -> Self {
        if id.trim().is_empty() {
            DraftKey::New
        } else {
            DraftKey::Memo(id.to_string())
        }
    }
}

pub(crate) fn load_draft(key: &DraftKey) -> Option<MemoDraft> {
    load_json_from_session::<MemoDraft>(&key.storage_key())
}

/// Write-through on every field mutation; the snapshot is always the full
/// form state, which is what survives a reload.
pub(crate) fn save_draft(key: &DraftKey, draft: &MemoDraft) {
    save_json_to_session(&key.storage_key(), draft);
}

pub(crate) fn clear_draft(key: &DraftKey) {
    remove_from_session(&key.storage_key());
}

/// Outcome of comparing a pending draft against the persisted document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DraftDecision {
    /// No draft: load persisted fields (or blank defaults).
    UseServer,
    /// Draft exists but every tracked field is blank: clear it silently.
    DiscardEmpty,
    /// Draft carries user work: the UI must ask before restoring it.
    PromptRestore(MemoDraft),
}

/// Pure reconciliation, separated from the browser confirm mechanism. The
/// editor page maps `PromptRestore` onto a synchronous confirmation dialog;
/// the other arms never prompt.
pub(crate) fn reconcile(draft: Option<MemoDraft>) -> DraftDecision {
    match draft {
        None => DraftDecision::UseServer,
        Some(d) if d.is_blank() => DraftDecision::DiscardEmpty,
        Some(d) => DraftDecision::PromptRestore(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_without_draft_uses_server() {
        assert_eq!(reconcile(None), DraftDecision::UseServer);
    }

    #[test]
    fn test_reconcile_blank_draft_is_discarded_without_prompt() {
        assert_eq!(
            reconcile(Some(MemoDraft::default())),
            DraftDecision::DiscardEmpty
        );
    }

    #[test]
    fn test_reconcile_nonempty_draft_prompts_with_exact_fields() {
        let draft = MemoDraft {
            title: "DP intro".to_string(),
            tags: "dp algorithm".to_string(),
            category: "algorithm".to_string(),
            ..Default::default()
        };
        match reconcile(Some(draft.clone())) {
            DraftDecision::PromptRestore(d) => assert_eq!(d, draft),
            other => panic!("expected PromptRestore, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_key_sentinel_for_blank_ids() {
        assert_eq!(DraftKey::for_memo_id(""), DraftKey::New);
        assert_eq!(DraftKey::for_memo_id("  "), DraftKey::New);
        assert_eq!(
            DraftKey::for_memo_id("a1"),
            DraftKey::Memo("a1".to_string())
        );
    }

    #[test]
    fn test_storage_keys_are_distinct_per_memo() {
        let a = DraftKey::Memo("a".to_string()).storage_key();
        let b = DraftKey::Memo("b".to_string()).storage_key();
        let new = DraftKey::New.storage_key();
        assert_ne!(a, b);
        assert_ne!(a, new);
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_draft_storage_roundtrip_and_clear() {
        let key = DraftKey::Memo("wasm-test".to_string());
        clear_draft(&key);
        assert!(load_draft(&key).is_none());

        let draft = MemoDraft {
            title: "t".to_string(),
            publish: true,
            ..Default::default()
        };
        save_draft(&key, &draft);
        assert_eq!(load_draft(&key), Some(draft));

        clear_draft(&key);
        assert!(load_draft(&key).is_none());
    }
}
