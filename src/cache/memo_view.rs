use crate::models::{Comment, Memo};
use crate::storage::{load_json_from_session, remove_from_session, save_json_to_session};
use serde::{Deserialize, Serialize};

/// Cached memo+comments view expires after five minutes.
const TTL_MS: i64 = 5 * 60 * 1000;

fn key(memo_id: &str) -> String {
    format!("procon_memo_view::{memo_id}")
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct MemoViewSnapshot {
    pub saved_ms: i64,
    pub memo: Memo,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl MemoViewSnapshot {
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.saved_ms) < TTL_MS
    }
}

pub(crate) fn save_memo_view(memo_id: &str, memo: Memo, comments: Vec<Comment>, saved_ms: i64) {
    if memo_id.trim().is_empty() {
        return;
    }

    let snap = MemoViewSnapshot {
        saved_ms,
        memo,
        comments,
    };
    save_json_to_session(&key(memo_id), &snap);
}

/// Fresh snapshot for the memo, or None. Expired entries are removed on
/// the way out.
pub(crate) fn load_memo_view(memo_id: &str, now_ms: i64) -> Option<MemoViewSnapshot> {
    if memo_id.trim().is_empty() {
        return None;
    }

    let snap = load_json_from_session::<MemoViewSnapshot>(&key(memo_id))?;
    if snap.is_fresh(now_ms) {
        Some(snap)
    } else {
        remove_from_session(&key(memo_id));
        None
    }
}

pub(crate) fn clear_memo_view(memo_id: &str) {
    if memo_id.trim().is_empty() {
        return;
    }
    remove_from_session(&key(memo_id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn snapshot(saved_ms: i64) -> MemoViewSnapshot {
        MemoViewSnapshot {
            saved_ms,
            memo: Memo {
                id: "a1".to_string(),
                user_id: "u1".to_string(),
                title: "t".to_string(),
                subtitle: None,
                url: None,
                content: None,
                publish: true,
                tags: None,
                category: Category::Others,
                favorite: false,
                created_at: None,
                updated_at: None,
                profiles: None,
            },
            comments: vec![],
        }
    }

    #[test]
    fn test_snapshot_fresh_within_ttl() {
        let snap = snapshot(1_000);
        assert!(snap.is_fresh(1_000));
        assert!(snap.is_fresh(1_000 + TTL_MS - 1));
    }

    #[test]
    fn test_snapshot_expires_at_ttl() {
        let snap = snapshot(1_000);
        assert!(!snap.is_fresh(1_000 + TTL_MS));
        assert!(!snap.is_fresh(1_000 + TTL_MS + 1));
    }

    #[test]
    fn test_clock_skew_does_not_mark_stale() {
        // saved_ms in the future (clock adjusted): still treated as fresh.
        let snap = snapshot(10_000);
        assert!(snap.is_fresh(5_000));
    }
}
