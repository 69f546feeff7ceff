use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Closed set of memo subject areas.
///
/// Serialized with the datastore's historical camelCase variants.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter,
)]
pub(crate) enum Category {
    #[serde(rename = "algorithm")]
    #[strum(serialize = "algorithm")]
    Algorithm,

    #[serde(rename = "dataStructure")]
    #[strum(serialize = "dataStructure")]
    DataStructure,

    #[serde(rename = "math")]
    #[strum(serialize = "math")]
    Math,

    #[default]
    #[serde(rename = "others")]
    #[strum(serialize = "others")]
    Others,
}

/// Display-name/icon fields embedded from the `profiles` join.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct ProfileRef {
    #[serde(default)]
    pub atcoder_username: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Memo {
    pub id: String,
    pub user_id: String,
    pub title: String,

    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub publish: bool,

    /// Space-delimited tag tokens, normalized at save time.
    #[serde(default)]
    pub tags: Option<String>,

    /// Rows predating the category column deserialize as `Others`.
    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Present only on selects that embed the author profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<ProfileRef>,
}

impl Memo {
    pub fn tags_str(&self) -> &str {
        self.tags.as_deref().unwrap_or("")
    }

    pub fn author_name(&self) -> &str {
        self.profiles
            .as_ref()
            .and_then(|p| p.atcoder_username.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Comment {
    pub unique_id: String,
    pub memo_id: String,
    pub user_id: String,
    pub content: String,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<ProfileRef>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        self.profiles
            .as_ref()
            .and_then(|p| p.atcoder_username.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Row mirrored from the identity provider (one per user_id, upsert-keyed).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Profile {
    pub user_id: String,
    pub email: String,

    #[serde(default)]
    pub atcoder_username: Option<String>,
    #[serde(default)]
    pub favorite_language: Option<String>,
    #[serde(default)]
    pub atcoder_rate: Option<i64>,

    /// Mirrored by the webhook only; profile-update upserts never touch it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Identity-provider user object.
///
/// The metadata blob is kept opaque to avoid breaking when provider
/// fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Explicit session context: current user plus the bearer token used for
/// authenticated datastore calls. Injected via AppState, never looked up
/// ambiently.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Session {
    pub token: String,
    pub user: UserInfo,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Locally-buffered snapshot of an in-progress memo edit.
///
/// Doubles as the editor's form snapshot: the category is kept as a raw
/// string so an unselected form round-trips unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MemoDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub favorite: bool,
}

impl MemoDraft {
    /// A draft with every tracked field blank carries no user work.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.subtitle.trim().is_empty()
            && self.url.trim().is_empty()
            && self.content.trim().is_empty()
            && !self.publish
            && self.tags.trim().is_empty()
            && self.category.trim().is_empty()
            && !self.favorite
    }

    pub fn from_memo(memo: &Memo) -> Self {
        Self {
            title: memo.title.clone(),
            subtitle: memo.subtitle.clone().unwrap_or_default(),
            url: memo.url.clone().unwrap_or_default(),
            content: memo.content.clone().unwrap_or_default(),
            publish: memo.publish,
            tags: memo.tags.clone().unwrap_or_default(),
            category: memo.category.to_string(),
            favorite: memo.favorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_roundtrip_camel_case() {
        let c: Category = serde_json::from_str("\"dataStructure\"").expect("should parse");
        assert_eq!(c, Category::DataStructure);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"dataStructure\"");
        assert_eq!(c.to_string(), "dataStructure");
        assert_eq!(Category::from_str("dataStructure").unwrap(), c);
    }

    #[test]
    fn test_memo_contract_deserialize_with_embedded_profile() {
        // Contract based on the datastore select with an embedded profiles join.
        let json = r#"{
            "id": "a1",
            "user_id": "u1",
            "title": "DP intro",
            "subtitle": null,
            "publish": true,
            "tags": "dp algorithm",
            "category": "algorithm",
            "favorite": false,
            "created_at": "2025-01-01T00:00:00Z",
            "profiles": {"atcoder_username": "tourist", "icon_url": null}
        }"#;
        let memo: Memo = serde_json::from_str(json).expect("memo should parse");
        assert_eq!(memo.category, Category::Algorithm);
        assert_eq!(memo.tags_str(), "dp algorithm");
        assert_eq!(memo.author_name(), "tourist");
        assert!(memo.content.is_none());
    }

    #[test]
    fn test_memo_missing_category_defaults_to_others() {
        let json = r#"{"id": "a1", "user_id": "u1", "title": "t"}"#;
        let memo: Memo = serde_json::from_str(json).expect("memo should parse");
        assert_eq!(memo.category, Category::Others);
        assert_eq!(memo.author_name(), "Unknown");
    }

    #[test]
    fn test_blank_draft_detection() {
        let mut d = MemoDraft::default();
        assert!(d.is_blank());

        d.tags = "  ".to_string();
        assert!(d.is_blank());

        d.favorite = true;
        assert!(!d.is_blank());
    }

    #[test]
    fn test_draft_from_memo_carries_every_field() {
        let memo = Memo {
            id: "a1".to_string(),
            user_id: "u1".to_string(),
            title: "Segment tree".to_string(),
            subtitle: Some("lazy propagation".to_string()),
            url: Some("https://example.com".to_string()),
            content: Some("# notes".to_string()),
            publish: true,
            tags: Some("seg tree".to_string()),
            category: Category::DataStructure,
            favorite: true,
            created_at: None,
            updated_at: None,
            profiles: None,
        };
        let d = MemoDraft::from_memo(&memo);
        assert_eq!(d.title, "Segment tree");
        assert_eq!(d.subtitle, "lazy propagation");
        assert_eq!(d.url, "https://example.com");
        assert_eq!(d.content, "# notes");
        assert!(d.publish);
        assert_eq!(d.tags, "seg tree");
        assert_eq!(d.category, "dataStructure");
        assert!(d.favorite);
    }
}
