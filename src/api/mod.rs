use crate::models::{Category, Comment, Memo, Profile, Session};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found(ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: format!("{ctx} not found"),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub data_url: String,
    pub data_anon_key: String,
    pub identity_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            data_url: "http://localhost:54321".to_string(),
            data_anon_key: String::new(),
            identity_url: "http://localhost:6890".to_string(),
        };

        // Deployment config is injected as `window.ENV = { DATA_URL, ... }`.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    let get = |key: &str| {
                        js_sys::Reflect::get(&env, &key.into())
                            .ok()
                            .and_then(|v| v.as_string())
                    };
                    if let Some(v) = get("DATA_URL") {
                        cfg.data_url = v;
                    }
                    if let Some(v) = get("DATA_ANON_KEY") {
                        cfg.data_anon_key = v;
                    }
                    if let Some(v) = get("IDENTITY_URL") {
                        cfg.identity_url = v;
                    }
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) const PAGE_SIZE: usize = 9;

/// Server-side predicate pushdown for the public memo list.
///
/// Translates the combinable filters into datastore query parameters so the
/// unbounded public collection is never filtered in memory. Cursor
/// pagination keys on the last-seen `created_at` (strict less/greater-than
/// by sort direction).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PublicMemoQuery {
    pub category: Option<Category>,
    pub text_query: String,
    pub tag_query: String,
    pub author_query: String,
    pub descending: bool,
    pub cursor: Option<String>,
    pub limit: usize,
}

impl Default for PublicMemoQuery {
    fn default() -> Self {
        Self {
            category: None,
            text_query: String::new(),
            tag_query: String::new(),
            author_query: String::new(),
            descending: true,
            cursor: None,
            limit: PAGE_SIZE,
        }
    }
}

/// Percent-encode a user token embedded in an `or=(...)` group. Commas and
/// parens inside group expressions would otherwise split the group.
fn encode_pattern(token: &str) -> String {
    urlencoding::encode(token).into_owned()
}

impl PublicMemoQuery {
    /// Author filtering needs the inner join so unmatched rows drop out.
    pub fn select_clause(&self) -> String {
        if self.author_query.trim().is_empty() {
            "id,user_id,title,subtitle,tags,category,created_at,profiles(atcoder_username,icon_url)"
                .to_string()
        } else {
            "id,user_id,title,subtitle,tags,category,created_at,profiles!inner(atcoder_username,icon_url)"
                .to_string()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();

        pairs.push(("select".to_string(), self.select_clause()));
        pairs.push(("publish".to_string(), "eq.true".to_string()));

        if let Some(category) = self.category {
            pairs.push(("category".to_string(), format!("eq.{category}")));
        }

        let text = self.text_query.trim();
        if !text.is_empty() {
            let p = encode_pattern(text);
            pairs.push((
                "or".to_string(),
                format!("(title.ilike.*{p}*,subtitle.ilike.*{p}*)"),
            ));
        }

        let tag_tokens: Vec<&str> = self.tag_query.split_whitespace().collect();
        if !tag_tokens.is_empty() {
            let clauses: Vec<String> = tag_tokens
                .iter()
                .map(|t| format!("tags.ilike.*{}*", encode_pattern(t)))
                .collect();
            pairs.push(("or".to_string(), format!("({})", clauses.join(","))));
        }

        let author = self.author_query.trim();
        if !author.is_empty() {
            pairs.push((
                "profiles.atcoder_username".to_string(),
                format!("ilike.*{}*", encode_pattern(author)),
            ));
        }

        if let Some(cursor) = &self.cursor {
            let op = if self.descending { "lt" } else { "gt" };
            pairs.push(("created_at".to_string(), format!("{op}.{cursor}")));
        }

        let dir = if self.descending { "desc" } else { "asc" };
        pairs.push(("order".to_string(), format!("created_at.{dir}")));
        pairs.push(("limit".to_string(), self.limit.to_string()));

        pairs
    }

    /// Cursor for the page after `page`, or None when the page was short
    /// (no further data in this direction).
    pub fn next_cursor(&self, page: &[Memo]) -> Option<String> {
        if page.is_empty() || page.len() < self.limit {
            return None;
        }
        page.last().and_then(|m| m.created_at.clone())
    }
}

/// Insert/update payload for the memos table. The owner column is filled by
/// the datastore from the session (row-level security), so it never appears
/// here.
#[derive(Serialize, Clone, Debug)]
pub(crate) struct MemoChanges {
    pub title: String,
    pub subtitle: String,
    pub url: String,
    pub content: String,
    pub publish: bool,
    pub tags: String,
    pub category: Category,
    pub favorite: bool,
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct NewComment {
    pub memo_id: String,
    pub user_id: String,
    pub content: String,
}

/// Thin authenticated client for the relational datastore's REST interface.
///
/// Public reads go out under the anonymous key; authenticated calls attach
/// the session bearer token on top. Row-level security at the datastore is
/// the authoritative gate; this client only shapes requests.
#[derive(Clone)]
pub(crate) struct DataClient {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) token: Option<String>,
}

impl DataClient {
    pub fn new(env: &EnvConfig, token: Option<String>) -> Self {
        Self {
            base_url: env.data_url.clone(),
            anon_key: env.data_anon_key.clone(),
            token,
        }
    }

    fn with_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req = req.header("apikey", self.anon_key.clone());
        let bearer = self.token.clone().unwrap_or_else(|| self.anon_key.clone());
        req = req.header("Authorization", format!("Bearer {bearer}"));
        req
    }

    async fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        pairs: &[(String, String)],
        body: Option<serde_json::Value>,
        prefer: Option<&str>,
        ctx: &str,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let mut req = self.with_headers(client.request(method, url)).query(pairs);

        if let Some(prefer) = prefer {
            req = req.header("Prefer", prefer);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else if res.status().as_u16() == 404 || res.status().as_u16() == 406 {
            Err(ApiError::not_found(ctx))
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        pairs: Vec<(String, String)>,
        ctx: &str,
    ) -> ApiResult<Vec<T>> {
        let res = self
            .request(reqwest::Method::GET, table, &pairs, None, None, ctx)
            .await?;
        res.json().await.map_err(ApiError::parse)
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        pairs: Vec<(String, String)>,
        ctx: &str,
    ) -> ApiResult<Option<T>> {
        let rows: Vec<T> = self.get_rows(table, pairs, ctx).await?;
        Ok(rows.into_iter().next())
    }

    fn pairs(kv: &[(&str, String)]) -> Vec<(String, String)> {
        kv.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    // ----- memos -----

    /// Owner-scoped list; row-level security restricts the rows to the
    /// caller, so no owner filter is sent.
    pub async fn list_my_memos(&self) -> ApiResult<Vec<Memo>> {
        self.get_rows(
            "memos",
            Self::pairs(&[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ]),
            "Memo list",
        )
        .await
    }

    pub async fn list_public_memos(&self, query: &PublicMemoQuery) -> ApiResult<Vec<Memo>> {
        self.get_rows("memos", query.to_query_pairs(), "Public memo list")
            .await
    }

    /// The caller's own memo, published or not.
    pub async fn get_my_memo(&self, id: &str) -> ApiResult<Option<Memo>> {
        self.get_optional(
            "memos",
            Self::pairs(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]),
            "Memo",
        )
        .await
    }

    /// A published memo with the author profile embedded; None for private
    /// or missing ids.
    pub async fn get_public_memo(&self, id: &str) -> ApiResult<Option<Memo>> {
        self.get_optional(
            "memos",
            Self::pairs(&[
                (
                    "select",
                    "*,profiles(atcoder_username,icon_url)".to_string(),
                ),
                ("id", format!("eq.{id}")),
                ("publish", "eq.true".to_string()),
            ]),
            "Memo",
        )
        .await
    }

    pub async fn create_memo(&self, changes: &MemoChanges) -> ApiResult<Memo> {
        let res = self
            .request(
                reqwest::Method::POST,
                "memos",
                &Self::pairs(&[("select", "*".to_string())]),
                Some(serde_json::to_value(changes).map_err(ApiError::parse)?),
                Some("return=representation"),
                "Create memo",
            )
            .await?;

        let rows: Vec<Memo> = res.json().await.map_err(ApiError::parse)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::parse("create response missing the inserted memo"))
    }

    pub async fn update_memo(&self, id: &str, changes: &MemoChanges) -> ApiResult<()> {
        self.request(
            reqwest::Method::PATCH,
            "memos",
            &Self::pairs(&[("id", format!("eq.{id}"))]),
            Some(serde_json::to_value(changes).map_err(ApiError::parse)?),
            None,
            "Update memo",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_memo(&self, id: &str) -> ApiResult<()> {
        self.request(
            reqwest::Method::DELETE,
            "memos",
            &Self::pairs(&[("id", format!("eq.{id}"))]),
            None,
            None,
            "Delete memo",
        )
        .await?;
        Ok(())
    }

    // ----- comments -----

    pub async fn list_comments(&self, memo_id: &str) -> ApiResult<Vec<Comment>> {
        self.get_rows(
            "comments",
            Self::pairs(&[
                (
                    "select",
                    "*,profiles(atcoder_username,icon_url)".to_string(),
                ),
                ("memo_id", format!("eq.{memo_id}")),
                ("order", "created_at.asc".to_string()),
            ]),
            "Comments",
        )
        .await
    }

    pub async fn create_comment(&self, comment: &NewComment) -> ApiResult<()> {
        self.request(
            reqwest::Method::POST,
            "comments",
            &[],
            Some(serde_json::to_value(comment).map_err(ApiError::parse)?),
            None,
            "Create comment",
        )
        .await?;
        Ok(())
    }

    pub async fn update_comment(&self, unique_id: &str, content: &str) -> ApiResult<()> {
        self.request(
            reqwest::Method::PATCH,
            "comments",
            &Self::pairs(&[("unique_id", format!("eq.{unique_id}"))]),
            Some(serde_json::json!({ "content": content })),
            None,
            "Update comment",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_comment(&self, unique_id: &str) -> ApiResult<()> {
        self.request(
            reqwest::Method::DELETE,
            "comments",
            &Self::pairs(&[("unique_id", format!("eq.{unique_id}"))]),
            None,
            None,
            "Delete comment",
        )
        .await?;
        Ok(())
    }

    // ----- profiles -----

    pub async fn get_profile(&self, user_id: &str) -> ApiResult<Option<Profile>> {
        self.get_optional(
            "profiles",
            Self::pairs(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ]),
            "Profile",
        )
        .await
    }

    /// One row per user_id: insert-or-merge keyed on the conflict column.
    pub async fn upsert_profile(&self, profile: &Profile) -> ApiResult<()> {
        self.request(
            reqwest::Method::POST,
            "profiles",
            &Self::pairs(&[("on_conflict", "user_id".to_string())]),
            Some(serde_json::to_value(profile).map_err(ApiError::parse)?),
            Some("resolution=merge-duplicates"),
            "Update profile",
        )
        .await?;
        Ok(())
    }

    /// Partial update used by the identity webhook (email/icon mirror).
    pub async fn patch_profile(
        &self,
        user_id: &str,
        fields: serde_json::Value,
    ) -> ApiResult<()> {
        self.request(
            reqwest::Method::PATCH,
            "profiles",
            &Self::pairs(&[("user_id", format!("eq.{user_id}"))]),
            Some(fields),
            None,
            "Update profile",
        )
        .await?;
        Ok(())
    }

    pub async fn delete_profile(&self, user_id: &str) -> ApiResult<()> {
        self.request(
            reqwest::Method::DELETE,
            "profiles",
            &Self::pairs(&[("user_id", format!("eq.{user_id}"))]),
            None,
            None,
            "Delete profile",
        )
        .await?;
        Ok(())
    }
}

#[derive(Serialize, Clone, Debug)]
struct SignInRequest {
    email: String,
    password: String,
}

/// Client for the external identity provider: session issuance and the
/// user-metadata blob. Account lifecycle (signup, email changes, deletion)
/// lives in the provider's own UI; this app only consumes sessions and the
/// webhook feed.
#[derive(Clone)]
pub(crate) struct IdentityClient {
    pub(crate) base_url: String,
}

impl IdentityClient {
    pub fn new(env: &EnvConfig) -> Self {
        Self {
            base_url: env.identity_url.clone(),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session> {
        let client = reqwest::Client::new();
        let res = client
            .post(format!("{}/v1/sign-in", self.base_url))
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Sign in failed"))
        }
    }

    /// Writes the competitive-programming fields into the provider's
    /// metadata blob. Independent from the profiles upsert; there is no
    /// rollback tying the two together.
    pub async fn update_metadata(
        &self,
        session: &Session,
        metadata: serde_json::Value,
    ) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let res = client
            .post(format!("{}/v1/me/metadata", self.base_url))
            .header("Authorization", format!("Bearer {}", session.token))
            .json(&metadata)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(())
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Metadata update failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfileRef;

    fn pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn memo_with_created_at(id: &str, created_at: &str) -> Memo {
        Memo {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: "t".to_string(),
            subtitle: None,
            url: None,
            content: None,
            publish: true,
            tags: None,
            category: Category::Others,
            favorite: false,
            created_at: Some(created_at.to_string()),
            updated_at: None,
            profiles: Some(ProfileRef::default()),
        }
    }

    #[test]
    fn test_default_query_is_public_descending_first_page() {
        let q = PublicMemoQuery::default();
        let pairs = q.to_query_pairs();

        assert_eq!(pair(&pairs, "publish"), Some("eq.true"));
        assert_eq!(pair(&pairs, "order"), Some("created_at.desc"));
        assert_eq!(pair(&pairs, "limit"), Some("9"));
        assert_eq!(pair(&pairs, "created_at"), None);
        assert_eq!(pair(&pairs, "or"), None);
    }

    #[test]
    fn test_category_filter_pushed_down_as_equality() {
        let q = PublicMemoQuery {
            category: Some(Category::DataStructure),
            ..Default::default()
        };
        assert_eq!(
            pair(&q.to_query_pairs(), "category"),
            Some("eq.dataStructure")
        );
    }

    #[test]
    fn test_text_query_becomes_title_subtitle_or_group() {
        let q = PublicMemoQuery {
            text_query: "dp".to_string(),
            ..Default::default()
        };
        assert_eq!(
            pair(&q.to_query_pairs(), "or"),
            Some("(title.ilike.*dp*,subtitle.ilike.*dp*)")
        );
    }

    #[test]
    fn test_tag_query_any_of_group_per_token() {
        let q = PublicMemoQuery {
            tag_query: "dp graph".to_string(),
            ..Default::default()
        };
        assert_eq!(
            pair(&q.to_query_pairs(), "or"),
            Some("(tags.ilike.*dp*,tags.ilike.*graph*)")
        );
    }

    #[test]
    fn test_pattern_tokens_are_percent_encoded() {
        // A comma inside an or-group would split the group expression.
        let q = PublicMemoQuery {
            text_query: "a,b".to_string(),
            ..Default::default()
        };
        assert_eq!(
            pair(&q.to_query_pairs(), "or"),
            Some("(title.ilike.*a%2Cb*,subtitle.ilike.*a%2Cb*)")
        );
    }

    #[test]
    fn test_author_query_switches_to_inner_join() {
        let q = PublicMemoQuery {
            author_query: "tourist".to_string(),
            ..Default::default()
        };
        let pairs = q.to_query_pairs();
        assert!(q.select_clause().contains("profiles!inner"));
        assert_eq!(
            pair(&pairs, "profiles.atcoder_username"),
            Some("ilike.*tourist*")
        );

        let q = PublicMemoQuery::default();
        assert!(!q.select_clause().contains("!inner"));
    }

    #[test]
    fn test_cursor_operator_follows_sort_direction() {
        let q = PublicMemoQuery {
            cursor: Some("2025-01-01T00:00:00Z".to_string()),
            descending: true,
            ..Default::default()
        };
        assert_eq!(
            pair(&q.to_query_pairs(), "created_at"),
            Some("lt.2025-01-01T00:00:00Z")
        );

        let q = PublicMemoQuery {
            cursor: Some("2025-01-01T00:00:00Z".to_string()),
            descending: false,
            ..Default::default()
        };
        let pairs = q.to_query_pairs();
        assert_eq!(
            pair(&pairs, "created_at"),
            Some("gt.2025-01-01T00:00:00Z")
        );
        assert_eq!(pair(&pairs, "order"), Some("created_at.asc"));
    }

    #[test]
    fn test_next_cursor_is_last_seen_created_at() {
        let q = PublicMemoQuery {
            limit: 2,
            ..Default::default()
        };
        let page = vec![
            memo_with_created_at("a", "2025-01-03T00:00:00Z"),
            memo_with_created_at("b", "2025-01-02T00:00:00Z"),
        ];
        assert_eq!(
            q.next_cursor(&page),
            Some("2025-01-02T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_short_page_ends_pagination() {
        let q = PublicMemoQuery {
            limit: 9,
            ..Default::default()
        };
        let page = vec![memo_with_created_at("a", "2025-01-03T00:00:00Z")];
        assert_eq!(q.next_cursor(&page), None);
        assert_eq!(q.next_cursor(&[]), None);
    }

    #[test]
    fn test_memo_changes_serializes_all_columns() {
        let changes = MemoChanges {
            title: "t".to_string(),
            subtitle: "s".to_string(),
            url: String::new(),
            content: "c".to_string(),
            publish: true,
            tags: "dp".to_string(),
            category: Category::Algorithm,
            favorite: false,
        };
        let v = serde_json::to_value(&changes).expect("should serialize");
        assert_eq!(v["title"], "t");
        assert_eq!(v["category"], "algorithm");
        assert_eq!(v["publish"], true);
        // The owner column is never sent; the datastore fills it.
        assert!(v.get("user_id").is_none());
    }

    #[test]
    fn test_session_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"id": "u1", "email": "u@example.com", "metadata": {"atcoderUsername": "x"}}
        }"#;
        let session: Session = serde_json::from_str(json).expect("session should parse");
        assert_eq!(session.token, "jwt-token");
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.user.metadata["atcoderUsername"], "x");
    }

    #[test]
    fn test_api_error_display_is_message_only() {
        let e = ApiError::http(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "boom".to_string(),
            "Update memo",
        );
        assert_eq!(e.to_string(), "Update memo (500 Internal Server Error): boom");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(ApiError::unauthorized().kind, ApiErrorKind::Unauthorized);
        assert_eq!(ApiError::not_found("Memo").to_string(), "Memo not found");
    }
}
