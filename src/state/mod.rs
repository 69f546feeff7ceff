use crate::api::{DataClient, EnvConfig, IdentityClient};
use crate::models::{Memo, Session};
use crate::storage::{clear_session_storage, load_session_from_storage};
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    env: StoredValue<EnvConfig>,

    /// Explicit session context; everything that needs the current user id
    /// or a token gets it from here.
    pub session: RwSignal<Option<Session>>,

    /// Owner-scoped memo list (eager fetch, filtered client-side).
    pub my_memos: RwSignal<Vec<Memo>>,
    pub my_memos_loading: RwSignal<bool>,
    pub my_memos_error: RwSignal<Option<String>>,

    /// Load guards (avoid duplicate loads + ignore stale responses).
    pub my_memos_request_id: RwSignal<u64>,
    pub my_memos_loaded: RwSignal<bool>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            env: StoredValue::new(EnvConfig::new()),
            session: RwSignal::new(load_session_from_storage()),
            my_memos: RwSignal::new(vec![]),
            my_memos_loading: RwSignal::new(false),
            my_memos_error: RwSignal::new(None),
            my_memos_request_id: RwSignal::new(0),
            my_memos_loaded: RwSignal::new(false),
        }
    }

    /// Datastore client for the current session (anonymous when signed out).
    pub fn data_client(&self) -> DataClient {
        let token = self
            .session
            .get_untracked()
            .map(|session| session.token.clone());
        self.env.with_value(|env| DataClient::new(env, token))
    }

    pub fn identity_client(&self) -> IdentityClient {
        self.env.with_value(IdentityClient::new)
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.session
            .get_untracked()
            .map(|session| session.user_id().to_string())
    }

    pub fn sign_out(&self) {
        clear_session_storage();
        self.session.set(None);
        self.my_memos.set(vec![]);
        self.my_memos_loaded.set(false);
    }

    /// Expired/invalid token: drop the session and send the user to login.
    pub fn force_sign_in(&self) {
        self.sign_out();
        let _ = window().location().set_href("/login");
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
