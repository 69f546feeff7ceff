use crate::editor::MemoEditorPage;
use crate::pages::{
    GlobalMemosPage, LoginPage, MyDisplayPage, MyMemosPage, PublicDisplayPage, RequireSession,
    SettingsPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("display/:id") view=PublicDisplayPage />
                <Route path=path!("my") view=move || view! {
                    <RequireSession>
                        <MyMemosPage />
                    </RequireSession>
                } />
                <Route path=path!("my/new") view=move || view! {
                    <RequireSession>
                        <MemoEditorPage />
                    </RequireSession>
                } />
                <Route path=path!("my/:id") view=move || view! {
                    <RequireSession>
                        <MyDisplayPage />
                    </RequireSession>
                } />
                <Route path=path!("my/:id/edit") view=move || view! {
                    <RequireSession>
                        <MemoEditorPage />
                    </RequireSession>
                } />
                <Route path=path!("settings") view=move || view! {
                    <RequireSession>
                        <SettingsPage />
                    </RequireSession>
                } />
                <Route path=path!("") view=GlobalMemosPage />
            </Routes>
        </Router>
    }
}
