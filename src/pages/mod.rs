use crate::api::{ApiErrorKind, NewComment, PublicMemoQuery};
use crate::cache::{clear_memo_view, load_memo_view, save_memo_view};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription,
    CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::filter::{category_counts, split_tags, MemoFilter};
use crate::markdown::render_markdown_or_placeholder;
use crate::models::{Category, Comment, Memo, Profile};
use crate::state::AppContext;
use crate::storage::save_session_to_storage;
use crate::util::{confirm, format_timestamp, now_ms};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params_map};
use std::str::FromStr;
use strum::IntoEnumIterator;

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Algorithm => "bg-red-500",
        Category::DataStructure => "bg-blue-500",
        Category::Math => "bg-green-500",
        Category::Others => "bg-gray-500",
    }
}

fn category_key_color(key: &str) -> &'static str {
    match Category::from_str(key) {
        Ok(c) => category_color(c),
        // The "all" pseudo-category.
        Err(_) => "bg-black",
    }
}

#[component]
fn TagChips(tags: String, #[prop(optional)] small: bool) -> impl IntoView {
    let class = if small {
        "px-3 py-1 text-xs font-medium bg-blue-100 text-blue-800 rounded-full whitespace-nowrap"
    } else {
        "px-3 py-1.5 text-sm font-medium bg-blue-100 text-blue-800 rounded-full whitespace-nowrap"
    };
    view! {
        <div class="flex flex-wrap gap-2">
            {split_tags(&tags)
                .into_iter()
                .map(|tag| view! { <span class=class>{tag.to_string()}</span> })
                .collect_view()}
        </div>
    }
}

#[component]
fn MarkdownBody(html: Signal<String>) -> impl IntoView {
    view! {
        <div
            class="markdown-body rounded-lg border p-4 text-sm"
            inner_html=move || html.get()
        ></div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let identity = app_state.0.identity_client();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match identity.sign_in(&email_val, &password_val).await {
                Ok(session) => {
                    save_session_to_storage(&session);
                    app_state.0.session.set(Some(session));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Procon Memo"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Log in"</CardTitle>
                        <CardDescription class="text-xs">
                            "Use your account email and password to continue."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Continue" }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "Accounts are managed by the identity provider."
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

/// Gate for owner-scoped routes: unauthenticated visits see the login form.
#[component]
pub fn RequireSession(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    view! {
        <Show
            when=move || app_state.0.session.get().is_some()
            fallback=move || view! { <LoginPage /> }
        >
            {children()}
        </Show>
    }
}

#[component]
pub fn GlobalMemosPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let memos: RwSignal<Vec<Memo>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let loading_more: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    // Cursor pagination state; the cursor is the last-seen created_at.
    let cursor: RwSignal<Option<String>> = RwSignal::new(None);
    let has_more: RwSignal<bool> = RwSignal::new(true);
    let descending: RwSignal<bool> = RwSignal::new(true);

    let category_sel: RwSignal<String> = RwSignal::new("all".to_string());
    let search_query: RwSignal<String> = RwSignal::new(String::new());
    let tag_query: RwSignal<String> = RwSignal::new(String::new());
    let name_query: RwSignal<String> = RwSignal::new(String::new());

    // Stale-response protection.
    let request_id: RwSignal<u64> = RwSignal::new(0);

    let load_memos = move |initial: bool| {
        if initial {
            loading.set(true);
            memos.set(vec![]);
            cursor.set(None);
            has_more.set(true);
        } else {
            loading_more.set(true);
        }
        error.set(None);

        let req_id = request_id.get_untracked().saturating_add(1);
        request_id.set(req_id);

        let query = PublicMemoQuery {
            category: Category::from_str(&category_sel.get_untracked()).ok(),
            text_query: search_query.get_untracked(),
            tag_query: tag_query.get_untracked(),
            author_query: name_query.get_untracked(),
            descending: descending.get_untracked(),
            cursor: if initial {
                None
            } else {
                cursor.get_untracked()
            },
            ..Default::default()
        };

        let client = app_state.0.data_client();
        spawn_local(async move {
            let result = client.list_public_memos(&query).await;

            // Ignore stale responses.
            if request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(page) => {
                    let next = query.next_cursor(&page);
                    has_more.set(next.is_some());
                    cursor.set(next);
                    if initial {
                        memos.set(page);
                    } else {
                        memos.update(|m| m.extend(page));
                    }
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
            loading_more.set(false);
        });
    };

    // Changing the category or sort direction resets to the first page.
    Effect::new(move |_| {
        let _ = category_sel.get();
        let _ = descending.get();
        load_memos(true);
    });

    let on_load_more = move |_| {
        if !loading.get_untracked() && !loading_more.get_untracked() && has_more.get_untracked() {
            load_memos(false);
        }
    };

    view! {
        <div class="flex h-screen bg-background">
            // Left sidebar: search + category filters.
            <aside class="flex w-72 flex-col border-r">
                <div class="flex flex-col gap-3 border-b p-4">
                    <Input placeholder="Filter by Word" bind_value=search_query class="h-8 text-sm" />
                    <Input placeholder="Filter by Tags" bind_value=tag_query class="h-8 text-sm" />
                    <Input placeholder="Filter by AtCoder Name" bind_value=name_query class="h-8 text-sm" />
                    <Button size=ButtonSize::Sm class="w-full" on:click=move |_| load_memos(true)>
                        "Search"
                    </Button>
                </div>

                <nav class="flex-1 overflow-y-auto p-4">
                    <h3 class="mb-3 px-2 text-xs font-semibold uppercase tracking-wider text-muted-foreground">
                        "Category"
                    </h3>
                    <div class="flex flex-col gap-1">
                        {std::iter::once("all".to_string())
                            .chain(Category::iter().map(|c| c.to_string()))
                            .map(|key| {
                                let key_for_click = key.clone();
                                let key_for_active = key.clone();
                                let dot = category_key_color(&key);
                                view! {
                                    <button
                                        class=move || format!(
                                            "flex w-full items-center gap-3 rounded-lg px-3 py-2 text-sm transition-colors {}",
                                            if category_sel.get() == key_for_active { "bg-accent" } else { "hover:bg-accent/50" }
                                        )
                                        on:click=move |_| category_sel.set(key_for_click.clone())
                                    >
                                        <span class=format!("h-3 w-3 rounded-full {dot}")></span>
                                        <span>{key}</span>
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </nav>

                <div class="border-t p-4">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="w-full"
                        on:click=move |_| navigate.with_value(|nav| nav("/my", Default::default()))
                    >
                        "My Memo"
                    </Button>
                </div>
            </aside>

            // Main: public grid with cursor pagination.
            <main class="flex min-h-0 flex-1 flex-col">
                <header class="flex items-center justify-between border-b px-8 py-4">
                    <h1 class="text-xl font-semibold">"Global Memo"</h1>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| descending.update(|d| *d = !*d)
                    >
                        {move || if descending.get() { "Newest" } else { "Oldest" }}
                    </Button>
                </header>

                <div class="min-h-0 flex-1 overflow-y-auto px-8 py-6">
                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            error.get().map(|e| view! {
                                <Alert class="mb-4 border-destructive/30">
                                    <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                </Alert>
                            })
                        }}
                    </Show>

                    <div class="grid grid-cols-1 gap-4 md:grid-cols-2 lg:grid-cols-3">
                        {move || {
                            memos
                                .get()
                                .into_iter()
                                .map(|memo| {
                                    let id_for_nav = memo.id.clone();
                                    let author = memo.author_name().to_string();
                                    let icon = memo
                                        .profiles
                                        .as_ref()
                                        .and_then(|p| p.icon_url.clone());
                                    let tags = memo.tags_str().to_string();
                                    view! {
                                        <Card
                                            class="cursor-pointer gap-2 py-4 transition-colors hover:bg-accent/30"
                                            on:click=move |_| {
                                                navigate.with_value(|nav| {
                                                    nav(&format!("/display/{id_for_nav}"), Default::default());
                                                });
                                            }
                                        >
                                            <CardHeader class="px-4">
                                                <div class="flex w-full items-start justify-between gap-2">
                                                    <CardTitle class="truncate text-sm">{memo.title.clone()}</CardTitle>
                                                    <span
                                                        class=format!("mt-1 h-3 w-3 shrink-0 rounded-full {}", category_color(memo.category))
                                                        title=memo.category.to_string()
                                                    ></span>
                                                </div>
                                                <CardDescription class="line-clamp-1 text-xs">
                                                    {memo.subtitle.clone().unwrap_or_default()}
                                                </CardDescription>
                                            </CardHeader>
                                            <CardContent class="flex flex-col gap-2 px-4">
                                                <TagChips tags=tags small=true />
                                                <div class="flex items-center gap-2 border-t pt-2 text-xs text-muted-foreground">
                                                    "by " <span class="text-foreground">{author.clone()}</span>
                                                    {icon.map(|url| view! {
                                                        <img src=url alt=author.clone() class="h-5 w-5 rounded-full object-cover" />
                                                    })}
                                                </div>
                                            </CardContent>
                                        </Card>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>

                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <div class="flex h-64 items-center justify-center">
                            <p class="text-sm text-muted-foreground">"Loading..."</p>
                        </div>
                    </Show>

                    <Show
                        when=move || !loading.get() && memos.get().is_empty()
                        fallback=|| ().into_view()
                    >
                        <div class="flex h-64 flex-col items-center justify-center gap-1">
                            <p class="text-sm text-muted-foreground">"No memo is found"</p>
                            <p class="text-xs text-muted-foreground">"Please try another pattern"</p>
                        </div>
                    </Show>

                    <Show
                        when=move || !loading.get() && !memos.get().is_empty() && has_more.get()
                        fallback=|| ().into_view()
                    >
                        <div class="flex items-center justify-center py-6">
                            <Button
                                size=ButtonSize::Sm
                                attr:disabled=move || loading_more.get()
                                on:click=on_load_more
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading_more.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading_more.get() { "Loading..." } else { "Load more" }}
                                </span>
                            </Button>
                        </div>
                    </Show>
                </div>
            </main>
        </div>
    }
}

#[component]
pub fn MyMemosPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let favorite_only: RwSignal<bool> = RwSignal::new(false);
    let category_sel: RwSignal<String> = RwSignal::new("all".to_string());
    let search_query: RwSignal<String> = RwSignal::new(String::new());
    let tag_query: RwSignal<String> = RwSignal::new(String::new());

    // Eager fetch once per sign-in; the list is owner-scoped and small, so
    // all filtering below is in-memory.
    Effect::new(move |_| {
        if app_state.0.my_memos_loaded.get() || app_state.0.my_memos_loading.get() {
            return;
        }

        let req_id = app_state
            .0
            .my_memos_request_id
            .get_untracked()
            .saturating_add(1);
        app_state.0.my_memos_request_id.set(req_id);
        app_state.0.my_memos_loading.set(true);
        app_state.0.my_memos_error.set(None);

        let client = app_state.0.data_client();
        spawn_local(async move {
            let result = client.list_my_memos().await;

            if app_state.0.my_memos_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(list) => {
                    app_state.0.my_memos.set(list);
                    app_state.0.my_memos_loaded.set(true);
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    app_state.0.my_memos_error.set(Some(e.to_string()));
                }
            }
            app_state.0.my_memos_loading.set(false);
        });
    });

    let counts = move || category_counts(&app_state.0.my_memos.get());
    let filtered = move || {
        let filter = MemoFilter {
            favorite_only: favorite_only.get(),
            category: Category::from_str(&category_sel.get()).ok(),
            text_query: search_query.get(),
            tag_query: tag_query.get(),
        };
        app_state
            .0
            .my_memos
            .get()
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect::<Vec<_>>()
    };

    view! {
        <div class="flex h-screen bg-background">
            <aside class="flex w-72 flex-col border-r">
                <div class="flex flex-col gap-3 border-b p-4">
                    <Input placeholder="Filter by name" bind_value=search_query class="h-8 text-sm" />
                    <Input placeholder="Filter by tags" bind_value=tag_query class="h-8 text-sm" />
                </div>

                <nav class="flex-1 overflow-y-auto p-4">
                    <div class="flex flex-col gap-1">
                        <button
                            class=move || format!(
                                "w-full rounded-lg px-3 py-2 text-left text-sm font-medium transition-colors {}",
                                if !favorite_only.get() { "bg-accent" } else { "hover:bg-accent/50" }
                            )
                            on:click=move |_| favorite_only.set(false)
                        >
                            "All Memo"
                        </button>
                        <button
                            class=move || format!(
                                "w-full rounded-lg px-3 py-2 text-left text-sm font-medium transition-colors {}",
                                if favorite_only.get() { "bg-accent" } else { "hover:bg-accent/50" }
                            )
                            on:click=move |_| favorite_only.set(true)
                        >
                            "Favorite Memo"
                        </button>
                    </div>

                    <div class="mt-6 border-t pt-4">
                        <h3 class="mb-3 px-2 text-xs font-semibold uppercase tracking-wider text-muted-foreground">
                            "Category"
                        </h3>
                        <div class="flex flex-col gap-1">
                            {std::iter::once("all".to_string())
                                .chain(Category::iter().map(|c| c.to_string()))
                                .map(|key| {
                                    let key_for_click = key.clone();
                                    let key_for_active = key.clone();
                                    let key_for_count = key.clone();
                                    let dot = category_key_color(&key);
                                    view! {
                                        <button
                                            class=move || format!(
                                                "flex w-full items-center justify-between rounded-lg px-3 py-2 text-sm transition-colors {}",
                                                if category_sel.get() == key_for_active { "bg-accent" } else { "hover:bg-accent/50" }
                                            )
                                            on:click=move |_| category_sel.set(key_for_click.clone())
                                        >
                                            <span class="flex items-center gap-3">
                                                <span class=format!("h-3 w-3 rounded-full {dot}")></span>
                                                <span>{key}</span>
                                            </span>
                                            <span class="text-xs text-muted-foreground">
                                                {move || {
                                                    let counts = counts();
                                                    match Category::from_str(&key_for_count) {
                                                        Ok(c) => counts.count_for(c),
                                                        Err(_) => counts.all,
                                                    }
                                                }}
                                            </span>
                                        </button>
                                    }
                                })
                                .collect_view()}
                        </div>
                    </div>
                </nav>

                <div class="flex flex-col gap-1 border-t p-4">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="w-full"
                        on:click=move |_| navigate.with_value(|nav| nav("/", Default::default()))
                    >
                        "Global Memo"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="w-full"
                        on:click=move |_| navigate.with_value(|nav| nav("/settings", Default::default()))
                    >
                        "Settings"
                    </Button>
                </div>
            </aside>

            <main class="flex min-h-0 flex-1 flex-col">
                <header class="flex items-center justify-between border-b px-8 py-4">
                    <div>
                        <h1 class="text-xl font-semibold">"My Memo"</h1>
                        <p class="text-xs text-muted-foreground">
                            {move || format!("{} memos", counts().all)}
                        </p>
                    </div>
                    <Button
                        size=ButtonSize::Sm
                        on:click=move |_| navigate.with_value(|nav| nav("/my/new", Default::default()))
                    >
                        "New Memo"
                    </Button>
                </header>

                <div class="min-h-0 flex-1 overflow-y-auto px-8 py-6">
                    <Show when=move || app_state.0.my_memos_error.get().is_some() fallback=|| ().into_view()>
                        {move || {
                            app_state.0.my_memos_error.get().map(|e| view! {
                                <Alert class="mb-4 border-destructive/30">
                                    <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                </Alert>
                            })
                        }}
                    </Show>

                    <Show
                        when=move || !app_state.0.my_memos_loading.get()
                        fallback=|| view! {
                            <div class="flex h-64 items-center justify-center">
                                <p class="text-sm text-muted-foreground">"Loading..."</p>
                            </div>
                        }
                    >
                        <Show
                            when=move || !filtered().is_empty()
                            fallback=move || view! {
                                <div class="flex h-64 flex-col items-center justify-center gap-1">
                                    <p class="text-sm text-muted-foreground">"No memo is here"</p>
                                    <p class="text-xs text-muted-foreground">"Let's create a new memo"</p>
                                </div>
                            }
                        >
                            <div class="grid grid-cols-1 gap-4 md:grid-cols-2 lg:grid-cols-3">
                                {move || {
                                    filtered()
                                        .into_iter()
                                        .map(|memo| {
                                            let id_for_nav = memo.id.clone();
                                            let tags = memo.tags_str().to_string();
                                            view! {
                                                <Card
                                                    class="cursor-pointer gap-2 py-4 transition-colors hover:bg-accent/30"
                                                    on:click=move |_| {
                                                        navigate.with_value(|nav| {
                                                            nav(&format!("/my/{id_for_nav}"), Default::default());
                                                        });
                                                    }
                                                >
                                                    <CardHeader class="px-4">
                                                        <div class="flex w-full items-start justify-between gap-2">
                                                            <CardTitle class="truncate text-sm">{memo.title.clone()}</CardTitle>
                                                            <span class="flex items-center gap-2">
                                                                <Show when={
                                                                    let fav = memo.favorite;
                                                                    move || fav
                                                                } fallback=|| ().into_view()>
                                                                    <span class="text-yellow-500">"★"</span>
                                                                </Show>
                                                                <span
                                                                    class=format!("h-3 w-3 shrink-0 rounded-full {}", category_color(memo.category))
                                                                    title=memo.category.to_string()
                                                                ></span>
                                                            </span>
                                                        </div>
                                                        <CardDescription class="line-clamp-2 text-xs">
                                                            {memo.subtitle.clone().unwrap_or_default()}
                                                        </CardDescription>
                                                    </CardHeader>
                                                    <CardContent class="px-4">
                                                        <TagChips tags=tags small=true />
                                                    </CardContent>
                                                </Card>
                                            }
                                        })
                                        .collect_view()
                                }}
                            </div>
                        </Show>
                    </Show>
                </div>
            </main>
        </div>
    }
}

#[component]
pub fn PublicDisplayPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());
    let params = use_params_map();
    let memo_id = move || params.with(|p| p.get("id").unwrap_or_default());
    let memo_id_untracked = move || params.with_untracked(|p| p.get("id").unwrap_or_default());

    let memo: RwSignal<Option<Memo>> = RwSignal::new(None);
    let comments: RwSignal<Vec<Comment>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let new_comment: RwSignal<String> = RwSignal::new(String::new());
    let comment_preview: RwSignal<bool> = RwSignal::new(false);
    let posting: RwSignal<bool> = RwSignal::new(false);

    // Inline comment editing (author only).
    let editing_id: RwSignal<Option<String>> = RwSignal::new(None);
    let edit_value: RwSignal<String> = RwSignal::new(String::new());

    Effect::new(move |_| {
        let id = memo_id();
        if id.trim().is_empty() {
            return;
        }

        // Serve the short-lived view cache when fresh.
        if let Some(snap) = load_memo_view(&id, now_ms()) {
            memo.set(Some(snap.memo));
            comments.set(snap.comments);
            loading.set(false);
            return;
        }

        loading.set(true);
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.get_public_memo(&id).await {
                Ok(Some(m)) => {
                    let thread = client.list_comments(&id).await.unwrap_or_default();
                    save_memo_view(&id, m.clone(), thread.clone(), now_ms());
                    memo.set(Some(m));
                    comments.set(thread);
                }
                Ok(None) => {
                    memo.set(None);
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::NotFound {
                        memo.set(None);
                    } else {
                        error.set(Some(e.to_string()));
                    }
                }
            }
            loading.set(false);
        });
    });

    // Comment mutations invalidate the cached view and reload the thread.
    let reload_comments = move || {
        let id = memo_id_untracked();
        clear_memo_view(&id);
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.list_comments(&id).await {
                Ok(thread) => {
                    if let Some(m) = memo.get_untracked() {
                        save_memo_view(&id, m, thread.clone(), now_ms());
                    }
                    comments.set(thread);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let on_post_comment = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let content = new_comment.get_untracked();
        if content.trim().is_empty() || posting.get_untracked() {
            return;
        }
        let Some(user_id) = app_state.0.current_user_id() else {
            error.set(Some("You must be logged in to comment.".to_string()));
            return;
        };

        posting.set(true);
        error.set(None);

        let comment = NewComment {
            memo_id: memo_id_untracked(),
            user_id,
            content,
        };
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.create_comment(&comment).await {
                Ok(()) => {
                    new_comment.set(String::new());
                    comment_preview.set(false);
                    reload_comments();
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    error.set(Some(e.to_string()));
                }
            }
            posting.set(false);
        });
    };

    let save_comment_edit = move |unique_id: String| {
        let content = edit_value.get_untracked();
        if content.trim().is_empty() {
            return;
        }
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.update_comment(&unique_id, &content).await {
                Ok(()) => {
                    editing_id.set(None);
                    reload_comments();
                }
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let delete_comment = move |unique_id: String| {
        if !confirm("Delete this comment?") {
            return;
        }
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.delete_comment(&unique_id).await {
                Ok(()) => reload_comments(),
                Err(e) => error.set(Some(e.to_string())),
            }
        });
    };

    let signed_in = move || app_state.0.session.get().is_some();

    view! {
        <Show
            when=move || !loading.get()
            fallback=|| view! {
                <div class="flex h-64 items-center justify-center">
                    <p class="text-sm text-muted-foreground">"Loading..."</p>
                </div>
            }
        >
            <Show
                when=move || memo.get().is_some()
                fallback=move || view! {
                    <div class="mx-auto flex w-full max-w-md flex-col items-center gap-3 px-4 py-16">
                        <p class="text-sm text-muted-foreground">"Memo not found"</p>
                        <Button size=ButtonSize::Sm on:click=move |_| {
                            navigate.with_value(|nav| nav("/", Default::default()));
                        }>"Back"</Button>
                    </div>
                }
            >
                {move || {
                    memo.get().map(|m| {
                        let content_html = Signal::derive({
                            let content = m.content.clone().unwrap_or_default();
                            move || render_markdown_or_placeholder(&content)
                        });
                        let tags = m.tags_str().to_string();
                        view! {
                            <div class="mx-auto w-full max-w-4xl px-4 py-6">
                                <div class="mb-4 flex items-center justify-between gap-3">
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Sm
                                        on:click=move |_| navigate.with_value(|nav| nav("/", Default::default()))
                                    >
                                        "Back"
                                    </Button>
                                    <h1 class="min-w-0 flex-1 break-words text-center text-xl font-semibold">
                                        {m.title.clone()}
                                    </h1>
                                    <div class="shrink-0 text-sm text-muted-foreground">
                                        "by " <span class="text-foreground">{m.author_name().to_string()}</span>
                                    </div>
                                </div>

                                <div class="mb-3 grid grid-cols-2 gap-3">
                                    {m.subtitle.clone().filter(|s| !s.trim().is_empty()).map(|s| view! {
                                        <div>
                                            <Label class="mb-1 text-xs">"Summary"</Label>
                                            <p class="break-words text-sm">{s}</p>
                                        </div>
                                    })}
                                    {m.url.clone().filter(|u| !u.trim().is_empty()).map(|u| view! {
                                        <div>
                                            <Label class="mb-1 text-xs">"URL"</Label>
                                            <a
                                                href=u.clone()
                                                target="_blank"
                                                rel="noopener noreferrer"
                                                class="break-all text-sm text-primary underline underline-offset-4"
                                            >
                                                {u.clone()}
                                            </a>
                                        </div>
                                    })}
                                </div>

                                <MarkdownBody html=content_html />
                                {m.updated_at.clone().map(|t| view! {
                                    <div class="text-right">
                                        <span class="text-xs text-muted-foreground">
                                            {format!("Last updated: {}", format_timestamp(&t))}
                                        </span>
                                    </div>
                                })}

                                <div class="flex items-center gap-6 border-t pt-3">
                                    <TagChips tags=tags />
                                    <div class="ml-auto flex w-44 items-center gap-2 rounded-lg border px-3 py-2">
                                        <span class=format!("h-3 w-3 rounded-full {}", category_color(m.category))></span>
                                        <span class="text-sm">{m.category.to_string()}</span>
                                    </div>
                                </div>

                                // Comment thread.
                                <div class="mt-6 border-t pt-5">
                                    <h2 class="mb-3 text-lg font-semibold">
                                        {move || format!("Comments ({})", comments.get().len())}
                                    </h2>

                                    <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                        {move || {
                                            error.get().map(|e| view! {
                                                <Alert class="mb-3 border-destructive/30">
                                                    <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                                </Alert>
                                            })
                                        }}
                                    </Show>

                                    <form class="mb-6" on:submit=on_post_comment>
                                        <div class="mb-2 flex items-center justify-between">
                                            <Label class="text-xs">"Add a comment"</Label>
                                            <div class="flex overflow-hidden rounded-lg border text-xs">
                                                <button
                                                    type="button"
                                                    class=move || format!(
                                                        "px-3 py-1 {}",
                                                        if !comment_preview.get() { "bg-accent" } else { "hover:bg-accent/50" }
                                                    )
                                                    on:click=move |_| comment_preview.set(false)
                                                >
                                                    "Write"
                                                </button>
                                                <button
                                                    type="button"
                                                    class=move || format!(
                                                        "border-l px-3 py-1 {}",
                                                        if comment_preview.get() { "bg-accent" } else { "hover:bg-accent/50" }
                                                    )
                                                    on:click=move |_| comment_preview.set(true)
                                                >
                                                    "Preview"
                                                </button>
                                            </div>
                                        </div>

                                        <Show
                                            when=move || comment_preview.get()
                                            fallback=move || view! {
                                                <Textarea
                                                    placeholder={if signed_in() {
                                                        "Write a comment... (Markdown supported)"
                                                    } else {
                                                        "Please login to post a comment"
                                                    }}
                                                    bind_value=new_comment
                                                    disabled={!signed_in()}
                                                    class="min-h-[120px] text-sm"
                                                />
                                            }
                                        >
                                            <MarkdownBody html=Signal::derive(move || {
                                                render_markdown_or_placeholder(&new_comment.get())
                                            }) />
                                        </Show>

                                        <div class="mt-2 flex justify-end">
                                            <Button
                                                size=ButtonSize::Sm
                                                attr:disabled=move || {
                                                    posting.get()
                                                        || !signed_in()
                                                        || new_comment.get().trim().is_empty()
                                                }
                                            >
                                                <span class="inline-flex items-center gap-2">
                                                    <Show when=move || posting.get() fallback=|| ().into_view()>
                                                        <Spinner />
                                                    </Show>
                                                    "Post Comment"
                                                </span>
                                            </Button>
                                        </div>
                                    </form>

                                    <div class="flex flex-col gap-4">
                                        <Show
                                            when=move || !comments.get().is_empty()
                                            fallback=|| view! {
                                                <p class="py-1 text-center text-sm text-muted-foreground">
                                                    "No comments yet."
                                                </p>
                                            }
                                        >
                                            {move || {
                                                let current_user = app_state.0.current_user_id();
                                                comments
                                                    .get()
                                                    .into_iter()
                                                    .map(|c| {
                                                        let is_author = current_user.as_deref() == Some(c.user_id.as_str());
                                                        let uid_for_edit = c.unique_id.clone();
                                                        let uid_for_save = c.unique_id.clone();
                                                        let uid_for_delete = c.unique_id.clone();
                                                        let uid_for_editing = c.unique_id.clone();
                                                        let content_for_edit = c.content.clone();
                                                        let comment_html = Signal::derive({
                                                            let content = c.content.clone();
                                                            move || render_markdown_or_placeholder(&content)
                                                        });
                                                        view! {
                                                            <div class="overflow-hidden rounded-lg border">
                                                                <div class="flex items-center justify-between border-b bg-accent/30 px-4 py-2">
                                                                    <div class="flex items-center gap-2 text-sm">
                                                                        <span class="font-semibold">{c.author_name().to_string()}</span>
                                                                        {c.created_at.clone().map(|t| view! {
                                                                            <span class="text-xs text-muted-foreground">
                                                                                {format_timestamp(&t)}
                                                                            </span>
                                                                        })}
                                                                    </div>
                                                                    <Show when={
                                                                        move || is_author
                                                                    } fallback=|| ().into_view()>
                                                                        <div class="flex items-center gap-1">
                                                                            <Button
                                                                                variant=ButtonVariant::Ghost
                                                                                size=ButtonSize::Sm
                                                                                on:click={
                                                                                    let uid = uid_for_edit.clone();
                                                                                    let content = content_for_edit.clone();
                                                                                    move |_| {
                                                                                        editing_id.set(Some(uid.clone()));
                                                                                        edit_value.set(content.clone());
                                                                                    }
                                                                                }
                                                                            >
                                                                                "Edit"
                                                                            </Button>
                                                                            <Button
                                                                                variant=ButtonVariant::Ghost
                                                                                size=ButtonSize::Sm
                                                                                class="text-destructive"
                                                                                on:click={
                                                                                    let uid = uid_for_delete.clone();
                                                                                    move |_| delete_comment(uid.clone())
                                                                                }
                                                                            >
                                                                                "Delete"
                                                                            </Button>
                                                                        </div>
                                                                    </Show>
                                                                </div>

                                                                <Show
                                                                    when={
                                                                        let uid = uid_for_editing.clone();
                                                                        move || editing_id.get().as_deref() == Some(uid.as_str())
                                                                    }
                                                                    fallback=move || view! {
                                                                        <div class="p-1">
                                                                            <MarkdownBody html=comment_html />
                                                                        </div>
                                                                    }
                                                                >
                                                                    <div class="flex flex-col gap-2 p-3">
                                                                        <Textarea
                                                                            bind_value=edit_value
                                                                            class="min-h-[100px] text-sm"
                                                                        />
                                                                        <div class="flex justify-end gap-2">
                                                                            <Button
                                                                                variant=ButtonVariant::Ghost
                                                                                size=ButtonSize::Sm
                                                                                on:click=move |_| editing_id.set(None)
                                                                            >
                                                                                "Cancel"
                                                                            </Button>
                                                                            <Button
                                                                                size=ButtonSize::Sm
                                                                                on:click={
                                                                                    let uid = uid_for_save.clone();
                                                                                    move |_| save_comment_edit(uid.clone())
                                                                                }
                                                                            >
                                                                                "Save"
                                                                            </Button>
                                                                        </div>
                                                                    </div>
                                                                </Show>
                                                            </div>
                                                        }
                                                    })
                                                    .collect_view()
                                            }}
                                        </Show>
                                    </div>
                                </div>
                            </div>
                        }
                    })
                }}
            </Show>
        </Show>
    }
}

#[component]
pub fn MyDisplayPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());
    let params = use_params_map();
    let memo_id = move || params.with(|p| p.get("id").unwrap_or_default());
    let memo_id_untracked = move || params.with_untracked(|p| p.get("id").unwrap_or_default());

    let memo: RwSignal<Option<Memo>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    Effect::new(move |_| {
        let id = memo_id();
        if id.trim().is_empty() {
            return;
        }

        if let Some(snap) = load_memo_view(&id, now_ms()) {
            memo.set(Some(snap.memo));
            loading.set(false);
            return;
        }

        loading.set(true);
        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.get_my_memo(&id).await {
                Ok(Some(m)) => {
                    save_memo_view(&id, m.clone(), vec![], now_ms());
                    memo.set(Some(m));
                }
                Ok(None) => memo.set(None),
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    if e.kind == ApiErrorKind::NotFound {
                        memo.set(None);
                    } else {
                        error.set(Some(e.to_string()));
                    }
                }
            }
            loading.set(false);
        });
    });

    let on_delete = move |_| {
        if !confirm("Do you really want to delete this memo?") {
            return;
        }

        let id = memo_id_untracked();
        loading.set(true);
        let client = app_state.0.data_client();
        spawn_local(async move {
            clear_memo_view(&id);
            match client.delete_memo(&id).await {
                Ok(()) => {
                    app_state.0.my_memos_loaded.set(false);
                    navigate.with_value(|nav| nav("/my", Default::default()));
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                    loading.set(false);
                }
            }
        });
    };

    view! {
        <Show
            when=move || !loading.get()
            fallback=|| view! {
                <div class="flex h-64 items-center justify-center">
                    <p class="text-sm text-muted-foreground">"Loading..."</p>
                </div>
            }
        >
            <Show
                when=move || memo.get().is_some()
                fallback=move || view! {
                    <div class="mx-auto flex w-full max-w-md flex-col items-center gap-3 px-4 py-16">
                        <p class="text-sm text-muted-foreground">"Memo not found"</p>
                        <Button size=ButtonSize::Sm on:click=move |_| {
                            navigate.with_value(|nav| nav("/my", Default::default()));
                        }>"Back"</Button>
                    </div>
                }
            >
                {move || {
                    memo.get().map(|m| {
                        let content_html = Signal::derive({
                            let content = m.content.clone().unwrap_or_default();
                            move || render_markdown_or_placeholder(&content)
                        });
                        let tags = m.tags_str().to_string();
                        let id_for_edit = m.id.clone();
                        view! {
                            <div class="mx-auto w-full max-w-4xl px-4 py-6">
                                <div class="mb-4 flex items-center justify-between gap-3">
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Sm
                                        on:click=move |_| navigate.with_value(|nav| nav("/my", Default::default()))
                                    >
                                        "Back"
                                    </Button>
                                    <h1 class="min-w-0 flex-1 break-words text-center text-xl font-semibold">
                                        {m.title.clone()}
                                    </h1>
                                    <div class="flex shrink-0 items-center gap-2">
                                        <Button
                                            variant=ButtonVariant::Outline
                                            size=ButtonSize::Sm
                                            on:click=move |_| {
                                                navigate.with_value(|nav| {
                                                    nav(&format!("/my/{id_for_edit}/edit"), Default::default());
                                                });
                                            }
                                        >
                                            "Edit"
                                        </Button>
                                        <Button
                                            variant=ButtonVariant::Destructive
                                            size=ButtonSize::Sm
                                            on:click=on_delete
                                        >
                                            "Delete"
                                        </Button>
                                        <Show when={
                                            let fav = m.favorite;
                                            move || fav
                                        } fallback=|| ().into_view()>
                                            <span class="text-lg text-yellow-500" title="Favorite">"★"</span>
                                        </Show>
                                    </div>
                                </div>

                                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                    {move || {
                                        error.get().map(|e| view! {
                                            <Alert class="mb-3 border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                            </Alert>
                                        })
                                    }}
                                </Show>

                                <div class="mb-3 grid grid-cols-2 gap-3">
                                    {m.subtitle.clone().filter(|s| !s.trim().is_empty()).map(|s| view! {
                                        <div>
                                            <Label class="mb-1 text-xs">"Summary"</Label>
                                            <p class="break-words text-sm">{s}</p>
                                        </div>
                                    })}
                                    {m.url.clone().filter(|u| !u.trim().is_empty()).map(|u| view! {
                                        <div>
                                            <Label class="mb-1 text-xs">"URL"</Label>
                                            <a
                                                href=u.clone()
                                                target="_blank"
                                                rel="noopener noreferrer"
                                                class="break-all text-sm text-primary underline underline-offset-4"
                                            >
                                                {u.clone()}
                                            </a>
                                        </div>
                                    })}
                                </div>

                                <MarkdownBody html=content_html />
                                {m.updated_at.clone().map(|t| view! {
                                    <div class="text-right">
                                        <span class="text-xs text-muted-foreground">
                                            {format!("Last updated: {}", format_timestamp(&t))}
                                        </span>
                                    </div>
                                })}

                                <div class="flex items-center gap-6 border-t pt-3">
                                    <span class=format!(
                                        "rounded-full px-3 py-1.5 text-sm font-medium {}",
                                        if m.publish { "bg-green-100 text-green-800" } else { "bg-gray-100 text-gray-800" }
                                    )>
                                        {if m.publish { "Publish" } else { "Private" }}
                                    </span>
                                    <TagChips tags=tags />
                                    <div class="ml-auto flex w-44 items-center gap-2 rounded-lg border px-3 py-2">
                                        <span class=format!("h-3 w-3 rounded-full {}", category_color(m.category))></span>
                                        <span class="text-sm">{m.category.to_string()}</span>
                                    </div>
                                </div>
                            </div>
                        }
                    })
                }}
            </Show>
        </Show>
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let username: RwSignal<String> = RwSignal::new(String::new());
    let language: RwSignal<String> = RwSignal::new(String::new());
    let rate: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<Option<String>> = RwSignal::new(None);

    let loading: RwSignal<bool> = RwSignal::new(true);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let success: RwSignal<bool> = RwSignal::new(false);

    // Prefill from the mirrored profile row, once.
    Effect::new(move |_| {
        let Some(user_id) = app_state.0.current_user_id() else {
            loading.set(false);
            return;
        };

        let client = app_state.0.data_client();
        spawn_local(async move {
            match client.get_profile(&user_id).await {
                Ok(Some(profile)) => {
                    username.set(profile.atcoder_username.unwrap_or_default());
                    language.set(profile.favorite_language.unwrap_or_default());
                    rate.set(
                        profile
                            .atcoder_rate
                            .map(|r| r.to_string())
                            .unwrap_or_default(),
                    );
                    email.set(Some(profile.email));
                }
                Ok(None) => {}
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let Some(session) = app_state.0.session.get_untracked() else {
            error.set(Some("No logged in user".to_string()));
            return;
        };
        let Some(email_val) = email.get_untracked().or_else(|| session.user.email.clone())
        else {
            error.set(Some("User email not found".to_string()));
            return;
        };

        let rate_raw = rate.get_untracked();
        let rate_val = match rate_raw.trim() {
            "" => None,
            s => match s.parse::<i64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    error.set(Some("AtCoder rate must be a number".to_string()));
                    return;
                }
            },
        };

        let username_val = username.get_untracked();
        let language_val = language.get_untracked();
        let non_blank = |s: &str| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.trim().to_string())
            }
        };

        saving.set(true);
        error.set(None);
        success.set(false);

        let identity = app_state.0.identity_client();
        let client = app_state.0.data_client();
        spawn_local(async move {
            // Two independent writes: provider metadata, then the mirrored
            // profile row. A failure in the second leaves the first in
            // place (no compensating rollback).
            let metadata = serde_json::json!({
                "atcoderUsername": non_blank(&username_val),
                "favoriteLanguage": non_blank(&language_val),
                "atcoderRate": rate_val,
            });
            if let Err(e) = identity.update_metadata(&session, metadata).await {
                if e.kind == ApiErrorKind::Unauthorized {
                    app_state.0.force_sign_in();
                    return;
                }
                error.set(Some(e.to_string()));
                saving.set(false);
                return;
            }

            let profile = Profile {
                user_id: session.user_id().to_string(),
                email: email_val,
                atcoder_username: non_blank(&username_val),
                favorite_language: non_blank(&language_val),
                atcoder_rate: rate_val,
                icon_url: None,
            };
            match client.upsert_profile(&profile).await {
                Ok(()) => success.set(true),
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    error.set(Some(e.to_string()));
                }
            }
            saving.set(false);
        });
    };

    let on_sign_out = move |_| {
        app_state.0.sign_out();
        let _ = window().location().set_href("/login");
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-md px-4 py-10">
                <div class="mb-4 flex items-center justify-between">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        on:click=move |_| navigate.with_value(|nav| nav("/my", Default::default()))
                    >
                        "Back"
                    </Button>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_sign_out>
                        "Sign out"
                    </Button>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"AtCoder Settings"</CardTitle>
                        <CardDescription class="text-xs">
                            "Shown next to your published memos and comments."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <Show
                            when=move || !loading.get()
                            fallback=|| view! {
                                <p class="text-sm text-muted-foreground">"Loading..."</p>
                            }
                        >
                            <form class="flex flex-col gap-3" on:submit=on_submit>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="atcoder_username" class="text-xs">"AtCoder username"</Label>
                                    <Input
                                        id="atcoder_username"
                                        placeholder="tourist"
                                        bind_value=username
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="favorite_language" class="text-xs">"Favorite language"</Label>
                                    <Input
                                        id="favorite_language"
                                        placeholder="Rust"
                                        bind_value=language
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="atcoder_rate" class="text-xs">"AtCoder rate"</Label>
                                    <Input
                                        id="atcoder_rate"
                                        placeholder="1200"
                                        bind_value=rate
                                        class="h-8 text-sm"
                                    />
                                </div>

                                <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                    {move || {
                                        error.get().map(|e| view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                            </Alert>
                                        })
                                    }}
                                </Show>

                                <Show when=move || success.get() fallback=|| ().into_view()>
                                    <Alert>
                                        <AlertDescription class="text-xs">
                                            "Profile updated successfully"
                                        </AlertDescription>
                                    </Alert>
                                </Show>

                                <Button
                                    class="w-full"
                                    size=ButtonSize::Sm
                                    attr:disabled=move || saving.get()
                                >
                                    <span class="inline-flex items-center gap-2">
                                        <Show when=move || saving.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || if saving.get() { "Saving..." } else { "Save" }}
                                    </span>
                                </Button>
                            </form>
                        </Show>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}
