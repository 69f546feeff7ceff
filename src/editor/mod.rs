use crate::api::{ApiErrorKind, MemoChanges};
use crate::cache::clear_memo_view;
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Checkbox, Input, Label, Select,
    Spinner, Textarea,
};
use crate::drafts::{clear_draft, load_draft, reconcile, save_draft, DraftDecision, DraftKey};
use crate::filter::normalize_tags;
use crate::models::{Category, MemoDraft};
use crate::state::AppContext;
use crate::util::confirm;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::{use_navigate, use_params_map};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Reactive mirror of the machine for rendering. The unload guard never
/// reads this; it reads the SaveGuard directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorPhase {
    /// Mounted, load not yet started.
    Idle,
    Loading,
    Clean,
    Dirty,
    Saving,
}

/// Synchronous dirty/saving flags shared between the save routine and the
/// `beforeunload` listener.
///
/// The listener fires between microtasks; a signal written inside the async
/// save could still be unobserved when the page unloads. Both sides read
/// and write these flags directly, so "saving has begun" is visible to the
/// unload handler the instant the submit handler runs.
#[derive(Clone, Default)]
pub(crate) struct SaveGuard {
    dirty: Arc<AtomicBool>,
    saving: Arc<AtomicBool>,
}

impl SaveGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn reset_clean(&self) {
        self.dirty.store(false, Ordering::SeqCst);
        self.saving.store(false, Ordering::SeqCst);
    }

    /// Called synchronously in the submit handler, before the first await.
    pub fn begin_save(&self) {
        self.saving.store(true, Ordering::SeqCst);
    }

    /// Write failed: nothing was lost, the form stays dirty and warnable.
    pub fn fail_save(&self) {
        self.saving.store(false, Ordering::SeqCst);
    }

    /// Write landed: the form matches the server again.
    pub fn finish_save(&self) {
        self.dirty.store(false, Ordering::SeqCst);
        self.saving.store(false, Ordering::SeqCst);
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Warn on unload only for unsaved work that is not mid-save.
    pub fn should_warn(&self) -> bool {
        self.is_dirty() && !self.is_saving()
    }
}

/// The editable form fields as a bundle of signals.
#[derive(Clone, Copy)]
pub(crate) struct EditorForm {
    pub title: RwSignal<String>,
    pub subtitle: RwSignal<String>,
    pub url: RwSignal<String>,
    pub content: RwSignal<String>,
    pub publish: RwSignal<bool>,
    pub tags: RwSignal<String>,
    pub category: RwSignal<String>,
    pub favorite: RwSignal<bool>,
}

impl EditorForm {
    pub fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            subtitle: RwSignal::new(String::new()),
            url: RwSignal::new(String::new()),
            content: RwSignal::new(String::new()),
            publish: RwSignal::new(false),
            tags: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
            favorite: RwSignal::new(false),
        }
    }

    pub fn snapshot(&self) -> MemoDraft {
        MemoDraft {
            title: self.title.get_untracked(),
            subtitle: self.subtitle.get_untracked(),
            url: self.url.get_untracked(),
            content: self.content.get_untracked(),
            publish: self.publish.get_untracked(),
            tags: self.tags.get_untracked(),
            category: self.category.get_untracked(),
            favorite: self.favorite.get_untracked(),
        }
    }

    /// Tracked read of every field; the write-through effect subscribes
    /// through this.
    pub fn snapshot_tracked(&self) -> MemoDraft {
        MemoDraft {
            title: self.title.get(),
            subtitle: self.subtitle.get(),
            url: self.url.get(),
            content: self.content.get(),
            publish: self.publish.get(),
            tags: self.tags.get(),
            category: self.category.get(),
            favorite: self.favorite.get(),
        }
    }

    /// Restoring must carry every field; nothing is silently dropped.
    pub fn apply(&self, d: &MemoDraft) {
        self.title.set(d.title.clone());
        self.subtitle.set(d.subtitle.clone());
        self.url.set(d.url.clone());
        self.content.set(d.content.clone());
        self.publish.set(d.publish);
        self.tags.set(d.tags.clone());
        self.category.set(d.category.clone());
        self.favorite.set(d.favorite);
    }
}

const RESTORE_PROMPT: &str =
    "An unsaved draft has been found. Would you like to restore the draft?";
const DISCARD_PROMPT: &str = "Discard your unsaved changes?";

#[component]
pub fn MemoEditorPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params_map();
    let navigate = StoredValue::new(use_navigate());

    // Empty id = create mode (the `new` draft sentinel).
    let memo_id = move || params.with(|p| p.get("id").unwrap_or_default());
    let memo_id_untracked =
        move || params.with_untracked(|p| p.get("id").unwrap_or_default());

    let form = EditorForm::new();

    // Copy handle; get_value() clones share the same atomic flags.
    let guard = StoredValue::new(SaveGuard::new());

    let phase: RwSignal<EditorPhase> = RwSignal::new(EditorPhase::Idle);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let not_found: RwSignal<bool> = RwSignal::new(false);

    // Set once the initial load (and draft reconciliation) finished; the
    // write-through effect is inert before that.
    let loaded: RwSignal<bool> = RwSignal::new(false);

    // Last persisted snapshot; cancel compares against this.
    let baseline: RwSignal<MemoDraft> = RwSignal::new(MemoDraft::default());

    // Load + reconcile. Tracks the route id so /my/new -> /my/:id/edit
    // transitions re-enter Loading.
    Effect::new(move |_| {
        let id = memo_id();
        let guard = guard.get_value();

        loaded.set(false);
        not_found.set(false);
        error.set(None);
        phase.set(EditorPhase::Loading);
        guard.reset_clean();

        let key = DraftKey::for_memo_id(&id);
        let client = app_state.0.data_client();

        spawn_local(async move {
            let server = match &key {
                DraftKey::Memo(mid) => match client.get_my_memo(mid).await {
                    Ok(Some(memo)) => MemoDraft::from_memo(&memo),
                    Ok(None) => {
                        not_found.set(true);
                        phase.set(EditorPhase::Clean);
                        return;
                    }
                    Err(e) => {
                        if e.kind == ApiErrorKind::Unauthorized {
                            app_state.0.force_sign_in();
                            return;
                        }
                        if e.kind == ApiErrorKind::NotFound {
                            not_found.set(true);
                            phase.set(EditorPhase::Clean);
                            return;
                        }
                        error.set(Some(e.to_string()));
                        phase.set(EditorPhase::Clean);
                        return;
                    }
                },
                DraftKey::New => MemoDraft::default(),
            };

            match reconcile(load_draft(&key)) {
                DraftDecision::UseServer => {
                    form.apply(&server);
                    phase.set(EditorPhase::Clean);
                }
                DraftDecision::DiscardEmpty => {
                    clear_draft(&key);
                    form.apply(&server);
                    phase.set(EditorPhase::Clean);
                }
                DraftDecision::PromptRestore(draft) => {
                    if confirm(RESTORE_PROMPT) {
                        form.apply(&draft);
                        guard.mark_dirty();
                        phase.set(EditorPhase::Dirty);
                    } else {
                        clear_draft(&key);
                        form.apply(&server);
                        phase.set(EditorPhase::Clean);
                    }
                }
            }

            baseline.set(server);
            loaded.set(true);
        });
    });

    // Write-through draft persistence: every field mutation after the
    // initial load stores the full snapshot (this is what survives a
    // reload) and raises the dirty flag.
    Effect::new(move |_| {
        let snapshot = form.snapshot_tracked();
        if !loaded.get_untracked() {
            return;
        }

        let key = DraftKey::for_memo_id(&memo_id_untracked());
        save_draft(&key, &snapshot);
        guard.with_value(|g| g.mark_dirty());
        if phase.get_untracked() == EditorPhase::Clean {
            phase.set(EditorPhase::Dirty);
        }
    });

    // Unload warning while dirty and not saving. Reads the SaveGuard
    // synchronously; the signal mirror is for rendering only.
    let guard_for_unload = guard.get_value();
    let unload_handle = window_event_listener(ev::beforeunload, move |e: web_sys::BeforeUnloadEvent| {
        if guard_for_unload.should_warn() {
            e.prevent_default();
            e.set_return_value("");
        }
    });
    on_cleanup(move || unload_handle.remove());

    let do_save = move || {
        if guard.with_value(|g| g.is_saving()) {
            return;
        }

        let mut snapshot = form.snapshot();
        if snapshot.title.trim().is_empty() {
            error.set(Some("Title is required".to_string()));
            return;
        }
        let Ok(category) = Category::from_str(snapshot.category.trim()) else {
            error.set(Some("Please select a category".to_string()));
            return;
        };

        // Bypass the unload warning before the async write starts.
        guard.with_value(|g| g.begin_save());
        phase.set(EditorPhase::Saving);
        error.set(None);

        snapshot.tags = normalize_tags(&snapshot.tags);
        form.tags.set(snapshot.tags.clone());

        let changes = MemoChanges {
            title: snapshot.title.clone(),
            subtitle: snapshot.subtitle.clone(),
            url: snapshot.url.clone(),
            content: snapshot.content.clone(),
            publish: snapshot.publish,
            tags: snapshot.tags.clone(),
            category,
            favorite: snapshot.favorite,
        };

        let key = DraftKey::for_memo_id(&memo_id_untracked());
        let client = app_state.0.data_client();
        let guard = guard.get_value();

        spawn_local(async move {
            let result = match &key {
                DraftKey::Memo(mid) => client.update_memo(mid, &changes).await.map(|_| mid.clone()),
                DraftKey::New => client.create_memo(&changes).await.map(|memo| memo.id),
            };

            match result {
                Ok(saved_id) => {
                    // Exactly one draft deletion per successful submit.
                    clear_draft(&key);
                    clear_memo_view(&saved_id);
                    baseline.set(snapshot);
                    guard.finish_save();
                    app_state.0.my_memos_loaded.set(false);
                    navigate.with_value(|nav| {
                        nav(&format!("/my/{saved_id}"), Default::default());
                    });
                }
                Err(e) => {
                    if e.kind == ApiErrorKind::Unauthorized {
                        app_state.0.force_sign_in();
                        return;
                    }
                    // Draft and form stay intact; resubmission is manual.
                    error.set(Some(e.to_string()));
                    guard.fail_save();
                    phase.set(EditorPhase::Dirty);
                }
            }
        });
    };

    let on_cancel = move |_| {
        let id = memo_id_untracked();
        let key = DraftKey::for_memo_id(&id);

        if form.snapshot() != baseline.get_untracked() && !confirm(DISCARD_PROMPT) {
            return;
        }

        clear_draft(&key);
        guard.with_value(|g| g.reset_clean());

        let target = if id.trim().is_empty() {
            "/my".to_string()
        } else {
            format!("/my/{id}")
        };
        navigate.with_value(|nav| nav(&target, Default::default()));
    };

    let is_edit_mode = move || !memo_id().trim().is_empty();
    let saving = move || phase.get() == EditorPhase::Saving;

    let category_options: StoredValue<Vec<(String, String)>> = StoredValue::new(
        Category::iter()
            .map(|c| (c.to_string(), c.to_string()))
            .collect(),
    );

    view! {
        <Show
            when=move || !matches!(phase.get(), EditorPhase::Idle | EditorPhase::Loading)
            fallback=|| view! {
                <div class="flex h-64 items-center justify-center">
                    <p class="text-sm text-muted-foreground">"Loading..."</p>
                </div>
            }
        >
            <Show
                when=move || !not_found.get()
                fallback=move || view! {
                    <div class="mx-auto flex w-full max-w-md flex-col items-center gap-3 px-4 py-16">
                        <p class="text-sm text-muted-foreground">"Memo not found"</p>
                        <Button size=ButtonSize::Sm on:click=move |_| {
                            navigate.with_value(|nav| nav("/my", Default::default()));
                        }>"Back"</Button>
                    </div>
                }
            >
                <div class="mx-auto w-full max-w-3xl px-4 py-6">
                    <div class="mb-4 flex items-center justify-between">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=on_cancel
                        >
                            "Back"
                        </Button>
                        <h1 class="text-xl font-semibold">
                            {move || if is_edit_mode() { "Edit Memo" } else { "New Memo" }}
                        </h1>
                        <label class="flex items-center gap-2 text-sm text-muted-foreground">
                            <Checkbox bind_value=form.favorite />
                            "Favorite"
                        </label>
                    </div>

                    <form
                        class="flex flex-col gap-3"
                        on:submit=move |ev: web_sys::SubmitEvent| {
                            ev.prevent_default();
                            do_save();
                        }
                    >
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="title" class="text-xs">"Title"</Label>
                            <Input
                                id="title"
                                placeholder="Memo's Title"
                                bind_value=form.title
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="grid grid-cols-2 gap-3">
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="subtitle" class="text-xs">"Summary"</Label>
                                <Input
                                    id="subtitle"
                                    placeholder="Supplementary Information (Option)"
                                    bind_value=form.subtitle
                                    class="h-8 text-sm"
                                />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="url" class="text-xs">"URL"</Label>
                                <Input
                                    id="url"
                                    r#type="url"
                                    placeholder="https://example.com (Option)"
                                    bind_value=form.url
                                    class="h-8 text-sm"
                                />
                            </div>
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="content" class="text-xs">"Content"</Label>
                            <Textarea
                                id="content"
                                placeholder="Detailed Content (Markdown supported)"
                                bind_value=form.content
                                class="min-h-[320px] text-sm"
                            />
                        </div>

                        <div class="flex items-end gap-4 border-t pt-3">
                            <label class="flex items-center gap-2 pb-2 text-sm">
                                <Checkbox bind_value=form.publish />
                                "Publish"
                            </label>

                            <div class="flex flex-1 flex-col gap-1.5">
                                <Label html_for="tags" class="text-xs">"Tags (space delimiter)"</Label>
                                <Input
                                    id="tags"
                                    placeholder="dp algorithm"
                                    bind_value=form.tags
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex w-48 flex-col gap-1.5">
                                <Label html_for="category" class="text-xs">"Category"</Label>
                                <Select
                                    id="category"
                                    required=true
                                    options=category_options.get_value()
                                    placeholder="Please Select"
                                    bind_value=form.category
                                    class="h-8 text-sm"
                                />
                            </div>
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

                        <div class="flex justify-end pt-2">
                            <Button size=ButtonSize::Sm attr:disabled=saving>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=saving fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if saving() { "Saving..." } else if is_edit_mode() { "Save" } else { "Create" }}
                                </span>
                            </Button>
                        </div>
                    </form>
                </div>
            </Show>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_starts_clean() {
        let g = SaveGuard::new();
        assert!(!g.is_dirty());
        assert!(!g.is_saving());
        assert!(!g.should_warn());
    }

    #[test]
    fn test_dirty_form_warns_on_unload() {
        let g = SaveGuard::new();
        g.mark_dirty();
        assert!(g.should_warn());
    }

    #[test]
    fn test_warning_suppressed_while_saving() {
        let g = SaveGuard::new();
        g.mark_dirty();
        g.begin_save();
        assert!(g.is_dirty());
        assert!(!g.should_warn());
    }

    #[test]
    fn test_failed_save_restores_the_warning() {
        let g = SaveGuard::new();
        g.mark_dirty();
        g.begin_save();
        g.fail_save();
        assert!(g.should_warn());
    }

    #[test]
    fn test_successful_save_clears_the_warning_for_good() {
        let g = SaveGuard::new();
        g.mark_dirty();
        g.begin_save();
        g.finish_save();
        assert!(!g.is_dirty());
        assert!(!g.should_warn());
    }

    #[test]
    fn test_guard_is_shared_between_clones() {
        // The unload listener holds a clone; both must observe the same flags.
        let g = SaveGuard::new();
        let listener_view = g.clone();
        g.mark_dirty();
        assert!(listener_view.should_warn());
        g.begin_save();
        assert!(!listener_view.should_warn());
    }
}
