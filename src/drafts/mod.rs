mod memo;

pub(crate) use memo::{clear_draft, load_draft, reconcile, save_draft, DraftDecision, DraftKey};
