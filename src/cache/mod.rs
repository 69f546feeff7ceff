pub(crate) mod memo_view;

pub(crate) use memo_view::{clear_memo_view, load_memo_view, save_memo_view, MemoViewSnapshot};
