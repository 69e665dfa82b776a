//! The rendering sink the controller draws into.
//!
//! A front end implements [`CatalogView`] once; the controller calls it
//! after every state change with ready-made view-models.

use crate::render::{Inspector, ListRow};
use crate::state::{FormState, ListStatus};
use crate::stats::CatalogStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A transient notification ("toast").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

pub trait CatalogView {
    fn set_loading(&mut self, loading: bool);

    fn render_list(&mut self, rows: &[ListRow], result_label: &str);

    fn render_stats(&mut self, stats: &CatalogStats);

    fn render_list_status(&mut self, status: &ListStatus);

    fn render_inspector(&mut self, inspector: &Inspector);

    fn render_form(&mut self, form: &FormState);

    fn set_lookup_busy(&mut self, busy: bool);

    fn notify(&mut self, notice: Notice);
}

/// Answers a destructive-action prompt.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A decision already taken elsewhere (a modal, a `--yes` flag).
impl Confirm for bool {
    fn confirm(&mut self, _prompt: &str) -> bool {
        *self
    }
}
