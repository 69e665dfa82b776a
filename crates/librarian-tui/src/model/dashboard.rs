//! What the dashboard currently shows. The controller draws into this through
//! [`CatalogView`]; the ratatui views only read it.

use librarian_core::render::{Inspector, ListRow};
use librarian_core::{CatalogStats, CatalogView, FormState, ListStatus, NOTICE_TTL, Notice};

use super::toast::ToastQueue;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub loading: bool,
    pub rows: Vec<ListRow>,
    pub result_label: String,
    pub stats: CatalogStats,
    pub list_status: ListStatus,
    pub inspector: Inspector,
    pub form: FormState,
    pub lookup_busy: bool,
    pub toasts: ToastQueue,
    /// Row under the list cursor.
    pub cursor: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            loading: false,
            rows: Vec::new(),
            result_label: librarian_core::render::result_label(0),
            stats: CatalogStats::default(),
            list_status: ListStatus::Idle,
            inspector: Inspector::Empty,
            form: FormState::default(),
            lookup_busy: false,
            toasts: ToastQueue::new(NOTICE_TTL),
            cursor: 0,
        }
    }
}

impl Dashboard {
    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn cursor_to(&mut self, index: usize) {
        self.cursor = index.min(self.rows.len().saturating_sub(1));
    }
}

impl CatalogView for Dashboard {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn render_list(&mut self, rows: &[ListRow], result_label: &str) {
        self.rows = rows.to_vec();
        self.result_label = result_label.to_string();
        // Follow the selection when it is on this page.
        match self.rows.iter().position(|r| r.active) {
            Some(i) => self.cursor = i,
            None => self.cursor_to(self.cursor),
        }
    }

    fn render_stats(&mut self, stats: &CatalogStats) {
        self.stats = *stats;
    }

    fn render_list_status(&mut self, status: &ListStatus) {
        self.list_status = status.clone();
    }

    fn render_inspector(&mut self, inspector: &Inspector) {
        self.inspector = inspector.clone();
    }

    fn render_form(&mut self, form: &FormState) {
        self.form = form.clone();
    }

    fn set_lookup_busy(&mut self, busy: bool) {
        self.lookup_busy = busy;
    }

    fn notify(&mut self, notice: Notice) {
        self.toasts.push(notice);
    }
}
