mod update;

use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use librarian_core::{ClientConfig, Command, Controller, Debouncer};

use crate::model::dashboard::Dashboard;
use crate::theme::Theme;
use crate::tui_event::{BackendCommand, BackendEvent};

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keys are typed into the focused text field.
    Editing,
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Filters,
    Form,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::List => Focus::Filters,
            Focus::Filters => Focus::Form,
            Focus::Form => Focus::List,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::List => Focus::Form,
            Focus::Filters => Focus::List,
            Focus::Form => Focus::Filters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Query,
    Author,
    YearMin,
    YearMax,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Query,
        FilterField::Author,
        FilterField::YearMin,
        FilterField::YearMax,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Query => "Search",
            FilterField::Author => "Author",
            FilterField::YearMin => "From",
            FilterField::YearMax => "To",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Isbn,
    Title,
    Author,
    Year,
    Status,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Isbn,
        FormField::Title,
        FormField::Author,
        FormField::Year,
        FormField::Status,
        FormField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Isbn => "ISBN",
            FormField::Title => "Title",
            FormField::Author => "Author",
            FormField::Year => "Year",
            FormField::Status => "Status",
            FormField::Description => "Description",
        }
    }
}

/// Step through a field list, clamping at both ends.
fn step<T: Copy + PartialEq>(all: &[T], current: T, delta: isize) -> T {
    let i = all.iter().position(|f| *f == current).unwrap_or(0);
    let j = i.saturating_add_signed(delta).min(all.len() - 1);
    all[j]
}

/// Main application state.
pub struct App {
    pub controller: Controller,
    pub dashboard: Dashboard,
    pub theme: Theme,
    /// Shown in the header.
    pub api_root: String,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub filter_field: FilterField,
    pub form_field: FormField,
    /// Raw text of the year inputs; the filter state only holds parsed years.
    pub year_min_input: String,
    pub year_max_input: String,
    /// Delays fetches while filter text is being typed.
    pub debouncer: Debouncer,
    pub show_help: bool,
    /// Delete confirmation modal is open.
    pub confirm_delete: bool,
    pub should_quit: bool,
    pub tick: usize,
    /// Last list area rendered (for mouse click → row mapping).
    pub last_list_area: Option<Rect>,
    /// First row index drawn in the list (set by the list view).
    pub list_offset: usize,
    /// Channel to send commands to the backend task.
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(config: &ClientConfig, theme: Theme) -> Self {
        let controller = Controller::new(config);
        let mut dashboard = Dashboard::default();
        controller.render_all(&mut dashboard);

        Self {
            controller,
            dashboard,
            theme,
            api_root: config.api_root(),
            focus: Focus::List,
            input_mode: InputMode::Normal,
            filter_field: FilterField::Query,
            form_field: FormField::Title,
            year_min_input: String::new(),
            year_max_input: String::new(),
            debouncer: Debouncer::new(config.debounce()),
            show_help: false,
            confirm_delete: false,
            should_quit: false,
            tick: 0,
            last_list_area: None,
            list_offset: 0,
            backend_cmd_tx: None,
        }
    }

    /// Hand a command to the backend task.
    pub fn dispatch(&mut self, cmd: Command) {
        match &self.backend_cmd_tx {
            Some(tx) => {
                if tx.send(BackendCommand::Execute(cmd)).is_err() {
                    tracing::warn!("backend task is gone; command dropped");
                }
            }
            None => tracing::debug!(?cmd, "no backend attached; command dropped"),
        }
    }

    /// Fetch with the current filters now, dropping any pending debounce.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        if let Ok(cmd) = self.controller.refresh(&mut self.dashboard) {
            self.dispatch(cmd);
        }
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Finished(outcome) => {
                if let Some(next) = self.controller.handle(outcome, &mut self.dashboard) {
                    self.dispatch(next);
                }
            }
        }
    }

    /// Text currently shown in a filter input.
    pub fn filter_text(&self, field: FilterField) -> &str {
        let filters = self.controller.filters();
        match field {
            FilterField::Query => &filters.query,
            FilterField::Author => &filters.author,
            FilterField::YearMin => &self.year_min_input,
            FilterField::YearMax => &self.year_max_input,
        }
    }

    /// Text currently shown in a form input.
    pub fn form_text(&self, field: FormField) -> &str {
        let f = &self.dashboard.form.fields;
        match field {
            FormField::Isbn => &f.isbn,
            FormField::Title => &f.title,
            FormField::Author => &f.author,
            FormField::Year => &f.year,
            FormField::Status => &f.status,
            FormField::Description => &f.description,
        }
    }

    pub fn view(&mut self, f: &mut Frame) {
        crate::view::render(f, self);
    }
}

#[cfg(test)]
mod tests;
