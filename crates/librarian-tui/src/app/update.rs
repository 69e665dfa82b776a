use librarian_core::filter::{self, FilterChange};
use librarian_core::{BookStatus, CatalogView, ClientError, Notice};
use tokio::time::Instant;

use super::{App, FilterField, Focus, FormField, InputMode, step};
use crate::action::Action;

/// Longest year a filter input accepts. Keeps the digits inside `i32`.
const YEAR_DIGITS: usize = 4;

/// Parse a year input; blank text means "no bound".
fn parse_year(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// Next value of the status field: blank, then each status in turn.
fn next_status(current: &str) -> String {
    let pos = BookStatus::ALL.iter().position(|s| s.as_str() == current);
    match pos {
        None => BookStatus::ALL[0].as_str().to_string(),
        Some(i) if i + 1 < BookStatus::ALL.len() => BookStatus::ALL[i + 1].as_str().to_string(),
        Some(_) => String::new(),
    }
}

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.on_tick();
                return false;
            }
            // The next frame is laid out against the new size.
            Action::Resize(..) => return false,
            _ => {}
        }

        // Delete confirmation modal: y confirms, Esc cancels
        if self.confirm_delete {
            match action {
                Action::Confirm => {
                    self.confirm_delete = false;
                    if let Ok(Some(cmd)) =
                        self.controller.delete_selected(&mut self.dashboard, &mut true)
                    {
                        self.dispatch(cmd);
                    }
                }
                Action::Back | Action::DeleteSelected => self.confirm_delete = false,
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return self.should_quit;
        }

        if self.show_help {
            match action {
                Action::ToggleHelp | Action::Back => self.show_help = false,
                Action::Quit => self.should_quit = true,
                _ => {}
            }
            return self.should_quit;
        }

        if self.input_mode == InputMode::Editing {
            self.update_editing(action);
            return self.should_quit;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = true,
            Action::FocusNext => self.focus = self.focus.next(),
            Action::FocusPrev => self.focus = self.focus.prev(),
            Action::MoveDown => self.move_within_focus(1),
            Action::MoveUp => self.move_within_focus(-1),
            Action::GoTop => self.dashboard.cursor_to(0),
            Action::GoBottom => self.dashboard.cursor_to(usize::MAX),
            Action::Activate => match self.focus {
                Focus::List => self.select_under_cursor(),
                Focus::Filters | Focus::Form => self.begin_editing(),
            },
            Action::Back => {
                if self.focus == Focus::Form && self.dashboard.form.mode.is_editing() {
                    self.controller.cancel_edit(&mut self.dashboard);
                }
                self.focus = Focus::List;
            }
            Action::Refresh => self.refresh(),
            Action::CycleSort => {
                let sort = self.controller.filters().sort.next();
                self.apply_filter(FilterChange::Sort(sort));
            }
            Action::ToggleOrder => {
                let order = self.controller.filters().order.toggle();
                self.apply_filter(FilterChange::Order(order));
            }
            Action::CycleLimit => {
                let limit = filter::next_limit(self.controller.filters().limit);
                self.apply_filter(FilterChange::Limit(limit));
            }
            Action::ClearFilters => {
                self.year_min_input.clear();
                self.year_max_input.clear();
                self.debouncer.cancel();
                if let Ok(cmd) = self.controller.clear_filters(&mut self.dashboard) {
                    self.dispatch(cmd);
                }
            }
            Action::StartSearch => {
                self.focus = Focus::Filters;
                self.filter_field = FilterField::Query;
                self.input_mode = InputMode::Editing;
            }
            Action::NewRecord => {
                self.controller.cancel_edit(&mut self.dashboard);
                self.focus = Focus::Form;
                self.form_field = FormField::Isbn;
            }
            Action::EditSelected => {
                if self.controller.enter_edit(&mut self.dashboard).is_ok() {
                    self.focus = Focus::Form;
                    self.form_field = FormField::Title;
                }
            }
            Action::DeleteSelected => {
                if self.controller.selected_id().is_some() {
                    self.confirm_delete = true;
                } else {
                    self.dashboard
                        .notify(Notice::error(ClientError::NoSelection.to_string()));
                }
            }
            Action::Submit => self.submit(),
            Action::Lookup => self.lookup(),
            Action::Seed => {
                let cmd = self.controller.seed();
                self.dispatch(cmd);
            }
            Action::ClickAt(x, y) => self.handle_click(x, y),
            Action::Confirm
            | Action::Input(_)
            | Action::Backspace
            | Action::Tick
            | Action::Resize(..)
            | Action::None => {}
        }
        self.should_quit
    }

    fn update_editing(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => self.input_mode = InputMode::Normal,
            Action::FocusNext => self.move_within_focus(1),
            Action::FocusPrev => self.move_within_focus(-1),
            Action::Input(c) => self.type_char(c),
            Action::Backspace => self.edit_text(|s| {
                s.pop();
            }),
            Action::Submit => {
                self.input_mode = InputMode::Normal;
                self.submit();
            }
            Action::Lookup => self.lookup(),
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.debouncer.fire() {
            self.refresh();
        }
        self.dashboard.toasts.expire(Instant::now());
    }

    fn apply_filter(&mut self, change: FilterChange) {
        self.debouncer.cancel();
        if let Ok(cmd) = self.controller.apply_filter(change, &mut self.dashboard) {
            self.dispatch(cmd);
        }
    }

    fn move_within_focus(&mut self, delta: isize) {
        match self.focus {
            Focus::List => self.dashboard.move_cursor(delta),
            Focus::Filters => self.filter_field = step(&FilterField::ALL, self.filter_field, delta),
            Focus::Form => self.form_field = step(&FormField::ALL, self.form_field, delta),
        }
    }

    fn select_under_cursor(&mut self) {
        let index = self.dashboard.cursor;
        self.controller.select_index(index, &mut self.dashboard);
    }

    /// Enter on a field: the status field cycles, the others start typing.
    fn begin_editing(&mut self) {
        if self.focus == Focus::Form && self.form_field == FormField::Status {
            let next = next_status(&self.controller.form().fields.status);
            self.controller.form_fields_mut().status = next;
            self.sync_form();
            return;
        }
        self.input_mode = InputMode::Editing;
    }

    fn type_char(&mut self, c: char) {
        let year_filter = self.focus == Focus::Filters
            && matches!(self.filter_field, FilterField::YearMin | FilterField::YearMax);
        if year_filter && (!c.is_ascii_digit() || self.year_input_full()) {
            return;
        }
        if self.focus == Focus::Form && self.form_field == FormField::Status {
            return;
        }
        self.edit_text(|s| s.push(c));
    }

    fn year_input_full(&self) -> bool {
        let input = match self.filter_field {
            FilterField::YearMax => &self.year_max_input,
            _ => &self.year_min_input,
        };
        input.len() >= YEAR_DIGITS
    }

    /// Apply `edit` to the focused field. Filter edits are debounced.
    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        match self.focus {
            Focus::Filters => {
                let change = match self.filter_field {
                    FilterField::Query => {
                        let mut text = self.controller.filters().query.clone();
                        edit(&mut text);
                        FilterChange::Query(text)
                    }
                    FilterField::Author => {
                        let mut text = self.controller.filters().author.clone();
                        edit(&mut text);
                        FilterChange::Author(text)
                    }
                    FilterField::YearMin => {
                        edit(&mut self.year_min_input);
                        FilterChange::YearMin(parse_year(&self.year_min_input))
                    }
                    FilterField::YearMax => {
                        edit(&mut self.year_max_input);
                        FilterChange::YearMax(parse_year(&self.year_max_input))
                    }
                };
                self.controller.set_filter(change);
                self.debouncer.touch();
            }
            Focus::Form => {
                let fields = self.controller.form_fields_mut();
                let slot = match self.form_field {
                    FormField::Isbn => &mut fields.isbn,
                    FormField::Title => &mut fields.title,
                    FormField::Author => &mut fields.author,
                    FormField::Year => &mut fields.year,
                    FormField::Status => &mut fields.status,
                    FormField::Description => &mut fields.description,
                };
                edit(slot);
                self.sync_form();
            }
            Focus::List => {}
        }
    }

    /// Push form edits made directly on the controller to the dashboard.
    fn sync_form(&mut self) {
        self.dashboard.render_form(self.controller.form());
    }

    fn submit(&mut self) {
        if let Ok(cmd) = self.controller.submit(&mut self.dashboard) {
            self.dispatch(cmd);
        }
    }

    fn lookup(&mut self) {
        if let Ok(cmd) = self.controller.lookup(&mut self.dashboard) {
            self.dispatch(cmd);
        }
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        let Some(area) = self.last_list_area else {
            return;
        };
        // Rows start below the top border.
        let inside = x > area.x
            && x < area.x + area.width.saturating_sub(1)
            && y > area.y
            && y < area.y + area.height.saturating_sub(1);
        if !inside {
            return;
        }
        let index = self.list_offset + (y - area.y - 1) as usize;
        if index < self.dashboard.rows.len() {
            self.focus = Focus::List;
            self.dashboard.cursor_to(index);
            self.select_under_cursor();
        }
    }
}
