use std::time::Duration;

use librarian_core::backend::BackendError;
use librarian_core::render::Inspector;
use librarian_core::{Book, BookId, BookPage, FormMode, ListStatus, NoticeKind, Outcome};
use tokio::sync::mpsc::UnboundedReceiver;

use super::*;
use crate::action::Action;

/// App wired to a command channel instead of a backend task.
fn test_app() -> (App, UnboundedReceiver<BackendCommand>) {
    let mut app = App::new(&ClientConfig::default(), Theme::hacker());
    let (tx, rx) = mpsc::unbounded_channel();
    app.backend_cmd_tx = Some(tx);
    (app, rx)
}

fn book(id: u64, title: &str) -> Book {
    Book {
        id: BookId::from(id),
        title: title.into(),
        author: "Robert C. Martin".into(),
        year: Some(2008),
        isbn: None,
        status: None,
        description: None,
        cover_url: None,
    }
}

fn sent(rx: &mut UnboundedReceiver<BackendCommand>) -> Vec<Command> {
    let mut out = Vec::new();
    while let Ok(BackendCommand::Execute(cmd)) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

/// Refresh and answer the fetch with `books`.
fn load(app: &mut App, rx: &mut UnboundedReceiver<BackendCommand>, books: Vec<Book>) {
    app.update(Action::Refresh);
    let Some(Command::Fetch { seq, .. }) = sent(rx).pop() else {
        panic!("expected a fetch");
    };
    let total = books.len() as u64;
    app.handle_backend_event(BackendEvent::Finished(Outcome::Fetched {
        seq,
        result: Ok(BookPage { books, total }),
    }));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.update(Action::Input(c));
    }
}

// ── List and selection ─────────────────────────────────────────

#[test]
fn enter_selects_row_under_cursor() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(1, "Clean Code"), book(2, "Refactoring")]);
    assert_eq!(app.dashboard.rows.len(), 2);
    assert!(!app.dashboard.loading);

    app.update(Action::MoveDown);
    app.update(Action::Activate);

    assert_eq!(app.controller.selected_id(), Some(&BookId::from(2)));
    assert!(app.dashboard.rows[1].active);
    let Inspector::Populated(detail) = &app.dashboard.inspector else {
        panic!("inspector should be populated");
    };
    assert_eq!(detail.title, "Refactoring");
}

#[test]
fn click_selects_row() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(1, "A"), book(2, "B"), book(3, "C")]);
    app.last_list_area = Some(Rect::new(0, 5, 40, 10));
    app.list_offset = 0;

    // Row 0 is drawn at y = 6, just below the border.
    app.update(Action::ClickAt(3, 8));
    assert_eq!(app.controller.selected_id(), Some(&BookId::from(3)));

    // Clicks on the border are ignored.
    app.update(Action::ClickAt(3, 5));
    assert_eq!(app.controller.selected_id(), Some(&BookId::from(3)));
}

#[test]
fn stale_fetch_outcome_is_ignored() {
    let (mut app, mut rx) = test_app();
    app.update(Action::Refresh);
    app.update(Action::Refresh);
    let seqs: Vec<u64> = sent(&mut rx)
        .into_iter()
        .filter_map(|c| match c {
            Command::Fetch { seq, .. } => Some(seq),
            _ => None,
        })
        .collect();
    assert_eq!(seqs.len(), 2);

    app.handle_backend_event(BackendEvent::Finished(Outcome::Fetched {
        seq: seqs[1],
        result: Ok(BookPage {
            books: vec![book(2, "The Pragmatic Programmer")],
            total: 1,
        }),
    }));
    app.handle_backend_event(BackendEvent::Finished(Outcome::Fetched {
        seq: seqs[0],
        result: Ok(BookPage {
            books: vec![book(1, "Clean Code")],
            total: 1,
        }),
    }));

    assert_eq!(app.dashboard.rows.len(), 1);
    assert_eq!(app.dashboard.rows[0].title, "The Pragmatic Programmer");
}

#[test]
fn failed_fetch_keeps_rows_and_shows_status() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(1, "Clean Code")]);

    app.update(Action::Refresh);
    let Some(Command::Fetch { seq, .. }) = sent(&mut rx).pop() else {
        panic!("expected a fetch");
    };
    app.handle_backend_event(BackendEvent::Finished(Outcome::Fetched {
        seq,
        result: Err(BackendError::Transport("connection refused".into())),
    }));

    assert_eq!(app.dashboard.rows.len(), 1);
    assert!(matches!(app.dashboard.list_status, ListStatus::Failed(_)));
    let toast = app.dashboard.toasts.current().unwrap();
    assert_eq!(toast.notice.kind, NoticeKind::Error);
}

// ── Filters ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn typing_a_search_triggers_one_fetch() {
    let (mut app, mut rx) = test_app();
    app.update(Action::StartSearch);
    assert_eq!(app.input_mode, InputMode::Editing);

    for c in "clean".chars() {
        app.update(Action::Input(c));
        tokio::time::advance(Duration::from_millis(100)).await;
        app.update(Action::Tick);
    }
    assert!(sent(&mut rx).is_empty());

    tokio::time::advance(Duration::from_millis(400)).await;
    app.update(Action::Tick);
    app.update(Action::Tick);

    let cmds = sent(&mut rx);
    assert_eq!(cmds.len(), 1);
    let Command::Fetch { query, .. } = &cmds[0] else {
        panic!("expected a fetch");
    };
    assert!(query.starts_with("q=clean&"));
}

#[test]
fn sort_change_fetches_immediately() {
    let (mut app, mut rx) = test_app();
    let before = app.controller.filters().sort;
    app.update(Action::CycleSort);

    assert_eq!(app.controller.filters().sort, before.next());
    let cmds = sent(&mut rx);
    assert_eq!(cmds.len(), 1);
    assert!(matches!(cmds[0], Command::Fetch { .. }));
}

#[test]
fn year_filter_accepts_digits_only() {
    let (mut app, _rx) = test_app();
    app.focus = Focus::Filters;
    app.filter_field = FilterField::YearMin;
    app.update(Action::Activate);
    type_text(&mut app, "19a9x9");

    assert_eq!(app.year_min_input, "1999");
    assert_eq!(app.controller.filters().year_min, Some(1999));

    for _ in 0..4 {
        app.update(Action::Backspace);
    }
    assert_eq!(app.controller.filters().year_min, None);
}

#[test]
fn year_filter_stops_at_four_digits() {
    let (mut app, _rx) = test_app();
    app.focus = Focus::Filters;
    app.filter_field = FilterField::YearMax;
    app.update(Action::Activate);
    type_text(&mut app, "99999999999");

    assert_eq!(app.year_max_input, "9999");
    assert_eq!(app.controller.filters().year_max, Some(9999));
}

#[test]
fn inverted_year_range_blocks_fetch() {
    let (mut app, mut rx) = test_app();
    app.focus = Focus::Filters;
    app.filter_field = FilterField::YearMin;
    app.update(Action::Activate);
    type_text(&mut app, "2010");
    app.update(Action::FocusNext);
    type_text(&mut app, "2000");
    app.update(Action::Back);
    sent(&mut rx);

    app.update(Action::Refresh);

    assert!(sent(&mut rx).is_empty());
    assert!(matches!(app.dashboard.list_status, ListStatus::Failed(_)));
    assert!(!app.dashboard.loading);
}

#[test]
fn clear_filters_empties_year_inputs() {
    let (mut app, mut rx) = test_app();
    app.year_min_input = "2000".into();
    app.controller
        .set_filter(librarian_core::filter::FilterChange::YearMin(Some(2000)));

    app.update(Action::ClearFilters);

    assert!(app.year_min_input.is_empty());
    assert_eq!(app.controller.filters().year_min, None);
    assert_eq!(sent(&mut rx).len(), 1);
}

// ── Form ───────────────────────────────────────────────────────

#[test]
fn form_typing_reaches_controller_and_dashboard() {
    let (mut app, _rx) = test_app();
    app.update(Action::NewRecord);
    assert_eq!(app.focus, Focus::Form);
    assert_eq!(app.form_field, FormField::Isbn);

    app.update(Action::Activate);
    type_text(&mut app, "0132350882");
    app.update(Action::FocusNext);
    type_text(&mut app, "Clean Code");

    assert_eq!(app.controller.form().fields.isbn, "0132350882");
    assert_eq!(app.form_text(FormField::Title), "Clean Code");
}

#[test]
fn status_field_cycles_on_enter() {
    let (mut app, _rx) = test_app();
    app.focus = Focus::Form;
    app.form_field = FormField::Status;

    let mut seen = Vec::new();
    for _ in 0..5 {
        app.update(Action::Activate);
        seen.push(app.form_text(FormField::Status).to_string());
    }
    assert_eq!(
        seen,
        ["available", "borrowed", "reserved", "maintenance", ""]
    );
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn submit_with_missing_title_sends_nothing() {
    let (mut app, mut rx) = test_app();
    app.update(Action::NewRecord);
    app.update(Action::Submit);

    assert!(sent(&mut rx).is_empty());
    let toast = app.dashboard.toasts.current().unwrap();
    assert_eq!(toast.notice.kind, NoticeKind::Error);
}

#[test]
fn edit_then_escape_returns_to_create_mode() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(7, "Dune")]);
    app.update(Action::Activate);

    app.update(Action::EditSelected);
    assert_eq!(app.focus, Focus::Form);
    assert_eq!(
        app.dashboard.form.mode,
        FormMode::Edit {
            id: BookId::from(7)
        }
    );
    assert_eq!(app.form_text(FormField::Title), "Dune");

    app.update(Action::Back);
    assert_eq!(app.dashboard.form.mode, FormMode::Create);
    assert_eq!(app.form_text(FormField::Title), "");
    assert_eq!(app.focus, Focus::List);
}

#[test]
fn edit_without_selection_stays_on_list() {
    let (mut app, _rx) = test_app();
    app.update(Action::EditSelected);
    assert_eq!(app.focus, Focus::List);
    assert_eq!(app.dashboard.form.mode, FormMode::Create);
}

#[test]
fn lookup_without_isbn_is_local() {
    let (mut app, mut rx) = test_app();
    app.update(Action::NewRecord);
    app.update(Action::Lookup);

    assert!(sent(&mut rx).is_empty());
    assert!(!app.dashboard.lookup_busy);
}

// ── Delete ─────────────────────────────────────────────────────

#[test]
fn delete_requires_confirmation() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(1, "Clean Code")]);
    app.update(Action::Activate);

    app.update(Action::DeleteSelected);
    assert!(app.confirm_delete);
    assert!(sent(&mut rx).is_empty());

    app.update(Action::Confirm);
    assert!(!app.confirm_delete);
    assert_eq!(
        sent(&mut rx),
        vec![Command::Delete {
            id: BookId::from(1)
        }]
    );
}

#[test]
fn delete_cancelled_with_escape() {
    let (mut app, mut rx) = test_app();
    load(&mut app, &mut rx, vec![book(1, "Clean Code")]);
    app.update(Action::Activate);

    app.update(Action::DeleteSelected);
    app.update(Action::Back);

    assert!(!app.confirm_delete);
    assert!(sent(&mut rx).is_empty());
    assert_eq!(app.controller.selected_id(), Some(&BookId::from(1)));
}

#[test]
fn delete_without_selection_shows_error() {
    let (mut app, mut rx) = test_app();
    app.update(Action::DeleteSelected);

    assert!(!app.confirm_delete);
    assert!(sent(&mut rx).is_empty());
    let toast = app.dashboard.toasts.current().unwrap();
    assert_eq!(toast.notice.kind, NoticeKind::Error);
}

// ── Global ─────────────────────────────────────────────────────

#[test]
fn help_overlay_swallows_keys() {
    let (mut app, mut rx) = test_app();
    app.update(Action::ToggleHelp);
    assert!(app.show_help);

    app.update(Action::Refresh);
    assert!(sent(&mut rx).is_empty());

    app.update(Action::Back);
    assert!(!app.show_help);
}

#[test]
fn quit_sets_flag() {
    let (mut app, _rx) = test_app();
    assert!(app.update(Action::Quit));
    assert!(app.should_quit);
}

#[test]
fn q_while_typing_is_text() {
    let (mut app, _rx) = test_app();
    app.update(Action::StartSearch);
    // The input map turns 'q' into Input('q') in editing mode.
    app.update(Action::Input('q'));
    assert!(!app.should_quit);
    assert_eq!(app.controller.filters().query, "q");
}
