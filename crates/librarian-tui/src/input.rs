use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::action::Action;
use crate::app::InputMode;

/// Map a crossterm terminal event to a TUI action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::Editing => map_key_editing(key),
            }
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        MouseEventKind::Down(MouseButton::Left) => Action::ClickAt(mouse.column, mouse.row),
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => Action::Submit,
        KeyCode::Char('l') if ctrl => Action::Lookup,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Enter => Action::Activate,
        KeyCode::Esc => Action::Back,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('s') => Action::CycleSort,
        KeyCode::Char('o') => Action::ToggleOrder,
        KeyCode::Char('l') => Action::CycleLimit,
        KeyCode::Char('c') => Action::ClearFilters,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Char('n') => Action::NewRecord,
        KeyCode::Char('e') => Action::EditSelected,
        KeyCode::Char('d') | KeyCode::Delete => Action::DeleteSelected,
        KeyCode::Char('y') => Action::Confirm,
        KeyCode::Char('S') => Action::Seed,
        _ => Action::None,
    }
}

fn map_key_editing(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => Action::Submit,
        KeyCode::Char('l') if ctrl => Action::Lookup,
        KeyCode::Esc | KeyCode::Enter => Action::Back,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char(c) => Action::Input(c),
        KeyCode::Backspace => Action::Backspace,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn letters_are_text_while_editing() {
        let e = key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_event(&e, &InputMode::Normal), Action::Quit);
        assert_eq!(map_event(&e, &InputMode::Editing), Action::Input('q'));
    }

    #[test]
    fn ctrl_shortcuts_work_in_both_modes() {
        let submit = key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        let quit = key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [InputMode::Normal, InputMode::Editing] {
            assert_eq!(map_event(&submit, &mode), Action::Submit);
            assert_eq!(map_event(&quit, &mode), Action::Quit);
        }
    }

    #[test]
    fn enter_ends_editing() {
        let e = key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_event(&e, &InputMode::Normal), Action::Activate);
        assert_eq!(map_event(&e, &InputMode::Editing), Action::Back);
    }
}
