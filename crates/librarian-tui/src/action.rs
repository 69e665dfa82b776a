/// Everything the dashboard can be asked to do, from keys, mouse or the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    /// Move focus between the list, the filter bar and the form.
    FocusNext,
    FocusPrev,
    MoveUp,
    MoveDown,
    GoTop,
    GoBottom,
    /// Enter: select the row under the cursor, or start editing a field.
    Activate,
    /// Esc: stop editing, close a modal, or leave edit mode.
    Back,
    Refresh,
    CycleSort,
    ToggleOrder,
    CycleLimit,
    ClearFilters,
    StartSearch,
    NewRecord,
    EditSelected,
    DeleteSelected,
    /// Answer "yes" to the open confirmation.
    Confirm,
    Submit,
    Lookup,
    Seed,
    Input(char),
    Backspace,
    ClickAt(u16, u16),
    Resize(u16, u16),
    Tick,
    None,
}
