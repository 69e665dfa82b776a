use librarian_core::{Command, Outcome};

/// Commands sent from the TUI to the backend task.
#[derive(Debug)]
pub enum BackendCommand {
    /// Run one catalog command; its outcome comes back as
    /// [`BackendEvent::Finished`].
    Execute(Command),
}

/// Events flowing from the backend task to the TUI.
#[derive(Debug)]
pub enum BackendEvent {
    Finished(Outcome),
}
