use std::sync::Arc;

use librarian_core::CatalogBackend;
use librarian_core::controller;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::tui_event::{BackendCommand, BackendEvent};

/// Listen for commands and run each one on its own task, so a slow request
/// never blocks the ones issued after it. Outcomes may therefore arrive out
/// of order; the controller discards stale list responses.
pub async fn run(
    backend: Arc<dyn CatalogBackend>,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    event_tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            _ = cancel.cancelled() => break,
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            BackendCommand::Execute(command) => {
                let backend = Arc::clone(&backend);
                let tx = event_tx.clone();
                tokio::spawn(async move {
                    let outcome = controller::execute(backend.as_ref(), command).await;
                    // Receiver gone means the UI is shutting down.
                    let _ = tx.send(BackendEvent::Finished(outcome));
                });
            }
        }
    }
    tracing::debug!("backend task stopped");
}
