//! The catalog controller: owns client state and turns UI intents into
//! backend [`Command`]s, then folds their [`Outcome`]s back into state.
//!
//! The controller never awaits. Whoever drives it executes commands with
//! [`execute`], sequentially ([`Session`](crate::Session)) or concurrently
//! (the TUI backend task), and hands results to [`Controller::handle`].
//! Overlapping fetches are ordered by a request sequence number: only the
//! response to the most recently issued fetch is applied.

use crate::backend::{BackendError, CatalogBackend};
use crate::filter::{self, FilterChange, FilterState, QueryPolicy};
use crate::payload::{self, BookForm, BookPayload, IsbnLookup};
use crate::render;
use crate::state::{ClientState, FormState, ListStatus};
use crate::stats::CatalogStats;
use crate::view::{CatalogView, Confirm, Notice};
use crate::{Book, BookId, BookPage, ClientConfig, ClientError};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this record?";

const MSG_FETCH_FAILED: &str = "Failed to load the catalog.";
const MSG_SAVE_FAILED: &str = "Failed to save book.";
const MSG_DELETE_FAILED: &str = "Failed to delete book.";
const MSG_LOOKUP_FAILED: &str = "ISBN not found or lookup service failed.";

/// Work for the backend, produced by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch { seq: u64, query: String },
    Create { payload: BookPayload },
    Update { id: BookId, payload: BookPayload },
    Delete { id: BookId },
    Lookup { isbn: String },
    Seed { payloads: Vec<BookPayload> },
}

/// Result of executing a [`Command`].
#[derive(Debug, Clone)]
pub enum Outcome {
    Fetched {
        seq: u64,
        result: Result<BookPage, BackendError>,
    },
    Saved {
        updated: bool,
        result: Result<Book, BackendError>,
    },
    Deleted {
        id: BookId,
        result: Result<(), BackendError>,
    },
    LookedUp {
        result: Result<IsbnLookup, BackendError>,
    },
    Seeded {
        result: Result<usize, BackendError>,
    },
}

impl Outcome {
    /// The backend failure carried by this outcome, if any.
    pub fn error(&self) -> Option<&BackendError> {
        match self {
            Outcome::Fetched { result, .. } => result.as_ref().err(),
            Outcome::Saved { result, .. } => result.as_ref().err(),
            Outcome::Deleted { result, .. } => result.as_ref().err(),
            Outcome::LookedUp { result } => result.as_ref().err(),
            Outcome::Seeded { result } => result.as_ref().err(),
        }
    }
}

/// Run one command against a backend.
pub async fn execute<B: CatalogBackend + ?Sized>(backend: &B, command: Command) -> Outcome {
    match command {
        Command::Fetch { seq, query } => {
            tracing::debug!(backend = backend.name(), seq, query = %query, "fetching books");
            Outcome::Fetched {
                seq,
                result: backend.list(&query).await,
            }
        }
        Command::Create { payload } => Outcome::Saved {
            updated: false,
            result: backend.create(&payload).await,
        },
        Command::Update { id, payload } => Outcome::Saved {
            updated: true,
            result: backend.update(&id, &payload).await,
        },
        Command::Delete { id } => {
            let result = backend.delete(&id).await;
            Outcome::Deleted { id, result }
        }
        Command::Lookup { isbn } => Outcome::LookedUp {
            result: backend.lookup(&isbn).await,
        },
        Command::Seed { payloads } => {
            let mut created = 0;
            for p in &payloads {
                if let Err(e) = backend.create(p).await {
                    return Outcome::Seeded { result: Err(e) };
                }
                created += 1;
            }
            Outcome::Seeded {
                result: Ok(created),
            }
        }
    }
}

/// Message for a failed backend call: the backend's own detail when it sent
/// one, otherwise the generic text for the operation.
fn failure_message(err: &BackendError, generic: &str) -> String {
    err.detail().map(String::from).unwrap_or_else(|| generic.to_string())
}

pub struct Controller {
    state: ClientState,
    filters: FilterState,
    policy: QueryPolicy,
    form: FormState,
    /// Last sequence number handed out.
    issued_seq: u64,
    /// Book to select once the next fetch lands (after a save).
    pending_select: Option<Book>,
}

impl Controller {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_filters(config.initial_filters(), config.policy)
    }

    pub fn with_filters(filters: FilterState, policy: QueryPolicy) -> Self {
        Self {
            state: ClientState::default(),
            filters,
            policy,
            form: FormState::default(),
            issued_seq: 0,
            pending_select: None,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn policy(&self) -> &QueryPolicy {
        &self.policy
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Direct access to the form text fields (typing into inputs).
    pub fn form_fields_mut(&mut self) -> &mut BookForm {
        &mut self.form.fields
    }

    pub fn selected_id(&self) -> Option<&BookId> {
        self.state.selected_id.as_ref()
    }

    /// Sequence number of the most recently issued fetch.
    pub fn latest_seq(&self) -> u64 {
        self.issued_seq
    }

    // ── Fetch-and-render cycle ─────────────────────────────────────

    /// Start a fetch for the current filters.
    ///
    /// Fails when the filters do not pass local validation; the error has
    /// then already been rendered and notified.
    pub fn refresh(&mut self, view: &mut dyn CatalogView) -> Result<Command, ClientError> {
        self.state.list_status = ListStatus::Loading;
        view.set_loading(true);

        if let Err(err) = self.policy.check(&self.filters) {
            tracing::debug!(error = %err, "fetch rejected locally");
            self.state.list_status = ListStatus::Failed(err.to_string());
            view.render_list_status(&self.state.list_status);
            view.notify(Notice::error(err.to_string()));
            view.set_loading(false);
            return Err(err);
        }

        self.issued_seq += 1;
        Ok(Command::Fetch {
            seq: self.issued_seq,
            query: filter::query_string(&self.filters, &self.policy),
        })
    }

    /// Change one filter without fetching (debounced text inputs).
    pub fn set_filter(&mut self, change: FilterChange) {
        self.filters.apply(change);
    }

    /// Change one filter and fetch immediately.
    pub fn apply_filter(
        &mut self,
        change: FilterChange,
        view: &mut dyn CatalogView,
    ) -> Result<Command, ClientError> {
        self.set_filter(change);
        self.refresh(view)
    }

    /// Reset the search criteria and fetch.
    pub fn clear_filters(&mut self, view: &mut dyn CatalogView) -> Result<Command, ClientError> {
        self.filters.clear_criteria();
        self.refresh(view)
    }

    fn apply_page(&mut self, page: BookPage, view: &mut dyn CatalogView) {
        self.state.books = page.books;
        self.state.total = page.total;
        self.state.list_status = ListStatus::Idle;

        view.render_list_status(&self.state.list_status);
        self.render_list(view);
        view.render_stats(&CatalogStats::from_state(&self.state));

        if let Some(book) = self.pending_select.take() {
            // Prefer the fresh copy when the saved book is on this page.
            let book = self.state.find(&book.id).cloned().unwrap_or(book);
            self.select(&book, view);
        }
    }

    fn render_list(&self, view: &mut dyn CatalogView) {
        view.render_list(
            &render::list_rows(&self.state),
            &render::result_label(self.state.total),
        );
    }

    /// Redraw everything from current state.
    pub fn render_all(&self, view: &mut dyn CatalogView) {
        view.render_list_status(&self.state.list_status);
        self.render_list(view);
        view.render_stats(&CatalogStats::from_state(&self.state));
        view.render_inspector(&render::inspector(&self.state));
        view.render_form(&self.form);
    }

    // ── Selection and inspector ────────────────────────────────────

    /// Show `book` in the inspector and mark its row active.
    pub fn select(&mut self, book: &Book, view: &mut dyn CatalogView) {
        self.state.selected_id = Some(book.id.clone());
        self.state.inspected = Some(book.clone());

        view.render_inspector(&render::inspector(&self.state));
        self.render_list(view);

        if self.form.mode.is_editing() {
            self.form.reset();
            view.render_form(&self.form);
        }
    }

    /// Select the loaded book with `id`. Returns false if it is not loaded.
    pub fn select_id(&mut self, id: &BookId, view: &mut dyn CatalogView) -> bool {
        match self.state.find(id).cloned() {
            Some(book) => {
                self.select(&book, view);
                true
            }
            None => false,
        }
    }

    /// Select the loaded book at list position `index`.
    pub fn select_index(&mut self, index: usize, view: &mut dyn CatalogView) -> bool {
        match self.state.books.get(index).cloned() {
            Some(book) => {
                self.select(&book, view);
                true
            }
            None => false,
        }
    }

    fn clear_selection(&mut self, view: &mut dyn CatalogView) {
        self.state.clear_selection();
        view.render_inspector(&render::Inspector::Empty);
    }

    // ── Form state machine ─────────────────────────────────────────

    /// Switch the form to edit mode for the selected book.
    pub fn enter_edit(&mut self, view: &mut dyn CatalogView) -> Result<(), ClientError> {
        let Some(book) = self.state.selected_book().cloned() else {
            return Err(self.reject(ClientError::NoSelection, view));
        };
        self.form.begin_edit(&book);
        view.render_form(&self.form);
        view.notify(Notice::info("Edit mode enabled."));
        Ok(())
    }

    /// Back to create mode with an empty form.
    pub fn cancel_edit(&mut self, view: &mut dyn CatalogView) {
        self.form.reset();
        view.render_form(&self.form);
    }

    /// Submit the form: create in create mode, update in edit mode.
    pub fn submit(&mut self, view: &mut dyn CatalogView) -> Result<Command, ClientError> {
        let fields = self.form.fields.clone();
        match self.form.editing_id().cloned() {
            Some(id) => self.update(Some(id), &fields, view),
            None => self.create(&fields, view),
        }
    }

    pub fn create(&mut self, form: &BookForm, view: &mut dyn CatalogView) -> Result<Command, ClientError> {
        let payload = form.to_payload().map_err(|e| self.reject(e, view))?;
        Ok(Command::Create { payload })
    }

    /// Update the addressed book. Fails fast without an id.
    pub fn update(
        &mut self,
        id: Option<BookId>,
        form: &BookForm,
        view: &mut dyn CatalogView,
    ) -> Result<Command, ClientError> {
        let Some(id) = id else {
            return Err(self.reject(ClientError::NoSelection, view));
        };
        let payload = form.to_payload().map_err(|e| self.reject(e, view))?;
        Ok(Command::Update { id, payload })
    }

    /// Delete the selected book after confirmation.
    ///
    /// `Ok(None)` means the user declined.
    pub fn delete_selected(
        &mut self,
        view: &mut dyn CatalogView,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<Command>, ClientError> {
        let Some(id) = self.state.selected_id.clone() else {
            return Err(self.reject(ClientError::NoSelection, view));
        };
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(None);
        }
        Ok(Some(Command::Delete { id }))
    }

    /// Look up metadata for the ISBN currently in the form.
    pub fn lookup(&mut self, view: &mut dyn CatalogView) -> Result<Command, ClientError> {
        let isbn = self.form.fields.isbn.trim().to_string();
        if isbn.is_empty() {
            tracing::debug!("lookup rejected locally: empty ISBN");
            view.notify(Notice::info("Enter an ISBN first."));
            return Err(ClientError::MissingIsbn);
        }
        self.form.lookup_busy = true;
        view.set_lookup_busy(true);
        Ok(Command::Lookup { isbn })
    }

    pub fn seed(&mut self) -> Command {
        Command::Seed {
            payloads: payload::sample_books(),
        }
    }

    /// Surface a local validation error and hand it back.
    fn reject(&self, err: ClientError, view: &mut dyn CatalogView) -> ClientError {
        tracing::debug!(error = %err, "rejected locally");
        view.notify(Notice::error(err.to_string()));
        err
    }

    // ── Outcomes ───────────────────────────────────────────────────

    /// Fold a backend result into state. May return a follow-up command
    /// (the re-fetch after a mutation).
    pub fn handle(&mut self, outcome: Outcome, view: &mut dyn CatalogView) -> Option<Command> {
        match outcome {
            Outcome::Fetched { seq, result } => {
                if seq != self.issued_seq {
                    tracing::debug!(seq, latest = self.issued_seq, "dropping stale response");
                    return None;
                }
                match result {
                    Ok(page) => self.apply_page(page, view),
                    Err(err) => {
                        tracing::warn!(error = %err, "fetch failed");
                        self.pending_select = None;
                        let message = failure_message(&err, MSG_FETCH_FAILED);
                        self.state.list_status = ListStatus::Failed(message.clone());
                        view.render_list_status(&self.state.list_status);
                        view.notify(Notice::error(message));
                    }
                }
                view.set_loading(false);
                None
            }
            Outcome::Saved { updated, result } => match result {
                Ok(book) => {
                    tracing::info!(id = %book.id, updated, "book saved");
                    view.notify(Notice::success(if updated {
                        "Record updated!"
                    } else {
                        "Book added!"
                    }));
                    self.form.reset();
                    view.render_form(&self.form);
                    self.pending_select = Some(book);
                    match self.refresh(view) {
                        Ok(cmd) => Some(cmd),
                        Err(_) => {
                            self.pending_select = None;
                            None
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, updated, "save failed");
                    view.notify(Notice::error(failure_message(&err, MSG_SAVE_FAILED)));
                    None
                }
            },
            Outcome::Deleted { id, result } => match result {
                Ok(()) => {
                    tracing::info!(id = %id, "book deleted");
                    view.notify(Notice::success("Record removed."));
                    if self.state.selected_id.as_ref() == Some(&id) {
                        self.clear_selection(view);
                    }
                    if self.form.editing_id() == Some(&id) {
                        self.form.reset();
                        view.render_form(&self.form);
                    }
                    self.refresh(view).ok()
                }
                Err(err) => {
                    tracing::warn!(id = %id, error = %err, "delete failed");
                    view.notify(Notice::error(failure_message(&err, MSG_DELETE_FAILED)));
                    None
                }
            },
            Outcome::LookedUp { result } => {
                self.form.lookup_busy = false;
                view.set_lookup_busy(false);
                match result {
                    Ok(found) => {
                        self.form.fields.apply_lookup(&found);
                        view.render_form(&self.form);
                        view.notify(Notice::success("Details filled in from ISBN."));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "ISBN lookup failed");
                        view.notify(Notice::error(MSG_LOOKUP_FAILED));
                    }
                }
                None
            }
            Outcome::Seeded { result } => match result {
                Ok(n) => {
                    tracing::info!(created = n, "sample books created");
                    view.notify(Notice::success("Sample books created!"));
                    self.refresh(view).ok()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "seeding failed");
                    view.notify(Notice::error(failure_message(&err, MSG_SAVE_FAILED)));
                    None
                }
            },
        }
    }
}
