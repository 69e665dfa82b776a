//! Sequential driver: executes each controller command to completion before
//! handling the next. Used by the CLI and by integration tests.

use crate::backend::CatalogBackend;
use crate::controller::{self, Command, Controller};
use crate::filter::FilterChange;
use crate::payload::BookForm;
use crate::state::ClientState;
use crate::view::{CatalogView, Confirm, Notice};
use crate::{BookId, ClientConfig, ClientError};

pub struct Session<B, V> {
    backend: B,
    view: V,
    controller: Controller,
}

impl<B: CatalogBackend, V: CatalogView> Session<B, V> {
    pub fn new(backend: B, view: V, config: &ClientConfig) -> Self {
        Self::with_controller(backend, view, Controller::new(config))
    }

    pub fn with_controller(backend: B, view: V, controller: Controller) -> Self {
        Self {
            backend,
            view,
            controller,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn state(&self) -> &ClientState {
        self.controller.state()
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Execute `first` and every follow-up it produces. Returns the first
    /// backend failure in the chain; later commands still run so that a
    /// failed re-fetch does not hide a successful save.
    async fn run(&mut self, first: Command) -> Result<(), ClientError> {
        let mut failure = None;
        let mut next = Some(first);
        while let Some(cmd) = next {
            let outcome = controller::execute(&self.backend, cmd).await;
            if failure.is_none()
                && let Some(err) = outcome.error()
            {
                failure = Some(ClientError::Backend(err.clone()));
            }
            next = self.controller.handle(outcome, &mut self.view);
        }
        failure.map_or(Ok(()), Err)
    }

    /// Fetch with the current filters and render the result.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let cmd = self.controller.refresh(&mut self.view)?;
        self.run(cmd).await
    }

    /// Change a filter without fetching.
    pub fn set_filter(&mut self, change: FilterChange) {
        self.controller.set_filter(change);
    }

    pub async fn apply_filter(&mut self, change: FilterChange) -> Result<(), ClientError> {
        let cmd = self.controller.apply_filter(change, &mut self.view)?;
        self.run(cmd).await
    }

    pub async fn clear_filters(&mut self) -> Result<(), ClientError> {
        let cmd = self.controller.clear_filters(&mut self.view)?;
        self.run(cmd).await
    }

    /// Select a book from the loaded page.
    pub fn select_id(&mut self, id: &BookId) -> bool {
        self.controller.select_id(id, &mut self.view)
    }

    /// Select a book by id, fetching it when it is not on the loaded page.
    pub async fn open(&mut self, id: &BookId) -> Result<(), ClientError> {
        if self.controller.select_id(id, &mut self.view) {
            return Ok(());
        }
        match self.backend.get(id).await {
            Ok(book) => {
                self.controller.select(&book, &mut self.view);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "failed to load book");
                let message = err
                    .detail()
                    .map(String::from)
                    .unwrap_or_else(|| format!("Failed to load book #{id}."));
                self.view.notify(Notice::error(message));
                Err(err.into())
            }
        }
    }

    pub fn enter_edit(&mut self) -> Result<(), ClientError> {
        self.controller.enter_edit(&mut self.view)
    }

    pub fn cancel_edit(&mut self) {
        self.controller.cancel_edit(&mut self.view);
    }

    pub fn form_fields_mut(&mut self) -> &mut BookForm {
        self.controller.form_fields_mut()
    }

    /// Submit the form in its current mode.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let cmd = self.controller.submit(&mut self.view)?;
        self.run(cmd).await
    }

    pub async fn create(&mut self, form: &BookForm) -> Result<(), ClientError> {
        let cmd = self.controller.create(form, &mut self.view)?;
        self.run(cmd).await
    }

    pub async fn update(&mut self, id: Option<BookId>, form: &BookForm) -> Result<(), ClientError> {
        let cmd = self.controller.update(id, form, &mut self.view)?;
        self.run(cmd).await
    }

    /// Delete the selected book. Returns `Ok(false)` when not confirmed.
    pub async fn delete_selected(&mut self, confirm: &mut dyn Confirm) -> Result<bool, ClientError> {
        match self.controller.delete_selected(&mut self.view, confirm)? {
            Some(cmd) => self.run(cmd).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Look up the ISBN in the form and fill in what comes back.
    pub async fn lookup(&mut self) -> Result<(), ClientError> {
        let cmd = self.controller.lookup(&mut self.view)?;
        self.run(cmd).await
    }

    pub async fn seed(&mut self) -> Result<(), ClientError> {
        let cmd = self.controller.seed();
        self.run(cmd).await
    }
}
