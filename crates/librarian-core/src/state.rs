use crate::payload::BookForm;
use crate::{Book, BookId};

/// Inline status line shown above the result list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    /// Stays until the next successful fetch.
    Failed(String),
}

/// Cached view of the catalog held by the client.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub books: Vec<Book>,
    /// Server-reported number of matches; may exceed `books.len()`.
    pub total: u64,
    pub selected_id: Option<BookId>,
    /// Snapshot shown in the inspector. Not refreshed by later fetches.
    pub inspected: Option<Book>,
    pub list_status: ListStatus,
}

impl ClientState {
    pub fn find(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|b| &b.id == id)
    }

    /// The selected book, preferring the freshest copy from the result list.
    pub fn selected_book(&self) -> Option<&Book> {
        let id = self.selected_id.as_ref()?;
        self.find(id).or(self.inspected.as_ref().filter(|b| &b.id == id))
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.inspected = None;
    }
}

/// Which record, if any, the form is editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit { id: BookId },
}

impl FormMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }

    pub fn heading(&self) -> &'static str {
        match self {
            FormMode::Create => "New record",
            FormMode::Edit { .. } => "Edit record",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Create => "Save record",
            FormMode::Edit { .. } => "Update book",
        }
    }

    pub fn cancel_visible(&self) -> bool {
        self.is_editing()
    }
}

/// The single create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub mode: FormMode,
    pub fields: BookForm,
    pub lookup_busy: bool,
}

impl FormState {
    pub fn begin_edit(&mut self, book: &Book) {
        self.mode = FormMode::Edit {
            id: book.id.clone(),
        };
        self.fields = BookForm::from_book(book);
    }

    /// Back to create mode with an empty form.
    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.fields.clear();
    }

    pub fn editing_id(&self) -> Option<&BookId> {
        match &self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Create => None,
        }
    }
}
