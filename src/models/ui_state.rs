use crate::models::book::{Book, BookCollection};

/// Seed query used when no configuration overrides it.
pub const DEFAULT_SEED_QUERY: &str = "jazz history";

/// The two independent request dimensions the controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Search,
    Detail,
}

impl LoadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadKind::Search => "search",
            LoadKind::Detail => "detail",
        }
    }
}

/// Per-dimension view of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Immutable value published to the presentation layer on every change.
///
/// `is_loading` is kept equal to `search_in_flight || detail_in_flight`;
/// [`StateManager`](crate::state::StateManager) recomputes it after every mutation.
/// `error_origin` records which dimension produced `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct UiSnapshot {
    pub query: String,
    pub is_loading: bool,
    pub last_result: Option<BookCollection>,
    pub selected_book: Option<Book>,
    pub error: Option<String>,
    pub error_origin: Option<LoadKind>,
    pub search_in_flight: bool,
    pub detail_in_flight: bool,
}

impl Default for UiSnapshot {
    fn default() -> Self {
        Self::with_query(DEFAULT_SEED_QUERY)
    }
}

impl UiSnapshot {
    /// Idle snapshot for the given seed query
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            is_loading: false,
            last_result: None,
            selected_book: None,
            error: None,
            error_origin: None,
            search_in_flight: false,
            detail_in_flight: false,
        }
    }

    /// Mark a dimension as in flight or settled and refresh `is_loading`
    pub fn set_in_flight(&mut self, kind: LoadKind, in_flight: bool) {
        match kind {
            LoadKind::Search => self.search_in_flight = in_flight,
            LoadKind::Detail => self.detail_in_flight = in_flight,
        }
        self.is_loading = self.search_in_flight || self.detail_in_flight;
    }

    pub fn set_error(&mut self, kind: LoadKind, message: impl Into<String>) {
        self.error = Some(message.into());
        self.error_origin = Some(kind);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_origin = None;
    }

    /// State of the result grid
    pub fn list_state(&self) -> LoadState<&BookCollection> {
        if self.search_in_flight {
            return LoadState::Loading;
        }
        if let Some(result) = self.last_result.as_ref() {
            return LoadState::Success(result);
        }
        match (&self.error, self.error_origin) {
            (Some(message), Some(LoadKind::Search)) => LoadState::Error(message.clone()),
            _ => LoadState::Idle,
        }
    }

    /// State of the detail view
    pub fn detail_state(&self) -> LoadState<&Book> {
        if self.detail_in_flight {
            return LoadState::Loading;
        }
        // A failed lookup keeps the previous book, the error takes precedence for display
        match (&self.error, self.error_origin) {
            (Some(message), Some(LoadKind::Detail)) => LoadState::Error(message.clone()),
            _ => match self.selected_book.as_ref() {
                Some(book) => LoadState::Success(book),
                None => LoadState::Idle,
            },
        }
    }

    pub fn result_count(&self) -> usize {
        self.last_result.as_ref().map(|r| r.len()).unwrap_or(0)
    }
}
