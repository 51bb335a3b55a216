// Bookfinder - search a public book catalog and browse the results
//
// This is the library crate containing the query-state controller, the catalog client
// and the data model. The binary crate (main.rs) provides a terminal front end.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppConfig, Book, BookCollection, LoadKind, LoadState, UiSnapshot, VolumeInfo};
pub use services::{CatalogClient, CatalogError, GoogleBooksClient};
pub use state::{RequestTicket, StateChange, StateManager};
pub use ui::QueryController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
