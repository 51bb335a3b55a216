//! Services module - access to the remote book catalog.
//!
//! # Components
//!
//! - [`CatalogClient`]: the two-operation contract the controller depends on
//!   (`search_books`, `get_book`). Test doubles implement the same trait.
//! - [`CatalogError`]: network, timeout, HTTP status, decode, not-found and the
//!   internal-only cancelled failure.
//! - [`GoogleBooksClient`]: the production implementation over `reqwest`, with a bounded
//!   per-request timeout.
//!
//! The services layer has no knowledge of snapshots or presentation; converting failures
//! into displayable messages happens in the controller.

pub mod catalog;
pub mod google_books;

pub use catalog::{CatalogClient, CatalogError};
pub use google_books::GoogleBooksClient;
