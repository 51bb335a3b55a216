//! Catalog client contract.
//!
//! The controller only ever talks to the catalog through [`CatalogClient`], which lets
//! tests substitute scripted or mocked implementations for the HTTP client.

use crate::models::{Book, BookCollection};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a catalog client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not read catalog response: {0}")]
    Decode(String),

    #[error("Book {0} not found")]
    NotFound(String),

    /// Internal only. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }

    /// Message suitable for inline display. Never empty.
    pub fn user_message(&self) -> String {
        let message = match self {
            CatalogError::Network(detail) if detail.trim().is_empty() => {
                "Network failure".to_string()
            }
            CatalogError::Status { status, message } if message.trim().is_empty() => {
                format!("Catalog returned HTTP {}", status)
            }
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}

/// The two operations the controller needs from the remote catalog
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text search. Zero matches is an empty collection, not an error.
    async fn search_books(&self, query: &str) -> Result<BookCollection, CatalogError>;

    /// Look up a single book by identifier
    async fn get_book(&self, id: &str) -> Result<Book, CatalogError>;
}
