//! Data models for the bookfinder application.
//!
//! - [`Book`], [`VolumeInfo`], [`BookCollection`]: catalog entries as decoded from the
//!   catalog's JSON. Every metadata field is optional and has a display fallback.
//! - [`UiSnapshot`]: the immutable value published to the presentation layer, with
//!   [`LoadState`] views per [`LoadKind`].
//! - [`AppConfig`]: settings loaded from `Bookfinder Config.yaml`.

pub mod book;
pub mod config;
pub mod ui_state;

pub use book::{Book, BookCollection, ImageLinks, VolumeInfo};
pub use config::{AppConfig, CatalogSettings, LoggingSettings, SearchSettings};
pub use ui_state::{DEFAULT_SEED_QUERY, LoadKind, LoadState, UiSnapshot};
