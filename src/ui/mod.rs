// UI module - controller and terminal presentation
//
// This module contains:
// - QueryController: turns user intents into catalog requests and published snapshots
// - Intent: parsed terminal input
// - ConsoleView: renders each new snapshot as text

pub mod console;
pub mod controller;
pub mod intent;
pub mod render;

pub use console::{ConsoleView, Flow, SelectionError, dispatch};
pub use controller::QueryController;
pub use intent::{Intent, IntentError};
pub use render::{render_book, render_snapshot};
