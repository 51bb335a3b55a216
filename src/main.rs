//! Bookfinder - terminal front end for the book catalog search.
//!
//! # Overview
//!
//! This binary wires the library together:
//! - Configuration loading ([`ConfigManager`]) from `Bookfinder Data/`
//! - Logging infrastructure (rotating file, optional stderr console)
//! - Tokio runtime (request tasks and the rendering task)
//! - [`QueryController`] over the Google Books client
//! - [`ConsoleView`] printing each new snapshot
//!
//! The main thread reads stdin line by line and forwards each line as an intent.
//! Plain text replaces the query, `:open N` opens a result, `:quit` exits.

use anyhow::Result;
use bookfinder::ui::{ConsoleView, Flow, Intent, QueryController, dispatch};
use bookfinder::{APP_NAME, CatalogClient, ConfigManager, GoogleBooksClient, StateManager, VERSION};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

/// Main entry point
///
/// 1. Load configuration (defaults are written on first run)
/// 2. Logging setup
/// 3. Tokio runtime, catalog client, controller and console view
/// 4. Initial search for the seed query, then the input loop
/// 5. Graceful shutdown
fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Bookfinder Data")?;
    let config = config_manager.load_or_init()?;

    let _log_guard = bookfinder::logging::setup_logging(&config.logging)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Catalog: {} (timeout {}s), seed query '{}', debounce {}ms",
        config.catalog.base_url,
        config.catalog.request_timeout_secs,
        config.search.seed_query,
        config.search.debounce_ms
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("bookfinder-worker")
        .build()?;

    let client: Arc<dyn CatalogClient> = Arc::new(GoogleBooksClient::new(&config.catalog)?);
    let state_manager = StateManager::new(config.search.seed_query.clone());
    let controller = QueryController::new(client, state_manager, runtime.handle().clone())
        .with_debounce(Duration::from_millis(config.search.debounce_ms));

    let view = ConsoleView::spawn(runtime.handle(), controller.subscribe(), |frame| {
        println!("\n{}", frame);
    });

    println!("{}", bookfinder::ui::intent::HELP_TEXT);
    controller.search_current();

    for line in std::io::stdin().lock().lines() {
        let line = line?;

        let intent = match Intent::parse(&line) {
            Ok(intent) => intent,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match dispatch(&controller, intent) {
            Flow::Continue => {}
            Flow::Message(message) => println!("{}", message),
            Flow::Quit => break,
        }
    }

    tracing::info!("Input closed, shutting down");

    controller.shutdown();
    controller.metrics().log_summary();
    view.stop();
    drop(controller);

    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");
    Ok(())
}
