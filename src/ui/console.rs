// ConsoleView - bridges the snapshot channel to a line-oriented terminal
//
// Rendering runs on its own tokio task that follows the controller's watch channel,
// so the input loop never blocks on output and the view only ever reads snapshots.

use crate::models::UiSnapshot;
use crate::ui::controller::QueryController;
use crate::ui::intent::{HELP_TEXT, Intent};
use crate::ui::render::render_snapshot;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What the input loop should do after an intent was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,

    /// Print a local message without touching the controller
    Message(String),

    Quit,
}

/// Selection problems detected before any request is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("There is no result {0}")]
    NoSuchResult(usize),

    #[error("Result {0} has no catalog id and can't be opened")]
    NotSelectable(usize),
}

/// Forward an intent to the controller
pub fn dispatch(controller: &QueryController, intent: Intent) -> Flow {
    match intent {
        Intent::SetQuery(query) => {
            controller.set_query(query);
            Flow::Continue
        }
        Intent::OpenPosition(position) => match resolve_position(&controller.snapshot(), position) {
            Ok(id) => {
                controller.select_book(&id);
                Flow::Continue
            }
            Err(e) => Flow::Message(e.to_string()),
        },
        Intent::OpenId(id) => {
            controller.select_book(&id);
            Flow::Continue
        }
        Intent::Refresh => {
            controller.search_current();
            Flow::Continue
        }
        Intent::Help => Flow::Message(HELP_TEXT.to_string()),
        Intent::Quit => Flow::Quit,
    }
}

/// Map a 1-based grid position to a selectable id
pub fn resolve_position(snapshot: &UiSnapshot, position: usize) -> Result<String, SelectionError> {
    let book = snapshot
        .last_result
        .as_ref()
        .and_then(|results| results.get_by_position(position))
        .ok_or(SelectionError::NoSuchResult(position))?;

    book.selectable_id()
        .map(str::to_string)
        .ok_or(SelectionError::NotSelectable(position))
}

/// Renders every new snapshot through a caller-supplied sink
pub struct ConsoleView {
    handle: JoinHandle<()>,
}

impl ConsoleView {
    /// Start following `rx`, passing each rendered frame to `sink`
    ///
    /// The current value is rendered first, then one frame per change. Intermediate
    /// values that were replaced before the task woke up are skipped.
    pub fn spawn<F>(
        runtime: &tokio::runtime::Handle,
        mut rx: watch::Receiver<UiSnapshot>,
        mut sink: F,
    ) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            tracing::debug!("Console view started");

            let frame = render_snapshot(&rx.borrow_and_update());
            sink(frame);

            while rx.changed().await.is_ok() {
                let frame = render_snapshot(&rx.borrow_and_update());
                sink(frame);
            }

            tracing::debug!("Snapshot channel closed, console view stopping");
        });

        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}
