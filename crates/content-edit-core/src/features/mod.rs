//! The built-in content edit features.
//!
//! - `link`: auto-link typed/pasted URLs, unlink on Backspace
//! - `list`: Tab indentation, Backspace/Enter list exits, auto-bullet
//!
//! Shared helpers for cursor context caching and outcome logging live here.

mod link;
mod list;

use std::rc::Rc;

pub use link::link_features;
pub use list::{ListPosition, list_features};

use crate::error::EditError;
use crate::event::EditorEvent;
use crate::host::EditorHost;
use crate::searcher::ContentSearcher;

const CONTENT_SEARCHER: &str = "CONTENT_SEARCHER";

/// The host's content searcher for this event, built once per event.
pub(crate) fn cached_searcher<H: EditorHost>(
    event: &EditorEvent,
    host: &H,
) -> Option<Rc<ContentSearcher>> {
    event
        .cache()
        .get_or_compute(CONTENT_SEARCHER, || host.content_searcher().map(Rc::new))
}

/// Log the outcome of a committed mutation. Failures stop here: a feature
/// that could not apply simply did not fire.
pub(crate) fn report(feature: &'static str, result: Result<(), EditError>) {
    match result {
        Ok(()) => tracing::debug!(feature, "content edit applied"),
        Err(err) if err.is_stale() => {
            tracing::debug!(feature, %err, "content edit target went stale, skipping")
        }
        Err(err) => tracing::warn!(feature, %err, "content edit failed"),
    }
}
