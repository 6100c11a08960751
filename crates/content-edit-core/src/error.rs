//! Error types for content edit operations.

use miette::Diagnostic;

use crate::host::BlockId;

/// Failure of a host mutation.
///
/// Features never let these escape to the dispatcher: a failed mutation
/// means the feature did not fire.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The text a deferred mutation was meant to replace is no longer where
    /// it was captured. Expected when content changes in between; skipped
    /// silently.
    #[error("text {text:?} is no longer at {block:?} {start}..{end}")]
    StaleTarget {
        block: BlockId,
        start: usize,
        end: usize,
        text: String,
    },

    #[error("block {0:?} no longer exists")]
    MissingBlock(BlockId),

    #[error("editor has no cursor")]
    NoCursor,

    #[error("cursor is not inside a list item")]
    NotInList,

    #[error("no link right before the cursor")]
    NoLinkBeforeCursor,

    #[error("range {start}..{end} is out of bounds for a block of {len} positions")]
    InvalidRange { start: usize, end: usize, len: usize },
}

impl EditError {
    /// Whether this is the expected "content moved on" failure rather than a
    /// host problem.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleTarget { .. } | Self::MissingBlock(_))
    }
}

/// Invalid content edit settings.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("malformed content edit settings")]
    #[diagnostic(
        code(content_edit::settings::json),
        help("expected a JSON object mapping feature names to booleans")
    )]
    Json(#[from] serde_json::Error),

    #[error("unknown content edit feature {0:?}")]
    #[diagnostic(code(content_edit::settings::unknown_feature))]
    UnknownFeature(String),
}
