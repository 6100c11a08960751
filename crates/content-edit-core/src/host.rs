//! Host editor abstraction.
//!
//! The features never touch a document directly. Everything they need from
//! the editor they run in (cursor context queries, scoped undo transactions,
//! the handful of structural mutations) goes through `EditorHost`, so the
//! same feature logic works over a browser DOM, a native widget or the
//! in-memory document used in tests.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::event::ChangeSource;
use crate::searcher::{ContentSearcher, TextRange};

/// Stable identity of a block (paragraph, list item, ...) in the host
/// document. Survives edits to the block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// The two list types a toggle can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indentation {
    Increase,
    Decrease,
}

/// What the host knows about the list item the cursor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItemInfo {
    pub block: BlockId,
    /// Type of the nearest list ancestor.
    pub kind: ListKind,
    /// Nesting depth, 0 for a top-level list.
    pub depth: u8,
    /// Whether an earlier item of the same list exists at this depth.
    pub has_previous_sibling: bool,
    /// Whether the item holds nothing but whitespace and line breaks.
    pub is_empty: bool,
}

/// Capabilities a host editor provides to content edit features.
///
/// Queries take `&self` and must not change the document. Mutations return
/// `EditError` when they cannot be applied; they are only ever called from a
/// feature's handler or from the deferred action it returns.
pub trait EditorHost: Sized {
    // === Queries ===

    /// Snapshot of the inline content before the cursor, or `None` when the
    /// editor has no cursor.
    fn content_searcher(&self) -> Option<ContentSearcher>;

    /// The list item containing the cursor, if any.
    fn list_item_at_cursor(&self) -> Option<ListItemInfo>;

    /// Whether the cursor is inside a table cell.
    fn is_in_table(&self) -> bool;

    fn is_selection_collapsed(&self) -> bool;

    /// Whether the cursor sits before the first character of its block.
    fn is_cursor_at_block_start(&self) -> bool;

    // === Transactions ===

    /// Run `mutation` as a single undoable step tagged with `source`.
    ///
    /// With `can_undo_by_backspace`, a Backspace pressed right afterwards
    /// reverts the whole step instead of deleting a character. If the
    /// mutation fails the document is restored to its state before the call.
    fn with_undo_snapshot<F>(
        &mut self,
        source: ChangeSource,
        can_undo_by_backspace: bool,
        mutation: F,
    ) -> Result<(), EditError>
    where
        F: FnOnce(&mut Self) -> Result<(), EditError>;

    /// Run `mutation` as an auto-complete step: grouped into one snapshot
    /// that a single Backspace reverts.
    fn perform_auto_complete<F>(&mut self, mutation: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut Self) -> Result<(), EditError>,
    {
        self.with_undo_snapshot(ChangeSource::AutoComplete, true, mutation)
    }

    // === Mutations ===

    /// Replace the text at `range` with a link to `href` showing the same
    /// text, and place the cursor after it if it was inside the range.
    fn replace_text_with_link(&mut self, range: &TextRange, href: &str) -> Result<(), EditError>;

    /// Delete the text at `range`. A block emptied by the deletion is kept as
    /// an empty line.
    fn delete_text(&mut self, range: &TextRange) -> Result<(), EditError>;

    /// Insert a line break at the cursor and move the cursor after it.
    fn insert_line_break(&mut self) -> Result<(), EditError>;

    /// Change the nesting depth of the list item at the cursor.
    fn set_indentation(&mut self, indentation: Indentation) -> Result<(), EditError>;

    /// Toggle `kind` list formatting for the block at the cursor: a list item
    /// of the same kind leaves the list, one of the other kind switches
    /// kind, anything else becomes the first item of a new list.
    fn toggle_list(&mut self, kind: ListKind) -> Result<(), EditError>;

    /// Turn the link right before the cursor back into plain text.
    fn remove_link_before_cursor(&mut self) -> Result<(), EditError>;

    fn focus(&mut self);
}
