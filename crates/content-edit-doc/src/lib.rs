//! content-edit-doc: an in-memory block document that hosts the content
//! edit features.
//!
//! This crate provides:
//! - `Document` - blocks of inline content with stable ids
//! - `UndoStack<S>` - bounded snapshot undo with backspace-undo arming
//! - `MemoryEditor` - an `EditorHost` that emulates an editor's default key
//!   handling around the content edit dispatch cycle

pub mod editor;
pub mod model;
pub mod undo;

pub use content_edit_core;

pub use editor::{EditorState, MemoryEditor};
pub use model::{Block, BlockKind, Document, Inline, Position, Selection};
pub use undo::{DEFAULT_BACKSPACE_UNDO_WINDOW, UndoStack, UndoStep};
