//! Keyboard-driven content edit features for rich-text editors.
//!
//! This crate provides:
//! - `ContentEditFeature`: a trigger-keyed predicate/handler pair
//! - The built-in link and list feature bundles
//! - `ContentEdit`: the dispatcher that routes editor events to features
//! - `EditorHost`: the editor capabilities the features are written against
//! - `EventDataCache`: per-event memoization shared by predicates and handlers
//! - Pure text recognizers for links and list markers
//!
//! Features never hold a reference to the editor. A handler that needs to
//! act after the host's own key handling returns a deferred closure, and
//! the host hands itself back in when it runs it.

pub mod cache;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod feature;
pub mod features;
pub mod host;
pub mod keys;
pub mod matcher;
pub mod platform;
pub mod registry;
pub mod searcher;
pub mod settings;

#[cfg(test)]
mod testing;

pub use smol_str::SmolStr;

pub use cache::EventDataCache;
pub use dispatch::{ContentEdit, Dispatch};
pub use error::{ConfigError, EditError};
pub use event::{ChangeSource, ClipboardData, EditorEvent, EventKind, KeyEvent};
pub use feature::{ContentEditFeature, Deferred};
pub use features::{ListPosition, link_features, list_features};
pub use host::{BlockId, EditorHost, Indentation, ListItemInfo, ListKind};
pub use keys::{Key, Modifiers, TriggerKey};
pub use matcher::{LinkMatch, ListMarker, match_link, match_list_marker};
pub use platform::Platform;
pub use registry::FeatureRegistry;
pub use searcher::{ContentSearcher, InlineSegment, SegmentKind, TextRange};
pub use settings::{ContentEditSettings, LinkFeatureSettings, ListFeatureSettings, names};
