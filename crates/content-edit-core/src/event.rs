//! Events routed to content edit features.

use std::cell::Cell;

use smol_str::SmolStr;

use crate::cache::EventDataCache;
use crate::keys::{Key, Modifiers, TriggerKey};

/// Identifies what caused a change, attached to undo snapshots and to
/// content-changed notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    AutoLink,
    AutoComplete,
    Format,
    Keyboard,
    List,
    Paste,
    Unlink,
}

impl ChangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoLink => "AutoLink",
            Self::AutoComplete => "AutoComplete",
            Self::Format => "Format",
            Self::Keyboard => "Keyboard",
            Self::List => "List",
            Self::Paste => "Paste",
            Self::Unlink => "Unlink",
        }
    }
}

/// Clipboard payload carried by a paste notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    /// Plain-text flavor of what was pasted.
    pub text: SmolStr,
}

/// A key-down event.
#[derive(Debug)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    default_prevented: Cell<bool>,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            default_prevented: Cell::new(false),
        }
    }
}

#[derive(Debug)]
pub enum EventKind {
    KeyDown(KeyEvent),
    ContentChanged {
        source: ChangeSource,
        clipboard: Option<ClipboardData>,
    },
}

/// One event travelling through a dispatch cycle.
///
/// The event owns its `EventDataCache`: everything a feature memoizes while
/// looking at this event lives and dies with it.
#[derive(Debug)]
pub struct EditorEvent {
    kind: EventKind,
    cache: EventDataCache,
}

impl EditorEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            cache: EventDataCache::new(),
        }
    }

    pub fn key_down(key: Key, modifiers: Modifiers) -> Self {
        Self::new(EventKind::KeyDown(KeyEvent::new(key, modifiers)))
    }

    pub fn content_changed(source: ChangeSource, clipboard: Option<ClipboardData>) -> Self {
        Self::new(EventKind::ContentChanged { source, clipboard })
    }

    /// Convenience for the paste notification a host raises after inserting
    /// pasted text.
    pub fn paste(text: impl Into<SmolStr>) -> Self {
        Self::content_changed(
            ChangeSource::Paste,
            Some(ClipboardData { text: text.into() }),
        )
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn cache(&self) -> &EventDataCache {
        &self.cache
    }

    pub fn key_event(&self) -> Option<&KeyEvent> {
        match &self.kind {
            EventKind::KeyDown(key) => Some(key),
            EventKind::ContentChanged { .. } => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.key_event()
            .map(|key| key.modifiers)
            .unwrap_or_default()
    }

    /// The trigger this event fires, used to select candidate features.
    pub fn trigger(&self) -> Option<TriggerKey> {
        match &self.kind {
            EventKind::KeyDown(key) => TriggerKey::from_key(&key.key),
            EventKind::ContentChanged { .. } => Some(TriggerKey::ContentChanged),
        }
    }

    /// Clipboard text if this is a paste notification.
    pub fn pasted_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::ContentChanged {
                source: ChangeSource::Paste,
                clipboard,
            } => clipboard.as_ref().map(|c| c.text.as_str()),
            _ => None,
        }
    }

    /// Ask the host to skip its default handling of a key event.
    ///
    /// No-op for content-changed notifications, which have no default.
    pub fn prevent_default(&self) {
        if let EventKind::KeyDown(key) = &self.kind {
            key.default_prevented.set(true);
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        match &self.kind {
            EventKind::KeyDown(key) => key.default_prevented.get(),
            EventKind::ContentChanged { .. } => false,
        }
    }
}
