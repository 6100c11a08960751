//! Key and modifier types for content edit dispatch.
//!
//! Platform-agnostic key representation. Platform-specific code converts
//! from native key events to these types; features only ever see `Key`,
//! `Modifiers` and the coarser `TriggerKey` they subscribe to.

use smol_str::SmolStr;

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key. A literal `" "` is treated the same as `Space`.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// The text this key inserts when the host applies its default handling.
    pub fn inserted_text(&self) -> Option<&str> {
        match self {
            Self::Character(s) => Some(s.as_str()),
            Self::Space => Some(" "),
            Self::Tab => Some("\t"),
            _ => None,
        }
    }
}

/// Modifier key state for a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const META: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Whether any of ctrl/alt/meta is held (shift alone doesn't count).
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// The keys a content edit feature can subscribe to.
///
/// `ContentChanged` is not a physical key: it fires when the host reports a
/// content change (e.g. after a paste) instead of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKey {
    Backspace,
    Tab,
    Enter,
    Space,
    ContentChanged,
}

impl TriggerKey {
    /// Map a physical key to the trigger it fires, if any.
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Backspace => Some(Self::Backspace),
            Key::Tab => Some(Self::Tab),
            Key::Enter => Some(Self::Enter),
            Key::Space => Some(Self::Space),
            Key::Character(s) if s.as_str() == " " => Some(Self::Space),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_character_triggers_space() {
        assert_eq!(
            TriggerKey::from_key(&Key::character(" ")),
            Some(TriggerKey::Space)
        );
        assert_eq!(TriggerKey::from_key(&Key::Space), Some(TriggerKey::Space));
        assert_eq!(TriggerKey::from_key(&Key::character("a")), None);
        assert_eq!(TriggerKey::from_key(&Key::ArrowLeft), None);
    }

    #[test]
    fn test_inserted_text() {
        assert_eq!(Key::Space.inserted_text(), Some(" "));
        assert_eq!(Key::Tab.inserted_text(), Some("\t"));
        assert_eq!(Key::character("x").inserted_text(), Some("x"));
        assert_eq!(Key::Enter.inserted_text(), None);
    }

    #[test]
    fn test_command_modifiers() {
        assert!(!Modifiers::NONE.has_command());
        assert!(!Modifiers::SHIFT.has_command());
        assert!(Modifiers::CTRL.has_command());
        assert!(Modifiers::META.has_command());
    }
}
