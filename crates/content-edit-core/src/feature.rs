//! The content edit feature contract.

use std::fmt;

use crate::event::EditorEvent;
use crate::keys::TriggerKey;

/// Work a feature schedules to run after the host finished its own default
/// handling of the event. Receives the same event, so it can invalidate the
/// event's cache once its transaction is done.
pub type Deferred<H> = Box<dyn FnOnce(&mut H, &EditorEvent)>;

/// Cheap, side-effect-free check whether a feature applies to an event.
pub type ShouldHandle<H> = fn(&EditorEvent, &H) -> bool;

/// The committing half of a feature. Only called right after
/// `should_handle` returned `true` for the same event.
pub type Handle<H> = fn(&EditorEvent, &mut H) -> Option<Deferred<H>>;

/// A keyboard-driven content edit behavior.
pub struct ContentEditFeature<H> {
    /// Triggers the feature reacts to.
    pub keys: &'static [TriggerKey],
    pub enabled_by_default: bool,
    pub should_handle: ShouldHandle<H>,
    pub handle: Handle<H>,
}

impl<H> ContentEditFeature<H> {
    pub fn handles_trigger(&self, trigger: TriggerKey) -> bool {
        self.keys.contains(&trigger)
    }
}

// Manual impls: the fields are all `Copy` regardless of `H`.
impl<H> Clone for ContentEditFeature<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for ContentEditFeature<H> {}

impl<H> fmt::Debug for ContentEditFeature<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEditFeature")
            .field("keys", &self.keys)
            .field("enabled_by_default", &self.enabled_by_default)
            .finish_non_exhaustive()
    }
}
