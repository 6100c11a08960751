//! Routing events to content edit features.
//!
//! The host drives one dispatch cycle per event:
//!
//! 1. `ContentEdit::dispatch` asks the enabled features for the event's
//!    trigger, in registry order. The first whose predicate holds handles
//!    the event; later features are not consulted.
//! 2. Unless the handler called `prevent_default`, the host applies its own
//!    default handling of the key.
//! 3. `Dispatch::run_deferred` runs whatever the handler scheduled.

use crate::event::EditorEvent;
use crate::feature::{ContentEditFeature, Deferred};
use crate::features::{link_features, list_features};
use crate::host::EditorHost;
use crate::platform::Platform;
use crate::registry::FeatureRegistry;
use crate::settings::ContentEditSettings;

/// The set of active features for one editor.
pub struct ContentEdit<H> {
    features: Vec<(&'static str, ContentEditFeature<H>)>,
}

impl<H: EditorHost> ContentEdit<H> {
    /// Both built-in bundles (links first, then lists) filtered by
    /// `settings`.
    pub fn new(settings: &ContentEditSettings, platform: &Platform) -> Self {
        Self::from_registries([link_features(), list_features(platform)], settings)
    }
}

impl<H> ContentEdit<H> {
    /// Active features from `registries`, in order. Features `settings` does
    /// not know about fall back to their own default.
    pub fn from_registries<I>(registries: I, settings: &ContentEditSettings) -> Self
    where
        I: IntoIterator<Item = FeatureRegistry<H>>,
    {
        let features: Vec<_> = registries
            .into_iter()
            .flatten()
            .filter(|(name, feature)| {
                settings
                    .is_enabled(name)
                    .unwrap_or(feature.enabled_by_default)
            })
            .collect();
        tracing::debug!(
            active = features.len(),
            "content edit features configured"
        );
        Self { features }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.features.iter().any(|(active, _)| *active == name)
    }

    pub fn active_features(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|(name, _)| *name)
    }

    /// Offer `event` to the active features. At most one handles it.
    pub fn dispatch(&self, event: &EditorEvent, host: &mut H) -> Dispatch<H> {
        let Some(trigger) = event.trigger() else {
            return Dispatch::unhandled();
        };

        for (name, feature) in &self.features {
            if !feature.handles_trigger(trigger) || !(feature.should_handle)(event, host) {
                continue;
            }
            tracing::debug!(feature = name, ?trigger, "content edit feature handling event");
            let deferred = (feature.handle)(event, host);
            return Dispatch {
                feature: Some(*name),
                deferred,
            };
        }

        tracing::trace!(?trigger, "no content edit feature applies");
        Dispatch::unhandled()
    }
}

impl<H> std::fmt::Debug for ContentEdit<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.active_features()).finish()
    }
}

/// Outcome of offering an event to the features.
#[must_use = "deferred work only runs through `run_deferred`"]
pub struct Dispatch<H> {
    feature: Option<&'static str>,
    deferred: Option<Deferred<H>>,
}

impl<H> Dispatch<H> {
    fn unhandled() -> Self {
        Self {
            feature: None,
            deferred: None,
        }
    }

    /// Setting name of the feature that handled the event.
    pub fn feature(&self) -> Option<&'static str> {
        self.feature
    }

    pub fn is_handled(&self) -> bool {
        self.feature.is_some()
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Run the handler's deferred work. Call after the host's default
    /// handling of the event.
    pub fn run_deferred(self, host: &mut H, event: &EditorEvent) {
        if let Some(deferred) = self.deferred {
            deferred(host, event);
        }
    }
}

impl<H> std::fmt::Debug for Dispatch<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("feature", &self.feature)
            .field("has_deferred", &self.has_deferred())
            .finish()
    }
}
