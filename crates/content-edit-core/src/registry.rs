//! Named feature bundles.

use std::fmt;

use crate::feature::ContentEditFeature;

/// An ordered table of features keyed by setting name.
///
/// Order matters: the dispatcher asks features in registry order and the
/// first one that applies handles the event.
pub struct FeatureRegistry<H> {
    entries: Vec<(&'static str, ContentEditFeature<H>)>,
}

impl<H> FeatureRegistry<H> {
    pub fn new(entries: Vec<(&'static str, ContentEditFeature<H>)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&ContentEditFeature<H>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, feature)| feature)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ContentEditFeature<H>)> + '_ {
        self.entries.iter().map(|(name, feature)| (*name, feature))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> fmt::Debug for FeatureRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(name, feature)| (name, feature))).finish()
    }
}

impl<H> IntoIterator for FeatureRegistry<H> {
    type Item = (&'static str, ContentEditFeature<H>);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
