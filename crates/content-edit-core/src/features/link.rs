//! Link features: turn link-shaped text into links, and unlink on Backspace.

use crate::event::{ChangeSource, EditorEvent, EventKind};
use crate::feature::{ContentEditFeature, Deferred};
use crate::features::{cached_searcher, report};
use crate::host::EditorHost;
use crate::keys::TriggerKey;
use crate::matcher::{LinkMatch, MINIMUM_LINK_CANDIDATE_LEN, match_link};
use crate::registry::FeatureRegistry;
use crate::searcher::TextRange;
use crate::settings::{LinkFeatureSettings, names};

const LINK_DATA: &str = "LINK_DATA";

/// A recognized link together with where its text sits in the document.
#[derive(Debug, Clone)]
struct LinkData {
    link: LinkMatch,
    range: TextRange,
}

/// The link feature bundle, in dispatch order.
pub fn link_features<H: EditorHost>() -> FeatureRegistry<H> {
    let defaults = LinkFeatureSettings::default();
    FeatureRegistry::new(vec![
        (
            names::AUTO_LINK,
            ContentEditFeature {
                keys: &[TriggerKey::Enter, TriggerKey::Space, TriggerKey::ContentChanged],
                enabled_by_default: defaults.auto_link,
                should_handle: recognizes_link::<H>,
                handle: auto_link::<H>,
            },
        ),
        (
            names::UNLINK_WHEN_BACKSPACE_AFTER_LINK,
            ContentEditFeature {
                keys: &[TriggerKey::Backspace],
                enabled_by_default: defaults.unlink_when_backspace_after_link,
                should_handle: cursor_follows_link::<H>,
                handle: unlink::<H>,
            },
        ),
    ])
}

fn cached_link_data<H: EditorHost>(event: &EditorEvent, host: &H) -> Option<LinkData> {
    let applies = match event.kind() {
        EventKind::KeyDown(_) => true,
        EventKind::ContentChanged { source, .. } => *source == ChangeSource::Paste,
    };
    if !applies {
        return None;
    }
    event
        .cache()
        .get_or_compute(LINK_DATA, || find_link_data(event, host))
}

/// Pasted text is tried first; otherwise the word right before the cursor.
fn find_link_data<H: EditorHost>(event: &EditorEvent, host: &H) -> Option<LinkData> {
    let searcher = cached_searcher(event, host)?;

    if let Some(pasted) = event.pasted_text() {
        let pasted_link = match_link(pasted.trim()).and_then(|link| {
            let range = searcher.range_from_text(&link.original_text, false)?;
            Some(LinkData { link, range })
        });
        if pasted_link.is_some() {
            return pasted_link;
        }
    }

    let word = searcher.word_before();
    if word.chars().count() < MINIMUM_LINK_CANDIDATE_LEN {
        return None;
    }
    let link = match_link(&word)?;
    let range = searcher.range_from_text(&link.original_text, false)?;
    Some(LinkData { link, range })
}

fn recognizes_link<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    cached_link_data(event, host).is_some()
}

fn auto_link<H: EditorHost>(event: &EditorEvent, host: &mut H) -> Option<Deferred<H>> {
    // The range is resolved now; by the time the deferred step runs the
    // cursor has moved past the key's own insertion.
    let LinkData { link, range } = cached_link_data(event, host)?;
    tracing::trace!(text = %link.original_text, url = %link.normalized_url, "auto-link scheduled");

    Some(Box::new(move |host: &mut H, event: &EditorEvent| {
        let result = host.with_undo_snapshot(ChangeSource::AutoLink, true, |host| {
            host.replace_text_with_link(&range, &link.normalized_url)
        });
        event.cache().clear();
        report(names::AUTO_LINK, result);
    }))
}

fn cursor_follows_link<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    cached_searcher(event, host).is_some_and(|searcher| {
        searcher
            .inline_before()
            .is_some_and(|segment| segment.is_link())
    })
}

fn unlink<H: EditorHost>(event: &EditorEvent, host: &mut H) -> Option<Deferred<H>> {
    event.prevent_default();
    let result = host.with_undo_snapshot(ChangeSource::Unlink, false, |host| {
        host.remove_link_before_cursor()
    });
    event.cache().clear();
    report(names::UNLINK_WHEN_BACKSPACE_AFTER_LINK, result);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::host::BlockId;
    use crate::keys::{Key, Modifiers};
    use crate::searcher::ContentSearcher;
    use crate::testing::{BLOCK, StubHost};

    fn feature(name: &str) -> ContentEditFeature<StubHost> {
        *link_features::<StubHost>().get(name).unwrap()
    }

    fn run(name: &str, event: &EditorEvent, host: &mut StubHost) -> bool {
        let feature = feature(name);
        if !(feature.should_handle)(event, host) {
            return false;
        }
        if let Some(deferred) = (feature.handle)(event, host) {
            deferred(host, event);
        }
        true
    }

    #[test]
    fn test_auto_link_on_space() {
        let mut host = StubHost::with_text("see www.example.com");
        let event = EditorEvent::key_down(Key::Space, Modifiers::NONE);

        assert!(run(names::AUTO_LINK, &event, &mut host));
        assert!(!event.is_default_prevented());
        assert_eq!(
            host.calls,
            [
                "snapshot AutoLink backspace=true",
                "link 4..19 http://www.example.com"
            ]
        );
        assert!(event.cache().is_empty());
    }

    #[test]
    fn test_auto_link_skips_trailing_punctuation() {
        let mut host = StubHost::with_text("(see example.com).");
        let event = EditorEvent::key_down(Key::Enter, Modifiers::NONE);

        assert!(run(names::AUTO_LINK, &event, &mut host));
        assert_eq!(host.calls[1], "link 5..16 http://example.com");
    }

    #[test]
    fn test_auto_link_ignores_short_and_plain_words() {
        let event = EditorEvent::key_down(Key::Space, Modifiers::NONE);
        for text in ["a.io", "hello world", "", "www.example.com "] {
            let mut host = StubHost::with_text(text);
            assert!(!run(names::AUTO_LINK, &event, &mut host), "{text:?}");
        }

        let mut host = StubHost::default();
        assert!(!run(names::AUTO_LINK, &event, &mut host));
    }

    #[test]
    fn test_auto_link_ignores_text_inside_links() {
        let mut host = StubHost {
            searcher: Some(
                ContentSearcher::builder(BLOCK)
                    .link("www.example.com", "http://www.example.com")
                    .build(),
            ),
            ..StubHost::default()
        };
        let event = EditorEvent::key_down(Key::Space, Modifiers::NONE);
        assert!(!run(names::AUTO_LINK, &event, &mut host));
    }

    #[test]
    fn test_auto_link_on_paste() {
        let mut host = StubHost::with_text("docs at https://example.com/guide here");
        let event = EditorEvent::paste(" https://example.com/guide ");

        assert!(run(names::AUTO_LINK, &event, &mut host));
        assert_eq!(host.calls[1], "link 8..33 https://example.com/guide");
    }

    #[test]
    fn test_auto_link_ignores_other_content_changes() {
        let mut host = StubHost::with_text("www.example.com");
        let event = EditorEvent::content_changed(ChangeSource::Format, None);
        assert!(!run(names::AUTO_LINK, &event, &mut host));
    }

    #[test]
    fn test_stale_range_is_skipped() {
        let mut host = StubHost::with_text("www.example.com");
        host.fail_with = Some(EditError::StaleTarget {
            block: BlockId(1),
            start: 0,
            end: 15,
            text: "www.example.com".to_string(),
        });
        let event = EditorEvent::key_down(Key::Space, Modifiers::NONE);

        assert!(run(names::AUTO_LINK, &event, &mut host));
        assert_eq!(host.calls.len(), 2);
    }

    #[test]
    fn test_unlink_after_link() {
        let mut host = StubHost {
            searcher: Some(
                ContentSearcher::builder(BLOCK)
                    .text("see ")
                    .link("here", "http://example.com")
                    .build(),
            ),
            ..StubHost::default()
        };
        let event = EditorEvent::key_down(Key::Backspace, Modifiers::NONE);

        assert!(!feature(names::UNLINK_WHEN_BACKSPACE_AFTER_LINK).enabled_by_default);
        assert!(run(names::UNLINK_WHEN_BACKSPACE_AFTER_LINK, &event, &mut host));
        assert!(event.is_default_prevented());
        assert_eq!(host.calls, ["snapshot Unlink backspace=false", "unlink"]);

        let mut host = StubHost::with_text("see here");
        let event = EditorEvent::key_down(Key::Backspace, Modifiers::NONE);
        assert!(!run(names::UNLINK_WHEN_BACKSPACE_AFTER_LINK, &event, &mut host));
    }
}
