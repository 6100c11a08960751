//! List features: Tab indentation, leaving a list from an empty item, merging
//! an item into the previous one, and Markdown-style auto-bullet.

use crate::error::EditError;
use crate::event::{ChangeSource, EditorEvent};
use crate::feature::{ContentEditFeature, Deferred};
use crate::features::{cached_searcher, report};
use crate::host::{EditorHost, Indentation, ListItemInfo};
use crate::keys::TriggerKey;
use crate::matcher::match_list_marker;
use crate::platform::Platform;
use crate::registry::FeatureRegistry;
use crate::settings::{ListFeatureSettings, names};

const LIST_POSITION: &str = "LIST_POSITION";

/// Where the cursor sits relative to the list structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPosition {
    NotInList,
    InItem(ListItemInfo),
    /// Collapsed cursor before the first character of a non-empty item or
    /// of an item that has earlier siblings.
    AtItemStart(ListItemInfo),
    /// The only content-less item at the start of its list.
    EmptyFirstItem(ListItemInfo),
}

impl ListPosition {
    pub fn classify<H: EditorHost>(host: &H) -> Self {
        let Some(item) = host.list_item_at_cursor() else {
            return ListPosition::NotInList;
        };
        if item.is_empty && !item.has_previous_sibling {
            ListPosition::EmptyFirstItem(item)
        } else if host.is_selection_collapsed() && host.is_cursor_at_block_start() {
            ListPosition::AtItemStart(item)
        } else {
            ListPosition::InItem(item)
        }
    }

    pub fn item(&self) -> Option<&ListItemInfo> {
        match self {
            ListPosition::NotInList => None,
            ListPosition::InItem(item)
            | ListPosition::AtItemStart(item)
            | ListPosition::EmptyFirstItem(item) => Some(item),
        }
    }
}

fn cached_list_position<H: EditorHost>(event: &EditorEvent, host: &H) -> ListPosition {
    event
        .cache()
        .get_or_compute(LIST_POSITION, || ListPosition::classify(host))
}

/// The list feature bundle, in dispatch order. `platform` decides whether
/// Enter on an empty item leaves the list by default.
pub fn list_features<H: EditorHost>(platform: &Platform) -> FeatureRegistry<H> {
    let defaults = ListFeatureSettings::for_platform(platform);
    FeatureRegistry::new(vec![
        (
            names::INDENT_WHEN_TAB,
            ContentEditFeature {
                keys: &[TriggerKey::Tab],
                enabled_by_default: defaults.indent_when_tab,
                should_handle: should_indent::<H>,
                handle: indent::<H>,
            },
        ),
        (
            names::OUTDENT_WHEN_SHIFT_TAB,
            ContentEditFeature {
                keys: &[TriggerKey::Tab],
                enabled_by_default: defaults.outdent_when_shift_tab,
                should_handle: should_outdent::<H>,
                handle: outdent::<H>,
            },
        ),
        (
            names::MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR,
            ContentEditFeature {
                keys: &[TriggerKey::Backspace],
                enabled_by_default: defaults.merge_in_new_line_when_backspace_on_first_char,
                should_handle: should_merge_in_new_line::<H>,
                handle: merge_in_new_line::<H>,
            },
        ),
        (
            names::OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE,
            ContentEditFeature {
                keys: &[TriggerKey::Backspace],
                enabled_by_default: defaults.outdent_when_backspace_on_empty_first_line,
                should_handle: is_on_empty_first_line::<H>,
                handle: outdent_empty_first_line::<H>,
            },
        ),
        (
            names::OUTDENT_WHEN_ENTER_ON_EMPTY_LINE,
            ContentEditFeature {
                keys: &[TriggerKey::Enter],
                enabled_by_default: defaults.outdent_when_enter_on_empty_line,
                should_handle: should_outdent_on_enter::<H>,
                handle: outdent_on_enter::<H>,
            },
        ),
        (
            names::AUTO_BULLET,
            ContentEditFeature {
                keys: &[TriggerKey::Space],
                enabled_by_default: defaults.auto_bullet,
                should_handle: should_auto_bullet::<H>,
                handle: auto_bullet::<H>,
            },
        ),
    ])
}

// === Tab / Shift+Tab ===

fn is_in_list<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    cached_list_position(event, host).item().is_some()
}

fn should_indent<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    let modifiers = event.modifiers();
    !modifiers.shift && !modifiers.has_command() && is_in_list(event, host)
}

fn should_outdent<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    let modifiers = event.modifiers();
    modifiers.shift && !modifiers.has_command() && is_in_list(event, host)
}

fn change_indentation<H: EditorHost>(
    feature: &'static str,
    indentation: Indentation,
    event: &EditorEvent,
    host: &mut H,
) {
    let result = host.with_undo_snapshot(ChangeSource::Format, false, |host| {
        host.set_indentation(indentation)
    });
    // Tab never falls through to the host inside a list, even when the
    // depth could not change.
    event.prevent_default();
    event.cache().clear();
    report(feature, result);
}

fn indent<H: EditorHost>(event: &EditorEvent, host: &mut H) -> Option<Deferred<H>> {
    change_indentation(names::INDENT_WHEN_TAB, Indentation::Increase, event, host);
    None
}

fn outdent<H: EditorHost>(event: &EditorEvent, host: &mut H) -> Option<Deferred<H>> {
    change_indentation(names::OUTDENT_WHEN_SHIFT_TAB, Indentation::Decrease, event, host);
    None
}

// === Backspace ===

fn should_merge_in_new_line<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    matches!(
        cached_list_position(event, host),
        ListPosition::AtItemStart(item) if item.has_previous_sibling
    )
}

/// Let the host merge the item into the previous one, then put a line break
/// where the item boundary was so the text keeps starting on its own line.
fn merge_in_new_line<H: EditorHost>(_event: &EditorEvent, _host: &mut H) -> Option<Deferred<H>> {
    Some(Box::new(|host: &mut H, event: &EditorEvent| {
        let result = host.with_undo_snapshot(ChangeSource::List, false, |host| {
            host.insert_line_break()
        });
        event.cache().clear();
        report(names::MERGE_IN_NEW_LINE_WHEN_BACKSPACE_ON_FIRST_CHAR, result);
    }))
}

fn is_on_empty_first_line<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    matches!(
        cached_list_position(event, host),
        ListPosition::EmptyFirstItem(_)
    )
}

fn outdent_empty_first_line<H: EditorHost>(
    event: &EditorEvent,
    host: &mut H,
) -> Option<Deferred<H>> {
    let result = host.with_undo_snapshot(ChangeSource::List, false, |host| {
        toggle_list_and_prevent_default(event, host)
    });
    event.cache().clear();
    report(names::OUTDENT_WHEN_BACKSPACE_ON_EMPTY_FIRST_LINE, result);
    None
}

// === Enter ===

fn should_outdent_on_enter<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    !event.modifiers().shift
        && cached_list_position(event, host)
            .item()
            .is_some_and(|item| item.is_empty)
}

fn outdent_on_enter<H: EditorHost>(event: &EditorEvent, host: &mut H) -> Option<Deferred<H>> {
    let result = host.perform_auto_complete(|host| toggle_list_and_prevent_default(event, host));
    event.cache().clear();
    report(names::OUTDENT_WHEN_ENTER_ON_EMPTY_LINE, result);
    None
}

/// Toggle the list type of the item at the cursor off, keep focus, and stop
/// the host from applying its own handling on top.
fn toggle_list_and_prevent_default<H: EditorHost>(
    event: &EditorEvent,
    host: &mut H,
) -> Result<(), EditError> {
    let kind = cached_list_position(event, host)
        .item()
        .map(|item| item.kind)
        .ok_or(EditError::NotInList)?;
    host.toggle_list(kind)?;
    host.focus();
    event.prevent_default();
    Ok(())
}

// === Space ===

fn should_auto_bullet<H: EditorHost>(event: &EditorEvent, host: &H) -> bool {
    if is_in_list(event, host) || host.is_in_table() {
        return false;
    }
    let Some(searcher) = cached_searcher(event, host) else {
        return false;
    };
    match_list_marker(&searcher.substring_before(3))
        .list_kind()
        .is_some()
        && searcher.nearest_non_text_inline().is_none()
}

/// Runs once the space is in the document: the marker plus the space are
/// replaced by list formatting in one auto-complete step.
fn auto_bullet<H: EditorHost>(_event: &EditorEvent, _host: &mut H) -> Option<Deferred<H>> {
    Some(Box::new(|host: &mut H, event: &EditorEvent| {
        let result = apply_auto_bullet(host);
        event.cache().clear();
        report(names::AUTO_BULLET, result);
    }))
}

fn apply_auto_bullet<H: EditorHost>(host: &mut H) -> Result<(), EditError> {
    let searcher = host.content_searcher().ok_or(EditError::NoCursor)?;
    let typed = searcher.substring_before(4);
    let marker_gone = || {
        let end = searcher.cursor_offset();
        EditError::StaleTarget {
            block: searcher.block(),
            start: end.saturating_sub(typed.chars().count()),
            end,
            text: typed.to_string(),
        }
    };
    let marker = typed.trim_end_matches([' ', '\u{a0}']);
    let kind = match_list_marker(marker)
        .list_kind()
        .ok_or_else(marker_gone)?;
    let range = searcher
        .range_from_text(&typed, true)
        .ok_or_else(marker_gone)?;

    host.perform_auto_complete(|host| {
        host.delete_text(&range)?;
        host.toggle_list(kind)
    })
}
