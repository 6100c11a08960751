//! Scripted host for unit tests: queries return canned answers, mutations
//! are recorded instead of applied.

use crate::error::EditError;
use crate::event::ChangeSource;
use crate::host::{BlockId, EditorHost, Indentation, ListItemInfo, ListKind};
use crate::searcher::{ContentSearcher, TextRange};

pub(crate) const BLOCK: BlockId = BlockId(1);

#[derive(Debug, Default)]
pub(crate) struct StubHost {
    pub searcher: Option<ContentSearcher>,
    pub list_item: Option<ListItemInfo>,
    pub in_table: bool,
    pub expanded_selection: bool,
    pub at_block_start: bool,
    /// Error every mutation fails with.
    pub fail_with: Option<EditError>,
    pub calls: Vec<String>,
}

impl StubHost {
    pub fn with_text(text: &str) -> Self {
        Self {
            searcher: Some(ContentSearcher::builder(BLOCK).text(text).build()),
            ..Self::default()
        }
    }

    pub fn in_list(item: ListItemInfo) -> Self {
        Self {
            searcher: Some(ContentSearcher::builder(item.block).build()),
            list_item: Some(item),
            ..Self::default()
        }
    }

    fn record(&mut self, call: String) -> Result<(), EditError> {
        self.calls.push(call);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub(crate) fn list_item(kind: ListKind) -> ListItemInfo {
    ListItemInfo {
        block: BLOCK,
        kind,
        depth: 0,
        has_previous_sibling: false,
        is_empty: false,
    }
}

impl EditorHost for StubHost {
    fn content_searcher(&self) -> Option<ContentSearcher> {
        self.searcher.clone()
    }

    fn list_item_at_cursor(&self) -> Option<ListItemInfo> {
        self.list_item
    }

    fn is_in_table(&self) -> bool {
        self.in_table
    }

    fn is_selection_collapsed(&self) -> bool {
        !self.expanded_selection
    }

    fn is_cursor_at_block_start(&self) -> bool {
        self.at_block_start
    }

    fn with_undo_snapshot<F>(
        &mut self,
        source: ChangeSource,
        can_undo_by_backspace: bool,
        mutation: F,
    ) -> Result<(), EditError>
    where
        F: FnOnce(&mut Self) -> Result<(), EditError>,
    {
        self.calls.push(format!(
            "snapshot {} backspace={can_undo_by_backspace}",
            source.as_str()
        ));
        mutation(self)
    }

    fn replace_text_with_link(&mut self, range: &TextRange, href: &str) -> Result<(), EditError> {
        self.record(format!("link {}..{} {href}", range.start, range.end))
    }

    fn delete_text(&mut self, range: &TextRange) -> Result<(), EditError> {
        self.record(format!("delete {}..{} {:?}", range.start, range.end, range.text))
    }

    fn insert_line_break(&mut self) -> Result<(), EditError> {
        self.record("line break".to_string())
    }

    fn set_indentation(&mut self, indentation: Indentation) -> Result<(), EditError> {
        self.record(format!("indent {indentation:?}"))
    }

    fn toggle_list(&mut self, kind: ListKind) -> Result<(), EditError> {
        self.record(format!("toggle {kind:?}"))
    }

    fn remove_link_before_cursor(&mut self) -> Result<(), EditError> {
        self.record("unlink".to_string())
    }

    fn focus(&mut self) {
        self.calls.push("focus".to_string());
    }
}
