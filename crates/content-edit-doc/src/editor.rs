//! In-memory editor host.
//!
//! `MemoryEditor` owns a [`Document`], a single-block selection and an undo
//! stack, and runs every key press through the content edit cycle:
//! dispatch, the editor's own default handling (unless a feature prevented
//! it), then the feature's deferred work.

use std::rc::Rc;

use content_edit_core::{
    BlockId, ChangeSource, ContentEdit, ContentEditSettings, ContentSearcher, EditError,
    EditorEvent, EditorHost, Indentation, Key, ListItemInfo, ListKind, Modifiers, Platform,
    TextRange,
};

use crate::model::{Block, BlockKind, Document, Inline, Position, Selection};
use crate::undo::UndoStack;

/// What an undo step restores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub document: Document,
    pub selection: Selection,
}

#[derive(Debug)]
pub struct MemoryEditor {
    document: Document,
    selection: Selection,
    undo: UndoStack<EditorState>,
    content_edit: Rc<ContentEdit<MemoryEditor>>,
    platform: Platform,
    in_transaction: bool,
    focused: bool,
}

impl MemoryEditor {
    /// Editor over `document` with the cursor at its end.
    pub fn new(document: Document, settings: &ContentEditSettings, platform: Platform) -> Self {
        let (document, selection) = match document.blocks().last() {
            Some(block) => {
                let selection = Selection::caret(block.id, block.len_chars());
                (document, selection)
            }
            None => (Document::new(), Selection::caret(BlockId(1), 0)),
        };
        Self {
            document,
            selection,
            undo: UndoStack::default(),
            content_edit: Rc::new(ContentEdit::new(settings, &platform)),
            platform,
            in_transaction: false,
            focused: false,
        }
    }

    /// Editor with the default feature set of the default platform.
    pub fn with_default_features(document: Document) -> Self {
        let platform = Platform::default();
        let settings = ContentEditSettings::for_platform(&platform);
        Self::new(document, &settings, platform)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn content_edit(&self) -> &ContentEdit<Self> {
        &self.content_edit
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn set_cursor(&mut self, block: BlockId, offset: usize) -> Result<(), EditError> {
        self.select(block, offset, offset)
    }

    pub fn select(&mut self, block: BlockId, anchor: usize, head: usize) -> Result<(), EditError> {
        let len = self
            .document
            .block(block)
            .ok_or(EditError::MissingBlock(block))?
            .len_chars();
        if anchor > len || head > len {
            return Err(EditError::InvalidRange {
                start: anchor.min(head),
                end: anchor.max(head),
                len,
            });
        }
        self.selection = Selection {
            block,
            anchor,
            head,
        };
        self.undo.disarm_backspace_undo();
        Ok(())
    }

    /// The document rendered with `|` at the cursor.
    pub fn render(&self) -> String {
        self.document.render(Some(Position {
            block: self.selection.block,
            offset: self.selection.head,
        }))
    }

    fn state(&self) -> EditorState {
        EditorState {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, state: EditorState) {
        self.document = state.document;
        self.selection = state.selection;
    }

    fn cursor_block(&self) -> Result<&Block, EditError> {
        self.document
            .block(self.selection.block)
            .ok_or(EditError::MissingBlock(self.selection.block))
    }

    // === Input ===

    /// Run one key press through the full cycle. Returns the setting name of
    /// the feature that handled it, if any.
    pub fn press_key(&mut self, key: Key, modifiers: Modifiers) -> Option<&'static str> {
        if key == Key::Backspace {
            if let Some(state) = self.undo.undo_by_backspace() {
                tracing::debug!("backspace reverted the last auto-complete");
                self.restore(state);
                return None;
            }
        } else {
            self.undo.disarm_backspace_undo();
        }

        let event = EditorEvent::key_down(key.clone(), modifiers);
        let content_edit = Rc::clone(&self.content_edit);
        let dispatch = content_edit.dispatch(&event, self);
        let feature = dispatch.feature();

        if !event.is_default_prevented() {
            self.apply_default(&key, modifiers);
        }
        dispatch.run_deferred(self, &event);
        feature
    }

    /// Press the key for every char of `text`: `' '` is Space, `'\n'` is
    /// Enter and `'\t'` is Tab.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let key = match ch {
                ' ' => Key::Space,
                '\n' => Key::Enter,
                '\t' => Key::Tab,
                ch => Key::character(ch.to_string()),
            };
            self.press_key(key, Modifiers::NONE);
        }
    }

    /// Insert `text` at the cursor as one undo step, then notify the features.
    pub fn paste(&mut self, text: &str) -> Option<&'static str> {
        self.undo.disarm_backspace_undo();
        let inserted = self.with_undo_snapshot(ChangeSource::Paste, false, |editor| {
            editor.insert_at_cursor(text)
        });
        if let Err(err) = inserted {
            tracing::warn!(%err, "paste failed");
            return None;
        }
        self.notify(EditorEvent::paste(text))
    }

    /// Tell the features the content changed for a reason other than a key
    /// press.
    pub fn notify_content_changed(&mut self, source: ChangeSource) -> Option<&'static str> {
        self.notify(EditorEvent::content_changed(source, None))
    }

    fn notify(&mut self, event: EditorEvent) -> Option<&'static str> {
        let content_edit = Rc::clone(&self.content_edit);
        let dispatch = content_edit.dispatch(&event, self);
        let feature = dispatch.feature();
        dispatch.run_deferred(self, &event);
        feature
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.undo() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    // === Default key handling ===

    fn apply_default(&mut self, key: &Key, modifiers: Modifiers) {
        // Shortcuts aren't emulated.
        if modifiers.has_command() {
            return;
        }
        if key.is_navigation() {
            self.move_cursor(key);
            return;
        }
        let result = self.with_undo_snapshot(ChangeSource::Keyboard, false, |editor| {
            editor.default_edit(key, modifiers)
        });
        if let Err(err) = result {
            tracing::debug!(%err, ?key, "default key handling failed");
        }
    }

    fn default_edit(&mut self, key: &Key, modifiers: Modifiers) -> Result<(), EditError> {
        match key {
            Key::Enter if modifiers.shift => self.insert_line_break(),
            Key::Enter => self.split_block(),
            Key::Backspace => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            _ => match key.inserted_text() {
                Some(text) => self.insert_at_cursor(text),
                None => Ok(()),
            },
        }
    }

    fn move_cursor(&mut self, key: &Key) {
        let (block, offset) = (self.selection.block, self.selection.head);
        let Some(len) = self.document.block(block).map(Block::len_chars) else {
            return;
        };
        let previous = self.document.previous(block);
        let next = self.document.next(block);
        let target = match key {
            Key::ArrowLeft if offset > 0 => Some((block, offset - 1)),
            Key::ArrowLeft => previous.map(|prev| (prev.id, prev.len_chars())),
            Key::ArrowRight if offset < len => Some((block, offset + 1)),
            Key::ArrowRight => next.map(|next| (next.id, 0)),
            Key::ArrowUp | Key::PageUp => {
                previous.map(|prev| (prev.id, offset.min(prev.len_chars())))
            }
            Key::ArrowDown | Key::PageDown => {
                next.map(|next| (next.id, offset.min(next.len_chars())))
            }
            Key::Home => Some((block, 0)),
            Key::End => Some((block, len)),
            _ => None,
        };
        if let Some((block, offset)) = target {
            self.selection = Selection::caret(block, offset);
        }
    }

    fn delete_selection(&mut self) -> Result<(), EditError> {
        if self.selection.is_collapsed() {
            return Ok(());
        }
        let (block, start, end) = (
            self.selection.block,
            self.selection.start(),
            self.selection.end(),
        );
        self.document.require_mut(block)?.remove_range(start, end)?;
        self.selection = Selection::caret(block, start);
        Ok(())
    }

    /// Insert `text` at the cursor, replacing the selection. Newlines become
    /// line breaks.
    fn insert_at_cursor(&mut self, text: &str) -> Result<(), EditError> {
        self.delete_selection()?;
        let Position { block, offset } = self.selection.position();
        let target = self.document.require_mut(block)?;
        let mut inserted = 0;
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                target.insert_inline(offset + inserted, Inline::LineBreak)?;
                inserted += 1;
            }
            if !line.is_empty() {
                target.insert_text(offset + inserted, line)?;
                inserted += line.chars().count();
            }
        }
        self.selection = Selection::caret(block, offset + inserted);
        Ok(())
    }

    fn split_block(&mut self) -> Result<(), EditError> {
        self.delete_selection()?;
        let Position { block: id, offset } = self.selection.position();
        let block = self.cursor_block()?;
        let (kind, is_empty) = (block.kind, block.is_empty());

        match kind {
            BlockKind::TableCell => return self.insert_line_break(),
            BlockKind::ListItem { .. } if is_empty && self.platform.exits_list_on_enter() => {
                self.document.require_mut(id)?.kind = outdented(kind);
                return Ok(());
            }
            _ => {}
        }

        let right = self.document.require_mut(id)?.split_off(offset)?;
        let new_id = self.document.insert_after(id, kind, right)?;
        self.selection = Selection::caret(new_id, 0);
        Ok(())
    }

    fn delete_backward(&mut self) -> Result<(), EditError> {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let Position { block: id, offset } = self.selection.position();
        if offset > 0 {
            self.document
                .require_mut(id)?
                .remove_range(offset - 1, offset)?;
            self.selection = Selection::caret(id, offset - 1);
            return Ok(());
        }

        let kind = self.cursor_block()?.kind;
        if matches!(kind, BlockKind::ListItem { .. }) && !self.document.has_previous_sibling(id) {
            self.document.require_mut(id)?.kind = outdented(kind);
            return Ok(());
        }
        self.merge_into_previous(id)
    }

    fn delete_forward(&mut self) -> Result<(), EditError> {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let Position { block: id, offset } = self.selection.position();
        if offset < self.cursor_block()?.len_chars() {
            self.document
                .require_mut(id)?
                .remove_range(offset, offset + 1)?;
            return Ok(());
        }
        match self.document.next(id).map(|next| next.id) {
            Some(next) => self.merge_into_previous(next),
            None => Ok(()),
        }
    }

    /// Append block `id` to the block before it and put the cursor at the
    /// seam. Table cells never merge.
    fn merge_into_previous(&mut self, id: BlockId) -> Result<(), EditError> {
        let Some(previous) = self.document.previous(id) else {
            return Ok(());
        };
        let (previous_id, previous_len) = (previous.id, previous.len_chars());
        let crosses_table = previous.kind == BlockKind::TableCell
            || self.cursor_block_kind(id) == Some(BlockKind::TableCell);
        if crosses_table {
            return Ok(());
        }

        let removed = self.document.remove(id)?;
        self.document
            .require_mut(previous_id)?
            .append(removed.inlines);
        self.selection = Selection::caret(previous_id, previous_len);
        Ok(())
    }

    fn cursor_block_kind(&self, id: BlockId) -> Option<BlockKind> {
        self.document.block(id).map(|block| block.kind)
    }

    /// The block at `range` if it still holds `range.text` there.
    fn verify_range(&mut self, range: &TextRange) -> Result<&mut Block, EditError> {
        let block = self.document.require_mut(range.block)?;
        if block.plain_text(range.start, range.end).as_deref() != Some(range.text.as_str()) {
            return Err(EditError::StaleTarget {
                block: range.block,
                start: range.start,
                end: range.end,
                text: range.text.to_string(),
            });
        }
        Ok(block)
    }
}

/// One level out: nested items move up a level, top-level items leave the
/// list.
fn outdented(kind: BlockKind) -> BlockKind {
    match kind {
        BlockKind::ListItem { list, depth } if depth > 0 => BlockKind::ListItem {
            list,
            depth: depth - 1,
        },
        BlockKind::ListItem { .. } => BlockKind::Paragraph,
        other => other,
    }
}

impl EditorHost for MemoryEditor {
    fn content_searcher(&self) -> Option<ContentSearcher> {
        let block = self.document.block(self.selection.block)?;
        Some(block.searcher_before(self.selection.start()))
    }

    fn list_item_at_cursor(&self) -> Option<ListItemInfo> {
        let block = self.document.block(self.selection.block)?;
        let BlockKind::ListItem { list, depth } = block.kind else {
            return None;
        };
        Some(ListItemInfo {
            block: block.id,
            kind: list,
            depth,
            has_previous_sibling: self.document.has_previous_sibling(block.id),
            is_empty: block.is_empty(),
        })
    }

    fn is_in_table(&self) -> bool {
        self.cursor_block_kind(self.selection.block) == Some(BlockKind::TableCell)
    }

    fn is_selection_collapsed(&self) -> bool {
        self.selection.is_collapsed()
    }

    fn is_cursor_at_block_start(&self) -> bool {
        self.selection.is_collapsed() && self.selection.head == 0
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
        // Nested transactions fold into the outermost one.
        if self.in_transaction {
            return mutation(self);
        }

        let before = self.state();
        self.in_transaction = true;
        let result = mutation(self);
        self.in_transaction = false;

        match result {
            Ok(()) => {
                let after = self.state();
                if after != before {
                    self.undo
                        .record(source, can_undo_by_backspace, before, after);
                }
                Ok(())
            }
            Err(err) => {
                tracing::debug!(source = source.as_str(), %err, "rolling back failed edit");
                self.restore(before);
                Err(err)
            }
        }
    }

    fn replace_text_with_link(&mut self, range: &TextRange, href: &str) -> Result<(), EditError> {
        let block = self.verify_range(range)?;
        block.remove_range(range.start, range.end)?;
        block.insert_inline(range.start, Inline::link(range.text.as_str(), href))?;

        if self.selection.block == range.block {
            let past_link = |offset: usize| {
                if offset > range.start && offset < range.end {
                    range.end
                } else {
                    offset
                }
            };
            self.selection.anchor = past_link(self.selection.anchor);
            self.selection.head = past_link(self.selection.head);
        }
        Ok(())
    }

    fn delete_text(&mut self, range: &TextRange) -> Result<(), EditError> {
        self.verify_range(range)?
            .remove_range(range.start, range.end)?;

        if self.selection.block == range.block {
            let shifted = |offset: usize| {
                if offset >= range.end {
                    offset - range.len()
                } else {
                    offset.min(range.start)
                }
            };
            self.selection.anchor = shifted(self.selection.anchor);
            self.selection.head = shifted(self.selection.head);
        }
        Ok(())
    }

    fn insert_line_break(&mut self) -> Result<(), EditError> {
        self.delete_selection()?;
        let Position { block, offset } = self.selection.position();
        self.document
            .require_mut(block)?
            .insert_inline(offset, Inline::LineBreak)?;
        self.selection = Selection::caret(block, offset + 1);
        Ok(())
    }

    fn set_indentation(&mut self, indentation: Indentation) -> Result<(), EditError> {
        let block = self.document.require_mut(self.selection.block)?;
        let BlockKind::ListItem { list, depth } = block.kind else {
            return Err(EditError::NotInList);
        };
        block.kind = match indentation {
            Indentation::Increase => BlockKind::ListItem {
                list,
                depth: depth.saturating_add(1),
            },
            Indentation::Decrease => outdented(block.kind),
        };
        Ok(())
    }

    fn toggle_list(&mut self, kind: ListKind) -> Result<(), EditError> {
        let block = self.document.require_mut(self.selection.block)?;
        block.kind = match block.kind {
            BlockKind::ListItem { list, .. } if list == kind => BlockKind::Paragraph,
            BlockKind::ListItem { depth, .. } => BlockKind::ListItem { list: kind, depth },
            BlockKind::Paragraph => BlockKind::ListItem {
                list: kind,
                depth: 0,
            },
            BlockKind::TableCell => {
                tracing::debug!(block = ?block.id, "lists are not supported inside table cells");
                BlockKind::TableCell
            }
        };
        Ok(())
    }

    fn remove_link_before_cursor(&mut self) -> Result<(), EditError> {
        let offset = self.selection.start();
        let block = self.document.require_mut(self.selection.block)?;
        let Some((idx, Inline::Link { text, .. })) = block.inline_ending_at(offset) else {
            return Err(EditError::NoLinkBeforeCursor);
        };
        let text = text.clone();
        block.inlines[idx] = Inline::Text(text);
        block.normalize();
        Ok(())
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
