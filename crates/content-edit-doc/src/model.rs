//! Block document model.
//!
//! A `Document` is a flat sequence of blocks; list nesting is expressed by
//! each list item's depth. Positions inside a block are char offsets where
//! text and link text count one position per char and every other inline
//! (line break, image) counts as exactly one position.

use content_edit_core::{BlockId, ContentSearcher, EditError, ListKind};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Inline content of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Link { text: String, href: SmolStr },
    LineBreak,
    Image { src: SmolStr },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn link(text: impl Into<String>, href: impl Into<SmolStr>) -> Self {
        Self::Link {
            text: text.into(),
            href: href.into(),
        }
    }

    /// Number of cursor positions this inline spans.
    pub fn len_chars(&self) -> usize {
        match self {
            Self::Text(text) | Self::Link { text, .. } => text.chars().count(),
            Self::LineBreak | Self::Image { .. } => 1,
        }
    }

    /// Whether this inline counts as content when deciding if a block is
    /// empty.
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::LineBreak => true,
            Self::Link { .. } | Self::Image { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    ListItem { list: ListKind, depth: u8 },
    TableCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub inlines: Vec<Inline>,
}

impl Block {
    pub fn len_chars(&self) -> usize {
        self.inlines.iter().map(Inline::len_chars).sum()
    }

    /// Nothing but whitespace and line breaks.
    pub fn is_empty(&self) -> bool {
        self.inlines.iter().all(Inline::is_blank)
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EditError> {
        let len = self.len_chars();
        if start > end || end > len {
            return Err(EditError::InvalidRange { start, end, len });
        }
        Ok(())
    }

    /// The text in `start..end` if that range covers plain text only.
    pub fn plain_text(&self, start: usize, end: usize) -> Option<String> {
        self.check_range(start, end).ok()?;

        let mut text = String::new();
        let mut pos = 0;
        for inline in &self.inlines {
            let len = inline.len_chars();
            let (from, to) = (pos, pos + len);
            pos = to;
            if to <= start || from >= end {
                continue;
            }
            let Inline::Text(run) = inline else {
                return None;
            };
            let skip = start.max(from) - from;
            let take = end.min(to) - from - skip;
            text.extend(run.chars().skip(skip).take(take));
        }
        Some(text)
    }

    /// Make sure an inline boundary exists at `offset` and return the index
    /// of the inline that starts there. `offset` must be in bounds.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for idx in 0..self.inlines.len() {
            if pos == offset {
                return idx;
            }
            let len = self.inlines[idx].len_chars();
            if offset < pos + len {
                let at = offset - pos;
                let right = match &mut self.inlines[idx] {
                    Inline::Text(text) => Inline::Text(split_string(text, at)),
                    Inline::Link { text, href } => Inline::Link {
                        text: split_string(text, at),
                        href: href.clone(),
                    },
                    // Single-position inlines always start at a boundary.
                    Inline::LineBreak | Inline::Image { .. } => return idx,
                };
                self.inlines.insert(idx + 1, right);
                return idx + 1;
            }
            pos += len;
        }
        self.inlines.len()
    }

    pub fn insert_inline(&mut self, offset: usize, inline: Inline) -> Result<(), EditError> {
        self.check_range(offset, offset)?;
        let idx = self.split_at(offset);
        self.inlines.insert(idx, inline);
        self.normalize();
        Ok(())
    }

    pub fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), EditError> {
        self.insert_inline(offset, Inline::text(text))
    }

    /// Remove `start..end` and return what was there.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<Vec<Inline>, EditError> {
        self.check_range(start, end)?;
        let from = self.split_at(start);
        let to = self.split_at(end);
        let removed = self.inlines.drain(from..to).collect();
        self.normalize();
        Ok(removed)
    }

    /// Cut everything from `offset` on and return it.
    pub fn split_off(&mut self, offset: usize) -> Result<Vec<Inline>, EditError> {
        self.check_range(offset, offset)?;
        let idx = self.split_at(offset);
        let mut right = self.inlines.split_off(idx);
        self.normalize();
        normalize_inlines(&mut right);
        Ok(right)
    }

    pub fn append(&mut self, inlines: Vec<Inline>) {
        self.inlines.extend(inlines);
        self.normalize();
    }

    /// Merge adjacent text runs and adjacent links to the same target, and
    /// drop empty runs.
    pub fn normalize(&mut self) {
        normalize_inlines(&mut self.inlines);
    }

    /// The inline that ends exactly at `offset`, with its index.
    pub fn inline_ending_at(&self, offset: usize) -> Option<(usize, &Inline)> {
        let mut pos = 0;
        for (idx, inline) in self.inlines.iter().enumerate() {
            pos += inline.len_chars();
            if pos == offset && inline.len_chars() > 0 {
                return Some((idx, inline));
            }
            if pos > offset {
                break;
            }
        }
        None
    }

    /// Snapshot of the inlines before `offset`, for the content edit
    /// features.
    pub fn searcher_before(&self, offset: usize) -> ContentSearcher {
        let mut builder = ContentSearcher::builder(self.id);
        let mut pos = 0;
        for inline in &self.inlines {
            if pos >= offset {
                break;
            }
            let len = inline.len_chars();
            let take = len.min(offset - pos);
            builder = match inline {
                Inline::Text(text) => builder.text(&prefix(text, take)),
                Inline::Link { text, href } => builder.link(&prefix(text, take), href),
                Inline::LineBreak => builder.line_break(),
                Inline::Image { .. } => builder.image(),
            };
            pos += len;
        }
        builder.build()
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

fn split_string(text: &mut String, chars: usize) -> String {
    let byte = byte_offset(text, chars);
    text.split_off(byte)
}

fn prefix(text: &str, chars: usize) -> String {
    text[..byte_offset(text, chars)].to_string()
}

fn normalize_inlines(inlines: &mut Vec<Inline>) {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines.drain(..) {
        if matches!(&inline, Inline::Text(text) | Inline::Link { text, .. } if text.is_empty()) {
            continue;
        }
        match (merged.last_mut(), &inline) {
            (Some(Inline::Text(prev)), Inline::Text(text)) => {
                prev.push_str(text);
                continue;
            }
            (
                Some(Inline::Link {
                    text: prev,
                    href: prev_href,
                }),
                Inline::Link { text, href },
            ) if prev_href == href => {
                prev.push_str(text);
                continue;
            }
            _ => {}
        }
        merged.push(inline);
    }
    *inlines = merged;
}

/// A cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub block: BlockId,
    pub offset: usize,
}

/// Selection within a single block.
///
/// `anchor` is where the selection started, `head` where the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub block: BlockId,
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(block: BlockId, offset: usize) -> Self {
        Self {
            block,
            anchor: offset,
            head: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// The collapsed position the cursor sits at for text insertion.
    pub fn position(&self) -> Position {
        Position {
            block: self.block,
            offset: self.start(),
        }
    }
}

/// An ordered sequence of blocks with stable ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        let mut doc = Self {
            blocks: Vec::new(),
            next_id: 1,
        };
        doc.push(BlockKind::Paragraph, Vec::new());
        doc
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = (BlockKind, Vec<Inline>)>) -> Self {
        let mut doc = Self {
            blocks: Vec::new(),
            next_id: 1,
        };
        for (kind, inlines) in blocks {
            doc.push(kind, inlines);
        }
        if doc.blocks.is_empty() {
            doc.push(BlockKind::Paragraph, Vec::new());
        }
        doc
    }

    fn next_block_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, kind: BlockKind, mut inlines: Vec<Inline>) -> BlockId {
        let id = self.next_block_id();
        normalize_inlines(&mut inlines);
        self.blocks.push(Block { id, kind, inlines });
        id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    /// Like [`block_mut`](Self::block_mut) but failing with `MissingBlock`.
    pub fn require_mut(&mut self, id: BlockId) -> Result<&mut Block, EditError> {
        self.block_mut(id).ok_or(EditError::MissingBlock(id))
    }

    pub fn previous(&self, id: BlockId) -> Option<&Block> {
        let idx = self.index_of(id)?;
        idx.checked_sub(1).map(|prev| &self.blocks[prev])
    }

    pub fn next(&self, id: BlockId) -> Option<&Block> {
        let idx = self.index_of(id)?;
        self.blocks.get(idx + 1)
    }

    /// Insert a new block right after `id` and return its id.
    pub fn insert_after(
        &mut self,
        id: BlockId,
        kind: BlockKind,
        mut inlines: Vec<Inline>,
    ) -> Result<BlockId, EditError> {
        let idx = self.index_of(id).ok_or(EditError::MissingBlock(id))?;
        let new_id = self.next_block_id();
        normalize_inlines(&mut inlines);
        self.blocks.insert(
            idx + 1,
            Block {
                id: new_id,
                kind,
                inlines,
            },
        );
        Ok(new_id)
    }

    pub fn remove(&mut self, id: BlockId) -> Result<Block, EditError> {
        let idx = self.index_of(id).ok_or(EditError::MissingBlock(id))?;
        Ok(self.blocks.remove(idx))
    }

    /// Whether the list item `id` has an earlier item in the same list at
    /// its depth. Deeper items in between belong to nested lists and are
    /// skipped.
    pub fn has_previous_sibling(&self, id: BlockId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let BlockKind::ListItem { list, depth } = self.blocks[idx].kind else {
            return false;
        };
        for block in self.blocks[..idx].iter().rev() {
            match block.kind {
                BlockKind::ListItem { depth: d, .. } if d > depth => continue,
                BlockKind::ListItem { list: l, depth: d } => return d == depth && l == list,
                BlockKind::Paragraph | BlockKind::TableCell => return false,
            }
        }
        false
    }

    /// Text rendering, one line per block, with `|` at `cursor` if given.
    ///
    /// Links render as `[text](href)`, line breaks as `<br>`, list items
    /// with an indented `-` or `1.` marker and table cells with a `[cell]`
    /// prefix.
    pub fn render(&self, cursor: Option<Position>) -> String {
        self.blocks
            .iter()
            .map(|block| {
                let cursor = cursor
                    .filter(|position| position.block == block.id)
                    .map(|position| position.offset);
                let marker = match block.kind {
                    BlockKind::Paragraph => String::new(),
                    BlockKind::ListItem { list, depth } => {
                        let indent = "  ".repeat(usize::from(depth));
                        match list {
                            ListKind::Bullet => format!("{indent}- "),
                            ListKind::Numbered => format!("{indent}1. "),
                        }
                    }
                    BlockKind::TableCell => "[cell] ".to_string(),
                };
                marker + &render_inlines(&block.inlines, cursor)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_inlines(inlines: &[Inline], mut cursor: Option<usize>) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for inline in inlines {
        if cursor == Some(pos) {
            out.push('|');
            cursor = None;
        }
        let len = inline.len_chars();
        // Cursor strictly inside this inline, as a char index into its text.
        let inside = cursor
            .filter(|&offset| offset > pos && offset < pos + len)
            .map(|offset| offset - pos);
        match inline {
            Inline::Text(text) => push_with_cursor(&mut out, text, inside),
            Inline::Link { text, href } => {
                out.push('[');
                push_with_cursor(&mut out, text, inside);
                out.push_str("](");
                out.push_str(href);
                out.push(')');
            }
            Inline::LineBreak => out.push_str("<br>"),
            Inline::Image { src } => {
                out.push_str("![](");
                out.push_str(src);
                out.push(')');
            }
        }
        if inside.is_some() {
            cursor = None;
        }
        pos += len;
    }
    if cursor.is_some() {
        out.push('|');
    }
    out
}

fn push_with_cursor(out: &mut String, text: &str, cursor: Option<usize>) {
    match cursor {
        Some(chars) => {
            let byte = byte_offset(text, chars);
            out.push_str(&text[..byte]);
            out.push('|');
            out.push_str(&text[byte..]);
        }
        None => out.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(inlines: Vec<Inline>) -> Block {
        Block {
            id: BlockId(1),
            kind: BlockKind::Paragraph,
            inlines,
        }
    }

    #[test]
    fn test_offsets_count_non_text_inlines_once() {
        let block = block(vec![
            Inline::text("ab"),
            Inline::LineBreak,
            Inline::link("héllo", "http://x.org"),
            Inline::Image {
                src: "a.png".into(),
            },
        ]);
        assert_eq!(block.len_chars(), 9);
        assert_eq!(block.plain_text(0, 2).as_deref(), Some("ab"));
        assert_eq!(block.plain_text(1, 3), None);
        assert_eq!(block.plain_text(0, 10), None);
    }

    #[test]
    fn test_insert_and_remove_inside_runs() {
        let mut block = block(vec![Inline::text("hello world")]);
        block.insert_inline(5, Inline::LineBreak).unwrap();
        assert_eq!(
            block.inlines,
            vec![
                Inline::text("hello"),
                Inline::LineBreak,
                Inline::text(" world")
            ]
        );

        let removed = block.remove_range(4, 7).unwrap();
        assert_eq!(
            removed,
            vec![Inline::text("o"), Inline::LineBreak, Inline::text(" ")]
        );
        assert_eq!(block.inlines, vec![Inline::text("hellworld")]);

        assert!(matches!(
            block.insert_text(42, "x"),
            Err(EditError::InvalidRange { len: 9, .. })
        ));
    }

    #[test]
    fn test_normalize_merges_neighbours() {
        let mut block = block(vec![
            Inline::text("a"),
            Inline::text(""),
            Inline::text("b"),
            Inline::link("x", "http://x.org"),
            Inline::link("y", "http://x.org"),
            Inline::link("z", "http://z.org"),
        ]);
        block.normalize();
        assert_eq!(
            block.inlines,
            vec![
                Inline::text("ab"),
                Inline::link("xy", "http://x.org"),
                Inline::link("z", "http://z.org"),
            ]
        );
    }

    #[test]
    fn test_split_off_keeps_left_part() {
        let mut block = block(vec![Inline::text("ab"), Inline::link("cd", "http://c.d")]);
        let right = block.split_off(3).unwrap();
        assert_eq!(
            block.inlines,
            vec![Inline::text("ab"), Inline::link("c", "http://c.d")]
        );
        assert_eq!(right, vec![Inline::link("d", "http://c.d")]);
    }

    #[test]
    fn test_emptiness_ignores_whitespace_and_breaks() {
        assert!(block(vec![]).is_empty());
        assert!(block(vec![Inline::text(" \t"), Inline::LineBreak]).is_empty());
        assert!(!block(vec![Inline::Image { src: "a".into() }]).is_empty());
    }

    #[test]
    fn test_searcher_stops_at_offset() {
        let block = block(vec![
            Inline::text("see "),
            Inline::link("here", "http://h.org"),
            Inline::text(" www.x.org tail"),
        ]);
        let searcher = block.searcher_before(18);
        assert_eq!(searcher.cursor_offset(), 18);
        assert_eq!(searcher.word_before(), "www.x.org");

        let searcher = block.searcher_before(8);
        assert!(searcher.inline_before().unwrap().is_link());
        assert_eq!(block.inline_ending_at(8).map(|(idx, _)| idx), Some(1));
        assert_eq!(block.inline_ending_at(9), None);
    }

    #[test]
    fn test_previous_sibling_skips_nested_items() {
        let bullet = |depth| BlockKind::ListItem {
            list: ListKind::Bullet,
            depth,
        };
        let doc = Document::from_blocks([
            (BlockKind::Paragraph, vec![Inline::text("intro")]),
            (bullet(0), vec![Inline::text("one")]),
            (bullet(1), vec![Inline::text("nested")]),
            (bullet(0), vec![Inline::text("two")]),
            (
                BlockKind::ListItem {
                    list: ListKind::Numbered,
                    depth: 0,
                },
                vec![Inline::text("other list")],
            ),
        ]);
        let ids: Vec<_> = doc.blocks().iter().map(|block| block.id).collect();
        assert!(!doc.has_previous_sibling(ids[0]));
        assert!(!doc.has_previous_sibling(ids[1]));
        assert!(!doc.has_previous_sibling(ids[2]));
        assert!(doc.has_previous_sibling(ids[3]));
        assert!(!doc.has_previous_sibling(ids[4]));
    }

    #[test]
    fn test_render() {
        let doc = Document::from_blocks([
            (
                BlockKind::Paragraph,
                vec![
                    Inline::text("see "),
                    Inline::link("docs", "http://d.org"),
                    Inline::LineBreak,
                ],
            ),
            (
                BlockKind::ListItem {
                    list: ListKind::Numbered,
                    depth: 1,
                },
                vec![Inline::text("item")],
            ),
            (BlockKind::TableCell, vec![Inline::text("x")]),
        ]);
        let cursor = Position {
            block: BlockId(1),
            offset: 6,
        };
        insta::assert_snapshot!(doc.render(Some(cursor)), @r"
        see [do|cs](http://d.org)<br>
          1. item
        [cell] x
        ");
    }
}
