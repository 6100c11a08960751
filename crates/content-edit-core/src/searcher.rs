//! Cursor-relative view of the text before the cursor.
//!
//! A `ContentSearcher` is a snapshot the host builds from the block the
//! cursor is in: the inline segments from the start of the block up to the
//! cursor. Text searches only look at the plain-text run after the last
//! non-text inline, so text inside an existing link is never returned as a
//! replaceable range.

use smol_str::SmolStr;

use crate::host::BlockId;

/// The kind of an inline segment before the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Link { href: SmolStr },
    LineBreak,
    Image,
}

/// One inline segment before the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSegment {
    pub kind: SegmentKind,
    /// Visible text for text and link segments, empty otherwise.
    pub text: SmolStr,
    /// Char offset of the segment's start within its block.
    pub start: usize,
}

impl InlineSegment {
    /// Length in cursor positions: chars for text and links, one for any
    /// other inline.
    pub fn len_chars(&self) -> usize {
        match self.kind {
            SegmentKind::Text | SegmentKind::Link { .. } => self.text.chars().count(),
            SegmentKind::LineBreak | SegmentKind::Image => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == SegmentKind::Text
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, SegmentKind::Link { .. })
    }
}

/// A run of text located in a block, captured before any deferred work so it
/// keeps pointing at the right place after the cursor moves.
///
/// Hosts re-check `text` against the document when using the range; a
/// mismatch means the content changed in between and the range is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    pub block: BlockId,
    pub start: usize,
    pub end: usize,
    pub text: SmolStr,
}

impl TextRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Snapshot of the inline content preceding the cursor in its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSearcher {
    block: BlockId,
    segments: Vec<InlineSegment>,
    cursor: usize,
}

impl ContentSearcher {
    pub fn builder(block: BlockId) -> ContentSearcherBuilder {
        ContentSearcherBuilder {
            block,
            segments: Vec::new(),
            offset: 0,
        }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Char offset of the cursor within its block.
    pub fn cursor_offset(&self) -> usize {
        self.cursor
    }

    pub fn segments(&self) -> &[InlineSegment] {
        &self.segments
    }

    /// The plain-text run ending at the cursor, with the block offset it
    /// starts at. Stops at the nearest non-text inline.
    fn trailing_text(&self) -> (usize, String) {
        let first_text = self
            .segments
            .iter()
            .rposition(|segment| !segment.is_text())
            .map_or(0, |idx| idx + 1);
        let run = &self.segments[first_text..];
        let start = run.first().map_or(self.cursor, |segment| segment.start);
        let text = run.iter().map(|segment| segment.text.as_str()).collect();
        (start, text)
    }

    /// The word immediately before the cursor: the trailing run of
    /// non-whitespace text. Empty when the cursor follows whitespace or a
    /// non-text inline.
    pub fn word_before(&self) -> SmolStr {
        let (_, text) = self.trailing_text();
        let word = text.rsplit(char::is_whitespace).next().unwrap_or_default();
        SmolStr::new(word)
    }

    /// Up to `n` chars of plain text immediately before the cursor.
    pub fn substring_before(&self, n: usize) -> SmolStr {
        let (_, text) = self.trailing_text();
        let len = text.chars().count();
        text.chars().skip(len.saturating_sub(n)).collect()
    }

    /// The inline segment the cursor directly follows.
    pub fn inline_before(&self) -> Option<&InlineSegment> {
        self.segments.last()
    }

    /// The closest non-text inline (link, line break, image) before the
    /// cursor in this block.
    pub fn nearest_non_text_inline(&self) -> Option<&InlineSegment> {
        self.segments.iter().rev().find(|segment| !segment.is_text())
    }

    /// Locate `text` in the plain-text run before the cursor.
    ///
    /// With `exact_match` the text has to end right at the cursor; otherwise
    /// the last occurrence is returned, which may be followed by other
    /// characters (e.g. trailing punctuation that was trimmed off a link).
    pub fn range_from_text(&self, text: &str, exact_match: bool) -> Option<TextRange> {
        if text.is_empty() {
            return None;
        }

        let (run_start, run) = self.trailing_text();
        let byte_idx = if exact_match {
            run.ends_with(text).then(|| run.len() - text.len())?
        } else {
            run.rfind(text)?
        };

        let start = run_start + run[..byte_idx].chars().count();
        Some(TextRange {
            block: self.block,
            start,
            end: start + text.chars().count(),
            text: SmolStr::new(text),
        })
    }
}

/// Builds a `ContentSearcher` segment by segment, tracking block offsets.
#[derive(Debug)]
pub struct ContentSearcherBuilder {
    block: BlockId,
    segments: Vec<InlineSegment>,
    offset: usize,
}

impl ContentSearcherBuilder {
    fn push(mut self, kind: SegmentKind, text: &str) -> Self {
        let segment = InlineSegment {
            kind,
            text: SmolStr::new(text),
            start: self.offset,
        };
        self.offset += segment.len_chars();
        self.segments.push(segment);
        self
    }

    pub fn text(self, text: &str) -> Self {
        if text.is_empty() {
            return self;
        }
        self.push(SegmentKind::Text, text)
    }

    pub fn link(self, text: &str, href: &str) -> Self {
        self.push(
            SegmentKind::Link {
                href: SmolStr::new(href),
            },
            text,
        )
    }

    pub fn line_break(self) -> Self {
        self.push(SegmentKind::LineBreak, "")
    }

    pub fn image(self) -> Self {
        self.push(SegmentKind::Image, "")
    }

    pub fn build(self) -> ContentSearcher {
        ContentSearcher {
            block: self.block,
            segments: self.segments,
            cursor: self.offset,
        }
    }
}
