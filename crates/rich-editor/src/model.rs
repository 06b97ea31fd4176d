//! Structured rich text document
//!
//! A document is an ordered list of blocks. Text blocks carry a block style
//! (paragraph, heading, list item) and a run list; each run is a slice of text
//! with uniform character formatting. Offsets are counted in `char`s.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// Serialization format version written into every saved document
pub const DOCUMENT_VERSION: u32 = 1;

/// Text emitted for a horizontal rule when flattening to plain text
pub const RULE_TEXT: &str = "----------";

fn is_false(value: &bool) -> bool {
    !*value
}

fn current_version() -> u32 {
    DOCUMENT_VERSION
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStyle {
    #[default]
    Paragraph,
    Heading1,
    Heading2,
    BulletItem,
    OrderedItem,
}

/// Character formatting shared by every char of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStyle {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Point size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(flatten)]
    pub style: RunStyle,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text {
        #[serde(default)]
        style: BlockStyle,
        #[serde(default)]
        runs: Vec<TextRun>,
    },
    Rule,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text(BlockStyle::Paragraph, text)
    }

    pub fn text(style: BlockStyle, text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![TextRun::plain(text)]
        };
        Block::Text { style, runs }
    }

    /// Concatenated run text; empty for rules
    pub fn plain_text(&self) -> String {
        match self {
            Block::Text { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
            Block::Rule => String::new(),
        }
    }

    /// Length in chars; rules have length zero
    pub fn len(&self) -> usize {
        match self {
            Block::Text { runs, .. } => runs.iter().map(TextRun::char_len).sum(),
            Block::Rule => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn style(&self) -> Option<BlockStyle> {
        match self {
            Block::Text { style, .. } => Some(*style),
            Block::Rule => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    pub blocks: Vec<Block>,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            blocks: vec![Block::paragraph("")],
        }
    }
}

impl EditorDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self {
            version: DOCUMENT_VERSION,
            blocks,
        };
        doc.normalize();
        doc
    }

    /// One paragraph per line; an empty string yields a single empty paragraph
    pub fn from_plain_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| Block::paragraph(line.strip_suffix('\r').unwrap_or(line)))
            .collect();
        Self::new(blocks)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let mut doc: EditorDocument = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Flatten to plain text, one line per block
    ///
    /// Bullet items are prefixed with "• ", ordered items are numbered within
    /// each consecutive run of ordered items, and rules become a dashed line.
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.blocks.len());
        let mut ordinal = 0usize;
        for block in &self.blocks {
            match block {
                Block::Text { style, .. } => {
                    let text = block.plain_text();
                    if *style == BlockStyle::OrderedItem {
                        ordinal += 1;
                        lines.push(format!("{}. {}", ordinal, text));
                        continue;
                    }
                    ordinal = 0;
                    match style {
                        BlockStyle::BulletItem => lines.push(format!("• {}", text)),
                        _ => lines.push(text),
                    }
                }
                Block::Rule => {
                    ordinal = 0;
                    lines.push(RULE_TEXT.to_string());
                }
            }
        }
        lines.join("\n")
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    /// Merge adjacent runs with equal style, drop empty runs, and keep at
    /// least one block so there is always somewhere to type.
    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            if let Block::Text { runs, .. } = block {
                normalize_runs(runs);
            }
        }
        if self.blocks.is_empty() {
            self.blocks.push(Block::paragraph(""));
        }
    }
}

pub(crate) fn normalize_runs(runs: &mut Vec<TextRun>) {
    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    *runs = merged;
}

/// Byte index of the `offset`-th char of `text`
fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Ensure a run boundary at `offset` and return the index of the first run
/// starting there (may be `runs.len()` when `offset` is the end).
pub(crate) fn split_runs_at(runs: &mut Vec<TextRun>, offset: usize) -> usize {
    let mut start = 0;
    for i in 0..runs.len() {
        let len = runs[i].char_len();
        if offset == start {
            return i;
        }
        if offset < start + len {
            let at = byte_index(&runs[i].text, offset - start);
            let tail = runs[i].text.split_off(at);
            let style = runs[i].style.clone();
            runs.insert(i + 1, TextRun::styled(tail, style));
            return i + 1;
        }
        start += len;
    }
    runs.len()
}

/// Insert `text` at `offset`, inheriting the style of the char before it
pub(crate) fn insert_into_runs(runs: &mut Vec<TextRun>, offset: usize, text: &str) {
    if text.is_empty() {
        return;
    }
    let index = split_runs_at(runs, offset);
    let style = if index > 0 {
        runs[index - 1].style.clone()
    } else {
        runs.first().map(|r| r.style.clone()).unwrap_or_default()
    };
    runs.insert(index, TextRun::styled(text, style));
    normalize_runs(runs);
}

/// Remove chars in `[start, end)`
pub(crate) fn delete_from_runs(runs: &mut Vec<TextRun>, start: usize, end: usize) {
    if start >= end {
        return;
    }
    let first = split_runs_at(runs, start);
    let last = split_runs_at(runs, end);
    runs.drain(first..last);
    normalize_runs(runs);
}

/// Split runs at `offset`, returning the tail
pub(crate) fn split_off_runs(runs: &mut Vec<TextRun>, offset: usize) -> Vec<TextRun> {
    let index = split_runs_at(runs, offset);
    let tail = runs.split_off(index);
    normalize_runs(runs);
    tail
}

/// Runs fully inside `[start, end)` after splitting at both ends
pub(crate) fn runs_in_range(
    runs: &mut Vec<TextRun>,
    start: usize,
    end: usize,
) -> std::ops::Range<usize> {
    let first = split_runs_at(runs, start);
    let last = split_runs_at(runs, end);
    first..last
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bold() -> RunStyle {
        RunStyle {
            bold: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_text_import_one_paragraph_per_line() {
        let doc = EditorDocument::from_plain_text("Title\n\nBody line");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks[0].plain_text(), "Title");
        assert!(doc.blocks[1].is_empty());
        assert_eq!(doc.to_plain_text(), "Title\n\nBody line");
    }

    #[test]
    fn test_empty_text_gives_one_empty_paragraph() {
        let doc = EditorDocument::from_plain_text("");
        assert_eq!(doc.blocks, vec![Block::paragraph("")]);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_list_numbering_restarts_after_other_blocks() {
        let doc = EditorDocument::new(vec![
            Block::text(BlockStyle::OrderedItem, "one"),
            Block::text(BlockStyle::OrderedItem, "two"),
            Block::Rule,
            Block::text(BlockStyle::OrderedItem, "again"),
            Block::text(BlockStyle::BulletItem, "dot"),
            Block::text(BlockStyle::Heading1, "Heading"),
        ]);
        assert_eq!(
            doc.to_plain_text(),
            format!("1. one\n2. two\n{}\n1. again\n• dot\nHeading", RULE_TEXT)
        );
    }

    #[test]
    fn test_normalize_merges_equal_runs() {
        let doc = EditorDocument::new(vec![Block::Text {
            style: BlockStyle::Paragraph,
            runs: vec![
                TextRun::plain("a"),
                TextRun::plain(""),
                TextRun::plain("b"),
                TextRun::styled("c", bold()),
                TextRun::styled("d", bold()),
            ],
        }]);
        assert_eq!(
            doc.blocks[0],
            Block::Text {
                style: BlockStyle::Paragraph,
                runs: vec![TextRun::plain("ab"), TextRun::styled("cd", bold())],
            }
        );
    }

    #[test]
    fn test_split_runs_handles_multibyte_chars() {
        let mut runs = vec![TextRun::plain("₦500 é")];
        let index = split_runs_at(&mut runs, 1);
        assert_eq!(index, 1);
        assert_eq!(runs[0].text, "₦");
        assert_eq!(runs[1].text, "500 é");
        assert_eq!(split_runs_at(&mut runs, 6), 2);
    }

    #[test]
    fn test_insert_inherits_preceding_style() {
        let mut runs = vec![TextRun::styled("Bold", bold()), TextRun::plain(" plain")];
        insert_into_runs(&mut runs, 4, "er");
        assert_eq!(runs[0], TextRun::styled("Bolder", bold()));
        assert_eq!(runs[1], TextRun::plain(" plain"));
    }

    #[test]
    fn test_delete_across_runs() {
        let mut runs = vec![
            TextRun::plain("abc"),
            TextRun::styled("def", bold()),
            TextRun::plain("ghi"),
        ];
        delete_from_runs(&mut runs, 2, 7);
        assert_eq!(runs, vec![TextRun::plain("abhi")]);
    }

    #[test]
    fn test_json_shape() {
        let doc = EditorDocument::new(vec![
            Block::Text {
                style: BlockStyle::Heading1,
                runs: vec![TextRun::styled("Lease", bold())],
            },
            Block::Rule,
        ]);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "blocks": [
                    { "type": "text", "style": "heading1", "runs": [{ "text": "Lease", "bold": true }] },
                    { "type": "rule" }
                ]
            })
        );
    }

    #[test]
    fn test_from_json_rejects_non_documents() {
        assert!(EditorDocument::from_json("{}").is_err());
        assert!(EditorDocument::from_json("plain words").is_err());
        assert!(EditorDocument::from_json(r#"{"blocks": []}"#).is_ok());
    }
}
