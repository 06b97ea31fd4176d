//! Edit commands and their application to an [`EditorDocument`]

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::model::{
    delete_from_runs, insert_into_runs, normalize_runs, runs_in_range, split_off_runs, Block,
    BlockStyle, EditorDocument, RunStyle, TextRun,
};

/// Largest font size accepted by [`EditCommand::SetFontSize`]
pub const MAX_FONT_SIZE: u16 = 400;

/// A caret location: block index plus char offset within that block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A selection; `start` and `end` may be given in either order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Selection covering `[start, end)` of a single block
    pub fn within(block: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(block, start), Position::new(block, end))
    }

    fn ordered(&self) -> (Position, Position) {
        if self.end < self.start {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Mark {
    fn get(self, style: &RunStyle) -> bool {
        match self {
            Mark::Bold => style.bold,
            Mark::Italic => style.italic,
            Mark::Underline => style.underline,
        }
    }

    fn set(self, style: &mut RunStyle, on: bool) {
        match self {
            Mark::Bold => style.bold = on,
            Mark::Italic => style.italic = on,
            Mark::Underline => style.underline = on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingLevel {
    H1,
    H2,
}

impl HeadingLevel {
    fn style(self) -> BlockStyle {
        match self {
            HeadingLevel::H1 => BlockStyle::Heading1,
            HeadingLevel::H2 => BlockStyle::Heading2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    fn style(self) -> BlockStyle {
        match self {
            ListKind::Bullet => BlockStyle::BulletItem,
            ListKind::Ordered => BlockStyle::OrderedItem,
        }
    }
}

/// Inclusive block index range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpan {
    pub first: usize,
    pub last: usize,
}

impl BlockSpan {
    pub fn single(index: usize) -> Self {
        Self {
            first: index,
            last: index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditCommand {
    /// Newlines in `text` split the block
    InsertText { at: Position, text: String },
    DeleteRange { selection: Selection },
    /// Remove the whole block at `index`; the last remaining block is cleared instead
    DeleteBlock { index: usize },
    /// Adds the mark unless every selected char already has it
    ToggleMark { selection: Selection, mark: Mark },
    /// `None` clears the family
    SetFontFamily {
        selection: Selection,
        family: Option<String>,
    },
    /// `None` clears the size
    SetFontSize {
        selection: Selection,
        size: Option<u16>,
    },
    ToggleHeading { span: BlockSpan, level: HeadingLevel },
    ToggleList { span: BlockSpan, kind: ListKind },
    /// Inserts a rule directly after block `after`
    InsertHorizontalRule { after: usize },
}

impl EditCommand {
    pub fn apply(&self, doc: &mut EditorDocument) -> Result<(), EditorError> {
        match self {
            EditCommand::InsertText { at, text } => insert_text(doc, *at, text),
            EditCommand::DeleteRange { selection } => delete_range(doc, *selection),
            EditCommand::DeleteBlock { index } => delete_block(doc, *index),
            EditCommand::ToggleMark { selection, mark } => {
                let current: &EditorDocument = doc;
                let all_marked = segments(current, *selection)?
                    .into_iter()
                    .all(|(block, start, end)| {
                        every_char(current, block, start, end, |style| mark.get(style))
                    });
                style_range(doc, *selection, |style| mark.set(style, !all_marked))
            }
            EditCommand::SetFontFamily { selection, family } => {
                let family = match family.as_deref().map(str::trim) {
                    Some("") => {
                        return Err(EditorError::InvalidCommand(
                            "font family cannot be blank".to_string(),
                        ))
                    }
                    other => other.map(str::to_string),
                };
                style_range(doc, *selection, |style| style.font_family = family.clone())
            }
            EditCommand::SetFontSize { selection, size } => {
                if let Some(size) = size {
                    if *size == 0 || *size > MAX_FONT_SIZE {
                        return Err(EditorError::InvalidCommand(format!(
                            "font size must be between 1 and {}, got {}",
                            MAX_FONT_SIZE, size
                        )));
                    }
                }
                style_range(doc, *selection, |style| style.font_size = *size)
            }
            EditCommand::ToggleHeading { span, level } => {
                toggle_block_style(doc, *span, level.style())
            }
            EditCommand::ToggleList { span, kind } => toggle_block_style(doc, *span, kind.style()),
            EditCommand::InsertHorizontalRule { after } => {
                check_block(doc, *after)?;
                doc.blocks.insert(after + 1, Block::Rule);
                Ok(())
            }
        }
    }
}

fn invalid(position: Position) -> EditorError {
    EditorError::InvalidPosition {
        block: position.block,
        offset: position.offset,
    }
}

fn check_block(doc: &EditorDocument, index: usize) -> Result<(), EditorError> {
    if index < doc.blocks.len() {
        Ok(())
    } else {
        Err(invalid(Position::new(index, 0)))
    }
}

/// A position must land inside a text block, at most at its end
fn check_text_position(doc: &EditorDocument, position: Position) -> Result<(), EditorError> {
    match doc.blocks.get(position.block) {
        Some(block @ Block::Text { .. }) if position.offset <= block.len() => Ok(()),
        _ => Err(invalid(position)),
    }
}

fn text_runs(doc: &mut EditorDocument, index: usize) -> Option<&mut Vec<TextRun>> {
    match doc.blocks.get_mut(index) {
        Some(Block::Text { runs, .. }) => Some(runs),
        _ => None,
    }
}

fn insert_text(doc: &mut EditorDocument, at: Position, text: &str) -> Result<(), EditorError> {
    check_text_position(doc, at)?;
    let mut position = at;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            split_block(doc, position)?;
            position = Position::new(position.block + 1, 0);
        }
        let runs = text_runs(doc, position.block).ok_or_else(|| invalid(position))?;
        insert_into_runs(runs, position.offset, line);
        position.offset += line.chars().count();
    }
    Ok(())
}

fn split_block(doc: &mut EditorDocument, at: Position) -> Result<(), EditorError> {
    let (style, tail) = match doc.blocks.get_mut(at.block) {
        Some(Block::Text { style, runs }) => (*style, split_off_runs(runs, at.offset)),
        _ => return Err(invalid(at)),
    };
    doc.blocks
        .insert(at.block + 1, Block::Text { style, runs: tail });
    Ok(())
}

fn delete_range(doc: &mut EditorDocument, selection: Selection) -> Result<(), EditorError> {
    let (start, end) = selection.ordered();
    check_text_position(doc, start)?;
    check_text_position(doc, end)?;

    if start.block == end.block {
        if let Some(runs) = text_runs(doc, start.block) {
            delete_from_runs(runs, start.offset, end.offset);
        }
        return Ok(());
    }

    let tail = match text_runs(doc, end.block) {
        Some(runs) => split_off_runs(runs, end.offset),
        None => return Err(invalid(end)),
    };
    let runs = text_runs(doc, start.block).ok_or_else(|| invalid(start))?;
    let len: usize = runs.iter().map(|r| r.text.chars().count()).sum();
    delete_from_runs(runs, start.offset, len);
    runs.extend(tail);
    normalize_runs(runs);
    doc.blocks.drain(start.block + 1..=end.block);
    Ok(())
}

fn delete_block(doc: &mut EditorDocument, index: usize) -> Result<(), EditorError> {
    check_block(doc, index)?;
    doc.blocks.remove(index);
    if doc.blocks.is_empty() {
        doc.blocks.push(Block::paragraph(""));
    }
    Ok(())
}

/// Per text block `(index, start, end)` char ranges covered by a selection
fn segments(
    doc: &EditorDocument,
    selection: Selection,
) -> Result<Vec<(usize, usize, usize)>, EditorError> {
    let (start, end) = selection.ordered();
    check_text_position(doc, start)?;
    check_text_position(doc, end)?;

    let mut out = Vec::new();
    for index in start.block..=end.block {
        let block = &doc.blocks[index];
        if matches!(block, Block::Rule) {
            continue;
        }
        let from = if index == start.block { start.offset } else { 0 };
        let to = if index == end.block {
            end.offset
        } else {
            block.len()
        };
        if from < to {
            out.push((index, from, to));
        }
    }
    Ok(out)
}

fn every_char(
    doc: &EditorDocument,
    block: usize,
    start: usize,
    end: usize,
    predicate: impl Fn(&RunStyle) -> bool,
) -> bool {
    let Some(Block::Text { runs, .. }) = doc.blocks.get(block) else {
        return true;
    };
    let mut offset = 0;
    for run in runs {
        let len = run.text.chars().count();
        let overlaps = offset < end && start < offset + len;
        if overlaps && !predicate(&run.style) {
            return false;
        }
        offset += len;
    }
    true
}

fn style_range(
    doc: &mut EditorDocument,
    selection: Selection,
    mut update: impl FnMut(&mut RunStyle),
) -> Result<(), EditorError> {
    for (index, start, end) in segments(doc, selection)? {
        if let Some(runs) = text_runs(doc, index) {
            let range = runs_in_range(runs, start, end);
            for run in &mut runs[range] {
                update(&mut run.style);
            }
            normalize_runs(runs);
        }
    }
    Ok(())
}

/// Sets `target` on every text block in the span, or reverts them all to
/// paragraphs when every one already has it
fn toggle_block_style(
    doc: &mut EditorDocument,
    span: BlockSpan,
    target: BlockStyle,
) -> Result<(), EditorError> {
    let (first, last) = if span.last < span.first {
        (span.last, span.first)
    } else {
        (span.first, span.last)
    };
    check_block(doc, last)?;

    let all_set = doc.blocks[first..=last]
        .iter()
        .filter_map(Block::style)
        .all(|style| style == target);
    let next = if all_set { BlockStyle::Paragraph } else { target };
    for block in &mut doc.blocks[first..=last] {
        if let Block::Text { style, .. } = block {
            *style = next;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> EditorDocument {
        EditorDocument::from_plain_text(text)
    }

    fn run(cmd: EditCommand, doc: &mut EditorDocument) {
        cmd.apply(doc).unwrap();
    }

    #[test]
    fn test_insert_text_mid_block() {
        let mut d = doc("Hello world");
        run(
            EditCommand::InsertText {
                at: Position::new(0, 5),
                text: ",".into(),
            },
            &mut d,
        );
        assert_eq!(d.to_plain_text(), "Hello, world");
    }

    #[test]
    fn test_insert_newline_splits_block_and_keeps_style() {
        let mut d = EditorDocument::new(vec![Block::text(BlockStyle::BulletItem, "ab")]);
        run(
            EditCommand::InsertText {
                at: Position::new(0, 1),
                text: "x\ny\nz".into(),
            },
            &mut d,
        );
        assert_eq!(d.len(), 3);
        assert_eq!(d.to_plain_text(), "• ax\n• y\n• zb");
    }

    #[test]
    fn test_insert_rejects_out_of_range_positions() {
        let mut d = doc("abc");
        let past_end = EditCommand::InsertText {
            at: Position::new(0, 4),
            text: "x".into(),
        };
        assert!(matches!(
            past_end.apply(&mut d),
            Err(EditorError::InvalidPosition { block: 0, offset: 4 })
        ));
        let no_block = EditCommand::InsertText {
            at: Position::new(3, 0),
            text: "x".into(),
        };
        assert!(no_block.apply(&mut d).is_err());
        assert_eq!(d.to_plain_text(), "abc");
    }

    #[test]
    fn test_delete_range_joins_blocks() {
        let mut d = doc("first line\nmiddle\nlast line");
        run(
            EditCommand::DeleteRange {
                selection: Selection::new(Position::new(2, 4), Position::new(0, 5)),
            },
            &mut d,
        );
        assert_eq!(d.to_plain_text(), "first line");
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_delete_range_removes_rules_in_between() {
        let mut d = EditorDocument::new(vec![
            Block::paragraph("above"),
            Block::Rule,
            Block::paragraph("below"),
        ]);
        run(
            EditCommand::DeleteRange {
                selection: Selection::new(Position::new(0, 5), Position::new(2, 0)),
            },
            &mut d,
        );
        assert_eq!(d.blocks, vec![Block::paragraph("abovebelow")]);
    }

    #[test]
    fn test_toggle_mark_adds_then_removes() {
        let mut d = doc("make this bold");
        let cmd = EditCommand::ToggleMark {
            selection: Selection::within(0, 5, 9),
            mark: Mark::Bold,
        };
        run(cmd.clone(), &mut d);
        let bold = RunStyle {
            bold: true,
            ..Default::default()
        };
        assert_eq!(
            d.blocks[0],
            Block::Text {
                style: BlockStyle::Paragraph,
                runs: vec![
                    TextRun::plain("make "),
                    TextRun::styled("this", bold),
                    TextRun::plain(" bold"),
                ],
            }
        );

        run(cmd, &mut d);
        assert_eq!(d.blocks[0], Block::paragraph("make this bold"));
    }

    #[test]
    fn test_toggle_mark_partial_selection_marks_everything() {
        let mut d = doc("abcdef");
        run(
            EditCommand::ToggleMark {
                selection: Selection::within(0, 0, 3),
                mark: Mark::Italic,
            },
            &mut d,
        );
        run(
            EditCommand::ToggleMark {
                selection: Selection::within(0, 0, 6),
                mark: Mark::Italic,
            },
            &mut d,
        );
        let Block::Text { runs, .. } = &d.blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(runs.len(), 1);
        assert!(runs[0].style.italic);
    }

    #[test]
    fn test_font_family_and_size() {
        let mut d = doc("Heading text");
        run(
            EditCommand::SetFontFamily {
                selection: Selection::within(0, 0, 7),
                family: Some("Georgia".into()),
            },
            &mut d,
        );
        run(
            EditCommand::SetFontSize {
                selection: Selection::within(0, 0, 12),
                size: Some(18),
            },
            &mut d,
        );
        let Block::Text { runs, .. } = &d.blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].style.font_family.as_deref(), Some("Georgia"));
        assert_eq!(runs[0].style.font_size, Some(18));
        assert_eq!(runs[1].style.font_family, None);
        assert_eq!(runs[1].style.font_size, Some(18));

        run(
            EditCommand::SetFontFamily {
                selection: Selection::within(0, 0, 12),
                family: None,
            },
            &mut d,
        );
        let Block::Text { runs, .. } = &d.blocks[0] else {
            panic!("expected text block");
        };
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_font_size_bounds() {
        let mut d = doc("x");
        let cmd = EditCommand::SetFontSize {
            selection: Selection::within(0, 0, 1),
            size: Some(0),
        };
        assert!(matches!(cmd.apply(&mut d), Err(EditorError::InvalidCommand(_))));
        let blank = EditCommand::SetFontFamily {
            selection: Selection::within(0, 0, 1),
            family: Some("  ".into()),
        };
        assert!(blank.apply(&mut d).is_err());
    }

    #[test]
    fn test_toggle_heading_and_lists() {
        let mut d = doc("Title\nitem one\nitem two");
        run(
            EditCommand::ToggleHeading {
                span: BlockSpan::single(0),
                level: HeadingLevel::H1,
            },
            &mut d,
        );
        run(
            EditCommand::ToggleList {
                span: BlockSpan { first: 1, last: 2 },
                kind: ListKind::Ordered,
            },
            &mut d,
        );
        assert_eq!(d.blocks[0].style(), Some(BlockStyle::Heading1));
        assert_eq!(d.to_plain_text(), "Title\n1. item one\n2. item two");

        run(
            EditCommand::ToggleList {
                span: BlockSpan { first: 1, last: 2 },
                kind: ListKind::Ordered,
            },
            &mut d,
        );
        assert_eq!(d.to_plain_text(), "Title\nitem one\nitem two");

        run(
            EditCommand::ToggleHeading {
                span: BlockSpan::single(0),
                level: HeadingLevel::H2,
            },
            &mut d,
        );
        assert_eq!(d.blocks[0].style(), Some(BlockStyle::Heading2));
    }

    #[test]
    fn test_horizontal_rule_and_block_delete() {
        let mut d = doc("one\ntwo");
        run(EditCommand::InsertHorizontalRule { after: 0 }, &mut d);
        assert_eq!(d.blocks[1], Block::Rule);
        run(EditCommand::DeleteBlock { index: 1 }, &mut d);
        assert_eq!(d.to_plain_text(), "one\ntwo");

        assert!(EditCommand::InsertHorizontalRule { after: 5 }
            .apply(&mut d)
            .is_err());

        let mut single = doc("only");
        run(EditCommand::DeleteBlock { index: 0 }, &mut single);
        assert_eq!(single.blocks, vec![Block::paragraph("")]);
    }

    #[test]
    fn test_positions_inside_rules_are_invalid() {
        let mut d = EditorDocument::new(vec![Block::Rule]);
        let cmd = EditCommand::InsertText {
            at: Position::new(0, 0),
            text: "x".into(),
        };
        assert!(cmd.apply(&mut d).is_err());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd = EditCommand::ToggleMark {
            selection: Selection::within(0, 1, 2),
            mark: Mark::Underline,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "toggle_mark");
        assert_eq!(json["mark"], "underline");
        let back: EditCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }
}
