//! Stored document content to downloadable formats
//!
//! PDF output is plain Helvetica text on US Letter pages, built directly
//! with lopdf. Content is flattened through the rich editor first, so
//! headings, list markers and rules come out as text.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use shared_types::DownloadFormat;

use crate::error::ApiError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 15;
/// Helvetica at 11pt averages roughly this many chars per 6.5in line
const WRAP_COLUMNS: usize = 90;

/// Render `content` (editor JSON or plain text) into `format`
pub fn convert_content(
    title: &str,
    content: &str,
    format: DownloadFormat,
) -> Result<Vec<u8>, ApiError> {
    match format {
        DownloadFormat::Pdf => {
            let text = rich_editor::content_to_plain_text(content);
            render_pdf(title, &text)
        }
        DownloadFormat::Docx => Err(ApiError::UnsupportedFormat(format)),
    }
}

fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize
}

/// Greedy word wrap; words longer than a line are hard-split
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let split: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            out.push(split);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Encode for the standard fonts' WinAnsiEncoding; unmapped chars become '?'
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .flat_map(|c| -> Vec<u8> {
            match c {
                c if c.is_ascii() => vec![c as u8],
                '€' => vec![0x80],
                '‘' => vec![0x91],
                '’' => vec![0x92],
                '“' => vec![0x93],
                '”' => vec![0x94],
                '•' => vec![0x95],
                '–' => vec![0x96],
                '—' => vec![0x97],
                '₦' => b"NGN ".to_vec(),
                c if (c as u32) >= 0xA0 && (c as u32) <= 0xFF => vec![c as u32 as u8],
                _ => vec![b'?'],
            }
        })
        .collect()
}

pub fn render_pdf(title: &str, text: &str) -> Result<Vec<u8>, ApiError> {
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap_line(line, WRAP_COLUMNS))
        .collect();
    let per_page = lines_per_page();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(per_page).collect()
    };

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut page_ids = Vec::with_capacity(pages.len());
    for page_lines in &pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(FONT_SIZE)],
            ),
            Operation::new("TL", vec![Object::Integer(LEADING)]),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(MARGIN),
                    Object::Integer(PAGE_HEIGHT - MARGIN),
                ],
            ),
        ];
        for line in page_lines.iter() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|e| ApiError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH),
                    Object::Integer(PAGE_HEIGHT),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        page_ids.push(page_id);
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let info_id = doc.add_object(Dictionary::from_iter(vec![(
        "Title",
        Object::String(to_win_ansi(title), StringFormat::Literal),
    )]));
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ApiError::Pdf(e.to_string()))?;
    Ok(buffer)
}
