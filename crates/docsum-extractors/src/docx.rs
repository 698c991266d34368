//! DOCX content extraction using zip and quick-xml.
//!
//! The main document part is walked event by event so that paragraphs and
//! tables keep their original interleaving. Element kinds the renderer has
//! no use for (section properties, bookmarks, content controls at body
//! level) are skipped without error.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::content_type::ContentType;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{DocumentStructure, ExtractedContent};
use crate::{non_empty, Extractor};

/// Archive entry holding the document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the decompressed size of the document part (64 MiB).
const DEFAULT_MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

/// Smallest inline unit of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Run {
    Text(String),
    Tab,
    Break,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Paragraph {
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Table {
    pub rows: Vec<TableRow>,
}

/// Top-level element of the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Paragraph {
    fn render_into(&self, out: &mut String) {
        for run in &self.runs {
            match run {
                Run::Text(text) => out.push_str(text),
                Run::Tab => out.push('\t'),
                Run::Break => out.push('\n'),
            }
        }
    }
}

impl TableCell {
    /// Cell paragraphs concatenated without separator, trimmed.
    fn text(&self) -> String {
        let mut out = String::new();
        for paragraph in &self.paragraphs {
            paragraph.render_into(&mut out);
        }
        out.trim().to_string()
    }
}

impl Table {
    fn render_into(&self, out: &mut String) {
        for row in &self.rows {
            let cells: Vec<String> = row
                .cells
                .iter()
                .map(TableCell::text)
                .filter(|text| !text.is_empty())
                .collect();
            if cells.is_empty() {
                continue;
            }
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
    }
}

/// Render blocks in document order, one newline after each block.
pub(crate) fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => paragraph.render_into(&mut out),
            Block::Table(table) => table.render_into(&mut out),
        }
        out.push('\n');
    }
    out
}

type XmlReader<'a> = Reader<&'a [u8]>;

fn xml_error(err: quick_xml::Error) -> ExtractError {
    ExtractError::corrupt_with("DOCX", "malformed document.xml", err)
}

/// Next event, treating end of input as truncation: callers only ask while
/// inside an open element.
fn next_event<'a>(reader: &mut XmlReader<'a>) -> ExtractResult<Event<'a>> {
    match reader.read_event().map_err(xml_error)? {
        Event::Eof => Err(ExtractError::corrupt(
            "DOCX",
            "unexpected end of document.xml",
        )),
        event => Ok(event),
    }
}

fn skip(reader: &mut XmlReader<'_>, start: &BytesStart<'_>) -> ExtractResult<()> {
    reader.read_to_end(start.name()).map_err(xml_error)?;
    Ok(())
}

/// Property containers (`pPr`, `rPr`, `tblPr`, `tcPr`, ...) carry no text.
fn is_properties(name: &[u8]) -> bool {
    name.ends_with(b"Pr")
}

/// Parse the document part into its ordered block sequence.
pub(crate) fn parse_document(xml: &[u8]) -> ExtractResult<Vec<Block>> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => {
                return parse_body(&mut reader);
            }
            Event::Eof => return Ok(Vec::new()),
            _ => {}
        }
    }
}

fn parse_body(reader: &mut XmlReader<'_>) -> ExtractResult<Vec<Block>> {
    let mut blocks = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(parse_paragraph(reader)?)),
                b"tbl" => blocks.push(Block::Table(parse_table(reader)?)),
                other => {
                    trace!(element = %String::from_utf8_lossy(other), "skipping body element");
                    skip(reader, &e)?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                blocks.push(Block::Paragraph(Paragraph::default()));
            }
            Event::End(_) => return Ok(blocks),
            _ => {}
        }
    }
}

/// Parse a paragraph. Runs nested in inline containers (hyperlinks,
/// tracked insertions, smart tags) are kept in order. Tracked deletions
/// and move sources are dropped; the moved text appears at `moveTo`.
fn parse_paragraph(reader: &mut XmlReader<'_>) -> ExtractResult<Paragraph> {
    let mut paragraph = Paragraph::default();
    let mut depth = 0usize;

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => paragraph.runs.extend(parse_run(reader)?),
                b"del" | b"moveFrom" => skip(reader, &e)?,
                name if is_properties(name) => skip(reader, &e)?,
                _ => depth += 1,
            },
            Event::End(_) => {
                if depth == 0 {
                    return Ok(paragraph);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
}

fn parse_run(reader: &mut XmlReader<'_>) -> ExtractResult<Vec<Run>> {
    let mut runs = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => {
                    let text = read_text(reader)?;
                    if !text.is_empty() {
                        runs.push(Run::Text(text));
                    }
                }
                b"tab" => {
                    skip(reader, &e)?;
                    runs.push(Run::Tab);
                }
                b"br" | b"cr" => {
                    skip(reader, &e)?;
                    runs.push(Run::Break);
                }
                _ => skip(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => runs.push(Run::Tab),
                b"br" | b"cr" => runs.push(Run::Break),
                _ => {}
            },
            Event::End(_) => return Ok(runs),
            _ => {}
        }
    }
}

fn read_text(reader: &mut XmlReader<'_>) -> ExtractResult<String> {
    let mut text = String::new();

    loop {
        match next_event(reader)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(xml_error)?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => skip(reader, &e)?,
            Event::End(_) => return Ok(text),
            _ => {}
        }
    }
}

fn parse_table(reader: &mut XmlReader<'_>) -> ExtractResult<Table> {
    let mut table = Table::default();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => table.rows.push(parse_row(reader)?),
                _ => skip(reader, &e)?,
            },
            Event::End(_) => return Ok(table),
            _ => {}
        }
    }
}

fn parse_row(reader: &mut XmlReader<'_>) -> ExtractResult<TableRow> {
    let mut row = TableRow::default();

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tc" => row.cells.push(parse_cell(reader)?),
                _ => skip(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"tc" => {
                row.cells.push(TableCell::default());
            }
            Event::End(_) => return Ok(row),
            _ => {}
        }
    }
}

/// Parse a table cell. Paragraphs of nested tables are flattened into the
/// enclosing cell.
fn parse_cell(reader: &mut XmlReader<'_>) -> ExtractResult<TableCell> {
    let mut cell = TableCell::default();
    let mut depth = 0usize;

    loop {
        match next_event(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => cell.paragraphs.push(parse_paragraph(reader)?),
                name if is_properties(name) => skip(reader, &e)?,
                _ => depth += 1,
            },
            Event::End(_) => {
                if depth == 0 {
                    return Ok(cell);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
}

/// DOCX content extractor.
#[derive(Debug, Clone)]
pub struct DocxExtractor {
    /// Maximum decompressed size accepted for the document part.
    max_part_size: u64,
}

impl DocxExtractor {
    /// Create new DOCX extractor with default settings.
    pub fn new() -> Self {
        Self {
            max_part_size: DEFAULT_MAX_PART_SIZE,
        }
    }

    /// Configure the maximum decompressed size of the document part.
    pub fn with_max_part_size(mut self, bytes: u64) -> Self {
        self.max_part_size = bytes;
        self
    }

    /// Read the document part out of the archive.
    fn read_document_part(&self, content: &[u8]) -> ExtractResult<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(content))
            .map_err(|e| ExtractError::corrupt_with("DOCX", "not a valid ZIP archive", e))?;

        let entry = match archive.by_name(DOCUMENT_PART) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ExtractError::MissingRequiredPart(DOCUMENT_PART.to_string()))
            }
            Err(e) => {
                return Err(ExtractError::corrupt_with(
                    "DOCX",
                    "failed to open document.xml",
                    e,
                ))
            }
        };

        let mut xml = Vec::new();
        entry
            .take(self.max_part_size + 1)
            .read_to_end(&mut xml)
            .map_err(|e| ExtractError::corrupt_with("DOCX", "failed to read document.xml", e))?;

        if xml.len() as u64 > self.max_part_size {
            return Err(ExtractError::corrupt(
                "DOCX",
                format!(
                    "document.xml exceeds {} bytes when decompressed",
                    self.max_part_size
                ),
            ));
        }

        Ok(xml)
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DocxExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let xml = self.read_document_part(content)?;
        let blocks = parse_document(&xml)?;
        debug!(blocks = blocks.len(), "parsed DOCX body");

        let text = non_empty(&render(&blocks))?;

        let structure = DocumentStructure {
            block_count: Some(blocks.len()),
            ..Default::default()
        };

        Ok(ExtractedContent::new(text, ContentType::Docx)
            .with_structure(structure)
            .with_metadata("original_size", content.len()))
    }

    fn content_type(&self) -> ContentType {
        ContentType::Docx
    }

    fn name(&self) -> &str {
        "docx-xml"
    }
}
