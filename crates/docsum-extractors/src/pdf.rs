//! PDF content extraction using lopdf.
//!
//! Extraction is best-effort per page: a missing page object or a page
//! whose content stream cannot be decoded is skipped, and the remaining
//! pages still produce text.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::content_type::ContentType;
use crate::error::{ExtractError, ExtractResult};
use crate::types::{DocumentStructure, ExtractedContent};
use crate::{non_empty, Extractor};

/// Outcome of reading a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageText {
    /// Text recovered from the page (possibly empty).
    Text(String),
    /// The page object is absent or not a dictionary.
    Missing,
    /// The page exists but its text could not be extracted.
    Failed(String),
}

/// Page-addressable view of a PDF.
///
/// Page numbers are 1-based.
pub(crate) trait PageSource {
    /// Number of pages the document declares.
    fn page_count(&self) -> u32;

    /// Read the text of one page.
    fn page_text(&self, page_number: u32) -> PageText;
}

/// Walk pages 1..=page_count, keeping the text of every readable page.
///
/// A page whose text is blank counts as unreadable: lopdf reports a page
/// with an undecodable content stream as empty text, not as an error.
pub(crate) fn collect_pages<S: PageSource + ?Sized>(source: &S) -> Vec<(u32, String)> {
    let mut pages = Vec::new();

    for page_number in 1..=source.page_count() {
        match source.page_text(page_number) {
            PageText::Text(text) if text.trim().is_empty() => {
                debug!(page = page_number, "skipping PDF page without text");
            }
            PageText::Text(text) => pages.push((page_number, text)),
            PageText::Missing => {
                debug!(page = page_number, "skipping missing PDF page");
            }
            PageText::Failed(reason) => {
                debug!(page = page_number, %reason, "skipping unreadable PDF page");
            }
        }
    }

    pages
}

/// [`PageSource`] backed by a parsed `lopdf::Document`.
struct LopdfPages {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfPages {
    fn load(content: &[u8]) -> ExtractResult<Self> {
        let loaded = catch_unwind(AssertUnwindSafe(|| Document::load_mem(content)))
            .map_err(|_| ExtractError::corrupt("PDF", "PDF parser panicked"))?;
        let doc = loaded.map_err(|e| {
            ExtractError::corrupt("PDF", format!("failed to parse PDF structure: {}", e))
        })?;

        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> u32 {
        self.pages.keys().next_back().copied().unwrap_or(0)
    }

    fn page_text(&self, page_number: u32) -> PageText {
        let Some(&page_id) = self.pages.get(&page_number) else {
            return PageText::Missing;
        };
        if self.doc.get_dictionary(page_id).is_err() {
            return PageText::Missing;
        }

        match catch_unwind(AssertUnwindSafe(|| self.doc.extract_text(&[page_number]))) {
            Ok(Ok(text)) => PageText::Text(text),
            Ok(Err(e)) => PageText::Failed(e.to_string()),
            Err(_) => PageText::Failed("text extraction panicked".to_string()),
        }
    }
}

/// PDF content extractor using the lopdf library.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    fn render<S: PageSource + ?Sized>(source: &S) -> ExtractResult<ExtractedContent> {
        let pages = collect_pages(source);

        let mut text = String::new();
        for (_, page) in &pages {
            text.push_str(page);
            text.push('\n');
        }
        let text = non_empty(&text)?;

        let structure = DocumentStructure {
            page_count: Some(source.page_count() as usize),
            pages: pages.into_iter().map(|(_, page)| page).collect(),
            block_count: None,
        };

        Ok(ExtractedContent::new(text, ContentType::Pdf).with_structure(structure))
    }
}

impl Extractor for PdfExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let source = LopdfPages::load(content)?;
        debug!(pages = source.page_count(), "opened PDF");

        Ok(Self::render(&source)?.with_metadata("original_size", content.len()))
    }

    fn content_type(&self) -> ContentType {
        ContentType::Pdf
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    struct FakePages(Vec<PageText>);

    impl PageSource for FakePages {
        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn page_text(&self, page_number: u32) -> PageText {
            self.0[(page_number - 1) as usize].clone()
        }
    }

    /// Build a minimal PDF with one text line per page.
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let pages: Vec<Option<&str>> = lines.iter().copied().map(Some).collect();
        build_pdf_pages(&pages)
    }

    /// Like [`build_pdf`], but a `None` page points its `Contents` at an
    /// object that does not exist.
    fn build_pdf_pages(lines: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let Some(line) = line else {
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => Object::Reference((9999, 0)),
                });
                kids.push(page_id.into());
                continue;
            };
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => lines.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_unreadable_page_is_skipped() {
        let source = FakePages(vec![
            PageText::Text("Invoice 2024-001".to_string()),
            PageText::Failed("bad content stream".to_string()),
            PageText::Text("Total due: 120 EUR".to_string()),
        ]);

        let extracted = PdfExtractor::render(&source).unwrap();
        assert_eq!(extracted.text, "Invoice 2024-001\nTotal due: 120 EUR");

        let structure = extracted.structure.unwrap();
        assert_eq!(structure.page_count, Some(3));
        assert_eq!(structure.pages.len(), 2);
    }

    #[test]
    fn test_missing_page_is_skipped() {
        let source = FakePages(vec![PageText::Missing, PageText::Text("only page".into())]);
        let pages = collect_pages(&source);
        assert_eq!(pages, vec![(2, "only page".to_string())]);
    }

    #[test]
    fn test_all_pages_unreadable_is_empty_content() {
        let source = FakePages(vec![
            PageText::Failed("x".into()),
            PageText::Missing,
            PageText::Text("  \n ".into()),
        ]);
        let result = PdfExtractor::render(&source);
        assert!(matches!(result, Err(ExtractError::EmptyContent)));
    }

    #[test]
    fn test_extract_real_pdf() {
        let bytes = build_pdf(&["Hello World", "Second page"]);
        let extracted = PdfExtractor::new().extract(&bytes).unwrap();

        assert!(extracted.text.contains("Hello World"));
        assert!(extracted.text.contains("Second page"));
        assert_eq!(extracted.content_type, ContentType::Pdf);
        assert_eq!(extracted.structure.unwrap().page_count, Some(2));
    }

    #[test]
    fn test_blank_page_is_not_recorded() {
        let source = FakePages(vec![
            PageText::Text("first\n".into()),
            PageText::Text(String::new()),
            PageText::Text("third\n".into()),
        ]);
        let pages = collect_pages(&source);
        assert_eq!(
            pages,
            vec![(1, "first\n".to_string()), (3, "third\n".to_string())]
        );
    }

    #[test]
    fn test_broken_content_stream_page_is_skipped() {
        let bytes = build_pdf_pages(&[Some("Page one"), None, Some("Page three")]);
        let extracted = PdfExtractor::new().extract(&bytes).unwrap();

        assert!(extracted.text.starts_with("Page one"));
        assert!(extracted.text.ends_with("Page three"));
        assert!(!extracted.text.contains("\n\n\n"));

        let structure = extracted.structure.unwrap();
        assert_eq!(structure.page_count, Some(3));
        assert_eq!(structure.pages.len(), 2);
        assert!(structure.pages.iter().all(|page| !page.trim().is_empty()));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let bytes = build_pdf(&["Quarterly report"]);
        let extractor = PdfExtractor::new();
        let first = extractor.extract(&bytes).unwrap();
        let second = extractor.extract(&bytes).unwrap();
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_garbage_is_corrupt_container() {
        let result = PdfExtractor::new().extract(b"this is not a pdf at all");
        let err = result.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptContainer);
    }

    #[test]
    fn test_empty_bytes_is_corrupt_container() {
        let err = PdfExtractor::new().extract(&[]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptContainer);
    }
}
