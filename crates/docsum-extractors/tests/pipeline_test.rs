//! End-to-end extraction through the default pipeline.
//!
//! Builds small documents in memory, resolves their type the way an upload
//! would, and checks the normalized output.

use std::io::{Cursor, Write};

use docsum_extractors::{ContentType, ErrorKind, ExtractError, ExtractionPipeline, RawInput};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn docx(body: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_docx_upload_with_generic_header() {
    let pipeline = ExtractionPipeline::with_defaults();
    let input = RawInput::new(
        docx(
            "<w:p><w:r><w:t>Invoice #42</w:t></w:r></w:p>\
             <w:tbl><w:tr>\
             <w:tc><w:p><w:r><w:t>Amount</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>99.50</w:t></w:r></w:p></w:tc>\
             </w:tr></w:tbl>",
        ),
        "invoice.docx",
        "application/octet-stream",
    );

    let extracted = pipeline.extract_input(&input).unwrap();
    assert_eq!(extracted.text, "Invoice #42\nAmount | 99.50");
    assert_eq!(extracted.content_type, ContentType::Docx);
    assert_eq!(extracted.structure.unwrap().block_count, Some(2));
}

#[test]
fn test_legacy_doc_is_rejected_before_parsing() {
    let pipeline = ExtractionPipeline::with_defaults();
    let input = RawInput::new(
        b"\xD0\xCF\x11\xE0 not really OLE".to_vec(),
        "old.doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    );

    let err = pipeline.extract_input(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(err.suggestion().unwrap().contains(".docx"));
}

#[test]
fn test_pdf_named_garbage_is_wrapped_corrupt_container() {
    let pipeline = ExtractionPipeline::with_defaults();
    let input = RawInput::new(b"%PDF-1.4 truncated".to_vec(), "scan.pdf", "");

    let err = pipeline.extract_input(&input).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::ExtractionFailed {
            format: ContentType::Pdf,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::CorruptContainer);
}

#[test]
fn test_docx_without_body_part() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("docProps/core.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<coreProperties/>").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let pipeline = ExtractionPipeline::with_defaults();
    let err = pipeline.extract(&bytes, "application/docx").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredPart);
}

#[test]
fn test_utf16_text_upload() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "Zahlung: 120,00 €\r\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let pipeline = ExtractionPipeline::with_defaults();
    let extracted = pipeline.extract(&bytes, "text/plain").unwrap();
    assert_eq!(extracted.text, "Zahlung: 120,00 €");
    assert_eq!(extracted.metadata["encoding"], "utf-16le");
}

#[test]
fn test_empty_upload_is_empty_content() {
    let pipeline = ExtractionPipeline::with_defaults();
    let err = pipeline.extract(&[], "text/plain").unwrap_err();
    assert!(matches!(err, ExtractError::EmptyContent));
}
