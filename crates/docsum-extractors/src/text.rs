//! Plain-text decoding and normalization.
//!
//! Uploaded `.txt` files arrive in whatever encoding the author's editor
//! used. Decoding goes BOM first, then strict UTF-8, then single-byte
//! code pages; the last fallback always yields a string.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content_type::ContentType;
use crate::error::{ExtractError, ExtractResult};
use crate::types::ExtractedContent;
use crate::{non_empty, Extractor};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Bytes inspected by [`looks_like_text`].
const SNIFF_SAMPLE_SIZE: usize = 512;

/// Minimum share of printable bytes for [`looks_like_text`].
const MIN_PRINTABLE_RATIO: f64 = 0.8;

/// Encoding a text buffer was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8 with a byte-order mark.
    Utf8Bom,
    /// UTF-16 little-endian (BOM `FF FE`).
    Utf16Le,
    /// UTF-16 big-endian (BOM `FE FF`).
    Utf16Be,
    /// UTF-8 without a byte-order mark.
    Utf8,
    /// Windows-1252 code page.
    Windows1252,
    /// ISO-8859-1.
    Latin1,
    /// Lossy UTF-8, invalid sequences replaced.
    Lossy,
}

impl TextEncoding {
    /// Label used in extraction metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8Bom => "utf-8-bom",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Lossy => "lossy-utf-8",
        }
    }
}

/// Text together with the encoding it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl DecodedText {
    fn new(text: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            text: text.into(),
            encoding,
        }
    }
}

/// Detect a byte-order mark, in priority order UTF-8, UTF-16LE, UTF-16BE.
pub fn detect_bom(bytes: &[u8]) -> Option<TextEncoding> {
    if bytes.starts_with(UTF8_BOM) {
        Some(TextEncoding::Utf8Bom)
    } else if bytes.starts_with(UTF16_LE_BOM) {
        Some(TextEncoding::Utf16Le)
    } else if bytes.starts_with(UTF16_BE_BOM) {
        Some(TextEncoding::Utf16Be)
    } else {
        None
    }
}

fn decode_utf16(
    encoding: &'static Encoding,
    label: TextEncoding,
    payload: &[u8],
) -> ExtractResult<DecodedText> {
    if payload.len() == 1 {
        return Err(ExtractError::DecodeFailure(format!(
            "{} payload holds no complete code unit",
            label.as_str()
        )));
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(payload);
    if had_errors {
        debug!(encoding = label.as_str(), "replaced malformed code units");
    }
    Ok(DecodedText::new(text.into_owned(), label))
}

fn decode_windows_1252(bytes: &[u8]) -> Option<DecodedText> {
    WINDOWS_1252
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| DecodedText::new(text.into_owned(), TextEncoding::Windows1252))
}

fn decode_latin1(bytes: &[u8]) -> Option<DecodedText> {
    let text = encoding_rs::mem::decode_latin1(bytes);
    Some(DecodedText::new(text.into_owned(), TextEncoding::Latin1))
}

/// Decode raw bytes to text.
///
/// Malformed UTF-16 code units become U+FFFD. Only a BOM followed by a
/// single stray byte fails; every other input produces some string.
pub fn decode(bytes: &[u8]) -> ExtractResult<DecodedText> {
    match detect_bom(bytes) {
        Some(TextEncoding::Utf8Bom) => {
            let payload = &bytes[UTF8_BOM.len()..];
            return Ok(DecodedText::new(
                String::from_utf8_lossy(payload).into_owned(),
                TextEncoding::Utf8Bom,
            ));
        }
        Some(TextEncoding::Utf16Le) => {
            return decode_utf16(UTF_16LE, TextEncoding::Utf16Le, &bytes[UTF16_LE_BOM.len()..]);
        }
        Some(TextEncoding::Utf16Be) => {
            return decode_utf16(UTF_16BE, TextEncoding::Utf16Be, &bytes[UTF16_BE_BOM.len()..]);
        }
        _ => {}
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText::new(text, TextEncoding::Utf8));
    }

    // Windows-1252 maps every byte, so the Latin-1 and lossy branches are
    // only reached if that decoder ever starts rejecting input.
    let decoders: [fn(&[u8]) -> Option<DecodedText>; 2] = [decode_windows_1252, decode_latin1];
    let decoded = decoders
        .iter()
        .find_map(|decode| decode(bytes))
        .unwrap_or_else(|| {
            DecodedText::new(String::from_utf8_lossy(bytes).into_owned(), TextEncoding::Lossy)
        });
    Ok(decoded)
}

/// Report which encoding [`decode`] would use for `bytes`.
///
/// A BOM-marked payload reports its BOM encoding even when the payload
/// itself is malformed.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    if let Some(bom) = detect_bom(bytes) {
        return bom;
    }
    decode(bytes)
        .map(|decoded| decoded.encoding)
        .unwrap_or(TextEncoding::Lossy)
}

/// Normalize decoded text.
///
/// Converts `\r\n` and bare `\r` to `\n`, strips NUL characters, trims
/// every line, drops lines left empty and trims the result.
pub fn clean(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n").replace('\0', "");

    normalized
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Cheap binary-vs-text discriminator.
///
/// Samples up to the first 512 bytes and requires at least 80% of them to
/// be printable ASCII, tab, newline or carriage return. Empty input is not
/// text.
pub fn looks_like_text(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_SAMPLE_SIZE)];
    if sample.is_empty() {
        return false;
    }

    let printable = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
        .count();

    printable as f64 / sample.len() as f64 >= MIN_PRINTABLE_RATIO
}

/// Plain-text extractor.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create new plain-text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TextExtractor {
    fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        if content.is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let decoded = decode(content)?;
        debug!(
            encoding = decoded.encoding.as_str(),
            bytes = content.len(),
            "decoded plain text"
        );

        let text = non_empty(&clean(&decoded.text))?;

        Ok(ExtractedContent::new(text, ContentType::PlainText)
            .with_metadata("original_size", content.len())
            .with_metadata("encoding", decoded.encoding.as_str()))
    }

    fn content_type(&self) -> ContentType {
        ContentType::PlainText
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}
