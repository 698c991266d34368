//! Analysis prompt construction.

/// Default number of characters of document text sent to the model.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Marker appended when the document text was cut.
const TRUNCATION_MARKER: &str = "...";

/// Keep the first `max_chars` characters of `text`, appending `...` if
/// anything was dropped. Never splits a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Build the analysis prompt for a document.
pub fn build_prompt(text: &str, max_chars: usize) -> String {
    let text = truncate_chars(text, max_chars);

    format!(
        r#"Analyze the following document and provide a structured response in JSON format only.

Document text:
{text}

Respond ONLY with a valid JSON object (no markdown, no code blocks) with the following structure:
{{
  "summary": "A concise 2-3 sentence summary of the document",
  "document_type": "The type of document (invoice, cv, resume, report, letter, contract, memo, email, etc.)",
  "metadata": {{
    "date": "Extracted date if found (format: YYYY-MM-DD) or null",
    "sender": "Sender name if found or null",
    "recipient": "Recipient name if found or null",
    "amount": "Total amount if invoice/financial document or null",
    "currency": "Currency code if amount found or null",
    "company": "Company name if found or null"
  }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll...");
        assert_eq!(truncate_chars("日本語のテキスト", 3), "日本語...");
    }

    #[test]
    fn test_prompt_limits_text() {
        let text = "x".repeat(DEFAULT_MAX_CHARS + 500);
        let prompt = build_prompt(&text, DEFAULT_MAX_CHARS);

        let expected = format!("{}...", "x".repeat(DEFAULT_MAX_CHARS));
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains(&"x".repeat(DEFAULT_MAX_CHARS + 1)));
        assert!(prompt.contains("\"document_type\""));
    }
}
