//! Parsing of model replies into [`DocumentAnalysis`].

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use docsum_core::{DocsumError, DocsumResult, DocumentAnalysis};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^```[a-zA-Z0-9_-]*[ \t]*\r?\n?([\s\S]*?)\r?\n?```$")
        .expect("code fence pattern is valid")
});

/// Remove a single leading and trailing triple-backtick fence.
///
/// Text without a surrounding fence is returned trimmed.
pub fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();
    CODE_FENCE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(content)
}

/// Parse a model reply. Direct JSON first, then with a code fence removed.
pub fn parse_analysis(content: &str) -> DocsumResult<DocumentAnalysis> {
    match serde_json::from_str::<DocumentAnalysis>(content.trim()) {
        Ok(analysis) => Ok(analysis),
        Err(first) => {
            debug!(error = %first, "reply is not bare JSON, retrying without code fence");
            serde_json::from_str(strip_code_fence(content)).map_err(|e| {
                DocsumError::invalid_response(format!(
                    "failed to parse LLM response as JSON: {}",
                    e
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsum_core::ErrorCode;

    const BARE: &str = r#"{"summary":"A CV.","document_type":"cv","metadata":{"date":null,"sender":"Jane Doe","recipient":null,"amount":null,"currency":null,"company":null}}"#;

    #[test]
    fn test_bare_json() {
        let analysis = parse_analysis(BARE).unwrap();
        assert_eq!(analysis.document_type, "cv");
        assert_eq!(analysis.metadata.sender.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_fenced_json() {
        let fenced = format!("```json\n{}\n```", BARE);
        assert_eq!(parse_analysis(&fenced).unwrap().summary, "A CV.");

        let plain_fence = format!("```\n{}\n```", BARE);
        assert_eq!(parse_analysis(&plain_fence).unwrap().summary, "A CV.");
    }

    #[test]
    fn test_numeric_amount() {
        let reply = r#"{"summary":"Bill.","document_type":"invoice","metadata":{"amount":1200,"currency":"USD"}}"#;
        let analysis = parse_analysis(reply).unwrap();
        assert_eq!(analysis.metadata.amount.as_deref(), Some("1200"));
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn test_unparseable_reply() {
        let err = parse_analysis("Sure! Here is the summary you asked for.").unwrap_err();
        assert_eq!(err.code(), ErrorCode::LlmInvalidResponse);
    }
}
