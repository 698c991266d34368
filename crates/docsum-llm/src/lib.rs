//! docsum-llm - Document analysis for docsum.
//!
//! Builds the analysis prompt, sends it to an OpenAI-compatible chat
//! completions API (OpenRouter by default) and parses the structured reply.
//!
//! # Example
//!
//! ```ignore
//! use docsum_core::DocsumConfig;
//! use docsum_llm::OpenRouterAnalyzer;
//!
//! let config = DocsumConfig::from_env();
//! let analyzer = OpenRouterAnalyzer::new(&config.llm)?;
//! let analysis = analyzer.analyze(&extracted_text).await?;
//! ```

mod openrouter;
pub mod prompt;
pub mod response;

pub use openrouter::OpenRouterAnalyzer;
pub use prompt::{build_prompt, truncate_chars};
pub use response::{parse_analysis, strip_code_fence};

// Re-export core types for convenience
pub use docsum_core::traits::Analyzer;
pub use docsum_core::{AnalysisMetadata, DocumentAnalysis};
