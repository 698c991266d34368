//! docsum CLI - extract, store and summarize documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docsum_core::{
    Analyzer, DocsumConfig, DocsumError, DocsumResult, DocumentAnalysis, DocumentService,
    LocalObjectStore, SqliteDocumentRepository,
};
use docsum_extractors::{ExtractedContent, ExtractionPipeline, RawInput};
use docsum_llm::OpenRouterAnalyzer;

#[derive(Parser)]
#[command(name = "docsum")]
#[command(version)]
#[command(about = "Extract text from PDF, DOCX and plain-text files and summarize it", long_about = None)]
struct Cli {
    /// Data directory for stored documents and the database
    #[arg(long, global = true, env = "DOCSUM_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a file without storing it
    Extract {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Content type to use when the extension is not recognized
        #[arg(short = 't', long, value_name = "MIME")]
        content_type: Option<String>,

        /// Print the full extraction result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a file: extract its text and store it
    Upload {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Content type to use when the extension is not recognized
        #[arg(short = 't', long, value_name = "MIME")]
        content_type: Option<String>,
    },

    /// Summarize a stored document (cached after the first run)
    Analyze {
        /// Document id returned by `upload`
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show a stored document record
    Show {
        /// Document id returned by `upload`
        #[arg(value_name = "ID")]
        id: String,

        /// Print only the extracted text
        #[arg(long)]
        text: bool,
    },
}

/// Stand-in used when no API key is configured; only `analyze` needs one.
struct UnconfiguredAnalyzer {
    reason: String,
}

#[async_trait]
impl Analyzer for UnconfiguredAnalyzer {
    async fn analyze(&self, _text: &str) -> DocsumResult<DocumentAnalysis> {
        Err(DocsumError::Configuration(self.reason.clone()))
    }

    fn model_name(&self) -> &str {
        "unconfigured"
    }
}

fn init_tracing(config: &DocsumConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn read_input(path: &Path, content_type: Option<String>) -> Result<RawInput> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(RawInput::new(bytes, filename, content_type.unwrap_or_default()))
}

fn build_analyzer(config: &DocsumConfig) -> Arc<dyn Analyzer> {
    match OpenRouterAnalyzer::new(&config.llm) {
        Ok(analyzer) => Arc::new(analyzer),
        Err(e) => {
            debug!(error = %e, "analysis disabled");
            Arc::new(UnconfiguredAnalyzer {
                reason: e.to_string(),
            })
        }
    }
}

fn build_service(config: &DocsumConfig) -> Result<DocumentService> {
    let repository = SqliteDocumentRepository::new(config.database_path())
        .with_context(|| format!("failed to open {}", config.database_path().display()))?;
    let store = LocalObjectStore::new(config.storage_dir());

    Ok(DocumentService::new(
        Arc::new(repository),
        Arc::new(store),
        build_analyzer(config),
    )
    .with_config(config))
}

fn extract(input: &RawInput) -> DocsumResult<ExtractedContent> {
    let pipeline = ExtractionPipeline::with_defaults();
    Ok(pipeline.extract_input(input)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a service error the way an API would return it.
fn report(err: &DocsumError) {
    eprintln!("error [{}]: {}", err.code().as_str(), err.public_message());
    if !err.is_client_error() {
        eprintln!("  cause: {}", err);
    }
    if let Some(suggestion) = err.suggestion() {
        eprintln!("  hint: {}", suggestion);
    }
}

async fn run(cli: Cli, config: DocsumConfig) -> Result<()> {
    match cli.command {
        Commands::Extract {
            input,
            content_type,
            json,
        } => {
            let input = read_input(&input, content_type)?;
            let extracted = extract(&input)?;
            if json {
                print_json(&extracted)?;
            } else {
                println!("{}", extracted.text);
            }
        }

        Commands::Upload {
            input,
            content_type,
        } => {
            let input = read_input(&input, content_type)?;
            let response = build_service(&config)?.upload(input).await?;
            print_json(&response)?;
        }

        Commands::Analyze { id } => {
            let response = build_service(&config)?.analyze(&id).await?;
            print_json(&response)?;
        }

        Commands::Show { id, text } => {
            let document = build_service(&config)?.get(&id).await?;
            if text {
                println!("{}", document.extracted_text);
            } else {
                print_json(&document)?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DocsumConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    init_tracing(&config);

    match run(cli, config).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<DocsumError>() {
            Some(docsum_err) => {
                report(docsum_err);
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from(["docsum", "extract", "cv.docx", "--json"]).unwrap();
        match cli.command {
            Commands::Extract { input, json, .. } => {
                assert_eq!(input, PathBuf::from("cv.docx"));
                assert!(json);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_parse_show_with_global_data_dir() {
        let cli =
            Cli::try_parse_from(["docsum", "show", "abc", "--text", "--data-dir", "/tmp/d"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(matches!(cli.command, Commands::Show { text: true, .. }));
    }

    #[test]
    fn test_extract_text_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"  line one \r\n\r\nline two").unwrap();

        let input = read_input(file.path(), None).unwrap();
        let extracted = extract(&input).unwrap();
        assert_eq!(extracted.text, "line one\nline two");
    }

    #[test]
    fn test_extract_unknown_extension_uses_flag() {
        let mut file = tempfile::Builder::new().suffix(".log").tempfile().unwrap();
        file.write_all(b"boot ok").unwrap();

        let input = read_input(file.path(), None).unwrap();
        assert!(extract(&input).is_err());

        let input = read_input(file.path(), Some("text/plain".to_string())).unwrap();
        assert_eq!(extract(&input).unwrap().text, "boot ok");
    }

    #[tokio::test]
    async fn test_unconfigured_analyzer() {
        let analyzer = UnconfiguredAnalyzer {
            reason: "OpenRouter API key not found".to_string(),
        };
        let err = analyzer.analyze("text").await.unwrap_err();
        assert!(matches!(err, DocsumError::Configuration(_)));
    }
}
