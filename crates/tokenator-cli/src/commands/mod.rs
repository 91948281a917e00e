pub mod config;
pub mod count;
pub mod report;

use std::sync::Arc;

use anyhow::{Result, bail};
use tokenator_config::Config;
use tokenator_core::{Credential, FileResult};
use tokenator_engine::{Batch, BatchProcessor, FileEvent};
use tokenator_sources::{ExtractorRegistry, collect_paths, load_inputs};
use tokenator_tokens::{GeminiCounter, TokenCounter};
use tracing::debug;

use crate::cli::InputArgs;

/// Resolve inputs and run one batch, printing progress to stderr
pub async fn run_batch(input: InputArgs, config: &Config) -> Result<Batch> {
    let registry = ExtractorRegistry::new();
    let paths = collect_paths(&input.inputs, &registry)?;
    if paths.is_empty() {
        bail!("No input files found");
    }
    debug!(inputs = input.inputs.len(), files = paths.len(), "Collected input files");
    let files = load_inputs(&paths).await?;

    let credential = input.api_key.and_then(Credential::new);
    if credential.is_none() {
        eprintln!("No API key set, token counts will be estimated");
    }

    let remote = GeminiCounter::new(config.counting.endpoint.clone(), config.counting.timeout())?;
    let processor = BatchProcessor::new(registry, TokenCounter::new(Arc::new(remote)));

    let total = files.len();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<FileEvent>();
    let printer = tokio::spawn(async move {
        let mut done = 0;
        while let Some(event) = rx.recv().await {
            done += 1;
            eprintln!("[{}/{}] {}", done, total, describe(&event.result));
        }
    });

    let batch = processor.process_with_progress(files, credential, tx).await;
    printer.await?;

    Ok(batch)
}

/// One-line summary of a file result
pub fn describe(result: &FileResult) -> String {
    match &result.error {
        Some(error) => format!("✗ {}: {}", result.file_name, error),
        None => format!(
            "✓ {}: {} tokens ({})",
            result.file_name,
            tokenator_core::report::group_thousands(result.token_count),
            if result.is_exact { "exact" } else { "estimated" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let ok = FileResult::counted("a.txt", 4_000, 1_000, true);
        assert_eq!(describe(&ok), "✓ a.txt: 1,000 tokens (exact)");

        let estimated = FileResult::counted("b.md", 8, 2, false);
        assert_eq!(describe(&estimated), "✓ b.md: 2 tokens (estimated)");

        let failed = FileResult::failed("c.xyz", "Unsupported file type: xyz");
        assert_eq!(describe(&failed), "✗ c.xyz: Unsupported file type: xyz");
    }

    #[tokio::test]
    async fn test_run_batch_without_key_estimates() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "abcdefgh").unwrap();
        std::fs::write(dir.path().join("b.xyz"), "ignored").unwrap();

        let input = InputArgs {
            inputs: vec![
                dir.path().join("a.txt").display().to_string(),
                dir.path().join("b.xyz").display().to_string(),
            ],
            api_key: None,
        };

        let batch = run_batch(input, &Config::default()).await.unwrap();
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].token_count, 2);
        assert!(!batch.results[0].is_exact);
        assert!(batch.results[1].is_error());
        assert_eq!(batch.totals.total_tokens, 2);
    }
}
