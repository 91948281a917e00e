use std::sync::Arc;

use serde::Serialize;
use tokenator_core::{BatchTotals, Credential, FileResult, InputFile, char_count};
use tokenator_sources::ExtractorRegistry;
use tokenator_tokens::TokenCounter;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One completed run over a file set
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub id: Uuid,
    /// Same order as the input files
    pub results: Vec<FileResult>,
    pub totals: BatchTotals,
}

impl Batch {
    pub fn exact_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_exact).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

/// A file reaching its terminal state, sent in completion order
#[derive(Debug, Clone)]
pub struct FileEvent {
    pub batch_id: Uuid,
    pub index: usize,
    pub result: FileResult,
}

/// Runs extraction then counting for every file of a batch concurrently
#[derive(Clone)]
pub struct BatchProcessor {
    registry: Arc<ExtractorRegistry>,
    counter: TokenCounter,
}

impl BatchProcessor {
    pub fn new(registry: ExtractorRegistry, counter: TokenCounter) -> Self {
        Self {
            registry: Arc::new(registry),
            counter,
        }
    }

    /// Processor that never calls a remote counter
    pub fn offline() -> Self {
        Self::new(ExtractorRegistry::new(), TokenCounter::offline())
    }

    pub async fn process(&self, files: Vec<InputFile>, credential: Option<Credential>) -> Batch {
        self.run(files, credential, None).await
    }

    /// Like `process`, also streaming each terminal result as it arrives
    pub async fn process_with_progress(
        &self,
        files: Vec<InputFile>,
        credential: Option<Credential>,
        progress: UnboundedSender<FileEvent>,
    ) -> Batch {
        self.run(files, credential, Some(progress)).await
    }

    async fn run(
        &self,
        files: Vec<InputFile>,
        credential: Option<Credential>,
        progress: Option<UnboundedSender<FileEvent>>,
    ) -> Batch {
        let batch_id = Uuid::new_v4();
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        debug!(%batch_id, files = files.len(), exact = credential.is_some(), "Starting batch");

        // One task per file; the handle vector is indexed like the input
        let handles: Vec<_> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                let registry = self.registry.clone();
                let counter = self.counter.clone();
                let credential = credential.clone();
                let progress = progress.clone();

                tokio::spawn(async move {
                    let result = process_file(&registry, &counter, file, credential.as_ref()).await;
                    if let Some(progress) = progress {
                        // Receiver may have gone away; results are still returned
                        let _ = progress.send(FileEvent {
                            batch_id,
                            index,
                            result: result.clone(),
                        });
                    }
                    result
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(%batch_id, file = %names[index], "File task failed: {}", e);
                    let result =
                        FileResult::failed(names[index].clone(), format!("Processing failed: {}", e));
                    if let Some(progress) = &progress {
                        let _ = progress.send(FileEvent {
                            batch_id,
                            index,
                            result: result.clone(),
                        });
                    }
                    result
                }
            };
            results.push(result);
        }

        // Recomputed from the complete set, never accumulated per file
        let totals = BatchTotals::from_results(&results);
        let batch = Batch {
            id: batch_id,
            results,
            totals,
        };

        info!(
            %batch_id,
            files = batch.results.len(),
            total_tokens = batch.totals.total_tokens,
            total_chars = batch.totals.total_chars,
            exact = batch.exact_count(),
            errors = batch.error_count(),
            "Batch complete"
        );

        batch
    }
}

async fn process_file(
    registry: &ExtractorRegistry,
    counter: &TokenCounter,
    file: InputFile,
    credential: Option<&Credential>,
) -> FileResult {
    let text = match registry.extract(&file).await {
        Ok(text) => text,
        Err(e) => {
            warn!(file = %file.name, error = %e, "Failed to process file");
            return FileResult::failed(file.name, e.to_string());
        }
    };

    let count = counter.count(&text, credential).await;
    let chars = char_count(&text);
    debug!(
        file = %file.name,
        chars,
        tokens = count.count,
        exact = count.is_exact,
        "Processed file"
    );

    FileResult::counted(file.name, chars, count.count, count.is_exact)
}
