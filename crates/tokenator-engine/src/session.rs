//! Batch lifecycle across file selections and credential changes
//!
//! A new file set or a new credential starts a new generation. Results from
//! an older generation that arrive late are dropped, never merged.

use tokenator_core::{BatchTotals, Credential, FileSlot, InputFile};
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

use crate::processor::{Batch, BatchProcessor, FileEvent};

#[derive(Default)]
struct SessionState {
    generation: u64,
    files: Vec<InputFile>,
    credential: Option<Credential>,
    slots: Vec<FileSlot>,
    batch: Option<Batch>,
}

pub struct Session {
    processor: BatchProcessor,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(processor: BatchProcessor, credential: Option<Credential>) -> Self {
        Self {
            processor,
            state: RwLock::new(SessionState {
                credential,
                ..Default::default()
            }),
        }
    }

    /// Run a batch over a new file set, replacing any earlier one
    ///
    /// Returns `None` when a later call superseded this batch before it
    /// finished.
    pub async fn analyze(&self, files: Vec<InputFile>) -> Option<Batch> {
        let (generation, credential) = {
            let mut state = self.state.write().await;
            state.files = files.clone();
            (Self::start_generation(&mut state), state.credential.clone())
        };

        self.run(generation, files, credential).await
    }

    /// Replace the credential, re-running the whole current file set if it
    /// changed
    pub async fn set_credential(&self, credential: Option<Credential>) -> Option<Batch> {
        let (generation, files) = {
            let mut state = self.state.write().await;
            if state.credential == credential {
                return None;
            }
            state.credential = credential.clone();
            if state.files.is_empty() {
                return None;
            }
            (Self::start_generation(&mut state), state.files.clone())
        };

        debug!(files = files.len(), "Credential changed, re-running batch");
        self.run(generation, files, credential).await
    }

    /// Forget files and results; in-flight work is discarded on arrival
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.files.clear();
        state.slots.clear();
        state.batch = None;
    }

    pub async fn slots(&self) -> Vec<FileSlot> {
        self.state.read().await.slots.clone()
    }

    /// Last completed batch; unchanged while a newer one is running
    pub async fn batch(&self) -> Option<Batch> {
        self.state.read().await.batch.clone()
    }

    pub async fn totals(&self) -> BatchTotals {
        self.state
            .read()
            .await
            .batch
            .as_ref()
            .map(|b| b.totals)
            .unwrap_or_default()
    }

    pub async fn is_running(&self) -> bool {
        self.state.read().await.slots.iter().any(FileSlot::is_pending)
    }

    fn start_generation(state: &mut SessionState) -> u64 {
        state.generation += 1;
        state.slots = state
            .files
            .iter()
            .map(|f| FileSlot::Pending {
                file_name: f.name.clone(),
            })
            .collect();
        state.generation
    }

    async fn run(
        &self,
        generation: u64,
        files: Vec<InputFile>,
        credential: Option<Credential>,
    ) -> Option<Batch> {
        let (tx, mut rx) = mpsc::unbounded_channel::<FileEvent>();
        let processing = self.processor.process_with_progress(files, credential, tx);
        let updates = async {
            while let Some(event) = rx.recv().await {
                let mut state = self.state.write().await;
                if state.generation != generation {
                    continue;
                }
                if let Some(slot) = state.slots.get_mut(event.index) {
                    *slot = FileSlot::Done(event.result);
                }
            }
        };

        let (batch, ()) = tokio::join!(processing, updates);

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!(batch_id = %batch.id, "Discarding results of superseded batch");
            return None;
        }
        state.slots = batch.results.iter().cloned().map(FileSlot::Done).collect();
        state.batch = Some(batch.clone());
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokenator_sources::ExtractorRegistry;
    use tokenator_tokens::{CountingFailure, RemoteCounter, TokenCounter};

    /// Exact count is 100 per file; "slow" texts take a while
    struct SlowCounter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteCounter for SlowCounter {
        async fn count_tokens(
            &self,
            text: &str,
            _credential: &Credential,
        ) -> Result<usize, CountingFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("slow") {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(100)
        }

        fn model(&self) -> &str {
            "slow"
        }
    }

    fn session(credential: Option<Credential>) -> (Arc<Session>, Arc<SlowCounter>) {
        let remote = Arc::new(SlowCounter {
            calls: AtomicUsize::new(0),
        });
        let processor =
            BatchProcessor::new(ExtractorRegistry::new(), TokenCounter::new(remote.clone()));
        (Arc::new(Session::new(processor, credential)), remote)
    }

    fn files() -> Vec<InputFile> {
        vec![
            InputFile::new("a.txt", "abcdefgh"),
            InputFile::new("b.txt", "abcd"),
        ]
    }

    #[tokio::test]
    async fn test_analyze_stores_batch() {
        let (session, _) = session(None);

        let batch = session.analyze(files()).await.unwrap();
        assert_eq!(batch.totals.total_tokens, 3);

        let slots = session.slots().await;
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| !s.is_pending()));
        assert_eq!(session.totals().await.total_tokens, 3);
        assert!(!session.is_running().await);
    }

    #[tokio::test]
    async fn test_credential_change_reruns_batch() {
        let (session, remote) = session(None);
        session.analyze(files()).await.unwrap();
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);

        let batch = session.set_credential(Credential::new("key")).await.unwrap();
        assert!(batch.results.iter().all(|r| r.is_exact));
        assert_eq!(batch.totals.total_tokens, 200);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.batch().await.unwrap().id, batch.id);

        // Same credential again is a no-op
        assert!(session.set_credential(Credential::new("key")).await.is_none());
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);

        // Removing it downgrades to estimates
        let batch = session.set_credential(None).await.unwrap();
        assert!(batch.results.iter().all(|r| !r.is_exact));
        assert_eq!(batch.totals.total_tokens, 3);
    }

    #[tokio::test]
    async fn test_credential_without_files_does_not_run() {
        let (session, remote) = session(None);
        assert!(session.set_credential(Credential::new("key")).await.is_none());
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
        assert!(session.batch().await.is_none());
    }

    #[tokio::test]
    async fn test_new_file_set_supersedes_in_flight_batch() {
        let (session, _) = session(Credential::new("key"));

        let first = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .analyze(vec![InputFile::new("old.txt", "slow old file")])
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.is_running().await);
        // The in-flight batch has not replaced anything yet
        assert!(session.batch().await.is_none());

        let second = session
            .analyze(vec![InputFile::new("new.txt", "fresh")])
            .await
            .unwrap();

        assert!(first.await.unwrap().is_none());

        let current = session.batch().await.unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.results[0].file_name, "new.txt");

        let slots = session.slots().await;
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].file_name(), "new.txt");
    }

    #[tokio::test]
    async fn test_clear_forgets_results() {
        let (session, _) = session(None);
        session.analyze(files()).await.unwrap();

        session.clear().await;

        assert!(session.batch().await.is_none());
        assert!(session.slots().await.is_empty());
        assert_eq!(session.totals().await, BatchTotals::default());
        assert!(session.set_credential(Credential::new("key")).await.is_none());
    }
}
