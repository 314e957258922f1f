//! In-memory job store
//!
//! Two maps keyed by engine task id:
//! - pending: submitted, results not yet seen (request params + audio format)
//! - completed: results known; retained for downloads until the process exits
//!
//! A task moves pending → completed at most once. The move happens under one
//! write lock with no await inside, so concurrent status polls cannot both
//! perform it. Completed jobs are never evicted.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{GenerationRequest, ResultItem};

/// Audio format assumed for tasks that completed without a pending entry
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";

/// Submitted job waiting for results
#[derive(Debug, Clone)]
pub struct PendingJob {
    pub params: GenerationRequest,
    pub format: String,
}

/// Job with results
#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub results: Vec<ResultItem>,
    /// `None` when the task completed without a pending entry (e.g. after restart)
    pub params: Option<GenerationRequest>,
    pub format: String,
}

/// One result of a completed job, with what is needed to name its download
#[derive(Debug, Clone)]
pub struct ResultLookup {
    pub item: ResultItem,
    pub params: Option<GenerationRequest>,
    pub format: String,
}

#[derive(Debug, Default)]
struct JobMaps {
    pending: HashMap<String, PendingJob>,
    completed: HashMap<String, CompletedJob>,
}

/// Shared handle to the job maps
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<JobMaps>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly submitted task
    pub async fn record_pending(&self, task_id: &str, params: GenerationRequest) {
        let format = params.audio_format.clone();
        let mut maps = self.inner.write().await;
        maps.pending
            .insert(task_id.to_string(), PendingJob { params, format });
    }

    /// Move a task to completed with its results
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// task was already completed (the stored results are left untouched).
    pub async fn complete(&self, task_id: &str, results: Vec<ResultItem>) -> bool {
        let mut maps = self.inner.write().await;
        if maps.completed.contains_key(task_id) {
            return false;
        }

        let pending = maps.pending.remove(task_id);
        let (params, format) = match pending {
            Some(p) => (Some(p.params), p.format),
            None => (None, DEFAULT_AUDIO_FORMAT.to_string()),
        };
        maps.completed.insert(
            task_id.to_string(),
            CompletedJob {
                results,
                params,
                format,
            },
        );

        tracing::info!(task_id = %task_id, "Job completed");
        true
    }

    /// Cached results of a completed job
    pub async fn completed_results(&self, task_id: &str) -> Option<Vec<ResultItem>> {
        let maps = self.inner.read().await;
        maps.completed.get(task_id).map(|job| job.results.clone())
    }

    #[cfg(test)]
    async fn is_pending(&self, task_id: &str) -> bool {
        self.inner.read().await.pending.contains_key(task_id)
    }

    /// Result `index` of completed job `task_id`; `None` if either is unknown
    pub async fn lookup_result(&self, task_id: &str, index: usize) -> Option<ResultLookup> {
        let maps = self.inner.read().await;
        let job = maps.completed.get(task_id)?;
        let item = job.results.get(index)?.clone();
        Some(ResultLookup {
            item,
            params: job.params.clone(),
            format: job.format.clone(),
        })
    }

    /// (pending, completed) counts
    pub async fn counts(&self) -> (usize, usize) {
        let maps = self.inner.read().await;
        (maps.pending.len(), maps.completed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> ResultItem {
        ResultItem {
            audio_url: url.to_string(),
            meta: None,
            prompt: None,
            lyrics: None,
        }
    }

    #[tokio::test]
    async fn test_pending_to_completed_once() {
        let store = JobStore::new();
        let params = GenerationRequest {
            audio_format: "flac".into(),
            ..Default::default()
        };
        store.record_pending("abc", params.clone()).await;
        assert!(store.is_pending("abc").await);
        assert_eq!(store.counts().await, (1, 0));

        assert!(store.complete("abc", vec![item("/a.flac")]).await);
        assert!(!store.is_pending("abc").await);
        assert_eq!(store.counts().await, (0, 1));

        // Second transition is a no-op and keeps the first results
        assert!(!store.complete("abc", vec![item("/other.flac")]).await);
        let results = store.completed_results("abc").await.unwrap();
        assert_eq!(results, vec![item("/a.flac")]);

        let lookup = store.lookup_result("abc", 0).await.unwrap();
        assert_eq!(lookup.format, "flac");
        assert_eq!(lookup.params, Some(params));
    }

    #[tokio::test]
    async fn test_completion_without_pending_entry() {
        let store = JobStore::new();
        assert!(store.complete("orphan", vec![item("/x.mp3")]).await);

        let lookup = store.lookup_result("orphan", 0).await.unwrap();
        assert_eq!(lookup.format, DEFAULT_AUDIO_FORMAT);
        assert!(lookup.params.is_none());
    }

    #[tokio::test]
    async fn test_lookup_out_of_range() {
        let store = JobStore::new();
        store.complete("abc", vec![item("/a.mp3"), item("/b.mp3")]).await;

        assert!(store.lookup_result("abc", 1).await.is_some());
        assert!(store.lookup_result("abc", 2).await.is_none());
        assert!(store.lookup_result("missing", 0).await.is_none());
    }

    #[tokio::test]
    async fn test_pending_is_not_downloadable() {
        let store = JobStore::new();
        store.record_pending("abc", GenerationRequest::default()).await;
        assert!(store.lookup_result("abc", 0).await.is_none());
        assert!(store.completed_results("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_completion_transitions_once() {
        let store = JobStore::new();
        store.record_pending("race", GenerationRequest::default()).await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.complete("race", vec![item(&format!("/{}.mp3", i))]).await
            }));
        }

        let mut transitions = 0;
        for handle in handles {
            if handle.await.unwrap() {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(store.counts().await, (0, 1));
    }
}
