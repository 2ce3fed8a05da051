use serde::{Deserialize, Serialize};

/// Searcher configuration controlling how segments are split across workers
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Upper bound on concurrently collected slices
    pub worker_threads: usize,
    /// Maximum number of segments grouped into one slice
    pub max_segments_per_slice: usize,
    /// Maximum number of documents grouped into one slice
    pub max_docs_per_slice: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            max_segments_per_slice: 5,
            max_docs_per_slice: 250_000,
        }
    }
}

impl SearchSettings {
    /// Settings that collect every segment on the calling thread
    pub fn sequential() -> Self {
        Self {
            worker_threads: 1,
            ..Default::default()
        }
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    /// Set the maximum number of segments per slice
    pub fn with_max_segments_per_slice(mut self, segments: usize) -> Self {
        self.max_segments_per_slice = segments.max(1);
        self
    }

    /// Set the maximum number of documents per slice
    pub fn with_max_docs_per_slice(mut self, docs: u64) -> Self {
        self.max_docs_per_slice = docs.max(1);
        self
    }
}
