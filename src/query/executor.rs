//! Segment-parallel search execution
//!
//! The searcher groups segments into slices and collects every slice on its own
//! worker. Per-segment collector state never leaves the worker that created it;
//! recorders only synchronize when a finished segment hands over its results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use tracing::{debug, warn};

use crate::config::SearchSettings;
use crate::error::{FacetError, Result};
use crate::metrics::FacetMetrics;
use crate::query::collector::Collector;
use crate::query::matcher::DocMatcher;
use crate::segment::{DocNo, SegmentReader};

/// Execution statistics of one search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Segments collected
    pub segments: usize,
    /// Slices the segments were grouped into
    pub slices: usize,
    /// Documents passed to the collector
    pub documents_collected: u64,
    /// Wall-clock duration of the search
    pub elapsed: Duration,
}

/// Runs matchers and collectors over a fixed set of segments
pub struct IndexSearcher {
    segments: Vec<SegmentReader>,
    settings: SearchSettings,
    metrics: Option<Arc<FacetMetrics>>,
}

impl IndexSearcher {
    /// Create a searcher; segment ordinals are reassigned by position
    pub fn new(segments: Vec<SegmentReader>) -> Self {
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(ord, segment)| segment.with_ord(ord))
            .collect();
        Self {
            segments,
            settings: SearchSettings::default(),
            metrics: None,
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<FacetMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn segments(&self) -> &[SegmentReader] {
        &self.segments
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Live documents across all segments
    pub fn live_doc_count(&self) -> u64 {
        self.segments.iter().map(|s| s.live_doc_count()).sum()
    }

    /// Group segments into slices, largest segments first
    ///
    /// A segment larger than `max_docs_per_slice` gets a slice of its own.
    /// Otherwise segments are added to the current slice until it holds
    /// `max_segments_per_slice` segments or more than `max_docs_per_slice` docs.
    pub fn slices(&self) -> Vec<Vec<&SegmentReader>> {
        let mut sorted: Vec<&SegmentReader> = self.segments.iter().collect();
        sorted.sort_by(|a, b| b.max_doc().cmp(&a.max_doc()).then(a.ord().cmp(&b.ord())));

        let max_docs = self.settings.max_docs_per_slice;
        let max_segments = self.settings.max_segments_per_slice.max(1);

        let mut slices: Vec<Vec<&SegmentReader>> = Vec::new();
        let mut open = false;
        let mut doc_sum = 0u64;
        for segment in sorted {
            let docs = segment.max_doc() as u64;
            if docs > max_docs {
                slices.push(vec![segment]);
                continue;
            }
            if !open {
                slices.push(Vec::new());
                open = true;
            }
            if let Some(slice) = slices.last_mut() {
                slice.push(segment);
                doc_sum += docs;
                if slice.len() >= max_segments || doc_sum > max_docs {
                    open = false;
                    doc_sum = 0;
                }
            }
        }
        slices
    }

    /// Collect the documents `matcher` selects, skipping deleted documents
    ///
    /// Returns the first error raised by any segment. Segments that failed do
    /// not finish their leaf collectors, so they contribute nothing.
    pub fn search(&self, matcher: &dyn DocMatcher, collector: &dyn Collector) -> Result<SearchStats> {
        let start = Instant::now();
        let slices = self.slices();
        let workers = self.settings.worker_threads.max(1).min(slices.len());

        debug!(
            segments = self.segments.len(),
            slices = slices.len(),
            workers,
            matcher = matcher.matcher_type(),
            "starting search"
        );

        let result = if workers <= 1 {
            slices.iter().try_fold(0u64, |total, slice| {
                Ok(total + self.search_slice(slice, matcher, collector)?)
            })
        } else {
            self.search_parallel(&slices, workers, matcher, collector)
        };

        let elapsed = start.elapsed();
        match result {
            Ok(documents_collected) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_search(elapsed.as_secs_f64());
                }
                debug!(
                    documents_collected,
                    elapsed_us = elapsed.as_micros() as u64,
                    "search finished"
                );
                Ok(SearchStats {
                    segments: self.segments.len(),
                    slices: slices.len(),
                    documents_collected,
                    elapsed,
                })
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_error();
                }
                warn!(error = %e, "search failed");
                Err(e)
            }
        }
    }

    fn search_parallel(
        &self,
        slices: &[Vec<&SegmentReader>],
        workers: usize,
        matcher: &dyn DocMatcher,
        collector: &dyn Collector,
    ) -> Result<u64> {
        let (sender, receiver) = channel::unbounded();
        for slice in slices {
            // The receiver is alive, so sending cannot fail
            let _ = sender.send(slice);
        }
        drop(sender);

        let failed = AtomicBool::new(false);
        let outcome = crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let receiver = receiver.clone();
                    let failed = &failed;
                    scope.spawn(move |_| -> Result<u64> {
                        let mut collected = 0;
                        for slice in receiver.iter() {
                            if failed.load(Ordering::Relaxed) {
                                break;
                            }
                            match self.search_slice(slice, matcher, collector) {
                                Ok(docs) => collected += docs,
                                Err(e) => {
                                    failed.store(true, Ordering::Relaxed);
                                    return Err(e);
                                }
                            }
                        }
                        Ok(collected)
                    })
                })
                .collect();

            let mut total = 0u64;
            let mut first_error = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(docs)) => total += docs,
                    Ok(Err(e)) => {
                        first_error.get_or_insert(e);
                    }
                    Err(_) => {
                        first_error.get_or_insert(FacetError::Collection(
                            "search worker panicked".to_string(),
                        ));
                    }
                }
            }
            match first_error {
                Some(e) => Err(e),
                None => Ok(total),
            }
        });

        outcome.map_err(|_| FacetError::Collection("search worker panicked".to_string()))?
    }

    fn search_slice(
        &self,
        slice: &[&SegmentReader],
        matcher: &dyn DocMatcher,
        collector: &dyn Collector,
    ) -> Result<u64> {
        slice.iter().try_fold(0u64, |total, segment| {
            Ok(total + self.collect_segment(segment, matcher, collector)?)
        })
    }

    fn collect_segment(
        &self,
        segment: &SegmentReader,
        matcher: &dyn DocMatcher,
        collector: &dyn Collector,
    ) -> Result<u64> {
        let mut docs = matcher.matches(segment)?;
        docs -= segment.deleted_docs();

        let mut leaf = collector.leaf_collector(segment)?;
        for doc in docs.iter() {
            leaf.collect(DocNo(doc))?;
        }
        leaf.finish()?;

        let collected = docs.len();
        if let Some(metrics) = &self.metrics {
            metrics.record_segment(collected);
        }
        debug!(segment = %segment.id(), collected, "segment collected");
        Ok(collected)
    }
}
