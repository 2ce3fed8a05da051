use prometheus::{Counter, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;

/// Prometheus metrics for facet collection
#[derive(Clone)]
pub struct FacetMetrics {
    // Counters
    pub searches_total: Counter,
    pub segments_collected: Counter,
    pub documents_collected: Counter,
    pub collection_errors: Counter,

    // Histograms
    pub search_latency: Histogram,

    registry: Arc<Registry>,
}

impl FacetMetrics {
    /// Create a new FacetMetrics instance with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let searches_total = Counter::with_opts(Opts::new(
            "facetcut_searches_total",
            "Total number of faceted searches",
        ))?;
        registry.register(Box::new(searches_total.clone()))?;

        let segments_collected = Counter::with_opts(Opts::new(
            "facetcut_segments_collected_total",
            "Total number of segments collected",
        ))?;
        registry.register(Box::new(segments_collected.clone()))?;

        let documents_collected = Counter::with_opts(Opts::new(
            "facetcut_documents_collected_total",
            "Total number of matched documents fed to collectors",
        ))?;
        registry.register(Box::new(documents_collected.clone()))?;

        let collection_errors = Counter::with_opts(Opts::new(
            "facetcut_collection_errors_total",
            "Total number of failed searches",
        ))?;
        registry.register(Box::new(collection_errors.clone()))?;

        let search_latency = Histogram::with_opts(
            HistogramOpts::new("facetcut_search_latency_seconds", "Faceted search latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        Ok(Self {
            searches_total,
            segments_collected,
            documents_collected,
            collection_errors,
            search_latency,
            registry: Arc::new(registry),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a finished search
    pub fn record_search(&self, duration_secs: f64) {
        self.searches_total.inc();
        self.search_latency.observe(duration_secs);
    }

    /// Record one collected segment and the number of documents fed to the collector
    pub fn record_segment(&self, docs: u64) {
        self.segments_collected.inc();
        self.documents_collected.inc_by(docs as f64);
    }

    /// Record a failed search
    pub fn record_error(&self) {
        self.collection_errors.inc();
    }
}
