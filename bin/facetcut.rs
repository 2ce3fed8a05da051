use anyhow::{Context, Result};
use clap::Parser;
use facetcut::facet::{search_facets, FacetRequest, Taxonomy};
use facetcut::segment::build_segments;
use facetcut::{AllDocs, Document, FacetMetrics, IndexSearcher, LongRangeFilter, SearchSettings};
use prometheus::{Encoder, TextEncoder};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "facetcut")]
#[command(about = "Compute range and taxonomy facets over a JSON document set", long_about = None)]
struct Args {
    /// JSON array of documents
    #[arg(long, env = "FACETCUT_DOCS")]
    docs: PathBuf,

    /// JSON array of facet requests
    #[arg(long, env = "FACETCUT_REQUESTS")]
    requests: PathBuf,

    /// Documents per segment
    #[arg(long, env = "FACETCUT_SEGMENT_SIZE", default_value = "10000")]
    segment_size: usize,

    /// Collection threads (defaults to the number of CPUs)
    #[arg(long, env = "FACETCUT_THREADS")]
    threads: Option<usize>,

    /// Segments grouped into one slice
    #[arg(long, env = "FACETCUT_SEGMENTS_PER_SLICE", default_value = "5")]
    segments_per_slice: usize,

    /// Only collect documents whose FIELD value is at least MIN, as FIELD:MIN
    #[arg(long)]
    filter_min: Option<String>,

    /// Print prometheus metrics after the results
    #[arg(long)]
    metrics: bool,
}

fn parse_filter(arg: &str) -> Result<LongRangeFilter> {
    let (field, min) = arg
        .split_once(':')
        .context("filter must look like FIELD:MIN")?;
    let min: i64 = min
        .parse()
        .with_context(|| format!("invalid filter minimum '{}'", min))?;
    Ok(LongRangeFilter::new(field).gte(min))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("facetcut v{}", facetcut::VERSION);

    let content = fs::read_to_string(&args.docs)
        .with_context(|| format!("reading documents from {:?}", args.docs))?;
    let docs: Vec<Document> = serde_json::from_str(&content).context("parsing documents")?;
    let requests = FacetRequest::load_all(&args.requests)
        .with_context(|| format!("loading facet requests from {:?}", args.requests))?;

    let mut taxonomy = Taxonomy::new();
    let segments = build_segments(&docs, args.segment_size, Some(&mut taxonomy))?;
    info!(
        docs = docs.len(),
        segments = segments.len(),
        categories = taxonomy.size() - 1,
        requests = requests.len(),
        "index built"
    );

    let mut settings = SearchSettings::default().with_max_segments_per_slice(args.segments_per_slice);
    if let Some(threads) = args.threads {
        settings = settings.with_worker_threads(threads);
    }
    let metrics = Arc::new(FacetMetrics::new()?);
    let searcher = IndexSearcher::new(segments)
        .with_settings(settings)
        .with_metrics(metrics.clone());

    let (results, stats) = match &args.filter_min {
        Some(arg) => {
            let filter = parse_filter(arg)?;
            search_facets(&searcher, &filter, &requests, Some(&taxonomy))?
        }
        None => search_facets(&searcher, &AllDocs, &requests, Some(&taxonomy))?,
    };
    info!(
        documents = stats.documents_collected,
        slices = stats.slices,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "facets computed"
    );

    println!("{}", serde_json::to_string_pretty(&results)?);

    if args.metrics {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metrics.registry().gather(), &mut buffer)?;
        print!("{}", String::from_utf8(buffer)?);
    }

    Ok(())
}
