use thiserror::Error;

/// Main error type for facet computation
#[derive(Error, Debug)]
pub enum FacetError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid aggregation index: {index}, recorder has {count} aggregations")]
    AggregationIndexOutOfRange { index: usize, count: usize },

    #[error("Facet recorder read before reduce")]
    NotReduced,

    #[error("Facet recorder already reduced")]
    AlreadyReduced,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{field}' is not a {expected} column")]
    FieldTypeMismatch { field: String, expected: &'static str },

    #[error("Collection error: {0}")]
    Collection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type alias for facet operations
pub type Result<T> = std::result::Result<T, FacetError>;

impl FacetError {
    /// Check if this error is a misuse of the recorder lifecycle rather than a data problem
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, FacetError::NotReduced | FacetError::AlreadyReduced)
    }
}
