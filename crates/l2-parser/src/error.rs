//! Error types for Level-2 product decoding.

use thiserror::Error;

/// Result type for Level-2 parser operations.
pub type L2Result<T> = Result<T, L2Error>;

/// Error types for Level-2 product decoding.
#[derive(Error, Debug)]
pub enum L2Error {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Filename does not follow the product naming grammar
    #[error("Invalid product filename: {0}")]
    InvalidFilename(String),

    /// A header line failed validation
    #[error("Invalid {block} header at line {line}: {reason}")]
    InvalidHeader {
        block: &'static str,
        line: usize,
        reason: String,
    },

    /// None of the dataset descriptor patterns matched
    #[error("No matching dataset descriptor found in product header")]
    MissingDatasetDescriptor,

    /// A header key needed to locate the payload is absent or not numeric
    #[error("Header field {0} is missing or not numeric")]
    MissingHeaderField(String),

    /// Header-declared payload does not fit in the file
    #[error("File size error: payload needs {expected} bytes but file has {actual}")]
    PayloadOverflow { expected: u64, actual: u64 },

    /// Stream ended before a record boundary
    #[error("Truncated file: record {record} needs {needed} more bytes, {remaining} remain")]
    Truncated {
        record: usize,
        needed: usize,
        remaining: usize,
    },

    /// Record layout widths do not add up to the declared record size
    #[error("Invalid record layout {layout}: fields total {computed} bytes, declared {declared}")]
    InvalidLayout {
        layout: &'static str,
        declared: usize,
        computed: usize,
    },

    /// Baseline has no decoder for the requested encoding
    #[error("Unsupported baseline {baseline} for {encoding} products")]
    UnsupportedBaseline {
        baseline: char,
        encoding: &'static str,
    },

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Requested field is not part of the decoded product
    #[error("Field {field} not available in group {group}")]
    UnknownField { group: String, field: String },

    /// Error raised while decoding a specific file
    #[error("{file}: {source}")]
    InFile {
        file: String,
        #[source]
        source: Box<L2Error>,
    },
}

impl L2Error {
    /// Attach the file name to an error, leaving already-wrapped errors alone.
    pub fn in_file(self, file: impl Into<String>) -> Self {
        match self {
            L2Error::InFile { .. } => self,
            other => L2Error::InFile {
                file: file.into(),
                source: Box::new(other),
            },
        }
    }
}
