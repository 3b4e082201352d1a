use thiserror::Error;

/// Everything that can go wrong while loading a dataset or deriving features from it
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("invalid number {value:?} at line {line}, column {column}")]
    InvalidNumber {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("invalid regression target {value:?} in row {row}")]
    InvalidTarget { row: usize, value: String },

    #[error("dataset contains no rows")]
    EmptyDataset,

    #[error("label column {column} is out of range for rows with {width} fields")]
    LabelColumnOutOfRange { column: usize, width: usize },

    #[error("rows need at least one feature besides the label, found {found} fields")]
    TooFewColumns { found: usize },

    #[error("dataset has {rows} feature rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
