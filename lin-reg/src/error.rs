use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The cost went up instead of down, usually a learning rate that is too large
    #[error("cost increased from {previous} to {cost} at iteration {iteration}")]
    Diverged {
        iteration: usize,
        previous: f64,
        cost: f64,
    },

    #[error("design matrix has {rows} rows but there are {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },

    #[error("cannot fit on an empty training set")]
    EmptyTrainingSet,
}

pub type Result<T> = std::result::Result<T, Error>;
