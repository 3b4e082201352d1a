use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("training failed: {0}")]
    Fit(#[from] lin_reg::Error),

    #[error("no held-out rows left, training uses {train_len} of {total} rows")]
    EmptyHeldOutPool { train_len: usize, total: usize },

    #[error("cannot train on {train_len} rows, the dataset only has {total}")]
    TrainingSetTooLarge { train_len: usize, total: usize },

    #[error("one-vs-rest training needs at least one known class")]
    NoClasses,

    #[error("training thread for class {class} exited without a result")]
    WorkerLost { class: usize },

    #[error("a {model} model cannot be evaluated on a {task} task")]
    ModelMismatch {
        model: &'static str,
        task: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
