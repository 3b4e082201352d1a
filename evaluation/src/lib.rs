//! Training of linear and logistic models on row prefixes of a design
//! matrix, and their evaluation on the held-out remainder

#[macro_use]
extern crate log;

mod driver;
mod error;
mod evaluator;
mod metrics;
mod task;

pub use driver::{ClassModel, Model, TrainingDriver};
pub use error::{Error, Result};
pub use evaluator::{predict_class, Evaluator};
pub use metrics::{ClassTally, Metrics};
pub use task::Task;
