//! Runs batch gradient descent experiments over growing training set sizes
//! and reports how well each trained model does on held-out rows.

#[macro_use]
extern crate log;

mod config;
mod error;
mod experiment;
mod report;

pub use config::{DataConfig, ExperimentConfig, ProblemConfig};
pub use error::{Error, Result};
pub use experiment::{load_dataset, Experiment};
pub use report::{ExperimentReport, FitSummary};
