//! This crate provides common funcionality shared by the feature, fitting
//! and evaluation crates

#![deny(unused_imports, unused_crate_dependencies)]
#![warn(missing_docs)]

mod hypothesis;
mod problem;

pub use hypothesis::Hypothesis;
pub use problem::ProblemType;

/// The parameter vector of a model, one coefficient per feature column
pub type Theta = nalgebra::DVector<f64>;

/// The class code every unrecognized label is mapped to
pub const FALLBACK_CLASS: usize = 0;
