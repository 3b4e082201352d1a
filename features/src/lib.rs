//! Loading of delimited datasets and their expansion into design matrices

#[macro_use]
extern crate log;

mod constructors;
mod dataset;
mod error;
mod expander;
mod labels;
mod normalization;

pub use constructors::{FeatureConstructor, PairwiseConstructor, PowerConstructor};
pub use dataset::{CsvOptions, Dataset};
pub use error::{Error, Result};
pub use expander::{ExpansionPolicy, FeatureExpander, FeatureSet, TargetEncoding};
pub use labels::LabelMap;
pub use normalization::Normalization;
