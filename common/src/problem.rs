use serde::{Deserialize, Serialize};

use crate::Hypothesis;

/// The kind of model being trained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    /// Continuous response, scored by RMSE
    Regression,
    /// A single 0/1 classifier, scored by accuracy
    BinaryClassification,
    /// One-vs-rest over all known classes, scored by accuracy per class
    MulticlassClassification,
}

impl ProblemType {
    /// The hypothesis a model of this kind predicts with
    #[inline(always)]
    pub fn hypothesis(&self) -> Hypothesis {
        match self {
            ProblemType::Regression => Hypothesis::Linear,
            _ => Hypothesis::Logistic,
        }
    }

    /// Whether the targets are class codes rather than a continuous response
    #[inline(always)]
    pub fn is_classification(&self) -> bool {
        !matches!(self, ProblemType::Regression)
    }
}
