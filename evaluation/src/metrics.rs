use serde::Serialize;

/// Prediction successes for the rows of one true class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTally {
    /// Class code of the true label
    pub class: usize,
    pub label: String,
    pub successes: usize,
    pub total: usize,
}

impl ClassTally {
    #[inline(always)]
    pub fn ratio(&self) -> f64 {
        ratio(self.successes, self.total)
    }
}

/// Aggregated held-out performance of a trained model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metrics {
    Regression {
        /// Root mean square error over the sampled rows
        rmse: f64,
        samples: usize,
    },
    Classification {
        successes: usize,
        total: usize,
        /// Grouped by true label, in ascending class code order
        per_class: Vec<ClassTally>,
    },
}

impl Metrics {
    /// Fraction of correctly classified rows
    pub fn success_ratio(&self) -> Option<f64> {
        match self {
            Metrics::Classification {
                successes, total, ..
            } => Some(ratio(*successes, *total)),
            Metrics::Regression { .. } => None,
        }
    }

    pub fn rmse(&self) -> Option<f64> {
        match self {
            Metrics::Regression { rmse, .. } => Some(*rmse),
            Metrics::Classification { .. } => None,
        }
    }

    /// The tally of one true class, if any sampled row had it
    pub fn class(&self, class: usize) -> Option<&ClassTally> {
        match self {
            Metrics::Classification { per_class, .. } => per_class.iter().find(|t| t.class == class),
            Metrics::Regression { .. } => None,
        }
    }
}

#[inline(always)]
fn ratio(successes: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        successes as f64 / total as f64
    }
}
