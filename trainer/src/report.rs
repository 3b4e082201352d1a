use std::fmt;

use evaluation::{Metrics, Model};
use features::LabelMap;
use lin_reg::Outcome;
use serde::Serialize;

/// How the optimizer ended for one fitted model
#[derive(Debug, Clone, Serialize)]
pub struct FitSummary {
    /// Name of the class a one-vs-rest classifier recognizes
    pub class: Option<String>,
    pub iterations: usize,
    pub cost: f64,
    pub outcome: Outcome,
    pub theta: Vec<f64>,
}

impl FitSummary {
    pub(crate) fn from_model(model: &Model, labels: Option<&LabelMap>) -> Vec<Self> {
        let summary = |class: Option<String>, fit: &lin_reg::Fit| Self {
            class,
            iterations: fit.iterations,
            cost: fit.cost,
            outcome: fit.outcome,
            theta: fit.theta.iter().cloned().collect(),
        };
        match model {
            Model::Single(fit) => vec![summary(None, fit)],
            Model::OneVsRest(classes) => classes
                .iter()
                .map(|c| summary(labels.map(|l| l.name(c.class).to_string()), &c.fit))
                .collect(),
        }
    }
}

/// The outcome of training on one prefix size and scoring the held-out rows
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub training_size: usize,
    /// Wall clock time of training and evaluation
    pub elapsed_secs: f64,
    pub fits: Vec<FitSummary>,
    /// Rows of the whole dataset whose label fell back to the reserved class
    pub unrecognized_labels: usize,
    pub metrics: Metrics,
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: {}, Elapsed: {:.3}s", self.training_size, self.elapsed_secs)?;
        for fit in &self.fits {
            match &fit.class {
                Some(class) => write!(f, "  {}: ", class)?,
                None => write!(f, "  ")?,
            }
            writeln!(
                f,
                "{:?} after {} iterations, cost {:.6}",
                fit.outcome, fit.iterations, fit.cost
            )?;
        }
        match &self.metrics {
            Metrics::Regression { rmse, samples } => {
                writeln!(f, "RMSE over {} held-out rows: {:.6}", samples, rmse)?;
            }
            Metrics::Classification {
                successes,
                total,
                per_class,
            } => {
                for tally in per_class {
                    writeln!(
                        f,
                        "Success rate for {}: {} / {} ({:.4})",
                        tally.label,
                        tally.successes,
                        tally.total,
                        tally.ratio()
                    )?;
                }
                writeln!(
                    f,
                    "Overall success rate: {} / {} ({:.4})",
                    successes,
                    total,
                    self.metrics.success_ratio().unwrap_or(0.0)
                )?;
            }
        }
        if self.unrecognized_labels > 0 {
            writeln!(f, "Unrecognized labels: {}", self.unrecognized_labels)?;
        }
        write!(f, "-----------------------------------")
    }
}
