#[macro_use]
extern crate log;

use common::Theta;
use nalgebra::{DMatrixView, DVectorView};
use serde::Serialize;

mod cost;
mod error;
mod gradient_descent;

pub use cost::{CostFunction, PROBABILITY_EPSILON};
pub use error::{Error, Result};
pub use gradient_descent::{DivergencePolicy, GradientDescent, ThetaInit};

/// How an optimizer run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The cost decrease fell below the tolerance
    Converged,
    /// The iteration bound was reached first
    IterationCap,
    /// The cost went up and the run was stopped before that update
    Diverged,
}

/// The result of fitting a model
#[derive(Debug, Clone)]
pub struct Fit {
    /// The trained parameters
    pub theta: Theta,
    /// Cost of `theta` over the training rows
    pub cost: f64,
    /// Number of parameter updates computed
    pub iterations: usize,
    pub outcome: Outcome,
}

/// Generic way of fitting the parameters of a linear or logistic model
pub trait LinReg: Clone {
    /// Fit the parameters mapping design rows to targets
    ///
    /// # Parameters
    /// design: Input data, where the first column should be just 1s
    /// targets: One target per design row
    /// cost_fn: The loss to minimize, which also fixes the hypothesis
    fn fit(
        &self,
        design: &DMatrixView<f64>,
        targets: &DVectorView<f64>,
        cost_fn: CostFunction,
    ) -> Result<Fit>;

    /// An otherwise identical fitter drawing from an independent random stream
    fn reseeded(&self, stream: u64) -> Self;
}
