use common::Theta;
use nalgebra::{DMatrixView, DVectorView};
use nanorand::{Rng, WyRand};
use serde::{Deserialize, Serialize};

use crate::{cost::predictions, CostFunction, Error, Fit, LinReg, Outcome, Result};

/// How the parameters are initialized before the first iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThetaInit {
    /// All coefficients start at 0
    #[default]
    Zero,
    /// Uniform in [-1, 1), drawn from the seeded rng
    Random,
}

/// What to do once the cost goes up between two iterations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergencePolicy {
    /// Log a warning and keep the last parameters that lowered the cost
    #[default]
    Warn,
    /// Fail the fit with `Error::Diverged`
    Abort,
}

/// Batch gradient descent with a decrease based stopping rule.
///
/// Every iteration updates all coefficients from the same starting theta:
/// theta_j <- theta_j * (1 - alpha * lambda / m) - (alpha / m) * sum((h(x_i) - y_i) * x_ij)
/// where the shrinkage factor is not applied to the bias theta_0.
/// Iterating stops once the cost decreases by no more than `tolerance`.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    /// Step size alpha, fixed for the whole run
    pub learning_rate: f64,
    /// Lambda, 0 disables regularization
    pub regularization_coeff: f64,
    /// Minimum cost decrease required to keep iterating
    pub tolerance: f64,
    /// Safety bound on the number of updates
    pub max_iterations: usize,
    pub init: ThetaInit,
    pub on_divergence: DivergencePolicy,
    /// Optional seed for Rng
    pub seed: Option<u64>,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            regularization_coeff: 0.0,
            tolerance: 1e-4,
            max_iterations: 100_000,
            init: ThetaInit::Zero,
            on_divergence: DivergencePolicy::Warn,
            seed: None,
        }
    }
}

impl GradientDescent {
    fn initial_theta(&self, n: usize) -> Theta {
        match self.init {
            ThetaInit::Zero => Theta::zeros(n),
            ThetaInit::Random => {
                let mut rng = match self.seed {
                    Some(seed) => WyRand::new_seed(seed),
                    None => WyRand::new(),
                };
                Theta::from_iterator(n, (0..n).map(|_| rng.generate::<f64>() * 2.0 - 1.0))
            }
        }
    }

    /// Perform a single synchronous update of all coefficients
    fn step(
        &self,
        theta: &Theta,
        design: &DMatrixView<f64>,
        targets: &DVectorView<f64>,
        cost_fn: CostFunction,
    ) -> Theta {
        let m = design.nrows() as f64;
        let residuals = predictions(cost_fn.hypothesis(), theta, design) - targets;
        let gradient = design.tr_mul(&residuals);

        let shrinkage = 1.0 - self.learning_rate * self.regularization_coeff / m;
        Theta::from_iterator(
            theta.len(),
            theta.iter().zip(gradient.iter()).enumerate().map(|(j, (t, g))| {
                let decay = if j == 0 { 1.0 } else { shrinkage };
                t * decay - (self.learning_rate / m) * g
            }),
        )
    }
}

impl LinReg for GradientDescent {
    fn fit(
        &self,
        design: &DMatrixView<f64>,
        targets: &DVectorView<f64>,
        cost_fn: CostFunction,
    ) -> Result<Fit> {
        if design.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        if design.nrows() != targets.nrows() {
            return Err(Error::DimensionMismatch {
                rows: design.nrows(),
                targets: targets.nrows(),
            });
        }

        let mut theta = self.initial_theta(design.ncols());
        let mut cost = cost_fn.cost(&theta, design, targets, self.regularization_coeff);
        let mut iterations: usize = 0;
        debug!("initial cost: {}, design: ({}, {})", cost, design.nrows(), design.ncols());

        let outcome = loop {
            if iterations >= self.max_iterations {
                warn!(
                    "stopped after {} iterations without converging, cost: {}",
                    iterations, cost
                );
                break Outcome::IterationCap;
            }

            let next = self.step(&theta, design, targets, cost_fn);
            iterations += 1;
            let new_cost = cost_fn.cost(&next, design, targets, self.regularization_coeff);

            if !new_cost.is_finite() || new_cost > cost {
                match self.on_divergence {
                    DivergencePolicy::Abort => {
                        return Err(Error::Diverged {
                            iteration: iterations,
                            previous: cost,
                            cost: new_cost,
                        })
                    }
                    DivergencePolicy::Warn => {
                        warn!(
                            "cost increased from {} to {} at iteration {}, learning rate {} is likely too large",
                            cost, new_cost, iterations, self.learning_rate
                        );
                        break Outcome::Diverged;
                    }
                }
            }

            let decrease = cost - new_cost;
            theta = next;
            cost = new_cost;
            trace!("iteration {}: cost {}", iterations, cost);

            if decrease <= self.tolerance {
                break Outcome::Converged;
            }
        };
        debug!("{:?} after {} iterations with cost {}", outcome, iterations, cost);

        Ok(Fit {
            theta,
            cost,
            iterations,
            outcome,
        })
    }

    fn reseeded(&self, stream: u64) -> Self {
        Self {
            seed: self.seed.map(|s| s.wrapping_add(stream)),
            ..self.clone()
        }
    }
}
