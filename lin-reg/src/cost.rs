use common::{Hypothesis, Theta};
use nalgebra::{DMatrixView, DVector, DVectorView};
use serde::{Deserialize, Serialize};

/// Probabilities are kept this far away from 0 and 1 before taking logs
pub const PROBABILITY_EPSILON: f64 = 1e-12;

/// Regularized loss minimized by the optimizer.
/// The bias coefficient theta_0 is never part of the penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFunction {
    /// (1/2m) * [sum((h - y)^2) + lambda * sum(theta_j^2)], with a linear hypothesis
    SquaredError,
    /// -(1/m) * sum(y log(h) + (1 - y) log(1 - h)) + (lambda/2m) * sum(theta_j^2),
    /// with a logistic hypothesis
    CrossEntropy,
}

impl CostFunction {
    /// The cost function matching the way a hypothesis is interpreted
    pub fn for_hypothesis(hypothesis: Hypothesis) -> Self {
        match hypothesis {
            Hypothesis::Linear => CostFunction::SquaredError,
            Hypothesis::Logistic => CostFunction::CrossEntropy,
        }
    }

    #[inline(always)]
    pub fn hypothesis(&self) -> Hypothesis {
        match self {
            CostFunction::SquaredError => Hypothesis::Linear,
            CostFunction::CrossEntropy => Hypothesis::Logistic,
        }
    }

    /// Evaluate the cost of `theta` over all rows of the design matrix
    ///
    /// # Arguments:
    /// theta: The parameters, one per design column
    /// design: Training rows, where the first column should be just 1s
    /// targets: One target per design row
    /// regularization_coeff: Lambda, 0 disables the penalty
    pub fn cost(
        &self,
        theta: &Theta,
        design: &DMatrixView<f64>,
        targets: &DVectorView<f64>,
        regularization_coeff: f64,
    ) -> f64 {
        let m = design.nrows() as f64;
        let h = predictions(self.hypothesis(), theta, design);
        let penalty = regularization_coeff * theta.iter().skip(1).map(|t| t * t).sum::<f64>();

        match self {
            CostFunction::SquaredError => {
                let sse: f64 = h.iter().zip(targets.iter()).map(|(&h, &y)| (h - y).powi(2)).sum();
                (sse + penalty) / (2.0 * m)
            }
            CostFunction::CrossEntropy => {
                let mut clamped: usize = 0;
                let log_likelihood: f64 = h
                    .iter()
                    .zip(targets.iter())
                    .map(|(&h, &y)| {
                        let p = h.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
                        if p != h {
                            clamped += 1;
                        }
                        y * p.ln() + (1.0 - y) * (1.0 - p).ln()
                    })
                    .sum();
                if clamped > 0 {
                    trace!("clamped {} saturated probabilities before taking logs", clamped);
                }
                -log_likelihood / m + penalty / (2.0 * m)
            }
        }
    }
}

/// The hypothesis applied to every row of the design matrix
pub(crate) fn predictions(
    hypothesis: Hypothesis,
    theta: &Theta,
    design: &DMatrixView<f64>,
) -> DVector<f64> {
    let mut h = design * theta;
    hypothesis.activate_all(h.as_mut_slice());
    h
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;
    use round::round;

    use super::*;

    fn design() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 3, &[
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            1.0, 2.0, 1.0, //
            1.0, 3.0, 2.0, //
        ])
    }

    #[test]
    fn squared_error_at_optimum() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let design = design();
        let targets = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let theta = Theta::from_vec(vec![1.0, 1.0, 0.0]);

        let cost = CostFunction::SquaredError.cost(
            &theta,
            &design.rows(0, design.nrows()),
            &targets.rows(0, targets.nrows()),
            0.0,
        );
        assert_eq!(cost, 0.0);

        // residuals of 1 everywhere
        let theta = Theta::from_vec(vec![2.0, 1.0, 0.0]);
        let cost = CostFunction::SquaredError.cost(
            &theta,
            &design.rows(0, design.nrows()),
            &targets.rows(0, targets.nrows()),
            0.0,
        );
        assert_eq!(cost, 0.5);
    }

    #[test]
    fn regularization_skips_bias() {
        let design = design();
        let targets = DVector::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let x = design.rows(0, 4);
        let y = targets.rows(0, 4);

        for cost_fn in [CostFunction::SquaredError, CostFunction::CrossEntropy] {
            // only the bias is non-zero, lambda must not matter
            let bias_only = Theta::from_vec(vec![5.0, 0.0, 0.0]);
            assert_eq!(cost_fn.cost(&bias_only, &x, &y, 0.0), cost_fn.cost(&bias_only, &x, &y, 10.0));

            let theta = Theta::from_vec(vec![0.5, 1.0, -2.0]);
            let mut prev = cost_fn.cost(&theta, &x, &y, 0.0);
            for lambda in [0.1, 1.0, 10.0, 100.0] {
                let cost = cost_fn.cost(&theta, &x, &y, lambda);
                assert!(cost > prev, "{:?}: lambda {} did not increase the cost", cost_fn, lambda);
                prev = cost;
            }
        }
    }

    #[test]
    fn cross_entropy_is_finite_when_saturated() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let design = design();
        // every prediction is 1.0 in f64 precision while half of the targets are 0
        let targets = DVector::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let theta = Theta::from_vec(vec![1000.0, 0.0, 0.0]);

        let cost = CostFunction::CrossEntropy.cost(
            &theta,
            &design.rows(0, 4),
            &targets.rows(0, 4),
            0.0,
        );
        assert!(cost.is_finite());
        assert!((cost + PROBABILITY_EPSILON.ln() / 2.0).abs() < 1e-3);
    }

    #[test]
    fn cross_entropy_at_half() {
        let design = design();
        let targets = DVector::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let theta = Theta::zeros(3);

        let cost = CostFunction::CrossEntropy.cost(
            &theta,
            &design.rows(0, 4),
            &targets.rows(0, 4),
            3.0,
        );
        assert_eq!(round(cost, 9), round(std::f64::consts::LN_2, 9));
    }
}
