use serde::{Deserialize, Serialize};

use crate::Theta;

/// The possible hypothesis functions mapping `theta·x` to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hypothesis {
    /// The identity function, used for regression
    Linear,
    /// The sigmoid, producing a class membership probability in (0, 1)
    Logistic,
}

impl Hypothesis {
    /// Apply the hypothesis to an already computed dot product
    #[inline(always)]
    pub fn activate(&self, z: f64) -> f64 {
        match self {
            Hypothesis::Linear => z,
            Hypothesis::Logistic => 1.0 / (1.0 + (-z).exp()),
        }
    }

    /// Perform the hypothesis over all elements
    pub fn activate_all(&self, vals: &mut [f64]) {
        match self {
            Hypothesis::Linear => {}
            Hypothesis::Logistic => {
                for v in vals {
                    *v = 1.0 / (1.0 + (-*v).exp());
                }
            }
        }
    }

    /// Predict a single feature row
    ///
    /// # Arguments:
    /// theta: One coefficient per feature column
    /// features: The feature row, including the leading bias value
    pub fn predict<'a, I>(&self, theta: &Theta, features: I) -> f64
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let z: f64 = theta.iter().zip(features).map(|(t, x)| t * x).sum();
        self.activate(z)
    }
}
