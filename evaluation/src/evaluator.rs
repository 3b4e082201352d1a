use std::collections::BTreeMap;

use common::{Hypothesis, FALLBACK_CLASS};
use features::LabelMap;
use nalgebra::{DMatrix, DVector};
use nanorand::{Rng, WyRand};

use crate::{ClassModel, ClassTally, Error, Metrics, Model, Result, Task};

/// Scores a trained model on rows it was not trained on
#[derive(Debug)]
pub struct Evaluator {
    test_sample_count: usize,
    rng: WyRand,
}

impl Evaluator {
    /// Create a new evaluator
    ///
    /// # Arguments:
    /// test_sample_count: Number of held-out rows to score
    /// seed: Optional seed for the row sampling
    pub fn new(test_sample_count: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };
        Self::with_rng(test_sample_count, rng)
    }

    pub fn with_rng(test_sample_count: usize, rng: WyRand) -> Self {
        Self {
            test_sample_count,
            rng,
        }
    }

    /// Draw row indices without replacement from `[train_len, total)`.
    /// Returns the whole pool when it is smaller than the sample count.
    pub fn sample_held_out(&mut self, train_len: usize, total: usize) -> Result<Vec<usize>> {
        if train_len >= total {
            return Err(Error::EmptyHeldOutPool { train_len, total });
        }
        let mut pool: Vec<usize> = (train_len..total).collect();
        let n = self.test_sample_count.min(pool.len());
        // partial fisher-yates
        for i in 0..n {
            let j = self.rng.generate_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(n);

        Ok(pool)
    }

    /// Evaluate `model` on held-out rows of the design matrix
    ///
    /// # Arguments:
    /// design: The full design matrix, training rows first
    /// targets: Response or class code of every row
    /// train_len: Number of leading rows the model was trained on
    pub fn evaluate(
        &mut self,
        model: &Model,
        task: &Task,
        design: &DMatrix<f64>,
        targets: &DVector<f64>,
        train_len: usize,
    ) -> Result<Metrics> {
        let samples = self.sample_held_out(train_len, design.nrows())?;
        debug!("scoring {} held-out rows", samples.len());

        let rows = samples.iter().map(|&i| {
            let row: Vec<f64> = design.row(i).iter().cloned().collect();
            (row, targets[i])
        });

        match (task, model) {
            (Task::Regression, Model::Single(fit)) => {
                let (sse, n) = rows.fold((0.0, 0usize), |(sse, n), (row, y)| {
                    let h = Hypothesis::Linear.predict(&fit.theta, &row);
                    (sse + (h - y).powi(2), n + 1)
                });
                Ok(Metrics::Regression {
                    rmse: (sse / n as f64).sqrt(),
                    samples: n,
                })
            }
            (
                Task::Binary {
                    labels,
                    positive_class,
                },
                Model::Single(fit),
            ) => {
                let outcomes = rows.map(|(row, code)| {
                    let predicted = Hypothesis::Logistic.predict(&fit.theta, &row) >= 0.5;
                    let actual = code as usize == *positive_class;
                    (code as usize, predicted == actual)
                });
                Ok(tally(labels, outcomes))
            }
            (Task::Multiclass { labels }, Model::OneVsRest(classes)) => {
                let outcomes = rows.map(|(row, code)| {
                    let (predicted, _) = predict_class(classes, &row);
                    (code as usize, predicted == code as usize)
                });
                Ok(tally(labels, outcomes))
            }
            (task, model) => Err(Error::ModelMismatch {
                model: model.name(),
                task: task.name(),
            }),
        }
    }
}

/// Pick the class whose classifier is most confident about `row`.
///
/// Starts from the fallback class with a confidence of 0, so any classifier
/// with a positive score wins over no match. Only a strictly greater
/// confidence replaces the current best, ties keep the earlier class.
pub fn predict_class(classes: &[ClassModel], row: &[f64]) -> (usize, f64) {
    let mut best = (FALLBACK_CLASS, 0.0);
    for c in classes {
        let confidence = Hypothesis::Logistic.predict(&c.fit.theta, row);
        if confidence > best.1 {
            best = (c.class, confidence);
        }
    }
    best
}

/// Aggregate (true class, success) pairs overall and per true class
fn tally<I>(labels: &LabelMap, outcomes: I) -> Metrics
where
    I: Iterator<Item = (usize, bool)>,
{
    let mut per_class: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for (class, success) in outcomes {
        let entry = per_class.entry(class).or_insert((0, 0));
        if success {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let per_class: Vec<ClassTally> = per_class
        .into_iter()
        .map(|(class, (successes, total))| ClassTally {
            class,
            label: labels.name(class).to_string(),
            successes,
            total,
        })
        .collect();

    Metrics::Classification {
        successes: per_class.iter().map(|t| t.successes).sum(),
        total: per_class.iter().map(|t| t.total).sum(),
        per_class,
    }
}

#[cfg(test)]
mod tests {
    use common::Theta;
    use lin_reg::{Fit, Outcome};
    use round::round;

    use super::*;

    fn fit(theta: Vec<f64>) -> Fit {
        Fit {
            theta: Theta::from_vec(theta),
            cost: 0.0,
            iterations: 0,
            outcome: Outcome::Converged,
        }
    }

    fn labels() -> LabelMap {
        LabelMap::new(vec!["a".into(), "b".into()], "Other")
    }

    #[test]
    fn held_out_never_contains_training_rows() {
        let mut evaluator = Evaluator::new(25, Some(0));
        for train_len in [1, 10, 50, 99] {
            let samples = evaluator.sample_held_out(train_len, 100).unwrap();
            assert_eq!(samples.len(), 25usize.min(100 - train_len));
            assert!(samples.iter().all(|&i| i >= train_len && i < 100));

            let mut unique = samples.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), samples.len());
        }

        let err = evaluator.sample_held_out(100, 100).unwrap_err();
        assert!(matches!(err, Error::EmptyHeldOutPool { train_len: 100, total: 100 }));
    }

    #[test]
    fn held_out_sampling_is_seeded() {
        let a = Evaluator::new(10, Some(5)).sample_held_out(20, 1000).unwrap();
        let b = Evaluator::new(10, Some(5)).sample_held_out(20, 1000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn predict_class_tie_break() {
        let classes = vec![
            ClassModel {
                class: 1,
                fit: fit(vec![0.0, 1.0]),
            },
            ClassModel {
                class: 2,
                fit: fit(vec![0.0, 1.0]),
            },
        ];
        // identical confidence, the earlier class is kept
        let (class, confidence) = predict_class(&classes, &[1.0, 2.0]);
        assert_eq!(class, 1);
        assert!(confidence > 0.5);

        assert_eq!(predict_class(&[], &[1.0, 2.0]), (FALLBACK_CLASS, 0.0));
    }

    #[test]
    fn evaluate_regression_rmse() {
        let design = DMatrix::from_fn(10, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        // every held-out target is off by exactly 0.5
        let targets = DVector::from_iterator(10, (0..10).map(|i| i as f64 + 0.5));
        let model = Model::Single(fit(vec![0.0, 1.0]));

        let metrics = Evaluator::new(100, Some(1))
            .evaluate(&model, &Task::Regression, &design, &targets, 6)
            .unwrap();
        assert_eq!(metrics, Metrics::Regression { rmse: 0.5, samples: 4 });
    }

    #[test]
    fn evaluate_binary_threshold() {
        let design = DMatrix::from_fn(8, 2, |i, j| if j == 0 { 1.0 } else { i as f64 - 4.0 });
        // positive class 2 for x >= 0, one mislabelled row at x = 3
        let targets = DVector::from_vec(vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 0.0]);
        let model = Model::Single(fit(vec![0.0, 1.0]));
        let task = Task::Binary {
            labels: labels(),
            positive_class: 2,
        };

        let metrics =
            Evaluator::new(100, Some(1)).evaluate(&model, &task, &design, &targets, 2).unwrap();
        info!("metrics: {:?}", metrics);

        assert_eq!(round(metrics.success_ratio().unwrap(), 3), round(5.0 / 6.0, 3));
        let other = metrics.class(FALLBACK_CLASS).unwrap();
        assert_eq!((other.successes, other.total), (0, 1));
        assert_eq!(other.label, "Other");
    }

    #[test]
    fn evaluate_model_mismatch() {
        let design = DMatrix::from_element(4, 2, 1.0);
        let targets = DVector::from_element(4, 1.0);
        let model = Model::Single(fit(vec![0.0, 1.0]));
        let task = Task::Multiclass { labels: labels() };

        let err =
            Evaluator::new(2, Some(1)).evaluate(&model, &task, &design, &targets, 2).unwrap_err();
        assert!(matches!(err, Error::ModelMismatch { .. }));
    }
}
