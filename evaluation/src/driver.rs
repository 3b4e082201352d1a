//! Trains a model on a row prefix of the design matrix

use std::sync::Arc;

use crossbeam::channel::unbounded;
use lin_reg::{CostFunction, Fit, LinReg};
use nalgebra::{DMatrix, DVector};
use threadpool::ThreadPool;

use crate::{Error, Result, Task};

/// A binary classifier for one class of a one-vs-rest model
#[derive(Debug, Clone)]
pub struct ClassModel {
    /// The class code this classifier recognizes
    pub class: usize,
    pub fit: Fit,
}

/// A trained model
#[derive(Debug, Clone)]
pub enum Model {
    /// A single regression or binary classification fit
    Single(Fit),
    /// One classifier per known class, in ascending class code order
    OneVsRest(Vec<ClassModel>),
}

impl Model {
    /// All fits of this model
    pub fn fits(&self) -> Vec<&Fit> {
        match self {
            Model::Single(fit) => vec![fit],
            Model::OneVsRest(classes) => classes.iter().map(|c| &c.fit).collect(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Model::Single(_) => "single",
            Model::OneVsRest(_) => "one-vs-rest",
        }
    }
}

/// Runs the optimizer once per model, or once per class for one-vs-rest
#[derive(Debug, Clone)]
pub struct TrainingDriver<R> {
    regressor: R,
    threads: usize,
}

impl<R> TrainingDriver<R>
where
    R: LinReg + Send + Sync + 'static,
{
    /// Create a new driver
    ///
    /// # Arguments:
    /// regressor: The optimizer fitting each model
    /// threads: Worker threads for the one-vs-rest class loop,
    /// 1 trains sequentially and 0 picks a count from the available cores
    pub fn new(regressor: R, threads: usize) -> Self {
        let threads = match threads {
            0 => std::cmp::max(num_cpus::get().saturating_sub(2), 1),
            n => n,
        };
        Self { regressor, threads }
    }

    /// Train on the first `train_len` rows
    pub fn train(
        &self,
        task: &Task,
        design: &Arc<DMatrix<f64>>,
        targets: &Arc<DVector<f64>>,
        train_len: usize,
    ) -> Result<Model> {
        if train_len > design.nrows() || train_len > targets.nrows() {
            return Err(Error::TrainingSetTooLarge {
                train_len,
                total: design.nrows(),
            });
        }
        let cost_fn = task.cost_fn();
        match task {
            Task::Regression => {
                let fit = self.regressor.fit(
                    &design.rows(0, train_len),
                    &targets.rows(0, train_len),
                    cost_fn,
                )?;
                Ok(Model::Single(fit))
            }
            Task::Binary { positive_class, .. } => {
                let fit =
                    fit_class(&self.regressor, design, targets, train_len, *positive_class, cost_fn)?;
                Ok(Model::Single(fit))
            }
            Task::Multiclass { labels } => {
                if labels.num_classes() == 0 {
                    return Err(Error::NoClasses);
                }
                let classes: Vec<usize> = labels.codes().collect();
                let models = if self.threads > 1 && classes.len() > 1 {
                    self.train_parallel(&classes, design, targets, train_len, cost_fn)?
                } else {
                    classes
                        .iter()
                        .map(|&class| -> Result<ClassModel> {
                            let regressor = self.regressor.reseeded(class as u64);
                            let fit =
                                fit_class(&regressor, design, targets, train_len, class, cost_fn)?;
                            debug!("class {} trained in {} iterations", class, fit.iterations);
                            Ok(ClassModel { class, fit })
                        })
                        .collect::<Result<Vec<ClassModel>>>()?
                };
                Ok(Model::OneVsRest(models))
            }
        }
    }

    fn train_parallel(
        &self,
        classes: &[usize],
        design: &Arc<DMatrix<f64>>,
        targets: &Arc<DVector<f64>>,
        train_len: usize,
        cost_fn: CostFunction,
    ) -> Result<Vec<ClassModel>> {
        let pool = ThreadPool::new(self.threads);

        let (ch_fit_s, ch_fit_r) = unbounded();
        for (i, &class) in classes.iter().enumerate() {
            let ch_fit_s = ch_fit_s.clone();
            let design = design.clone();
            let targets = targets.clone();
            let regressor = self.regressor.reseeded(class as u64);
            pool.execute(move || {
                let fit = fit_class(&regressor, &design, &targets, train_len, class, cost_fn);
                // the receiver only hangs up after every sender is gone
                let _ = ch_fit_s.send((i, fit));
            });
        }
        drop(ch_fit_s);

        let mut fits: Vec<Option<lin_reg::Result<Fit>>> = classes.iter().map(|_| None).collect();
        while let Ok((i, fit)) = ch_fit_r.recv() {
            fits[i] = Some(fit);
        }

        classes
            .iter()
            .zip(fits)
            .map(|(&class, fit)| -> Result<ClassModel> {
                match fit {
                    Some(fit) => Ok(ClassModel { class, fit: fit? }),
                    None => Err(Error::WorkerLost { class }),
                }
            })
            .collect()
    }
}

/// Fit a binary classifier separating `class` from every other class code
fn fit_class<R: LinReg>(
    regressor: &R,
    design: &DMatrix<f64>,
    targets: &DVector<f64>,
    train_len: usize,
    class: usize,
    cost_fn: CostFunction,
) -> lin_reg::Result<Fit> {
    let partial: DVector<f64> = DVector::from_iterator(
        train_len,
        targets.rows(0, train_len).iter().map(|c| if *c == class as f64 { 1.0 } else { 0.0 }),
    );
    regressor.fit(&design.rows(0, train_len), &partial.rows(0, train_len), cost_fn)
}

#[cfg(test)]
mod tests {
    use features::LabelMap;
    use lin_reg::{GradientDescent, Outcome};

    use super::*;

    fn data() -> (Arc<DMatrix<f64>>, Arc<DVector<f64>>) {
        // class 1 left, class 2 right, class 3 on top
        let rows: Vec<(f64, f64, f64)> = (0..30)
            .map(|i| {
                let t = (i / 3) as f64 / 10.0;
                match i % 3 {
                    0 => (-1.0 - t, 0.0, 1.0),
                    1 => (1.0 + t, 0.0, 2.0),
                    _ => (0.0, 1.0 + t, 3.0),
                }
            })
            .collect();
        let design = DMatrix::from_fn(rows.len(), 3, |i, j| match j {
            0 => 1.0,
            1 => rows[i].0,
            _ => rows[i].1,
        });
        let targets = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.2));
        (Arc::new(design), Arc::new(targets))
    }

    fn task() -> Task {
        Task::Multiclass {
            labels: LabelMap::new(vec!["a".into(), "b".into(), "c".into()], "Other"),
        }
    }

    fn regressor() -> GradientDescent {
        GradientDescent {
            learning_rate: 0.5,
            tolerance: 1e-5,
            ..Default::default()
        }
    }

    #[test]
    fn one_vs_rest_trains_every_class() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let (design, targets) = data();
        let driver = TrainingDriver::new(regressor(), 1);
        let model = driver.train(&task(), &design, &targets, 30).unwrap();

        match model {
            Model::OneVsRest(classes) => {
                assert_eq!(classes.iter().map(|c| c.class).collect::<Vec<usize>>(), vec![1, 2, 3]);
                assert!(classes.iter().all(|c| c.fit.outcome != Outcome::Diverged));
            }
            _ => panic!("expected a one-vs-rest model"),
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let (design, targets) = data();
        let regressor = GradientDescent {
            init: lin_reg::ThetaInit::Random,
            seed: Some(3),
            ..regressor()
        };
        let sequential = TrainingDriver::new(regressor.clone(), 1)
            .train(&task(), &design, &targets, 24)
            .unwrap();
        let parallel =
            TrainingDriver::new(regressor, 3).train(&task(), &design, &targets, 24).unwrap();

        let thetas = |m: &Model| m.fits().iter().map(|f| f.theta.clone()).collect::<Vec<_>>();
        assert_eq!(thetas(&sequential), thetas(&parallel));
    }

    #[test]
    fn binary_uses_positive_class() {
        let (design, targets) = data();
        let task = Task::Binary {
            labels: LabelMap::new(vec!["a".into(), "b".into(), "c".into()], "Other"),
            positive_class: 2,
        };
        let model = TrainingDriver::new(regressor(), 1).train(&task, &design, &targets, 30).unwrap();

        let fit = match model {
            Model::Single(fit) => fit,
            _ => panic!("expected a single model"),
        };
        // class 2 sits at large x1
        assert!(fit.theta[1] > 0.0);
    }

    #[test]
    fn multiclass_without_classes() {
        let (design, targets) = data();
        let task = Task::Multiclass {
            labels: LabelMap::new(vec![], "Other"),
        };
        let err = TrainingDriver::new(regressor(), 1).train(&task, &design, &targets, 30).unwrap_err();
        assert!(matches!(err, Error::NoClasses));
    }
}
