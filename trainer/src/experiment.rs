//! Training and scoring on growing prefixes of one expanded dataset

use std::{sync::Arc, time::Instant};

use evaluation::{Evaluator, Task, TrainingDriver};
use features::{Dataset, FeatureExpander};
use lin_reg::GradientDescent;
use nalgebra::{DMatrix, DVector};

use crate::{report::FitSummary, ExperimentConfig, ExperimentReport, Result};

/// Read the dataset a configuration points at
pub fn load_dataset(config: &ExperimentConfig) -> Result<Dataset> {
    info!("loading {}", config.data.path.display());
    let dataset = Dataset::from_path(&config.data.path, &config.data.csv)?;
    info!("got {} rows with {} features", dataset.len(), dataset.num_features());

    Ok(dataset)
}

/// The expanded dataset plus everything needed to train on a prefix of it
#[derive(Debug)]
pub struct Experiment {
    task: Task,
    design: Arc<DMatrix<f64>>,
    targets: Arc<DVector<f64>>,
    unrecognized_labels: usize,
    driver: TrainingDriver<GradientDescent>,
    training_sizes: Vec<usize>,
    test_sample_count: usize,
    seed: Option<u64>,
}

impl Experiment {
    /// Validate the configuration against the dataset and expand its features once
    pub fn new(config: &ExperimentConfig, dataset: &Dataset) -> Result<Self> {
        config.validate()?;
        config.validate_for(dataset.len())?;

        let task = config.task()?;
        let expander = FeatureExpander::new(config.expansion);
        let set = expander.expand(dataset, &config.target_encoding()?)?;
        if set.unrecognized_labels > 0 {
            warn!("{} rows use the fallback class", set.unrecognized_labels);
        }
        info!("design matrix has {} columns", set.design.ncols());

        Ok(Self {
            task,
            design: Arc::new(set.design),
            targets: Arc::new(set.targets),
            unrecognized_labels: set.unrecognized_labels,
            driver: TrainingDriver::new(config.regressor(), config.threads),
            training_sizes: config.training_sizes.clone(),
            test_sample_count: config.test_sample_count,
            seed: config.seed,
        })
    }

    #[inline(always)]
    pub fn training_sizes(&self) -> &[usize] {
        &self.training_sizes
    }

    #[inline(always)]
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Train on the first `training_size` rows and score rows after them
    pub fn run_size(&self, training_size: usize) -> Result<ExperimentReport> {
        let t0 = Instant::now();

        let model = self.driver.train(&self.task, &self.design, &self.targets, training_size)?;
        let mut evaluator = Evaluator::new(
            self.test_sample_count,
            self.seed.map(|s| s.wrapping_add(training_size as u64)),
        );
        let metrics =
            evaluator.evaluate(&model, &self.task, &self.design, &self.targets, training_size)?;

        let elapsed = t0.elapsed();
        info!("training size {} done in {}ms", training_size, elapsed.as_millis());

        Ok(ExperimentReport {
            training_size,
            elapsed_secs: elapsed.as_secs_f64(),
            fits: FitSummary::from_model(&model, self.task.labels()),
            unrecognized_labels: self.unrecognized_labels,
            metrics,
        })
    }

    /// One report per configured training size, in configuration order
    pub fn run_all(&self) -> Result<Vec<ExperimentReport>> {
        self.training_sizes.iter().map(|size| self.run_size(*size)).collect()
    }
}
