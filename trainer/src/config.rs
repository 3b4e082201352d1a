//! Runtime configuration of a batch of experiments

use std::{fs, path::Path, path::PathBuf};

use evaluation::Task;
use features::{CsvOptions, ExpansionPolicy, LabelMap, Normalization, TargetEncoding};
use lin_reg::{DivergencePolicy, GradientDescent, ThetaInit};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where the dataset lives and how it is laid out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    #[serde(flatten)]
    pub csv: CsvOptions,
}

/// What is learned from the label field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProblemConfig {
    Regression,
    Binary {
        #[serde(default = "default_binary_classes")]
        classes: Vec<String>,
        /// Defaults to the last of `classes`
        #[serde(default)]
        positive_class: Option<String>,
        #[serde(default = "default_fallback_label")]
        fallback_label: String,
    },
    Multiclass {
        classes: Vec<String>,
        #[serde(default = "default_fallback_label")]
        fallback_label: String,
    },
}

fn default_binary_classes() -> Vec<String> {
    vec!["0".to_string(), "1".to_string()]
}

fn default_fallback_label() -> String {
    "Other".to_string()
}

/// Everything needed to run one experiment per training size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub data: DataConfig,
    pub problem: ProblemConfig,
    /// Row count of the training prefix, one experiment each
    #[serde(default = "default_training_sizes")]
    pub training_sizes: Vec<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub regularization: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Held-out rows scored after each training run
    #[serde(default = "default_test_sample_count")]
    pub test_sample_count: usize,
    #[serde(default)]
    pub expansion: ExpansionPolicy,
    #[serde(default)]
    pub init: ThetaInit,
    #[serde(default)]
    pub on_divergence: DivergencePolicy,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads for one-vs-rest training, 0 picks from the core count
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_training_sizes() -> Vec<usize> {
    vec![10, 100, 1000]
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_tolerance() -> f64 {
    1e-4
}

fn default_max_iterations() -> usize {
    100_000
}

fn default_test_sample_count() -> usize {
    100
}

fn default_threads() -> usize {
    1
}

impl ExperimentConfig {
    /// Read a json configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Ridge regression over mean normalized raw features
    pub fn regression_preset(path: PathBuf) -> Self {
        let mut config = Self {
            problem: ProblemConfig::Regression,
            training_sizes: vec![10, 100, 1000, 5000, 9000],
            learning_rate: 0.01,
            regularization: 100.0,
            tolerance: 1e-3,
            expansion: ExpansionPolicy {
                normalization: Normalization::Mean,
                ..ExpansionPolicy::none()
            },
            ..Self::base(path)
        };
        config.data.csv.has_header = true;
        config
    }

    /// Logistic regression on a `0`/`1` label with squared and cubed features
    pub fn binary_preset(path: PathBuf) -> Self {
        Self {
            problem: ProblemConfig::Binary {
                classes: default_binary_classes(),
                positive_class: None,
                fallback_label: default_fallback_label(),
            },
            training_sizes: vec![10, 100, 500],
            learning_rate: 0.1,
            expansion: ExpansionPolicy {
                square: true,
                cube: true,
                pairwise: false,
                normalization: Normalization::Midpoint,
            },
            ..Self::base(path)
        }
    }

    /// One-vs-rest over the yeast localization sites
    pub fn multiclass_preset(path: PathBuf) -> Self {
        let classes = ["CYT", "NUC", "MIT", "ME3", "ME2", "ME1", "EXC", "VAC", "POX", "ERL"];
        Self {
            problem: ProblemConfig::Multiclass {
                classes: classes.iter().map(|c| c.to_string()).collect(),
                fallback_label: default_fallback_label(),
            },
            training_sizes: vec![10, 100, 500, 1000],
            learning_rate: 0.1,
            expansion: ExpansionPolicy {
                square: true,
                cube: true,
                pairwise: false,
                normalization: Normalization::Off,
            },
            threads: 0,
            ..Self::base(path)
        }
    }

    fn base(path: PathBuf) -> Self {
        Self {
            data: DataConfig {
                path,
                csv: CsvOptions::default(),
            },
            problem: ProblemConfig::Regression,
            training_sizes: default_training_sizes(),
            learning_rate: default_learning_rate(),
            regularization: 0.0,
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            test_sample_count: default_test_sample_count(),
            expansion: ExpansionPolicy::none(),
            init: ThetaInit::default(),
            on_divergence: DivergencePolicy::default(),
            seed: None,
            threads: default_threads(),
        }
    }

    /// Check the values that do not depend on the dataset
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid(format!("learning_rate must be positive, got {}", self.learning_rate)));
        }
        if !(self.regularization >= 0.0 && self.regularization.is_finite()) {
            return Err(invalid(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            )));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(invalid(format!("tolerance must be non-negative, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be at least 1".to_string()));
        }
        if self.test_sample_count == 0 {
            return Err(invalid("test_sample_count must be at least 1".to_string()));
        }
        if self.training_sizes.is_empty() {
            return Err(invalid("training_sizes is empty".to_string()));
        }
        if let Some(size) = self.training_sizes.iter().find(|s| **s == 0) {
            return Err(invalid(format!("training size {} has no rows", size)));
        }
        if !self.data.csv.delimiter.is_ascii() {
            return Err(invalid(format!(
                "delimiter {:?} is not a single ascii character",
                self.data.csv.delimiter
            )));
        }
        self.task().map(|_| ())
    }

    /// Check that every training size leaves at least one held-out row
    pub fn validate_for(&self, num_rows: usize) -> Result<()> {
        match self.training_sizes.iter().find(|s| **s >= num_rows) {
            Some(size) => Err(invalid(format!(
                "training size {} leaves no held-out rows in a dataset of {}",
                size, num_rows
            ))),
            None => Ok(()),
        }
    }

    pub fn task(&self) -> Result<Task> {
        match &self.problem {
            ProblemConfig::Regression => Ok(Task::Regression),
            ProblemConfig::Binary {
                classes,
                positive_class,
                fallback_label,
            } => {
                let labels = LabelMap::new(classes.clone(), fallback_label.as_str());
                let positive_class = match positive_class {
                    Some(name) => labels
                        .code(name)
                        .ok_or_else(|| invalid(format!("positive_class {:?} is not a class", name)))?,
                    None => labels.num_classes(),
                };
                if positive_class == 0 {
                    return Err(invalid("binary problem without classes".to_string()));
                }
                Ok(Task::Binary {
                    labels,
                    positive_class,
                })
            }
            ProblemConfig::Multiclass {
                classes,
                fallback_label,
            } => {
                if classes.is_empty() {
                    return Err(invalid("multiclass problem without classes".to_string()));
                }
                Ok(Task::Multiclass {
                    labels: LabelMap::new(classes.clone(), fallback_label.as_str()),
                })
            }
        }
    }

    pub fn target_encoding(&self) -> Result<TargetEncoding> {
        Ok(match self.task()? {
            Task::Regression => TargetEncoding::Continuous,
            Task::Binary { labels, .. } | Task::Multiclass { labels } => {
                TargetEncoding::Classes(labels)
            }
        })
    }

    /// The optimizer described by this configuration
    pub fn regressor(&self) -> GradientDescent {
        GradientDescent {
            learning_rate: self.learning_rate,
            regularization_coeff: self.regularization,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            init: self.init,
            on_divergence: self.on_divergence,
            seed: self.seed,
        }
    }
}

#[inline(always)]
fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = ExperimentConfig::from_json(
            r#"{
                "data": { "path": "housing.csv", "has_header": true },
                "problem": { "type": "regression" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.data.path, PathBuf::from("housing.csv"));
        assert!(config.data.csv.has_header);
        assert_eq!(config.data.csv.delimiter, ',');
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.max_iterations, 100_000);
        assert_eq!(config.threads, 1);
        assert_eq!(config.seed, None);
        assert!(matches!(config.task().unwrap(), Task::Regression));
    }

    #[test]
    fn full_config() {
        let config = ExperimentConfig::from_json(
            r#"{
                "data": { "path": "yeast.csv", "delimiter": ";", "label_column": 0 },
                "problem": { "type": "multiclass", "classes": ["CYT", "NUC"], "fallback_label": "Rest" },
                "training_sizes": [5, 50],
                "learning_rate": 0.1,
                "regularization": 1.5,
                "expansion": { "square": true, "normalization": "midpoint" },
                "init": "random",
                "on_divergence": "abort",
                "seed": 7,
                "threads": 4
            }"#,
        )
        .unwrap();

        assert_eq!(config.data.csv.delimiter, ';');
        assert_eq!(config.data.csv.label_column, Some(0));
        assert!(config.expansion.square && !config.expansion.cube);
        assert_eq!(config.expansion.normalization, Normalization::Midpoint);
        assert_eq!(config.init, ThetaInit::Random);
        assert_eq!(config.on_divergence, DivergencePolicy::Abort);

        let regressor = config.regressor();
        assert_eq!(regressor.regularization_coeff, 1.5);
        assert_eq!(regressor.seed, Some(7));

        match config.task().unwrap() {
            Task::Multiclass { labels } => {
                assert_eq!(labels.num_classes(), 2);
                assert_eq!(labels.name(0), "Rest");
            }
            _ => panic!("expected a multiclass task"),
        }
    }

    #[test]
    fn binary_positive_class() {
        let mut config = ExperimentConfig::binary_preset(PathBuf::from("spam.csv"));
        match config.task().unwrap() {
            Task::Binary { positive_class, .. } => assert_eq!(positive_class, 2),
            _ => panic!("expected a binary task"),
        }

        config.problem = ProblemConfig::Binary {
            classes: vec!["spam".into(), "ham".into()],
            positive_class: Some("spam".into()),
            fallback_label: default_fallback_label(),
        };
        match config.task().unwrap() {
            Task::Binary { positive_class, .. } => assert_eq!(positive_class, 1),
            _ => panic!("expected a binary task"),
        }

        config.problem = ProblemConfig::Binary {
            classes: vec!["spam".into(), "ham".into()],
            positive_class: Some("eggs".into()),
            fallback_label: default_fallback_label(),
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn invalid_values() {
        let base = ExperimentConfig::regression_preset(PathBuf::from("housing.csv"));
        base.validate().unwrap();

        let cases = vec![
            ExperimentConfig {
                learning_rate: 0.0,
                ..base.clone()
            },
            ExperimentConfig {
                regularization: -1.0,
                ..base.clone()
            },
            ExperimentConfig {
                tolerance: f64::NAN,
                ..base.clone()
            },
            ExperimentConfig {
                training_sizes: vec![],
                ..base.clone()
            },
            ExperimentConfig {
                training_sizes: vec![10, 0],
                ..base.clone()
            },
            ExperimentConfig {
                test_sample_count: 0,
                ..base.clone()
            },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }

        assert!(base.validate_for(9001).is_ok());
        assert!(matches!(base.validate_for(9000), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn malformed_json() {
        let err = ExperimentConfig::from_json(r#"{ "data": { "path": 3 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
