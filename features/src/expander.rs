use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::{
    Dataset, Error, FeatureConstructor, LabelMap, Normalization, PairwiseConstructor,
    PowerConstructor, Result,
};

/// Which derived features to generate from the raw columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionPolicy {
    /// Append x_j^2 for every raw feature
    pub square: bool,
    /// Append x_j^3 for every raw feature
    pub cube: bool,
    /// Append the interaction terms of every raw feature pair
    pub pairwise: bool,
    /// Rescaling applied after the expansion
    pub normalization: Normalization,
}

impl ExpansionPolicy {
    /// Bias column plus the raw features, nothing else
    pub fn none() -> Self {
        Self::default()
    }

    fn constructors(&self) -> Vec<Box<dyn FeatureConstructor>> {
        let mut constructors: Vec<Box<dyn FeatureConstructor>> = vec![];
        if self.square {
            constructors.push(Box::new(PowerConstructor::new(2)));
        }
        if self.cube {
            constructors.push(Box::new(PowerConstructor::new(3)));
        }
        if self.pairwise {
            constructors.push(Box::new(PairwiseConstructor::default()));
        }
        constructors
    }

    /// Total number of design matrix columns, bias included
    pub fn num_columns(&self, num_raw: usize) -> usize {
        1 + num_raw + self.constructors().iter().map(|c| c.num_columns(num_raw)).sum::<usize>()
    }
}

/// How the label field of each row becomes a target value
#[derive(Debug, Clone)]
pub enum TargetEncoding {
    /// Parse the label as a real valued response
    Continuous,
    /// Map the label to its class code
    Classes(LabelMap),
}

/// The expanded design matrix and targets of a whole dataset
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Column 0 is the bias, always 1.0 unless normalized away
    pub design: DMatrix<f64>,
    /// Regression response or class code per row
    pub targets: DVector<f64>,
    /// Number of rows whose label was mapped to the fallback class
    pub unrecognized_labels: usize,
}

/// Turns raw rows into a design matrix according to an `ExpansionPolicy`
#[derive(Debug, Clone)]
pub struct FeatureExpander {
    policy: ExpansionPolicy,
}

impl FeatureExpander {
    pub fn new(policy: ExpansionPolicy) -> Self {
        Self { policy }
    }

    #[inline(always)]
    pub fn policy(&self) -> &ExpansionPolicy {
        &self.policy
    }

    /// Construct the design matrix from raw rows.
    /// Column order: bias, raw, squares, cubes, pairwise terms.
    pub fn expand_rows(&self, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
        let num_raw = match rows.first() {
            Some(row) => row.len(),
            None => return Err(Error::EmptyDataset),
        };
        for (i, row) in rows.iter().enumerate() {
            if row.len() != num_raw {
                return Err(Error::MalformedRow {
                    line: i as u64 + 1,
                    expected: num_raw,
                    found: row.len(),
                });
            }
        }

        let raw: DMatrix<f64> = DMatrix::from_fn(rows.len(), num_raw, |i, j| rows[i][j]);
        let d_total = self.policy.num_columns(num_raw);

        let mut design: DMatrix<f64> = DMatrix::from_element(rows.len(), d_total, 0.0);
        // add column of 1s here
        design.column_mut(0).fill(1.0);
        for j in 0..num_raw {
            design.set_column(j + 1, &raw.column(j));
        }

        let mut offset = 1 + num_raw;
        for constructor in self.policy.constructors() {
            constructor.construct(&raw, &mut design, offset);
            offset += constructor.num_columns(num_raw);
        }
        debug_assert_eq!(offset, d_total);

        self.policy.normalization.normalize(&mut design);

        Ok(design)
    }

    /// Expand a whole dataset into its design matrix and target vector
    pub fn expand(&self, dataset: &Dataset, encoding: &TargetEncoding) -> Result<FeatureSet> {
        let design = self.expand_rows(dataset.features())?;

        let mut targets: DVector<f64> = DVector::from_element(dataset.len(), 0.0);
        let mut unknown: BTreeSet<&str> = BTreeSet::new();
        let mut unrecognized_labels: usize = 0;
        for (i, label) in dataset.labels().iter().enumerate() {
            targets[i] = match encoding {
                TargetEncoding::Continuous => match label.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => {
                        return Err(Error::InvalidTarget {
                            row: i,
                            value: label.clone(),
                        })
                    }
                },
                TargetEncoding::Classes(map) => match map.code(label) {
                    Some(code) => code as f64,
                    None => {
                        if unknown.insert(label.as_str()) {
                            warn!(
                                "unrecognized label {:?} in row {}, mapping it to {:?}",
                                label,
                                i,
                                map.name(common::FALLBACK_CLASS)
                            );
                        }
                        unrecognized_labels += 1;
                        common::FALLBACK_CLASS as f64
                    }
                },
            };
        }
        if unrecognized_labels > 0 {
            info!(
                "{} rows with {} distinct unrecognized labels fell back to the fallback class",
                unrecognized_labels,
                unknown.len()
            );
        }
        info!(
            "expanded {} rows of {} raw features into {} columns",
            design.nrows(),
            dataset.num_features(),
            design.ncols()
        );

        Ok(FeatureSet {
            design,
            targets,
            unrecognized_labels,
        })
    }
}
