use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a delimited input file is laid out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator, a single ascii character
    pub delimiter: char,
    /// Skip the first line
    pub has_header: bool,
    /// Index of the label field, `None` meaning the last one
    pub label_column: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: false,
            label_column: None,
        }
    }
}

/// Raw rows of numeric features, each with its unparsed label field.
/// Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<String>,
}

impl Dataset {
    /// Create a dataset from already parsed rows
    ///
    /// # Arguments:
    /// features: One row of raw feature values per datapoint
    /// labels: The label field of each row
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<String>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(Error::LabelCountMismatch {
                rows: features.len(),
                labels: labels.len(),
            });
        }
        let expected = match features.first() {
            Some(row) => row.len(),
            None => return Err(Error::EmptyDataset),
        };
        if expected == 0 {
            return Err(Error::TooFewColumns { found: 1 });
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != expected {
                return Err(Error::MalformedRow {
                    line: i as u64 + 1,
                    expected: expected + 1,
                    found: row.len() + 1,
                });
            }
        }

        Ok(Self { features, labels })
    }

    /// Load a dataset from a delimited file
    pub fn from_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        info!("loading dataset from {}", path.as_ref().display());
        Self::from_reader(file, options)
    }

    /// Load a dataset from any reader producing delimited text.
    /// The first malformed row fails the whole load.
    pub fn from_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter as u8)
            .has_headers(options.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut features: Vec<Vec<f64>> = vec![];
        let mut labels: Vec<String> = vec![];
        let mut width: Option<usize> = None;
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);

            let expected = *width.get_or_insert(record.len());
            if record.len() != expected {
                return Err(Error::MalformedRow {
                    line,
                    expected,
                    found: record.len(),
                });
            }
            if expected < 2 {
                return Err(Error::TooFewColumns { found: expected });
            }
            let label_column = options.label_column.unwrap_or(expected - 1);
            if label_column >= expected {
                return Err(Error::LabelColumnOutOfRange {
                    column: label_column,
                    width: expected,
                });
            }

            let mut row: Vec<f64> = Vec::with_capacity(expected - 1);
            for (column, field) in record.iter().enumerate() {
                if column == label_column {
                    labels.push(field.to_string());
                    continue;
                }
                let val: f64 = match field.parse() {
                    Ok(v) if f64::is_finite(v) => v,
                    _ => {
                        return Err(Error::InvalidNumber {
                            line,
                            column,
                            value: field.to_string(),
                        })
                    }
                };
                row.push(val);
            }
            features.push(row);
        }
        debug!("parsed {} rows of {:?} fields", features.len(), width);

        Self::new(features, labels)
    }

    /// Number of rows
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of raw feature columns, excluding the label
    #[inline(always)]
    pub fn num_features(&self) -> usize {
        self.features.first().map(|r| r.len()).unwrap_or(0)
    }

    #[inline(always)]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    #[inline(always)]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
