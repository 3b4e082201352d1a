use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Per column rescaling applied to every non-bias column of a design matrix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Leave the values untouched
    #[default]
    Off,
    /// (x - mean) / (max - min), values end up with a span of exactly 1
    Mean,
    /// (x - (max + min) / 2) / (max - min), values end up in [-0.5, 0.5]
    Midpoint,
}

impl Normalization {
    /// Rescale all columns except the first one in place.
    /// A constant column carries no information and becomes all zeros.
    pub fn normalize(&self, design: &mut DMatrix<f64>) {
        if *self == Normalization::Off || design.nrows() == 0 {
            return;
        }

        for j in 1..design.ncols() {
            let mut column = design.column_mut(j);
            let min = column.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if max == min {
                column.fill(0.0);
                continue;
            }

            let center = match self {
                Normalization::Mean => column.iter().sum::<f64>() / column.len() as f64,
                _ => (max + min) / 2.0,
            };
            let span = max - min;
            column.iter_mut().for_each(|v| *v = (*v - center) / span);
        }
    }
}

#[cfg(test)]
mod tests {
    use round::round;

    use super::*;

    fn design() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 3, &[
            1.0, 0.0, 5.0, //
            1.0, 1.0, 5.0, //
            1.0, 2.0, 5.0, //
            1.0, 5.0, 5.0, //
        ])
    }

    #[test]
    fn normalization_midpoint() {
        let mut m = design();
        Normalization::Midpoint.normalize(&mut m);

        assert_eq!(m.column(0).iter().cloned().collect::<Vec<f64>>(), vec![1.0; 4]);
        assert_eq!(m.column(1).iter().cloned().collect::<Vec<f64>>(), vec![-0.5, -0.3, -0.1, 0.5]);
        assert!(m.column(2).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn normalization_mean() {
        let mut m = design();
        Normalization::Mean.normalize(&mut m);

        let col: Vec<f64> = m.column(1).iter().map(|v| round(*v, 6)).collect();
        assert_eq!(col, vec![-0.4, -0.2, 0.0, 0.6]);
        assert_eq!(round(col.iter().sum::<f64>(), 6), 0.0);
        assert!(m.column(2).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn normalization_off() {
        let mut m = design();
        Normalization::Off.normalize(&mut m);
        assert_eq!(m, design());
    }
}
