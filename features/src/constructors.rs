use nalgebra::{DMatrix, DVector};

/// Derives additional feature columns from the raw ones
pub trait FeatureConstructor {
    /// Number of columns this constructor appends for `num_raw` raw features
    fn num_columns(&self, num_raw: usize) -> usize;

    /// Write the derived columns into `design`
    ///
    /// # Arguments
    /// raw: Number of rows are the observed datapoints and number of columns
    /// represent the raw features
    /// design: The full design matrix being filled
    /// offset: Index of the first column this constructor owns
    fn construct(&self, raw: &DMatrix<f64>, design: &mut DMatrix<f64>, offset: usize);
}

/// Appends every raw feature raised to a fixed power
#[derive(Debug, Clone)]
pub struct PowerConstructor {
    exponent: i32,
}

impl PowerConstructor {
    pub fn new(exponent: i32) -> Self {
        Self { exponent }
    }
}

impl FeatureConstructor for PowerConstructor {
    #[inline(always)]
    fn num_columns(&self, num_raw: usize) -> usize {
        num_raw
    }

    fn construct(&self, raw: &DMatrix<f64>, design: &mut DMatrix<f64>, offset: usize) {
        for j in 0..raw.ncols() {
            let column: DVector<f64> =
                DVector::from_iterator(raw.nrows(), raw.column(j).iter().map(|v| v.powi(self.exponent)));
            design.set_column(offset + j, &column);
        }
    }
}

/// Appends the interaction terms `x_j * x_k`, `x_j^2 * x_k` and `x_j * x_k^2`
/// of every raw feature pair with j < k.
/// Pairs are visited with j ascending and k ascending within j.
#[derive(Debug, Clone, Default)]
pub struct PairwiseConstructor {}

impl FeatureConstructor for PairwiseConstructor {
    #[inline(always)]
    fn num_columns(&self, num_raw: usize) -> usize {
        3 * num_raw * num_raw.saturating_sub(1) / 2
    }

    fn construct(&self, raw: &DMatrix<f64>, design: &mut DMatrix<f64>, offset: usize) {
        let mut cnt: usize = 0;
        for j in 0..raw.ncols() {
            for k in j + 1..raw.ncols() {
                let terms: [fn(f64, f64) -> f64; 3] =
                    [|a, b| a * b, |a, b| a * a * b, |a, b| a * b * b];
                for term in terms {
                    let column: Vec<f64> = raw
                        .column(j)
                        .iter()
                        .zip(raw.column(k).iter())
                        .map(|(v_j, v_k)| term(*v_j, *v_k))
                        .collect();
                    design.set_column(offset + cnt, &DVector::from_vec(column));
                    cnt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 3, &[
            1.0, 2.0, 3.0, //
            -1.0, 0.5, 2.0, //
        ])
    }

    #[test]
    fn power_constructor_cube() {
        let raw = raw();
        let fc = PowerConstructor::new(3);
        let mut design = DMatrix::from_element(2, 1 + fc.num_columns(3), 0.0);
        fc.construct(&raw, &mut design, 1);

        let goal = DMatrix::from_row_slice(2, 4, &[
            0.0, 1.0, 8.0, 27.0, //
            0.0, -1.0, 0.125, 8.0, //
        ]);
        assert_eq!(design, goal);
    }

    #[test]
    fn pairwise_constructor_ordering() {
        let raw = raw();
        let fc = PairwiseConstructor::default();
        assert_eq!(fc.num_columns(3), 9);
        assert_eq!(fc.num_columns(1), 0);

        let mut design = DMatrix::from_element(2, fc.num_columns(3), 0.0);
        fc.construct(&raw, &mut design, 0);

        // (0, 1), (0, 2), (1, 2)
        let goal = DMatrix::from_row_slice(2, 9, &[
            2.0, 2.0, 4.0, 3.0, 3.0, 9.0, 6.0, 12.0, 18.0, //
            -0.5, 0.5, -0.25, -2.0, 2.0, -4.0, 1.0, 0.5, 2.0, //
        ]);
        assert_eq!(design, goal);
    }
}
