mod read;

pub use read::SampleError;

use num_traits::Float;

/// A functional sample: `n_curves` curves observed on a shared argument grid.
///
/// Values are stored column-major as an `n_points × n_curves` matrix, one
/// contiguous column per curve, so that per-curve reductions scan contiguous
/// memory. The sample is immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct FdSample<F> {
    argvals: Vec<F>,
    values: Vec<F>,
    n_curves: usize,
}

impl<F: Float> FdSample<F> {
    /// Creates a sample from a column-major value matrix.
    ///
    /// # Panics
    /// Panics if the grid is empty, `n_curves` is zero, or the matrix size
    /// does not equal `argvals.len() * n_curves`.
    pub fn new(argvals: Vec<F>, values: Vec<F>, n_curves: usize) -> Self {
        assert!(!argvals.is_empty(), "argument grid must be non-empty");
        assert!(n_curves > 0, "sample must contain at least one curve");
        assert_eq!(
            values.len(),
            argvals.len() * n_curves,
            "value matrix must be n_points * n_curves"
        );
        Self {
            argvals,
            values,
            n_curves,
        }
    }

    /// Creates a sample from one value vector per curve.
    ///
    /// # Panics
    /// Panics if `curves` is empty or any curve's length differs from the
    /// grid length.
    pub fn from_curves(argvals: Vec<F>, curves: &[Vec<F>]) -> Self {
        assert!(!curves.is_empty(), "sample must contain at least one curve");
        let n_points = argvals.len();
        let mut values = Vec::with_capacity(n_points * curves.len());
        for curve in curves {
            assert_eq!(
                curve.len(),
                n_points,
                "every curve must match the grid length"
            );
            values.extend_from_slice(curve);
        }
        Self::new(argvals, values, curves.len())
    }

    /// The shared argument grid.
    pub fn argvals(&self) -> &[F] {
        &self.argvals
    }

    /// Number of grid points per curve.
    pub fn n_points(&self) -> usize {
        self.argvals.len()
    }

    /// Number of curves in the sample.
    pub fn n_curves(&self) -> usize {
        self.n_curves
    }

    /// The full column-major `n_points × n_curves` value matrix.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Values of curve `j` at every grid point.
    ///
    /// # Panics
    /// Panics if `j >= n_curves`.
    pub fn curve(&self, j: usize) -> &[F] {
        assert!(j < self.n_curves, "curve index out of range");
        let n = self.n_points();
        &self.values[j * n..(j + 1) * n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_curves_lays_out_columns() {
        let sample = FdSample::from_curves(
            vec![0.0, 0.5, 1.0],
            &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        );
        assert_eq!(sample.n_points(), 3);
        assert_eq!(sample.n_curves(), 2);
        assert_eq!(sample.curve(0), &[1.0, 2.0, 3.0]);
        assert_eq!(sample.curve(1), &[4.0, 5.0, 6.0]);
        assert_eq!(sample.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "every curve must match the grid length")]
    fn rejects_ragged_curves() {
        let _ = FdSample::from_curves(vec![0.0, 1.0], &[vec![1.0, 2.0], vec![3.0]]);
    }

    #[test]
    #[should_panic(expected = "n_points * n_curves")]
    fn rejects_wrong_matrix_size() {
        let _ = FdSample::new(vec![0.0, 1.0], vec![1.0, 2.0, 3.0], 2);
    }
}
