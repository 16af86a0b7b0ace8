use std::error::Error as StdError;
use std::fmt;

/// Precondition failures of the permutation test.
///
/// All variants are detected before any statistic is computed; none is
/// retryable and no partial result is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    /// The two samples' argument grids differ in point count.
    GridLengthMismatch {
        /// Grid length of the first sample.
        left: usize,
        /// Grid length of the second sample.
        right: usize,
    },
    /// Grids have matching length but differ by more than 5% in relative
    /// mean absolute deviation.
    IncompatibleGrid {
        /// Realized relative mean absolute deviation.
        deviation: f64,
    },
    /// A group contains fewer than 2 curves, so its variance is undefined.
    InsufficientGroupSize {
        /// Which sample (1 or 2) is too small.
        group: usize,
        /// Number of curves in that sample.
        size: usize,
    },
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::GridLengthMismatch { left, right } => write!(
                f,
                "argument grids differ in length: {left} vs {right} points"
            ),
            TestError::IncompatibleGrid { deviation } => write!(
                f,
                "argument grids deviate by {:.1}% on average (tolerance 5%)",
                deviation * 100.0
            ),
            TestError::InsufficientGroupSize { group, size } => write!(
                f,
                "sample {group} has {size} curve(s); at least 2 are required"
            ),
        }
    }
}

impl StdError for TestError {}
