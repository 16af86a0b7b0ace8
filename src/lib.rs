//! Permutation-based two-sample tests for functional data.
//!
//! A functional sample is a set of curves observed on a shared argument grid.
//! [`TL2Test`] tests whether two such samples come from the same underlying
//! distribution by comparing a studentized, pointwise-integrated statistic
//! against its own permutation distribution.
//!
//! ```rust
//! use fdperm::{FdSample, TL2Test};
//!
//! let grid: Vec<f64> = (0..50).map(|i| i as f64 / 49.0).collect();
//! let sample1 = FdSample::from_curves(grid.clone(), &[vec![0.0; 50], vec![0.1; 50]]);
//! let sample2 = FdSample::from_curves(grid, &[vec![0.9; 50], vec![1.0; 50]]);
//!
//! let test = TL2Test { seed: Some(42), ..TL2Test::default() };
//! let result = test.compute(&sample1, &sample2).unwrap();
//! println!("{result}");
//! ```

mod error;
mod sample;
mod resample;
mod statistics;
mod hypothesis;
mod display;

pub use crate::error::TestError;
pub use crate::sample::{FdSample, SampleError};
pub use crate::resample::{AssignmentSet, Enumeration, group1_assignments};
pub use crate::statistics::{PooledCurves, Statistic, TStatistic};
pub use crate::hypothesis::{TL2Test, TL2TestResult};
pub use rand;
