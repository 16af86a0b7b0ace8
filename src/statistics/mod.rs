mod pointwise;

pub use pointwise::{PooledCurves, TStatistic};

/// Computes a statistic of type `T` from data of type `D`.
pub trait Statistic<D, T> {
    /// Evaluates the statistic on `data`.
    fn compute(&self, data: &D) -> T;
}
