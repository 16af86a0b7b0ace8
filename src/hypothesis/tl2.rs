use num_traits::{Float, FromPrimitive, ToPrimitive};
use rand::SeedableRng;
use rand::rngs::StdRng;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::TestError;
use crate::resample::{Enumeration, group1_assignments};
use crate::sample::FdSample;
use crate::statistics::{PooledCurves, Statistic, TStatistic};

/// Maximum relative mean absolute deviation between the two argument grids.
const GRID_TOLERANCE: f64 = 0.05;

/// Permutation two-sample test for functional data.
///
/// Tests the null hypothesis that two samples of curves observed on a shared
/// argument grid come from the same underlying distribution (equal mean
/// functions), using the pointwise-integrated studentized statistic of
/// [`TStatistic`] and its own permutation distribution.
///
/// # Statistical assumptions
/// - **Assumes**: exchangeability of curves across the two groups under H₀
/// - **Does not require**: normality or any parametric form of the curves
/// - **Test type**: one-sided in the statistic (large values reject)
///
/// # Example
/// ```rust,no_run
/// use fdperm::{FdSample, TL2Test};
///
/// let sample1: FdSample<f64> = FdSample::read("group1.csv").unwrap();
/// let sample2: FdSample<f64> = FdSample::read("group2.csv").unwrap();
///
/// let test = TL2Test { seed: Some(42), ..TL2Test::default() };
/// let result = test.compute(&sample1, &sample2).unwrap();
/// println!("p-value: {:.4}", result.p_value);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TL2Test {
    /// Permutation budget; `None` forces exhaustive enumeration. When the
    /// budget plus the guaranteed observed assignment already covers the
    /// combinatorial space, exhaustive enumeration is used anyway.
    pub n_permutations: Option<usize>,
    /// Which aggregation of the pointwise distances to report.
    pub statistic: TStatistic,
    /// Seed for the sampling branch; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Label of the two inputs in the report.
    pub data_name: Option<String>,
}

impl Default for TL2Test {
    fn default() -> Self {
        Self {
            n_permutations: Some(25_000),
            statistic: TStatistic::T,
            seed: None,
            data_name: None,
        }
    }
}

/// Result of the permutation test.
#[derive(Debug, Clone, PartialEq)]
pub struct TL2TestResult<F> {
    /// Statistic flavor that was evaluated.
    pub statistic: TStatistic,
    /// Observed statistic, i.e. the value under the unpermuted grouping.
    pub observed_statistic: F,
    /// Fraction of evaluated assignments (the observed one included) whose
    /// statistic is at least the observed statistic.
    pub p_value: F,
    /// Alternative hypothesis label.
    pub alternative: &'static str,
    /// Two-line description: statistic flavor, then enumeration mode and the
    /// realized assignment count.
    pub method: String,
    /// Label of the two inputs.
    pub data_name: String,
    /// Number of evaluated group assignments, the observed one included.
    pub n_assignments: usize,
    /// Whether the assignments were enumerated exactly or sampled.
    pub enumeration: Enumeration,
}

impl TL2Test {
    /// Creates a test with an explicitly specified permutation budget.
    ///
    /// # Panics
    /// Panics if `n_permutations == 0`.
    pub fn new(n_permutations: usize) -> Self {
        assert!(n_permutations > 0, "n_permutations must be positive");
        Self {
            n_permutations: Some(n_permutations),
            ..Self::default()
        }
    }

    /// Creates a test that enumerates every admissible group assignment.
    pub fn exhaustive() -> Self {
        Self {
            n_permutations: None,
            ..Self::default()
        }
    }

    /// Creates a test with a desired absolute accuracy for the p-value
    /// estimate on the sampling branch.
    ///
    /// Uses the conservative sample size formula for binomial proportion
    /// estimation:
    /// ```text
    /// n_permutations = ceil( (z_{1−α/2}² · 0.25) / accuracy² )
    /// ```
    /// where 0.25 is the maximum variance of a Bernoulli variable (at
    /// p = 0.5). The guarantee is conservative: actual accuracy is
    /// substantially better when the true p-value is far from 0.5. When the
    /// exact space is smaller than the resulting budget the test enumerates
    /// it instead, and the estimate becomes exact.
    ///
    /// # Panics
    /// Panics if `accuracy ∉ (0, 0.5)` or `confidence_level ∉ (0.5, 1.0)`.
    pub fn from_absolute_accuracy(accuracy: f64, confidence_level: f64) -> Self {
        assert!(
            accuracy > 0.0 && accuracy < 0.5,
            "accuracy must be in (0, 0.5), got {}",
            accuracy
        );
        assert!(
            confidence_level > 0.5 && confidence_level < 1.0,
            "confidence_level must be in (0.5, 1.0), got {}",
            confidence_level
        );

        let alpha = 1.0 - confidence_level;
        let z = Normal::new(0.0, 1.0)
            .expect("Valid N(0,1) distribution")
            .inverse_cdf(1.0 - alpha / 2.0);

        let n_min = (z * z * 0.25) / (accuracy * accuracy);
        let n_permutations = (n_min.ceil() as usize).clamp(100, 10_000_000);

        Self {
            n_permutations: Some(n_permutations),
            ..Self::default()
        }
    }

    /// Runs the test on two functional samples.
    ///
    /// Validates the preconditions of [`TestError`], pools the two value
    /// matrices, evaluates the statistic for every group assignment produced
    /// by [`group1_assignments`], and derives the permutation p-value.
    pub fn compute<F>(
        &self,
        sample1: &FdSample<F>,
        sample2: &FdSample<F>,
    ) -> Result<TL2TestResult<F>, TestError>
    where
        F: Float + FromPrimitive + ToPrimitive + Send + Sync,
    {
        if sample1.n_points() != sample2.n_points() {
            return Err(TestError::GridLengthMismatch {
                left: sample1.n_points(),
                right: sample2.n_points(),
            });
        }
        let deviation = grid_deviation(sample1.argvals(), sample2.argvals());
        let tolerance = F::from_f64(GRID_TOLERANCE).expect("tolerance fits in float");
        if deviation > tolerance {
            return Err(TestError::IncompatibleGrid {
                deviation: deviation.to_f64().unwrap_or(f64::NAN),
            });
        }

        let m1 = sample1.n_curves();
        let m2 = sample2.n_curves();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let assignments = group1_assignments(m1, m2, self.n_permutations, &mut rng)?;

        let pooled = PooledCurves::pool(sample1, sample2);
        let n = pooled.n_points();

        #[cfg(feature = "rayon")]
        let stats: Vec<F> = {
            use rayon::prelude::*;
            assignments
                .subsets
                .par_iter()
                .map_init(
                    || (vec![F::zero(); n], vec![F::zero(); n]),
                    |(sx, sxx), subset| pooled.statistic_with(subset, self.statistic, sx, sxx),
                )
                .collect()
        };
        #[cfg(not(feature = "rayon"))]
        let stats: Vec<F> = {
            let mut sx = vec![F::zero(); n];
            let mut sxx = vec![F::zero(); n];
            let mut stats = Vec::with_capacity(assignments.len());
            for subset in &assignments.subsets {
                stats.push(pooled.statistic_with(subset, self.statistic, &mut sx, &mut sxx));
            }
            stats
        };

        let observed = stats[0];
        // the observed assignment always counts as at least as extreme as
        // itself, so p never drops below 1/L
        let at_least = 1 + stats[1..].iter().filter(|&&t| t >= observed).count();
        let p_value = F::from_usize(at_least).expect("count fits in float")
            / F::from_usize(stats.len()).expect("count fits in float");

        let first_line = format!(
            "Two-sample permutation test for functional data ({} statistic)",
            self.statistic.name()
        );
        let method = match assignments.enumeration {
            Enumeration::Exact => format!(
                "{first_line}\nexact enumeration of all {} group assignments",
                assignments.len()
            ),
            Enumeration::Sampled => format!(
                "{first_line}\np-value from {} randomly sampled group assignments",
                assignments.len() - 1
            ),
        };

        Ok(TL2TestResult {
            statistic: self.statistic,
            observed_statistic: observed,
            p_value,
            alternative: "samples not exchangeable",
            method,
            data_name: self
                .data_name
                .clone()
                .unwrap_or_else(|| "sample1 and sample2".to_string()),
            n_assignments: assignments.len(),
            enumeration: assignments.enumeration,
        })
    }
}

impl<F> Statistic<(FdSample<F>, FdSample<F>), Result<TL2TestResult<F>, TestError>> for TL2Test
where
    F: Float + FromPrimitive + ToPrimitive + Send + Sync,
{
    fn compute(&self, data: &(FdSample<F>, FdSample<F>)) -> Result<TL2TestResult<F>, TestError> {
        self.compute(&data.0, &data.1)
    }
}

/// Relative mean absolute deviation between two equal-length grids,
/// symmetric in the two arguments: `2·Σ|aᵢ−bᵢ| / Σ(|aᵢ|+|bᵢ|)`.
fn grid_deviation<F: Float>(a: &[F], b: &[F]) -> F {
    let mut diff = F::zero();
    let mut scale = F::zero();
    for (&x, &y) in a.iter().zip(b) {
        diff = diff + (x - y).abs();
        scale = scale + x.abs() + y.abs();
    }
    if scale > F::zero() {
        (diff + diff) / scale
    } else if diff > F::zero() {
        F::infinity()
    } else {
        F::zero()
    }
}
