use num_traits::{Float, FromPrimitive};

use crate::sample::FdSample;

/// Aggregation flavor for the pointwise studentized distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TStatistic {
    /// Mean over all grid points of `(μ1−μ2)² / (s1²+s2²)`, skipping points
    /// whose denominator vanishes.
    #[default]
    T,
    /// Ratio of integrals `Σ(μ1−μ2)² / Σ(s1²+s2²)` — a single quotient,
    /// more robust when pointwise variances are small or volatile.
    Tbar,
}

impl TStatistic {
    /// Reported statistic label.
    pub fn name(self) -> &'static str {
        match self {
            TStatistic::T => "T",
            TStatistic::Tbar => "Tbar",
        }
    }
}

/// Two pooled groups of curves with precomputed row aggregates.
///
/// Columns `0..m1` hold the first sample, `m1..m1+m2` the second, in the
/// observed arrangement. `total_sum` and `total_sumsq` are row-wise sums over
/// all pooled columns, computed once with Kahan summation; per-subset
/// evaluation derives group-2 aggregates by subtraction, so each permutation
/// only scans the `m1` subset columns.
#[derive(Debug, Clone)]
pub struct PooledCurves<F> {
    values: Vec<F>,
    n_points: usize,
    m1: usize,
    m2: usize,
    total_sum: Vec<F>,
    total_sumsq: Vec<F>,
}

impl<F: Float + FromPrimitive> PooledCurves<F> {
    /// Concatenates two samples column-wise and precomputes the row totals.
    ///
    /// # Panics
    /// Panics if the samples' grid lengths differ; the orchestrator validates
    /// grids before pooling.
    pub fn pool(sample1: &FdSample<F>, sample2: &FdSample<F>) -> Self {
        assert_eq!(
            sample1.n_points(),
            sample2.n_points(),
            "samples must share the grid length"
        );
        let n = sample1.n_points();
        let m1 = sample1.n_curves();
        let m2 = sample2.n_curves();

        let mut values = Vec::with_capacity(n * (m1 + m2));
        values.extend_from_slice(sample1.values());
        values.extend_from_slice(sample2.values());

        // Kahan-compensated row sums and sums of squares over all columns
        let mut total_sum = vec![F::zero(); n];
        let mut total_sumsq = vec![F::zero(); n];
        let mut c_sum = vec![F::zero(); n];
        let mut c_sumsq = vec![F::zero(); n];
        for j in 0..(m1 + m2) {
            let col = &values[j * n..(j + 1) * n];
            for i in 0..n {
                let x = col[i];

                let y = x - c_sum[i];
                let t = total_sum[i] + y;
                c_sum[i] = (t - total_sum[i]) - y;
                total_sum[i] = t;

                let y = x * x - c_sumsq[i];
                let t = total_sumsq[i] + y;
                c_sumsq[i] = (t - total_sumsq[i]) - y;
                total_sumsq[i] = t;
            }
        }

        Self {
            values,
            n_points: n,
            m1,
            m2,
            total_sum,
            total_sumsq,
        }
    }

    /// Grid points per curve.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Size of the first group.
    pub fn m1(&self) -> usize {
        self.m1
    }

    /// Size of the second group.
    pub fn m2(&self) -> usize {
        self.m2
    }

    /// Evaluates the studentized statistic for one group-1 column subset.
    pub fn statistic(&self, subset: &[usize], flavor: TStatistic) -> F {
        let mut sx = vec![F::zero(); self.n_points];
        let mut sxx = vec![F::zero(); self.n_points];
        self.statistic_with(subset, flavor, &mut sx, &mut sxx)
    }

    /// As [`statistic`](Self::statistic), reusing caller-owned scratch
    /// buffers of length `n_points` across calls.
    pub(crate) fn statistic_with(
        &self,
        subset: &[usize],
        flavor: TStatistic,
        sx: &mut [F],
        sxx: &mut [F],
    ) -> F {
        debug_assert_eq!(subset.len(), self.m1);
        let n = self.n_points;

        sx.fill(F::zero());
        sxx.fill(F::zero());
        for &j in subset {
            let col = &self.values[j * n..(j + 1) * n];
            for i in 0..n {
                sx[i] = sx[i] + col[i];
                sxx[i] = sxx[i] + col[i] * col[i];
            }
        }

        let one = F::one();
        let f_m1 = F::from_usize(self.m1).expect("group size fits in float");
        let f_m2 = F::from_usize(self.m2).expect("group size fits in float");

        // Per point: squared mean difference and summed unbiased variances,
        // with group 2 derived as the complement of group 1.
        let point = |sx1: F, sxx1: F, total_sum: F, total_sumsq: F| {
            let sx2 = total_sum - sx1;
            let sxx2 = total_sumsq - sxx1;
            let mu1 = sx1 / f_m1;
            let mu2 = sx2 / f_m2;
            let s1 = (sxx1 - sx1 * sx1 / f_m1) / (f_m1 - one);
            let s2 = (sxx2 - sx2 * sx2 / f_m2) / (f_m2 - one);
            let diff = mu1 - mu2;
            (diff * diff, s1 + s2)
        };

        match flavor {
            TStatistic::T => {
                let mut acc = F::zero();
                let mut used = 0usize;
                for i in 0..n {
                    let (num, denom) = point(sx[i], sxx[i], self.total_sum[i], self.total_sumsq[i]);
                    // a vanished (or cancellation-negative) denominator makes
                    // the point undefined; it is skipped, not zero-filled
                    if denom > F::zero() {
                        acc = acc + num / denom;
                        used += 1;
                    }
                }
                if used == 0 {
                    F::nan()
                } else {
                    acc / F::from_usize(used).expect("point count fits in float")
                }
            }
            TStatistic::Tbar => {
                let mut num_acc = F::zero();
                let mut den_acc = F::zero();
                for i in 0..n {
                    let (num, denom) = point(sx[i], sxx[i], self.total_sum[i], self.total_sumsq[i]);
                    num_acc = num_acc + num;
                    den_acc = den_acc + denom;
                }
                num_acc / den_acc
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two groups of two curves on a two-point grid with hand-computed
    /// aggregates:
    ///
    /// point 0: group 1 = {1, 3}, group 2 = {2, 6}  →  d = (2−4)²/(2+8) = 0.4
    /// point 1: group 1 = {1, 3}, group 2 = {4, 6}  →  d = (2−5)²/(2+2) = 2.25
    fn pooled() -> PooledCurves<f64> {
        let grid = vec![0.0, 1.0];
        let sample1 = FdSample::from_curves(grid.clone(), &[vec![1.0, 1.0], vec![3.0, 3.0]]);
        let sample2 = FdSample::from_curves(grid, &[vec![2.0, 4.0], vec![6.0, 6.0]]);
        PooledCurves::pool(&sample1, &sample2)
    }

    #[test]
    fn t_is_the_mean_of_pointwise_ratios() {
        let pooled = pooled();
        let t = pooled.statistic(&[0, 1], TStatistic::T);
        assert_relative_eq!(t, (0.4 + 2.25) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tbar_is_a_single_ratio_of_integrals() {
        let pooled = pooled();
        let tbar = pooled.statistic(&[0, 1], TStatistic::Tbar);
        assert_relative_eq!(tbar, (4.0 + 9.0) / (10.0 + 4.0), epsilon = 1e-12);
    }

    #[test]
    fn degenerate_points_are_skipped_for_t() {
        // third grid point where every pooled value is 5: zero variance and
        // zero mean difference, so T ignores it entirely
        let grid = vec![0.0, 0.5, 1.0];
        let sample1 = FdSample::from_curves(
            grid.clone(),
            &[vec![1.0, 1.0, 5.0], vec![3.0, 3.0, 5.0]],
        );
        let sample2 = FdSample::from_curves(grid, &[vec![2.0, 4.0, 5.0], vec![6.0, 6.0, 5.0]]);
        let pooled = PooledCurves::pool(&sample1, &sample2);
        let t = pooled.statistic(&[0, 1], TStatistic::T);
        assert_relative_eq!(t, (0.4 + 2.25) / 2.0, epsilon = 1e-12);
        // Tbar only feeds the aggregate denominator, which gains nothing here
        let tbar = pooled.statistic(&[0, 1], TStatistic::Tbar);
        assert_relative_eq!(tbar, 13.0 / 14.0, epsilon = 1e-12);
    }

    #[test]
    fn statistic_is_symmetric_in_the_two_groups() {
        let pooled = pooled();
        for flavor in [TStatistic::T, TStatistic::Tbar] {
            let forward = pooled.statistic(&[0, 1], flavor);
            let swapped = pooled.statistic(&[2, 3], flavor);
            assert_relative_eq!(forward, swapped, epsilon = 1e-12);
        }
    }

    #[test]
    fn all_degenerate_points_yield_nan_t() {
        let grid = vec![0.0, 1.0];
        let flat = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let sample = FdSample::from_curves(grid, &flat);
        let pooled = PooledCurves::pool(&sample, &sample.clone());
        assert!(pooled.statistic(&[0, 1], TStatistic::T).is_nan());
    }

    #[test]
    fn totals_match_group_aggregation() {
        let pooled = pooled();
        // full-pool subset sums must reproduce the precomputed totals: the
        // statistic for the baseline equals the one computed from scratch
        let mut sx = vec![0.0; 2];
        let mut sxx = vec![0.0; 2];
        let with_scratch = pooled.statistic_with(&[0, 1], TStatistic::T, &mut sx, &mut sxx);
        assert_relative_eq!(with_scratch, pooled.statistic(&[0, 1], TStatistic::T));
        assert_relative_eq!(sx[0], 4.0); // 1 + 3 at point 0
        assert_relative_eq!(sxx[1], 10.0); // 1 + 9 at point 1
    }
}
