use itertools::Itertools;
use rand::Rng;
use rand::seq::index::sample as index_sample;

use crate::error::TestError;

/// How a set of group assignments was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    /// Every admissible group-1 subset was enumerated.
    Exact,
    /// Subsets were drawn uniformly at random.
    Sampled,
}

/// The ordered set of group-1 index subsets a permutation test evaluates.
///
/// Each subset holds `m1` distinct 0-based pooled-column indices. The first
/// subset is always the observed assignment `{0, .., m1-1}`; the statistic
/// computed at position 0 is the observed statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSet {
    /// Group-1 subsets, baseline first.
    pub subsets: Vec<Vec<usize>>,
    /// Whether the subsets were enumerated exactly or sampled.
    pub enumeration: Enumeration,
}

impl AssignmentSet {
    /// Number of subsets, baseline included.
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    /// True when the set holds no subsets (never produced by the generator).
    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }
}

/// Binomial coefficient `C(n, k)`, saturating at `u64::MAX`.
///
/// The multiplicative formula divides at every step, so intermediate values
/// stay exact; only the saturation loses information, and callers compare the
/// result against permutation budgets far below the cap.
pub(crate) fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * u128::from(n - i) / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Builds the ordered set of group-1 index subsets for group sizes `m1`, `m2`.
///
/// The admissible space has `C(m1+m2, m1)` subsets, halved to
/// `C(m1+m2-1, m1-1)` when `m1 == m2`: with equal groups, swapping a subset
/// with its complement yields an equivalent partition, so only subsets
/// containing pooled index 0 need to be enumerated.
///
/// Exact enumeration is used when `n_perm` is `None`, or when the requested
/// count plus the guaranteed baseline already covers the space
/// (`n_perm + 1 >= ncomb`). Otherwise `n_perm` subsets are drawn uniformly,
/// without replacement within a draw; duplicate draws are kept, matching
/// Monte-Carlo permutation semantics. Either way the baseline subset
/// `{0, .., m1-1}` occupies position 0.
pub fn group1_assignments<R: Rng>(
    m1: usize,
    m2: usize,
    n_perm: Option<usize>,
    rng: &mut R,
) -> Result<AssignmentSet, TestError> {
    if m1 < 2 {
        return Err(TestError::InsufficientGroupSize { group: 1, size: m1 });
    }
    if m2 < 2 {
        return Err(TestError::InsufficientGroupSize { group: 2, size: m2 });
    }

    let m = m1 + m2;
    let halved = m1 == m2;
    let ncomb = if halved {
        binomial((m - 1) as u64, (m1 - 1) as u64)
    } else {
        binomial(m as u64, m1 as u64)
    };

    let baseline: Vec<usize> = (0..m1).collect();
    let exact = match n_perm {
        None => true,
        Some(p) => (p as u64).saturating_add(1) >= ncomb,
    };

    let subsets = if exact {
        let mut subsets = Vec::with_capacity(usize::try_from(ncomb).unwrap_or(0).min(1 << 22));
        subsets.push(baseline.clone());
        if halved {
            for tail in (1..m).combinations(m1 - 1) {
                let mut subset = Vec::with_capacity(m1);
                subset.push(0);
                subset.extend(tail);
                if subset != baseline {
                    subsets.push(subset);
                }
            }
        } else {
            for subset in (0..m).combinations(m1) {
                if subset != baseline {
                    subsets.push(subset);
                }
            }
        }
        subsets
    } else {
        let n_perm = n_perm.expect("sampling requires a permutation budget");
        let mut subsets = Vec::with_capacity(n_perm + 1);
        subsets.push(baseline);
        for _ in 0..n_perm {
            let mut subset = if halved {
                let mut subset = Vec::with_capacity(m1);
                subset.push(0);
                subset.extend(index_sample(rng, m - 1, m1 - 1).into_iter().map(|i| i + 1));
                subset
            } else {
                index_sample(rng, m, m1).into_vec()
            };
            subset.sort_unstable();
            subsets.push(subset);
        }
        subsets
    };

    Ok(AssignmentSet {
        subsets,
        enumeration: if exact {
            Enumeration::Exact
        } else {
            Enumeration::Sampled
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(9, 4), 126);
        assert_eq!(binomial(7, 3), 35);
        assert_eq!(binomial(18, 9), 48620);
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(3, 5), 0);
        // C(70, 35) overflows u64; must saturate instead of wrapping
        assert_eq!(binomial(70, 35), u64::MAX);
    }

    #[test]
    fn baseline_is_always_first() {
        for (m1, m2, n_perm) in [(2, 2, None), (5, 5, Some(200)), (3, 4, Some(2)), (4, 7, None)] {
            let set = group1_assignments(m1, m2, n_perm, &mut rng(1)).unwrap();
            let baseline: Vec<usize> = (0..m1).collect();
            assert_eq!(set.subsets[0], baseline, "m1={m1} m2={m2}");
        }
    }

    #[test]
    fn all_subsets_are_valid() {
        let set = group1_assignments(3, 5, Some(50), &mut rng(7)).unwrap();
        for subset in &set.subsets {
            assert_eq!(subset.len(), 3);
            let mut sorted = subset.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 3, "indices must be distinct");
            assert!(subset.iter().all(|&i| i < 8));
        }
    }

    #[test]
    fn equal_groups_prefer_exact_when_budget_covers_space() {
        // ncomb = C(9, 4) = 126 <= 200 + 1, so the request is ignored
        let set = group1_assignments(5, 5, Some(200), &mut rng(3)).unwrap();
        assert_eq!(set.enumeration, Enumeration::Exact);
        assert_eq!(set.len(), 126);
        // equal groups: every subset is pinned to pooled index 0
        assert!(set.subsets.iter().all(|s| s[0] == 0));
    }

    #[test]
    fn small_budget_samples() {
        // ncomb = C(7, 3) = 35 > 2 + 1
        let set = group1_assignments(3, 4, Some(2), &mut rng(11)).unwrap();
        assert_eq!(set.enumeration, Enumeration::Sampled);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn budget_one_below_space_is_exact() {
        // boundary: n_perm + 1 == ncomb selects exact enumeration
        let set = group1_assignments(3, 4, Some(34), &mut rng(5)).unwrap();
        assert_eq!(set.enumeration, Enumeration::Exact);
        assert_eq!(set.len(), 35);
    }

    #[test]
    fn exact_enumeration_has_no_duplicates() {
        let set = group1_assignments(4, 4, None, &mut rng(2)).unwrap();
        assert_eq!(set.len(), 35); // C(7, 3)
        let mut seen = set.subsets.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 35);
    }

    #[test]
    fn sampling_is_reproducible() {
        let a = group1_assignments(4, 6, Some(100), &mut rng(42)).unwrap();
        let b = group1_assignments(4, 6, Some(100), &mut rng(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_groups_are_rejected() {
        let err = group1_assignments(1, 5, Some(10), &mut rng(0)).unwrap_err();
        assert_eq!(err, TestError::InsufficientGroupSize { group: 1, size: 1 });
        let err = group1_assignments(3, 0, None, &mut rng(0)).unwrap_err();
        assert_eq!(err, TestError::InsufficientGroupSize { group: 2, size: 0 });
    }
}
