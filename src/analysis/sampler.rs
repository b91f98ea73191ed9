use serde::Serialize;

/// Input sizes to benchmark for a target size `n` split into `steps`.
///
/// Sizes are `step, 2*step, ...` up to and including `n`, where
/// `step = max(1, n / steps)`. When `steps` does not divide `n` the plan can
/// hold fewer than `steps` points, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SamplePlan {
    n: usize,
    steps: usize,
}

impl SamplePlan {
    /// Returns `None` unless both `n` and `steps` are positive.
    pub fn new(n: usize, steps: usize) -> Option<Self> {
        if n == 0 || steps == 0 {
            return None;
        }
        Some(Self { n, steps })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step_size(&self) -> usize {
        (self.n / self.steps).max(1)
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> {
        let step = self.step_size();
        // k <= n / step keeps k * step <= n
        (1..=self.len()).map(move |k| k * step)
    }

    pub fn len(&self) -> usize {
        self.n / self.step_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(n: usize, steps: usize) -> Vec<usize> {
        SamplePlan::new(n, steps).unwrap().sizes().collect()
    }

    #[test]
    fn test_even_split() {
        assert_eq!(sizes(10, 2), vec![5, 10]);
        assert_eq!(sizes(100, 4), vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_uneven_split_truncates() {
        // 10 / 3 = 3 -> 3, 6, 9 (10 is never reached)
        assert_eq!(sizes(10, 3), vec![3, 6, 9]);
        // 7 / 4 = 1 -> every size from 1 to 7
        assert_eq!(sizes(7, 4), (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_more_steps_than_items() {
        assert_eq!(sizes(3, 10), vec![1, 2, 3]);
        assert_eq!(sizes(1, 1), vec![1]);
    }

    #[test]
    fn test_plan_invariants() {
        for n in 1..60 {
            for steps in 1..15 {
                let plan = SamplePlan::new(n, steps).unwrap();
                let sampled: Vec<usize> = plan.sizes().collect();
                assert!(!sampled.is_empty());
                assert_eq!(sampled.len(), plan.len());
                assert_eq!(sampled[0], (n / steps).max(1));
                assert!(*sampled.last().unwrap() <= n);
                assert!(sampled.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_rejects_zero() {
        assert!(SamplePlan::new(0, 1).is_none());
        assert!(SamplePlan::new(5, 0).is_none());
    }

    #[test]
    fn test_sizes_near_usize_max() {
        assert_eq!(sizes(usize::MAX, 1), vec![usize::MAX]);
        assert_eq!(sizes(usize::MAX, 2), vec![usize::MAX / 2, usize::MAX - 1]);
    }
}
