use serde::Serialize;
use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::complexity;

/// The closed set of reference algorithms the analyzer knows how to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    BubbleSort,
    LinearSearch,
    BinarySearch,
    NestedExponential,
}

/// The input for one timed run did not fit in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot allocate an input of {size} elements")]
pub struct InputTooLarge {
    pub size: usize,
}

impl Algorithm {
    const ALL: [Algorithm; 4] = [
        Algorithm::BubbleSort,
        Algorithm::LinearSearch,
        Algorithm::BinarySearch,
        Algorithm::NestedExponential,
    ];

    pub fn all() -> &'static [Algorithm] {
        &Self::ALL
    }

    /// Resolve a requested name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|algo| algo.name().eq_ignore_ascii_case(name))
    }

    /// Registry key for this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "bubble",
            Algorithm::LinearSearch => "linear",
            Algorithm::BinarySearch => "binary",
            Algorithm::NestedExponential => "nested/exponential",
        }
    }

    pub fn complexity(&self) -> &'static str {
        complexity::label_for(self.name())
    }

    /// Build a fresh input of `size` and time one execution.
    ///
    /// Input construction and teardown are outside the measurement. Inputs
    /// that cannot be allocated are reported instead of aborting.
    pub fn time(&self, size: usize) -> Result<Duration, InputTooLarge> {
        let elapsed = match self {
            Algorithm::BubbleSort => {
                let mut values = descending(size)?;
                timed(|| bubble_sort(black_box(&mut values)))
            }
            Algorithm::LinearSearch => {
                let values = ascending(size)?;
                let target = last_value(size);
                timed(|| linear_search(black_box(&values), black_box(target)))
            }
            Algorithm::BinarySearch => {
                let values = ascending(size)?;
                let target = last_value(size);
                timed(|| binary_search(black_box(&values), black_box(target)))
            }
            Algorithm::NestedExponential => timed(|| nested_exponential(black_box(size))),
        };
        Ok(elapsed)
    }
}

fn timed<T>(run: impl FnOnce() -> T) -> Duration {
    let start = Instant::now();
    black_box(run());
    start.elapsed()
}

fn with_capacity(size: usize) -> Result<Vec<i64>, InputTooLarge> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(size)
        .map_err(|_| InputTooLarge { size })?;
    Ok(values)
}

/// `size, size-1, ..., 1`, the worst case for bubble sort.
fn descending(size: usize) -> Result<Vec<i64>, InputTooLarge> {
    let mut values = with_capacity(size)?;
    values.extend((1..=size as i64).rev());
    Ok(values)
}

/// `0, 1, ..., size-1`; searches look for the last element.
fn ascending(size: usize) -> Result<Vec<i64>, InputTooLarge> {
    let mut values = with_capacity(size)?;
    values.extend(0..size as i64);
    Ok(values)
}

fn last_value(size: usize) -> i64 {
    size as i64 - 1
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn bubble_sort(values: &mut [i64]) {
    let n = values.len();
    for i in 0..n {
        for j in 0..n - i - 1 {
            if values[j] > values[j + 1] {
                values.swap(j, j + 1);
            }
        }
    }
}

pub fn linear_search(values: &[i64], target: i64) -> Option<usize> {
    for (i, &value) in values.iter().enumerate() {
        if value == target {
            return Some(i);
        }
    }
    None
}

pub fn binary_search(values: &[i64], target: i64) -> Option<usize> {
    let (mut left, mut right) = (0usize, values.len());
    while left < right {
        let mid = left + (right - left) / 2;
        match values[mid].cmp(&target) {
            std::cmp::Ordering::Equal => return Some(mid),
            std::cmp::Ordering::Less => left = mid + 1,
            std::cmp::Ordering::Greater => right = mid,
        }
    }
    None
}

/// Counts `sum(2^i for i in 0..depth)` one increment at a time.
///
/// Inner iteration counts saturate at `u64::MAX` once `i` reaches 64.
pub fn nested_exponential(depth: usize) -> u64 {
    let mut result: u64 = 0;
    for i in 0..depth {
        let inner = u32::try_from(i)
            .ok()
            .and_then(|shift| 1u64.checked_shl(shift))
            .unwrap_or(u64::MAX);
        for _ in 0..inner {
            result = black_box(result).wrapping_add(1);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive_and_closed() {
        assert_eq!(Algorithm::from_name("bubble"), Some(Algorithm::BubbleSort));
        assert_eq!(Algorithm::from_name("LINEAR"), Some(Algorithm::LinearSearch));
        assert_eq!(Algorithm::from_name("Binary"), Some(Algorithm::BinarySearch));
        assert_eq!(
            Algorithm::from_name("Nested/Exponential"),
            Some(Algorithm::NestedExponential)
        );

        // Classifier aliases are not registry names
        assert_eq!(Algorithm::from_name("bubblesort"), None);
        assert_eq!(Algorithm::from_name("nested"), None);
        assert_eq!(Algorithm::from_name("exponential"), None);
        assert_eq!(Algorithm::from_name("unknown"), None);
        assert_eq!(Algorithm::from_name(""), None);
    }

    #[test]
    fn test_bubble_sort_orders_descending_input() {
        let mut values = descending(6).unwrap();
        assert_eq!(values, vec![6, 5, 4, 3, 2, 1]);
        bubble_sort(&mut values);
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_searches_find_last_element() {
        let values = ascending(100).unwrap();
        let target = last_value(100);
        assert_eq!(target, 99);
        assert_eq!(linear_search(&values, target), Some(99));
        assert_eq!(binary_search(&values, target), Some(99));

        assert_eq!(binary_search(&[1, 3, 5, 7], 4), None);
        assert_eq!(linear_search(&[], 0), None);
        assert_eq!(binary_search(&[], 0), None);
    }

    #[test]
    fn test_nested_exponential_counts_geometric_sum() {
        assert_eq!(nested_exponential(0), 0);
        assert_eq!(nested_exponential(1), 1);
        assert_eq!(nested_exponential(5), 31);
        assert_eq!(nested_exponential(10), 1023);
    }

    #[test]
    fn test_time_runs_every_algorithm() {
        for algo in Algorithm::all() {
            let elapsed = algo.time(8).unwrap();
            assert!(elapsed < Duration::from_secs(5), "{} took {:?}", algo, elapsed);
        }
    }

    #[test]
    fn test_oversized_inputs_are_reported() {
        let size = usize::MAX / 2;
        for algo in [
            Algorithm::BubbleSort,
            Algorithm::LinearSearch,
            Algorithm::BinarySearch,
        ] {
            assert_eq!(algo.time(size), Err(InputTooLarge { size }), "{}", algo);
        }
    }
}
