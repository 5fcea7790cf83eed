//! Conditional parallel iteration.
//!
//! Uses rayon when the `parallel` feature is enabled and the collection is
//! large enough per [`StressConfig`]. Output order always matches input order.

use crate::types::StressConfig;

/// Maps a function over items, conditionally using parallel iteration.
///
/// ```ignore
/// let rows = maybe_parallel_map(&portfolio.positions, &config, |p| evaluate(p));
/// ```
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &StressConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_parallel_map_sequential() {
        let config = StressConfig::sequential();
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_maybe_parallel_map_preserves_order() {
        let config = StressConfig::new().with_threshold(1);
        let items: Vec<usize> = (0..10_000).collect();
        let results = maybe_parallel_map(&items, &config, |x| x + 1);
        assert!(results.iter().enumerate().all(|(i, v)| *v == i + 1));
    }
}
