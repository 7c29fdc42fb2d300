//! Data-parallel building blocks.
//!
//! With the `threads` feature these fan out over the rayon thread pool,
//! otherwise they run sequentially on the calling thread.
//! Either way, mutable state is only ever owned by one partition at a time
//! and partitions are combined afterwards by a merge function.

#[cfg(feature = "threads")]
use rayon::prelude::*;
use std::cmp::Ordering;

/// The number of items folded into one accumulator when running sequentially.
#[cfg(not(feature = "threads"))]
const PARTITION_LEN: usize = 4096;

/// Folds `items` into per-partition accumulators and then merges them into one.
///
/// `identity` creates an empty accumulator, `fold` adds one item to an accumulator,
/// and `merge` combines two accumulators. The order in which partitions are merged is unspecified.
pub(crate) fn partition_reduce<T, A, I, F, M>(items: &[T], identity: I, fold: F, merge: M) -> A
where
    T: Sync,
    A: Send,
    I: Fn() -> A + Sync + Send,
    F: Fn(A, &T) -> A + Sync + Send,
    M: Fn(A, A) -> A + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        items.par_iter().fold(&identity, &fold).reduce(&identity, &merge)
    }

    #[cfg(not(feature = "threads"))]
    {
        items
            .chunks(PARTITION_LEN)
            .map(|chunk| chunk.iter().fold(identity(), &fold))
            .fold(identity(), &merge)
    }
}

/// Like [`partition_reduce`], but over the indices `0..len`.
pub(crate) fn partition_reduce_range<A, I, F, M>(len: usize, identity: I, fold: F, merge: M) -> A
where
    A: Send,
    I: Fn() -> A + Sync + Send,
    F: Fn(A, usize) -> A + Sync + Send,
    M: Fn(A, A) -> A + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        (0..len).into_par_iter().fold(&identity, &fold).reduce(&identity, &merge)
    }

    #[cfg(not(feature = "threads"))]
    {
        (0..len)
            .step_by(PARTITION_LEN)
            .map(|start| (start..(start + PARTITION_LEN).min(len)).fold(identity(), &fold))
            .fold(identity(), &merge)
    }
}

/// Maps each item to a new value, preserving order.
pub(crate) fn map<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        items.par_iter().map(f).collect()
    }

    #[cfg(not(feature = "threads"))]
    {
        items.iter().map(f).collect()
    }
}

/// Maps each index in `0..len` to a value, preserving order.
pub(crate) fn map_range<U, F>(len: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        (0..len).into_par_iter().map(f).collect()
    }

    #[cfg(not(feature = "threads"))]
    {
        (0..len).map(f).collect()
    }
}

/// Updates each item in place. The closure also receives the item's index.
pub(crate) fn for_each_mut<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    #[cfg(feature = "threads")]
    {
        items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item));
    }

    #[cfg(not(feature = "threads"))]
    {
        for (i, item) in items.iter_mut().enumerate() {
            f(i, item);
        }
    }
}

/// Returns the index of the first item with the largest key, or `None` if `len` is `0`.
///
/// Ties resolve to the lowest index no matter how the work was partitioned.
pub(crate) fn argmax_by_key<K, F>(len: usize, key: F) -> Option<(usize, K)>
where
    K: PartialOrd + Copy + Send,
    F: Fn(usize) -> K + Sync + Send,
{
    fn better<K: PartialOrd>(a: Option<(usize, K)>, b: Option<(usize, K)>) -> Option<(usize, K)> {
        match (a, b) {
            (Some((i, x)), Some((j, y))) => match y.partial_cmp(&x) {
                Some(Ordering::Greater) => Some((j, y)),
                Some(Ordering::Equal) if j < i => Some((j, y)),
                _ => Some((i, x)),
            },
            (a, None) => a,
            (None, b) => b,
        }
    }

    partition_reduce_range(
        len,
        || None,
        |best, i| better(best, Some((i, key(i)))),
        better,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_sums_every_item() {
        let items = (0..10_000u64).collect::<Vec<_>>();
        let sum = partition_reduce(&items, || 0, |acc, &x| acc + x, |a, b| a + b);
        assert_eq!(sum, items.iter().sum::<u64>());

        let count = partition_reduce_range(12_345, || 0usize, |acc, _| acc + 1, |a, b| a + b);
        assert_eq!(count, 12_345);
    }

    #[test]
    fn map_preserves_order() {
        let squares = map_range(100, |i| i * i);
        assert_eq!(squares, (0..100).map(|i| i * i).collect::<Vec<_>>());
        assert_eq!(map(&[1, 2, 3], |x| x + 1), vec![2, 3, 4]);

        let mut values = vec![0; 50];
        for_each_mut(&mut values, |i, v| *v = i * 2);
        assert_eq!(values[49], 98);
    }

    #[test]
    fn argmax_prefers_lowest_index() {
        let keys = [1, 5, 3, 5, 5, 2];
        assert_eq!(argmax_by_key(keys.len(), |i| keys[i]), Some((1, 5)));
        assert_eq!(argmax_by_key(0, |i| keys[i]), None);
    }
}
