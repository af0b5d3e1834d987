//! Data-parallel helpers on top of rayon.

use rayon::prelude::*;
use std::ops::Range;

/// Reduces `range` in chunks of at least `grain` indices.
///
/// Each chunk folds into a private accumulator started from `identity`;
/// partial results are merged with `combine`, which must be associative.
pub fn parallel_reduce<A, F, C>(range: Range<usize>, grain: usize, identity: A, chunk: F, combine: C) -> A
where
    A: Copy + Send + Sync,
    F: Fn(Range<usize>, A) -> A + Sync + Send,
    C: Fn(A, A) -> A + Sync + Send,
{
    let len = range.end.saturating_sub(range.start);
    let grain = grain.max(1);
    if len <= grain {
        return chunk(range, identity);
    }
    let n_chunks = len.div_ceil(grain);
    (0..n_chunks)
        .into_par_iter()
        .map(|c| {
            let start = range.start + c * grain;
            let end = (start + grain).min(range.end);
            chunk(start..end, identity)
        })
        .reduce(|| identity, &combine)
}

/// Applies `f` to every lane index in parallel, keeping the order.
pub fn parallel_map<R, F>(count: usize, min_len: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    (0..count)
        .into_par_iter()
        .with_min_len(min_len.max(1))
        .map(f)
        .collect()
}
