//! Regular sampling and pivot-based partitioning for the PSRS kernel.

/// Draw `nsamples` regularly spaced keys from a sorted block.
///
/// Samples sit at indices `i * max(len / nsamples, 1)`. When the block has
/// fewer keys than requested the output is padded by repeating the last
/// sampled key, or the default value for an empty block, so that every rank
/// contributes the same number of entries to the fixed-count gather.
pub fn select_regular_samples<T: Copy + Default>(sorted: &[T], nsamples: usize) -> Vec<T> {
    let mut samples = Vec::with_capacity(nsamples);

    let step = (sorted.len() / nsamples.max(1)).max(1);
    for index in (0..nsamples).map(|i| i * step) {
        match sorted.get(index) {
            Some(&key) => samples.push(key),
            None => break,
        }
    }

    let pad = samples.last().copied().unwrap_or_default();
    samples.resize(nsamples, pad);
    samples
}

/// Pick `nparts - 1` pivots from the sorted concatenation of all sample
/// sets: `pivots[i] = sorted_samples[(i + 1) * len / nparts]`, clamped to
/// the last entry.
pub fn select_pivots<T: Copy>(sorted_samples: &[T], nparts: usize) -> Vec<T> {
    let len = sorted_samples.len();
    (1..nparts)
        .map(|i| sorted_samples[(i * len / nparts).min(len - 1)])
        .collect()
}

/// Split a sorted block into `pivots.len() + 1` contiguous buckets.
///
/// Bucket `i` holds the keys assigned to rank `i`: a key belongs to the
/// first bucket whose closing pivot is greater than or equal to it, so keys
/// equal to a pivot fall on the lower side. Pivots must be non-decreasing.
pub fn partition_by_pivots<'a, T: Ord>(sorted: &'a [T], pivots: &[T]) -> Vec<&'a [T]> {
    let mut buckets = Vec::with_capacity(pivots.len() + 1);

    let mut rest = sorted;
    for pivot in pivots {
        let cut = rest.partition_point(|key| key <= pivot);
        let (bucket, tail) = rest.split_at(cut);
        buckets.push(bucket);
        rest = tail;
    }
    buckets.push(rest);

    buckets
}
