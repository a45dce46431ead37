//! Parallel sorting by regular sampling.
//!
//! Every rank sorts its block, contributes `size` regularly spaced samples,
//! and rank 0 turns the gathered samples into `size - 1` pivots. The pivots
//! partition each sorted block into contiguous per-destination buckets which
//! a single variable-count all-to-all routes to their owners; a k-way merge
//! of the received runs restores local order. Afterwards rank r's block is
//! non-decreasing and bounded above by rank r + 1's first key.

use std::time::Instant;

use crate::merge::kway_merge;
use crate::sampling::{partition_by_pivots, select_pivots, select_regular_samples};
use crate::timing::Timing;
use crate::transport::{Collectives, Count, SortKey};

/// Sort the distributed array whose local part is `block`.
///
/// The block is replaced by this rank's slice of the global order; its
/// length afterwards depends on how the keys fall between the pivots.
pub fn sort_psrs<T: SortKey, C: Collectives>(block: &mut Vec<T>, comm: &C, timing: &mut Timing) {
    let total_timer = Instant::now();
    let size = comm.size();

    let timer = Instant::now();
    block.sort_unstable();
    timing.local_sort += timer.elapsed().as_secs_f64();

    // A single rank is done after the local sort.
    if size == 1 {
        timing.total += total_timer.elapsed().as_secs_f64();
        return;
    }

    let samples = select_regular_samples(block, size);

    let timer = Instant::now();
    let gathered = comm.gather(0, &samples);
    timing.comm += timer.elapsed().as_secs_f64();

    // Rank 0 sorts the size^2 gathered samples and picks the pivots; all
    // other ranks receive them through the broadcast.
    let mut pivots = vec![T::default(); size - 1];
    if let Some(mut all_samples) = gathered {
        all_samples.sort_unstable();
        pivots = select_pivots(&all_samples, size);
    }

    let timer = Instant::now();
    comm.broadcast(0, &mut pivots);
    timing.comm += timer.elapsed().as_secs_f64();

    let timer = Instant::now();
    let buckets = partition_by_pivots(block, &pivots);
    let send_counts: Vec<Count> = buckets.iter().map(|b| b.len() as Count).collect();
    timing.merge += timer.elapsed().as_secs_f64();

    // The buckets are contiguous in the sorted block, so the block itself is
    // already the flattened send buffer in rank order.
    let timer = Instant::now();
    let recv_counts = comm.exchange_counts(&send_counts);
    let received = comm.all_to_all_varcount(block, &send_counts, &recv_counts);
    timing.comm += timer.elapsed().as_secs_f64();

    let timer = Instant::now();
    let mut runs = Vec::with_capacity(size);
    let mut offset = 0;
    for &count in &recv_counts {
        runs.push(&received[offset..offset + count as usize]);
        offset += count as usize;
    }
    *block = kway_merge(&runs);
    timing.merge += timer.elapsed().as_secs_f64();

    timing.total += total_timer.elapsed().as_secs_f64();
}
