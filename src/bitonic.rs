//! Distributed bitonic sort.
//!
//! After a local sort the ranks run the bitonic merge network: ceil(log2 P)
//! outer stages, where stage s performs s + 1 compare-exchange steps with
//! partners at XOR distances 2^s down to 1. Each compare-exchange swaps full
//! blocks with the partner and keeps either the low or the high half of the
//! merged pair, so per-rank block sizes never change.

use std::time::Instant;

use crate::merge::{merge_keep_high, merge_keep_low};
use crate::timing::Timing;
use crate::transport::{Collectives, SortKey};

/// Sort the distributed array whose local part is `block`.
///
/// The network is only a correct sort when the number of ranks is a power
/// of two. For other world sizes rank 0 emits a warning and the kernel runs
/// best-effort, skipping steps whose partner falls outside the world; the
/// caller's verification will catch an unsorted outcome.
pub fn sort_bitonic<T: SortKey, C: Collectives>(block: &mut Vec<T>, comm: &C, timing: &mut Timing) {
    let total_timer = Instant::now();
    let size = comm.size();
    let rank = comm.rank();

    if !size.is_power_of_two() && rank == 0 {
        log::warn!(
            "bitonic sort needs a power-of-two number of ranks, got {}; the result may stay unsorted",
            size
        );
    }

    let timer = Instant::now();
    block.sort_unstable();
    timing.local_sort += timer.elapsed().as_secs_f64();

    let stages = size.next_power_of_two().trailing_zeros();
    for stage in 0..stages {
        for step in (0..=stage).rev() {
            let partner = rank ^ (1usize << step);
            if partner >= size {
                continue;
            }

            // Ranks in the same 2^(stage+1) window sort in the same
            // direction; alternating windows produce the bitonic input for
            // the next stage. Both partners derive complementary halves.
            let stage_size = 1usize << (stage + 1);
            let ascending = (rank / stage_size) % 2 == 0;
            let keep_small = if rank < partner { ascending } else { !ascending };

            let timer = Instant::now();
            let other = comm.pairwise_exchange(partner, block);
            timing.comm += timer.elapsed().as_secs_f64();

            let timer = Instant::now();
            if keep_small {
                merge_keep_low(block, &other);
            } else {
                merge_keep_high(block, &other);
            }
            timing.merge += timer.elapsed().as_secs_f64();
        }
    }

    timing.total += total_timer.elapsed().as_secs_f64();
}
