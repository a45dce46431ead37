//! Global verification of a distributed sort.

use itertools::Itertools;

use crate::transport::{Collectives, SortKey};

/// Check that the distributed array is globally sorted.
///
/// Each rank checks its own block for monotonicity and sends its last key to
/// the next rank, which compares it against its first key. Empty blocks
/// satisfy the boundary trivially. The verdict is combined with a logical
/// and over all ranks, so every rank returns the same answer.
pub fn verify_sorted<T: SortKey, C: Collectives>(block: &[T], comm: &C) -> bool {
    let locally_sorted = block.iter().tuple_windows().all(|(a, b)| a <= b);
    if !locally_sorted {
        log::error!("rank {}: local block is not sorted", comm.rank());
    }

    let prev_last = comm.shift_right(block.last().map(std::slice::from_ref).unwrap_or(&[]));

    let boundary_ok = match (prev_last.first(), block.first()) {
        (Some(prev), Some(first)) if prev > first => {
            log::error!(
                "rank {}: boundary violated, previous rank ends at {:?} but this rank starts at {:?}",
                comm.rank(),
                prev,
                first
            );
            false
        }
        _ => true,
    };

    comm.all_and(locally_sorted && boundary_ok)
}
