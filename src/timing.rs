//! Per-rank timing accumulators for one kernel invocation.

/// Durations in seconds, accumulated by the kernels and reduced by the
/// driver. Passed by mutable reference; there is no global state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timing {
    /// Wall time of the whole kernel invocation.
    pub total: f64,
    /// Time spent in the initial local sort.
    pub local_sort: f64,
    /// Time spent inside transport collectives.
    pub comm: f64,
    /// Time spent partitioning and merging locally.
    pub merge: f64,
}
