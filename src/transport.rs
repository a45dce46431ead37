//! Typed collectives over the message-passing substrate.
//!
//! The sort kernels are generic over the [`Collectives`] trait and never name
//! the substrate itself. [`MpiTransport`] is the production implementation on
//! top of an MPI communicator; [`crate::loopback`] provides an in-process
//! implementation used by the multi-rank tests.

use mpi::collective::SystemOperation;
use mpi::datatype::{Partition, PartitionMut};
use mpi::traits::{CommunicatorCollectives, Destination, Equivalence, Root, Source};

pub use mpi::Count;

use mpi::Tag;

/// Tag of the count handshake inside [`Collectives::pairwise_exchange`].
const SIZE_TAG: Tag = 0;
/// Tag of the data phase inside [`Collectives::pairwise_exchange`].
const DATA_TAG: Tag = 1;

/// Element bound for everything that travels through the transport.
pub trait SortKey:
    Equivalence + Copy + Default + PartialEq + Eq + PartialOrd + Ord + std::fmt::Debug + Send + 'static
{
}

impl<T> SortKey for T where
    T: Equivalence
        + Copy
        + Default
        + PartialEq
        + Eq
        + PartialOrd
        + Ord
        + std::fmt::Debug
        + Send
        + 'static
{
}

/// Reduction operators offered by [`Collectives::reduce_f64`].
#[derive(Clone, Copy, Debug)]
pub enum ReduceOp {
    /// Arithmetic sum across ranks.
    Sum,
    /// Maximum across ranks.
    Max,
}

/// The collective operations the sort kernels need.
///
/// All calls are blocking from the caller's perspective and must be entered
/// by every rank in the same order. Send buffers stay owned by the caller;
/// receive buffers are allocated by the implementation and returned.
pub trait Collectives {
    /// Identity of this rank in `[0, size)`.
    fn rank(&self) -> usize;

    /// Number of cooperating ranks.
    fn size(&self) -> usize;

    /// Block until every rank has entered the barrier.
    fn barrier(&self);

    /// Symmetric variable-size exchange with `partner`.
    ///
    /// Both partners must call this in the same step. A count handshake on
    /// tag 0 sizes the receive buffer before the data moves on tag 1;
    /// callers never deal with the two-phase protocol or its tags
    /// themselves.
    fn pairwise_exchange<T: SortKey>(&self, partner: usize, send: &[T]) -> Vec<T>;

    /// Broadcast `buf` from `root` to all ranks. The length of `buf` must
    /// agree across ranks.
    fn broadcast<T: SortKey>(&self, root: usize, buf: &mut [T]);

    /// Fixed-count gather: every rank contributes `local` (same length on
    /// all ranks); `root` receives the concatenation in rank order, all
    /// other ranks receive `None`.
    fn gather<T: SortKey>(&self, root: usize, local: &[T]) -> Option<Vec<T>>;

    /// All-to-all of one count per destination rank; returns one count per
    /// source rank.
    fn exchange_counts(&self, send_counts: &[Count]) -> Vec<Count>;

    /// All-to-all with variable counts. `send` is the concatenation of the
    /// per-destination segments described by `send_counts`; the result is
    /// the concatenation of the per-source segments described by
    /// `recv_counts` (previously obtained via [`Self::exchange_counts`]).
    fn all_to_all_varcount<T: SortKey>(
        &self,
        send: &[T],
        send_counts: &[Count],
        recv_counts: &[Count],
    ) -> Vec<T>;

    /// Send `send` to rank + 1 and receive from rank - 1. The first rank
    /// receives an empty buffer; the last rank sends into the void.
    fn shift_right<T: SortKey>(&self, send: &[T]) -> Vec<T>;

    /// Logical-and reduction of `value` over all ranks, result on all ranks.
    fn all_and(&self, value: bool) -> bool;

    /// Reduce `value` to rank 0. Returns `Some` on rank 0, `None` elsewhere.
    fn reduce_f64(&self, op: ReduceOp, value: f64) -> Option<f64>;
}

/// Compute displacements from a vector of counts.
///
/// For counts [3, 4, 5] the displacements are [0, 3, 7].
pub fn displacements(counts: &[Count]) -> Vec<Count> {
    counts
        .iter()
        .scan(0, |acc, &x| {
            let tmp = *acc;
            *acc += x;
            Some(tmp)
        })
        .collect()
}

/// [`Collectives`] implementation on top of an MPI communicator.
pub struct MpiTransport<'c, C: CommunicatorCollectives> {
    comm: &'c C,
}

impl<'c, C: CommunicatorCollectives> MpiTransport<'c, C> {
    /// Wrap a communicator.
    pub fn new(comm: &'c C) -> Self {
        Self { comm }
    }
}

impl<C: CommunicatorCollectives> Collectives for MpiTransport<'_, C> {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn barrier(&self) {
        self.comm.barrier();
    }

    fn pairwise_exchange<T: SortKey>(&self, partner: usize, send: &[T]) -> Vec<T> {
        let partner_process = self.comm.process_at_rank(partner as i32);

        // Count handshake on tag 0 so that the receive buffer can be sized;
        // the data moves on tag 1. Both partners post the send before
        // blocking on the receive, so the matched pair cannot deadlock.
        let send_len = send.len() as Count;
        let mut recv_len: Count = 0;
        mpi::request::scope(|scope| {
            let sreq = partner_process.immediate_send_with_tag(scope, &send_len, SIZE_TAG);
            let (len, _status) = partner_process.receive_with_tag::<Count>(SIZE_TAG);
            recv_len = len;
            sreq.wait();
        });

        let mut recv = vec![T::default(); recv_len as usize];

        mpi::request::scope(|scope| {
            let sreq = partner_process.immediate_synchronous_send_with_tag(scope, send, DATA_TAG);
            partner_process.receive_into_with_tag(&mut recv[..], DATA_TAG);
            sreq.wait();
        });

        recv
    }

    fn broadcast<T: SortKey>(&self, root: usize, buf: &mut [T]) {
        self.comm.process_at_rank(root as i32).broadcast_into(buf);
    }

    fn gather<T: SortKey>(&self, root: usize, local: &[T]) -> Option<Vec<T>> {
        let root_process = self.comm.process_at_rank(root as i32);

        if self.rank() == root {
            let mut gathered = vec![T::default(); local.len() * self.size()];
            root_process.gather_into_root(local, &mut gathered[..]);
            Some(gathered)
        } else {
            root_process.gather_into(local);
            None
        }
    }

    fn exchange_counts(&self, send_counts: &[Count]) -> Vec<Count> {
        let mut recv_counts = vec![0 as Count; self.size()];
        self.comm.all_to_all_into(send_counts, &mut recv_counts[..]);
        recv_counts
    }

    fn all_to_all_varcount<T: SortKey>(
        &self,
        send: &[T],
        send_counts: &[Count],
        recv_counts: &[Count],
    ) -> Vec<T> {
        let send_displs = displacements(send_counts);
        let recv_displs = displacements(recv_counts);

        let mut recv = vec![T::default(); recv_counts.iter().sum::<Count>() as usize];

        let send_partition = Partition::new(send, send_counts, &send_displs[..]);
        let mut recv_partition = PartitionMut::new(&mut recv[..], recv_counts, &recv_displs[..]);
        self.comm
            .all_to_all_varcount_into(&send_partition, &mut recv_partition);

        recv
    }

    fn shift_right<T: SortKey>(&self, send: &[T]) -> Vec<T> {
        let rank = self.rank();
        let size = self.size();

        let mut received = Vec::new();
        mpi::request::scope(|scope| {
            let sreq = (rank + 1 < size).then(|| {
                self.comm
                    .process_at_rank((rank + 1) as i32)
                    .immediate_send(scope, send)
            });

            if rank > 0 {
                let (data, _status) = self
                    .comm
                    .process_at_rank((rank - 1) as i32)
                    .receive_vec::<T>();
                received = data;
            }

            if let Some(req) = sreq {
                req.wait();
            }
        });

        received
    }

    fn all_and(&self, value: bool) -> bool {
        let local: i32 = value as i32;
        let mut global: i32 = 0;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::logical_and());
        global != 0
    }

    fn reduce_f64(&self, op: ReduceOp, value: f64) -> Option<f64> {
        let root_process = self.comm.process_at_rank(0);
        let operation = match op {
            ReduceOp::Sum => SystemOperation::sum(),
            ReduceOp::Max => SystemOperation::max(),
        };

        if self.rank() == 0 {
            let mut result = 0.0;
            root_process.reduce_into_root(&value, &mut result, operation);
            Some(result)
        } else {
            root_process.reduce_into(&value, operation);
            None
        }
    }
}
