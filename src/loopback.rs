//! In-process transport backed by threads and channels.
//!
//! One thread plays one rank; every directed (source, destination) pair owns
//! a FIFO channel, which gives the same per-pair ordering guarantee as the
//! wire transport. This is what lets the kernels run as ordinary tests with
//! world sizes larger than one, without an external launcher.

use std::any::Any;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier};

use crate::transport::{Collectives, Count, ReduceOp, SortKey};

type Message = Box<dyn Any + Send>;

/// One rank's endpoint of an in-process world.
pub struct LoopbackTransport {
    rank: usize,
    size: usize,
    barrier: Arc<Barrier>,
    outgoing: Vec<Sender<Message>>,
    incoming: Vec<Receiver<Message>>,
}

/// Factory for [`LoopbackTransport`] endpoints.
pub struct LoopbackWorld;

impl LoopbackWorld {
    /// Create the endpoints of a world with `size` ranks, in rank order.
    pub fn create(size: usize) -> Vec<LoopbackTransport> {
        assert!(size > 0, "world size must be positive");

        let barrier = Arc::new(Barrier::new(size));

        let mut outgoing: Vec<Vec<Sender<Message>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut incoming: Vec<Vec<Receiver<Message>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for source in 0..size {
            for destination in 0..size {
                let (tx, rx) = mpsc::channel();
                outgoing[source].push(tx);
                incoming[destination].push(rx);
            }
        }

        outgoing
            .into_iter()
            .zip(incoming)
            .enumerate()
            .map(|(rank, (outgoing, incoming))| LoopbackTransport {
                rank,
                size,
                barrier: Arc::clone(&barrier),
                outgoing,
                incoming,
            })
            .collect()
    }

    /// Run `f` once per rank on its own thread and collect the results in
    /// rank order.
    pub fn run<R, F>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(&LoopbackTransport) -> R + Sync,
        R: Send,
    {
        let transports = Self::create(size);
        std::thread::scope(|scope| {
            let f = &f;
            let handles: Vec<_> = transports
                .into_iter()
                .map(|transport| scope.spawn(move || f(&transport)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("rank thread panicked"))
                .collect()
        })
    }
}

impl LoopbackTransport {
    fn post<T: Send + 'static>(&self, destination: usize, payload: Vec<T>) {
        self.outgoing[destination]
            .send(Box::new(payload))
            .expect("peer rank hung up");
    }

    fn take<T: Send + 'static>(&self, source: usize) -> Vec<T> {
        let message = self.incoming[source].recv().expect("peer rank hung up");
        *message
            .downcast::<Vec<T>>()
            .expect("message type mismatch between ranks")
    }
}

impl Collectives for LoopbackTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.barrier.wait();
    }

    fn pairwise_exchange<T: SortKey>(&self, partner: usize, send: &[T]) -> Vec<T> {
        self.post(partner, send.to_vec());
        self.take(partner)
    }

    fn broadcast<T: SortKey>(&self, root: usize, buf: &mut [T]) {
        if self.rank == root {
            for destination in (0..self.size).filter(|&r| r != root) {
                self.post(destination, buf.to_vec());
            }
        } else {
            let data = self.take::<T>(root);
            buf.copy_from_slice(&data);
        }
    }

    fn gather<T: SortKey>(&self, root: usize, local: &[T]) -> Option<Vec<T>> {
        if self.rank == root {
            let mut gathered = Vec::with_capacity(local.len() * self.size);
            for source in 0..self.size {
                if source == root {
                    gathered.extend_from_slice(local);
                } else {
                    gathered.extend(self.take::<T>(source));
                }
            }
            Some(gathered)
        } else {
            self.post(root, local.to_vec());
            None
        }
    }

    fn exchange_counts(&self, send_counts: &[Count]) -> Vec<Count> {
        for destination in 0..self.size {
            self.post(destination, vec![send_counts[destination]]);
        }
        (0..self.size)
            .map(|source| self.take::<Count>(source)[0])
            .collect()
    }

    fn all_to_all_varcount<T: SortKey>(
        &self,
        send: &[T],
        send_counts: &[Count],
        recv_counts: &[Count],
    ) -> Vec<T> {
        let mut offset = 0;
        for (destination, &count) in send_counts.iter().enumerate() {
            let count = count as usize;
            self.post(destination, send[offset..offset + count].to_vec());
            offset += count;
        }

        let mut recv = Vec::with_capacity(recv_counts.iter().sum::<Count>() as usize);
        for (source, &count) in recv_counts.iter().enumerate() {
            let segment = self.take::<T>(source);
            debug_assert_eq!(segment.len(), count as usize);
            recv.extend(segment);
        }
        recv
    }

    fn shift_right<T: SortKey>(&self, send: &[T]) -> Vec<T> {
        if self.rank + 1 < self.size {
            self.post(self.rank + 1, send.to_vec());
        }
        if self.rank > 0 {
            self.take::<T>(self.rank - 1)
        } else {
            Vec::new()
        }
    }

    fn all_and(&self, value: bool) -> bool {
        if self.rank == 0 {
            let mut verdict = value;
            for source in 1..self.size {
                verdict &= self.take::<bool>(source)[0];
            }
            for destination in 1..self.size {
                self.post(destination, vec![verdict]);
            }
            verdict
        } else {
            self.post(0, vec![value]);
            self.take::<bool>(0)[0]
        }
    }

    fn reduce_f64(&self, op: ReduceOp, value: f64) -> Option<f64> {
        if self.rank == 0 {
            let mut result = value;
            for source in 1..self.size {
                let contribution = self.take::<f64>(source)[0];
                result = match op {
                    ReduceOp::Sum => result + contribution,
                    ReduceOp::Max => result.max(contribution),
                };
            }
            Some(result)
        } else {
            self.post(0, vec![value]);
            None
        }
    }
}
