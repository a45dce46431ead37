//! Distributed sorting of integer keys across MPI ranks.
//!
//! This library provides two SPMD sort kernels over a message-passing world
//! of P ranks: [sort_psrs](crate::psrs::sort_psrs), a parallel sort by
//! regular sampling, and [sort_bitonic](crate::bitonic::sort_bitonic), a
//! pairwise compare-exchange bitonic merge network. Both mutate the rank's
//! local block in place so that afterwards every block is non-decreasing and
//! the last key of rank r never exceeds the first key of rank r + 1.
//!
//! The kernels speak to the world through the
//! [Collectives](crate::transport::Collectives) trait. In production that is
//! [MpiTransport](crate::transport::MpiTransport) on top of an MPI
//! communicator; the [loopback](crate::loopback) module runs the same
//! kernels over threads inside one process, which is how the multi-rank
//! tests work without a launcher.
//!
//! ## Using the library.
//!
//! ```no_run
//! use distsort::generate::generate_random_keys;
//! use distsort::psrs::sort_psrs;
//! use distsort::timing::Timing;
//! use distsort::transport::MpiTransport;
//! use distsort::verify::verify_sorted;
//! use mpi::traits::Communicator;
//!
//! let universe = mpi::initialize().unwrap();
//! let world = universe.world();
//! let comm = MpiTransport::new(&world);
//!
//! let mut keys = generate_random_keys(10000, world.rank() as usize);
//! let mut timing = Timing::default();
//! sort_psrs(&mut keys, &comm, &mut timing);
//!
//! assert!(verify_sorted(&keys, &comm));
//! ```
//!
//! The accompanying `distsort` binary wires the kernels to a command line,
//! verifies the result and appends one timing row per run to a CSV file.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod bitonic;
pub mod driver;
pub mod error;
pub mod generate;
pub mod loopback;
pub mod merge;
pub mod psrs;
pub mod sampling;
pub mod timing;
pub mod transport;
pub mod verify;

pub use crate::bitonic::sort_bitonic;
pub use crate::psrs::sort_psrs;
pub use crate::verify::verify_sorted;
