//! Command-line entry point for the distributed sorting benchmark.
//!
//! Meant to be started under an MPI launcher, e.g.
//! `mpiexec -n 8 distsort psrs 100000000 results.csv`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mpi::traits::Communicator;

use distsort::driver::{self, Algorithm};
use distsort::error::Error;
use distsort::transport::MpiTransport;

#[derive(Parser)]
#[command(about = "Distributed sorting benchmark (regular-sampling and bitonic kernels)")]
struct Args {
    /// Sort kernel to run.
    #[arg(value_enum)]
    algorithm: Algorithm,
    /// Total number of keys, distributed evenly across the ranks.
    problem_size: u64,
    /// CSV file the result row is appended to (written by rank 0).
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let comm = MpiTransport::new(&world);

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => {
            // --help and --version are not argument errors.
            if world.rank() == 0 {
                let _ = err.print();
            }
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            if world.rank() == 0 {
                eprintln!("{}", Error::InvalidArguments(err.to_string()));
            }
            return ExitCode::from(1);
        }
    };

    match driver::run(&comm, args.algorithm, args.problem_size, &args.output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if world.rank() == 0 {
                eprintln!("error: {}", err);
            }
            ExitCode::from(1)
        }
    }
}
