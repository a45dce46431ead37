//! Benchmark driver: kernel dispatch, timing reduction and result output.

use std::fs::OpenOptions;
use std::path::Path;
use std::time::Instant;

use clap::ValueEnum;

use crate::bitonic::sort_bitonic;
use crate::error::Error;
use crate::generate::generate_random_keys;
use crate::psrs::sort_psrs;
use crate::timing::Timing;
use crate::transport::{Collectives, ReduceOp};
use crate::verify::verify_sorted;

/// The two sort kernels selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Parallel sorting by regular sampling.
    Psrs,
    /// Distributed bitonic merge network.
    Bitonic,
}

impl Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::Psrs => "psrs",
            Algorithm::Bitonic => "bitonic",
        }
    }
}

/// One reduced result row, available on rank 0 after a run.
#[derive(Clone, Debug)]
pub struct Report {
    /// World size of the run.
    pub num_ranks: usize,
    /// Total number of keys across all ranks.
    pub problem_size: u64,
    /// Maximum kernel wall time over all ranks, seconds.
    pub total_time: f64,
    /// Mean local sort time over all ranks, seconds.
    pub local_sort_time: f64,
    /// Mean time spent in collectives over all ranks, seconds.
    pub communication_time: f64,
    /// Mean partition-and-merge time over all ranks, seconds.
    pub merge_time: f64,
}

/// Number of keys owned by `rank` when `problem_size` keys are spread over
/// `size` ranks: the first `problem_size mod size` ranks get one extra.
pub fn local_block_len(problem_size: u64, size: usize, rank: usize) -> usize {
    let base = problem_size / size as u64;
    let remainder = problem_size % size as u64;
    (base + u64::from((rank as u64) < remainder)) as usize
}

/// Generate this rank's data, run the selected kernel, verify the global
/// order and, on rank 0, append the result row to `output`.
///
/// Returns [`Error::VerificationFailed`] on every rank when the output is
/// not globally sorted.
pub fn run<C: Collectives>(
    comm: &C,
    algorithm: Algorithm,
    problem_size: u64,
    output: &Path,
) -> Result<(), Error> {
    let rank = comm.rank();
    let size = comm.size();

    if rank == 0 {
        println!(
            "sorting {} keys across {} ranks with {}",
            problem_size,
            size,
            algorithm.name()
        );
    }

    let mut block = generate_random_keys(local_block_len(problem_size, size, rank), rank);

    comm.barrier();

    let mut timing = Timing::default();
    let timer = Instant::now();
    match algorithm {
        Algorithm::Psrs => sort_psrs(&mut block, comm, &mut timing),
        Algorithm::Bitonic => sort_bitonic(&mut block, comm, &mut timing),
    }
    timing.total = timer.elapsed().as_secs_f64();

    let verified = verify_sorted(&block, comm);

    if let Some(report) = reduce_timings(comm, &timing, problem_size) {
        println!(
            "verification: {}",
            if verified { "passed" } else { "FAILED" }
        );
        println!("total time (max):    {:.6} s", report.total_time);
        println!("local sort (mean):   {:.6} s", report.local_sort_time);
        println!("communication (mean): {:.6} s", report.communication_time);
        println!("merge (mean):        {:.6} s", report.merge_time);
        if report.total_time > 0.0 {
            println!(
                "throughput:          {:.3} M keys/s",
                problem_size as f64 / report.total_time / 1e6
            );
        }
        append_csv(output, &report)?;
    }

    if verified {
        Ok(())
    } else {
        Err(Error::VerificationFailed)
    }
}

/// Reduce the per-rank accumulators: max for the total, arithmetic mean for
/// the three components. `Some` on rank 0.
fn reduce_timings<C: Collectives>(
    comm: &C,
    timing: &Timing,
    problem_size: u64,
) -> Option<Report> {
    let size = comm.size() as f64;

    let max_total = comm.reduce_f64(ReduceOp::Max, timing.total);
    let sum_local_sort = comm.reduce_f64(ReduceOp::Sum, timing.local_sort);
    let sum_comm = comm.reduce_f64(ReduceOp::Sum, timing.comm);
    let sum_merge = comm.reduce_f64(ReduceOp::Sum, timing.merge);

    max_total.map(|total_time| Report {
        num_ranks: comm.size(),
        problem_size,
        total_time,
        local_sort_time: sum_local_sort.unwrap() / size,
        communication_time: sum_comm.unwrap() / size,
        merge_time: sum_merge.unwrap() / size,
    })
}

/// Append one result row to `path`, creating the file with its header on
/// first use.
fn append_csv(path: &Path, report: &Report) -> Result<(), Error> {
    let write_header = !path.exists();

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::Writer::from_writer(file);

    if write_header {
        writer.write_record([
            "num_ranks",
            "problem_size",
            "total_time",
            "local_sort_time",
            "communication_time",
            "merge_time",
        ])?;
    }

    writer.write_record(&[
        report.num_ranks.to_string(),
        report.problem_size.to_string(),
        report.total_time.to_string(),
        report.local_sort_time.to_string(),
        report.communication_time.to_string(),
        report.merge_time.to_string(),
    ])?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_csv(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("distsort-{}-{}.csv", label, std::process::id()))
    }

    #[test]
    fn test_block_lengths_cover_the_problem() {
        for &(n, p) in &[(10u64, 4usize), (0, 3), (7, 7), (23, 5)] {
            let lens: Vec<usize> = (0..p).map(|r| local_block_len(n, p, r)).collect();
            assert_eq!(lens.iter().sum::<usize>() as u64, n);
            let min = lens.iter().min().unwrap();
            let max = lens.iter().max().unwrap();
            assert!(max - min <= 1);
        }
    }

    #[test]
    fn test_csv_header_written_once() {
        let path = scratch_csv("header");
        let _ = std::fs::remove_file(&path);

        let report = Report {
            num_ranks: 4,
            problem_size: 1000,
            total_time: 0.5,
            local_sort_time: 0.1,
            communication_time: 0.2,
            merge_time: 0.05,
        };

        append_csv(&path, &report).unwrap();
        append_csv(&path, &report).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "num_ranks,problem_size,total_time,local_sort_time,communication_time,merge_time"
        );
        assert_eq!(lines[1], "4,1000,0.5,0.1,0.2,0.05");
        assert_eq!(lines[1], lines[2]);

        std::fs::remove_file(&path).unwrap();
    }
}
