//! End-to-end driver runs over the loopback transport: generation, sort,
//! verification and CSV emission in one process.

use std::path::PathBuf;

use distsort::driver::{self, Algorithm};
use distsort::loopback::LoopbackWorld;

fn scratch_csv(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("distsort-e2e-{}-{}.csv", label, std::process::id()))
}

fn run_once(size: usize, algorithm: Algorithm, problem_size: u64, path: &PathBuf) -> bool {
    let results = LoopbackWorld::run(size, |comm| {
        driver::run(comm, algorithm, problem_size, path).is_ok()
    });
    results.into_iter().all(|ok| ok)
}

#[test]
fn test_psrs_benchmark_appends_result_rows() {
    let path = scratch_csv("psrs");
    let _ = std::fs::remove_file(&path);

    assert!(run_once(4, Algorithm::Psrs, 1000, &path));
    assert!(run_once(4, Algorithm::Psrs, 1000, &path));

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "num_ranks,problem_size,total_time,local_sort_time,communication_time,merge_time"
    );
    for row in &lines[1..] {
        assert!(row.starts_with("4,1000,"));
    }

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_bitonic_benchmark_round_trip() {
    let path = scratch_csv("bitonic");
    let _ = std::fs::remove_file(&path);

    assert!(run_once(8, Algorithm::Bitonic, 4096, &path));

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("8,4096,"));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_single_rank_runs_both_kernels() {
    let path = scratch_csv("single");
    let _ = std::fs::remove_file(&path);

    assert!(run_once(1, Algorithm::Psrs, 100, &path));
    assert!(run_once(1, Algorithm::Bitonic, 100, &path));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 3);

    std::fs::remove_file(&path).unwrap();
}
