//! Multi-rank properties of the regular-sampling sort, run over the
//! in-process loopback transport.

use distsort::driver::local_block_len;
use distsort::generate::{generate_random_keys, generate_uniform_keys};
use distsort::loopback::LoopbackWorld;
use distsort::psrs::sort_psrs;
use distsort::timing::Timing;
use distsort::transport::Collectives;
use distsort::verify::verify_sorted;

/// Sort per-rank inputs and return (input, output, verified) per rank.
fn sort_blocks(inputs: Vec<Vec<i32>>) -> Vec<(Vec<i32>, Vec<i32>, bool)> {
    LoopbackWorld::run(inputs.len(), |comm| {
        let input = inputs[comm.rank()].clone();
        let mut block = input.clone();
        let mut timing = Timing::default();
        sort_psrs(&mut block, comm, &mut timing);
        let verified = verify_sorted(&block, comm);
        (input, block, verified)
    })
}

fn assert_globally_sorted(outputs: &[Vec<i32>]) {
    let concatenated: Vec<i32> = outputs.iter().flatten().copied().collect();
    assert!(
        concatenated.windows(2).all(|w| w[0] <= w[1]),
        "concatenated output is not sorted: {:?}",
        concatenated
    );
}

fn assert_same_multiset(inputs: &[Vec<i32>], outputs: &[Vec<i32>]) {
    let mut input_keys: Vec<i32> = inputs.iter().flatten().copied().collect();
    let mut output_keys: Vec<i32> = outputs.iter().flatten().copied().collect();
    input_keys.sort_unstable();
    output_keys.sort_unstable();
    assert_eq!(input_keys, output_keys);
}

#[test]
fn test_random_inputs_end_up_globally_sorted() {
    for &size in &[1usize, 2, 3, 4, 8, 16] {
        for &n in &[0u64, 1, size as u64, 10 * size as u64, 100_000] {
            let inputs: Vec<Vec<i32>> = (0..size)
                .map(|rank| generate_random_keys(local_block_len(n, size, rank), rank))
                .collect();

            let results = sort_blocks(inputs.clone());
            let outputs: Vec<Vec<i32>> = results.iter().map(|(_, out, _)| out.clone()).collect();

            assert!(
                results.iter().all(|(_, _, verified)| *verified),
                "verification failed for size={} n={}",
                size,
                n
            );
            assert_globally_sorted(&outputs);
            assert_same_multiset(&inputs, &outputs);
        }
    }
}

#[test]
fn test_four_rank_example() {
    let inputs = vec![vec![5, 2], vec![8, 1], vec![7, 3], vec![6, 4]];
    let results = sort_blocks(inputs.clone());
    let outputs: Vec<Vec<i32>> = results.iter().map(|(_, out, _)| out.clone()).collect();

    assert!(results.iter().all(|(_, _, verified)| *verified));
    assert_globally_sorted(&outputs);
    assert_same_multiset(&inputs, &outputs);

    let concatenated: Vec<i32> = outputs.iter().flatten().copied().collect();
    assert_eq!(concatenated, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_all_duplicate_keys() {
    // With every key equal the pivots are all equal too and the whole array
    // is routed to the lowest bucket; order and multiset still hold.
    let inputs = vec![vec![3, 3, 3, 3], vec![3, 3, 3, 3]];
    let results = sort_blocks(inputs.clone());
    let outputs: Vec<Vec<i32>> = results.iter().map(|(_, out, _)| out.clone()).collect();

    assert!(results.iter().all(|(_, _, verified)| *verified));
    assert_globally_sorted(&outputs);
    assert_same_multiset(&inputs, &outputs);
}

#[test]
fn test_empty_rank_participates() {
    let inputs = vec![vec![], vec![4, 2, 7, 1], vec![6, 5, 3]];
    let results = sort_blocks(inputs.clone());
    let outputs: Vec<Vec<i32>> = results.iter().map(|(_, out, _)| out.clone()).collect();

    assert!(results.iter().all(|(_, _, verified)| *verified));
    assert_globally_sorted(&outputs);
    assert_same_multiset(&inputs, &outputs);

    let concatenated: Vec<i32> = outputs.iter().flatten().copied().collect();
    assert_eq!(concatenated, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let inputs: Vec<Vec<i32>> = (0..4).map(|rank| generate_random_keys(257, rank)).collect();

    let first: Vec<Vec<i32>> = sort_blocks(inputs.clone())
        .into_iter()
        .map(|(_, out, _)| out)
        .collect();
    let second: Vec<Vec<i32>> = sort_blocks(inputs)
        .into_iter()
        .map(|(_, out, _)| out)
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_sorting_sorted_input_preserves_order() {
    let inputs: Vec<Vec<i32>> = (0..8).map(|rank| generate_uniform_keys(100, rank)).collect();
    let results = sort_blocks(inputs.clone());
    let outputs: Vec<Vec<i32>> = results.iter().map(|(_, out, _)| out.clone()).collect();

    assert!(results.iter().all(|(_, _, verified)| *verified));

    // The global sequence is untouched even if the bucket boundaries shift
    // keys between neighbouring ranks.
    let concatenated: Vec<i32> = outputs.iter().flatten().copied().collect();
    let expected: Vec<i32> = inputs.iter().flatten().copied().collect();
    assert_eq!(concatenated, expected);
}
