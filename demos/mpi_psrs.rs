//! Testing the regular-sampling sort under a real MPI launcher.
use distsort::generate::generate_random_keys;
use distsort::psrs::sort_psrs;
use distsort::timing::Timing;
use distsort::transport::MpiTransport;
use distsort::verify::verify_sorted;
use mpi::traits::Communicator;

pub fn main() {
    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let comm = MpiTransport::new(&world);
    let n_per_rank = 1000;

    let mut keys = generate_random_keys(n_per_rank, world.rank() as usize);

    let mut timing = Timing::default();
    sort_psrs(&mut keys, &comm, &mut timing);

    assert!(verify_sorted(&keys, &comm));

    if world.rank() == 0 {
        println!("Array is sorted.");
    }
}
