use clap::Parser;
use linear_hash::HashMap;
use linear_hash::MAX_LOAD_FACTOR;
use linear_hash::hasher::FoldHash;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 16)]
    initial_capacity: usize,

    #[arg(short = 'n', long = "entries", default_value_t = 100_000)]
    entries: u64,

    /// Remove every other key after filling.
    #[arg(long)]
    remove_half: bool,
}

fn main() {
    let args = Args::parse();

    let mut map: HashMap<u64, u64, FoldHash> =
        match HashMap::try_with_capacity_and_hasher(args.initial_capacity, FoldHash) {
            Ok(map) => map,
            Err(err) => {
                eprintln!("failed to create map: {err}");
                std::process::exit(1);
            }
        };

    println!(
        "Created map: {} logical buckets, {} physical, max load factor {}",
        map.phase().logical_buckets(),
        map.capacity(),
        MAX_LOAD_FACTOR
    );

    let mut doublings = 0;
    let mut last_capacity = map.capacity();
    for key in 0..args.entries {
        if let Err(err) = map.try_insert(key, key * 2) {
            eprintln!("insert of {key} failed: {err}");
            std::process::exit(1);
        }
        if map.capacity() != last_capacity {
            doublings += 1;
            last_capacity = map.capacity();
        }
    }

    println!(
        "Inserted {} entries, bucket array doubled {} times",
        map.len(),
        doublings
    );

    if args.remove_half {
        for key in (0..args.entries).step_by(2) {
            map.remove(&key);
        }
        println!("Removed every other key, {} entries remain", map.len());
    }

    map.table().print_chain_histogram();
    map.table().debug_stats().print();
}
