use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use robin_hash::RobinHoodTable;
use robin_hash::hash_table::Entry;
use siphasher::sip::SipHasher;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Index type used to store displacements: u8, u16, u32 or usize.
    #[arg(short = 'i', long = "index", default_value = "usize")]
    index: String,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = SipHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn fill<I: robin_hash::BucketIndex>(target_capacity: usize) {
    let mut table: RobinHoodTable<u64, I> = RobinHoodTable::new();
    if let Err(err) = table.try_reserve(target_capacity) {
        println!("Could not reserve {target_capacity} values: {err}");
        println!("Filling until the index type's bucket limit is reached");
    }

    println!("Actual capacity: {} buckets", table.capacity());
    println!("Grows after {} values", table.max_load());

    let mut num_fallible_failures = 0;
    for i in 0..target_capacity {
        if table.capacity() == I::MAX_CAPACITY && table.len() == table.capacity() {
            break;
        }

        let value = i as u64;
        let hash = hash_u64(value);

        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                if entry.try_insert(value).is_err() {
                    num_fallible_failures += 1;
                }
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }
    }

    println!("Inserted {} values into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity().max(1) as f64) * 100.0
    );

    table.print_probe_histogram();
    table.debug_stats().print();

    let inserted = table.len() as u64;
    let removed = (0..inserted)
        .step_by(3)
        .filter(|&value| table.remove(hash_u64(value), |&v| v == value).is_some())
        .count();
    println!("Removed every third value ({} values)", removed);
    table.print_probe_histogram();
    table.debug_stats().print();

    println!(
        "Number of failed try_insert attempts: {} ({:.02}%)",
        num_fallible_failures,
        num_fallible_failures as f64 / target_capacity.max(1) as f64 * 100.0
    );
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating RobinHoodTable<u64, {}> with target capacity: {}",
        args.index, args.target_capacity
    );

    match args.index.as_str() {
        "u8" => fill::<u8>(args.target_capacity),
        "u16" => fill::<u16>(args.target_capacity),
        "u32" => fill::<u32>(args.target_capacity),
        "usize" => fill::<usize>(args.target_capacity),
        other => {
            eprintln!("unsupported index type: {other}");
            std::process::exit(2);
        }
    }
}
