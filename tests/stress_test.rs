//! Stress tests for the stable containers.
//!
//! These tests verify:
//! 1. Random insert / erase / lookup workloads agree with `std::collections::HashMap`
//! 2. Values never move while they stay live
//! 3. Sparse storage stays bounded by the peak number of live keys
//! 4. Results are identical across runs with the same seed
//!
//! ## Running Stress Tests
//!
//! ```bash
//! # Run all stress tests (release mode recommended)
//! cargo test --release --test stress_test -- --nocapture
//!
//! # Run specific test
//! cargo test --release --test stress_test stress_sparse_against_hashmap -- --nocapture
//! ```

use std::collections::HashMap;
use std::time::Instant;

use stable_price_map::{
    DensePriceMap, LadderConfig, PriceMap, SlotIndex, SparsePriceMap, StableVec,
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Operations per randomized workload
const OPERATION_COUNT: usize = 200_000;

/// Distinct levels a workload draws from (100.00 +/-10% at 0.01)
const LADDER_LEVELS: u64 = 2001;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// One step of a generated workload
#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(u64, u64),
    Remove(u64),
    Lookup(u64),
    Clear,
}

/// Generate a deterministic workload over ladder levels.
///
/// Uses a seeded RNG for reproducibility. Same seed = same operations.
fn generate_operations(count: usize, seed: u64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let level = rng.gen_range(0..LADDER_LEVELS);
            match rng.gen_range(0..100u32) {
                0..=49 => Op::Insert(level, i as u64),
                50..=79 => Op::Remove(level),
                80..=99 if i % 50_000 == 49_999 => Op::Clear,
                _ => Op::Lookup(level),
            }
        })
        .collect()
}

fn level_price(level: u64) -> f64 {
    90.0 + level as f64 * 0.01
}

fn ladder() -> LadderConfig {
    LadderConfig::symmetric(100.0, 10.0, 0.01)
}

/// Replay `ops` on `map` and on a `HashMap` oracle, checking every step.
///
/// Returns a checksum of all lookups so runs can be compared.
fn replay<I: SlotIndex<u64>>(map: &mut PriceMap<u64, I>, ops: &[Op]) -> u64 {
    let mut oracle: HashMap<u64, u64> = HashMap::new();
    let mut checksum = 0u64;

    for op in ops {
        match *op {
            Op::Insert(level, value) => {
                let existed = oracle.contains_key(&level);
                let expected = *oracle.entry(level).or_insert(value);
                let (stored, created) = map.insert(level_price(level), value).unwrap();
                assert_eq!(created, !existed);
                assert_eq!(*stored, expected);
            }
            Op::Remove(level) => {
                let removed = map.remove(level_price(level));
                let expected = usize::from(oracle.remove(&level).is_some());
                assert_eq!(removed, expected);
            }
            Op::Lookup(level) => {
                let found = map.get(level_price(level)).copied();
                assert_eq!(found, oracle.get(&level).copied());
                checksum = checksum.wrapping_mul(31).wrapping_add(found.unwrap_or(0));
            }
            Op::Clear => {
                map.clear();
                oracle.clear();
            }
        }
        assert_eq!(map.len(), oracle.len());
    }

    // Final contents agree both ways
    assert_eq!(map.iter().count(), oracle.len());
    for (level, value) in &oracle {
        assert_eq!(map.get(level_price(*level)), Some(value));
    }
    checksum
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Random workload on the sparse strategy, checked against `HashMap`.
#[test]
fn stress_sparse_against_hashmap() {
    println!("\n=== STRESS TEST: Sparse vs HashMap ===\n");

    let ops = generate_operations(OPERATION_COUNT, 42);
    let mut map: SparsePriceMap<u64> = SparsePriceMap::new();

    let start = Instant::now();
    let checksum = replay(&mut map, &ops);
    let elapsed = start.elapsed();

    println!("  Operations:        {:>12}", OPERATION_COUNT);
    println!("  Live entries:      {:>12}", map.len());
    println!("  Stored slots:      {:>12}", map.slot_count());
    println!("  Free slots:        {:>12}", map.free_slot_count());
    println!("  Checksum:          {:>12}", checksum);
    println!("  Elapsed time:      {:>12.2?}", elapsed);

    // Every stored slot is either live or waiting for reuse
    assert_eq!(map.len() + map.free_slot_count(), map.slot_count());
    assert!(map.slot_count() <= LADDER_LEVELS as usize);

    println!("\n=== SPARSE STRESS PASSED ===\n");
}

/// Same workload on the dense strategy.
#[test]
fn stress_dense_against_hashmap() {
    println!("\n=== STRESS TEST: Dense vs HashMap ===\n");

    let ops = generate_operations(OPERATION_COUNT, 42);
    let mut map: DensePriceMap<u64> = DensePriceMap::new(ladder()).unwrap();

    let start = Instant::now();
    let checksum = replay(&mut map, &ops);
    let elapsed = start.elapsed();

    println!("  Operations:        {:>12}", OPERATION_COUNT);
    println!("  Live entries:      {:>12}", map.len());
    println!("  Stored slots:      {:>12}", map.slot_count());
    println!("  Checksum:          {:>12}", checksum);
    println!("  Elapsed time:      {:>12.2?}", elapsed);

    assert!(map.slot_count() <= map.total_levels());

    println!("\n=== DENSE STRESS PASSED ===\n");
}

/// Both strategies observe exactly the same lookups for the same workload,
/// and the same seed reproduces the same result.
#[test]
fn verify_determinism() {
    println!("\n=== DETERMINISM TEST ===\n");

    const TEST_COUNT: usize = 20_000;
    const SEED: u64 = 12345;

    let ops = generate_operations(TEST_COUNT, SEED);

    let sparse1 = replay(&mut SparsePriceMap::new(), &ops);
    let sparse2 = replay(&mut SparsePriceMap::new(), &ops);
    let dense = replay(&mut DensePriceMap::new(ladder()).unwrap(), &ops);

    println!("  Sparse run 1:      {}", sparse1);
    println!("  Sparse run 2:      {}", sparse2);
    println!("  Dense run:         {}", dense);

    assert_eq!(sparse1, sparse2, "same seed must give the same checksum");
    assert_eq!(sparse1, dense, "strategies must agree");

    println!("\n=== DETERMINISM VERIFIED ===\n");
}

/// Live values keep their address through heavy churn on other keys.
#[test]
fn stress_reference_stability() {
    println!("\n=== REFERENCE STABILITY TEST ===\n");

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut map: SparsePriceMap<u64> = SparsePriceMap::new();

    // Pinned keys are never erased
    let pinned: Vec<f64> = (0..64).map(|i| -1.0 - i as f64).collect();
    let mut addresses = Vec::with_capacity(pinned.len());
    for (i, &price) in pinned.iter().enumerate() {
        let (value, _) = map.insert(price, i as u64).unwrap();
        addresses.push(value as *const u64);
    }

    let mut churned = Vec::new();
    for i in 0..OPERATION_COUNT {
        if !churned.is_empty() && rng.gen_bool(0.4) {
            let idx = rng.gen_range(0..churned.len());
            let price: f64 = churned.swap_remove(idx);
            assert_eq!(map.remove(price), 1);
        } else {
            let price = rng.gen_range(1.0..1_000_000.0f64);
            if map.insert(price, i as u64).unwrap().1 {
                churned.push(price);
            }
        }
    }

    for (i, &price) in pinned.iter().enumerate() {
        let value = map.get(price).unwrap();
        assert_eq!(*value, i as u64);
        assert_eq!(value as *const u64, addresses[i]);
    }

    println!("  Churn operations:  {:>12}", OPERATION_COUNT);
    println!("  Live entries:      {:>12}", map.len());
    println!("  Stored slots:      {:>12}", map.slot_count());
    println!("\n=== REFERENCE STABILITY PASSED ===\n");
}

/// Sparse storage tracks the peak live count, not the total inserted.
#[test]
fn stress_memory_stability() {
    println!("\n=== MEMORY STABILITY TEST ===\n");

    const ITERATIONS: usize = 100_000;
    const WINDOW: usize = 1_000;

    let mut map: SparsePriceMap<u64> = SparsePriceMap::with_capacity(WINDOW);
    let mut max_slots = 0;

    // Sliding window of live prices: insert one, erase the oldest
    for i in 0..ITERATIONS {
        map.insert(i as f64 * 0.5, i as u64).unwrap();
        if i >= WINDOW {
            assert_eq!(map.remove((i - WINDOW) as f64 * 0.5), 1);
        }
        max_slots = max_slots.max(map.slot_count());
    }

    println!("  Iterations:        {:>12}", ITERATIONS);
    println!("  Max slots:         {:>12}", max_slots);
    println!("  Live entries:      {:>12}", map.len());

    assert_eq!(map.len(), WINDOW);
    assert!(max_slots <= WINDOW + 1, "storage grew to {max_slots}");

    println!("\n=== MEMORY STABILITY PASSED ===\n");
}

/// Million-element append with periodic address checks.
#[test]
fn stress_stable_vec_growth() {
    println!("\n=== STABLE VEC GROWTH TEST ===\n");

    const COUNT: usize = 1_000_000;

    let mut seq: StableVec<u64> = StableVec::new();
    let mut probes = Vec::new();

    let start = Instant::now();
    for i in 0..COUNT {
        let value = seq.push(i as u64);
        if i % 10_007 == 0 {
            probes.push((i, value as *const u64));
        }
    }
    let elapsed = start.elapsed();

    for &(i, addr) in &probes {
        assert_eq!(&seq[i] as *const u64, addr);
        assert_eq!(seq[i], i as u64);
    }
    assert_eq!(seq.len(), COUNT);
    assert_eq!(seq.iter().sum::<u64>(), (COUNT as u64) * (COUNT as u64 - 1) / 2);

    println!("  Elements:          {:>12}", COUNT);
    println!("  Chunks:            {:>12}", seq.chunk_count());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("\n=== STABLE VEC GROWTH PASSED ===\n");
}
