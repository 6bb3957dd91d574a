//! Stable Price Map - demo binary
//!
//! Walks through a small price book on both strategies. Set `RUST_LOG=debug`
//! (or `trace`) to see the container's own diagnostics.
//!
//! ```bash
//! RUST_LOG=debug cargo run --features demo
//! ```

use stable_price_map::{DensePriceMap, LadderConfig, Result, SparsePriceMap, StableVec};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Aggregated resting size at one price
#[derive(Debug, Default, Clone)]
struct Level {
    orders: u32,
    quantity: u64,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("===========================================");
    println!("  Stable Price Map");
    println!("===========================================");
    println!();

    sparse_book()?;
    reference_stability();
    dense_ladder()?;

    Ok(())
}

fn add_order(level: &mut Level, quantity: u64) {
    level.orders += 1;
    level.quantity += quantity;
}

fn sparse_book() -> Result<()> {
    println!("Sparse book (any price)...");
    let mut bids: SparsePriceMap<Level> = SparsePriceMap::new();

    for (price, quantity) in [(99.5, 100), (99.75, 250), (99.5, 40), (98.0, 10)] {
        add_order(bids.get_or_default(price)?, quantity);
    }
    for (price, level) in &bids {
        println!("  {price:>8.2}  orders={} qty={}", level.orders, level.quantity);
    }

    bids.remove(98.0);
    println!(
        "  after cancel at 98.00: {} levels, {} free slot(s)",
        bids.len(),
        bids.free_slot_count()
    );

    bids.insert(97.25, Level::default())?;
    println!(
        "  97.25 reused slot {:?}, storage still {} slots",
        bids.find(97.25),
        bids.slot_count()
    );
    println!();
    Ok(())
}

fn reference_stability() {
    println!("Reference stability...");
    let mut seq: StableVec<u64, 64> = StableVec::new();
    let first = seq.push(7) as *const u64;

    for i in 0..100_000 {
        seq.push(i);
    }

    let still = &seq[0] as *const u64;
    println!(
        "  {} elements in {} chunks, first element moved: {}",
        seq.len(),
        seq.chunk_count(),
        first != still
    );
    println!();
}

fn dense_ladder() -> Result<()> {
    println!("Dense ladder (100.00 +/-10%, tick 0.01)...");
    let mut asks: DensePriceMap<Level> =
        DensePriceMap::new(LadderConfig::symmetric(100.0, 10.0, 0.01))?;
    info!(levels = asks.total_levels(), "ladder ready");

    println!(
        "  range {:.2} ..= {:.2}, {} levels",
        asks.min_price(),
        asks.max_price(),
        asks.total_levels()
    );

    add_order(asks.get_or_default(100.50)?, 500);
    add_order(asks.get_or_default(100.51)?, 20);
    println!(
        "  level of 100.50 = {}, live {} of {} stored slots",
        asks.level_of(100.50)?,
        asks.len(),
        asks.slot_count()
    );

    match asks.insert(100.503, Level::default()) {
        Ok(_) => println!("  100.503 accepted"),
        Err(err) => println!("  100.503 rejected: {err}"),
    }
    println!("  contains(50.0) = {}", asks.contains(50.0));
    Ok(())
}
