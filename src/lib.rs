//! # Stable Price Map
//!
//! Address-stable containers for order book price levels.
//!
//! ## Architecture
//!
//! The crate consists of:
//! - **Sequence**: [`StableVec`], a chunked vector whose elements never move
//!   while it grows
//! - **PriceMap**: [`PriceMap`], an `f64` price to value map stored in a
//!   `StableVec`, with two indexing strategies:
//!   - [`SparsePriceMap`]: hash lookup, any price, erased slots reused
//!   - [`DensePriceMap`]: tick-ladder arithmetic over a bounded price band
//! - **Error**: [`Error`], the single error type for every fallible call
//!
//! ## Design Principles
//!
//! 1. **Stable References**: a value's address holds for as long as it is
//!    live, no matter how many entries are added after it
//! 2. **No Physical Removal**: erasing only marks a slot as not live, the
//!    storage stays for reuse
//! 3. **Atomic Mutation**: a failing call leaves the container untouched
//! 4. **Single-threaded**: no internal locking; mutation requires `&mut`
//!
//! ## Example
//!
//! ```
//! use stable_price_map::{DensePriceMap, LadderConfig, SparsePriceMap};
//!
//! let mut asks: SparsePriceMap<u64> = SparsePriceMap::new();
//! let first = asks.insert(101.25, 300).unwrap().0 as *const u64;
//! for i in 0..10_000 {
//!     asks.insert(200.0 + i as f64, i).unwrap();
//! }
//! assert_eq!(asks.get(101.25).unwrap() as *const u64, first);
//!
//! let mut ladder: DensePriceMap<u64> =
//!     DensePriceMap::new(LadderConfig::symmetric(100.0, 10.0, 0.01)).unwrap();
//! assert_eq!(ladder.total_levels(), 2001);
//! *ladder.get_or_default(99.99).unwrap() += 5;
//! assert_eq!(ladder.at(99.99), Ok(&5));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error taxonomy
pub mod error;

/// Chunked growth-stable sequence
pub mod sequence;

/// Price-keyed map and its indexing strategies
pub mod price_map;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{Error, OutOfRange, Result};
pub use price_map::{
    DenseIndex, DensePriceMap, LadderConfig, PriceMap, Probe, Slot, SlotIndex, SparseIndex,
    SparsePriceMap,
};
pub use sequence::{StableVec, DEFAULT_CHUNK_SIZE};
