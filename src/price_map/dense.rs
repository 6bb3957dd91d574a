//! Tick-ladder strategy for bounded, discrete prices.
//!
//! ## Design
//!
//! A [`LadderConfig`] fixes an opening price, percentage limits in both
//! directions and a tick size. Every valid price is a rung on that ladder and
//! its slot index is computed, never hashed:
//!
//! ```text
//! min_price = opening * (1 - down_limit_pct / 100)
//! max_price = opening * (1 + up_limit_pct / 100)
//! level     = round((price - min_price) / tick_size)
//! ```
//!
//! Slot `i` always belongs to level `i`. Storage grows lazily up to the
//! highest level touched; the levels skipped on the way are filled with
//! `T::default()` placeholders that are not live. [`PriceMap::preallocate`]
//! fills the whole ladder up front instead.
//!
//! ## Example
//!
//! | opening | limits | tick | range | levels |
//! |---------|--------|------|-------|--------|
//! | 100.0 | 10% / 10% | 0.01 | 90.00 ..= 110.00 | 2,001 |
//! | 100.0 | 50% / 50% | 0.01 | 50.00 ..= 150.00 | 10,001 |

use bit_vec::BitVec;
use tracing::{debug, warn};

use super::{PriceMap, Probe, Slot, SlotIndex};
use crate::error::{Error, OutOfRange, Result};
use crate::sequence::StableVec;

/// Tolerance, in units of one tick, for treating a price as on the grid.
pub const TICK_EPSILON: f64 = 1e-9;

/// Upper bound on ladder size; the occupancy bitmap is allocated up front
const MAX_LEVELS: usize = 1 << 28;

/// Price ladder parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderConfig {
    /// Reference price the limits are taken from
    pub opening_price: f64,

    /// Upper limit as a percentage of the opening price
    pub up_limit_pct: f64,

    /// Lower limit as a percentage of the opening price
    pub down_limit_pct: f64,

    /// Distance between adjacent levels
    pub tick_size: f64,
}

impl LadderConfig {
    pub const fn new(
        opening_price: f64,
        up_limit_pct: f64,
        down_limit_pct: f64,
        tick_size: f64,
    ) -> Self {
        Self {
            opening_price,
            up_limit_pct,
            down_limit_pct,
            tick_size,
        }
    }

    /// Same limit in both directions
    pub const fn symmetric(opening_price: f64, limit_pct: f64, tick_size: f64) -> Self {
        Self::new(opening_price, limit_pct, limit_pct, tick_size)
    }

    pub fn with_opening_price(mut self, opening_price: f64) -> Self {
        self.opening_price = opening_price;
        self
    }

    pub fn with_up_limit_pct(mut self, up_limit_pct: f64) -> Self {
        self.up_limit_pct = up_limit_pct;
        self
    }

    pub fn with_down_limit_pct(mut self, down_limit_pct: f64) -> Self {
        self.down_limit_pct = down_limit_pct;
        self
    }

    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Check the parameters describe a non-empty ladder of positive prices.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        let reason = if !self.tick_size.is_finite() || self.tick_size <= 0.0 {
            "tick size must be positive and finite"
        } else if !self.opening_price.is_finite() || self.opening_price <= 0.0 {
            "opening price must be positive and finite"
        } else if !self.up_limit_pct.is_finite() || self.up_limit_pct < 0.0 {
            "up limit must be non-negative and finite"
        } else if !self.down_limit_pct.is_finite() || self.down_limit_pct < 0.0 {
            "down limit must be non-negative and finite"
        } else if self.down_limit_pct > 100.0 {
            "down limit cannot exceed 100%"
        } else {
            return Ok(());
        };
        Err(Error::InvalidConfiguration { reason })
    }

    /// Lowest price on the ladder
    #[inline]
    pub fn min_price(&self) -> f64 {
        self.opening_price * (1.0 - self.down_limit_pct / 100.0)
    }

    /// Highest price on the ladder
    #[inline]
    pub fn max_price(&self) -> f64 {
        self.opening_price * (1.0 + self.up_limit_pct / 100.0)
    }
}

impl Default for LadderConfig {
    /// 100.0 opening, 10% limits, 0.01 tick
    fn default() -> Self {
        Self::symmetric(100.0, 10.0, 0.01)
    }
}

/// Strategy state for [`DensePriceMap`](super::DensePriceMap).
#[derive(Debug, Clone)]
pub struct DenseIndex {
    config: LadderConfig,
    min_price: f64,
    max_price: f64,

    /// `(max_price - min_price) / tick_size`, unrounded
    max_offset: f64,

    total_levels: usize,

    /// One bit per level, set while the level holds a live entry
    occupied: BitVec,

    live: usize,
}

impl DenseIndex {
    /// Validate `config` and derive the ladder geometry.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the parameters are unusable or the ladder
    /// would be unreasonably large.
    pub fn new(config: LadderConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            warn!(?config, %err, "rejected ladder configuration");
            return Err(err);
        }

        let min_price = config.min_price();
        let max_price = config.max_price();
        let max_offset = (max_price - min_price) / config.tick_size;

        // A span a hair past a whole number of ticks is that whole number
        let rounded = max_offset.round();
        let steps = if (max_offset - rounded).abs() <= TICK_EPSILON {
            rounded
        } else {
            max_offset.ceil()
        };

        if !steps.is_finite() || steps >= MAX_LEVELS as f64 {
            let err = Error::InvalidConfiguration {
                reason: "ladder has too many levels",
            };
            warn!(?config, %err, "rejected ladder configuration");
            return Err(err);
        }
        let total_levels = steps as usize + 1;

        debug!(min_price, max_price, total_levels, "tick ladder built");

        Ok(Self {
            config,
            min_price,
            max_price,
            max_offset,
            total_levels,
            occupied: BitVec::from_elem(total_levels, false),
            live: 0,
        })
    }

    // ========================================================================
    // Ladder Geometry
    // ========================================================================

    #[inline]
    pub fn config(&self) -> &LadderConfig {
        &self.config
    }

    #[inline]
    pub fn min_price(&self) -> f64 {
        self.min_price
    }

    #[inline]
    pub fn max_price(&self) -> f64 {
        self.max_price
    }

    #[inline]
    pub fn tick_size(&self) -> f64 {
        self.config.tick_size
    }

    /// Number of addressable levels
    #[inline]
    pub fn total_levels(&self) -> usize {
        self.total_levels
    }

    /// Level index of `price`.
    ///
    /// Both bounds accept prices up to [`TICK_EPSILON`] ticks beyond
    /// `min_price` / `max_price`, mapping them to the first and last level.
    /// This absorbs the rounding in `opening_price * (1 -/+ limit)`.
    ///
    /// # Errors
    ///
    /// * `BelowMin` / `AboveMax` - outside the ladder by more than
    ///   `TICK_EPSILON` ticks
    /// * `OffTick` - between two rungs, or NaN
    pub fn level_of(&self, price: f64) -> Result<usize> {
        let tick = self.config.tick_size;
        if price.is_nan() {
            return Err(OutOfRange::OffTick { price, tick }.into());
        }

        let offset = (price - self.min_price) / tick;
        if offset < -TICK_EPSILON {
            return Err(OutOfRange::BelowMin {
                price,
                min: self.min_price,
            }
            .into());
        }
        if offset > self.max_offset + TICK_EPSILON {
            return Err(OutOfRange::AboveMax {
                price,
                max: self.max_price,
            }
            .into());
        }

        let rounded = offset.round();
        if (offset - rounded).abs() > TICK_EPSILON {
            return Err(OutOfRange::OffTick { price, tick }.into());
        }

        // Negative zero saturates to 0
        Ok((rounded as usize).min(self.total_levels - 1))
    }

    /// Grid price of `level`
    #[inline]
    pub fn price_of(&self, level: usize) -> Option<f64> {
        (level < self.total_levels).then(|| self.grid_price(level))
    }

    #[inline]
    fn grid_price(&self, level: usize) -> f64 {
        self.min_price + level as f64 * self.config.tick_size
    }
}

impl<T: Default> SlotIndex<T> for DenseIndex {
    fn probe(&self, price: f64, _slot_count: usize) -> Result<Probe> {
        let level = self.level_of(price)?;
        if self.occupied[level] {
            Ok(Probe::Occupied(level))
        } else {
            Ok(Probe::Vacant(level))
        }
    }

    fn backfill(&mut self, slot: usize, slots: &mut StableVec<Slot<T>>) {
        while slots.len() < slot {
            let price = self.grid_price(slots.len());
            slots.push(Slot {
                price,
                value: T::default(),
            });
        }
    }

    fn commit(&mut self, _price: f64, slot: usize) {
        self.occupied.set(slot, true);
        self.live += 1;
    }

    #[inline]
    fn locate(&self, price: f64) -> Option<usize> {
        let level = self.level_of(price).ok()?;
        self.occupied[level].then_some(level)
    }

    fn release(&mut self, slot: usize, _price: f64) {
        if self.occupied.get(slot) == Some(true) {
            self.occupied.set(slot, false);
            self.live -= 1;
        }
    }

    #[inline]
    fn is_live(&self, slot: usize) -> bool {
        self.occupied.get(slot).unwrap_or(false)
    }

    #[inline]
    fn live_count(&self) -> usize {
        self.live
    }

    fn clear(&mut self, _slot_count: usize) {
        self.occupied.clear();
        self.live = 0;
    }
}

impl<T: Default> PriceMap<T, DenseIndex> {
    /// Empty map over the ladder described by `config`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration`, see [`LadderConfig::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use stable_price_map::{DensePriceMap, LadderConfig};
    ///
    /// let map: DensePriceMap<u64> = DensePriceMap::new(LadderConfig::symmetric(100.0, 10.0, 0.01))?;
    /// assert_eq!(map.total_levels(), 2001);
    /// assert!(DensePriceMap::<u64>::new(LadderConfig::symmetric(100.0, 10.0, 0.0)).is_err());
    /// # Ok::<(), stable_price_map::Error>(())
    /// ```
    pub fn new(config: LadderConfig) -> Result<Self> {
        Ok(Self::with_index(DenseIndex::new(config)?))
    }

    /// Materialise every level now so later inserts never allocate.
    pub fn preallocate(&mut self) {
        let levels = self.index.total_levels;
        self.slots.reserve(levels);
        SlotIndex::<T>::backfill(&mut self.index, levels, &mut self.slots);
        debug!(levels, capacity = self.slots.capacity(), "ladder preallocated");
    }
}

impl<T> PriceMap<T, DenseIndex> {
    #[inline]
    pub fn config(&self) -> &LadderConfig {
        self.index.config()
    }

    #[inline]
    pub fn opening_price(&self) -> f64 {
        self.index.config.opening_price
    }

    #[inline]
    pub fn min_price(&self) -> f64 {
        self.index.min_price()
    }

    #[inline]
    pub fn max_price(&self) -> f64 {
        self.index.max_price()
    }

    #[inline]
    pub fn tick_size(&self) -> f64 {
        self.index.tick_size()
    }

    /// Number of addressable levels, the dense map's capacity in keys
    #[inline]
    pub fn total_levels(&self) -> usize {
        self.index.total_levels()
    }

    /// See [`DenseIndex::level_of`]
    #[inline]
    pub fn level_of(&self, price: f64) -> Result<usize> {
        self.index.level_of(price)
    }

    #[inline]
    pub fn price_of(&self, level: usize) -> Option<f64> {
        self.index.price_of(level)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
