//! Error taxonomy for the sequence and price map containers.
//!
//! Only conditions the caller cannot express through a return value are
//! errors. A duplicate insert, a missing erase or a missing lookup are
//! ordinary outcomes (`bool`, `0`, `None`) and never show up here.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`StableVec`](crate::StableVec) and
/// [`PriceMap`](crate::PriceMap).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A position or price fell outside the addressable range.
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),

    /// `at()` on a price with no live entry.
    #[error("no live entry for price {price}")]
    KeyNotFound {
        /// The requested price
        price: f64,
    },

    /// A dense ladder was configured with unusable parameters.
    #[error("invalid ladder configuration: {reason}")]
    InvalidConfiguration {
        /// Which parameter was rejected
        reason: &'static str,
    },
}

/// The ways an index or price can be out of range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OutOfRange {
    /// Bounds-checked sequence access past the end.
    #[error("index {index} out of range for sequence of length {len}")]
    Index {
        /// Requested index
        index: usize,
        /// Sequence length at the time of the call
        len: usize,
    },

    /// Price below the ladder's lower limit.
    #[error("price {price} below ladder minimum {min}")]
    BelowMin {
        /// Requested price
        price: f64,
        /// Ladder minimum
        min: f64,
    },

    /// Price above the ladder's upper limit.
    #[error("price {price} above ladder maximum {max}")]
    AboveMax {
        /// Requested price
        price: f64,
        /// Ladder maximum
        max: f64,
    },

    /// Price inside the range but not on the tick grid (NaN lands here too).
    #[error("price {price} is not aligned to tick size {tick}")]
    OffTick {
        /// Requested price
        price: f64,
        /// Ladder tick size
        tick: f64,
    },
}

impl Error {
    /// True for every [`Error::OutOfRange`] variant.
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_converts() {
        let err: Error = OutOfRange::Index { index: 3, len: 2 }.into();
        assert!(err.is_out_of_range());
        assert_eq!(err.to_string(), "index 3 out of range for sequence of length 2");
    }

    #[test]
    fn test_messages() {
        let err = Error::KeyNotFound { price: 100.5 };
        assert_eq!(err.to_string(), "no live entry for price 100.5");
        assert!(!err.is_out_of_range());

        let err = Error::InvalidConfiguration { reason: "tick size must be positive" };
        assert_eq!(
            err.to_string(),
            "invalid ladder configuration: tick size must be positive"
        );
    }
}
