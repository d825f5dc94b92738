use crate::constants::{FIELD_PRIME, SENTINEL_VALUE};
use crate::error::{Result, SplitError};

/// Computes `base^exponent mod modulus` by recursive squaring.
///
/// The result is always in `[0, modulus)` for any `u64` inputs; intermediate
/// products are taken in `u128`. `modulus` must be non-zero; a zero modulus
/// panics on the remainder operation.
///
/// # Examples
///
/// ```rust
/// use shard_split::field::pow_mod;
///
/// assert_eq!(pow_mod(3, 4, 257), 81);
/// assert_eq!(pow_mod(2, 8, 257), 256);
/// ```
pub fn pow_mod(base: u64, exponent: u64, modulus: u64) -> u64 {
    if exponent == 0 {
        1 % modulus
    } else if exponent % 2 == 0 {
        let root = pow_mod(base, exponent / 2, modulus) as u128;
        ((root * root) % modulus as u128) as u64
    } else {
        let rest = pow_mod(base, exponent - 1, modulus) as u128;
        (((base % modulus) as u128 * rest) % modulus as u128) as u64
    }
}

/// A prime field `GF(p)` small enough that every element is either a byte or
/// the sentinel 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    modulus: u32,
}

impl Field {
    /// Creates a field with the given modulus.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidModulus`] unless `2 <= modulus <= 257`.
    pub fn new(modulus: u32) -> Result<Self> {
        if !(2..=SENTINEL_VALUE + 1).contains(&modulus) {
            return Err(SplitError::InvalidModulus(modulus));
        }
        Ok(Field { modulus })
    }

    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    /// Raises `base` to `exponent` inside the field.
    pub fn pow(&self, base: u32, exponent: u32) -> u32 {
        pow_mod(base as u64, exponent as u64, self.modulus as u64) as u32
    }

    /// Maps an integer onto its field element.
    pub fn reduce(&self, value: u64) -> u32 {
        (value % self.modulus as u64) as u32
    }

    pub fn contains(&self, value: u32) -> bool {
        value < self.modulus
    }
}

impl Default for Field {
    fn default() -> Self {
        Field {
            modulus: FIELD_PRIME,
        }
    }
}
