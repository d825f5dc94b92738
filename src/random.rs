use rand::rngs::{OsRng, SmallRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// How much trust can be placed in the coefficients a source produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntropyStrength {
    /// Operating-system CSPRNG.
    Cryptographic,
    /// Reproducible stand-in; fine for tests and benchmarks, never for real secrets.
    Deterministic,
    /// The OS source failed and a non-cryptographic generator took over.
    Fallback,
}

/// Supplies the random polynomial coefficients.
///
/// Implementations return integers uniformly distributed over `[0, bound)`.
pub trait CoefficientSource {
    fn sample_below(&mut self, bound: u32) -> u32;

    fn strength(&self) -> EntropyStrength;
}

impl<S: CoefficientSource + ?Sized> CoefficientSource for &mut S {
    fn sample_below(&mut self, bound: u32) -> u32 {
        (**self).sample_below(bound)
    }

    fn strength(&self) -> EntropyStrength {
        (**self).strength()
    }
}

/// The production source: OS entropy, degrading to a weak generator if the
/// operating system stops answering.
///
/// The degradation is permanent for the lifetime of the source and is reported
/// through [`CoefficientSource::strength`]; it is never hidden.
pub struct SystemSource {
    os_fill: fn(&mut [u8]) -> Result<(), rand::Error>,
    fallback: Option<SmallRng>,
}

fn os_fill(buf: &mut [u8]) -> Result<(), rand::Error> {
    OsRng.try_fill_bytes(buf)
}

impl fmt::Debug for SystemSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SystemSource")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        SystemSource::new()
    }
}

impl SystemSource {
    pub fn new() -> Self {
        SystemSource {
            os_fill,
            fallback: None,
        }
    }

    /// A source that has already given up on the OS generator.
    pub fn degraded(seed: u64) -> Self {
        SystemSource {
            os_fill,
            fallback: Some(SmallRng::seed_from_u64(seed)),
        }
    }

    #[cfg(test)]
    fn with_os_fill(os_fill: fn(&mut [u8]) -> Result<(), rand::Error>) -> Self {
        SystemSource {
            os_fill,
            fallback: None,
        }
    }

    fn degrade(&mut self, err: rand::Error) -> &mut SmallRng {
        warn!(
            "⚠️ OS random source failed ({}), falling back to a non-cryptographic generator",
            err
        );
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        self.fallback.insert(SmallRng::seed_from_u64(seed))
    }
}

impl CoefficientSource for SystemSource {
    fn sample_below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        if let Some(rng) = self.fallback.as_mut() {
            return rng.gen_range(0..bound);
        }

        // Rejection-sample so every value below `bound` is equally likely.
        let limit = u32::MAX - u32::MAX % bound;
        loop {
            let mut buf = [0u8; 4];
            if let Err(err) = (self.os_fill)(&mut buf) {
                return self.degrade(err).gen_range(0..bound);
            }
            let value = u32::from_le_bytes(buf);
            if value < limit {
                return value % bound;
            }
        }
    }

    fn strength(&self) -> EntropyStrength {
        if self.fallback.is_some() {
            EntropyStrength::Fallback
        } else {
            EntropyStrength::Cryptographic
        }
    }
}

/// Deterministic source seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        debug!("Using seeded coefficient source: {}", seed);
        SeededSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl CoefficientSource for SeededSource {
    fn sample_below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }

    fn strength(&self) -> EntropyStrength {
        EntropyStrength::Deterministic
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Each value is reduced below the requested bound, so a `FixedSequence` can
/// pin every coefficient of a polynomial exactly.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<u32>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<u32>) -> Self {
        FixedSequence { values, cursor: 0 }
    }

    /// How many values have been handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl CoefficientSource for FixedSequence {
    fn sample_below(&mut self, bound: u32) -> u32 {
        if self.values.is_empty() || bound == 0 {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value % bound
    }

    fn strength(&self) -> EntropyStrength {
        EntropyStrength::Deterministic
    }
}
