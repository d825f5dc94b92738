use core::fmt;
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

use crate::constants::MAX_SHARES;
use crate::encoding::{push_header, push_token, share_len, ShareSet};
use crate::error::{Result, SplitError};
use crate::field::Field;
use crate::random::{CoefficientSource, SystemSource};

/// Represents a polynomial over the prime field `GF(p)`.
///
/// The constant term is the secret; the remaining coefficients are random. A
/// polynomial lives only for the duration of splitting a single byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<u32>,
    field: Field,
}

impl Polynomial {
    /// Constructs a new polynomial of a given degree with random coefficients,
    /// where the constant term is the provided secret.
    ///
    /// # Arguments
    ///
    /// * `degree` - The degree of the polynomial (threshold - 1).
    /// * `secret` - The secret (constant term) of the polynomial, already a field element.
    /// * `field` - The field the coefficients live in.
    /// * `source` - Where the random coefficients come from.
    pub fn random<S>(degree: usize, secret: u32, field: Field, source: &mut S) -> Self
    where
        S: CoefficientSource + ?Sized,
    {
        let mut coefficients = vec![secret; degree + 1];

        for coeff in coefficients.iter_mut().skip(1) {
            *coeff = source.sample_below(field.modulus());
        }

        Polynomial {
            coefficients,
            field,
        }
    }

    pub fn coefficients(&self) -> &[u32] {
        &self.coefficients
    }

    /// Evaluates the polynomial at a given point.
    ///
    /// Every power term goes through [`Field::pow`] and the sum is reduced after
    /// each addition, so the result is always in `[0, p)`.
    pub fn evaluate(&self, x: u32) -> u32 {
        let p = self.field.modulus() as u64;
        let mut y: u32 = 0;

        for (i, &coeff) in self.coefficients.iter().enumerate() {
            let term = self.field.pow(x, i as u32);
            let product = self.field.reduce(coeff as u64 * term as u64);
            y = self.field.reduce(y as u64 + product as u64);
        }

        self.field.reduce(y as u64 + p)
    }
}

/// How the reconstruction threshold is derived from the number of shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPolicy {
    /// Two thirds, rounded: `(2n + 2) / 3`.
    Standard,
    /// A simple majority: `(n + 1) / 2`.
    Half,
}

impl ThresholdPolicy {
    pub fn threshold(&self, shares: usize) -> usize {
        match self {
            ThresholdPolicy::Standard => t_standard(shares),
            ThresholdPolicy::Half => t_half(shares),
        }
    }
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ThresholdPolicy::Standard => f.write_str("standard"),
            ThresholdPolicy::Half => f.write_str("half"),
        }
    }
}

impl FromStr for ThresholdPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ThresholdPolicy::Standard),
            "half" => Ok(ThresholdPolicy::Half),
            other => Err(format!("unknown threshold policy: {other}")),
        }
    }
}

/// `floor((2n + 2) / 3)`, written so that it cannot overflow.
pub fn t_standard(shares: usize) -> usize {
    2 * (shares / 3) + shares % 3
}

/// `floor((n + 1) / 2)`, written so that it cannot overflow.
pub fn t_half(shares: usize) -> usize {
    shares / 2 + shares % 2
}

/// Validated `(n, t)` pair for one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeParams {
    shares: usize,
    threshold: usize,
}

impl SchemeParams {
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidParameters`] unless `1 <= threshold <= shares <= 255`.
    pub fn new(shares: usize, threshold: usize) -> Result<Self> {
        if shares == 0 || shares > MAX_SHARES || threshold == 0 || threshold > shares {
            return Err(SplitError::InvalidParameters { shares, threshold });
        }
        Ok(SchemeParams { shares, threshold })
    }

    pub fn from_policy(shares: usize, policy: ThresholdPolicy) -> Result<Self> {
        if shares == 0 || shares > MAX_SHARES {
            return Err(SplitError::InvalidParameters {
                shares,
                threshold: 0,
            });
        }
        Self::new(shares, policy.threshold(shares))
    }

    pub fn shares(&self) -> usize {
        self.shares
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// Splits secrets over a fixed field with an injected coefficient source.
///
/// # Examples
///
/// ```rust
/// use shard_split::field::Field;
/// use shard_split::random::SeededSource;
/// use shard_split::sss::{Dealer, ThresholdPolicy};
///
/// let mut dealer = Dealer::new(Field::default(), SeededSource::new(7));
/// let set = dealer.produce_share_set(b"hello", 5, ThresholdPolicy::Standard).unwrap();
/// assert_eq!(set.len(), 5);
/// assert!(set.shares()[0].starts_with("0104AA"));
/// ```
#[derive(Debug)]
pub struct Dealer<S> {
    field: Field,
    source: S,
}

impl Dealer<SystemSource> {
    /// A dealer over `GF(257)` drawing from the operating system.
    pub fn system() -> Self {
        Dealer::new(Field::default(), SystemSource::new())
    }
}

impl<S: CoefficientSource> Dealer<S> {
    pub fn new(field: Field, source: S) -> Self {
        Dealer { field, source }
    }

    fn check(&self, params: &SchemeParams) -> Result<()> {
        // participant indices double as evaluation points and must stay non-zero
        if params.shares() as u64 >= self.field.modulus() as u64 {
            return Err(SplitError::InvalidParameters {
                shares: params.shares(),
                threshold: params.threshold(),
            });
        }
        Ok(())
    }

    /// Splits one byte into `n` field elements, the evaluations at `x = 1..=n`.
    ///
    /// With a threshold of 1 the polynomial is constant and every share is `value`.
    pub fn split_byte(&mut self, value: u8, params: &SchemeParams) -> Result<Vec<u32>> {
        self.check(params)?;
        self.split_checked(value, params)
    }

    fn split_checked(&mut self, value: u8, params: &SchemeParams) -> Result<Vec<u32>> {
        let secret = value as u32;
        if !self.field.contains(secret) {
            return Err(SplitError::ValueOutOfField {
                value: secret,
                modulus: self.field.modulus(),
            });
        }

        let poly = Polynomial::random(params.threshold() - 1, secret, self.field, &mut self.source);

        let mut shares = Vec::new();
        shares.try_reserve_exact(params.shares())?;
        for x in 1..=params.shares() as u32 {
            let y = poly.evaluate(x);
            debug_assert!(self.field.contains(y));
            shares.push(y);
        }

        Ok(shares)
    }

    /// Splits a secret into `n` share strings, one per participant.
    ///
    /// Every string is `IITTAA` followed by one two-character token per secret byte.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, on a secret byte outside a reduced test field,
    /// or when the share buffers cannot be allocated. Nothing is returned on failure.
    pub fn split_secret(&mut self, secret: &[u8], params: &SchemeParams) -> Result<Vec<String>> {
        self.check(params)?;

        let mut shares = allocate_shares(params, share_len(secret.len()))?;

        for &byte in secret {
            let chunks = self.split_checked(byte, params)?;
            for (share, &value) in shares.iter_mut().zip(chunks.iter()) {
                push_token(share, value);
            }
        }

        Ok(shares)
    }

    /// Derives the threshold from `policy`, splits and packages the result.
    pub fn produce_share_set(
        &mut self,
        secret: &[u8],
        shares: usize,
        policy: ThresholdPolicy,
    ) -> Result<ShareSet> {
        let params = SchemeParams::from_policy(shares, policy)?;
        debug!(
            "Splitting {} bytes into {} shares (threshold {}, policy {})",
            secret.len(),
            params.shares(),
            params.threshold(),
            policy
        );

        let split = self.split_secret(secret, &params)?;
        Ok(ShareSet::new(params.threshold(), split, self.source.strength()))
    }
}

/// One buffer per participant, each holding its header and room for `share_len`
/// characters in total.
fn allocate_shares(params: &SchemeParams, share_len: usize) -> Result<Vec<String>> {
    let mut shares: Vec<String> = Vec::new();
    shares.try_reserve_exact(params.shares())?;
    for i in 1..=params.shares() {
        let mut share = String::new();
        share.try_reserve_exact(share_len)?;
        push_header(&mut share, i, params.threshold());
        shares.push(share);
    }
    Ok(shares)
}

/// Splits `secret` into `shares` share strings with the given threshold,
/// drawing coefficients from the operating system.
///
/// # Examples
///
/// ```rust
/// use shard_split::sss::split_secret;
///
/// let shares = split_secret(b"hello world", 5, 3).unwrap();
/// assert_eq!(shares.len(), 5);
/// assert_eq!(shares[2].len(), 6 + 2 * 11);
/// ```
pub fn split_secret(secret: &[u8], shares: usize, threshold: usize) -> Result<Vec<String>> {
    let params = SchemeParams::new(shares, threshold)?;
    Dealer::system().split_secret(secret, &params)
}

/// The single entry point used by the benchmark commands: threshold from
/// `policy`, field `GF(257)`, coefficients from `source`.
pub fn produce_share_set<S: CoefficientSource>(
    shares: usize,
    policy: ThresholdPolicy,
    secret: &[u8],
    source: S,
) -> Result<ShareSet> {
    Dealer::new(Field::default(), source).produce_share_set(secret, shares, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SENTINEL_TOKEN;
    use crate::encoding::parse_share;
    use crate::random::{EntropyStrength, FixedSequence, SeededSource};

    fn seeded(seed: u64) -> Dealer<SeededSource> {
        Dealer::new(Field::default(), SeededSource::new(seed))
    }

    #[test]
    fn test_threshold_policies() {
        assert_eq!(t_standard(5), 4);
        assert_eq!(t_standard(10), 7);
        assert_eq!(t_half(5), 3);
        assert_eq!(t_half(10), 5);
        assert_eq!(t_standard(1), 1);
        assert_eq!(t_half(1), 1);
        assert_eq!(ThresholdPolicy::Standard.threshold(50), 34);
        assert_eq!(ThresholdPolicy::Half.threshold(50), 25);
    }

    #[test]
    fn test_threshold_policies_match_floor_division() {
        for n in 0..1000usize {
            assert_eq!(t_standard(n), (2 * n + 2) / 3, "t_standard({})", n);
            assert_eq!(t_half(n), (n + 1) / 2, "t_half({})", n);
        }
        assert_eq!(t_standard(usize::MAX), usize::MAX / 3 * 2);
        assert_eq!(t_half(usize::MAX), usize::MAX / 2 + 1);
    }

    #[test]
    fn test_huge_share_count_is_rejected() {
        for policy in [ThresholdPolicy::Standard, ThresholdPolicy::Half] {
            for shares in [256, usize::MAX / 2, usize::MAX] {
                assert!(matches!(
                    produce_share_set(shares, policy, b"x", SeededSource::new(0)),
                    Err(SplitError::InvalidParameters { .. })
                ));
            }
        }
    }

    #[test]
    fn test_unallocatable_shares_surface_error() {
        let params = SchemeParams::new(3, 2).unwrap();
        assert!(matches!(
            allocate_shares(&params, usize::MAX),
            Err(SplitError::Allocation(_))
        ));
        let shares = allocate_shares(&params, share_len(4)).unwrap();
        assert_eq!(shares, ["0102AA", "0202AA", "0302AA"]);
        assert!(shares.iter().all(|s| s.capacity() >= 14));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("standard".parse::<ThresholdPolicy>(), Ok(ThresholdPolicy::Standard));
        assert_eq!("HALF".parse::<ThresholdPolicy>(), Ok(ThresholdPolicy::Half));
        assert!("third".parse::<ThresholdPolicy>().is_err());
    }

    #[test]
    fn test_invalid_threshold_and_share_count() {
        assert!(SchemeParams::new(0, 0).is_err());
        assert!(SchemeParams::new(5, 0).is_err());
        assert!(SchemeParams::new(5, 6).is_err());
        assert!(SchemeParams::new(256, 3).is_err());
        assert!(SchemeParams::new(255, 255).is_ok());
        assert!(split_secret(b"invalid params", 5, 6).is_err());
    }

    #[test]
    fn test_shares_must_stay_below_modulus() {
        let mut dealer = Dealer::new(Field::new(5).unwrap(), SeededSource::new(0));
        let params = SchemeParams::new(5, 2).unwrap();
        assert!(matches!(
            dealer.split_byte(1, &params),
            Err(SplitError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_byte_outside_small_field() {
        let mut dealer = Dealer::new(Field::new(7).unwrap(), SeededSource::new(0));
        let params = SchemeParams::new(3, 2).unwrap();
        assert!(matches!(
            dealer.split_byte(9, &params),
            Err(SplitError::ValueOutOfField { value: 9, modulus: 7 })
        ));
        assert!(dealer.split_secret(&[1, 2, 9], &params).is_err());
    }

    #[test]
    fn test_polynomial_evaluate() {
        let field = Field::default();
        // f(x) = 5 + 3x + 2x^2
        let mut source = FixedSequence::new(vec![3, 2]);
        let poly = Polynomial::random(2, 5, field, &mut source);
        assert_eq!(poly.coefficients(), &[5, 3, 2]);
        assert_eq!(poly.evaluate(0), 5);
        assert_eq!(poly.evaluate(1), 10);
        assert_eq!(poly.evaluate(2), 19);
        assert_eq!(poly.evaluate(20), (5 + 60 + 800) % 257);
    }

    #[test]
    fn test_split_byte_range_and_count() {
        let mut dealer = seeded(11);
        for n in 1..=12 {
            for t in 1..=n {
                let params = SchemeParams::new(n, t).unwrap();
                for v in [0u8, 1, 48, 127, 200, 255] {
                    let shares = dealer.split_byte(v, &params).unwrap();
                    assert_eq!(shares.len(), n);
                    assert!(shares.iter().all(|&y| y <= 256));
                }
            }
        }
    }

    #[test]
    fn test_split_byte_threshold_one_is_constant() {
        let mut source = FixedSequence::new(vec![99]);
        let mut dealer = Dealer::new(Field::default(), &mut source);
        for n in [1, 5, 50, 255] {
            let params = SchemeParams::new(n, 1).unwrap();
            for v in [0u8, 7, 255] {
                assert_eq!(dealer.split_byte(v, &params).unwrap(), vec![v as u32; n]);
            }
        }
        drop(dealer);
        assert_eq!(source.drawn(), 0);
    }

    #[test]
    fn test_split_byte_evaluates_at_one_indexed_points() {
        // f(x) = 10 + 1x, so participant i holds 10 + i
        let mut dealer = Dealer::new(Field::default(), FixedSequence::new(vec![1]));
        let params = SchemeParams::new(4, 2).unwrap();
        assert_eq!(dealer.split_byte(10, &params).unwrap(), vec![11, 12, 13, 14]);
    }

    #[test]
    fn test_split_secret_lengths() {
        let mut dealer = seeded(3);
        for (n, t, len) in [(1, 1, 0), (5, 4, 3), (10, 7, 100), (50, 25, 17)] {
            let params = SchemeParams::new(n, t).unwrap();
            let secret = vec![0x30u8; len];
            let shares = dealer.split_secret(&secret, &params).unwrap();
            assert_eq!(shares.len(), n);
            assert!(shares.iter().all(|s| s.len() == 6 + 2 * len));
        }
    }

    #[test]
    fn test_split_secret_headers() {
        let mut dealer = seeded(5);
        let params = SchemeParams::new(20, 14).unwrap();
        let shares = dealer.split_secret(b"header check", &params).unwrap();
        for (i, share) in shares.iter().enumerate() {
            assert_eq!(&share[0..2], format!("{:02X}", i + 1));
            assert_eq!(&share[2..4], "0E");
            assert_eq!(&share[4..6], "AA");
        }
    }

    #[test]
    fn test_split_secret_three_zero_bytes() {
        let set = produce_share_set(5, ThresholdPolicy::Standard, &[0x00, 0x00, 0x00], SeededSource::new(9))
            .unwrap();
        assert_eq!(set.threshold(), 4);
        let headers: Vec<&str> = set.iter().map(|s| &s[..6]).collect();
        assert_eq!(headers, ["0104AA", "0204AA", "0304AA", "0404AA", "0504AA"]);
        assert!(set.iter().all(|s| s.len() == 12));
    }

    #[test]
    fn test_threshold_one_reproduces_secret() {
        let secret = b"Remember what the dormouse said.";
        let mut dealer = Dealer::system();
        let params = SchemeParams::new(7, 1).unwrap();
        let shares = dealer.split_secret(secret, &params).unwrap();
        let expected = hex::encode_upper(secret);
        for share in &shares {
            assert_eq!(&share[6..], expected);
        }
    }

    #[test]
    fn test_sentinel_injected_share() {
        // f(x) = 0 + 256x evaluates to 256 at x = 1
        let mut dealer = Dealer::new(Field::default(), FixedSequence::new(vec![256]));
        let params = SchemeParams::new(1, 1).unwrap();
        assert_eq!(dealer.split_byte(0, &params).unwrap(), vec![0]);

        let params = SchemeParams::new(2, 2).unwrap();
        let shares = dealer.split_secret(&[0x00, 0x01], &params).unwrap();
        // byte 0: 256 at x=1, 255 at x=2; byte 1: 0 at x=1, 256 at x=2
        assert_eq!(shares[0], format!("0102AA{}00", SENTINEL_TOKEN));
        assert_eq!(shares[1], format!("0202AAFF{}", SENTINEL_TOKEN));
        assert_eq!(parse_share(&shares[0]).unwrap().values, vec![256, 0]);
    }

    #[test]
    fn test_share_uniqueness() {
        let mut dealer = seeded(21);
        let params = SchemeParams::new(5, 3).unwrap();
        let shares = dealer.split_secret(b"unique shares", &params).unwrap();
        let bodies: Vec<&str> = shares.iter().map(|s| &s[6..]).collect();
        let all_unique = bodies
            .iter()
            .all(|&v| bodies.iter().filter(|&&x| x == v).count() == 1);
        assert!(all_unique);
    }

    #[test]
    fn test_seeded_dealers_agree() {
        let params = SchemeParams::new(10, 7).unwrap();
        let a = seeded(77).split_secret(b"same seed", &params).unwrap();
        let b = seeded(77).split_secret(b"same seed", &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_produce_share_set_reports_strength() {
        let set = produce_share_set(3, ThresholdPolicy::Half, b"x", SystemSource::degraded(1)).unwrap();
        assert_eq!(set.entropy(), EntropyStrength::Fallback);
        assert_eq!(set.threshold(), 2);

        let set = Dealer::system()
            .produce_share_set(b"x", 3, ThresholdPolicy::Half)
            .unwrap();
        assert_eq!(set.entropy(), EntropyStrength::Cryptographic);
    }

    #[test]
    fn test_produce_share_set_rejects_zero_shares() {
        assert!(produce_share_set(0, ThresholdPolicy::Standard, b"abc", SeededSource::new(0)).is_err());
    }
}
