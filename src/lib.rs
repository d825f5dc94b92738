//! # Threshold Secret Splitting over GF(257)
//!
//! This library splits secrets into Shamir shares over the prime field GF(257) and writes them
//! in a compact hexadecimal text format. It also carries the command table and timing loop used
//! to benchmark the cost of one split for a range of share counts and secret sizes.
//!
//! ## The Mathematics
//!
//! Each byte `S` of the secret is hidden in its own random polynomial of degree `t-1`:
//!
//! ```ignore
//! f(x) = S + a1*x + a2*x^2 + ... + a(t-1)*x^(t-1)   (mod 257)
//! ```
//!
//! Participant `i` (counting from 1) receives `f(i)`. Any `t` of those points determine the
//! polynomial, and with it `S`. Reconstruction itself is not part of this crate.
//!
//! Because the field has 257 elements, a share is a byte value or the extra value 256. The
//! text format writes 256 as the non-hex token `G0`.
//!
//! ## Share Format
//!
//! ```ignore
//! IITTAA<token><token>...
//! ```
//!
//! `II` is the participant index, `TT` the threshold, `AA` a fixed format tag, followed by one
//! two-character token per secret byte. A share set is the `n` strings, one per line.
//!
//! ### Example: Splitting a Secret
//!
//! ```rust
//! use shard_split::random::SystemSource;
//! use shard_split::sss::{produce_share_set, ThresholdPolicy};
//!
//! let set = produce_share_set(5, ThresholdPolicy::Standard, b"000", SystemSource::new()).unwrap();
//! assert_eq!(set.threshold(), 4);
//! for share in &set {
//!     assert_eq!(share.len(), 12);
//! }
//! let wire = set.to_bytes().unwrap();
//! assert_eq!(wire.len(), 5 * 13 + 1);
//! ```
//!
//! ## Modules
//!
//! - `field`: Modular exponentiation and the field descriptor.
//! - `sss`: Polynomials, scheme parameters, threshold policies and the dealer.
//! - `encoding`: Share strings, share sets and the transport buffer.
//! - `random`: Pluggable coefficient sources.
//! - `command`: Benchmark command table and timing.
//! - `config`: Benchmark client configuration.

/// The `field` module implements exponentiation by squaring and the small prime field the shares
/// live in.
pub mod field;

/// The `sss` (Shamir's Secret Sharing) module builds a random polynomial per secret byte,
/// evaluates it for every participant, and assembles the per-participant share strings.
pub mod sss;

/// The `encoding` module owns the text representation: headers, hex tokens, the `G0` sentinel,
/// the serialized share-set buffer and a parser for single share strings.
pub mod encoding;

/// The `random` module defines where polynomial coefficients come from, so production code can
/// use operating-system entropy while tests pin every coefficient.
pub mod random;

/// The `command` module maps benchmark command ids to `(shares, secret length, policy)` and
/// times repeated splits.
pub mod command;

/// The `config` module loads benchmark settings from a TOML file and the environment.
pub mod config;

/// The `error` module defines the crate's error type.
pub mod error;

/// The `constants` module defines various constants used in the library.
pub mod constants;

pub use crate::encoding::{ParsedShare, ShareSet};
pub use crate::error::SplitError;
pub use crate::sss::{produce_share_set, split_secret, Dealer, SchemeParams, ThresholdPolicy};
