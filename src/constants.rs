/// The prime modulus of the share field. Every byte value fits, with 256 left over.
pub const FIELD_PRIME: u32 = 257;

/// The one field value that cannot be written as two hex digits.
pub const SENTINEL_VALUE: u32 = 256;

/// Token written in place of [`SENTINEL_VALUE`].
pub const SENTINEL_TOKEN: &str = "G0";

/// Format tag closing every share header.
pub const FORMAT_MARKER: &str = "AA";

/// Length of `IITTAA`.
pub const HEADER_LEN: usize = 6;

/// Characters per encoded secret byte.
pub const TOKEN_LEN: usize = 2;

/// Largest participant index that fits the two-digit header field.
pub const MAX_SHARES: usize = 0xFF;

/// Byte terminating the serialized share-set buffer.
pub const TRANSPORT_TERMINATOR: u8 = 0;

/// Byte the benchmark commands fill their secrets with.
pub const BENCH_FILL_BYTE: u8 = b'0';

/// Default number of timed repetitions per benchmark command.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Default secret length selecting which benchmark commands run.
pub const DEFAULT_DATA_SIZE: usize = 1000;

/// Prefix for configuration overrides taken from the environment.
pub const ENV_PREFIX: &str = "SSBENCH";
