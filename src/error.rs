use std::collections::TryReserveError;

/// Errors produced while splitting a secret or handling its shares.
#[derive(Debug)]
pub enum SplitError {
    InvalidParameters { shares: usize, threshold: usize },
    InvalidModulus(u32),
    ValueOutOfField { value: u32, modulus: u32 },
    Allocation(TryReserveError),
    UnknownCommand(u32),
    MalformedShare(String),
}

impl std::error::Error for SplitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplitError::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl core::fmt::Display for SplitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SplitError::InvalidParameters { shares, threshold } => write!(
                f,
                "invalid scheme parameters (shares={}, threshold={})",
                shares, threshold
            ),
            SplitError::InvalidModulus(modulus) => write!(f, "invalid field modulus: {}", modulus),
            SplitError::ValueOutOfField { value, modulus } => {
                write!(f, "value {} is not an element of GF({})", value, modulus)
            }
            SplitError::Allocation(err) => write!(f, "share buffer allocation failed: {}", err),
            SplitError::UnknownCommand(id) => write!(f, "unknown command id: {}", id),
            SplitError::MalformedShare(msg) => write!(f, "malformed share: {}", msg),
        }
    }
}

impl From<TryReserveError> for SplitError {
    fn from(err: TryReserveError) -> Self {
        SplitError::Allocation(err)
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
