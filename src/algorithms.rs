use std::fmt;

mod k_means;

pub use k_means::KMeans;

/// Common errors thrown by the clustering engine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of clusters is zero.
    InvalidClusterCount,

    /// A sampling range is empty or not finite.
    InvalidBounds { min: f64, max: f64 },

    /// Training was requested on an empty dataset.
    NoData,

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidClusterCount => write!(f, "expected at least one cluster"),
            Error::InvalidBounds { min, max } => {
                write!(f, "invalid bounds: range {min}..{max} is empty or not finite")
            }
            Error::NoData => write!(f, "cannot train k-means without data points"),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
        }
    }
}

impl std::error::Error for Error {}
