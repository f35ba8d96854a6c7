use thiserror::Error;

/// Errors surfaced by this crate.
///
/// Signing and verification never fail: [`crate::verify`] reports a bad
/// signature as `false`. The only runtime failure is an entropy source that
/// cannot produce a seed; the rest are caller-side construction errors when
/// building a fixed-size type out of an arbitrary byte slice.
#[derive(Error, Debug)]
pub enum Error {
    #[error("entropy source could not supply a secret seed: {0}")]
    EntropySource(#[from] rand::Error),

    #[error("invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
