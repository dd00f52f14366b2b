use ark_serialize::SerializationError;
use thiserror::Error;

/// Errors surfaced by provers and verifiers.
///
/// A verifier only returns an error for malformed input (bad lengths, bad
/// encodings, a zero randomizer). A well-formed but dishonest proof is
/// reported as `Ok(false)`, never as an error.
#[derive(Error, Debug)]
pub enum ShuffleError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("crypto failure: {0}")]
    CryptoFailure(String),

    #[error("decode error: {0}")]
    Decode(#[from] SerializationError),
}
