use mod_keyshare::KeyShareError;
use mod_profiles::ParseError;
use parrot_traits::{ProtocolVersion, RandError, WireError};

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("key share generation failed: {0}")]
    KeyShare(#[from] KeyShareError),
    #[error("randomness source failed: {0}")]
    Randomness(#[from] RandError),
    #[error("minimum version {min:?} is above maximum {max:?}")]
    InvalidVersionRange { min: ProtocolVersion, max: ProtocolVersion },
    #[error("at most two GREASE extensions have distinct values")]
    TooManyGreaseExtensions,
    #[error("profile rejected: {0}")]
    Profile(#[from] ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum HelloError {
    #[error("connection has no fingerprint applied")]
    NotConfigured,
    #[error(transparent)]
    Wire(#[from] WireError),
}
