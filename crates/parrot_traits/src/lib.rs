pub mod codec;
pub mod extension;
pub mod rand_source;
pub mod spec;
pub mod wire;

pub use extension::{
    ApplicationSettingsCodepoint, EchGrease, EchOuter, HpkeSymmetricSuite, KeyShare, PaddingStyle,
    TlsExtension, WireError, ECH_AEAD_TAG_LEN,
};
pub use rand_source::{
    FailingSource, IncrementingSource, OsRandom, ReplaySource, RngSource, SharedSource,
};
pub use spec::{FingerprintSpec, ReusePolicy};
pub use wire::{CipherSuite, NamedGroup, ProtocolVersion, SignatureScheme};

/// Failure reported by a randomness source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RandError {
    #[error("randomness source exhausted: wanted {wanted} bytes, {available} left")]
    Exhausted { wanted: usize, available: usize },
    #[error("randomness source failed: {0}")]
    Source(String),
}

/// Byte-stream capability every generated value is drawn from.
///
/// Passed explicitly into generation so tests can substitute a replayable
/// sequence. A source is only required to serve one connection at a time.
pub trait RandSource {
    /// Fills `buf` completely or reports why it could not.
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError>;
}

impl<S: RandSource + ?Sized> RandSource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        (**self).fill(buf)
    }
}

impl<S: RandSource + ?Sized> RandSource for Box<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        (**self).fill(buf)
    }
}
