use crate::extension::TlsExtension;
use crate::wire::{CipherSuite, ProtocolVersion};

/// Whether a mimicked client shares one classical private key between a
/// hybrid key share and a standalone share on the same curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReusePolicy {
    /// Every key share draws fresh key material.
    #[default]
    Independent,
    /// The first share generated for a curve owns its private key; later
    /// shares on that curve reuse it.
    ShareClassical,
}

/// Declarative ClientHello shape of one mimicked client.
///
/// Order in every list is part of the fingerprint. Built once and applied to
/// any number of connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSpec {
    pub tls_vers_min: ProtocolVersion,
    pub tls_vers_max: ProtocolVersion,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<TlsExtension>,
    pub key_share_reuse: ReusePolicy,
}

impl FingerprintSpec {
    pub fn has_valid_version_range(&self) -> bool {
        self.tls_vers_min <= self.tls_vers_max
    }

    /// Lowest and highest real versions advertised by supported_versions.
    pub fn advertised_version_range(&self) -> Option<(ProtocolVersion, ProtocolVersion)> {
        self.extensions.iter().find_map(|ext| match ext {
            TlsExtension::SupportedVersions(versions) => {
                let mut real = versions.iter().copied().filter(|v| !v.is_grease());
                let first = real.next()?;
                Some(real.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
            }
            _ => None,
        })
    }
}

impl Default for FingerprintSpec {
    fn default() -> Self {
        Self {
            tls_vers_min: ProtocolVersion::TLS10,
            tls_vers_max: ProtocolVersion::TLS12,
            cipher_suites: Vec::new(),
            compression_methods: vec![0],
            extensions: Vec::new(),
            key_share_reuse: ReusePolicy::Independent,
        }
    }
}
