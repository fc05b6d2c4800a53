//! Turns a [`FingerprintSpec`] template into connection state.
//!
//! Randomness is drawn in a fixed order (GREASE seed, client random, session
//! id, then key shares and ECH values in extension order) so a deterministic
//! source yields a byte-identical hello.

use mod_keyshare::{KeyShareError, KeyShareGenerator, KeyShareKeys};
use mod_profiles::ClientHelloId;
use parrot_traits::wire::Curve;
use parrot_traits::{
    CipherSuite, EchGrease, EchOuter, FingerprintSpec, KeyShare, NamedGroup, ProtocolVersion,
    TlsExtension, ECH_AEAD_TAG_LEN,
};
use tracing::{debug, info};

use crate::conn::{ConnectionState, UConn};
use crate::error::ApplyError;
use crate::grease::{GreaseSeed, GreaseSlot};
use crate::hello::normalize_server_name;

/// BoringSSL sends one zero byte for the GREASE key share when none is given.
const GREASE_KEY_SHARE: [u8; 1] = [0];

impl UConn {
    /// Configures this connection from `spec`.
    ///
    /// On error the connection is left `Unconfigured` with no extensions,
    /// cipher suites or key state; the client random and session id may
    /// already hold fresh draws.
    pub fn apply_preset(&mut self, spec: &FingerprintSpec) -> Result<(), ApplyError> {
        self.reset();

        if !spec.has_valid_version_range() {
            return Err(ApplyError::InvalidVersionRange {
                min: spec.tls_vers_min,
                max: spec.tls_vers_max,
            });
        }

        let seed = GreaseSeed::draw(&mut *self.rand)?;
        self.rand.fill(&mut self.client_random)?;
        self.session_id.clear();
        if spec.tls_vers_max >= ProtocolVersion::TLS13 {
            self.session_id.resize(32, 0);
            self.rand.fill(&mut self.session_id)?;
        }

        let host = normalize_server_name(self.config.server_name.as_deref());
        let mut keys = KeyShareKeys::new();
        let mut generator = KeyShareGenerator::new(&mut *self.rand, spec.key_share_reuse);
        let mut grease_extensions = 0usize;
        let mut extensions = Vec::with_capacity(spec.extensions.len());

        for ext in &spec.extensions {
            let resolved = match ext {
                TlsExtension::Grease { body, .. } => {
                    let slot = match grease_extensions {
                        0 => GreaseSlot::Extension1,
                        1 => GreaseSlot::Extension2,
                        _ => return Err(ApplyError::TooManyGreaseExtensions),
                    };
                    grease_extensions += 1;
                    let value = seed.value(slot);
                    debug!("GREASE extension resolved to {:#06x}", value);
                    TlsExtension::Grease { value, body: body.clone() }
                }
                TlsExtension::KeyShare(shares) => {
                    let mut resolved = Vec::with_capacity(shares.len());
                    for share in shares {
                        resolved.push(if share.group.is_grease() {
                            let group = NamedGroup(seed.value(GreaseSlot::Group));
                            let data = share.data.clone().unwrap_or_else(|| GREASE_KEY_SHARE.to_vec());
                            KeyShare::literal(group, data)
                        } else if let Some(data) = &share.data {
                            KeyShare::literal(share.group, data.clone())
                        } else {
                            let generated = generator.generate(share.group)?;
                            keys.insert(share.group, generated.private);
                            KeyShare::literal(share.group, generated.public)
                        });
                    }
                    TlsExtension::KeyShare(resolved)
                }
                TlsExtension::SupportedGroups(groups) => TlsExtension::SupportedGroups(
                    groups
                        .iter()
                        .map(|g| if g.is_grease() { NamedGroup(seed.value(GreaseSlot::Group)) } else { *g })
                        .collect(),
                ),
                TlsExtension::SupportedVersions(versions) => TlsExtension::SupportedVersions(
                    versions
                        .iter()
                        .map(|v| {
                            if v.is_grease() {
                                ProtocolVersion(seed.value(GreaseSlot::Version))
                            } else {
                                *v
                            }
                        })
                        .collect(),
                ),
                TlsExtension::EchGrease(ech) => {
                    TlsExtension::EchGrease(resolve_ech(ech, &seed, &mut generator)?)
                }
                TlsExtension::ServerName { .. } => TlsExtension::ServerName { host: host.clone() },
                other => other.clone(),
            };
            extensions.push(resolved);
        }
        drop(generator);

        self.extensions = extensions;
        self.keys = keys;
        self.cipher_suites = spec
            .cipher_suites
            .iter()
            .map(|cs| if cs.is_grease() { CipherSuite(seed.value(GreaseSlot::Cipher)) } else { *cs })
            .collect();
        self.compression_methods = spec.compression_methods.clone();
        self.vers_min = spec.tls_vers_min;
        self.vers_max = spec.tls_vers_max;
        self.state = ConnectionState::Configured;

        info!(
            "Applied fingerprint: {} extensions, {} key shares generated, SNI {:?}",
            self.extensions.len(),
            self.keys.len(),
            host
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Unconfigured;
        self.keys.clear();
        self.extensions.clear();
        self.cipher_suites.clear();
        self.compression_methods.clear();
        self.vers_min = ProtocolVersion::TLS10;
        self.vers_max = ProtocolVersion::TLS12;
    }

    pub fn apply_hello_id(&mut self, id: ClientHelloId) -> Result<(), ApplyError> {
        info!("Applying built-in parrot {}", id);
        let spec = id.spec()?;
        self.apply_preset(&spec)
    }

    /// Loads a profile document and applies it.
    pub fn apply_profile(&mut self, document: &str) -> Result<(), ApplyError> {
        let spec = mod_profiles::load(document)?;
        self.apply_preset(&spec)
    }
}

/// Fills in a GREASE ECH extension: suite and payload length are picked from
/// the candidates with one drawn byte each (only when there is a choice), then
/// an x25519 `enc` and the payload are drawn.
fn resolve_ech(
    ech: &EchGrease,
    seed: &GreaseSeed,
    generator: &mut KeyShareGenerator<'_>,
) -> Result<EchGrease, KeyShareError> {
    let defaults = EchGrease::default();
    let suites = if ech.candidate_suites.is_empty() { &defaults.candidate_suites } else { &ech.candidate_suites };
    let lens = if ech.candidate_payload_lens.is_empty() {
        &defaults.candidate_payload_lens
    } else {
        &ech.candidate_payload_lens
    };

    let suite = suites[pick(suites.len(), generator)?];
    let payload_len = lens[pick(lens.len(), generator)?] as usize + ECH_AEAD_TAG_LEN;
    let enc = generator.ephemeral_public(Curve::X25519)?;
    let mut payload = vec![0u8; payload_len];
    generator.fill(&mut payload)?;
    debug!("GREASE ECH resolved: suite {:?}, {} byte payload", suite, payload_len);

    Ok(EchGrease {
        candidate_suites: ech.candidate_suites.clone(),
        candidate_payload_lens: ech.candidate_payload_lens.clone(),
        outer: Some(EchOuter { suite, config_id: seed.ech_config_id(), enc, payload }),
    })
}

fn pick(len: usize, generator: &mut KeyShareGenerator<'_>) -> Result<usize, KeyShareError> {
    if len < 2 {
        return Ok(0);
    }
    let mut byte = [0u8; 1];
    generator.fill(&mut byte)?;
    Ok(byte[0] as usize % len)
}
