//! ClientHello extensions as a closed set of variants.
//!
//! One enum serves as both template (inside a [`FingerprintSpec`]) and
//! instance (on a configured connection). The applicator resolves GREASE
//! slots, hostnames and key shares; everything else is carried as written.
//!
//! [`FingerprintSpec`]: crate::FingerprintSpec

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{put_u16_prefixed, put_u8_prefixed};
use crate::wire::{extension_type as ext, NamedGroup, ProtocolVersion, SignatureScheme};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("{what} is {len} bytes, too long for its length prefix")]
    Oversized { what: &'static str, len: usize },
    #[error("key share for {0:?} has no key exchange data")]
    UnresolvedKeyShare(NamedGroup),
    #[error("GREASE encrypted_client_hello has no drawn outer values")]
    UnresolvedEch,
}

/// One `KeyShareEntry`. `data: None` asks the applicator to generate it;
/// `Some` is emitted verbatim and never triggers key generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShare {
    pub group: NamedGroup,
    pub data: Option<Vec<u8>>,
}

impl KeyShare {
    pub fn generated(group: NamedGroup) -> Self {
        Self { group, data: None }
    }

    pub fn literal(group: NamedGroup, data: impl Into<Vec<u8>>) -> Self {
        Self { group, data: Some(data.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingStyle {
    /// Always pad with this many zero bytes.
    Fixed(u16),
    /// BoringSSL rule, resolved against the unpadded hello length when marshalling.
    BoringStyle,
}

impl PaddingStyle {
    /// Padding body length BoringSSL adds for a hello of `unpadded_len` bytes
    /// (handshake header included), or `None` if it would not pad.
    pub fn boring_len(unpadded_len: usize) -> Option<u16> {
        if unpadded_len > 0xff && unpadded_len < 0x200 {
            let len = 0x200 - unpadded_len;
            // the extension header itself takes 4 of those bytes
            let len = if len >= 4 + 1 { len - 4 } else { 1 };
            Some(len as u16)
        } else {
            None
        }
    }
}

/// HPKE KDF and AEAD pair offered in an ECH extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpkeSymmetricSuite {
    pub kdf: u16,
    pub aead: u16,
}

impl HpkeSymmetricSuite {
    pub const HKDF_SHA256_AES_128_GCM: Self = Self { kdf: 0x0001, aead: 0x0001 };
    pub const HKDF_SHA256_CHACHA20_POLY1305: Self = Self { kdf: 0x0001, aead: 0x0003 };
}

/// Tag length of every AEAD a GREASE ECH payload pretends to use.
pub const ECH_AEAD_TAG_LEN: usize = 16;

/// Values of an outer ECH extension, drawn per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchOuter {
    pub suite: HpkeSymmetricSuite,
    pub config_id: u8,
    /// Encapsulated x25519 public key.
    pub enc: Vec<u8>,
    pub payload: Vec<u8>,
}

/// GREASE `encrypted_client_hello`. A template lists the candidates; the
/// applicator picks one of each and fills `outer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchGrease {
    pub candidate_suites: Vec<HpkeSymmetricSuite>,
    /// Plaintext payload lengths. The AEAD tag is added on top.
    pub candidate_payload_lens: Vec<u16>,
    pub outer: Option<EchOuter>,
}

impl Default for EchGrease {
    fn default() -> Self {
        Self {
            candidate_suites: vec![HpkeSymmetricSuite::HKDF_SHA256_AES_128_GCM],
            candidate_payload_lens: vec![128, 160],
            outer: None,
        }
    }
}

/// ALPS was assigned a new code point; clients differ in which one they send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSettingsCodepoint {
    Old,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsExtension {
    /// Host is filled in per connection; `None` leaves SNI off the wire.
    ServerName { host: Option<String> },
    StatusRequest,
    SupportedGroups(Vec<NamedGroup>),
    EcPointFormats(Vec<u8>),
    SignatureAlgorithms(Vec<SignatureScheme>),
    Alpn(Vec<String>),
    SignedCertificateTimestamp,
    Padding(PaddingStyle),
    ExtendedMasterSecret,
    CompressCertificate(Vec<u16>),
    RecordSizeLimit(u16),
    DelegatedCredentials(Vec<SignatureScheme>),
    SessionTicket(Vec<u8>),
    SupportedVersions(Vec<ProtocolVersion>),
    PskKeyExchangeModes(Vec<u8>),
    KeyShare(Vec<KeyShare>),
    RenegotiationInfo,
    ApplicationSettings {
        codepoint: ApplicationSettingsCodepoint,
        protocols: Vec<String>,
    },
    /// Reserved placeholder. The body is emitted byte for byte.
    Grease { value: u16, body: Vec<u8> },
    EchGrease(EchGrease),
    /// Literal extension for hand-built specs.
    Generic { id: u16, data: Vec<u8> },
}

impl TlsExtension {
    pub fn extension_type(&self) -> u16 {
        match self {
            Self::ServerName { .. } => ext::SERVER_NAME,
            Self::StatusRequest => ext::STATUS_REQUEST,
            Self::SupportedGroups(_) => ext::SUPPORTED_GROUPS,
            Self::EcPointFormats(_) => ext::EC_POINT_FORMATS,
            Self::SignatureAlgorithms(_) => ext::SIGNATURE_ALGORITHMS,
            Self::Alpn(_) => ext::ALPN,
            Self::SignedCertificateTimestamp => ext::SIGNED_CERTIFICATE_TIMESTAMP,
            Self::Padding(_) => ext::PADDING,
            Self::ExtendedMasterSecret => ext::EXTENDED_MASTER_SECRET,
            Self::CompressCertificate(_) => ext::COMPRESS_CERTIFICATE,
            Self::RecordSizeLimit(_) => ext::RECORD_SIZE_LIMIT,
            Self::DelegatedCredentials(_) => ext::DELEGATED_CREDENTIALS,
            Self::SessionTicket(_) => ext::SESSION_TICKET,
            Self::SupportedVersions(_) => ext::SUPPORTED_VERSIONS,
            Self::PskKeyExchangeModes(_) => ext::PSK_KEY_EXCHANGE_MODES,
            Self::KeyShare(_) => ext::KEY_SHARE,
            Self::RenegotiationInfo => ext::RENEGOTIATION_INFO,
            Self::ApplicationSettings { codepoint: ApplicationSettingsCodepoint::Old, .. } => {
                ext::APPLICATION_SETTINGS
            }
            Self::ApplicationSettings { codepoint: ApplicationSettingsCodepoint::New, .. } => {
                ext::APPLICATION_SETTINGS_NEW
            }
            Self::Grease { value, .. } => *value,
            Self::EchGrease(_) => ext::ENCRYPTED_CLIENT_HELLO,
            Self::Generic { id, .. } => *id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Grease { .. })
    }

    /// True when this extension contributes nothing to the wire.
    pub fn is_omitted(&self) -> bool {
        match self {
            Self::ServerName { host } => host.as_deref().map_or(true, str::is_empty),
            Self::Padding(PaddingStyle::BoringStyle) => true,
            _ => false,
        }
    }

    /// Full type-length-value encoding. Omitted extensions encode to nothing.
    pub fn encode(&self) -> Result<Bytes, WireError> {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), WireError> {
        if self.is_omitted() {
            return Ok(());
        }
        buf.put_u16(self.extension_type());
        put_u16_prefixed(buf, "extension body", |b| self.encode_body(b))
    }

    fn encode_body(&self, b: &mut BytesMut) -> Result<(), WireError> {
        match self {
            Self::ServerName { host } => {
                let host = host.as_deref().unwrap_or_default();
                put_u16_prefixed(b, "server name list", |b| {
                    b.put_u8(0); // host_name
                    put_u16_prefixed(b, "host name", |b| {
                        b.put_slice(host.as_bytes());
                        Ok(())
                    })
                })
            }
            Self::StatusRequest => {
                b.put_u8(1); // ocsp
                b.put_u16(0); // responder_id_list
                b.put_u16(0); // request_extensions
                Ok(())
            }
            Self::SupportedGroups(groups) => put_u16_prefixed(b, "named group list", |b| {
                groups.iter().for_each(|g| b.put_u16(g.0));
                Ok(())
            }),
            Self::EcPointFormats(formats) => put_u8_prefixed(b, "ec point formats", |b| {
                b.put_slice(formats);
                Ok(())
            }),
            Self::SignatureAlgorithms(schemes) | Self::DelegatedCredentials(schemes) => {
                put_u16_prefixed(b, "signature schemes", |b| {
                    schemes.iter().for_each(|s| b.put_u16(s.0));
                    Ok(())
                })
            }
            Self::Alpn(protocols) | Self::ApplicationSettings { protocols, .. } => {
                put_protocol_list(b, protocols)
            }
            Self::SignedCertificateTimestamp | Self::ExtendedMasterSecret => Ok(()),
            Self::Padding(PaddingStyle::Fixed(len)) => {
                b.put_bytes(0, *len as usize);
                Ok(())
            }
            Self::Padding(PaddingStyle::BoringStyle) => Ok(()),
            Self::CompressCertificate(algorithms) => {
                put_u8_prefixed(b, "certificate compression algorithms", |b| {
                    algorithms.iter().for_each(|a| b.put_u16(*a));
                    Ok(())
                })
            }
            Self::RecordSizeLimit(limit) => {
                b.put_u16(*limit);
                Ok(())
            }
            Self::SessionTicket(ticket) => {
                b.put_slice(ticket);
                Ok(())
            }
            Self::SupportedVersions(versions) => put_u8_prefixed(b, "supported versions", |b| {
                versions.iter().for_each(|v| b.put_u16(v.0));
                Ok(())
            }),
            Self::PskKeyExchangeModes(modes) => put_u8_prefixed(b, "psk key exchange modes", |b| {
                b.put_slice(modes);
                Ok(())
            }),
            Self::KeyShare(shares) => put_u16_prefixed(b, "client shares", |b| {
                for share in shares {
                    let data = share
                        .data
                        .as_deref()
                        .ok_or(WireError::UnresolvedKeyShare(share.group))?;
                    b.put_u16(share.group.0);
                    put_u16_prefixed(b, "key exchange", |b| {
                        b.put_slice(data);
                        Ok(())
                    })?;
                }
                Ok(())
            }),
            Self::RenegotiationInfo => {
                b.put_u8(0); // empty renegotiated_connection
                Ok(())
            }
            Self::Grease { body, .. } => {
                b.put_slice(body);
                Ok(())
            }
            Self::EchGrease(ech) => {
                let outer = ech.outer.as_ref().ok_or(WireError::UnresolvedEch)?;
                b.put_u8(0); // outer ClientHello
                b.put_u16(outer.suite.kdf);
                b.put_u16(outer.suite.aead);
                b.put_u8(outer.config_id);
                put_u16_prefixed(b, "ech enc", |b| {
                    b.put_slice(&outer.enc);
                    Ok(())
                })?;
                put_u16_prefixed(b, "ech payload", |b| {
                    b.put_slice(&outer.payload);
                    Ok(())
                })
            }
            Self::Generic { data, .. } => {
                b.put_slice(data);
                Ok(())
            }
        }
    }
}

fn put_protocol_list(b: &mut BytesMut, protocols: &[String]) -> Result<(), WireError> {
    put_u16_prefixed(b, "protocol name list", |b| {
        for p in protocols {
            put_u8_prefixed(b, "protocol name", |b| {
                b.put_slice(p.as_bytes());
                Ok(())
            })?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_name_encoding() {
        let sni = TlsExtension::ServerName { host: Some("example.com".to_string()) };
        let bytes = sni.encode().unwrap();
        let mut expected = vec![0x00, 0x00, 0x00, 0x10, 0x00, 0x0e, 0x00, 0x00, 0x0b];
        expected.extend_from_slice(b"example.com");
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn server_name_without_host_is_omitted() {
        let sni = TlsExtension::ServerName { host: None };
        assert!(sni.is_omitted());
        assert!(sni.encode().unwrap().is_empty());
    }

    #[test]
    fn supported_versions_encoding() {
        let ext = TlsExtension::SupportedVersions(vec![ProtocolVersion::TLS13, ProtocolVersion::TLS12]);
        assert_eq!(
            &ext.encode().unwrap()[..],
            &[0x00, 0x2b, 0x00, 0x05, 0x04, 0x03, 0x04, 0x03, 0x03]
        );
    }

    #[test]
    fn alpn_encoding() {
        let ext = TlsExtension::Alpn(vec!["h2".to_string(), "http/1.1".to_string()]);
        let bytes = ext.encode().unwrap();
        assert_eq!(&bytes[..6], &[0x00, 0x10, 0x00, 0x0e, 0x00, 0x0c]);
        assert_eq!(&bytes[6..9], &[0x02, b'h', b'2']);
        assert_eq!(bytes[9], 8);
    }

    #[test]
    fn grease_body_is_verbatim() {
        let ext = TlsExtension::Grease { value: 0x3a3a, body: vec![0x00] };
        assert!(ext.is_placeholder());
        assert_eq!(&ext.encode().unwrap()[..], &[0x3a, 0x3a, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn key_share_with_literal_data() {
        let ext = TlsExtension::KeyShare(vec![KeyShare::literal(NamedGroup(0x2a2a), vec![0])]);
        assert_eq!(
            &ext.encode().unwrap()[..],
            &[0x00, 0x33, 0x00, 0x07, 0x00, 0x05, 0x2a, 0x2a, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn unresolved_key_share_does_not_encode() {
        let ext = TlsExtension::KeyShare(vec![KeyShare::generated(NamedGroup::X25519)]);
        assert_eq!(ext.encode(), Err(WireError::UnresolvedKeyShare(NamedGroup::X25519)));
    }

    #[test]
    fn status_request_and_renegotiation_info() {
        assert_eq!(
            &TlsExtension::StatusRequest.encode().unwrap()[..],
            &[0x00, 0x05, 0x00, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            &TlsExtension::RenegotiationInfo.encode().unwrap()[..],
            &[0xff, 0x01, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn ech_grease_encoding() {
        let mut ech = EchGrease::default();
        assert_eq!(TlsExtension::EchGrease(ech.clone()).encode(), Err(WireError::UnresolvedEch));

        ech.outer = Some(EchOuter {
            suite: HpkeSymmetricSuite::HKDF_SHA256_AES_128_GCM,
            config_id: 0x7c,
            enc: vec![0xee; 32],
            payload: vec![0xdd; 144],
        });
        let ext = TlsExtension::EchGrease(ech);
        assert!(!ext.is_placeholder());
        let bytes = ext.encode().unwrap();
        assert_eq!(&bytes[..4], &[0xfe, 0x0d, 0x00, (1 + 4 + 1 + 2 + 32 + 2 + 144) as u8]);
        assert_eq!(&bytes[4..10], &[0x00, 0x00, 0x01, 0x00, 0x01, 0x7c]);
        assert_eq!(&bytes[10..12], &[0x00, 0x20]);
        assert_eq!(&bytes[44..46], &[0x00, 0x90]);
        assert_eq!(bytes.len(), 46 + 144);
    }

    #[test]
    fn boring_padding_lengths() {
        assert_eq!(PaddingStyle::boring_len(0xff), None);
        assert_eq!(PaddingStyle::boring_len(0x200), None);
        assert_eq!(PaddingStyle::boring_len(0x100), Some(0x100 - 4));
        assert_eq!(PaddingStyle::boring_len(0x1fd), Some(1));
    }
}
