//! Fingerprint profile loader.
//!
//! Reads the JSON capture format (top-level `cipher_suites`,
//! `compression_methods` and an ordered `extensions` array whose entries carry
//! a `name` plus extension-specific fields) and produces a
//! [`FingerprintSpec`]. Order is preserved exactly; nothing is deduplicated.

pub mod names;
pub mod registry;

pub use registry::ClientHelloId;

use names::ExtensionKind;
use parrot_traits::{
    ApplicationSettingsCodepoint, CipherSuite, EchGrease, FingerprintSpec, HpkeSymmetricSuite,
    KeyShare, NamedGroup, PaddingStyle, ProtocolVersion, ReusePolicy, SignatureScheme,
    TlsExtension,
};
use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Which name table a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCategory {
    CipherSuite,
    Group,
    SignatureAlgorithm,
    Version,
    Compression,
    PointFormat,
    PskMode,
    CertCompression,
    HpkeKdf,
    HpkeAead,
    Extension,
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CipherSuite => "cipher suite",
            Self::Group => "named group",
            Self::SignatureAlgorithm => "signature algorithm",
            Self::Version => "TLS version",
            Self::Compression => "compression method",
            Self::PointFormat => "EC point format",
            Self::PskMode => "PSK key exchange mode",
            Self::CertCompression => "certificate compression algorithm",
            Self::HpkeKdf => "HPKE KDF",
            Self::HpkeAead => "HPKE AEAD",
            Self::Extension => "extension",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed profile document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown {category} {name:?}")]
    UnknownName { category: NameCategory, name: String },
    #[error("extension {extension} is missing required field {field}")]
    MissingField { extension: String, field: &'static str },
    #[error("extension {extension} has unknown field {field}")]
    UnknownField { extension: String, field: String },
    #[error("field {field} of extension {extension} is malformed: {source}")]
    InvalidField {
        extension: String,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("minimum version {min:?} is above maximum {max:?}")]
    InvalidVersionRange { min: ProtocolVersion, max: ProtocolVersion },
    #[error("unknown client hello id {0:?}")]
    UnknownClientHelloId(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileDocument {
    cipher_suites: Vec<String>,
    #[serde(default = "default_compression")]
    compression_methods: Vec<String>,
    extensions: Vec<ExtensionEntry>,
    #[serde(default)]
    tls_versions: Option<VersionBounds>,
    #[serde(default)]
    key_share_reuse: bool,
}

fn default_compression() -> Vec<String> {
    vec!["NULL".to_string()]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VersionBounds {
    min: String,
    max: String,
}

#[derive(Debug, Deserialize)]
struct ExtensionEntry {
    name: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClientShare {
    group: String,
    #[serde(default)]
    key_exchange: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HpkeSuiteEntry {
    kdf: String,
    aead: String,
}

/// Field access for one extension entry, with errors naming the extension.
struct Fields {
    extension: String,
    map: Map<String, Value>,
}

impl Fields {
    fn required<T: DeserializeOwned>(&mut self, field: &'static str) -> Result<T, ParseError> {
        self.optional(field)?.ok_or_else(|| ParseError::MissingField {
            extension: self.extension.clone(),
            field,
        })
    }

    fn optional<T: DeserializeOwned>(&mut self, field: &'static str) -> Result<Option<T>, ParseError> {
        match self.map.remove(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|source| {
                ParseError::InvalidField { extension: self.extension.clone(), field, source }
            }),
        }
    }

    /// Like `optional`, but an explicitly empty list is malformed.
    fn optional_non_empty<T: DeserializeOwned>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<Vec<T>>, ParseError> {
        match self.optional::<Vec<T>>(field)? {
            Some(list) if list.is_empty() => Err(ParseError::InvalidField {
                extension: self.extension.clone(),
                field,
                source: serde_json::Error::custom("list must not be empty"),
            }),
            other => Ok(other),
        }
    }

    /// Every field a kind understands has been taken; anything left is a typo
    /// or a field for another extension.
    fn finish(self) -> Result<(), ParseError> {
        match self.map.into_iter().next() {
            Some((field, _)) => Err(ParseError::UnknownField { extension: self.extension, field }),
            None => Ok(()),
        }
    }
}

pub fn load(document: &str) -> Result<FingerprintSpec, ParseError> {
    let doc: ProfileDocument = serde_json::from_str(document)?;
    build(doc)
}

pub fn load_value(document: Value) -> Result<FingerprintSpec, ParseError> {
    let doc: ProfileDocument = serde_json::from_value(document)?;
    build(doc)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<FingerprintSpec, ParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load(&text)
}

fn build(doc: ProfileDocument) -> Result<FingerprintSpec, ParseError> {
    let cipher_suites = resolve(&doc.cipher_suites, NameCategory::CipherSuite, names::CIPHER_SUITES)?
        .into_iter()
        .map(CipherSuite)
        .collect::<Vec<_>>();
    let compression_methods =
        resolve(&doc.compression_methods, NameCategory::Compression, names::COMPRESSION_METHODS)?;

    let extensions = doc
        .extensions
        .into_iter()
        .map(parse_extension)
        .collect::<Result<Vec<_>, _>>()?;

    let mut spec = FingerprintSpec {
        cipher_suites,
        compression_methods,
        extensions,
        key_share_reuse: if doc.key_share_reuse {
            ReusePolicy::ShareClassical
        } else {
            ReusePolicy::Independent
        },
        ..FingerprintSpec::default()
    };

    match doc.tls_versions {
        Some(bounds) => {
            spec.tls_vers_min = version(&bounds.min)?;
            spec.tls_vers_max = version(&bounds.max)?;
        }
        None => {
            if let Some((min, max)) = spec.advertised_version_range() {
                spec.tls_vers_min = min;
                spec.tls_vers_max = max;
            }
        }
    }
    if !spec.has_valid_version_range() {
        return Err(ParseError::InvalidVersionRange {
            min: spec.tls_vers_min,
            max: spec.tls_vers_max,
        });
    }

    info!(
        "Loaded fingerprint profile: {} cipher suites, {} extensions, versions {:?}..{:?}",
        spec.cipher_suites.len(),
        spec.extensions.len(),
        spec.tls_vers_min,
        spec.tls_vers_max
    );
    Ok(spec)
}

fn parse_extension(entry: ExtensionEntry) -> Result<TlsExtension, ParseError> {
    let kind = names::lookup(names::EXTENSIONS, &entry.name).ok_or_else(|| ParseError::UnknownName {
        category: NameCategory::Extension,
        name: entry.name.clone(),
    })?;
    let mut f = Fields {
        extension: names::strip_code_suffix(&entry.name).to_string(),
        map: entry.fields,
    };
    debug!("Parsing extension {}", f.extension);

    let ext = match kind {
        ExtensionKind::ServerName => TlsExtension::ServerName { host: None },
        ExtensionKind::StatusRequest => TlsExtension::StatusRequest,
        ExtensionKind::SupportedGroups => {
            let list: Vec<String> = f.required("named_group_list")?;
            TlsExtension::SupportedGroups(groups(&list)?)
        }
        ExtensionKind::EcPointFormats => {
            let list: Vec<String> = f.required("ec_point_format_list")?;
            TlsExtension::EcPointFormats(resolve(&list, NameCategory::PointFormat, names::POINT_FORMATS)?)
        }
        ExtensionKind::SignatureAlgorithms => {
            let list: Vec<String> = f.required("supported_signature_algorithms")?;
            TlsExtension::SignatureAlgorithms(signature_schemes(&list)?)
        }
        ExtensionKind::DelegatedCredentials => {
            let list: Vec<String> = f.required("supported_signature_algorithms")?;
            TlsExtension::DelegatedCredentials(signature_schemes(&list)?)
        }
        ExtensionKind::Alpn => TlsExtension::Alpn(f.required("protocol_name_list")?),
        ExtensionKind::SignedCertificateTimestamp => TlsExtension::SignedCertificateTimestamp,
        ExtensionKind::Padding => match f.optional::<u16>("len")? {
            None | Some(0) => TlsExtension::Padding(PaddingStyle::BoringStyle),
            Some(len) => TlsExtension::Padding(PaddingStyle::Fixed(len)),
        },
        ExtensionKind::ExtendedMasterSecret => TlsExtension::ExtendedMasterSecret,
        ExtensionKind::CompressCertificate => {
            let list: Vec<String> = f.required("algorithms")?;
            TlsExtension::CompressCertificate(resolve(
                &list,
                NameCategory::CertCompression,
                names::CERT_COMPRESSION,
            )?)
        }
        ExtensionKind::RecordSizeLimit => TlsExtension::RecordSizeLimit(f.required("record_size_limit")?),
        ExtensionKind::SessionTicket => TlsExtension::SessionTicket(Vec::new()),
        ExtensionKind::SupportedVersions => {
            let list: Vec<String> = f.required("versions")?;
            TlsExtension::SupportedVersions(list.iter().map(|v| version(v)).collect::<Result<_, _>>()?)
        }
        ExtensionKind::PskKeyExchangeModes => {
            let list: Vec<String> = f.required("ke_modes")?;
            TlsExtension::PskKeyExchangeModes(resolve(&list, NameCategory::PskMode, names::PSK_MODES)?)
        }
        ExtensionKind::KeyShare => {
            let shares: Vec<ClientShare> = f.required("client_shares")?;
            let shares = shares
                .into_iter()
                .map(|share| {
                    let group = group(&share.group)?;
                    Ok(match share.key_exchange {
                        Some(data) => KeyShare::literal(group, data),
                        None => KeyShare::generated(group),
                    })
                })
                .collect::<Result<Vec<_>, ParseError>>()?;
            TlsExtension::KeyShare(shares)
        }
        ExtensionKind::RenegotiationInfo => TlsExtension::RenegotiationInfo,
        ExtensionKind::ApplicationSettings => TlsExtension::ApplicationSettings {
            codepoint: ApplicationSettingsCodepoint::Old,
            protocols: f.required("supported_protocols")?,
        },
        ExtensionKind::ApplicationSettingsNew => TlsExtension::ApplicationSettings {
            codepoint: ApplicationSettingsCodepoint::New,
            protocols: f.required("supported_protocols")?,
        },
        ExtensionKind::EncryptedClientHello => {
            let defaults = EchGrease::default();
            let suites = match f.optional_non_empty::<HpkeSuiteEntry>("cipher_suites")? {
                Some(list) => list.iter().map(hpke_suite).collect::<Result<_, _>>()?,
                None => defaults.candidate_suites,
            };
            TlsExtension::EchGrease(EchGrease {
                candidate_suites: suites,
                candidate_payload_lens: f
                    .optional_non_empty("payload_lengths")?
                    .unwrap_or(defaults.candidate_payload_lens),
                outer: None,
            })
        }
        ExtensionKind::Grease => TlsExtension::Grease {
            value: parrot_traits::wire::GREASE_PLACEHOLDER,
            body: f.optional("body")?.unwrap_or_default(),
        },
    };
    f.finish()?;
    Ok(ext)
}

fn hpke_suite(entry: &HpkeSuiteEntry) -> Result<HpkeSymmetricSuite, ParseError> {
    let kdf = names::lookup(names::HPKE_KDFS, &entry.kdf)
        .ok_or_else(|| ParseError::UnknownName { category: NameCategory::HpkeKdf, name: entry.kdf.clone() })?;
    let aead = names::lookup(names::HPKE_AEADS, &entry.aead)
        .ok_or_else(|| ParseError::UnknownName { category: NameCategory::HpkeAead, name: entry.aead.clone() })?;
    Ok(HpkeSymmetricSuite { kdf, aead })
}

fn resolve<T: Copy>(list: &[String], category: NameCategory, table: &[(&str, T)]) -> Result<Vec<T>, ParseError> {
    list.iter()
        .map(|name| {
            names::lookup(table, name).ok_or_else(|| ParseError::UnknownName {
                category,
                name: name.clone(),
            })
        })
        .collect()
}

fn group(name: &str) -> Result<NamedGroup, ParseError> {
    names::lookup(names::GROUPS, name)
        .map(NamedGroup)
        .ok_or_else(|| ParseError::UnknownName { category: NameCategory::Group, name: name.to_string() })
}

fn groups(list: &[String]) -> Result<Vec<NamedGroup>, ParseError> {
    list.iter().map(|g| group(g)).collect()
}

fn signature_schemes(list: &[String]) -> Result<Vec<SignatureScheme>, ParseError> {
    Ok(resolve(list, NameCategory::SignatureAlgorithm, names::SIGNATURE_SCHEMES)?
        .into_iter()
        .map(SignatureScheme)
        .collect())
}

fn version(name: &str) -> Result<ProtocolVersion, ParseError> {
    names::lookup(names::VERSIONS, name)
        .map(ProtocolVersion)
        .ok_or_else(|| ParseError::UnknownName { category: NameCategory::Version, name: name.to_string() })
}
