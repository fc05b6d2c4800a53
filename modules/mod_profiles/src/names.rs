//! Symbolic name tables for profile documents.
//!
//! One static table per category. Lookups are exact; a miss is a hard error
//! in the loader, never a silently dropped entry.

use parrot_traits::wire::GREASE_PLACEHOLDER;

/// Sentinel used by capture documents for every reserved value.
pub const GREASE: &str = "GREASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    ServerName,
    StatusRequest,
    SupportedGroups,
    EcPointFormats,
    SignatureAlgorithms,
    Alpn,
    SignedCertificateTimestamp,
    Padding,
    ExtendedMasterSecret,
    CompressCertificate,
    RecordSizeLimit,
    DelegatedCredentials,
    SessionTicket,
    SupportedVersions,
    PskKeyExchangeModes,
    KeyShare,
    RenegotiationInfo,
    ApplicationSettings,
    ApplicationSettingsNew,
    EncryptedClientHello,
    Grease,
}

pub static EXTENSIONS: &[(&str, ExtensionKind)] = &[
    ("server_name", ExtensionKind::ServerName),
    ("status_request", ExtensionKind::StatusRequest),
    ("supported_groups", ExtensionKind::SupportedGroups),
    ("ec_point_formats", ExtensionKind::EcPointFormats),
    ("signature_algorithms", ExtensionKind::SignatureAlgorithms),
    ("application_layer_protocol_negotiation", ExtensionKind::Alpn),
    ("signed_certificate_timestamp", ExtensionKind::SignedCertificateTimestamp),
    ("padding", ExtensionKind::Padding),
    ("extended_master_secret", ExtensionKind::ExtendedMasterSecret),
    ("compress_certificate", ExtensionKind::CompressCertificate),
    ("record_size_limit", ExtensionKind::RecordSizeLimit),
    ("delegated_credentials", ExtensionKind::DelegatedCredentials),
    ("session_ticket", ExtensionKind::SessionTicket),
    ("supported_versions", ExtensionKind::SupportedVersions),
    ("psk_key_exchange_modes", ExtensionKind::PskKeyExchangeModes),
    ("key_share", ExtensionKind::KeyShare),
    ("renegotiation_info", ExtensionKind::RenegotiationInfo),
    ("application_settings", ExtensionKind::ApplicationSettings),
    ("application_settings_new", ExtensionKind::ApplicationSettingsNew),
    ("encrypted_client_hello", ExtensionKind::EncryptedClientHello),
    (GREASE, ExtensionKind::Grease),
];

pub static CIPHER_SUITES: &[(&str, u16)] = &[
    (GREASE, GREASE_PLACEHOLDER),
    ("TLS_AES_128_GCM_SHA256", 0x1301),
    ("TLS_AES_256_GCM_SHA384", 0x1302),
    ("TLS_CHACHA20_POLY1305_SHA256", 0x1303),
    ("TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256", 0xc02b),
    ("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256", 0xc02f),
    ("TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384", 0xc02c),
    ("TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384", 0xc030),
    ("TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256", 0xcca9),
    ("TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256", 0xcca8),
    ("TLS_DHE_RSA_WITH_CHACHA20_POLY1305_SHA256", 0xccaa),
    ("TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA", 0xc009),
    ("TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA", 0xc00a),
    ("TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA", 0xc013),
    ("TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA", 0xc014),
    ("TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256", 0xc023),
    ("TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384", 0xc024),
    ("TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256", 0xc027),
    ("TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384", 0xc028),
    ("TLS_DHE_RSA_WITH_AES_128_GCM_SHA256", 0x009e),
    ("TLS_DHE_RSA_WITH_AES_256_GCM_SHA384", 0x009f),
    ("TLS_DHE_RSA_WITH_AES_128_CBC_SHA", 0x0033),
    ("TLS_DHE_RSA_WITH_AES_256_CBC_SHA", 0x0039),
    ("TLS_RSA_WITH_AES_128_GCM_SHA256", 0x009c),
    ("TLS_RSA_WITH_AES_256_GCM_SHA384", 0x009d),
    ("TLS_RSA_WITH_AES_128_CBC_SHA", 0x002f),
    ("TLS_RSA_WITH_AES_256_CBC_SHA", 0x0035),
    ("TLS_RSA_WITH_AES_128_CBC_SHA256", 0x003c),
    ("TLS_RSA_WITH_AES_256_CBC_SHA256", 0x003d),
    ("TLS_RSA_WITH_3DES_EDE_CBC_SHA", 0x000a),
    ("TLS_EMPTY_RENEGOTIATION_INFO_SCSV", 0x00ff),
    ("TLS_FALLBACK_SCSV", 0x5600),
];

pub static GROUPS: &[(&str, u16)] = &[
    (GREASE, GREASE_PLACEHOLDER),
    ("secp256r1", 0x0017),
    ("secp384r1", 0x0018),
    ("secp521r1", 0x0019),
    ("x25519", 0x001d),
    ("x448", 0x001e),
    ("ffdhe2048", 0x0100),
    ("ffdhe3072", 0x0101),
    ("ffdhe4096", 0x0102),
    ("MLKEM768", 0x0201),
    ("MLKEM1024", 0x0202),
    ("SecP256r1MLKEM768", 0x11eb),
    ("X25519MLKEM768", 0x11ec),
    ("SecP384r1MLKEM1024", 0x11ed),
    ("X25519Kyber768Draft00", 0x6399),
];

pub static SIGNATURE_SCHEMES: &[(&str, u16)] = &[
    ("rsa_pkcs1_sha1", 0x0201),
    ("ecdsa_sha1", 0x0203),
    ("rsa_pkcs1_sha256", 0x0401),
    ("ecdsa_secp256r1_sha256", 0x0403),
    ("rsa_pkcs1_sha384", 0x0501),
    ("ecdsa_secp384r1_sha384", 0x0503),
    ("rsa_pkcs1_sha512", 0x0601),
    ("ecdsa_secp521r1_sha512", 0x0603),
    ("rsa_pss_rsae_sha256", 0x0804),
    ("rsa_pss_rsae_sha384", 0x0805),
    ("rsa_pss_rsae_sha512", 0x0806),
    ("ed25519", 0x0807),
    ("ed448", 0x0808),
    ("rsa_pss_pss_sha256", 0x0809),
    ("rsa_pss_pss_sha384", 0x080a),
    ("rsa_pss_pss_sha512", 0x080b),
];

pub static VERSIONS: &[(&str, u16)] = &[
    (GREASE, GREASE_PLACEHOLDER),
    ("TLS 1.0", 0x0301),
    ("TLS 1.1", 0x0302),
    ("TLS 1.2", 0x0303),
    ("TLS 1.3", 0x0304),
];

pub static COMPRESSION_METHODS: &[(&str, u8)] = &[("NULL", 0), ("DEFLATE", 1)];

pub static POINT_FORMATS: &[(&str, u8)] = &[
    ("uncompressed", 0),
    ("ansiX962_compressed_prime", 1),
    ("ansiX962_compressed_char2", 2),
];

pub static PSK_MODES: &[(&str, u8)] = &[("psk_ke", 0), ("psk_dhe_ke", 1)];

pub static CERT_COMPRESSION: &[(&str, u16)] = &[("zlib", 1), ("brotli", 2), ("zstd", 3)];

/// HPKE identifiers for the GREASE ECH candidate suites.
pub static HPKE_KDFS: &[(&str, u16)] = &[("HKDF-SHA256", 1), ("HKDF-SHA384", 2), ("HKDF-SHA512", 3)];

pub static HPKE_AEADS: &[(&str, u16)] = &[("AES-128-GCM", 1), ("AES-256-GCM", 2), ("ChaCha20Poly1305", 3)];

pub fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    let name = strip_code_suffix(name);
    table.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Capture tools annotate names with their code point, e.g. `"server_name (0)"`.
pub fn strip_code_suffix(name: &str) -> &str {
    let trimmed = name.trim();
    match trimmed.rsplit_once(" (") {
        Some((base, code))
            if code.ends_with(')')
                && code[..code.len() - 1].chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_exact() {
        assert_eq!(lookup(GROUPS, "x25519"), Some(0x001d));
        assert_eq!(lookup(GROUPS, "X25519"), None);
        assert_eq!(lookup(CIPHER_SUITES, "TLS_AES_128_GCM_SHA256"), Some(0x1301));
        assert_eq!(lookup(CIPHER_SUITES, "TLS_AES_128_GCM_SHA265"), None);
    }

    #[test]
    fn code_suffix_is_ignored() {
        assert_eq!(strip_code_suffix("server_name (0)"), "server_name");
        assert_eq!(strip_code_suffix("X25519MLKEM768 (4588)"), "X25519MLKEM768");
        assert_eq!(strip_code_suffix("TLS 1.3"), "TLS 1.3");
        assert_eq!(lookup(EXTENSIONS, "key_share (51)"), Some(ExtensionKind::KeyShare));
        assert_eq!(
            lookup(EXTENSIONS, "encrypted_client_hello (65037)"),
            Some(ExtensionKind::EncryptedClientHello)
        );
    }

    #[test]
    fn tables_have_no_duplicate_names() {
        fn check<T>(table: &[(&str, T)]) {
            for (i, (a, _)) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|(b, _)| a != b),
                    "duplicate name {}",
                    a
                );
            }
        }
        check(EXTENSIONS);
        check(CIPHER_SUITES);
        check(GROUPS);
        check(SIGNATURE_SCHEMES);
        check(VERSIONS);
        check(HPKE_KDFS);
        check(HPKE_AEADS);
    }
}
