//! Typed TLS code points.
//!
//! Every identifier that appears in a ClientHello is a thin `u16` newtype so a
//! cipher suite can never be passed where a named group is expected. GREASE
//! values (RFC 8701) are representable in every category because mimicked
//! clients put them in cipher suites, groups, key shares and versions alike.

use std::fmt;

/// Value used in templates wherever a GREASE slot sits. The applicator swaps
/// it for the connection's GREASE value.
pub const GREASE_PLACEHOLDER: u16 = 0x0a0a;

/// Check if a u16 value is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both nibble pairs are identical.
pub fn is_grease_u16(val: u16) -> bool {
    let hi = (val >> 8) as u8;
    let lo = val as u8;
    hi == lo && (hi & 0x0F) == 0x0A
}

macro_rules! code_point {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            pub const GREASE: Self = Self(GREASE_PLACEHOLDER);

            pub fn is_grease(self) -> bool {
                is_grease_u16(self.0)
            }
        }

        impl From<u16> for $name {
            fn from(v: u16) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u16 {
            fn from(v: $name) -> u16 {
                v.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{:04x})", stringify!($name), self.0)
            }
        }
    };
}

code_point!(
    /// IANA TLS cipher suite.
    CipherSuite
);
code_point!(
    /// Named group (formerly "elliptic curve") used by supported_groups and key_share.
    NamedGroup
);
code_point!(
    /// Signature scheme used by signature_algorithms and delegated_credentials.
    SignatureScheme
);
code_point!(
    /// Protocol version as carried in supported_versions.
    ProtocolVersion
);

impl ProtocolVersion {
    pub const TLS10: Self = Self(0x0301);
    pub const TLS11: Self = Self(0x0302);
    pub const TLS12: Self = Self(0x0303);
    pub const TLS13: Self = Self(0x0304);
}

impl CipherSuite {
    pub const TLS_AES_128_GCM_SHA256: Self = Self(0x1301);
    pub const TLS_AES_256_GCM_SHA384: Self = Self(0x1302);
    pub const TLS_CHACHA20_POLY1305_SHA256: Self = Self(0x1303);
}

/// Classical component of a hybrid group, or the group itself when it is classical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    X25519,
    P256,
    P384,
}

/// Post-quantum KEM component of a hybrid group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kem {
    MlKem768,
    MlKem1024,
}

/// How a named group produces its key share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Classical(Curve),
    Kem(Kem),
    /// `kem_first` records the wire order of the two public halves.
    Hybrid { kem: Kem, curve: Curve, kem_first: bool },
}

impl NamedGroup {
    pub const SECP256R1: Self = Self(0x0017);
    pub const SECP384R1: Self = Self(0x0018);
    pub const SECP521R1: Self = Self(0x0019);
    pub const X25519: Self = Self(0x001d);
    pub const X448: Self = Self(0x001e);
    pub const FFDHE2048: Self = Self(0x0100);
    pub const FFDHE3072: Self = Self(0x0101);
    pub const MLKEM768: Self = Self(0x0201);
    pub const MLKEM1024: Self = Self(0x0202);
    pub const SECP256R1_MLKEM768: Self = Self(0x11eb);
    pub const X25519_MLKEM768: Self = Self(0x11ec);
    pub const SECP384R1_MLKEM1024: Self = Self(0x11ed);
    pub const X25519_KYBER768_DRAFT00: Self = Self(0x6399);

    /// Key generation recipe for this group, `None` when the engine cannot
    /// produce a share for it (GREASE, finite-field, secp521r1, pre-standard Kyber).
    pub fn kind(self) -> Option<GroupKind> {
        let kind = match self {
            Self::X25519 => GroupKind::Classical(Curve::X25519),
            Self::SECP256R1 => GroupKind::Classical(Curve::P256),
            Self::SECP384R1 => GroupKind::Classical(Curve::P384),
            Self::MLKEM768 => GroupKind::Kem(Kem::MlKem768),
            Self::MLKEM1024 => GroupKind::Kem(Kem::MlKem1024),
            Self::X25519_MLKEM768 => GroupKind::Hybrid {
                kem: Kem::MlKem768,
                curve: Curve::X25519,
                kem_first: true,
            },
            Self::SECP256R1_MLKEM768 => GroupKind::Hybrid {
                kem: Kem::MlKem768,
                curve: Curve::P256,
                kem_first: false,
            },
            Self::SECP384R1_MLKEM1024 => GroupKind::Hybrid {
                kem: Kem::MlKem1024,
                curve: Curve::P384,
                kem_first: false,
            },
            _ => return None,
        };
        Some(kind)
    }
}

impl Curve {
    /// The standalone named group for this curve.
    pub fn group(self) -> NamedGroup {
        match self {
            Curve::X25519 => NamedGroup::X25519,
            Curve::P256 => NamedGroup::SECP256R1,
            Curve::P384 => NamedGroup::SECP384R1,
        }
    }

    pub fn scalar_len(self) -> usize {
        match self {
            Curve::X25519 | Curve::P256 => 32,
            Curve::P384 => 48,
        }
    }

    pub fn public_len(self) -> usize {
        match self {
            Curve::X25519 => 32,
            Curve::P256 => 65,
            Curve::P384 => 97,
        }
    }
}

impl Kem {
    /// ML-KEM key generation consumes `d ‖ z`.
    pub const SEED_LEN: usize = 64;

    pub fn public_len(self) -> usize {
        match self {
            Kem::MlKem768 => 1184,
            Kem::MlKem1024 => 1568,
        }
    }
}

pub mod extension_type {
    pub const SERVER_NAME: u16 = 0x0000;
    pub const STATUS_REQUEST: u16 = 0x0005;
    pub const SUPPORTED_GROUPS: u16 = 0x000a;
    pub const EC_POINT_FORMATS: u16 = 0x000b;
    pub const SIGNATURE_ALGORITHMS: u16 = 0x000d;
    pub const ALPN: u16 = 0x0010;
    pub const SIGNED_CERTIFICATE_TIMESTAMP: u16 = 0x0012;
    pub const PADDING: u16 = 0x0015;
    pub const EXTENDED_MASTER_SECRET: u16 = 0x0017;
    pub const COMPRESS_CERTIFICATE: u16 = 0x001b;
    pub const RECORD_SIZE_LIMIT: u16 = 0x001c;
    pub const DELEGATED_CREDENTIALS: u16 = 0x0022;
    pub const SESSION_TICKET: u16 = 0x0023;
    pub const SUPPORTED_VERSIONS: u16 = 0x002b;
    pub const PSK_KEY_EXCHANGE_MODES: u16 = 0x002d;
    pub const KEY_SHARE: u16 = 0x0033;
    pub const APPLICATION_SETTINGS: u16 = 0x4469;
    pub const APPLICATION_SETTINGS_NEW: u16 = 0x44cd;
    pub const ENCRYPTED_CLIENT_HELLO: u16 = 0xfe0d;
    pub const RENEGOTIATION_INFO: u16 = 0xff01;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grease_values() {
        for hi in 0u16..16 {
            let v = (hi << 12) | 0x0a00 | (hi << 4) | 0x0a;
            assert!(is_grease_u16(v), "0x{:04X} should be GREASE", v);
        }
        assert!(NamedGroup::GREASE.is_grease());
    }

    #[test]
    fn test_non_grease_values() {
        assert!(!is_grease_u16(0x0303));
        assert!(!is_grease_u16(0x1301));
        assert!(!is_grease_u16(0x0a1a));
        assert!(!NamedGroup::X25519.is_grease());
    }

    #[test]
    fn hybrid_layouts() {
        match NamedGroup::X25519_MLKEM768.kind() {
            Some(GroupKind::Hybrid { curve, kem, kem_first }) => {
                assert_eq!(curve, Curve::X25519);
                assert_eq!(kem, Kem::MlKem768);
                assert!(kem_first);
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert!(NamedGroup::FFDHE2048.kind().is_none());
        assert!(NamedGroup::GREASE.kind().is_none());
    }
}
