use crate::{load, ParseError};
use parrot_traits::FingerprintSpec;
use std::fmt;
use std::str::FromStr;

/// Built-in parrots. Each is a bundled profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientHelloId {
    Chrome131,
    Firefox120,
    /// Shares one x25519 key between its hybrid and standalone key shares.
    Firefox148,
}

impl ClientHelloId {
    pub const ALL: [ClientHelloId; 3] = [Self::Chrome131, Self::Firefox120, Self::Firefox148];

    pub fn document(self) -> &'static str {
        match self {
            Self::Chrome131 => include_str!("profiles/chrome_131.json"),
            Self::Firefox120 => include_str!("profiles/firefox_120.json"),
            Self::Firefox148 => include_str!("profiles/firefox_148.json"),
        }
    }

    pub fn spec(self) -> Result<FingerprintSpec, ParseError> {
        load(self.document())
    }
}

impl fmt::Display for ClientHelloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Chrome131 => "chrome_131",
            Self::Firefox120 => "firefox_120",
            Self::Firefox148 => "firefox_148",
        })
    }
}

impl FromStr for ClientHelloId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|id| id.to_string() == normalized)
            .ok_or_else(|| ParseError::UnknownClientHelloId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parrot_traits::{NamedGroup, ProtocolVersion, ReusePolicy, TlsExtension};

    fn key_share_groups(spec: &FingerprintSpec) -> Vec<NamedGroup> {
        spec.extensions
            .iter()
            .find_map(|e| match e {
                TlsExtension::KeyShare(shares) => Some(shares.iter().map(|s| s.group).collect()),
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn every_builtin_loads() {
        for id in ClientHelloId::ALL {
            let spec = id.spec().unwrap_or_else(|e| panic!("{} failed: {}", id, e));
            assert!(!spec.cipher_suites.is_empty());
            assert_eq!(spec.tls_vers_max, ProtocolVersion::TLS13);
        }
    }

    #[test]
    fn only_firefox_148_reuses_keys() {
        assert_eq!(ClientHelloId::Firefox148.spec().unwrap().key_share_reuse, ReusePolicy::ShareClassical);
        assert_eq!(ClientHelloId::Firefox120.spec().unwrap().key_share_reuse, ReusePolicy::Independent);
        assert_eq!(ClientHelloId::Chrome131.spec().unwrap().key_share_reuse, ReusePolicy::Independent);
    }

    #[test]
    fn firefox_148_key_shares() {
        let spec = ClientHelloId::Firefox148.spec().unwrap();
        assert_eq!(
            key_share_groups(&spec),
            vec![NamedGroup::X25519_MLKEM768, NamedGroup::X25519, NamedGroup::SECP256R1]
        );
    }

    #[test]
    fn chrome_starts_with_grease() {
        let spec = ClientHelloId::Chrome131.spec().unwrap();
        assert!(spec.cipher_suites[0].is_grease());
        assert!(spec.extensions.first().unwrap().is_placeholder());
        assert!(spec.extensions.last().unwrap().is_placeholder());
        assert_eq!(key_share_groups(&spec), vec![NamedGroup::GREASE, NamedGroup::X25519_MLKEM768, NamedGroup::X25519]);
    }

    #[test]
    fn every_builtin_sends_ech_grease() {
        let ech_position = |id: ClientHelloId| {
            let spec = id.spec().unwrap();
            let pos = spec.extensions.iter().position(|e| matches!(e, TlsExtension::EchGrease(_)));
            (pos, spec.extensions.len())
        };
        // Chrome keeps a trailing GREASE extension after it; Firefox sends it last
        let (pos, len) = ech_position(ClientHelloId::Chrome131);
        assert_eq!(pos, Some(len - 2));
        for id in [ClientHelloId::Firefox120, ClientHelloId::Firefox148] {
            let (pos, len) = ech_position(id);
            assert_eq!(pos, Some(len - 1), "{}", id);
        }
    }

    #[test]
    fn id_parsing() {
        assert_eq!("firefox_148".parse::<ClientHelloId>().unwrap(), ClientHelloId::Firefox148);
        assert_eq!("Chrome-131".parse::<ClientHelloId>().unwrap(), ClientHelloId::Chrome131);
        assert!(matches!(
            "safari_17".parse::<ClientHelloId>(),
            Err(ParseError::UnknownClientHelloId(_))
        ));
        for id in ClientHelloId::ALL {
            assert_eq!(id.to_string().parse::<ClientHelloId>().unwrap(), id);
        }
    }
}
