use ml_kem::{EncodedSizeUser, KemCore, MlKem1024, MlKem768};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use parrot_traits::wire::{Curve, Kem};
use parrot_traits::{NamedGroup, RandSource};
use std::fmt;
use std::sync::Arc;
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::KeyShareError;

/// Out-of-range NIST scalars are re-drawn this many times before giving up.
const MAX_SCALAR_ATTEMPTS: usize = 8;

enum EcdhSecret {
    X25519(x25519_dalek::StaticSecret),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

/// Ephemeral classical private key. All three secret types wipe themselves on drop.
pub struct EcdhPrivateKey {
    curve: Curve,
    secret: EcdhSecret,
    public: Vec<u8>,
}

impl EcdhPrivateKey {
    pub(crate) fn generate(
        curve: Curve,
        rand: &mut dyn RandSource,
        group: NamedGroup,
    ) -> Result<Self, KeyShareError> {
        let parse: fn(&[u8]) -> Option<(EcdhSecret, Vec<u8>)> = match curve {
            Curve::X25519 => return Self::generate_x25519(rand),
            Curve::P256 => |scalar| {
                let sk = p256::SecretKey::from_slice(scalar).ok()?;
                let public = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
                Some((EcdhSecret::P256(sk), public))
            },
            Curve::P384 => |scalar| {
                let sk = p384::SecretKey::from_slice(scalar).ok()?;
                let public = sk.public_key().to_encoded_point(false).as_bytes().to_vec();
                Some((EcdhSecret::P384(sk), public))
            },
        };

        // zero and >= n are not valid scalars
        let mut scalar = Zeroizing::new(vec![0u8; curve.scalar_len()]);
        for _ in 0..MAX_SCALAR_ATTEMPTS {
            rand.fill(&mut scalar)?;
            if let Some((secret, public)) = parse(&scalar[..]) {
                return Ok(Self { curve, secret, public });
            }
        }
        Err(KeyShareError::DegenerateRandomness(group))
    }

    fn generate_x25519(rand: &mut dyn RandSource) -> Result<Self, KeyShareError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        rand.fill(&mut bytes[..])?;
        let secret = x25519_dalek::StaticSecret::from(*bytes);
        let public = x25519_dalek::PublicKey::from(&secret).to_bytes().to_vec();
        Ok(Self { curve: Curve::X25519, secret: EcdhSecret::X25519(secret), public })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Encoded public key: 32 bytes for x25519, an uncompressed SEC1 point otherwise.
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Raw private scalar for the handshake layer's key agreement.
    pub fn secret_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match &self.secret {
            EcdhSecret::X25519(sk) => sk.to_bytes().to_vec(),
            EcdhSecret::P256(sk) => sk.to_bytes().to_vec(),
            EcdhSecret::P384(sk) => sk.to_bytes().to_vec(),
        })
    }
}

// every secret variant wipes itself on drop
impl ZeroizeOnDrop for EcdhPrivateKey {}

impl fmt::Debug for EcdhPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhPrivateKey")
            .field("curve", &self.curve)
            .field("public_len", &self.public.len())
            .finish_non_exhaustive()
    }
}

enum KemSecret {
    MlKem768(Box<<MlKem768 as KemCore>::DecapsulationKey>),
    MlKem1024(Box<<MlKem1024 as KemCore>::DecapsulationKey>),
}

/// ML-KEM decapsulation key with its encoded encapsulation key.
pub struct KemPrivateKey {
    kem: Kem,
    secret: KemSecret,
    public: Vec<u8>,
}

impl KemPrivateKey {
    pub(crate) fn generate(kem: Kem, rand: &mut dyn RandSource) -> Result<Self, KeyShareError> {
        let mut seed = Zeroizing::new([0u8; Kem::SEED_LEN]);
        rand.fill(&mut seed[..])?;
        let mut d = Zeroizing::new([0u8; 32]);
        let mut z = Zeroizing::new([0u8; 32]);
        d.copy_from_slice(&seed[..32]);
        z.copy_from_slice(&seed[32..]);

        let (secret, public) = match kem {
            Kem::MlKem768 => {
                let (dk, ek) = MlKem768::generate_deterministic(&(*d).into(), &(*z).into());
                (KemSecret::MlKem768(Box::new(dk)), ek.as_bytes().as_slice().to_vec())
            }
            Kem::MlKem1024 => {
                let (dk, ek) = MlKem1024::generate_deterministic(&(*d).into(), &(*z).into());
                (KemSecret::MlKem1024(Box::new(dk)), ek.as_bytes().as_slice().to_vec())
            }
        };
        Ok(Self { kem, secret, public })
    }

    pub fn kem(&self) -> Kem {
        self.kem
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// FIPS 203 encoded decapsulation key.
    pub fn secret_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match &self.secret {
            KemSecret::MlKem768(dk) => dk.as_bytes().as_slice().to_vec(),
            KemSecret::MlKem1024(dk) => dk.as_bytes().as_slice().to_vec(),
        })
    }
}

impl ZeroizeOnDrop for KemPrivateKey {}

impl fmt::Debug for KemPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KemPrivateKey")
            .field("kem", &self.kem)
            .field("public_len", &self.public.len())
            .finish_non_exhaustive()
    }
}

/// Private half of one generated key share.
///
/// Handles are reference counted: when a profile reuses key material the two
/// entries hold the same allocation, and `Arc::ptr_eq` is the identity test.
#[derive(Debug, Clone)]
pub enum KeySharePrivate {
    Classical(Arc<EcdhPrivateKey>),
    Kem(Arc<KemPrivateKey>),
    Hybrid {
        kem: Arc<KemPrivateKey>,
        classical: Arc<EcdhPrivateKey>,
    },
}

impl KeySharePrivate {
    pub fn classical(&self) -> Option<&Arc<EcdhPrivateKey>> {
        match self {
            Self::Classical(k) | Self::Hybrid { classical: k, .. } => Some(k),
            Self::Kem(_) => None,
        }
    }

    pub fn kem(&self) -> Option<&Arc<KemPrivateKey>> {
        match self {
            Self::Kem(k) | Self::Hybrid { kem: k, .. } => Some(k),
            Self::Classical(_) => None,
        }
    }
}

/// Connection-scoped handshake key state: group to private key, in the
/// order the shares were generated.
#[derive(Debug, Clone, Default)]
pub struct KeyShareKeys {
    entries: Vec<(NamedGroup, KeySharePrivate)>,
}

impl KeyShareKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the key for `group`, replacing an earlier key for the same group.
    pub fn insert(&mut self, group: NamedGroup, key: KeySharePrivate) {
        match self.entries.iter_mut().find(|(g, _)| *g == group) {
            Some(slot) => slot.1 = key,
            None => self.entries.push((group, key)),
        }
    }

    pub fn get(&self, group: NamedGroup) -> Option<&KeySharePrivate> {
        self.entries.iter().find(|(g, _)| *g == group).map(|(_, k)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NamedGroup, &KeySharePrivate)> {
        self.entries.iter().map(|(g, k)| (*g, k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every handle. Keys no other holder references are wiped.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Private key of the first standalone classical share.
    pub fn ecdhe(&self) -> Option<&Arc<EcdhPrivateKey>> {
        self.entries.iter().find_map(|(_, k)| match k {
            KeySharePrivate::Classical(key) => Some(key),
            _ => None,
        })
    }

    /// Classical component of the first hybrid share.
    pub fn mlkem_ecdhe(&self) -> Option<&Arc<EcdhPrivateKey>> {
        self.entries.iter().find_map(|(_, k)| match k {
            KeySharePrivate::Hybrid { classical, .. } => Some(classical),
            _ => None,
        })
    }

    /// KEM component of the first share that has one.
    pub fn mlkem(&self) -> Option<&Arc<KemPrivateKey>> {
        self.entries.iter().find_map(|(_, k)| k.kem())
    }
}
