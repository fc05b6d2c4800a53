//! Ephemeral key share generation for classical, ML-KEM and hybrid groups.
//!
//! One [`KeyShareGenerator`] spans one application pass over a fingerprint,
//! so the reuse policy can link shares listed anywhere in that pass.

pub mod keys;

pub use keys::{EcdhPrivateKey, KemPrivateKey, KeySharePrivate, KeyShareKeys};

use parrot_traits::wire::{Curve, GroupKind};
use parrot_traits::{NamedGroup, RandError, RandSource, ReusePolicy};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum KeyShareError {
    #[error("cannot generate a key share for group {0:?}")]
    UnsupportedGroup(NamedGroup),
    #[error("insufficient randomness: {0}")]
    InsufficientRandomness(#[from] RandError),
    #[error("randomness source never produced a valid scalar for {0:?}")]
    DegenerateRandomness(NamedGroup),
}

/// Wire bytes plus the private handle for one key share.
#[derive(Debug, Clone)]
pub struct GeneratedShare {
    pub public: Vec<u8>,
    pub private: KeySharePrivate,
}

pub struct KeyShareGenerator<'r> {
    rand: &'r mut dyn RandSource,
    policy: ReusePolicy,
    /// Under `ShareClassical`, the first key generated per curve.
    owners: Vec<Arc<EcdhPrivateKey>>,
}

impl<'r> KeyShareGenerator<'r> {
    pub fn new(rand: &'r mut dyn RandSource, policy: ReusePolicy) -> Self {
        Self { rand, policy, owners: Vec::new() }
    }

    /// Generates the share for `group`. Components of a hybrid are drawn in
    /// the order they appear on the wire.
    pub fn generate(&mut self, group: NamedGroup) -> Result<GeneratedShare, KeyShareError> {
        let Some(kind) = group.kind() else {
            warn!("No key generation recipe for group {:?}", group);
            return Err(KeyShareError::UnsupportedGroup(group));
        };

        let share = match kind {
            GroupKind::Classical(curve) => {
                let key = self.classical(curve, group)?;
                GeneratedShare {
                    public: key.public_key().to_vec(),
                    private: KeySharePrivate::Classical(key),
                }
            }
            GroupKind::Kem(kem) => {
                let key = Arc::new(KemPrivateKey::generate(kem, &mut *self.rand)?);
                GeneratedShare {
                    public: key.public_key().to_vec(),
                    private: KeySharePrivate::Kem(key),
                }
            }
            GroupKind::Hybrid { kem, curve, kem_first } => {
                let (kem_key, classical) = if kem_first {
                    let k = Arc::new(KemPrivateKey::generate(kem, &mut *self.rand)?);
                    (k, self.classical(curve, group)?)
                } else {
                    let c = self.classical(curve, group)?;
                    (Arc::new(KemPrivateKey::generate(kem, &mut *self.rand)?), c)
                };
                let (first, second) = if kem_first {
                    (kem_key.public_key(), classical.public_key())
                } else {
                    (classical.public_key(), kem_key.public_key())
                };
                GeneratedShare {
                    public: [first, second].concat(),
                    private: KeySharePrivate::Hybrid { kem: kem_key, classical },
                }
            }
        };

        debug!("Generated {} byte key share for {:?}", share.public.len(), group);
        Ok(share)
    }

    /// Raw bytes from the same source, for per-connection values drawn
    /// between key shares.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        self.rand.fill(buf)
    }

    /// Public key of a throwaway key pair. It never takes part in reuse and
    /// its secret is wiped before returning.
    pub fn ephemeral_public(&mut self, curve: Curve) -> Result<Vec<u8>, KeyShareError> {
        let key = EcdhPrivateKey::generate(curve, &mut *self.rand, curve.group())?;
        Ok(key.public_key().to_vec())
    }

    fn classical(&mut self, curve: Curve, group: NamedGroup) -> Result<Arc<EcdhPrivateKey>, KeyShareError> {
        if self.policy == ReusePolicy::ShareClassical {
            if let Some(owner) = self.owners.iter().find(|k| k.curve() == curve) {
                debug!("Reusing {:?} private key for {:?}", curve, group);
                return Ok(owner.clone());
            }
        }

        let key = Arc::new(EcdhPrivateKey::generate(curve, &mut *self.rand, group)?);
        if self.policy == ReusePolicy::ShareClassical {
            self.owners.push(key.clone());
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parrot_traits::wire::Kem;
    use parrot_traits::{IncrementingSource, ReplaySource};

    fn generate_all(
        groups: &[NamedGroup],
        policy: ReusePolicy,
        rand: &mut dyn RandSource,
    ) -> Vec<GeneratedShare> {
        let mut gen = KeyShareGenerator::new(rand, policy);
        groups.iter().map(|g| gen.generate(*g).unwrap()).collect()
    }

    #[test]
    fn x25519_matches_rfc7748_vector() {
        let secret =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a").unwrap();
        let mut rand = ReplaySource::new(secret);
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::Independent);
        let share = gen.generate(NamedGroup::X25519).unwrap();
        assert_eq!(
            hex::encode(&share.public),
            "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
        );
    }

    #[test]
    fn public_key_lengths() {
        let mut rand = IncrementingSource::new();
        let groups = [
            NamedGroup::X25519,
            NamedGroup::SECP256R1,
            NamedGroup::SECP384R1,
            NamedGroup::MLKEM768,
            NamedGroup::X25519_MLKEM768,
            NamedGroup::SECP256R1_MLKEM768,
            NamedGroup::SECP384R1_MLKEM1024,
        ];
        let shares = generate_all(&groups, ReusePolicy::Independent, &mut rand);
        let lens: Vec<usize> = shares.iter().map(|s| s.public.len()).collect();
        assert_eq!(lens, vec![32, 65, 97, 1184, 1184 + 32, 65 + 1184, 97 + 1568]);
        assert_eq!(shares[1].public[0], 0x04, "uncompressed SEC1 point");
        assert_eq!(Kem::MlKem1024.public_len(), 1568);
    }

    #[test]
    fn hybrid_layout_follows_wire_order() {
        let mut rand = IncrementingSource::new();
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::Independent);

        let x = gen.generate(NamedGroup::X25519_MLKEM768).unwrap();
        let (kem, classical) = match &x.private {
            KeySharePrivate::Hybrid { kem, classical } => (kem.clone(), classical.clone()),
            other => panic!("expected hybrid, got {:?}", other),
        };
        assert_eq!(&x.public[..1184], kem.public_key());
        assert_eq!(&x.public[1184..], classical.public_key());

        let p = gen.generate(NamedGroup::SECP256R1_MLKEM768).unwrap();
        let classical = p.private.classical().unwrap();
        assert_eq!(&p.public[..65], classical.public_key());
    }

    #[test]
    fn deterministic_for_a_fixed_source() {
        let groups = [NamedGroup::X25519_MLKEM768, NamedGroup::X25519, NamedGroup::SECP256R1];
        let a = generate_all(&groups, ReusePolicy::Independent, &mut IncrementingSource::new());
        let b = generate_all(&groups, ReusePolicy::Independent, &mut IncrementingSource::new());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.public, y.public);
        }
    }

    #[test]
    fn independent_policy_draws_fresh_keys() {
        let groups = [NamedGroup::X25519_MLKEM768, NamedGroup::X25519];
        let shares = generate_all(&groups, ReusePolicy::Independent, &mut IncrementingSource::new());
        let hybrid_classical = shares[0].private.classical().unwrap();
        let standalone = shares[1].private.classical().unwrap();
        assert!(!Arc::ptr_eq(hybrid_classical, standalone));
        assert_ne!(&shares[0].public[1184..], &shares[1].public[..]);
    }

    #[test]
    fn shared_policy_links_hybrid_and_standalone() {
        let groups = [NamedGroup::X25519_MLKEM768, NamedGroup::X25519];
        let shares = generate_all(&groups, ReusePolicy::ShareClassical, &mut IncrementingSource::new());
        let hybrid_classical = shares[0].private.classical().unwrap();
        let standalone = shares[1].private.classical().unwrap();
        assert!(Arc::ptr_eq(hybrid_classical, standalone));
        assert_eq!(&shares[0].public[1184..], &shares[1].public[..]);
    }

    #[test]
    fn first_listed_share_owns_the_key() {
        // standalone first: the hybrid borrows it and draws only its KEM seed
        let mut rand = ReplaySource::new(vec![7u8; 32 + Kem::SEED_LEN]);
        let groups = [NamedGroup::X25519, NamedGroup::X25519_MLKEM768];
        let shares = generate_all(&groups, ReusePolicy::ShareClassical, &mut rand);
        assert_eq!(rand.remaining(), 0);
        assert!(Arc::ptr_eq(
            shares[0].private.classical().unwrap(),
            shares[1].private.classical().unwrap()
        ));
    }

    #[test]
    fn reuse_is_per_curve() {
        let groups = [NamedGroup::X25519_MLKEM768, NamedGroup::SECP256R1];
        let shares = generate_all(&groups, ReusePolicy::ShareClassical, &mut IncrementingSource::new());
        assert_eq!(shares[1].public.len(), 65);
        assert!(!Arc::ptr_eq(
            shares[0].private.classical().unwrap(),
            shares[1].private.classical().unwrap()
        ));
    }

    #[test]
    fn ephemeral_keys_stay_out_of_reuse() {
        let mut rand = IncrementingSource::new();
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::ShareClassical);
        let throwaway = gen.ephemeral_public(Curve::X25519).unwrap();
        let share = gen.generate(NamedGroup::X25519).unwrap();
        assert_eq!(throwaway.len(), 32);
        assert_ne!(throwaway, share.public);

        let mut byte = [0u8; 1];
        gen.fill(&mut byte).unwrap();
        assert_eq!(byte[0], 64);
    }

    #[test]
    fn unsupported_groups() {
        let mut rand = IncrementingSource::new();
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::Independent);
        for group in [NamedGroup::GREASE, NamedGroup::FFDHE2048, NamedGroup::SECP521R1] {
            assert!(matches!(
                gen.generate(group),
                Err(KeyShareError::UnsupportedGroup(g)) if g == group
            ));
        }
    }

    #[test]
    fn exhausted_source() {
        let mut rand = ReplaySource::new(vec![1u8; 16]);
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::Independent);
        assert!(matches!(
            gen.generate(NamedGroup::X25519),
            Err(KeyShareError::InsufficientRandomness(RandError::Exhausted { wanted: 32, available: 16 }))
        ));
    }

    #[test]
    fn zero_scalar_is_rejected() {
        let mut rand = ReplaySource::new(vec![0u8; 32 * 8]);
        let mut gen = KeyShareGenerator::new(&mut rand, ReusePolicy::Independent);
        assert!(matches!(
            gen.generate(NamedGroup::SECP256R1),
            Err(KeyShareError::DegenerateRandomness(_))
        ));
    }

    #[test]
    fn key_state_accessors() {
        let groups = [NamedGroup::X25519_MLKEM768, NamedGroup::X25519];
        let shares = generate_all(&groups, ReusePolicy::ShareClassical, &mut IncrementingSource::new());
        let mut keys = KeyShareKeys::new();
        for (group, share) in groups.iter().zip(shares) {
            keys.insert(*group, share.private);
        }
        assert_eq!(keys.len(), 2);
        assert!(Arc::ptr_eq(keys.mlkem_ecdhe().unwrap(), keys.ecdhe().unwrap()));
        assert_eq!(keys.mlkem().unwrap().public_key().len(), 1184);
        assert_eq!(keys.ecdhe().unwrap().secret_bytes().len(), 32);
        keys.clear();
        assert!(keys.is_empty());
    }
}
