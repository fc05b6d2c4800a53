//! Per-connection GREASE values, derived BoringSSL style.
//!
//! One 14-byte draw is split into seven little-endian slots. Every slot maps
//! onto the 16 reserved RFC 8701 values by keeping its high nibble.

use parrot_traits::{RandError, RandSource};

pub const SEED_LEN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreaseSlot {
    Cipher = 0,
    Group = 1,
    Extension1 = 2,
    Extension2 = 3,
    Version = 4,
    // slot 5 is drawn but unused
    EchExtension = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreaseSeed([u16; 7]);

impl GreaseSeed {
    pub fn draw(rand: &mut dyn RandSource) -> Result<Self, RandError> {
        let mut raw = [0u8; SEED_LEN];
        rand.fill(&mut raw)?;
        Ok(Self::from_bytes(raw))
    }

    pub fn from_bytes(raw: [u8; SEED_LEN]) -> Self {
        let mut slots = [0u16; 7];
        for (slot, pair) in slots.iter_mut().zip(raw.chunks_exact(2)) {
            *slot = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Self(slots)
    }

    /// GREASE value for `slot`. The two extension slots never collide.
    pub fn value(&self, slot: GreaseSlot) -> u16 {
        let value = grease_value(self.0[slot as usize]);
        if slot == GreaseSlot::Extension2 && value == grease_value(self.0[GreaseSlot::Extension1 as usize]) {
            return value ^ 0x1010;
        }
        value
    }

    /// Raw low byte of the ECH slot, sent as the GREASE ECH config id.
    pub fn ech_config_id(&self) -> u8 {
        self.0[GreaseSlot::EchExtension as usize] as u8
    }
}

fn grease_value(seed: u16) -> u16 {
    let b = ((seed & 0xf0) | 0x0a) as u8;
    u16::from_be_bytes([b, b])
}
