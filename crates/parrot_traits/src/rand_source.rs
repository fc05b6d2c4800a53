use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;

use crate::{RandError, RandSource};

/// Operating system CSPRNG. The default for real connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandSource for OsRandom {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| RandError::Source(e.to_string()))
    }
}

/// Adapts any `rand` generator, e.g. a seeded `StdRng` for reproducible runs.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: RngCore> RandSource for RngSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        self.0
            .try_fill_bytes(buf)
            .map_err(|e| RandError::Source(e.to_string()))
    }
}

/// Emits 0, 1, 2, ... wrapping at 255. Two draws never repeat within 256 bytes.
#[derive(Debug, Clone, Default)]
pub struct IncrementingSource {
    next: u8,
}

impl IncrementingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u8) -> Self {
        Self { next }
    }
}

impl RandSource for IncrementingSource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        for b in buf.iter_mut() {
            *b = self.next;
            self.next = self.next.wrapping_add(1);
        }
        Ok(())
    }
}

/// Replays a fixed byte string and fails once it runs dry.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    bytes: Vec<u8>,
    pos: usize,
}

impl ReplaySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

impl RandSource for ReplaySource {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        let available = self.remaining();
        if buf.len() > available {
            return Err(RandError::Exhausted { wanted: buf.len(), available });
        }
        buf.copy_from_slice(&self.bytes[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }
}

/// Always fails. Exercises the error path of anything that draws randomness.
#[derive(Debug, Clone, Default)]
pub struct FailingSource;

impl RandSource for FailingSource {
    fn fill(&mut self, _buf: &mut [u8]) -> Result<(), RandError> {
        Err(RandError::Source("source unavailable".to_string()))
    }
}

/// One source deliberately shared by several connections. Draws are serialised
/// by the mutex, so the interleaving is whatever order callers take the lock in.
#[derive(Debug)]
pub struct SharedSource<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> SharedSource<S> {
    pub fn new(source: S) -> Self {
        Self { inner: Arc::new(Mutex::new(source)) }
    }
}

impl<S> Clone for SharedSource<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<S: RandSource> RandSource for SharedSource<S> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), RandError> {
        self.inner.lock().fill(buf)
    }
}
