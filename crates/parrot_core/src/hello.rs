//! ClientHello and record framing for a configured connection.

use bytes::{BufMut, Bytes, BytesMut};
use parrot_traits::codec::{put_u16_prefixed, put_u24_prefixed, put_u8_prefixed};
use parrot_traits::{PaddingStyle, ProtocolVersion, TlsExtension};
use std::net::IpAddr;
use tracing::debug;

use crate::conn::{ConnectionState, UConn};
use crate::error::HelloError;

const HANDSHAKE_CLIENT_HELLO: u8 = 1;
const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

/// Hostname as it may appear in SNI, or `None` when SNI must be left off.
///
/// IP literals (bracketed or with a zone) are not valid host names; trailing
/// dots are dropped.
pub fn normalize_server_name(name: Option<&str>) -> Option<String> {
    let mut host = name?.trim();
    if host.len() >= 2 && host.starts_with('[') && host.ends_with(']') {
        host = &host[1..host.len() - 1];
    }
    let unzoned = host.split('%').next().unwrap_or(host);
    if unzoned.parse::<IpAddr>().is_ok() {
        return None;
    }
    let host = host.trim_end_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

impl UConn {
    /// Handshake message bytes: type, u24 length, body.
    pub fn marshal_client_hello(&self) -> Result<Bytes, HelloError> {
        if self.state != ConnectionState::Configured {
            return Err(HelloError::NotConfigured);
        }

        let mut buf = BytesMut::with_capacity(512);
        buf.put_u8(HANDSHAKE_CLIENT_HELLO);
        put_u24_prefixed(&mut buf, "client hello", |b| {
            // supported_versions carries anything above TLS 1.2
            b.put_u16(self.vers_max.min(ProtocolVersion::TLS12).0);
            b.put_slice(&self.client_random);
            put_u8_prefixed(b, "session id", |b| {
                b.put_slice(&self.session_id);
                Ok(())
            })?;
            put_u16_prefixed(b, "cipher suites", |b| {
                for cs in &self.cipher_suites {
                    b.put_u16(cs.0);
                }
                Ok(())
            })?;
            put_u8_prefixed(b, "compression methods", |b| {
                b.put_slice(&self.compression_methods);
                Ok(())
            })?;
            self.put_extensions(b)
        })?;

        debug!("Marshalled ClientHello of {} bytes", buf.len());
        Ok(buf.freeze())
    }

    /// The hello wrapped in a single handshake record.
    pub fn marshal_record(&self) -> Result<Bytes, HelloError> {
        let hello = self.marshal_client_hello()?;
        let mut buf = BytesMut::with_capacity(hello.len() + 5);
        buf.put_u8(CONTENT_TYPE_HANDSHAKE);
        buf.put_u16(ProtocolVersion::TLS10.0);
        put_u16_prefixed(&mut buf, "record", |b| {
            b.put_slice(&hello);
            Ok(())
        })?;
        Ok(buf.freeze())
    }

    /// Writes the extensions block. Boring-style padding is sized last, from
    /// the length of everything else.
    fn put_extensions(&self, b: &mut BytesMut) -> Result<(), parrot_traits::WireError> {
        let mut encoded = Vec::with_capacity(self.extensions.len());
        let mut boring_at = None;
        for (i, ext) in self.extensions.iter().enumerate() {
            if matches!(ext, TlsExtension::Padding(PaddingStyle::BoringStyle)) {
                boring_at = Some(i);
            }
            encoded.push(ext.encode()?);
        }

        if let Some(i) = boring_at {
            let extensions_len: usize = encoded.iter().map(|e| e.len()).sum();
            // `b` already holds the handshake header and every field before the extensions
            let unpadded = b.len() + 2 + extensions_len;
            if let Some(len) = PaddingStyle::boring_len(unpadded) {
                debug!("BoringSSL padding of {} bytes for {} byte hello", len, unpadded);
                encoded[i] = TlsExtension::Padding(PaddingStyle::Fixed(len)).encode()?;
            }
        }

        put_u16_prefixed(b, "extensions", |b| {
            for e in &encoded {
                b.put_slice(e);
            }
            Ok(())
        })
    }
}
