//! Length-prefixed writers. Each one reserves the prefix, lets the closure
//! write the body, then back-patches the length or fails if it does not fit.

use bytes::{BufMut, BytesMut};

use crate::extension::WireError;

pub fn put_u8_prefixed<F>(buf: &mut BytesMut, what: &'static str, body: F) -> Result<(), WireError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), WireError>,
{
    let at = buf.len();
    buf.put_u8(0);
    body(buf)?;
    let len = buf.len() - at - 1;
    buf[at] = u8::try_from(len).map_err(|_| WireError::Oversized { what, len })?;
    Ok(())
}

pub fn put_u16_prefixed<F>(buf: &mut BytesMut, what: &'static str, body: F) -> Result<(), WireError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), WireError>,
{
    let at = buf.len();
    buf.put_u16(0);
    body(buf)?;
    let len = buf.len() - at - 2;
    let len16 = u16::try_from(len).map_err(|_| WireError::Oversized { what, len })?;
    buf[at..at + 2].copy_from_slice(&len16.to_be_bytes());
    Ok(())
}

pub fn put_u24_prefixed<F>(buf: &mut BytesMut, what: &'static str, body: F) -> Result<(), WireError>
where
    F: FnOnce(&mut BytesMut) -> Result<(), WireError>,
{
    let at = buf.len();
    buf.put_slice(&[0, 0, 0]);
    body(buf)?;
    let len = buf.len() - at - 3;
    if len > 0x00ff_ffff {
        return Err(WireError::Oversized { what, len });
    }
    buf[at..at + 3].copy_from_slice(&(len as u32).to_be_bytes()[1..]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_prefixes() {
        let mut buf = BytesMut::new();
        put_u16_prefixed(&mut buf, "outer", |b| {
            put_u8_prefixed(b, "inner", |b| {
                b.put_slice(b"h2");
                Ok(())
            })
        })
        .unwrap();
        assert_eq!(&buf[..], &[0x00, 0x03, 0x02, b'h', b'2']);
    }

    #[test]
    fn u8_overflow_is_an_error() {
        let mut buf = BytesMut::new();
        let err = put_u8_prefixed(&mut buf, "alpn protocol", |b| {
            b.put_bytes(0, 256);
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err, WireError::Oversized { what: "alpn protocol", len: 256 });
    }

    #[test]
    fn u24_prefix() {
        let mut buf = BytesMut::new();
        put_u24_prefixed(&mut buf, "handshake", |b| {
            b.put_bytes(0xaa, 0x0102);
            Ok(())
        })
        .unwrap();
        assert_eq!(&buf[..3], &[0x00, 0x01, 0x02]);
        assert_eq!(buf.len(), 3 + 0x0102);
    }
}
