//! Primitive wire types: VarInt/VarLong, length-prefixed strings, UUIDs and
//! fixed-width big-endian numbers.

use std::io::{Read, Write};

use smallvec::SmallVec;
use uuid::Uuid;

use crate::{CodecError, Result};

/// Low 7 payload bits of a VarNum byte.
const SEGMENT_BITS: u8 = 0b0111_1111;

/// Continuation flag, set on every VarNum byte but the last.
const CONTINUE_BIT: u8 = 0b1000_0000;

/// Widest legal VarInt encoding.
pub const VARINT_MAX_BYTES: usize = 5;

/// Widest legal VarLong encoding.
pub const VARLONG_MAX_BYTES: usize = 10;

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_i8<R: Read>(r: &mut R) -> Result<i8> {
    Ok(read_u8(r)? as i8)
}

pub fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

pub fn read_i16<R: Read>(r: &mut R) -> Result<i16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(i16::from_be_bytes(buf))
}

pub fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub fn read_i64<R: Read>(r: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_be_bytes(buf))
}

pub fn read_f64<R: Read>(r: &mut R) -> Result<f64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_be_bytes(buf))
}

pub fn read_bool<R: Read>(r: &mut R) -> Result<bool> {
    Ok(read_u8(r)? != 0)
}

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> Result<()> {
    w.write_all(&[value])?;
    Ok(())
}

pub fn write_i8<W: Write>(w: &mut W, value: i8) -> Result<()> {
    write_u8(w, value as u8)
}

pub fn write_u16<W: Write>(w: &mut W, value: u16) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_i16<W: Write>(w: &mut W, value: i16) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_i32<W: Write>(w: &mut W, value: i32) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_i64<W: Write>(w: &mut W, value: i64) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_f32<W: Write>(w: &mut W, value: f32) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_f64<W: Write>(w: &mut W, value: f64) -> Result<()> {
    w.write_all(&value.to_be_bytes())?;
    Ok(())
}

pub fn write_bool<W: Write>(w: &mut W, value: bool) -> Result<()> {
    write_u8(w, u8::from(value))
}

/// Reads a VarInt. Fails with [`CodecError::Overlong`] when the continuation
/// bit is still set after [`VARINT_MAX_BYTES`] bytes.
pub fn read_varint<R: Read>(r: &mut R) -> Result<i32> {
    let mut result: u32 = 0;
    let mut shift: u32 = 0;

    loop {
        let b = read_u8(r)?;
        result |= u32::from(b & SEGMENT_BITS) << shift;
        if b & CONTINUE_BIT == 0 {
            break;
        }
        shift += 7;
        if shift >= 7 * VARINT_MAX_BYTES as u32 {
            return Err(CodecError::Overlong {
                max: VARINT_MAX_BYTES,
            });
        }
    }

    Ok(result as i32)
}

/// Reads a VarLong, the 64-bit sibling of [`read_varint`].
pub fn read_varlong<R: Read>(r: &mut R) -> Result<i64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let b = read_u8(r)?;
        result |= u64::from(b & SEGMENT_BITS) << shift;
        if b & CONTINUE_BIT == 0 {
            break;
        }
        shift += 7;
        if shift >= 7 * VARLONG_MAX_BYTES as u32 {
            return Err(CodecError::Overlong {
                max: VARLONG_MAX_BYTES,
            });
        }
    }

    Ok(result as i64)
}

/// Encodes a VarInt into a stack-allocated buffer.
#[must_use]
pub fn varint_bytes(value: i32) -> SmallVec<[u8; VARINT_MAX_BYTES]> {
    let mut out: SmallVec<[u8; VARINT_MAX_BYTES]> = SmallVec::new_const();
    let mut v = value as u32;

    loop {
        let mut b = (v as u8) & SEGMENT_BITS;
        v >>= 7;
        if v != 0 {
            b |= CONTINUE_BIT;
        }
        out.push(b);
        if v == 0 {
            break;
        }
    }

    out
}

/// Encodes a VarLong into a stack-allocated buffer.
#[must_use]
pub fn varlong_bytes(value: i64) -> SmallVec<[u8; VARLONG_MAX_BYTES]> {
    let mut out: SmallVec<[u8; VARLONG_MAX_BYTES]> = SmallVec::new_const();
    let mut v = value as u64;

    loop {
        let mut b = (v as u8) & SEGMENT_BITS;
        v >>= 7;
        if v != 0 {
            b |= CONTINUE_BIT;
        }
        out.push(b);
        if v == 0 {
            break;
        }
    }

    out
}

pub fn write_varint<W: Write>(w: &mut W, value: i32) -> Result<()> {
    w.write_all(&varint_bytes(value))?;
    Ok(())
}

pub fn write_varlong<W: Write>(w: &mut W, value: i64) -> Result<()> {
    w.write_all(&varlong_bytes(value))?;
    Ok(())
}

/// Encoded width of a VarInt: 1 byte for zero, else one byte per started
/// 7-bit group of the unsigned bit pattern.
#[must_use]
pub const fn varint_len(value: i32) -> usize {
    let u = value as u32;
    if u == 0 {
        1
    } else {
        ((38 - u.leading_zeros()) / 7) as usize
    }
}

/// Encoded width of a VarLong.
#[must_use]
pub const fn varlong_len(value: i64) -> usize {
    let u = value as u64;
    if u == 0 {
        1
    } else {
        ((70 - u.leading_zeros()) / 7) as usize
    }
}

/// Reads a VarInt-length-prefixed byte string. The bytes are returned as-is;
/// UTF-8 validation is the consumer's business.
pub fn read_string<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = read_varint(r)?;
    if len < 0 {
        return Err(CodecError::LengthOverflow { len: i64::from(len) });
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn write_string<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    if bytes.len() > i32::MAX as usize {
        return Err(CodecError::LengthOverflow {
            len: bytes.len() as i64,
        });
    }
    write_varint(w, bytes.len() as i32)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Encoded width of a length-prefixed string.
#[must_use]
pub fn string_len(bytes: &[u8]) -> usize {
    varint_len(bytes.len() as i32) + bytes.len()
}

/// UUIDs travel as one big-endian 16-byte blob.
pub fn read_uuid<R: Read>(r: &mut R) -> Result<Uuid> {
    let mut buf = [0u8; 16];
    r.read_exact(&mut buf)?;
    Ok(Uuid::from_bytes(buf))
}

pub fn write_uuid<W: Write>(w: &mut W, uuid: &Uuid) -> Result<()> {
    w.write_all(uuid.as_bytes())?;
    Ok(())
}

/// Derives the offline-mode identifier for a byte slice: MD5 of the input
/// with the version nibble (byte 6, high nibble) forced to `0x3`.
#[must_use]
pub fn uuid_v3(input: &[u8]) -> Uuid {
    let mut digest = md5::compute(input).0;
    digest[6] = (digest[6] & 0x0F) | 0x30;
    Uuid::from_bytes(digest)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn roundtrip_varint(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, value).unwrap();
        assert_eq!(buf.len(), varint_len(value));
        assert_eq!(read_varint(&mut Cursor::new(&buf)).unwrap(), value);
        buf
    }

    #[test]
    fn varint_known_vectors() {
        let cases: &[(&[u8], i32)] = &[
            (&[0x00], 0),
            (&[0x01], 1),
            (&[0x7f], 127),
            (&[0x80, 0x01], 128),
            (&[0xff, 0x01], 255),
            (&[0xdd, 0xc7, 0x01], 25565),
            (&[0xff, 0xff, 0x7f], 2_097_151),
            (&[0xff, 0xff, 0xff, 0xff, 0x07], i32::MAX),
            (&[0xff, 0xff, 0xff, 0xff, 0x0f], -1),
            (&[0x80, 0x80, 0x80, 0x80, 0x08], i32::MIN),
        ];

        for (bytes, value) in cases {
            assert_eq!(read_varint(&mut Cursor::new(*bytes)).unwrap(), *value, "decode {value}");
            assert_eq!(roundtrip_varint(*value), *bytes, "encode {value}");
        }
    }

    #[test]
    fn varlong_known_vectors() {
        let cases: &[(&[u8], i64)] = &[
            (&[0x00], 0),
            (&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f], i64::MAX),
            (&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01], i64::MIN),
        ];

        for (bytes, value) in cases {
            assert_eq!(read_varlong(&mut Cursor::new(*bytes)).unwrap(), *value);
            let mut buf = Vec::new();
            write_varlong(&mut buf, *value).unwrap();
            assert_eq!(&buf, bytes);
            assert_eq!(buf.len(), varlong_len(*value));
        }
    }

    #[test]
    fn varint_roundtrip_sweep() {
        for value in [-2, -128, 300, 1 << 14, 1 << 21, 1 << 28, i32::MAX - 1] {
            roundtrip_varint(value);
        }
    }

    #[test]
    fn varint_overlong_rejected() {
        let six = [0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert!(matches!(
            read_varint(&mut Cursor::new(&six)),
            Err(CodecError::Overlong { max: VARINT_MAX_BYTES })
        ));
    }

    #[test]
    fn varlong_overlong_rejected() {
        let eleven = [0x80u8; 11];
        assert!(matches!(
            read_varlong(&mut Cursor::new(&eleven)),
            Err(CodecError::Overlong { max: VARLONG_MAX_BYTES })
        ));
    }

    #[test]
    fn varint_short_read_is_io_error() {
        // Continuation bit set but the stream ends.
        assert!(matches!(
            read_varint(&mut Cursor::new(&[0x80u8])),
            Err(CodecError::Io(_))
        ));
    }

    #[test]
    fn string_roundtrip() {
        for payload in [&b""[..], b"Notch", "\u{00e9}\u{00e8}".as_bytes(), &[0xff, 0xfe, 0x00]] {
            let mut buf = Vec::new();
            write_string(&mut buf, payload).unwrap();
            assert_eq!(buf.len(), string_len(payload));
            assert_eq!(read_string(&mut Cursor::new(&buf)).unwrap(), payload);
        }
    }

    #[test]
    fn string_negative_length_rejected() {
        let mut buf = Vec::new();
        write_varint(&mut buf, -1).unwrap();
        assert!(matches!(
            read_string(&mut Cursor::new(&buf)),
            Err(CodecError::LengthOverflow { len: -1 })
        ));
    }

    #[test]
    fn uuid_roundtrip() {
        let id = uuid_v3(b"Notch");
        let mut buf = Vec::new();
        write_uuid(&mut buf, &id).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(read_uuid(&mut Cursor::new(&buf)).unwrap(), id);
    }

    #[test]
    fn uuid_v3_deterministic_with_version_nibble() {
        for input in [&b""[..], b"Notch", b"jeb_", &[0u8; 64]] {
            let a = uuid_v3(input);
            let b = uuid_v3(input);
            assert_eq!(a, b);
            assert_eq!(a.as_bytes()[6] >> 4, 0x3);
        }
        assert_ne!(uuid_v3(b"Notch"), uuid_v3(b"jeb_"));
    }
}
