//! Named Binary Tag codec for the 1.20.4 tree format.
//!
//! Every multi-byte number is big-endian. Compounds keep insertion order and
//! terminate with a literal `0x00` tag byte; tag names and string payloads
//! are u16-length-prefixed.

use std::io::{Read, Write};

use crate::{CodecError, Result, wire};

/// Recursion guard for hostile inputs, matching the vanilla reader's limit.
pub const MAX_DEPTH: usize = 512;

/// One NBT payload. The tag byte itself lives with the parent (compound
/// entry, list header, or root).
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    /// Homogeneous; the element tag is derived from the first element.
    List(Vec<NbtValue>),
    /// Insertion-ordered.
    Compound(Vec<(String, NbtValue)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtValue {
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Self::End => 0x00,
            Self::Byte(_) => 0x01,
            Self::Short(_) => 0x02,
            Self::Int(_) => 0x03,
            Self::Long(_) => 0x04,
            Self::Float(_) => 0x05,
            Self::Double(_) => 0x06,
            Self::ByteArray(_) => 0x07,
            Self::String(_) => 0x08,
            Self::List(_) => 0x09,
            Self::Compound(_) => 0x0A,
            Self::IntArray(_) => 0x0B,
            Self::LongArray(_) => 0x0C,
        }
    }
}

/// A root tag plus its optional name. Named contexts (files, network roots)
/// carry a name; list elements never do.
#[derive(Debug, Clone, PartialEq)]
pub struct Nbt {
    pub name:  Option<String>,
    pub value: NbtValue,
}

impl Nbt {
    #[must_use]
    pub fn named(name: impl Into<String>, value: NbtValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    #[must_use]
    pub fn unnamed(value: NbtValue) -> Self {
        Self { name: None, value }
    }

    /// Reads one root tag: tag byte, then (in named contexts, for any tag
    /// but TAG_End) a u16-length-prefixed name, then the payload.
    pub fn parse<R: Read>(r: &mut R, named: bool) -> Result<Self> {
        let tag = wire::read_u8(r)?;
        if tag > 0x0C {
            return Err(CodecError::UnknownTag(tag));
        }
        let name = if named && tag != 0x00 {
            Some(read_name(r)?)
        } else {
            None
        };
        let value = read_value(r, tag, 0)?;
        Ok(Self { name, value })
    }

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        wire::write_u8(w, self.value.tag())?;
        if let Some(name) = &self.name {
            write_name(w, name)?;
        }
        write_value(w, &self.value)
    }
}

fn read_name<R: Read>(r: &mut R) -> Result<String> {
    let len = wire::read_u16(r)?;
    let mut buf = vec![0u8; usize::from(len)];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn write_name<W: Write>(w: &mut W, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() > usize::from(u16::MAX) {
        return Err(CodecError::LengthOverflow {
            len: bytes.len() as i64,
        });
    }
    wire::write_u16(w, bytes.len() as u16)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Negative array lengths are clamped to zero on read.
fn read_len<R: Read>(r: &mut R) -> Result<usize> {
    Ok(wire::read_i32(r)?.max(0) as usize)
}

fn write_len<W: Write>(w: &mut W, len: usize) -> Result<()> {
    if len > i32::MAX as usize {
        return Err(CodecError::LengthOverflow { len: len as i64 });
    }
    wire::write_i32(w, len as i32)
}

fn read_value<R: Read>(r: &mut R, tag: u8, depth: usize) -> Result<NbtValue> {
    if depth > MAX_DEPTH {
        return Err(CodecError::DepthLimit(MAX_DEPTH));
    }

    Ok(match tag {
        0x00 => NbtValue::End,
        0x01 => NbtValue::Byte(wire::read_i8(r)?),
        0x02 => NbtValue::Short(wire::read_i16(r)?),
        0x03 => NbtValue::Int(wire::read_i32(r)?),
        0x04 => NbtValue::Long(wire::read_i64(r)?),
        0x05 => NbtValue::Float(wire::read_f32(r)?),
        0x06 => NbtValue::Double(wire::read_f64(r)?),
        0x07 => {
            let len = read_len(r)?;
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf)?;
            NbtValue::ByteArray(buf)
        }
        0x08 => NbtValue::String(read_name(r)?),
        0x09 => {
            let elem = wire::read_u8(r)?;
            if elem > 0x0C {
                return Err(CodecError::UnknownTag(elem));
            }
            let len = read_len(r)?;
            if elem == 0x00 && len > 0 {
                return Err(CodecError::EndValue);
            }
            let mut items = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                items.push(read_value(r, elem, depth + 1)?);
            }
            NbtValue::List(items)
        }
        0x0A => {
            let mut entries = Vec::new();
            loop {
                let entry_tag = wire::read_u8(r)?;
                if entry_tag == 0x00 {
                    break;
                }
                if entry_tag > 0x0C {
                    return Err(CodecError::UnknownTag(entry_tag));
                }
                let name = read_name(r)?;
                entries.push((name, read_value(r, entry_tag, depth + 1)?));
            }
            NbtValue::Compound(entries)
        }
        0x0B => {
            let len = read_len(r)?;
            let mut items = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                items.push(wire::read_i32(r)?);
            }
            NbtValue::IntArray(items)
        }
        0x0C => {
            let len = read_len(r)?;
            let mut items = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                items.push(wire::read_i64(r)?);
            }
            NbtValue::LongArray(items)
        }
        _ => return Err(CodecError::UnknownTag(tag)),
    })
}

fn write_value<W: Write>(w: &mut W, value: &NbtValue) -> Result<()> {
    match value {
        NbtValue::End => Ok(()),
        NbtValue::Byte(v) => wire::write_i8(w, *v),
        NbtValue::Short(v) => wire::write_i16(w, *v),
        NbtValue::Int(v) => wire::write_i32(w, *v),
        NbtValue::Long(v) => wire::write_i64(w, *v),
        NbtValue::Float(v) => wire::write_f32(w, *v),
        NbtValue::Double(v) => wire::write_f64(w, *v),
        NbtValue::ByteArray(v) => {
            write_len(w, v.len())?;
            w.write_all(v)?;
            Ok(())
        }
        NbtValue::String(s) => write_name(w, s),
        NbtValue::List(items) => {
            let elem = items.first().map_or(0x00, NbtValue::tag);
            if elem == 0x00 && !items.is_empty() {
                return Err(CodecError::EndValue);
            }
            if items.iter().any(|item| item.tag() != elem) {
                return Err(CodecError::MixedList);
            }
            wire::write_u8(w, elem)?;
            write_len(w, items.len())?;
            for item in items {
                write_value(w, item)?;
            }
            Ok(())
        }
        NbtValue::Compound(entries) => {
            for (name, entry) in entries {
                if entry.tag() == 0x00 {
                    return Err(CodecError::EndValue);
                }
                wire::write_u8(w, entry.tag())?;
                write_name(w, name)?;
                write_value(w, entry)?;
            }
            wire::write_u8(w, 0x00)
        }
        NbtValue::IntArray(items) => {
            write_len(w, items.len())?;
            for item in items {
                wire::write_i32(w, *item)?;
            }
            Ok(())
        }
        NbtValue::LongArray(items) => {
            write_len(w, items.len())?;
            for item in items {
                wire::write_i64(w, *item)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample_tree() -> Nbt {
        Nbt::named(
            "hello world",
            NbtValue::Compound(vec![
                ("name".into(), NbtValue::String("Bananrama".into())),
                ("byte".into(), NbtValue::Byte(-7)),
                ("long".into(), NbtValue::Long(9_223_372_036_854_775_807)),
                ("pos".into(), NbtValue::List(vec![
                    NbtValue::Double(1.5),
                    NbtValue::Double(-64.0),
                    NbtValue::Double(7.25),
                ])),
                ("ids".into(), NbtValue::IntArray(vec![1, -2, 3])),
                ("blob".into(), NbtValue::ByteArray(vec![0xde, 0xad])),
                ("nested".into(), NbtValue::Compound(vec![
                    ("empty_list".into(), NbtValue::List(vec![])),
                ])),
            ]),
        )
    }

    #[test]
    fn named_roundtrip() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        tree.write(&mut buf).unwrap();
        let back = Nbt::parse(&mut Cursor::new(&buf), true).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn unnamed_roundtrip() {
        let tree = Nbt::unnamed(NbtValue::Compound(vec![(
            "k".into(),
            NbtValue::Short(300),
        )]));
        let mut buf = Vec::new();
        tree.write(&mut buf).unwrap();
        // Tag byte directly followed by the payload, no name length.
        assert_eq!(&buf[..2], &[0x0A, 0x02]);
        assert_eq!(Nbt::parse(&mut Cursor::new(&buf), false).unwrap(), tree);
    }

    #[test]
    fn compound_preserves_insertion_order() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        tree.write(&mut buf).unwrap();
        let NbtValue::Compound(entries) =
            Nbt::parse(&mut Cursor::new(&buf), true).unwrap().value
        else {
            panic!("expected compound root");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["name", "byte", "long", "pos", "ids", "blob", "nested"]);
    }

    #[test]
    fn negative_array_length_reads_as_empty() {
        // TAG_Int_Array "a" with length -5.
        let mut buf = vec![0x0B, 0x00, 0x01, b'a'];
        buf.extend_from_slice(&(-5i32).to_be_bytes());
        let tree = Nbt::parse(&mut Cursor::new(&buf), true).unwrap();
        assert_eq!(tree.value, NbtValue::IntArray(vec![]));
    }

    #[test]
    fn nonempty_end_list_rejected_both_ways() {
        let tree = Nbt::unnamed(NbtValue::List(vec![NbtValue::End]));
        let mut buf = Vec::new();
        assert!(matches!(tree.write(&mut buf), Err(CodecError::EndValue)));

        // TAG_List of TAG_End, length 1.
        let bytes = [0x09, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(
            Nbt::parse(&mut Cursor::new(&bytes), false),
            Err(CodecError::EndValue)
        ));
    }

    #[test]
    fn mixed_list_rejected_on_write() {
        let tree = Nbt::unnamed(NbtValue::List(vec![
            NbtValue::Byte(1),
            NbtValue::Int(2),
        ]));
        let mut buf = Vec::new();
        assert!(matches!(tree.write(&mut buf), Err(CodecError::MixedList)));
    }

    #[test]
    fn unknown_tag_rejected() {
        let bytes = [0x0D, 0x00, 0x00];
        assert!(matches!(
            Nbt::parse(&mut Cursor::new(&bytes), true),
            Err(CodecError::UnknownTag(0x0D))
        ));
    }

    #[test]
    fn depth_limit_enforced() {
        // A compound nested past MAX_DEPTH: repeated `0x0A <name "">`.
        let mut buf = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            buf.extend_from_slice(&[0x0A, 0x00, 0x00]);
        }
        assert!(matches!(
            Nbt::parse(&mut Cursor::new(&buf), true),
            Err(CodecError::DepthLimit(MAX_DEPTH))
        ));
    }
}
