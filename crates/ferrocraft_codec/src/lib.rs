//! Wire-format building blocks for Minecraft Java Edition protocol 765.
//!
//! Everything here is transport-agnostic: functions take `std::io::Read` /
//! `std::io::Write` and know nothing about sockets, framing policy, or
//! packet ids. Fixed-width numbers are big-endian throughout, including
//! inside NBT payloads.

pub mod bitpack;
pub mod nbt;
pub mod snbt;
pub mod wire;

use thiserror::Error;

/// Errors shared by the wire and NBT codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A VarNum ran past its maximum encoded width.
    #[error("VarNum longer than {max} bytes")]
    Overlong { max: usize },

    /// A declared length cannot be represented in the destination type.
    #[error("length {len} does not fit the destination type")]
    LengthOverflow { len: i64 },

    #[error("unknown NBT tag {0:#04x}")]
    UnknownTag(u8),

    /// TAG_End used where a real value is required (compound entry, or the
    /// element tag of a non-empty list).
    #[error("TAG_End cannot appear as a value")]
    EndValue,

    #[error("list elements do not share a single tag")]
    MixedList,

    #[error("NBT tree deeper than {0} levels")]
    DepthLimit(usize),
}

pub type Result<T> = std::result::Result<T, CodecError>;
