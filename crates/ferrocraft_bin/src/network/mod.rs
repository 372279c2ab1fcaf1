#![allow(dead_code)]

//! Packet layer for protocol 765: framing, cursor/writer plumbing and the
//! per-state packet sum types.
//!
//! Every frame is a length VarInt counting the id VarInt plus payload.
//! Reads copy exactly the declared byte count into the session's scratch
//! buffer, so a decoder that stops early still leaves the stream on the
//! next packet boundary. Writes assemble the whole packet first and push it
//! with a single `write_all`.

pub mod configuration;
pub mod handshake;
pub mod login;
pub mod play;
pub mod status;

use std::io::{Cursor, Read, Write};

use bytes::{BufMut, BytesMut};
use ferrocraft_codec::{CodecError, wire};
use thiserror::Error;
use uuid::Uuid;

use crate::consts::MAX_FRAME_BYTES;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {len} bytes exceeds the {max}-byte limit")]
    FrameTooLarge { len: i32, max: usize },

    #[error("unknown {state} packet id {id:#04x}")]
    UnknownPacket { state: &'static str, id: i32 },

    #[error("handshake next-state {0} is neither status nor login")]
    InvalidNextState(i32),

    /// Pre-Netty server-list ping; the connection closes without a reply.
    #[error("legacy client ping")]
    LegacyClient,

    /// Graceful end of the session: peer close after ping-response, or a
    /// server-initiated disconnect. Not a failure.
    #[error("session disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Reads one length-prefixed frame into `scratch` (cleared first).
pub fn read_frame<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<()> {
    let len = wire::read_varint(r)?;
    fill_frame(r, len, scratch)
}

/// Finishes a VarInt whose first byte was already consumed (the handshake
/// path peeks it for the legacy sentinel).
pub(crate) fn resume_varint<R: Read>(first: u8, r: &mut R) -> Result<i32> {
    if first & 0x80 == 0 {
        return Ok(i32::from(first));
    }
    let mut result = u32::from(first & 0x7F);
    let mut shift: u32 = 7;
    loop {
        let b = wire::read_u8(r)?;
        result |= u32::from(b & 0x7F) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 7 * wire::VARINT_MAX_BYTES as u32 {
            return Err(CodecError::Overlong {
                max: wire::VARINT_MAX_BYTES,
            }
            .into());
        }
    }
    Ok(result as i32)
}

pub(crate) fn fill_frame<R: Read>(r: &mut R, len: i32, scratch: &mut Vec<u8>) -> Result<()> {
    if len < 0 || len as usize > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_BYTES,
        });
    }
    scratch.clear();
    scratch.resize(len as usize, 0);
    r.read_exact(scratch)?;
    Ok(())
}

/// Frames and sends one whole packet: length VarInt (id + payload), id
/// VarInt, payload.
pub fn write_packet<W: Write>(w: &mut W, id: i32, body: &[u8]) -> Result<()> {
    let len = wire::varint_len(id) + body.len();
    let mut frame = BytesMut::with_capacity(wire::varint_len(len as i32) + len);
    frame.put_slice(&wire::varint_bytes(len as i32));
    frame.put_slice(&wire::varint_bytes(id));
    frame.put_slice(body);
    w.write_all(&frame)?;
    w.flush()?;
    Ok(())
}

/// Cursor over one frame's bytes. String reads are lossy UTF-8; consumers
/// needing strict validation work on the raw bytes.
pub struct PacketReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> PacketReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn read_varint(&mut self) -> Result<i32> {
        Ok(wire::read_varint(&mut self.cursor)?)
    }

    pub fn read_varlong(&mut self) -> Result<i64> {
        Ok(wire::read_varlong(&mut self.cursor)?)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = wire::read_string(&mut self.cursor)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn read_string_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(wire::read_string(&mut self.cursor)?)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(wire::read_u8(&mut self.cursor)?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(wire::read_u16(&mut self.cursor)?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(wire::read_i64(&mut self.cursor)?)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(wire::read_bool(&mut self.cursor)?)
    }

    pub fn read_uuid(&mut self) -> Result<Uuid> {
        Ok(wire::read_uuid(&mut self.cursor)?)
    }

    /// Everything left in the frame, consumed.
    #[must_use]
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let pos = self.cursor.position() as usize;
        let rest = self.cursor.get_ref()[pos..].to_vec();
        self.cursor.set_position(self.cursor.get_ref().len() as u64);
        rest
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len() - self.cursor.position() as usize
    }
}

/// Builds a packet body in memory; writes are infallible.
pub struct PacketWriter {
    data: BytesMut,
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
        }
    }

    pub fn write_varint(&mut self, value: i32) {
        self.data.put_slice(&wire::varint_bytes(value));
    }

    pub fn write_varlong(&mut self, value: i64) {
        self.data.put_slice(&wire::varlong_bytes(value));
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_varint(value.len() as i32);
        self.data.put_slice(value.as_bytes());
    }

    pub fn write_string_bytes(&mut self, value: &[u8]) {
        self.write_varint(value.len() as i32);
        self.data.put_slice(value);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.put_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(u8::from(value));
    }

    pub fn write_uuid(&mut self, uuid: &Uuid) {
        self.data.put_slice(uuid.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    #[must_use]
    pub fn finish(self) -> BytesMut {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let mut body = PacketWriter::new();
        body.write_string("hello");
        body.write_i64(-9);

        let mut stream = Vec::new();
        write_packet(&mut stream, 0x2A, &body.finish()).unwrap();

        let mut cursor = Cursor::new(&stream[..]);
        let mut scratch = Vec::new();
        read_frame(&mut cursor, &mut scratch).unwrap();
        assert_eq!(cursor.position() as usize, stream.len());

        let mut reader = PacketReader::new(&scratch);
        assert_eq!(reader.read_varint().unwrap(), 0x2A);
        assert_eq!(reader.read_string().unwrap(), "hello");
        assert_eq!(reader.read_i64().unwrap(), -9);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut stream = Vec::new();
        wire::write_varint(&mut stream, (MAX_FRAME_BYTES + 1) as i32).unwrap();
        let mut scratch = Vec::new();
        assert!(matches!(
            read_frame(&mut Cursor::new(&stream[..]), &mut scratch),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn truncated_frame_is_io_error() {
        let mut stream = Vec::new();
        wire::write_varint(&mut stream, 10).unwrap();
        stream.extend_from_slice(&[1, 2, 3]); // three of ten declared bytes
        let mut scratch = Vec::new();
        assert!(matches!(
            read_frame(&mut Cursor::new(&stream[..]), &mut scratch),
            Err(ProtocolError::Io(_))
        ));
    }

    #[test]
    fn resume_varint_completes_split_reads() {
        let bytes = wire::varint_bytes(25565);
        let mut rest = Cursor::new(&bytes[1..]);
        assert_eq!(resume_varint(bytes[0], &mut rest).unwrap(), 25565);

        let single = wire::varint_bytes(5);
        assert_eq!(resume_varint(single[0], &mut Cursor::new(&[][..])).unwrap(), 5);
    }
}
