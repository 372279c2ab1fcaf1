//! Play state. Not implemented in the core: the dispatch tables exist but
//! are empty, so every id reads as unknown and there is nothing to write.

use std::io::{Read, Write};

use crate::network::{PacketReader, ProtocolError, Result, read_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerboundPlay {}

impl ServerboundPlay {
    /// Consumes one whole frame and reports its id as unknown.
    pub fn read<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<Self> {
        read_frame(r, scratch)?;
        let mut reader = PacketReader::new(scratch);
        let id = reader.read_varint()?;
        Err(ProtocolError::UnknownPacket { state: "play", id })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientboundPlay {}

impl ClientboundPlay {
    pub fn write<W: Write>(&self, _w: &mut W) -> Result<()> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::network::write_packet;

    #[test]
    fn every_serverbound_id_is_unknown() {
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x15, &[1, 2, 3]).unwrap();
        let mut scratch = Vec::new();
        assert!(matches!(
            ServerboundPlay::read(&mut Cursor::new(&stream[..]), &mut scratch),
            Err(ProtocolError::UnknownPacket { state: "play", id: 0x15 })
        ));
    }
}
