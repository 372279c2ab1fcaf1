//! Configuration state. The core serves only the clientbound disconnect;
//! no serverbound variant is handled, so every incoming id is unknown.

use std::io::{Read, Write};

use crate::network::{PacketReader, PacketWriter, ProtocolError, Result, read_frame, write_packet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerboundConfiguration {}

impl ServerboundConfiguration {
    /// Consumes one whole frame and reports its id as unknown.
    pub fn read<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<Self> {
        read_frame(r, scratch)?;
        let mut reader = PacketReader::new(scratch);
        let id = reader.read_varint()?;
        Err(ProtocolError::UnknownPacket {
            state: "configuration",
            id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientboundConfiguration {
    Disconnect { reason: String },
}

impl ClientboundConfiguration {
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            Self::Disconnect { reason } => {
                let mut body = PacketWriter::new();
                body.write_string(reason);
                write_packet(w, 0x01, &body.finish())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ferrocraft_codec::wire;

    use super::*;

    #[test]
    fn every_serverbound_id_is_unknown() {
        for id in [0x00, 0x01, 0x07] {
            let mut stream = Vec::new();
            write_packet(&mut stream, id, &[0xAA]).unwrap();
            let mut scratch = Vec::new();
            let err =
                ServerboundConfiguration::read(&mut Cursor::new(&stream[..]), &mut scratch)
                    .unwrap_err();
            assert!(matches!(
                err,
                ProtocolError::UnknownPacket {
                    state: "configuration",
                    ..
                }
            ));
        }
    }

    #[test]
    fn disconnect_uses_id_one() {
        let mut stream = Vec::new();
        ClientboundConfiguration::Disconnect {
            reason: String::from(r#"{"text":"Unimplemented"}"#),
        }
        .write(&mut stream)
        .unwrap();

        let mut cursor = Cursor::new(&stream[..]);
        let _len = wire::read_varint(&mut cursor).unwrap();
        assert_eq!(wire::read_varint(&mut cursor).unwrap(), 0x01);
        assert_eq!(
            wire::read_string(&mut cursor).unwrap(),
            br#"{"text":"Unimplemented"}"#
        );
    }
}
