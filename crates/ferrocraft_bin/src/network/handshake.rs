//! Handshake state. Serverbound only: the intention packet, plus the
//! pre-Netty `0xFE` ping probe that never carries a real frame.

use std::io::Read;

use crate::network::{PacketReader, ProtocolError, Result, fill_frame, resume_varint};

use ferrocraft_codec::wire;

/// First byte a pre-1.7 client sends instead of a frame length.
pub const LEGACY_PING_BYTE: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerboundHandshake {
    Handshake {
        protocol_version: i32,
        server_address:   String,
        server_port:      u16,
        next_state:       NextState,
    },
    /// Legacy server-list ping; the caller closes the connection.
    Legacy,
}

impl ServerboundHandshake {
    pub fn read<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<Self> {
        let first = wire::read_u8(r)?;
        if first == LEGACY_PING_BYTE {
            return Ok(Self::Legacy);
        }

        let len = resume_varint(first, r)?;
        fill_frame(r, len, scratch)?;
        let mut reader = PacketReader::new(scratch);

        match reader.read_varint()? {
            0x00 => {
                let protocol_version = reader.read_varint()?;
                let server_address = reader.read_string()?;
                let server_port = reader.read_u16()?;
                let next_state = match reader.read_varint()? {
                    1 => NextState::Status,
                    2 => NextState::Login,
                    other => return Err(ProtocolError::InvalidNextState(other)),
                };
                Ok(Self::Handshake {
                    protocol_version,
                    server_address,
                    server_port,
                    next_state,
                })
            }
            id => Err(ProtocolError::UnknownPacket {
                state: "handshake",
                id,
            }),
        }
    }
}
