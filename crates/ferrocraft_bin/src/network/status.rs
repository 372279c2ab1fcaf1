//! Status state: server-list ping. The response JSON carries version,
//! player counts, MOTD and the optional favicon data URI.

use std::io::{Read, Write};

use serde::Serialize;

use crate::network::{PacketReader, PacketWriter, ProtocolError, Result, read_frame, write_packet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerboundStatus {
    StatusRequest,
    PingRequest { payload: i64 },
}

impl ServerboundStatus {
    pub fn read<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<Self> {
        read_frame(r, scratch)?;
        let mut reader = PacketReader::new(scratch);

        match reader.read_varint()? {
            0x00 => Ok(Self::StatusRequest),
            0x01 => Ok(Self::PingRequest {
                payload: reader.read_i64()?,
            }),
            id => Err(ProtocolError::UnknownPacket { state: "status", id }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientboundStatus {
    StatusResponse { json: String },
    PingResponse { payload: i64 },
}

impl ClientboundStatus {
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            Self::StatusResponse { json } => {
                let mut body = PacketWriter::new();
                body.write_string(json);
                write_packet(w, 0x00, &body.finish())
            }
            Self::PingResponse { payload } => {
                let mut body = PacketWriter::new();
                body.write_i64(*payload);
                write_packet(w, 0x01, &body.finish())
            }
        }
    }
}

/// The status response document. `favicon` may be the empty string.
#[derive(Debug, Serialize)]
pub struct StatusDocument {
    pub version:     StatusVersion,
    pub players:     StatusPlayers,
    pub description: StatusDescription,
    pub favicon:     String,
}

#[derive(Debug, Serialize)]
pub struct StatusVersion {
    pub name:     &'static str,
    pub protocol: i32,
}

#[derive(Debug, Serialize)]
pub struct StatusPlayers {
    pub max:    u32,
    pub online: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusDescription {
    pub text: String,
}
