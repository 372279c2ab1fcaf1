//! Login state, serverbound ids 0x00..=0x03 and clientbound 0x00..=0x04.
//!
//! Encryption and compression negotiation are parsed but not acted on in
//! offline mode; login_success always carries an empty property list.

use std::io::{Read, Write};

use uuid::Uuid;

use crate::network::{PacketReader, PacketWriter, ProtocolError, Result, read_frame, write_packet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerboundLogin {
    LoginStart {
        name: String,
        uuid: Uuid,
    },
    EncryptionResponse {
        shared_secret: Vec<u8>,
        verify_token:  Vec<u8>,
    },
    LoginPluginResponse {
        message_id: i32,
        data:       Option<Vec<u8>>,
    },
    LoginAcknowledged,
}

impl ServerboundLogin {
    pub fn read<R: Read>(r: &mut R, scratch: &mut Vec<u8>) -> Result<Self> {
        read_frame(r, scratch)?;
        let mut reader = PacketReader::new(scratch);

        match reader.read_varint()? {
            0x00 => Ok(Self::LoginStart {
                name: reader.read_string()?,
                uuid: reader.read_uuid()?,
            }),
            0x01 => Ok(Self::EncryptionResponse {
                shared_secret: reader.read_string_bytes()?,
                verify_token:  reader.read_string_bytes()?,
            }),
            0x02 => {
                let message_id = reader.read_varint()?;
                let data = if reader.read_bool()? {
                    Some(reader.read_remaining())
                } else {
                    None
                };
                Ok(Self::LoginPluginResponse { message_id, data })
            }
            0x03 => Ok(Self::LoginAcknowledged),
            id => Err(ProtocolError::UnknownPacket { state: "login", id }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientboundLogin {
    Disconnect {
        reason: String,
    },
    EncryptionRequest {
        server_id:    String,
        public_key:   Vec<u8>,
        verify_token: Vec<u8>,
    },
    /// The property list is fixed at zero entries.
    LoginSuccess {
        uuid:     Uuid,
        username: String,
    },
    SetCompression {
        threshold: i32,
    },
    LoginPluginRequest {
        message_id: i32,
        channel:    String,
        data:       Vec<u8>,
    },
}

impl ClientboundLogin {
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self {
            Self::Disconnect { reason } => {
                let mut body = PacketWriter::new();
                body.write_string(reason);
                write_packet(w, 0x00, &body.finish())
            }
            Self::EncryptionRequest {
                server_id,
                public_key,
                verify_token,
            } => {
                let mut body = PacketWriter::new();
                body.write_string(server_id);
                body.write_string_bytes(public_key);
                body.write_string_bytes(verify_token);
                write_packet(w, 0x01, &body.finish())
            }
            Self::LoginSuccess { uuid, username } => {
                let mut body = PacketWriter::new();
                body.write_uuid(uuid);
                body.write_string(username);
                body.write_varint(0); // property count
                write_packet(w, 0x02, &body.finish())
            }
            Self::SetCompression { threshold } => {
                let mut body = PacketWriter::new();
                body.write_varint(*threshold);
                write_packet(w, 0x03, &body.finish())
            }
            Self::LoginPluginRequest {
                message_id,
                channel,
                data,
            } => {
                let mut body = PacketWriter::new();
                body.write_varint(*message_id);
                body.write_string(channel);
                body.write_bytes(data);
                write_packet(w, 0x04, &body.finish())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ferrocraft_codec::wire;

    use super::*;

    fn read_back(stream: &[u8]) -> ServerboundLogin {
        let mut scratch = Vec::new();
        ServerboundLogin::read(&mut Cursor::new(stream), &mut scratch).unwrap()
    }

    #[test]
    fn login_start_roundtrip() {
        let uuid = wire::uuid_v3(b"Notch");
        let mut body = PacketWriter::new();
        body.write_string("Notch");
        body.write_uuid(&uuid);

        let mut stream = Vec::new();
        write_packet(&mut stream, 0x00, &body.finish()).unwrap();

        assert_eq!(read_back(&stream), ServerboundLogin::LoginStart {
            name: String::from("Notch"),
            uuid,
        });
    }

    #[test]
    fn plugin_response_optional_data() {
        let mut body = PacketWriter::new();
        body.write_varint(7);
        body.write_bool(true);
        body.write_bytes(&[1, 2, 3]);
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x02, &body.finish()).unwrap();
        assert_eq!(read_back(&stream), ServerboundLogin::LoginPluginResponse {
            message_id: 7,
            data:       Some(vec![1, 2, 3]),
        });

        let mut body = PacketWriter::new();
        body.write_varint(7);
        body.write_bool(false);
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x02, &body.finish()).unwrap();
        assert_eq!(read_back(&stream), ServerboundLogin::LoginPluginResponse {
            message_id: 7,
            data:       None,
        });
    }

    #[test]
    fn acknowledged_is_empty() {
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x03, &[]).unwrap();
        assert_eq!(read_back(&stream), ServerboundLogin::LoginAcknowledged);
    }

    #[test]
    fn login_success_wire_shape() {
        let uuid = wire::uuid_v3(b"Notch");
        let mut stream = Vec::new();
        ClientboundLogin::LoginSuccess {
            uuid,
            username: String::from("Notch"),
        }
        .write(&mut stream)
        .unwrap();

        let mut cursor = Cursor::new(&stream[..]);
        let len = wire::read_varint(&mut cursor).unwrap();
        assert_eq!(len as usize, stream.len() - 1);
        assert_eq!(wire::read_varint(&mut cursor).unwrap(), 0x02);
        assert_eq!(wire::read_uuid(&mut cursor).unwrap(), uuid);
        assert_eq!(wire::read_string(&mut cursor).unwrap(), b"Notch");
        assert_eq!(wire::read_varint(&mut cursor).unwrap(), 0);
        assert_eq!(cursor.position() as usize, stream.len());
    }

    #[test]
    fn unknown_id_rejected() {
        let mut stream = Vec::new();
        write_packet(&mut stream, 0x04, &[]).unwrap();
        let mut scratch = Vec::new();
        assert!(matches!(
            ServerboundLogin::read(&mut Cursor::new(&stream[..]), &mut scratch),
            Err(ProtocolError::UnknownPacket { state: "login", id: 0x04 })
        ));
    }
}
