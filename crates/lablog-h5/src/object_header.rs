//! Version 2 object headers (`OHDR`).
//!
//! ```text
//! "OHDR" [version=2] [flags] [chunk0 size: 1/2/4/8 bytes]
//! { [type u8] [size u16] [flags u8] [body] }*  [gap < 4 bytes]
//! [lookup3 checksum u32]
//! ```

use crate::bytes::ByteReader;
use crate::checksum::jenkins_lookup3;
use crate::error::H5Error;
use crate::message::MessageType;

const SIGNATURE: &[u8; 4] = b"OHDR";
const VERSION: u8 = 2;

const FLAG_CREATION_ORDER: u8 = 0x04;
const FLAG_PHASE_CHANGE: u8 = 0x10;
const FLAG_TIMES: u8 = 0x20;

/// Message flag: the message must be understood to open the object.
const MSG_FLAG_FAIL_IF_UNKNOWN: u8 = 0x80;

/// Message flag: the message body never changes.
pub const MSG_FLAG_CONSTANT: u8 = 0x01;

/// Collects messages and serializes them as one checksummed v2 header.
#[derive(Default)]
pub struct ObjectHeaderWriter {
    messages: Vec<(MessageType, Vec<u8>, u8)>,
}

impl ObjectHeaderWriter {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message with no flags.
    pub fn add_message(&mut self, msg_type: MessageType, data: Vec<u8>) {
        self.messages.push((msg_type, data, 0));
    }

    /// Add a message with explicit message flags.
    pub fn add_message_with_flags(&mut self, msg_type: MessageType, data: Vec<u8>, flags: u8) {
        self.messages.push((msg_type, data, flags));
    }

    /// Serialize signature, messages and checksum.
    pub fn serialize(&self) -> Result<Vec<u8>, H5Error> {
        let mut body_len = 0usize;
        for (_, data, _) in &self.messages {
            if data.len() > u16::MAX as usize {
                return Err(H5Error::MessageTooLarge { size: data.len() });
            }
            body_len += 4 + data.len();
        }

        let (flags, width) = if body_len <= u8::MAX as usize {
            (0x00u8, 1usize)
        } else if body_len <= u16::MAX as usize {
            (0x01, 2)
        } else {
            (0x02, 4)
        };

        let mut buf = Vec::with_capacity(6 + width + body_len + 4);
        buf.extend_from_slice(SIGNATURE);
        buf.push(VERSION);
        buf.push(flags);
        buf.extend_from_slice(&(body_len as u64).to_le_bytes()[..width]);
        for (msg_type, data, msg_flags) in &self.messages {
            buf.push(msg_type.to_u8());
            buf.extend_from_slice(&(data.len() as u16).to_le_bytes());
            buf.push(*msg_flags);
            buf.extend_from_slice(data);
        }
        let checksum = jenkins_lookup3(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        Ok(buf)
    }
}

/// One message read from an object header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderMessage {
    /// Message type.
    pub msg_type: MessageType,
    /// Message flags byte.
    pub flags: u8,
    /// Message body.
    pub data: Vec<u8>,
}

/// A parsed, checksum-verified v2 object header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Messages in file order, excluding NIL padding.
    pub messages: Vec<HeaderMessage>,
    /// Total bytes occupied by the header including its checksum.
    pub size: usize,
}

impl ObjectHeader {
    /// Parse the header starting at byte `offset` of `data`.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, H5Error> {
        let mut r = ByteReader::at(data, offset);
        let signature = r.take(4)?;
        if signature != SIGNATURE {
            // v1 headers start with their version byte instead of a signature.
            if signature[0] == 1 {
                return Err(H5Error::UnsupportedVersion {
                    structure: "object header",
                    version: 1,
                });
            }
            return Err(H5Error::InvalidSignature {
                structure: "object header",
            });
        }
        let version = r.u8()?;
        if version != VERSION {
            return Err(H5Error::UnsupportedVersion {
                structure: "object header",
                version,
            });
        }
        let flags = r.u8()?;
        if flags & FLAG_TIMES != 0 {
            r.skip(16)?;
        }
        if flags & FLAG_PHASE_CHANGE != 0 {
            r.skip(4)?;
        }
        let chunk_len = r.uint(1 << (flags & 0x03))?;
        let chunk_len = usize::try_from(chunk_len).map_err(|_| H5Error::UnexpectedEof {
            expected: usize::MAX,
            available: data.len(),
        })?;
        let chunk = r.take(chunk_len)?;
        let checksum_end = r.position();
        let stored = r.u32()?;
        let computed = jenkins_lookup3(&data[offset..checksum_end]);
        if stored != computed {
            return Err(H5Error::ChecksumMismatch {
                structure: "object header",
                stored,
                computed,
            });
        }

        let prefix = if flags & FLAG_CREATION_ORDER != 0 { 6 } else { 4 };
        let mut messages = Vec::new();
        let mut m = ByteReader::new(chunk);
        while m.remaining() >= prefix {
            let msg_type = MessageType::from_u8(m.u8()?);
            let size = m.u16()? as usize;
            let msg_flags = m.u8()?;
            if prefix == 6 {
                m.skip(2)?;
            }
            let body = m.take(size)?;
            match msg_type {
                MessageType::Nil => continue,
                MessageType::Continuation => {
                    return Err(H5Error::UnsupportedMessage {
                        msg_type: msg_type.to_u8(),
                    })
                }
                MessageType::Other(tag) if msg_flags & MSG_FLAG_FAIL_IF_UNKNOWN != 0 => {
                    return Err(H5Error::UnsupportedMessage { msg_type: tag })
                }
                _ => {}
            }
            messages.push(HeaderMessage {
                msg_type,
                flags: msg_flags,
                data: body.to_vec(),
            });
        }

        Ok(Self {
            messages,
            size: r.position() - offset,
        })
    }

    /// All messages of one type, in file order.
    pub fn messages_of(&self, msg_type: MessageType) -> impl Iterator<Item = &HeaderMessage> {
        self.messages.iter().filter(move |m| m.msg_type == msg_type)
    }

    /// The first message of one type.
    pub fn first(&self, msg_type: MessageType) -> Option<&HeaderMessage> {
        self.messages_of(msg_type).next()
    }

    /// Whether any message of this type is present.
    pub fn has(&self, msg_type: MessageType) -> bool {
        self.first(msg_type).is_some()
    }
}
