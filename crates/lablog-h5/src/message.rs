//! Object header message bodies.
//!
//! Encoders emit the newest format the writer needs; parsers accept the
//! versions the C library produces for the same objects.

use crate::bytes::ByteReader;
use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::H5Error;
use crate::UNDEFINED_ADDRESS;

/// Header message type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// Padding.
    Nil,
    /// Shape of a dataset or attribute.
    Dataspace,
    /// Link storage metadata for new-style groups.
    LinkInfo,
    /// Element type.
    Datatype,
    /// Fill value and allocation policy.
    FillValue,
    /// One link in a compact group.
    Link,
    /// Where raw data lives.
    DataLayout,
    /// Group size hints for new-style groups.
    GroupInfo,
    /// One inline attribute.
    Attribute,
    /// Pointer to a continuation chunk.
    Continuation,
    /// Any other tag.
    Other(u8),
}

impl MessageType {
    /// Map a wire tag to a message type.
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            0x00 => Self::Nil,
            0x01 => Self::Dataspace,
            0x02 => Self::LinkInfo,
            0x03 => Self::Datatype,
            0x05 => Self::FillValue,
            0x06 => Self::Link,
            0x08 => Self::DataLayout,
            0x0a => Self::GroupInfo,
            0x0c => Self::Attribute,
            0x10 => Self::Continuation,
            other => Self::Other(other),
        }
    }

    /// Wire tag of this message type.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Nil => 0x00,
            Self::Dataspace => 0x01,
            Self::LinkInfo => 0x02,
            Self::Datatype => 0x03,
            Self::FillValue => 0x05,
            Self::Link => 0x06,
            Self::DataLayout => 0x08,
            Self::GroupInfo => 0x0a,
            Self::Attribute => 0x0c,
            Self::Continuation => 0x10,
            Self::Other(tag) => tag,
        }
    }
}

// ── Links ──────────────────────────────────────────────────────────

const LINK_FLAG_CREATION_ORDER: u8 = 0x04;
const LINK_FLAG_TYPE: u8 = 0x08;
const LINK_FLAG_CHARSET: u8 = 0x10;

/// A hard link from a group to a child object header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkMessage {
    /// Link name within the parent group.
    pub name: String,
    /// Address of the target object header.
    pub address: u64,
}

impl LinkMessage {
    /// Encode as a version 1 link message.
    pub fn encode(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let mut buf = Vec::with_capacity(2 + 4 + name.len() + 8);
        buf.push(1); // version
        if name.len() <= u8::MAX as usize {
            buf.push(0);
            buf.push(name.len() as u8);
        } else if name.len() <= u16::MAX as usize {
            buf.push(1);
            buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        } else {
            buf.push(2);
            buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
        }
        buf.extend_from_slice(name);
        buf.extend_from_slice(&self.address.to_le_bytes());
        buf
    }

    /// Parse a link message, accepting hard links only.
    pub fn parse(data: &[u8]) -> Result<Self, H5Error> {
        let mut r = ByteReader::new(data);
        let version = r.u8()?;
        if version != 1 {
            return Err(H5Error::UnsupportedVersion {
                structure: "link",
                version,
            });
        }
        let flags = r.u8()?;
        let link_type = if flags & LINK_FLAG_TYPE != 0 {
            r.u8()?
        } else {
            0
        };
        if flags & LINK_FLAG_CREATION_ORDER != 0 {
            r.skip(8)?;
        }
        if flags & LINK_FLAG_CHARSET != 0 {
            r.skip(1)?;
        }
        let name_len = r.uint(1 << (flags & 0x03))? as usize;
        let name = String::from_utf8(r.take(name_len)?.to_vec()).map_err(|_| {
            H5Error::UnsupportedLink {
                name: String::new(),
                detail: "link name is not UTF-8".into(),
            }
        })?;
        if link_type != 0 {
            return Err(H5Error::UnsupportedLink {
                name,
                detail: format!("link type {link_type} (only hard links are supported)"),
            });
        }
        let address = r.u64()?;
        Ok(Self { name, address })
    }
}

/// Encode a link info message for compact link storage.
pub fn encode_link_info() -> Vec<u8> {
    let mut buf = Vec::with_capacity(18);
    buf.push(0); // version
    buf.push(0); // flags: creation order neither tracked nor indexed
    buf.extend_from_slice(&UNDEFINED_ADDRESS.to_le_bytes()); // fractal heap
    buf.extend_from_slice(&UNDEFINED_ADDRESS.to_le_bytes()); // name index
    buf
}

/// Validate a link info message, rejecting dense link storage.
pub fn check_link_info(data: &[u8]) -> Result<(), H5Error> {
    let mut r = ByteReader::new(data);
    let version = r.u8()?;
    if version != 0 {
        return Err(H5Error::UnsupportedVersion {
            structure: "link info",
            version,
        });
    }
    let flags = r.u8()?;
    if flags & 0x01 != 0 {
        r.skip(8)?; // max creation index
    }
    let heap_address = r.u64()?;
    if heap_address != UNDEFINED_ADDRESS {
        return Err(H5Error::UnsupportedLink {
            name: String::new(),
            detail: "dense link storage".into(),
        });
    }
    Ok(())
}

/// Encode a group info message with default size hints.
pub fn encode_group_info() -> Vec<u8> {
    vec![0, 0]
}

/// Encode a version 3 fill value message: late allocation, no fill value.
pub fn encode_fill_value() -> Vec<u8> {
    // bits 0-1: allocation time = late; bits 2-3: write fill value if set
    vec![3, 0x0a]
}

// ── Data layout ────────────────────────────────────────────────────

/// Where a dataset's raw data is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataLayout {
    /// Raw data embedded in the layout message.
    Compact {
        /// The raw bytes.
        data: Vec<u8>,
    },
    /// Raw data in one contiguous block of the file.
    Contiguous {
        /// Block address, or [`UNDEFINED_ADDRESS`] when never allocated.
        address: u64,
        /// Block size in bytes.
        size: u64,
    },
}

impl DataLayout {
    /// Encode as a version 3 layout message.
    pub fn encode(&self) -> Result<Vec<u8>, H5Error> {
        let mut buf = Vec::with_capacity(18);
        buf.push(3); // version
        match self {
            Self::Compact { data } => {
                let size = u16::try_from(data.len())
                    .map_err(|_| H5Error::MessageTooLarge { size: data.len() })?;
                buf.push(0);
                buf.extend_from_slice(&size.to_le_bytes());
                buf.extend_from_slice(data);
            }
            Self::Contiguous { address, size } => {
                buf.push(1);
                buf.extend_from_slice(&address.to_le_bytes());
                buf.extend_from_slice(&size.to_le_bytes());
            }
        }
        Ok(buf)
    }

    /// Parse a version 3 or 4 layout message.
    pub fn parse(data: &[u8]) -> Result<Self, H5Error> {
        let mut r = ByteReader::new(data);
        let version = r.u8()?;
        if !matches!(version, 3 | 4) {
            return Err(H5Error::UnsupportedVersion {
                structure: "data layout",
                version,
            });
        }
        match r.u8()? {
            0 => {
                let size = r.u16()? as usize;
                Ok(Self::Compact {
                    data: r.take(size)?.to_vec(),
                })
            }
            1 => Ok(Self::Contiguous {
                address: r.u64()?,
                size: r.u64()?,
            }),
            class => Err(H5Error::UnsupportedLayout { class }),
        }
    }
}

// ── Attributes ─────────────────────────────────────────────────────

/// An attribute as stored in an object header.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeMessage {
    /// Attribute name.
    pub name: String,
    /// Element type.
    pub datatype: Datatype,
    /// Shape; scalar for every attribute this crate writes.
    pub dataspace: Dataspace,
    /// Raw little-endian value bytes.
    pub data: Vec<u8>,
}

fn padded8(n: usize) -> usize {
    n.div_ceil(8) * 8
}

impl AttributeMessage {
    /// Encode as a version 3 attribute message.
    pub fn encode(&self) -> Result<Vec<u8>, H5Error> {
        let name_size = self.name.len() + 1;
        let datatype = self.datatype.encode()?;
        let dataspace = self.dataspace.encode();
        let too_large = |size: usize| H5Error::MessageTooLarge { size };
        let name_field = u16::try_from(name_size).map_err(|_| too_large(name_size))?;

        let mut buf =
            Vec::with_capacity(9 + name_size + datatype.len() + dataspace.len() + self.data.len());
        buf.push(3); // version
        buf.push(0); // flags
        buf.extend_from_slice(&name_field.to_le_bytes());
        buf.extend_from_slice(&(datatype.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(dataspace.len() as u16).to_le_bytes());
        buf.push(0); // name encoding: ASCII
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(0);
        buf.extend_from_slice(&datatype);
        buf.extend_from_slice(&dataspace);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    /// Parse a version 1, 2 or 3 attribute message.
    pub fn parse(data: &[u8]) -> Result<Self, H5Error> {
        let mut r = ByteReader::new(data);
        let version = r.u8()?;
        if !(1..=3).contains(&version) {
            return Err(H5Error::UnsupportedVersion {
                structure: "attribute",
                version,
            });
        }
        let flags = r.u8()?;
        if flags & 0x03 != 0 {
            return Err(H5Error::UnsupportedDatatype {
                detail: "shared attribute datatype or dataspace".into(),
            });
        }
        let name_size = r.u16()? as usize;
        let datatype_size = r.u16()? as usize;
        let dataspace_size = r.u16()? as usize;
        if version == 3 {
            r.skip(1)?; // name encoding
        }
        let pad = |n: usize| if version == 1 { padded8(n) } else { n };

        let name_bytes = r.take(pad(name_size))?;
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len().min(name_size));
        let name = String::from_utf8(name_bytes[..name_end].to_vec()).map_err(|_| {
            H5Error::InvalidName {
                name: String::from_utf8_lossy(&name_bytes[..name_end]).into_owned(),
                reason: "attribute name is not UTF-8",
            }
        })?;

        let datatype_bytes = r.take(pad(datatype_size))?;
        let (datatype, _) = Datatype::parse(datatype_bytes)?;
        let dataspace = Dataspace::parse(r.take(pad(dataspace_size))?)?;

        let len = dataspace
            .element_count()
            .and_then(|n| n.checked_mul(datatype.size() as u64))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| H5Error::InvalidShape {
                detail: format!("attribute {name:?} size overflows"),
            })?;
        let data = r.take(len)?.to_vec();

        Ok(Self {
            name,
            datatype,
            dataspace,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_tags_are_stable() {
        for tag in 0u8..=0x20 {
            assert_eq!(MessageType::from_u8(tag).to_u8(), tag);
        }
        assert_eq!(MessageType::from_u8(0x0c), MessageType::Attribute);
    }

    #[test]
    fn short_link_uses_one_byte_length() {
        let link = LinkMessage {
            name: "important_data".into(),
            address: 0x30,
        };
        let bytes = link.encode();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2] as usize, "important_data".len());
        assert_eq!(bytes.len(), 3 + 14 + 8);
        assert_eq!(LinkMessage::parse(&bytes).unwrap(), link);
    }

    #[test]
    fn long_link_name_widens_length_field() {
        let link = LinkMessage {
            name: "n".repeat(300),
            address: 7,
        };
        let bytes = link.encode();
        assert_eq!(bytes[1] & 0x03, 1);
        assert_eq!(LinkMessage::parse(&bytes).unwrap(), link);
    }

    #[test]
    fn soft_link_rejected_with_name() {
        let mut bytes = vec![1, LINK_FLAG_TYPE, 1, 3];
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(&[0, 0]);
        match LinkMessage::parse(&bytes) {
            Err(H5Error::UnsupportedLink { name, .. }) => assert_eq!(name, "abc"),
            other => panic!("expected UnsupportedLink, got {other:?}"),
        }
    }

    #[test]
    fn dense_link_info_rejected() {
        let mut bytes = encode_link_info();
        check_link_info(&bytes).unwrap();
        bytes[2..10].copy_from_slice(&0x100u64.to_le_bytes());
        assert!(matches!(
            check_link_info(&bytes),
            Err(H5Error::UnsupportedLink { .. })
        ));
    }

    #[test]
    fn contiguous_layout_is_eighteen_bytes() {
        let layout = DataLayout::Contiguous {
            address: 0x200,
            size: 36,
        };
        let bytes = layout.encode().unwrap();
        assert_eq!(bytes.len(), 18);
        assert_eq!(DataLayout::parse(&bytes).unwrap(), layout);
    }

    #[test]
    fn chunked_layout_rejected() {
        assert!(matches!(
            DataLayout::parse(&[3, 2, 0, 0]),
            Err(H5Error::UnsupportedLayout { class: 2 })
        ));
    }

    #[test]
    fn attribute_v3_layout() {
        let attr = AttributeMessage {
            name: "mean".into(),
            datatype: Datatype::F32,
            dataspace: Dataspace::Scalar,
            data: 42.05f32.to_le_bytes().to_vec(),
        };
        let bytes = attr.encode().unwrap();
        // header(9) + "mean\0"(5) + datatype(20) + dataspace(4) + value(4)
        assert_eq!(bytes.len(), 9 + 5 + 20 + 4 + 4);
        assert_eq!(AttributeMessage::parse(&bytes).unwrap(), attr);
    }

    #[test]
    fn attribute_v1_padding() {
        let datatype = Datatype::I32.encode().unwrap();
        let dataspace = Dataspace::Scalar.encode();
        let mut bytes = vec![1, 0];
        bytes.extend_from_slice(&3u16.to_le_bytes()); // "ab\0"
        bytes.extend_from_slice(&(datatype.len() as u16).to_le_bytes());
        bytes.extend_from_slice(&(dataspace.len() as u16).to_le_bytes());
        bytes.extend_from_slice(b"ab\0\0\0\0\0\0");
        bytes.extend_from_slice(&datatype);
        bytes.resize(bytes.len() + padded8(datatype.len()) - datatype.len(), 0);
        bytes.extend_from_slice(&dataspace);
        bytes.resize(bytes.len() + padded8(dataspace.len()) - dataspace.len(), 0);
        bytes.extend_from_slice(&(-5i32).to_le_bytes());

        let attr = AttributeMessage::parse(&bytes).unwrap();
        assert_eq!(attr.name, "ab");
        assert_eq!(attr.datatype, Datatype::I32);
        assert_eq!(attr.data, (-5i32).to_le_bytes());
    }

    #[test]
    fn truncated_attribute_is_error() {
        let attr = AttributeMessage {
            name: "x".into(),
            datatype: Datatype::F64,
            dataspace: Dataspace::Scalar,
            data: 1.0f64.to_le_bytes().to_vec(),
        };
        let bytes = attr.encode().unwrap();
        assert!(AttributeMessage::parse(&bytes[..bytes.len() - 1]).is_err());
    }
}
