//! Superblock versions 2 and 3.
//!
//! ```text
//! [signature 8] [version] [offset size] [length size] [consistency flags]
//! [base address] [extension address] [end-of-file address]
//! [root group object header address] [lookup3 checksum]
//! ```

use crate::bytes::ByteReader;
use crate::checksum::jenkins_lookup3;
use crate::error::H5Error;
use crate::{OFFSET_SIZE, SIGNATURE, UNDEFINED_ADDRESS};

/// Encoded size of a v2/v3 superblock with 8-byte addresses.
pub const SUPERBLOCK_SIZE: usize = 48;

/// File-level metadata at the start of the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Superblock {
    /// Superblock version (2 or 3).
    pub version: u8,
    /// File consistency flags.
    pub consistency_flags: u8,
    /// Address all other addresses are relative to.
    pub base_address: u64,
    /// Superblock extension object header, or undefined.
    pub extension_address: u64,
    /// End-of-file address.
    pub eof_address: u64,
    /// Root group object header address.
    pub root_group_address: u64,
}

impl Superblock {
    /// A version 2 superblock for a file starting at byte 0.
    pub fn new(eof_address: u64, root_group_address: u64) -> Self {
        Self {
            version: 2,
            consistency_flags: 0,
            base_address: 0,
            extension_address: UNDEFINED_ADDRESS,
            eof_address,
            root_group_address,
        }
    }

    /// Encode with a trailing checksum.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SUPERBLOCK_SIZE);
        buf.extend_from_slice(&SIGNATURE);
        buf.push(self.version);
        buf.push(OFFSET_SIZE);
        buf.push(OFFSET_SIZE);
        buf.push(self.consistency_flags);
        buf.extend_from_slice(&self.base_address.to_le_bytes());
        buf.extend_from_slice(&self.extension_address.to_le_bytes());
        buf.extend_from_slice(&self.eof_address.to_le_bytes());
        buf.extend_from_slice(&self.root_group_address.to_le_bytes());
        let checksum = jenkins_lookup3(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Parse and verify the superblock at `offset`.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, H5Error> {
        let mut r = ByteReader::at(data, offset);
        if r.take(8)? != SIGNATURE {
            return Err(H5Error::SignatureNotFound);
        }
        let version = r.u8()?;
        if !matches!(version, 2 | 3) {
            return Err(H5Error::UnsupportedVersion {
                structure: "superblock",
                version,
            });
        }
        let offset_size = r.u8()?;
        let length_size = r.u8()?;
        if offset_size != OFFSET_SIZE || length_size != OFFSET_SIZE {
            return Err(H5Error::UnsupportedSizes {
                offset_size,
                length_size,
            });
        }
        let consistency_flags = r.u8()?;
        let base_address = r.u64()?;
        let extension_address = r.u64()?;
        let eof_address = r.u64()?;
        let root_group_address = r.u64()?;
        let checksum_end = r.position();
        let stored = r.u32()?;
        let computed = jenkins_lookup3(&data[offset..checksum_end]);
        if stored != computed {
            return Err(H5Error::ChecksumMismatch {
                structure: "superblock",
                stored,
                computed,
            });
        }
        Ok(Self {
            version,
            consistency_flags,
            base_address,
            extension_address,
            eof_address,
            root_group_address,
        })
    }
}

/// Find the format signature at offset 0, 512, 1024, 2048, ...
pub fn find_signature(data: &[u8]) -> Result<usize, H5Error> {
    let mut offset = 0usize;
    while offset + SIGNATURE.len() <= data.len() {
        if data[offset..offset + SIGNATURE.len()] == SIGNATURE {
            return Ok(offset);
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }
    Err(H5Error::SignatureNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_size_and_roundtrip() {
        let sb = Superblock::new(1234, SUPERBLOCK_SIZE as u64);
        let bytes = sb.encode();
        assert_eq!(bytes.len(), SUPERBLOCK_SIZE);
        assert_eq!(Superblock::parse(&bytes, 0).unwrap(), sb);
    }

    #[test]
    fn checksum_covers_every_field() {
        let bytes = Superblock::new(1234, 48).encode();
        for i in 8..SUPERBLOCK_SIZE {
            let mut corrupt = bytes.clone();
            corrupt[i] ^= 0x01;
            assert!(Superblock::parse(&corrupt, 0).is_err(), "byte {i} flip accepted");
        }
    }

    #[test]
    fn version_zero_rejected() {
        let mut bytes = Superblock::new(100, 48).encode();
        bytes[8] = 0;
        assert!(matches!(
            Superblock::parse(&bytes, 0),
            Err(H5Error::UnsupportedVersion { version: 0, .. })
        ));
    }

    #[test]
    fn four_byte_offsets_rejected() {
        let mut bytes = Superblock::new(100, 48).encode();
        bytes[9] = 4;
        assert!(matches!(
            Superblock::parse(&bytes, 0),
            Err(H5Error::UnsupportedSizes { offset_size: 4, .. })
        ));
    }

    #[test]
    fn signature_after_user_block() {
        let mut data = vec![0u8; 512];
        data.extend_from_slice(&Superblock::new(560, 48).encode());
        assert_eq!(find_signature(&data).unwrap(), 512);
        assert!(matches!(
            find_signature(&[0u8; 100]),
            Err(H5Error::SignatureNotFound)
        ));
    }
}
