//! Lays out a [`Group`] tree and serializes it as an HDF5 file.
//!
//! Layout is computed in two passes. Every message the writer emits has a
//! fixed width once the tree is known, so the first pass sizes each object
//! header with placeholder addresses, and the second pass serializes with
//! the real ones.
//!
//! ```text
//! 0                    48
//! [superblock v2]      [root OHDR][child OHDRs, depth-first]...[raw data]...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::H5Error;
use crate::message::{
    encode_fill_value, encode_group_info, encode_link_info, DataLayout, LinkMessage, MessageType,
};
use crate::model::{Attributes, Dataset, Group, Node};
use crate::object_header::{ObjectHeaderWriter, MSG_FLAG_CONSTANT};
use crate::superblock::{Superblock, SUPERBLOCK_SIZE};
use crate::UNDEFINED_ADDRESS;

/// One object in depth-first order.
enum Planned<'a> {
    Group {
        group: &'a Group,
        /// Link name and index of the target object.
        links: Vec<(&'a str, usize)>,
    },
    Dataset(&'a Dataset),
}

fn plan<'a>(group: &'a Group, objects: &mut Vec<Planned<'a>>) -> usize {
    let index = objects.len();
    objects.push(Planned::Group {
        group,
        links: Vec::with_capacity(group.len()),
    });
    let mut links = Vec::with_capacity(group.len());
    for (name, node) in group.members() {
        let child = match node {
            Node::Group(g) => plan(g, objects),
            Node::Dataset(d) => {
                objects.push(Planned::Dataset(d));
                objects.len() - 1
            }
        };
        links.push((name, child));
    }
    if let Planned::Group { links: slot, .. } = &mut objects[index] {
        *slot = links;
    }
    index
}

fn add_attributes(header: &mut ObjectHeaderWriter, attrs: &Attributes) -> Result<(), H5Error> {
    for (name, value) in attrs {
        header.add_message(MessageType::Attribute, value.to_message(name)?.encode()?);
    }
    Ok(())
}

/// Serializes a group tree into HDF5 bytes.
pub struct FileWriter<'a> {
    root: &'a Group,
}

impl<'a> FileWriter<'a> {
    /// A writer for the tree rooted at `root`.
    pub fn new(root: &'a Group) -> Self {
        Self { root }
    }

    fn encode_object(
        object: &Planned<'_>,
        header_addrs: &[u64],
        data_address: u64,
    ) -> Result<Vec<u8>, H5Error> {
        let mut header = ObjectHeaderWriter::new();
        match object {
            Planned::Group { group, links } => {
                header.add_message(MessageType::LinkInfo, encode_link_info());
                header.add_message(MessageType::GroupInfo, encode_group_info());
                for &(name, target) in links {
                    let link = LinkMessage {
                        name: name.to_owned(),
                        address: header_addrs[target],
                    };
                    header.add_message(MessageType::Link, link.encode());
                }
                add_attributes(&mut header, group.attrs())?;
            }
            Planned::Dataset(ds) => {
                header.add_message_with_flags(
                    MessageType::Datatype,
                    ds.datatype().encode()?,
                    MSG_FLAG_CONSTANT,
                );
                header.add_message(MessageType::Dataspace, ds.dataspace().encode());
                header.add_message_with_flags(
                    MessageType::FillValue,
                    encode_fill_value(),
                    MSG_FLAG_CONSTANT,
                );
                let layout = DataLayout::Contiguous {
                    address: data_address,
                    size: ds.raw().len() as u64,
                };
                header.add_message(MessageType::DataLayout, layout.encode()?);
                add_attributes(&mut header, ds.attrs())?;
            }
        }
        header.serialize()
    }

    /// Serialize the whole file into memory.
    ///
    /// # Errors
    ///
    /// Fails if an attribute or header message cannot be encoded, for
    /// example a group with so many links that one header exceeds the
    /// supported size.
    pub fn to_bytes(&self) -> Result<Vec<u8>, H5Error> {
        let mut objects = Vec::new();
        plan(self.root, &mut objects);

        // Pass 1: sizes with placeholder addresses.
        let placeholders = vec![0u64; objects.len()];
        let mut header_addrs = Vec::with_capacity(objects.len());
        let mut cursor = SUPERBLOCK_SIZE as u64;
        for object in &objects {
            let size = Self::encode_object(object, &placeholders, 0)?.len() as u64;
            header_addrs.push(cursor);
            cursor += size;
        }
        let mut data_addrs = Vec::with_capacity(objects.len());
        for object in &objects {
            let addr = match object {
                Planned::Dataset(ds) if !ds.is_empty() => {
                    let addr = cursor;
                    cursor += ds.raw().len() as u64;
                    addr
                }
                _ => UNDEFINED_ADDRESS,
            };
            data_addrs.push(addr);
        }
        let eof = cursor;

        // Pass 2: real addresses.
        let mut buf = Vec::with_capacity(eof as usize);
        buf.extend_from_slice(&Superblock::new(eof, header_addrs[0]).encode());
        for (i, object) in objects.iter().enumerate() {
            debug_assert_eq!(buf.len() as u64, header_addrs[i]);
            let header = Self::encode_object(object, &header_addrs, data_addrs[i])?;
            log::debug!(
                "object {i} at {:#x}: {} header bytes",
                header_addrs[i],
                header.len()
            );
            buf.extend_from_slice(&header);
        }
        for (i, object) in objects.iter().enumerate() {
            if let Planned::Dataset(ds) = object {
                if data_addrs[i] != UNDEFINED_ADDRESS {
                    debug_assert_eq!(buf.len() as u64, data_addrs[i]);
                    buf.extend_from_slice(ds.raw());
                }
            }
        }
        debug_assert_eq!(buf.len() as u64, eof);
        log::debug!("laid out {} objects in {eof} bytes", objects.len());
        Ok(buf)
    }

    /// Serialize and write to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), H5Error> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&bytes)?;
        out.flush()?;
        log::info!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
