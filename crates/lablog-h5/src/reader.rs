//! Parses an HDF5 file back into a [`Group`] tree.
//!
//! The reader accepts the subset [`FileWriter`](crate::FileWriter) emits
//! plus the variants the C library writes for the same objects: version 3
//! superblocks, v1 and v2 attribute messages, compact layouts, and
//! contiguous datasets whose storage was never allocated. Anything else is
//! an error, never a panic.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::dataspace::Dataspace;
use crate::datatype::Datatype;
use crate::error::H5Error;
use crate::message::{check_link_info, AttributeMessage, DataLayout, LinkMessage, MessageType};
use crate::model::{AttrValue, Dataset, Group, Node};
use crate::object_header::ObjectHeader;
use crate::superblock::{find_signature, Superblock};
use crate::UNDEFINED_ADDRESS;

/// Largest zero-filled buffer materialized for unallocated storage.
const MAX_UNALLOCATED_BYTES: u64 = 64 << 20;

/// Deepest group nesting followed before giving up.
const MAX_DEPTH: usize = 1024;

/// Most objects one file may expand to, counting every path to a shared object.
const MAX_OBJECTS: u64 = 1 << 20;

/// Data bytes one file may expand to beyond its own length.
const MAX_EXTRA_BYTES: u64 = 256 << 20;

/// A parsed HDF5 file.
#[derive(Clone, Debug, PartialEq)]
pub struct H5File {
    superblock: Superblock,
    root: Group,
}

impl H5File {
    /// Read and parse the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, H5Error> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        log::debug!("read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(&data)
    }

    /// Parse a file held in memory.
    ///
    /// # Errors
    ///
    /// Any structural problem: missing signature, checksum mismatch,
    /// truncated structures, unsupported versions or message kinds, link
    /// cycles, and data that does not match its declared shape. Shared
    /// objects are copied once per link, and a file whose expanded tree
    /// passes the object or byte limit is rejected.
    pub fn from_bytes(data: &[u8]) -> Result<Self, H5Error> {
        let sb_offset = find_signature(data)?;
        let superblock = Superblock::parse(data, sb_offset)?;
        let mut parser = Parser::new(data, superblock.base_address);
        let root = match parser.parse_node(superblock.root_group_address)? {
            Node::Group(g) => g,
            Node::Dataset(_) => {
                return Err(H5Error::RootNotGroup {
                    address: superblock.root_group_address,
                })
            }
        };
        log::debug!(
            "parsed {} objects holding {} data bytes",
            parser.spent.objects,
            parser.spent.bytes
        );
        Ok(Self { superblock, root })
    }

    /// The parsed superblock.
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The root group.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Take ownership of the root group.
    pub fn into_root(self) -> Group {
        self.root
    }

    /// Resolve a path from the root to a group.
    pub fn group(&self, path: &str) -> Option<&Group> {
        self.root.group(path)
    }

    /// Resolve a path from the root to a dataset.
    pub fn dataset(&self, path: &str) -> Option<&Dataset> {
        self.root.dataset(path)
    }
}

/// Objects and data bytes materialized so far.
#[derive(Clone, Copy, Debug, Default)]
struct Spent {
    objects: u64,
    bytes: u64,
}

struct Parser<'d> {
    data: &'d [u8],
    base: u64,
    /// Object addresses from the root to the node being parsed.
    path: Vec<u64>,
    /// Finished objects by address, with what their subtree cost.
    parsed: HashMap<u64, (Node, Spent)>,
    spent: Spent,
    byte_limit: u64,
}

impl<'d> Parser<'d> {
    fn new(data: &'d [u8], base: u64) -> Self {
        Self {
            data,
            base,
            path: Vec::new(),
            parsed: HashMap::new(),
            spent: Spent::default(),
            byte_limit: (data.len() as u64).saturating_add(MAX_EXTRA_BYTES),
        }
    }

    fn offset(&self, address: u64) -> Result<usize, H5Error> {
        let absolute = usize::try_from(address.saturating_add(self.base)).unwrap_or(usize::MAX);
        if absolute >= self.data.len() {
            return Err(H5Error::UnexpectedEof {
                expected: absolute,
                available: self.data.len(),
            });
        }
        Ok(absolute)
    }

    /// Account for `objects` more objects and `bytes` more data bytes.
    fn charge(&mut self, objects: u64, bytes: u64) -> Result<(), H5Error> {
        self.spent.objects = self.spent.objects.saturating_add(objects);
        self.spent.bytes = self.spent.bytes.saturating_add(bytes);
        if self.spent.objects > MAX_OBJECTS {
            return Err(H5Error::LimitExceeded {
                detail: format!("more than {MAX_OBJECTS} objects"),
            });
        }
        if self.spent.bytes > self.byte_limit {
            return Err(H5Error::LimitExceeded {
                detail: format!("more than {} data bytes", self.byte_limit),
            });
        }
        Ok(())
    }

    fn parse_node(&mut self, address: u64) -> Result<Node, H5Error> {
        if let Some((node, cost)) = self.parsed.get(&address) {
            let (node, cost) = (node.clone(), *cost);
            log::trace!("object {address:#x} already parsed");
            self.charge(cost.objects, cost.bytes)?;
            return Ok(node);
        }
        if self.path.contains(&address) {
            return Err(H5Error::Cycle { address });
        }
        if self.path.len() >= MAX_DEPTH {
            return Err(H5Error::UnsupportedLink {
                name: String::new(),
                detail: format!("nesting deeper than {MAX_DEPTH} levels"),
            });
        }
        let header = ObjectHeader::parse(self.data, self.offset(address)?)?;
        let before = self.spent;
        self.charge(1, 0)?;
        self.path.push(address);
        let node = if header.has(MessageType::DataLayout) {
            self.parse_dataset(address, &header).map(Node::Dataset)
        } else if header.has(MessageType::LinkInfo)
            || header.has(MessageType::Link)
            || header.has(MessageType::GroupInfo)
        {
            self.parse_group(&header).map(Node::Group)
        } else {
            Err(H5Error::UnknownObject { address })
        };
        self.path.pop();
        let node = node?;
        let cost = Spent {
            objects: self.spent.objects - before.objects,
            bytes: self.spent.bytes - before.bytes,
        };
        self.parsed.insert(address, (node.clone(), cost));
        Ok(node)
    }

    fn parse_group(&mut self, header: &ObjectHeader) -> Result<Group, H5Error> {
        if let Some(info) = header.first(MessageType::LinkInfo) {
            check_link_info(&info.data)?;
        }
        let mut group = Group::new();
        for msg in header.messages_of(MessageType::Link) {
            let link = LinkMessage::parse(&msg.data)?;
            log::trace!("link {:?} -> {:#x}", link.name, link.address);
            match self.parse_node(link.address)? {
                Node::Group(child) => {
                    group.insert_group(&link.name, child)?;
                }
                Node::Dataset(child) => {
                    group.insert_dataset(&link.name, child)?;
                }
            }
        }
        for (name, value) in read_attributes(header)? {
            group.set_attr(&name, value)?;
        }
        Ok(group)
    }

    fn parse_dataset(&mut self, address: u64, header: &ObjectHeader) -> Result<Dataset, H5Error> {
        let missing = |message| H5Error::MissingMessage { address, message };
        let datatype_msg = header
            .first(MessageType::Datatype)
            .ok_or_else(|| missing("datatype"))?;
        let (datatype, _) = Datatype::parse(&datatype_msg.data)?;
        let dataspace_msg = header
            .first(MessageType::Dataspace)
            .ok_or_else(|| missing("dataspace"))?;
        let dataspace = Dataspace::parse(&dataspace_msg.data)?;
        let layout_msg = header
            .first(MessageType::DataLayout)
            .ok_or_else(|| missing("data layout"))?;

        let raw = match DataLayout::parse(&layout_msg.data)? {
            DataLayout::Compact { data } => {
                self.charge(0, data.len() as u64)?;
                data
            }
            DataLayout::Contiguous {
                address: UNDEFINED_ADDRESS,
                size,
            } => {
                if size > MAX_UNALLOCATED_BYTES {
                    return Err(H5Error::InvalidShape {
                        detail: format!("unallocated storage of {size} bytes"),
                    });
                }
                self.charge(0, size)?;
                vec![0u8; size as usize]
            }
            DataLayout::Contiguous {
                address: data_address,
                size,
            } => {
                let start = self.offset(data_address)?;
                let len = usize::try_from(size).map_err(|_| H5Error::UnexpectedEof {
                    expected: usize::MAX,
                    available: self.data.len(),
                })?;
                let end = start
                    .checked_add(len)
                    .filter(|&end| end <= self.data.len())
                    .ok_or(H5Error::UnexpectedEof {
                        expected: start.saturating_add(len),
                        available: self.data.len(),
                    })?;
                self.charge(0, size)?;
                self.data[start..end].to_vec()
            }
        };

        let mut dataset = Dataset::new(datatype, dataspace, raw)?;
        for (name, value) in read_attributes(header)? {
            dataset.set_attr(&name, value)?;
        }
        Ok(dataset)
    }
}

fn read_attributes(header: &ObjectHeader) -> Result<Vec<(String, AttrValue)>, H5Error> {
    let mut attrs: Vec<(String, AttrValue)> = Vec::new();
    for msg in header.messages_of(MessageType::Attribute) {
        let parsed = AttributeMessage::parse(&msg.data)?;
        if attrs.iter().any(|(name, _)| *name == parsed.name) {
            return Err(H5Error::DuplicateName(parsed.name));
        }
        let value = AttrValue::from_message(&parsed)?;
        attrs.push((parsed.name, value));
    }
    Ok(attrs)
}
