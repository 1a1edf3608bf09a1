//! Minimal pure-Rust HDF5 writer and reader.
//!
//! Covers the subset of the format needed to store small hierarchical
//! scientific files: groups, contiguous datasets of fixed-size numeric
//! types, and scalar attributes. Files written here open in the HDF5 C
//! library, h5py and friends; files read here must use the same subset.
//!
//! # Architecture
//!
//! - [`Group`], [`Dataset`] and [`AttrValue`] form the in-memory tree
//! - [`FileWriter`] lays the tree out and writes it to any path or buffer
//! - [`H5File`] parses a file back into the same tree
//!
//! # Format
//!
//! ```text
//! [Superblock v2] [root group OHDR] [child OHDRs, depth-first] [raw data]
//! ```
//!
//! Every superblock and object header carries a Jenkins lookup3 checksum.
//! Groups use compact link storage; attributes are stored inline in their
//! owner's object header.
//!
//! # Example
//!
//! ```
//! use lablog_h5::{Dataset, FileWriter, Group, H5File};
//!
//! let mut root = Group::new();
//! let grp = root.create_group("data").unwrap();
//! grp.insert_dataset("xs", Dataset::from_f32(&[2], &[1.5, 2.5]).unwrap())
//!     .unwrap()
//!     .set_attr("units", "m")
//!     .unwrap();
//!
//! let bytes = FileWriter::new(&root).to_bytes().unwrap();
//! let file = H5File::from_bytes(&bytes).unwrap();
//! let xs = file.dataset("data/xs").unwrap();
//! assert_eq!(xs.read_f32().unwrap(), vec![1.5, 2.5]);
//! assert_eq!(xs.attr("units").and_then(|a| a.as_str()), Some("m"));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod bytes;
pub mod checksum;
pub mod dataspace;
pub mod datatype;
pub mod error;
pub mod message;
pub mod model;
pub mod object_header;
pub mod reader;
pub mod superblock;
pub mod writer;

pub use dataspace::Dataspace;
pub use datatype::{Datatype, StringPadding};
pub use error::H5Error;
pub use model::{AttrValue, Dataset, Group, Node};
pub use reader::H5File;
pub use superblock::Superblock;
pub use writer::FileWriter;

/// Format signature at the start of every HDF5 file.
pub const SIGNATURE: [u8; 8] = *b"\x89HDF\r\n\x1a\n";

/// Address value meaning "not allocated".
pub const UNDEFINED_ADDRESS: u64 = u64::MAX;

/// Width in bytes of file addresses and lengths written by this crate.
pub const OFFSET_SIZE: u8 = 8;
