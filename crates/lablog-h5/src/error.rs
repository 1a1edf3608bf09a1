//! Error types for HDF5 writing and reading.

use std::io;

use thiserror::Error;

/// Errors that can occur while building, writing, or parsing an HDF5 file.
#[derive(Debug, Error)]
pub enum H5Error {
    /// An I/O error occurred while reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The HDF5 signature was not found at any valid offset.
    #[error("HDF5 signature not found at any valid offset")]
    SignatureNotFound,
    /// A structure uses a version this crate does not understand.
    #[error("unsupported {structure} version {version}")]
    UnsupportedVersion {
        /// Which structure carried the version byte.
        structure: &'static str,
        /// The version found in the file.
        version: u8,
    },
    /// The data ended before a structure was complete.
    #[error("unexpected end of data: need {expected} bytes, have {available}")]
    UnexpectedEof {
        /// Number of bytes needed.
        expected: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// A structure's signature bytes are wrong.
    #[error("invalid {structure} signature")]
    InvalidSignature {
        /// Which structure was being parsed.
        structure: &'static str,
    },
    /// A metadata checksum does not match its contents.
    #[error("{structure} checksum mismatch: stored={stored:#010x}, computed={computed:#010x}")]
    ChecksumMismatch {
        /// Which structure failed verification.
        structure: &'static str,
        /// Checksum stored in the file.
        stored: u32,
        /// Checksum computed over the bytes read.
        computed: u32,
    },
    /// An unknown header message is flagged as must-understand.
    #[error("unsupported message type {msg_type:#04x} marked as must-understand")]
    UnsupportedMessage {
        /// The message type tag.
        msg_type: u8,
    },
    /// The superblock declares address or length widths other than 8 bytes.
    #[error("unsupported address widths: offsets={offset_size}, lengths={length_size}")]
    UnsupportedSizes {
        /// Size of file addresses in bytes.
        offset_size: u8,
        /// Size of file lengths in bytes.
        length_size: u8,
    },
    /// An object header lacks a message its object kind requires.
    #[error("object at address {address:#x} has no {message} message")]
    MissingMessage {
        /// Object header address.
        address: u64,
        /// Name of the missing message.
        message: &'static str,
    },
    /// A datatype class or layout outside the supported subset.
    #[error("unsupported datatype: {detail}")]
    UnsupportedDatatype {
        /// What was unsupported.
        detail: String,
    },
    /// A dataspace outside the supported subset.
    #[error("unsupported dataspace: {detail}")]
    UnsupportedDataspace {
        /// What was unsupported.
        detail: String,
    },
    /// A data layout class outside the supported subset.
    #[error("unsupported data layout class {class}")]
    UnsupportedLayout {
        /// The layout class byte.
        class: u8,
    },
    /// A link or link storage outside the supported subset.
    #[error("unsupported link {name:?}: {detail}")]
    UnsupportedLink {
        /// Link name, or empty when the storage itself is unsupported.
        name: String,
        /// What was unsupported.
        detail: String,
    },
    /// An object header is neither a group nor a dataset.
    #[error("object at address {address:#x} is neither a group nor a dataset")]
    UnknownObject {
        /// Object header address.
        address: u64,
    },
    /// The superblock's root object is not a group.
    #[error("root object at address {address:#x} is not a group")]
    RootNotGroup {
        /// Root object header address.
        address: u64,
    },
    /// Reading would materialize more than the reader allows for one file.
    #[error("file expands past the read limit: {detail}")]
    LimitExceeded {
        /// Which limit was hit.
        detail: String,
    },
    /// A hard link points back at one of its own ancestors.
    #[error("link cycle through object at address {address:#x}")]
    Cycle {
        /// Address of the object reached twice on one path.
        address: u64,
    },
    /// A link or attribute name is not acceptable.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A group already holds a member with this name.
    #[error("duplicate name {0:?}")]
    DuplicateName(String),
    /// A shape is empty, overflows, or conflicts with its max shape.
    #[error("invalid shape: {detail}")]
    InvalidShape {
        /// What was wrong with the shape.
        detail: String,
    },
    /// Raw data length does not match shape times element size.
    #[error("data size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Bytes implied by shape and datatype.
        expected: usize,
        /// Bytes supplied or stored.
        actual: usize,
    },
    /// Typed access to data stored with a different datatype.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The requested type.
        expected: &'static str,
        /// The stored type.
        found: String,
    },
    /// An attribute value cannot be stored.
    #[error("invalid attribute {name:?}: {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A header message does not fit the 16-bit message size field.
    #[error("message of {size} bytes exceeds the object header message limit")]
    MessageTooLarge {
        /// Encoded message size.
        size: usize,
    },
}
