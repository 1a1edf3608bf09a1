//! In-memory object tree: groups, datasets and attributes.
//!
//! The writer consumes this tree and the reader produces it, so a file's
//! content can be compared with plain `==`.

use indexmap::IndexMap;

use crate::dataspace::{Dataspace, Dims};
use crate::datatype::{Datatype, StringPadding};
use crate::error::H5Error;
use crate::message::AttributeMessage;

/// Longest accepted link name in bytes.
pub const MAX_NAME_LEN: usize = 255;

fn validate_name(name: &str) -> Result<(), H5Error> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." {
        "\".\" refers to the group itself"
    } else if name.contains('/') {
        "name contains '/'"
    } else if name.contains('\0') {
        "name contains NUL"
    } else if name.len() > MAX_NAME_LEN {
        "name longer than 255 bytes"
    } else {
        return Ok(());
    };
    Err(H5Error::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

fn validate_attr_name(name: &str) -> Result<(), H5Error> {
    let reason = if name.is_empty() {
        "attribute name is empty"
    } else if name.contains('\0') {
        "attribute name contains NUL"
    } else {
        return Ok(());
    };
    Err(H5Error::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

// ── AttrValue ──────────────────────────────────────────────────────

/// A scalar attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// ASCII text, stored as a fixed-length NUL-terminated string.
    String(String),
}

impl AttrValue {
    /// The value if stored as `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// The value as `f64`, widening `f32`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// The value as `i64`, widening `i32`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// The value if stored as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// On-disk datatype of this value.
    pub fn datatype(&self) -> Datatype {
        match self {
            Self::F32(_) => Datatype::F32,
            Self::F64(_) => Datatype::F64,
            Self::I32(_) => Datatype::I32,
            Self::I64(_) => Datatype::I64,
            Self::String(s) => Datatype::c_string_for(s),
        }
    }

    pub(crate) fn to_message(&self, name: &str) -> Result<AttributeMessage, H5Error> {
        let data = match self {
            Self::F32(v) => v.to_le_bytes().to_vec(),
            Self::F64(v) => v.to_le_bytes().to_vec(),
            Self::I32(v) => v.to_le_bytes().to_vec(),
            Self::I64(v) => v.to_le_bytes().to_vec(),
            Self::String(s) => {
                if !s.is_ascii() || s.contains('\0') {
                    return Err(H5Error::InvalidAttribute {
                        name: name.to_owned(),
                        reason: "strings must be ASCII without NUL bytes".into(),
                    });
                }
                let mut bytes = Vec::with_capacity(s.len() + 1);
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(0);
                bytes
            }
        };
        Ok(AttributeMessage {
            name: name.to_owned(),
            datatype: self.datatype(),
            dataspace: Dataspace::Scalar,
            data,
        })
    }

    pub(crate) fn from_message(msg: &AttributeMessage) -> Result<Self, H5Error> {
        let invalid = |reason: String| H5Error::InvalidAttribute {
            name: msg.name.clone(),
            reason,
        };
        if msg.dataspace.element_count() != Some(1) {
            return Err(invalid(format!(
                "only single-element attributes are supported, shape {:?}",
                msg.dataspace.dims()
            )));
        }
        let bytes = msg.data.as_slice();
        if bytes.len() != msg.datatype.size() as usize {
            return Err(H5Error::SizeMismatch {
                expected: msg.datatype.size() as usize,
                actual: bytes.len(),
            });
        }
        let value = match msg.datatype {
            Datatype::Float { size: 4 } => Self::F32(f32::from_le_bytes(le_array(bytes))),
            Datatype::Float { size: 8 } => Self::F64(f64::from_le_bytes(le_array(bytes))),
            Datatype::Integer {
                size: 4,
                signed: true,
            } => Self::I32(i32::from_le_bytes(le_array(bytes))),
            Datatype::Integer {
                size: 8,
                signed: true,
            } => Self::I64(i64::from_le_bytes(le_array(bytes))),
            Datatype::FixedString { padding, .. } => {
                let text = match padding {
                    StringPadding::NullTerm | StringPadding::NullPad => {
                        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                        &bytes[..end]
                    }
                    StringPadding::SpacePad => {
                        let end = bytes
                            .iter()
                            .rposition(|&b| b != b' ')
                            .map_or(0, |i| i + 1);
                        &bytes[..end]
                    }
                };
                Self::String(
                    String::from_utf8(text.to_vec())
                        .map_err(|_| invalid("string value is not UTF-8".into()))?,
                )
            }
            other => return Err(invalid(format!("unsupported attribute type {other}"))),
        };
        Ok(value)
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Attributes keyed by name, in insertion order.
pub type Attributes = IndexMap<String, AttrValue>;

fn set_attr_in(attrs: &mut Attributes, name: &str, value: AttrValue) -> Result<(), H5Error> {
    validate_attr_name(name)?;
    // Catch unencodable values when set rather than at write time.
    value.to_message(name)?;
    attrs.insert(name.to_owned(), value);
    Ok(())
}

// ── Dataset ────────────────────────────────────────────────────────

/// A fixed-size, contiguously stored n-dimensional array.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    datatype: Datatype,
    dataspace: Dataspace,
    raw: Vec<u8>,
    attrs: Attributes,
}

impl Dataset {
    /// Build a dataset from raw little-endian row-major bytes.
    ///
    /// # Errors
    ///
    /// - [`H5Error::UnsupportedDatatype`] if `datatype` cannot be encoded
    /// - [`H5Error::InvalidShape`] if the element count overflows or the
    ///   maximum dimensions are smaller than, or differ in rank from, the
    ///   current ones
    /// - [`H5Error::SizeMismatch`] if `raw` is not exactly one element per
    ///   shape cell
    pub fn new(datatype: Datatype, dataspace: Dataspace, raw: Vec<u8>) -> Result<Self, H5Error> {
        datatype.encode()?;
        if matches!(dataspace, Dataspace::Simple { .. }) && dataspace.rank() == 0 {
            return Err(H5Error::InvalidShape {
                detail: "simple dataspace needs at least one dimension".into(),
            });
        }
        if let Some(max) = dataspace.max_dims() {
            let dims = dataspace.dims();
            if max.len() != dims.len() {
                return Err(H5Error::InvalidShape {
                    detail: format!("max shape rank {} != rank {}", max.len(), dims.len()),
                });
            }
            if let Some((d, m)) = dims.iter().zip(max).find(|(d, m)| m < d) {
                return Err(H5Error::InvalidShape {
                    detail: format!("max dimension {m} below current dimension {d}"),
                });
            }
            if max.contains(&crate::UNDEFINED_ADDRESS) {
                return Err(H5Error::InvalidShape {
                    detail: "unlimited dimensions need chunked storage".into(),
                });
            }
        }
        let expected = dataspace
            .element_count()
            .and_then(|n| n.checked_mul(datatype.size() as u64))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| H5Error::InvalidShape {
                detail: format!("shape {:?} overflows", dataspace.dims()),
            })?;
        if raw.len() != expected {
            return Err(H5Error::SizeMismatch {
                expected,
                actual: raw.len(),
            });
        }
        Ok(Self {
            datatype,
            dataspace,
            raw,
            attrs: Attributes::new(),
        })
    }

    fn from_elements<T: Copy, const N: usize>(
        shape: &[u64],
        values: &[T],
        datatype: Datatype,
        encode: fn(T) -> [u8; N],
    ) -> Result<Self, H5Error> {
        let dataspace = if shape.is_empty() {
            Dataspace::Scalar
        } else {
            Dataspace::simple(shape)
        };
        let raw = values.iter().flat_map(|&v| encode(v)).collect();
        Self::new(datatype, dataspace, raw)
    }

    /// `f32` dataset in row-major order. An empty `shape` means scalar.
    pub fn from_f32(shape: &[u64], values: &[f32]) -> Result<Self, H5Error> {
        Self::from_elements(shape, values, Datatype::F32, f32::to_le_bytes)
    }

    /// `f64` dataset in row-major order. An empty `shape` means scalar.
    pub fn from_f64(shape: &[u64], values: &[f64]) -> Result<Self, H5Error> {
        Self::from_elements(shape, values, Datatype::F64, f64::to_le_bytes)
    }

    /// `i32` dataset in row-major order. An empty `shape` means scalar.
    pub fn from_i32(shape: &[u64], values: &[i32]) -> Result<Self, H5Error> {
        Self::from_elements(shape, values, Datatype::I32, i32::to_le_bytes)
    }

    /// `i64` dataset in row-major order. An empty `shape` means scalar.
    pub fn from_i64(shape: &[u64], values: &[i64]) -> Result<Self, H5Error> {
        Self::from_elements(shape, values, Datatype::I64, i64::to_le_bytes)
    }

    /// Record maximum dimensions (must equal or exceed the current shape).
    pub fn with_max_shape(self, max_shape: &[u64]) -> Result<Self, H5Error> {
        if self.dataspace == Dataspace::Scalar {
            return Err(H5Error::InvalidShape {
                detail: "scalar datasets have no maximum shape".into(),
            });
        }
        let dataspace = Dataspace::Simple {
            dims: Dims::from_slice(self.dataspace.dims()),
            max_dims: Some(Dims::from_slice(max_shape)),
        };
        let attrs = self.attrs;
        let mut ds = Self::new(self.datatype, dataspace, self.raw)?;
        ds.attrs = attrs;
        Ok(ds)
    }

    /// Element type.
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    /// Full dataspace.
    pub fn dataspace(&self) -> &Dataspace {
        &self.dataspace
    }

    /// Current dimensions; empty for scalars.
    pub fn shape(&self) -> &[u64] {
        self.dataspace.dims()
    }

    /// Maximum dimensions, if recorded.
    pub fn max_shape(&self) -> Option<&[u64]> {
        self.dataspace.max_dims()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.raw.len() / self.datatype.size() as usize
    }

    /// Whether the dataset holds no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Raw little-endian bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn read_elements<T, const N: usize>(
        &self,
        expected: Datatype,
        name: &'static str,
        decode: fn([u8; N]) -> T,
    ) -> Result<Vec<T>, H5Error> {
        if self.datatype != expected {
            return Err(H5Error::TypeMismatch {
                expected: name,
                found: self.datatype.to_string(),
            });
        }
        Ok(self
            .raw
            .chunks_exact(N)
            .map(|chunk| decode(le_array(chunk)))
            .collect())
    }

    /// Values as `f32`; fails unless stored as `f32`.
    pub fn read_f32(&self) -> Result<Vec<f32>, H5Error> {
        self.read_elements(Datatype::F32, "f32", f32::from_le_bytes)
    }

    /// Values as `f64`; fails unless stored as `f64`.
    pub fn read_f64(&self) -> Result<Vec<f64>, H5Error> {
        self.read_elements(Datatype::F64, "f64", f64::from_le_bytes)
    }

    /// Values as `i32`; fails unless stored as `i32`.
    pub fn read_i32(&self) -> Result<Vec<i32>, H5Error> {
        self.read_elements(Datatype::I32, "i32", i32::from_le_bytes)
    }

    /// Values as `i64`; fails unless stored as `i64`.
    pub fn read_i64(&self) -> Result<Vec<i64>, H5Error> {
        self.read_elements(Datatype::I64, "i64", i64::from_le_bytes)
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<(), H5Error> {
        set_attr_in(&mut self.attrs, name, value.into())
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// All attributes in insertion order.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}

// ── Group ──────────────────────────────────────────────────────────

/// A member of a group.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A nested group.
    Group(Group),
    /// A dataset.
    Dataset(Dataset),
}

impl Node {
    /// The group, if this member is one.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(g) => Some(g),
            Self::Dataset(_) => None,
        }
    }

    /// The dataset, if this member is one.
    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Self::Dataset(d) => Some(d),
            Self::Group(_) => None,
        }
    }

    fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Self::Group(g) => Some(g),
            Self::Dataset(_) => None,
        }
    }

    fn as_dataset_mut(&mut self) -> Option<&mut Dataset> {
        match self {
            Self::Dataset(d) => Some(d),
            Self::Group(_) => None,
        }
    }
}

/// A named collection of groups and datasets with attributes.
///
/// Members and attributes keep insertion order, which is also the link
/// order in the written file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    members: IndexMap<String, Node>,
    attrs: Attributes,
}

impl Group {
    /// An empty group.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_node(&mut self, name: &str, node: Node) -> Result<&mut Node, H5Error> {
        validate_name(name)?;
        match self.members.entry(name.to_owned()) {
            indexmap::map::Entry::Occupied(_) => Err(H5Error::DuplicateName(name.to_owned())),
            indexmap::map::Entry::Vacant(slot) => Ok(slot.insert(node)),
        }
    }

    /// Create an empty child group and return it for filling in.
    pub fn create_group(&mut self, name: &str) -> Result<&mut Group, H5Error> {
        self.insert_node(name, Node::Group(Group::new()))?
            .as_group_mut()
            .ok_or_else(|| H5Error::DuplicateName(name.to_owned()))
    }

    /// Add an existing group as a child.
    pub fn insert_group(&mut self, name: &str, group: Group) -> Result<&mut Group, H5Error> {
        self.insert_node(name, Node::Group(group))?
            .as_group_mut()
            .ok_or_else(|| H5Error::DuplicateName(name.to_owned()))
    }

    /// Add a dataset as a child and return it for attaching attributes.
    pub fn insert_dataset(&mut self, name: &str, dataset: Dataset) -> Result<&mut Dataset, H5Error> {
        self.insert_node(name, Node::Dataset(dataset))?
            .as_dataset_mut()
            .ok_or_else(|| H5Error::DuplicateName(name.to_owned()))
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<(), H5Error> {
        set_attr_in(&mut self.attrs, name, value.into())
    }

    /// Look up an attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// All attributes in insertion order.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Members in link order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Resolve a `/`-separated path to a member. Leading and repeated
    /// slashes are ignored; an empty path resolves to nothing.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut parts = path.split('/').filter(|p| !p.is_empty()).peekable();
        let mut group = self;
        while let Some(part) = parts.next() {
            let node = group.members.get(part)?;
            if parts.peek().is_none() {
                return Some(node);
            }
            group = node.as_group()?;
        }
        None
    }

    /// Resolve a path to a group; an empty path is this group.
    pub fn group(&self, path: &str) -> Option<&Group> {
        if path.split('/').all(str::is_empty) {
            return Some(self);
        }
        self.get(path)?.as_group()
    }

    /// Mutable access to a descendant group; an empty path is this group.
    pub fn group_mut(&mut self, path: &str) -> Option<&mut Group> {
        let mut group = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            group = group.members.get_mut(part)?.as_group_mut()?;
        }
        Some(group)
    }

    /// Resolve a path to a dataset.
    pub fn dataset(&self, path: &str) -> Option<&Dataset> {
        self.get(path)?.as_dataset()
    }

    /// Mutable access to a descendant dataset.
    pub fn dataset_mut(&mut self, path: &str) -> Option<&mut Dataset> {
        let (parent, name) = match path.trim_end_matches('/').rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", path.trim_end_matches('/')),
        };
        self.group_mut(parent)?
            .members
            .get_mut(name)?
            .as_dataset_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Group {
        let mut root = Group::new();
        let grp = root.create_group("a").unwrap();
        grp.create_group("b")
            .unwrap()
            .insert_dataset("c", Dataset::from_i32(&[2], &[1, 2]).unwrap())
            .unwrap();
        root
    }

    #[test]
    fn path_resolution() {
        let root = sample();
        assert!(root.group("a/b").is_some());
        assert!(root.group("/a//b/").is_some());
        assert_eq!(root.dataset("a/b/c").unwrap().read_i32().unwrap(), vec![1, 2]);
        assert!(root.dataset("a/b").is_none());
        assert!(root.get("a/b/c/d").is_none());
        assert!(root.get("").is_none());
        assert!(std::ptr::eq(root.group("").unwrap(), &root));
    }

    #[test]
    fn mutable_paths() {
        let mut root = sample();
        root.dataset_mut("a/b/c").unwrap().set_attr("k", 1i32).unwrap();
        assert_eq!(
            root.dataset("a/b/c").unwrap().attr("k"),
            Some(&AttrValue::I32(1))
        );
        root.group_mut("a").unwrap().set_attr("g", "x").unwrap();
        assert_eq!(root.group("a").unwrap().attr("g").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn duplicate_member_rejected() {
        let mut root = Group::new();
        root.create_group("x").unwrap();
        assert!(matches!(
            root.insert_dataset("x", Dataset::from_f32(&[], &[0.0]).unwrap()),
            Err(H5Error::DuplicateName(_))
        ));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn invalid_names_rejected() {
        let mut root = Group::new();
        for bad in ["", ".", "a/b", "nul\0"] {
            assert!(
                matches!(root.create_group(bad), Err(H5Error::InvalidName { .. })),
                "{bad:?} accepted"
            );
        }
        assert!(root.create_group(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(root.create_group(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn shape_must_match_values() {
        assert!(matches!(
            Dataset::from_f32(&[3, 3], &[1.0; 8]),
            Err(H5Error::SizeMismatch {
                expected: 36,
                actual: 32
            })
        ));
        assert!(Dataset::from_f64(&[0, 5], &[]).unwrap().is_empty());
    }

    #[test]
    fn max_shape_validation() {
        let ds = Dataset::from_f32(&[2, 2], &[0.0; 4]).unwrap();
        assert!(ds.clone().with_max_shape(&[2]).is_err());
        assert!(ds.clone().with_max_shape(&[1, 2]).is_err());
        assert!(ds.clone().with_max_shape(&[u64::MAX, 2]).is_err());
        let ds = ds.with_max_shape(&[4, 2]).unwrap();
        assert_eq!(ds.max_shape(), Some(&[4u64, 2][..]));
    }

    #[test]
    fn typed_read_checks_datatype() {
        let ds = Dataset::from_f64(&[1], &[1.0]).unwrap();
        match ds.read_f32() {
            Err(H5Error::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "f32");
                assert_eq!(found, "f64");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn attr_replacement_keeps_position() {
        let mut g = Group::new();
        g.set_attr("first", 1i64).unwrap();
        g.set_attr("second", 2.0f64).unwrap();
        g.set_attr("first", "again").unwrap();
        let names: Vec<&str> = g.attrs().keys().map(String::as_str).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(g.attr("first").unwrap().as_str(), Some("again"));
    }

    #[test]
    fn non_ascii_string_attr_rejected() {
        let mut g = Group::new();
        assert!(matches!(
            g.set_attr("s", "π"),
            Err(H5Error::InvalidAttribute { .. })
        ));
        assert!(g.attr("s").is_none());
    }

    #[test]
    fn string_padding_variants_decode() {
        let mut msg = AttrValue::from("hi").to_message("s").unwrap();
        assert_eq!(msg.data, b"hi\0");
        assert_eq!(AttrValue::from_message(&msg).unwrap().as_str(), Some("hi"));

        msg.datatype = Datatype::FixedString {
            size: 4,
            padding: StringPadding::SpacePad,
        };
        msg.data = b"hi  ".to_vec();
        assert_eq!(AttrValue::from_message(&msg).unwrap().as_str(), Some("hi"));
    }

    #[test]
    fn numeric_accessors_widen() {
        assert_eq!(AttrValue::F32(1.5).as_f64(), Some(1.5));
        assert_eq!(AttrValue::I32(-3).as_i64(), Some(-3));
        assert_eq!(AttrValue::F64(1.0).as_f32(), None);
    }
}
