//! Dataspace message (type 0x0001).

use smallvec::SmallVec;

use crate::bytes::ByteReader;
use crate::error::H5Error;

/// Dimension list; rank four or lower stays inline.
pub type Dims = SmallVec<[u64; 4]>;

const TYPE_SCALAR: u8 = 0;
const TYPE_SIMPLE: u8 = 1;
const TYPE_NULL: u8 = 2;
const FLAG_MAX_DIMS: u8 = 0x01;

/// Shape of a dataset or attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dataspace {
    /// A single element with no dimensions.
    Scalar,
    /// An n-dimensional array.
    Simple {
        /// Current dimension sizes.
        dims: Dims,
        /// Maximum dimension sizes, when recorded.
        max_dims: Option<Dims>,
    },
}

impl Dataspace {
    /// A simple dataspace without recorded maximum dimensions.
    pub fn simple(dims: &[u64]) -> Self {
        Self::Simple {
            dims: Dims::from_slice(dims),
            max_dims: None,
        }
    }

    /// Number of dimensions; zero for scalars.
    pub fn rank(&self) -> usize {
        match self {
            Self::Scalar => 0,
            Self::Simple { dims, .. } => dims.len(),
        }
    }

    /// Current dimension sizes; empty for scalars.
    pub fn dims(&self) -> &[u64] {
        match self {
            Self::Scalar => &[],
            Self::Simple { dims, .. } => dims,
        }
    }

    /// Maximum dimension sizes, if recorded.
    pub fn max_dims(&self) -> Option<&[u64]> {
        match self {
            Self::Scalar => None,
            Self::Simple { max_dims, .. } => max_dims.as_deref(),
        }
    }

    /// Total number of elements, or `None` on overflow.
    pub fn element_count(&self) -> Option<u64> {
        self.dims()
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }

    /// Encode as a version 2 dataspace message body.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 16 * self.rank());
        buf.push(2); // version
        buf.push(self.rank() as u8);
        match self {
            Self::Scalar => {
                buf.push(0);
                buf.push(TYPE_SCALAR);
            }
            Self::Simple { dims, max_dims } => {
                buf.push(if max_dims.is_some() { FLAG_MAX_DIMS } else { 0 });
                buf.push(TYPE_SIMPLE);
                for d in dims {
                    buf.extend_from_slice(&d.to_le_bytes());
                }
                if let Some(max) = max_dims {
                    for d in max {
                        buf.extend_from_slice(&d.to_le_bytes());
                    }
                }
            }
        }
        buf
    }

    /// Parse a version 1 or 2 dataspace message body.
    pub fn parse(data: &[u8]) -> Result<Dataspace, H5Error> {
        let mut r = ByteReader::new(data);
        let version = r.u8()?;
        let rank = r.u8()? as usize;
        let flags = r.u8()?;
        let space_type = match version {
            1 => {
                r.skip(5)?; // reserved
                if rank == 0 {
                    TYPE_SCALAR
                } else {
                    TYPE_SIMPLE
                }
            }
            2 => r.u8()?,
            v => {
                return Err(H5Error::UnsupportedVersion {
                    structure: "dataspace",
                    version: v,
                })
            }
        };

        match space_type {
            TYPE_SCALAR => Ok(Dataspace::Scalar),
            TYPE_SIMPLE => {
                if rank == 0 {
                    return Err(H5Error::UnsupportedDataspace {
                        detail: "simple dataspace of rank 0".into(),
                    });
                }
                let mut dims = Dims::with_capacity(rank);
                for _ in 0..rank {
                    dims.push(r.u64()?);
                }
                let max_dims = if flags & FLAG_MAX_DIMS != 0 {
                    let mut max = Dims::with_capacity(rank);
                    for _ in 0..rank {
                        max.push(r.u64()?);
                    }
                    Some(max)
                } else {
                    None
                };
                Ok(Dataspace::Simple { dims, max_dims })
            }
            TYPE_NULL => Err(H5Error::UnsupportedDataspace {
                detail: "null dataspace".into(),
            }),
            other => Err(H5Error::UnsupportedDataspace {
                detail: format!("dataspace type {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_four_bytes_and_one_element() {
        let bytes = Dataspace::Scalar.encode();
        assert_eq!(bytes, vec![2, 0, 0, 0]);
        assert_eq!(Dataspace::Scalar.element_count(), Some(1));
    }

    #[test]
    fn matrix_with_max_dims() {
        let space = Dataspace::Simple {
            dims: Dims::from_slice(&[3, 3]),
            max_dims: Some(Dims::from_slice(&[3, 3])),
        };
        let bytes = space.encode();
        assert_eq!(bytes.len(), 4 + 2 * 8 + 2 * 8);
        assert_eq!(bytes[2], FLAG_MAX_DIMS);
        assert_eq!(Dataspace::parse(&bytes).unwrap(), space);
        assert_eq!(space.element_count(), Some(9));
    }

    #[test]
    fn element_count_overflow_is_none() {
        let space = Dataspace::simple(&[u64::MAX, 2]);
        assert_eq!(space.element_count(), None);
    }

    #[test]
    fn version_one_layout_parses() {
        let mut bytes = vec![1, 1, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&7u64.to_le_bytes());
        assert_eq!(Dataspace::parse(&bytes).unwrap(), Dataspace::simple(&[7]));
    }

    #[test]
    fn null_dataspace_rejected() {
        assert!(matches!(
            Dataspace::parse(&[2, 0, 0, TYPE_NULL]),
            Err(H5Error::UnsupportedDataspace { .. })
        ));
    }
}
