//! Datatype message (type 0x0003), version 1.
//!
//! Only little-endian fixed-point integers, IEEE floats and fixed-length
//! strings are supported. That is enough for `H5T_NATIVE_FLOAT` datasets
//! and `H5T_C_S1` attributes on every common platform.

use std::fmt;

use crate::bytes::ByteReader;
use crate::error::H5Error;

const CLASS_FIXED_POINT: u8 = 0;
const CLASS_FLOATING_POINT: u8 = 1;
const CLASS_STRING: u8 = 3;
const VERSION: u8 = 1;

/// Padding rule for fixed-length strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringPadding {
    /// Terminated by a NUL byte (`H5T_STR_NULLTERM`, C strings).
    NullTerm,
    /// Padded with NUL bytes, no terminator required.
    NullPad,
    /// Padded with spaces (Fortran strings).
    SpacePad,
}

impl StringPadding {
    fn code(self) -> u8 {
        match self {
            Self::NullTerm => 0,
            Self::NullPad => 1,
            Self::SpacePad => 2,
        }
    }

    fn from_code(code: u8) -> Result<Self, H5Error> {
        match code {
            0 => Ok(Self::NullTerm),
            1 => Ok(Self::NullPad),
            2 => Ok(Self::SpacePad),
            other => Err(H5Error::UnsupportedDatatype {
                detail: format!("string padding type {other}"),
            }),
        }
    }
}

/// An element type stored in a dataset or attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datatype {
    /// Two's-complement or unsigned integer of `size` bytes.
    Integer {
        /// Element size in bytes: 1, 2, 4 or 8.
        size: u32,
        /// Whether the value is signed.
        signed: bool,
    },
    /// IEEE 754 binary float of `size` bytes.
    Float {
        /// Element size in bytes: 4 or 8.
        size: u32,
    },
    /// Fixed-length string of `size` bytes, ASCII.
    FixedString {
        /// Total size including any terminator or padding.
        size: u32,
        /// How unused bytes are filled.
        padding: StringPadding,
    },
}

impl Datatype {
    /// `H5T_NATIVE_FLOAT` on little-endian hosts.
    pub const F32: Datatype = Datatype::Float { size: 4 };
    /// `H5T_NATIVE_DOUBLE` on little-endian hosts.
    pub const F64: Datatype = Datatype::Float { size: 8 };
    /// `H5T_NATIVE_INT` on common little-endian hosts.
    pub const I32: Datatype = Datatype::Integer {
        size: 4,
        signed: true,
    };
    /// `H5T_NATIVE_LLONG` on little-endian hosts.
    pub const I64: Datatype = Datatype::Integer {
        size: 8,
        signed: true,
    };

    /// A C string type sized to hold `text` plus its NUL terminator.
    pub fn c_string_for(text: &str) -> Datatype {
        Datatype::FixedString {
            size: text.len() as u32 + 1,
            padding: StringPadding::NullTerm,
        }
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> u32 {
        match *self {
            Self::Integer { size, .. } | Self::Float { size } | Self::FixedString { size, .. } => {
                size
            }
        }
    }

    fn class(&self) -> u8 {
        match self {
            Self::Integer { .. } => CLASS_FIXED_POINT,
            Self::Float { .. } => CLASS_FLOATING_POINT,
            Self::FixedString { .. } => CLASS_STRING,
        }
    }

    /// Encode as a datatype message body.
    pub fn encode(&self) -> Result<Vec<u8>, H5Error> {
        let mut buf = Vec::with_capacity(20);
        buf.push((VERSION << 4) | self.class());
        match *self {
            Self::Integer { size, signed } => {
                if !matches!(size, 1 | 2 | 4 | 8) {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: format!("{size}-byte integer"),
                    });
                }
                // bit 0: little-endian, bit 3: signed
                buf.extend_from_slice(&[if signed { 0x08 } else { 0x00 }, 0, 0]);
                buf.extend_from_slice(&size.to_le_bytes());
                buf.extend_from_slice(&0u16.to_le_bytes()); // bit offset
                buf.extend_from_slice(&((size * 8) as u16).to_le_bytes()); // precision
            }
            Self::Float { size } => {
                let ieee = IeeeLayout::for_size(size)?;
                // bits 4-5 = 2: implied leading mantissa bit; byte 1: sign bit
                buf.extend_from_slice(&[0x20, ieee.sign_location, 0]);
                buf.extend_from_slice(&size.to_le_bytes());
                buf.extend_from_slice(&0u16.to_le_bytes());
                buf.extend_from_slice(&((size * 8) as u16).to_le_bytes());
                buf.push(ieee.exponent_location);
                buf.push(ieee.exponent_size);
                buf.push(0); // mantissa location
                buf.push(ieee.mantissa_size);
                buf.extend_from_slice(&ieee.exponent_bias.to_le_bytes());
            }
            Self::FixedString { size, padding } => {
                if size == 0 {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: "zero-length string".into(),
                    });
                }
                // charset 0 (ASCII) in bits 4-7
                buf.extend_from_slice(&[padding.code(), 0, 0]);
                buf.extend_from_slice(&size.to_le_bytes());
            }
        }
        Ok(buf)
    }

    /// Parse a datatype message body. Returns the type and bytes consumed.
    pub fn parse(data: &[u8]) -> Result<(Datatype, usize), H5Error> {
        let mut r = ByteReader::new(data);
        let class_and_version = r.u8()?;
        let version = class_and_version >> 4;
        let class = class_and_version & 0x0f;
        if !(1..=3).contains(&version) {
            return Err(H5Error::UnsupportedVersion {
                structure: "datatype",
                version,
            });
        }
        let bits = r.take(3)?;
        let size = r.u32()?;

        let dt = match class {
            CLASS_FIXED_POINT => {
                if bits[0] & 0x01 != 0 {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: "big-endian integer".into(),
                    });
                }
                if !matches!(size, 1 | 2 | 4 | 8) {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: format!("{size}-byte integer"),
                    });
                }
                let _offset = r.u16()?;
                let _precision = r.u16()?;
                Datatype::Integer {
                    size,
                    signed: bits[0] & 0x08 != 0,
                }
            }
            CLASS_FLOATING_POINT => {
                if bits[0] & 0x41 != 0 {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: "non little-endian float".into(),
                    });
                }
                let expected = IeeeLayout::for_size(size)?;
                r.skip(4)?; // bit offset + precision
                let exponent_location = r.u8()?;
                let exponent_size = r.u8()?;
                let _mantissa_location = r.u8()?;
                let mantissa_size = r.u8()?;
                let exponent_bias = r.u32()?;
                if exponent_location != expected.exponent_location
                    || exponent_size != expected.exponent_size
                    || mantissa_size != expected.mantissa_size
                    || exponent_bias != expected.exponent_bias
                {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: format!("non-IEEE {size}-byte float"),
                    });
                }
                Datatype::Float { size }
            }
            CLASS_STRING => {
                if size == 0 {
                    return Err(H5Error::UnsupportedDatatype {
                        detail: "zero-length string".into(),
                    });
                }
                Datatype::FixedString {
                    size,
                    padding: StringPadding::from_code(bits[0] & 0x0f)?,
                }
            }
            other => {
                return Err(H5Error::UnsupportedDatatype {
                    detail: format!("datatype class {other}"),
                })
            }
        };
        Ok((dt, r.position()))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Integer { size, signed } => {
                write!(f, "{}{}", if signed { 'i' } else { 'u' }, size * 8)
            }
            Self::Float { size } => write!(f, "f{}", size * 8),
            Self::FixedString { size, .. } => write!(f, "string[{size}]"),
        }
    }
}

struct IeeeLayout {
    sign_location: u8,
    exponent_location: u8,
    exponent_size: u8,
    mantissa_size: u8,
    exponent_bias: u32,
}

impl IeeeLayout {
    fn for_size(size: u32) -> Result<Self, H5Error> {
        match size {
            4 => Ok(Self {
                sign_location: 31,
                exponent_location: 23,
                exponent_size: 8,
                mantissa_size: 23,
                exponent_bias: 127,
            }),
            8 => Ok(Self {
                sign_location: 63,
                exponent_location: 52,
                exponent_size: 11,
                mantissa_size: 52,
                exponent_bias: 1023,
            }),
            other => Err(H5Error::UnsupportedDatatype {
                detail: format!("{other}-byte float"),
            }),
        }
    }
}
