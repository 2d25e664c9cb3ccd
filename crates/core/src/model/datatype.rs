//! Attribute value data types.
//!
//! A data type is a base numeric kind (low 3 bits of the wire tag) plus a
//! shape. Every shape other than `Scalar` counts as "structured": arrays,
//! xy pairs and 4-corner boxes all carry an element payload.
//!
//! Wire tags: scalars `0xC0..=0xC5`, arrays `0xC8..=0xCD`, xy `0xD0..=0xD5`,
//! boxes `0xE0..=0xE5`.

use std::fmt;

/// Base numeric kind of a value or of each element of a structured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NumericKind {
    UByte = 0,
    UInt16 = 1,
    UInt32 = 2,
    SInt16 = 3,
    SInt32 = 4,
    Real32 = 5,
}

impl NumericKind {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::UByte),
            1 => Some(Self::UInt16),
            2 => Some(Self::UInt32),
            3 => Some(Self::SInt16),
            4 => Some(Self::SInt32),
            5 => Some(Self::Real32),
            _ => None,
        }
    }

    /// Encoded size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::UByte => 1,
            Self::UInt16 | Self::SInt16 => 2,
            Self::UInt32 | Self::SInt32 | Self::Real32 => 4,
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Real32)
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Self::SInt16 | Self::SInt32 | Self::Real32)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::UByte => "ubyte",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::SInt16 => "sint16",
            Self::SInt32 => "sint32",
            Self::Real32 => "real32",
        }
    }
}

/// Layout of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shape {
    Scalar = 0,
    Array = 1,
    Xy = 2,
    Box = 4,
}

impl Shape {
    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Scalar),
            1 => Some(Self::Array),
            2 => Some(Self::Xy),
            4 => Some(Self::Box),
            _ => None,
        }
    }

    /// Fixed element count, or `None` for variable-length arrays.
    pub const fn fixed_len(self) -> Option<usize> {
        match self {
            Self::Scalar => Some(1),
            Self::Array => None,
            Self::Xy => Some(2),
            Self::Box => Some(4),
        }
    }
}

/// Data type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    pub kind: NumericKind,
    pub shape: Shape,
}

macro_rules! data_types {
    ($($name:ident = $kind:ident, $shape:ident;)*) => {
        impl DataType {
            $(pub const $name: Self = Self::new(NumericKind::$kind, Shape::$shape);)*
        }
    };
}

data_types! {
    UBYTE = UByte, Scalar;
    UINT16 = UInt16, Scalar;
    UINT32 = UInt32, Scalar;
    SINT16 = SInt16, Scalar;
    SINT32 = SInt32, Scalar;
    REAL32 = Real32, Scalar;
    UBYTE_ARRAY = UByte, Array;
    UINT16_ARRAY = UInt16, Array;
    UINT32_ARRAY = UInt32, Array;
    SINT16_ARRAY = SInt16, Array;
    SINT32_ARRAY = SInt32, Array;
    REAL32_ARRAY = Real32, Array;
    UBYTE_XY = UByte, Xy;
    UINT16_XY = UInt16, Xy;
    UINT32_XY = UInt32, Xy;
    SINT16_XY = SInt16, Xy;
    SINT32_XY = SInt32, Xy;
    REAL32_XY = Real32, Xy;
    UBYTE_BOX = UByte, Box;
    UINT16_BOX = UInt16, Box;
    UINT32_BOX = UInt32, Box;
    SINT16_BOX = SInt16, Box;
    SINT32_BOX = SInt32, Box;
    REAL32_BOX = Real32, Box;
}

impl DataType {
    pub const fn new(kind: NumericKind, shape: Shape) -> Self {
        Self { kind, shape }
    }

    /// Decode a wire data-type tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        if tag & 0xC0 != 0xC0 {
            return None;
        }
        let kind = match NumericKind::from_bits(tag & 0x07) {
            Some(kind) => kind,
            None => return None,
        };
        match Shape::from_bits((tag >> 3) & 0x07) {
            Some(shape) => Some(Self::new(kind, shape)),
            None => None,
        }
    }

    /// The wire tag for this data type.
    pub const fn tag(self) -> u8 {
        0xC0 | ((self.shape as u8) << 3) | self.kind as u8
    }

    /// True for arrays, xy pairs and boxes.
    pub const fn is_structured(self) -> bool {
        !matches!(self.shape, Shape::Scalar)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.name();
        match self.shape {
            Shape::Scalar => f.write_str(kind),
            Shape::Array => write!(f, "{kind}_array"),
            Shape::Xy => write!(f, "{kind}_xy"),
            Shape::Box => write!(f, "{kind}_box"),
        }
    }
}
