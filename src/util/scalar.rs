//! Scalar types - the fixed catalog of numeric kinds a PLY property can hold.

use std::fmt;

/// Scalar type enum - represents the numeric storage types of PLY.
///
/// Each type has a canonical name (`float32`), a legacy alias (`float`)
/// and a fixed byte width. Header parsing accepts either spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ScalarType {
    /// Signed 8-bit integer
    Int8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Signed 32-bit integer
    Int32 = 3,
    /// Unsigned 8-bit integer
    Uint8 = 4,
    /// Unsigned 16-bit integer
    Uint16 = 5,
    /// Unsigned 32-bit integer
    Uint32 = 6,
    /// 32-bit floating point (IEEE 754 single precision)
    Float32 = 7,
    /// 64-bit floating point (IEEE 754 double precision)
    Float64 = 8,
}

impl ScalarType {
    /// Every scalar type, in catalog order.
    pub const ALL: [ScalarType; 8] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the size in bytes of a single value of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Returns the canonical name of this type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns the legacy alias of this type.
    #[inline]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Self::Int8 => "char",
            Self::Int16 => "short",
            Self::Int32 => "int",
            Self::Uint8 => "uchar",
            Self::Uint16 => "ushort",
            Self::Uint32 => "uint",
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Parse a type from its canonical or legacy name.
    ///
    /// Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int8" | "char" => Some(Self::Int8),
            "int16" | "short" => Some(Self::Int16),
            "int32" | "int" => Some(Self::Int32),
            "uint8" | "uchar" => Some(Self::Uint8),
            "uint16" | "ushort" => Some(Self::Uint16),
            "uint32" | "uint" => Some(Self::Uint32),
            "float32" | "float" => Some(Self::Float32),
            "float64" | "double" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns true if this is a signed integer type.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32)
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
