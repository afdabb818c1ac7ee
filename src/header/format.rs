//! PLY header constants and the body encoding mode.

use std::fmt;

use crate::util::Endian;

/// Literal first line of every PLY file.
pub const PLY_MAGIC: &str = "ply";

/// Keyword of the second header line.
pub const FORMAT_KEYWORD: &str = "format";

/// Keyword opening a new element.
pub const ELEMENT_KEYWORD: &str = "element";

/// Keyword declaring a property on the current element.
pub const PROPERTY_KEYWORD: &str = "property";

/// Marker following `property` for list-valued properties.
pub const LIST_KEYWORD: &str = "list";

/// Keyword of a free-form comment line.
pub const COMMENT_KEYWORD: &str = "comment";

/// Keyword of a metadata line.
pub const OBJ_INFO_KEYWORD: &str = "obj_info";

/// Terminal header line.
pub const END_HEADER: &str = "end_header";

/// Encoding of the PLY body, declared on the `format` line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Whitespace separated text, one row per line.
    Ascii,
    /// Fixed-width fields, most significant byte first.
    BinaryBigEndian,
    /// Fixed-width fields, least significant byte first.
    BinaryLittleEndian,
}

impl Encoding {
    /// Parse the mode keyword of the `format` line.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "ascii" => Some(Self::Ascii),
            "binary_big_endian" => Some(Self::BinaryBigEndian),
            "binary_little_endian" => Some(Self::BinaryLittleEndian),
            _ => None,
        }
    }

    /// Keyword written on the `format` line.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::BinaryBigEndian => "binary_big_endian",
            Self::BinaryLittleEndian => "binary_little_endian",
        }
    }

    /// Byte order of binary fields, `None` for ASCII bodies.
    pub const fn byte_order(self) -> Option<Endian> {
        match self {
            Self::Ascii => None,
            Self::BinaryBigEndian => Some(Endian::Big),
            Self::BinaryLittleEndian => Some(Endian::Little),
        }
    }

    #[inline]
    pub const fn is_binary(self) -> bool {
        !matches!(self, Self::Ascii)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}
