//! Byte order of binary PLY bodies.

use std::fmt;

/// Byte order used to interpret multi-byte binary fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    /// Byte order of decoded row buffers.
    ///
    /// Every value is normalized to this order at the codec boundary,
    /// whatever the encoding of the source file.
    pub const STORAGE: Endian = Endian::Little;
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big endian"),
            Self::Little => write!(f, "little endian"),
        }
    }
}
