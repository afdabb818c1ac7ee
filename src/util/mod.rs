//! Utility types shared by the PLY library.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ScalarType`] - Catalog of the numeric property types
//! - [`Endian`] - Byte order of binary bodies
//! - [`Error`] / [`Result`] - Error handling

mod scalar;
mod endian;
mod error;

pub use scalar::*;
pub use endian::*;
pub use error::*;
