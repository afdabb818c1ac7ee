//! PLY header parsing.
//!
//! ## Header Structure
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! comment free text
//! obj_info key value
//! element vertex 8
//! property float32 x
//! property list uint8 int32 vertex_indices
//! end_header
//! ```

pub mod format;
pub mod token;
mod grammar;

pub use format::Encoding;
pub use grammar::*;
