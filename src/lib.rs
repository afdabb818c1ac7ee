//! # plyfile
//!
//! Reader for the PLY (Polygon File Format / Stanford Triangle Format)
//! geometry interchange format.
//!
//! A PLY file starts with a text header declaring named elements
//! (`vertex`, `face`, ...) with ordered, typed properties, followed by a
//! body encoded as ASCII text or as binary data in either byte order.
//! Loading decodes the whole body into per-property row buffers held in
//! one canonical byte order, whatever the source encoding.
//!
//! ## Modules
//!
//! - [`util`] - Scalar types, byte order, errors
//! - [`header`] - Header tokenizer and grammar
//! - [`codec`] - Single value text/binary conversion
//! - [`document`] - Decoded documents, elements, properties
//! - [`reader`] - Loading from files, streams and memory
//!
//! ## Example
//!
//! ```no_run
//! use plyfile::Ply;
//!
//! let ply = Ply::open("bunny.ply")?;
//! println!("{} vertices", ply.vertex_count());
//!
//! if let Some([x, y, z]) = ply.vertex_columns() {
//!     println!("first vertex: {} {} {}", x[0], y[0], z[0]);
//! }
//! # Ok::<(), plyfile::Error>(())
//! ```

pub mod util;
pub mod header;
pub mod codec;
mod body;
pub mod document;
pub mod reader;

// Re-export commonly used types
pub use codec::Value;
pub use document::{Element, ObjInfo, Ply, Property};
pub use header::{Encoding, Header};
pub use reader::{EmptyLinePolicy, ListCountMode, ReadOptions};
pub use util::{Endian, Error, Result, ScalarType};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::Value;
    pub use crate::document::{Element, Ply, Property};
    pub use crate::header::Encoding;
    pub use crate::reader::ReadOptions;
    pub use crate::util::{Endian, Error, Result, ScalarType};
}
