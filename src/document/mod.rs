//! Decoded PLY documents and accessors over them.
//!
//! A [`Ply`] is produced by a single load call (see [`crate::reader`])
//! and is read-only afterwards.

mod element;
mod obj_info;

pub use element::*;
pub use obj_info::*;

use std::fmt;

use glam::Vec3;
use tracing::debug;

use crate::header::{Encoding, Header};
use crate::util::Endian;

/// Name of the element holding point positions.
pub const VERTEX_ELEMENT: &str = "vertex";

/// A fully decoded PLY document.
#[derive(Clone, Debug)]
pub struct Ply {
    source: String,
    header: Header,
}

impl Ply {
    /// Wrap a header whose elements have been populated by the body decoder.
    pub(crate) fn new(source: impl Into<String>, header: Header) -> Self {
        Self {
            source: source.into(),
            header,
        }
    }

    /// Name of the file or stream the document was loaded from.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Body encoding declared in the header.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.header.encoding
    }

    /// Byte order declared by the file, `None` for ASCII bodies.
    ///
    /// Decoded rows are always stored in [`Endian::STORAGE`] order; this
    /// reports the source encoding only.
    #[inline]
    pub fn byte_order(&self) -> Option<Endian> {
        self.header.encoding.byte_order()
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.header.version
    }

    /// Elements in declaration order.
    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.header.elements
    }

    #[inline]
    pub fn obj_info(&self) -> &ObjInfo {
        &self.header.obj_info
    }

    #[inline]
    pub fn comments(&self) -> &[String] {
        &self.header.comments
    }

    /// Find an element by name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.header.elements.iter().find(|e| e.name() == name)
    }

    /// Declared row count of an element, 0 if there is no such element.
    pub fn row_count(&self, name: &str) -> usize {
        self.element(name).map_or(0, Element::count)
    }

    /// The `vertex` element, if present.
    pub fn vertex(&self) -> Option<&Element> {
        self.element(VERTEX_ELEMENT)
    }

    /// Number of vertices, 0 without a `vertex` element.
    pub fn vertex_count(&self) -> usize {
        self.row_count(VERTEX_ELEMENT)
    }

    /// The first three vertex properties as `f32` columns, in x, y, z order.
    ///
    /// This assumes the leading vertex properties are the coordinates.
    /// Returns `None` without a `vertex` element or when one of the first
    /// three properties is missing or list-valued.
    pub fn vertex_columns(&self) -> Option<[Vec<f32>; 3]> {
        let vertex = self.vertex()?;
        let props = vertex.properties();
        if props.len() < 3 {
            debug!("vertex element has only {} properties", props.len());
            return None;
        }
        Some([
            props[0].column_f32()?,
            props[1].column_f32()?,
            props[2].column_f32()?,
        ])
    }

    /// Vertex positions from the properties named `x`, `y` and `z`.
    pub fn vertex_positions(&self) -> Option<Vec<Vec3>> {
        let vertex = self.vertex()?;
        let x = vertex.column_f32("x")?;
        let y = vertex.column_f32("y")?;
        let z = vertex.column_f32("z")?;
        Some(
            x.into_iter()
                .zip(y)
                .zip(z)
                .map(|((x, y), z)| Vec3::new(x, y, z))
                .collect(),
        )
    }
}

impl fmt::Display for Ply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.header, f)
    }
}
