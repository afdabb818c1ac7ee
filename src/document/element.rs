//! Elements and properties - the schema and storage of a PLY document.

use std::fmt;

use crate::codec::Value;
use crate::header::format::{ELEMENT_KEYWORD, LIST_KEYWORD, PROPERTY_KEYWORD};
use crate::util::ScalarType;

/// One named, typed column of an element.
///
/// After decoding, a property holds one byte buffer per row in canonical
/// storage order. Scalar rows hold exactly one value; list rows hold the
/// concatenated list items without a length prefix, so the list length
/// is the buffer size divided by the item width.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    ty: ScalarType,
    count_ty: Option<ScalarType>,
    rows: Vec<Vec<u8>>,
}

impl Property {
    /// Create a scalar property.
    pub fn new_scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
            count_ty: None,
            rows: Vec::new(),
        }
    }

    /// Create a list property whose length is encoded as `count_ty`.
    pub fn new_list(name: impl Into<String>, count_ty: ScalarType, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
            count_ty: Some(count_ty),
            rows: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar type of the value, or of each list item.
    #[inline]
    pub fn ty(&self) -> ScalarType {
        self.ty
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.count_ty.is_some()
    }

    /// Type of the list length field, `None` for scalar properties.
    #[inline]
    pub fn count_type(&self) -> Option<ScalarType> {
        self.count_ty
    }

    /// Number of decoded rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Raw storage bytes of a row.
    pub fn row(&self, index: usize) -> Option<&[u8]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate over the raw storage bytes of every row.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Scalar value of a row.
    ///
    /// `None` for list properties, rows out of range and rows left unset.
    pub fn value(&self, row: usize) -> Option<Value> {
        if self.is_list() {
            return None;
        }
        Value::from_storage(self.row(row)?, self.ty)
    }

    /// Items of a list row. Empty for scalar properties and missing rows.
    pub fn list(&self, row: usize) -> Vec<Value> {
        match self.row(row) {
            Some(bytes) if self.is_list() => bytes
                .chunks_exact(self.ty.num_bytes())
                .filter_map(|chunk| Value::from_storage(chunk, self.ty))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of items in a list row.
    pub fn list_len(&self, row: usize) -> Option<usize> {
        if !self.is_list() {
            return None;
        }
        self.row(row).map(|bytes| bytes.len() / self.ty.num_bytes())
    }

    /// Whole column converted to `f32`. Unset rows read as NaN.
    ///
    /// `None` for list properties.
    pub fn column_f32(&self) -> Option<Vec<f32>> {
        if self.is_list() {
            return None;
        }
        Some(
            (0..self.rows.len())
                .map(|row| self.value(row).map_or(f32::NAN, |v| v.as_f32()))
                .collect(),
        )
    }

    /// Drop any rows and reserve room for `count` new ones.
    pub(crate) fn reset_rows(&mut self, count: usize) {
        self.rows = Vec::with_capacity(count);
    }

    pub(crate) fn push_row(&mut self, bytes: Vec<u8>) {
        self.rows.push(bytes);
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count_ty {
            Some(count_ty) => write!(
                f,
                "{PROPERTY_KEYWORD} {LIST_KEYWORD} {count_ty} {} {}",
                self.ty, self.name
            ),
            None => write!(f, "{PROPERTY_KEYWORD} {} {}", self.ty, self.name),
        }
    }
}

/// A named group of rows sharing the same properties, e.g. `vertex`.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

impl Element {
    /// Create an element with a declared row count and no properties.
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            properties: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared number of rows.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Properties in declaration order.
    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Column of a named scalar property converted to `f32`.
    pub fn column_f32(&self, name: &str) -> Option<Vec<f32>> {
        self.property(name)?.column_f32()
    }

    /// Append a property; order defines the row layout.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ELEMENT_KEYWORD} {} {}", self.name, self.count)?;
        for property in &self.properties {
            write!(f, "\n{property}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(values: &[Value]) -> Vec<u8> {
        let mut buf = Vec::new();
        for v in values {
            v.to_storage(&mut buf);
        }
        buf
    }

    #[test]
    fn test_scalar_access() {
        let mut p = Property::new_scalar("x", ScalarType::Float32);
        p.reset_rows(2);
        p.push_row(stored(&[Value::Float32(1.5)]));
        p.push_row(Vec::new());

        assert_eq!(p.num_rows(), 2);
        assert_eq!(p.value(0), Some(Value::Float32(1.5)));
        assert_eq!(p.value(1), None);
        assert_eq!(p.value(2), None);
        assert!(p.list(0).is_empty());

        let column = p.column_f32().unwrap();
        assert_eq!(column[0], 1.5);
        assert!(column[1].is_nan());
    }

    #[test]
    fn test_list_access() {
        let mut p = Property::new_list("vertex_indices", ScalarType::Uint8, ScalarType::Int32);
        p.reset_rows(1);
        p.push_row(stored(&[Value::Int32(0), Value::Int32(1), Value::Int32(2)]));

        assert!(p.is_list());
        assert_eq!(p.count_type(), Some(ScalarType::Uint8));
        assert_eq!(p.row(0).unwrap().len(), 12);
        assert_eq!(p.list_len(0), Some(3));
        assert_eq!(p.list(0), vec![Value::Int32(0), Value::Int32(1), Value::Int32(2)]);
        assert_eq!(p.value(0), None);
        assert!(p.column_f32().is_none());
    }

    #[test]
    fn test_display() {
        let mut e = Element::new("face", 6);
        e.add_property(Property::new_list("vertex_indices", ScalarType::Uint8, ScalarType::Int32));
        e.add_property(Property::new_scalar("flags", ScalarType::Uint16));
        assert_eq!(
            e.to_string(),
            "element face 6\nproperty list uint8 int32 vertex_indices\nproperty uint16 flags"
        );
    }

    #[test]
    fn test_property_lookup() {
        let mut e = Element::new("vertex", 0);
        e.add_property(Property::new_scalar("x", ScalarType::Float32));
        e.add_property(Property::new_scalar("y", ScalarType::Float32));
        assert_eq!(e.property("y").map(Property::name), Some("y"));
        assert!(e.property("z").is_none());
        assert_eq!(e.properties().len(), 2);
    }
}
