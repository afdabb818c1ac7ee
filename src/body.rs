//! Body decoder.
//!
//! Walks the schema element by element, row by row and property by
//! property, filling each property with one canonical row buffer per
//! declared row. Exactly one pass runs per document, chosen by the
//! header's encoding. Any failure aborts the whole decode.

use std::io::{self, BufRead, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use crate::codec::{decode_binary, decode_text, Value};
use crate::document::{Element, Property};
use crate::header::token::{tokenize, Token};
use crate::header::{Encoding, Header};
use crate::reader::{EmptyLinePolicy, ListCountMode, ReadOptions};
use crate::util::{Error, Result, ScalarType};

/// Upper bound for up-front allocations sized by counts read from the file.
const MAX_PREALLOC: usize = 1 << 16;

/// Decode the body that follows `header` in `reader`.
pub(crate) fn read_body<R: BufRead>(reader: &mut R, header: &mut Header, opts: &ReadOptions) -> Result<()> {
    match header.encoding {
        Encoding::Ascii => read_ascii(reader, &mut header.elements, opts.empty_lines),
        Encoding::BinaryBigEndian => read_binary::<BigEndian, _>(reader, &mut header.elements, opts.list_counts),
        Encoding::BinaryLittleEndian => {
            read_binary::<LittleEndian, _>(reader, &mut header.elements, opts.list_counts)
        }
    }
}

// ============================================================================
// Binary
// ============================================================================

fn read_binary<B: ByteOrder, R: Read>(reader: &mut R, elements: &mut [Element], list_counts: ListCountMode) -> Result<()> {
    for element in elements {
        debug!("decoding {} binary rows of `{}`", element.count(), element.name());
        let count = element.count();
        let name = element.name().to_string();
        let properties = element.properties_mut();
        if properties.is_empty() {
            continue;
        }
        for p in properties.iter_mut() {
            p.reset_rows(count.min(MAX_PREALLOC));
        }

        for row in 0..count {
            for p in properties.iter_mut() {
                let bytes = read_binary_row::<B, R>(reader, p, list_counts).map_err(|e| match e {
                    RowError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Error::Truncated {
                        element: name.clone(),
                        row,
                    },
                    RowError::Io(e) => Error::Io(e),
                    RowError::BadCount => Error::InvalidListCount {
                        element: name.clone(),
                        property: p.name().to_string(),
                        row,
                    },
                })?;
                p.push_row(bytes);
            }
        }
    }
    Ok(())
}

enum RowError {
    Io(io::Error),
    BadCount,
}

impl From<io::Error> for RowError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

fn read_binary_row<B: ByteOrder, R: Read>(
    reader: &mut R,
    property: &Property,
    list_counts: ListCountMode,
) -> std::result::Result<Vec<u8>, RowError> {
    let ty = property.ty();
    let Some(count_ty) = property.count_type() else {
        let mut bytes = Vec::with_capacity(ty.num_bytes());
        decode_binary::<B, R>(reader, ty, &mut bytes)?;
        return Ok(bytes);
    };

    let len = match list_counts {
        ListCountMode::Declared => Value::read::<B, R>(reader, count_ty)?
            .as_count()
            .ok_or(RowError::BadCount)?,
        ListCountMode::Fixed32 => {
            usize::try_from(reader.read_u32::<B>()?).map_err(|_| RowError::BadCount)?
        }
    };

    let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOC) * ty.num_bytes());
    for _ in 0..len {
        decode_binary::<B, R>(reader, ty, &mut bytes)?;
    }
    Ok(bytes)
}

// ============================================================================
// ASCII
// ============================================================================

fn read_ascii<R: BufRead>(reader: &mut R, elements: &mut [Element], empty_lines: EmptyLinePolicy) -> Result<()> {
    let mut buf = Vec::new();

    for element in elements {
        debug!("decoding {} ascii rows of `{}`", element.count(), element.name());
        let count = element.count();
        let name = element.name().to_string();
        let properties = element.properties_mut();
        for p in properties.iter_mut() {
            p.reset_rows(count.min(MAX_PREALLOC));
        }

        for row in 0..count {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Err(Error::Truncated { element: name, row });
            }

            let line = String::from_utf8_lossy(&buf);
            let tokens = tokenize(&line);
            if tokens.is_empty() && !properties.is_empty() {
                match empty_lines {
                    EmptyLinePolicy::Error => return Err(Error::EmptyRow { element: name, row }),
                    EmptyLinePolicy::Skip => {
                        for p in properties.iter_mut() {
                            p.push_row(Vec::new());
                        }
                        continue;
                    }
                }
            }

            let mut tokens = tokens.into_iter();
            for p in properties.iter_mut() {
                let mut next = |ty: ScalarType| -> Result<Value> {
                    match tokens.next() {
                        Some(Token::Number(text)) => decode_text(text, ty),
                        Some(Token::Word(text)) => Err(Error::invalid_value(text, ty, "not a number")),
                        None => Err(Error::Truncated { element: name.clone(), row }),
                    }
                };

                let mut bytes = Vec::with_capacity(p.ty().num_bytes());
                match p.count_type() {
                    None => next(p.ty())?.to_storage(&mut bytes),
                    Some(count_ty) => {
                        let len = next(count_ty)?.as_count().ok_or_else(|| Error::InvalidListCount {
                            element: name.clone(),
                            property: p.name().to_string(),
                            row,
                        })?;
                        for _ in 0..len {
                            next(p.ty())?.to_storage(&mut bytes);
                        }
                    }
                }
                p.push_row(bytes);
            }

            let extra = tokens.count();
            if extra > 0 {
                warn!("ignoring {extra} extra values in `{name}` row {row}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vertex_face_header(encoding: Encoding) -> Header {
        let mut vertex = Element::new("vertex", 2);
        vertex.add_property(Property::new_scalar("x", ScalarType::Float32));
        vertex.add_property(Property::new_scalar("id", ScalarType::Int16));
        let mut face = Element::new("face", 1);
        face.add_property(Property::new_list("idx", ScalarType::Uint8, ScalarType::Uint32));
        Header {
            encoding,
            version: "1.0".into(),
            elements: vec![vertex, face],
            obj_info: Default::default(),
            comments: Vec::new(),
        }
    }

    fn decode(header: &mut Header, body: &[u8], opts: &ReadOptions) -> Result<()> {
        read_body(&mut Cursor::new(body), header, opts)
    }

    fn check_decoded(header: &Header) {
        let vertex = &header.elements[0];
        assert_eq!(vertex.properties()[0].value(1), Some(Value::Float32(-2.5)));
        assert_eq!(vertex.properties()[1].value(0), Some(Value::Int16(-7)));
        let idx = &header.elements[1].properties()[0];
        assert_eq!(idx.num_rows(), 1);
        assert_eq!(idx.list(0), vec![Value::Uint32(0), Value::Uint32(1), Value::Uint32(70000)]);
    }

    #[test]
    fn test_ascii_body() {
        let mut header = vertex_face_header(Encoding::Ascii);
        decode(&mut header, b"1.5 -7\n-2.5 3\n3 0 1 70000\n", &ReadOptions::default()).unwrap();
        check_decoded(&header);
    }

    #[test]
    fn test_binary_bodies_match_ascii() {
        fn body<B: ByteOrder>(counts: ListCountMode) -> Vec<u8> {
            let mut out = Vec::new();
            for v in [Value::Float32(1.5), Value::Int16(-7), Value::Float32(-2.5), Value::Int16(3)] {
                v.write::<B, _>(&mut out).unwrap();
            }
            match counts {
                ListCountMode::Declared => Value::Uint8(3).write::<B, _>(&mut out).unwrap(),
                ListCountMode::Fixed32 => Value::Uint32(3).write::<B, _>(&mut out).unwrap(),
            }
            for v in [0u32, 1, 70000] {
                Value::Uint32(v).write::<B, _>(&mut out).unwrap();
            }
            out
        }

        for counts in [ListCountMode::Declared, ListCountMode::Fixed32] {
            let opts = ReadOptions::default().with_list_counts(counts);

            let mut le = vertex_face_header(Encoding::BinaryLittleEndian);
            decode(&mut le, &body::<LittleEndian>(counts), &opts).unwrap();
            check_decoded(&le);

            let mut be = vertex_face_header(Encoding::BinaryBigEndian);
            decode(&mut be, &body::<BigEndian>(counts), &opts).unwrap();
            check_decoded(&be);

            assert_eq!(le.elements, be.elements);
        }
    }

    #[test]
    fn test_binary_truncated() {
        let mut header = vertex_face_header(Encoding::BinaryLittleEndian);
        let err = decode(&mut header, &[0u8; 9], &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated { ref element, row: 1 } if element == "vertex"));
    }

    #[test]
    fn test_ascii_short_row() {
        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, b"1.5 -7\n-2.5 3\n3 0 1\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated { ref element, row: 0 } if element == "face"));

        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, b"1.5 -7\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated { row: 1, .. }));
    }

    #[test]
    fn test_ascii_bad_tokens() {
        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, b"1.5 seven\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ty: ScalarType::Int16, .. }));

        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, b"1.5 -7\n0 0\n-1 4\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. } | Error::InvalidListCount { .. }));
    }

    #[test]
    fn test_empty_line_policies() {
        let body = b"1.5 -7\n\n3 0 1 70000\n";

        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, body, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyRow { row: 1, .. }));

        let mut header = vertex_face_header(Encoding::Ascii);
        let opts = ReadOptions::default().with_empty_lines(EmptyLinePolicy::Skip);
        decode(&mut header, body, &opts).unwrap();
        let x = &header.elements[0].properties()[0];
        assert_eq!(x.num_rows(), 2);
        assert_eq!(x.row(1), Some(&[][..]));
        assert_eq!(x.value(1), None);
        assert_eq!(header.elements[1].properties()[0].list_len(0), Some(3));
    }

    #[test]
    fn test_extra_ascii_tokens_ignored() {
        let mut header = vertex_face_header(Encoding::Ascii);
        decode(&mut header, b"1.5 -7 99\n-2.5 3\n3 0 1 70000 5\n", &ReadOptions::default()).unwrap();
        check_decoded(&header);
    }

    #[test]
    fn test_negative_binary_count() {
        let mut e = Element::new("face", 1);
        e.add_property(Property::new_list("idx", ScalarType::Int8, ScalarType::Uint8));
        let mut header = Header {
            encoding: Encoding::BinaryLittleEndian,
            version: "1.0".into(),
            elements: vec![e],
            obj_info: Default::default(),
            comments: Vec::new(),
        };
        let err = decode(&mut header, &[0xFF], &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidListCount { row: 0, .. }));
    }

    #[test]
    fn test_binary_element_without_properties() {
        let mut header = vertex_face_header(Encoding::BinaryLittleEndian);
        header.elements.insert(0, Element::new("marker", usize::MAX));

        let mut body = Vec::new();
        for v in [Value::Float32(1.5), Value::Int16(-7), Value::Float32(-2.5), Value::Int16(3)] {
            v.write::<LittleEndian, _>(&mut body).unwrap();
        }
        for v in [Value::Uint8(3), Value::Uint32(0), Value::Uint32(1), Value::Uint32(70000)] {
            v.write::<LittleEndian, _>(&mut body).unwrap();
        }

        decode(&mut header, &body, &ReadOptions::default()).unwrap();
        header.elements.remove(0);
        check_decoded(&header);
    }

    #[test]
    fn test_non_utf8_ascii_token() {
        let mut header = vertex_face_header(Encoding::Ascii);
        let err = decode(&mut header, b"1.5 -7\n-2.5 \xe9\n3 0 1 70000\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ty: ScalarType::Int16, .. }), "unexpected {err:?}");
    }
}
