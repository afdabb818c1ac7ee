//! Header grammar: turns the text lines up to `end_header` into a schema.

use std::borrow::Cow;
use std::fmt;
use std::io::{BufRead, Read};

use tracing::{trace, warn};

use super::format::*;
use super::token::{tokenize, Token};
use crate::codec::parse_integer;
use crate::document::{Element, ObjInfo, Property};
use crate::util::{Error, Result, ScalarType};

/// Parsed PLY header: body encoding, schema and free-form metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub encoding: Encoding,
    /// Version token of the `format` line, kept verbatim.
    pub version: String,
    pub elements: Vec<Element>,
    pub obj_info: ObjInfo,
    pub comments: Vec<String>,
}

/// Header text in normalized order: magic and format line, comments,
/// `obj_info` lines, then the schema. Where comments sat between elements
/// is not kept.
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{PLY_MAGIC}")?;
        writeln!(f, "{FORMAT_KEYWORD} {} {}", self.encoding, self.version)?;
        for comment in &self.comments {
            if comment.is_empty() {
                writeln!(f, "{COMMENT_KEYWORD}")?;
            } else {
                writeln!(f, "{COMMENT_KEYWORD} {comment}")?;
            }
        }
        write!(f, "{}", self.obj_info)?;
        for element in &self.elements {
            writeln!(f, "{element}")?;
        }
        writeln!(f, "{END_HEADER}")
    }
}

/// Longest first line still accepted as the magic, trailing whitespace included.
const MAX_MAGIC_LINE: u64 = 64;
/// Longest accepted header line.
const MAX_HEADER_LINE: usize = 1 << 16;

/// Line source that tracks the 1-based number of the last line read.
struct HeaderLines<'r, R> {
    reader: &'r mut R,
    line: usize,
    buf: Vec<u8>,
}

impl<'r, R: BufRead> HeaderLines<'r, R> {
    fn new(reader: &'r mut R) -> Self {
        Self { reader, line: 0, buf: Vec::new() }
    }

    /// Read the first line and check it is the `ply` magic, looking at no more
    /// than `MAX_MAGIC_LINE` bytes so arbitrary binary input is rejected early.
    fn expect_magic(&mut self, file: &str) -> Result<()> {
        self.buf.clear();
        self.reader.by_ref().take(MAX_MAGIC_LINE).read_until(b'\n', &mut self.buf)?;
        self.line = 1;
        if self.buf.trim_ascii() != PLY_MAGIC.as_bytes() {
            return Err(Error::NotPly { file: file.to_string() });
        }
        Ok(())
    }

    /// Next line with surrounding whitespace removed, `None` at end of input.
    fn next_line(&mut self, file: &str) -> Result<Option<&[u8]>> {
        self.buf.clear();
        let limit = MAX_HEADER_LINE as u64 + 1;
        if self.reader.by_ref().take(limit).read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        if self.buf.len() > MAX_HEADER_LINE {
            return Err(Error::malformed(file, self.line, "header line too long"));
        }
        Ok(Some(self.buf.trim_ascii()))
    }
}

/// Parse a PLY header, leaving `reader` positioned at the first body byte.
///
/// `file` names the source in error messages. Only `comment` and `obj_info`
/// lines may hold bytes that are not UTF-8; they are decoded lossily.
pub fn parse_header<R: BufRead>(reader: &mut R, file: &str) -> Result<Header> {
    let mut lines = HeaderLines::new(reader);
    lines.expect_magic(file)?;

    let missing_end = || Error::MissingEndHeader { file: file.to_string() };

    let line_no = lines.line + 1;
    let raw = lines.next_line(file)?.ok_or_else(missing_end)?;
    let line = structural(raw, file, line_no)?;
    let (encoding, version) = parse_format_line(line, file, line_no)?;

    let mut header = Header {
        encoding,
        version,
        elements: Vec::new(),
        obj_info: ObjInfo::new(),
        comments: Vec::new(),
    };

    loop {
        let line_no = lines.line + 1;
        let raw = lines.next_line(file)?.ok_or_else(missing_end)?;
        let line = String::from_utf8_lossy(raw);
        let tokens = tokenize(&line);
        trace!(line = line_no, "{}", line);

        let Some(keyword) = tokens.first() else {
            return Err(Error::malformed(file, line_no, "empty header line"));
        };

        match keyword.text() {
            COMMENT_KEYWORD => header.comments.push(rest_of_line(&line, 1).to_string()),
            OBJ_INFO_KEYWORD => {
                let key = tokens
                    .get(1)
                    .ok_or_else(|| Error::malformed(file, line_no, "obj_info without a key"))?;
                header.obj_info.set(key.text(), rest_of_line(&line, 2));
            }
            _ if matches!(line, Cow::Owned(_)) => {
                return Err(Error::malformed(file, line_no, "header line is not valid UTF-8"));
            }
            ELEMENT_KEYWORD => {
                let element = parse_element(&tokens, file, line_no)?;
                header.elements.push(element);
            }
            PROPERTY_KEYWORD => {
                let property = parse_property(&tokens, file, line_no)?;
                let element = header
                    .elements
                    .last_mut()
                    .ok_or_else(|| Error::PropertyOutsideElement {
                        file: file.to_string(),
                        line: line_no,
                    })?;
                if element.property(property.name()).is_some() {
                    warn!(
                        "{file}:{line_no}: duplicate property `{}` on element `{}`",
                        property.name(),
                        element.name()
                    );
                }
                element.add_property(property);
            }
            END_HEADER => break,
            other => warn!("{file}:{line_no}: ignoring unknown header keyword `{other}`"),
        }
    }

    Ok(header)
}

/// Schema lines must be valid UTF-8.
fn structural<'a>(raw: &'a [u8], file: &str, line_no: usize) -> Result<&'a str> {
    std::str::from_utf8(raw).map_err(|_| Error::malformed(file, line_no, "header line is not valid UTF-8"))
}

fn parse_format_line(line: &str, file: &str, line_no: usize) -> Result<(Encoding, String)> {
    let tokens = tokenize(line);
    if tokens.len() != 3 {
        return Err(Error::malformed(
            file,
            line_no,
            format!("expected `format <mode> <version>`, got {} tokens", tokens.len()),
        ));
    }
    if tokens[0].text() != FORMAT_KEYWORD {
        return Err(Error::malformed(file, line_no, "expected `format` line"));
    }
    let encoding = Encoding::from_keyword(tokens[1].text()).ok_or_else(|| {
        Error::malformed(file, line_no, format!("unknown format `{}`", tokens[1].text()))
    })?;
    Ok((encoding, tokens[2].text().to_string()))
}

fn parse_element(tokens: &[Token<'_>], file: &str, line_no: usize) -> Result<Element> {
    let [_, name, count] = tokens else {
        return Err(Error::malformed(file, line_no, "expected `element <name> <count>`"));
    };
    let invalid_count = || {
        Error::malformed(file, line_no, format!("invalid element count `{}`", count.text()))
    };
    if !count.is_number() {
        return Err(invalid_count());
    }
    let count = parse_integer(count.text()).map_err(|_| invalid_count())?;
    let count = usize::try_from(count).map_err(|_| invalid_count())?;
    Ok(Element::new(name.text(), count))
}

fn parse_property(tokens: &[Token<'_>], file: &str, line_no: usize) -> Result<Property> {
    let scalar_type = |token: &Token<'_>| {
        ScalarType::from_name(token.text()).ok_or_else(|| Error::UnknownType {
            file: file.to_string(),
            line: line_no,
            name: token.text().to_string(),
        })
    };

    match tokens {
        [_, list, count_ty, item_ty, name] if list.text() == LIST_KEYWORD => {
            let count_ty = scalar_type(count_ty)?;
            if !count_ty.is_integer() {
                return Err(Error::malformed(
                    file,
                    line_no,
                    format!("list count type must be an integer, got `{count_ty}`"),
                ));
            }
            Ok(Property::new_list(name.text(), count_ty, scalar_type(item_ty)?))
        }
        [_, ty, name] if ty.text() != LIST_KEYWORD => Ok(Property::new_scalar(name.text(), scalar_type(ty)?)),
        _ => Err(Error::malformed(
            file,
            line_no,
            "expected `property <type> <name>` or `property list <count type> <type> <name>`",
        )),
    }
}

/// Text after the first `skip` whitespace separated tokens of `line`.
fn rest_of_line(line: &str, skip: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..skip {
        let end = rest.find(|c: char| c.is_ascii_whitespace()).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest.trim_end()
}
