//! Line tokenizer shared by the header grammar and the ASCII body.
//!
//! A line is split on ASCII whitespace and each piece is classified as
//! either a numeric literal or a word. Numeric literals are kept whole
//! (`-1.5e3`, `0x1F`, `.25`), so the grammar can tell an element count
//! from an element name and the body decoder can reject stray words.

/// A single token of a header or body line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Numeric literal, optionally signed and fractional.
    Number(&'a str),
    /// Anything else: keywords, names, type names.
    Word(&'a str),
}

impl<'a> Token<'a> {
    /// Classify a whitespace-free piece of text.
    pub fn classify(text: &'a str) -> Self {
        if is_numeric(text) {
            Self::Number(text)
        } else {
            Self::Word(text)
        }
    }

    /// The token's source text.
    #[inline]
    pub fn text(&self) -> &'a str {
        match *self {
            Self::Number(s) | Self::Word(s) => s,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

/// Split a line into classified tokens.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    line.split_ascii_whitespace().map(Token::classify).collect()
}

/// Returns true if `text` is a numeric literal.
///
/// Accepted forms: optional sign, then decimal digits with optional
/// fraction and exponent, a `0x`/`0o`/`0b` prefixed integer, or one of
/// `inf`, `infinity`, `nan` (any case).
pub fn is_numeric(text: &str) -> bool {
    let body = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    if body.is_empty() {
        return false;
    }

    if ["inf", "infinity", "nan"]
        .iter()
        .any(|w| body.eq_ignore_ascii_case(w))
    {
        return true;
    }

    if let Some(digits) = radix_digits(body) {
        let (rest, radix) = digits;
        return !rest.is_empty() && rest.chars().all(|c| c.is_digit(radix));
    }

    is_decimal(body.as_bytes())
}

/// Split off a `0x`/`0o`/`0b` prefix, returning the digits and radix.
pub(crate) fn radix_digits(body: &str) -> Option<(&str, u32)> {
    let bytes = body.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    Some((&body[2..], radix))
}

fn is_decimal(bytes: &[u8]) -> bool {
    let mut pos = 0;
    let mut mantissa_digits = 0;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
        mantissa_digits += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if pos < bytes.len() && matches!(bytes[pos], b'e' | b'E') {
        pos += 1;
        if pos < bytes.len() && matches!(bytes[pos], b'+' | b'-') {
            pos += 1;
        }
        let exp_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exp_start {
            return false;
        }
    }

    pos == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_header_line() {
        let tokens = tokenize("element vertex 8");
        assert_eq!(
            tokens,
            vec![Token::Word("element"), Token::Word("vertex"), Token::Number("8")]
        );
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let tokens = tokenize("  property\tfloat32   x \r");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text(), "x");
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn test_numbers_stay_fused() {
        let tokens = tokenize("format ascii 1.0");
        assert_eq!(tokens[2], Token::Number("1.0"));

        let tokens = tokenize("-1.5 +2 .25 3. 6.02e23 1E-5");
        assert!(tokens.iter().all(Token::is_number));
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_radix_literals() {
        assert!(is_numeric("0x1F"));
        assert!(is_numeric("-0x10"));
        assert!(is_numeric("0o17"));
        assert!(is_numeric("0b101"));
        assert!(is_numeric("017"));
        assert!(!is_numeric("0x"));
        assert!(!is_numeric("0xZZ"));
        assert!(!is_numeric("0b102"));
    }

    #[test]
    fn test_special_floats() {
        assert!(is_numeric("nan"));
        assert!(is_numeric("-inf"));
        assert!(is_numeric("Infinity"));
    }

    #[test]
    fn test_words() {
        for w in ["vertex", "float32", "x1", "1x", "-", ".", "1e", "1.2.3", "e5", "vertex_indices"] {
            assert_eq!(Token::classify(w), Token::Word(w), "{w}");
        }
    }
}
