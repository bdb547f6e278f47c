// Source generation for edited trees
// A parsed module prints as its own text with the recorded edits spliced in,
// so comments and layout outside the edited nodes come through unchanged.

use std::cmp::Reverse;

use super::*;

/// Trait for types that can generate their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for SyntaxTree {
    fn to_source(&self) -> String {
        splice(self.source(), self.edits())
    }
}

impl ToSource for StrLit {
    fn to_source(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => quote(&self.value, '"'),
        }
    }
}

/// Apply edits to `source`. An edit overlapping one already applied is
/// dropped; at equal starts the wider edit goes first.
pub fn splice(source: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.range.start, Reverse(edit.range.end)));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in ordered {
        if edit.range.start < cursor {
            continue;
        }
        let Some(kept) = source.get(cursor..edit.range.start) else {
            continue;
        };
        if source.get(edit.range.start..edit.range.end).is_none() {
            continue;
        }
        out.push_str(kept);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(source.get(cursor..).unwrap_or_default());
    out
}

/// Text written for a node created by an edit
pub(crate) fn leaf_source(kind: &NodeKind) -> Option<String> {
    match kind {
        NodeKind::StringLiteral(literal) => Some(literal.to_source()),
        NodeKind::Identifier(name) | NodeKind::Binding(name) => Some(name.clone()),
        _ => None,
    }
}

/// Range deleted together with a statement.
///
/// Trailing blanks always go. A statement alone on its line takes the whole
/// line with it; one ending a line takes its leading blanks instead.
pub(crate) fn statement_extent(source: &str, range: TextRange) -> TextRange {
    let bytes = source.as_bytes();
    let is_blank = |byte: u8| byte == b' ' || byte == b'\t';

    let mut end = range.end.min(bytes.len());
    while end < bytes.len() && is_blank(bytes[end]) {
        end += 1;
    }
    let mut start = range.start.min(end);
    while start > 0 && is_blank(bytes[start - 1]) {
        start -= 1;
    }

    let owns_line_start = start == 0 || bytes[start - 1] == b'\n';
    let owns_line_end = end == bytes.len() || bytes[end] == b'\n' || bytes[end] == b'\r';

    match (owns_line_start, owns_line_end) {
        (true, true) => {
            if bytes[end..].starts_with(b"\r\n") {
                end += 2;
            } else if end < bytes.len() {
                end += 1;
            }
            TextRange::new(start, end)
        }
        (false, true) => TextRange::new(start, end),
        _ => TextRange::new(range.start.min(end), end),
    }
}

/// Quote a string value as a JavaScript string literal
pub fn quote(value: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delimiter);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Value of a JavaScript string literal, given its text with quotes
pub fn unquote(raw: &str) -> String {
    let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut rest = inner;

    while let Some(index) = rest.find('\\') {
        out.push_str(&rest[..index]);
        rest = &rest[index + 1..];
        let Some(escaped) = rest.chars().next() else {
            break;
        };
        rest = &rest[escaped.len_utf8()..];

        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // Line continuations
            '\r' => rest = rest.strip_prefix('\n').unwrap_or(rest),
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => match hex_value(rest, 2) {
                Some(code) => {
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    rest = &rest[2..];
                }
                None => out.push('x'),
            },
            'u' => match unicode_escape(rest) {
                Some((code, used)) => {
                    out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    rest = &rest[used..];
                }
                None => out.push('u'),
            },
            other => out.push(other),
        }
    }
    out.push_str(rest);
    out
}

fn hex_value(text: &str, digits: usize) -> Option<u32> {
    let hex = text.get(..digits)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Code point of a `\u` escape whose backslash and `u` are already consumed,
/// with the number of bytes it spans. Surrogate pairs are combined.
fn unicode_escape(text: &str) -> Option<(u32, usize)> {
    if let Some(braced) = text.strip_prefix('{') {
        let close = braced.find('}')?;
        let digits = &braced[..close];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let code = u32::from_str_radix(digits, 16).ok()?;
        return Some((code, close + 2));
    }

    let high = hex_value(text, 4)?;
    if (0xD800..=0xDBFF).contains(&high) {
        let low = text
            .get(4..)
            .and_then(|tail| tail.strip_prefix("\\u"))
            .and_then(|tail| hex_value(tail, 4))
            .filter(|low| (0xDC00..=0xDFFF).contains(low));
        if let Some(low) = low {
            return Some((0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00), 10));
        }
    }
    Some((high, 4))
}
