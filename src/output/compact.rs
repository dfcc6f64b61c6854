//! Token-oriented compact notation.
//!
//! Objects are written as `key: value` lines indented by two spaces per level.
//! Arrays carry their length in the header: `tags[2]: a,b` for primitives,
//! `rows[2]{id,name}:` followed by one comma-separated line per element for
//! uniform objects of primitives, and `- ` items for anything else.

use super::EncodeError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub const MAX_DEPTH: usize = 32;

const INDENT: &str = "  ";

static RE_BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap());
static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

pub fn to_compact(value: &Value) -> Result<String, EncodeError> {
    let mut lines = Vec::new();
    match value {
        Value::Object(map) => write_fields(&mut lines, map, 0, 0)?,
        Value::Array(items) => write_array(&mut lines, None, items, 0, 0)?,
        primitive => lines.push(encode_primitive(primitive)?),
    }
    Ok(lines.join("\n"))
}

fn write_fields(
    lines: &mut Vec<String>,
    map: &Map<String, Value>,
    indent: usize,
    depth: usize,
) -> Result<(), EncodeError> {
    for (key, value) in map {
        write_field(lines, key, value, indent, depth)?;
    }
    Ok(())
}

fn write_field(
    lines: &mut Vec<String>,
    key: &str,
    value: &Value,
    indent: usize,
    depth: usize,
) -> Result<(), EncodeError> {
    if depth > MAX_DEPTH {
        return Err(EncodeError::DepthExceeded(MAX_DEPTH));
    }
    let key = encode_key(key)?;
    match value {
        Value::Object(map) => {
            lines.push(format!("{}{}:", INDENT.repeat(indent), key));
            write_fields(lines, map, indent + 1, depth + 1)
        }
        Value::Array(items) => write_array(lines, Some(key.as_str()), items, indent, depth + 1),
        primitive => {
            lines.push(format!(
                "{}{}: {}",
                INDENT.repeat(indent),
                key,
                encode_primitive(primitive)?
            ));
            Ok(())
        }
    }
}

/// Writes an array header and its body. `key` is already encoded; `None` is
/// a root or list-item array.
fn write_array(
    lines: &mut Vec<String>,
    key: Option<&str>,
    items: &[Value],
    indent: usize,
    depth: usize,
) -> Result<(), EncodeError> {
    if depth > MAX_DEPTH {
        return Err(EncodeError::DepthExceeded(MAX_DEPTH));
    }
    let prefix = format!("{}{}[{}]", INDENT.repeat(indent), key.unwrap_or(""), items.len());

    if items.is_empty() {
        lines.push(format!("{}:", prefix));
        return Ok(());
    }

    if items.iter().all(is_primitive) {
        let values = items
            .iter()
            .map(encode_primitive)
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(format!("{}: {}", prefix, values.join(",")));
        return Ok(());
    }

    if let Some(fields) = tabular_fields(items) {
        let header = fields
            .iter()
            .map(|field| encode_key(field))
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(format!("{}{{{}}}:", prefix, header.join(",")));
        for item in items {
            if let Value::Object(map) = item {
                let row = fields
                    .iter()
                    .map(|field| encode_primitive(&map[*field]))
                    .collect::<Result<Vec<_>, _>>()?;
                lines.push(format!("{}{}", INDENT.repeat(indent + 1), row.join(",")));
            }
        }
        return Ok(());
    }

    lines.push(format!("{}:", prefix));
    for item in items {
        write_list_item(lines, item, indent + 1, depth + 1)?;
    }
    Ok(())
}

fn write_list_item(
    lines: &mut Vec<String>,
    item: &Value,
    indent: usize,
    depth: usize,
) -> Result<(), EncodeError> {
    if depth > MAX_DEPTH {
        return Err(EncodeError::DepthExceeded(MAX_DEPTH));
    }
    let marker = format!("{}- ", INDENT.repeat(indent));
    match item {
        Value::Object(map) if map.is_empty() => {
            lines.push(format!("{}-", INDENT.repeat(indent)));
            Ok(())
        }
        Value::Object(map) => {
            // The first field shares the hyphen line; the rest align under it.
            let mut entries = map.iter();
            if let Some((key, value)) = entries.next() {
                let start = lines.len();
                write_field(lines, key, value, indent + 1, depth + 1)?;
                hang_on_marker(&mut lines[start], &marker, indent + 1);
            }
            for (key, value) in entries {
                write_field(lines, key, value, indent + 1, depth + 1)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            let start = lines.len();
            write_array(lines, None, items, indent + 1, depth + 1)?;
            hang_on_marker(&mut lines[start], &marker, indent + 1);
            Ok(())
        }
        primitive => {
            lines.push(format!("{}{}", marker, encode_primitive(primitive)?));
            Ok(())
        }
    }
}

fn hang_on_marker(line: &mut String, marker: &str, indent: usize) {
    let width = INDENT.len() * indent;
    line.replace_range(..width, marker);
}

/// Field order for a tabular array: every element is a non-empty object of
/// primitives with the same keys in the same order.
fn tabular_fields(items: &[Value]) -> Option<Vec<&str>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in items {
        let map = item.as_object()?;
        if map.len() != fields.len() {
            return None;
        }
        for ((key, value), field) in map.iter().zip(&fields) {
            if key.as_str() != *field || !is_primitive(value) {
                return None;
            }
        }
    }
    Some(fields)
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn encode_primitive(value: &Value) -> Result<String, EncodeError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => encode_string(s),
        // Callers only pass primitives.
        Value::Object(_) | Value::Array(_) => Ok(String::new()),
    }
}

fn encode_key(key: &str) -> Result<String, EncodeError> {
    if RE_BARE_KEY.is_match(key) {
        Ok(key.to_string())
    } else {
        quote(key)
    }
}

fn encode_string(s: &str) -> Result<String, EncodeError> {
    if needs_quotes(s) {
        quote(s)
    } else {
        reject_control(s)?;
        Ok(s.to_string())
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || matches!(s, "true" | "false" | "null")
        || RE_NUMERIC.is_match(s)
        || s.starts_with('-')
        || s.chars().any(|c| {
            matches!(
                c,
                ':' | '"' | '\\' | '[' | ']' | '{' | '}' | ',' | '\n' | '\r' | '\t'
            )
        })
}

fn quote(s: &str) -> Result<String, EncodeError> {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => return Err(EncodeError::UnsupportedCharacter(c)),
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(out)
}

fn reject_control(s: &str) -> Result<(), EncodeError> {
    match s.chars().find(|c| c.is_control()) {
        Some(c) => Err(EncodeError::UnsupportedCharacter(c)),
        None => Ok(()),
    }
}
