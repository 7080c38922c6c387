//! Line-oriented text form of a store.
//!
//! Each scalar entry becomes one line, `"key" kind literal`, in key
//! order. Objects have no text form and are left out of
//! [`to_text`](ValueStore::to_text); [`dump`](ValueStore::dump) shows them
//! by type name for inspection.

use std::fmt::Write as _;

use super::ValueStore;
use crate::config::Settings;
use crate::core::Value;
use crate::util::{Error, Result};

impl ValueStore {
    /// Render every named non-object entry, one per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for key in self.keys() {
            let (Some(name), Some(value)) = (key.as_str(), self.values.get(&key)) else {
                continue;
            };
            if matches!(value, Value::Object(_)) {
                continue;
            }
            write_key(&mut out, name);
            out.push(' ');
            write_literal(&mut out, value, None);
            out.push('\n');
        }
        out
    }

    /// Parse text produced by [`to_text`](Self::to_text).
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn from_text(text: &str) -> Result<ValueStore> {
        let mut store = ValueStore::new();
        store.freeze();
        let parsed = parse_into(&mut store, text);
        store.thaw();
        parsed.map(|()| store)
    }

    /// Human-readable listing including objects, shaped by `settings`.
    pub fn dump(&self, settings: &Settings) -> String {
        let mut out = String::new();
        for (key, value) in self.keys().into_iter().filter_map(|k| Some((k, self.values.get(&k)?))) {
            if let Value::Object(object) = value {
                if !settings.dump_show_objects {
                    continue;
                }
                write_key(&mut out, &key.to_string());
                let _ = write!(out, " object {}", object.type_name());
            } else {
                write_key(&mut out, &key.to_string());
                out.push(' ');
                write_literal(&mut out, value, Some(settings.dump_max_string_len));
            }
            out.push('\n');
        }
        out
    }
}

fn parse_into(store: &mut ValueStore, text: &str) -> Result<()> {
    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |reason: &str| Error::TextParse {
            line: n + 1,
            reason: reason.to_owned(),
        };

        let (key, rest) = parse_quoted(line).ok_or_else(|| err("expected quoted key"))?;
        if key.is_empty() {
            return Err(err("empty key"));
        }
        let rest = rest.trim_start();
        let (kind, literal) = rest.split_once(' ').ok_or_else(|| err("expected kind and value"))?;
        let literal = literal.trim();

        let value = match kind {
            "boolean" => match literal {
                "True" => Value::Bool(true),
                "False" => Value::Bool(false),
                _ => return Err(err("boolean must be True or False")),
            },
            "char" => u8::from_str_radix(literal, 16)
                .map(Value::Byte)
                .map_err(|_| err("char must be two hex digits"))?,
            "int32" => literal
                .parse()
                .map(Value::Int32)
                .map_err(|e| err(&format!("bad int32: {e}")))?,
            "int64" => literal
                .parse()
                .map(Value::Int64)
                .map_err(|e| err(&format!("bad int64: {e}")))?,
            "double" => literal
                .parse()
                .map(Value::Double)
                .map_err(|e| err(&format!("bad double: {e}")))?,
            "string" => {
                let (s, tail) = parse_quoted(literal).ok_or_else(|| err("unterminated string"))?;
                if !tail.trim().is_empty() {
                    return Err(err("trailing text after string"));
                }
                Value::String(s)
            }
            other => return Err(err(&format!("unknown kind '{other}'"))),
        };
        store.set(key.as_str(), value);
    }
    Ok(())
}

fn write_key(out: &mut String, key: &str) {
    write_quoted(out, key, None);
}

fn write_literal(out: &mut String, value: &Value, max_len: Option<usize>) {
    out.push_str(value.kind().name());
    out.push(' ');
    match value {
        Value::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
        Value::Byte(c) => {
            let _ = write!(out, "{c:02X}");
        }
        Value::Int32(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Int64(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Double(v) => {
            let _ = write!(out, "{v:?}");
        }
        Value::String(s) => write_quoted(out, s, max_len),
        Value::Object(object) => out.push_str(object.type_name()),
    }
}

fn write_quoted(out: &mut String, s: &str, max_len: Option<usize>) {
    out.push('"');
    let mut chars = s.chars();
    let limit = max_len.unwrap_or(usize::MAX);
    for c in chars.by_ref().take(limit) {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        out.push_str("...");
    }
    out.push('"');
}

/// Split a leading double-quoted string off `s`, undoing escapes.
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let body = s.strip_prefix('"')?;
    let mut out = String::new();
    let mut iter = body.char_indices();
    while let Some((i, c)) = iter.next() {
        match c {
            '"' => return Some((out, &body[i + 1..])),
            '\\' => {
                let (_, e) = iter.next()?;
                out.push(match e {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            c => out.push(c),
        }
    }
    None
}
