//! Inbound chat decoding.
//!
//! Structured text arrives as a JSON tree. Decoding picks the best
//! available rendering, flattens it, cleans formatting codes and
//! whitespace, and drops anything left empty. Malformed input degrades to
//! whatever text can be recovered; decoding never fails.

use serde_json::{Map, Value};

use super::format::{collapse_whitespace, color_code, render_ansi, strip_codes, SECTION};
use crate::protocol::ChatPayload;

/// Translation key of a player chat line.
pub const CHAT_TRANSLATION: &str = "chat.type.text";

/// Nesting depth beyond which only plain `text` leaves are collected.
pub const MAX_DEPTH: usize = 32;

/// Fallback text when a kick carries no readable reason.
pub const UNKNOWN_REASON: &str = "Unknown";

/// Turns chat payloads into display lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    colors: bool,
}

impl Decoder {
    /// Create a decoder. With `colors`, formatting becomes ANSI escapes
    /// instead of being stripped.
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// Whether colors are rendered.
    pub fn colors(&self) -> bool {
        self.colors
    }

    /// Decode a payload into one display line, or `None` if nothing is left.
    pub fn decode(&self, payload: &ChatPayload) -> Option<String> {
        let raw = self.render(payload);
        self.finish(&raw)
    }

    fn render(&self, payload: &ChatPayload) -> String {
        if let Some(line) = self.player_chat(&payload.json) {
            return line;
        }
        if let Some(plain) = payload.plain.as_deref() {
            if !plain.trim().is_empty() {
                return plain.to_string();
            }
        }
        flatten_styled(&payload.json, self.colors)
    }

    /// `chat.type.text` with sender and body renders as `[sender] body`.
    fn player_chat(&self, json: &Value) -> Option<String> {
        let obj = json.as_object()?;
        if obj.get("translate").and_then(Value::as_str) != Some(CHAT_TRANSLATION) {
            return None;
        }
        let args = obj.get("with")?.as_array()?;
        if args.len() < 2 {
            return None;
        }
        let sender = flatten_styled(&args[0], self.colors);
        let body = flatten_styled(&args[1], self.colors);
        Some(format!("[{sender}] {body}"))
    }

    fn finish(&self, raw: &str) -> Option<String> {
        let visible = collapse_whitespace(&strip_codes(raw));
        if visible.is_empty() {
            return None;
        }
        if self.colors {
            Some(collapse_whitespace(&render_ansi(raw)))
        } else {
            Some(visible)
        }
    }
}

/// Flatten a structured-text tree into plain text.
pub fn flatten(value: &Value) -> String {
    flatten_styled(value, false)
}

fn flatten_styled(value: &Value, colors: bool) -> String {
    let mut out = String::new();
    flatten_into(value, colors, 0, &mut out);
    out
}

fn flatten_into(value: &Value, colors: bool, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        collect_text(value, out);
        return;
    }
    match value {
        Value::Null => {},
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Array(items) => {
            for item in items {
                flatten_into(item, colors, depth + 1, out);
            }
        },
        Value::Object(obj) => flatten_object(obj, colors, depth, out),
    }
}

/// Walk without recursion, keeping only string leaves, `text` and `extra`.
fn collect_text(value: &Value, out: &mut String) {
    let mut stack = vec![value];
    while let Some(value) = stack.pop() {
        match value {
            Value::String(s) => out.push_str(s),
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(obj) => {
                if let Some(extra) = obj.get("extra") {
                    stack.push(extra);
                }
                if let Some(text) = obj.get("text").filter(|t| t.is_string()) {
                    stack.push(text);
                }
            },
            _ => {},
        }
    }
}

fn flatten_object(obj: &Map<String, Value>, colors: bool, depth: usize, out: &mut String) {
    if colors {
        if let Some(code) = obj.get("color").and_then(Value::as_str).and_then(color_code) {
            out.push(SECTION);
            out.push(code);
        }
    }

    match obj.get("text") {
        Some(text @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            flatten_into(text, colors, depth + 1, out);
        },
        _ => {
            if let Some(key) = obj.get("translate").and_then(Value::as_str) {
                translate_into(obj, key, colors, depth, out);
            }
        },
    }

    if let Some(extra) = obj.get("extra") {
        flatten_into(extra, colors, depth + 1, out);
    }
}

/// Translation templates are not resolved: use the fallback, else the joined
/// arguments, else the key itself.
fn translate_into(obj: &Map<String, Value>, key: &str, colors: bool, depth: usize, out: &mut String) {
    if let Some(fallback) = obj.get("fallback").and_then(Value::as_str) {
        out.push_str(fallback);
        return;
    }
    let args: Vec<String> = obj
        .get("with")
        .and_then(Value::as_array)
        .map(|args| {
            args.iter()
                .map(|arg| {
                    let mut s = String::new();
                    flatten_into(arg, colors, depth + 1, &mut s);
                    s
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if args.is_empty() {
        out.push_str(key);
    } else {
        out.push_str(&args.join(" "));
    }
}

/// Readable kick reason.
///
/// Accepts a plain string (which may itself hold serialized JSON), a
/// structured-text tree, or an NBT-style `{"value": {"text": {"value": ..}}}`
/// wrapper. Falls back to the serialized payload, then to `"Unknown"`.
pub fn kick_reason(reason: &Value) -> String {
    let raw = match reason {
        Value::Null => String::new(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => kick_reason_tree(&parsed),
            _ => s.clone(),
        },
        other => kick_reason_tree(other),
    };
    let line = collapse_whitespace(&strip_codes(&raw));
    if line.is_empty() {
        UNKNOWN_REASON.to_string()
    } else {
        line
    }
}

fn kick_reason_tree(reason: &Value) -> String {
    if let Some(nbt) = reason
        .pointer("/value/text/value")
        .and_then(Value::as_str)
    {
        return nbt.to_string();
    }
    let text = flatten(reason);
    if text.trim().is_empty() {
        match reason {
            Value::Object(obj) if obj.is_empty() => String::new(),
            Value::Array(items) if items.is_empty() => String::new(),
            other => other.to_string(),
        }
    } else {
        text
    }
}
