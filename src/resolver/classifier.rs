//! Tells script entries apart from plain data.
//!
//! A string is a script when it starts with [`MARKER`]; the rest of the
//! string is the body. An array is a script when every element is a string
//! and the first one is exactly the marker; the remaining elements are the
//! body lines. An object holding at least one script member is compound.
//! Everything else is plain data.

use indexmap::IndexMap;
use serde_json::Value;

pub const MARKER: &str = "<(";

/// Script text plus where it sits in the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSource {
    pub body: String,
    /// Source lines before the first body line.
    pub line_offset: usize,
    /// Characters before the body on its first line.
    pub column_offset: usize,
}

impl ScriptSource {
    /// The script held by `value`, if it is one.
    pub fn from_value(value: &Value) -> Option<ScriptSource> {
        match value {
            Value::String(s) => s.strip_prefix(MARKER).map(|body| ScriptSource {
                body: body.to_string(),
                line_offset: 0,
                column_offset: MARKER.chars().count(),
            }),
            Value::Array(items) => {
                let lines = string_items(items)?;
                match lines.split_first() {
                    Some((first, rest)) if *first == MARKER => Some(ScriptSource {
                        body: rest.join("\n"),
                        line_offset: 1,
                        column_offset: 0,
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Script text with or without the leading marker.
    pub fn from_text(text: &str) -> ScriptSource {
        match text.strip_prefix(MARKER) {
            Some(body) => ScriptSource {
                body: body.to_string(),
                line_offset: 0,
                column_offset: MARKER.chars().count(),
            },
            None => ScriptSource {
                body: text.to_string(),
                line_offset: 0,
                column_offset: 0,
            },
        }
    }
}

fn string_items(items: &[Value]) -> Option<Vec<&str>> {
    items.iter().map(Value::as_str).collect()
}

/// One member of a compound entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CompoundMember {
    Script(ScriptSource),
    Plain(Value),
}

/// What an entry value turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Plain(Value),
    Script(ScriptSource),
    Compound(IndexMap<String, CompoundMember>),
}

impl EntryValue {
    pub fn needs_evaluation(&self) -> bool {
        !matches!(self, EntryValue::Plain(_))
    }
}

pub fn is_script(value: &Value) -> bool {
    ScriptSource::from_value(value).is_some()
}

/// Classification never fails; anything unrecognised is plain.
pub fn classify(value: &Value) -> EntryValue {
    if let Some(source) = ScriptSource::from_value(value) {
        return EntryValue::Script(source);
    }
    if let Value::Object(members) = value {
        if members.values().any(is_script) {
            let members = members
                .iter()
                .map(|(name, member)| {
                    let member = match ScriptSource::from_value(member) {
                        Some(source) => CompoundMember::Script(source),
                        None => CompoundMember::Plain(member.clone()),
                    };
                    (name.clone(), member)
                })
                .collect();
            return EntryValue::Compound(members);
        }
    }
    EntryValue::Plain(value.clone())
}

/// The original source as text: strings as they are, line arrays joined
/// with newlines, anything else as JSON.
pub fn source_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => match string_items(items) {
            Some(lines) => lines.join("\n"),
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}
