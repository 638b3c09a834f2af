//! Part classification for presentation.
//!
//! Pure, total, and stateless: every part maps to exactly one rendering,
//! with a catch-all so protocol evolution can never make this panic.

use serde_json::Value;

use crate::session::message::Part;

/// Application-level payload kinds the client knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Retrieved document references backing the answer.
    Sources,
    /// Inline citation markers.
    Citations,
    /// Follow-up question suggestions.
    Suggestions,
}

impl DataKind {
    fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "sources" => Some(DataKind::Sources),
            "citations" => Some(DataKind::Citations),
            "suggestions" => Some(DataKind::Suggestions),
            _ => None,
        }
    }
}

/// Which renderer handles a part.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendering<'a> {
    /// Assistant prose.
    Prose(&'a str),
    /// Structured tool block with a humanized header.
    ToolBlock {
        title: String,
        input: Option<&'a Value>,
        body: ToolBody<'a>,
    },
    /// Known structured payload.
    DataCard {
        kind: DataKind,
        payload: &'a Value,
    },
    /// Unrecognized subtype or forward-compat part; not an error.
    Nothing,
}

/// Body of a tool block, by which fields are populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolBody<'a> {
    /// Still waiting for output.
    Pending,
    Output(&'a Value),
    Error(&'a str),
}

/// Routes a part to its renderer.
pub fn classify(part: &Part) -> Rendering<'_> {
    match part {
        Part::Text { text } => Rendering::Prose(text),
        Part::Tool {
            tool_name,
            input,
            output,
            error,
            ..
        } => {
            // Error view takes precedence when both fields are set.
            let body = if let Some(err) = error {
                ToolBody::Error(err)
            } else if let Some(out) = output {
                ToolBody::Output(out)
            } else {
                ToolBody::Pending
            };
            Rendering::ToolBlock {
                title: humanize_tool_name(tool_name),
                input: input.as_ref(),
                body,
            }
        }
        Part::Data { subtype, payload } => match DataKind::from_subtype(subtype) {
            Some(kind) => Rendering::DataCard { kind, payload },
            None => Rendering::Nothing,
        },
        Part::Other { .. } => Rendering::Nothing,
    }
}

/// Turns a wire tool name into a display header.
///
/// Splits on underscores, hyphens, and camelCase boundaries, then
/// capitalizes each word: `search_documents` -> `Search Documents`.
pub fn humanize_tool_name(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else {
            if ch.is_uppercase() && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
