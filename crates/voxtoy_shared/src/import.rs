//! Boundary normalization for cube lists.
//!
//! External producers (AI responses, pasted exports, preset files) hand
//! over cube lists in several shapes: bare arrays, arrays wrapped in an
//! object, arrays buried in prose or code fences, records keyed `c`
//! instead of `color`. Everything is mapped onto [`Cube`] here, once,
//! before it reaches the engine.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cube::{Color, Cube, Model};

/// Errors from model import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Strict JSON parse failed.
    #[error("malformed model JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Input parsed but is not a JSON array of records.
    #[error("expected a JSON array of cubes, found {0}")]
    NotAnArray(&'static str),

    /// No strategy recovered a non-empty cube list.
    #[error("no cube list found in input")]
    NoModel,
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Object keys whose string value is unwrapped before searching.
const TEXT_KEYS: [&str; 4] = ["answer", "text", "output", "result"];
/// Object keys whose array value is taken as the record list.
const ARRAY_KEYS: [&str; 4] = ["voxels", "data", "result", "output"];

/// Strict parse of a canonical model.
///
/// # Errors
/// Returns [`ImportError::Json`] if the text is not a valid `Model`.
pub fn from_json(text: &str) -> ImportResult<Model> {
    Ok(serde_json::from_str(text)?)
}

/// Serializes a model in canonical form.
///
/// # Errors
/// Returns [`ImportError::Json`] if serialization fails.
pub fn to_json(model: &[Cube]) -> ImportResult<String> {
    Ok(serde_json::to_string(model)?)
}

/// Normalizes a loosely typed JSON array into cubes.
///
/// Records missing a coordinate or a parseable color are skipped.
/// Fractional coordinates are rounded to the nearest grid cell.
///
/// # Errors
/// Returns [`ImportError::NotAnArray`] when `value` is not an array.
pub fn normalize_records(value: &Value) -> ImportResult<Model> {
    let Value::Array(records) = value else {
        return Err(ImportError::NotAnArray(kind_of(value)));
    };

    let model: Model = records.iter().filter_map(normalize_record).collect();
    if model.len() != records.len() {
        debug!(kept = model.len(), total = records.len(), "skipped malformed cube records");
    }
    Ok(model)
}

fn normalize_record(record: &Value) -> Option<Cube> {
    let obj = record.as_object()?;
    let coord = |key: &str| -> Option<i32> {
        let v = obj.get(key)?.as_f64()?;
        v.is_finite().then(|| v.round() as i32)
    };
    let color = obj
        .get("color")
        .or_else(|| obj.get("c"))?
        .as_str()?
        .parse::<Color>()
        .ok()?;

    Some(Cube::new(coord("x")?, coord("y")?, coord("z")?, color))
}

/// Recovers a model from arbitrary text.
///
/// Tried in order: an outer JSON wrapper object, fenced code blocks, the
/// first balanced JSON value, then the whole text after repair.
///
/// # Errors
/// Returns [`ImportError::NoModel`] if nothing yields a non-empty model.
pub fn extract_model(text: &str) -> ImportResult<Model> {
    let mut body = text.to_owned();

    if let Ok(outer) = serde_json::from_str::<Value>(text) {
        if let Some(model) = model_from_value(&outer) {
            return Ok(model);
        }
        if let Some(inner) = TEXT_KEYS
            .iter()
            .find_map(|k| outer.get(*k).and_then(Value::as_str))
        {
            body = inner.to_owned();
        }
    }

    let candidates = fenced_blocks(&body)
        .into_iter()
        .chain(first_balanced(&body))
        .chain(std::iter::once(body.as_str()));

    for candidate in candidates {
        if let Some(model) = parse_with_repair(candidate).as_ref().and_then(model_from_value) {
            return Ok(model);
        }
    }

    Err(ImportError::NoModel)
}

/// Pulls a non-empty model out of an array or a wrapper object.
fn model_from_value(value: &Value) -> Option<Model> {
    let array = match value {
        Value::Array(_) => value,
        Value::Object(_) => ARRAY_KEYS
            .iter()
            .find_map(|k| value.get(*k).filter(|v| v.is_array()))?,
        _ => return None,
    };
    normalize_records(array).ok().filter(|m| !m.is_empty())
}

fn parse_with_repair(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate.trim())
        .or_else(|_| serde_json::from_str(repair(candidate).trim()))
        .ok()
}

/// Strips comments and inserts commas between adjacent objects.
fn repair(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    let mut in_str = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_str {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_str = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_str = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '{' => {
                // `}{` or `}\n{` -> `},{`
                if out.trim_end().ends_with('}') {
                    out.push(',');
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Contents of every ```` ``` ```` fence, optionally tagged `json`.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let Some(end) = after.find("```") else { break };
        let inner = &after[..end];
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        blocks.push(inner.trim());
        rest = &after[end + 3..];
    }
    blocks
}

/// First bracket-balanced `[...]` or `{...}` span, string-aware.
fn first_balanced(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '[' || c == '{')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_str {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_str = false;
            }
            continue;
        }
        match c {
            '"' => in_str = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
