//! Context objects and `@@key` placeholder substitution

use regex::Regex;
use serde_json::Value;

use crate::directive;

/// Flat mapping of placeholder name to value
pub type Context = serde_json::Map<String, Value>;

/// Outcome of reading a directive's context object
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedContext {
    /// The directive has no context object
    Absent,
    /// A JSON object was parsed
    Parsed(Context),
    /// The text could not be read as a JSON object
    Malformed { raw: String, reason: String },
}

impl ParsedContext {
    /// Parse the raw context captured by the directive scanner
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Absent;
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::Parsed(map),
            Ok(other) => Self::Malformed {
                raw: raw.to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            },
            Err(e) => Self::Malformed {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// String form of a context value
///
/// Strings are used verbatim; everything else uses its JSON rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace `@@key` for every key in `context`
///
/// Longer keys take precedence where one key is a prefix of another. The text
/// is scanned once, so substituted values are never substituted again.
pub fn substitute(text: &str, context: &Context) -> String {
    let mut keys: Vec<&str> = context.keys().map(String::as_str).filter(|k| !k.is_empty()).collect();
    if keys.is_empty() || !text.contains("@@") {
        return text.to_string();
    }
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let alternation = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
    let pattern = match Regex::new(&format!("@@(?:{})", alternation)) {
        Ok(re) => re,
        Err(_) => return substitute_sequential(text, &keys, context),
    };

    pattern
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let key = &caps[0][2..];
            context.get(key).map(stringify).unwrap_or_default()
        })
        .into_owned()
}

// Used only when the key set is too large for one pattern
fn substitute_sequential(text: &str, keys: &[&str], context: &Context) -> String {
    let mut out = text.to_string();
    for key in keys {
        if let Some(value) = context.get(*key) {
            out = out.replace(&format!("@@{}", key), &stringify(value));
        }
    }
    out
}

/// Keys whose string value contains an include directive
pub fn keys_with_directives(context: &Context) -> Vec<&str> {
    context
        .iter()
        .filter(|(_, v)| matches!(v, Value::String(s) if directive::contains_directive(s)))
        .map(|(k, _)| k.as_str())
        .collect()
}
