//! logos-based binding templates: `"Hello ${user.name}"`.
//!
//! A string property may embed `${path}` bindings that are resolved against the
//! view state. `path` is a state key optionally followed by `.`-separated
//! segments into nested maps (or numeric indexes into arrays).
//!
//! - A string that is exactly one binding substitutes the raw value, so
//!   `"${count}"` stays a number.
//! - Embedded bindings interpolate text.
//! - Missing keys substitute the empty string; resolution never fails.
//! - A `$` that does not open a binding is literal text.

use std::collections::BTreeSet;

use logos::Logos;
use serde_json::Value;

use crate::state::ViewState;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Token {
    /// `${...}` up to the first closing brace.
    #[regex(r"\$\{[^}]*\}")]
    Binding,

    /// A lone `$` (unterminated binding or plain dollar sign).
    #[token("$")]
    Dollar,

    /// Any run of text without `$`.
    #[regex(r"[^$]+")]
    Text,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    /// The trimmed path inside `${...}`.
    Binding(&'a str),
}

/// Split `input` into literal text and binding segments.
pub fn parse_template(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    // Start offset of the literal run being accumulated.
    let mut text_start: Option<usize> = None;
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(Token::Binding) => {
                if let Some(start) = text_start.take() {
                    segments.push(Segment::Text(&input[start..span.start]));
                }
                let path = input[span.start + 2..span.end - 1].trim();
                segments.push(Segment::Binding(path));
            }
            Ok(Token::Dollar) | Ok(Token::Text) | Err(()) => {
                text_start.get_or_insert(span.start);
            }
        }
    }
    if let Some(start) = text_start {
        segments.push(Segment::Text(&input[start..]));
    }
    segments
}

/// Whether `input` contains at least one `${...}` binding.
pub fn has_bindings(input: &str) -> bool {
    Token::lexer(input).any(|t| t == Ok(Token::Binding))
}

/// The state key a binding path reads (its first segment).
pub fn root_key(path: &str) -> &str {
    path.split('.').next().unwrap_or(path).trim()
}

/// Resolve a dotted `path` against `state`.
pub fn lookup<'s>(state: &'s ViewState, path: &str) -> Option<&'s Value> {
    let mut parts = path.split('.').map(str::trim);
    let mut current = state.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a value as interpolated text. `null` becomes the empty string.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute bindings in one string, recording the state keys it reads.
pub fn substitute_str(input: &str, state: &ViewState, reads: &mut BTreeSet<String>) -> Value {
    let segments = parse_template(input);
    if !segments.iter().any(|s| matches!(s, Segment::Binding(_))) {
        return Value::String(input.to_owned());
    }
    if let [Segment::Binding(path)] = segments.as_slice() {
        reads.insert(root_key(path).to_owned());
        return lookup(state, path)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
    }
    let mut out = String::with_capacity(input.len());
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Binding(path) => {
                reads.insert(root_key(path).to_owned());
                if let Some(value) = lookup(state, path) {
                    out.push_str(&value_to_text(value));
                }
            }
        }
    }
    Value::String(out)
}

/// Recursively substitute bindings in every string inside `value`.
pub fn substitute(value: &Value, state: &ViewState, reads: &mut BTreeSet<String>) -> Value {
    match value {
        Value::String(s) => substitute_str(s, state, reads),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute(item, state, reads))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, state, reads)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// [`substitute`] without dependency tracking.
pub fn interpolate(value: &Value, state: &ViewState) -> Value {
    substitute(value, state, &mut BTreeSet::new())
}

/// Interpolate a string into text (a lone binding is rendered as text too).
pub fn interpolate_str(input: &str, state: &ViewState) -> String {
    value_to_text(&substitute_str(input, state, &mut BTreeSet::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn state() -> ViewState {
        let mut s = ViewState::new();
        s.insert("name".into(), json!("Ada"));
        s.insert("count".into(), json!(3));
        s.insert("user".into(), json!({"profile": {"city": "Paris"}, "tags": ["a", "b"]}));
        s.insert("none".into(), Value::Null);
        s
    }

    #[test]
    fn parse_segments() {
        assert_eq!(
            parse_template("Hi ${ name }!"),
            vec![Segment::Text("Hi "), Segment::Binding("name"), Segment::Text("!")]
        );
    }

    #[test]
    fn dollar_without_brace_is_text() {
        assert_eq!(parse_template("cost: $5"), vec![Segment::Text("cost: $5")]);
        assert_eq!(parse_template("${open"), vec![Segment::Text("${open")]);
        assert!(!has_bindings("$5 and ${unclosed"));
        assert!(has_bindings("x ${y}"));
    }

    #[test]
    fn whole_binding_keeps_type() {
        let mut reads = BTreeSet::new();
        assert_eq!(substitute_str("${count}", &state(), &mut reads), json!(3));
        assert_eq!(reads, BTreeSet::from(["count".to_owned()]));
    }

    #[test]
    fn embedded_bindings_interpolate() {
        let mut reads = BTreeSet::new();
        assert_eq!(
            substitute_str("${name} has ${count} items", &state(), &mut reads),
            json!("Ada has 3 items")
        );
        assert_eq!(reads.len(), 2);
    }

    #[test]
    fn missing_keys_become_empty() {
        let mut reads = BTreeSet::new();
        assert_eq!(substitute_str("${ghost}", &state(), &mut reads), json!(""));
        assert_eq!(substitute_str("[${ghost}]", &state(), &mut reads), json!("[]"));
        assert_eq!(substitute_str("[${none}]", &state(), &mut reads), json!("[]"));
        assert!(reads.contains("ghost"));
    }

    #[test]
    fn dotted_paths() {
        let s = state();
        assert_eq!(lookup(&s, "user.profile.city"), Some(&json!("Paris")));
        assert_eq!(lookup(&s, "user.tags.1"), Some(&json!("b")));
        assert_eq!(lookup(&s, "user.tags.9"), None);
        assert_eq!(lookup(&s, "name.first"), None);
        assert_eq!(root_key("user.profile.city"), "user");
    }

    #[test]
    fn substitute_recurses_into_containers() {
        let mut reads = BTreeSet::new();
        let out = substitute(
            &json!({"title": "${name}", "items": ["${count}", 7], "flag": true}),
            &state(),
            &mut reads,
        );
        assert_eq!(out, json!({"title": "Ada", "items": [3, 7], "flag": true}));
    }

    #[test]
    fn plain_strings_untouched() {
        let mut reads = BTreeSet::new();
        assert_eq!(substitute_str("plain", &state(), &mut reads), json!("plain"));
        assert!(reads.is_empty());
    }

    #[test]
    fn interpolate_str_renders_text() {
        assert_eq!(interpolate_str("/users/${count}", &state()), "/users/3");
        assert_eq!(interpolate_str("${count}", &state()), "3");
    }
}
