// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Response Normalizer
//!
//! Recovers an `AnalysisResult` from raw provider text in two stages:
//!
//! 1. parse the whole text as a JSON object;
//! 2. otherwise parse the first brace-balanced `{...}` slice that yields an
//!    object. String literals are skipped while balancing, so braces inside
//!    suggestion text do not end the slice early.
//!
//! Only total unparseability is an error. Field-level defects are coerced:
//! unknown tone becomes `Neutral`, score is clamped to 0..=100 (0 when not
//! numeric), suggestions are cut to three (empty when not a list of strings).

use serde_json::{Map, Value};

use crate::domain::analysis::{AnalysisResult, Tone, MAX_SUGGESTIONS};

const EXCERPT_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Unparseable: no JSON object found in provider output ('{excerpt}')")]
    Unparseable { excerpt: String },
}

pub fn normalize(raw_text: &str) -> Result<AnalysisResult, NormalizeError> {
    let object = parse_object(raw_text).ok_or_else(|| {
        tracing::warn!(
            chars = raw_text.chars().count(),
            "Structured response could not be parsed"
        );
        NormalizeError::Unparseable {
            excerpt: raw_text.chars().take(EXCERPT_CHARS).collect(),
        }
    })?;

    Ok(AnalysisResult::new(
        coerce_tone(object.get("tone")),
        coerce_score(object.get("score")),
        coerce_suggestions(object.get("suggestions")),
    ))
}

fn parse_object(raw_text: &str) -> Option<Map<String, Value>> {
    if let Some(object) = as_object(raw_text.trim()) {
        return Some(object);
    }

    tracing::debug!("Direct parse failed, retrying with bracketed substring");
    raw_text
        .match_indices('{')
        .filter_map(|(start, _)| {
            let candidate = &raw_text[start..];
            balanced_end(candidate).map(|len| &candidate[..len])
        })
        .find_map(as_object)
}

/// Byte length of the object opening at `text[0]`, up to its matching `}`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn as_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn coerce_tone(value: Option<&Value>) -> Tone {
    value
        .and_then(Value::as_str)
        .and_then(Tone::parse)
        .unwrap_or_default()
}

fn coerce_score(value: Option<&Value>) -> i64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as i64,
        _ => 0,
    }
}

fn coerce_suggestions(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    if !items.iter().all(Value::is_string) {
        return Vec::new();
    }
    items
        .iter()
        .filter_map(Value::as_str)
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_is_preserved() {
        let result = normalize(
            r#"{"tone":"Friendly","score":72,"suggestions":["Add a greeting","Shorten the ask"]}"#,
        )
        .unwrap();
        assert_eq!(result.tone, Tone::Friendly);
        assert_eq!(result.score, 72);
        assert_eq!(result.suggestions, vec!["Add a greeting", "Shorten the ask"]);
    }

    #[test]
    fn test_wrapped_json_is_repaired_and_coerced() {
        let result = normalize(
            r#"Here is the answer: {"tone":"Direct","score":150,"suggestions":["a","b","c","d"]} thanks"#,
        )
        .unwrap();
        assert_eq!(result.tone, Tone::Direct);
        assert_eq!(result.score, 100);
        assert_eq!(result.suggestions, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_markdown_fenced_json() {
        let raw = "```json\n{\"tone\": \"formal\", \"score\": \"64\", \"suggestions\": []}\n```";
        let result = normalize(raw).unwrap();
        assert_eq!(result.tone, Tone::Formal);
        assert_eq!(result.score, 64);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_suggestions_survive_verbatim() {
        let result = normalize(
            r#"{"tone":"Direct","score":50,"suggestions":[" keep spacing ","","b"]}"#,
        )
        .unwrap();
        assert_eq!(result.tone, Tone::Direct);
        assert_eq!(result.score, 50);
        assert_eq!(result.suggestions, vec![" keep spacing ", "", "b"]);

        let cut = normalize(r#"{"suggestions":["","a","b","c"]}"#).unwrap();
        assert_eq!(cut.suggestions, vec!["", "a", "b"]);
    }

    #[test]
    fn test_trailing_prose_with_braces() {
        let result = normalize(
            r#"{"tone":"Friendly","score":80,"suggestions":["Say {name} first"]} (use {name} for the greeting)"#,
        )
        .unwrap();
        assert_eq!(result.tone, Tone::Friendly);
        assert_eq!(result.score, 80);
        assert_eq!(result.suggestions, vec!["Say {name} first"]);

        let leading = normalize(r#"Fill in {name}: {"tone":"formal","score":12}"#).unwrap();
        assert_eq!(leading.tone, Tone::Formal);
        assert_eq!(leading.score, 12);
    }

    #[test]
    fn test_not_json_is_unparseable() {
        let err = normalize("not json at all").unwrap_err();
        assert!(matches!(err, NormalizeError::Unparseable { .. }));
        assert!(err.to_string().starts_with("Unparseable"));
    }

    #[test]
    fn test_unbalanced_braces_are_unparseable() {
        assert!(normalize("} backwards {").is_err());
        assert!(normalize("{\"tone\": \"Direct\"").is_err());
    }

    #[test]
    fn test_non_object_json_falls_through() {
        assert!(normalize("[1, 2, 3]").is_err());
        assert!(normalize("42").is_err());
    }

    #[test]
    fn test_field_defects_use_defaults() {
        let result = normalize(
            r#"{"tone":"sarcastic","score":"very high","suggestions":["ok", 3]}"#,
        )
        .unwrap();
        assert_eq!(result.tone, Tone::Neutral);
        assert_eq!(result.score, 0);
        assert!(result.suggestions.is_empty());

        let empty = normalize("{}").unwrap();
        assert_eq!(empty, AnalysisResult::new(Tone::Neutral, 0, vec![]));
    }

    #[test]
    fn test_score_rounding_and_negative_clamp() {
        assert_eq!(normalize(r#"{"score": 41.6}"#).unwrap().score, 42);
        assert_eq!(normalize(r#"{"score": -12}"#).unwrap().score, 0);
    }
}
