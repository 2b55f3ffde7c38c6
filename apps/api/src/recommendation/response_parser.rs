//! Response parsing: pulls the `{"matches": [...]}` payload out of free text.
//!
//! The model is told to answer with JSON only but often wraps it in prose or
//! code fences. Extraction finds the first balanced object; decoding is strict
//! and never repairs broken JSON.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in generated text")]
    NoJsonObject,

    #[error("embedded JSON object is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("embedded JSON object has no `matches` list")]
    MissingMatches,
}

/// An unvalidated `(job_id, match_score)` pair as the model emitted it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchCandidate {
    pub job_id: String,
    pub match_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMatches {
    pub candidates: Vec<MatchCandidate>,
    /// Entries of `matches` that did not fit `{job_id: string, match_score: number}`.
    pub malformed: usize,
}

/// Returns the first balanced `{...}` span, ignoring braces inside string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extracts and decodes the match list from raw generated text.
pub fn parse_matches(text: &str) -> Result<ParsedMatches, ParseError> {
    let span = extract_json_object(text).ok_or(ParseError::NoJsonObject)?;
    let payload: Value = serde_json::from_str(span)?;

    let entries = payload
        .get("matches")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingMatches)?;

    let mut parsed = ParsedMatches::default();
    for entry in entries {
        match MatchCandidate::deserialize(entry) {
            Ok(candidate) => parsed.candidates.push(candidate),
            Err(_) => parsed.malformed += 1,
        }
    }

    Ok(parsed)
}
