//! Response coercer — turns unreliable model text into a typed value or a
//! safe fallback.
//!
//! The completion service is a free-text generator with no structured-output
//! guarantee, so every stage's JSON contract is enforced here:
//!
//! 1. strip code-fence markers (``` with optional `json` tag) anywhere;
//! 2. trim;
//! 3. attempt a direct parse; if the text is not a clean JSON value, locate
//!    the first balanced `{...}` or `[...]` span and parse that substring;
//! 4. on failure, return the caller-supplied fallback.
//!
//! A parse failure never propagates past this boundary — the pipeline's
//! policy is that one malformed response degrades that one item, not the
//! whole run. The [`Coerced`] tag records which path was taken so callers
//! (and tests) can distinguish a real parse from a degraded one.

use serde::de::DeserializeOwned;
use tracing::warn;

/// Outcome of a coercion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    /// The model's text parsed into the expected shape.
    Parsed(T),
    /// Parsing failed; this is the call-site fallback value.
    Fallback(T),
}

impl<T> Coerced<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Parsed(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Coerce raw model text into `T`, degrading to `fallback` on any failure.
pub fn coerce<T: DeserializeOwned>(raw: &str, fallback: T) -> Coerced<T> {
    let cleaned = strip_code_fences(raw);
    let trimmed = cleaned.trim();

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Coerced::Parsed(value);
    }

    if let Some(span) = extract_balanced_span(trimmed) {
        if let Ok(value) = serde_json::from_str::<T>(span) {
            return Coerced::Parsed(value);
        }
    }

    warn!(
        preview = preview(raw),
        "model output failed JSON coercion, using fallback"
    );
    Coerced::Fallback(fallback)
}

/// Remove ```json / ``` fence markers wherever they appear.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// Find the first balanced `{...}` or `[...]` span in `text`.
///
/// Tracks string literals and escapes so braces inside JSON strings do not
/// confuse the depth count. Returns `None` when no opener exists or the
/// span never closes.
fn extract_balanced_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(raw: &str) -> &str {
    let end = raw
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    &raw[..end]
}
