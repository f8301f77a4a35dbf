//! Parsing of raw extraction output into candidate items.
//!
//! The contract is a JSON array of `{"alimento": string, "quantidade": number}`
//! records, optionally wrapped in Markdown code fences. [`parse_candidates`]
//! accepts only that. [`parse_candidates_lenient`] tries it first and then
//! falls back to lossy recovery; callers must surface which strategy won.

use serde_json::Value;
use strum::{AsRefStr, Display};

use crate::models::food::CandidateItem;

/// How a candidate list was obtained from the raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ParseStrategy {
    /// The output honoured the contract.
    Structured,
    /// A JSON array was found embedded in surrounding prose.
    EmbeddedArray,
    /// Plain delimited text was split into names and gram amounts.
    DelimitedList,
}

impl ParseStrategy {
    pub fn is_fallback(self) -> bool {
        self != ParseStrategy::Structured
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCandidates {
    pub items: Vec<CandidateItem>,
    pub strategy: ParseStrategy,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Extraction output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extraction output is not a list of food records: {0}")]
    Shape(String),

    #[error("No food items could be recovered from extraction output")]
    Unrecoverable,
}

/// Parse output that follows the contract, after removing code fences.
pub fn parse_candidates(raw: &str) -> Result<ParsedCandidates, ParseError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)?;
    Ok(ParsedCandidates {
        items: records_from_value(value)?,
        strategy: ParseStrategy::Structured,
    })
}

/// Strict parse, then an embedded JSON array, then a delimited list.
///
/// Returns the strict error when nothing could be recovered, or when the
/// embedded array parses as JSON but its records have the wrong shape.
pub fn parse_candidates_lenient(raw: &str) -> Result<ParsedCandidates, ParseError> {
    let strict_err = match parse_candidates(raw) {
        Ok(parsed) => return Ok(parsed),
        Err(e) => e,
    };

    let cleaned = strip_code_fences(raw);

    if let Some(embedded) = extract_first_array(&cleaned) {
        // Valid JSON with the wrong records is not retried as a list.
        if let Ok(value) = serde_json::from_str::<Value>(embedded) {
            return match records_from_value(value) {
                Ok(items) => Ok(ParsedCandidates {
                    items,
                    strategy: ParseStrategy::EmbeddedArray,
                }),
                Err(_) => Err(strict_err),
            };
        }
    }

    let items = parse_delimited_list(&cleaned);
    if items.is_empty() {
        return Err(strict_err);
    }
    Ok(ParsedCandidates {
        items,
        strategy: ParseStrategy::DelimitedList,
    })
}

/// Remove every "```json" (any case) and "```" marker, then trim.
pub fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

fn records_from_value(value: Value) -> Result<Vec<CandidateItem>, ParseError> {
    let Value::Array(records) = value else {
        return Err(ParseError::Shape("expected a JSON array".to_string()));
    };

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let Value::Object(fields) = record else {
                return Err(ParseError::Shape(format!("record {i} is not an object")));
            };
            let name = fields
                .get("alimento")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ParseError::Shape(format!("record {i} has no \"alimento\" name")))?;
            Ok(CandidateItem::new(name, fields.get("quantidade").and_then(quantity_from_value)))
        })
        .collect()
}

/// Numbers as-is; strings such as "150" or "150 g". Anything else is unusable.
fn quantity_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_grams(s),
        _ => None,
    }
}

/// Accepts a decimal comma ("150,5 g") as well as a decimal point.
fn parse_grams(text: &str) -> Option<f64> {
    let t = text.trim().to_lowercase();
    let t = t
        .strip_suffix("gramas")
        .or_else(|| t.strip_suffix("grams"))
        .or_else(|| t.strip_suffix('g'))
        .unwrap_or(&t);
    t.trim().replacen(',', ".", 1).parse::<f64>().ok()
}

/// Slice of the first balanced `[...]` block, ignoring brackets inside strings.
fn extract_first_array(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let mut depth = 0usize;
    let mut in_str = false;
    let mut esc = false;

    for (i, ch) in s[start..].char_indices() {
        if in_str {
            if esc {
                esc = false;
            } else if ch == '\\' {
                esc = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split free text into items. Newlines and semicolons separate items; commas
/// only do so when neither appears, since table names contain commas.
fn parse_delimited_list(text: &str) -> Vec<CandidateItem> {
    let pieces: Vec<&str> = if text.contains(['\n', ';']) {
        text.split(['\n', ';']).collect()
    } else {
        text.split(',').collect()
    };

    pieces.into_iter().filter_map(parse_list_entry).collect()
}

fn parse_list_entry(entry: &str) -> Option<CandidateItem> {
    let entry = entry
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .trim_matches(['"', '\'']);
    let mut tokens: Vec<&str> = entry.split_whitespace().collect();

    let mut quantity = None;
    if let Some(last) = tokens.last().copied() {
        let unit_only = matches!(last.to_lowercase().as_str(), "g" | "gramas" | "grams");
        if unit_only && tokens.len() >= 2 {
            if let Some(q) = parse_grams(tokens[tokens.len() - 2]) {
                quantity = Some(q);
                tokens.truncate(tokens.len() - 2);
            }
        } else if last.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            if let Some(q) = parse_grams(last) {
                quantity = Some(q);
                tokens.pop();
            }
        }
    }

    let name = tokens
        .join(" ")
        .trim_end_matches(['—', '–', '-', ':', '='])
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }
    Some(CandidateItem::new(name, quantity))
}
