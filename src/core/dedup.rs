//! Quiz question deduplication without content merging.
//!
//! Entries are keyed on a normalized form of their `question` field
//! (optionally combined with `quiz`); later duplicates are dropped, or
//! earlier ones when keep-last is requested.

use crate::error::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct DedupOptions {
    /// Key on `quiz:::question` instead of `question` alone.
    pub include_quiz_in_key: bool,
    /// Skip accent folding during normalization.
    pub keep_accents: bool,
    /// Keep the last occurrence of each key instead of the first,
    /// preserving the final order of the survivors.
    pub keep_last: bool,
}

#[derive(Debug)]
pub struct DedupResult {
    pub kept: Vec<Value>,
    /// (dedup key, removed entry) pairs, in input order.
    pub removed: Vec<(String, Value)>,
}

/// Lowercase, collapse whitespace runs, and optionally fold accents.
pub fn normalize_text(s: &str, strip_accents: bool) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = collapsed.to_lowercase();
    if strip_accents {
        lowered.chars().map(fold_accent).collect()
    } else {
        lowered
    }
}

/// Map common precomposed Latin accented characters to their base letter.
/// Quiz content is Portuguese, so the Latin-1 range is what matters here.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn field_text(item: &Value, field: &str) -> String {
    match item.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Build the dedup key for one entry.
pub fn make_key(item: &Value, opts: &DedupOptions) -> String {
    let strip = !opts.keep_accents;
    let question = normalize_text(&field_text(item, "question"), strip);
    if opts.include_quiz_in_key {
        let quiz = normalize_text(&field_text(item, "quiz"), strip);
        format!("{}:::{}", quiz, question)
    } else {
        question
    }
}

/// Load quiz entries from text in any of the accepted shapes:
/// a JSON array (or single object), NDJSON with tolerated trailing
/// commas, or bare comma-separated objects.
pub fn load_items(text: &str) -> Result<Vec<Value>> {
    // 1) Standard JSON
    if let Ok(data) = serde_json::from_str::<Value>(text) {
        match data {
            Value::Array(items) => return Ok(items),
            obj @ Value::Object(_) => return Ok(vec![obj]),
            _ => {}
        }
    }

    // 2) NDJSON: one object per line
    let mut items = Vec::new();
    let mut ndjson_ok = true;
    for line in text.lines() {
        let line = line.trim().trim_end_matches(',');
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(obj @ Value::Object(_)) => items.push(obj),
            _ => {
                ndjson_ok = false;
                break;
            }
        }
    }
    if ndjson_ok && !items.is_empty() {
        return Ok(items);
    }

    // 3) Bare comma-separated objects: wrap in brackets and retry
    let wrapped = format!("[{}]", text.trim().trim_end_matches(','));
    match serde_json::from_str::<Value>(&wrapped) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Ok(Vec::new()),
        Err(e) => Err(Error::Other(format!(
            "Could not parse input as a JSON array, NDJSON, or comma-separated objects: {}",
            e
        ))),
    }
}

/// Deduplicate entries, returning survivors and removed duplicates.
pub fn dedup(items: Vec<Value>, opts: &DedupOptions) -> DedupResult {
    let mut removed = Vec::new();

    if !opts.keep_last {
        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::new();
        for item in items {
            let key = make_key(&item, opts);
            if seen.contains(&key) {
                removed.push((key, item));
            } else {
                seen.insert(key);
                kept.push(item);
            }
        }
        return DedupResult { kept, removed };
    }

    // Keep the LAST occurrence without disturbing the final order
    let mut last_index = std::collections::HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        last_index.insert(make_key(item, opts), idx);
    }

    let mut kept = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        let key = make_key(&item, opts);
        if last_index[&key] == idx {
            kept.push(item);
        } else {
            removed.push((key, item));
        }
    }

    DedupResult { kept, removed }
}
