use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// How list rows with a declared sort key are ordered after disassembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Keep wire order.
    #[default]
    None,
    /// Plain string comparison.
    Lexical,
    /// Digit runs compare numerically (`port2` < `port10`).
    Natural,
}

/// Stable sort of `rows` by the child field `key`.
///
/// Rows missing the key sort first. Ties fall back to the serialized row so
/// permutations of the same rows always produce the same order.
pub fn sort_rows(rows: &mut [Record], key: &str, mode: SortMode) {
    if mode == SortMode::None {
        return;
    }
    rows.sort_by(|a, b| {
        compare_keys(a.get(key), b.get(key), mode)
            .then_with(|| row_fingerprint(a).cmp(&row_fingerprint(b)))
    });
}

fn compare_keys(a: Option<&FieldValue>, b: Option<&FieldValue>, mode: SortMode) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(FieldValue::Integer(a)), Some(FieldValue::Integer(b))) => a.cmp(b),
        (Some(FieldValue::String(a)), Some(FieldValue::String(b))) => match mode {
            SortMode::Natural => natural_cmp(a, b),
            _ => a.cmp(b),
        },
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn row_fingerprint(row: &Record) -> String {
    serde_json::to_string(row).unwrap_or_default()
}

/// Compare strings treating embedded digit runs as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);
    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(l), Chunk::Digits(r)) => compare_digits(l, r),
            (Chunk::Text(l), Chunk::Text(r)) => l.cmp(r),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(input: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (idx, c) in input.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(current) if current != digit => {
                out.push(make_chunk(&input[start..idx], current));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(current) = in_digits {
        out.push(make_chunk(&input[start..], current));
    }
    out
}

fn make_chunk(part: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(part)
    } else {
        Chunk::Text(part)
    }
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
