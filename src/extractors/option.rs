//! Parsing of the free-text option string attached to each order line, e.g.
//! `"출국일/시간 (체크박스): 2025-02-10 14:30 / 상품선택: 마리오 파워업밴드"`.
//!
//! Parsing is total: malformed input degrades to fewer entries, never an error.

use std::sync::LazyLock;
use regex::Regex;
use crate::models::{OptionEntry, OptionFields, ParsedOption};

static SEGMENT_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+/\s+").expect("valid segment regex"));
static PAREN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*?\)").expect("valid suffix regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const DEPARTURE_LABELS: &[&str] = &["출국일/시간", "대여시작일/시간", "대여일/시간", "대여일", "출국일"];
const RETURN_LABELS: &[&str] = &["귀국일/시간", "반납일/시간", "반납일", "귀국일"];
const RETURN_CHECKBOX_LABELS: &[&str] = &["반납일/시간", "귀국일/시간"];
const DAMAGE_CHECKBOX_LABELS: &[&str] = &["파손 확인", "파손확인"];
const DETAIL_CONFIRMATION_LABELS: &[&str] = &[
    "상세페이지 내용확인/약관 동의",
    "상세페이지 내용확인/약관동의",
    "상세페이지 내용확인",
    "약관동의",
];
const PRODUCT_CHOICE_LABELS: &[&str] = &["상품선택", "상품 선택"];

/// Drops parenthesized annotations such as `(체크박스)` and trims.
pub fn normalize_label(label: &str) -> String {
    PAREN_SUFFIX.replace_all(label, "").trim().to_string()
}

fn compact(label: &str) -> String {
    WHITESPACE.replace_all(label, "").into_owned()
}

/// Splits `raw` on `" / "` and each segment on its last colon.
pub fn parse(raw: &str) -> ParsedOption {
    let mut parsed = ParsedOption::default();
    let raw = raw.trim();
    if raw.is_empty() {
        return parsed;
    }

    for segment in SEGMENT_DELIMITER.split(raw) {
        if segment.is_empty() {
            continue;
        }

        // Last colon, so "시간: 14:30" keeps "14:30" intact.
        if let Some(pos) = segment.rfind(':') {
            let label = segment[..pos].trim();
            let value = segment[pos + 1..].trim();
            if !label.is_empty() {
                insert_display(&mut parsed, label, value);
                index_label(&mut parsed, label, value);
                continue;
            }
        }

        insert_display(&mut parsed, segment, "");
    }

    parsed
}

fn insert_display(parsed: &mut ParsedOption, label: &str, value: &str) {
    match parsed.display.iter_mut().find(|entry| entry.label == label) {
        Some(entry) => entry.value = value.to_string(),
        None => parsed.display.push(OptionEntry {
            label: label.to_string(),
            value: value.to_string(),
        }),
    }
}

fn index_label(parsed: &mut ParsedOption, label: &str, value: &str) {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return;
    }

    let compacted = compact(&normalized);
    parsed.lookup.insert(normalized, value.to_string());
    if !compacted.is_empty() {
        parsed.lookup.insert(compacted, value.to_string());
    }
}

/// Value of the first alias present in the lookup index, or empty.
pub fn lookup_first(parsed: &ParsedOption, aliases: &[&str]) -> String {
    for alias in aliases {
        let key = normalize_label(alias);
        if key.is_empty() {
            continue;
        }
        if let Some(value) = parsed.lookup_value(&key) {
            return value.to_string();
        }
        if let Some(value) = parsed.lookup_value(&compact(&key)) {
            return value.to_string();
        }
    }
    String::new()
}

pub fn product_choice(parsed: &ParsedOption) -> String {
    lookup_first(parsed, PRODUCT_CHOICE_LABELS)
}

/// Resolves the report's option columns from their known label aliases.
pub fn resolve_fields(parsed: &ParsedOption) -> OptionFields {
    OptionFields {
        departure: lookup_first(parsed, DEPARTURE_LABELS),
        return_date: lookup_first(parsed, RETURN_LABELS),
        return_checkbox: lookup_first(parsed, RETURN_CHECKBOX_LABELS),
        damage_checkbox: lookup_first(parsed, DAMAGE_CHECKBOX_LABELS),
        detail_confirmation: lookup_first(parsed, DETAIL_CONFIRMATION_LABELS),
        product_choice: product_choice(parsed),
    }
}
