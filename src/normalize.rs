//! Deterministic budget and filter extraction.
//!
//! `normalize_budget` is the single source of truth for budget-range
//! semantics: it backs the regex fallback path and its rules are spelled
//! out verbatim in the extraction prompt so the model follows the same
//! conversions. All budgets normalize to Crores (1 Cr = 100 Lakh).

use regex::Regex;
use std::sync::LazyLock;

use crate::filters::FilterUpdate;

// Pre-compiled regexes — compiled once, reused on every call.
static BETWEEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)between\s*([\d.]+)\s*(?:and|-)\s*([\d.]+)\s*cr")
        .expect("between regex is valid")
});
static OVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:over|above)\s*([\d.]+)\s*cr").expect("over regex is valid")
});
static UNDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:under|below)\s*([\d.]+)\s*cr").expect("under regex is valid")
});
static LAKH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\d.]+)\s*lakhs?").expect("lakh regex is valid"));
static BHK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*bhk").expect("bhk regex is valid"));

/// Extract budget bounds in Crores from free text.
///
/// Rules, in precedence order (a `between` range wins over a bare
/// `under`/`over` found in the same text):
/// - "between X and Y Cr" -> (X, Y)
/// - "over X Cr" / "above X Cr" -> (X, unset)
/// - "under Y Cr" / "below Y Cr" -> (unset, Y)
/// - "N Lakhs" -> (N/100, N/100), a point value
pub fn normalize_budget(text: &str) -> (Option<f64>, Option<f64>) {
    if let Some(cap) = BETWEEN_RE.captures(text) {
        let min = parse_decimal(&cap[1]);
        let max = parse_decimal(&cap[2]);
        if min.is_some() || max.is_some() {
            return (min, max);
        }
    }
    if let Some(cap) = OVER_RE.captures(text) {
        if let Some(min) = parse_decimal(&cap[1]) {
            return (Some(min), None);
        }
    }
    if let Some(cap) = UNDER_RE.captures(text) {
        if let Some(max) = parse_decimal(&cap[1]) {
            return (None, Some(max));
        }
    }
    if let Some(cap) = LAKH_RE.captures(text) {
        if let Some(lakhs) = parse_decimal(&cap[1]) {
            let cr = lakhs / 100.0;
            return (Some(cr), Some(cr));
        }
    }
    (None, None)
}

/// Possession-status phrases recognized by the fallback extractor. The
/// filter model itself accepts any status string; this list only bounds
/// what the regex path can recover.
const STATUS_PHRASES: &[(&str, &str)] = &[
    ("ready to move", "Ready to Move"),
    ("under construction", "Under Construction"),
];

/// Regex-only extraction from a single message, used when the NLU
/// collaborator is unavailable. Produces a partial update: fields the
/// message does not mention stay `None` so the merge carries the previous
/// value forward.
pub fn regex_extract(text: &str, known_cities: &[String]) -> FilterUpdate {
    let lower = text.to_lowercase();

    let (budget_min_cr, budget_max_cr) = normalize_budget(text);

    let mut bhks: Vec<u32> = BHK_RE
        .captures_iter(text)
        .filter_map(|cap| cap[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
        .collect();
    bhks.sort_unstable();
    bhks.dedup();
    let bhk_list = if bhks.is_empty() { None } else { Some(bhks) };

    let city = known_cities
        .iter()
        .find(|c| !c.is_empty() && lower.contains(&c.to_lowercase()))
        .cloned();

    let statuses: Vec<String> = STATUS_PHRASES
        .iter()
        .filter(|(phrase, _)| lower.contains(phrase))
        .map(|(_, canonical)| canonical.to_string())
        .collect();
    let status_list = if statuses.is_empty() {
        None
    } else {
        Some(statuses)
    };

    FilterUpdate {
        city,
        bhk_list,
        budget_min_cr,
        budget_max_cr,
        status_list,
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim_matches('.').parse::<f64>().ok()
}
