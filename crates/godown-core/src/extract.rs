use crate::crops::{CropProfile, CROPS};
use crate::types::{LotCondition, LotStatus};
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TargetChange
// ---------------------------------------------------------------------------

/// What an update message asks to change on a lot. Status and condition are
/// different fields on the record, so the executor must route them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum TargetChange {
    Status(LotStatus),
    Condition(LotCondition),
}

impl TargetChange {
    pub fn describe(self) -> String {
        match self {
            TargetChange::Status(s) => format!("status '{s}'"),
            TargetChange::Condition(c) => format!("condition '{c}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------
//
// All extractors are total: absence is `None`, never an error. The
// orchestrator owns turning absence into a user-facing message.

/// First crop from the fixed vocabulary whose name or alias appears as a
/// whole word in the message. Table order breaks multi-crop mentions.
pub fn extract_crop(message: &str) -> Option<&'static CropProfile> {
    let text = message.to_lowercase();
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    CROPS
        .iter()
        .find(|crop| crop.aliases.iter().any(|a| tokens.contains(a)))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Quantity in quintals. Tries quintals, then kilograms (/100), then tons
/// (x10), then a bare number taken as quintals.
pub fn extract_quantity(message: &str) -> Option<f64> {
    let number = r"(\d+(?:\.\d+)?)";
    let units: [(&str, fn(f64) -> f64); 4] = [
        (r"\s*(?:quintals?|qtls?)\b", |v| v),
        (r"\s*(?:kilograms?|kilos?|kgs?)\b", |v| round2(v / 100.0)),
        (r"\s*(?:tonnes?|tons?)\b", |v| round2(v * 10.0)),
        ("", |v| v),
    ];
    for (suffix, convert) in units {
        let re = Regex::new(&format!("(?i){number}{suffix}")).expect("quantity pattern");
        if let Some(caps) = re.captures(message) {
            if let Ok(v) = caps[1].parse::<f64>() {
                return Some(convert(v));
            }
        }
    }
    None
}

/// Requested status or condition change, if the message names one.
pub fn extract_target_change(message: &str) -> Option<TargetChange> {
    let table: &[(&str, TargetChange)] = &[
        // "partially dispatched" must precede the plain dispatch patterns.
        (
            r"\bpartial(?:ly)? dispatch(?:ed)?\b",
            TargetChange::Status(LotStatus::PartiallyDispatched),
        ),
        (r"\bsold\b", TargetChange::Status(LotStatus::Sold)),
        (
            r"\b(?:dispatched?|shipped)\b",
            TargetChange::Status(LotStatus::Dispatched),
        ),
        (
            r"\b(?:spoiled|spoilt|rotten|damaged)\b",
            TargetChange::Condition(LotCondition::Spoiled),
        ),
        (
            r"\bat[ -]risk\b",
            TargetChange::Condition(LotCondition::AtRisk),
        ),
        (r"\bwatch\b", TargetChange::Condition(LotCondition::Watch)),
        (
            r"\b(?:good|healthy|fine)\b",
            TargetChange::Condition(LotCondition::Good),
        ),
    ];
    let text = message.to_lowercase();
    table
        .iter()
        .find(|(pattern, _)| {
            Regex::new(pattern)
                .expect("target change pattern")
                .is_match(&text)
        })
        .map(|(_, change)| *change)
}

/// Words that mark the end of a free-text name capture.
const NAME_BOUNDARY: &str = r"(?:\s+(?:in|at|near|with|for|of|and)\b|[.,!?;]|$)";

/// Facility name: a quoted substring wins, else a "called/named NAME" phrase
/// bounded by trailing prepositions or punctuation.
pub fn extract_facility_name(message: &str) -> Option<String> {
    let quoted = Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("quoted name pattern");
    if let Some(caps) = quoted.captures(message) {
        let name = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    let named = Regex::new(&format!(
        r"(?i)\b(?:called|named|name is)\s+([A-Za-z0-9][A-Za-z0-9 ]*?){NAME_BOUNDARY}"
    ))
    .expect("named facility pattern");
    named
        .captures(message)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// City from an "in/at CITY" phrase. Returns `None` when absent or when the
/// capture is a domain word rather than a place; the orchestrator substitutes
/// the "Unknown" sentinel.
pub fn extract_city(message: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r"(?i)\b(?:in|at)\s+(?:the\s+)?([A-Za-z][A-Za-z ]*?){NAME_BOUNDARY}"
    ))
    .expect("city pattern");
    let caps = re.captures(message)?;
    let city = caps[1].trim().to_string();
    let lower = city.to_lowercase();
    let domain_words = ["warehouse", "godown", "facility", "storage", "lot", "stock"];
    if city.is_empty() || domain_words.iter().any(|w| lower.contains(w)) {
        return None;
    }
    Some(city)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
