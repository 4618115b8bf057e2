//! Multi-key sort specification and comparators.
//!
//! A [`SortSpec`] is an ordered list of keys; the first key has priority and
//! ties fall through to later keys. Sorting always goes through the stable
//! `slice::sort_by`, so full ties keep their input order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prefecture::prefecture_sort_rank;
use crate::restaurant::Restaurant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    VisitCount,
    Prefecture,
    City,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::VisitCount => "visit_count",
            SortField::Prefecture => "prefecture",
            SortField::City => "city",
        }
    }

    fn compare(self, a: &Restaurant, b: &Restaurant) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::VisitCount => a.visit_count.cmp(&b.visit_count),
            SortField::Prefecture => {
                prefecture_sort_rank(&a.prefecture).cmp(&prefecture_sort_rank(&b.prefecture))
            }
            SortField::City => compare_locale(&a.city, &b.city),
        }
    }
}

impl FromStr for SortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "visit_count" => Ok(SortField::VisitCount),
            "prefecture" => Ok(SortField::Prefecture),
            "city" => Ok(SortField::City),
            other => Err(CoreError::Validation(format!("Unknown sort field: '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Ordered list of sort keys. Each field appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Add a key, or update the direction of an existing key in place.
    pub fn set(&mut self, field: SortField, direction: SortDirection) {
        match self.keys.iter_mut().find(|k| k.field == field) {
            Some(key) => key.direction = direction,
            None => self.keys.push(SortKey { field, direction }),
        }
    }

    pub fn with(mut self, field: SortField, direction: SortDirection) -> Self {
        self.set(field, direction);
        self
    }

    pub fn remove(&mut self, field: SortField) {
        self.keys.retain(|k| k.field != field);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Compare two restaurants key by key.
    pub fn compare(&self, a: &Restaurant, b: &Restaurant) -> Ordering {
        self.keys
            .iter()
            .map(|k| k.direction.apply(k.field.compare(a, b)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort. A no-op for an empty spec.
    pub fn sort(&self, items: &mut [Restaurant]) {
        if self.keys.is_empty() {
            return;
        }
        items.sort_by(|a, b| self.compare(a, b));
    }
}

/// Wire form: `created_at:desc,visit_count:asc`. A missing direction means `asc`.
impl FromStr for SortSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = SortSpec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (field, direction) = match part.split_once(':') {
                Some((f, d)) => (f.trim(), d.trim()),
                None => (part, "asc"),
            };
            let direction = match direction {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => {
                    return Err(CoreError::Validation(format!(
                        "Unknown sort direction: '{other}'"
                    )))
                }
            };
            spec.set(field.parse()?, direction);
        }
        Ok(spec)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .keys
            .iter()
            .map(|k| {
                let dir = match k.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                };
                format!("{}:{dir}", k.field.as_str())
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

// ---------------------------------------------------------------------------
// Japanese-aware string comparison
// ---------------------------------------------------------------------------

/// Fold one character for collation: katakana to hiragana, full-width ASCII
/// to half-width, ASCII to lowercase.
fn fold_char(c: char) -> char {
    let folded = match c as u32 {
        // Katakana ァ..ヶ -> hiragana ぁ..ゖ
        0x30A1..=0x30F6 => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        // Full-width ！..～ -> ASCII
        0xFF01..=0xFF5E => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        0x3000 => ' ',
        _ => c,
    };
    folded.to_ascii_lowercase()
}

/// Compare two strings the way a Japanese-locale collator would for the
/// purposes of list ordering. Ties on the folded key fall back to code points.
pub fn compare_locale(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(fold_char)
        .cmp(b.chars().map(fold_char))
        .then_with(|| a.cmp(b))
}
