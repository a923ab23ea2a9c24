//! Dotted hierarchical WBS codes.
//!
//! A code is one or more dot-separated decimal segments (`3`, `3.2`,
//! `3.2.1`). Parsing canonicalizes whitespace, repeated dots, and a
//! trailing dot; anything else is rejected. Ordering compares
//! segment-by-segment as integers, so `3.9` sorts before `3.10` and a
//! code sorts before its own children.

use std::cmp::Ordering;
use std::fmt;

use crate::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct WbsCode(String);

impl WbsCode {
    /// Parses and canonicalizes a raw code string.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidWbsCode`] when the input does not
    /// reduce to `digits(.digits)*` after canonicalization.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ModelError> {
        let raw = raw.as_ref();
        Self::try_normalize(raw).ok_or_else(|| ModelError::InvalidWbsCode(raw.to_string()))
    }

    /// Canonicalizes a raw code string, returning `None` for invalid input.
    ///
    /// Canonicalization strips whitespace, collapses repeated dots, and
    /// trims one trailing dot. Empty input, a leading dot, or any
    /// non-digit character is invalid.
    pub fn try_normalize(raw: &str) -> Option<Self> {
        let mut canonical = String::with_capacity(raw.len());
        let mut prev_dot = false;
        for ch in raw.chars() {
            if ch.is_whitespace() {
                continue;
            }
            if ch == '.' {
                if !prev_dot {
                    canonical.push('.');
                }
                prev_dot = true;
            } else {
                canonical.push(ch);
                prev_dot = false;
            }
        }
        if canonical.ends_with('.') {
            canonical.pop();
        }
        if canonical.is_empty() || canonical.starts_with('.') {
            return None;
        }
        let valid = canonical
            .split('.')
            .all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()));
        if !valid {
            return None;
        }
        Some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dot-separated segments.
    pub fn level(&self) -> usize {
        self.0.split('.').count()
    }

    /// All segments but the last; `None` for a top-level code.
    pub fn parent(&self) -> Option<WbsCode> {
        let idx = self.0.rfind('.')?;
        Some(Self(self.0[..idx].to_string()))
    }

    /// Parent code as a string, empty for top-level codes.
    pub fn parent_str(&self) -> String {
        self.parent().map(|p| p.0).unwrap_or_default()
    }

    /// True when `other` equals this code or is a dotted descendant of it.
    pub fn is_prefix_of(&self, other: &WbsCode) -> bool {
        other.0 == self.0 || other.0.starts_with(&format!("{}.", self.0))
    }
}

impl Ord for WbsCode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lexicographic over numeric segments; a shorter code ranks
        // before its own children at the same prefix.
        let mut a = self.0.split('.');
        let mut b = other.0.split('.');
        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => {
                    let ordering = cmp_segment(x, y);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

/// Numeric comparison of digit-string segments of any length. Leading
/// zeros are stripped for the magnitude comparison, then break ties on
/// the raw text so that "09" and "9" order consistently with equality.
fn cmp_segment(a: &str, b: &str) -> Ordering {
    let stripped_a = a.trim_start_matches('0');
    let stripped_b = b.trim_start_matches('0');
    stripped_a
        .len()
        .cmp(&stripped_b.len())
        .then_with(|| stripped_a.cmp(stripped_b))
        .then_with(|| a.cmp(b))
}

impl PartialOrd for WbsCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WbsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
