//! Category token candidates.
//!
//! Model schemas disagree on how categories are spelled: "Curtain
//! Panels" may be indexed as `CurtainPanels`, `CurtainPanel`, or the
//! display label itself. For a human label this module produces the
//! ordered, de-duplicated list of tokens worth trying against the
//! service, most-likely first.

use crate::error::{ElementsError, Result};

/// Statically known aliases for labels whose service tokens are not
/// derivable from the words alone.
const LABEL_ALIASES: [(&str, &[&str]); 3] = [
    (
        "Curtain Panels / Mullions",
        &["CurtainPanels", "CurtainWallMullions", "Mullions"],
    ),
    ("Plumbing Fixtures", &["PlumbingFixtures", "PlumbingFixture"]),
    ("Structural Framing", &["StructuralFraming", "StructuralFrame"]),
];

/// Builds the ordered candidate token list for a category label.
///
/// Order: raw label, compacted alphanumeric concatenation, PascalCase
/// join, singularized compact form, singularized PascalCase form, then
/// any static aliases for the exact label. Duplicates are dropped
/// keeping the earliest position.
///
/// # Errors
///
/// [`ElementsError::InvalidCategory`] when the label is empty or
/// produces no candidates.
pub fn candidate_tokens(label: &str) -> Result<Vec<String>> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ElementsError::InvalidCategory(label.to_string()));
    }

    let words = split_words(trimmed);
    let mut candidates = vec![trimmed.to_string()];
    if !words.is_empty() {
        candidates.push(words.concat());
        candidates.push(pascal_join(&words));

        let singular: Vec<String> = words.iter().map(|w| singularize(w)).collect();
        candidates.push(singular.concat());
        candidates.push(pascal_join(&singular));
    }
    for (known, aliases) in LABEL_ALIASES {
        if known.eq_ignore_ascii_case(trimmed) {
            candidates.extend(aliases.iter().map(|a| (*a).to_string()));
        }
    }

    let mut seen = std::collections::BTreeSet::new();
    candidates.retain(|token| !token.is_empty() && seen.insert(token.clone()));
    if candidates.is_empty() {
        return Err(ElementsError::InvalidCategory(label.to_string()));
    }
    Ok(candidates)
}

/// Alphanumeric word runs of the label; separators and punctuation are
/// dropped.
fn split_words(label: &str) -> Vec<String> {
    label
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn pascal_join(words: &[String]) -> String {
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Heuristic English singularization, good enough for category nouns.
fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with("ies") && word.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if lower.ends_with("sses") || lower.ends_with("shes") || lower.ends_with("ches") {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
