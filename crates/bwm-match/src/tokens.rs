//! Tokenization and token-set similarity.
//!
//! Free text from elements and WBS titles is reduced to lower-cased,
//! accent-stripped alphanumeric tokens. Tokens shorter than three
//! characters and stopwords are discarded before scoring.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Minimum token length kept after normalization.
const MIN_TOKEN_LEN: usize = 3;

/// Decomposes to NFD and drops combining marks, folding "Béton" to "Beton".
fn strip_accents(raw: &str) -> String {
    raw.nfd().filter(|ch| !is_combining_mark(*ch)).collect()
}

fn is_stopword(token: &str) -> bool {
    matches!(
        token,
        "and" | "the" | "for" | "with" | "from" | "not" | "non" | "per"
    )
}

/// Builds the normalized token set for a piece of free text.
pub fn token_set(raw: &str) -> BTreeSet<String> {
    let folded = strip_accents(raw).to_lowercase();
    let mut tokens = BTreeSet::new();
    for piece in folded.split(|ch: char| !ch.is_ascii_alphanumeric()) {
        if piece.len() < MIN_TOKEN_LEN || is_stopword(piece) {
            continue;
        }
        tokens.insert(piece.to_string());
    }
    tokens
}

/// Scores two token sets as `max(coverage, jaccard)`.
///
/// Coverage is intersection over the WBS side's size, so a short WBS
/// title fully contained in a verbose element description still scores
/// high; jaccard is intersection over the union.
pub fn similarity(element_tokens: &BTreeSet<String>, wbs_tokens: &BTreeSet<String>) -> f64 {
    if element_tokens.is_empty() || wbs_tokens.is_empty() {
        return 0.0;
    }
    let intersection = element_tokens.intersection(wbs_tokens).count() as f64;
    if intersection == 0.0 {
        return 0.0;
    }
    let union = element_tokens.union(wbs_tokens).count() as f64;
    let coverage = intersection / wbs_tokens.len() as f64;
    let jaccard = intersection / union;
    coverage.max(jaccard)
}
