//! Category resolution.
//!
//! Tries each candidate token with two filter shapes until the service
//! returns rows. A syntax rejection means the filter shape does not fit
//! this model's schema, so the pair is skipped; any other failure
//! aborts (per-call retries already happened underneath). An empty
//! category is a valid outcome: if every pair returns no rows, the
//! first empty result is returned rather than an error.

use std::time::Duration;

use tracing::{debug, info};

use bwm_model::{ModelElement, ModelId};

use crate::category::candidate_tokens;
use crate::client::{ElementSource, category_filter, fetch_model_elements_with, instance_filter};
use crate::error::{ElementsError, Result};
use crate::retry::Backoff;

/// Result of resolving a category: the rows plus the (token, filter)
/// pair that produced them.
#[derive(Debug, Clone)]
pub struct CategoryResolution {
    pub rows: Vec<ModelElement>,
    pub resolved_token: String,
    pub filter_used: String,
}

/// Resolves a human category label to the elements it denotes.
pub fn resolve_category_elements(
    source: &dyn ElementSource,
    model_id: &ModelId,
    label: &str,
) -> Result<CategoryResolution> {
    resolve_category_elements_with(source, model_id, label, Backoff::default(), |delay| {
        std::thread::sleep(delay);
    })
}

/// [`resolve_category_elements`] with an injected backoff and sleeper.
pub fn resolve_category_elements_with(
    source: &dyn ElementSource,
    model_id: &ModelId,
    label: &str,
    backoff: Backoff,
    mut sleep: impl FnMut(Duration),
) -> Result<CategoryResolution> {
    let tokens = candidate_tokens(label)?;

    let mut first_empty: Option<CategoryResolution> = None;
    let mut last_syntax_error: Option<ElementsError> = None;

    for token in &tokens {
        // Instance-context first: type-level rows would double-count
        // every placed instance.
        for filter in [instance_filter(token), category_filter(token)] {
            match fetch_model_elements_with(source, model_id, &filter, backoff, &mut sleep) {
                Ok(rows) if !rows.is_empty() => {
                    info!(
                        label,
                        token,
                        rows = rows.len(),
                        "category resolved"
                    );
                    return Ok(CategoryResolution {
                        rows,
                        resolved_token: token.clone(),
                        filter_used: filter,
                    });
                }
                Ok(_) => {
                    debug!(label, token, filter, "candidate returned no rows");
                    if first_empty.is_none() {
                        first_empty = Some(CategoryResolution {
                            rows: Vec::new(),
                            resolved_token: token.clone(),
                            filter_used: filter,
                        });
                    }
                }
                Err(error) if error.is_query_syntax() => {
                    debug!(label, token, filter, %error, "filter rejected, skipping candidate");
                    last_syntax_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }
    }

    if let Some(empty) = first_empty {
        return Ok(empty);
    }
    // Every pair was rejected as a syntax error.
    let detail = last_syntax_error
        .map(|error| error.to_string())
        .unwrap_or_else(|| "no candidate filters produced a result".to_string());
    Err(ElementsError::UnresolvableCategory {
        label: label.to_string(),
        detail,
    })
}
