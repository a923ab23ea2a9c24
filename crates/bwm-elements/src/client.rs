//! Element data service client.
//!
//! The remote service exposes one operation: fetch a page of elements
//! for a model matching a filter expression, given an optional cursor.
//! Everything above it (retry, pagination, extraction, category
//! resolution) works against the [`ElementSource`] trait so tests can
//! script the service.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bwm_model::{ModelElement, ModelId};

use crate::error::{ElementsError, Result};
use crate::extract::element_from_raw;
use crate::retry::{Backoff, with_retry};

/// Rows requested per page.
pub const PAGE_SIZE: usize = 200;

/// Per-call HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// One page of raw element records plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct ElementPage {
    pub results: Vec<serde_json::Value>,
    pub cursor: Option<String>,
}

/// A source of element pages. Implemented by [`HttpElementClient`] and
/// by scripted fakes in tests.
pub trait ElementSource {
    /// Fetches one page of elements matching `filter`.
    fn fetch_page(
        &self,
        model_id: &ModelId,
        filter: &str,
        cursor: Option<&str>,
    ) -> Result<ElementPage>;
}

/// Filter selecting instance-level elements of one category. Preferred:
/// type-level rows would double-count every placed instance.
pub fn instance_filter(token: &str) -> String {
    format!("s.props.Category == '{token}' and s.views.ElementContext == 'Instance'")
}

/// Filter selecting a category with no element-context clause, for
/// model schemas that do not index context.
pub fn category_filter(token: &str) -> String {
    format!("s.props.Category == '{token}'")
}

/// Filter matching every element of the model.
pub fn all_elements_filter() -> String {
    "s.props.ElementId != ''".to_string()
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none", rename = "cursorState")]
    cursor_state: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

#[derive(Deserialize)]
struct Pagination {
    #[serde(rename = "cursorState")]
    cursor_state: Option<String>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    message: String,
}

/// Blocking HTTP implementation of [`ElementSource`].
pub struct HttpElementClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpElementClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ElementsError::from)?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn query_url(&self, model_id: &ModelId) -> String {
        format!("{}/v2/models/{}/properties:query", self.base_url, model_id)
    }
}

impl ElementSource for HttpElementClient {
    fn fetch_page(
        &self,
        model_id: &ModelId,
        filter: &str,
        cursor: Option<&str>,
    ) -> Result<ElementPage> {
        debug!(model = %model_id, filter, cursor = cursor.is_some(), "querying element page");

        let body = QueryRequest {
            query: filter,
            limit: PAGE_SIZE,
            cursor_state: cursor,
        };
        let mut request = self
            .http
            .post(self.query_url(model_id))
            .header(ACCEPT, "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().map_err(ElementsError::from)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ElementsError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: QueryResponse = response
            .json()
            .map_err(|err| ElementsError::Decode(err.to_string()))?;
        if let Some(error) = parsed.error {
            return Err(ElementsError::Service(error.message));
        }

        Ok(ElementPage {
            results: parsed.results,
            cursor: parsed.pagination.and_then(|p| p.cursor_state),
        })
    }
}

/// Fetches every page matching `filter` and normalizes the rows.
///
/// Pagination is strictly sequential: each page's cursor comes from the
/// prior response. Each page call gets its own retry budget; page order
/// and row order are preserved as returned by the service. The caller
/// bounds scope via the filter, there is no implicit global limit.
pub fn fetch_model_elements(
    source: &dyn ElementSource,
    model_id: &ModelId,
    filter: &str,
) -> Result<Vec<ModelElement>> {
    fetch_model_elements_with(source, model_id, filter, Backoff::default(), |delay| {
        std::thread::sleep(delay);
    })
}

/// [`fetch_model_elements`] with an injected backoff and sleeper.
pub fn fetch_model_elements_with(
    source: &dyn ElementSource,
    model_id: &ModelId,
    filter: &str,
    backoff: Backoff,
    mut sleep: impl FnMut(Duration),
) -> Result<Vec<ModelElement>> {
    let mut elements = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0_u32;

    loop {
        let page = with_retry(backoff, ElementsError::is_retryable, &mut sleep, || {
            source.fetch_page(model_id, filter, cursor.as_deref())
        })?;
        pages += 1;
        elements.extend(page.results.iter().map(element_from_raw));
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(model = %model_id, pages, rows = elements.len(), "fetched element pages");
    Ok(elements)
}
