#![deny(unsafe_code)]

pub mod category;
pub mod client;
pub mod error;
pub mod extract;
pub mod resolve;
pub mod retry;

pub use category::candidate_tokens;
pub use client::{
    ElementPage, ElementSource, HttpElementClient, PAGE_SIZE, all_elements_filter,
    fetch_model_elements, fetch_model_elements_with,
};
pub use error::{ElementsError, Result};
pub use extract::{ComplianceStats, compliance_stats, element_from_raw};
pub use resolve::{CategoryResolution, resolve_category_elements, resolve_category_elements_with};
pub use retry::{Backoff, with_retry};
