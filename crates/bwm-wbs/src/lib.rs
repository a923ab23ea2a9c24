#![deny(unsafe_code)]

pub mod error;
pub mod hierarchy;
pub mod ingest;

pub use error::{Result, WbsError};
pub use hierarchy::{children_of, roots, sort_items};
pub use ingest::{MAX_LEVEL, WbsRowInput, build_set};
