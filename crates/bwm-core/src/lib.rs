#![deny(unsafe_code)]

pub mod error;
pub mod service;
pub mod store;

pub use error::{CoreError, Result};
pub use service::{MatchService, RunSummary, SavedSet};
pub use store::{JsonFileStore, MatchStore, MemoryStore, StoreError};
