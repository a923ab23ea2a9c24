#![deny(unsafe_code)]

pub mod engine;
pub mod tokens;

pub use engine::{ElementMatch, MatchEngine};
pub use tokens::{similarity, token_set};
