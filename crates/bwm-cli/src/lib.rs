#![deny(unsafe_code)]

pub mod logging;
