//! ClientBook Common
//!
//! Runtime utilities shared by ClientBook binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat};
