//! # moodrec common library
//!
//! Shared code for the moodrec services:
//! - Mood vocabulary shared by fusion, streaming and catalog mapping
//! - Bootstrap configuration loading (TOML + environment)
//! - Common error type

pub mod config;
pub mod error;
pub mod mood;

pub use error::{Error, Result};
pub use mood::Mood;
