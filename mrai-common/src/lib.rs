//! # MRAI Common Library
//!
//! Shared code for the music-rating dataset pipeline:
//! - Error type and result alias
//! - Column names and table schemas for every persisted artifact
//! - Structural validation of table headers
//! - Configuration loading

pub mod columns;
pub mod config;
pub mod error;

pub use error::{Error, Result};
