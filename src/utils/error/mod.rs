//! Error handling utilities
//!
//! This module defines the crate-wide error taxonomy and result alias.

pub mod error;

pub use error::{GraphBatchError, Result};
