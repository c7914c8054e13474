//! Utility modules for the batch engine
//!
//! Cross-cutting concerns that do not belong to a single component.

pub mod error;
