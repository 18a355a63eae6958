//! Shared helpers for resource and engine code.
pub mod fs;
pub mod json;
