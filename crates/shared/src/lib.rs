//! Shared utilities and common types for the courses backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Public reference generation and masking
//! - Session token validation
//! - Common validation logic

pub mod crypto;
pub mod session;
pub mod validation;
