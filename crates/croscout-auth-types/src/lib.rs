//! Auth types shared across Croscout crates.
//!
//! Provides bearer-token validation and the `Identity` extractor.

pub mod identity;
pub mod token;
