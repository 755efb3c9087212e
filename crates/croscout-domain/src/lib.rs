//! Domain types shared across Croscout crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod booking;
pub mod pagination;
pub mod user;
