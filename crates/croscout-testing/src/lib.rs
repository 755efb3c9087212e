//! Test helpers shared by Croscout service tests.

pub mod auth;
