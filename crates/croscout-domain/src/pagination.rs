//! Listing limits and sort direction types.

use serde::{Deserialize, Serialize};

/// Generic sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sort {
    Desc,
    Asc,
}

impl Sort {
    /// Accepts only `"asc"` and `"desc"`; anything else means "no ordering on this key".
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Default number of properties returned by the catalog listing.
pub const DEFAULT_LIST_LIMIT: u64 = 20;

/// Upper bound for a caller-supplied `limit`.
pub const MAX_LIST_LIMIT: u64 = 100;

/// Resolve the `limit` query value: default 20, clamped to 1–100.
/// Unparsable values fall back to the default.
pub fn resolve_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(|n| n.clamp(1, MAX_LIST_LIMIT))
        .unwrap_or(DEFAULT_LIST_LIMIT)
}
