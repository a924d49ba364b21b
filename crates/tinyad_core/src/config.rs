//! Process configuration read from the environment.
//!
//! Each flag is read on first use and memoised for the lifetime of the process.

use std::env;
use std::sync::OnceLock;

pub const DEBUG_ENV: &str = "TINYAD_DEBUG";

static DEBUG: OnceLock<bool> = OnceLock::new();

pub fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

/// Whether `TINYAD_DEBUG` asks for per-op profiling output.
pub fn debug_enabled() -> bool {
    *DEBUG.get_or_init(|| match env::var(DEBUG_ENV) {
        Ok(value) if !value.trim().is_empty() => parse_bool(&value),
        _ => false,
    })
}
