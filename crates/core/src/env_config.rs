//! Environment variable parsing with warn-level logging for invalid values.

use crate::constants::{DECODE_MODE_ENV, DEFAULT_TABLE_NAME, TABLE_ENV};
use crate::decoder::DecodeMode;

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    parse_with_default(var, std::env::var(var).ok().as_deref(), default)
}

fn parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    raw: Option<&str>,
    default: T,
) -> T {
    match raw {
        Some(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        None => default,
    }
}

/// Destination table name from `MSGPIPE_TABLE`, falling back to `Dataset`.
///
/// Blank values count as unset.
pub fn table_name_from_env() -> String {
    table_name_from_value(std::env::var(TABLE_ENV).ok().as_deref())
}

fn table_name_from_value(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| DEFAULT_TABLE_NAME.to_owned(), str::to_owned)
}

/// Decode mode from `MSGPIPE_DECODE_MODE`, defaulting to lenient.
pub fn decode_mode_from_env() -> DecodeMode {
    env_parse_with_default(DECODE_MODE_ENV, DecodeMode::default())
}
