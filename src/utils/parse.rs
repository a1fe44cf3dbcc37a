use std::str::FromStr;

/// Tokens accepted as `true` for boolean-like settings, compared after lower-casing.
pub const TRUTHY_TOKENS: [&str; 3] = ["1", "true", "yes"];

/// Parses `raw` as `T`, or returns `default` when the value is absent or malformed.
///
/// Surrounding whitespace is ignored. Fallback is silent.
pub fn parse_or_default<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

pub fn parse_truthy(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(value) => TRUTHY_TOKENS.contains(&value.to_lowercase().as_str()),
        None => default,
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
/// Order and duplicates are kept.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
