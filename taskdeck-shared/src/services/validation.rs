/// Input format checks shared by the services and the HTTP layer
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use super::error::ServiceError;

/// Hex (`#fff`, `#ffffff`, `0xffffff`) or `rgb()/rgba()/hsl()/hsla()` notation
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:#|0x)(?:[a-f0-9]{3}|[a-f0-9]{6})|(?:rgb|hsl)a?\([^)]*\))$").unwrap()
});

/// Width of the `projects.color` and `labels.color` columns
pub const MAX_COLOR_LEN: usize = 64;

pub const COLOR_ERROR: &str = "Color must be a hex (#fff, #ffffff) or rgb()/hsl() value";

/// Colors are stored exactly as given, so surrounding whitespace is rejected
pub fn is_valid_color(color: &str) -> bool {
    color.len() <= MAX_COLOR_LEN && COLOR_RE.is_match(color)
}

/// Rejects a color that [`is_valid_color`] refuses, before anything is written
pub fn check_color(color: Option<&str>) -> Result<(), ServiceError> {
    match color {
        Some(color) if !is_valid_color(color) => Err(ServiceError::InvalidColor),
        _ => Ok(()),
    }
}

/// Removes duplicate ids, keeping first occurrences in order
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
