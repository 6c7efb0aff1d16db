//! Session name normalization.

use std::fmt;

use serde::Serialize;

/// Characters tmux treats specially in target names.
const REPLACED: [char; 3] = [':', ' ', '.'];

/// Make a name safe for use as a tmux session target.
///
/// `:`, spaces and `.` become `-` and the result is lowercased. Applying it
/// twice gives the same result as applying it once.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| if REPLACED.contains(&c) { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// A normalized session name.
///
/// Only constructible through normalization, so a name is never normalized
/// twice by accident further down the call chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Normalize a raw, user-facing name.
    pub fn new(raw: &str) -> Self {
        Self(normalize_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
