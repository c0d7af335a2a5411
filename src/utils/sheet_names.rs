//! Worksheet name sanitizing
//!
//! Excel sheet names are at most 31 characters, may not contain
//! `: \ / ? * [ ]`, may not start or end with an apostrophe, and must be
//! unique ignoring case. Complex group names come straight out of the
//! Ultimo classification and break all of these.

use rustc_hash::FxHashSet;

pub const MAX_SHEET_NAME_CHARS: usize = 31;

const FORBIDDEN: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Sheet-safe version of a single name
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    let truncated: String = replaced
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();

    let cleaned = truncated.trim_end().trim_end_matches('\'');
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Assigns unique, sanitized sheet names in call order
#[derive(Debug, Default)]
pub struct SheetNamer {
    taken: FxHashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitized name, suffixed " (2)", " (3)", ... on a case-insensitive clash
    pub fn assign(&mut self, name: &str) -> String {
        let base = sanitize_sheet_name(name);
        if self.taken.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2;
        loop {
            let suffix = format!(" ({n})");
            let room = MAX_SHEET_NAME_CHARS - suffix.chars().count();
            let stem: String = base.chars().take(room).collect();
            let candidate = format!("{}{}", stem.trim_end(), suffix);
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}
