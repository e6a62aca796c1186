//! Locale resource bundles
//!
//! Annotation-supplied captions, alerts and hints may be `${key}`
//! placeholders; a [`ResourceBundle`] resolves them to localized strings.

use std::collections::HashMap;

/// A key -> localized-string table used to resolve `${key}` placeholders
/// in annotation-supplied labels, alerts and hints.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    entries: HashMap<String, String>,
}

impl ResourceBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a key/value pair
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }
}

impl FromIterator<(String, String)> for ResourceBundle {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Resolve a `${key}` placeholder against an optional bundle.
///
/// Non-placeholder values pass through unchanged. A placeholder whose key
/// is missing from the bundle (or when no bundle was supplied) renders as
/// `$$key$$` so the omission is visible in the generated form.
pub fn resolve_placeholder(value: &str, bundle: Option<&ResourceBundle>) -> String {
    let Some(key) = value.strip_prefix("${").and_then(|s| s.strip_suffix('}')) else {
        return value.to_string();
    };
    match bundle.and_then(|b| b.get(key)) {
        Some(resolved) => resolved.to_string(),
        None => format!("$${}$$", key),
    }
}
