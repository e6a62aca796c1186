//! XML namespace handling
//!
//! Qualified names, the fixed namespace vocabulary the generator emits
//! into, and the per-generation prefix table used to name instance
//! elements from foreign namespaces.

use indexmap::IndexMap;

/// XForms namespace prefix used throughout generated documents
pub const XFORMS_PREFIX: &str = "xforms";

/// XHTML namespace prefix
pub const XHTML_PREFIX: &str = "xhtml";

/// XML Events namespace prefix
pub const XML_EVENTS_PREFIX: &str = "ev";

/// XML Schema namespace prefix
pub const XSD_PREFIX: &str = "xs";

/// XML Schema instance namespace prefix
pub const XSI_PREFIX: &str = "xsi";

/// XML namespace prefix
pub const XML_PREFIX: &str = "xml";

/// XMLNS prefix
pub const XMLNS_PREFIX: &str = "xmlns";

/// Extension vocabulary prefix
pub const EXT_PREFIX: &str = "ext";

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Prefix table mapping namespace URIs to prefixes assigned during one
/// form-generation run.
///
/// Prefixes are derived from the URI's last path segment; collisions are
/// disambiguated with a numeric suffix. A prefix is assigned at most once
/// per URI and never reused for a different URI within the same run.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    prefixes: IndexMap<String, String>,
}

impl PrefixTable {
    /// Create an empty prefix table
    pub fn new() -> Self {
        Self {
            prefixes: IndexMap::new(),
        }
    }

    /// Get the prefix already assigned to a namespace URI
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.prefixes.get(namespace).map(|s| s.as_str())
    }

    /// Get or assign a prefix for the given namespace URI.
    ///
    /// Returns the prefix and whether it was newly assigned (so the caller
    /// can declare it on the document root).
    pub fn assign(&mut self, namespace: &str) -> (String, bool) {
        if let Some(prefix) = self.prefixes.get(namespace) {
            return (prefix.clone(), false);
        }
        let base = Self::derive_base_prefix(namespace);
        let mut prefix = base.clone();
        let mut i = 1;
        while self.prefixes.values().any(|p| p == &prefix) {
            prefix = format!("{}{}", base, i);
            i += 1;
        }
        self.prefixes.insert(namespace.to_string(), prefix.clone());
        (prefix, true)
    }

    /// Pre-register a fixed prefix for a namespace (used for the reserved
    /// vocabulary prefixes so lazy assignment never collides with them).
    pub fn register(&mut self, namespace: &str, prefix: &str) {
        self.prefixes
            .insert(namespace.to_string(), prefix.to_string());
    }

    // Last path segment of the URI, ignoring a trailing slash.
    fn derive_base_prefix(namespace: &str) -> String {
        let trimmed = namespace.trim_end_matches('/');
        let segment = trimmed
            .rsplit(|c| c == '/' || c == ':')
            .next()
            .unwrap_or(trimmed);
        let cleaned: String = segment
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if cleaned.is_empty() || cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            format!("ns{}", cleaned)
        } else {
            cleaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.namespace, Some("http://example.com".to_string()));
        assert_eq!(qname.local_name, "element");
    }

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_prefix_from_last_segment() {
        let mut table = PrefixTable::new();
        let (prefix, fresh) = table.assign("http://example.com/orders");
        assert_eq!(prefix, "orders");
        assert!(fresh);

        // Same URI gets the same prefix and is not re-declared
        let (prefix, fresh) = table.assign("http://example.com/orders");
        assert_eq!(prefix, "orders");
        assert!(!fresh);
    }

    #[test]
    fn test_prefix_collision_disambiguation() {
        let mut table = PrefixTable::new();
        let (first, _) = table.assign("http://a.example.com/items");
        let (second, _) = table.assign("http://b.example.com/items");
        assert_eq!(first, "items");
        assert_eq!(second, "items1");
    }

    #[test]
    fn test_prefix_trailing_slash() {
        let mut table = PrefixTable::new();
        let (prefix, _) = table.assign("http://example.com/po/");
        assert_eq!(prefix, "po");
    }

    #[test]
    fn test_registered_prefix_reserved() {
        let mut table = PrefixTable::new();
        table.register(crate::XFORMS_NAMESPACE, XFORMS_PREFIX);
        let (prefix, fresh) = table.assign(crate::XFORMS_NAMESPACE);
        assert_eq!(prefix, XFORMS_PREFIX);
        assert!(!fresh);

        // A URI whose last segment is "xforms" must not steal the prefix
        let (other, _) = table.assign("http://example.com/xforms");
        assert_eq!(other, "xforms1");
    }

    #[test]
    fn test_urn_style_namespace() {
        let mut table = PrefixTable::new();
        let (prefix, _) = table.assign("urn:example:invoice");
        assert_eq!(prefix, "invoice");
    }
}
