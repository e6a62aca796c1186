//! Per-generation state: id counters and namespace prefixes.

use std::collections::HashMap;

use crate::dom::Element;
use crate::namespaces::{
    PrefixTable, QName, EXT_PREFIX, XFORMS_PREFIX, XHTML_PREFIX, XML_EVENTS_PREFIX, XML_PREFIX,
    XSD_PREFIX, XSI_PREFIX,
};
use crate::{
    EXT_NAMESPACE, XFORMS_NAMESPACE, XHTML_NAMESPACE, XML_EVENTS_NAMESPACE, XML_NAMESPACE,
    XSD_NAMESPACE, XSI_NAMESPACE,
};

/// Mutable state threaded through one generation run.
///
/// Ids are `<local-name>_<n>` with one counter per local name, so every
/// generated id is unique within the document. Prefixes for instance
/// namespaces are assigned lazily and collected for declaration on the
/// document and instance roots.
pub(crate) struct BuildContext {
    counters: HashMap<String, u64>,
    prefixes: PrefixTable,
    declarations: Vec<(String, String)>,
}

impl BuildContext {
    pub(crate) fn new() -> Self {
        let mut prefixes = PrefixTable::new();
        prefixes.register(XHTML_NAMESPACE, XHTML_PREFIX);
        prefixes.register(XFORMS_NAMESPACE, XFORMS_PREFIX);
        prefixes.register(XML_EVENTS_NAMESPACE, XML_EVENTS_PREFIX);
        prefixes.register(XSD_NAMESPACE, XSD_PREFIX);
        prefixes.register(XSI_NAMESPACE, XSI_PREFIX);
        prefixes.register(XML_NAMESPACE, XML_PREFIX);
        prefixes.register(EXT_NAMESPACE, EXT_PREFIX);
        BuildContext {
            counters: HashMap::new(),
            prefixes,
            declarations: Vec::new(),
        }
    }

    /// Next id for elements of the given local name.
    pub(crate) fn next_id(&mut self, local_name: &str) -> String {
        let counter = self.counters.entry(local_name.to_string()).or_insert(0);
        let id = format!("{}_{}", local_name, counter);
        *counter += 1;
        id
    }

    /// Assign a fresh id to an element, derived from its local name.
    pub(crate) fn set_id(&mut self, element: &mut Element) -> String {
        let id = self.next_id(&element.local_name().to_string());
        element.set_attr("id", id.clone());
        id
    }

    /// Reassign ids throughout a deep-cloned subtree so copies never share
    /// ids with their originals.
    pub(crate) fn reset_ids(&mut self, element: &mut Element) {
        let mut locals: Vec<String> = Vec::new();
        element.visit_mut(&mut |el| {
            if el.attr("id").is_some() {
                locals.push(el.local_name().to_string());
            }
        });
        let mut ids = locals
            .iter()
            .map(|local| self.next_id(local))
            .collect::<Vec<_>>()
            .into_iter();
        element.visit_mut(&mut |el| {
            if el.attr("id").is_some() {
                if let Some(id) = ids.next() {
                    el.set_attr("id", id);
                }
            }
        });
    }

    /// Pre-declare a namespace with a preferred prefix (the one the schema
    /// document used, when known).
    pub(crate) fn declare_preferred(&mut self, namespace: &str, prefix: Option<&str>) {
        if self.prefixes.get(namespace).is_some() {
            return;
        }
        match prefix {
            Some(p) if !self.declarations.iter().any(|(dp, _)| dp == p) => {
                self.prefixes.register(namespace, p);
                self.declarations.push((p.to_string(), namespace.to_string()));
            }
            _ => {
                let (p, fresh) = self.prefixes.assign(namespace);
                if fresh {
                    self.declarations.push((p, namespace.to_string()));
                }
            }
        }
    }

    /// Prefixed form of a qualified name, assigning a prefix for its
    /// namespace on first use.
    pub(crate) fn qualified_name(&mut self, name: &QName) -> String {
        match &name.namespace {
            None => name.local_name.clone(),
            Some(ns) => {
                let (prefix, fresh) = self.prefixes.assign(ns);
                if fresh {
                    self.declarations.push((prefix.clone(), ns.clone()));
                }
                format!("{}:{}", prefix, name.local_name)
            }
        }
    }

    /// Namespace declarations accumulated for the document roots.
    pub(crate) fn pending_declarations(&self) -> &[(String, String)] {
        &self.declarations
    }
}
