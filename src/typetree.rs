//! Type-compatibility index.
//!
//! For every named type, the ordered set of non-abstract types derived
//! from it by extension, at any depth. The form walk uses an entry with
//! more than one candidate (or a non-empty entry on a non-abstract type)
//! to emit an `xsi:type` selector and one switch case per candidate.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::namespaces::QName;
use crate::schema::{DerivationMethod, SchemaModel, TypeDef};

/// Index from type name to its extension-compatible concrete descendants.
///
/// An entry never contains the type it is keyed by, and candidates are
/// ordered by extension depth first (shallower derivations first), then by
/// qualified name.
#[derive(Debug, Default)]
pub struct TypeTree {
    entries: IndexMap<QName, Vec<Arc<TypeDef>>>,
}

impl TypeTree {
    /// Build the index over all named types of a schema.
    ///
    /// Each type's derivation chain is walked upward once; along the way
    /// every concrete extension-derived type below the visited ancestor is
    /// merged into the ancestor's entry. Complex and simple types are
    /// indexed in separate passes so a chain never crosses categories.
    pub fn build(schema: &SchemaModel) -> TypeTree {
        let mut tree = TypeTree::default();
        for complex in [true, false] {
            for (_, type_def) in schema.types() {
                if matches!(type_def.as_ref(), TypeDef::Complex(_)) == complex {
                    tree.index_chain(schema, type_def);
                }
            }
        }
        for (name, descendants) in tree.entries.iter_mut() {
            descendants.sort_by_key(|t| {
                (
                    schema.extension_depth(t),
                    t.name().cloned().unwrap_or_else(|| name.clone()),
                )
            });
        }
        tree
    }

    /// Compatible descendants recorded for a type name.
    pub fn compatible(&self, name: &QName) -> &[Arc<TypeDef>] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn index_chain(&mut self, schema: &SchemaModel, start: &Arc<TypeDef>) {
        let is_complex = matches!(start.as_ref(), TypeDef::Complex(_));
        let mut descendants: Vec<Arc<TypeDef>> = Vec::new();
        if is_extension_candidate(start) {
            descendants.push(Arc::clone(start));
        }
        let mut current = Arc::clone(start);
        loop {
            let Some(base) = schema.base_of(&current) else { break };
            if base.is_any_type() {
                break;
            }
            if matches!(base.as_ref(), TypeDef::Complex(_)) != is_complex {
                break;
            }
            let Some(base_name) = base.name().cloned() else { break };
            let entry = self.entries.entry(base_name).or_default();
            for d in &descendants {
                if !entry.iter().any(|e| e.name() == d.name()) {
                    entry.push(Arc::clone(d));
                }
            }
            if is_extension_candidate(&base)
                && !descendants.iter().any(|d| d.name() == base.name())
            {
                descendants.push(Arc::clone(&base));
            }
            current = base;
        }
    }
}

/// A type joins its ancestors' compatible sets only when it is concrete
/// and reached its base by extension.
fn is_extension_candidate(type_def: &TypeDef) -> bool {
    !type_def.is_abstract() && type_def.derivation() == Some(DerivationMethod::Extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://example.com/addr";

    const SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="http://example.com/addr"
           targetNamespace="http://example.com/addr">
  <xs:complexType name="AddressType" abstract="true">
    <xs:sequence>
      <xs:element name="street" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
  <xs:complexType name="USAddressType">
    <xs:complexContent>
      <xs:extension base="tns:AddressType">
        <xs:sequence>
          <xs:element name="zip" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="CanadianAddressType">
    <xs:complexContent>
      <xs:extension base="tns:AddressType">
        <xs:sequence>
          <xs:element name="postalCode" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="CaliforniaAddressType">
    <xs:complexContent>
      <xs:extension base="tns:USAddressType">
        <xs:sequence>
          <xs:element name="county" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="RestrictedAddressType">
    <xs:complexContent>
      <xs:restriction base="tns:AddressType">
        <xs:sequence>
          <xs:element name="street" type="xs:string"/>
        </xs:sequence>
      </xs:restriction>
    </xs:complexContent>
  </xs:complexType>
</xs:schema>"#;

    fn tree_and_names(type_name: &str) -> Vec<String> {
        let model = SchemaModel::parse(SCHEMA).unwrap();
        let tree = TypeTree::build(&model);
        tree.compatible(&QName::namespaced(NS, type_name))
            .iter()
            .map(|t| t.name().unwrap().local_name.clone())
            .collect()
    }

    #[test]
    fn abstract_base_collects_concrete_extensions() {
        let names = tree_and_names("AddressType");
        assert!(names.contains(&"USAddressType".to_string()));
        assert!(names.contains(&"CanadianAddressType".to_string()));
        assert!(names.contains(&"CaliforniaAddressType".to_string()));
        assert!(!names.contains(&"AddressType".to_string()));
        assert!(!names.contains(&"RestrictedAddressType".to_string()));
    }

    #[test]
    fn depth_then_name_ordering() {
        let names = tree_and_names("AddressType");
        assert_eq!(
            names,
            vec!["CanadianAddressType", "USAddressType", "CaliforniaAddressType"]
        );
    }

    #[test]
    fn grandparent_sees_grandchildren() {
        let names = tree_and_names("USAddressType");
        assert_eq!(names, vec!["CaliforniaAddressType"]);
    }

    #[test]
    fn leaf_entry_is_empty() {
        assert!(tree_and_names("CaliforniaAddressType").is_empty());
    }

    #[test]
    fn restriction_does_not_join() {
        assert!(tree_and_names("RestrictedAddressType").is_empty());
    }
}
