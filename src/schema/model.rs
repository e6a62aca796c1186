//! The loaded schema: global tables and derivation queries.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::dom;
use crate::error::Result;
use crate::namespaces::QName;
use crate::XSD_NAMESPACE;

use super::components::{AttributeUse, ElementDecl, TypeRef};
use super::types::{
    ComplexType, ContentType, DerivationMethod, Particle, SimpleType, SimpleVariety, Term, TypeDef,
};

/// Built-in datatypes whose value space is a whitespace-separated list.
const BUILTIN_LIST_TYPES: &[(&str, &str)] =
    &[("IDREFS", "IDREF"), ("ENTITIES", "ENTITY"), ("NMTOKENS", "NMTOKEN")];

/// An immutable, fully loaded XML Schema.
///
/// Holds the global type and element tables plus the schema's target
/// namespace and, when one was declared on the schema document, the prefix
/// bound to it. Built by [`SchemaModel::parse`].
#[derive(Debug)]
pub struct SchemaModel {
    /// The schema's `targetNamespace`, if declared.
    pub target_namespace: Option<String>,
    /// Prefix bound to the target namespace on the schema document.
    pub target_prefix: Option<String>,
    pub(crate) types: IndexMap<QName, Arc<TypeDef>>,
    pub(crate) elements: IndexMap<QName, ElementDecl>,
    pub(crate) source: Option<dom::Element>,
}

/// The content model of a complex type with extension-inherited parts
/// resolved, base-first.
#[derive(Debug, Default)]
pub struct EffectiveContent {
    /// Content particles contributed along the extension chain, outermost
    /// base first.
    pub particles: Vec<Particle>,
    /// Attribute uses, inherited ones first.
    pub attributes: Vec<AttributeUse>,
    /// The resolved character-data type for simple-content types.
    pub simple: Option<SimpleType>,
}

impl SchemaModel {
    /// Parse a schema document from its XML source.
    pub fn parse(source: &str) -> Result<SchemaModel> {
        super::parsing::parse_schema(source)
    }

    /// Look up a global element declaration by local name against the
    /// target namespace.
    pub fn element(&self, local_name: &str) -> Option<&ElementDecl> {
        let q = match &self.target_namespace {
            Some(ns) => QName::namespaced(ns.clone(), local_name),
            None => QName::local(local_name),
        };
        self.elements.get(&q)
    }

    /// Look up a global element declaration by qualified name.
    pub fn global_element(&self, name: &QName) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// All globally declared types, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = (&QName, &Arc<TypeDef>)> {
        self.types.iter()
    }

    /// The schema document the model was parsed from, for embedding into
    /// generated forms.
    pub fn source_document(&self) -> Option<&dom::Element> {
        self.source.as_ref()
    }

    /// Resolve a type name against the global table, synthesizing built-in
    /// XML Schema datatypes on demand.
    pub fn type_def(&self, name: &QName) -> Option<Arc<TypeDef>> {
        if let Some(t) = self.types.get(name) {
            return Some(Arc::clone(t));
        }
        if name.namespace.as_deref() == Some(XSD_NAMESPACE) {
            return Some(Arc::new(Self::builtin_type(&name.local_name)));
        }
        None
    }

    /// Resolve a declaration's type reference.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<Arc<TypeDef>> {
        match type_ref {
            TypeRef::Named(q) => self.type_def(q),
            TypeRef::Inline(t) => Some(Arc::clone(t)),
        }
    }

    /// The resolved base type of a definition, if it names one.
    pub fn base_of(&self, type_def: &TypeDef) -> Option<Arc<TypeDef>> {
        type_def.base().and_then(|q| self.type_def(q))
    }

    /// Local name of the built-in datatype a simple type restricts,
    /// following the base chain. Defaults to `string` when the chain does
    /// not reach the XML Schema namespace.
    pub fn builtin_name(&self, simple: &SimpleType) -> String {
        if let Some(q) = &simple.name {
            if q.namespace.as_deref() == Some(XSD_NAMESPACE) {
                return q.local_name.clone();
            }
        }
        let mut base = simple.base.clone();
        while let Some(q) = base {
            if q.namespace.as_deref() == Some(XSD_NAMESPACE) {
                return q.local_name;
            }
            match self.types.get(&q).map(Arc::as_ref) {
                Some(TypeDef::Simple(s)) => base = s.base.clone(),
                _ => break,
            }
        }
        "string".to_string()
    }

    /// Number of extension steps between a type and the top of its
    /// derivation chain.
    pub fn extension_depth(&self, type_def: &TypeDef) -> u32 {
        let mut depth = 0;
        let mut current = match type_def.derivation() {
            Some(DerivationMethod::Extension) => self.base_of(type_def),
            _ => None,
        };
        while let Some(t) = current {
            if t.is_any_type() {
                break;
            }
            depth += 1;
            current = match t.derivation() {
                Some(DerivationMethod::Extension) => self.base_of(&t),
                _ => None,
            };
        }
        depth
    }

    /// Resolve the full content model of a complex type, prepending content
    /// and attributes inherited through extension.
    pub fn effective_content(&self, complex: &ComplexType) -> EffectiveContent {
        let mut chain: Vec<ComplexType> = vec![complex.clone()];
        let mut current = complex.clone();
        while current.derivation == Some(DerivationMethod::Extension) {
            let Some(q) = current.base.clone() else { break };
            let Some(base) = self.type_def(&q) else { break };
            if base.is_any_type() {
                break;
            }
            match base.as_ref() {
                TypeDef::Complex(b) => {
                    chain.push(b.clone());
                    current = b.clone();
                }
                TypeDef::Simple(_) => break,
            }
        }

        let mut effective = EffectiveContent::default();
        for ct in chain.iter().rev() {
            match &ct.content {
                ContentType::Empty => {}
                ContentType::Simple(type_ref) => {
                    if effective.simple.is_none() {
                        effective.simple = self.resolve_simple(type_ref);
                    }
                }
                ContentType::Group(p) => effective.particles.push(p.clone()),
            }
            for attr in &ct.attributes {
                let name = &attr.decl.name.local_name;
                if !effective
                    .attributes
                    .iter()
                    .any(|a| &a.decl.name.local_name == name)
                {
                    effective.attributes.push(attr.clone());
                }
            }
        }
        effective
    }

    /// Resolve a type reference down to a simple type, unwrapping
    /// simple-content complex types along the way.
    pub fn resolve_simple(&self, type_ref: &TypeRef) -> Option<SimpleType> {
        match self.resolve(type_ref)?.as_ref() {
            TypeDef::Simple(s) => Some(s.clone()),
            TypeDef::Complex(c) => self.effective_content(c).simple,
        }
    }

    /// True when the complex type (or, through extension, one of its bases)
    /// declares a child element with the given local name.
    pub fn is_element_declared_in(&self, complex: &ComplexType, local_name: &str) -> bool {
        self.effective_content(complex)
            .particles
            .iter()
            .any(|p| particle_declares_element(p, local_name))
    }

    /// True when the complex type (or, through extension, one of its bases)
    /// declares an attribute with the given local name.
    pub fn is_attribute_declared_in(&self, complex: &ComplexType, local_name: &str) -> bool {
        self.effective_content(complex)
            .attributes
            .iter()
            .any(|a| a.decl.name.local_name == local_name)
    }

    /// True when the named child element is inherited from the extension
    /// base rather than declared by the type itself.
    pub fn element_comes_from_extension(&self, complex: &ComplexType, local_name: &str) -> bool {
        if complex.derivation != Some(DerivationMethod::Extension) {
            return false;
        }
        match self.base_complex(complex) {
            Some(base) => self.is_element_declared_in(&base, local_name),
            None => false,
        }
    }

    /// True when the named attribute is inherited from the extension base
    /// rather than declared by the type itself.
    pub fn attribute_comes_from_extension(&self, complex: &ComplexType, local_name: &str) -> bool {
        if complex.derivation != Some(DerivationMethod::Extension) {
            return false;
        }
        match self.base_complex(complex) {
            Some(base) => self.is_attribute_declared_in(&base, local_name),
            None => false,
        }
    }

    fn base_complex(&self, complex: &ComplexType) -> Option<ComplexType> {
        let q = complex.base.as_ref()?;
        let base = self.type_def(q)?;
        if base.is_any_type() {
            return None;
        }
        base.as_complex().cloned()
    }

    /// Synthesize a definition for a built-in datatype.
    fn builtin_type(local_name: &str) -> TypeDef {
        if local_name == "anyType" {
            return TypeDef::Complex(ComplexType {
                name: Some(QName::namespaced(XSD_NAMESPACE, "anyType")),
                base: None,
                derivation: None,
                abstract_type: false,
                mixed: true,
                content: ContentType::Empty,
                attributes: Vec::new(),
                annotation: None,
            });
        }
        if let Some((_, item)) = BUILTIN_LIST_TYPES.iter().find(|(n, _)| *n == local_name) {
            let mut list = SimpleType::builtin(local_name);
            list.variety = SimpleVariety::List(TypeRef::Named(QName::namespaced(
                XSD_NAMESPACE,
                *item,
            )));
            return TypeDef::Simple(list);
        }
        TypeDef::Simple(SimpleType::builtin(local_name))
    }
}

fn particle_declares_element(particle: &Particle, local_name: &str) -> bool {
    match &particle.term {
        Term::Element(e) => e.name.local_name == local_name,
        Term::ElementRef(q) => q.local_name == local_name,
        Term::Group(g) => g
            .particles
            .iter()
            .any(|p| particle_declares_element(p, local_name)),
        Term::Wildcard => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DERIVED: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="http://example.com/addr"
           targetNamespace="http://example.com/addr">
  <xs:complexType name="AddressType" abstract="true">
    <xs:sequence>
      <xs:element name="street" type="xs:string"/>
      <xs:element name="city" type="xs:string"/>
    </xs:sequence>
    <xs:attribute name="id" type="xs:ID" use="required"/>
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
  <xs:simpleType name="StateCode">
    <xs:restriction base="xs:string">
      <xs:enumeration value="CA"/>
      <xs:enumeration value="NY"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:element name="address" type="tns:AddressType"/>
</xs:schema>"#;

    fn schema() -> SchemaModel {
        SchemaModel::parse(DERIVED).unwrap()
    }

    fn complex(model: &SchemaModel, name: &str) -> ComplexType {
        let q = QName::namespaced("http://example.com/addr", name);
        model.type_def(&q).unwrap().as_complex().cloned().unwrap()
    }

    #[test]
    fn builtin_resolution() {
        let model = schema();
        let q = QName::namespaced(XSD_NAMESPACE, "boolean");
        let t = model.type_def(&q).unwrap();
        assert_eq!(model.builtin_name(t.as_simple().unwrap()), "boolean");

        let idrefs = model
            .type_def(&QName::namespaced(XSD_NAMESPACE, "IDREFS"))
            .unwrap();
        assert!(matches!(
            &idrefs.as_simple().unwrap().variety,
            SimpleVariety::List(_)
        ));
    }

    #[test]
    fn builtin_name_follows_restriction_chain() {
        let model = schema();
        let q = QName::namespaced("http://example.com/addr", "StateCode");
        let t = model.type_def(&q).unwrap();
        assert_eq!(model.builtin_name(t.as_simple().unwrap()), "string");
    }

    #[test]
    fn effective_content_includes_inherited() {
        let model = schema();
        let us = complex(&model, "USAddressType");
        let eff = model.effective_content(&us);
        assert_eq!(eff.particles.len(), 2);
        assert_eq!(eff.attributes.len(), 1);
        assert!(model.is_element_declared_in(&us, "street"));
        assert!(model.is_element_declared_in(&us, "zip"));
        assert!(model.is_attribute_declared_in(&us, "id"));
    }

    #[test]
    fn extension_origin() {
        let model = schema();
        let us = complex(&model, "USAddressType");
        assert!(model.element_comes_from_extension(&us, "street"));
        assert!(!model.element_comes_from_extension(&us, "zip"));
        assert!(model.attribute_comes_from_extension(&us, "id"));

        let base = complex(&model, "AddressType");
        assert!(!model.element_comes_from_extension(&base, "street"));
    }

    #[test]
    fn extension_depth_counts_steps() {
        let model = schema();
        let base = complex(&model, "AddressType");
        let us = complex(&model, "USAddressType");
        assert_eq!(model.extension_depth(&TypeDef::Complex(base)), 0);
        assert_eq!(model.extension_depth(&TypeDef::Complex(us)), 1);
    }

    #[test]
    fn root_element_lookup() {
        let model = schema();
        assert!(model.element("address").is_some());
        assert!(model.element("missing").is_none());
    }
}
