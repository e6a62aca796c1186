//! Element and attribute declarations, value constraints and annotations.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::namespaces::QName;

use super::types::TypeDef;

/// Reference from a declaration to its type.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A named type, resolved against the schema's global tables (or the
    /// built-in datatypes) at walk time.
    Named(QName),
    /// An anonymous type defined inline on the declaration.
    Inline(Arc<TypeDef>),
}

/// A global or local element declaration.
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// Qualified element name.
    pub name: QName,
    /// The declared type.
    pub type_ref: TypeRef,
    /// `nillable="true"` on the declaration.
    pub nillable: bool,
    /// `default`/`fixed` value constraint.
    pub constraint: Option<ValueConstraint>,
    /// Annotation attached to the declaration.
    pub annotation: Option<Annotation>,
}

/// An attribute declaration.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Qualified attribute name.
    pub name: QName,
    /// The declared (simple) type.
    pub type_ref: TypeRef,
    /// Annotation attached to the declaration.
    pub annotation: Option<Annotation>,
}

/// An attribute use inside a complex type.
#[derive(Debug, Clone)]
pub struct AttributeUse {
    /// The used declaration.
    pub decl: AttributeDecl,
    /// `use="required"`.
    pub required: bool,
    /// `default`/`fixed` value constraint on the use.
    pub constraint: Option<ValueConstraint>,
}

/// Kind of a value constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `default="..."`: a suggested initial value.
    Default,
    /// `fixed="..."`: the value may not change.
    Fixed,
}

/// A `default` or `fixed` value constraint.
#[derive(Debug, Clone)]
pub struct ValueConstraint {
    /// Default or fixed.
    pub kind: ConstraintKind,
    /// The constrained lexical value.
    pub value: String,
}

impl ValueConstraint {
    /// True for `fixed` constraints.
    pub fn is_fixed(&self) -> bool {
        self.kind == ConstraintKind::Fixed
    }
}

/// Extension properties extracted from an `xs:annotation`.
///
/// Only `appinfo` children in the extension namespace are retained; each
/// contributes one `(local name, text)` property. The walk consumes the
/// well-known `label`, `alert` and `hint` properties.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    properties: IndexMap<String, String>,
}

impl Annotation {
    /// An empty annotation.
    pub fn new() -> Self {
        Annotation::default()
    }

    /// Record a property, keeping the first occurrence when duplicated.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.properties.contains_key(&name) {
            tracing::warn!(property = %name, "duplicate annotation property, keeping the first");
            return;
        }
        self.properties.insert(name, value.into());
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// True when no properties were recorded.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A schema component the walk attaches captions, hints and alerts to.
///
/// Collapses the element/attribute distinction at the points where the
/// form-control factory only needs a name, an annotation and a value
/// constraint.
#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// An element declaration.
    Element(&'a ElementDecl),
    /// An attribute use.
    Attribute(&'a AttributeUse),
}

impl<'a> SchemaNode<'a> {
    /// The component's qualified name.
    pub fn name(&self) -> &QName {
        match self {
            SchemaNode::Element(e) => &e.name,
            SchemaNode::Attribute(a) => &a.decl.name,
        }
    }

    /// The component's annotation, if any.
    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            SchemaNode::Element(e) => e.annotation.as_ref(),
            SchemaNode::Attribute(a) => a.decl.annotation.as_ref(),
        }
    }

    /// The component's value constraint, if any.
    pub fn constraint(&self) -> Option<&ValueConstraint> {
        match self {
            SchemaNode::Element(e) => e.constraint.as_ref(),
            SchemaNode::Attribute(a) => a.constraint.as_ref(),
        }
    }

    /// True for attribute uses.
    pub fn is_attribute(&self) -> bool {
        matches!(self, SchemaNode::Attribute(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_keeps_first_duplicate() {
        let mut a = Annotation::new();
        a.insert("label", "First");
        a.insert("label", "Second");
        assert_eq!(a.property("label"), Some("First"));
    }

    #[test]
    fn schema_node_dispatch() {
        let decl = ElementDecl {
            name: QName::local("street"),
            type_ref: TypeRef::Named(QName::local("string")),
            nillable: false,
            constraint: Some(ValueConstraint {
                kind: ConstraintKind::Fixed,
                value: "Main St".into(),
            }),
            annotation: None,
        };
        let node = SchemaNode::Element(&decl);
        assert_eq!(node.name().local_name, "street");
        assert!(node.constraint().unwrap().is_fixed());
        assert!(!node.is_attribute());
    }
}
