//! Simple and complex type definitions.

use std::sync::Arc;

use crate::namespaces::QName;
use crate::XSD_NAMESPACE;

use super::components::{Annotation, AttributeUse, ElementDecl, TypeRef};
use super::particles::Occurs;

/// How a type was derived from its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMethod {
    /// Derivation by restriction.
    Restriction,
    /// Derivation by extension.
    Extension,
}

/// A named or anonymous type definition.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// A simple type.
    Simple(SimpleType),
    /// A complex type.
    Complex(ComplexType),
}

impl TypeDef {
    /// The type's qualified name, if it is globally declared.
    pub fn name(&self) -> Option<&QName> {
        match self {
            TypeDef::Simple(s) => s.name.as_ref(),
            TypeDef::Complex(c) => c.name.as_ref(),
        }
    }

    /// The qualified name of the base type, if any.
    pub fn base(&self) -> Option<&QName> {
        match self {
            TypeDef::Simple(s) => s.base.as_ref(),
            TypeDef::Complex(c) => c.base.as_ref(),
        }
    }

    /// The derivation method relating this type to its base.
    pub fn derivation(&self) -> Option<DerivationMethod> {
        match self {
            TypeDef::Simple(_) => Some(DerivationMethod::Restriction),
            TypeDef::Complex(c) => c.derivation,
        }
    }

    /// True for the built-in `xs:anyType`.
    pub fn is_any_type(&self) -> bool {
        matches!(
            self.name(),
            Some(q) if q.local_name == "anyType"
                && q.namespace.as_deref() == Some(XSD_NAMESPACE)
        )
    }

    /// True for abstract complex types. Simple types are never abstract here.
    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeDef::Complex(c) if c.abstract_type)
    }

    /// The simple type definition, if this is one.
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            TypeDef::Simple(s) => Some(s),
            TypeDef::Complex(_) => None,
        }
    }

    /// The complex type definition, if this is one.
    pub fn as_complex(&self) -> Option<&ComplexType> {
        match self {
            TypeDef::Complex(c) => Some(c),
            TypeDef::Simple(_) => None,
        }
    }
}

/// The variety of a simple type.
#[derive(Debug, Clone)]
pub enum SimpleVariety {
    /// An atomic value type.
    Atomic,
    /// A whitespace-separated list of values of the referenced item type.
    List(TypeRef),
}

/// A simple type definition, always rooted (possibly transitively) in a
/// built-in XML Schema datatype.
#[derive(Debug, Clone)]
pub struct SimpleType {
    /// Global name, `None` for anonymous types.
    pub name: Option<QName>,
    /// Name of the restriction base, `None` for directly built-in types.
    pub base: Option<QName>,
    /// Atomic or list.
    pub variety: SimpleVariety,
    /// Values of `xs:enumeration` facets, in declaration order.
    pub enumeration: Vec<EnumValue>,
    /// Documentation attached to the type definition.
    pub annotation: Option<Annotation>,
}

impl SimpleType {
    /// A bare built-in datatype with the given local name.
    pub fn builtin(local_name: &str) -> Self {
        SimpleType {
            name: Some(QName::namespaced(XSD_NAMESPACE, local_name)),
            base: None,
            variety: SimpleVariety::Atomic,
            enumeration: Vec::new(),
            annotation: None,
        }
    }

    /// True when the type carries at least one enumeration facet.
    pub fn has_enumeration(&self) -> bool {
        !self.enumeration.is_empty()
    }

    /// True when the type is declared directly in the XML Schema namespace.
    pub fn is_builtin(&self) -> bool {
        matches!(&self.name, Some(q) if q.namespace.as_deref() == Some(XSD_NAMESPACE))
    }
}

/// One `xs:enumeration` facet value, with its optional annotation.
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// The lexical facet value.
    pub value: String,
    /// Annotation carried by the facet, used for display labels.
    pub annotation: Option<Annotation>,
}

/// A complex type definition.
#[derive(Debug, Clone)]
pub struct ComplexType {
    /// Global name, `None` for anonymous types.
    pub name: Option<QName>,
    /// Name of the base type under `simpleContent`/`complexContent`.
    pub base: Option<QName>,
    /// Derivation method relating this type to `base`.
    pub derivation: Option<DerivationMethod>,
    /// `abstract="true"` on the definition.
    pub abstract_type: bool,
    /// `mixed="true"` on the definition or its `complexContent`.
    pub mixed: bool,
    /// The type's own content model. Content inherited through extension is
    /// resolved by [`SchemaModel::effective_content`].
    ///
    /// [`SchemaModel::effective_content`]: super::SchemaModel::effective_content
    pub content: ContentType,
    /// The type's own attribute uses.
    pub attributes: Vec<AttributeUse>,
    /// Documentation attached to the type definition.
    pub annotation: Option<Annotation>,
}

/// The content model of a complex type.
#[derive(Debug, Clone)]
pub enum ContentType {
    /// No character or element content of its own.
    Empty,
    /// Simple content; the reference names the character-data type.
    Simple(TypeRef),
    /// Element content.
    Group(Particle),
}

/// A model group: a compositor over a list of particles.
#[derive(Debug, Clone)]
pub struct ModelGroup {
    /// The compositor kind.
    pub compositor: Compositor,
    /// Child particles in declaration order.
    pub particles: Vec<Particle>,
}

/// Compositor of a model group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    /// `xs:sequence`
    Sequence,
    /// `xs:choice`
    Choice,
    /// `xs:all`
    All,
}

/// A particle: a term with occurrence bounds.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Occurrence bounds of the term.
    pub occurs: Occurs,
    /// The governed term.
    pub term: Term,
}

/// The term of a particle.
#[derive(Debug, Clone)]
pub enum Term {
    /// A locally declared element.
    Element(ElementDecl),
    /// A reference to a global element declaration, resolved at walk time
    /// so recursive content models stay finite in the model.
    ElementRef(QName),
    /// A nested model group.
    Group(Arc<ModelGroup>),
    /// An `xs:any` wildcard. Skipped by the form walk.
    Wildcard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_type_detection() {
        let any = TypeDef::Complex(ComplexType {
            name: Some(QName::namespaced(XSD_NAMESPACE, "anyType")),
            base: None,
            derivation: None,
            abstract_type: false,
            mixed: false,
            content: ContentType::Empty,
            attributes: Vec::new(),
            annotation: None,
        });
        assert!(any.is_any_type());

        let s = TypeDef::Simple(SimpleType::builtin("string"));
        assert!(!s.is_any_type());
    }

    #[test]
    fn builtin_simple_type() {
        let b = SimpleType::builtin("boolean");
        assert!(b.is_builtin());
        assert!(!b.has_enumeration());
        assert_eq!(b.name.as_ref().unwrap().local_name, "boolean");
    }

    #[test]
    fn simple_types_restrict() {
        let s = TypeDef::Simple(SimpleType::builtin("string"));
        assert_eq!(s.derivation(), Some(DerivationMethod::Restriction));
    }
}
