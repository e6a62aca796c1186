//! XML Schema document parser.
//!
//! Reads the subset of XML Schema the form generator consumes into a
//! [`SchemaModel`]: global element declarations, named simple and complex
//! types, particles, attribute uses, facets and extension-namespace
//! annotations. Unsupported constructs (named model groups, attribute
//! groups, substitution groups) are skipped with a warning rather than
//! rejected.

use std::sync::Arc;

use indexmap::IndexMap;
use roxmltree::Node;
use tracing::{debug, warn};

use crate::dom;
use crate::error::{ParseError, Result};
use crate::namespaces::QName;
use crate::{EXT_NAMESPACE, XSD_NAMESPACE};

use super::components::{
    Annotation, AttributeDecl, AttributeUse, ConstraintKind, ElementDecl, TypeRef, ValueConstraint,
};
use super::particles::Occurs;
use super::types::{
    ComplexType, Compositor, ContentType, DerivationMethod, EnumValue, ModelGroup, Particle,
    SimpleType, SimpleVariety, Term, TypeDef,
};
use super::SchemaModel;

/// XML Schema element local names recognized by the parser.
mod tags {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const ATTRIBUTE: &str = "attribute";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANY: &str = "any";
    pub const GROUP: &str = "group";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const EXTENSION: &str = "extension";
    pub const RESTRICTION: &str = "restriction";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const ENUMERATION: &str = "enumeration";
    pub const ANNOTATION: &str = "annotation";
    pub const APPINFO: &str = "appinfo";
}

/// XML Schema attribute names recognized by the parser.
mod attrs {
    pub const NAME: &str = "name";
    pub const REF: &str = "ref";
    pub const TYPE: &str = "type";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const ITEM_TYPE: &str = "itemType";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const USE: &str = "use";
    pub const NILLABLE: &str = "nillable";
    pub const ABSTRACT: &str = "abstract";
    pub const MIXED: &str = "mixed";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
}

/// Parse a schema document into a [`SchemaModel`].
pub fn parse_schema(source: &str) -> Result<SchemaModel> {
    let doc = roxmltree::Document::parse(source)
        .map_err(|e| ParseError::new("malformed schema document").with_source(e.to_string()))?;
    let root = doc.root_element();
    if !is_xsd(root, tags::SCHEMA) {
        return Err(ParseError::new(format!(
            "expected root element '{{{}}}schema', found '{}'",
            XSD_NAMESPACE,
            root.tag_name().name()
        ))
        .into());
    }

    let target_namespace = root
        .attribute(attrs::TARGET_NAMESPACE)
        .map(str::to_string);
    let target_prefix = target_namespace.as_deref().and_then(|ns| {
        root.namespaces()
            .find(|n| n.uri() == ns && n.name().is_some())
            .and_then(|n| n.name())
            .map(str::to_string)
    });

    let parser = Parser {
        target_namespace: target_namespace.clone(),
        qualified_elements: root.attribute(attrs::ELEMENT_FORM_DEFAULT) == Some("qualified"),
        qualified_attributes: root.attribute(attrs::ATTRIBUTE_FORM_DEFAULT) == Some("qualified"),
    };

    let mut types: IndexMap<QName, Arc<TypeDef>> = IndexMap::new();
    let mut elements: IndexMap<QName, ElementDecl> = IndexMap::new();

    for child in root.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            continue;
        }
        match child.tag_name().name() {
            tags::ELEMENT => {
                let decl = parser.parse_global_element(child)?;
                elements.insert(decl.name.clone(), decl);
            }
            tags::COMPLEX_TYPE => {
                let ct = parser.parse_complex_type(child, true)?;
                let Some(name) = ct.name.clone() else {
                    return Err(ParseError::new("global complexType requires a name").into());
                };
                types.insert(name, Arc::new(TypeDef::Complex(ct)));
            }
            tags::SIMPLE_TYPE => {
                let st = parser.parse_simple_type(child, true)?;
                let Some(name) = st.name.clone() else {
                    return Err(ParseError::new("global simpleType requires a name").into());
                };
                types.insert(name, Arc::new(TypeDef::Simple(st)));
            }
            tags::ANNOTATION => {}
            other => debug!(tag = other, "skipping top-level schema construct"),
        }
    }

    let source_element = dom::Document::from_string(source)?.root;

    Ok(SchemaModel {
        target_namespace,
        target_prefix,
        types,
        elements,
        source: Some(source_element),
    })
}

struct Parser {
    target_namespace: Option<String>,
    qualified_elements: bool,
    qualified_attributes: bool,
}

impl Parser {
    fn parse_global_element(&self, node: Node) -> Result<ElementDecl> {
        let name = node
            .attribute(attrs::NAME)
            .ok_or_else(|| ParseError::new("global element requires a name"))?;
        // Globals are always qualified by the target namespace.
        let qname = self.qualify(name, true);
        self.parse_element_body(node, qname)
    }

    fn parse_local_element(&self, node: Node) -> Result<ElementDecl> {
        let name = node
            .attribute(attrs::NAME)
            .ok_or_else(|| ParseError::new("local element requires a name or ref"))?;
        let qualified = match node.attribute(attrs::FORM) {
            Some("qualified") => true,
            Some("unqualified") => false,
            _ => self.qualified_elements,
        };
        let qname = self.qualify(name, qualified);
        self.parse_element_body(node, qname)
    }

    fn parse_element_body(&self, node: Node, name: QName) -> Result<ElementDecl> {
        let type_ref = if let Some(t) = node.attribute(attrs::TYPE) {
            TypeRef::Named(resolve_qname(node, t))
        } else if let Some(ct) = xsd_child(node, tags::COMPLEX_TYPE) {
            TypeRef::Inline(Arc::new(TypeDef::Complex(self.parse_complex_type(ct, false)?)))
        } else if let Some(st) = xsd_child(node, tags::SIMPLE_TYPE) {
            TypeRef::Inline(Arc::new(TypeDef::Simple(self.parse_simple_type(st, false)?)))
        } else {
            // An element without a declared type accepts anything.
            TypeRef::Named(QName::namespaced(XSD_NAMESPACE, "anyType"))
        };
        Ok(ElementDecl {
            name,
            type_ref,
            nillable: bool_attr(node, attrs::NILLABLE),
            constraint: parse_constraint(node),
            annotation: parse_annotation(node),
        })
    }

    fn parse_complex_type(&self, node: Node, global: bool) -> Result<ComplexType> {
        let name = if global {
            node.attribute(attrs::NAME).map(|n| self.qualify(n, true))
        } else {
            None
        };
        let mut ct = ComplexType {
            name,
            base: None,
            derivation: None,
            abstract_type: bool_attr(node, attrs::ABSTRACT),
            mixed: bool_attr(node, attrs::MIXED),
            content: ContentType::Empty,
            attributes: Vec::new(),
            annotation: parse_annotation(node),
        };

        if let Some(sc) = xsd_child(node, tags::SIMPLE_CONTENT) {
            self.parse_simple_content(sc, &mut ct)?;
        } else if let Some(cc) = xsd_child(node, tags::COMPLEX_CONTENT) {
            if bool_attr(cc, attrs::MIXED) {
                ct.mixed = true;
            }
            self.parse_complex_content(cc, &mut ct)?;
        } else {
            ct.content = self.parse_content_particle(node)?;
            ct.attributes = self.parse_attribute_uses(node)?;
        }
        Ok(ct)
    }

    fn parse_simple_content(&self, node: Node, ct: &mut ComplexType) -> Result<()> {
        let (derivation, body) = derivation_child(node)?;
        let base = body
            .attribute(attrs::BASE)
            .ok_or_else(|| ParseError::new("simpleContent derivation requires a base"))?;
        let base = resolve_qname(body, base);
        ct.derivation = Some(derivation);
        ct.base = Some(base.clone());
        ct.content = if derivation == DerivationMethod::Restriction
            && body.children().any(|n| is_xsd(n, tags::ENUMERATION))
        {
            // Facets restricting the character data form an anonymous
            // simple type of their own.
            let restricted = SimpleType {
                name: None,
                base: Some(base),
                variety: SimpleVariety::Atomic,
                enumeration: parse_enumeration(body),
                annotation: None,
            };
            ContentType::Simple(TypeRef::Inline(Arc::new(TypeDef::Simple(restricted))))
        } else {
            ContentType::Simple(TypeRef::Named(base))
        };
        ct.attributes = self.parse_attribute_uses(body)?;
        Ok(())
    }

    fn parse_complex_content(&self, node: Node, ct: &mut ComplexType) -> Result<()> {
        let (derivation, body) = derivation_child(node)?;
        let base = body
            .attribute(attrs::BASE)
            .ok_or_else(|| ParseError::new("complexContent derivation requires a base"))?;
        ct.derivation = Some(derivation);
        ct.base = Some(resolve_qname(body, base));
        ct.content = self.parse_content_particle(body)?;
        ct.attributes = self.parse_attribute_uses(body)?;
        Ok(())
    }

    /// Parse the content-model particle (sequence, choice or all) directly
    /// under a complex type or derivation body.
    fn parse_content_particle(&self, node: Node) -> Result<ContentType> {
        for child in node.children().filter(|n| n.is_element()) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let compositor = match child.tag_name().name() {
                tags::SEQUENCE => Compositor::Sequence,
                tags::CHOICE => Compositor::Choice,
                tags::ALL => Compositor::All,
                tags::GROUP => {
                    warn!("named model group references are not supported, skipping");
                    continue;
                }
                _ => continue,
            };
            let occurs = parse_occurs(child)?;
            let group = self.parse_model_group(child, compositor)?;
            return Ok(ContentType::Group(Particle {
                occurs,
                term: Term::Group(Arc::new(group)),
            }));
        }
        Ok(ContentType::Empty)
    }

    fn parse_model_group(&self, node: Node, compositor: Compositor) -> Result<ModelGroup> {
        let mut particles = Vec::new();
        for child in node.children().filter(|n| n.is_element()) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let occurs = parse_occurs(child)?;
            let term = match child.tag_name().name() {
                tags::ELEMENT => {
                    if let Some(reference) = child.attribute(attrs::REF) {
                        Term::ElementRef(resolve_qname(child, reference))
                    } else {
                        Term::Element(self.parse_local_element(child)?)
                    }
                }
                tags::SEQUENCE => Term::Group(Arc::new(
                    self.parse_model_group(child, Compositor::Sequence)?,
                )),
                tags::CHOICE => {
                    Term::Group(Arc::new(self.parse_model_group(child, Compositor::Choice)?))
                }
                tags::ALL => {
                    Term::Group(Arc::new(self.parse_model_group(child, Compositor::All)?))
                }
                tags::ANY => Term::Wildcard,
                tags::GROUP => {
                    warn!("named model group references are not supported, skipping");
                    continue;
                }
                tags::ANNOTATION => continue,
                other => {
                    debug!(tag = other, "skipping unsupported particle");
                    continue;
                }
            };
            particles.push(Particle { occurs, term });
        }
        Ok(ModelGroup {
            compositor,
            particles,
        })
    }

    fn parse_attribute_uses(&self, node: Node) -> Result<Vec<AttributeUse>> {
        let mut uses = Vec::new();
        for child in node.children().filter(|n| n.is_element()) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            match child.tag_name().name() {
                tags::ATTRIBUTE => {
                    if let Some(u) = self.parse_attribute_use(child)? {
                        uses.push(u);
                    }
                }
                tags::ATTRIBUTE_GROUP => {
                    warn!("attribute group references are not supported, skipping");
                }
                _ => {}
            }
        }
        Ok(uses)
    }

    fn parse_attribute_use(&self, node: Node) -> Result<Option<AttributeUse>> {
        if node.attribute(attrs::USE) == Some("prohibited") {
            return Ok(None);
        }
        if node.attribute(attrs::REF).is_some() {
            warn!("global attribute references are not supported, skipping");
            return Ok(None);
        }
        let name = node
            .attribute(attrs::NAME)
            .ok_or_else(|| ParseError::new("attribute declaration requires a name"))?;
        let qualified = match node.attribute(attrs::FORM) {
            Some("qualified") => true,
            Some("unqualified") => false,
            _ => self.qualified_attributes,
        };
        let type_ref = if let Some(t) = node.attribute(attrs::TYPE) {
            TypeRef::Named(resolve_qname(node, t))
        } else if let Some(st) = xsd_child(node, tags::SIMPLE_TYPE) {
            TypeRef::Inline(Arc::new(TypeDef::Simple(self.parse_simple_type(st, false)?)))
        } else {
            TypeRef::Named(QName::namespaced(XSD_NAMESPACE, "string"))
        };
        Ok(Some(AttributeUse {
            decl: AttributeDecl {
                name: self.qualify(name, qualified),
                type_ref,
                annotation: parse_annotation(node),
            },
            required: node.attribute(attrs::USE) == Some("required"),
            constraint: parse_constraint(node),
        }))
    }

    fn parse_simple_type(&self, node: Node, global: bool) -> Result<SimpleType> {
        let name = if global {
            node.attribute(attrs::NAME).map(|n| self.qualify(n, true))
        } else {
            None
        };
        let annotation = parse_annotation(node);

        if let Some(list) = xsd_child(node, tags::LIST) {
            let item = if let Some(item_type) = list.attribute(attrs::ITEM_TYPE) {
                TypeRef::Named(resolve_qname(list, item_type))
            } else if let Some(inline) = xsd_child(list, tags::SIMPLE_TYPE) {
                TypeRef::Inline(Arc::new(TypeDef::Simple(
                    self.parse_simple_type(inline, false)?,
                )))
            } else {
                return Err(ParseError::new("list type requires an item type").into());
            };
            return Ok(SimpleType {
                name,
                base: None,
                variety: SimpleVariety::List(item),
                enumeration: Vec::new(),
                annotation,
            });
        }

        if xsd_child(node, tags::UNION).is_some() {
            debug!("union simple type treated as unconstrained string");
            return Ok(SimpleType {
                name,
                base: Some(QName::namespaced(XSD_NAMESPACE, "string")),
                variety: SimpleVariety::Atomic,
                enumeration: Vec::new(),
                annotation,
            });
        }

        let restriction = xsd_child(node, tags::RESTRICTION)
            .ok_or_else(|| ParseError::new("simpleType requires a restriction, list or union"))?;
        let base = if let Some(b) = restriction.attribute(attrs::BASE) {
            Some(resolve_qname(restriction, b))
        } else if let Some(inline) = xsd_child(restriction, tags::SIMPLE_TYPE) {
            self.parse_simple_type(inline, false)?.base
        } else {
            return Err(ParseError::new("simpleType restriction requires a base").into());
        };
        Ok(SimpleType {
            name,
            base,
            variety: SimpleVariety::Atomic,
            enumeration: parse_enumeration(restriction),
            annotation,
        })
    }

    fn qualify(&self, local_name: &str, qualified: bool) -> QName {
        match (&self.target_namespace, qualified) {
            (Some(ns), true) => QName::namespaced(ns.clone(), local_name),
            _ => QName::local(local_name),
        }
    }
}

fn is_xsd(node: Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == local_name
}

fn xsd_child<'a, 'input>(node: Node<'a, 'input>, local_name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_xsd(*n, local_name))
}

/// The `xs:extension` or `xs:restriction` body of a content derivation.
fn derivation_child<'a, 'input>(
    node: Node<'a, 'input>,
) -> Result<(DerivationMethod, Node<'a, 'input>)> {
    if let Some(ext) = xsd_child(node, tags::EXTENSION) {
        return Ok((DerivationMethod::Extension, ext));
    }
    if let Some(res) = xsd_child(node, tags::RESTRICTION) {
        return Ok((DerivationMethod::Restriction, res));
    }
    Err(ParseError::new(format!(
        "'{}' requires an extension or restriction child",
        node.tag_name().name()
    ))
    .into())
}

fn bool_attr(node: Node, name: &str) -> bool {
    matches!(node.attribute(name), Some("true") | Some("1"))
}

fn parse_occurs(node: Node) -> Result<Occurs> {
    Occurs::parse(
        node.attribute(attrs::MIN_OCCURS),
        node.attribute(attrs::MAX_OCCURS),
    )
}

/// Resolve a prefixed QName attribute value against the in-scope namespace
/// declarations of the node carrying it.
fn resolve_qname(node: Node, value: &str) -> QName {
    match value.split_once(':') {
        Some((prefix, local)) => match node.lookup_namespace_uri(Some(prefix)) {
            Some(ns) => QName::namespaced(ns, local),
            None => {
                warn!(prefix, "undeclared namespace prefix in type reference");
                QName::local(local)
            }
        },
        None => match node.lookup_namespace_uri(None) {
            Some(ns) => QName::namespaced(ns, value),
            None => QName::local(value),
        },
    }
}

fn parse_constraint(node: Node) -> Option<ValueConstraint> {
    if let Some(v) = node.attribute(attrs::FIXED) {
        return Some(ValueConstraint {
            kind: ConstraintKind::Fixed,
            value: v.to_string(),
        });
    }
    node.attribute(attrs::DEFAULT).map(|v| ValueConstraint {
        kind: ConstraintKind::Default,
        value: v.to_string(),
    })
}

fn parse_enumeration(node: Node) -> Vec<EnumValue> {
    node.children()
        .filter(|n| is_xsd(*n, tags::ENUMERATION))
        .filter_map(|facet| {
            facet.attribute(attrs::VALUE).map(|v| EnumValue {
                value: v.to_string(),
                annotation: parse_annotation(facet),
            })
        })
        .collect()
}

/// Collect extension-namespace `appinfo` properties from a component's
/// `xs:annotation` child.
fn parse_annotation(node: Node) -> Option<Annotation> {
    let annotation = xsd_child(node, tags::ANNOTATION)?;
    let mut props = Annotation::new();
    for appinfo in annotation.children().filter(|n| is_xsd(*n, tags::APPINFO)) {
        for prop in appinfo.children().filter(|n| n.is_element()) {
            if prop.tag_name().namespace() != Some(EXT_NAMESPACE) {
                continue;
            }
            let value = prop.text().unwrap_or("").trim();
            props.insert(prop.tag_name().name(), value);
        }
    }
    if props.is_empty() {
        None
    } else {
        Some(props)
    }
}
