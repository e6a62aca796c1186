//! In-memory XML Schema model
//!
//! A read-only representation of the subset of XML Schema the form
//! generator consumes: named simple/complex types, global element
//! declarations, particles with occurrence bounds, attribute uses and
//! extension-namespace annotations. Built once per schema load by the
//! parser in [`parsing`]; immutable afterwards.

pub mod components;
pub mod model;
pub mod parsing;
pub mod particles;
pub mod types;

pub use components::{
    Annotation, AttributeDecl, AttributeUse, ConstraintKind, ElementDecl, SchemaNode, TypeRef,
    ValueConstraint,
};
pub use model::SchemaModel;
pub use particles::Occurs;
pub use types::{
    ComplexType, Compositor, ContentType, DerivationMethod, EnumValue, ModelGroup, Particle,
    SimpleType, SimpleVariety, Term, TypeDef,
};
