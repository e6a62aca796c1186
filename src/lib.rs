//! # schema2xforms
//!
//! XML-Schema-driven XForms generation.
//!
//! Given an XML Schema and an optional existing instance document, this
//! library walks the schema's type graph (type substitution, repeating
//! structures, enumerations, mixed content) and emits a complete XForms
//! document - bindings, controls, constraints and repeat triggers - along
//! with a matching default data instance.
//!
//! ## Example
//!
//! ```rust,ignore
//! use schema2xforms::{BuilderConfig, SchemaModel, XFormsBuilder};
//!
//! let schema = SchemaModel::parse(include_str!("order.xsd"))?;
//! let config = BuilderConfig {
//!     action: "/api/submit".into(),
//!     ..BuilderConfig::default()
//! };
//! let xform = XFormsBuilder::new(&schema).with_config(config).build("purchaseOrder", None)?;
//! println!("{}", xform.document.to_string()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;

// Utilities
pub mod dom;
pub mod namespaces;
pub mod resources;

// Schema model and loading
pub mod schema;

// Type-compatibility index
pub mod typetree;

// Form generation
pub mod builder;

// Re-exports for convenience
pub use builder::{
    remove_prototype_nodes, BuilderConfig, SubmitMethod, XForm, XFormsBuilder,
};
pub use error::{Error, Result};
pub use resources::ResourceBundle;
pub use schema::SchemaModel;

/// Version of the schema2xforms library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XForms namespace
pub const XFORMS_NAMESPACE: &str = "http://www.w3.org/2002/xforms";

/// XHTML namespace
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// XML Events namespace
pub const XML_EVENTS_NAMESPACE: &str = "http://www.w3.org/2001/xml-events";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Extension vocabulary namespace for generator metadata
/// (labels, alerts, hints, prototype markers, occurrence mirrors)
pub const EXT_NAMESPACE: &str = "http://schema2xforms.org/ns/1.0";
