//! XForms generation.
//!
//! [`XFormsBuilder`] turns a loaded [`SchemaModel`] into a complete XHTML
//! document carrying an XForms model (binds, instances, submissions) and
//! body (controls, repeats, triggers) for one root element, optionally
//! seeded with an existing instance document.

mod context;
mod controls;
pub mod prototypes;
mod skeleton;
mod triggers;
mod walker;

pub use prototypes::remove_prototype_nodes;

use tracing::info;

use crate::dom::{Document, Element, Node};
use crate::error::{Error, Result};
use crate::namespaces::{EXT_PREFIX, XSI_PREFIX};
use crate::resources::ResourceBundle;
use crate::schema::SchemaModel;
use crate::typetree::TypeTree;
use crate::{EXT_NAMESPACE, VERSION, XSI_NAMESPACE};

use context::BuildContext;
use walker::Walker;

/// Id given to the outermost group wrapping all generated controls.
pub const ROOT_GROUP_ID: &str = "xforms-root-group";

/// Id of the embedded schema document inside the model.
const SCHEMA_ID: &str = "schema-1";

/// Id of the prototype instance added when an existing instance document
/// is imported.
const PROTOTYPE_INSTANCE_ID: &str = "instance_prototype";

/// HTTP method of the generated submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMethod {
    /// `post`
    #[default]
    Post,
    /// `get`
    Get,
    /// `put`
    Put,
    /// `form-data-post`
    FormDataPost,
    /// `urlencoded-post`
    UrlEncodedPost,
}

impl SubmitMethod {
    /// The method string emitted on `xforms:submission`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMethod::Post => "post",
            SubmitMethod::Get => "get",
            SubmitMethod::Put => "put",
            SubmitMethod::FormDataPost => "form-data-post",
            SubmitMethod::UrlEncodedPost => "urlencoded-post",
        }
    }
}

/// Knobs of a generation run.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Submission target, resolved against `base` when one is set.
    pub action: String,
    /// Value for `xml:base` on the generated document.
    pub base: Option<String>,
    /// HTTP method of the generated submissions.
    pub method: SubmitMethod,
    /// Single-choice selectors with at least this many values render
    /// with the long-list appearance and gain a placeholder entry.
    pub select1_long_list_threshold: usize,
    /// Multi-choice selectors with at least this many values render
    /// with the long-list appearance.
    pub select_long_list_threshold: usize,
    /// Appearance of short single-choice selectors.
    pub select1_short_appearance: String,
    /// Appearance of long single-choice selectors.
    pub select1_long_appearance: String,
    /// Appearance of short multi-choice selectors.
    pub select_short_appearance: String,
    /// Appearance of long multi-choice selectors.
    pub select_long_appearance: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            action: String::new(),
            base: None,
            method: SubmitMethod::default(),
            select1_long_list_threshold: 6,
            select_long_list_threshold: 6,
            select1_short_appearance: controls::APPEARANCE_FULL.to_string(),
            select1_long_appearance: controls::APPEARANCE_MINIMAL.to_string(),
            select_short_appearance: controls::APPEARANCE_FULL.to_string(),
            select_long_appearance: controls::APPEARANCE_COMPACT.to_string(),
        }
    }
}

/// A generated form: the XHTML+XForms document and the default instance
/// the model was populated from.
#[derive(Debug, Clone)]
pub struct XForm {
    /// The complete generated document.
    pub document: Document,
    /// The default (prototype-bearing) instance document element.
    pub default_instance: Element,
}

/// Generates XForms documents from a schema.
pub struct XFormsBuilder<'a> {
    schema: &'a SchemaModel,
    config: BuilderConfig,
    bundle: Option<&'a ResourceBundle>,
}

impl<'a> XFormsBuilder<'a> {
    /// Create a builder over a schema with default configuration.
    pub fn new(schema: &'a SchemaModel) -> Self {
        XFormsBuilder {
            schema,
            config: BuilderConfig::default(),
            bundle: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a resource bundle for `${key}` label resolution.
    pub fn with_bundle(mut self, bundle: &'a ResourceBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Generate a form for the named root element, optionally importing an
    /// existing instance document whose root must match.
    pub fn build(&self, root_name: &str, instance: Option<&Element>) -> Result<XForm> {
        let root_decl = self.schema.element(root_name).ok_or_else(|| {
            Error::InvalidRootElement {
                name: root_name.to_string(),
                namespace: self.schema.target_namespace.clone(),
            }
        })?;

        let type_tree = TypeTree::build(self.schema);
        let mut ctx = BuildContext::new();
        if let Some(ns) = &self.schema.target_namespace {
            ctx.declare_preferred(ns, self.schema.target_prefix.as_deref());
        }

        let root_tag = ctx.qualified_name(&root_decl.name);
        let mut default_instance = Element::new(root_tag.clone());

        let mut walker = Walker::new(
            self.schema,
            &type_tree,
            &self.config,
            self.bundle,
            &mut ctx,
        );
        let mut fragment = walker.walk_root(root_decl, &mut default_instance)?;

        let mut top_controls = fragment.take_controls();
        if top_controls.is_empty() {
            return Err(Error::invariant(
                "schema walk produced no form section for the root element",
            ));
        }
        // A plain complex root yields one group; anything else (simple
        // root, polymorphic root) gets wrapped so the body always starts
        // with a single root group.
        let mut root_group =
            if top_controls.len() == 1 && top_controls[0].local_name() == "group" {
                top_controls.remove(0)
            } else {
                let mut group = controls::create_group(&mut ctx, None);
                for control in top_controls {
                    group.append_child(control);
                }
                group
            };
        root_group.set_attr("id", ROOT_GROUP_ID);

        // Assemble the model section.
        let mut model = skeleton::model_element(&mut ctx);
        if let Some(source) = self.schema.source_document() {
            let mut embedded = source.clone();
            embedded.set_attr("id", SCHEMA_ID);
            model.set_attr("xforms:schema", format!("#{SCHEMA_ID}"));
            model.append_child(embedded);
        }

        self.decorate_instance_root(&mut default_instance, &ctx);

        match instance {
            None => {
                let mut holder = skeleton::instance_element(&mut ctx, None);
                holder.append_child(default_instance.clone());
                model.append_child(holder);
            }
            Some(existing) => {
                if existing.name != root_tag {
                    return Err(Error::InstanceRootMismatch {
                        expected: root_tag,
                        actual: existing.name.clone(),
                    });
                }
                let mut imported = existing.clone();
                self.decorate_instance_root(&mut imported, &ctx);
                prototypes::insert_prototype_nodes(&mut imported, &default_instance);

                let mut holder = skeleton::instance_element(&mut ctx, None);
                holder.append_child(imported);
                model.append_child(holder);

                let mut proto_holder =
                    skeleton::instance_element(&mut ctx, Some(PROTOTYPE_INSTANCE_ID));
                proto_holder.append_child(default_instance.clone());
                model.append_child(proto_holder);
            }
        }

        for bind in fragment.binds {
            model.append_child(bind);
        }

        let (submissions, submits) = triggers::create_submissions(&self.config, &mut ctx);
        for submission in submissions {
            model.append_child(submission);
        }
        for submit in submits {
            root_group.append_child(submit);
        }

        triggers::create_repeat_triggers(&model, &mut root_group, &mut ctx);

        let mut html = skeleton::html_skeleton(&self.config, &ctx, model, root_group);
        html.prepend(Node::Comment(generation_comment(
            root_name,
            self.schema.target_namespace.as_deref(),
        )));

        info!(root = root_name, "generated form");
        Ok(XForm {
            document: Document::new(html),
            default_instance,
        })
    }

    /// Namespace declarations every instance document root carries.
    fn decorate_instance_root(&self, root: &mut Element, ctx: &BuildContext) {
        root.set_attr(format!("xmlns:{XSI_PREFIX}"), XSI_NAMESPACE);
        root.set_attr(format!("xmlns:{EXT_PREFIX}"), EXT_NAMESPACE);
        for (prefix, uri) in ctx.pending_declarations() {
            root.set_attr(format!("xmlns:{prefix}"), uri);
        }
    }
}

fn generation_comment(root_name: &str, namespace: Option<&str>) -> String {
    format!(
        " This XForm was generated by schema2xforms {} on {} from the '{}' element of the '{}' XML Schema. ",
        VERSION,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        root_name,
        namespace.unwrap_or("(no namespace)"),
    )
}
