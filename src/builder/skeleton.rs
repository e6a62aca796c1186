//! XHTML scaffolding around the generated model and body.

use crate::dom::Element;
use crate::namespaces::{EXT_PREFIX, XFORMS_PREFIX, XHTML_PREFIX, XML_EVENTS_PREFIX, XSI_PREFIX};
use crate::{EXT_NAMESPACE, XFORMS_NAMESPACE, XHTML_NAMESPACE, XML_EVENTS_NAMESPACE, XSI_NAMESPACE};

use super::context::BuildContext;
use super::BuilderConfig;

/// A fresh `xforms:model` element with a generated id.
pub(crate) fn model_element(ctx: &mut BuildContext) -> Element {
    let mut model = Element::new(format!("{XFORMS_PREFIX}:model"));
    ctx.set_id(&mut model);
    model
}

/// A fresh `xforms:instance` holder, with either a generated or a fixed id.
pub(crate) fn instance_element(ctx: &mut BuildContext, id: Option<&str>) -> Element {
    let mut instance = Element::new(format!("{XFORMS_PREFIX}:instance"));
    match id {
        Some(id) => instance.set_attr("id", id),
        None => {
            ctx.set_id(&mut instance);
        }
    }
    instance
}

/// Wrap the finished model and root group into an `xhtml:html` document
/// element carrying all namespace declarations.
pub(crate) fn html_skeleton(
    config: &BuilderConfig,
    ctx: &BuildContext,
    model: Element,
    root_group: Element,
) -> Element {
    let mut html = Element::new(format!("{XHTML_PREFIX}:html"));
    html.set_attr(format!("xmlns:{XHTML_PREFIX}"), XHTML_NAMESPACE);
    html.set_attr(format!("xmlns:{XFORMS_PREFIX}"), XFORMS_NAMESPACE);
    html.set_attr(format!("xmlns:{XML_EVENTS_PREFIX}"), XML_EVENTS_NAMESPACE);
    html.set_attr(format!("xmlns:{XSI_PREFIX}"), XSI_NAMESPACE);
    html.set_attr(format!("xmlns:{EXT_PREFIX}"), EXT_NAMESPACE);
    for (prefix, uri) in ctx.pending_declarations() {
        html.set_attr(format!("xmlns:{prefix}"), uri);
    }
    if let Some(base) = &config.base {
        html.set_attr("xml:base", base);
    }

    let mut head = Element::new(format!("{XHTML_PREFIX}:head"));
    head.append_child(model);
    html.append_child(head);

    let mut body = Element::new(format!("{XHTML_PREFIX}:body"));
    body.append_child(root_group);
    html.append_child(body);

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_shape() {
        let mut ctx = BuildContext::new();
        let model = model_element(&mut ctx);
        assert_eq!(model.attr("id"), Some("model_0"));

        let group = Element::new("xforms:group");
        let html = html_skeleton(&BuilderConfig::default(), &ctx, model, group);
        assert_eq!(html.name, "xhtml:html");
        assert_eq!(html.attr("xmlns:xforms"), Some(XFORMS_NAMESPACE));

        let children: Vec<&str> = html.child_elements().map(|e| e.local_name()).collect();
        assert_eq!(children, vec!["head", "body"]);
        let head = html.child_elements().next().unwrap();
        assert_eq!(head.child_elements().next().unwrap().local_name(), "model");
    }

    #[test]
    fn xml_base_applied() {
        let ctx = BuildContext::new();
        let config = BuilderConfig {
            base: Some("http://example.com/forms/".into()),
            ..Default::default()
        };
        let html = html_skeleton(
            &config,
            &ctx,
            Element::new("xforms:model"),
            Element::new("xforms:group"),
        );
        assert_eq!(html.attr("xml:base"), Some("http://example.com/forms/"));
    }

    #[test]
    fn fixed_instance_id() {
        let mut ctx = BuildContext::new();
        let holder = instance_element(&mut ctx, Some("instance_prototype"));
        assert_eq!(holder.attr("id"), Some("instance_prototype"));
        let generated = instance_element(&mut ctx, None);
        assert_eq!(generated.attr("id"), Some("instance_0"));
    }
}
