//! Form-control construction: captions, labels, hints, alerts and the
//! control factory picking a widget for a value-holding component.

use tracing::debug;

use crate::dom::Element;
use crate::namespaces::XFORMS_PREFIX;
use crate::resources::{resolve_placeholder, ResourceBundle};
use crate::schema::{EnumValue, Occurs, SchemaModel, SchemaNode, SimpleType, SimpleVariety};

use super::context::BuildContext;
use super::BuilderConfig;

pub(crate) const APPEARANCE_FULL: &str = "full";
pub(crate) const APPEARANCE_COMPACT: &str = "compact";
pub(crate) const APPEARANCE_MINIMAL: &str = "minimal";
pub(crate) const APPEARANCE_REPEATED: &str = "repeated";

/// The value a control edits: a simple type, or unconstrained content for
/// `xs:anyType` elements.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ValueKind<'t> {
    Simple(&'t SimpleType),
    Any,
}

/// A constructed control plus a constraint the enclosing bind must adopt
/// (used by long-list placeholders).
pub(crate) struct ControlArtifacts {
    pub control: Element,
    pub bind_constraint: Option<String>,
}

/// Human-readable caption derived from a component name.
///
/// All-uppercase names are lowercased first; `-`, `_` and lower-to-upper
/// boundaries split words, and each word is capitalized.
pub(crate) fn caption_from_name(name: &str) -> String {
    let lowered;
    let name = if name.chars().any(|c| c.is_ascii_lowercase()) {
        name
    } else {
        lowered = name.to_ascii_lowercase();
        &lowered
    };

    let mut caption = String::with_capacity(name.len() + 4);
    let mut capitalize = true;
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            caption.push(' ');
            capitalize = true;
            prev_lower = false;
            continue;
        }
        if capitalize {
            caption.extend(c.to_uppercase());
            capitalize = false;
        } else {
            if prev_lower && c.is_uppercase() {
                caption.push(' ');
            }
            caption.push(c);
        }
        prev_lower = c.is_lowercase();
    }
    caption
}

/// Caption for a schema component: its `label` annotation when present
/// (with `${key}` bundle resolution), otherwise derived from its name.
pub(crate) fn caption_for(node: &SchemaNode, bundle: Option<&ResourceBundle>) -> String {
    match node.annotation().and_then(|a| a.property("label")) {
        Some(label) => resolve_placeholder(label, bundle),
        None => caption_from_name(&node.name().local_name),
    }
}

/// An `xforms:label` carrying the given text.
pub(crate) fn create_label(ctx: &mut BuildContext, text: &str) -> Element {
    let mut label = Element::new(format!("{XFORMS_PREFIX}:label"));
    ctx.set_id(&mut label);
    label.append_text(text);
    label
}

/// An `xforms:group`, labeled when a caption is given.
pub(crate) fn create_group(ctx: &mut BuildContext, caption: Option<&str>) -> Element {
    let mut group = Element::new(format!("{XFORMS_PREFIX}:group"));
    ctx.set_id(&mut group);
    group.set_attr("xforms:appearance", APPEARANCE_FULL);
    if let Some(caption) = caption {
        let label = create_label(ctx, caption);
        group.append_child(label);
    }
    group
}

/// An `xforms:repeat` over the nodeset of the given bind.
pub(crate) fn create_repeat(ctx: &mut BuildContext, bind_id: &str) -> Element {
    let mut repeat = Element::new(format!("{XFORMS_PREFIX}:repeat"));
    ctx.set_id(&mut repeat);
    repeat.set_attr("xforms:bind", bind_id);
    repeat.set_attr("xforms:appearance", APPEARANCE_FULL);
    repeat
}

/// An `xforms:trigger` with a label and a DOMActivate action holding the
/// given children.
pub(crate) fn create_trigger(
    ctx: &mut BuildContext,
    id: Option<&str>,
    bind_id: Option<&str>,
    label: &str,
    action_children: Vec<Element>,
) -> Element {
    let mut trigger = Element::new(format!("{XFORMS_PREFIX}:trigger"));
    match id {
        Some(id) => trigger.set_attr("id", id),
        None => {
            ctx.set_id(&mut trigger);
        }
    }
    if let Some(bind_id) = bind_id {
        trigger.set_attr("xforms:bind", bind_id);
    }
    let label = create_label(ctx, label);
    trigger.append_child(label);

    let mut action = Element::new(format!("{XFORMS_PREFIX}:action"));
    ctx.set_id(&mut action);
    action.set_attr("ev:event", "DOMActivate");
    for child in action_children {
        action.append_child(child);
    }
    trigger.append_child(action);
    trigger
}

/// An `xforms:hint` from the component's `hint` annotation, if any.
pub(crate) fn create_hint(
    ctx: &mut BuildContext,
    node: &SchemaNode,
    bundle: Option<&ResourceBundle>,
) -> Option<Element> {
    let text = node.annotation().and_then(|a| a.property("hint"))?;
    let mut hint = Element::new(format!("{XFORMS_PREFIX}:hint"));
    ctx.set_id(&mut hint);
    hint.append_text(resolve_placeholder(text, bundle));
    Some(hint)
}

/// Pick and build the widget for a value-holding component, already bound
/// and labeled, with its alert attached.
pub(crate) fn create_form_control(
    ctx: &mut BuildContext,
    schema: &SchemaModel,
    config: &BuilderConfig,
    bundle: Option<&ResourceBundle>,
    kind: ValueKind,
    node: &SchemaNode,
    bind_id: &str,
    occurs: Occurs,
) -> ControlArtifacts {
    let caption = caption_for(node, bundle);
    let mut bind_constraint = None;

    let mut control = match kind {
        ValueKind::Any => {
            let mut textarea = Element::new(format!("{XFORMS_PREFIX}:textarea"));
            ctx.set_id(&mut textarea);
            let label = create_label(ctx, &caption);
            textarea.append_child(label);
            textarea
        }
        ValueKind::Simple(simple) => {
            if let Some(items) = list_enumeration(schema, simple) {
                create_select(ctx, config, bundle, &caption, &items)
            } else if simple.has_enumeration() {
                let (select1, constraint) = create_enumerated_select1(
                    ctx,
                    config,
                    bundle,
                    &caption,
                    &simple.enumeration,
                );
                bind_constraint = constraint;
                select1
            } else {
                match schema.builtin_name(simple).as_str() {
                    "boolean" => create_boolean_select1(ctx, config, &caption),
                    "anyURI" => create_upload(ctx, &caption),
                    _ => {
                        let mut input = Element::new(format!("{XFORMS_PREFIX}:input"));
                        ctx.set_id(&mut input);
                        let label = create_label(ctx, &caption);
                        input.append_child(label);
                        input
                    }
                }
            }
        }
    };

    control.set_attr("xforms:bind", bind_id);

    let alert = create_alert(ctx, bundle, kind, node, schema, &caption, occurs);
    control.append_child(alert);

    ControlArtifacts {
        control,
        bind_constraint,
    }
}

/// Enumeration of a list type's item type, when it has one.
fn list_enumeration(schema: &SchemaModel, simple: &SimpleType) -> Option<Vec<EnumValue>> {
    let SimpleVariety::List(item) = &simple.variety else {
        return None;
    };
    let Some(item_type) = schema.resolve_simple(item) else {
        debug!("unresolvable list item type, falling back to text input");
        return None;
    };
    if item_type.has_enumeration() {
        Some(item_type.enumeration)
    } else {
        None
    }
}

/// Single-valued selector for an enumerated type. Long lists get the
/// minimal appearance, a leading placeholder entry and a constraint
/// keeping the placeholder from being submitted.
fn create_enumerated_select1(
    ctx: &mut BuildContext,
    config: &BuilderConfig,
    bundle: Option<&ResourceBundle>,
    caption: &str,
    values: &[EnumValue],
) -> (Element, Option<String>) {
    let mut select1 = Element::new(format!("{XFORMS_PREFIX}:select1"));
    ctx.set_id(&mut select1);
    let long = values.len() >= config.select1_long_list_threshold;
    select1.set_attr(
        "xforms:appearance",
        if long {
            config.select1_long_appearance.as_str()
        } else {
            config.select1_short_appearance.as_str()
        },
    );
    let label = create_label(ctx, caption);
    select1.append_child(label);

    let mut constraint = None;
    if long {
        let placeholder = format!("[Select1 {caption}]");
        append_item(ctx, &mut select1, &placeholder, &placeholder);
        constraint = Some(format!("not( . = '{placeholder}')"));
    }
    for value in values {
        let label = value
            .annotation
            .as_ref()
            .and_then(|a| a.property("label"))
            .map(|l| resolve_placeholder(l, bundle))
            .unwrap_or_else(|| value.value.clone());
        append_item(ctx, &mut select1, &label, &value.value);
    }
    (select1, constraint)
}

/// Multi-valued selector for a list type with an enumerated item type.
fn create_select(
    ctx: &mut BuildContext,
    config: &BuilderConfig,
    bundle: Option<&ResourceBundle>,
    caption: &str,
    values: &[EnumValue],
) -> Element {
    let mut select = Element::new(format!("{XFORMS_PREFIX}:select"));
    ctx.set_id(&mut select);
    let long = values.len() >= config.select_long_list_threshold;
    select.set_attr(
        "xforms:appearance",
        if long {
            config.select_long_appearance.as_str()
        } else {
            config.select_short_appearance.as_str()
        },
    );
    let label = create_label(ctx, caption);
    select.append_child(label);
    for value in values {
        let label = value
            .annotation
            .as_ref()
            .and_then(|a| a.property("label"))
            .map(|l| resolve_placeholder(l, bundle))
            .unwrap_or_else(|| value.value.clone());
        append_item(ctx, &mut select, &label, &value.value);
    }
    select
}

fn create_boolean_select1(ctx: &mut BuildContext, config: &BuilderConfig, caption: &str) -> Element {
    let mut select1 = Element::new(format!("{XFORMS_PREFIX}:select1"));
    ctx.set_id(&mut select1);
    select1.set_attr("xforms:appearance", config.select1_short_appearance.as_str());
    let label = create_label(ctx, caption);
    select1.append_child(label);
    for value in ["true", "false"] {
        append_item(ctx, &mut select1, value, value);
    }
    select1
}

fn create_upload(ctx: &mut BuildContext, caption: &str) -> Element {
    let mut upload = Element::new(format!("{XFORMS_PREFIX}:upload"));
    ctx.set_id(&mut upload);
    let label = create_label(ctx, caption);
    upload.append_child(label);
    let mut filename = Element::new(format!("{XFORMS_PREFIX}:filename"));
    ctx.set_id(&mut filename);
    filename.set_attr("xforms:ref", ".");
    upload.append_child(filename);
    upload
}

/// Append an `xforms:item` with label and value children.
pub(crate) fn append_item(ctx: &mut BuildContext, parent: &mut Element, label: &str, value: &str) {
    let mut item = Element::new(format!("{XFORMS_PREFIX}:item"));
    ctx.set_id(&mut item);
    let label_el = create_label(ctx, label);
    item.append_child(label_el);
    let mut value_el = Element::new(format!("{XFORMS_PREFIX}:value"));
    ctx.set_id(&mut value_el);
    value_el.append_text(value);
    item.append_child(value_el);
    parent.append_child(item);
}

/// The component's `alert` annotation, or a templated message naming the
/// caption, optionality and expected type.
fn create_alert(
    ctx: &mut BuildContext,
    bundle: Option<&ResourceBundle>,
    kind: ValueKind,
    node: &SchemaNode,
    schema: &SchemaModel,
    caption: &str,
    occurs: Occurs,
) -> Element {
    let mut alert = Element::new(format!("{XFORMS_PREFIX}:alert"));
    ctx.set_id(&mut alert);
    let text = match node.annotation().and_then(|a| a.property("alert")) {
        Some(custom) => resolve_placeholder(custom, bundle),
        None => {
            let type_label = match kind {
                ValueKind::Any => "anyType".to_string(),
                ValueKind::Simple(simple) => simple
                    .name
                    .as_ref()
                    .map(|q| q.local_name.clone())
                    .unwrap_or_else(|| schema.builtin_name(simple)),
            };
            let necessity = if occurs.min != 0 {
                "a required"
            } else {
                "an optional"
            };
            format!(
                "Please provide a valid value for '{caption}'. '{caption}' is {necessity} '{type_label}' value."
            )
        }
    };
    alert.append_text(text);
    alert
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;
    use crate::schema::{Annotation, ElementDecl, TypeRef};
    use crate::XSD_NAMESPACE;

    fn decl_with_label(label: &str) -> ElementDecl {
        let mut annotation = Annotation::new();
        annotation.insert("label", label);
        ElementDecl {
            name: QName::local("comment"),
            type_ref: TypeRef::Named(QName::namespaced(XSD_NAMESPACE, "string")),
            nillable: false,
            constraint: None,
            annotation: Some(annotation),
        }
    }

    #[test]
    fn caption_splits_camel_case() {
        assert_eq!(caption_from_name("customerStreetAddress"), "Customer Street Address");
    }

    #[test]
    fn caption_lowercases_acronyms() {
        assert_eq!(caption_from_name("URL"), "Url");
    }

    #[test]
    fn caption_splits_dashes_and_underscores() {
        assert_eq!(caption_from_name("first-name"), "First Name");
        assert_eq!(caption_from_name("last_name"), "Last Name");
    }

    #[test]
    fn caption_plain_word() {
        assert_eq!(caption_from_name("street"), "Street");
    }

    proptest::proptest! {
        #[test]
        fn caption_capitalizes_every_separated_word(
            words in proptest::collection::vec("[a-z]{1,8}", 1..5),
            separator in proptest::sample::select(vec!["-", "_"]),
        ) {
            let name = words.join(separator);
            let expected = words
                .iter()
                .map(|w| {
                    let mut chars = w.chars();
                    let first = chars.next().unwrap().to_ascii_uppercase();
                    format!("{first}{}", chars.as_str())
                })
                .collect::<Vec<_>>()
                .join(" ");
            proptest::prop_assert_eq!(caption_from_name(&name), expected);
        }
    }

    #[test]
    fn label_annotation_overrides_name() {
        let decl = decl_with_label("Order Comment");
        let node = SchemaNode::Element(&decl);
        assert_eq!(caption_for(&node, None), "Order Comment");
    }

    fn enum_values(values: &[&str]) -> Vec<EnumValue> {
        values
            .iter()
            .map(|v| EnumValue {
                value: v.to_string(),
                annotation: None,
            })
            .collect()
    }

    #[test]
    fn select1_threshold_and_appearances_come_from_config() {
        let config = BuilderConfig {
            select1_long_list_threshold: 3,
            select1_short_appearance: "menu".to_string(),
            select1_long_appearance: "dial".to_string(),
            ..Default::default()
        };
        let values = enum_values(&["red", "green", "blue"]);

        let mut ctx = BuildContext::new();
        let (select1, constraint) =
            create_enumerated_select1(&mut ctx, &config, None, "Color", &values);
        assert_eq!(select1.attr("xforms:appearance"), Some("dial"));
        assert!(constraint.is_some());
        // Placeholder entry precedes the three real values.
        assert_eq!(
            select1
                .child_elements()
                .filter(|c| c.local_name() == "item")
                .count(),
            4
        );

        let mut ctx = BuildContext::new();
        let (select1, constraint) =
            create_enumerated_select1(&mut ctx, &config, None, "Color", &values[..2]);
        assert_eq!(select1.attr("xforms:appearance"), Some("menu"));
        assert!(constraint.is_none());
    }

    #[test]
    fn select_threshold_and_appearances_come_from_config() {
        let config = BuilderConfig {
            select_long_list_threshold: 2,
            select_short_appearance: "checkboxes".to_string(),
            select_long_appearance: "listbox".to_string(),
            ..Default::default()
        };
        let values = enum_values(&["S", "M", "L"]);

        let mut ctx = BuildContext::new();
        let select = create_select(&mut ctx, &config, None, "Sizes", &values);
        assert_eq!(select.attr("xforms:appearance"), Some("listbox"));

        let mut ctx = BuildContext::new();
        let select = create_select(&mut ctx, &config, None, "Sizes", &values[..1]);
        assert_eq!(select.attr("xforms:appearance"), Some("checkboxes"));
    }

    #[test]
    fn bundle_placeholder_in_label() {
        let decl = decl_with_label("${po.comment}");
        let node = SchemaNode::Element(&decl);
        let bundle: ResourceBundle = [("po.comment".to_string(), "Remarks".to_string())]
            .into_iter()
            .collect();
        assert_eq!(caption_for(&node, Some(&bundle)), "Remarks");
        assert_eq!(caption_for(&node, None), "$$po.comment$$");
    }
}
