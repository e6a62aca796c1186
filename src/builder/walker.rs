//! The schema walk.
//!
//! Recursively descends from the root element declaration, emitting for
//! every reachable component a bind (model side), a control (body side)
//! and its slice of the default instance. Owned subtrees are returned
//! upward and assembled by the caller, so the walk never needs parent
//! pointers into a half-built document.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::dom::Element;
use crate::error::{Error, Result};
use crate::namespaces::{EXT_PREFIX, XFORMS_PREFIX, XSI_PREFIX};
use crate::resources::ResourceBundle;
use crate::schema::{
    ComplexType, ElementDecl, ModelGroup, Occurs, SchemaModel, SchemaNode, SimpleType, Term,
    TypeDef, TypeRef,
};
use crate::typetree::TypeTree;
use crate::XSD_NAMESPACE;

use super::context::BuildContext;
use super::controls::{self, ValueKind, APPEARANCE_REPEATED};
use super::triggers::strip_predicates;
use super::BuilderConfig;

/// Binds and controls produced for one subtree of the schema.
pub(crate) struct Fragment {
    pub binds: Vec<Element>,
    pub controls: Vec<Element>,
}

impl Fragment {
    fn empty() -> Self {
        Fragment {
            binds: Vec::new(),
            controls: Vec::new(),
        }
    }

    /// All produced top-level controls, in document order.
    pub(crate) fn take_controls(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.controls)
    }
}

/// Where the extension re-copy path looks for already-generated binds and
/// controls of inherited components (the element bind and switch built so
/// far).
struct SearchScope<'s> {
    binds: &'s Element,
    controls: &'s Element,
}

pub(crate) struct Walker<'a> {
    schema: &'a SchemaModel,
    types: &'a TypeTree,
    config: &'a BuilderConfig,
    bundle: Option<&'a ResourceBundle>,
    ctx: &'a mut BuildContext,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        schema: &'a SchemaModel,
        types: &'a TypeTree,
        config: &'a BuilderConfig,
        bundle: Option<&'a ResourceBundle>,
        ctx: &'a mut BuildContext,
    ) -> Self {
        Walker {
            schema,
            types,
            config,
            bundle,
            ctx,
        }
    }

    /// Walk the root element declaration, populating the default instance
    /// root as a side effect.
    pub(crate) fn walk_root(
        &mut self,
        decl: &ElementDecl,
        instance: &mut Element,
    ) -> Result<Fragment> {
        if self.schema.resolve(&decl.type_ref).is_none() {
            return Err(Error::UnsupportedType {
                type_name: match &decl.type_ref {
                    TypeRef::Named(name) => name.to_string(),
                    TypeRef::Inline(_) => "anonymous".to_string(),
                },
                element: decl.name.to_string(),
            });
        }
        let path = format!("/{}", instance.name);
        self.add_element(decl, Occurs::once(), &path, Some(instance))
    }

    /// Emit binds and controls for one element occurrence at the given
    /// (relative or absolute) location path.
    fn add_element(
        &mut self,
        decl: &ElementDecl,
        occurs: Occurs,
        path: &str,
        mut instance: Option<&mut Element>,
    ) -> Result<Fragment> {
        let Some(type_def) = self.schema.resolve(&decl.type_ref) else {
            warn!(element = %decl.name, "element type cannot be resolved, skipping");
            return Ok(Fragment::empty());
        };
        if type_def.is_any_type() {
            return self.add_simple_value(ValueKind::Any, SchemaNode::Element(decl), occurs, path);
        }
        match type_def.as_ref() {
            TypeDef::Simple(simple) => self.add_simple_value(
                ValueKind::Simple(simple),
                SchemaNode::Element(decl),
                occurs,
                path,
            ),
            TypeDef::Complex(complex) => {
                let compatible = match &complex.name {
                    Some(name) => self.types.compatible(name),
                    None => &[],
                };
                if compatible.is_empty() {
                    if complex.abstract_type {
                        warn!(
                            element = %decl.name,
                            "abstract type without concrete extensions, skipping"
                        );
                        return Ok(Fragment::empty());
                    }
                    self.add_complex_element(complex, decl, occurs, path, instance)
                } else if complex.abstract_type && compatible.len() == 1 {
                    // A single concrete descendant substitutes silently.
                    match compatible[0].as_complex() {
                        Some(sub) => {
                            if let Some(inst) = instance.as_deref_mut() {
                                let value = self.type_value_name(sub);
                                inst.set_attr(format!("{XSI_PREFIX}:type"), value);
                            }
                            self.add_complex_element(sub, decl, occurs, path, instance)
                        }
                        None => Ok(Fragment::empty()),
                    }
                } else {
                    self.add_switched_element(complex, compatible, decl, occurs, path, instance)
                }
            }
        }
    }

    /// Plain complex element: one bind with nested child binds, one
    /// labeled group (wrapping a repeat when the element recurs).
    fn add_complex_element(
        &mut self,
        complex: &ComplexType,
        decl: &ElementDecl,
        occurs: Occurs,
        path: &str,
        instance: Option<&mut Element>,
    ) -> Result<Fragment> {
        let node = SchemaNode::Element(decl);
        let (mut bind, bind_id) = self.start_bind(path, occurs, None, Some(&node));
        let (child_binds, group) =
            self.complex_element_body(complex, decl, occurs, &bind_id, false, None, instance)?;
        for child in child_binds {
            bind.append_child(child);
        }
        Ok(Fragment {
            binds: vec![bind],
            controls: vec![group],
        })
    }

    /// The body of a complex element: the labeled group with its children,
    /// and the child binds to nest under the element's bind.
    fn complex_element_body(
        &mut self,
        complex: &ComplexType,
        decl: &ElementDecl,
        occurs: Occurs,
        bind_id: &str,
        check_if_extension: bool,
        search: Option<&SearchScope>,
        instance: Option<&mut Element>,
    ) -> Result<(Vec<Element>, Element)> {
        let node = SchemaNode::Element(decl);
        let caption = controls::caption_for(&node, self.bundle);
        let mut group = controls::create_group(self.ctx, Some(&caption));

        let (binds, children) = self.add_complex_type_children(
            complex,
            decl,
            bind_id,
            check_if_extension,
            search,
            instance,
        )?;

        if occurs.is_repeated() {
            group.set_attr("xforms:appearance", APPEARANCE_REPEATED);
            let mut repeat = controls::create_repeat(self.ctx, bind_id);
            let mut inner = controls::create_group(self.ctx, None);
            inner.set_attr("xforms:appearance", APPEARANCE_REPEATED);
            for child in children {
                inner.append_child(child);
            }
            repeat.append_child(inner);
            group.append_child(repeat);
        } else {
            for child in children {
                group.append_child(child);
            }
        }
        Ok((binds, group))
    }

    /// Simple content, attributes and content particles of a complex type,
    /// inherited parts included.
    fn add_complex_type_children(
        &mut self,
        complex: &ComplexType,
        decl: &ElementDecl,
        enclosing_bind_id: &str,
        check_if_extension: bool,
        search: Option<&SearchScope>,
        mut instance: Option<&mut Element>,
    ) -> Result<(Vec<Element>, Vec<Element>)> {
        let effective = self.schema.effective_content(complex);
        let mut binds = Vec::new();
        let mut children = Vec::new();

        if let Some(simple) = &effective.simple {
            let fragment = self.add_simple_value(
                ValueKind::Simple(simple),
                SchemaNode::Element(decl),
                Occurs::once(),
                "",
            )?;
            binds.extend(fragment.binds);
            children.extend(fragment.controls);
        } else if complex.mixed {
            warn!(
                element = %decl.name,
                "mixed content without a simple base type is not editable"
            );
        }

        for attr_use in &effective.attributes {
            let local = attr_use.decl.name.local_name.clone();
            if check_if_extension
                && self.schema.attribute_comes_from_extension(complex, &local)
            {
                if let Some(scope) = search {
                    if self.copy_extension_control(scope, &format!("@{local}"), &mut children) {
                        continue;
                    }
                }
            }
            if let Some(inst) = instance.as_deref_mut() {
                let value = attr_use
                    .constraint
                    .as_ref()
                    .map(|c| c.value.clone())
                    .unwrap_or_default();
                inst.set_attr(local.clone(), value);
            }
            let Some(simple) = self.schema.resolve_simple(&attr_use.decl.type_ref) else {
                warn!(attribute = %attr_use.decl.name, "attribute type cannot be resolved, skipping");
                continue;
            };
            let fragment = self.add_simple_value(
                ValueKind::Simple(&simple),
                SchemaNode::Attribute(attr_use),
                Occurs::attribute(attr_use.required),
                &format!("@{local}"),
            )?;
            binds.extend(fragment.binds);
            children.extend(fragment.controls);
        }

        for particle in &effective.particles {
            if let Term::Group(group) = &particle.term {
                let (group_binds, group_children) = self.add_group(
                    group,
                    particle.occurs,
                    complex,
                    enclosing_bind_id,
                    check_if_extension,
                    search,
                    instance.as_deref_mut(),
                )?;
                binds.extend(group_binds);
                children.extend(group_children);
            }
        }
        Ok((binds, children))
    }

    /// Walk a model group's particles. Choice and all compositors render
    /// the same as sequences. A repeated group wraps its controls in a
    /// repeat over the enclosing element's bind.
    #[allow(clippy::too_many_arguments)]
    fn add_group(
        &mut self,
        group: &ModelGroup,
        occurs: Occurs,
        owner: &ComplexType,
        enclosing_bind_id: &str,
        check_if_extension: bool,
        search: Option<&SearchScope>,
        mut instance: Option<&mut Element>,
    ) -> Result<(Vec<Element>, Vec<Element>)> {
        let mut binds = Vec::new();
        let mut children = Vec::new();

        for particle in &group.particles {
            match &particle.term {
                Term::Group(nested) => {
                    let (nested_binds, nested_children) = self.add_group(
                        nested,
                        particle.occurs,
                        owner,
                        enclosing_bind_id,
                        check_if_extension,
                        search,
                        instance.as_deref_mut(),
                    )?;
                    binds.extend(nested_binds);
                    children.extend(nested_children);
                }
                Term::Wildcard => debug!("skipping wildcard particle"),
                Term::Element(decl) => self.add_group_element(
                    decl,
                    particle.occurs,
                    owner,
                    check_if_extension,
                    search,
                    instance.as_deref_mut(),
                    &mut binds,
                    &mut children,
                )?,
                Term::ElementRef(name) => match self.schema.global_element(name) {
                    Some(decl) => self.add_group_element(
                        decl,
                        particle.occurs,
                        owner,
                        check_if_extension,
                        search,
                        instance.as_deref_mut(),
                        &mut binds,
                        &mut children,
                    )?,
                    None => {
                        warn!(element = %name, "unresolvable element reference, skipping");
                    }
                },
            }
        }

        if occurs.is_repeated() {
            let mut repeat = controls::create_repeat(self.ctx, enclosing_bind_id);
            let mut inner = controls::create_group(self.ctx, None);
            inner.set_attr("xforms:appearance", APPEARANCE_REPEATED);
            for child in children {
                inner.append_child(child);
            }
            repeat.append_child(inner);
            children = vec![repeat];
        }
        Ok((binds, children))
    }

    /// One element particle inside a group: either re-copied from an
    /// earlier case (inherited through extension) or freshly generated,
    /// with its default-instance entries.
    #[allow(clippy::too_many_arguments)]
    fn add_group_element(
        &mut self,
        decl: &ElementDecl,
        occurs: Occurs,
        owner: &ComplexType,
        check_if_extension: bool,
        search: Option<&SearchScope>,
        instance: Option<&mut Element>,
        binds: &mut Vec<Element>,
        children: &mut Vec<Element>,
    ) -> Result<()> {
        let local = decl.name.local_name.clone();
        if check_if_extension && self.schema.element_comes_from_extension(owner, &local) {
            if let Some(scope) = search {
                if self.copy_extension_control(scope, &local, children) {
                    return Ok(());
                }
            }
        }

        let tag = self.ctx.qualified_name(&decl.name);
        let mut entry = Element::new(tag.clone());
        if let Some(constraint) = &decl.constraint {
            entry.append_text(constraint.value.clone());
        }

        let fragment = self.add_element(decl, occurs, &tag, Some(&mut entry))?;
        binds.extend(fragment.binds);
        children.extend(fragment.controls);

        if let Some(inst) = instance {
            if occurs.is_repeated() {
                let count = occurs.min.max(1);
                for i in 0..count {
                    let mut copy = entry.clone();
                    if i + 1 == count {
                        copy.set_attr(format!("{EXT_PREFIX}:prototype"), "true");
                    }
                    inst.append_child(copy);
                }
            } else {
                if occurs.min == 0 {
                    entry.set_attr(format!("{XSI_PREFIX}:nil"), "true");
                }
                inst.append_child(entry);
            }
        }
        Ok(())
    }

    /// Value-holding component (element of simple or any type, or an
    /// attribute): bind plus widget, wrapped in a repeat structure when
    /// the element recurs.
    fn add_simple_value(
        &mut self,
        kind: ValueKind,
        node: SchemaNode,
        occurs: Occurs,
        path: &str,
    ) -> Result<Fragment> {
        let (mut bind, bind_id) = self.start_bind(path, occurs, Some(&kind), Some(&node));
        let repeated = !node.is_attribute() && occurs.is_repeated();

        let mut inner_bind = None;
        let control_bind_id = if repeated {
            // The control inside the repeat binds to the context node.
            let mut nested = Element::new(format!("{XFORMS_PREFIX}:bind"));
            let nested_id = self.ctx.set_id(&mut nested);
            nested.set_attr("xforms:nodeset", ".");
            inner_bind = Some(nested);
            nested_id
        } else {
            bind_id.clone()
        };

        let artifacts = controls::create_form_control(
            self.ctx,
            self.schema,
            self.config,
            self.bundle,
            kind,
            &node,
            &control_bind_id,
            occurs,
        );
        if let Some(constraint) = &artifacts.bind_constraint {
            append_bind_constraint(&mut bind, constraint);
        }
        let mut control = artifacts.control;
        if let Some(hint) = controls::create_hint(self.ctx, &node, self.bundle) {
            control.append_child(hint);
        }

        let root_control = if repeated {
            let caption = controls::caption_for(&node, self.bundle);
            let mut group = controls::create_group(self.ctx, Some(&caption));
            group.set_attr("xforms:appearance", APPEARANCE_REPEATED);
            let mut repeat = controls::create_repeat(self.ctx, &bind_id);
            let mut inner = controls::create_group(self.ctx, None);
            inner.set_attr("xforms:appearance", APPEARANCE_REPEATED);
            inner.append_child(control);
            repeat.append_child(inner);
            group.append_child(repeat);
            if let Some(nested) = inner_bind {
                bind.append_child(nested);
            }
            group
        } else {
            control
        };

        Ok(Fragment {
            binds: vec![bind],
            controls: vec![root_control],
        })
    }

    /// Element whose declared type has extension-compatible descendants:
    /// an `xsi:type` selector, a switch with one case per candidate, and
    /// relevance conditions keeping only the chosen case's binds live.
    fn add_switched_element(
        &mut self,
        complex: &ComplexType,
        compatible: &'a [Arc<TypeDef>],
        decl: &ElementDecl,
        occurs: Occurs,
        path: &str,
        mut instance: Option<&mut Element>,
    ) -> Result<Fragment> {
        let node = SchemaNode::Element(decl);
        let caption = format!("{} Type", controls::caption_for(&node, self.bundle));

        // Candidates: the declared type itself when concrete, then its
        // compatible descendants.
        let mut candidates: Vec<&ComplexType> = Vec::new();
        if !complex.abstract_type {
            candidates.push(complex);
        }
        for sub in compatible {
            if let Some(ct) = sub.as_complex() {
                if ct.name != complex.name {
                    candidates.push(ct);
                }
            }
        }

        // Bind for the xsi:type attribute driving the switch.
        let (mut type_bind, type_bind_id) =
            self.start_bind(&format!("{path}/@{XSI_PREFIX}:type"), Occurs::once(), None, None);

        let mut select1 = Element::new(format!("{XFORMS_PREFIX}:select1"));
        let select1_id = self.ctx.set_id(&mut select1);
        let long = candidates.len() >= self.config.select1_long_list_threshold;
        select1.set_attr(
            "xforms:appearance",
            if long {
                self.config.select1_long_appearance.clone()
            } else {
                self.config.select1_short_appearance.clone()
            },
        );
        select1.set_attr("xforms:bind", &type_bind_id);
        let label = controls::create_label(self.ctx, &caption);
        select1.append_child(label);
        if long {
            let placeholder = format!("[Select1 {caption}]");
            controls::append_item(self.ctx, &mut select1, &placeholder, &placeholder);
            append_bind_constraint(&mut type_bind, &format!("not( . = '{placeholder}')"));
        }

        // Bind for the element itself; case binds nest inside it.
        let (mut element_bind, element_bind_id) =
            self.start_bind(path, occurs, None, Some(&node));

        // One case id and selector item per candidate.
        let mut case_ids = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            let value = self.type_value_name(candidate);
            let case_id = self.ctx.next_id("case");

            let mut item = Element::new(format!("{XFORMS_PREFIX}:item"));
            self.ctx.set_id(&mut item);
            let item_label = candidate
                .name
                .as_ref()
                .map(|q| controls::caption_from_name(&q.local_name))
                .unwrap_or_else(|| value.clone());
            let label = controls::create_label(self.ctx, &item_label);
            item.append_child(label);
            let mut value_el = Element::new(format!("{XFORMS_PREFIX}:value"));
            self.ctx.set_id(&mut value_el);
            value_el.append_text(value.clone());
            item.append_child(value_el);

            let mut action = Element::new(format!("{XFORMS_PREFIX}:action"));
            self.ctx.set_id(&mut action);
            action.set_attr("ev:event", "xforms-select");
            let mut toggle = Element::new(format!("{XFORMS_PREFIX}:toggle"));
            self.ctx.set_id(&mut toggle);
            toggle.set_attr("xforms:case", &case_id);
            action.append_child(toggle);
            item.append_child(action);

            select1.append_child(item);
            case_ids.push(case_id);
        }

        // Re-validate the selector when activated.
        let mut dispatch = Element::new(format!("{XFORMS_PREFIX}:dispatch"));
        self.ctx.set_id(&mut dispatch);
        dispatch.set_attr("xforms:name", "DOMActivate");
        dispatch.set_attr("xforms:target", &select1_id);
        let trigger = controls::create_trigger(self.ctx, None, None, "validate choice", vec![dispatch]);

        let mut switch = Element::new(format!("{XFORMS_PREFIX}:switch"));
        let switch_suffix = self.ctx.next_id("switch");
        switch.set_attr("id", format!("{select1_id}-{switch_suffix}"));
        switch.set_attr("xforms:bind", &type_bind_id);

        // The default candidate seeds the instance.
        if let (Some(inst), Some(first)) = (instance.as_deref_mut(), candidates.first()) {
            let value = self.type_value_name(first);
            inst.set_attr(format!("{XSI_PREFIX}:type"), value);
            inst.set_attr(format!("{XSI_PREFIX}:nil"), "true");
        }

        for (i, candidate) in candidates.iter().enumerate() {
            let check = i > 0;
            let case_instance = if i == 0 { instance.as_deref_mut() } else { None };
            let (mut case_binds, group) = {
                let scope = SearchScope {
                    binds: &element_bind,
                    controls: &switch,
                };
                let search = if check { Some(&scope) } else { None };
                self.complex_element_body(
                    candidate,
                    decl,
                    occurs,
                    &element_bind_id,
                    check,
                    search,
                    case_instance,
                )?
            };
            self.patch_case_relevance(&mut case_binds, candidate);

            let mut case = Element::new(format!("{XFORMS_PREFIX}:case"));
            case.set_attr("id", &case_ids[i]);
            case.set_attr("xforms:selected", if i == 0 { "true" } else { "false" });
            case.append_child(group);
            switch.append_child(case);

            for bind in case_binds {
                element_bind.append_child(bind);
            }
        }

        Ok(Fragment {
            binds: vec![type_bind, element_bind],
            controls: vec![select1, trigger, switch],
        })
    }

    /// Condition every bind of a case on the sibling `xsi:type` naming the
    /// case's type or one of its own compatible descendants.
    fn patch_case_relevance(&mut self, case_binds: &mut [Element], case_type: &ComplexType) {
        let mut condition = format!(
            "../@{XSI_PREFIX}:type='{}'",
            self.type_value_name(case_type)
        );
        if let Some(name) = &case_type.name {
            let subs: Vec<String> = self
                .types
                .compatible(name)
                .iter()
                .filter_map(|t| t.as_complex())
                .map(|t| self.type_value_name(t))
                .collect();
            for sub in subs {
                condition.push_str(&format!(" or ../@{XSI_PREFIX}:type='{sub}'"));
            }
        }

        let schema = self.schema;
        let case_type = case_type.clone();
        for bind in case_binds.iter_mut() {
            bind.visit_mut(&mut |el| {
                if el.local_name() != "bind" {
                    return;
                }
                let Some(nodeset) = el.attr("xforms:nodeset").map(str::to_string) else {
                    return;
                };
                let stripped = strip_predicates(&nodeset);
                let (name, is_attribute) = match stripped.strip_prefix('@') {
                    Some(rest) => (rest, true),
                    None => (stripped, false),
                };
                let name = name.rsplit(':').next().unwrap_or(name);
                // Only components the case type declares itself are
                // toggled; inherited ones stay visible whichever case is
                // selected.
                let declared = if is_attribute {
                    schema.is_attribute_declared_in(&case_type, name)
                        && !schema.attribute_comes_from_extension(&case_type, name)
                } else {
                    schema.is_element_declared_in(&case_type, name)
                        && !schema.element_comes_from_extension(&case_type, name)
                };
                if !declared {
                    return;
                }
                let relevant = match el.attr("xforms:relevant") {
                    Some(existing) => format!("({existing}) and {condition}"),
                    None => condition.clone(),
                };
                el.set_attr("xforms:relevant", relevant);
            });
        }
    }

    /// Clone the control generated for an inherited component in an
    /// earlier case, renumbering its ids. Returns false when nothing
    /// matching was generated yet.
    fn copy_extension_control(
        &mut self,
        scope: &SearchScope,
        nodeset_name: &str,
        children: &mut Vec<Element>,
    ) -> bool {
        let found = scope.binds.descendants().find(|el| {
            el.local_name() == "bind"
                && el
                    .attr("xforms:nodeset")
                    .map(|n| {
                        let stripped = strip_predicates(n);
                        stripped == nodeset_name
                            || stripped.rsplit(':').next() == Some(nodeset_name)
                    })
                    .unwrap_or(false)
        });
        let Some(bind) = found else {
            warn!(name = nodeset_name, "no earlier bind to copy for inherited component");
            return false;
        };
        let Some(bind_id) = bind.attr("id").map(str::to_string) else {
            return false;
        };
        let Some(control) = scope
            .controls
            .find(&|el| el.attr("xforms:bind") == Some(bind_id.as_str()))
        else {
            warn!(name = nodeset_name, "no earlier control to copy for inherited component");
            return false;
        };
        let mut copy = control.clone();
        self.ctx.reset_ids(&mut copy);
        children.push(copy);
        true
    }

    /// A bind element for a component at the given path: nodeset (with the
    /// prototype-excluding predicate when repeated), value type, required
    /// and readonly state, and occurrence-count constraints.
    fn start_bind(
        &mut self,
        path: &str,
        occurs: Occurs,
        kind: Option<&ValueKind>,
        node: Option<&SchemaNode>,
    ) -> (Element, String) {
        let mut bind = Element::new(format!("{XFORMS_PREFIX}:bind"));
        let id = self.ctx.set_id(&mut bind);

        let nodeset = if path.is_empty() {
            ".".to_string()
        } else if occurs.is_repeated() {
            format!("{path}[position() != last()]")
        } else {
            path.to_string()
        };
        bind.set_attr("xforms:nodeset", nodeset);

        if let Some(ValueKind::Simple(simple)) = kind {
            let type_name = self.xforms_type_name(simple);
            bind.set_attr("xforms:type", type_name);
            bind.set_attr(
                "xforms:required",
                if occurs.min != 0 { "true()" } else { "false()" },
            );
        }
        if let Some(node) = node {
            if node.constraint().is_some_and(|c| c.is_fixed()) {
                bind.set_attr("xforms:readonly", "true()");
            }
        }

        let mut constraints = Vec::new();
        if occurs.min > 1 {
            constraints.push(format!("count(.) >= {}", occurs.min));
            bind.set_attr(format!("{EXT_PREFIX}:minimum"), occurs.min.to_string());
        }
        if let Some(max) = occurs.max {
            if max > 1 {
                constraints.push(format!("count(.) <= {max}"));
                bind.set_attr(format!("{EXT_PREFIX}:maximum"), max.to_string());
            }
        }
        if !constraints.is_empty() {
            bind.set_attr("xforms:constraint", constraints.join(" and "));
        }
        (bind, id)
    }

    /// The `xforms:type` value for a simple type: the prefixed schema type
    /// name when globally declared, otherwise its built-in ancestor.
    fn xforms_type_name(&mut self, simple: &SimpleType) -> String {
        if let Some(name) = &simple.name {
            if name.namespace.as_deref() == Some(XSD_NAMESPACE) {
                return name.local_name.clone();
            }
            if self.schema.type_def(name).is_some() {
                return self.ctx.qualified_name(name);
            }
        }
        self.schema.builtin_name(simple)
    }

    /// Instance-facing name of a type, matching the value written into
    /// `xsi:type` attributes and compared by relevance conditions.
    fn type_value_name(&mut self, complex: &ComplexType) -> String {
        match &complex.name {
            Some(name) => self.ctx.qualified_name(name),
            None => "anyType".to_string(),
        }
    }
}

/// Conjoin a constraint expression onto a bind.
fn append_bind_constraint(bind: &mut Element, expression: &str) {
    let merged = match bind.attr("xforms:constraint") {
        Some(existing) => format!("{existing} and {expression}"),
        None => expression.to_string(),
    };
    bind.set_attr("xforms:constraint", merged);
}
