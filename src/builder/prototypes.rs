//! Prototype-node maintenance on instance documents.
//!
//! Repeated elements carry one trailing template entry marked with
//! `ext:prototype="true"`. When an existing instance is imported the
//! markers are grafted back in from the freshly generated default
//! instance; before submission they are stripped again.

use crate::dom::{Element, Node};
use crate::namespaces::EXT_PREFIX;

fn prototype_attr() -> String {
    format!("{EXT_PREFIX}:prototype")
}

fn is_prototype(element: &Element) -> bool {
    element.attr(&prototype_attr()) == Some("true")
}

/// Graft prototype entries from a generated default instance into an
/// imported instance document.
///
/// For every prototype-marked entry in the template, the matching parent
/// in the instance receives a copy placed after its last sibling of the
/// same tag (or appended when none exist). Idempotent: a parent already
/// holding a marked entry of that tag is left alone.
pub fn insert_prototype_nodes(instance: &mut Element, template: &Element) {
    for template_child in template.child_elements().cloned().collect::<Vec<_>>() {
        if is_prototype(&template_child) {
            let tag = template_child.name.clone();
            let already_present = instance
                .child_elements()
                .any(|c| c.name == tag && is_prototype(c));
            if already_present {
                continue;
            }
            let insert_at = last_position_of(instance, &tag);
            match insert_at {
                Some(i) => instance
                    .children
                    .insert(i + 1, Node::Element(template_child)),
                None => instance.children.push(Node::Element(template_child)),
            }
        } else {
            // Descend into every matching child; repeated entries each
            // get their own grafts.
            let tag = template_child.name.clone();
            for child in instance
                .child_elements_mut()
                .filter(|c| c.name == tag)
            {
                insert_prototype_nodes(child, &template_child);
            }
        }
    }
}

/// Strip prototype entries before submission.
///
/// The grafted template sits in the last position of its same-tag
/// sibling group; it is deleted outright, while marked entries earlier
/// in the group only lose their marker. The walk then recurses into the
/// remaining children, restoring the pre-graft instance.
pub fn remove_prototype_nodes(instance: &mut Element) {
    let marker = prototype_attr();

    let mut last_of_tag: indexmap::IndexMap<String, usize> = indexmap::IndexMap::new();
    for (i, node) in instance.children.iter().enumerate() {
        if let Node::Element(el) = node {
            last_of_tag.insert(el.name.clone(), i);
        }
    }

    let mut index = 0usize;
    instance.children.retain(|node| {
        let retain = match node {
            Node::Element(el) if is_prototype(el) => {
                last_of_tag.get(&el.name) != Some(&index)
            }
            _ => true,
        };
        index += 1;
        retain
    });

    for child in instance.child_elements_mut() {
        child.remove_attr(&marker);
        remove_prototype_nodes(child);
    }
}

fn last_position_of(parent: &Element, tag: &str) -> Option<usize> {
    parent
        .children
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, node)| match node {
            Node::Element(el) if el.name == tag => Some(i),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(name: &str) -> Element {
        let mut el = Element::new(name);
        el.set_attr("ext:prototype", "true");
        el
    }

    fn instance_with_items(count: usize) -> Element {
        let mut root = Element::new("po:order");
        for _ in 0..count {
            root.append_child(Element::new("po:item"));
        }
        root
    }

    fn template_with_marked_item() -> Element {
        let mut template = Element::new("po:order");
        template.append_child(Element::new("po:item"));
        template.append_child(marked("po:item"));
        template
    }

    #[test]
    fn graft_appends_after_last_sibling() {
        let mut instance = instance_with_items(2);
        instance.append_child(Element::new("po:comment"));
        insert_prototype_nodes(&mut instance, &template_with_marked_item());

        let names: Vec<(&str, bool)> = instance
            .child_elements()
            .map(|c| (c.name.as_str(), is_prototype(c)))
            .collect();
        assert_eq!(
            names,
            vec![
                ("po:item", false),
                ("po:item", false),
                ("po:item", true),
                ("po:comment", false),
            ]
        );
    }

    #[test]
    fn graft_is_idempotent() {
        let mut instance = instance_with_items(1);
        let template = template_with_marked_item();
        insert_prototype_nodes(&mut instance, &template);
        let after_first = instance.clone();
        insert_prototype_nodes(&mut instance, &template);
        assert_eq!(instance, after_first);
    }

    #[test]
    fn graft_recurses_into_matching_children() {
        let mut inner_template = Element::new("po:shipTo");
        inner_template.append_child(marked("po:phone"));
        let mut template = Element::new("po:order");
        template.append_child(inner_template);

        let mut instance = Element::new("po:order");
        instance.append_child(Element::new("po:shipTo"));
        insert_prototype_nodes(&mut instance, &template);

        let ship_to = instance.child_elements().next().unwrap();
        let phone = ship_to.child_elements().next().unwrap();
        assert!(is_prototype(phone));
    }

    #[test]
    fn strip_drops_trailing_template_and_unmarks_the_rest() {
        let mut first = marked("po:item");
        first.append_text("kept");
        let mut second = Element::new("po:item");
        second.append_text("plain");
        let mut instance = Element::new("po:order");
        instance.append_child(first);
        instance.append_child(second);
        instance.append_child(marked("po:item"));
        remove_prototype_nodes(&mut instance);

        let items: Vec<&Element> = instance.child_elements().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text(), "kept");
        assert_eq!(items[1].text(), "plain");
        assert!(items.iter().all(|el| el.attr("ext:prototype").is_none()));
    }

    #[test]
    fn strip_leaves_non_trailing_marked_entries_in_place() {
        // A marked entry followed by an unmarked sibling of the same tag
        // is real data; only its marker goes away.
        let mut instance = Element::new("po:order");
        instance.append_child(marked("po:item"));
        instance.append_child(Element::new("po:item"));
        remove_prototype_nodes(&mut instance);

        let items: Vec<&Element> = instance.child_elements().collect();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|el| el.attr("ext:prototype").is_none()));
    }

    #[test]
    fn strip_recurses() {
        let mut inner = Element::new("po:shipTo");
        inner.append_child(marked("po:phone"));
        inner.append_child(Element::new("po:fax"));
        let mut instance = Element::new("po:order");
        instance.append_child(inner);
        remove_prototype_nodes(&mut instance);

        let ship_to = instance.child_elements().next().unwrap();
        let names: Vec<&str> = ship_to.child_elements().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["po:fax"]);
    }
}
