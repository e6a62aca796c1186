//! Submissions and repeat-manipulation triggers.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::dom::Element;
use crate::namespaces::XFORMS_PREFIX;

use super::context::BuildContext;
use super::controls;
use super::BuilderConfig;

/// Id of the validating submission.
pub(crate) const SUBMISSION_VALIDATE_ID: &str = "submission-validate";

/// Id of the draft (non-validating) submission.
pub(crate) const SUBMISSION_DRAFT_ID: &str = "submission-draft";

static PREDICATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\[]+").expect("valid regex"));

/// A nodeset expression with any trailing predicates removed.
pub(crate) fn strip_predicates(nodeset: &str) -> &str {
    PREDICATE
        .find(nodeset)
        .map(|m| m.as_str())
        .unwrap_or(nodeset)
}

/// The two submissions (validating submit, non-validating draft) and
/// their submit controls.
pub(crate) fn create_submissions(
    config: &BuilderConfig,
    ctx: &mut BuildContext,
) -> (Vec<Element>, Vec<Element>) {
    let action = match &config.base {
        Some(base) => format!("{}{}", base, config.action),
        None => config.action.clone(),
    };

    let mut submissions = Vec::with_capacity(2);
    let mut submits = Vec::with_capacity(2);
    for (id, validate, label) in [
        (SUBMISSION_VALIDATE_ID, "true", "Submit"),
        (SUBMISSION_DRAFT_ID, "false", "Save Draft"),
    ] {
        let mut submission = Element::new(format!("{XFORMS_PREFIX}:submission"));
        submission.set_attr("id", id);
        submission.set_attr("xforms:validate", validate);
        submission.set_attr("xforms:action", action.clone());
        submission.set_attr("xforms:method", config.method.as_str());
        submissions.push(submission);

        let mut submit = Element::new(format!("{XFORMS_PREFIX}:submit"));
        ctx.set_id(&mut submit);
        submit.set_attr("xforms:submission", id);
        let label = controls::create_label(ctx, label);
        submit.append_child(label);
        submits.push(submit);
    }
    (submissions, submits)
}

/// Append insert-before, insert-after and delete triggers for every repeat
/// in the body.
///
/// Each trigger's target nodeset is rebuilt from the repeat's bind and its
/// ancestor binds; ancestors governed by a different repeat contribute an
/// `index('...')` step so the action lands inside the currently selected
/// entries.
pub(crate) fn create_repeat_triggers(
    model: &Element,
    root_group: &mut Element,
    ctx: &mut BuildContext,
) {
    let mut chains: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut stack: Vec<(String, String)> = Vec::new();
    collect_bind_chains(model, &mut stack, &mut chains);

    let repeats: Vec<(String, String)> = root_group
        .descendants()
        .filter(|el| el.local_name() == "repeat")
        .filter_map(|el| {
            let id = el.attr("id")?;
            let bind = el.attr("xforms:bind")?;
            Some((id.to_string(), bind.to_string()))
        })
        .collect();
    let bind_to_repeat: HashMap<&str, &str> = repeats
        .iter()
        .map(|(repeat_id, bind_id)| (bind_id.as_str(), repeat_id.as_str()))
        .collect();

    for (repeat_id, bind_id) in &repeats {
        let Some(chain) = chains.get(bind_id) else {
            warn!(repeat = %repeat_id, bind = %bind_id, "repeat references an unknown bind");
            continue;
        };
        let nodeset = chain
            .iter()
            .map(|(ancestor_id, ancestor_nodeset)| {
                let mut step = strip_predicates(ancestor_nodeset).to_string();
                if let Some(governing) = bind_to_repeat.get(ancestor_id.as_str()) {
                    if *governing != repeat_id {
                        step.push_str(&format!("[index('{governing}')]"));
                    }
                }
                step
            })
            .collect::<Vec<_>>()
            .join("/");

        for trigger in create_triggers_for_repeat(ctx, repeat_id, bind_id, &nodeset) {
            root_group.append_child(trigger);
        }
    }
}

fn collect_bind_chains(
    element: &Element,
    stack: &mut Vec<(String, String)>,
    chains: &mut HashMap<String, Vec<(String, String)>>,
) {
    for child in element.child_elements() {
        if child.local_name() == "bind" {
            let id = child.attr("id").unwrap_or_default().to_string();
            let nodeset = child.attr("xforms:nodeset").unwrap_or_default().to_string();
            stack.push((id.clone(), nodeset));
            chains.insert(id, stack.clone());
            collect_bind_chains(child, stack, chains);
            stack.pop();
        } else {
            collect_bind_chains(child, stack, chains);
        }
    }
}

/// The three manipulation triggers of one repeat.
fn create_triggers_for_repeat(
    ctx: &mut BuildContext,
    repeat_id: &str,
    bind_id: &str,
    nodeset: &str,
) -> Vec<Element> {
    let index = format!("index('{repeat_id}')");

    let mut insert_before = Element::new(format!("{XFORMS_PREFIX}:insert"));
    ctx.set_id(&mut insert_before);
    insert_before.set_attr("xforms:nodeset", nodeset);
    insert_before.set_attr("xforms:position", "before");
    insert_before.set_attr("xforms:at", "1");

    let mut insert_after = Element::new(format!("{XFORMS_PREFIX}:insert"));
    ctx.set_id(&mut insert_after);
    insert_after.set_attr("xforms:nodeset", nodeset);
    insert_after.set_attr("xforms:position", "after");
    insert_after.set_attr("xforms:at", index.clone());

    let mut delete = Element::new(format!("{XFORMS_PREFIX}:delete"));
    ctx.set_id(&mut delete);
    delete.set_attr("xforms:nodeset", nodeset);
    delete.set_attr("xforms:at", index);

    vec![
        controls::create_trigger(
            ctx,
            Some(&format!("{repeat_id}-insert_before")),
            Some(bind_id),
            "insert at beginning",
            vec![insert_before],
        ),
        controls::create_trigger(
            ctx,
            Some(&format!("{repeat_id}-insert_after")),
            Some(bind_id),
            "insert after selected",
            vec![insert_after],
        ),
        controls::create_trigger(
            ctx,
            Some(&format!("{repeat_id}-delete")),
            Some(bind_id),
            "delete selected",
            vec![delete],
        ),
    ]
}
