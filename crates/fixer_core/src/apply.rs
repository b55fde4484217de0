use fixer_logging::{fixer_debug, fixer_info};
use serde_json::Value;

use crate::graph::{Graph, Widget};
use crate::wire::FixInstruction;

/// Case-insensitive comparison with `\` and `/` treated alike.
pub fn paths_equivalent(a: &str, b: &str) -> bool {
    normalize_for_compare(a) == normalize_for_compare(b)
}

fn normalize_for_compare(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Returns the string to assign for `target`.
///
/// An equivalent entry already in the widget's option list is reused verbatim.
/// Otherwise `target` is appended to the list (when the widget has one).
pub fn ensure_widget_option(widget: &mut Widget, target: &str) -> String {
    let Some(values) = widget
        .options
        .as_mut()
        .and_then(|options| options.values.as_mut())
    else {
        return target.to_string();
    };

    if let Some(existing) = values
        .iter()
        .filter_map(Value::as_str)
        .find(|option| paths_equivalent(option, target))
    {
        return existing.to_string();
    }

    fixer_info!(
        "Option list of widget {} lacks {:?}; adding it",
        widget.name,
        target
    );
    values.push(Value::String(target.to_string()));
    target.to_string()
}

/// Applies fixes in order and returns how many found their node and widget.
///
/// Vanished nodes or widgets are skipped. Each applied fix runs the widget
/// callback and the node resize hook when the host registered them.
pub fn apply_fixes(graph: &mut Graph, fixes: &[FixInstruction]) -> usize {
    let mut applied = 0;
    for fix in fixes {
        let Some(node) = graph.node_by_id_mut(fix.node_id) else {
            fixer_debug!("Skipping fix for missing node {}", fix.node_id);
            continue;
        };
        let size = node.size();
        let on_resize = node.on_resize.clone();
        let Some(widget) = node.widget_mut(&fix.widget_name) else {
            fixer_debug!(
                "Skipping fix for missing widget {} on node {}",
                fix.widget_name,
                fix.node_id
            );
            continue;
        };

        let final_value = ensure_widget_option(widget, &fix.new_value);
        widget.value = Value::String(final_value);
        if let Some(callback) = widget.callback.clone() {
            callback(&widget.value);
        }
        if let Some(on_resize) = on_resize {
            on_resize(size);
        }
        applied += 1;
    }

    if applied > 0 {
        graph.set_dirty_canvas();
    }
    applied
}
