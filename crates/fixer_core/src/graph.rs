//! Host graph surface: nodes, widgets and the hooks the host may attach.
//!
//! Every hook is optional. A node without widgets, a widget without an
//! option list, or a missing callback are all normal states.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type NodeId = u64;

/// Called with the new value after a widget was reassigned.
pub type WidgetCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Called with the node size after a widget-driven change.
pub type ResizeHook = Arc<dyn Fn([f32; 2]) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<WidgetOptions>,
    #[serde(skip)]
    pub callback: Option<WidgetCallback>,
    /// Fields this crate does not interpret, kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Widget {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options: None,
            callback: None,
            extra: Map::new(),
        }
    }

    pub fn with_option_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|v| Value::String(v.into())).collect();
        self.options = Some(WidgetOptions {
            values: Some(values),
            extra: Map::new(),
        });
        self
    }

    pub fn with_callback(mut self, callback: WidgetCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// The current value when it is a string.
    pub fn text(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// String entries of the allowed-value list, in list order.
    pub fn option_strings(&self) -> Vec<&str> {
        self.options
            .as_ref()
            .and_then(|options| options.values.as_ref())
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("options", &self.options)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Kept as written; see [`Node::size`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<Widget>>,
    #[serde(skip)]
    pub on_resize: Option<ResizeHook>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: Some(node_type.into()),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Some(serde_json::json!([width, height]));
        self
    }

    /// Width and height for the resize hook; zero where unset or not numeric.
    pub fn size(&self) -> [f32; 2] {
        let dimension = |index: usize| {
            self.size
                .as_ref()
                .and_then(|size| size.get(index))
                .and_then(Value::as_f64)
                .unwrap_or(0.0) as f32
        };
        [dimension(0), dimension(1)]
    }

    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widgets.get_or_insert_with(Vec::new).push(widget);
        self
    }

    pub fn with_resize_hook(mut self, hook: ResizeHook) -> Self {
        self.on_resize = Some(hook);
        self
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.as_ref()?.iter().find(|w| w.name == name)
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.widgets.as_mut()?.iter_mut().find(|w| w.name == name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("node_type", &self.node_type)
            .field("size", &self.size)
            .field("widgets", &self.widgets)
            .field("on_resize", &self.on_resize.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links, groups and whatever else the host stores next to the nodes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    dirty: bool,
}

impl Graph {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            extra: Map::new(),
            dirty: false,
        }
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_by_id_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Canvas-dirty signal: the host should redraw.
    pub fn set_dirty_canvas(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a redraw was requested and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
