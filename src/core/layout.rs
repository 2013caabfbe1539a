//! # Layout Tree
//!
//! Declarative description of a navigation hierarchy, sent to the native side
//! by `set_root` and layout-carrying dispatches. The tree is a closed set of
//! four node kinds; serde's external tagging produces the wire shape the
//! native module expects:
//!
//! ```json
//! {"stack": {"children": [{"screen": {"moduleName": "Home"}}]}}
//! ```
//!
//! Also defines the route snapshot types (`Route`, `RouteGraph`) returned by
//! the bridge and the `DispatchParams` payload attached to actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the navigation hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Layout {
    /// Leaf node bound to a registered module.
    Screen(Screen),
    /// Card stack; last child is on top.
    Stack(Stack),
    /// Tab container.
    Tabs(Tabs),
    /// Drawer container; children are `[content, menu]`.
    Drawer(Drawer),
}

impl Layout {
    /// Shorthand for a plain screen leaf.
    pub fn screen(module_name: impl Into<String>) -> Self {
        Layout::Screen(Screen {
            module_name: module_name.into(),
            props: None,
            options: None,
        })
    }

    /// Shorthand for a stack wrapping the given children.
    pub fn stack(children: Vec<Layout>) -> Self {
        Layout::Stack(Stack {
            children,
            options: None,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub module_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub children: Vec<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    pub children: Vec<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TabsOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_bar_module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_indeterminate: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawer {
    /// Content first, then the menu.
    pub children: Vec<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DrawerOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawer_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_drawer_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_interactive: Option<bool>,
}

/// How a route was put on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    #[default]
    Normal,
    Modal,
    Present,
}

/// One live route as reported by the native side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub scene_id: String,
    pub module_name: String,
    #[serde(default)]
    pub mode: RouteMode,
}

/// Node of the native hierarchy snapshot returned by `route_graph`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGraph {
    /// Layout discriminant (`"screen"`, `"stack"`, `"tabs"`, `"drawer"`).
    pub layout: String,
    pub scene_id: String,
    #[serde(default)]
    pub children: Vec<RouteGraph>,
    #[serde(default)]
    pub mode: RouteMode,
}

/// Parameters attached to a dispatched navigation action.
///
/// Every field is optional; actions read only the fields they care about.
/// Fields left `None` are omitted from the serialized payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop_to_root: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}
