//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::bridge::NavBridge;
use crate::core::layout::{DispatchParams, Layout, Route, RouteGraph};
use crate::core::navigation::Navigation;

/// Everything the mock bridge was asked to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCommand {
    SetRoot {
        layout: Layout,
        sticky: bool,
        tag: i64,
    },
    Dispatch {
        scene_id: String,
        action: String,
        params: DispatchParams,
    },
    SetResult {
        scene_id: String,
        result_code: i32,
        data: Option<Value>,
    },
    SignalFirstRenderComplete {
        scene_id: String,
    },
    Foreground,
    Reload,
    Delay(u64),
}

/// A scriptable stand-in for the native side: records outbound commands and
/// answers with configured values. Tests emit inbound events by calling
/// `Navigation::handle_event` directly.
pub struct MockBridge {
    commands: Mutex<Vec<RecordedCommand>>,
    dispatch_ok: AtomicBool,
    route: Mutex<Option<Route>>,
    graph: Mutex<Vec<RouteGraph>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            dispatch_ok: AtomicBool::new(true),
            route: Mutex::new(None),
            graph: Mutex::new(Vec::new()),
        }
    }

    /// A bridge that rejects every dispatch, simulating transport failure.
    pub fn rejecting() -> Self {
        let bridge = Self::new();
        bridge.dispatch_ok.store(false, Ordering::Relaxed);
        bridge
    }

    pub fn set_dispatch_result(&self, accepted: bool) {
        self.dispatch_ok.store(accepted, Ordering::Relaxed);
    }

    pub fn set_current_route(&self, route: Route) {
        *self.route.lock().unwrap() = Some(route);
    }

    pub fn set_route_graph(&self, graph: Vec<RouteGraph>) {
        *self.graph.lock().unwrap() = graph;
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// The actions that reached the bridge, in dispatch order. Vetoed actions
    /// never show up here.
    pub fn dispatched_actions(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                RecordedCommand::Dispatch { action, .. } => Some(action),
                _ => None,
            })
            .collect()
    }

    /// Tag of the most recent `set_root` command.
    pub fn last_set_root_tag(&self) -> Option<i64> {
        self.commands()
            .into_iter()
            .rev()
            .find_map(|command| match command {
                RecordedCommand::SetRoot { tag, .. } => Some(tag),
                _ => None,
            })
    }

    fn record(&self, command: RecordedCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NavBridge for MockBridge {
    async fn set_root(&self, layout: &Layout, sticky: bool, tag: i64) {
        self.record(RecordedCommand::SetRoot {
            layout: layout.clone(),
            sticky,
            tag,
        });
    }

    async fn dispatch(&self, scene_id: &str, action: &str, params: DispatchParams) -> bool {
        self.record(RecordedCommand::Dispatch {
            scene_id: scene_id.to_string(),
            action: action.to_string(),
            params,
        });
        self.dispatch_ok.load(Ordering::Relaxed)
    }

    fn set_result(&self, scene_id: &str, result_code: i32, data: Option<Value>) {
        self.record(RecordedCommand::SetResult {
            scene_id: scene_id.to_string(),
            result_code,
            data,
        });
    }

    async fn current_route(&self) -> Option<Route> {
        self.route.lock().unwrap().clone()
    }

    async fn route_graph(&self) -> Vec<RouteGraph> {
        self.graph.lock().unwrap().clone()
    }

    async fn is_navigation_root(&self, _scene_id: &str) -> bool {
        true
    }

    fn signal_first_render_complete(&self, scene_id: &str) {
        self.record(RecordedCommand::SignalFirstRenderComplete {
            scene_id: scene_id.to_string(),
        });
    }

    async fn foreground(&self) {
        self.record(RecordedCommand::Foreground);
    }

    fn reload(&self) {
        self.record(RecordedCommand::Reload);
    }

    async fn delay(&self, ms: u64) {
        self.record(RecordedCommand::Delay(ms));
    }
}

/// Creates a navigation context wired to a fresh mock bridge.
pub fn test_navigation() -> (Navigation, Arc<MockBridge>) {
    let bridge = Arc::new(MockBridge::new());
    let nav = Navigation::new(Arc::clone(&bridge) as Arc<dyn NavBridge>);
    (nav, bridge)
}
