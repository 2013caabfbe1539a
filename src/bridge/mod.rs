//! # Native Bridge
//!
//! The boundary with the native navigation subsystem. Everything on the far
//! side of [`NavBridge`] (view hierarchies, transitions, the platform
//! navigation bar) is an opaque collaborator. This crate only sends commands
//! through the trait and consumes [`BridgeEvent`]s coming back.
//!
//! ```text
//!   Navigation ── commands ──▶ NavBridge (native side)
//!       ▲                          │
//!       └──── BridgeEvent stream ──┘
//! ```
//!
//! Events arrive on a `tokio::sync::mpsc` channel owned by the bridge
//! implementation and are routed by `Navigation::run_events` (or fed one at a
//! time through `handle_event` in tests).

use async_trait::async_trait;
use serde_json::Value;

use crate::core::layout::{DispatchParams, Layout, Route, RouteGraph};

/// Result code reported by a scene that completed normally.
///
/// Follows the Android activity-result convention, so callers can forward
/// codes from native dialogs without translation.
pub const RESULT_OK: i32 = -1;

/// Reserved result code used when a wait is cancelled (scene teardown,
/// failed dispatch) or when a scene reports explicit cancellation.
pub const RESULT_CANCEL: i32 = 0;

/// Outbound command surface of the native navigation module.
///
/// Transport failures are not distinguishable at this layer: a command that
/// could not be delivered reports `false` from [`dispatch`](Self::dispatch)
/// and the rest of the commands are fire-and-forget or return neutral
/// defaults. Delivery is at-most-once; no retries happen here.
#[async_trait]
pub trait NavBridge: Send + Sync {
    /// Replace the navigation hierarchy. The native side acknowledges with a
    /// `DidSetRoot` event carrying the same `tag`.
    async fn set_root(&self, layout: &Layout, sticky: bool, tag: i64);

    /// Send a navigation action (`push`, `pop`, `present`, ...) for a scene.
    /// Returns whether the native side accepted the action.
    async fn dispatch(&self, scene_id: &str, action: &str, params: DispatchParams) -> bool;

    /// Record the result a scene wants delivered to whoever is waiting on it.
    fn set_result(&self, scene_id: &str, result_code: i32, data: Option<Value>);

    /// The route currently on top, if any.
    async fn current_route(&self) -> Option<Route>;

    /// Snapshot of the full native navigation hierarchy.
    async fn route_graph(&self) -> Vec<RouteGraph>;

    /// Whether the scene sits at the root of its navigation stack.
    async fn is_navigation_root(&self, scene_id: &str) -> bool;

    /// Notify the native side that the scene finished its first render.
    fn signal_first_render_complete(&self, scene_id: &str);

    /// Bring the host application to the foreground. Platforms where this is
    /// meaningless implement it as a no-op.
    async fn foreground(&self);

    /// Reload the whole hybrid layer.
    fn reload(&self);

    /// Native-side timer; resolves after `ms` milliseconds.
    async fn delay(&self, ms: u64);
}

/// Lifecycle and result notifications carried by a generic navigation event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    ComponentAppear,
    ComponentDisappear,
    ComponentResult,
    DialogBackPressed,
}

/// A generic per-scene event from the native side.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationEvent {
    pub scene_id: String,
    pub on: EventKind,
    /// Present on `ComponentResult` events.
    pub request_code: Option<i64>,
    /// Present on `ComponentResult` events.
    pub result_code: Option<i32>,
    pub data: Option<Value>,
}

impl NavigationEvent {
    /// A lifecycle event with no result payload.
    pub fn lifecycle(scene_id: impl Into<String>, on: EventKind) -> Self {
        Self {
            scene_id: scene_id.into(),
            on,
            request_code: None,
            result_code: None,
            data: None,
        }
    }

    /// A `ComponentResult` event.
    pub fn result(
        scene_id: impl Into<String>,
        request_code: i64,
        result_code: i32,
        data: Option<Value>,
    ) -> Self {
        Self {
            scene_id: scene_id.into(),
            on: EventKind::ComponentResult,
            request_code: Some(request_code),
            result_code: Some(result_code),
            data,
        }
    }
}

/// Inbound events emitted by the native bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeEvent {
    /// The native side is about to replace the root hierarchy.
    WillSetRoot,
    /// Root replacement finished; `tag` matches the originating `set_root`.
    DidSetRoot { tag: i64 },
    /// The user switched tabs natively; the binding layer turns this into a
    /// `switchTab` dispatch.
    SwitchTab {
        scene_id: String,
        index: usize,
        module_name: String,
    },
    /// Per-scene lifecycle or result notification.
    Navigation(NavigationEvent),
}
