//! # Navigation Context
//!
//! The process-wide context object behind every navigation call. It owns the
//! bridge handle, the scene registry, the interceptor slot, the shared tag
//! counter, and the root-acknowledgement waiters: the state the hybrid layer
//! needs for its whole lifetime. Defaults are empty/no-op; there is nothing
//! to tear down before process exit.
//!
//! ```text
//! BridgeEvent ──▶ handle_event ──┬─▶ root waiter (DidSetRoot tag)
//!                                ├─▶ navigator visibility / results
//!                                ├─▶ back-press handler slot
//!                                └─▶ self-dispatched switchTab
//! ```
//!
//! The event pump runs on the single UI-driving task, so registry mutation
//! needs no coordination beyond short `Mutex` sections.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};

use crate::bridge::{BridgeEvent, EventKind, NavBridge, RESULT_CANCEL};
use crate::core::layout::{DispatchParams, Layout, Route, RouteGraph};
use crate::core::navigator::{Navigator, Visibility};
use crate::core::registry::{BackHandler, SceneRegistry};

/// Caller usage errors. Everything else at this layer is encoded in values
/// (`false` dispatches, cancel-coded results), never in error types.
#[derive(Debug, PartialEq, Eq)]
pub enum NavError {
    /// Explicit request codes must be non-negative; negative values are
    /// reserved for auto-assignment.
    NegativeRequestCode(i64),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::NegativeRequestCode(code) => {
                write!(f, "request code must be non-negative, got {code}")
            }
        }
    }
}

impl std::error::Error for NavError {}

/// Context handed to an interceptor alongside the action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterceptorExtras {
    pub scene_id: String,
    pub index: Option<usize>,
}

/// Globally registered hook allowed to veto a dispatched action.
///
/// Returning `true` suppresses the action; the native bridge is never
/// contacted and the dispatch reports `false`. Only one interceptor is active
/// at a time; the last registration wins.
#[async_trait]
pub trait NavigationInterceptor: Send + Sync {
    async fn intercept(
        &self,
        action: &str,
        from_module: Option<&str>,
        to_module: Option<&str>,
        extras: &InterceptorExtras,
    ) -> bool;
}

/// Callbacks around root replacement.
#[derive(Clone)]
struct RootLayoutListener {
    will_set_root: Arc<dyn Fn() + Send + Sync>,
    did_set_root: Arc<dyn Fn() + Send + Sync>,
}

pub(crate) struct NavigationInner {
    bridge: Arc<dyn NavBridge>,
    registry: SceneRegistry,
    interceptor: Mutex<Option<Arc<dyn NavigationInterceptor>>>,
    /// Shared monotonically decreasing counter: `set_root` tags and
    /// auto-assigned request codes both come from here, so auto codes never
    /// collide with caller-chosen non-negative codes and are never reused.
    tag: AtomicI64,
    root_waiters: Mutex<HashMap<i64, oneshot::Sender<()>>>,
    root_listener: Mutex<Option<RootLayoutListener>>,
    /// Counts `set_root` calls that already fired the will-set-root callback
    /// eagerly, so the bridge-emitted `WillSetRoot` event does not double it.
    eager_will_set_root: AtomicU32,
}

/// Cheap, cloneable handle to the process-wide navigation context.
#[derive(Clone)]
pub struct Navigation {
    inner: Arc<NavigationInner>,
}

impl Navigation {
    pub fn new(bridge: Arc<dyn NavBridge>) -> Self {
        Self {
            inner: Arc::new(NavigationInner {
                bridge,
                registry: SceneRegistry::new(),
                interceptor: Mutex::new(None),
                tag: AtomicI64::new(0),
                root_waiters: Mutex::new(HashMap::new()),
                root_listener: Mutex::new(None),
                eager_will_set_root: AtomicU32::new(0),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<NavigationInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn bridge(&self) -> &Arc<dyn NavBridge> {
        &self.inner.bridge
    }

    // ------------------------------------------------------------------
    // Scene registry
    // ------------------------------------------------------------------

    /// The navigator for a scene: the registered one if the scene is live,
    /// otherwise a fresh unattached navigator (not registered).
    pub fn navigator(&self, scene_id: &str) -> Arc<Navigator> {
        self.inner.registry.get(scene_id).unwrap_or_else(|| {
            Arc::new(Navigator::new(scene_id, Arc::downgrade(&self.inner), None))
        })
    }

    /// Mount notification: register the scene and hand back its navigator.
    /// Idempotent: a live scene keeps its existing navigator.
    pub fn register_scene(&self, scene_id: &str, module_name: &str) -> Arc<Navigator> {
        let fresh = Arc::new(Navigator::new(
            scene_id,
            Arc::downgrade(&self.inner),
            Some(module_name.to_string()),
        ));
        let navigator = self.inner.registry.insert(fresh);
        navigator.set_module_name(module_name);
        navigator
    }

    /// Unmount notification: drop the scene's registry entry and its
    /// back-press handler, and cancel every pending result wait synchronously.
    /// No result arriving later can resolve a cancelled wait.
    pub fn unregister_scene(&self, scene_id: &str) {
        self.inner.registry.remove_back_handler(scene_id);
        if let Some(navigator) = self.inner.registry.remove(scene_id) {
            navigator.cancel_all();
        }
    }

    /// Number of live scenes.
    pub fn scene_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Install the back-press handler for a scene (last registration wins).
    pub fn set_back_handler(
        &self,
        scene_id: &str,
        handler: impl Fn() -> bool + Send + Sync + 'static,
    ) {
        self.inner
            .registry
            .set_back_handler(scene_id, Arc::new(handler) as BackHandler);
    }

    /// Remove a scene's back-press handler. Events routed afterwards can
    /// never reach it.
    pub fn remove_back_handler(&self, scene_id: &str) {
        self.inner.registry.remove_back_handler(scene_id);
    }

    // ------------------------------------------------------------------
    // Interceptor
    // ------------------------------------------------------------------

    pub fn set_interceptor(&self, interceptor: Arc<dyn NavigationInterceptor>) {
        *self.inner.interceptor.lock().unwrap() = Some(interceptor);
    }

    pub fn clear_interceptor(&self) {
        *self.inner.interceptor.lock().unwrap() = None;
    }

    // ------------------------------------------------------------------
    // Request codes / tags
    // ------------------------------------------------------------------

    fn next_tag(&self) -> i64 {
        self.inner.tag.fetch_sub(1, Ordering::Relaxed) - 1
    }

    /// Validate an explicit request code or auto-assign one.
    pub(crate) fn check_request_code(&self, request_code: Option<i64>) -> Result<i64, NavError> {
        match request_code {
            None => Ok(self.next_tag()),
            Some(code) if code < 0 => Err(NavError::NegativeRequestCode(code)),
            Some(code) => Ok(code),
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Send a navigation action for a scene.
    ///
    /// Foregrounds the host application first, then gives the interceptor (if
    /// any) a chance to veto. A vetoed action reports `false` without
    /// contacting the bridge.
    pub async fn dispatch(&self, scene_id: &str, action: &str, params: DispatchParams) -> bool {
        self.inner.bridge.foreground().await;

        let interceptor = self.inner.interceptor.lock().unwrap().clone();
        if let Some(interceptor) = interceptor {
            let from_module = self.navigator(scene_id).module_name();
            let extras = InterceptorExtras {
                scene_id: scene_id.to_string(),
                index: params.index,
            };
            let intercepted = interceptor
                .intercept(
                    action,
                    from_module.as_deref(),
                    params.module_name.as_deref(),
                    &extras,
                )
                .await;
            if intercepted {
                debug!("action '{action}' on scene {scene_id} suppressed by interceptor");
                return false;
            }
        }

        self.inner.bridge.dispatch(scene_id, action, params).await
    }

    // ------------------------------------------------------------------
    // Root replacement
    // ------------------------------------------------------------------

    /// Replace the navigation hierarchy and suspend until the native side
    /// acknowledges with a `DidSetRoot` event carrying the same tag.
    /// Concurrent calls resolve independently, in acknowledgement order.
    pub async fn set_root(&self, layout: Layout, sticky: bool) {
        let listener = self.inner.root_listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            // Fire eagerly; the suppression counter keeps the bridge-emitted
            // WillSetRoot event from doubling it.
            self.inner.eager_will_set_root.fetch_add(1, Ordering::Relaxed);
            (listener.will_set_root)();
        }

        let tag = self.next_tag();
        let (tx, rx) = oneshot::channel();
        self.inner.root_waiters.lock().unwrap().insert(tag, tx);
        self.inner.bridge.set_root(&layout, sticky, tag).await;
        if rx.await.is_err() {
            warn!("root waiter for tag {tag} dropped before acknowledgement");
        }
    }

    /// Install callbacks fired around root replacement.
    pub fn set_root_layout_update_listener(
        &self,
        will_set_root: impl Fn() + Send + Sync + 'static,
        did_set_root: impl Fn() + Send + Sync + 'static,
    ) {
        *self.inner.root_listener.lock().unwrap() = Some(RootLayoutListener {
            will_set_root: Arc::new(will_set_root),
            did_set_root: Arc::new(did_set_root),
        });
    }

    // ------------------------------------------------------------------
    // Queries and passthroughs
    // ------------------------------------------------------------------

    /// The navigator for whatever route is currently on top.
    pub async fn current(&self) -> Option<Arc<Navigator>> {
        let route = self.current_route().await?;
        Some(self.navigator(&route.scene_id))
    }

    pub async fn current_route(&self) -> Option<Route> {
        self.inner.bridge.foreground().await;
        self.inner.bridge.current_route().await
    }

    pub async fn route_graph(&self) -> Vec<RouteGraph> {
        self.inner.bridge.foreground().await;
        self.inner.bridge.route_graph().await
    }

    pub async fn is_navigation_root(&self, scene_id: &str) -> bool {
        self.inner.bridge.is_navigation_root(scene_id).await
    }

    pub fn reload(&self) {
        self.inner.bridge.reload();
    }

    pub async fn delay(&self, ms: u64) {
        self.inner.bridge.delay(ms).await;
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    /// Drain the bridge's event channel until it closes.
    pub async fn run_events(&self, mut events: mpsc::UnboundedReceiver<BridgeEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        debug!("bridge event channel closed");
    }

    /// Route one inbound bridge event.
    pub async fn handle_event(&self, event: BridgeEvent) {
        match event {
            BridgeEvent::WillSetRoot => {
                if self.inner.eager_will_set_root.load(Ordering::Relaxed) > 0 {
                    return;
                }
                let listener = self.inner.root_listener.lock().unwrap().clone();
                if let Some(listener) = listener {
                    (listener.will_set_root)();
                }
            }
            BridgeEvent::DidSetRoot { tag } => {
                let listener = self.inner.root_listener.lock().unwrap().clone();
                if let Some(listener) = listener {
                    (listener.did_set_root)();
                }
                self.inner.eager_will_set_root.store(0, Ordering::Relaxed);

                let waiter = self.inner.root_waiters.lock().unwrap().remove(&tag);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(());
                    }
                    // Superseded or unknown tag: resolve nothing.
                    None => debug!("dropping did-set-root event for unknown tag {tag}"),
                }
            }
            BridgeEvent::SwitchTab {
                scene_id,
                index,
                module_name,
            } => {
                let params = DispatchParams {
                    index: Some(index),
                    module_name: Some(module_name),
                    ..Default::default()
                };
                let _ = self.dispatch(&scene_id, "switchTab", params).await;
            }
            BridgeEvent::Navigation(event) => match event.on {
                EventKind::ComponentAppear => {
                    if let Some(navigator) = self.inner.registry.get(&event.scene_id) {
                        navigator.set_visibility(Visibility::Visible);
                    }
                }
                EventKind::ComponentDisappear => {
                    if let Some(navigator) = self.inner.registry.get(&event.scene_id) {
                        navigator.set_visibility(Visibility::Invisible);
                    }
                }
                EventKind::ComponentResult => {
                    match self.inner.registry.get(&event.scene_id) {
                        Some(navigator) => navigator.deliver_result(
                            event.request_code.unwrap_or(0),
                            event.result_code.unwrap_or(RESULT_CANCEL),
                            event.data,
                        ),
                        None => debug!(
                            "dropping result event for unregistered scene {}",
                            event.scene_id
                        ),
                    }
                }
                EventKind::DialogBackPressed => {
                    let handler = self.inner.registry.back_handler(&event.scene_id);
                    match handler {
                        Some(handler) => {
                            let consumed = handler();
                            debug!(
                                "back press on scene {} consumed: {consumed}",
                                event.scene_id
                            );
                        }
                        None => debug!("back press on scene {} unhandled", event.scene_id),
                    }
                }
            },
        }
    }
}
