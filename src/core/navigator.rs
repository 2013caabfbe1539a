//! # Navigator
//!
//! One navigator per live scene. Owns the scene's mutable params, its
//! visibility, and the pending-result arena that correlates dispatched
//! actions with the result events the native side emits later.
//!
//! ```text
//! present(module, code) ──▶ dispatch ──▶ native
//!        │                                 │
//!        └─ wait_result(code) ... ◀── ComponentResult { code } ─┘
//! ```
//!
//! Every pending wait is a one-shot record: it resolves with the matching
//! result event, or it is cancelled when the scene unmounts. Either way it
//! resolves exactly once and leaves the arena.

use std::sync::{Mutex, Weak};

use log::debug;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::bridge::RESULT_CANCEL;
use crate::core::layout::{DispatchParams, Layout};
use crate::core::navigation::{NavError, Navigation, NavigationInner};

/// `(result_code, data)` pair every wait resolves to.
pub type NavResult = (i32, Option<Value>);

/// What the scene's screen is currently doing on screen.
///
/// `Pending` until the first appear/disappear notification arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Pending,
    Visible,
    Invisible,
}

/// One-shot listener waiting for a result event with a matching code.
struct PendingResult {
    request_code: i64,
    tx: oneshot::Sender<NavResult>,
}

pub struct Navigator {
    scene_id: String,
    /// Weak so registry entries never keep the navigation context alive.
    nav: Weak<NavigationInner>,
    module_name: Mutex<Option<String>>,
    params: Mutex<Map<String, Value>>,
    visibility: Mutex<Visibility>,
    listeners: Mutex<Vec<PendingResult>>,
}

impl Navigator {
    pub(crate) fn new(
        scene_id: impl Into<String>,
        nav: Weak<NavigationInner>,
        module_name: Option<String>,
    ) -> Self {
        Self {
            scene_id: scene_id.into(),
            nav,
            module_name: Mutex::new(module_name),
            params: Mutex::new(Map::new()),
            visibility: Mutex::new(Visibility::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    pub fn module_name(&self) -> Option<String> {
        self.module_name.lock().unwrap().clone()
    }

    pub(crate) fn set_module_name(&self, module_name: &str) {
        let mut slot = self.module_name.lock().unwrap();
        if slot.is_none() {
            *slot = Some(module_name.to_string());
        }
    }

    pub fn visibility(&self) -> Visibility {
        *self.visibility.lock().unwrap()
    }

    pub(crate) fn set_visibility(&self, visibility: Visibility) {
        *self.visibility.lock().unwrap() = visibility;
    }

    /// Merge `params` into the scene's param state.
    pub fn set_params(&self, params: Map<String, Value>) {
        self.params.lock().unwrap().extend(params);
    }

    /// Snapshot of the scene's param state.
    pub fn params(&self) -> Map<String, Value> {
        self.params.lock().unwrap().clone()
    }

    /// Pending waits currently registered on this scene.
    pub fn pending_results(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    fn navigation(&self) -> Option<Navigation> {
        self.nav.upgrade().map(Navigation::from_inner)
    }

    // ------------------------------------------------------------------
    // Result correlation
    // ------------------------------------------------------------------

    /// Suspend until a result event with `request_code` arrives, or until the
    /// scene unmounts.
    ///
    /// A failed dispatch short-circuits: the wait resolves immediately with
    /// `(0, None)` and no listener is registered, so callers always get a
    /// well-formed pair and nothing leaks.
    pub(crate) async fn wait_result(&self, request_code: i64, dispatch_succeeded: bool) -> NavResult {
        if !dispatch_succeeded {
            return (RESULT_CANCEL, None);
        }
        let (tx, rx) = oneshot::channel();
        self.listeners
            .lock()
            .unwrap()
            .push(PendingResult { request_code, tx });
        // Sender dropped without a value cannot happen from this crate, but a
        // closed channel still degrades to the cancel result.
        rx.await.unwrap_or((RESULT_CANCEL, None))
    }

    /// Resolve every pending wait whose code matches. Waits with other codes
    /// are untouched.
    pub(crate) fn deliver_result(&self, request_code: i64, result_code: i32, data: Option<Value>) {
        let matched: Vec<PendingResult> = {
            let mut listeners = self.listeners.lock().unwrap();
            let mut matched = Vec::new();
            let mut kept = Vec::new();
            for listener in listeners.drain(..) {
                if listener.request_code == request_code {
                    matched.push(listener);
                } else {
                    kept.push(listener);
                }
            }
            *listeners = kept;
            matched
        };

        if matched.is_empty() {
            debug!(
                "no pending wait for request code {request_code} on scene {}",
                self.scene_id
            );
            return;
        }
        for listener in matched {
            let _ = listener.tx.send((result_code, data.clone()));
        }
    }

    /// Cancel every pending wait with the reserved cancel code. Called on
    /// scene unmount; a result event arriving afterwards finds no listener.
    pub(crate) fn cancel_all(&self) {
        let drained: Vec<PendingResult> = {
            let mut listeners = self.listeners.lock().unwrap();
            listeners.drain(..).collect()
        };
        if !drained.is_empty() {
            debug!(
                "cancelling {} pending wait(s) on scene {}",
                drained.len(),
                self.scene_id
            );
        }
        for listener in drained {
            let _ = listener.tx.send((RESULT_CANCEL, None));
        }
    }

    // ------------------------------------------------------------------
    // Scene operations
    // ------------------------------------------------------------------

    /// Send an action for this scene. Returns `false` if the action was
    /// intercepted, rejected by the native side, or the navigation context
    /// has shut down.
    pub async fn dispatch(&self, action: &str, params: DispatchParams) -> bool {
        match self.navigation() {
            Some(nav) => nav.dispatch(&self.scene_id, action, params).await,
            None => false,
        }
    }

    pub async fn push(
        &self,
        module_name: &str,
        props: Option<Value>,
        options: Option<Value>,
    ) -> NavResult {
        let params = DispatchParams {
            module_name: Some(module_name.to_string()),
            props,
            options,
            ..Default::default()
        };
        let accepted = self.dispatch("push", params).await;
        // Pushed screens report their result on code 0.
        self.wait_result(0, accepted).await
    }

    pub async fn push_layout(&self, layout: Layout) -> NavResult {
        let params = DispatchParams {
            layout: Some(layout),
            ..Default::default()
        };
        let accepted = self.dispatch("pushLayout", params).await;
        self.wait_result(0, accepted).await
    }

    pub async fn pop(&self) -> bool {
        self.dispatch("pop", DispatchParams::default()).await
    }

    pub async fn pop_to(&self, target_id: &str) -> bool {
        let params = DispatchParams {
            target_id: Some(target_id.to_string()),
            ..Default::default()
        };
        self.dispatch("popTo", params).await
    }

    pub async fn pop_to_root(&self) -> bool {
        self.dispatch("popToRoot", DispatchParams::default()).await
    }

    /// Replace the current screen with another module.
    pub async fn redirect_to(
        &self,
        module_name: &str,
        props: Option<Value>,
        options: Option<Value>,
    ) -> bool {
        let params = DispatchParams {
            module_name: Some(module_name.to_string()),
            props,
            options,
            animated: Some(true),
            ..Default::default()
        };
        self.dispatch("redirectTo", params).await
    }

    pub async fn is_stack_root(&self) -> bool {
        match self.navigation() {
            Some(nav) => nav.is_navigation_root(&self.scene_id).await,
            None => false,
        }
    }

    /// Present a module and wait for its result.
    ///
    /// An explicit `request_code` must be non-negative; omitted codes are
    /// auto-assigned and can never collide with explicit ones.
    pub async fn present(
        &self,
        module_name: &str,
        props: Option<Value>,
        options: Option<Value>,
        request_code: Option<i64>,
    ) -> Result<NavResult, NavError> {
        let params = DispatchParams {
            module_name: Some(module_name.to_string()),
            props,
            options,
            ..Default::default()
        };
        self.dispatch_and_wait("present", params, request_code).await
    }

    pub async fn present_layout(
        &self,
        layout: Layout,
        request_code: Option<i64>,
    ) -> Result<NavResult, NavError> {
        let params = DispatchParams {
            layout: Some(layout),
            ..Default::default()
        };
        self.dispatch_and_wait("presentLayout", params, request_code)
            .await
    }

    pub async fn dismiss(&self) -> bool {
        self.dispatch("dismiss", DispatchParams::default()).await
    }

    /// Show a module as a modal and wait for its result.
    pub async fn show_modal(
        &self,
        module_name: &str,
        props: Option<Value>,
        options: Option<Value>,
        request_code: Option<i64>,
    ) -> Result<NavResult, NavError> {
        let params = DispatchParams {
            module_name: Some(module_name.to_string()),
            props,
            options,
            ..Default::default()
        };
        self.dispatch_and_wait("showModal", params, request_code)
            .await
    }

    pub async fn show_modal_layout(
        &self,
        layout: Layout,
        request_code: Option<i64>,
    ) -> Result<NavResult, NavError> {
        let params = DispatchParams {
            layout: Some(layout),
            ..Default::default()
        };
        self.dispatch_and_wait("showModalLayout", params, request_code)
            .await
    }

    pub async fn hide_modal(&self) -> bool {
        self.dispatch("hideModal", DispatchParams::default()).await
    }

    /// Record the result this scene wants delivered to its requester.
    pub fn set_result(&self, result_code: i32, data: Option<Value>) {
        if let Some(nav) = self.navigation() {
            nav.bridge().set_result(&self.scene_id, result_code, data);
        }
    }

    pub async fn switch_tab(&self, index: usize, pop_to_root: bool) -> bool {
        let params = DispatchParams {
            index: Some(index),
            pop_to_root: Some(pop_to_root),
            ..Default::default()
        };
        self.dispatch("switchTab", params).await
    }

    pub async fn toggle_menu(&self) -> bool {
        self.dispatch("toggleMenu", DispatchParams::default()).await
    }

    pub async fn open_menu(&self) -> bool {
        self.dispatch("openMenu", DispatchParams::default()).await
    }

    pub async fn close_menu(&self) -> bool {
        self.dispatch("closeMenu", DispatchParams::default()).await
    }

    pub fn signal_first_render_complete(&self) {
        if let Some(nav) = self.navigation() {
            nav.bridge().signal_first_render_complete(&self.scene_id);
        }
    }

    async fn dispatch_and_wait(
        &self,
        action: &str,
        mut params: DispatchParams,
        request_code: Option<i64>,
    ) -> Result<NavResult, NavError> {
        let Some(nav) = self.navigation() else {
            // Context gone: behaves like a failed dispatch.
            return Ok((RESULT_CANCEL, None));
        };
        let code = nav.check_request_code(request_code)?;
        params.request_code = Some(code);
        let accepted = nav.dispatch(&self.scene_id, action, params).await;
        Ok(self.wait_result(code, accepted).await)
    }
}
