//! Sceneway: the binding layer between scene-level navigation calls and a
//! native navigation subsystem, reached through an opaque command/event
//! bridge. Owns request/result correlation, scene bookkeeping, root
//! replacement acknowledgement, and the bottom-sheet modal state machine.

pub mod bridge;
pub mod core;
pub mod modal;

#[cfg(test)]
pub mod test_support;

pub use crate::bridge::{
    BridgeEvent, EventKind, NavBridge, NavigationEvent, RESULT_CANCEL, RESULT_OK,
};
pub use crate::core::layout::{DispatchParams, Layout, Route, RouteGraph, RouteMode};
pub use crate::core::navigation::{InterceptorExtras, NavError, Navigation, NavigationInterceptor};
pub use crate::core::navigator::{NavResult, Navigator, Visibility};
pub use crate::modal::{BottomModal, FormFactor, ModalConfig, ModalEffect, ModalPhase};
