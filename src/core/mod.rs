//! # Core Navigation Logic
//!
//! Everything between the public scene API and the native bridge. It knows
//! nothing about rendering or any UI technology.
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!                  │            CORE              │
//!                  │                              │
//!                  │  • Navigation (dispatcher)   │
//!                  │  • Navigator  (correlator)   │
//!                  │  • SceneRegistry             │
//!                  │  • Layout tree               │
//!                  └──────────────┬───────────────┘
//!                                 │
//!                      NavBridge (opaque native side)
//! ```
//!
//! ## Modules
//!
//! - [`navigation`]: the process-wide context (dispatch, interceptor veto,
//!   root replacement, event routing)
//! - [`navigator`]: per-scene object (params, visibility, result waits)
//! - [`registry`]: scene id → navigator bookkeeping
//! - [`layout`]: the declarative hierarchy sent to the native side

pub mod layout;
pub mod navigation;
pub mod navigator;
pub mod registry;
