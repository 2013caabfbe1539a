//! # Scene Registry
//!
//! Maps live scene ids to their navigator objects, plus the per-scene
//! back-press handler slot used by modal overlays. Entries are inserted on
//! mount notification and removed on unmount notification; the registry never
//! relies on garbage collection to drop a scene.
//!
//! All mutation happens under short-lived `Mutex` sections on the UI-driving
//! task; locks are never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::core::navigator::Navigator;

/// Handler invoked when the native side reports a hardware back press for a
/// dialog scene. Returns whether the press was consumed.
pub type BackHandler = Arc<dyn Fn() -> bool + Send + Sync>;

/// Scene id → navigator lookup. One stable navigator per live scene.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: Mutex<HashMap<String, Arc<Navigator>>>,
    back_handlers: Mutex<HashMap<String, BackHandler>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered navigator for a live scene, if any.
    pub fn get(&self, scene_id: &str) -> Option<Arc<Navigator>> {
        self.scenes.lock().unwrap().get(scene_id).cloned()
    }

    /// Register a navigator for its scene id. If the scene is already live,
    /// the existing navigator wins and is returned; a live scene never gets
    /// a duplicate navigator object.
    pub fn insert(&self, navigator: Arc<Navigator>) -> Arc<Navigator> {
        let mut scenes = self.scenes.lock().unwrap();
        Arc::clone(
            scenes
                .entry(navigator.scene_id().to_string())
                .or_insert(navigator),
        )
    }

    /// Remove a scene's navigator. Idempotent.
    pub fn remove(&self, scene_id: &str) -> Option<Arc<Navigator>> {
        let removed = self.scenes.lock().unwrap().remove(scene_id);
        if removed.is_some() {
            debug!("scene {scene_id} removed from registry");
        }
        removed
    }

    /// Number of live scenes.
    pub fn len(&self) -> usize {
        self.scenes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Install the back-press handler for a scene. Last registration wins.
    pub fn set_back_handler(&self, scene_id: &str, handler: BackHandler) {
        self.back_handlers
            .lock()
            .unwrap()
            .insert(scene_id.to_string(), handler);
    }

    /// Remove a scene's back-press handler. Once removed the handler can
    /// never fire again; removal and event routing run on the same task.
    pub fn remove_back_handler(&self, scene_id: &str) {
        self.back_handlers.lock().unwrap().remove(scene_id);
    }

    pub fn back_handler(&self, scene_id: &str) -> Option<BackHandler> {
        self.back_handlers.lock().unwrap().get(scene_id).cloned()
    }
}
