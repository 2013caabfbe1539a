//! # Bottom Modal
//!
//! Slide-up bottom sheet state machine. The wrapped content is rendered by
//! the host; this module owns the phases, the offset animation, and the
//! back-press/scrim handling:
//!
//! ```text
//! Hidden ──first layout──▶ Showing ──▶ Visible ──hide/back──▶ Hiding ──▶ Dismissed
//!                             └───────────hide/back────────────┘     (RemoveHost, once)
//! ```
//!
//! The machine is pure: [`BottomModal::advance`] steps it by an explicit
//! `Duration` and returns the effect to run, so tests drive it without a
//! clock. [`drive`] is the tokio frame loop used in production.
//!
//! On dismissal the owner receives [`ModalEffect::RemoveHost`] exactly once;
//! that is the point to run the original host hide operation and unmount the
//! overlay. Back-press handlers register in the navigation context on mount
//! and are removed on unmount, so they can never fire afterwards.

mod animation;

pub use animation::SlideAnimation;

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Entrance animation length.
pub const SHOW_DURATION: Duration = Duration::from_millis(250);
/// Exit animation length. Shorter than the entrance on purpose.
pub const HIDE_DURATION: Duration = Duration::from_millis(200);
/// Home-indicator inset appended below the content on notched devices.
pub const NOTCH_BOTTOM_INSET: f64 = 34.0;

const FRAME: Duration = Duration::from_millis(16);

/// Device form factor, for safe-area padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    #[default]
    Regular,
    Notched,
}

/// Configuration accepted by the modal wrapper.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModalConfig {
    /// Whether back presses and scrim taps dismiss the modal.
    pub cancelable: bool,
    pub safe_area_color: String,
    pub navigation_bar_color: String,
    pub form_factor: FormFactor,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            cancelable: true,
            safe_area_color: "#F3F3F3".to_string(),
            navigation_bar_color: "#FFFFFF".to_string(),
            form_factor: FormFactor::default(),
        }
    }
}

/// Observable phase of the modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalPhase {
    /// Mounted but not yet measured; sitting below the screen.
    Hidden,
    /// Sliding up after the first layout measurement.
    Showing,
    /// Fully on screen at offset zero.
    Visible,
    /// Sliding back down to the measured height.
    Hiding,
    /// Off screen for good; the host has been asked to remove the overlay.
    Dismissed,
}

/// Side effect requested by [`BottomModal::advance`].
#[derive(Debug, PartialEq, Eq)]
pub enum ModalEffect {
    /// Run the original host hide operation and unmount the overlay.
    /// Emitted exactly once per modal.
    RemoveHost,
}

enum Phase {
    Hidden,
    Showing(SlideAnimation),
    Visible,
    Hiding(SlideAnimation),
    Dismissed,
}

pub struct BottomModal {
    config: ModalConfig,
    screen_height: f64,
    /// Measured content height; zero until the first non-zero layout event.
    height: f64,
    phase: Phase,
    remove_emitted: bool,
    hide_waiters: Vec<oneshot::Sender<()>>,
}

impl BottomModal {
    pub fn new(config: ModalConfig, screen_height: f64) -> Self {
        Self {
            config,
            screen_height,
            height: 0.0,
            phase: Phase::Hidden,
            remove_emitted: false,
            hide_waiters: Vec::new(),
        }
    }

    pub fn phase(&self) -> ModalPhase {
        match self.phase {
            Phase::Hidden => ModalPhase::Hidden,
            Phase::Showing(_) => ModalPhase::Showing,
            Phase::Visible => ModalPhase::Visible,
            Phase::Hiding(_) => ModalPhase::Hiding,
            Phase::Dismissed => ModalPhase::Dismissed,
        }
    }

    /// Vertical offset of the sheet from its on-screen position. Starts at
    /// the full screen height, reaches zero when visible.
    pub fn offset(&self) -> f64 {
        match &self.phase {
            Phase::Hidden => self.screen_height,
            Phase::Showing(anim) | Phase::Hiding(anim) => anim.value(),
            Phase::Visible => 0.0,
            Phase::Dismissed => self.height,
        }
    }

    /// Measured content height, zero before the first layout event.
    pub fn content_height(&self) -> f64 {
        self.height
    }

    /// Safe-area padding appended below the wrapped content.
    pub fn bottom_inset(&self) -> f64 {
        match self.config.form_factor {
            FormFactor::Notched => NOTCH_BOTTOM_INSET,
            FormFactor::Regular => 0.0,
        }
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    /// First non-zero layout measurement captures the content height and
    /// starts the entrance slide. Every later layout event is ignored.
    pub fn handle_layout(&mut self, height: f64) {
        if self.height != 0.0 || height <= 0.0 {
            return;
        }
        self.height = height;
        if let Phase::Hidden = self.phase {
            debug!("modal measured at {height}, starting entrance");
            self.phase = Phase::Showing(SlideAnimation::new(height, 0.0, SHOW_DURATION));
        }
    }

    /// Hardware back press. Always consumed; starts the exit slide only when
    /// the modal is cancelable.
    pub fn handle_back_press(&mut self) -> bool {
        if self.config.cancelable {
            self.begin_hide();
        }
        true
    }

    /// Tap on the background scrim. Same rules as a back press.
    pub fn handle_scrim_tap(&mut self) {
        if self.config.cancelable {
            self.begin_hide();
        }
    }

    /// Programmatic hide. The returned receiver resolves when the exit slide
    /// completes, which is the moment the host hide runs.
    pub fn hide(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if let Phase::Dismissed = self.phase {
            let _ = tx.send(());
            return rx;
        }
        self.hide_waiters.push(tx);
        self.begin_hide();
        rx
    }

    fn begin_hide(&mut self) {
        match &self.phase {
            // Interrupt the entrance from wherever it got to.
            Phase::Showing(anim) => {
                self.phase =
                    Phase::Hiding(SlideAnimation::new(anim.value(), self.height, HIDE_DURATION));
            }
            Phase::Visible => {
                self.phase = Phase::Hiding(SlideAnimation::new(0.0, self.height, HIDE_DURATION));
            }
            // Never measured: already off screen, just run out the clock.
            Phase::Hidden => {
                self.phase = Phase::Hiding(SlideAnimation::new(
                    self.screen_height,
                    self.screen_height,
                    HIDE_DURATION,
                ));
            }
            Phase::Hiding(_) | Phase::Dismissed => {}
        }
    }

    /// Step the active animation. Returns [`ModalEffect::RemoveHost`] exactly
    /// once, when the exit slide reaches the measured height.
    pub fn advance(&mut self, dt: Duration) -> Option<ModalEffect> {
        match &mut self.phase {
            Phase::Showing(anim) => {
                anim.advance(dt);
                if anim.finished() {
                    self.phase = Phase::Visible;
                }
                None
            }
            Phase::Hiding(anim) => {
                anim.advance(dt);
                if !anim.finished() {
                    return None;
                }
                self.phase = Phase::Dismissed;
                for waiter in self.hide_waiters.drain(..) {
                    let _ = waiter.send(());
                }
                if self.remove_emitted {
                    None
                } else {
                    self.remove_emitted = true;
                    debug!("modal dismissed, requesting host removal");
                    Some(ModalEffect::RemoveHost)
                }
            }
            Phase::Hidden | Phase::Visible | Phase::Dismissed => None,
        }
    }
}

/// Frame loop for a mounted modal: ticks the machine until it dismisses, then
/// runs `on_remove` (the original host hide + unmount) exactly once.
pub async fn drive<F, Fut>(modal: Arc<Mutex<BottomModal>>, on_remove: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = tokio::time::Instant::now();
    loop {
        let now = frames.tick().await;
        let dt = now.saturating_duration_since(last);
        last = now;

        let effect = modal.lock().unwrap().advance(dt);
        match effect {
            Some(ModalEffect::RemoveHost) => {
                on_remove().await;
                return;
            }
            None => {
                // Another driver already saw the removal effect.
                if modal.lock().unwrap().phase() == ModalPhase::Dismissed {
                    return;
                }
            }
        }
    }
}
