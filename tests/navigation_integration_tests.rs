use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::yield_now;

use sceneway::core::layout::DispatchParams;
use sceneway::modal::{self, BottomModal, ModalConfig, ModalPhase};
use sceneway::{
    BridgeEvent, EventKind, Layout, NavBridge, Navigation, NavigationEvent, RESULT_CANCEL,
    RESULT_OK, Route, RouteMode,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
    });
}

fn new_scene_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Records dispatched actions; everything else answers with fixed values.
struct RecordingBridge {
    dispatches: Mutex<Vec<(String, String, DispatchParams)>>,
    set_roots: Mutex<Vec<i64>>,
}

impl RecordingBridge {
    fn new() -> Self {
        Self {
            dispatches: Mutex::new(Vec::new()),
            set_roots: Mutex::new(Vec::new()),
        }
    }

    fn dispatches(&self) -> Vec<(String, String, DispatchParams)> {
        self.dispatches.lock().unwrap().clone()
    }

    fn action_count(&self, action: &str) -> usize {
        self.dispatches()
            .iter()
            .filter(|(_, dispatched, _)| dispatched == action)
            .count()
    }

    fn last_set_root_tag(&self) -> Option<i64> {
        self.set_roots.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl NavBridge for RecordingBridge {
    async fn set_root(&self, _layout: &Layout, _sticky: bool, tag: i64) {
        self.set_roots.lock().unwrap().push(tag);
    }

    async fn dispatch(&self, scene_id: &str, action: &str, params: DispatchParams) -> bool {
        self.dispatches
            .lock()
            .unwrap()
            .push((scene_id.to_string(), action.to_string(), params));
        true
    }

    fn set_result(&self, _scene_id: &str, _result_code: i32, _data: Option<Value>) {}

    async fn current_route(&self) -> Option<Route> {
        Some(Route {
            scene_id: "root_scene".to_string(),
            module_name: "Home".to_string(),
            mode: RouteMode::Normal,
        })
    }

    async fn route_graph(&self) -> Vec<sceneway::RouteGraph> {
        Vec::new()
    }

    async fn is_navigation_root(&self, _scene_id: &str) -> bool {
        true
    }

    fn signal_first_render_complete(&self, _scene_id: &str) {}

    async fn foreground(&self) {}

    fn reload(&self) {}

    async fn delay(&self, _ms: u64) {}
}

fn recording_navigation() -> (Navigation, Arc<RecordingBridge>) {
    init_logging();
    let bridge = Arc::new(RecordingBridge::new());
    let nav = Navigation::new(Arc::clone(&bridge) as Arc<dyn NavBridge>);
    (nav, bridge)
}

/// Give spawned tasks a chance to make progress.
async fn settle() {
    for _ in 0..10 {
        yield_now().await;
    }
}

// ============================================================================
// Dispatch / correlation flows
// ============================================================================

#[tokio::test]
async fn test_present_round_trip_through_event_pump() {
    let (nav, bridge) = recording_navigation();
    let scene_id = new_scene_id();
    let navigator = nav.register_scene(&scene_id, "Home");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let pump = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.run_events(events_rx).await })
    };

    let wait = {
        let navigator = Arc::clone(&navigator);
        tokio::spawn(
            async move { navigator.present("ContactPicker", None, None, Some(12)).await },
        )
    };
    settle().await;
    assert_eq!(bridge.action_count("present"), 1);

    // Native side reports the picked contact back on the same code.
    events_tx
        .send(BridgeEvent::Navigation(NavigationEvent::result(
            scene_id.clone(),
            12,
            RESULT_OK,
            Some(json!({"name": "Ada"})),
        )))
        .unwrap();

    let (code, data) = wait.await.unwrap().unwrap();
    assert_eq!(code, RESULT_OK);
    assert_eq!(data, Some(json!({"name": "Ada"})));

    drop(events_tx);
    pump.await.unwrap();
}

#[tokio::test]
async fn test_two_presents_resolve_by_their_own_codes() {
    let (nav, bridge) = recording_navigation();
    let scene_id = new_scene_id();
    let navigator = nav.register_scene(&scene_id, "Home");

    let first = {
        let navigator = Arc::clone(&navigator);
        tokio::spawn(async move { navigator.present("PickerA", None, None, Some(1)).await })
    };
    let second = {
        let navigator = Arc::clone(&navigator);
        tokio::spawn(async move { navigator.present("PickerB", None, None, Some(2)).await })
    };
    settle().await;
    assert_eq!(bridge.action_count("present"), 2);

    // Results arrive in reverse order; each wait only sees its own code.
    nav.handle_event(BridgeEvent::Navigation(NavigationEvent::result(
        scene_id.clone(),
        2,
        RESULT_OK,
        Some(json!("b")),
    )))
    .await;
    nav.handle_event(BridgeEvent::Navigation(NavigationEvent::result(
        scene_id.clone(),
        1,
        RESULT_OK,
        Some(json!("a")),
    )))
    .await;

    assert_eq!(first.await.unwrap().unwrap(), (RESULT_OK, Some(json!("a"))));
    assert_eq!(second.await.unwrap().unwrap(), (RESULT_OK, Some(json!("b"))));
}

#[tokio::test]
async fn test_scene_teardown_cancels_in_flight_wait() {
    let (nav, _bridge) = recording_navigation();
    let scene_id = new_scene_id();
    let navigator = nav.register_scene(&scene_id, "Home");

    let wait = {
        let navigator = Arc::clone(&navigator);
        tokio::spawn(async move { navigator.show_modal("Sheet", None, None, None).await })
    };
    settle().await;
    assert_eq!(navigator.pending_results(), 1);

    nav.unregister_scene(&scene_id);
    let (code, data) = wait.await.unwrap().unwrap();
    assert_eq!((code, data), (RESULT_CANCEL, None));
    assert_eq!(nav.scene_count(), 0);
}

#[tokio::test]
async fn test_set_root_acknowledged_by_tagged_event() {
    let (nav, bridge) = recording_navigation();

    let layout = Layout::stack(vec![Layout::screen("Home")]);
    let pending = {
        let nav = nav.clone();
        tokio::spawn(async move { nav.set_root(layout, false).await })
    };
    settle().await;

    let tag = bridge.last_set_root_tag().expect("set_root reached bridge");
    assert!(tag < 0);
    nav.handle_event(BridgeEvent::DidSetRoot { tag }).await;
    pending.await.unwrap();
}

#[tokio::test]
async fn test_current_falls_back_to_unattached_navigator() {
    let (nav, _bridge) = recording_navigation();
    let current = nav.current().await.expect("bridge reports a route");
    assert_eq!(current.scene_id(), "root_scene");
    // Not registered: asking twice hands out distinct unattached objects.
    assert_eq!(nav.scene_count(), 0);
}

// ============================================================================
// Modal lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_modal_back_press_runs_host_hide_exactly_once() {
    let (nav, bridge) = recording_navigation();
    let scene_id = new_scene_id();
    let navigator = nav.register_scene(&scene_id, "Sheet");

    let bottom_modal = Arc::new(Mutex::new(BottomModal::new(ModalConfig::default(), 800.0)));
    bottom_modal.lock().unwrap().handle_layout(320.0);

    // Mount: back presses for this scene go to the modal.
    {
        let bottom_modal = Arc::clone(&bottom_modal);
        nav.set_back_handler(&scene_id, move || {
            bottom_modal.lock().unwrap().handle_back_press()
        });
    }

    let hide_count = Arc::new(AtomicUsize::new(0));
    let driver = {
        let bottom_modal = Arc::clone(&bottom_modal);
        let nav = nav.clone();
        let navigator = Arc::clone(&navigator);
        let scene_id = scene_id.clone();
        let hide_count = Arc::clone(&hide_count);
        tokio::spawn(async move {
            modal::drive(bottom_modal, move || async move {
                hide_count.fetch_add(1, Ordering::Relaxed);
                navigator.hide_modal().await;
                // Unmount: the handler is gone before the scene is.
                nav.remove_back_handler(&scene_id);
                nav.unregister_scene(&scene_id);
            })
            .await;
        })
    };
    settle().await;

    // Hammer the back button while the sheet is animating out.
    let back = BridgeEvent::Navigation(NavigationEvent::lifecycle(
        scene_id.clone(),
        EventKind::DialogBackPressed,
    ));
    for _ in 0..5 {
        nav.handle_event(back.clone()).await;
    }

    driver.await.unwrap();
    assert_eq!(hide_count.load(Ordering::Relaxed), 1);
    assert_eq!(bridge.action_count("hideModal"), 1);
    assert_eq!(bottom_modal.lock().unwrap().phase(), ModalPhase::Dismissed);
    assert_eq!(nav.scene_count(), 0);

    // The handler was deregistered; a late back press reaches nothing.
    nav.handle_event(back).await;
    assert_eq!(bridge.action_count("hideModal"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_modal_hide_waiter_resolves_after_slide_out() {
    let (nav, _bridge) = recording_navigation();
    let scene_id = new_scene_id();
    nav.register_scene(&scene_id, "Sheet");

    let bottom_modal = Arc::new(Mutex::new(BottomModal::new(ModalConfig::default(), 800.0)));
    bottom_modal.lock().unwrap().handle_layout(320.0);

    let driver = {
        let bottom_modal = Arc::clone(&bottom_modal);
        tokio::spawn(async move {
            modal::drive(bottom_modal, move || async move {}).await;
        })
    };
    settle().await;

    let hidden = bottom_modal.lock().unwrap().hide();
    hidden.await.expect("hide completed");

    driver.await.unwrap();
    let modal = bottom_modal.lock().unwrap();
    assert_eq!(modal.phase(), ModalPhase::Dismissed);
    assert_eq!(modal.offset(), modal.content_height());
}
