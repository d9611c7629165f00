//! Event routing, layers and camera control through the sandbox.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;
use winit::keyboard::KeyCode;

use common::{bundled_sandbox, run_frames, tap, DT};
use demo_sandbox::event::{Event, EventKind};
use demo_sandbox::keybindings::Command;
use demo_sandbox::layer::{Layer, LayerContext};
use demo_sandbox::ModeId;

/// Records what it sees into a shared log and optionally swallows events
struct RecordingLayer {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    swallow: bool,
}

impl RecordingLayer {
    fn boxed(name: &'static str, log: &Rc<RefCell<Vec<String>>>, swallow: bool) -> Box<dyn Layer> {
        Box::new(Self {
            name,
            log: Rc::clone(log),
            swallow,
        })
    }
}

impl Layer for RecordingLayer {
    fn name(&self) -> &str {
        self.name
    }

    fn on_update(&mut self, ctx: &LayerContext<'_>) {
        self.log
            .borrow_mut()
            .push(format!("update {} {:?}", self.name, ctx.active_mode));
    }

    fn on_event(&mut self, event: &mut Event) {
        self.log.borrow_mut().push(format!("event {}", self.name));
        event.handled = self.swallow;
    }
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn test_events_reach_overlays_first_and_stop_when_handled() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sandbox = bundled_sandbox(1);
    sandbox.push_layer(RecordingLayer::boxed("bottom", &log, false));
    sandbox.push_overlay(RecordingLayer::boxed("overlay", &log, false));
    sandbox.push_layer(RecordingLayer::boxed("middle", &log, true));

    sandbox.handle_event(EventKind::MouseMoved { x: 10.0, y: 20.0 });

    assert_eq!(*log.borrow(), vec!["event overlay", "event middle"]);
}

#[test]
fn test_updates_run_bottom_up_after_the_frame() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sandbox = bundled_sandbox(2);
    sandbox.push_overlay(RecordingLayer::boxed("overlay", &log, false));
    sandbox.push_layer(RecordingLayer::boxed("layer", &log, false));

    sandbox.queue(Command::NextMode);
    sandbox.frame(DT);

    assert_eq!(
        *log.borrow(),
        vec!["update layer Some(ModeId(3))", "update overlay Some(ModeId(3))"]
    );
}

#[test]
fn test_bound_keys_do_not_reach_layers() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sandbox = bundled_sandbox(1);
    sandbox.push_layer(RecordingLayer::boxed("layer", &log, false));

    sandbox.handle_event(EventKind::KeyPressed {
        key: KeyCode::ArrowRight,
        repeat: false,
    });
    sandbox.handle_event(EventKind::KeyPressed {
        key: KeyCode::Tab,
        repeat: false,
    });

    assert_eq!(*log.borrow(), vec!["event layer"]);
}

#[test]
fn test_popped_layer_no_longer_updates() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut sandbox = bundled_sandbox(1);
    sandbox.push_layer(RecordingLayer::boxed("gone", &log, false));
    assert!(sandbox.layers_mut().pop_layer("gone").is_some());

    run_frames(&mut sandbox, 2);
    assert!(log.borrow().is_empty());
}

// ============================================================================
// Keybindings
// ============================================================================

#[rstest]
#[case::next(KeyCode::ArrowRight, 3)]
#[case::prev(KeyCode::ArrowLeft, 1)]
fn test_key_repeat_does_not_switch_modes(#[case] key: KeyCode, #[case] once: u32) {
    let mut sandbox = bundled_sandbox(2);
    sandbox.handle_event(EventKind::KeyPressed { key, repeat: false });
    for _ in 0..5 {
        sandbox.handle_event(EventKind::KeyPressed { key, repeat: true });
    }
    sandbox.handle_event(EventKind::KeyReleased { key });
    sandbox.frame(DT);

    assert_eq!(sandbox.machine().active_id(), Some(ModeId(once)));
}

#[test]
fn test_rebound_key_switches_modes() {
    let mut sandbox = bundled_sandbox(1);
    sandbox.keybindings_mut().bind(KeyCode::KeyN, Command::NextMode);
    sandbox.keybindings_mut().unbind(KeyCode::ArrowRight);

    tap(&mut sandbox, KeyCode::ArrowRight);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(1)));
    tap(&mut sandbox, KeyCode::KeyN);
    assert_eq!(sandbox.machine().active_id(), Some(ModeId(2)));
}

#[test]
fn test_title_tracks_active_mode() {
    let mut sandbox = bundled_sandbox(4);
    assert_eq!(
        sandbox.take_title_change().as_deref(),
        Some("Sparky Sandbox - 4: Simple 2D Light")
    );
    tap(&mut sandbox, KeyCode::KeyP);
    assert_eq!(sandbox.take_title_change(), None);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn test_camera_moves_only_with_free_look() {
    let mut sandbox = bundled_sandbox(10);
    let start = sandbox.machine().camera().position;

    sandbox.handle_event(EventKind::KeyPressed {
        key: KeyCode::KeyW,
        repeat: false,
    });
    run_frames(&mut sandbox, 5);
    assert_eq!(sandbox.machine().camera().position, start);

    tap(&mut sandbox, KeyCode::KeyL);
    run_frames(&mut sandbox, 5);
    assert!(sandbox.machine().camera().position.z < start.z);
}

#[test]
fn test_camera_resets_on_mode_entry() {
    let mut sandbox = bundled_sandbox(10);
    tap(&mut sandbox, KeyCode::KeyL);
    sandbox.handle_event(EventKind::KeyPressed {
        key: KeyCode::KeyW,
        repeat: false,
    });
    run_frames(&mut sandbox, 5);
    sandbox.handle_event(EventKind::KeyReleased { key: KeyCode::KeyW });

    tap(&mut sandbox, KeyCode::ArrowLeft);
    tap(&mut sandbox, KeyCode::ArrowRight);

    let camera = sandbox.machine().camera();
    assert_eq!(camera.position, camera.settings().position);
    assert!(!camera.look_around());
}
