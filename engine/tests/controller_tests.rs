//! Controller Tests - Update Loop Scenarios
//!
//! End-to-end tests driving the character controller through an event hub
//! and a physics world.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use avatar_rig_engine::input::{EventHub, InputEvent, InputSource, KeyCode, PointerLockState};
use avatar_rig_engine::physics::{BodyHandle, KinematicBody, PhysicsBody, PhysicsWorld};
use avatar_rig_engine::player::{MovementFrame, RotationSample};
use avatar_rig_engine::{CameraRig, CharacterController, RigConfig, Smoothing, TickStatus};
use common::{Harness, TestHost};
use glam::{Quat, Vec3};

const DT: f32 = 1.0 / 60.0;

// ============================================================================
// Scenario A: forward movement
// ============================================================================

#[test]
fn test_forward_velocity_at_zero_yaw() {
    let mut h = Harness::new(RigConfig::default());
    h.send(InputEvent::KeyDown(KeyCode::W));

    let report = h.step(DT);
    assert_eq!(report.status, TickStatus::Applied);
    let velocity = report.velocity.unwrap();
    assert!(velocity.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
}

#[test]
fn test_forward_preserves_vertical_velocity() {
    let mut body = KinematicBody::at(Vec3::new(0.0, 10.0, 0.0));
    body.linear_velocity = Vec3::new(2.0, -3.0, 0.0);
    let mut h = Harness::with_body(RigConfig::default(), body);
    h.send(InputEvent::KeyDown(KeyCode::ArrowUp));

    let report = h.controller.tick(DT, &mut h.world);
    assert!(report.velocity.unwrap().abs_diff_eq(Vec3::new(0.0, -3.0, -5.0), 1e-5));
}

#[test]
fn test_one_second_forward_moves_five_meters() {
    let mut h = Harness::new(RigConfig::default());
    let start = h.translation();
    h.send(InputEvent::KeyDown(KeyCode::W));

    for _ in 0..60 {
        h.step(DT);
    }

    let end = h.translation();
    assert!((start.z - end.z - 5.0).abs() < 1e-3, "moved {}", start.z - end.z);
    assert!(end.x.abs() < 1e-4);
    assert_eq!(end.y, 0.0);
}

#[test]
fn test_release_stops_horizontal_motion() {
    let mut h = Harness::new(RigConfig::default());
    h.send(InputEvent::KeyDown(KeyCode::W));
    h.step(DT);
    h.send(InputEvent::KeyUp(KeyCode::W));

    let report = h.step(DT);
    let velocity = report.velocity.unwrap();
    assert_eq!(velocity.x, 0.0);
    assert_eq!(velocity.z, 0.0);
}

// ============================================================================
// Scenario B: mouse-look
// ============================================================================

#[test]
fn test_locked_delta_turns_by_exact_amount() {
    for dt in [1.0 / 144.0, 1.0 / 60.0, 1.0 / 30.0, 0.5] {
        let mut h = Harness::new(RigConfig::default());
        h.lock();
        assert_eq!(h.controller.lock_state(), PointerLockState::Locked);

        h.send(InputEvent::MouseMove { dx: 100.0, dy: 0.0 });
        h.step(dt);
        assert!(
            (h.controller.orientation().yaw() + 0.2).abs() < 1e-6,
            "dt {dt}: yaw {}",
            h.controller.orientation().yaw()
        );
    }
}

#[test]
fn test_look_then_walk_follows_yaw() {
    let mut h = Harness::new(RigConfig::default());
    h.lock();
    // Turn a quarter right: 0.002 rad per unit
    h.send(InputEvent::MouseMove {
        dx: std::f32::consts::FRAC_PI_2 / 0.002,
        dy: 0.0,
    });
    h.send(InputEvent::KeyDown(KeyCode::W));

    let report = h.step(DT);
    assert!(report.velocity.unwrap().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-3));
}

#[test]
fn test_denied_capture_keeps_mouse_look_off() {
    let mut h = Harness::new(RigConfig::default());
    h.host.deny.set(true);
    h.send(InputEvent::Click);
    assert_eq!(h.host.requests.get(), 1);

    h.send(InputEvent::MouseMove { dx: 200.0, dy: 0.0 });
    h.step(DT);
    assert_eq!(h.controller.lock_state(), PointerLockState::Unlocked);
    assert_eq!(h.controller.orientation().yaw(), 0.0);

    // A later request can still succeed
    h.host.deny.set(false);
    h.lock();
    assert_eq!(h.controller.lock_state(), PointerLockState::Locked);
}

#[test]
fn test_host_revocation_stops_mouse_look() {
    let mut h = Harness::new(RigConfig::default());
    h.lock();
    h.send(InputEvent::MouseMove { dx: 10.0, dy: 0.0 });
    h.send(InputEvent::PointerLockChange { element: None });
    h.send(InputEvent::MouseMove { dx: 10.0, dy: 0.0 });

    // Only the delta delivered while locked turns the view
    h.step(DT);
    assert!((h.controller.orientation().yaw() + 0.02).abs() < 1e-6);
    assert_eq!(h.host.exits.get(), 0);
}

#[test]
fn test_locked_delta_survives_revocation_before_tick() {
    let mut h = Harness::new(RigConfig::default());
    h.lock();
    h.send(InputEvent::MouseMove { dx: 100.0, dy: 0.0 });
    h.send(InputEvent::PointerLockChange { element: None });
    assert_eq!(h.controller.lock_state(), PointerLockState::Unlocked);

    h.step(DT);
    assert!((h.controller.orientation().yaw() + 0.2).abs() < 1e-6);
    assert_eq!(h.controller.pending_deltas(), 0);
}

#[test]
fn test_release_held_keys_stops_walking() {
    let mut h = Harness::new(RigConfig::default());
    h.send(InputEvent::KeyDown(KeyCode::W));
    h.send(InputEvent::KeyDown(KeyCode::D));
    assert!(h.step(DT).velocity.unwrap().x > 0.0);

    // Focus lost: the key-ups never arrive
    h.controller.release_held_keys();
    let velocity = h.step(DT).velocity.unwrap();
    assert_eq!(velocity.x, 0.0);
    assert_eq!(velocity.z, 0.0);
    assert_eq!(h.controller.locomotion(), avatar_rig_engine::Locomotion::Idle);
}

// ============================================================================
// Scenario C: teardown
// ============================================================================

#[test]
fn test_drop_while_locked_releases_capture() {
    let hub = Rc::new(RefCell::new(EventHub::new()));
    let host = Rc::new(TestHost::default());
    let controller =
        CharacterController::new(RigConfig::default(), hub.clone(), host.clone()).unwrap();

    hub.borrow_mut().dispatch(&InputEvent::Click);
    hub.borrow_mut().dispatch(&InputEvent::PointerLockChange {
        element: Some(controller.config().capture_target),
    });
    assert_eq!(controller.lock_state(), PointerLockState::Locked);

    drop(controller);
    assert_eq!(host.exits.get(), 1);
    assert_eq!(hub.borrow().listener_count(), 0);
    assert_eq!(
        hub.borrow_mut().dispatch(&InputEvent::MouseMove { dx: 50.0, dy: 0.0 }),
        0
    );
}

#[test]
fn test_shutdown_while_locked_ignores_later_motion() {
    let mut h = Harness::new(RigConfig::default());
    h.lock();
    h.controller.shutdown();

    assert_eq!(h.host.exits.get(), 1);
    assert_eq!(h.controller.lock_state(), PointerLockState::Unlocked);

    assert_eq!(h.send(InputEvent::MouseMove { dx: 50.0, dy: 0.0 }), 0);
    h.step(DT);
    assert_eq!(h.controller.orientation().yaw(), 0.0);
}

#[test]
fn test_drop_while_unlocked_does_not_touch_host() {
    let h = Harness::new(RigConfig::default());
    let host = h.host.clone();
    let hub = h.hub.clone();
    drop(h);

    assert_eq!(host.exits.get(), 0);
    assert_eq!(hub.borrow().listener_count(), 0);
}

// ============================================================================
// Scenario D: camera reads the post-update transform
// ============================================================================

/// Body whose engine applies velocity immediately, so the write is visible
/// in the same tick.
struct EagerBody {
    translation: Vec3,
    rotation: Quat,
    velocity: Vec3,
}

impl PhysicsBody for EagerBody {
    fn translation(&self) -> Vec3 {
        self.translation
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat, _wake: bool) {
        self.rotation = rotation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3, _wake: bool) {
        self.velocity = velocity;
        self.translation += velocity * DT;
    }
}

struct EagerWorld {
    body: EagerBody,
}

impl PhysicsWorld for EagerWorld {
    fn body(&self, _handle: BodyHandle) -> Option<&dyn PhysicsBody> {
        Some(&self.body)
    }

    fn body_mut(&mut self, _handle: BodyHandle) -> Option<&mut dyn PhysicsBody> {
        Some(&mut self.body)
    }
}

#[test]
fn test_camera_uses_post_update_translation() {
    let hub = Rc::new(RefCell::new(EventHub::new()));
    let host = Rc::new(TestHost::default());
    let mut controller =
        CharacterController::new(RigConfig::default(), hub.clone(), host).unwrap();
    controller.attach_body(BodyHandle::new(0, 0));

    let mut world = EagerWorld {
        body: EagerBody {
            translation: Vec3::new(1.0, 0.0, 1.0),
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
        },
    };
    hub.borrow_mut().dispatch(&InputEvent::KeyDown(KeyCode::W));

    let before = world.body.translation;
    let report = controller.tick(DT, &mut world);
    let after = world.body.translation;
    assert_ne!(before, after);

    let orientation = controller.orientation().smoothed();
    let rig = CameraRig::new(controller.config().camera);
    let from_before = rig.compute(before, orientation);
    let from_after = rig.compute(after, orientation);

    let camera = report.camera.unwrap();
    assert_eq!(camera, from_after);
    assert_ne!(camera.position, from_before.position);
    assert_eq!(controller.camera_pose(), camera);
}

// ============================================================================
// Movement frames
// ============================================================================

#[test]
fn test_pre_tick_body_frame_uses_rotation_before_write() {
    let config = RigConfig {
        movement_frame: MovementFrame::BodyRotation(RotationSample::PreTick),
        smoothing: Smoothing::Fixed { factor: 1.0 },
        ..Default::default()
    };
    let mut body = KinematicBody::default();
    body.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let mut h = Harness::with_body(config, body);
    h.send(InputEvent::KeyDown(KeyCode::W));

    // Body faced -X before the tick; this tick's write turns it back to look yaw 0
    let report = h.step(DT);
    assert!(report.velocity.unwrap().abs_diff_eq(Vec3::new(-5.0, 0.0, 0.0), 1e-4));

    // Next tick reads the rotation written above
    let report = h.step(DT);
    assert!(report.velocity.unwrap().abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-4));
}

#[test]
fn test_smoothed_frame_lags_raw_yaw() {
    let config = RigConfig {
        movement_frame: MovementFrame::BodyRotation(RotationSample::Smoothed),
        ..Default::default()
    };
    let mut raw = Harness::new(RigConfig::default());
    let mut smoothed = Harness::new(config);

    for h in [&mut raw, &mut smoothed] {
        h.lock();
        h.send(InputEvent::MouseMove { dx: 400.0, dy: 0.0 });
        h.send(InputEvent::KeyDown(KeyCode::W));
    }

    let raw_velocity = raw.step(DT).velocity.unwrap();
    let smoothed_velocity = smoothed.step(DT).velocity.unwrap();

    // Both at full speed, smoothed one turned less far
    assert!((raw_velocity.length() - 5.0).abs() < 1e-4);
    assert!((smoothed_velocity.length() - 5.0).abs() < 1e-4);
    assert!(smoothed_velocity.x < raw_velocity.x);
}

#[test]
fn test_world_frame_ignores_look() {
    let config = RigConfig {
        movement_frame: MovementFrame::World,
        ..Default::default()
    };
    let mut h = Harness::new(config);
    h.lock();
    h.send(InputEvent::MouseMove { dx: 500.0, dy: 0.0 });
    h.send(InputEvent::KeyDown(KeyCode::S));

    let report = h.step(DT);
    assert!(report.velocity.unwrap().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
}

#[test]
fn test_listener_registered_once() {
    let h = Harness::new(RigConfig::default());
    assert_eq!(h.hub.borrow().listener_count(), 1);
    assert!(h.controller.is_subscribed());
}
