//! Character Controller
//!
//! Runs the per-tick update for one player character.
//!
//! # Tick Order
//!
//! The order is fixed:
//!
//! 1. Snapshot the directional flags
//! 2. Apply buffered mouse deltas and advance the smoothed orientation
//! 3. Plan velocity (the frame decides which rotation is read; the body
//!    rotation is sampled *before* this tick's write)
//! 4. Write rotation and velocity to the physics body
//! 5. Update the camera rig from the body translation read *after* step 4
//!
//! Input handlers never do any of this work; they only touch flags, capture
//! state and the delta queue held by the [`InputRouter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let hub: Rc<RefCell<EventHub>> = Rc::new(RefCell::new(EventHub::new()));
//! let mut controller = CharacterController::new(RigConfig::default(), hub.clone(), host)?;
//! controller.attach_body(handle);
//!
//! // Each frame:
//! let report = controller.tick(dt, &mut world);
//! world.step(dt);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::movement_planner::{HeadingSources, MovementPlanner, VelocityCommand};
use crate::camera::{CameraPose, CameraRig, OrientationController, yaw_of};
use crate::config::RigConfig;
use crate::error::{ConfigError, TickFault};
use crate::input::{
    InputListener, InputRouter, InputSource, InputState, PointerHost, PointerLockState,
    SubscriptionId,
};
use crate::physics::{BodyHandle, PhysicsWorld};

/// What the body's rotation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Yaw-only part of the smoothed look orientation
    #[default]
    FollowLook,
    /// Turn toward the direction of travel while moving; hold still when idle
    MovementHeading,
}

/// Binary walk cue for the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locomotion {
    #[default]
    Idle,
    Moving,
}

/// Whether this tick's body effects happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Applied,
    Skipped(TickFault),
}

/// Outcome of one [`CharacterController::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub status: TickStatus,
    /// Velocity written to the body
    pub velocity: Option<Vec3>,
    /// Rotation written to the body (`None` when left untouched)
    pub rotation: Option<Quat>,
    pub camera: Option<CameraPose>,
    pub locomotion: Locomotion,
    /// Locomotion differs from the previous tick
    pub locomotion_changed: bool,
}

impl TickReport {
    pub fn applied(&self) -> bool {
        self.status == TickStatus::Applied
    }
}

/// Player character controller with mouse-look and a follow camera.
pub struct CharacterController {
    config: RigConfig,
    router: Rc<RefCell<InputRouter>>,
    source: Rc<RefCell<dyn InputSource>>,
    subscription: Option<SubscriptionId>,
    orientation: OrientationController,
    planner: MovementPlanner,
    rig: CameraRig,
    body: Option<BodyHandle>,
    locomotion: Locomotion,
    /// Flags read by the most recent tick
    last_input: InputState,
}

impl std::fmt::Debug for CharacterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterController")
            .field("subscription", &self.subscription)
            .field("orientation", &self.orientation)
            .field("planner", &self.planner)
            .field("rig", &self.rig)
            .field("body", &self.body)
            .field("locomotion", &self.locomotion)
            .finish_non_exhaustive()
    }
}

impl CharacterController {
    /// Validate `config`, then subscribe to `source`.
    ///
    /// The controller starts with no body attached and pointer capture
    /// unlocked.
    pub fn new(
        config: RigConfig,
        source: Rc<RefCell<dyn InputSource>>,
        host: Rc<dyn PointerHost>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let router = Rc::new(RefCell::new(InputRouter::new(
            config.bindings.clone(),
            host,
            config.capture_target,
            config.delta_queue_capacity,
        )));

        let listener: Rc<RefCell<dyn InputListener>> = router.clone();
        let weak: Weak<RefCell<dyn InputListener>> = Rc::downgrade(&listener);
        let subscription = source.borrow_mut().subscribe(weak);
        log::debug!(target: "controller", "subscribed to input as {subscription:?}");

        Ok(Self {
            orientation: OrientationController::new(config.look_settings()),
            planner: MovementPlanner::new(config.movement_speed, config.movement_frame),
            rig: CameraRig::new(config.camera),
            config,
            router,
            source,
            subscription: Some(subscription),
            body: None,
            locomotion: Locomotion::Idle,
            last_input: InputState::default(),
        })
    }

    // ------------------------------------------------------------------
    // Body attachment
    // ------------------------------------------------------------------

    /// Drive the body behind `handle` from the next tick on.
    pub fn attach_body(&mut self, handle: BodyHandle) {
        log::debug!(target: "controller", "attached body {handle:?}");
        self.body = Some(handle);
    }

    /// Stop driving the body. Returns the handle that was attached.
    pub fn detach_body(&mut self) -> Option<BodyHandle> {
        let handle = self.body.take();
        if let Some(handle) = handle {
            log::debug!(target: "controller", "detached body {handle:?}");
        }
        handle
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    // ------------------------------------------------------------------
    // Update loop
    // ------------------------------------------------------------------

    /// Run one tick. Never panics and never fails: faults skip the body and
    /// camera effects and are reported in the returned [`TickReport`].
    ///
    /// `dt` is the tick length in seconds; negative or non-finite values are
    /// treated as zero.
    pub fn tick(&mut self, dt: f32, world: &mut dyn PhysicsWorld) -> TickReport {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        // 1-2: input snapshot and look update
        let input = self.drain_input();
        let smoothed = self.orientation.tick(dt);

        let body = match self.body {
            Some(handle) => world.body_mut(handle),
            None => None,
        };
        let Some(body) = body else {
            log::trace!(target: "controller", "tick skipped: {}", TickFault::MissingBody);
            return self.skipped(TickFault::MissingBody);
        };

        // 3: plan from the pre-write body state
        let body_rotation = body.rotation();
        let sources = HeadingSources {
            look_yaw: self.orientation.yaw(),
            body_rotation,
            smoothed,
        };
        let command = self.planner.plan(&input, &sources, body.linear_velocity());

        // 4: apply
        let rotation = self.body_rotation(&command, body_rotation, smoothed, dt);
        if let Some(rotation) = rotation {
            body.set_rotation(rotation, true);
        }
        body.set_linear_velocity(command.velocity, true);

        // 5: camera from the post-write transform
        let translation = body.translation();
        let camera = self.rig.update(translation, smoothed);

        let (locomotion, locomotion_changed) = self.update_locomotion(command.is_moving());

        TickReport {
            status: TickStatus::Applied,
            velocity: Some(command.velocity),
            rotation,
            camera: Some(camera),
            locomotion,
            locomotion_changed,
        }
    }

    fn drain_input(&mut self) -> InputState {
        match self.router.try_borrow_mut() {
            Ok(mut router) => {
                for delta in router.deltas_mut().drain() {
                    self.orientation.on_mouse_delta(delta.x, delta.y);
                }
                self.last_input = router.snapshot();
            }
            Err(_) => {
                log::warn!(target: "controller", "input router busy; reusing last input");
            }
        }
        self.last_input
    }

    /// Rotation to write this tick, or `None` to leave the body as it is.
    fn body_rotation(
        &self,
        command: &VelocityCommand,
        current: Quat,
        smoothed: Quat,
        dt: f32,
    ) -> Option<Quat> {
        match self.config.facing {
            FacingMode::FollowLook => Some(Quat::from_rotation_y(yaw_of(smoothed))),
            FacingMode::MovementHeading => {
                if !command.is_moving() {
                    return None;
                }
                let heading = (-command.horizontal.x).atan2(-command.horizontal.z);
                let target = Quat::from_rotation_y(heading);
                let t = self.config.smoothing.factor(dt);
                Some(current.normalize().slerp(target, t).normalize())
            }
        }
    }

    fn update_locomotion(&mut self, moving: bool) -> (Locomotion, bool) {
        let next = if moving {
            Locomotion::Moving
        } else {
            Locomotion::Idle
        };
        let changed = next != self.locomotion;
        if changed {
            log::debug!(target: "controller", "locomotion {:?} -> {next:?}", self.locomotion);
        }
        self.locomotion = next;
        (next, changed)
    }

    fn skipped(&mut self, fault: TickFault) -> TickReport {
        let (locomotion, locomotion_changed) = self.update_locomotion(false);
        TickReport {
            status: TickStatus::Skipped(fault),
            velocity: None,
            rotation: None,
            camera: None,
            locomotion,
            locomotion_changed,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Release pointer capture if held and unsubscribe from input.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn shutdown(&mut self) {
        match self.router.try_borrow_mut() {
            Ok(mut router) => router.release_capture(),
            Err(_) => log::warn!(target: "controller", "input router busy during shutdown"),
        }

        if let Some(id) = self.subscription.take() {
            match self.source.try_borrow_mut() {
                Ok(mut source) => {
                    source.unsubscribe(id);
                    log::debug!(target: "controller", "unsubscribed {id:?}");
                }
                // The listener is held weakly, so it still dies with us
                Err(_) => log::warn!(target: "controller", "input source busy; {id:?} left to expire"),
            }
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Clear every movement flag, for when the host loses focus and the
    /// matching key-ups will never be delivered.
    pub fn release_held_keys(&mut self) {
        match self.router.try_borrow_mut() {
            Ok(mut router) => router.reset_keys(),
            Err(_) => log::warn!(target: "controller", "input router busy; keys left held"),
        }
        self.last_input = InputState::default();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    /// Direct access for respawn and scripted turns.
    pub fn orientation_mut(&mut self) -> &mut OrientationController {
        &mut self.orientation
    }

    pub fn planner(&self) -> &MovementPlanner {
        &self.planner
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Camera pose from the most recent applied tick.
    pub fn camera_pose(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn locomotion(&self) -> Locomotion {
        self.locomotion
    }

    /// Current directional flags (not necessarily the ones the last tick read).
    pub fn input_state(&self) -> InputState {
        self.router
            .try_borrow()
            .map(|router| router.snapshot())
            .unwrap_or(self.last_input)
    }

    pub fn lock_state(&self) -> PointerLockState {
        self.router
            .try_borrow()
            .map(|router| router.lock_state())
            .unwrap_or_default()
    }

    /// Mouse deltas waiting for the next tick.
    pub fn pending_deltas(&self) -> usize {
        self.router
            .try_borrow()
            .map(|router| router.pending_deltas())
            .unwrap_or(0)
    }
}

impl Drop for CharacterController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureDenied;
    use crate::input::{ElementId, EventHub, InputEvent, KeyCode};
    use crate::physics::{KinematicBody, SimpleWorld};
    use std::cell::Cell;

    #[derive(Default)]
    struct TestHost {
        exits: Cell<u32>,
    }

    impl PointerHost for TestHost {
        fn request_pointer_lock(&self, _target: ElementId) -> Result<(), CaptureDenied> {
            Ok(())
        }

        fn exit_pointer_lock(&self) {
            self.exits.set(self.exits.get() + 1);
        }
    }

    struct Fixture {
        hub: Rc<RefCell<EventHub>>,
        host: Rc<TestHost>,
        world: SimpleWorld,
        controller: CharacterController,
    }

    impl Fixture {
        fn new(config: RigConfig) -> Self {
            let hub = Rc::new(RefCell::new(EventHub::new()));
            let host = Rc::new(TestHost::default());
            let controller = CharacterController::new(config, hub.clone(), host.clone()).unwrap();
            Self {
                hub,
                host,
                world: SimpleWorld::default(),
                controller,
            }
        }

        fn send(&self, event: InputEvent) {
            self.hub.borrow_mut().dispatch(&event);
        }

        fn lock(&self) {
            self.send(InputEvent::Click);
            self.send(InputEvent::PointerLockChange {
                element: Some(ElementId::default()),
            });
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let hub: Rc<RefCell<dyn InputSource>> = Rc::new(RefCell::new(EventHub::new()));
        let config = RigConfig {
            movement_speed: f32::NAN,
            ..Default::default()
        };
        let result = CharacterController::new(config, hub.clone(), Rc::new(TestHost::default()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert_eq!(hub.borrow().listener_count(), 0);
    }

    #[test]
    fn test_missing_body_skips_tick() {
        let mut fx = Fixture::new(RigConfig::default());
        fx.send(InputEvent::KeyDown(KeyCode::W));

        let report = fx.controller.tick(1.0 / 60.0, &mut fx.world);
        assert_eq!(report.status, TickStatus::Skipped(TickFault::MissingBody));
        assert!(report.velocity.is_none());
        assert!(report.camera.is_none());
        assert_eq!(report.locomotion, Locomotion::Idle);
    }

    #[test]
    fn test_stale_handle_is_missing_body() {
        let mut fx = Fixture::new(RigConfig::default());
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);
        fx.world.remove(handle);

        let report = fx.controller.tick(1.0 / 60.0, &mut fx.world);
        assert!(!report.applied());
    }

    #[test]
    fn test_detach_body() {
        let mut fx = Fixture::new(RigConfig::default());
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);
        assert!(fx.controller.tick(0.016, &mut fx.world).applied());

        assert_eq!(fx.controller.detach_body(), Some(handle));
        assert!(!fx.controller.tick(0.016, &mut fx.world).applied());
    }

    #[test]
    fn test_follow_look_rotation_is_yaw_only() {
        let config = RigConfig {
            smoothing: crate::camera::Smoothing::Fixed { factor: 1.0 },
            ..Default::default()
        };
        let mut fx = Fixture::new(config);
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);
        fx.lock();
        fx.send(InputEvent::MouseMove { dx: 100.0, dy: -80.0 });

        let report = fx.controller.tick(0.016, &mut fx.world);
        let rotation = report.rotation.unwrap();
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(-0.2), 1e-5));
        assert_eq!(fx.world.get(handle).unwrap().rotation, rotation);
    }

    #[test]
    fn test_movement_heading_faces_travel() {
        let config = RigConfig {
            facing: FacingMode::MovementHeading,
            smoothing: crate::camera::Smoothing::Fixed { factor: 1.0 },
            ..Default::default()
        };
        let mut fx = Fixture::new(config);
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);

        // Idle: rotation untouched
        let report = fx.controller.tick(0.016, &mut fx.world);
        assert!(report.rotation.is_none());

        fx.send(InputEvent::KeyDown(KeyCode::D));
        let report = fx.controller.tick(0.016, &mut fx.world);
        let rotation = report.rotation.unwrap();
        // Body -Z now points along +X travel
        assert!((rotation * Vec3::NEG_Z).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_locomotion_cue() {
        let mut fx = Fixture::new(RigConfig::default());
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);

        let report = fx.controller.tick(0.016, &mut fx.world);
        assert_eq!(report.locomotion, Locomotion::Idle);
        assert!(!report.locomotion_changed);

        fx.send(InputEvent::KeyDown(KeyCode::W));
        let report = fx.controller.tick(0.016, &mut fx.world);
        assert_eq!(report.locomotion, Locomotion::Moving);
        assert!(report.locomotion_changed);

        let report = fx.controller.tick(0.016, &mut fx.world);
        assert!(!report.locomotion_changed);

        fx.send(InputEvent::KeyUp(KeyCode::W));
        let report = fx.controller.tick(0.016, &mut fx.world);
        assert_eq!(report.locomotion, Locomotion::Idle);
        assert!(report.locomotion_changed);
    }

    #[test]
    fn test_bad_dt_treated_as_zero() {
        let mut fx = Fixture::new(RigConfig {
            smoothing: crate::camera::Smoothing::TimeScaled { rate: 10.0 },
            ..Default::default()
        });
        let handle = fx.world.insert(KinematicBody::default());
        fx.controller.attach_body(handle);
        fx.lock();
        fx.send(InputEvent::MouseMove { dx: 300.0, dy: 0.0 });

        let report = fx.controller.tick(f32::NAN, &mut fx.world);
        assert!(report.applied());
        // No time passed, so the smoothed orientation has not moved yet
        assert!(fx.controller.orientation().smoothed().abs_diff_eq(Quat::IDENTITY, 1e-6));
        assert!((fx.controller.orientation().yaw() + 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut fx = Fixture::new(RigConfig::default());
        fx.lock();
        assert_eq!(fx.controller.lock_state(), PointerLockState::Locked);

        fx.controller.shutdown();
        fx.controller.shutdown();
        assert_eq!(fx.host.exits.get(), 1);
        assert!(!fx.controller.is_subscribed());
        assert_eq!(fx.hub.borrow().listener_count(), 0);
    }
}
