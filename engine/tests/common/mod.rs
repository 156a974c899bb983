//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use avatar_rig_engine::error::CaptureDenied;
use avatar_rig_engine::input::{ElementId, EventHub, InputEvent, PointerHost};
use avatar_rig_engine::physics::{BodyHandle, KinematicBody, SimpleWorld};
use avatar_rig_engine::{CharacterController, RigConfig, TickReport};
use glam::Vec3;

/// Pointer host that records calls and grants or denies on demand.
#[derive(Default)]
pub struct TestHost {
    pub deny: Cell<bool>,
    pub requests: Cell<u32>,
    pub exits: Cell<u32>,
}

impl PointerHost for TestHost {
    fn request_pointer_lock(&self, _target: ElementId) -> Result<(), CaptureDenied> {
        self.requests.set(self.requests.get() + 1);
        if self.deny.get() {
            Err(CaptureDenied::new("denied by test host"))
        } else {
            Ok(())
        }
    }

    fn exit_pointer_lock(&self) {
        self.exits.set(self.exits.get() + 1);
    }
}

/// Controller wired to an event hub, a test host and a reference world.
pub struct Harness {
    pub hub: Rc<RefCell<EventHub>>,
    pub host: Rc<TestHost>,
    pub world: SimpleWorld,
    pub body: BodyHandle,
    pub controller: CharacterController,
}

impl Harness {
    pub fn new(config: RigConfig) -> Self {
        Self::with_body(config, KinematicBody::at(Vec3::ZERO))
    }

    pub fn with_body(config: RigConfig, body: KinematicBody) -> Self {
        let hub = Rc::new(RefCell::new(EventHub::new()));
        let host = Rc::new(TestHost::default());
        let mut world = SimpleWorld::default();
        let body = world.insert(body);
        let mut controller = CharacterController::new(config, hub.clone(), host.clone())
            .expect("valid config");
        controller.attach_body(body);
        Self {
            hub,
            host,
            world,
            body,
            controller,
        }
    }

    pub fn send(&self, event: InputEvent) -> usize {
        self.hub.borrow_mut().dispatch(&event)
    }

    /// Click, then confirm capture the way a host would.
    pub fn lock(&self) {
        self.send(InputEvent::Click);
        self.send(InputEvent::PointerLockChange {
            element: Some(self.controller.config().capture_target),
        });
    }

    /// Controller tick followed by a physics step.
    pub fn step(&mut self, dt: f32) -> TickReport {
        let report = self.controller.tick(dt, &mut self.world);
        self.world.step(dt);
        report
    }

    pub fn translation(&self) -> Vec3 {
        self.world.get(self.body).expect("body").translation
    }
}
