//! Rig Demo - Character Controller Host
//!
//! Run with: `cargo run --bin rig_demo [config.json]`
//!
//! Controls:
//! - WASD / Arrow keys: Move
//! - Click: Capture the mouse for looking around
//! - Mouse: Look (while captured)
//! - ESC: Release the mouse (press again to exit)
//!
//! Nothing is rendered; the window title shows the body and camera state.
//! Set `RUST_LOG=pointer_lock=debug,controller=debug` to watch transitions.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use avatar_rig_engine::error::CaptureDenied;
use avatar_rig_engine::input::{ElementId, EventHub, InputEvent, KeyCode, PointerHost};
use avatar_rig_engine::physics::{KinematicBody, SimpleWorld};
use avatar_rig_engine::{CharacterController, RigConfig};
use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

/// Seconds between window title refreshes
const TITLE_INTERVAL: f32 = 0.25;

/// Pointer capture backed by winit cursor grabbing.
///
/// winit grabs synchronously, so the host queues the change notification and
/// the app dispatches it after the current event has been handled.
#[derive(Default)]
struct WinitPointerHost {
    window: RefCell<Option<Arc<Window>>>,
    notifications: RefCell<VecDeque<Option<ElementId>>>,
    owner: RefCell<Option<ElementId>>,
}

impl WinitPointerHost {
    fn set_window(&self, window: Arc<Window>) {
        *self.window.borrow_mut() = Some(window);
    }

    fn next_notification(&self) -> Option<Option<ElementId>> {
        self.notifications.borrow_mut().pop_front()
    }

    fn is_captured(&self) -> bool {
        self.owner.borrow().is_some()
    }

    fn notify(&self, owner: Option<ElementId>) {
        *self.owner.borrow_mut() = owner;
        self.notifications.borrow_mut().push_back(owner);
    }
}

impl PointerHost for WinitPointerHost {
    fn request_pointer_lock(&self, target: ElementId) -> Result<(), CaptureDenied> {
        let window = self.window.borrow();
        let Some(window) = window.as_ref() else {
            return Err(CaptureDenied::new("no window"));
        };

        if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
            window
                .set_cursor_grab(CursorGrabMode::Confined)
                .map_err(|e| CaptureDenied::new(e.to_string()))?;
        }
        window.set_cursor_visible(false);
        self.notify(Some(target));
        Ok(())
    }

    fn exit_pointer_lock(&self) {
        if let Some(window) = self.window.borrow().as_ref() {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        if self.is_captured() {
            self.notify(None);
        }
    }
}

fn map_key(key: WinitKey) -> KeyCode {
    match key {
        WinitKey::KeyA => KeyCode::A,
        WinitKey::KeyB => KeyCode::B,
        WinitKey::KeyC => KeyCode::C,
        WinitKey::KeyD => KeyCode::D,
        WinitKey::KeyE => KeyCode::E,
        WinitKey::KeyF => KeyCode::F,
        WinitKey::KeyG => KeyCode::G,
        WinitKey::KeyH => KeyCode::H,
        WinitKey::KeyI => KeyCode::I,
        WinitKey::KeyJ => KeyCode::J,
        WinitKey::KeyK => KeyCode::K,
        WinitKey::KeyL => KeyCode::L,
        WinitKey::KeyM => KeyCode::M,
        WinitKey::KeyN => KeyCode::N,
        WinitKey::KeyO => KeyCode::O,
        WinitKey::KeyP => KeyCode::P,
        WinitKey::KeyQ => KeyCode::Q,
        WinitKey::KeyR => KeyCode::R,
        WinitKey::KeyS => KeyCode::S,
        WinitKey::KeyT => KeyCode::T,
        WinitKey::KeyU => KeyCode::U,
        WinitKey::KeyV => KeyCode::V,
        WinitKey::KeyW => KeyCode::W,
        WinitKey::KeyX => KeyCode::X,
        WinitKey::KeyY => KeyCode::Y,
        WinitKey::KeyZ => KeyCode::Z,
        WinitKey::ArrowUp => KeyCode::ArrowUp,
        WinitKey::ArrowDown => KeyCode::ArrowDown,
        WinitKey::ArrowLeft => KeyCode::ArrowLeft,
        WinitKey::ArrowRight => KeyCode::ArrowRight,
        WinitKey::Digit0 => KeyCode::Digit0,
        WinitKey::Digit1 => KeyCode::Digit1,
        WinitKey::Digit2 => KeyCode::Digit2,
        WinitKey::Digit3 => KeyCode::Digit3,
        WinitKey::Digit4 => KeyCode::Digit4,
        WinitKey::Digit5 => KeyCode::Digit5,
        WinitKey::Digit6 => KeyCode::Digit6,
        WinitKey::Digit7 => KeyCode::Digit7,
        WinitKey::Digit8 => KeyCode::Digit8,
        WinitKey::Digit9 => KeyCode::Digit9,
        WinitKey::Space => KeyCode::Space,
        WinitKey::ShiftLeft => KeyCode::ShiftLeft,
        WinitKey::ShiftRight => KeyCode::ShiftRight,
        WinitKey::ControlLeft => KeyCode::ControlLeft,
        WinitKey::ControlRight => KeyCode::ControlRight,
        WinitKey::Escape => KeyCode::Escape,
        WinitKey::Enter => KeyCode::Enter,
        WinitKey::Tab => KeyCode::Tab,
        _ => KeyCode::Unknown,
    }
}

struct RigDemoApp {
    window: Option<Arc<Window>>,
    hub: Rc<RefCell<EventHub>>,
    host: Rc<WinitPointerHost>,
    world: SimpleWorld,
    controller: CharacterController,
    last_frame: Instant,
    title_timer: f32,
}

impl RigDemoApp {
    fn new(config: RigConfig) -> Result<Self, avatar_rig_engine::ConfigError> {
        let hub = Rc::new(RefCell::new(EventHub::new()));
        let host = Rc::new(WinitPointerHost::default());
        let mut world = SimpleWorld::default();
        let body = world.insert(KinematicBody::at(Vec3::ZERO));

        let mut controller = CharacterController::new(config, hub.clone(), host.clone())?;
        controller.attach_body(body);

        Ok(Self {
            window: None,
            hub,
            host,
            world,
            controller,
            last_frame: Instant::now(),
            title_timer: 0.0,
        })
    }

    /// Deliver an event, then any capture changes it caused.
    fn dispatch(&mut self, event: InputEvent) {
        self.hub.borrow_mut().dispatch(&event);
        while let Some(owner) = self.host.next_notification() {
            self.hub
                .borrow_mut()
                .dispatch(&InputEvent::PointerLockChange { element: owner });
        }
    }

    /// Host-side revoke (ESC, focus loss), as a browser would do it.
    fn revoke_capture(&mut self) {
        self.host.exit_pointer_lock();
        while let Some(owner) = self.host.next_notification() {
            self.hub
                .borrow_mut()
                .dispatch(&InputEvent::PointerLockChange { element: owner });
        }
    }

    fn update(&mut self, dt: f32) {
        let report = self.controller.tick(dt, &mut self.world);
        self.world.step(dt);

        if report.locomotion_changed {
            log::info!("locomotion: {:?}", report.locomotion);
        }

        self.title_timer += dt;
        if self.title_timer < TITLE_INTERVAL {
            return;
        }
        self.title_timer = 0.0;

        if let (Some(window), Some(handle)) = (&self.window, self.controller.body()) {
            let Some(body) = self.world.get(handle) else {
                return;
            };
            let pose = self.controller.camera_pose();
            window.set_title(&format!(
                "Rig Demo | {:?} | body ({:.1}, {:.1}, {:.1}) | camera ({:.1}, {:.1}, {:.1}) | yaw {:.2}",
                self.controller.lock_state(),
                body.translation.x,
                body.translation.y,
                body.translation.z,
                pose.position.x,
                pose.position.y,
                pose.position.z,
                self.controller.orientation().yaw(),
            ));
        }
    }
}

impl ApplicationHandler for RigDemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = WindowAttributes::default()
            .with_title("Rig Demo [click to capture mouse]")
            .with_inner_size(PhysicalSize::new(1280, 720));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.host.set_window(window.clone());
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    if key == WinitKey::Escape && pressed {
                        if self.host.is_captured() {
                            self.revoke_capture();
                        } else {
                            event_loop.exit();
                        }
                        return;
                    }
                    let key = map_key(key);
                    self.dispatch(if pressed {
                        InputEvent::KeyDown(key)
                    } else {
                        InputEvent::KeyUp(key)
                    });
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.dispatch(InputEvent::Click);
            }
            WindowEvent::Focused(false) => {
                if self.host.is_captured() {
                    self.revoke_capture();
                }
                self.controller.release_held_keys();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;
                self.update(delta_time);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.dispatch(InputEvent::MouseMove {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let config = match std::env::args().nth(1) {
        Some(path) => RigConfig::load(Path::new(&path))?,
        None => RigConfig::default(),
    };

    println!("===========================================");
    println!("   Rig Demo - Character Controller");
    println!("===========================================");
    println!();
    println!("*** Click in the window to capture the mouse ***");
    println!("Controls: WASD/Arrows Move, Mouse Look, ESC Release/Exit");
    println!();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = RigDemoApp::new(config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
