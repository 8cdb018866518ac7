use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use super::gyro::{GyroController, OrientationReading};
use super::pointer::GlobalPointer;
use super::touch::ViewportTouch;
use crate::engine::errors::InputError;
use crate::engine::viewport::node::{MotionDrive, NodeMotion};
use crate::engine::viewport::profile::PointerTracking;
use crate::engine::viewport::viewport_scene::ViewportScene;
use crate::rpc::web_rpc::{RpcError, WebRpcInterface};
use constants::input::GYRO_SMOOTHING;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Touch,
    Gyroscope,
}

impl InputMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "touch" => Some(Self::Touch),
            "gyroscope" | "gyro" => Some(Self::Gyroscope),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Touch => "touch",
            Self::Gyroscope => "gyroscope",
        }
    }
}

/// Result of asking the browser for device orientation access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModeRequest {
    Unchanged,
    Switched,
    /// The switch completes once the permission outcome arrives.
    AwaitingPermission,
}

/// Owns the active input mode. Exactly one adapter is live at a time.
#[derive(Resource, Debug, Default)]
pub struct InputManager {
    mode: InputMode,
    pub gyro: GyroController,
    /// RPC id of the request waiting on a permission prompt.
    awaiting_permission: Option<Option<serde_json::Value>>,
}

impl InputManager {
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn is_awaiting_permission(&self) -> bool {
        self.awaiting_permission.is_some()
    }

    pub fn request_mode(
        &mut self,
        mode: InputMode,
        request_id: Option<serde_json::Value>,
    ) -> Result<ModeRequest, InputError> {
        if self.awaiting_permission.is_some() {
            return Err(InputError::SwitchPending);
        }
        if mode == self.mode {
            return Ok(ModeRequest::Unchanged);
        }

        match mode {
            InputMode::Touch => {
                self.gyro.disable();
                self.mode = InputMode::Touch;
                Ok(ModeRequest::Switched)
            }
            InputMode::Gyroscope => {
                self.awaiting_permission = Some(request_id);
                Ok(ModeRequest::AwaitingPermission)
            }
        }
    }

    /// Finish a pending gyroscope switch. Anything but a grant keeps touch.
    pub fn complete_permission(
        &mut self,
        outcome: PermissionOutcome,
    ) -> (Result<InputMode, InputError>, Option<serde_json::Value>) {
        let request_id = self.awaiting_permission.take().flatten();

        let result = match outcome {
            PermissionOutcome::Granted => {
                self.gyro.enable();
                self.mode = InputMode::Gyroscope;
                Ok(InputMode::Gyroscope)
            }
            PermissionOutcome::Denied => Err(InputError::PermissionDenied),
            PermissionOutcome::Unsupported => Err(InputError::Unsupported),
        };

        (result, request_id)
    }

    pub fn recalibrate(&mut self) -> Result<(), InputError> {
        if self.mode != InputMode::Gyroscope || !self.gyro.is_active() {
            return Err(InputError::NotInGyroMode);
        }
        self.gyro.calibrate();
        Ok(())
    }
}

#[derive(Event, Debug, Clone)]
pub enum InputCommand {
    SwitchMode {
        mode: InputMode,
        request_id: Option<serde_json::Value>,
    },
    Recalibrate {
        request_id: Option<serde_json::Value>,
    },
}

/// Emitted after the active mode actually changed.
#[derive(Event, Debug, Clone, Copy)]
pub struct InputModeChanged(pub InputMode);

#[derive(Resource, Default, Clone)]
pub struct PermissionQueue(pub Arc<Mutex<Vec<PermissionOutcome>>>);

#[derive(Resource, Default, Clone)]
pub struct OrientationQueue(pub Arc<Mutex<Vec<OrientationReading>>>);

pub fn handle_input_commands(
    mut commands_in: EventReader<InputCommand>,
    mut manager: ResMut<InputManager>,
    permissions: Res<PermissionQueue>,
    mut changed: EventWriter<InputModeChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for command in commands_in.read() {
        match command {
            InputCommand::SwitchMode { mode, request_id } => {
                match manager.request_mode(*mode, request_id.clone()) {
                    Ok(ModeRequest::Unchanged) => {
                        rpc_interface.respond(request_id.clone(), Ok(mode_result(*mode)));
                    }
                    Ok(ModeRequest::Switched) => {
                        info!("Input mode switched to {}", mode.as_str());
                        changed.write(InputModeChanged(*mode));
                        rpc_interface.respond(request_id.clone(), Ok(mode_result(*mode)));
                    }
                    Ok(ModeRequest::AwaitingPermission) => {
                        debug!("Requesting device orientation permission");
                        request_orientation_permission(&permissions);
                    }
                    Err(e) => {
                        warn!("Input mode switch refused: {}", e);
                        rpc_interface.respond(request_id.clone(), Err(RpcError::from(e)));
                    }
                }
            }
            InputCommand::Recalibrate { request_id } => {
                let result = manager
                    .recalibrate()
                    .map(|_| serde_json::json!({ "success": true }))
                    .map_err(RpcError::from);
                rpc_interface.respond(request_id.clone(), result);
            }
        }
    }
}

/// Apply permission outcomes that arrived since the last frame.
pub fn complete_permission_requests(
    permissions: Res<PermissionQueue>,
    orientation: Res<OrientationQueue>,
    mut manager: ResMut<InputManager>,
    mut changed: EventWriter<InputModeChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let outcomes = if let Ok(mut queue) = permissions.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for outcome in outcomes {
        if !manager.is_awaiting_permission() {
            continue;
        }

        let (result, request_id) = manager.complete_permission(outcome);
        match result {
            Ok(mode) => {
                attach_orientation_listener(&orientation);
                info!("Input mode switched to {}", mode.as_str());
                changed.write(InputModeChanged(mode));
                rpc_interface.respond(request_id, Ok(mode_result(mode)));
            }
            Err(e) => {
                warn!("Staying in touch mode: {}", e);
                rpc_interface.respond(request_id, Err(RpcError::from(e)));
            }
        }
    }
}

pub fn drain_orientation_readings(
    orientation: Res<OrientationQueue>,
    mut manager: ResMut<InputManager>,
) {
    let readings = if let Ok(mut queue) = orientation.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for reading in readings {
        manager.gyro.on_reading(reading);
    }
}

/// Reset the adapter that just went inactive and tell the page.
pub fn reset_inactive_adapters(
    mut changed: EventReader<InputModeChanged>,
    mut touches: Query<&mut ViewportTouch>,
    mut motions: Query<&mut NodeMotion>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for InputModeChanged(mode) in changed.read() {
        match mode {
            InputMode::Touch => detach_orientation_listener(),
            InputMode::Gyroscope => {
                for mut touch in &mut touches {
                    touch.reset();
                }
                for mut motion in &mut motions {
                    motion.reset_manual_offset();
                }
            }
        }

        rpc_interface.send_notification(
            "input_mode_changed",
            serde_json::json!({ "mode": mode.as_str() }),
        );
    }
}

/// Per-frame rotation update for every running viewport's nodes.
pub fn apply_input_motion(
    manager: Res<InputManager>,
    global_pointer: Res<GlobalPointer>,
    windows: Query<&Window>,
    mut scenes: Query<(&ViewportScene, Option<&mut ViewportTouch>)>,
    mut motions: Query<&mut NodeMotion>,
) {
    for (scene, touch) in &mut scenes {
        if !scene.is_running() {
            continue;
        }

        let profile = scene.profile;
        let canvas = windows
            .get(scene.window)
            .map(|w| Vec2::new(w.width(), w.height()))
            .unwrap_or(Vec2::ZERO);

        let mut touch_delta = Vec2::ZERO;
        if profile.handheld && manager.mode() == InputMode::Touch {
            if let Some(mut touch) = touch {
                touch_delta = touch.controller.frame_delta(canvas);
            }
        }

        let drive = if profile.handheld && manager.mode() == InputMode::Gyroscope {
            manager
                .gyro
                .rotation_offset()
                .map(|offset| MotionDrive::Toward {
                    offset,
                    smoothing: GYRO_SMOOTHING,
                })
                .unwrap_or(MotionDrive::Hold)
        } else {
            match profile.tracking {
                PointerTracking::Disabled => MotionDrive::Hold,
                PointerTracking::WhileHovered if !scene.hovered => MotionDrive::Hold,
                PointerTracking::WhileHovered => MotionDrive::Toward {
                    offset: profile.pointer_offset(scene.pointer()),
                    smoothing: profile.smoothing,
                },
                PointerTracking::Anywhere => MotionDrive::Toward {
                    offset: profile.pointer_offset(global_pointer.0),
                    smoothing: profile.smoothing,
                },
            }
        };

        for &node in scene.nodes() {
            if let Ok(mut motion) = motions.get_mut(node) {
                motion.step(drive, touch_delta, profile.idle_spin);
            }
        }
    }
}

fn mode_result(mode: InputMode) -> serde_json::Value {
    serde_json::json!({ "success": true, "mode": mode.as_str() })
}

#[cfg(target_arch = "wasm32")]
fn request_orientation_permission(permissions: &PermissionQueue) {
    let queue = permissions.0.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = web_orientation::request_permission().await;
        if let Ok(mut queue) = queue.lock() {
            queue.push(outcome);
        }
    });
}

/// Native builds have no orientation sensor.
#[cfg(not(target_arch = "wasm32"))]
fn request_orientation_permission(permissions: &PermissionQueue) {
    if let Ok(mut queue) = permissions.0.lock() {
        queue.push(PermissionOutcome::Unsupported);
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_orientation_listener(orientation: &OrientationQueue) {
    web_orientation::attach(orientation.0.clone());
}

#[cfg(not(target_arch = "wasm32"))]
fn attach_orientation_listener(_orientation: &OrientationQueue) {}

#[cfg(target_arch = "wasm32")]
fn detach_orientation_listener() {
    web_orientation::detach();
}

#[cfg(not(target_arch = "wasm32"))]
fn detach_orientation_listener() {}

#[cfg(target_arch = "wasm32")]
mod web_orientation {
    use super::{OrientationReading, PermissionOutcome};
    use bevy::prelude::*;
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{DeviceOrientationEvent, window};

    type OrientationClosure = Closure<dyn FnMut(DeviceOrientationEvent)>;

    thread_local! {
        static LISTENER: RefCell<Option<OrientationClosure>> = const { RefCell::new(None) };
    }

    /// Runs `DeviceOrientationEvent.requestPermission()` where the browser
    /// has it; browsers without it grant access implicitly.
    pub async fn request_permission() -> PermissionOutcome {
        let Some(window) = window() else {
            return PermissionOutcome::Unsupported;
        };

        let constructor = match js_sys::Reflect::get(&window, &JsValue::from_str("DeviceOrientationEvent")) {
            Ok(value) if !value.is_undefined() => value,
            _ => return PermissionOutcome::Unsupported,
        };

        let request = js_sys::Reflect::get(&constructor, &JsValue::from_str("requestPermission"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let Some(request) = request else {
            return PermissionOutcome::Granted;
        };

        let promise = match request.call0(&constructor) {
            Ok(value) => value,
            Err(e) => {
                warn!("requestPermission threw: {:?}", e);
                return PermissionOutcome::Denied;
            }
        };
        let Ok(promise) = promise.dyn_into::<js_sys::Promise>() else {
            return PermissionOutcome::Denied;
        };

        match JsFuture::from(promise).await {
            Ok(state) if state.as_string().as_deref() == Some("granted") => {
                PermissionOutcome::Granted
            }
            Ok(_) => PermissionOutcome::Denied,
            Err(e) => {
                warn!("Device orientation permission request failed: {:?}", e);
                PermissionOutcome::Denied
            }
        }
    }

    pub fn attach(queue: Arc<Mutex<Vec<OrientationReading>>>) {
        LISTENER.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return;
            }
            let Some(window) = window() else {
                return;
            };

            let closure = Closure::wrap(Box::new(move |event: DeviceOrientationEvent| {
                let reading = OrientationReading {
                    alpha: event.alpha().unwrap_or(0.0) as f32,
                    beta: event.beta().unwrap_or(0.0) as f32,
                    gamma: event.gamma().unwrap_or(0.0) as f32,
                };
                if let Ok(mut queue) = queue.lock() {
                    queue.push(reading);
                }
            }) as Box<dyn FnMut(DeviceOrientationEvent)>);

            if let Err(e) = window
                .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
            {
                warn!("Failed to register deviceorientation listener: {:?}", e);
                return;
            }
            *slot = Some(closure);
        });
    }

    pub fn detach() {
        LISTENER.with(|slot| {
            let Some(closure) = slot.borrow_mut().take() else {
                return;
            };
            if let Some(window) = window() {
                let _ = window.remove_event_listener_with_callback(
                    "deviceorientation",
                    closure.as_ref().unchecked_ref(),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_permission_keeps_touch_mode() {
        let mut manager = InputManager::default();
        let request_id = Some(serde_json::json!(7));

        assert_eq!(
            manager.request_mode(InputMode::Gyroscope, request_id.clone()),
            Ok(ModeRequest::AwaitingPermission)
        );
        let (result, id) = manager.complete_permission(PermissionOutcome::Denied);

        assert_eq!(result, Err(InputError::PermissionDenied));
        assert_eq!(id, request_id);
        assert_eq!(manager.mode(), InputMode::Touch);
        assert!(!manager.gyro.is_active());
        assert!(!manager.is_awaiting_permission());
    }

    #[test]
    fn unsupported_device_reports_failure() {
        let mut manager = InputManager::default();
        manager.request_mode(InputMode::Gyroscope, None).unwrap();
        let (result, _) = manager.complete_permission(PermissionOutcome::Unsupported);
        assert_eq!(result, Err(InputError::Unsupported));
        assert_eq!(manager.mode(), InputMode::Touch);
    }

    #[test]
    fn granted_permission_switches_and_back_again() {
        let mut manager = InputManager::default();
        manager.request_mode(InputMode::Gyroscope, None).unwrap();
        let (result, _) = manager.complete_permission(PermissionOutcome::Granted);

        assert_eq!(result, Ok(InputMode::Gyroscope));
        assert!(manager.gyro.is_active());
        assert_eq!(manager.recalibrate(), Ok(()));

        assert_eq!(manager.request_mode(InputMode::Touch, None), Ok(ModeRequest::Switched));
        assert_eq!(manager.mode(), InputMode::Touch);
        assert!(!manager.gyro.is_active());
    }

    #[test]
    fn requests_are_refused_while_a_prompt_is_open() {
        let mut manager = InputManager::default();
        manager.request_mode(InputMode::Gyroscope, None).unwrap();
        assert_eq!(
            manager.request_mode(InputMode::Touch, None),
            Err(InputError::SwitchPending)
        );
    }

    #[test]
    fn recalibrate_requires_gyroscope_mode() {
        let mut manager = InputManager::default();
        assert_eq!(manager.recalibrate(), Err(InputError::NotInGyroMode));
        assert_eq!(
            manager.request_mode(InputMode::Touch, None),
            Ok(ModeRequest::Unchanged)
        );
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(InputMode::from_string("gyroscope"), Some(InputMode::Gyroscope));
        assert_eq!(InputMode::from_string("touch"), Some(InputMode::Touch));
        assert_eq!(InputMode::from_string("mouse"), None);
    }

    #[test]
    fn denied_switch_through_the_app_answers_with_an_error() {
        let mut app = App::new();
        app.init_resource::<InputManager>()
            .init_resource::<PermissionQueue>()
            .init_resource::<OrientationQueue>()
            .init_resource::<WebRpcInterface>()
            .add_event::<InputCommand>()
            .add_event::<InputModeChanged>()
            .add_systems(
                Update,
                (handle_input_commands, complete_permission_requests).chain(),
            );

        app.world_mut().send_event(InputCommand::SwitchMode {
            mode: InputMode::Gyroscope,
            request_id: Some(serde_json::json!(1)),
        });
        app.update();

        // Native builds answer the prompt with "unsupported" immediately.
        let world = app.world();
        assert_eq!(world.resource::<InputManager>().mode(), InputMode::Touch);
        let responses = world.resource::<WebRpcInterface>().pending_responses();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].error.is_some());
        assert_eq!(responses[0].id, Some(serde_json::json!(1)));
    }
}
