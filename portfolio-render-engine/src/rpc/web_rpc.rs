use crate::engine::errors::{InputError, ViewportError};
use crate::engine::input::input_manager::{InputCommand, InputManager, InputMode};
use crate::engine::scroll::scroll_coordinator::ScrollCommand;
use crate::engine::viewport::commands::{ViewportCommand, ViewportRequest};
use crate::engine::viewport::kind::ViewportKind;
use crate::engine::viewport::viewport_scene::{ViewportLifecycle, ViewportRegistry, ViewportScene};
use crate::web::dom;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::paths::RPC_EVENT_NAME;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Answer a request. Requests sent as notifications (no id) get nothing.
    pub fn respond(
        &mut self,
        id: Option<serde_json::Value>,
        result: Result<serde_json::Value, RpcError>,
    ) {
        let Some(id) = id else {
            return;
        };

        let response = match result {
            Ok(value) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(value),
                error: None,
                id: Some(id),
            },
            Err(error) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: Some(id),
            },
        };
        self.queue_response(response);
    }

    /// Responses not yet sent to the page.
    #[cfg(test)]
    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }

    /// Notifications not yet sent to the page.
    #[cfg(test)]
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the WebRPC communication layer for the page.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(message_queue: Res<MessageQueue>) {
    // Thread-safe message queue for cross-thread communication.
    let queue_clone = message_queue.0.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Cheap format check before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
            return;
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource, Default, Clone)]
pub struct MessageQueue(pub Arc<Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

/// Engine-side targets an RPC method can reach.
#[derive(SystemParam)]
struct RpcTargets<'w, 's> {
    diagnostics: Option<Res<'w, DiagnosticsStore>>,
    registry: Res<'w, ViewportRegistry>,
    scenes: Query<'w, 's, &'static ViewportScene>,
    input: Res<'w, InputManager>,
    viewport_requests: EventWriter<'w, ViewportRequest>,
    input_commands: EventWriter<'w, InputCommand>,
    scroll_commands: EventWriter<'w, ScrollCommand>,
}

/// How a method was handled: answered on the spot, or forwarded to a
/// system that answers once it has acted.
enum Dispatch {
    Answer(Result<serde_json::Value, RpcError>),
    Forwarded,
}

fn process_incoming_messages(
    message_queue: Res<MessageQueue>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let messages = if let Ok(mut queue) = message_queue.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut targets: RpcTargets,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) if request.jsonrpc != "2.0" => {
                rpc_interface.respond(
                    request.id.clone(),
                    Err(RpcError::invalid_request("Expected jsonrpc \"2.0\"")),
                );
            }
            Ok(request) => {
                // Scroll offsets arrive every frame; keep them out of the debug feed.
                if request.method != "scroll" {
                    rpc_interface.send_notification(
                        "debug_message",
                        serde_json::json!({
                            "message": format!("Processing method: {}", request.method)
                        }),
                    );
                }

                if let Dispatch::Answer(result) = handle_rpc_request(&request, &mut targets) {
                    rpc_interface.respond(request.id.clone(), result);
                }
            }
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request based on method.
fn handle_rpc_request(request: &RpcRequest, targets: &mut RpcTargets) -> Dispatch {
    let id = request.id.clone();
    let params = &request.params;

    let result = match request.method.as_str() {
        "initialize_viewport" => viewport_kind(params)
            .map(|kind| forward_viewport(targets, ViewportCommand::Initialize { kind }, id)),
        "set_scroll_progress" => handle_set_scroll_progress(params)
            .map(|command| forward_viewport(targets, command, id)),
        "handle_resize" => {
            #[derive(Deserialize, Default)]
            struct ResizeParams {
                viewport: Option<String>,
            }
            let parsed = serde_json::from_value::<ResizeParams>(params.clone()).unwrap_or_default();
            Ok(forward_viewport(
                targets,
                ViewportCommand::Resize {
                    key: parsed.viewport,
                },
                id,
            ))
        }
        "dispose_viewport" => viewport_key(params)
            .map(|key| forward_viewport(targets, ViewportCommand::Dispose { key }, id)),
        "open_project" => project_id(params).map(|project| {
            forward_viewport(targets, ViewportCommand::OpenProject { project }, id)
        }),
        "close_project" => Ok(forward_viewport(targets, ViewportCommand::CloseProject, id)),
        "open_about" => Ok(forward_viewport(targets, ViewportCommand::OpenAbout, id)),
        "close_about" => Ok(forward_viewport(targets, ViewportCommand::CloseAbout, id)),
        "switch_input_mode" => handle_switch_input_mode(params, targets, id),
        "recalibrate" => {
            targets
                .input_commands
                .write(InputCommand::Recalibrate { request_id: id });
            Ok(Dispatch::Forwarded)
        }
        "scroll" => handle_scroll(params, targets),
        "configure_scroll" => handle_configure_scroll(params, targets),
        "get_viewports" => Ok(Dispatch::Answer(Ok(handle_get_viewports(targets)))),
        "get_fps" => Ok(Dispatch::Answer(handle_get_fps(targets.diagnostics.as_deref()))),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({"method": request.method})),
            })
        }
    };

    result.unwrap_or_else(|error| Dispatch::Answer(Err(error)))
}

fn forward_viewport(
    targets: &mut RpcTargets,
    command: ViewportCommand,
    request_id: Option<serde_json::Value>,
) -> Dispatch {
    targets.viewport_requests.write(ViewportRequest {
        command,
        request_id,
    });
    Dispatch::Forwarded
}

fn viewport_key(params: &serde_json::Value) -> Result<String, RpcError> {
    #[derive(Deserialize)]
    struct ViewportParams {
        viewport: String,
    }

    serde_json::from_value::<ViewportParams>(params.clone())
        .map(|p| p.viewport)
        .map_err(|_| RpcError::invalid_params("Expected 'viewport' parameter"))
}

fn viewport_kind(params: &serde_json::Value) -> Result<ViewportKind, RpcError> {
    let key = viewport_key(params)?;
    ViewportKind::from_key(&key)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown viewport: {}", key)))
}

/// Project ids are accepted as strings or numbers.
fn project_id(params: &serde_json::Value) -> Result<String, RpcError> {
    match params.get("project") {
        Some(serde_json::Value::String(id)) => Ok(id.clone()),
        Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
        _ => Err(RpcError::invalid_params("Expected 'project' parameter")),
    }
}

fn handle_set_scroll_progress(params: &serde_json::Value) -> Result<ViewportCommand, RpcError> {
    #[derive(Deserialize)]
    struct ProgressParams {
        viewport: String,
        value: f32,
    }

    let parsed = serde_json::from_value::<ProgressParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'viewport' and 'value' parameters"))?;

    Ok(ViewportCommand::SetProgress {
        key: parsed.viewport,
        value: parsed.value,
    })
}

fn handle_switch_input_mode(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
    request_id: Option<serde_json::Value>,
) -> Result<Dispatch, RpcError> {
    #[derive(Deserialize)]
    struct ModeParams {
        mode: String,
    }

    let parsed = serde_json::from_value::<ModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;

    let mode = InputMode::from_string(&parsed.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown input mode: {}", parsed.mode)))?;

    targets
        .input_commands
        .write(InputCommand::SwitchMode { mode, request_id });
    Ok(Dispatch::Forwarded)
}

fn handle_scroll(params: &serde_json::Value, targets: &mut RpcTargets) -> Result<Dispatch, RpcError> {
    let offset = params
        .get("offset")
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .ok_or_else(|| RpcError::invalid_params("Expected numeric 'offset' parameter"))?;

    targets
        .scroll_commands
        .write(ScrollCommand::Offset(offset as f32));
    Ok(Dispatch::Answer(Ok(serde_json::json!({ "success": true }))))
}

fn handle_configure_scroll(
    params: &serde_json::Value,
    targets: &mut RpcTargets,
) -> Result<Dispatch, RpcError> {
    #[derive(Deserialize)]
    struct ScrollParams {
        smoothing: Option<bool>,
        duration: Option<f32>,
    }

    let parsed = serde_json::from_value::<ScrollParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'smoothing' and/or 'duration'"))?;

    targets.scroll_commands.write(ScrollCommand::Configure {
        smoothing: parsed.smoothing,
        duration: parsed.duration,
    });
    Ok(Dispatch::Answer(Ok(serde_json::json!({ "success": true }))))
}

fn handle_get_viewports(targets: &RpcTargets) -> serde_json::Value {
    let viewports: Vec<serde_json::Value> = targets
        .registry
        .keys()
        .into_iter()
        .filter_map(|key| {
            let scene = targets.scenes.get(targets.registry.get(&key)?).ok()?;
            Some(serde_json::json!({
                "viewport": key,
                "profile": scene.profile.name,
                "state": lifecycle_name(scene.lifecycle()),
                "nodes": scene.nodes().len(),
                "progress": scene.progress(),
                "frames": targets.registry.frames_rendered(&key),
            }))
        })
        .collect();

    serde_json::json!({
        "viewports": viewports,
        "input_mode": targets.input.mode().as_str(),
        "gyro_calibrated": targets.input.gyro.is_calibrated(),
    })
}

fn lifecycle_name(lifecycle: ViewportLifecycle) -> &'static str {
    match lifecycle {
        ViewportLifecycle::Uninitialized => "uninitialized",
        ViewportLifecycle::Running => "running",
        ViewportLifecycle::Disposed => "disposed",
    }
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: Option<&DiagnosticsStore>) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .and_then(|store| store.get(&FrameTimeDiagnosticsPlugin::FPS))
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_page(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_page(&response);
    }
}

/// Dispatch a serialized message as a page event.
fn send_message_to_page<T: Serialize>(message: &T) {
    match serde_json::to_string(message) {
        Ok(json) => dom::dispatch_json_event(RPC_EVENT_NAME, &json),
        Err(e) => error!("Failed to serialize message: {}", e),
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    /// The engine understood the request but refused it.
    pub fn refused(message: &str) -> Self {
        Self {
            code: -32000,
            message: message.to_string(),
            data: None,
        }
    }
}

impl From<InputError> for RpcError {
    fn from(error: InputError) -> Self {
        Self::refused(&error.to_string())
    }
}

impl From<ViewportError> for RpcError {
    fn from(error: ViewportError) -> Self {
        let key = match &error {
            ViewportError::UnknownKey(key)
            | ViewportError::NotRunning(key)
            | ViewportError::AlreadyRunning(key)
            | ViewportError::CanvasMissing(key) => key.clone(),
        };
        Self {
            data: Some(serde_json::json!({ "target": key })),
            ..Self::refused(&error.to_string())
        }
    }
}
