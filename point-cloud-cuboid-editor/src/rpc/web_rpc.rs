use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::camera::view_camera::ViewCameraController;
use crate::engine::cuboid::{CuboidGeometry, CuboidId};
use crate::engine::view::ViewAxis;
use crate::tools::selection::{SelectCuboid, SelectionSource};
use crate::tools::transform::{CuboidPoseChanged, TransformInteraction};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

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

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Outgoing message queues, flushed once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// Plugin establishing the host bridge. Requires the editor core plugin.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    forward_editor_notifications,
                    send_outgoing_messages,
                )
                    .chain()
                    .after(crate::tools::CuboidEditorSet::Edit),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::{Arc, Mutex};

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message: String = data.into();
            if message.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(err) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", err);
        }
    }

    // JS owns the closure from here on.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Messages received by the wasm listener, drained every frame.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event, Debug, Clone)]
pub(crate) struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue) = message_queue else {
        return;
    };
    let messages = match queue.0.lock() {
        Ok(mut pending) => std::mem::take(&mut *pending),
        Err(_) => Vec::new(),
    };
    for content in messages {
        message_events.write(IncomingRpcMessage { content });
    }
}

/// Everything a request handler may touch.
#[derive(SystemParam)]
pub struct EditorRpcContext<'w, 's> {
    geometry: CuboidGeometry<'w, 's>,
    selections: EventWriter<'w, SelectCuboid>,
    views: Query<'w, 's, (&'static mut ViewCameraController, &'static mut TransformInteraction)>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut context: EditorRpcContext,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("RPC request: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &mut context) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => warn!("Discarding malformed RPC message: {parse_error}"),
        }
    }
}

/// Runs one request. Requests without an id are notifications and get no response.
pub(crate) fn handle_rpc_request(
    request: &RpcRequest,
    context: &mut EditorRpcContext,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "select_cuboid" => handle_select_cuboid(&request.params, context),
        "deselect" => {
            context
                .selections
                .write(SelectCuboid::clear(SelectionSource::Rpc));
            Ok(serde_json::json!({ "success": true }))
        }
        "get_cuboid_pose" => handle_get_cuboid_pose(&request.params, context),
        "list_cuboids" => {
            let mut ids: Vec<String> = context.geometry.handles().into_iter().map(|h| h.id.0).collect();
            ids.sort();
            Ok(serde_json::json!({ "ids": ids }))
        }
        "set_view_enabled" => handle_set_view_enabled(&request.params, context),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let id = request.id.clone()?;
    Some(match result {
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
    })
}

#[derive(Deserialize)]
struct CuboidIdParams {
    id: String,
}

fn parse_cuboid_id(params: &serde_json::Value) -> Result<CuboidId, RpcError> {
    serde_json::from_value::<CuboidIdParams>(params.clone())
        .map(|p| CuboidId(p.id))
        .map_err(|_| RpcError::invalid_params("Expected 'id' parameter"))
}

fn handle_select_cuboid(
    params: &serde_json::Value,
    context: &mut EditorRpcContext,
) -> Result<serde_json::Value, RpcError> {
    let id = parse_cuboid_id(params)?;
    let handle = context
        .geometry
        .find(&id)
        .filter(|handle| context.geometry.is_valid_cuboid(handle.entity))
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown cuboid: {id}")))?;

    context
        .selections
        .write(SelectCuboid::select(handle, SelectionSource::Rpc));
    Ok(serde_json::json!({ "success": true, "id": id.0 }))
}

fn handle_get_cuboid_pose(
    params: &serde_json::Value,
    context: &mut EditorRpcContext,
) -> Result<serde_json::Value, RpcError> {
    let id = parse_cuboid_id(params)?;
    let pose = context
        .geometry
        .find(&id)
        .and_then(|handle| context.geometry.pose(handle.entity).ok())
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown cuboid: {id}")))?;

    Ok(serde_json::json!({ "id": id.0, "pose": pose.to_array() }))
}

fn handle_set_view_enabled(
    params: &serde_json::Value,
    context: &mut EditorRpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetViewEnabledParams {
        view: String,
        enabled: bool,
    }

    let parsed = serde_json::from_value::<SetViewEnabledParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'view' and 'enabled' parameters"))?;
    let axis = ViewAxis::from_string(&parsed.view)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown view: {}", parsed.view)))?;

    for (mut controller, mut interaction) in &mut context.views {
        if controller.view() == axis {
            controller.set_enabled(parsed.enabled);
            interaction.set_enabled(parsed.enabled);
        }
    }
    info!("{axis} view enabled: {}", parsed.enabled);

    Ok(serde_json::json!({ "view": axis, "enabled": parsed.enabled }))
}

/// Pushes drag steps and selection changes to the host page.
fn forward_editor_notifications(
    mut pose_changes: EventReader<CuboidPoseChanged>,
    mut selections: EventReader<SelectCuboid>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for change in pose_changes.read() {
        rpc_interface.send_notification(
            "cuboid_pose_changed",
            serde_json::json!({ "id": change.handle.id.0, "pose": change.pose }),
        );
    }
    for selection in selections.read() {
        let id = selection.cuboid.as_ref().map(|handle| handle.id.0.clone());
        rpc_interface.send_notification("selection_changed", serde_json::json!({ "id": id }));
    }
}

fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => match window().and_then(|w| w.parent().ok().flatten()) {
                Some(parent) => {
                    if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                        error!("Failed to send message to parent: {:?}", e);
                    }
                }
                None => warn!("No parent window available for message transmission"),
            },
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}
