use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::engine::viewport::viewport_scene::ViewportRegistry;
use crate::rpc::web_rpc::WebRpcInterface;

const FPS_REPORT_INTERVAL_SECS: f32 = 0.5;

pub fn fps_notification_system(
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    registry: Res<ViewportRegistry>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    if current_time - *last_send_time < FPS_REPORT_INTERVAL_SECS {
        return;
    }

    if let Some(value) = smoothed_fps(&diagnostics) {
        rpc_interface.send_notification(
            "fps_update",
            serde_json::json!({
                "fps": value,
                "viewports": registry.keys().len(),
            }),
        );
        *last_send_time = current_time;
    }
}

/// Native builds have no page to show the counter, so it goes to the log.
#[cfg(not(target_arch = "wasm32"))]
pub fn fps_log_system(
    diagnostics: Res<DiagnosticsStore>,
    registry: Res<ViewportRegistry>,
    mut last_log_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();
    if current_time - *last_log_time < 5.0 {
        return;
    }

    if let Some(value) = smoothed_fps(&diagnostics) {
        debug!("FPS: {:.1} across {} viewports", value, registry.keys().len());
        *last_log_time = current_time;
    }
}

fn smoothed_fps(diagnostics: &DiagnosticsStore) -> Option<f32> {
    diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .map(|value| value as f32)
}
