use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::gallery::apply_gallery_progress;
use super::kind::ViewportKind;
use super::node::{apply_node_opacity, compose_node_transforms};
use super::overlay::OverlayState;
use super::resize::{
    PageResizeQueue, PendingResizes, drain_page_resizes, resize_scene, run_pending_resizes,
};
use super::spawn::{
    CanvasWindows, acquire_canvas_window, dispose_viewport, register_primary_canvas,
    spawn_viewport, sync_camera_distance,
};
use super::viewport_scene::{
    RenderLayerAllocator, ViewportRegistry, ViewportScene, count_viewport_frames,
};
use crate::engine::assets::model_registry::ModelRegistry;
use crate::engine::core::app_state::AppState;
use crate::engine::errors::ViewportError;
use crate::engine::loading::model_loader::{
    ModelSettled, attach_settled_models, finalize_model_scene, poll_model_fetches,
    report_load_summaries,
};
use crate::rpc::web_rpc::{RpcError, WebRpcInterface};
use crate::web::dom;
use constants::render_settings::{AMBIENT_BRIGHTNESS_PER_UNIT, AMBIENT_LEVEL, OVERLAY_RESIZE_DELAY_SECS};

/// Something the page asked a viewport to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCommand {
    Initialize { kind: ViewportKind },
    SetProgress { key: String, value: f32 },
    /// `None` resizes every running viewport.
    Resize { key: Option<String> },
    Dispose { key: String },
    OpenProject { project: String },
    CloseProject,
    OpenAbout,
    CloseAbout,
}

/// A command plus the RPC id to answer, if any.
#[derive(Event, Debug, Clone)]
pub struct ViewportRequest {
    pub command: ViewportCommand,
    pub request_id: Option<serde_json::Value>,
}

impl ViewportRequest {
    pub fn unanswered(command: ViewportCommand) -> Self {
        Self {
            command,
            request_id: None,
        }
    }
}

/// Requests held until the registry is resolved.
#[derive(Resource, Debug, Default)]
pub struct ViewportBacklog(pub Vec<ViewportRequest>);

/// Everything a viewport command needs to create, change or tear down scenes.
#[derive(SystemParam)]
pub struct ViewportContext<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub asset_server: Res<'w, AssetServer>,
    pub models: Res<'w, ModelRegistry>,
    pub registry: ResMut<'w, ViewportRegistry>,
    pub layers: ResMut<'w, RenderLayerAllocator>,
    pub canvases: ResMut<'w, CanvasWindows>,
    pub resizes: ResMut<'w, PendingResizes>,
    pub overlays: ResMut<'w, OverlayState>,
    pub scenes: Query<'w, 's, &'static mut ViewportScene>,
    pub windows: Query<'w, 's, &'static mut Window>,
}

impl ViewportContext<'_, '_> {
    pub fn initialize(&mut self, kind: ViewportKind) -> Result<serde_json::Value, ViewportError> {
        let key = kind.key();
        if self.registry.contains(&key) {
            return Err(ViewportError::AlreadyRunning(key));
        }

        let window =
            acquire_canvas_window(&mut self.commands, &mut self.canvases, &kind.canvas_selector())?;
        let descriptors = kind.select_models(&self.models);
        let delay = if kind.is_overlay() {
            OVERLAY_RESIZE_DELAY_SECS
        } else {
            0.0
        };

        spawn_viewport(
            &mut self.commands,
            &self.asset_server,
            &mut self.layers,
            &mut self.registry,
            window,
            kind,
            &descriptors,
        );
        self.resizes.schedule(&key, delay);

        Ok(serde_json::json!({
            "viewport": key,
            "models": descriptors.len(),
        }))
    }

    pub fn set_progress(&mut self, key: &str, value: f32) -> Result<serde_json::Value, ViewportError> {
        let mut scene = self.scene_mut(key)?;
        if !scene.set_progress(value) {
            return Err(ViewportError::NotRunning(key.to_string()));
        }
        Ok(serde_json::json!({
            "viewport": key,
            "progress": scene.progress(),
        }))
    }

    pub fn resize(&mut self, key: Option<&str>) -> Result<serde_json::Value, ViewportError> {
        let targets: Vec<Entity> = match key {
            Some(key) => vec![
                self.registry
                    .get(key)
                    .ok_or_else(|| ViewportError::UnknownKey(key.to_string()))?,
            ],
            None => self
                .registry
                .keys()
                .iter()
                .filter_map(|k| self.registry.get(k))
                .collect(),
        };

        let mut resized = 0;
        for entity in targets {
            if let Ok(scene) = self.scenes.get(entity) {
                if resize_scene(scene, &mut self.windows) {
                    resized += 1;
                }
            }
        }
        Ok(serde_json::json!({ "resized": resized }))
    }

    pub fn dispose(&mut self, key: &str) -> Result<usize, ViewportError> {
        dispose_viewport(
            &mut self.commands,
            &mut self.registry,
            &mut self.layers,
            &mut self.scenes,
            key,
        )
    }

    fn scene_mut(&mut self, key: &str) -> Result<Mut<'_, ViewportScene>, ViewportError> {
        let entity = self
            .registry
            .get(key)
            .ok_or_else(|| ViewportError::UnknownKey(key.to_string()))?;
        // Spawned this frame, not yet started.
        self.scenes
            .get_mut(entity)
            .map_err(|_| ViewportError::NotRunning(key.to_string()))
    }
}

pub fn buffer_viewport_requests(
    mut requests: EventReader<ViewportRequest>,
    mut backlog: ResMut<ViewportBacklog>,
) {
    backlog.0.extend(requests.read().cloned());
}

pub fn run_viewport_requests(
    mut backlog: ResMut<ViewportBacklog>,
    mut context: ViewportContext,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for request in std::mem::take(&mut backlog.0) {
        let result = match &request.command {
            ViewportCommand::Initialize { kind } => context.initialize(kind.clone()),
            ViewportCommand::SetProgress { key, value } => context.set_progress(key, *value),
            ViewportCommand::Resize { key } => context.resize(key.as_deref()),
            ViewportCommand::Dispose { key } => context.dispose(key).map(|released| {
                let summary = serde_json::json!({
                    "viewport": key,
                    "nodes_released": released,
                });
                rpc_interface.send_notification("viewport_disposed", summary.clone());
                summary
            }),
            ViewportCommand::OpenProject { project } => context.open_project(project),
            ViewportCommand::CloseProject => context.close_project(),
            ViewportCommand::OpenAbout => context.open_about(),
            ViewportCommand::CloseAbout => context.close_about(),
        };

        if let Err(e) = &result {
            warn!("Viewport command {:?} failed: {}", request.command, e);
        }
        if request.request_id.is_some() {
            rpc_interface.respond(request.request_id, result.map_err(RpcError::from));
        }
    }
}

/// Viewports the page always shows, started as soon as models can load.
pub fn queue_page_viewports(models: Res<ModelRegistry>, mut backlog: ResMut<ViewportBacklog>) {
    let mut kinds = vec![ViewportKind::Hero];

    // Natively every canvas would become its own OS window.
    if cfg!(target_arch = "wasm32") {
        kinds.push(ViewportKind::Gallery);
        kinds.extend(models.project_ids().into_iter().map(ViewportKind::ProjectCard));
    }

    for kind in kinds {
        if dom::element_exists(&kind.canvas_selector()) {
            backlog
                .0
                .push(ViewportRequest::unanswered(ViewportCommand::Initialize { kind }));
        } else {
            debug!("No canvas for {}, skipping", kind.key());
        }
    }
}

/// Scene lifecycle, model loading and the per-frame viewport update.
pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportRegistry>()
            .init_resource::<RenderLayerAllocator>()
            .init_resource::<CanvasWindows>()
            .init_resource::<PendingResizes>()
            .init_resource::<PageResizeQueue>()
            .init_resource::<OverlayState>()
            .init_resource::<ViewportBacklog>()
            .insert_resource(AmbientLight {
                color: Color::WHITE,
                brightness: AMBIENT_LEVEL * AMBIENT_BRIGHTNESS_PER_UNIT,
                ..default()
            })
            .add_event::<ViewportRequest>()
            .add_event::<ModelSettled>()
            .add_observer(finalize_model_scene)
            .add_systems(Startup, register_primary_canvas)
            .add_systems(OnEnter(AppState::Running), queue_page_viewports)
            .add_systems(Update, buffer_viewport_requests)
            .add_systems(
                Update,
                (
                    run_viewport_requests,
                    poll_model_fetches,
                    attach_settled_models,
                    report_load_summaries,
                    run_pending_resizes,
                    drain_page_resizes,
                    apply_gallery_progress,
                    compose_node_transforms,
                    apply_node_opacity,
                    sync_camera_distance,
                    count_viewport_frames,
                )
                    .chain()
                    .after(buffer_viewport_requests)
                    .run_if(in_state(AppState::Running)),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, super::resize::setup_page_resize_listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::gltf::Gltf;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_resource::<ModelRegistry>()
            .init_resource::<ViewportRegistry>()
            .init_resource::<RenderLayerAllocator>()
            .init_resource::<CanvasWindows>()
            .init_resource::<PendingResizes>()
            .init_resource::<OverlayState>()
            .init_resource::<ViewportBacklog>()
            .init_resource::<WebRpcInterface>()
            .add_systems(Update, run_viewport_requests);
        app
    }

    fn queue(app: &mut App, command: ViewportCommand, id: u64) {
        app.world_mut()
            .resource_mut::<ViewportBacklog>()
            .0
            .push(ViewportRequest {
                command,
                request_id: Some(serde_json::json!(id)),
            });
    }

    fn scene_count(app: &mut App) -> usize {
        let mut scenes = app.world_mut().query::<&ViewportScene>();
        scenes.iter(app.world()).count()
    }

    #[test]
    fn second_initialize_in_the_same_frame_is_refused() {
        let mut app = app();
        queue(&mut app, ViewportCommand::Initialize { kind: ViewportKind::Gallery }, 1);
        queue(&mut app, ViewportCommand::Initialize { kind: ViewportKind::Gallery }, 2);
        app.update();

        assert_eq!(scene_count(&mut app), 1);
        let responses = app.world().resource::<WebRpcInterface>().pending_responses();
        assert!(responses[0].error.is_none());
        assert_eq!(responses[1].error.as_ref().map(|e| e.code), Some(-32000));

        // The surviving scene is the registered one and disposes cleanly.
        queue(
            &mut app,
            ViewportCommand::Dispose {
                key: "gallery".into(),
            },
            3,
        );
        app.update();
        assert_eq!(scene_count(&mut app), 0);
    }

    #[test]
    fn disposing_a_scene_spawned_this_frame_frees_its_layer() {
        let mut app = app();
        queue(&mut app, ViewportCommand::OpenProject { project: "98".into() }, 1);
        queue(&mut app, ViewportCommand::OpenProject { project: "99".into() }, 2);
        app.update();

        assert_eq!(scene_count(&mut app), 1);
        let modal = app
            .world()
            .resource::<ViewportRegistry>()
            .get("modal")
            .unwrap();
        assert_eq!(app.world().get::<ViewportScene>(modal).unwrap().layer, 1);
        assert_eq!(
            app.world_mut().resource_mut::<RenderLayerAllocator>().acquire(),
            2
        );
    }
}
