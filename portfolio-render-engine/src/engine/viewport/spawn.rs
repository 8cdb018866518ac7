use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::render::view::RenderLayers;
use bevy::window::{PrimaryWindow, WindowRef};
use std::collections::HashMap;

use super::kind::ViewportKind;
use super::viewport_scene::{LiveViewport, RenderLayerAllocator, ViewportRegistry, ViewportScene};
use crate::engine::assets::model_descriptor::ModelDescriptor;
use crate::engine::core::window_config::canvas_window;
use crate::engine::errors::ViewportError;
use crate::engine::input::touch::ViewportTouch;
use crate::engine::loading::load_batch::LoadBatch;
use crate::engine::loading::model_loader::spawn_model_loads;
use crate::web::dom;
use constants::render_settings::{
    CameraSettings, DIRECTIONAL_LUX_PER_UNIT, LightRig, POINT_LUMENS_PER_UNIT,
};
use constants::scroll::HERO_CANVAS;

/// Window entity per page canvas. Windows outlive the scenes drawn into
/// them, so reopening an overlay reuses its surface.
#[derive(Resource, Debug, Default)]
pub struct CanvasWindows {
    windows: HashMap<String, Entity>,
}

impl CanvasWindows {
    pub fn get(&self, selector: &str) -> Option<Entity> {
        self.windows.get(selector).copied()
    }

    pub fn insert(&mut self, selector: &str, window: Entity) {
        self.windows.insert(selector.to_string(), window);
    }
}

/// The primary window is created on the landing canvas.
pub fn register_primary_canvas(
    primary: Query<Entity, With<PrimaryWindow>>,
    mut canvases: ResMut<CanvasWindows>,
) {
    if let Ok(window) = primary.single() {
        canvases.insert(HERO_CANVAS, window);
    }
}

pub fn acquire_canvas_window(
    commands: &mut Commands,
    canvases: &mut CanvasWindows,
    selector: &str,
) -> Result<Entity, ViewportError> {
    if let Some(window) = canvases.get(selector) {
        return Ok(window);
    }
    if !dom::element_exists(selector) {
        return Err(ViewportError::CanvasMissing(selector.to_string()));
    }

    let window = commands.spawn(canvas_window(selector)).id();
    canvases.insert(selector, window);
    debug!("Bound new window to {}", selector);
    Ok(window)
}

/// Create a running scene: camera, light rig, empty node set, then queue
/// its model loads. Returns the scene entity.
pub fn spawn_viewport(
    commands: &mut Commands,
    asset_server: &AssetServer,
    layers: &mut RenderLayerAllocator,
    registry: &mut ViewportRegistry,
    window: Entity,
    kind: ViewportKind,
    descriptors: &[ModelDescriptor],
) -> Entity {
    let key = kind.key();
    let layer = layers.acquire();
    let render_layers = RenderLayers::layer(layer);
    let mut scene = ViewportScene::new(kind, window, layer);

    let root = commands
        .spawn((
            Name::new(format!("viewport:{key}")),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let camera = spawn_camera(commands, window, layer, &scene.profile.camera, &render_layers);
    let lights = spawn_light_rig(commands, &scene.profile.lights, &render_layers);

    let mut children = vec![camera];
    children.extend(lights);
    commands.entity(root).add_children(&children);

    scene.mark_running(camera);
    spawn_model_loads(commands, asset_server, root, &scene, descriptors);

    let handheld = scene.profile.handheld;
    commands
        .entity(root)
        .insert((scene, LoadBatch::new(descriptors.len())));
    if handheld {
        commands.entity(root).insert(ViewportTouch::default());
    }

    registry.insert(key.clone(), root, layer);
    info!("Viewport {} running on layer {} with {} models queued", key, layer, descriptors.len());
    root
}

fn spawn_camera(
    commands: &mut Commands,
    window: Entity,
    layer: usize,
    settings: &CameraSettings,
    render_layers: &RenderLayers,
) -> Entity {
    commands
        .spawn((
            Camera3d::default(),
            Camera {
                target: RenderTarget::Window(WindowRef::Entity(window)),
                order: layer as isize,
                clear_color: ClearColorConfig::Custom(Color::NONE),
                ..default()
            },
            Projection::Perspective(PerspectiveProjection {
                fov: settings.fov_degrees.to_radians(),
                near: settings.near,
                far: settings.far,
                ..default()
            }),
            Transform::from_xyz(0.0, 0.0, settings.distance).looking_at(Vec3::ZERO, Vec3::Y),
            render_layers.clone(),
        ))
        .id()
}

fn spawn_light_rig(
    commands: &mut Commands,
    rig: &LightRig,
    render_layers: &RenderLayers,
) -> Vec<Entity> {
    let mut lights: Vec<Entity> = [rig.key, rig.fill]
        .iter()
        .map(|light| {
            commands
                .spawn((
                    DirectionalLight {
                        illuminance: light.intensity * DIRECTIONAL_LUX_PER_UNIT,
                        ..default()
                    },
                    Transform::from_translation(light.position).looking_at(Vec3::ZERO, Vec3::Y),
                    render_layers.clone(),
                ))
                .id()
        })
        .collect();

    if let Some(point) = rig.point {
        lights.push(
            commands
                .spawn((
                    PointLight {
                        intensity: point.intensity * POINT_LUMENS_PER_UNIT,
                        ..default()
                    },
                    Transform::from_translation(point.position),
                    render_layers.clone(),
                ))
                .id(),
        );
    }

    lights
}

/// Tear a scene down: nodes, camera and lights go with the scene entity and
/// its render layer is returned. Returns the number of nodes released.
pub fn dispose_viewport(
    commands: &mut Commands,
    registry: &mut ViewportRegistry,
    layers: &mut RenderLayerAllocator,
    scenes: &mut Query<&mut ViewportScene>,
    key: &str,
) -> Result<usize, ViewportError> {
    let LiveViewport { entity, layer } = registry
        .remove(key)
        .ok_or_else(|| ViewportError::UnknownKey(key.to_string()))?;
    layers.release(layer);

    // A scene spawned this frame is not queryable yet and has no nodes.
    let released = match scenes.get_mut(entity) {
        Ok(mut scene) => scene.begin_dispose().len(),
        Err(_) => 0,
    };

    commands.entity(entity).despawn();
    info!("Disposed viewport {} ({} nodes released)", key, released);
    Ok(released)
}

/// Keep each camera at its scene's (pinch controlled) distance.
pub fn sync_camera_distance(
    scenes: Query<&ViewportScene, Changed<ViewportScene>>,
    mut cameras: Query<&mut Transform>,
) {
    for scene in &scenes {
        let Some(camera) = scene.camera else {
            continue;
        };
        if let Ok(mut transform) = cameras.get_mut(camera) {
            if transform.translation.z != scene.camera_distance {
                transform.translation.z = scene.camera_distance;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::viewport::viewport_scene::count_viewport_frames;
    use bevy::ecs::system::RunSystemOnce;

    fn running_gallery(world: &mut World, nodes: usize) -> (Entity, Vec<Entity>) {
        let window = world.spawn_empty().id();
        let camera = world.spawn_empty().id();
        let layer = world.resource_mut::<RenderLayerAllocator>().acquire();

        let mut scene = ViewportScene::new(ViewportKind::Gallery, window, layer);
        scene.mark_running(camera);
        let node_entities: Vec<Entity> = (0..nodes).map(|_| world.spawn_empty().id()).collect();
        for node in &node_entities {
            scene.attach_node(*node);
        }

        let root = world.spawn(scene).id();
        world.entity_mut(root).add_children(&node_entities);
        world.entity_mut(root).add_child(camera);
        world
            .resource_mut::<ViewportRegistry>()
            .insert("gallery".to_string(), root, layer);
        (root, node_entities)
    }

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<ViewportRegistry>();
        world.init_resource::<RenderLayerAllocator>();
        world
    }

    #[test]
    fn dispose_releases_every_node_and_stops_frames() {
        let mut world = world();
        let (root, nodes) = running_gallery(&mut world, 3);

        world.run_system_once(count_viewport_frames).unwrap();
        world.run_system_once(count_viewport_frames).unwrap();
        assert_eq!(world.resource::<ViewportRegistry>().frames_rendered("gallery"), 2);

        let released = world
            .run_system_once(
                |mut commands: Commands,
                 mut registry: ResMut<ViewportRegistry>,
                 mut layers: ResMut<RenderLayerAllocator>,
                 mut scenes: Query<&mut ViewportScene>| {
                    dispose_viewport(&mut commands, &mut registry, &mut layers, &mut scenes, "gallery")
                },
            )
            .unwrap();
        assert_eq!(released, Ok(3));

        assert!(world.get_entity(root).is_err());
        for node in nodes {
            assert!(world.get_entity(node).is_err());
        }
        assert!(world.resource::<ViewportRegistry>().keys().is_empty());

        world.run_system_once(count_viewport_frames).unwrap();
        assert_eq!(world.resource::<ViewportRegistry>().frames_rendered("gallery"), 2);

        // The layer is free for the next scene.
        assert_eq!(world.resource_mut::<RenderLayerAllocator>().acquire(), 1);
    }

    #[test]
    fn disposing_an_unknown_key_fails() {
        let mut world = world();
        let result = world
            .run_system_once(
                |mut commands: Commands,
                 mut registry: ResMut<ViewportRegistry>,
                 mut layers: ResMut<RenderLayerAllocator>,
                 mut scenes: Query<&mut ViewportScene>| {
                    dispose_viewport(&mut commands, &mut registry, &mut layers, &mut scenes, "modal")
                },
            )
            .unwrap();
        assert_eq!(result, Err(ViewportError::UnknownKey("modal".to_string())));
    }

    #[test]
    fn camera_follows_pinch_distance() {
        let mut world = world();
        let window = world.spawn_empty().id();
        let camera = world.spawn(Transform::from_xyz(0.0, 0.0, 5.0)).id();
        let mut scene = ViewportScene::new(ViewportKind::ProjectCard("1".into()), window, 1);
        scene.mark_running(camera);
        scene.camera_distance = 3.0;
        world.spawn(scene);

        world.run_system_once(sync_camera_distance).unwrap();
        assert_eq!(world.get::<Transform>(camera).unwrap().translation.z, 3.0);
    }
}
