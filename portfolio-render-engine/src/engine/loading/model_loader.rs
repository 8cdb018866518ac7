use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::color::Alpha;
use bevy::gltf::Gltf;
use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::mesh::VertexAttributeValues;
use bevy::render::view::RenderLayers;
use bevy::scene::SceneInstanceReady;

use super::load_batch::LoadBatch;
use crate::engine::assets::base_url::model_asset_path;
use crate::engine::assets::bounds::{ModelBounds, centering_transform};
use crate::engine::assets::model_descriptor::ModelDescriptor;
use crate::engine::errors::ModelLoadError;
use crate::engine::viewport::gallery::GalleryPose;
use crate::engine::viewport::node::{MaterialSlot, ModelNode, NodeMaterials, NodeMotion};
use crate::engine::viewport::viewport_scene::ViewportScene;
use crate::rpc::web_rpc::WebRpcInterface;

/// A node whose glTF is still being fetched.
#[derive(Component, Debug)]
pub struct PendingModel {
    handle: Handle<Gltf>,
}

/// Child of a node that carries the spawned glTF scene and its centering offset.
#[derive(Component, Debug, Default)]
pub struct ModelPivot;

/// One model load reached its end, successfully or not.
#[derive(Event, Debug, Clone)]
pub struct ModelSettled {
    pub viewport: Entity,
    pub node: Entity,
    pub result: Result<(), ModelLoadError>,
}

/// Start loading `descriptors` for `viewport`. Nodes stay hidden and
/// unparented until they are attached.
pub fn spawn_model_loads(
    commands: &mut Commands,
    asset_server: &AssetServer,
    viewport: Entity,
    scene: &ViewportScene,
    descriptors: &[ModelDescriptor],
) {
    for (slot, descriptor) in descriptors.iter().enumerate() {
        let handle = asset_server.load::<Gltf>(model_asset_path(&descriptor.file));
        let motion = NodeMotion::new(descriptor, &scene.profile);

        let mut node = commands.spawn((
            Name::new(format!("model:{}", descriptor.display_title())),
            ModelNode {
                descriptor: descriptor.clone(),
                viewport,
                slot,
            },
            PendingModel { handle },
            motion.transform(None),
            motion,
            Visibility::Hidden,
        ));

        if scene.profile.scroll_bound {
            node.insert(GalleryPose::default());
        }
    }

    debug!("Queued {} model loads for {}", descriptors.len(), scene.key());
}

/// Spawn the scene for every glTF that finished loading and report the
/// ones that failed.
pub fn poll_model_fetches(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    pending: Query<(Entity, &ModelNode, &PendingModel)>,
    mut settled: EventWriter<ModelSettled>,
) {
    for (entity, node, pending_model) in &pending {
        let failure = match asset_server.load_state(&pending_model.handle) {
            LoadState::Failed(error) => Some(error.to_string()),
            _ => match asset_server.recursive_dependency_load_state(&pending_model.handle) {
                RecursiveDependencyLoadState::Failed(error) => Some(error.to_string()),
                _ => None,
            },
        };

        if let Some(reason) = failure {
            commands.entity(entity).remove::<PendingModel>();
            settled.write(ModelSettled {
                viewport: node.viewport,
                node: entity,
                result: Err(ModelLoadError::Fetch {
                    file: node.descriptor.file.clone(),
                    reason,
                }),
            });
            continue;
        }

        if !asset_server.is_loaded_with_dependencies(&pending_model.handle) {
            continue;
        }
        let Some(gltf) = gltfs.get(&pending_model.handle) else {
            continue;
        };

        commands.entity(entity).remove::<PendingModel>();

        let Some(scene) = gltf
            .default_scene
            .clone()
            .or_else(|| gltf.scenes.first().cloned())
        else {
            settled.write(ModelSettled {
                viewport: node.viewport,
                node: entity,
                result: Err(ModelLoadError::EmptyScene {
                    file: node.descriptor.file.clone(),
                }),
            });
            continue;
        };

        let pivot = commands.spawn((ModelPivot, SceneRoot(scene))).id();
        commands.entity(entity).add_child(pivot);
    }
}

/// Finish a node once its scene instance exists: center it, give it its
/// own materials and move it onto the viewport's render layer.
pub fn finalize_model_scene(
    trigger: Trigger<SceneInstanceReady>,
    pivots: Query<&ChildOf, With<ModelPivot>>,
    nodes: Query<&ModelNode>,
    scenes: Query<&ViewportScene>,
    children: Query<&Children>,
    parts: Query<(
        &Transform,
        Option<&Mesh3d>,
        Option<&MeshMaterial3d<StandardMaterial>>,
    )>,
    meshes: Res<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
    mut settled: EventWriter<ModelSettled>,
) {
    let pivot = trigger.target();
    let Ok(child_of) = pivots.get(pivot) else {
        return;
    };
    let node_entity = child_of.parent();
    let Ok(node) = nodes.get(node_entity) else {
        return;
    };

    // The viewport may have gone while the file was loading.
    let Ok(scene) = scenes.get(node.viewport) else {
        settled.write(ModelSettled {
            viewport: node.viewport,
            node: node_entity,
            result: Ok(()),
        });
        return;
    };
    let layers = RenderLayers::layer(scene.layer);

    let mut bounds: Option<ModelBounds> = None;
    let mut slots = Vec::new();
    let mut stack: Vec<(Entity, Affine3A)> = children
        .get(pivot)
        .map(|c| c.to_vec().into_iter().map(|e| (e, Affine3A::IDENTITY)).collect())
        .unwrap_or_default();

    commands.entity(pivot).insert(layers.clone());

    while let Some((entity, parent_affine)) = stack.pop() {
        commands.entity(entity).insert(layers.clone());

        let Ok((transform, mesh, material)) = parts.get(entity) else {
            continue;
        };
        let affine = parent_affine * transform.compute_affine();

        if let Some(local) = mesh.and_then(|m| meshes.get(&m.0)).and_then(mesh_bounds) {
            let placed = local.transformed(&affine);
            bounds = Some(bounds.map_or(placed, |acc| acc.union(placed)));
        }

        if let Some(copy) = material.and_then(|m| materials.get(&m.0)).cloned() {
            let base_alpha = copy.base_color.alpha();
            let base_mode = copy.alpha_mode;
            let handle = materials.add(copy);
            commands
                .entity(entity)
                .insert(MeshMaterial3d(handle.clone()));
            slots.push(MaterialSlot {
                handle,
                base_alpha,
                base_mode,
            });
        }

        if let Ok(grandchildren) = children.get(entity) {
            stack.extend(grandchildren.to_vec().into_iter().map(|c| (c, affine)));
        }
    }

    if bounds.is_none() {
        warn!("{} has no mesh positions, leaving it uncentred", node.descriptor.file);
    }

    commands
        .entity(pivot)
        .insert(centering_transform(bounds, node.descriptor.fit_extent));
    commands
        .entity(node_entity)
        .insert(NodeMaterials { slots });

    settled.write(ModelSettled {
        viewport: node.viewport,
        node: node_entity,
        result: Ok(()),
    });
}

fn mesh_bounds(mesh: &Mesh) -> Option<ModelBounds> {
    match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(positions) => {
            ModelBounds::from_points(positions.iter().map(|p| Vec3::from(*p)))
        }
        _ => None,
    }
}

/// Attach finished nodes to their viewport, or drop them when the viewport
/// is gone. Reports per-file failures to the page.
pub fn attach_settled_models(
    mut settled: EventReader<ModelSettled>,
    mut commands: Commands,
    mut scenes: Query<(&mut ViewportScene, &mut LoadBatch)>,
    mut visibility: Query<&mut Visibility, With<ModelNode>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in settled.read() {
        let Ok((mut scene, mut batch)) = scenes.get_mut(event.viewport) else {
            debug!("Discarding model for a viewport that no longer exists");
            commands.entity(event.node).despawn();
            continue;
        };

        match &event.result {
            Ok(()) => {
                if !scene.attach_node(event.node) {
                    debug!("Discarding model for {} in state {:?}", scene.key(), scene.lifecycle());
                    commands.entity(event.node).despawn();
                    continue;
                }
                commands.entity(event.viewport).add_child(event.node);
                if let Ok(mut node_visibility) = visibility.get_mut(event.node) {
                    *node_visibility = Visibility::Inherited;
                }
                batch.record_loaded();
            }
            Err(error) => {
                warn!("Skipping model in {}: {}", scene.key(), error);
                rpc_interface.send_notification(
                    "model_load_failed",
                    serde_json::json!({
                        "viewport": scene.key(),
                        "file": error.file(),
                        "error": error.to_string(),
                    }),
                );
                commands.entity(event.node).despawn();
                batch.record_failed(error.clone());
            }
        }
    }
}

/// Send `models_loaded` once a viewport's batch has fully settled. A
/// viewport with nothing to load reports on its first frame.
pub fn report_load_summaries(
    mut batches: Query<(&ViewportScene, &mut LoadBatch), Changed<LoadBatch>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for (scene, mut batch) in &mut batches {
        let Some(summary) = batch.take_summary() else {
            continue;
        };
        info!(
            "Loaded {}/{} models for {}",
            summary.loaded,
            summary.loaded + summary.failed.len(),
            scene.key()
        );
        rpc_interface.send_notification(
            "models_loaded",
            serde_json::json!({
                "viewport": scene.key(),
                "loaded": summary.loaded,
                "failed": summary.failed,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::viewport::kind::ViewportKind;
    use constants::catalogue::MODEL_CATALOGUE;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<WebRpcInterface>()
            .add_event::<ModelSettled>()
            .add_systems(Update, (attach_settled_models, report_load_summaries).chain());
        app
    }

    fn spawn_viewport(app: &mut App, expected: usize) -> Entity {
        let world = app.world_mut();
        let window = world.spawn_empty().id();
        let camera = world.spawn_empty().id();
        let mut scene = ViewportScene::new(ViewportKind::Gallery, window, 1);
        scene.mark_running(camera);
        world
            .spawn((scene, LoadBatch::new(expected), Transform::default(), Visibility::default()))
            .id()
    }

    fn spawn_node(app: &mut App, viewport: Entity, slot: usize) -> Entity {
        app.world_mut()
            .spawn((
                ModelNode {
                    descriptor: ModelDescriptor::from(&MODEL_CATALOGUE[slot]),
                    viewport,
                    slot,
                },
                Transform::default(),
                Visibility::Hidden,
            ))
            .id()
    }

    #[test]
    fn one_failure_in_five_leaves_four_nodes() {
        let mut app = app();
        let viewport = spawn_viewport(&mut app, 5);
        let nodes: Vec<Entity> = (0..5).map(|slot| spawn_node(&mut app, viewport, slot)).collect();

        for (slot, node) in nodes.iter().enumerate() {
            let result = if slot == 2 {
                Err(ModelLoadError::Fetch {
                    file: MODEL_CATALOGUE[slot].file.to_string(),
                    reason: "404".to_string(),
                })
            } else {
                Ok(())
            };
            app.world_mut().send_event(ModelSettled {
                viewport,
                node: *node,
                result,
            });
        }
        app.update();

        let world = app.world();
        let scene = world.get::<ViewportScene>(viewport).unwrap();
        assert_eq!(scene.nodes().len(), 4);
        assert!(!scene.nodes().contains(&nodes[2]));
        assert!(world.get_entity(nodes[2]).is_err());
        assert_eq!(world.get::<Visibility>(nodes[0]), Some(&Visibility::Inherited));
        assert_eq!(world.get::<ChildOf>(nodes[0]).map(|c| c.parent()), Some(viewport));

        let notifications = world.resource::<WebRpcInterface>().pending_notifications();
        let summary = notifications
            .iter()
            .find(|n| n.method == "models_loaded")
            .unwrap();
        assert_eq!(summary.params["loaded"], 4);
        assert_eq!(summary.params["failed"].as_array().map(Vec::len), Some(1));
        assert!(notifications.iter().any(|n| n.method == "model_load_failed"));
    }

    #[test]
    fn viewport_without_models_reports_an_empty_summary_once() {
        let mut app = app();
        spawn_viewport(&mut app, 0);
        app.update();
        app.update();

        let notifications = app.world().resource::<WebRpcInterface>().pending_notifications();
        let summaries: Vec<_> = notifications
            .iter()
            .filter(|n| n.method == "models_loaded")
            .collect();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].params["viewport"], "gallery");
        assert_eq!(summaries[0].params["loaded"], 0);
        assert_eq!(summaries[0].params["failed"], serde_json::json!([]));
    }

    #[test]
    fn summary_waits_for_the_last_model() {
        let mut app = app();
        let viewport = spawn_viewport(&mut app, 2);
        let first = spawn_node(&mut app, viewport, 0);
        let second = spawn_node(&mut app, viewport, 1);

        app.update();
        app.world_mut().send_event(ModelSettled {
            viewport,
            node: first,
            result: Ok(()),
        });
        app.update();
        let reported = |app: &App| {
            app.world()
                .resource::<WebRpcInterface>()
                .pending_notifications()
                .iter()
                .filter(|n| n.method == "models_loaded")
                .count()
        };
        assert_eq!(reported(&app), 0);

        app.world_mut().send_event(ModelSettled {
            viewport,
            node: second,
            result: Ok(()),
        });
        app.update();
        assert_eq!(reported(&app), 1);
    }

    #[test]
    fn late_arrival_after_dispose_is_discarded() {
        let mut app = app();
        let viewport = spawn_viewport(&mut app, 1);
        let node = spawn_node(&mut app, viewport, 0);

        app.world_mut()
            .get_mut::<ViewportScene>(viewport)
            .unwrap()
            .begin_dispose();
        app.world_mut().send_event(ModelSettled {
            viewport,
            node,
            result: Ok(()),
        });
        app.update();

        assert!(app.world().get_entity(node).is_err());
        assert!(app.world().get::<ViewportScene>(viewport).unwrap().nodes().is_empty());
    }

    #[test]
    fn late_arrival_for_despawned_viewport_is_discarded() {
        let mut app = app();
        let viewport = spawn_viewport(&mut app, 1);
        let node = spawn_node(&mut app, viewport, 0);
        app.world_mut().entity_mut(viewport).despawn();

        app.world_mut().send_event(ModelSettled {
            viewport,
            node,
            result: Ok(()),
        });
        app.update();

        assert!(app.world().get_entity(node).is_err());
    }

    #[test]
    fn mesh_bounds_read_vertex_positions() {
        let mut mesh = Mesh::new(
            bevy::render::mesh::PrimitiveTopology::TriangleList,
            bevy::asset::RenderAssetUsages::default(),
        );
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[-1.0, 0.0, 0.0], [3.0, 2.0, 1.0], [0.0, -2.0, 0.5]],
        );

        let bounds = mesh_bounds(&mesh).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 1.0));
    }
}
