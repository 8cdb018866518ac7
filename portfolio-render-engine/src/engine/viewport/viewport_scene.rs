use bevy::prelude::*;
use std::collections::HashMap;

use super::kind::ViewportKind;
use super::profile::PresentationProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewportLifecycle {
    #[default]
    Uninitialized,
    Running,
    /// Terminal.
    Disposed,
}

/// One rendering surface: a window bound to a page canvas, its camera,
/// lights and the nodes loaded into it.
///
/// Camera, lights and attached nodes are children of the entity carrying
/// this component, so despawning it releases the whole scene.
#[derive(Component, Debug)]
pub struct ViewportScene {
    pub kind: ViewportKind,
    pub profile: PresentationProfile,
    pub window: Entity,
    pub layer: usize,
    pub camera: Option<Entity>,
    lifecycle: ViewportLifecycle,
    nodes: Vec<Entity>,
    progress: f32,
    pointer: Vec2,
    pub hovered: bool,
    pub camera_distance: f32,
}

impl ViewportScene {
    pub fn new(kind: ViewportKind, window: Entity, layer: usize) -> Self {
        let profile = kind.profile();
        Self {
            kind,
            profile,
            window,
            layer,
            camera: None,
            lifecycle: ViewportLifecycle::Uninitialized,
            nodes: Vec::new(),
            progress: 0.0,
            pointer: Vec2::ZERO,
            hovered: false,
            camera_distance: profile.camera.distance,
        }
    }

    pub fn key(&self) -> String {
        self.kind.key()
    }

    pub fn lifecycle(&self) -> ViewportLifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == ViewportLifecycle::Running
    }

    /// Camera and lights exist; the scene renders even with no nodes.
    pub fn mark_running(&mut self, camera: Entity) {
        if self.lifecycle != ViewportLifecycle::Uninitialized {
            warn!("Viewport {} cannot start from {:?}", self.key(), self.lifecycle);
            return;
        }
        self.camera = Some(camera);
        self.lifecycle = ViewportLifecycle::Running;
    }

    pub fn nodes(&self) -> &[Entity] {
        &self.nodes
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Returns false (and leaves the scene untouched) unless running.
    pub fn set_progress(&mut self, value: f32) -> bool {
        if !self.accepts_mutation("set_progress") {
            return false;
        }
        self.progress = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        true
    }

    /// Pointer in normalised device coordinates, y up.
    pub fn set_pointer(&mut self, pointer: Vec2) -> bool {
        if !self.accepts_mutation("set_pointer") {
            return false;
        }
        self.pointer = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
        true
    }

    /// Add a finished node. Refused once the scene has been disposed.
    pub fn attach_node(&mut self, node: Entity) -> bool {
        if !self.is_running() {
            return false;
        }
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
        true
    }

    /// Enter the terminal state and hand back the nodes to release.
    pub fn begin_dispose(&mut self) -> Vec<Entity> {
        self.lifecycle = ViewportLifecycle::Disposed;
        self.camera = None;
        std::mem::take(&mut self.nodes)
    }

    fn accepts_mutation(&self, operation: &str) -> bool {
        if self.is_running() {
            return true;
        }
        warn!(
            "Ignoring {} on viewport {} in state {:?}",
            operation,
            self.key(),
            self.lifecycle
        );
        false
    }
}

/// A registered viewport: its scene entity and the render layer it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveViewport {
    pub entity: Entity,
    pub layer: usize,
}

/// Live viewport entities by key, plus per-key frame counters.
///
/// A key is registered as soon as its scene is spawned, before the spawn
/// commands are applied, and leaves the registry when it is disposed.
#[derive(Resource, Default, Debug)]
pub struct ViewportRegistry {
    live: HashMap<String, LiveViewport>,
    frames: HashMap<String, u64>,
}

impl ViewportRegistry {
    pub fn get(&self, key: &str) -> Option<Entity> {
        self.live.get(key).map(|viewport| viewport.entity)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.live.contains_key(key)
    }

    pub fn insert(&mut self, key: String, entity: Entity, layer: usize) {
        self.live.insert(key, LiveViewport { entity, layer });
    }

    pub fn remove(&mut self, key: &str) -> Option<LiveViewport> {
        self.live.remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.live.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn frames_rendered(&self, key: &str) -> u64 {
        self.frames.get(key).copied().unwrap_or(0)
    }

    fn record_frame(&mut self, key: String) {
        *self.frames.entry(key).or_default() += 1;
    }
}

/// Hands out one render layer per live viewport so cameras only see their
/// own nodes. Layer 0 stays unused by scenes.
#[derive(Resource, Debug)]
pub struct RenderLayerAllocator {
    next: usize,
    free: Vec<usize>,
}

impl Default for RenderLayerAllocator {
    fn default() -> Self {
        Self {
            next: 1,
            free: Vec::new(),
        }
    }
}

impl RenderLayerAllocator {
    pub fn acquire(&mut self) -> usize {
        if let Some(layer) = self.free.pop() {
            return layer;
        }
        let layer = self.next;
        self.next += 1;
        layer
    }

    pub fn release(&mut self, layer: usize) {
        if layer != 0 && layer < self.next && !self.free.contains(&layer) {
            self.free.push(layer);
        }
    }
}

/// Counts one frame for every running viewport.
pub fn count_viewport_frames(
    scenes: Query<&ViewportScene>,
    mut registry: ResMut<ViewportRegistry>,
) {
    for scene in &scenes {
        if scene.is_running() {
            registry.record_frame(scene.key());
        }
    }
}
