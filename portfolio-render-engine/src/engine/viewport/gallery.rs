use bevy::prelude::*;

use super::node::ModelNode;
use super::viewport_scene::ViewportScene;
use constants::gallery::{
    ENTRY_OFFSET_X, EXIT_SHRINK, EXIT_TRAVEL_X, EXIT_WINDOW_SLICES, SETTLE_X,
};

/// `1 - (1 - t)^4`, with `t` clamped to [0, 1].
pub fn ease_out_quart(t: f32) -> f32 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(4)
}

/// Scroll-derived placement of one gallery node.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct GalleryPose {
    pub x: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for GalleryPose {
    /// Off-screen and invisible, as before the first scroll tick.
    fn default() -> Self {
        Self {
            x: ENTRY_OFFSET_X,
            scale: 0.0,
            opacity: 0.0,
        }
    }
}

/// Linear position of `progress` inside slot `index` of `count` equal slices.
pub fn local_progress(index: usize, count: usize, progress: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let slice = 1.0 / count as f32;
    let start = index as f32 * slice;
    ((progress.clamp(0.0, 1.0) - start) / slice).clamp(0.0, 1.0)
}

/// Pose of node `index` of `count` at gallery `progress`.
///
/// Each node slides in from the right over its own slice of the scroll
/// range, then leaves to the left over the following half slice. The
/// result depends only on the arguments.
pub fn gallery_pose(index: usize, count: usize, progress: f32, target_x: f32) -> GalleryPose {
    if count == 0 {
        return GalleryPose::default();
    }

    let progress = progress.clamp(0.0, 1.0);
    let slice = 1.0 / count as f32;
    let end = (index as f32 + 1.0) * slice;
    let eased = ease_out_quart(local_progress(index, count, progress));

    if progress > end {
        let exit = ((progress - end) / (slice * EXIT_WINDOW_SLICES)).min(1.0);
        return GalleryPose {
            x: target_x - EXIT_TRAVEL_X * exit,
            scale: 1.0 - EXIT_SHRINK * exit,
            opacity: 1.0 - exit,
        };
    }

    GalleryPose {
        x: ENTRY_OFFSET_X + (target_x - ENTRY_OFFSET_X) * eased,
        scale: eased,
        opacity: eased,
    }
}

/// Re-derive every gallery node's pose from its viewport's progress.
pub fn apply_gallery_progress(
    scenes: Query<&ViewportScene>,
    mut nodes: Query<(&ModelNode, &mut GalleryPose)>,
) {
    for scene in &scenes {
        if !scene.is_running() || !scene.profile.scroll_bound {
            continue;
        }

        let mut ordered: Vec<(usize, Entity)> = scene
            .nodes()
            .iter()
            .filter_map(|&entity| nodes.get(entity).ok().map(|(node, _)| (node.slot, entity)))
            .collect();
        ordered.sort_by_key(|(slot, _)| *slot);

        let count = ordered.len();
        for (index, (_, entity)) in ordered.into_iter().enumerate() {
            if let Ok((_, mut pose)) = nodes.get_mut(entity) {
                pose.set_if_neq(gallery_pose(index, count, scene.progress(), SETTLE_X));
            }
        }
    }
}
