use bevy::color::Alpha;
use bevy::prelude::*;

use super::gallery::GalleryPose;
use super::profile::PresentationProfile;
use crate::engine::assets::model_descriptor::ModelDescriptor;
use crate::engine::input::pointer::smooth_toward;

/// A model instance belonging to exactly one viewport.
#[derive(Component, Debug, Clone)]
pub struct ModelNode {
    pub descriptor: ModelDescriptor,
    pub viewport: Entity,
    /// Position in the viewport's model selection.
    pub slot: usize,
}

/// Live placement of a node. Derived from the descriptor once and never
/// written back onto it.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct NodeMotion {
    pub base_translation: Vec3,
    pub base_rotation: Vec3,
    pub base_scale: f32,
    /// Current X/Y rotation in radians.
    pub rotation: Vec2,
    /// Rotation accumulated from touch drags.
    pub manual_offset: Vec2,
    pub idle_angle: f32,
}

/// What steers a node's rotation target this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionDrive {
    /// Keep the current rotation.
    Hold,
    /// Ease toward base rotation plus this offset.
    Toward { offset: Vec2, smoothing: f32 },
}

impl NodeMotion {
    pub fn new(descriptor: &ModelDescriptor, profile: &PresentationProfile) -> Self {
        // Scroll-bound nodes are placed by their gallery pose alone.
        let mut base_translation = if profile.scroll_bound {
            Vec3::ZERO
        } else {
            Vec3::from(descriptor.position)
        };
        if !descriptor.is_grouped() {
            base_translation.x += profile.ungrouped_nudge_x;
        }
        let base_rotation = Vec3::from(descriptor.rotation);

        Self {
            base_translation,
            base_rotation,
            base_scale: descriptor.scale * profile.scale_multiplier,
            rotation: base_rotation.truncate(),
            manual_offset: Vec2::ZERO,
            idle_angle: 0.0,
        }
    }

    /// Advance one frame: apply the touch delta, ease toward the drive's
    /// target and add the idle spin.
    pub fn step(&mut self, drive: MotionDrive, touch_delta: Vec2, idle_spin: f32) {
        self.manual_offset += touch_delta;
        self.rotation += touch_delta;

        if let MotionDrive::Toward { offset, smoothing } = drive {
            let target = self.base_rotation.truncate() + self.manual_offset + offset;
            self.rotation.x = smooth_toward(self.rotation.x, target.x, smoothing);
            self.rotation.y = smooth_toward(self.rotation.y, target.y, smoothing);
        }

        self.idle_angle += idle_spin;
    }

    pub fn reset_manual_offset(&mut self) {
        self.manual_offset = Vec2::ZERO;
    }

    pub fn transform(&self, pose: Option<&GalleryPose>) -> Transform {
        let mut translation = self.base_translation;
        let mut scale = self.base_scale;
        if let Some(pose) = pose {
            translation.x = pose.x;
            scale *= pose.scale;
        }

        Transform {
            translation,
            rotation: Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y + self.idle_angle,
                self.base_rotation.z,
            ),
            scale: Vec3::splat(scale),
        }
    }
}

/// A material owned by one node, with the alpha it was authored with.
#[derive(Debug, Clone)]
pub struct MaterialSlot {
    pub handle: Handle<StandardMaterial>,
    pub base_alpha: f32,
    pub base_mode: AlphaMode,
}

/// Per-node material copies, so fading one node never touches another.
#[derive(Component, Debug, Clone, Default)]
pub struct NodeMaterials {
    pub slots: Vec<MaterialSlot>,
}

pub fn compose_node_transforms(
    mut nodes: Query<(&NodeMotion, Option<&GalleryPose>, &mut Transform), With<ModelNode>>,
) {
    for (motion, pose, mut transform) in &mut nodes {
        transform.set_if_neq(motion.transform(pose));
    }
}

/// Push gallery opacity into the node's own materials.
pub fn apply_node_opacity(
    nodes: Query<(&GalleryPose, &NodeMaterials), Or<(Changed<GalleryPose>, Changed<NodeMaterials>)>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (pose, node_materials) in &nodes {
        for slot in &node_materials.slots {
            let Some(material) = materials.get_mut(&slot.handle) else {
                continue;
            };
            material.base_color.set_alpha(slot.base_alpha * pose.opacity);
            material.alpha_mode = if pose.opacity < 1.0 {
                AlphaMode::Blend
            } else {
                slot.base_mode
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(group: Option<&str>) -> ModelDescriptor {
        serde_json::from_value(serde_json::json!({
            "file": "a.glb",
            "scale": 2.0,
            "position": {"x": 1.0, "y": 0.5},
            "rotation": {"x": 0.1, "y": 0.2, "z": 0.3},
            "group": group,
        }))
        .unwrap()
    }

    #[test]
    fn modal_profile_scales_and_nudges_ungrouped_models() {
        let ungrouped = NodeMotion::new(&descriptor(None), &PresentationProfile::MODAL);
        assert!((ungrouped.base_scale - 2.6).abs() < 1e-5);
        assert_eq!(ungrouped.base_translation, Vec3::new(2.0, 0.5, 0.0));

        let grouped = NodeMotion::new(&descriptor(Some("4")), &PresentationProfile::MODAL);
        assert_eq!(grouped.base_translation.x, 1.0);
    }

    #[test]
    fn descriptor_is_left_untouched_by_motion() {
        let source = descriptor(Some("1"));
        let mut motion = NodeMotion::new(&source, &PresentationProfile::CARD);
        motion.step(MotionDrive::Hold, Vec2::new(0.5, 0.5), 0.0);
        assert_eq!(source, descriptor(Some("1")));
        assert!((motion.rotation - Vec2::new(0.6, 0.7)).length() < 1e-6);
    }

    #[test]
    fn toward_drive_closes_a_fraction_of_the_gap() {
        let mut motion = NodeMotion::new(&descriptor(Some("1")), &PresentationProfile::CARD);
        let drive = MotionDrive::Toward {
            offset: Vec2::new(0.0, 1.0),
            smoothing: 0.5,
        };

        motion.step(drive, Vec2::ZERO, 0.0);
        assert!((motion.rotation.y - 0.7).abs() < 1e-6);
        assert!((motion.rotation.x - 0.1).abs() < 1e-6);

        for _ in 0..60 {
            motion.step(drive, Vec2::ZERO, 0.0);
        }
        assert!((motion.rotation.y - 1.2).abs() < 1e-4);
    }

    #[test]
    fn idle_spin_accumulates() {
        let mut motion = NodeMotion::new(&descriptor(Some("1")), &PresentationProfile::HERO);
        for _ in 0..10 {
            motion.step(MotionDrive::Hold, Vec2::ZERO, 0.001);
        }
        assert!((motion.idle_angle - 0.01).abs() < 1e-6);
    }

    #[test]
    fn gallery_pose_overrides_x_and_scales() {
        let motion = NodeMotion::new(&descriptor(Some("1")), &PresentationProfile::GALLERY);
        let pose = GalleryPose {
            x: 4.0,
            scale: 0.5,
            opacity: 0.5,
        };

        let transform = motion.transform(Some(&pose));
        // Descriptor offsets do not apply in the gallery.
        assert_eq!(transform.translation, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(transform.scale, Vec3::splat(1.0));
    }
}
