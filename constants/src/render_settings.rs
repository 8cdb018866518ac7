use bevy::math::{Vec2, Vec3};

/// Upper bound on the device pixel ratio used for canvas backing stores.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Overlays are resized once the page has finished showing them.
pub const OVERLAY_RESIZE_DELAY_SECS: f32 = 0.1;

/// Global ambient light level shared by every viewport, in the same units
/// as the light rig intensities below.
pub const AMBIENT_LEVEL: f32 = 0.5;

/// Conversion from rig intensity units to Bevy photometric units.
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 600.0;
pub const DIRECTIONAL_LUX_PER_UNIT: f32 = 4_000.0;
pub const POINT_LUMENS_PER_UNIT: f32 = 400_000.0;

/// Perspective camera placement for a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

/// A light placed at `position`, aimed at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigLight {
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub key: RigLight,
    pub fill: RigLight,
    pub point: Option<RigLight>,
}

pub const CARD_CAMERA: CameraSettings = CameraSettings {
    fov_degrees: 45.0,
    distance: 5.0,
    near: 0.1,
    far: 1000.0,
};

pub const HERO_CAMERA: CameraSettings = CameraSettings {
    fov_degrees: 50.0,
    distance: 15.0,
    near: 0.1,
    far: 1000.0,
};

pub const ABOUT_CAMERA: CameraSettings = CameraSettings {
    distance: 20.0,
    ..HERO_CAMERA
};

pub const CARD_LIGHTS: LightRig = LightRig {
    key: RigLight {
        intensity: 0.8,
        position: Vec3::new(5.0, 5.0, 5.0),
    },
    fill: RigLight {
        intensity: 0.3,
        position: Vec3::new(-5.0, -5.0, -5.0),
    },
    point: None,
};

pub const GALLERY_LIGHTS: LightRig = LightRig {
    fill: RigLight {
        intensity: 0.4,
        position: Vec3::new(-5.0, -5.0, -5.0),
    },
    ..CARD_LIGHTS
};

pub const HERO_LIGHTS: LightRig = LightRig {
    key: RigLight {
        intensity: 0.8,
        position: Vec3::new(5.0, 10.0, 5.0),
    },
    fill: RigLight {
        intensity: 0.4,
        position: Vec3::new(-5.0, -10.0, 5.0),
    },
    point: Some(RigLight {
        intensity: 0.5,
        position: Vec3::new(0.0, 0.0, 10.0),
    }),
};

/// Pointer gain (radians at the canvas edge) and smoothing per profile.
/// `x` applies to the horizontal pointer axis, `y` to the vertical one.
pub const CARD_POINTER_GAIN: Vec2 = Vec2::new(0.5, 0.5);
pub const CARD_SMOOTHING: f32 = 0.05;

pub const MODAL_POINTER_GAIN: Vec2 = Vec2::new(0.8, 0.8);
pub const MODAL_SMOOTHING: f32 = 0.03;
pub const MODAL_SCALE_MULTIPLIER: f32 = 1.3;
pub const MODAL_UNGROUPED_NUDGE_X: f32 = 1.0;

pub const HERO_POINTER_GAIN: Vec2 = Vec2::new(0.1, 0.05);
pub const HERO_SMOOTHING: f32 = 0.05;

/// Idle rotation added to the hero model every frame, in radians.
pub const HERO_IDLE_SPIN: f32 = 0.001;

/// Largest dimension the hero tree model is fitted to.
pub const HERO_FIT_EXTENT: f32 = 20.0;
