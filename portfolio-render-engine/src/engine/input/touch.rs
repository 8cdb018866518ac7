use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use std::f32::consts::TAU;

use super::input_manager::{InputManager, InputMode};
use crate::engine::viewport::viewport_scene::ViewportScene;
use constants::input::{
    PINCH_MAX_DISTANCE, PINCH_MIN_DISTANCE, TOUCH_HELD_DECAY, TOUCH_INERTIA_DECAY,
    TOUCH_INERTIA_GAIN, TOUCH_VELOCITY_THRESHOLD,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Rotating {
        last: Vec2,
    },
    Pinching {
        start_distance: f32,
        start_camera_distance: f32,
    },
}

/// Touch gesture state for one canvas.
///
/// Rotation deltas are returned as `(x, y)` rotation in radians: vertical
/// drags turn the model around X, horizontal drags around Y.
#[derive(Debug, Clone, Default)]
pub struct TouchController {
    gesture: Gesture,
    /// Normalised drag delta in radians, `x` horizontal.
    delta: Vec2,
    /// Last drag step in pixels.
    velocity: Vec2,
}

impl TouchController {
    /// A finger went down; `touches` are all fingers now on the canvas.
    pub fn begin(&mut self, touches: &[Vec2], camera_distance: f32) {
        match touches {
            [only] => {
                self.gesture = Gesture::Rotating { last: *only };
                self.velocity = Vec2::ZERO;
                self.delta = Vec2::ZERO;
            }
            [a, b] => {
                self.gesture = Gesture::Pinching {
                    start_distance: a.distance(*b),
                    start_camera_distance: camera_distance,
                };
            }
            _ => {}
        }
    }

    /// Fingers moved. Returns the new camera distance while pinching.
    pub fn moved(&mut self, touches: &[Vec2], canvas: Vec2) -> Option<f32> {
        match (self.gesture, touches) {
            (Gesture::Rotating { last }, [current]) => {
                let step = *current - last;
                self.velocity = step;
                self.delta = normalized_step(step, canvas);
                self.gesture = Gesture::Rotating { last: *current };
                None
            }
            (
                Gesture::Pinching {
                    start_distance,
                    start_camera_distance,
                },
                [a, b],
            ) => pinch_distance(start_distance, a.distance(*b), start_camera_distance),
            _ => None,
        }
    }

    /// A finger lifted; `remaining` are the fingers still down.
    pub fn end(&mut self, remaining: &[Vec2]) {
        match remaining {
            [] => self.gesture = Gesture::Idle,
            // Back from a pinch to a drag without resetting inertia.
            [only] => self.gesture = Gesture::Rotating { last: *only },
            _ => {}
        }
    }

    /// Rotation to add this frame.
    pub fn frame_delta(&mut self, canvas: Vec2) -> Vec2 {
        match self.gesture {
            Gesture::Rotating { .. } => {
                let rotation = Vec2::new(self.delta.y, self.delta.x);
                self.delta *= TOUCH_HELD_DECAY;
                rotation
            }
            Gesture::Idle if self.has_inertia() => {
                let step = normalized_step(self.velocity, canvas) * TOUCH_INERTIA_GAIN;
                self.velocity *= TOUCH_INERTIA_DECAY;
                Vec2::new(step.y, step.x)
            }
            _ => Vec2::ZERO,
        }
    }

    pub fn has_inertia(&self) -> bool {
        self.velocity.x.abs() > TOUCH_VELOCITY_THRESHOLD
            || self.velocity.y.abs() > TOUCH_VELOCITY_THRESHOLD
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn normalized_step(step: Vec2, canvas: Vec2) -> Vec2 {
    if canvas.x <= 0.0 || canvas.y <= 0.0 {
        return Vec2::ZERO;
    }
    step / canvas * TAU
}

/// Camera distance for a pinch, clamped to the zoom range.
pub fn pinch_distance(start_distance: f32, current_distance: f32, start_camera: f32) -> Option<f32> {
    if start_distance <= f32::EPSILON || current_distance <= f32::EPSILON {
        return None;
    }
    Some((start_camera * start_distance / current_distance).clamp(PINCH_MIN_DISTANCE, PINCH_MAX_DISTANCE))
}

/// Touch state attached to handheld viewports.
#[derive(Component, Debug, Default)]
pub struct ViewportTouch {
    pub controller: TouchController,
    fingers: Vec<(u64, Vec2)>,
}

impl ViewportTouch {
    fn positions(&self) -> Vec<Vec2> {
        self.fingers.iter().map(|(_, p)| *p).collect()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.fingers.clear();
    }
}

/// Feed window touch events into the matching viewport's gesture state.
pub fn track_touches(
    mut events: EventReader<TouchInput>,
    manager: Res<InputManager>,
    windows: Query<&Window>,
    mut scenes: Query<(&mut ViewportScene, &mut ViewportTouch)>,
) {
    if manager.mode() != InputMode::Touch {
        events.clear();
        return;
    }

    for event in events.read() {
        for (mut scene, mut touch) in &mut scenes {
            if scene.window != event.window || !scene.is_running() {
                continue;
            }

            match event.phase {
                TouchPhase::Started => {
                    touch.fingers.retain(|(id, _)| *id != event.id);
                    touch.fingers.push((event.id, event.position));
                    let positions = touch.positions();
                    let camera_distance = scene.camera_distance;
                    touch.controller.begin(&positions, camera_distance);
                }
                TouchPhase::Moved => {
                    if let Some(finger) = touch.fingers.iter_mut().find(|(id, _)| *id == event.id) {
                        finger.1 = event.position;
                    }
                    let canvas = windows
                        .get(event.window)
                        .map(|w| Vec2::new(w.width(), w.height()))
                        .unwrap_or(Vec2::ZERO);
                    let positions = touch.positions();
                    if let Some(distance) = touch.controller.moved(&positions, canvas) {
                        scene.camera_distance = distance;
                    }
                }
                TouchPhase::Ended | TouchPhase::Canceled => {
                    touch.fingers.retain(|(id, _)| *id != event.id);
                    let positions = touch.positions();
                    touch.controller.end(&positions);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(400.0, 200.0);

    #[test]
    fn drag_rotates_by_normalised_delta_and_decays_while_held() {
        let mut touch = TouchController::default();
        touch.begin(&[Vec2::new(100.0, 100.0)], 5.0);
        touch.moved(&[Vec2::new(200.0, 100.0)], CANVAS);

        let first = touch.frame_delta(CANVAS);
        assert!((first.y - TAU / 4.0).abs() < 1e-5);
        assert_eq!(first.x, 0.0);

        let second = touch.frame_delta(CANVAS);
        assert!((second.y - TAU / 4.0 * 0.8).abs() < 1e-5);
    }

    #[test]
    fn inertia_decays_until_below_threshold() {
        let mut touch = TouchController::default();
        touch.begin(&[Vec2::ZERO], 5.0);
        touch.moved(&[Vec2::new(10.0, 0.0)], CANVAS);
        touch.end(&[]);

        let first = touch.frame_delta(CANVAS);
        assert!((first.y - 10.0 / 400.0 * TAU * 0.5).abs() < 1e-6);

        let mut frames = 1;
        while touch.has_inertia() {
            touch.frame_delta(CANVAS);
            frames += 1;
            assert!(frames < 200, "inertia never settled");
        }
        // 10 * 0.92^n drops below 0.1 after 56 frames.
        assert_eq!(frames, 56);
        assert_eq!(touch.frame_delta(CANVAS), Vec2::ZERO);
    }

    #[test]
    fn pinch_scales_camera_distance_within_limits() {
        let mut touch = TouchController::default();
        touch.begin(&[Vec2::ZERO, Vec2::new(100.0, 0.0)], 5.0);

        assert_eq!(touch.moved(&[Vec2::ZERO, Vec2::new(200.0, 0.0)], CANVAS), Some(2.5));
        assert_eq!(touch.moved(&[Vec2::ZERO, Vec2::new(50.0, 0.0)], CANVAS), Some(10.0));
        assert_eq!(touch.moved(&[Vec2::ZERO, Vec2::new(1000.0, 0.0)], CANVAS), Some(2.0));
        assert_eq!(touch.moved(&[Vec2::ZERO, Vec2::ZERO], CANVAS), None);
        assert_eq!(touch.frame_delta(CANVAS), Vec2::ZERO);
    }

    #[test]
    fn lifting_one_finger_of_a_pinch_resumes_dragging() {
        let mut touch = TouchController::default();
        touch.begin(&[Vec2::ZERO, Vec2::new(100.0, 0.0)], 5.0);
        touch.end(&[Vec2::new(100.0, 0.0)]);

        touch.moved(&[Vec2::new(100.0, 50.0)], CANVAS);
        let delta = touch.frame_delta(CANVAS);
        assert!((delta.x - 50.0 / 200.0 * TAU).abs() < 1e-5);
    }

    #[test]
    fn reset_clears_inertia() {
        let mut touch = TouchController::default();
        touch.begin(&[Vec2::ZERO], 5.0);
        touch.moved(&[Vec2::new(30.0, 30.0)], CANVAS);
        touch.end(&[]);
        touch.reset();
        assert!(!touch.has_inertia());
        assert_eq!(touch.frame_delta(CANVAS), Vec2::ZERO);
    }
}
