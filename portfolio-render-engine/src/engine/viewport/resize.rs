use bevy::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::viewport_scene::{ViewportRegistry, ViewportScene};
use crate::web::dom;
use constants::render_settings::MAX_PIXEL_RATIO;

/// Device pixel ratio used for backing stores, capped to keep fill rate sane.
pub fn effective_pixel_ratio(device_ratio: f32) -> f32 {
    if !device_ratio.is_finite() || device_ratio <= 0.0 {
        return 1.0;
    }
    device_ratio.min(MAX_PIXEL_RATIO)
}

/// Match a window to its canvas' layout size. False when the canvas has no
/// size yet (hidden overlay, native build).
pub fn resize_window(window: &mut Window, selector: &str) -> bool {
    let Some(size) = dom::canvas_client_size(selector) else {
        return false;
    };

    window
        .resolution
        .set_scale_factor_override(Some(effective_pixel_ratio(dom::device_pixel_ratio())));
    window.resolution.set(size.x, size.y);
    true
}

pub fn resize_scene(scene: &ViewportScene, windows: &mut Query<&mut Window>) -> bool {
    if !scene.is_running() {
        return false;
    }
    let Ok(mut window) = windows.get_mut(scene.window) else {
        return false;
    };
    resize_window(&mut window, &scene.kind.canvas_selector())
}

/// Resizes waiting for their viewport to be laid out.
#[derive(Resource, Debug, Default)]
pub struct PendingResizes {
    timers: Vec<(String, Timer)>,
}

impl PendingResizes {
    pub fn schedule(&mut self, key: &str, delay_secs: f32) {
        self.timers.retain(|(k, _)| k != key);
        self.timers.push((
            key.to_string(),
            Timer::from_seconds(delay_secs.max(0.0), TimerMode::Once),
        ));
    }

    /// Advance every timer and hand back the keys that are due.
    pub fn tick(&mut self, delta: Duration) -> Vec<String> {
        let mut due = Vec::new();
        self.timers.retain_mut(|(key, timer)| {
            timer.tick(delta);
            if timer.finished() {
                due.push(key.clone());
                false
            } else {
                true
            }
        });
        due
    }
}

pub fn run_pending_resizes(
    time: Res<Time>,
    mut pending: ResMut<PendingResizes>,
    registry: Res<ViewportRegistry>,
    scenes: Query<&ViewportScene>,
    mut windows: Query<&mut Window>,
) {
    for key in pending.tick(time.delta()) {
        let Some(scene) = registry.get(&key).and_then(|e| scenes.get(e).ok()) else {
            continue;
        };
        if !resize_scene(scene, &mut windows) {
            debug!("Canvas for {} has no layout size yet", key);
        }
    }
}

/// Set by the page `resize` listener.
#[derive(Resource, Default, Clone)]
pub struct PageResizeQueue(pub Arc<Mutex<bool>>);

pub fn drain_page_resizes(
    queue: Res<PageResizeQueue>,
    scenes: Query<&ViewportScene>,
    mut windows: Query<&mut Window>,
) {
    let resized = if let Ok(mut flag) = queue.0.lock() {
        std::mem::take(&mut *flag)
    } else {
        false
    };
    if !resized {
        return;
    }

    for scene in &scenes {
        resize_scene(scene, &mut windows);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn setup_page_resize_listener(queue: Res<PageResizeQueue>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::Closure;
    use web_sys::{Event, window};

    let Some(window) = window() else {
        return;
    };
    let shared = queue.0.clone();

    let closure = Closure::wrap(Box::new(move |_event: Event| {
        if let Ok(mut flag) = shared.lock() {
            *flag = true;
        }
    }) as Box<dyn FnMut(Event)>);

    if let Err(e) = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref()) {
        warn!("Failed to register resize listener: {:?}", e);
        return;
    }
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped_and_sanitised() {
        assert_eq!(effective_pixel_ratio(3.0), 2.0);
        assert_eq!(effective_pixel_ratio(1.5), 1.5);
        assert_eq!(effective_pixel_ratio(0.0), 1.0);
        assert_eq!(effective_pixel_ratio(f32::NAN), 1.0);
    }

    #[test]
    fn overlay_resize_fires_after_its_delay() {
        let mut pending = PendingResizes::default();
        pending.schedule("modal", 0.1);
        pending.schedule("gallery", 0.0);

        assert_eq!(pending.tick(Duration::from_millis(16)), vec!["gallery".to_string()]);
        assert!(pending.tick(Duration::from_millis(50)).is_empty());
        assert_eq!(pending.tick(Duration::from_millis(50)), vec!["modal".to_string()]);
        assert!(pending.tick(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_earlier_timer() {
        let mut pending = PendingResizes::default();
        pending.schedule("modal", 0.1);
        pending.tick(Duration::from_millis(80));
        pending.schedule("modal", 0.1);

        assert!(pending.tick(Duration::from_millis(50)).is_empty());
    }
}
