use bevy::prelude::*;
use bevy::window::{CursorEntered, CursorLeft, CursorMoved};

use crate::engine::viewport::viewport_scene::ViewportScene;

/// Close `smoothing` of the remaining distance to `target`.
pub fn smooth_toward(current: f32, target: f32, smoothing: f32) -> f32 {
    current + (target - current) * smoothing
}

/// Window-space cursor position to normalised device coordinates, y up.
pub fn normalized_pointer(position: Vec2, size: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        position.x / size.x * 2.0 - 1.0,
        -(position.y / size.y * 2.0 - 1.0),
    )
    .clamp(Vec2::NEG_ONE, Vec2::ONE)
}

/// Last pointer position over the page, for scenes tracking it anywhere.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GlobalPointer(pub Vec2);

/// Page-level `mousemove` positions, already normalised to the viewport.
#[derive(Resource, Default, Clone)]
pub struct PagePointerQueue(pub std::sync::Arc<std::sync::Mutex<Vec<Vec2>>>);

pub fn track_cursor(
    mut moved: EventReader<CursorMoved>,
    mut entered: EventReader<CursorEntered>,
    mut left: EventReader<CursorLeft>,
    windows: Query<&Window>,
    mut scenes: Query<&mut ViewportScene>,
    mut global: ResMut<GlobalPointer>,
) {
    for event in moved.read() {
        let Ok(window) = windows.get(event.window) else {
            continue;
        };
        let pointer = normalized_pointer(event.position, Vec2::new(window.width(), window.height()));
        global.0 = pointer;

        for mut scene in &mut scenes {
            if scene.window == event.window && scene.is_running() {
                scene.set_pointer(pointer);
            }
        }
    }

    for event in entered.read() {
        set_hover(&mut scenes, event.window, true);
    }
    for event in left.read() {
        set_hover(&mut scenes, event.window, false);
    }
}

fn set_hover(scenes: &mut Query<&mut ViewportScene>, window: Entity, hovered: bool) {
    for mut scene in scenes.iter_mut() {
        if scene.window == window && scene.is_running() {
            scene.hovered = hovered;
        }
    }
}

/// Fold page-level pointer positions into the global pointer.
pub fn drain_page_pointer(queue: Res<PagePointerQueue>, mut global: ResMut<GlobalPointer>) {
    let positions = if let Ok(mut queue) = queue.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    if let Some(latest) = positions.last() {
        global.0 = *latest;
    }
}

/// Track the pointer over the whole page, not only over canvases.
#[cfg(target_arch = "wasm32")]
pub fn setup_page_pointer_listener(queue: Res<PagePointerQueue>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::Closure;
    use web_sys::{MouseEvent, window};

    let Some(window) = window() else {
        return;
    };
    let shared = queue.0.clone();
    let page = window.clone();

    let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
        let width = page.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0) as f32;
        let height = page.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0) as f32;
        let position = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        if let Ok(mut queue) = shared.lock() {
            queue.push(normalized_pointer(position, Vec2::new(width, height)));
        }
    }) as Box<dyn FnMut(MouseEvent)>);

    if let Err(e) =
        window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
    {
        warn!("Failed to register mousemove listener: {:?}", e);
        return;
    }

    // Lives as long as the page.
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_closes_a_fixed_fraction() {
        assert_eq!(smooth_toward(0.0, 1.0, 0.05), 0.05);
        assert_eq!(smooth_toward(2.0, 2.0, 0.3), 2.0);

        let mut value = 0.0;
        for _ in 0..200 {
            value = smooth_toward(value, 1.0, 0.05);
        }
        assert!((1.0 - value).abs() < 1e-3);
    }

    #[test]
    fn pointer_is_normalised_with_y_up() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(normalized_pointer(Vec2::new(100.0, 50.0), size), Vec2::ZERO);
        assert_eq!(normalized_pointer(Vec2::new(0.0, 0.0), size), Vec2::new(-1.0, 1.0));
        assert_eq!(normalized_pointer(Vec2::new(200.0, 100.0), size), Vec2::new(1.0, -1.0));
        assert_eq!(normalized_pointer(Vec2::new(10.0, 10.0), Vec2::ZERO), Vec2::ZERO);
    }
}
