use bevy::prelude::*;
use bevy::window::PresentMode;

use constants::scroll::HERO_CANVAS;

/// Primary window, bound to the landing canvas so the renderer has a
/// surface from the first frame.
pub fn create_window_config() -> Window {
    canvas_window(HERO_CANVAS)
}

/// A window drawing into the page canvas matched by `selector`.
pub fn canvas_window(selector: &str) -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some(selector.into()),
            fit_canvas_to_parent: false,
            prevent_default_event_handling: false,
            transparent: true,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: format!("Portfolio {}", selector),
            transparent: true,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
