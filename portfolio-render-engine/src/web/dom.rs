use bevy::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{CustomEvent, CustomEventInit, HtmlElement, window};

/// Document offset and height of a page section, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionMetrics {
    pub top: f32,
    pub height: f32,
}

#[cfg(target_arch = "wasm32")]
fn query(selector: &str) -> Option<HtmlElement> {
    window()?
        .document()?
        .query_selector(selector)
        .ok()
        .flatten()?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub fn element_exists(selector: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        query(selector).is_some()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = selector;
        true
    }
}

pub fn section_metrics(selector: &str) -> Option<SectionMetrics> {
    #[cfg(target_arch = "wasm32")]
    {
        let element = query(selector)?;
        Some(SectionMetrics {
            top: element.offset_top() as f32,
            height: element.offset_height() as f32,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = selector;
        None
    }
}

pub fn viewport_height() -> Option<f32> {
    #[cfg(target_arch = "wasm32")]
    {
        window()?.inner_height().ok()?.as_f64().map(|h| h as f32)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

pub fn scroll_offset() -> Option<f32> {
    #[cfg(target_arch = "wasm32")]
    {
        window()?.scroll_y().ok().map(|y| y as f32)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Set an inline style property. Returns false when the element is missing.
pub fn set_style(selector: &str, property: &str, value: &str) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(element) = query(selector) else {
            return false;
        };
        if let Err(e) = element.style().set_property(property, value) {
            warn!("Failed to set {} on {}: {:?}", property, selector, e);
            return false;
        }
        true
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (selector, property, value);
        false
    }
}

/// Layout size of a canvas in CSS pixels.
pub fn canvas_client_size(selector: &str) -> Option<Vec2> {
    #[cfg(target_arch = "wasm32")]
    {
        let element = query(selector)?;
        let size = Vec2::new(element.client_width() as f32, element.client_height() as f32);
        (size.x > 0.0 && size.y > 0.0).then_some(size)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = selector;
        None
    }
}

pub fn device_pixel_ratio() -> f32 {
    #[cfg(target_arch = "wasm32")]
    {
        window().map(|w| w.device_pixel_ratio() as f32).unwrap_or(1.0)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        1.0
    }
}

pub fn location_pathname() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        window()?.location().pathname().ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Dispatch `json` to the page as a `CustomEvent` named `event_name` whose
/// detail is the JSON string.
pub fn dispatch_json_event(event_name: &str, json: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = window() else {
            error!("Window object not available");
            return;
        };

        let init = CustomEventInit::new();
        init.set_detail(&JsValue::from_str(json));

        match CustomEvent::new_with_event_init_dict(event_name, &init) {
            Ok(event) => {
                if let Err(e) = window.dispatch_event(&event) {
                    error!("Failed to dispatch {}: {:?}", event_name, e);
                }
            }
            Err(e) => error!("Failed to create {}: {:?}", event_name, e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        debug!("{} -> {}", event_name, json);
    }
}
