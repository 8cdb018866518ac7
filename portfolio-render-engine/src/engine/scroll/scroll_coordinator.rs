use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use super::section_progress::{ScrollFrame, SectionLayout, resolve_frame};
use super::smooth_scroll::{ScrollSettings, SmoothScroll};
use crate::engine::core::app_state::AppState;
use crate::engine::viewport::gallery::apply_gallery_progress;
use crate::engine::viewport::viewport_scene::{ViewportRegistry, ViewportScene};
use crate::web::dom;
use constants::scroll::{
    GALLERY_PROGRESS_BAR, HERO_CANVAS, HERO_CONTENT, HERO_SECTION,
    SCROLL_EPSILON, SCROLL_INDICATOR,
};

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// A raw scroll offset from the page.
    Offset(f32),
    Configure {
        smoothing: Option<bool>,
        duration: Option<f32>,
    },
}

/// One resolved scroll offset and everything derived from it.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScrollTick(pub ScrollFrame);

/// Offsets pushed by the window `scroll` listener.
#[derive(Resource, Default, Clone)]
pub struct ScrollQueue(pub Arc<Mutex<Vec<f32>>>);

/// Last frame applied, so repeated offsets are not re-applied.
#[derive(Resource, Debug, Default)]
pub struct AppliedScroll(Option<ScrollFrame>);

pub struct ScrollCoordinatorPlugin;

impl Plugin for ScrollCoordinatorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScrollSettings>()
            .init_resource::<SmoothScroll>()
            .init_resource::<SectionLayout>()
            .init_resource::<ScrollQueue>()
            .init_resource::<AppliedScroll>()
            .add_event::<ScrollCommand>()
            .add_event::<ScrollTick>()
            .add_systems(OnEnter(AppState::Running), seed_initial_scroll)
            .add_systems(
                Update,
                (
                    drain_scroll_queue,
                    handle_scroll_commands,
                    advance_smooth_scroll,
                    apply_scroll_frame,
                )
                    .chain()
                    .before(apply_gallery_progress)
                    .run_if(in_state(AppState::Running)),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_scroll_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_scroll_listener(queue: Res<ScrollQueue>) {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::Closure;
    use web_sys::{Event, window};

    let Some(window) = window() else {
        return;
    };
    let shared = queue.0.clone();
    let page = window.clone();

    let closure = Closure::wrap(Box::new(move |_event: Event| {
        if let Ok(offset) = page.scroll_y() {
            if let Ok(mut queue) = shared.lock() {
                queue.push(offset as f32);
            }
        }
    }) as Box<dyn FnMut(Event)>);

    if let Err(e) = window.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref()) {
        warn!("Failed to register scroll listener: {:?}", e);
        return;
    }
    closure.forget();
}

/// Start from wherever the page already is (reloads keep their offset).
fn seed_initial_scroll(mut smooth: ResMut<SmoothScroll>) {
    let offset = dom::scroll_offset().unwrap_or(0.0);
    smooth.jump_to(offset);
}

fn drain_scroll_queue(queue: Res<ScrollQueue>, mut commands_out: EventWriter<ScrollCommand>) {
    let offsets = if let Ok(mut queue) = queue.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    // Only the newest offset matters for a glide target.
    if let Some(offset) = offsets.last() {
        commands_out.write(ScrollCommand::Offset(*offset));
    }
}

pub fn handle_scroll_commands(
    mut commands_in: EventReader<ScrollCommand>,
    mut settings: ResMut<ScrollSettings>,
    mut smooth: ResMut<SmoothScroll>,
) {
    for command in commands_in.read() {
        match *command {
            ScrollCommand::Offset(offset) => {
                if (offset - smooth.target()).abs() >= SCROLL_EPSILON {
                    smooth.set_target(offset, &settings);
                }
            }
            ScrollCommand::Configure {
                smoothing,
                duration,
            } => {
                if let Some(smoothing) = smoothing {
                    settings.smoothing = smoothing;
                }
                if let Some(duration) = duration.filter(|d| d.is_finite() && *d >= 0.0) {
                    settings.duration = duration;
                }
                info!(
                    "Scroll smoothing {} ({}s)",
                    if settings.smoothing { "on" } else { "off" },
                    settings.duration
                );
            }
        }
    }
}

fn advance_smooth_scroll(
    time: Res<Time>,
    settings: Res<ScrollSettings>,
    mut smooth: ResMut<SmoothScroll>,
    mut layout: ResMut<SectionLayout>,
    mut ticks: EventWriter<ScrollTick>,
) {
    let Some(offset) = smooth.advance(time.delta_secs(), &settings) else {
        return;
    };

    refresh_layout(&mut layout);
    ticks.write(ScrollTick(resolve_frame(offset, &layout)));
}

/// Re-read section geometry; it changes with window size and fonts.
#[cfg(target_arch = "wasm32")]
fn refresh_layout(layout: &mut SectionLayout) {
    layout.hero = dom::section_metrics(HERO_SECTION);
    layout.gallery = dom::section_metrics(constants::scroll::GALLERY_SECTION);
    layout.viewport_height = dom::viewport_height().unwrap_or(layout.viewport_height);
}

#[cfg(not(target_arch = "wasm32"))]
fn refresh_layout(_layout: &mut SectionLayout) {}

/// Forward progress to the bound viewports and restyle the page.
pub fn apply_scroll_frame(
    mut ticks: EventReader<ScrollTick>,
    registry: Res<ViewportRegistry>,
    mut scenes: Query<&mut ViewportScene>,
    mut applied: ResMut<AppliedScroll>,
) {
    let Some(ScrollTick(frame)) = ticks.read().last().copied() else {
        return;
    };
    if applied.0 == Some(frame) {
        return;
    }

    if let Some(hero) = frame.hero {
        forward_progress(&registry, &mut scenes, "hero", hero.progress);
    }
    if let Some(progress) = frame.gallery {
        forward_progress(&registry, &mut scenes, "gallery", progress);
    }

    apply_page_effects(&frame);
    applied.0 = Some(frame);
}

fn forward_progress(
    registry: &ViewportRegistry,
    scenes: &mut Query<&mut ViewportScene>,
    key: &str,
    progress: f32,
) {
    let Some(entity) = registry.get(key) else {
        return;
    };
    if let Ok(mut scene) = scenes.get_mut(entity) {
        if scene.is_running() {
            scene.set_progress(progress);
        }
    }
}

fn apply_page_effects(frame: &ScrollFrame) {
    if let Some(hero) = frame.hero {
        let content = hero.content_opacity.to_string();
        dom::set_style(HERO_CANVAS, "opacity", &content);
        dom::set_style(HERO_CONTENT, "opacity", &content);
        dom::set_style(SCROLL_INDICATOR, "opacity", &hero.indicator_opacity.to_string());
        dom::set_style(HERO_SECTION, "transform", &format!("scale({})", hero.scale));
    }

    if let Some(progress) = frame.gallery {
        dom::set_style(GALLERY_PROGRESS_BAR, "width", &format!("{}%", progress * 100.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scroll::section_progress::HeroEffects;
    use crate::engine::viewport::kind::ViewportKind;

    fn app_with_gallery() -> (App, Entity) {
        let mut app = App::new();
        app.init_resource::<ViewportRegistry>()
            .init_resource::<AppliedScroll>()
            .add_event::<ScrollTick>()
            .add_systems(Update, apply_scroll_frame);

        let world = app.world_mut();
        let window = world.spawn_empty().id();
        let camera = world.spawn_empty().id();
        let mut scene = ViewportScene::new(ViewportKind::Gallery, window, 1);
        scene.mark_running(camera);
        let entity = world.spawn(scene).id();
        world
            .resource_mut::<ViewportRegistry>()
            .insert("gallery".to_string(), entity, 1);

        (app, entity)
    }

    fn frame(offset: f32, gallery: Option<f32>) -> ScrollFrame {
        ScrollFrame {
            offset,
            hero: None,
            gallery,
        }
    }

    #[test]
    fn gallery_progress_reaches_the_bound_scene() {
        let (mut app, entity) = app_with_gallery();

        app.world_mut().send_event(ScrollTick(frame(1500.0, Some(0.4))));
        app.update();

        let scene = app.world().get::<ViewportScene>(entity).unwrap();
        assert!((scene.progress() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn repeated_offset_forwards_the_same_progress() {
        let (mut app, entity) = app_with_gallery();

        for _ in 0..2 {
            app.world_mut().send_event(ScrollTick(frame(900.0, Some(0.25))));
            app.update();
            let scene = app.world().get::<ViewportScene>(entity).unwrap();
            assert!((scene.progress() - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn missing_viewports_are_skipped() {
        let (mut app, _) = app_with_gallery();
        let hero_only = ScrollFrame {
            offset: 10.0,
            hero: Some(HeroEffects {
                progress: 0.1,
                content_opacity: 0.85,
                indicator_opacity: 0.7,
                scale: 1.01,
            }),
            gallery: None,
        };

        app.world_mut().send_event(ScrollTick(hero_only));
        app.update();
        assert_eq!(app.world().resource::<AppliedScroll>().0, Some(hero_only));
    }

    #[test]
    fn configure_switches_to_pass_through() {
        let mut app = App::new();
        app.init_resource::<ScrollSettings>()
            .init_resource::<SmoothScroll>()
            .add_event::<ScrollCommand>()
            .add_systems(Update, handle_scroll_commands);

        app.world_mut().send_event(ScrollCommand::Configure {
            smoothing: Some(false),
            duration: Some(-1.0),
        });
        app.update();
        app.world_mut().send_event(ScrollCommand::Offset(320.0));
        app.update();

        let settings = *app.world().resource::<ScrollSettings>();
        assert!(!settings.smoothing);
        assert_eq!(settings.duration, ScrollSettings::default().duration);
        assert_eq!(app.world().resource::<SmoothScroll>().current(), 320.0);
    }
}
