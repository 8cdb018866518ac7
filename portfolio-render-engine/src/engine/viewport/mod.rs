//! Viewport scenes.
//!
//! A viewport is one page canvas with its own window, camera, light rig and
//! model nodes. Every section of the page (landing tree, gallery, project
//! cards, the modal and the about overlay) is the same scene type
//! parameterised by a presentation profile.

/// Page requests, the command context and the viewport plugin.
pub mod commands;

/// Scroll-bound gallery placement.
pub mod gallery;

/// Viewport kinds, their page keys, canvases and model selection.
pub mod kind;

/// Per-node placement, rotation smoothing and material opacity.
pub mod node;

/// Project modal and about overlay open/close.
pub mod overlay;

/// Presentation profiles for each kind of scene.
pub mod profile;

/// Canvas size tracking and device pixel ratio handling.
pub mod resize;

/// Scene creation, canvas window pooling and teardown.
pub mod spawn;

/// Scene lifecycle state, live viewport registry and render layers.
pub mod viewport_scene;
