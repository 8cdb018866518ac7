//! JSON-RPC 2.0 communication layer between the page and the engine.
//!
//! The page script talks to the engine with `window.postMessage` of JSON
//! strings; the engine answers with DOM `CustomEvent`s named
//! `portfolio-rpc` whose `detail` is the JSON string. Both sides live in the
//! same window, so answers never travel back through `postMessage`.
//!
//! ## Message Flow
//!
//! ```text
//! Page script                                 Bevy (same window)
//!        │                                        │
//!        ├─ postMessage(request, with ID) ──────> │
//!        │                                        ├─ Dispatch to engine event
//!        │ <──── CustomEvent(response, with ID) ──┤  (answered now or later)
//!        │                                        │
//!        │ <──── CustomEvent(notification) ───────┤
//! ```
//!
//! Requests that change scene state are forwarded as engine events and
//! answered by the system that applies them, so a response always reflects
//! what actually happened (a device orientation prompt can take seconds).
//!
//! ## Calling From the Page
//!
//! ```typescript
//! window.addEventListener("portfolio-rpc", (e) => {
//!   const message = JSON.parse((e as CustomEvent<string>).detail);
//! });
//!
//! window.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "open_project",
//!   params: { project: "3" },
//!   id: 1
//! }), "*");
//!
//! // Notification, no response
//! window.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "scroll",
//!   params: { offset: window.scrollY }
//! }), "*");
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000`: Engine refused the request (unknown viewport, permission denied, ...)
//!
//! ## Methods
//!
//! ### Viewports
//! - `initialize_viewport`: Start the scene for `hero`, `gallery` or `project-N`
//! - `set_scroll_progress`: Set a viewport's progress directly
//! - `handle_resize`: Re-read canvas sizes (one viewport or all)
//! - `dispose_viewport`: Tear a scene down
//! - `get_viewports`: List live viewports with state, node count and frames
//!
//! ### Overlays
//! - `open_project` / `close_project`: Project modal
//! - `open_about` / `close_about`: About overlay
//!
//! ### Input
//! - `switch_input_mode`: `touch` or `gyroscope` (may wait for a permission prompt)
//! - `recalibrate`: Reset the gyroscope baseline
//!
//! ### Scrolling
//! - `scroll` (notification): Raw page scroll offset
//! - `configure_scroll`: Toggle smoothing or change its duration
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications Sent
//! `models_loaded`, `model_load_failed`, `viewport_disposed`,
//! `input_mode_changed`, `fps_update`, `debug_message`.

/// JSON-RPC 2.0 bidirectional communication system for the page script.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
