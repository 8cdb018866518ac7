/// `tracing` filter applied to the engine log output. wgpu and naga are
/// noisy at info level in the browser console.
pub const LOG_FILTER: &str = "info,wgpu=error,naga=warn,bevy_render=warn,portfolio_render_engine=debug";
