use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::window::ExitCondition;
use bevy_common_assets::json::JsonAssetPlugin;
// Crate engine modules
use crate::engine::assets::base_url::current_asset_root;
use crate::engine::assets::model_registry::RegistryManifest;
use crate::engine::core::app_state::AppState;
use crate::engine::core::window_config::create_window_config;
use crate::engine::input::input_manager::{
    InputCommand, InputManager, InputModeChanged, OrientationQueue, PermissionQueue,
    apply_input_motion, complete_permission_requests, drain_orientation_readings,
    handle_input_commands, reset_inactive_adapters,
};
use crate::engine::input::pointer::{
    GlobalPointer, PagePointerQueue, drain_page_pointer, track_cursor,
};
use crate::engine::input::touch::track_touches;
use crate::engine::loading::model_loader::attach_settled_models;
use crate::engine::loading::registry_loader::{RegistryLoader, resolve_registry, start_loading};
use crate::engine::scroll::scroll_coordinator::ScrollCoordinatorPlugin;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::viewport::commands::ViewportPlugin;
use crate::engine::viewport::node::compose_node_transforms;
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;
use constants::logging::LOG_FILTER;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::fps_log_system;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the registry manifest as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<RegistryManifest>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(ViewportPlugin)
        .add_plugins(ScrollCoordinatorPlugin);

    // Initialise resources early
    app.init_resource::<RegistryLoader>()
        .init_resource::<InputManager>()
        .init_resource::<PermissionQueue>()
        .init_resource::<OrientationQueue>()
        .init_resource::<GlobalPointer>()
        .init_resource::<PagePointerQueue>()
        .add_event::<InputCommand>()
        .add_event::<InputModeChanged>();

    // Loading phase
    app.add_systems(Startup, start_loading).add_systems(
        Update,
        resolve_registry.run_if(in_state(AppState::Loading)),
    );

    // Mode switches can be requested before any scene exists.
    app.add_systems(
        Update,
        (
            handle_input_commands,
            complete_permission_requests,
            drain_orientation_readings,
            reset_inactive_adapters,
        )
            .chain(),
    );

    // Runtime systems - only run when the registry is ready
    app.add_systems(
        Update,
        (
            track_cursor,
            drain_page_pointer,
            track_touches,
            apply_input_motion,
        )
            .chain()
            .after(reset_inactive_adapters)
            .after(attach_settled_models)
            .before(compose_node_transforms)
            .run_if(in_state(AppState::Running)),
    );

    app.add_systems(
        Update,
        fps_notification_system.run_if(in_state(AppState::Running)),
    );

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_log_system);
    }

    #[cfg(target_arch = "wasm32")]
    {
        use crate::engine::input::pointer::setup_page_pointer_listener;
        app.add_systems(Startup, setup_page_pointer_listener);
    }

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        // Closing a secondary canvas window must not stop the page.
        exit_condition: ExitCondition::OnPrimaryClosed,
        ..default()
    };

    let asset_config = AssetPlugin {
        file_path: current_asset_root(),
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: LOG_FILTER.to_string(),
        level: Level::INFO,
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
