use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::model_registry::{ModelRegistry, RegistryManifest};
use crate::engine::core::app_state::AppState;
use crate::rpc::web_rpc::WebRpcInterface;
use constants::paths::REGISTRY_MANIFEST_PATH;

#[derive(Resource, Default)]
pub struct RegistryLoader {
    handle: Option<Handle<RegistryManifest>>,
    resolved: bool,
}

// Start the loading process
pub fn start_loading(mut loader: ResMut<RegistryLoader>, asset_server: Res<AssetServer>) {
    info!("Loading registry manifest from {}", REGISTRY_MANIFEST_PATH);
    loader.handle = Some(asset_server.load(REGISTRY_MANIFEST_PATH));
}

/// Install the model registry once the manifest has loaded or failed, then
/// let the viewports start.
pub fn resolve_registry(
    mut loader: ResMut<RegistryLoader>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<RegistryManifest>>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if loader.resolved {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    let registry = if let Some(manifest) = manifests.get(&handle) {
        registry_or_builtin(Some(manifest))
    } else if let LoadState::Failed(error) = asset_server.load_state(&handle) {
        warn!("Registry manifest unavailable ({}), using built-in catalogue", error);
        registry_or_builtin(None)
    } else {
        return;
    };

    rpc_interface.send_notification(
        "debug_message",
        serde_json::json!({
            "message": format!("Model registry ready with {} models", registry.models().len())
        }),
    );

    commands.insert_resource(registry);
    loader.resolved = true;
    info!("→ Registry resolved, transitioning to Running state");
    next_state.set(AppState::Running);
}

/// A valid manifest wins; anything else falls back to the built-in list.
pub fn registry_or_builtin(manifest: Option<&RegistryManifest>) -> ModelRegistry {
    let Some(manifest) = manifest else {
        return ModelRegistry::builtin();
    };

    match ModelRegistry::from_manifest(manifest) {
        Ok(registry) => {
            info!("✓ Registry manifest loaded: {} models", registry.models().len());
            registry
        }
        Err(e) => {
            warn!("Rejected registry manifest: {}", e);
            ModelRegistry::builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(files: &[&str]) -> RegistryManifest {
        serde_json::from_value(serde_json::json!({
            "models": files
                .iter()
                .enumerate()
                .map(|(i, f)| serde_json::json!({"file": f, "group": (i + 1).to_string()}))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn valid_manifest_replaces_the_catalogue() {
        let registry = registry_or_builtin(Some(&manifest(&["a.glb", "b.glb"])));
        assert_eq!(registry.models().len(), 2);
        assert_eq!(registry.hero(), ModelRegistry::builtin().hero());
    }

    #[test]
    fn invalid_or_missing_manifest_uses_builtin() {
        let builtin = ModelRegistry::builtin().models().len();
        assert_eq!(registry_or_builtin(None).models().len(), builtin);
        assert_eq!(
            registry_or_builtin(Some(&manifest(&["a.glb", "a.glb"]))).models().len(),
            builtin
        );
        assert_eq!(registry_or_builtin(Some(&manifest(&[]))).models().len(), builtin);
    }
}
