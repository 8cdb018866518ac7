use bevy::prelude::*;

/// `Loading` lasts until the model registry is resolved; viewports only
/// exist in `Running`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}
