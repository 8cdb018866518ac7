use thiserror::Error;

/// Failure to turn a descriptor into a renderable node.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelLoadError {
    #[error("failed to fetch or parse '{file}': {reason}")]
    Fetch { file: String, reason: String },
    #[error("'{file}' contains no scenes")]
    EmptyScene { file: String },
}

impl ModelLoadError {
    pub fn file(&self) -> &str {
        match self {
            Self::Fetch { file, .. } | Self::EmptyScene { file } => file,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("device orientation permission was denied")]
    PermissionDenied,
    #[error("device orientation is not supported on this device")]
    Unsupported,
    #[error("recalibration is only available in gyroscope mode")]
    NotInGyroMode,
    #[error("an input mode switch is already waiting for permission")]
    SwitchPending,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewportError {
    #[error("unknown viewport '{0}'")]
    UnknownKey(String),
    #[error("viewport '{0}' is not running")]
    NotRunning(String),
    #[error("viewport '{0}' is already running")]
    AlreadyRunning(String),
    #[error("canvas '{0}' is not on the page")]
    CanvasMissing(String),
}
