//! Error taxonomy for engine and camera operations.

/// Result alias used throughout the engine seam.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures reported by the recognition engine backend.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The mount element the render surface attaches to does not exist.
    #[error("mount element not found: {0}")]
    MountMissing(String),

    /// License validation or engine asset loading failed.
    #[error("engine configuration failed: {0}")]
    Configuration(String),

    /// No camera available, or permission to use it was denied.
    #[error("camera acquisition failed: {0}")]
    CameraAcquisition(String),

    /// The device rejected the requested capture settings.
    #[error("camera settings rejected: {0}")]
    SettingsApplication(String),

    /// The active camera disappeared mid-session.
    #[error("camera device lost: {0}")]
    DeviceLost(String),

    /// A handle was used after release, or was never issued by this backend.
    #[error("unknown {kind} handle: {id}")]
    InvalidHandle { kind: &'static str, id: u32 },
}
