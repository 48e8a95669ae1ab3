//! Session-level error taxonomy.

use capture_engine::EngineError;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures surfaced to the session caller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The mount element the render surface attaches to is absent.
    /// Fatal; nothing else is attempted.
    #[error("mount element not found: {0}")]
    Mount(String),

    /// License or engine asset loading failed.
    #[error("engine configuration failed: {0}")]
    EngineConfiguration(String),

    /// No camera available or permission denied.
    #[error("camera acquisition failed: {0}")]
    CameraAcquisition(String),

    /// The device rejected the recommended capture settings.
    #[error("camera settings rejected: {0}")]
    SettingsApplication(String),

    /// `initialize` was called on a session that already completed one.
    #[error("session already initialized")]
    AlreadyInitialized,

    /// A steady-state operation was invoked before `initialize` completed.
    #[error("session not initialized")]
    NotInitialized,

    /// The active camera disappeared mid-session. Delivered through the
    /// result sink's error callback.
    #[error("camera device lost: {0}")]
    DeviceLost(String),

    /// Engine misuse that has no session-level meaning (stale handles).
    #[error("engine failure")]
    Engine(#[source] EngineError),
}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MountMissing(id) => SessionError::Mount(id),
            EngineError::Configuration(msg) => SessionError::EngineConfiguration(msg),
            EngineError::CameraAcquisition(msg) => SessionError::CameraAcquisition(msg),
            EngineError::SettingsApplication(msg) => SessionError::SettingsApplication(msg),
            EngineError::DeviceLost(msg) => SessionError::DeviceLost(msg),
            err @ EngineError::InvalidHandle { .. } => SessionError::Engine(err),
        }
    }
}
