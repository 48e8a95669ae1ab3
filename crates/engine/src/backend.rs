//! The seam between the session lifecycle and the opaque recognition engine.
//!
//! Every engine and render-surface operation the session performs goes
//! through [`CaptureBackend`], one method per operation, so the lifecycle can
//! be exercised against an in-memory fake that records global call order.
//! View operations (progress indicator, controls) are synchronous; everything
//! that touches the engine or the camera is async and awaited in sequence by
//! the caller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineConfiguration;
use crate::error::Result;
use crate::symbology::SymbologySet;
use crate::types::{
    CameraFacing, CameraId, CameraSettings, ContextId, FrameSourceState, ModeId, MountPoint,
    OverlayId, ScanEvent, Viewfinder,
};

/// Events the engine pushes to the registered observer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine decoded one or more barcodes in a frame.
    Recognized(ScanEvent),
    /// The active camera disappeared (unplugged, revoked permission).
    DeviceLost(String),
}

/// Single-method observer receiving engine events.
///
/// Exactly one observer is registered per scan mode; invocations are
/// serialized by the engine (never concurrent).
pub trait ScanObserver: Send + Sync {
    fn on_event(&self, event: EngineEvent);
}

/// Backend driving a recognition engine and its render surface.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Attaches the render surface to the host document.
    ///
    /// Fails with [`EngineError::MountMissing`] when the element is absent.
    ///
    /// [`EngineError::MountMissing`]: crate::EngineError::MountMissing
    fn attach_view(&self, mount: &MountPoint) -> Result<()>;

    /// Shows an indeterminate progress indicator on the render surface.
    fn show_progress(&self);

    /// Replaces the progress indicator's textual status.
    fn set_progress_message(&self, message: &str);

    /// Clears the progress indicator.
    fn hide_progress(&self);

    /// Adds the front/back camera toggle to the render surface.
    fn add_camera_switch_control(&self);

    /// Configures the engine: license validation and asset loading.
    /// Potentially slow; the caller shows progress while this runs.
    async fn configure(&self, config: &EngineConfiguration) -> Result<()>;

    /// Creates the recognition context that will own camera and scan mode.
    async fn create_context(&self) -> Result<ContextId>;

    /// Binds the render surface to a context.
    async fn bind_view(&self, context: ContextId) -> Result<()>;

    /// Acquires the camera facing the given direction.
    async fn acquire_camera(&self, facing: CameraFacing) -> Result<CameraId>;

    /// Applies capture settings to an acquired camera.
    async fn apply_camera_settings(
        &self,
        camera: CameraId,
        settings: &CameraSettings,
    ) -> Result<()>;

    /// Makes the camera the context's frame source.
    async fn set_frame_source(&self, context: ContextId, camera: CameraId) -> Result<()>;

    /// Builds a scan mode for the symbology set. Modes start disabled.
    async fn create_scan_mode(
        &self,
        context: ContextId,
        symbologies: &SymbologySet,
    ) -> Result<ModeId>;

    /// Toggles whether frames are analyzed. Disabling pauses analysis without
    /// tearing anything down.
    async fn set_mode_enabled(&self, mode: ModeId, enabled: bool) -> Result<()>;

    /// Creates the overlay bound to a scan mode and the render surface.
    async fn create_overlay(&self, mode: ModeId) -> Result<OverlayId>;

    /// Attaches or clears the overlay's viewfinder.
    async fn set_viewfinder(
        &self,
        overlay: OverlayId,
        viewfinder: Option<Viewfinder>,
    ) -> Result<()>;

    /// Registers the single observer for a scan mode's events.
    fn set_observer(&self, mode: ModeId, observer: Arc<dyn ScanObserver>);

    /// Switches the camera's power state. Must reach `On` before a mode bound
    /// to it is enabled.
    async fn set_camera_state(&self, camera: CameraId, state: FrameSourceState) -> Result<()>;

    /// Releases an acquired camera.
    async fn release_camera(&self, camera: CameraId) -> Result<()>;

    /// Destroys a context and everything bound to it.
    async fn destroy_context(&self, context: ContextId) -> Result<()>;
}
