//! Fake backend for unit testing the session lifecycle without a camera.
//!
//! Records every backend operation in global call order, supports injecting a
//! failure at any single operation, and lets tests emit recognition events
//! into the registered observer. Emitted batches follow the engine contract:
//! they are dropped unless the scan mode is enabled and the frame-source
//! camera is `On`.
//!
//! # Example
//!
//! ```ignore
//! let (backend, fake) = FakeBackendBuilder::new()
//!     .with_mount("data-capture-view")
//!     .build();
//!
//! // drive a controller against `backend`...
//!
//! fake.emit_batch(vec![RecognizedBarcode::new("1234", Symbology::Qr)]);
//! assert!(fake.ops().contains(&RecordedOp::Configure));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::backend::{CaptureBackend, EngineEvent, ScanObserver};
use crate::config::EngineConfiguration;
use crate::error::{EngineError, Result};
use crate::symbology::SymbologySet;
use crate::types::{
    CameraFacing, CameraId, CameraSettings, ContextId, FrameSourceState, ModeId, MountPoint,
    OverlayId, RecognizedBarcode, ScanEvent, Viewfinder,
};

use async_trait::async_trait;

/// One recorded backend operation, in the order the session issued it.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    AttachView(String),
    ShowProgress,
    SetProgressMessage(String),
    HideProgress,
    AddCameraSwitchControl,
    Configure,
    CreateContext,
    BindView,
    AcquireCamera(CameraFacing),
    ApplyCameraSettings,
    SetFrameSource,
    CreateScanMode,
    SetModeEnabled(bool),
    CreateOverlay,
    SetViewfinder(bool),
    SetObserver,
    SetCameraState(FrameSourceState),
    ReleaseCamera,
    DestroyContext,
}

/// Operations a test can make fail exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Configure,
    CreateContext,
    BindView,
    AcquireCamera,
    ApplyCameraSettings,
    SetFrameSource,
    CreateScanMode,
    SetModeEnabled,
    CreateOverlay,
    SetViewfinder,
    SetCameraState,
    ReleaseCamera,
    DestroyContext,
}

#[derive(Default)]
struct FakeState {
    mounts: Vec<String>,
    ops: Vec<RecordedOp>,
    failures: HashMap<FailPoint, EngineError>,
    next_id: u32,
    configured: bool,
    contexts: HashSet<u32>,
    cameras: HashMap<u32, (CameraFacing, FrameSourceState)>,
    modes: HashMap<u32, bool>,
    overlays: HashMap<u32, Option<Viewfinder>>,
    frame_source: Option<(ContextId, CameraId)>,
    observer: Option<(ModeId, Arc<dyn ScanObserver>)>,
    progress_visible: bool,
}

impl FakeState {
    fn record(&mut self, op: RecordedOp) {
        self.ops.push(op);
    }

    fn take_failure(&mut self, point: FailPoint) -> Result<()> {
        match self.failures.remove(&point) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn issue_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Builder for the fake backend.
pub struct FakeBackendBuilder {
    mounts: Vec<String>,
}

impl FakeBackendBuilder {
    pub fn new() -> Self {
        Self { mounts: Vec::new() }
    }

    /// Registers an element id `attach_view` will resolve.
    pub fn with_mount(mut self, element_id: impl Into<String>) -> Self {
        self.mounts.push(element_id.into());
        self
    }

    /// Builds the backend and a controller for injecting and inspecting.
    pub fn build(self) -> (Arc<FakeBackend>, FakeBackendController) {
        let state = Arc::new(Mutex::new(FakeState {
            mounts: self.mounts,
            next_id: 1,
            ..FakeState::default()
        }));
        let backend = Arc::new(FakeBackend {
            state: Arc::clone(&state),
        });
        (backend, FakeBackendController { state })
    }
}

impl Default for FakeBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory [`CaptureBackend`] used by lifecycle tests.
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

/// Injection/inspection half of the fake.
pub struct FakeBackendController {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackendController {
    /// Makes the next invocation of `point` fail with `error`.
    pub fn fail_once(&self, point: FailPoint, error: EngineError) {
        self.state.lock().failures.insert(point, error);
    }

    /// Emits a recognition batch into the registered observer.
    ///
    /// Returns whether the event was delivered; it is dropped (engine
    /// contract) when no observer is registered, the mode is disabled, or the
    /// frame-source camera is not `On`.
    pub fn emit_batch(&self, batch: Vec<RecognizedBarcode>) -> bool {
        let observer = {
            let state = self.state.lock();
            let Some((mode, observer)) = state.observer.as_ref() else {
                debug!(target: "capture.engine", "batch dropped: no observer registered");
                return false;
            };
            if !state.modes.get(&mode.raw()).copied().unwrap_or(false) {
                debug!(target: "capture.engine", %mode, "batch dropped: mode disabled");
                return false;
            }
            let camera_on = state
                .frame_source
                .and_then(|(_, camera)| state.cameras.get(&camera.raw()))
                .is_some_and(|(_, s)| *s == FrameSourceState::On);
            if !camera_on {
                debug!(target: "capture.engine", "batch dropped: camera not on");
                return false;
            }
            Arc::clone(observer)
        };
        observer.on_event(EngineEvent::Recognized(ScanEvent { batch }));
        true
    }

    /// Simulates losing the active camera device mid-session.
    ///
    /// The frame-source camera drops to `Off` and the observer (when
    /// registered) receives [`EngineEvent::DeviceLost`].
    pub fn emit_device_lost(&self, reason: &str) -> bool {
        let observer = {
            let mut state = self.state.lock();
            if let Some((_, camera)) = state.frame_source {
                if let Some(entry) = state.cameras.get_mut(&camera.raw()) {
                    entry.1 = FrameSourceState::Off;
                }
            }
            match state.observer.as_ref() {
                Some((_, observer)) => Arc::clone(observer),
                None => return false,
            }
        };
        observer.on_event(EngineEvent::DeviceLost(reason.to_string()));
        true
    }

    /// All operations recorded so far, in issue order.
    pub fn ops(&self) -> Vec<RecordedOp> {
        self.state.lock().ops.clone()
    }

    /// Takes recorded operations, clearing the buffer.
    pub fn take_ops(&self) -> Vec<RecordedOp> {
        std::mem::take(&mut self.state.lock().ops)
    }

    pub fn configured(&self) -> bool {
        self.state.lock().configured
    }

    /// Whether any scan mode is currently enabled.
    pub fn mode_enabled(&self) -> bool {
        self.state.lock().modes.values().any(|enabled| *enabled)
    }

    /// Whether the frame-source camera is powered on.
    pub fn camera_on(&self) -> bool {
        let state = self.state.lock();
        state
            .frame_source
            .and_then(|(_, camera)| state.cameras.get(&camera.raw()))
            .is_some_and(|(_, s)| *s == FrameSourceState::On)
    }

    /// Facing of the frame-source camera, when one is bound.
    pub fn active_facing(&self) -> Option<CameraFacing> {
        let state = self.state.lock();
        state
            .frame_source
            .and_then(|(_, camera)| state.cameras.get(&camera.raw()))
            .map(|(facing, _)| *facing)
    }

    /// Whether any overlay currently has a viewfinder attached.
    pub fn viewfinder_attached(&self) -> bool {
        self.state.lock().overlays.values().any(Option::is_some)
    }

    pub fn progress_visible(&self) -> bool {
        self.state.lock().progress_visible
    }

    pub fn live_cameras(&self) -> usize {
        self.state.lock().cameras.len()
    }

    pub fn live_contexts(&self) -> usize {
        self.state.lock().contexts.len()
    }
}

impl FakeBackend {
    fn mode_exists(state: &FakeState, mode: ModeId) -> Result<()> {
        if state.modes.contains_key(&mode.raw()) {
            Ok(())
        } else {
            Err(EngineError::InvalidHandle {
                kind: ModeId::KIND,
                id: mode.raw(),
            })
        }
    }

    fn camera_exists(state: &FakeState, camera: CameraId) -> Result<()> {
        if state.cameras.contains_key(&camera.raw()) {
            Ok(())
        } else {
            Err(EngineError::InvalidHandle {
                kind: CameraId::KIND,
                id: camera.raw(),
            })
        }
    }

    fn context_exists(state: &FakeState, context: ContextId) -> Result<()> {
        if state.contexts.contains(&context.raw()) {
            Ok(())
        } else {
            Err(EngineError::InvalidHandle {
                kind: ContextId::KIND,
                id: context.raw(),
            })
        }
    }
}

#[async_trait]
impl CaptureBackend for FakeBackend {
    fn attach_view(&self, mount: &MountPoint) -> Result<()> {
        let mut state = self.state.lock();
        if !state.mounts.iter().any(|id| id == mount.element_id()) {
            return Err(EngineError::MountMissing(mount.element_id().to_string()));
        }
        state.record(RecordedOp::AttachView(mount.element_id().to_string()));
        Ok(())
    }

    fn show_progress(&self) {
        let mut state = self.state.lock();
        state.progress_visible = true;
        state.record(RecordedOp::ShowProgress);
    }

    fn set_progress_message(&self, message: &str) {
        let mut state = self.state.lock();
        state.record(RecordedOp::SetProgressMessage(message.to_string()));
    }

    fn hide_progress(&self) {
        let mut state = self.state.lock();
        state.progress_visible = false;
        state.record(RecordedOp::HideProgress);
    }

    fn add_camera_switch_control(&self) {
        self.state.lock().record(RecordedOp::AddCameraSwitchControl);
    }

    async fn configure(&self, _config: &EngineConfiguration) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::Configure)?;
        state.configured = true;
        state.record(RecordedOp::Configure);
        Ok(())
    }

    async fn create_context(&self) -> Result<ContextId> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::CreateContext)?;
        let id = state.issue_id();
        state.contexts.insert(id);
        state.record(RecordedOp::CreateContext);
        Ok(ContextId(id))
    }

    async fn bind_view(&self, context: ContextId) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::BindView)?;
        Self::context_exists(&state, context)?;
        state.record(RecordedOp::BindView);
        Ok(())
    }

    async fn acquire_camera(&self, facing: CameraFacing) -> Result<CameraId> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::AcquireCamera)?;
        let id = state.issue_id();
        state.cameras.insert(id, (facing, FrameSourceState::Off));
        state.record(RecordedOp::AcquireCamera(facing));
        Ok(CameraId(id))
    }

    async fn apply_camera_settings(
        &self,
        camera: CameraId,
        _settings: &CameraSettings,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::ApplyCameraSettings)?;
        Self::camera_exists(&state, camera)?;
        state.record(RecordedOp::ApplyCameraSettings);
        Ok(())
    }

    async fn set_frame_source(&self, context: ContextId, camera: CameraId) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::SetFrameSource)?;
        Self::context_exists(&state, context)?;
        Self::camera_exists(&state, camera)?;
        state.frame_source = Some((context, camera));
        state.record(RecordedOp::SetFrameSource);
        Ok(())
    }

    async fn create_scan_mode(
        &self,
        context: ContextId,
        _symbologies: &SymbologySet,
    ) -> Result<ModeId> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::CreateScanMode)?;
        Self::context_exists(&state, context)?;
        let id = state.issue_id();
        state.modes.insert(id, false);
        state.record(RecordedOp::CreateScanMode);
        Ok(ModeId(id))
    }

    async fn set_mode_enabled(&self, mode: ModeId, enabled: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::SetModeEnabled)?;
        Self::mode_exists(&state, mode)?;
        state.modes.insert(mode.raw(), enabled);
        state.record(RecordedOp::SetModeEnabled(enabled));
        Ok(())
    }

    async fn create_overlay(&self, mode: ModeId) -> Result<OverlayId> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::CreateOverlay)?;
        Self::mode_exists(&state, mode)?;
        let id = state.issue_id();
        state.overlays.insert(id, None);
        state.record(RecordedOp::CreateOverlay);
        Ok(OverlayId(id))
    }

    async fn set_viewfinder(
        &self,
        overlay: OverlayId,
        viewfinder: Option<Viewfinder>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::SetViewfinder)?;
        if !state.overlays.contains_key(&overlay.raw()) {
            return Err(EngineError::InvalidHandle {
                kind: OverlayId::KIND,
                id: overlay.raw(),
            });
        }
        state.overlays.insert(overlay.raw(), viewfinder);
        state.record(RecordedOp::SetViewfinder(viewfinder.is_some()));
        Ok(())
    }

    fn set_observer(&self, mode: ModeId, observer: Arc<dyn ScanObserver>) {
        let mut state = self.state.lock();
        state.observer = Some((mode, observer));
        state.record(RecordedOp::SetObserver);
    }

    async fn set_camera_state(&self, camera: CameraId, new_state: FrameSourceState) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::SetCameraState)?;
        Self::camera_exists(&state, camera)?;
        if let Some(entry) = state.cameras.get_mut(&camera.raw()) {
            entry.1 = new_state;
        }
        state.record(RecordedOp::SetCameraState(new_state));
        Ok(())
    }

    async fn release_camera(&self, camera: CameraId) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::ReleaseCamera)?;
        Self::camera_exists(&state, camera)?;
        state.cameras.remove(&camera.raw());
        if state.frame_source.is_some_and(|(_, c)| c == camera) {
            state.frame_source = None;
        }
        state.record(RecordedOp::ReleaseCamera);
        Ok(())
    }

    async fn destroy_context(&self, context: ContextId) -> Result<()> {
        let mut state = self.state.lock();
        state.take_failure(FailPoint::DestroyContext)?;
        Self::context_exists(&state, context)?;
        state.contexts.remove(&context.raw());
        if state.frame_source.is_some_and(|(c, _)| c == context) {
            state.frame_source = None;
        }
        state.record(RecordedOp::DestroyContext);
        Ok(())
    }
}
