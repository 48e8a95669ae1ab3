//! Scanning session lifecycle orchestration.
//!
//! The controller owns the whole session: engine configuration, camera
//! acquisition, scan-mode enable/disable, overlay and viewfinder attachment,
//! observer registration, and the exposed `start`/`stop`/`resume` operations.
//! Every engine step in `initialize` is awaited before the next begins; each
//! depends on state established by the previous one.

use std::sync::Arc;

use capture_engine::{
    CameraFacing, CameraId, CameraSettings, CaptureBackend, ContextId, EngineConfiguration,
    EngineEvent, FrameSourceState, ModeId, MountPoint, OverlayId, ScanObserver, SymbologySet,
    Viewfinder,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::result::ScanResult;
use crate::sink::ResultSink;

/// Lifecycle states. Valid transitions:
/// `Uninitialized → Initializing → Ready → Scanning ⇄ Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No engine configured, no camera acquired.
    Uninitialized,
    /// Configuration and camera acquisition in flight.
    Initializing,
    /// Context, camera, overlay, observer attached; scanning disabled.
    Ready,
    /// Frames are analyzed; the observer may fire.
    Scanning,
    /// Same resources as `Scanning`, analysis suspended.
    Paused,
}

/// Tunable session behavior.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// When set, `stop` detaches the viewfinder and `start` re-attaches it.
    /// Default false: the viewfinder stays up while paused.
    pub clear_overlay_on_stop: bool,
}

struct SessionResources {
    context: ContextId,
    camera: CameraId,
    facing: CameraFacing,
    mode: ModeId,
    overlay: OverlayId,
    viewfinder_detached: bool,
}

struct Lifecycle {
    state: SessionState,
    resources: Option<SessionResources>,
    sink: Option<Arc<ResultSink>>,
}

/// Resources acquired so far during `initialize`, released on any failure.
#[derive(Default)]
struct PartialAcquisition {
    context: Option<ContextId>,
    camera: Option<CameraId>,
}

/// Owns one scanning session, process-lifetime.
///
/// Construction binds the backend, engine configuration, and symbology set
/// without touching the engine; `initialize` performs the full bring-up and
/// may complete successfully only once.
pub struct SessionController {
    backend: Arc<dyn CaptureBackend>,
    config: EngineConfiguration,
    symbologies: SymbologySet,
    options: SessionOptions,
    lifecycle: Mutex<Lifecycle>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        config: EngineConfiguration,
        symbologies: SymbologySet,
        options: SessionOptions,
    ) -> Self {
        Self {
            backend,
            config,
            symbologies,
            options,
            lifecycle: Mutex::new(Lifecycle {
                state: SessionState::Uninitialized,
                resources: None,
                sink: None,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lifecycle.lock().state
    }

    /// Cloneable handle for UI-driven re-entry (e.g. a "scan again" control).
    pub fn handle(self: &Arc<Self>) -> SessionHandle {
        SessionHandle {
            controller: Arc::clone(self),
        }
    }

    /// Brings the session up and enables scanning.
    ///
    /// Runs the full sequence: attach render surface, configure engine (with
    /// progress shown throughout), create context, acquire and power the
    /// camera, build the disabled scan mode, attach overlay and viewfinder,
    /// register the observer, enable the mode, clear progress. Ends in
    /// `Scanning`.
    ///
    /// Fails with [`SessionError::AlreadyInitialized`] once a previous call
    /// completed. After a *failed* call every partially acquired resource has
    /// been released and the session is back in `Uninitialized`, so a retry
    /// is permitted.
    pub async fn initialize(&self, mount: &MountPoint, sink: ResultSink) -> Result<()> {
        {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.state != SessionState::Uninitialized {
                return Err(SessionError::AlreadyInitialized);
            }
            lifecycle.state = SessionState::Initializing;
        }

        let sink = Arc::new(sink);
        let resources = match self.bring_up(mount, Arc::clone(&sink)).await {
            Ok(resources) => resources,
            Err(err) => {
                self.lifecycle.lock().state = SessionState::Uninitialized;
                return Err(err);
            }
        };

        {
            let mut lifecycle = self.lifecycle.lock();
            lifecycle.resources = Some(resources);
            lifecycle.sink = Some(sink);
            lifecycle.state = SessionState::Ready;
        }

        if let Err(err) = self.start().await {
            let resources = {
                let mut lifecycle = self.lifecycle.lock();
                lifecycle.state = SessionState::Uninitialized;
                lifecycle.sink = None;
                lifecycle.resources.take()
            };
            if let Some(resources) = resources {
                self.release_partial(PartialAcquisition {
                    context: Some(resources.context),
                    camera: Some(resources.camera),
                })
                .await;
            }
            self.backend.hide_progress();
            return Err(err);
        }

        self.backend.hide_progress();
        info!(target: "capture.session", "session initialized, scanning enabled");
        Ok(())
    }

    /// Enables scanning. No-op when already `Scanning`.
    pub async fn start(&self) -> Result<()> {
        let (mode, overlay, reattach_viewfinder) = {
            let lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                SessionState::Uninitialized | SessionState::Initializing => {
                    return Err(SessionError::NotInitialized);
                }
                SessionState::Scanning => {
                    debug!(target: "capture.session", "start: already scanning");
                    return Ok(());
                }
                SessionState::Ready | SessionState::Paused => {
                    let resources = lifecycle
                        .resources
                        .as_ref()
                        .ok_or(SessionError::NotInitialized)?;
                    (
                        resources.mode,
                        resources.overlay,
                        resources.viewfinder_detached,
                    )
                }
            }
        };

        if reattach_viewfinder {
            self.backend
                .set_viewfinder(overlay, Some(Viewfinder::square()))
                .await?;
        }
        self.backend.set_mode_enabled(mode, true).await?;

        let mut lifecycle = self.lifecycle.lock();
        if let Some(resources) = lifecycle.resources.as_mut() {
            resources.viewfinder_detached = false;
        }
        lifecycle.state = SessionState::Scanning;
        debug!(target: "capture.session", "scanning enabled");
        Ok(())
    }

    /// Suspends analysis. Camera, context, and overlay stay allocated so a
    /// later `start` is cheap. No-op when already paused.
    pub async fn stop(&self) -> Result<()> {
        let (mode, overlay) = {
            let lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                SessionState::Uninitialized | SessionState::Initializing => {
                    return Err(SessionError::NotInitialized);
                }
                SessionState::Ready | SessionState::Paused => {
                    debug!(target: "capture.session", "stop: already paused");
                    return Ok(());
                }
                SessionState::Scanning => {
                    let resources = lifecycle
                        .resources
                        .as_ref()
                        .ok_or(SessionError::NotInitialized)?;
                    (resources.mode, resources.overlay)
                }
            }
        };

        self.backend.set_mode_enabled(mode, false).await?;
        if self.options.clear_overlay_on_stop {
            self.backend.set_viewfinder(overlay, None).await?;
        }

        let mut lifecycle = self.lifecycle.lock();
        if self.options.clear_overlay_on_stop {
            if let Some(resources) = lifecycle.resources.as_mut() {
                resources.viewfinder_detached = true;
            }
        }
        lifecycle.state = SessionState::Paused;
        debug!(target: "capture.session", "scanning paused, resources retained");
        Ok(())
    }

    /// Clears caller-rendered result UI (via the sink's clear hook) and
    /// re-enables scanning. Safe to call with no pending result.
    pub async fn resume(&self) -> Result<()> {
        let sink = self.lifecycle.lock().sink.clone();
        if let Some(sink) = sink {
            sink.clear_results();
        }
        self.start().await
    }

    /// Switches to the camera facing the given direction without recreating
    /// the context. Scanning state is preserved; the previous camera is
    /// released. No-op when the active camera already faces that way.
    pub async fn switch_camera(&self, facing: CameraFacing) -> Result<()> {
        let (context, old_camera, current_facing) = {
            let lifecycle = self.lifecycle.lock();
            match lifecycle.state {
                SessionState::Uninitialized | SessionState::Initializing => {
                    return Err(SessionError::NotInitialized);
                }
                _ => {
                    let resources = lifecycle
                        .resources
                        .as_ref()
                        .ok_or(SessionError::NotInitialized)?;
                    (resources.context, resources.camera, resources.facing)
                }
            }
        };

        if current_facing == facing {
            return Ok(());
        }

        info!(target: "capture.session", ?facing, "switching camera");
        let camera = self.backend.acquire_camera(facing).await?;
        if let Err(err) = self.bind_camera(context, camera).await {
            // The new camera never became the frame source; the old one is
            // still live and bound.
            if let Err(release_err) = self.backend.release_camera(camera).await {
                warn!(
                    target: "capture.session",
                    error = %release_err,
                    "failed to release camera after aborted switch"
                );
            }
            return Err(err);
        }
        if let Err(err) = self.backend.release_camera(old_camera).await {
            warn!(
                target: "capture.session",
                error = %err,
                "failed to release previous camera"
            );
        }

        let mut lifecycle = self.lifecycle.lock();
        if let Some(resources) = lifecycle.resources.as_mut() {
            resources.camera = camera;
            resources.facing = facing;
        }
        Ok(())
    }

    /// Steps 1-2 plus scoped acquisition of everything else (steps 3-9).
    async fn bring_up(
        &self,
        mount: &MountPoint,
        sink: Arc<ResultSink>,
    ) -> Result<SessionResources> {
        self.backend.attach_view(mount)?;
        self.backend.show_progress();

        debug!(target: "capture.session", "configuring recognition engine");
        if let Err(err) = self.backend.configure(&self.config).await {
            self.backend.hide_progress();
            return Err(err.into());
        }
        self.backend.set_progress_message("Accessing Camera...");

        let mut partial = PartialAcquisition::default();
        match self.acquire(&mut partial, sink).await {
            Ok(resources) => Ok(resources),
            Err(err) => {
                warn!(target: "capture.session", error = %err, "initialization failed, rolling back");
                self.release_partial(partial).await;
                self.backend.hide_progress();
                Err(err)
            }
        }
    }

    async fn acquire(
        &self,
        partial: &mut PartialAcquisition,
        sink: Arc<ResultSink>,
    ) -> Result<SessionResources> {
        let context = self.backend.create_context().await?;
        partial.context = Some(context);
        self.backend.bind_view(context).await?;

        debug!(target: "capture.session", "acquiring default camera");
        let facing = CameraFacing::Back;
        let camera = self.backend.acquire_camera(facing).await?;
        partial.camera = Some(camera);
        self.backend
            .apply_camera_settings(camera, &CameraSettings::recommended())
            .await?;
        self.backend.set_frame_source(context, camera).await?;

        // The mode comes out of create_scan_mode disabled; it is only enabled
        // after the camera reaches On.
        let mode = self
            .backend
            .create_scan_mode(context, &self.symbologies)
            .await?;
        self.backend.add_camera_switch_control();
        let overlay = self.backend.create_overlay(mode).await?;
        self.backend
            .set_viewfinder(overlay, Some(Viewfinder::square()))
            .await?;
        self.backend
            .set_observer(mode, Arc::new(SinkObserver { sink }));
        self.backend
            .set_camera_state(camera, FrameSourceState::On)
            .await?;

        Ok(SessionResources {
            context,
            camera,
            facing,
            mode,
            overlay,
            viewfinder_detached: false,
        })
    }

    async fn bind_camera(&self, context: ContextId, camera: CameraId) -> Result<()> {
        self.backend
            .apply_camera_settings(camera, &CameraSettings::recommended())
            .await?;
        self.backend.set_frame_source(context, camera).await?;
        self.backend
            .set_camera_state(camera, FrameSourceState::On)
            .await?;
        Ok(())
    }

    async fn release_partial(&self, partial: PartialAcquisition) {
        if let Some(camera) = partial.camera {
            if let Err(err) = self.backend.release_camera(camera).await {
                warn!(
                    target: "capture.session",
                    error = %err,
                    "failed to release camera during rollback"
                );
            }
        }
        if let Some(context) = partial.context {
            if let Err(err) = self.backend.destroy_context(context).await {
                warn!(
                    target: "capture.session",
                    error = %err,
                    "failed to destroy context during rollback"
                );
            }
        }
    }
}

/// The single observer registered with the scan mode. Takes the first barcode
/// of each batch, formats it, and hands it to the sink synchronously.
struct SinkObserver {
    sink: Arc<ResultSink>,
}

impl ScanObserver for SinkObserver {
    fn on_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Recognized(scan) => match ScanResult::from_event(&scan) {
                Some(result) => self.sink.result(&result.formatted()),
                None => debug!(target: "capture.session", "recognition event with empty batch"),
            },
            EngineEvent::DeviceLost(reason) => {
                warn!(target: "capture.session", %reason, "camera device lost");
                self.sink.error(&SessionError::DeviceLost(reason));
            }
        }
    }
}

/// Cloneable handle handed to the UI layer, replacing a process-wide
/// re-entry global: rendered result UI calls `resume` on this handle.
#[derive(Clone)]
pub struct SessionHandle {
    controller: Arc<SessionController>,
}

impl SessionHandle {
    pub async fn start(&self) -> Result<()> {
        self.controller.start().await
    }

    pub async fn stop(&self) -> Result<()> {
        self.controller.stop().await
    }

    pub async fn resume(&self) -> Result<()> {
        self.controller.resume().await
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }
}
