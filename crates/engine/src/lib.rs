// capture-engine: the seam to the opaque barcode recognition engine.
//
// The session layer in `capture-session` drives everything through the
// `CaptureBackend` trait; production deployments bind it to the real engine,
// tests bind it to `FakeBackend`.

pub mod backend;
pub mod config;
pub mod error;
pub mod fake;
pub mod symbology;
pub mod types;

pub use backend::{CaptureBackend, EngineEvent, ScanObserver};
pub use config::{CapabilityModule, EngineConfiguration};
pub use error::{EngineError, Result};
pub use fake::{FailPoint, FakeBackend, FakeBackendBuilder, FakeBackendController, RecordedOp};
pub use symbology::{Symbology, SymbologySet, SymbologySettings};
pub use types::{
    CameraFacing, CameraId, CameraSettings, ContextId, FrameSourceState, ModeId, MountPoint,
    OverlayId, RecognizedBarcode, ScanEvent, Viewfinder, ViewfinderLineStyle, ViewfinderShape,
};
