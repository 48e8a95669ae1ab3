// capture-session: the scanning session lifecycle.
//
// Drives a recognition engine (any `capture_engine::CaptureBackend`) through
// configure → acquire camera → scan, and delivers formatted results to a
// caller-supplied sink.

pub mod controller;
pub mod error;
pub mod result;
pub mod sink;

pub use controller::{SessionController, SessionHandle, SessionOptions, SessionState};
pub use error::{Result, SessionError};
pub use result::ScanResult;
pub use sink::ResultSink;
