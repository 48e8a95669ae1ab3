//! Value types shared across the engine seam.

use serde::{Deserialize, Serialize};

use crate::Symbology;

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) const KIND: &'static str = $kind;

            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($kind, "@{}"), self.0)
            }
        }
    };
}

handle!(
    /// Live binding between a camera source and the recognition engine.
    ContextId,
    "context"
);
handle!(
    /// Active video input device owned by a context.
    CameraId,
    "camera"
);
handle!(
    /// Scan mode: the enable switch plus symbology configuration.
    ModeId,
    "mode"
);
handle!(
    /// Visual layer bound to a scan mode and the render surface.
    OverlayId,
    "overlay"
);

/// Anchor in the host document the render surface attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    element_id: String,
}

impl MountPoint {
    pub fn element(id: impl Into<String>) -> Self {
        Self {
            element_id: id.into(),
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }
}

/// Which way the active camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraFacing {
    Back,
    Front,
}

impl CameraFacing {
    pub fn opposite(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }
}

/// Operating state of a frame source. Scanning is only meaningful once the
/// camera reaches `On`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSourceState {
    Off,
    On,
}

/// Capture settings applied to the camera before it becomes the frame source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub preferred_resolution: (u32, u32),
    pub max_frame_rate: f32,
}

impl CameraSettings {
    /// Engine-recommended defaults for barcode recognition.
    pub fn recommended() -> Self {
        Self {
            preferred_resolution: (1280, 720),
            max_frame_rate: 30.0,
        }
    }
}

/// Decorative viewfinder shape drawn on the overlay. No effect on recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewfinderShape {
    Square,
    Rounded,
}

/// Line style the viewfinder is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewfinderLineStyle {
    Light,
    Bold,
}

/// Shape plus line style shown to the user as an aiming guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewfinder {
    pub shape: ViewfinderShape,
    pub line_style: ViewfinderLineStyle,
}

impl Viewfinder {
    /// The square, light-line viewfinder the session attaches by default.
    pub fn square() -> Self {
        Self {
            shape: ViewfinderShape::Square,
            line_style: ViewfinderLineStyle::Light,
        }
    }
}

/// One decoded barcode as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedBarcode {
    /// Decoded payload; absent for formats the engine decodes without data.
    pub data: Option<String>,
    pub symbology: Symbology,
}

impl RecognizedBarcode {
    pub fn new(data: impl Into<String>, symbology: Symbology) -> Self {
        Self {
            data: Some(data.into()),
            symbology,
        }
    }

    pub fn without_data(symbology: Symbology) -> Self {
        Self {
            data: None,
            symbology,
        }
    }
}

/// One recognition event: every barcode the engine decoded in a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub batch: Vec<RecognizedBarcode>,
}
