use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// Multiband reflectance raster (band x height x width)
pub type BandRaster = Array3<f32>;

/// Per-pixel land-cover label raster (height x width)
pub type ClassMap = Array2<u8>;

/// Per-pixel land-cover transition raster (height x width)
pub type TransitionMap = Array2<u8>;

/// Land-cover classes produced by the per-pixel classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LandCoverClass {
    Background = 0,
    Water = 1,
    BuiltUp = 2,
    Vegetation = 3,
}

impl LandCoverClass {
    /// Number of classes in the label set
    pub const COUNT: usize = 4;

    /// Map a class index (e.g. an argmax result) back to a class
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LandCoverClass::Background),
            1 => Some(LandCoverClass::Water),
            2 => Some(LandCoverClass::BuiltUp),
            3 => Some(LandCoverClass::Vegetation),
            _ => None,
        }
    }

    pub fn label(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LandCoverClass::Background => write!(f, "Background"),
            LandCoverClass::Water => write!(f, "Water"),
            LandCoverClass::BuiltUp => write!(f, "Built-up"),
            LandCoverClass::Vegetation => write!(f, "Vegetation"),
        }
    }
}

/// Geospatial transformation parameters
///
/// Carried through the pipeline unchanged; the processing stages never
/// inspect or modify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

/// A raster tile together with its geospatial transform, as produced by an
/// external raster reader
#[derive(Debug, Clone)]
pub struct RasterTile {
    pub data: BandRaster,
    pub transform: GeoTransform,
}

/// Saved percentile limits for one band (2nd and 98th percentile at
/// training time)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPercentiles {
    pub p_low: f32,
    pub p_high: f32,
}

/// Per-model, per-band normalization statistics
///
/// Loaded once at startup from a trained model's saved artifact and shared
/// read-only across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NormalizationParams {
    /// Mean/std normalization with clipping, matching training-time
    /// statistics exactly
    ZScore { mean: Vec<f32>, std: Vec<f32> },
    /// Robust percentile normalization; `limits[i] == None` means the
    /// artifact lacked that band's keys and the current band's percentiles
    /// are used as a fallback
    Percentile {
        num_bands: usize,
        limits: Vec<Option<BandPercentiles>>,
    },
}

/// Error types for land-cover processing
#[derive(Debug, thiserror::Error)]
pub enum LandError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("band {band} has no valid samples")]
    AllInvalidBand { band: usize },

    #[error("raster shapes do not match: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("invalid normalization artifact: {0}")]
    InvalidArtifact(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for land-cover operations
pub type LandResult<T> = Result<T, LandError>;
