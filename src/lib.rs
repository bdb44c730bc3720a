//! Landshift: A Fast, Modular Land-Cover Classification and Change-Detection Core
//!
//! This library provides the numeric core of a land-cover monitoring service
//! for multispectral satellite tiles: band normalization matched to a trained
//! per-pixel classifier, cleanup of spurious small regions in the resulting
//! classification maps, and temporal change detection between two classified
//! acquisitions of the same tile.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    BandPercentiles, BandRaster, ClassMap, GeoTransform, LandCoverClass, LandError, LandResult,
    NormalizationParams, RasterTile, TransitionMap,
};

pub use io::{load_artifact, ParameterStore};

pub use core::{
    classify_raster, ChangeDetection, ChangeDetector, ChangeDetectorParams, ChangeRuleset,
    ChangeStatistics, ClassificationCleaner, Classifier, CleanupParams, LandCoverPipeline,
    Normalizer, TransitionKind,
};
