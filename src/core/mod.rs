//! Core land-cover processing modules

pub mod change;
pub mod classify;
pub mod cleanup;
pub mod normalize;

// Re-export main types
pub use change::{
    ChangeDetection, ChangeDetector, ChangeDetectorParams, ChangeRuleset, ChangeStatistics,
    TransitionKind,
};
pub use classify::{
    classify_raster, labels_from_probabilities, to_feature_matrix, Classifier, LandCoverPipeline,
};
pub use cleanup::{ClassificationCleaner, CleanupParams};
pub use normalize::{repair_invalid_samples, Normalizer};
