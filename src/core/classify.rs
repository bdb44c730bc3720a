use crate::core::cleanup::ClassificationCleaner;
use crate::core::normalize::Normalizer;
use crate::types::{
    BandRaster, ClassMap, GeoTransform, LandCoverClass, LandError, LandResult, RasterTile,
};
use ndarray::{Array2, ArrayView2, Axis};

/// Opaque per-pixel classification capability
///
/// Implementations map a feature matrix of shape (pixels, bands) to class
/// probabilities of shape (pixels, classes). The inference backend is
/// entirely the implementor's concern; the pipeline only derives labels
/// from the returned probabilities.
pub trait Classifier {
    fn predict(&self, features: ArrayView2<'_, f32>) -> LandResult<Array2<f32>>;
}

/// Reshape a (bands, height, width) raster into a pixel-major
/// (height * width, bands) feature matrix
///
/// Pixel (r, c) lands at row `r * width + c`, so labels derived from the
/// classifier output reshape straight back to (height, width).
pub fn to_feature_matrix(raster: &BandRaster) -> Array2<f32> {
    let (bands, height, width) = raster.dim();
    let mut features = Array2::zeros((height * width, bands));
    for (band_index, band) in raster.axis_iter(Axis(0)).enumerate() {
        for ((r, c), &value) in band.indexed_iter() {
            features[[r * width + c, band_index]] = value;
        }
    }
    features
}

/// Derive a class label raster from per-pixel class probabilities
///
/// Takes the argmax over the class axis per pixel; ties resolve to the
/// lower class index. The probability matrix must carry one row per pixel
/// and exactly the supported class count.
pub fn labels_from_probabilities(
    probabilities: &Array2<f32>,
    height: usize,
    width: usize,
) -> LandResult<ClassMap> {
    let (rows, classes) = probabilities.dim();
    if rows != height * width {
        return Err(LandError::Processing(format!(
            "classifier returned {} rows for {} pixels",
            rows,
            height * width
        )));
    }
    if classes != LandCoverClass::COUNT {
        return Err(LandError::Processing(format!(
            "classifier returned {} classes, expected {}",
            classes,
            LandCoverClass::COUNT
        )));
    }

    let mut labels = ClassMap::zeros((height, width));
    for (pixel, row) in probabilities.axis_iter(Axis(0)).enumerate() {
        let mut best = 0usize;
        let mut best_score = row[0];
        for (class_index, &score) in row.iter().enumerate().skip(1) {
            if score > best_score {
                best = class_index;
                best_score = score;
            }
        }
        labels[[pixel / width, pixel % width]] = best as u8;
    }

    Ok(labels)
}

/// Classify a normalized raster into a raw per-pixel label map
pub fn classify_raster<C: Classifier + ?Sized>(
    raster: &BandRaster,
    classifier: &C,
) -> LandResult<ClassMap> {
    let (bands, height, width) = raster.dim();
    log::debug!(
        "Classifying {}x{} pixels with {} features each",
        height,
        width,
        bands
    );

    let features = to_feature_matrix(raster);
    let probabilities = classifier.predict(features.view())?;
    labels_from_probabilities(&probabilities, height, width)
}

/// Single-tile prediction pipeline: normalize, classify, clean
///
/// Stateless per call; one instance can serve concurrent requests since
/// every invocation works on freshly allocated buffers.
pub struct LandCoverPipeline {
    normalizer: Normalizer,
    cleaner: ClassificationCleaner,
}

impl LandCoverPipeline {
    /// Create a pipeline with the default cleaner
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            cleaner: ClassificationCleaner::new(),
        }
    }

    /// Create a pipeline with a custom cleaner
    pub fn with_cleaner(normalizer: Normalizer, cleaner: ClassificationCleaner) -> Self {
        Self { normalizer, cleaner }
    }

    /// Produce a cleaned land-cover map for one raster tile
    ///
    /// The tile's geo-transform is returned unchanged for downstream
    /// rendering and georeferencing.
    pub fn predict_map<C: Classifier + ?Sized>(
        &self,
        tile: &RasterTile,
        classifier: &C,
    ) -> LandResult<(ClassMap, GeoTransform)> {
        let (bands, height, width) = tile.data.dim();
        log::info!(
            "Predicting land cover for a {}x{} tile with {} bands",
            height,
            width,
            bands
        );

        let normalized = self.normalizer.normalize(tile)?;
        let raw_labels = classify_raster(&normalized.data, classifier)?;
        let cleaned = self.cleaner.clean(&raw_labels);

        Ok((cleaned, normalized.transform))
    }
}
