use landshift::{
    BandPercentiles, Classifier, GeoTransform, LandCoverClass, LandCoverPipeline, LandResult,
    NormalizationParams, Normalizer, RasterTile,
};
use ndarray::{Array2, Array3, ArrayView2, Axis};

/// Stand-in for the trained model: votes water when the first normalized
/// feature is high, background otherwise
struct BandThresholdClassifier {
    threshold: f32,
}

impl Classifier for BandThresholdClassifier {
    fn predict(&self, features: ArrayView2<'_, f32>) -> LandResult<Array2<f32>> {
        let mut probabilities = Array2::zeros((features.nrows(), LandCoverClass::COUNT));
        for (pixel, row) in features.axis_iter(Axis(0)).enumerate() {
            if row[0] > self.threshold {
                probabilities[[pixel, 1]] = 1.0;
            } else {
                probabilities[[pixel, 0]] = 1.0;
            }
        }
        Ok(probabilities)
    }
}

fn test_transform() -> GeoTransform {
    GeoTransform {
        top_left_x: 81.2,
        pixel_width: 0.0001,
        rotation_x: 0.0,
        top_left_y: 16.6,
        rotation_y: 0.0,
        pixel_height: -0.0001,
    }
}

/// Four-band tile with a bright 12x12 lake in band 0 plus isolated noise
/// pixels that the cleaner should remove
fn lake_tile(scale: f32) -> RasterTile {
    let mut data = Array3::from_elem((4, 32, 32), 0.1 * scale);
    for r in 8..20 {
        for c in 8..20 {
            data[[0, r, c]] = 0.9 * scale;
        }
    }
    for &(r, c) in &[(2, 2), (2, 29), (28, 3), (25, 25), (30, 30)] {
        data[[0, r, c]] = 0.9 * scale;
    }
    RasterTile {
        data,
        transform: test_transform(),
    }
}

#[test]
fn test_zscore_pipeline_produces_cleaned_map() {
    let _ = env_logger::builder().is_test(true).try_init();

    let normalizer = Normalizer::new(NormalizationParams::ZScore {
        mean: vec![0.5, 0.1, 0.1, 0.1],
        std: vec![0.2, 0.05, 0.05, 0.05],
    });
    let pipeline = LandCoverPipeline::new(normalizer);
    let classifier = BandThresholdClassifier { threshold: 0.5 };

    let tile = lake_tile(1.0);
    let (labels, transform) = pipeline
        .predict_map(&tile, &classifier)
        .expect("pipeline should succeed");

    assert_eq!(labels.dim(), (32, 32));
    assert_eq!(transform, tile.transform);

    // The lake interior survives cleanup
    for r in 9..19 {
        for c in 9..19 {
            assert_eq!(
                labels[[r, c]],
                LandCoverClass::Water.label(),
                "lake pixel ({}, {}) lost",
                r,
                c
            );
        }
    }

    // Isolated single-pixel water detections are scrubbed to background
    for &(r, c) in &[(2, 2), (2, 29), (28, 3), (25, 25), (30, 30)] {
        assert_eq!(labels[[r, c]], LandCoverClass::Background.label());
    }

    // Only labels from the closed set appear
    assert!(labels.iter().all(|&v| v < LandCoverClass::COUNT as u8));
}

#[test]
fn test_percentile_pipeline_handles_raw_digital_numbers() {
    // Same tile exported as raw digital numbers (reflectance x 10000); the
    // normalizer's global heuristic rescales it before applying limits
    let normalizer = Normalizer::new(NormalizationParams::Percentile {
        num_bands: 4,
        limits: vec![
            Some(BandPercentiles {
                p_low: 0.1,
                p_high: 0.9,
            });
            4
        ],
    });
    let pipeline = LandCoverPipeline::new(normalizer);
    let classifier = BandThresholdClassifier { threshold: 0.5 };

    let tile = lake_tile(10000.0);
    let (labels, _) = pipeline
        .predict_map(&tile, &classifier)
        .expect("pipeline should succeed");

    assert_eq!(labels[[14, 14]], LandCoverClass::Water.label());
    assert_eq!(labels[[0, 0]], LandCoverClass::Background.label());
    assert_eq!(labels[[25, 25]], LandCoverClass::Background.label());
}

#[test]
fn test_pipeline_repairs_invalid_samples() {
    let normalizer = Normalizer::new(NormalizationParams::ZScore {
        mean: vec![0.5, 0.1, 0.1, 0.1],
        std: vec![0.2, 0.05, 0.05, 0.05],
    });
    let pipeline = LandCoverPipeline::new(normalizer);
    let classifier = BandThresholdClassifier { threshold: 0.5 };

    let mut tile = lake_tile(1.0);
    tile.data[[0, 0, 5]] = f32::NAN;
    tile.data[[2, 10, 10]] = f32::NAN;

    let (labels, _) = pipeline
        .predict_map(&tile, &classifier)
        .expect("NaN samples must not break the pipeline");

    assert_eq!(labels.dim(), (32, 32));
    assert_eq!(labels[[14, 14]], LandCoverClass::Water.label());
}
