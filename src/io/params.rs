use crate::types::{BandPercentiles, LandError, LandResult, NormalizationParams};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Raw normalization artifact as saved by the training pipeline
///
/// Two layouts exist: `mean`/`std` vectors for z-score models, or
/// `num_bands` plus `band_{i}_p_low`/`band_{i}_p_high` scalars for
/// percentile models. The per-band keys are captured untyped since the
/// band count is only known at parse time.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    mean: Option<Vec<f32>>,
    std: Option<Vec<f32>>,
    num_bands: Option<usize>,
    #[serde(flatten)]
    band_keys: HashMap<String, f32>,
}

/// Parse a normalization artifact from its JSON payload
pub fn from_json(payload: &str) -> LandResult<NormalizationParams> {
    let raw: RawArtifact = serde_json::from_str(payload)?;

    match (raw.mean, raw.std, raw.num_bands) {
        (Some(mean), Some(std), _) => {
            if mean.len() != std.len() {
                return Err(LandError::InvalidArtifact(format!(
                    "mean covers {} bands but std covers {}",
                    mean.len(),
                    std.len()
                )));
            }
            Ok(NormalizationParams::ZScore { mean, std })
        }
        (None, None, Some(num_bands)) => {
            let limits = (0..num_bands)
                .map(|i| {
                    let p_low = raw.band_keys.get(&format!("band_{}_p_low", i));
                    let p_high = raw.band_keys.get(&format!("band_{}_p_high", i));
                    match (p_low, p_high) {
                        (Some(&p_low), Some(&p_high)) => {
                            Some(BandPercentiles { p_low, p_high })
                        }
                        _ => {
                            log::warn!(
                                "Artifact lacks percentile keys for band {}, runtime fallback will apply",
                                i
                            );
                            None
                        }
                    }
                })
                .collect();
            Ok(NormalizationParams::Percentile { num_bands, limits })
        }
        (Some(_), None, _) | (None, Some(_), _) => Err(LandError::InvalidArtifact(
            "artifact has only one of mean/std".to_string(),
        )),
        (None, None, None) => Err(LandError::InvalidArtifact(
            "artifact matches neither the mean/std nor the percentile layout".to_string(),
        )),
    }
}

/// Load a normalization artifact from a JSON file
pub fn load_artifact<P: AsRef<Path>>(path: P) -> LandResult<NormalizationParams> {
    log::info!("Loading normalization artifact: {}", path.as_ref().display());
    let payload = std::fs::read_to_string(path)?;
    from_json(&payload)
}

/// Read-only store of per-model normalization statistics
///
/// Populated once at startup, then shared across requests. Lookups borrow;
/// the store is never written after loading, so concurrent readers need no
/// locking.
#[derive(Debug, Default)]
pub struct ParameterStore {
    models: HashMap<String, NormalizationParams>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model's parameters directly
    pub fn insert(&mut self, model_id: impl Into<String>, params: NormalizationParams) {
        self.models.insert(model_id.into(), params);
    }

    /// Load a model's parameters from its saved artifact
    pub fn load_model<P: AsRef<Path>>(
        &mut self,
        model_id: impl Into<String>,
        path: P,
    ) -> LandResult<()> {
        let params = load_artifact(path)?;
        self.insert(model_id, params);
        Ok(())
    }

    pub fn get(&self, model_id: &str) -> Option<&NormalizationParams> {
        self.models.get(model_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
