use crate::types::{BandPercentiles, BandRaster, LandError, LandResult, NormalizationParams, RasterTile};
use ndarray::{ArrayViewMut2, Axis};

/// Raw digital-number inputs are detected by a single global check and
/// divided by this factor to recover reflectance
const DIGITAL_NUMBER_SCALE: f32 = 10000.0;

/// Band normalizer matching a trained model's preprocessing
///
/// Holds the per-band statistics saved at training time and maps raw
/// reflectance bands into `[0, 1]` so the inference distribution matches the
/// training distribution. Each call produces a fresh raster and threads the
/// tile's geo-transform through unchanged.
pub struct Normalizer {
    params: NormalizationParams,
}

impl Normalizer {
    /// Create a normalizer from a model's saved statistics
    pub fn new(params: NormalizationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Normalize a raster tile into `[0, 1]` per band
    pub fn normalize(&self, tile: &RasterTile) -> LandResult<RasterTile> {
        let (bands, height, width) = tile.data.dim();
        log::info!(
            "Applying {} normalization to {} bands of {}x{} pixels",
            self.strategy_name(),
            bands,
            height,
            width
        );

        let mut data = tile.data.clone();
        repair_invalid_samples(&mut data)?;

        match &self.params {
            NormalizationParams::ZScore { mean, std } => {
                normalize_zscore(&mut data, mean, std)?;
            }
            NormalizationParams::Percentile { num_bands, limits } => {
                normalize_percentile(&mut data, *num_bands, limits)?;
            }
        }

        log::info!("Normalization completed successfully");
        Ok(RasterTile {
            data,
            transform: tile.transform.clone(),
        })
    }

    fn strategy_name(&self) -> &'static str {
        match &self.params {
            NormalizationParams::ZScore { .. } => "z-score",
            NormalizationParams::Percentile { .. } => "robust percentile",
        }
    }
}

/// Replace invalid samples in every band with that band's median
///
/// A sample is invalid if it is not finite (NaN or infinite). Bands without
/// invalid samples are left untouched, so repairing an already-clean raster
/// is the identity. Fails if a band has no valid samples at all, since no
/// repair value can be derived for it.
pub fn repair_invalid_samples(raster: &mut BandRaster) -> LandResult<()> {
    for (band_index, mut band) in raster.axis_iter_mut(Axis(0)).enumerate() {
        let invalid = band.iter().filter(|v| !v.is_finite()).count();
        if invalid == 0 {
            continue;
        }

        let mut valid: Vec<f32> = band.iter().copied().filter(|v| v.is_finite()).collect();
        if valid.is_empty() {
            return Err(LandError::AllInvalidBand { band: band_index });
        }

        let median = sorted_median(&mut valid);
        log::debug!(
            "Band {}: replacing {} invalid samples with median {:.6}",
            band_index,
            invalid,
            median
        );
        band.mapv_inplace(|x| if x.is_finite() { x } else { median });
    }

    Ok(())
}

/// Z-score normalization with the exact statistics used at training time
///
/// Outliers (clouds, sensor noise) are bounded by clipping to three standard
/// deviations rather than discarded. Input is assumed to already be physical
/// reflectance in `[0, 1]`; raw digital-number sources must be pre-scaled by
/// the caller.
fn normalize_zscore(data: &mut BandRaster, mean: &[f32], std: &[f32]) -> LandResult<()> {
    let bands = data.len_of(Axis(0));
    if mean.len() != bands || std.len() != bands {
        return Err(LandError::Processing(format!(
            "z-score statistics cover {}/{} bands, raster has {}",
            mean.len(),
            std.len(),
            bands
        )));
    }

    #[cfg(feature = "parallel")]
    {
        use ndarray::parallel::prelude::*;
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut band)| apply_zscore_band(&mut band, mean[i], std[i]));
    }
    #[cfg(not(feature = "parallel"))]
    for (i, mut band) in data.axis_iter_mut(Axis(0)).enumerate() {
        apply_zscore_band(&mut band, mean[i], std[i]);
    }

    Ok(())
}

fn apply_zscore_band(band: &mut ArrayViewMut2<'_, f32>, mean: f32, std: f32) {
    // A constant band has zero spread; dividing by 1 keeps it finite
    let std = if std == 0.0 { 1.0 } else { std };
    band.mapv_inplace(|x| (((x - mean) / std).clamp(-3.0, 3.0) + 3.0) / 6.0);
}

/// Robust percentile normalization
///
/// If the raster's global maximum exceeds 1.0 the whole raster is treated as
/// raw digital numbers and divided by 10000 first. This is a single global
/// check: a tile mixing raw and reflectance bands would have its reflectance
/// bands mis-scaled. Bands past `num_bands` are zero-filled.
fn normalize_percentile(
    data: &mut BandRaster,
    num_bands: usize,
    limits: &[Option<BandPercentiles>],
) -> LandResult<()> {
    let bands = data.len_of(Axis(0));
    if num_bands > bands {
        return Err(LandError::Processing(format!(
            "percentile statistics describe {} bands, raster has only {}",
            num_bands, bands
        )));
    }

    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 1.0 {
        log::info!(
            "Raster maximum {:.1} exceeds 1.0, scaling by {} (raw digital-number input)",
            max,
            DIGITAL_NUMBER_SCALE
        );
        data.mapv_inplace(|x| x / DIGITAL_NUMBER_SCALE);
    }

    #[cfg(feature = "parallel")]
    {
        use ndarray::parallel::prelude::*;
        data.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut band)| {
                if i < num_bands {
                    apply_percentile_band(&mut band, i, limits.get(i).copied().flatten());
                } else {
                    band.fill(0.0);
                }
            });
    }
    #[cfg(not(feature = "parallel"))]
    for (i, mut band) in data.axis_iter_mut(Axis(0)).enumerate() {
        if i < num_bands {
            apply_percentile_band(&mut band, i, limits.get(i).copied().flatten());
        } else {
            band.fill(0.0);
        }
    }

    Ok(())
}

fn apply_percentile_band(
    band: &mut ArrayViewMut2<'_, f32>,
    band_index: usize,
    saved: Option<BandPercentiles>,
) {
    let (p_low, p_high) = match saved {
        Some(limits) => (limits.p_low, limits.p_high),
        None => {
            log::warn!(
                "Missing percentile limits for band {}, falling back to the band's own 2nd/98th percentiles",
                band_index
            );
            let mut values: Vec<f32> = band.iter().copied().collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            (
                percentile_sorted(&values, 2.0),
                percentile_sorted(&values, 98.0),
            )
        }
    };

    if p_high > p_low {
        let range = p_high - p_low;
        band.mapv_inplace(|x| (x.clamp(p_low, p_high) - p_low) / range);
    } else {
        // Constant or saturated band: collapse to a neutral value instead of
        // dividing by zero
        log::warn!(
            "Degenerate percentile range for band {} (p_high {:.6} <= p_low {:.6}), zero-filling",
            band_index,
            p_high,
            p_low
        );
        band.fill(0.0);
    }
}

/// Median of a sample set; even counts average the two middle values
fn sorted_median(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Percentile of pre-sorted samples with linear interpolation between
/// order statistics
fn percentile_sorted(sorted: &[f32], q: f32) -> f32 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q / 100.0 * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f32;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    }
}
