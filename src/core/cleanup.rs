use crate::types::{ClassMap, LandCoverClass};
use ndarray::Array2;

/// 3x3 cross structuring element (center plus edge-adjacent neighbors)
const CROSS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Classification cleanup parameters
#[derive(Debug, Clone)]
pub struct CleanupParams {
    /// Connected water regions smaller than this many pixels are removed
    pub min_water_region_size: usize,
}

impl Default for CleanupParams {
    fn default() -> Self {
        Self {
            min_water_region_size: 50,
        }
    }
}

/// Post-processor removing spurious small water regions from a
/// classification map
///
/// Only water pixels are ever modified: spurious water becomes background,
/// and every originally-non-water pixel is preserved verbatim. Connectivity
/// is 4-neighbor (edge adjacency) throughout, both for region labeling and
/// for the morphological structuring element.
pub struct ClassificationCleaner {
    params: CleanupParams,
}

impl ClassificationCleaner {
    /// Create a cleaner with default parameters
    pub fn new() -> Self {
        Self {
            params: CleanupParams::default(),
        }
    }

    /// Create a cleaner with custom parameters
    pub fn with_params(params: CleanupParams) -> Self {
        Self { params }
    }

    /// Remove spurious small water regions from a classification map
    pub fn clean(&self, labels: &ClassMap) -> ClassMap {
        let water = LandCoverClass::Water.label();
        let water_mask = labels.mapv(|v| v == water);
        let water_before = water_mask.iter().filter(|&&m| m).count();

        // No water anywhere: nothing to clean
        if water_before == 0 {
            log::debug!("Classification map has no water pixels, skipping cleanup");
            return labels.clone();
        }

        log::info!(
            "Cleaning classification map: {} water pixels, minimum region size {}",
            water_before,
            self.params.min_water_region_size
        );

        let mut cleaned_mask =
            remove_small_regions(&water_mask, self.params.min_water_region_size);
        cleaned_mask = binary_opening(&cleaned_mask);
        cleaned_mask = binary_closing(&cleaned_mask);

        // Write back only into originally-water positions; whatever the
        // morphological mask says elsewhere is ignored
        let mut cleaned = labels.clone();
        for ((r, c), value) in cleaned.indexed_iter_mut() {
            if water_mask[[r, c]] {
                *value = if cleaned_mask[[r, c]] {
                    water
                } else {
                    LandCoverClass::Background.label()
                };
            }
        }

        let water_after = cleaned.iter().filter(|&&v| v == water).count();
        log::info!(
            "Cleanup completed: {} water pixels remain ({} removed)",
            water_after,
            water_before - water_after
        );

        cleaned
    }
}

impl Default for ClassificationCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop 4-connected components smaller than `min_size` pixels
fn remove_small_regions(mask: &Array2<bool>, min_size: usize) -> Array2<bool> {
    let (height, width) = mask.dim();
    let mut kept = mask.clone();
    let mut visited = Array2::from_elem((height, width), false);
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut component: Vec<(usize, usize)> = Vec::new();

    for r in 0..height {
        for c in 0..width {
            if !mask[[r, c]] || visited[[r, c]] {
                continue;
            }

            // Grow the component from this seed with an explicit worklist
            component.clear();
            visited[[r, c]] = true;
            stack.push((r, c));
            while let Some((i, j)) = stack.pop() {
                component.push((i, j));
                for (di, dj) in CROSS {
                    let ni = i as i32 + di;
                    let nj = j as i32 + dj;
                    if ni < 0 || nj < 0 || ni >= height as i32 || nj >= width as i32 {
                        continue;
                    }
                    let (ni, nj) = (ni as usize, nj as usize);
                    if mask[[ni, nj]] && !visited[[ni, nj]] {
                        visited[[ni, nj]] = true;
                        stack.push((ni, nj));
                    }
                }
            }

            if component.len() < min_size {
                log::debug!(
                    "Removing water region of {} pixels at ({}, {})",
                    component.len(),
                    r,
                    c
                );
                for &(i, j) in &component {
                    kept[[i, j]] = false;
                }
            }
        }
    }

    kept
}

/// Binary erosion with the cross element; out-of-raster neighbors count as
/// background, so mask pixels on the raster edge erode
fn binary_erosion(mask: &Array2<bool>) -> Array2<bool> {
    let (height, width) = mask.dim();
    let mut eroded = Array2::from_elem((height, width), false);

    for i in 0..height {
        for j in 0..width {
            if !mask[[i, j]] {
                continue;
            }
            let mut keep = true;
            for (di, dj) in CROSS {
                let ni = i as i32 + di;
                let nj = j as i32 + dj;
                if ni < 0 || nj < 0 || ni >= height as i32 || nj >= width as i32 {
                    keep = false;
                    break;
                }
                if !mask[[ni as usize, nj as usize]] {
                    keep = false;
                    break;
                }
            }
            eroded[[i, j]] = keep;
        }
    }

    eroded
}

/// Binary dilation with the cross element
fn binary_dilation(mask: &Array2<bool>) -> Array2<bool> {
    let (height, width) = mask.dim();
    let mut dilated = mask.clone();

    for i in 0..height {
        for j in 0..width {
            if mask[[i, j]] {
                continue;
            }
            for (di, dj) in CROSS {
                let ni = i as i32 + di;
                let nj = j as i32 + dj;
                if ni < 0 || nj < 0 || ni >= height as i32 || nj >= width as i32 {
                    continue;
                }
                if mask[[ni as usize, nj as usize]] {
                    dilated[[i, j]] = true;
                    break;
                }
            }
        }
    }

    dilated
}

/// One iteration of binary opening (erosion then dilation), removing thin
/// spurious protrusions
fn binary_opening(mask: &Array2<bool>) -> Array2<bool> {
    binary_dilation(&binary_erosion(mask))
}

/// One iteration of binary closing (dilation then erosion), filling small
/// holes
fn binary_closing(mask: &Array2<bool>) -> Array2<bool> {
    binary_erosion(&binary_dilation(mask))
}
