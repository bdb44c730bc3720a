use crate::types::{ClassMap, LandCoverClass, LandError, LandResult, TransitionMap};
use std::collections::HashMap;

/// Change-detection rule sets, selected per model/tile identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeRuleset {
    /// The three categorical transitions only
    Simplified,
    /// The categorical transitions plus aggregate water-loss/gain accounting
    Detailed,
}

impl ChangeRuleset {
    /// Transition kinds tracked by this rule set, in evaluation order
    pub fn tracked_kinds(self) -> &'static [TransitionKind] {
        match self {
            ChangeRuleset::Simplified => &[
                TransitionKind::WaterToBuiltUp,
                TransitionKind::WaterToVegetation,
                TransitionKind::VegetationToBuiltUp,
            ],
            ChangeRuleset::Detailed => &[
                TransitionKind::WaterToBuiltUp,
                TransitionKind::WaterToVegetation,
                TransitionKind::VegetationToBuiltUp,
                TransitionKind::WaterLostTotal,
                TransitionKind::WaterGainedTotal,
            ],
        }
    }
}

/// Land-cover transitions tracked between two acquisitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    WaterToBuiltUp,
    WaterToVegetation,
    VegetationToBuiltUp,
    /// Water that became anything else; statistics-only and double-counts
    /// the categorical water transitions
    WaterLostTotal,
    /// Anything else that became water; statistics-only
    WaterGainedTotal,
}

impl TransitionKind {
    /// Label written into the transition map, `None` for statistics-only
    /// aggregates
    pub fn map_label(self) -> Option<u8> {
        match self {
            TransitionKind::WaterToBuiltUp => Some(1),
            TransitionKind::WaterToVegetation => Some(2),
            TransitionKind::VegetationToBuiltUp => Some(3),
            TransitionKind::WaterLostTotal | TransitionKind::WaterGainedTotal => None,
        }
    }

    /// Whether a pixel's label pair matches this transition
    fn matches(self, before: u8, after: u8) -> bool {
        let water = LandCoverClass::Water.label();
        let built_up = LandCoverClass::BuiltUp.label();
        let vegetation = LandCoverClass::Vegetation.label();
        match self {
            TransitionKind::WaterToBuiltUp => before == water && after == built_up,
            TransitionKind::WaterToVegetation => before == water && after == vegetation,
            TransitionKind::VegetationToBuiltUp => before == vegetation && after == built_up,
            TransitionKind::WaterLostTotal => before == water && after != water,
            TransitionKind::WaterGainedTotal => before != water && after == water,
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::WaterToBuiltUp => write!(f, "Water → Built-up"),
            TransitionKind::WaterToVegetation => write!(f, "Water → Vegetation"),
            TransitionKind::VegetationToBuiltUp => write!(f, "Vegetation → Built-up"),
            TransitionKind::WaterLostTotal => write!(f, "Water Lost (Total)"),
            TransitionKind::WaterGainedTotal => write!(f, "Water Gained (Total)"),
        }
    }
}

/// Change-detection parameters
#[derive(Debug, Clone)]
pub struct ChangeDetectorParams {
    /// Ground area covered by one pixel, in square kilometers
    pub pixel_area_km2: f64,
}

impl Default for ChangeDetectorParams {
    fn default() -> Self {
        Self {
            // 10 m x 10 m pixel (Sentinel-2 visible/NIR resolution)
            pixel_area_km2: (10.0 * 10.0) / 1e6,
        }
    }
}

/// Aggregate change statistics
#[derive(Debug, Clone)]
pub struct ChangeStatistics {
    /// Area per transition kind in square kilometers
    pub areas_km2: HashMap<TransitionKind, f64>,
    /// Share of pixels carrying any tracked categorical transition, 0-100
    pub changed_percent: f64,
}

/// Transition map plus its aggregate statistics
#[derive(Debug, Clone)]
pub struct ChangeDetection {
    pub transition_map: TransitionMap,
    pub statistics: ChangeStatistics,
}

/// Temporal change detector comparing two classification maps of the same
/// tile
pub struct ChangeDetector {
    params: ChangeDetectorParams,
}

impl ChangeDetector {
    /// Create a change detector with default parameters
    pub fn new() -> Self {
        Self {
            params: ChangeDetectorParams::default(),
        }
    }

    /// Create a change detector with custom parameters
    pub fn with_params(params: ChangeDetectorParams) -> Self {
        Self { params }
    }

    /// Compare two classification maps and quantify land-cover transitions
    ///
    /// Both maps must have identical shape. Categorical transitions are
    /// written into the map in the rule set's fixed order, a later match
    /// overwriting an earlier one; the predicates are disjoint for
    /// well-formed label maps, so the order only matters for malformed
    /// input. Statistics count predicate matches independently of map
    /// overwrites.
    pub fn detect_changes(
        &self,
        pred1: &ClassMap,
        pred2: &ClassMap,
        ruleset: ChangeRuleset,
    ) -> LandResult<ChangeDetection> {
        if pred1.dim() != pred2.dim() {
            return Err(LandError::ShapeMismatch {
                left: pred1.dim(),
                right: pred2.dim(),
            });
        }

        let (height, width) = pred1.dim();
        log::info!(
            "Detecting changes on {}x{} maps ({:?} ruleset)",
            height,
            width,
            ruleset
        );

        let kinds = ruleset.tracked_kinds();
        let mut counts: HashMap<TransitionKind, usize> =
            kinds.iter().map(|&kind| (kind, 0)).collect();

        let mut transition_map = TransitionMap::zeros(pred1.raw_dim());
        for ((r, c), value) in transition_map.indexed_iter_mut() {
            let before = pred1[[r, c]];
            let after = pred2[[r, c]];
            for &kind in kinds {
                if kind.matches(before, after) {
                    *counts.entry(kind).or_insert(0) += 1;
                    if let Some(label) = kind.map_label() {
                        *value = label;
                    }
                }
            }
        }

        let areas_km2: HashMap<TransitionKind, f64> = counts
            .iter()
            .map(|(&kind, &count)| (kind, count as f64 * self.params.pixel_area_km2))
            .collect();

        let changed = transition_map.iter().filter(|&&v| v != 0).count();
        let changed_percent = changed as f64 / transition_map.len() as f64 * 100.0;

        for &kind in kinds {
            log::debug!("{}: {:.6} km²", kind, areas_km2[&kind]);
        }
        log::info!("Change detection complete: {:.2}% of pixels changed", changed_percent);

        Ok(ChangeDetection {
            transition_map,
            statistics: ChangeStatistics {
                areas_km2,
                changed_percent,
            },
        })
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}
