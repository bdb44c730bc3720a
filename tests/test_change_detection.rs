use landshift::{
    ChangeDetector, ChangeDetectorParams, ChangeRuleset, ClassMap, LandCoverClass, LandError,
    TransitionKind,
};

const BACKGROUND: u8 = 0;
const WATER: u8 = 1;
const BUILT_UP: u8 = 2;
const VEGETATION: u8 = 3;

/// 2018-style acquisition: a 10x10 lake with a vegetation strip east of it
fn older_map() -> ClassMap {
    let mut labels = ClassMap::from_elem((20, 20), BACKGROUND);
    for r in 5..15 {
        for c in 2..12 {
            labels[[r, c]] = WATER;
        }
        for c in 14..18 {
            labels[[r, c]] = VEGETATION;
        }
    }
    labels
}

/// 2024-style acquisition: the lake's eastern half built over, the
/// vegetation strip partially built over, a small new pond
fn newer_map() -> ClassMap {
    let mut labels = older_map();
    for r in 5..15 {
        for c in 7..12 {
            labels[[r, c]] = BUILT_UP;
        }
        for c in 14..16 {
            labels[[r, c]] = BUILT_UP;
        }
    }
    for r in 17..19 {
        for c in 17..19 {
            labels[[r, c]] = WATER;
        }
    }
    labels
}

#[test]
fn test_simplified_ruleset_quantifies_transitions() {
    let _ = env_logger::builder().is_test(true).try_init();

    let detector = ChangeDetector::new();
    let result = detector
        .detect_changes(&older_map(), &newer_map(), ChangeRuleset::Simplified)
        .expect("change detection should succeed");

    let areas = &result.statistics.areas_km2;
    // 10 rows x 5 columns of lake became built-up, at 0.0001 km² per pixel
    assert!((areas[&TransitionKind::WaterToBuiltUp] - 50.0 * 0.0001).abs() < 1e-9);
    // 10 rows x 2 columns of vegetation became built-up
    assert!((areas[&TransitionKind::VegetationToBuiltUp] - 20.0 * 0.0001).abs() < 1e-9);
    assert_eq!(areas[&TransitionKind::WaterToVegetation], 0.0);

    // The simplified rule set does not track the aggregates
    assert!(!areas.contains_key(&TransitionKind::WaterLostTotal));
    assert!(!areas.contains_key(&TransitionKind::WaterGainedTotal));

    // 70 changed pixels out of 400
    assert!((result.statistics.changed_percent - 17.5).abs() < 1e-9);

    // Map labels line up with the transitions
    assert_eq!(result.transition_map[[5, 7]], 1);
    assert_eq!(result.transition_map[[5, 14]], 3);
    assert_eq!(result.transition_map[[5, 2]], 0);
    // New pond is untracked by the categorical transitions
    assert_eq!(result.transition_map[[17, 17]], 0);
}

#[test]
fn test_detailed_ruleset_accounts_for_water_loss_and_gain() {
    let detector = ChangeDetector::new();
    let result = detector
        .detect_changes(&older_map(), &newer_map(), ChangeRuleset::Detailed)
        .expect("change detection should succeed");

    let areas = &result.statistics.areas_km2;
    // All 50 lost lake pixels went to built-up, so the aggregate matches
    // the categorical entry while counting independently
    assert!((areas[&TransitionKind::WaterLostTotal] - 50.0 * 0.0001).abs() < 1e-9);
    assert!((areas[&TransitionKind::WaterGainedTotal] - 4.0 * 0.0001).abs() < 1e-9);
    assert!((areas[&TransitionKind::WaterToBuiltUp] - 50.0 * 0.0001).abs() < 1e-9);

    // Aggregates never touch the transition map: the new pond stays zero
    assert_eq!(result.transition_map[[17, 17]], 0);
    assert_eq!(result.transition_map[[18, 18]], 0);
}

#[test]
fn test_identical_acquisitions_report_no_change() {
    let detector = ChangeDetector::new();
    let map = older_map();
    let result = detector
        .detect_changes(&map, &map, ChangeRuleset::Detailed)
        .expect("change detection should succeed");

    assert!(result.transition_map.iter().all(|&v| v == 0));
    assert_eq!(result.statistics.changed_percent, 0.0);
    assert!(result.statistics.areas_km2.values().all(|&a| a == 0.0));
}

#[test]
fn test_mismatched_shapes_are_rejected() {
    let detector = ChangeDetector::new();
    let result = detector.detect_changes(
        &ClassMap::zeros((20, 20)),
        &ClassMap::zeros((20, 21)),
        ChangeRuleset::Simplified,
    );

    match result {
        Err(LandError::ShapeMismatch { left, right }) => {
            assert_eq!(left, (20, 20));
            assert_eq!(right, (20, 21));
        }
        other => panic!("expected shape mismatch, got {:?}", other.map(|r| r.statistics.changed_percent)),
    }
}

#[test]
fn test_custom_pixel_area_is_respected() {
    // 30 m pixels, e.g. Landsat-derived maps
    let detector = ChangeDetector::with_params(ChangeDetectorParams {
        pixel_area_km2: (30.0 * 30.0) / 1e6,
    });

    let mut pred1 = ClassMap::from_elem((5, 5), BACKGROUND);
    let mut pred2 = ClassMap::from_elem((5, 5), BACKGROUND);
    pred1[[2, 2]] = LandCoverClass::Water.label();
    pred2[[2, 2]] = LandCoverClass::BuiltUp.label();

    let result = detector
        .detect_changes(&pred1, &pred2, ChangeRuleset::Simplified)
        .expect("change detection should succeed");

    assert!(
        (result.statistics.areas_km2[&TransitionKind::WaterToBuiltUp] - 0.0009).abs() < 1e-12
    );
}
