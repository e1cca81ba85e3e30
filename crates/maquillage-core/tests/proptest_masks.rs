use maquillage_core::color::Color;
use maquillage_core::effects::{EffectKind, LipstickSettings, LipstickUpdate, MakeupSettings};
use maquillage_core::mask::{build_mask, CoverageMask};
use maquillage_core::regions::{self, region_path, ScaledRegionPath};
use maquillage_core::synthetic;
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_point, arb_sparse_landmarks, CANVAS};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn sparse_landmarks_give_empty_masks(set in arb_sparse_landmarks(), feather in 0.0f32..6.0) {
        for region in regions::regions() {
            let path = region_path(&set, region.name, 1.0);
            let mask = build_mask(&path, (CANVAS, CANVAS), feather);
            prop_assert!(mask.is_empty(), "{} produced coverage from {} points", region.name, path.len());
        }
    }

    #[test]
    fn truncated_face_masks_regions_past_the_end(len in 0usize..regions::FACE_MESH_LANDMARKS) {
        let mut face = synthetic::symmetric_face();
        face.truncate(len);
        for region in regions::regions().iter().filter(|r| r.max_index() >= len) {
            let path = region_path(&face, region.name, 1.0);
            let mask = build_mask(&path, (synthetic::WIDTH, synthetic::HEIGHT), 0.0);
            prop_assert!(mask.is_empty(), "{} drawn from a set of {}", region.name, len);
        }
    }

    #[test]
    fn unfeathered_fill_is_binary(a in arb_point(), b in arb_point(), c in arb_point()) {
        let path = ScaledRegionPath { name: "tri".into(), points: vec![a, b, c], closed: true, scale: 1.0 };
        let mask = build_mask(&path, (CANVAS, CANVAS), 0.0);
        prop_assert!(mask.values().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn feathering_stays_in_unit_range(a in arb_point(), b in arb_point(), c in arb_point(), radius in 0.5f32..8.0) {
        let path = ScaledRegionPath { name: "tri".into(), points: vec![a, b, c], closed: true, scale: 1.0 };
        let sharp = build_mask(&path, (CANVAS, CANVAS), 0.0);
        let soft = build_mask(&path, (CANVAS, CANVAS), radius);
        prop_assert!(soft.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        prop_assert!(soft.max_value() <= sharp.max_value() + 1e-5);
    }

    #[test]
    fn full_intensity_round_trips_color(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = Color::rgb(r, g, b);
        let back = color.with_intensity(1.0);
        prop_assert!(back.r.abs_diff(r) <= 1 && back.g.abs_diff(g) <= 1 && back.b.abs_diff(b) <= 1,
            "{color} became {back}");
    }

    #[test]
    fn lipstick_updates_always_clamp(opacity in any::<f32>(), intensity in any::<f32>(), feather in any::<f32>()) {
        let s = LipstickSettings::default().with_update(&LipstickUpdate {
            opacity: Some(opacity),
            intensity: Some(intensity),
            feather_radius: Some(feather),
            ..Default::default()
        });
        prop_assert!((0.0..=1.0).contains(&s.opacity));
        prop_assert!((0.0..=1.0).contains(&s.intensity));
        prop_assert!((0.0..=20.0).contains(&s.feather_radius));
    }

    #[test]
    fn mask_union_is_commutative(a in arb_point(), b in arb_point(), c in arb_point(), d in arb_point()) {
        let tri = |p: Vec<_>| build_mask(&ScaledRegionPath { name: "t".into(), points: p, closed: true, scale: 1.0 }, (CANVAS, CANVAS), 1.5);
        let first = tri(vec![a, b, c]);
        let second = tri(vec![b, c, d]);
        let mut ab = first.clone();
        ab.union(&second);
        let mut ba = second.clone();
        ba.union(&first);
        prop_assert!(ab.values().iter().zip(ba.values()).all(|(x, y)| (x - y).abs() < 1e-6));
    }
}

#[test]
fn defaults_leave_every_effect_off() {
    let settings = MakeupSettings::default();
    for kind in EffectKind::DRAW_ORDER {
        assert!(!settings.effect(kind).enabled(), "{kind} on by default");
    }
    assert!(CoverageMask::empty(4, 4).is_empty());
}

#[test]
fn lower_lip_needs_the_whole_outline() {
    let mut face = synthetic::symmetric_face();
    let size = (synthetic::WIDTH, synthetic::HEIGHT);
    assert!(!build_mask(&region_path(&face, regions::LOWER_LIP, 1.0), size, 0.0).is_empty());

    face.truncate(300);
    let mask = build_mask(&region_path(&face, regions::LOWER_LIP, 1.0), size, 0.0);
    assert!(mask.is_empty());
}
