#![allow(dead_code)]

use maquillage_core::regions::FACE_MESH_LANDMARKS;
use maquillage_core::types::{LandmarkPoint, LandmarkSet, Point};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const CANVAS: u32 = 64;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config
}

pub fn arb_point() -> impl Strategy<Value = Point> {
    (0.0f32..CANVAS as f32, 0.0f32..CANVAS as f32).prop_map(|(x, y)| Point::new(x, y))
}

/// A landmark set with at most two present points, at arbitrary indices.
pub fn arb_sparse_landmarks() -> impl Strategy<Value = LandmarkSet> {
    (
        0usize..=FACE_MESH_LANDMARKS,
        prop::collection::vec((0usize..FACE_MESH_LANDMARKS, arb_point()), 0..=2),
    )
        .prop_map(|(len, points)| {
            let mut set = LandmarkSet::with_len(len);
            for (i, p) in points {
                set.set(i, LandmarkPoint::new(p.x, p.y));
            }
            set
        })
}
