use image::imageops;
use maquillage_core::effects::skin_smoothing::skin_mask;
use maquillage_core::effects::{
    BlushUpdate, EffectKind, EffectUpdate, LipstickUpdate, SkinSmoothingUpdate,
};
use maquillage_core::presets::builtin_preset;
use maquillage_core::synthetic;
use maquillage_core::{MakeupPipeline, RenderOptions};

mod common;

#[test]
fn all_disabled_is_pixel_identical() {
    let base = common::textured_base();
    let mut pipeline = MakeupPipeline::new();
    assert_eq!(common::render(&mut pipeline, &base), base);
}

#[test]
fn enabled_then_disabled_is_pixel_identical() {
    let base = common::textured_base();
    let mut pipeline = MakeupPipeline::new();
    for kind in EffectKind::DRAW_ORDER {
        pipeline.update(&EffectUpdate::enabled(kind, true));
    }
    assert_ne!(common::render(&mut pipeline, &base), base);
    for kind in EffectKind::DRAW_ORDER {
        pipeline.update(&EffectUpdate::enabled(kind, false));
    }
    assert_eq!(common::render(&mut pipeline, &base), base);
}

#[test]
fn lipstick_multiply_at_half_opacity() {
    let base_px = [200u8, 150, 130];
    let base = common::flat_base(base_px);
    let mut pipeline = MakeupPipeline::new();
    pipeline.update(&EffectUpdate::Lipstick(LipstickUpdate {
        enabled: Some(true),
        color: Some("#CC3366".into()),
        opacity: Some(0.5),
        intensity: Some(1.0),
        feather_radius: Some(0.0),
        blend_mode: Some("multiply".into()),
    }));
    let out = common::render(&mut pipeline, &base);

    let lips = synthetic::lip_center();
    let inside = out.get_pixel(lips.x as u32, lips.y as u32 - 6).0;
    let src = [0xCC, 0x33, 0x66];
    for c in 0..3 {
        let d = base_px[c] as f32 / 255.0;
        let s = src[c] as f32 / 255.0;
        let expected = ((d + (d * s - d) * 0.5) * 255.0).round();
        assert!(
            (inside[c] as f32 - expected).abs() <= 2.0,
            "channel {c}: got {}, expected {expected}",
            inside[c]
        );
    }
    assert_eq!(out.get_pixel(lips.x as u32, 20).0[..3], base_px);
}

#[test]
fn skin_smoothing_zero_strength_is_identity() {
    let base = common::textured_base();
    let mut pipeline = MakeupPipeline::new();
    pipeline.update(&EffectUpdate::SkinSmoothing(SkinSmoothingUpdate {
        enabled: Some(true),
        strength: Some(0.0),
        ..Default::default()
    }));
    assert_eq!(common::render(&mut pipeline, &base), base);
}

#[test]
fn skin_smoothing_full_strength_matches_blur_under_full_coverage() {
    let base = common::textured_base();
    let sigma = 4.0;
    let mut pipeline = MakeupPipeline::new();
    pipeline.update(&EffectUpdate::SkinSmoothing(SkinSmoothingUpdate {
        enabled: Some(true),
        strength: Some(1.0),
        blur_radius: Some(sigma),
        preserve_texture: Some(0.0),
        feather_radius: Some(0.0),
    }));
    let out = common::render(&mut pipeline, &base);

    let blurred = imageops::blur(&base, sigma);
    let mask = skin_mask(&common::face(), base.dimensions(), 1.0, 0.0);
    let mut checked = 0;
    for (x, y, px) in out.enumerate_pixels() {
        if mask.get(x, y) < 0.999 {
            continue;
        }
        let want = blurred.get_pixel(x, y).0;
        for c in 0..3 {
            assert!(px.0[c].abs_diff(want[c]) <= 1, "({x},{y}) {:?} vs {want:?}", px.0);
        }
        checked += 1;
    }
    assert!(checked > 100, "only {checked} fully covered pixels");
}

#[test]
fn preset_none_restores_base() {
    let base = common::textured_base();
    let mut pipeline = MakeupPipeline::new();
    pipeline.apply_preset(builtin_preset("glam").expect("glam preset"));
    assert_ne!(common::render(&mut pipeline, &base), base);

    pipeline.apply_preset(builtin_preset("none").expect("none preset"));
    assert!(pipeline.is_dirty());
    assert_eq!(common::render(&mut pipeline, &base), base);
}

#[test]
fn redraws_are_stable_regardless_of_update_order() {
    let base = common::textured_base();
    let blush = EffectUpdate::Blush(BlushUpdate {
        enabled: Some(true),
        opacity: Some(0.6),
        ..Default::default()
    });
    let lipstick = EffectUpdate::enabled(EffectKind::Lipstick, true);

    let mut first = MakeupPipeline::new();
    first.update(&blush);
    first.update(&lipstick);
    let mut second = MakeupPipeline::new();
    second.update(&lipstick);
    second.update(&blush);

    let a = common::render(&mut first, &base);
    let again = common::render(&mut first, &base);
    let b = common::render(&mut second, &base);
    assert_eq!(a, again);
    assert_eq!(a, b);
}

#[test]
fn every_preset_renders_cleanly() {
    let base = common::textured_base();
    for name in ["natural", "glam", "evening"] {
        let mut pipeline = MakeupPipeline::new();
        pipeline.apply_preset(builtin_preset(name).expect("builtin preset"));
        let (out, report) = pipeline
            .render(&base, Some(&common::face()), 1.0, &RenderOptions::default())
            .expect("render");
        assert!(report.failed.is_empty(), "{name}: {:?}", report.failed);
        assert!(!report.applied.is_empty(), "{name} drew nothing");
        assert!(common::max_channel_diff(&out, &base) > 0);
    }
}

#[test]
fn scale_maps_source_landmarks_onto_larger_surface() {
    let base = image::RgbaImage::from_pixel(
        synthetic::WIDTH * 2,
        synthetic::HEIGHT * 2,
        image::Rgba([200, 150, 130, 255]),
    );
    let mut pipeline = MakeupPipeline::new();
    pipeline.update(&EffectUpdate::enabled(EffectKind::Lipstick, true));
    let (out, report) = pipeline
        .render(&base, Some(&common::face()), 2.0, &RenderOptions::default())
        .expect("render");
    assert_eq!(report.applied, vec![EffectKind::Lipstick]);

    let lips = synthetic::lip_center();
    let (x, y) = ((lips.x * 2.0) as u32, (lips.y * 2.0) as u32 - 12);
    assert_ne!(out.get_pixel(x, y), base.get_pixel(x, y));
    assert_eq!(out.get_pixel(lips.x as u32, lips.y as u32 - 6), base.get_pixel(0, 0));
}
