#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use maquillage_core::synthetic;
use maquillage_core::{LandmarkSet, MakeupPipeline, RenderOptions};

/// Skin-toned base with a faint deterministic texture.
pub fn textured_base() -> RgbaImage {
    RgbaImage::from_fn(synthetic::WIDTH, synthetic::HEIGHT, |x, y| {
        let n = ((x * 7 + y * 13) % 11) as u8;
        Rgba([200 + n, 150 + n, 130 + n, 255])
    })
}

pub fn flat_base(px: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(synthetic::WIDTH, synthetic::HEIGHT, Rgba([px[0], px[1], px[2], 255]))
}

pub fn face() -> LandmarkSet {
    synthetic::symmetric_face()
}

/// Full redraw of the synthetic face at scale 1.
pub fn render(pipeline: &mut MakeupPipeline, base: &RgbaImage) -> RgbaImage {
    let (out, report) = pipeline
        .render(base, Some(&face()), 1.0, &RenderOptions::default())
        .expect("render");
    assert!(report.is_clean(), "effects failed: {:?}", report.failed);
    out
}

pub fn max_channel_diff(a: &RgbaImage, b: &RgbaImage) -> u8 {
    a.pixels()
        .zip(b.pixels())
        .flat_map(|(p, q)| (0..3).map(move |c| p.0[c].abs_diff(q.0[c])))
        .max()
        .unwrap_or(0)
}
