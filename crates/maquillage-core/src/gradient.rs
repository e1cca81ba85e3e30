//! Linear and radial alpha-gradient layers.
//!
//! Both follow canvas gradient semantics: positions before the first stop or
//! past the last stop take the nearest stop's value.

use crate::color::Color;
use crate::types::Point;
use image::{Rgba, Rgba32FImage};

/// Radial gradient of `color`, alpha `inner_alpha` at `center` easing linearly
/// to `outer_alpha` at `radius` and beyond.
pub fn radial_layer(
    size: (u32, u32),
    center: Point,
    radius: f32,
    color: Color,
    inner_alpha: f32,
    outer_alpha: f32,
) -> Rgba32FImage {
    let [r, g, b] = color.to_unit();
    let radius = radius.max(f32::EPSILON);
    Rgba32FImage::from_fn(size.0, size.1, |x, y| {
        let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        let t = (p.distance(&center) / radius).clamp(0.0, 1.0);
        Rgba([r, g, b, lerp(inner_alpha, outer_alpha, t)])
    })
}

/// Linear gradient of `color` along `from → to`, alpha `from_alpha` at `from`
/// and `to_alpha` at `to`.
pub fn linear_layer(
    size: (u32, u32),
    from: Point,
    to: Point,
    color: Color,
    from_alpha: f32,
    to_alpha: f32,
) -> Rgba32FImage {
    let [r, g, b] = color.to_unit();
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len_sq = dx * dx + dy * dy;
    Rgba32FImage::from_fn(size.0, size.1, |x, y| {
        let t = if len_sq <= f32::EPSILON {
            0.0
        } else {
            let (px, py) = (x as f32 + 0.5 - from.x, y as f32 + 0.5 - from.y);
            ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0)
        };
        Rgba([r, g, b, lerp(from_alpha, to_alpha, t)])
    })
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (a + (b - a) * t).clamp(0.0, 1.0)
}
