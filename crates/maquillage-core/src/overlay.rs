//! Debug overlay: region outlines and landmark dots drawn over a finished render.

use crate::color::Color;
use crate::compositor::{composite_color, BlendMode, CompositeError};
use crate::mask::{stroke_polyline, CoverageMask};
use crate::regions;
use crate::types::{LandmarkSet, Point};
use image::RgbaImage;

const OUTLINE_COLOR: Color = Color::rgb(0x00, 0xE5, 0xFF);
const DOT_COLOR: Color = Color::rgb(0x39, 0xFF, 0x14);
const OUTLINE_WIDTH: f32 = 1.0;
const DOT_RADIUS: f32 = 1.5;

/// Draw every resolvable region outline, then every present landmark.
pub fn draw_overlay(image: &mut RgbaImage, landmarks: &LandmarkSet, scale: f32) -> Result<(), CompositeError> {
    let (w, h) = image.dimensions();

    let mut outlines = CoverageMask::empty(w, h);
    for region in regions::regions() {
        let path = regions::region_path(landmarks, region.name, scale);
        if path.len() < 2 {
            continue;
        }
        let mut points = path.points.clone();
        if path.closed {
            points.push(path.points[0]);
        }
        stroke_polyline(&mut outlines, &points, OUTLINE_WIDTH);
    }
    composite_color(image, &outlines, OUTLINE_COLOR, 0.8, BlendMode::Normal)?;

    let mut dots = CoverageMask::empty(w, h);
    for (_, p) in landmarks.iter() {
        let center = Point::new(p.x * scale, p.y * scale);
        stroke_polyline(&mut dots, &[center], DOT_RADIUS * 2.0);
    }
    composite_color(image, &dots, DOT_COLOR, 1.0, BlendMode::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use image::Rgba;

    #[test]
    fn test_overlay_marks_landmarks() {
        let face = synthetic::symmetric_face();
        let mut img = RgbaImage::from_pixel(synthetic::WIDTH, synthetic::HEIGHT, Rgba([0, 0, 0, 255]));
        draw_overlay(&mut img, &face, 1.0).unwrap();

        let tip = face.get(regions::NOSE_TIP).unwrap();
        let px = img.get_pixel(tip.x as u32, tip.y as u32).0;
        assert!(px[1] > 200, "nose tip dot missing: {px:?}");
        assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_overlay_on_empty_set_is_noop() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255]));
        let before = img.clone();
        draw_overlay(&mut img, &LandmarkSet::default(), 1.0).unwrap();
        assert_eq!(img, before);
    }
}
