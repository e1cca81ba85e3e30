//! A mirror-symmetric synthetic face on a 200×200 canvas.
//!
//! Regions are laid out as ellipses, arcs, and lens shapes at plausible
//! positions so every effect has something to draw. The face is symmetric
//! about `x = 100`, so pixel `x` mirrors to pixel `199 − x`. Landmarks not
//! referenced by any region stay absent.

use crate::regions::{self, FACE_MESH_LANDMARKS, NOSE_TIP};
use crate::types::{LandmarkPoint, LandmarkSet, Point};
use std::f32::consts::PI;

pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 200;

const AXIS: f32 = WIDTH as f32 / 2.0;

/// Build the synthetic landmark set, in canvas pixels.
pub fn symmetric_face() -> LandmarkSet {
    let mut set = LandmarkSet::with_len(FACE_MESH_LANDMARKS);

    // Laid out first: the oval shares indices with forehead and temples.
    ellipse(&mut set, regions::FACE_OVAL, Point::new(AXIS, 105.0), 72.0, 92.0);

    ellipse(&mut set, regions::FOREHEAD, Point::new(AXIS, 32.0), 38.0, 13.0);
    mirrored_ellipse(&mut set, regions::RIGHT_TEMPLE, regions::LEFT_TEMPLE, Point::new(38.0, 62.0), 7.0, 12.0);
    mirrored_ellipse(&mut set, regions::RIGHT_CHEEKBONE, regions::LEFT_CHEEKBONE, Point::new(62.0, 94.0), 13.0, 5.0);
    mirrored_ellipse(&mut set, regions::RIGHT_CHEEK, regions::LEFT_CHEEK, right_cheek_center(), 13.0, 9.0);
    mirrored_ellipse(&mut set, regions::RIGHT_CHEEK_HOLLOW, regions::LEFT_CHEEK_HOLLOW, Point::new(60.0, 128.0), 9.0, 6.0);

    // Brows: lower edge first, then the upper edge back to the outer corner.
    lens(&mut set, regions::RIGHT_EYEBROW, 5, Point::new(52.0, 58.0), Point::new(88.0, 58.0), 1.0, -6.0);
    lens(&mut set, regions::LEFT_EYEBROW, 5, Point::new(148.0, 58.0), Point::new(112.0, 58.0), 1.0, -6.0);

    // Eyes: upper lid outer → inner corner, then the lower lid back.
    lens(&mut set, regions::RIGHT_EYE, 9, Point::new(55.0, 75.0), Point::new(85.0, 75.0), -7.0, 5.0);
    lens(&mut set, regions::LEFT_EYE, 9, Point::new(145.0, 75.0), Point::new(115.0, 75.0), -7.0, 5.0);

    ellipse(&mut set, regions::NOSE, Point::new(AXIS, 98.0), 11.0, 18.0);
    arc(&mut set, outline(regions::NOSE_BRIDGE), Point::new(AXIS, 80.0), Point::new(AXIS, 112.0), 0.0);
    arc(&mut set, outline(regions::RIGHT_NOSE_SIDE), Point::new(93.0, 84.0), Point::new(89.0, 112.0), 0.0);
    arc(&mut set, outline(regions::LEFT_NOSE_SIDE), Point::new(107.0, 84.0), Point::new(111.0, 112.0), 0.0);
    set.set(NOSE_TIP, LandmarkPoint::new(AXIS, 114.0));

    // Lips: outer and inner arcs share their corners between upper and lower lip.
    let lip = lip_center();
    let (outer_l, outer_r) = (Point::new(lip.x - 22.0, lip.y), Point::new(lip.x + 22.0, lip.y));
    let (inner_l, inner_r) = (Point::new(lip.x - 16.0, lip.y), Point::new(lip.x + 16.0, lip.y));
    let upper = outline(regions::UPPER_LIP);
    let lower = outline(regions::LOWER_LIP);
    arc(&mut set, &upper[..11], outer_l, outer_r, -10.0);
    arc(&mut set, &upper[11..], inner_r, inner_l, -3.0);
    arc(&mut set, &lower[..11], outer_l, outer_r, 10.0);
    arc(&mut set, &lower[11..], inner_r, inner_l, 3.0);

    set
}

/// Center of the mouth; the upper lip spans roughly `y − 10 .. y − 3` here.
pub fn lip_center() -> Point {
    Point::new(AXIS, 140.0)
}

/// Center of the right cheek (image left); the left cheek mirrors it.
pub fn right_cheek_center() -> Point {
    Point::new(66.0, 112.0)
}

/// The mirror image of pixel column `x`.
pub fn mirror_x(x: u32) -> u32 {
    WIDTH - 1 - x
}

fn outline(name: &str) -> &'static [usize] {
    regions::lookup(name).map(|r| r.outline()).unwrap_or(&[])
}

fn ellipse(set: &mut LandmarkSet, name: &str, center: Point, rx: f32, ry: f32) {
    let indices = outline(name);
    let n = indices.len().max(1) as f32;
    for (k, &i) in indices.iter().enumerate() {
        let theta = 2.0 * PI * k as f32 / n;
        set.set(i, LandmarkPoint::new(center.x + rx * theta.cos(), center.y + ry * theta.sin()));
    }
}

fn mirrored_ellipse(set: &mut LandmarkSet, right: &str, left: &str, center: Point, rx: f32, ry: f32) {
    ellipse(set, right, center, rx, ry);
    ellipse(set, left, Point::new(2.0 * AXIS - center.x, center.y), rx, ry);
}

/// Place `indices` from `from` to `to` inclusive, bowed vertically by `bulge·sin(πt)`.
fn arc(set: &mut LandmarkSet, indices: &[usize], from: Point, to: Point, bulge: f32) {
    let steps = indices.len().saturating_sub(1).max(1) as f32;
    for (k, &i) in indices.iter().enumerate() {
        let t = k as f32 / steps;
        let p = from.lerp(&to, t);
        set.set(i, LandmarkPoint::new(p.x, p.y + bulge * (PI * t).sin()));
    }
}

/// A closed outline whose first `edge` points run `from → to` (bowed by
/// `first_bulge`) and whose remaining points return strictly between the corners.
fn lens(
    set: &mut LandmarkSet,
    name: &str,
    edge: usize,
    from: Point,
    to: Point,
    first_bulge: f32,
    second_bulge: f32,
) {
    let indices = outline(name);
    let edge = edge.min(indices.len());
    arc(set, &indices[..edge], from, to, first_bulge);

    let rest = &indices[edge..];
    let steps = (rest.len() + 1) as f32;
    for (k, &i) in rest.iter().enumerate() {
        let t = (k + 1) as f32 / steps;
        let p = to.lerp(&from, t);
        set.set(i, LandmarkPoint::new(p.x, p.y + second_bulge * (PI * t).sin()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::region_path;

    #[test]
    fn test_every_region_drawable() {
        let face = symmetric_face();
        for region in regions::regions() {
            let path = region_path(&face, region.name, 1.0);
            assert!(path.is_drawable(), "{} has {} points", region.name, path.len());
        }
    }

    #[test]
    fn test_points_inside_canvas() {
        let face = symmetric_face();
        for (_, p) in face.iter() {
            assert!(p.x >= 0.0 && p.x <= WIDTH as f32 && p.y >= 0.0 && p.y <= HEIGHT as f32);
        }
    }

    #[test]
    fn test_upper_lid_matches_eye_outline() {
        let face = symmetric_face();
        let lid = region_path(&face, regions::RIGHT_EYE_UPPER_LID, 1.0);
        let eye = region_path(&face, regions::RIGHT_EYE, 1.0);
        assert_eq!(&eye.points[..lid.len()], &lid.points[..]);
        assert_eq!(lid.points[0], Point::new(55.0, 75.0));
    }

    #[test]
    fn test_mirror_symmetry_of_cheeks() {
        let face = symmetric_face();
        let right = region_path(&face, regions::RIGHT_CHEEK, 1.0);
        let left = region_path(&face, regions::LEFT_CHEEK, 1.0);
        for (r, l) in right.points.iter().zip(&left.points) {
            assert!((r.x + l.x - 2.0 * AXIS).abs() < 1e-4);
            assert!((r.y - l.y).abs() < 1e-4);
        }
    }
}
