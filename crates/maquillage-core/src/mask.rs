//! Region mask builder: polygon fill, thick strokes, Gaussian feathering.
//!
//! Masks are single-channel `f32` coverage buffers in `[0, 1]`, always the
//! size of the destination surface.

use crate::regions::ScaledRegionPath;
use crate::types::Point;
use image::imageops;
use image::{ImageBuffer, Luma};

/// Stroke width (destination pixels at scale 1) used to rasterize open regions.
pub const OPEN_PATH_STROKE_WIDTH: f32 = 4.0;

/// Single-channel coverage buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMask {
    buf: ImageBuffer<Luma<f32>, Vec<f32>>,
}

impl CoverageMask {
    /// An all-zero mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            buf: ImageBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buf.dimensions()
    }

    /// Coverage at `(x, y)`; zero outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width() || y >= self.height() {
            return 0.0;
        }
        self.buf.get_pixel(x, y).0[0]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width() && y < self.height() {
            self.buf.put_pixel(x, y, Luma([value.clamp(0.0, 1.0)]));
        }
    }

    /// Row-major coverage values.
    pub fn values(&self) -> &[f32] {
        self.buf.as_raw()
    }

    fn values_mut(&mut self) -> &mut [f32] {
        &mut self.buf
    }

    /// True when no pixel has positive coverage.
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|&v| v <= 0.0)
    }

    pub fn max_value(&self) -> f32 {
        self.values().iter().copied().fold(0.0, f32::max)
    }

    /// Number of pixels with positive coverage.
    pub fn covered_pixels(&self) -> usize {
        self.values().iter().filter(|&&v| v > 0.0).count()
    }

    /// Blur the mask with a Gaussian of standard deviation `radius`.
    ///
    /// A radius of zero (or less) leaves the mask untouched.
    pub fn feather(&mut self, radius: f32) {
        if radius <= 0.0 || !radius.is_finite() {
            return;
        }
        if self.width() == 0 || self.height() == 0 {
            return;
        }
        self.buf = imageops::blur(&self.buf, radius);
        for v in self.values_mut() {
            *v = v.clamp(0.0, 1.0);
        }
    }

    /// Keep coverage only where `other` covers: `a · b`.
    pub fn keep_only_where(&mut self, other: &CoverageMask) {
        self.combine(other, |a, b| a * b);
    }

    /// Remove `other`'s coverage from this mask: `a · (1 − b)`.
    pub fn remove_coverage(&mut self, other: &CoverageMask) {
        self.combine(other, |a, b| a * (1.0 - b));
    }

    /// Union with `other`, composited like two alpha layers.
    pub fn union(&mut self, other: &CoverageMask) {
        self.combine(other, |a, b| 1.0 - (1.0 - a) * (1.0 - b));
    }

    /// Multiply every coverage value by `factor`.
    pub fn scale(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        for v in self.values_mut() {
            *v *= factor;
        }
    }

    fn combine(&mut self, other: &CoverageMask, op: impl Fn(f32, f32) -> f32) {
        if self.dimensions() != other.dimensions() {
            tracing::warn!(
                left = ?self.dimensions(),
                right = ?other.dimensions(),
                "mask size mismatch, combine skipped"
            );
            return;
        }
        for (a, &b) in self.values_mut().iter_mut().zip(other.values()) {
            *a = op(*a, b).clamp(0.0, 1.0);
        }
    }

    /// Raise coverage to at least `value` at `(x, y)`.
    fn raise(&mut self, x: usize, y: usize, value: f32) {
        let w = self.width() as usize;
        let v = &mut self.values_mut()[y * w + x];
        if value > *v {
            *v = value.min(1.0);
        }
    }
}

/// Build a feathered coverage mask for one region path.
///
/// Closed paths are filled, open paths are stroked at
/// `OPEN_PATH_STROKE_WIDTH` times the path's scale. Paths with fewer than
/// three points produce an all-zero mask.
pub fn build_mask(path: &ScaledRegionPath, size: (u32, u32), feather_radius: f32) -> CoverageMask {
    build_combined_mask(std::slice::from_ref(path), size, feather_radius)
}

/// Rasterize every path into one buffer, then feather once.
///
/// Blurring after the union keeps seams between adjacent regions invisible.
pub fn build_combined_mask(
    paths: &[ScaledRegionPath],
    size: (u32, u32),
    feather_radius: f32,
) -> CoverageMask {
    let mut mask = CoverageMask::empty(size.0, size.1);
    for path in paths {
        if !path.is_drawable() {
            tracing::debug!(region = %path.name, points = path.len(), "region too small, skipped");
            continue;
        }
        if path.closed {
            fill_polygon(&mut mask, &path.points);
        } else {
            stroke_polyline(&mut mask, &path.points, OPEN_PATH_STROKE_WIDTH * path.scale);
        }
    }
    mask.feather(feather_radius);
    mask
}

/// Anti-aliased stroke of `points` with the given width, no feathering.
pub fn stroke_mask(points: &[Point], size: (u32, u32), width: f32) -> CoverageMask {
    let mut mask = CoverageMask::empty(size.0, size.1);
    stroke_polyline(&mut mask, points, width);
    mask
}

/// Fill a closed polygon with non-zero winding, sampling pixel centers.
pub fn fill_polygon(mask: &mut CoverageMask, points: &[Point]) {
    if points.len() < 3 {
        return;
    }
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    if w == 0 || h == 0 {
        return;
    }

    let (min_y, max_y) = points
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
    let y_start = min_y.floor().max(0.0) as usize;
    let y_end = (max_y.ceil().max(0.0) as usize).min(h);

    let n = points.len();
    let mut crossings: Vec<(f32, i32)> = Vec::with_capacity(n);

    for y in y_start..y_end {
        let yc = y as f32 + 0.5;
        crossings.clear();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let upward = a.y <= yc && b.y > yc;
            let downward = b.y <= yc && a.y > yc;
            if upward || downward {
                let t = (yc - a.y) / (b.y - a.y);
                crossings.push((a.x + t * (b.x - a.x), if upward { 1 } else { -1 }));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        let mut span_start = 0.0f32;
        for &(x, dir) in &crossings {
            let before = winding;
            winding += dir;
            if before == 0 && winding != 0 {
                span_start = x;
            } else if before != 0 && winding == 0 {
                let first = (span_start - 0.5).ceil().max(0.0) as usize;
                let last = ((x - 0.5).ceil().max(0.0) as usize).min(w);
                for px in first..last {
                    mask.raise(px, y, 1.0);
                }
            }
        }
    }
}

/// Stroke an open polyline, coverage falling off over one pixel at the edge.
pub fn stroke_polyline(mask: &mut CoverageMask, points: &[Point], width: f32) {
    if points.is_empty() || width <= 0.0 {
        return;
    }
    let (w, h) = (mask.width() as usize, mask.height() as usize);
    if w == 0 || h == 0 {
        return;
    }

    let half = width * 0.5;
    let reach = half + 1.0;

    let segments: Vec<(Point, Point)> = if points.len() == 1 {
        vec![(points[0], points[0])]
    } else {
        points.windows(2).map(|s| (s[0], s[1])).collect()
    };

    for (a, b) in segments {
        let x0 = (a.x.min(b.x) - reach).floor().max(0.0) as usize;
        let y0 = (a.y.min(b.y) - reach).floor().max(0.0) as usize;
        let x1 = ((a.x.max(b.x) + reach).ceil().max(0.0) as usize).min(w);
        let y1 = ((a.y.max(b.y) + reach).ceil().max(0.0) as usize).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let c = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = distance_to_segment(c, a, b);
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    mask.raise(x, y, coverage);
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        return p.distance(&a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}
