use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A 2D point in destination-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds of `points`, or `None` for an empty slice.
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Half of the larger side; the radius used for region gradients.
    pub fn radius(&self) -> f32 {
        self.width().max(self.height()) * 0.5
    }
}

/// One tracked facial landmark. `z` is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Ordered, index-stable landmark snapshot for one face.
///
/// Index `i` always denotes the same anatomical point. Entries may be absent
/// (`None`); lookups past the end return `None` rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Option<LandmarkPoint>>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Option<LandmarkPoint>>) -> Self {
        Self { points }
    }

    pub fn from_points(points: Vec<LandmarkPoint>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }

    /// A set of `len` absent entries, to be filled with [`set`](Self::set).
    pub fn with_len(len: usize) -> Self {
        Self {
            points: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at `index`; `None` when out of range, absent, or non-finite.
    pub fn get(&self, index: usize) -> Option<LandmarkPoint> {
        self.points
            .get(index)
            .copied()
            .flatten()
            .filter(LandmarkPoint::is_finite)
    }

    /// Set landmark `index`, growing the set with absent entries if needed.
    pub fn set(&mut self, index: usize, point: LandmarkPoint) {
        if index >= self.points.len() {
            self.points.resize(index + 1, None);
        }
        self.points[index] = Some(point);
    }

    /// Mark landmark `index` absent, returning what was there.
    pub fn remove(&mut self, index: usize) -> Option<LandmarkPoint> {
        self.points.get_mut(index).and_then(Option::take)
    }

    /// Landmark `index` mapped to destination pixels.
    pub fn scaled(&self, index: usize, scale: f32) -> Option<Point> {
        self.get(index).map(|p| Point::new(p.x * scale, p.y * scale))
    }

    /// Iterate over present landmarks as `(index, point)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, LandmarkPoint)> + '_ {
        (0..self.points.len()).filter_map(|i| self.get(i).map(|p| (i, p)))
    }

    /// Truncate to the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }
}

/// Destination raster plus the source-to-destination scale factor.
///
/// Owned by the host; the engine only draws into it.
pub struct RenderSurface<'a> {
    pub image: &'a mut RgbaImage,
    pub scale: f32,
}

impl<'a> RenderSurface<'a> {
    pub fn new(image: &'a mut RgbaImage, scale: f32) -> Self {
        Self { image, scale }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

/// Per-call rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Draw landmark dots and region outlines on top of the finished render.
    #[serde(default)]
    pub debug_overlay: bool,
}
