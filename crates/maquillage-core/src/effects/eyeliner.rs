//! Eyeliner: a smoothed stroke along each upper lid, optionally winged.

use super::{merge_color, merge_range, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_color, BlendMode};
use crate::mask::{stroke_polyline, CoverageMask};
use crate::regions::{self, NOSE_TIP};
use crate::types::{LandmarkSet, Point, RenderSurface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_THICKNESS: f32 = 0.5;
pub const MAX_THICKNESS: f32 = 12.0;

/// Wing length as a multiple of the stroke width.
pub const WING_LENGTH_FACTOR: f32 = 4.0;

/// Wing elevation above horizontal, in degrees.
pub const WING_ANGLE_DEGREES: f32 = 30.0;

/// Smudge blur sigma per unit of stroke width at `smudge = 1`.
pub const SMUDGE_FACTOR: f32 = 1.5;

const CURVE_STEPS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyelinerStyle {
    #[default]
    Natural,
    Thin,
    Thick,
    Winged,
}

impl EyelinerStyle {
    pub fn width_multiplier(self) -> f32 {
        match self {
            EyelinerStyle::Thin => 0.6,
            EyelinerStyle::Thick => 1.8,
            EyelinerStyle::Natural | EyelinerStyle::Winged => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EyelinerStyle::Natural => "natural",
            EyelinerStyle::Thin => "thin",
            EyelinerStyle::Thick => "thick",
            EyelinerStyle::Winged => "winged",
        }
    }
}

impl FromStr for EyelinerStyle {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(EyelinerStyle::Natural),
            "thin" => Ok(EyelinerStyle::Thin),
            "thick" => Ok(EyelinerStyle::Thick),
            "winged" | "wing" => Ok(EyelinerStyle::Winged),
            _ => Err(EffectError::UnknownStyle(s.to_string())),
        }
    }
}

impl fmt::Display for EyelinerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelinerSettings {
    pub enabled: bool,
    pub color: Color,
    pub opacity: f32,
    /// Base stroke width in source pixels, `[0.5, 12]`.
    pub thickness: f32,
    pub style: EyelinerStyle,
    /// `[0, 1]`
    pub smudge: f32,
}

impl Default for EyelinerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0x1A, 0x1A, 0x1A),
            opacity: 0.85,
            thickness: 2.0,
            style: EyelinerStyle::Natural,
            smudge: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelinerUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub thickness: Option<f32>,
    pub style: Option<String>,
    pub smudge: Option<f32>,
}

impl EyelinerSettings {
    pub fn with_update(&self, update: &EyelinerUpdate) -> Self {
        let style = match update.style.as_deref().map(str::parse::<EyelinerStyle>) {
            None => self.style,
            Some(Ok(style)) => style,
            Some(Err(err)) => {
                tracing::warn!(effect = %EffectKind::Eyeliner, error = %err, "eyeliner style ignored");
                self.style
            }
        };
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(EffectKind::Eyeliner, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            thickness: merge_range(self.thickness, update.thickness, MIN_THICKNESS, MAX_THICKNESS),
            style,
            smudge: merge_range(self.smudge, update.smudge, 0.0, 1.0),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            thickness: range(self.thickness, MIN_THICKNESS, MAX_THICKNESS, defaults.thickness),
            smudge: unit(self.smudge, defaults.smudge),
            ..self
        }
    }

    /// Stroke width in destination pixels.
    pub fn stroke_width(&self, scale: f32) -> f32 {
        self.thickness * self.style.width_multiplier() * scale
    }
}

impl Effect for EyelinerSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Eyeliner
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let Some(mask) = self.liner_mask(landmarks, surface.size(), surface.scale) else {
            return Ok(DrawOutcome::Skipped);
        };
        composite_color(surface.image, &mask, self.color, self.opacity, BlendMode::Normal)?;
        Ok(DrawOutcome::Drawn)
    }
}

impl EyelinerSettings {
    /// Both lid strokes (and wings) in one mask, smudged. `None` when neither
    /// lid has enough points.
    fn liner_mask(&self, landmarks: &LandmarkSet, (w, h): (u32, u32), scale: f32) -> Option<CoverageMask> {
        let width = self.stroke_width(scale);
        let nose = landmarks.scaled(NOSE_TIP, scale);
        let mut mask = CoverageMask::empty(w, h);
        let mut drawn = false;

        for lid_name in [regions::RIGHT_EYE_UPPER_LID, regions::LEFT_EYE_UPPER_LID] {
            let lid = regions::region_path(landmarks, lid_name, scale);
            if !lid.is_drawable() {
                tracing::debug!(lid = lid_name, points = lid.len(), "eyeliner skipped");
                continue;
            }
            let center_x = nose.map_or_else(|| lid.points[lid.len() / 2].x, |p| p.x);
            let path = inner_to_outer(&lid.points, center_x);
            stroke_polyline(&mut mask, &smooth_curve(&path), width);

            if self.style == EyelinerStyle::Winged {
                if let Some(&outer) = path.last() {
                    let (from, to) = wing_segment(outer, center_x, width);
                    stroke_polyline(&mut mask, &[from, to], width);
                }
            }
            drawn = true;
        }

        if !drawn {
            return None;
        }
        mask.feather(self.smudge * width * SMUDGE_FACTOR);
        Some(mask)
    }
}

/// Orient a lid inner corner → outer corner.
///
/// The outer corner is the endpoint horizontally farther from `center_x`;
/// ties keep the first point as the outer corner.
pub fn inner_to_outer(lid: &[Point], center_x: f32) -> Vec<Point> {
    let (Some(first), Some(last)) = (lid.first(), lid.last()) else {
        return Vec::new();
    };
    let mut path = lid.to_vec();
    if (first.x - center_x).abs() >= (last.x - center_x).abs() {
        path.reverse();
    }
    path
}

/// Flatten a midpoint-quadratic curve through `points`.
///
/// Each interior point is the control of a quadratic ending halfway to the
/// next point, so the curve passes through both endpoints without sharp joints.
pub fn smooth_curve(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = vec![points[0]];
    let mut start = points[0];
    for pair in points[1..].windows(2) {
        let control = pair[0];
        let end = control.midpoint(&pair[1]);
        for step in 1..=CURVE_STEPS {
            let t = step as f32 / CURVE_STEPS as f32;
            let a = start.lerp(&control, t);
            let b = control.lerp(&end, t);
            out.push(a.lerp(&b, t));
        }
        start = end;
    }
    out.extend(points.last().copied());
    out
}

/// The wing: from the outer corner, away from `center_x` and upward,
/// `WING_LENGTH_FACTOR × width` long.
pub fn wing_segment(outer: Point, center_x: f32, width: f32) -> (Point, Point) {
    let lateral = if outer.x < center_x { -1.0 } else { 1.0 };
    let angle = WING_ANGLE_DEGREES.to_radians();
    let length = WING_LENGTH_FACTOR * width;
    let tip = Point::new(
        outer.x + lateral * angle.cos() * length,
        outer.y - angle.sin() * length,
    );
    (outer, tip)
}
