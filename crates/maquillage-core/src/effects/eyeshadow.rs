//! Eyeshadow: a dome over each upper lid, fading toward the brow.
//!
//! The dome starts on the lid and rises by `sin(t·π)·shadow_height`, so it
//! tapers to nothing at both eye corners. Each eye needs both its upper lid
//! and its brow; an eye missing either is skipped on its own.

use super::{merge_blend, merge_color, merge_range, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_layer, keep_only_where, BlendMode};
use crate::gradient::{linear_layer, radial_layer};
use crate::mask::build_mask;
use crate::regions::{self, ScaledRegionPath};
use crate::types::{Bounds, LandmarkSet, Point, RenderSurface};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

pub const MAX_FEATHER_RADIUS: f32 = 20.0;

/// Peak alpha of the shimmer glow.
pub const SHIMMER_OPACITY: f32 = 0.25;

/// Lid/brow region pairs, right eye first.
const EYES: [(&str, &str); 2] = [
    (regions::RIGHT_EYE_UPPER_LID, regions::RIGHT_EYEBROW),
    (regions::LEFT_EYE_UPPER_LID, regions::LEFT_EYEBROW),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeshadowSettings {
    pub enabled: bool,
    pub color: Color,
    pub opacity: f32,
    pub intensity: f32,
    /// Fraction of the lid-to-brow distance covered, `[0, 1]`.
    pub spread: f32,
    pub shimmer: bool,
    pub feather_radius: f32,
    pub blend_mode: BlendMode,
}

impl Default for EyeshadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0x8E, 0x6C, 0x8A),
            opacity: 0.5,
            intensity: 0.7,
            spread: 0.6,
            shimmer: false,
            feather_radius: 4.0,
            blend_mode: BlendMode::Multiply,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeshadowUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub intensity: Option<f32>,
    pub spread: Option<f32>,
    pub shimmer: Option<bool>,
    pub feather_radius: Option<f32>,
    pub blend_mode: Option<String>,
}

impl EyeshadowSettings {
    pub fn with_update(&self, update: &EyeshadowUpdate) -> Self {
        let kind = EffectKind::Eyeshadow;
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(kind, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            intensity: merge_range(self.intensity, update.intensity, 0.0, 1.0),
            spread: merge_range(self.spread, update.spread, 0.0, 1.0),
            shimmer: update.shimmer.unwrap_or(self.shimmer),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
            blend_mode: merge_blend(kind, self.blend_mode, update.blend_mode.as_deref()),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            intensity: unit(self.intensity, defaults.intensity),
            spread: unit(self.spread, defaults.spread),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            ..self
        }
    }

    fn render_eye(
        &self,
        surface: &mut RenderSurface<'_>,
        lid: &ScaledRegionPath,
        brow: &ScaledRegionPath,
    ) -> Result<bool, EffectError> {
        let Some(lid_bounds) = Bounds::of(&lid.points) else {
            return Ok(false);
        };
        let eye_top = lid_bounds.min_y;
        let brow_mean = brow.points.iter().map(|p| p.y).sum::<f32>() / brow.len() as f32;
        let shadow_height = (eye_top - brow_mean).max(0.0) * self.spread;
        if shadow_height <= 0.0 {
            return Ok(false);
        }

        let dome = ScaledRegionPath {
            name: format!("{}_shadow", lid.name),
            points: dome(&lid.points, shadow_height),
            closed: true,
            scale: surface.scale,
        };
        let size = surface.size();
        let mask = build_mask(&dome, size, self.feather_radius * surface.scale);
        if mask.is_empty() {
            return Ok(false);
        }

        let center_x = lid_bounds.center().x;
        let mut layer = linear_layer(
            size,
            Point::new(center_x, eye_top),
            Point::new(center_x, eye_top - shadow_height),
            self.color,
            1.0,
            0.0,
        );
        keep_only_where(&mut layer, &mask)?;
        composite_layer(surface.image, &layer, self.opacity * self.intensity, self.blend_mode)?;

        if self.shimmer {
            let glow = radial_layer(
                size,
                Point::new(center_x, eye_top - shadow_height * 0.3),
                lid_bounds.width() * 0.5,
                Color::WHITE,
                SHIMMER_OPACITY,
                0.0,
            );
            composite_layer(surface.image, &glow, 1.0, BlendMode::Screen)?;
        }
        Ok(true)
    }
}

/// Lid points, then each lid point lifted by `sin(t·π)·height` in reverse order.
///
/// `t` is the point's position along the lid by arc length, so unevenly
/// spaced landmarks still peak halfway between the corners.
pub fn dome(lid: &[Point], height: f32) -> Vec<Point> {
    let t = lid_positions(lid);
    let lifted = lid
        .iter()
        .zip(&t)
        .rev()
        .map(|(p, &t)| Point::new(p.x, p.y - (t * PI).sin() * height));
    lid.iter().copied().chain(lifted).collect()
}

/// Cumulative arc length of each point, normalized to `[0, 1]`.
///
/// Falls back to index spacing when every point coincides.
fn lid_positions(lid: &[Point]) -> Vec<f32> {
    let mut acc = 0.0;
    let mut lengths = Vec::with_capacity(lid.len());
    for (i, p) in lid.iter().enumerate() {
        if i > 0 {
            acc += lid[i - 1].distance(p);
        }
        lengths.push(acc);
    }
    if acc <= f32::EPSILON {
        let steps = lid.len().saturating_sub(1).max(1) as f32;
        return (0..lid.len()).map(|i| i as f32 / steps).collect();
    }
    lengths.into_iter().map(|l| l / acc).collect()
}

impl Effect for EyeshadowSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Eyeshadow
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let mut drawn = false;
        for (lid_name, brow_name) in EYES {
            let lid = regions::region_path(landmarks, lid_name, surface.scale);
            let brow = regions::region_path(landmarks, brow_name, surface.scale);
            if !lid.is_drawable() || !brow.is_drawable() {
                tracing::debug!(lid = lid_name, lid_points = lid.len(), brow_points = brow.len(), "eye skipped");
                continue;
            }
            drawn |= self.render_eye(surface, &lid, &brow)?;
        }
        Ok(if drawn { DrawOutcome::Drawn } else { DrawOutcome::Skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use image::{Rgba, RgbaImage};

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(synthetic::WIDTH, synthetic::HEIGHT, Rgba([200, 200, 200, 255]))
    }

    fn settings() -> EyeshadowSettings {
        EyeshadowSettings {
            enabled: true,
            feather_radius: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_dome_tapers_at_corners() {
        let lid = [Point::new(0.0, 10.0), Point::new(5.0, 8.0), Point::new(10.0, 10.0)];
        let shape = dome(&lid, 4.0);
        assert_eq!(shape.len(), 6);
        assert_eq!(&shape[..3], &lid);
        assert!((shape[3].y - 10.0).abs() < 1e-4);
        assert!((shape[4].y - 4.0).abs() < 1e-4);
        assert!((shape[5].y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_dome_peak_follows_arc_length() {
        // Three points crowd the inner corner of a straight lid.
        let lid = [
            Point::new(0.0, 10.0),
            Point::new(1.0, 10.0),
            Point::new(2.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        let shape = dome(&lid, 4.0);
        assert_eq!(shape.len(), 8);
        // Reverse order: shape[5] is lid[2], a fifth of the way along.
        let expected = 10.0 - (0.2 * PI).sin() * 4.0;
        assert!((shape[5].y - expected).abs() < 1e-4, "got {}", shape[5].y);
        assert!((shape[4].y - 10.0).abs() < 1e-4);
        assert!((shape[7].y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_dome_of_coincident_points_is_finite() {
        let lid = [Point::new(3.0, 3.0); 3];
        assert!(dome(&lid, 2.0).iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_shimmer_brightens_above_lid() {
        let face = synthetic::symmetric_face();
        let mut plain = canvas();
        settings().render(&mut RenderSurface::new(&mut plain, 1.0), &face).unwrap();
        let mut glow = canvas();
        let shimmer = EyeshadowSettings { shimmer: true, ..settings() };
        shimmer.render(&mut RenderSurface::new(&mut glow, 1.0), &face).unwrap();

        for x in [70, synthetic::mirror_x(70)] {
            let (dim, lit) = (plain.get_pixel(x, 65).0, glow.get_pixel(x, 65).0);
            assert!((0..3).all(|c| lit[c] > dim[c]), "x={x}: {dim:?} vs {lit:?}");
        }
        assert_eq!(glow.get_pixel(5, 5), plain.get_pixel(5, 5));
    }

    #[test]
    fn test_render_shades_above_lid_only() {
        let face = synthetic::symmetric_face();
        let mut img = canvas();
        let before = img.clone();
        let mut surface = RenderSurface::new(&mut img, 1.0);
        assert_eq!(settings().render(&mut surface, &face).unwrap(), DrawOutcome::Drawn);

        assert!(img.get_pixel(70, 65).0[0] < before.get_pixel(70, 65).0[0]);
        assert!(img.get_pixel(synthetic::mirror_x(70), 65).0[0] < 200);
        assert_eq!(img.get_pixel(70, 85), before.get_pixel(70, 85));
    }

    #[test]
    fn test_missing_brow_skips_that_eye_only() {
        let mut face = synthetic::symmetric_face();
        for &i in regions::lookup(regions::LEFT_EYEBROW).unwrap().indices {
            face.remove(i);
        }
        let mut img = canvas();
        let mut surface = RenderSurface::new(&mut img, 1.0);
        assert_eq!(settings().render(&mut surface, &face).unwrap(), DrawOutcome::Drawn);

        assert!(img.get_pixel(70, 65).0[0] < 200);
        assert_eq!(img.get_pixel(synthetic::mirror_x(70), 65).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_zero_spread_draws_nothing() {
        let face = synthetic::symmetric_face();
        let mut img = canvas();
        let before = img.clone();
        let s = EyeshadowSettings { spread: 0.0, ..settings() };
        let mut surface = RenderSurface::new(&mut img, 1.0);
        assert_eq!(s.render(&mut surface, &face).unwrap(), DrawOutcome::Skipped);
        assert_eq!(img, before);
    }
}
