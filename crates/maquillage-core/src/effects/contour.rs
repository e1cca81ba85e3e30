//! Contour: hollow-shaped shadows under the cheekbones and at the temples,
//! plus two soft lines along the sides of the nose.

use super::{merge_blend, merge_color, merge_range, radial_region, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_color, BlendMode};
use crate::mask::{stroke_polyline, CoverageMask};
use crate::regions;
use crate::types::{LandmarkSet, RenderSurface};
use serde::{Deserialize, Serialize};

pub const MAX_FEATHER_RADIUS: f32 = 30.0;
pub const MAX_NOSE_LINE_WIDTH: f32 = 12.0;

const SHADOW_REGIONS: [&str; 4] = [
    regions::RIGHT_CHEEK_HOLLOW,
    regions::LEFT_CHEEK_HOLLOW,
    regions::RIGHT_TEMPLE,
    regions::LEFT_TEMPLE,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    pub enabled: bool,
    pub color: Color,
    pub opacity: f32,
    pub intensity: f32,
    pub feather_radius: f32,
    pub blend_mode: BlendMode,
    /// Also shade the sides of the nose.
    pub nose: bool,
    pub nose_line_width: f32,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0x8B, 0x6B, 0x4A),
            opacity: 0.4,
            intensity: 0.6,
            feather_radius: 10.0,
            blend_mode: BlendMode::Multiply,
            nose: true,
            nose_line_width: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub intensity: Option<f32>,
    pub feather_radius: Option<f32>,
    pub blend_mode: Option<String>,
    pub nose: Option<bool>,
    pub nose_line_width: Option<f32>,
}

impl ContourSettings {
    pub fn with_update(&self, update: &ContourUpdate) -> Self {
        let kind = EffectKind::Contour;
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(kind, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            intensity: merge_range(self.intensity, update.intensity, 0.0, 1.0),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
            blend_mode: merge_blend(kind, self.blend_mode, update.blend_mode.as_deref()),
            nose: update.nose.unwrap_or(self.nose),
            nose_line_width: merge_range(self.nose_line_width, update.nose_line_width, 0.0, MAX_NOSE_LINE_WIDTH),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            intensity: unit(self.intensity, defaults.intensity),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            nose_line_width: range(self.nose_line_width, 0.0, MAX_NOSE_LINE_WIDTH, defaults.nose_line_width),
            ..self
        }
    }

    fn strength(&self) -> f32 {
        self.opacity * self.intensity
    }

    fn render_nose(&self, surface: &mut RenderSurface<'_>, landmarks: &LandmarkSet) -> Result<bool, EffectError> {
        let (w, h) = surface.size();
        let mut mask = CoverageMask::empty(w, h);
        let width = self.nose_line_width * surface.scale;
        let mut drawn = false;
        for side in [regions::RIGHT_NOSE_SIDE, regions::LEFT_NOSE_SIDE] {
            let path = regions::region_path(landmarks, side, surface.scale);
            if !path.is_drawable() {
                continue;
            }
            stroke_polyline(&mut mask, &path.points, width);
            drawn = true;
        }
        if !drawn || mask.is_empty() {
            return Ok(false);
        }
        mask.feather(self.feather_radius * surface.scale);
        composite_color(surface.image, &mask, self.color, self.strength(), self.blend_mode)?;
        Ok(true)
    }
}

impl Effect for ContourSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Contour
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
        for name in SHADOW_REGIONS {
            let path = regions::region_path(landmarks, name, surface.scale);
            drawn |= radial_region(
                surface,
                &path,
                self.feather_radius * surface.scale,
                self.color,
                (0.0, 1.0),
                self.strength(),
                self.blend_mode,
            )?;
        }
        if self.nose {
            drawn |= self.render_nose(surface, landmarks)?;
        }
        Ok(if drawn { DrawOutcome::Drawn } else { DrawOutcome::Skipped })
    }
}
