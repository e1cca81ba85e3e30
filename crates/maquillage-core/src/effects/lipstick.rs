//! Lipstick: flat color through the feathered upper + lower lip mask.

use super::{merge_blend, merge_color, merge_range, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_color, BlendMode};
use crate::mask::build_combined_mask;
use crate::regions::{self, LOWER_LIP, UPPER_LIP};
use crate::types::{LandmarkSet, RenderSurface};
use serde::{Deserialize, Serialize};

pub const MAX_FEATHER_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipstickSettings {
    pub enabled: bool,
    pub color: Color,
    /// `[0, 1]`
    pub opacity: f32,
    /// Saturation multiplier applied to `color`, `[0, 1]`.
    pub intensity: f32,
    /// Source pixels, `[0, 20]`.
    pub feather_radius: f32,
    pub blend_mode: BlendMode,
}

impl Default for LipstickSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0xC2, 0x18, 0x5B),
            opacity: 0.6,
            intensity: 1.0,
            feather_radius: 2.0,
            blend_mode: BlendMode::Multiply,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipstickUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub intensity: Option<f32>,
    pub feather_radius: Option<f32>,
    pub blend_mode: Option<String>,
}

impl LipstickSettings {
    pub fn with_update(&self, update: &LipstickUpdate) -> Self {
        let kind = EffectKind::Lipstick;
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(kind, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            intensity: merge_range(self.intensity, update.intensity, 0.0, 1.0),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
            blend_mode: merge_blend(kind, self.blend_mode, update.blend_mode.as_deref()),
        }
        .validated()
    }

    /// Clamp every numeric field into range.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            intensity: unit(self.intensity, defaults.intensity),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            ..self
        }
    }

    /// `color` with its saturation scaled by `intensity`.
    pub fn effective_color(&self) -> Color {
        self.color.with_intensity(self.intensity)
    }
}

impl Effect for LipstickSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Lipstick
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let paths = regions::region_paths(landmarks, &[UPPER_LIP, LOWER_LIP], surface.scale);
        let mask = build_combined_mask(&paths, surface.size(), self.feather_radius * surface.scale);
        if mask.is_empty() {
            return Ok(DrawOutcome::Skipped);
        }
        composite_color(
            surface.image,
            &mask,
            self.effective_color(),
            self.opacity,
            self.blend_mode,
        )?;
        Ok(DrawOutcome::Drawn)
    }
}
