//! Blush: flat color through the feathered union of both cheeks.

use super::{merge_blend, merge_color, merge_range, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_color, BlendMode};
use crate::mask::build_combined_mask;
use crate::regions::{self, LEFT_CHEEK, RIGHT_CHEEK};
use crate::types::{LandmarkSet, RenderSurface};
use serde::{Deserialize, Serialize};

pub const MAX_FEATHER_RADIUS: f32 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlushSettings {
    pub enabled: bool,
    pub color: Color,
    pub opacity: f32,
    /// Source pixels, `[0, 40]`.
    pub feather_radius: f32,
    pub blend_mode: BlendMode,
}

impl Default for BlushSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0xE8, 0x85, 0x7A),
            opacity: 0.3,
            feather_radius: 14.0,
            blend_mode: BlendMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlushUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub feather_radius: Option<f32>,
    pub blend_mode: Option<String>,
}

impl BlushSettings {
    pub fn with_update(&self, update: &BlushUpdate) -> Self {
        let kind = EffectKind::Blush;
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(kind, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
            blend_mode: merge_blend(kind, self.blend_mode, update.blend_mode.as_deref()),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            ..self
        }
    }
}

impl Effect for BlushSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Blush
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let paths = regions::region_paths(landmarks, &[RIGHT_CHEEK, LEFT_CHEEK], surface.scale);
        let mask = build_combined_mask(&paths, surface.size(), self.feather_radius * surface.scale);
        if mask.is_empty() {
            return Ok(DrawOutcome::Skipped);
        }
        composite_color(surface.image, &mask, self.color, self.opacity, self.blend_mode)?;
        Ok(DrawOutcome::Drawn)
    }
}
