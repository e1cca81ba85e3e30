//! Skin smoothing: a masked, texture-preserving blur of the surface.
//!
//! The skin mask covers forehead, nose and both cheeks and excludes the eyes
//! and mouth. Inside it, each pixel moves toward a Gaussian-blurred copy of
//! the surface, with `preserve_texture` of the high-frequency detail added back.

use super::{merge_range, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::mask::{build_mask, CoverageMask};
use crate::regions;
use crate::types::{LandmarkSet, RenderSurface};
use image::imageops;
use serde::{Deserialize, Serialize};

pub const MAX_BLUR_RADIUS: f32 = 40.0;
pub const MAX_FEATHER_RADIUS: f32 = 40.0;

const SKIN_REGIONS: [&str; 4] = [
    regions::FOREHEAD,
    regions::NOSE,
    regions::RIGHT_CHEEK,
    regions::LEFT_CHEEK,
];

const EXCLUDED_REGIONS: [&str; 3] = [regions::RIGHT_EYE, regions::LEFT_EYE, regions::MOUTH];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinSmoothingSettings {
    pub enabled: bool,
    /// `[0, 1]`
    pub strength: f32,
    /// Gaussian sigma in source pixels, `[0, 40]`.
    pub blur_radius: f32,
    /// Share of the original detail kept, `[0, 1]`.
    pub preserve_texture: f32,
    pub feather_radius: f32,
}

impl Default for SkinSmoothingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 0.5,
            blur_radius: 6.0,
            preserve_texture: 0.3,
            feather_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinSmoothingUpdate {
    pub enabled: Option<bool>,
    pub strength: Option<f32>,
    pub blur_radius: Option<f32>,
    pub preserve_texture: Option<f32>,
    pub feather_radius: Option<f32>,
}

impl SkinSmoothingSettings {
    pub fn with_update(&self, update: &SkinSmoothingUpdate) -> Self {
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            strength: merge_range(self.strength, update.strength, 0.0, 1.0),
            blur_radius: merge_range(self.blur_radius, update.blur_radius, 0.0, MAX_BLUR_RADIUS),
            preserve_texture: merge_range(self.preserve_texture, update.preserve_texture, 0.0, 1.0),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            strength: unit(self.strength, defaults.strength),
            blur_radius: range(self.blur_radius, 0.0, MAX_BLUR_RADIUS, defaults.blur_radius),
            preserve_texture: unit(self.preserve_texture, defaults.preserve_texture),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            ..self
        }
    }
}

/// Union of the feathered skin regions, minus the feathered eyes and mouth.
pub fn skin_mask(landmarks: &LandmarkSet, size: (u32, u32), scale: f32, feather_radius: f32) -> CoverageMask {
    let union_of = |names: &[&str]| {
        let mut acc = CoverageMask::empty(size.0, size.1);
        for path in regions::region_paths(landmarks, names, scale) {
            acc.union(&build_mask(&path, size, feather_radius));
        }
        acc
    };
    let mut skin = union_of(&SKIN_REGIONS);
    skin.remove_coverage(&union_of(&EXCLUDED_REGIONS));
    skin
}

impl Effect for SkinSmoothingSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::SkinSmoothing
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let sigma = self.blur_radius * surface.scale;
        if self.strength <= 0.0 || sigma <= 0.0 {
            return Ok(DrawOutcome::Skipped);
        }
        let mask = skin_mask(landmarks, surface.size(), surface.scale, self.feather_radius * surface.scale);
        if mask.is_empty() {
            return Ok(DrawOutcome::Skipped);
        }

        let smoothed = imageops::blur(&*surface.image, sigma);
        for ((dst, soft), &m) in surface.image.pixels_mut().zip(smoothed.pixels()).zip(mask.values()) {
            let weight = m * self.strength;
            if weight <= 0.0 {
                continue;
            }
            for c in 0..3 {
                let original = dst.0[c] as f32;
                let blurred = soft.0[c] as f32;
                let recombined = blurred + (original - blurred) * self.preserve_texture;
                let out = original + (recombined - original) * weight;
                dst.0[c] = out.round().clamp(0.0, 255.0) as u8;
            }
        }
        Ok(DrawOutcome::Drawn)
    }
}
