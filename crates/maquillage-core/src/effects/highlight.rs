//! Highlight: a glow on each cheekbone and down the nose bridge.

use super::{merge_blend, merge_color, merge_range, radial_region, range, unit, DrawOutcome, Effect, EffectError, EffectKind};
use crate::color::Color;
use crate::compositor::{composite_layer, BlendMode};
use crate::gradient::radial_layer;
use crate::regions;
use crate::types::{Bounds, LandmarkSet, RenderSurface};
use serde::{Deserialize, Serialize};

pub const MAX_FEATHER_RADIUS: f32 = 30.0;

/// Peak alpha of the white shimmer glow.
pub const SHIMMER_OPACITY: f32 = 0.2;

const CHEEKBONES: [&str; 2] = [regions::RIGHT_CHEEKBONE, regions::LEFT_CHEEKBONE];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub enabled: bool,
    pub color: Color,
    pub opacity: f32,
    pub intensity: f32,
    pub feather_radius: f32,
    pub blend_mode: BlendMode,
    pub shimmer: bool,
    pub nose_bridge: bool,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(0xFF, 0xF4, 0xE0),
            opacity: 0.35,
            intensity: 0.6,
            feather_radius: 8.0,
            blend_mode: BlendMode::Screen,
            shimmer: false,
            nose_bridge: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightUpdate {
    pub enabled: Option<bool>,
    pub color: Option<String>,
    pub opacity: Option<f32>,
    pub intensity: Option<f32>,
    pub feather_radius: Option<f32>,
    pub blend_mode: Option<String>,
    pub shimmer: Option<bool>,
    pub nose_bridge: Option<bool>,
}

impl HighlightSettings {
    pub fn with_update(&self, update: &HighlightUpdate) -> Self {
        let kind = EffectKind::Highlight;
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            color: merge_color(kind, self.color, update.color.as_deref()),
            opacity: merge_range(self.opacity, update.opacity, 0.0, 1.0),
            intensity: merge_range(self.intensity, update.intensity, 0.0, 1.0),
            feather_radius: merge_range(self.feather_radius, update.feather_radius, 0.0, MAX_FEATHER_RADIUS),
            blend_mode: merge_blend(kind, self.blend_mode, update.blend_mode.as_deref()),
            shimmer: update.shimmer.unwrap_or(self.shimmer),
            nose_bridge: update.nose_bridge.unwrap_or(self.nose_bridge),
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            opacity: unit(self.opacity, defaults.opacity),
            intensity: unit(self.intensity, defaults.intensity),
            feather_radius: range(self.feather_radius, 0.0, MAX_FEATHER_RADIUS, defaults.feather_radius),
            ..self
        }
    }
}

impl Effect for HighlightSettings {
    fn kind(&self) -> EffectKind {
        EffectKind::Highlight
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError> {
        let strength = self.opacity * self.intensity;
        let feather = self.feather_radius * surface.scale;

        let mut names: Vec<&str> = CHEEKBONES.to_vec();
        if self.nose_bridge {
            names.push(regions::NOSE_BRIDGE);
        }

        let mut drawn = false;
        for name in names {
            let path = regions::region_path(landmarks, name, surface.scale);
            drawn |= radial_region(surface, &path, feather, self.color, (1.0, 0.0), strength, self.blend_mode)?;
        }

        if self.shimmer {
            for name in CHEEKBONES {
                let path = regions::region_path(landmarks, name, surface.scale);
                let Some(bounds) = Bounds::of(&path.points).filter(|_| path.is_drawable()) else {
                    continue;
                };
                let glow = radial_layer(
                    surface.size(),
                    bounds.center(),
                    bounds.radius(),
                    Color::WHITE,
                    SHIMMER_OPACITY,
                    0.0,
                );
                composite_layer(surface.image, &glow, 1.0, BlendMode::Screen)?;
            }
        }

        Ok(if drawn { DrawOutcome::Drawn } else { DrawOutcome::Skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use image::{Rgba, RgbaImage};

    const BASE: [u8; 4] = [120, 100, 90, 255];

    fn render(settings: &HighlightSettings) -> RgbaImage {
        let face = synthetic::symmetric_face();
        let mut img = RgbaImage::from_pixel(synthetic::WIDTH, synthetic::HEIGHT, Rgba(BASE));
        settings.render(&mut RenderSurface::new(&mut img, 1.0), &face).unwrap();
        img
    }

    fn sharp() -> HighlightSettings {
        HighlightSettings {
            enabled: true,
            opacity: 1.0,
            intensity: 1.0,
            feather_radius: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_cheekbone_brightest_at_center() {
        let img = render(&sharp());
        let center = img.get_pixel(62, 94).0[0];
        let edge = img.get_pixel(51, 94).0[0];
        assert!(center > edge, "center {center} should outshine edge {edge}");
        assert!(edge >= BASE[0]);
        assert_eq!(img.get_pixel(10, 190).0, BASE);
    }

    #[test]
    fn test_nose_bridge_toggle() {
        let lit = render(&sharp());
        assert!(lit.get_pixel(100, 96).0[0] > BASE[0]);
        let dark = render(&HighlightSettings { nose_bridge: false, ..sharp() });
        assert_eq!(dark.get_pixel(100, 96).0, BASE);
    }

    #[test]
    fn test_shimmer_adds_light() {
        let plain = render(&sharp());
        let shimmer = render(&HighlightSettings { shimmer: true, ..sharp() });
        assert!(shimmer.get_pixel(62, 94).0[2] > plain.get_pixel(62, 94).0[2]);
    }
}
