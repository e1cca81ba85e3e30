//! Cosmetic effects.
//!
//! Each effect owns an immutable settings value and a matching update record.
//! `with_update` is pure: it returns new settings with only the fields present
//! in the update changed, every numeric field clamped to its documented range.
//! Invalid colors and unknown blend modes are warned about and ignored.

pub mod blush;
pub mod contour;
pub mod eyeliner;
pub mod eyeshadow;
pub mod highlight;
pub mod lipstick;
pub mod skin_smoothing;

pub use blush::{BlushSettings, BlushUpdate};
pub use contour::{ContourSettings, ContourUpdate};
pub use eyeliner::{EyelinerSettings, EyelinerStyle, EyelinerUpdate};
pub use eyeshadow::{EyeshadowSettings, EyeshadowUpdate};
pub use highlight::{HighlightSettings, HighlightUpdate};
pub use lipstick::{LipstickSettings, LipstickUpdate};
pub use skin_smoothing::{SkinSmoothingSettings, SkinSmoothingUpdate};

use crate::color::Color;
use crate::compositor::{composite_layer, keep_only_where, BlendMode, CompositeError};
use crate::gradient::radial_layer;
use crate::mask::build_mask;
use crate::regions::ScaledRegionPath;
use crate::types::{Bounds, LandmarkSet, RenderSurface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EffectError {
    #[error("compositing failed: {0}")]
    Composite(#[from] CompositeError),
    #[error("unknown effect: {0}")]
    UnknownEffect(String),
    #[error("unknown eyeliner style: {0}")]
    UnknownStyle(String),
}

/// What a draw call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// Disabled, or not enough landmarks to draw anything.
    Skipped,
}

/// The effects, in back-to-front draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SkinSmoothing,
    Contour,
    Highlight,
    Blush,
    Eyeshadow,
    Eyeliner,
    Lipstick,
}

impl EffectKind {
    /// Fixed draw order. Skin smoothing samples the base image before any color lands.
    pub const DRAW_ORDER: [EffectKind; 7] = [
        EffectKind::SkinSmoothing,
        EffectKind::Contour,
        EffectKind::Highlight,
        EffectKind::Blush,
        EffectKind::Eyeshadow,
        EffectKind::Eyeliner,
        EffectKind::Lipstick,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::SkinSmoothing => "skin_smoothing",
            EffectKind::Contour => "contour",
            EffectKind::Highlight => "highlight",
            EffectKind::Blush => "blush",
            EffectKind::Eyeshadow => "eyeshadow",
            EffectKind::Eyeliner => "eyeliner",
            EffectKind::Lipstick => "lipstick",
        }
    }

    /// Position in [`DRAW_ORDER`](Self::DRAW_ORDER).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for EffectKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EffectKind::DRAW_ORDER
            .into_iter()
            .find(|k| k.name() == normalized || (normalized == "skin" && *k == EffectKind::SkinSmoothing))
            .ok_or_else(|| EffectError::UnknownEffect(s.to_string()))
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A renderable effect: settings plus the algorithm that draws them.
pub trait Effect {
    fn kind(&self) -> EffectKind;

    fn enabled(&self) -> bool;

    /// Draw onto the surface. Callers check [`enabled`](Self::enabled) first.
    fn render(
        &self,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, EffectError>;
}

/// Settings for every effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeupSettings {
    pub skin_smoothing: SkinSmoothingSettings,
    pub contour: ContourSettings,
    pub highlight: HighlightSettings,
    pub blush: BlushSettings,
    pub eyeshadow: EyeshadowSettings,
    pub eyeliner: EyelinerSettings,
    pub lipstick: LipstickSettings,
}

impl MakeupSettings {
    pub fn effect(&self, kind: EffectKind) -> &dyn Effect {
        match kind {
            EffectKind::SkinSmoothing => &self.skin_smoothing,
            EffectKind::Contour => &self.contour,
            EffectKind::Highlight => &self.highlight,
            EffectKind::Blush => &self.blush,
            EffectKind::Eyeshadow => &self.eyeshadow,
            EffectKind::Eyeliner => &self.eyeliner,
            EffectKind::Lipstick => &self.lipstick,
        }
    }

    /// Effects in draw order.
    pub fn effects(&self) -> [&dyn Effect; 7] {
        EffectKind::DRAW_ORDER.map(|kind| self.effect(kind))
    }

    /// New settings with `update` merged into its effect.
    pub fn with_update(&self, update: &EffectUpdate) -> Self {
        let mut next = self.clone();
        match update {
            EffectUpdate::SkinSmoothing(u) => next.skin_smoothing = self.skin_smoothing.with_update(u),
            EffectUpdate::Contour(u) => next.contour = self.contour.with_update(u),
            EffectUpdate::Highlight(u) => next.highlight = self.highlight.with_update(u),
            EffectUpdate::Blush(u) => next.blush = self.blush.with_update(u),
            EffectUpdate::Eyeshadow(u) => next.eyeshadow = self.eyeshadow.with_update(u),
            EffectUpdate::Eyeliner(u) => next.eyeliner = self.eyeliner.with_update(u),
            EffectUpdate::Lipstick(u) => next.lipstick = self.lipstick.with_update(u),
        }
        next
    }

    /// Clamp every effect's numeric fields, e.g. after deserializing.
    pub fn validated(self) -> Self {
        Self {
            skin_smoothing: self.skin_smoothing.validated(),
            contour: self.contour.validated(),
            highlight: self.highlight.validated(),
            blush: self.blush.validated(),
            eyeshadow: self.eyeshadow.validated(),
            eyeliner: self.eyeliner.validated(),
            lipstick: self.lipstick.validated(),
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.effects().iter().any(|e| e.enabled())
    }
}

/// A partial settings change for one effect.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectUpdate {
    SkinSmoothing(SkinSmoothingUpdate),
    Contour(ContourUpdate),
    Highlight(HighlightUpdate),
    Blush(BlushUpdate),
    Eyeshadow(EyeshadowUpdate),
    Eyeliner(EyelinerUpdate),
    Lipstick(LipstickUpdate),
}

impl EffectUpdate {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectUpdate::SkinSmoothing(_) => EffectKind::SkinSmoothing,
            EffectUpdate::Contour(_) => EffectKind::Contour,
            EffectUpdate::Highlight(_) => EffectKind::Highlight,
            EffectUpdate::Blush(_) => EffectKind::Blush,
            EffectUpdate::Eyeshadow(_) => EffectKind::Eyeshadow,
            EffectUpdate::Eyeliner(_) => EffectKind::Eyeliner,
            EffectUpdate::Lipstick(_) => EffectKind::Lipstick,
        }
    }

    /// An update that only sets `enabled`.
    pub fn enabled(kind: EffectKind, enabled: bool) -> Self {
        let on = Some(enabled);
        match kind {
            EffectKind::SkinSmoothing => EffectUpdate::SkinSmoothing(SkinSmoothingUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Contour => EffectUpdate::Contour(ContourUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Highlight => EffectUpdate::Highlight(HighlightUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Blush => EffectUpdate::Blush(BlushUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Eyeshadow => EffectUpdate::Eyeshadow(EyeshadowUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Eyeliner => EffectUpdate::Eyeliner(EyelinerUpdate {
                enabled: on,
                ..Default::default()
            }),
            EffectKind::Lipstick => EffectUpdate::Lipstick(LipstickUpdate {
                enabled: on,
                ..Default::default()
            }),
        }
    }
}

/// Clamp to `[0, 1]`, mapping NaN to `fallback`.
pub(crate) fn unit(value: f32, fallback: f32) -> f32 {
    range(value, 0.0, 1.0, fallback)
}

/// Clamp to `[min, max]`, mapping NaN to `fallback`.
pub(crate) fn range(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

/// Merge an optional numeric field, clamped to `[min, max]`.
pub(crate) fn merge_range(current: f32, update: Option<f32>, min: f32, max: f32) -> f32 {
    update.map_or(current, |v| range(v, min, max, current))
}

/// Merge an optional hex color; an unparseable value keeps `current`.
pub(crate) fn merge_color(effect: EffectKind, current: Color, update: Option<&str>) -> Color {
    match update.map(str::parse::<Color>) {
        None => current,
        Some(Ok(color)) => color,
        Some(Err(err)) => {
            tracing::warn!(effect = %effect, error = %err, "invalid color ignored");
            current
        }
    }
}

/// Merge an optional blend mode name; an unknown name keeps `current`.
pub(crate) fn merge_blend(effect: EffectKind, current: BlendMode, update: Option<&str>) -> BlendMode {
    match update.map(str::parse::<BlendMode>) {
        None => current,
        Some(Ok(mode)) => mode,
        Some(Err(err)) => {
            tracing::warn!(effect = %effect, error = %err, "unknown blend mode ignored");
            current
        }
    }
}

/// Fill a region with a radial gradient centered on its bounding box.
///
/// Alpha runs from `inner_alpha` at the center to `outer_alpha` at the box
/// radius, cut to the region's feathered mask. Returns false when the region
/// was too small to draw.
pub(crate) fn radial_region(
    surface: &mut RenderSurface<'_>,
    path: &ScaledRegionPath,
    feather_radius: f32,
    color: Color,
    (inner_alpha, outer_alpha): (f32, f32),
    opacity: f32,
    mode: BlendMode,
) -> Result<bool, CompositeError> {
    if !path.is_drawable() {
        tracing::debug!(region = %path.name, points = path.len(), "region skipped");
        return Ok(false);
    }
    let Some(bounds) = Bounds::of(&path.points) else {
        return Ok(false);
    };
    let size = surface.size();
    let mask = build_mask(path, size, feather_radius);
    if mask.is_empty() {
        return Ok(false);
    }
    let mut layer = radial_layer(size, bounds.center(), bounds.radius(), color, inner_alpha, outer_alpha);
    keep_only_where(&mut layer, &mask)?;
    composite_layer(surface.image, &layer, opacity, mode)?;
    Ok(true)
}
