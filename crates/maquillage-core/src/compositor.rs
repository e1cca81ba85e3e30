//! Compositor: color layers and per-pixel blend functions.
//!
//! A layer is an `Rgba32FImage` with straight (non-premultiplied) alpha. Each
//! draw cuts a flat fill or gradient down to a coverage mask first, then
//! merges it onto the surface with weight `opacity · alpha`:
//!
//! ```text
//! out = dst + (B(src, dst) − dst) · opacity · alpha
//! ```

use crate::color::Color;
use crate::mask::CoverageMask;
use image::{Rgba, Rgba32FImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("layer is {layer:?} but surface is {surface:?}")]
    SizeMismatch {
        layer: (u32, u32),
        surface: (u32, u32),
    },
    #[error("unknown blend mode: {0}")]
    UnknownBlendMode(String),
}

/// Per-pixel blend function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    /// Hue and saturation from the source, luminosity from the destination.
    Color,
}

impl BlendMode {
    pub const ALL: [BlendMode; 7] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::HardLight,
        BlendMode::Color,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "soft-light",
            BlendMode::HardLight => "hard-light",
            BlendMode::Color => "color",
        }
    }

    /// Blend `src` over `dst`, channels in `[0, 1]`.
    pub fn blend(self, src: [f32; 3], dst: [f32; 3]) -> [f32; 3] {
        match self {
            BlendMode::Normal => src,
            BlendMode::Multiply => per_channel(src, dst, |s, d| s * d),
            BlendMode::Screen => per_channel(src, dst, screen),
            BlendMode::Overlay => per_channel(src, dst, |s, d| hard_light(d, s)),
            BlendMode::SoftLight => per_channel(src, dst, soft_light),
            BlendMode::HardLight => per_channel(src, dst, hard_light),
            BlendMode::Color => set_lum(src, lum(dst)),
        }
    }
}

impl FromStr for BlendMode {
    type Err = CompositeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "normal" | "source-over" => Ok(BlendMode::Normal),
            "multiply" => Ok(BlendMode::Multiply),
            "screen" => Ok(BlendMode::Screen),
            "overlay" => Ok(BlendMode::Overlay),
            "soft-light" | "softlight" => Ok(BlendMode::SoftLight),
            "hard-light" | "hardlight" => Ok(BlendMode::HardLight),
            "color" | "colour" => Ok(BlendMode::Color),
            _ => Err(CompositeError::UnknownBlendMode(s.to_string())),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn per_channel(src: [f32; 3], dst: [f32; 3], f: impl Fn(f32, f32) -> f32) -> [f32; 3] {
    [f(src[0], dst[0]), f(src[1], dst[1]), f(src[2], dst[2])]
}

fn screen(s: f32, d: f32) -> f32 {
    1.0 - (1.0 - s) * (1.0 - d)
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        screen(2.0 * s - 1.0, d)
    }
}

fn soft_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        d - (1.0 - 2.0 * s) * d * (1.0 - d)
    } else {
        let dd = if d <= 0.25 {
            ((16.0 * d - 12.0) * d + 4.0) * d
        } else {
            d.sqrt()
        };
        d + (2.0 * s - 1.0) * (dd - d)
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > f32::EPSILON {
        out = out.map(|v| l + (v - l) * l / (l - n));
    }
    if x > 1.0 && x - l > f32::EPSILON {
        out = out.map(|v| l + (v - l) * (1.0 - l) / (x - l));
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

/// A layer of `color` at full alpha, sized `width × height`.
pub fn solid_layer(width: u32, height: u32, color: Color) -> Rgba32FImage {
    let [r, g, b] = color.to_unit();
    Rgba32FImage::from_pixel(width, height, Rgba([r, g, b, 1.0]))
}

/// Multiply the layer's alpha by the mask: keep the layer only where the mask covers.
pub fn keep_only_where(layer: &mut Rgba32FImage, mask: &CoverageMask) -> Result<(), CompositeError> {
    if layer.dimensions() != mask.dimensions() {
        return Err(CompositeError::SizeMismatch {
            layer: layer.dimensions(),
            surface: mask.dimensions(),
        });
    }
    for (px, &m) in layer.pixels_mut().zip(mask.values()) {
        px.0[3] *= m;
    }
    Ok(())
}

/// Blend a layer onto the surface at `opacity`. Pixels with zero weight are untouched.
pub fn composite_layer(
    surface: &mut RgbaImage,
    layer: &Rgba32FImage,
    opacity: f32,
    mode: BlendMode,
) -> Result<(), CompositeError> {
    if layer.dimensions() != surface.dimensions() {
        return Err(CompositeError::SizeMismatch {
            layer: layer.dimensions(),
            surface: surface.dimensions(),
        });
    }
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return Ok(());
    }

    for (dst_px, src_px) in surface.pixels_mut().zip(layer.pixels()) {
        let [sr, sg, sb, sa] = src_px.0;
        let weight = (sa * opacity).clamp(0.0, 1.0);
        if weight <= 0.0 {
            continue;
        }
        let dst = [
            dst_px.0[0] as f32 / 255.0,
            dst_px.0[1] as f32 / 255.0,
            dst_px.0[2] as f32 / 255.0,
        ];
        let blended = mode.blend([sr, sg, sb], dst);
        for c in 0..3 {
            let out = dst[c] + (blended[c] - dst[c]) * weight;
            dst_px.0[c] = (out * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(())
}

/// Apply a flat color through a coverage mask.
pub fn composite_color(
    surface: &mut RgbaImage,
    mask: &CoverageMask,
    color: Color,
    opacity: f32,
    mode: BlendMode,
) -> Result<(), CompositeError> {
    let mut layer = solid_layer(mask.width(), mask.height(), color);
    keep_only_where(&mut layer, mask)?;
    composite_layer(surface, &layer, opacity, mode)
}
