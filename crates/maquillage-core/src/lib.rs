//! maquillage-core: Landmark-driven makeup compositing engine.
//!
//! Takes a face-mesh landmark snapshot and a destination raster, and paints
//! cosmetic effects (skin smoothing, contour, highlight, blush, eyeshadow,
//! eyeliner, lipstick) in a fixed back-to-front order using feathered region
//! masks, gradients and per-pixel blend modes.

pub mod color;
pub mod compositor;
pub mod detector;
pub mod effects;
pub mod gradient;
pub mod mask;
pub mod overlay;
pub mod pipeline;
pub mod presets;
pub mod regions;
pub mod synthetic;
pub mod types;

pub use color::Color;
pub use compositor::BlendMode;
pub use detector::{Detection, LandmarkDetector, StaticDetector};
pub use effects::{DrawOutcome, EffectKind, EffectUpdate, MakeupSettings};
pub use pipeline::{EffectState, MakeupPipeline, RenderError, RenderReport};
pub use presets::Preset;
pub use types::{LandmarkPoint, LandmarkSet, Point, RenderOptions, RenderSurface};
