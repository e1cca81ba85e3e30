//! Effect pipeline: settings, per-effect draw state, and the render pass.
//!
//! Effects always run in [`EffectKind::DRAW_ORDER`]. Each one is isolated: an
//! error or panic inside one effect is logged and reported, and the pass
//! continues with the next. Changing settings never redraws anything; it only
//! marks the effect dirty until the next pass.

use crate::effects::{DrawOutcome, EffectError, EffectKind, EffectUpdate, MakeupSettings};
use crate::overlay;
use crate::presets::Preset;
use crate::types::{LandmarkSet, RenderOptions, RenderSurface};
use image::RgbaImage;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render surface unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },
    #[error("{kind} failed: {source}")]
    Effect {
        kind: EffectKind,
        #[source]
        source: EffectError,
    },
    #[error("{0} panicked")]
    Panicked(EffectKind),
}

/// Whether an effect's current settings are on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectState {
    /// Settings changed since the last pass (or never drawn).
    #[default]
    Idle,
    Drawn,
}

/// What one pass did, per effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderReport {
    pub applied: Vec<EffectKind>,
    /// Disabled, or missing the landmarks it needs.
    pub skipped: Vec<EffectKind>,
    pub failed: Vec<(EffectKind, String)>,
}

impl RenderReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, kind: EffectKind, result: Result<DrawOutcome, RenderError>) {
        match result {
            Ok(DrawOutcome::Drawn) => self.applied.push(kind),
            Ok(DrawOutcome::Skipped) => self.skipped.push(kind),
            Err(e) => self.failed.push((kind, e.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MakeupPipeline {
    settings: MakeupSettings,
    states: [EffectState; 7],
}

impl MakeupPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: MakeupSettings) -> Self {
        Self {
            settings,
            states: Default::default(),
        }
    }

    pub fn settings(&self) -> &MakeupSettings {
        &self.settings
    }

    pub fn state(&self, kind: EffectKind) -> EffectState {
        self.states[kind.index()]
    }

    /// True when some effect changed since the last full pass.
    pub fn is_dirty(&self) -> bool {
        self.states.contains(&EffectState::Idle)
    }

    /// Merge a partial update into one effect's settings. Nothing is redrawn.
    pub fn update(&mut self, update: &EffectUpdate) {
        let kind = update.kind();
        self.settings = self.settings.with_update(update);
        self.states[kind.index()] = EffectState::Idle;
        tracing::debug!(effect = %kind, "settings updated");
    }

    /// Apply every update a preset names. Takes effect on the next full redraw.
    pub fn apply_preset(&mut self, preset: &Preset) {
        for update in preset.updates() {
            self.update(&update);
        }
        tracing::info!(preset = %preset.name, effects = preset.effects().len(), "preset applied");
    }

    /// Run every effect in draw order over the surface.
    ///
    /// The caller is expected to have reset the surface to the base image;
    /// [`render`](Self::render) does both. Without landmarks every effect is
    /// skipped.
    pub fn apply_all(
        &mut self,
        surface: &mut RenderSurface<'_>,
        landmarks: Option<&LandmarkSet>,
        options: &RenderOptions,
    ) -> Result<RenderReport, RenderError> {
        check_surface(surface)?;
        let start = Instant::now();
        let mut report = RenderReport::default();

        match landmarks {
            None => {
                tracing::debug!("no landmarks, all effects skipped");
                report.skipped.extend(EffectKind::DRAW_ORDER);
            }
            Some(landmarks) => {
                for kind in EffectKind::DRAW_ORDER {
                    let result = self.run_effect(kind, surface, landmarks);
                    if let Err(e) = &result {
                        tracing::warn!(effect = %kind, error = %e, "effect failed, continuing");
                    }
                    report.record(kind, result);
                }
                if options.debug_overlay {
                    if let Err(e) = overlay::draw_overlay(surface.image, landmarks, surface.scale) {
                        tracing::warn!(error = %e, "debug overlay failed");
                    }
                }
            }
        }

        self.states = [EffectState::Drawn; 7];
        tracing::debug!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "render pass complete"
        );
        Ok(report)
    }

    /// Draw one effect on top of whatever the surface holds.
    pub fn apply_one(
        &mut self,
        kind: EffectKind,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, RenderError> {
        check_surface(surface)?;
        let outcome = self.run_effect(kind, surface, landmarks)?;
        self.states[kind.index()] = EffectState::Drawn;
        Ok(outcome)
    }

    /// [`apply_one`](Self::apply_one) by effect name. Unknown names are a warned no-op.
    pub fn apply_named(
        &mut self,
        name: &str,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, RenderError> {
        match name.parse::<EffectKind>() {
            Ok(kind) => self.apply_one(kind, surface, landmarks),
            Err(e) => {
                tracing::warn!(error = %e, "apply skipped");
                Ok(DrawOutcome::Skipped)
            }
        }
    }

    /// Full redraw: copy `base`, then apply every effect.
    pub fn render(
        &mut self,
        base: &RgbaImage,
        landmarks: Option<&LandmarkSet>,
        scale: f32,
        options: &RenderOptions,
    ) -> Result<(RgbaImage, RenderReport), RenderError> {
        let mut image = base.clone();
        let report = self.apply_all(&mut RenderSurface::new(&mut image, scale), landmarks, options)?;
        Ok((image, report))
    }

    fn run_effect(
        &self,
        kind: EffectKind,
        surface: &mut RenderSurface<'_>,
        landmarks: &LandmarkSet,
    ) -> Result<DrawOutcome, RenderError> {
        let effect = self.settings.effect(kind);
        if !effect.enabled() {
            return Ok(DrawOutcome::Skipped);
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| effect.render(surface, landmarks)))
            .map_err(|_| RenderError::Panicked(kind))?
            .map_err(|source| RenderError::Effect { kind, source })?;
        if outcome == DrawOutcome::Skipped {
            tracing::debug!(effect = %kind, "not enough landmarks, skipped");
        }
        Ok(outcome)
    }
}

fn check_surface(surface: &RenderSurface<'_>) -> Result<(), RenderError> {
    if surface.is_empty() {
        return Err(RenderError::SurfaceUnavailable {
            width: surface.width(),
            height: surface.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{BlushUpdate, LipstickUpdate};
    use crate::presets;
    use crate::synthetic;
    use image::Rgba;

    fn base() -> RgbaImage {
        RgbaImage::from_pixel(synthetic::WIDTH, synthetic::HEIGHT, Rgba([205, 170, 150, 255]))
    }

    #[test]
    fn test_state_machine() {
        let mut pipeline = MakeupPipeline::new();
        assert!(pipeline.is_dirty());
        assert_eq!(pipeline.state(EffectKind::Blush), EffectState::Idle);

        let face = synthetic::symmetric_face();
        pipeline.render(&base(), Some(&face), 1.0, &RenderOptions::default()).unwrap();
        assert!(!pipeline.is_dirty());
        assert_eq!(pipeline.state(EffectKind::Blush), EffectState::Drawn);

        pipeline.update(&EffectUpdate::enabled(EffectKind::Blush, true));
        assert!(pipeline.is_dirty());
        assert_eq!(pipeline.state(EffectKind::Blush), EffectState::Idle);
        assert_eq!(pipeline.state(EffectKind::Lipstick), EffectState::Drawn);
    }

    #[test]
    fn test_report_lists_applied_and_skipped() {
        let mut pipeline = MakeupPipeline::new();
        pipeline.update(&EffectUpdate::enabled(EffectKind::Lipstick, true));
        pipeline.update(&EffectUpdate::enabled(EffectKind::Eyeliner, true));
        let face = synthetic::symmetric_face();
        let (_, report) = pipeline.render(&base(), Some(&face), 1.0, &RenderOptions::default()).unwrap();
        assert_eq!(report.applied, vec![EffectKind::Eyeliner, EffectKind::Lipstick]);
        assert_eq!(report.skipped.len(), 5);
        assert!(report.is_clean());
    }

    #[test]
    fn test_no_landmarks_leaves_base() {
        let mut pipeline = MakeupPipeline::new();
        pipeline.apply_preset(presets::builtin_preset("glam").unwrap());
        let (out, report) = pipeline.render(&base(), None, 1.0, &RenderOptions::default()).unwrap();
        assert_eq!(out, base());
        assert_eq!(report.skipped, EffectKind::DRAW_ORDER.to_vec());
    }

    #[test]
    fn test_zero_sized_surface_is_error() {
        let mut pipeline = MakeupPipeline::new();
        let empty = RgbaImage::new(0, 0);
        let err = pipeline
            .render(&empty, Some(&synthetic::symmetric_face()), 1.0, &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::SurfaceUnavailable { .. }));
    }

    #[test]
    fn test_apply_named_unknown_is_noop() {
        let mut pipeline = MakeupPipeline::new();
        let mut img = base();
        let face = synthetic::symmetric_face();
        let outcome = pipeline
            .apply_named("mascara", &mut RenderSurface::new(&mut img, 1.0), &face)
            .unwrap();
        assert_eq!(outcome, DrawOutcome::Skipped);
        assert_eq!(img, base());
    }

    #[test]
    fn test_apply_one_draws_on_top() {
        let mut pipeline = MakeupPipeline::new();
        pipeline.update(&EffectUpdate::Lipstick(LipstickUpdate {
            enabled: Some(true),
            color: Some("#CC3366".into()),
            ..Default::default()
        }));
        let mut img = base();
        let face = synthetic::symmetric_face();
        let outcome = pipeline
            .apply_named("lipstick", &mut RenderSurface::new(&mut img, 1.0), &face)
            .unwrap();
        assert_eq!(outcome, DrawOutcome::Drawn);
        assert_eq!(pipeline.state(EffectKind::Lipstick), EffectState::Drawn);
        assert_ne!(img, base());
    }

    #[test]
    fn test_disable_takes_effect_on_next_full_redraw() {
        let mut pipeline = MakeupPipeline::new();
        pipeline.update(&EffectUpdate::Blush(BlushUpdate {
            enabled: Some(true),
            opacity: Some(0.9),
            ..Default::default()
        }));
        let face = synthetic::symmetric_face();
        let opts = RenderOptions::default();
        let (with_blush, _) = pipeline.render(&base(), Some(&face), 1.0, &opts).unwrap();
        assert_ne!(with_blush, base());

        pipeline.update(&EffectUpdate::enabled(EffectKind::Blush, false));
        let (without, _) = pipeline.render(&base(), Some(&face), 1.0, &opts).unwrap();
        assert_eq!(without, base());
    }

    #[test]
    fn test_debug_overlay_draws_only_when_asked() {
        let mut pipeline = MakeupPipeline::new();
        let face = synthetic::symmetric_face();
        let (plain, _) = pipeline.render(&base(), Some(&face), 1.0, &RenderOptions::default()).unwrap();
        assert_eq!(plain, base());
        let (debug, _) = pipeline
            .render(&base(), Some(&face), 1.0, &RenderOptions { debug_overlay: true })
            .unwrap();
        assert_ne!(debug, base());
    }
}
