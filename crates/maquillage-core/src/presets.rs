//! Preset catalog.
//!
//! A preset names partial updates for any subset of effects. Built-in presets
//! are embedded at compile time from `contrib/presets/*.toml`; user presets
//! are loaded from a directory of the same format.

use crate::effects::{
    BlushUpdate, ContourUpdate, EffectKind, EffectUpdate, EyelinerUpdate, EyeshadowUpdate,
    HighlightUpdate, LipstickUpdate, SkinSmoothingUpdate,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

const PRESET_NONE: &str = include_str!("../../../contrib/presets/none.toml");
const PRESET_NATURAL: &str = include_str!("../../../contrib/presets/natural.toml");
const PRESET_GLAM: &str = include_str!("../../../contrib/presets/glam.toml");
const PRESET_EVENING: &str = include_str!("../../../contrib/presets/evening.toml");

static BUILTIN: OnceLock<Vec<Preset>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("preset not found: {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad preset TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One preset file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skin_smoothing: Option<SkinSmoothingUpdate>,
    #[serde(default)]
    pub contour: Option<ContourUpdate>,
    #[serde(default)]
    pub highlight: Option<HighlightUpdate>,
    #[serde(default)]
    pub blush: Option<BlushUpdate>,
    #[serde(default)]
    pub eyeshadow: Option<EyeshadowUpdate>,
    #[serde(default)]
    pub eyeliner: Option<EyelinerUpdate>,
    #[serde(default)]
    pub lipstick: Option<LipstickUpdate>,
    /// Keys that name no effect; kept so they can be reported.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

impl Preset {
    /// Parse a preset, warning about (and ignoring) unknown effect names.
    pub fn from_toml_str(src: &str) -> Result<Self, PresetError> {
        let preset: Preset = toml::from_str(src)?;
        for key in preset.unknown.keys() {
            tracing::warn!(preset = %preset.name, key = %key, "unknown effect in preset ignored");
        }
        Ok(preset)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let src = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// The preset's updates, in draw order.
    pub fn updates(&self) -> Vec<EffectUpdate> {
        let mut out = Vec::new();
        if let Some(u) = &self.skin_smoothing {
            out.push(EffectUpdate::SkinSmoothing(u.clone()));
        }
        if let Some(u) = &self.contour {
            out.push(EffectUpdate::Contour(u.clone()));
        }
        if let Some(u) = &self.highlight {
            out.push(EffectUpdate::Highlight(u.clone()));
        }
        if let Some(u) = &self.blush {
            out.push(EffectUpdate::Blush(u.clone()));
        }
        if let Some(u) = &self.eyeshadow {
            out.push(EffectUpdate::Eyeshadow(u.clone()));
        }
        if let Some(u) = &self.eyeliner {
            out.push(EffectUpdate::Eyeliner(u.clone()));
        }
        if let Some(u) = &self.lipstick {
            out.push(EffectUpdate::Lipstick(u.clone()));
        }
        out
    }

    /// Effects this preset touches.
    pub fn effects(&self) -> Vec<EffectKind> {
        self.updates().iter().map(EffectUpdate::kind).collect()
    }
}

fn builtin_db() -> &'static Vec<Preset> {
    BUILTIN.get_or_init(|| {
        let mut db = Vec::new();
        for src in [PRESET_NONE, PRESET_NATURAL, PRESET_GLAM, PRESET_EVENING] {
            match Preset::from_toml_str(src) {
                Ok(p) => db.push(p),
                Err(e) => tracing::error!(error = %e, "bad built-in preset"),
            }
        }
        db
    })
}

/// All compiled-in presets.
pub fn builtin_presets() -> &'static [Preset] {
    builtin_db()
}

/// Look up a compiled-in preset by name (case-insensitive).
pub fn builtin_preset(name: &str) -> Option<&'static Preset> {
    builtin_db().iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Load every `*.toml` preset in `dir`, sorted by file name.
///
/// Files that fail to parse are logged and skipped.
pub fn load_dir(dir: &Path) -> Result<Vec<Preset>, PresetError> {
    let io_err = |source| PresetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut presets = Vec::with_capacity(paths.len());
    for path in paths {
        match Preset::load(&path) {
            Ok(p) => presets.push(p),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping preset"),
        }
    }
    Ok(presets)
}

/// Resolve a preset by name: presets in `user_dir` shadow the built-ins.
pub fn find_preset(name: &str, user_dir: Option<&Path>) -> Result<Preset, PresetError> {
    if let Some(dir) = user_dir.filter(|d| d.is_dir()) {
        if let Some(p) = load_dir(dir)?
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Ok(p);
        }
    }
    builtin_preset(name)
        .cloned()
        .ok_or_else(|| PresetError::NotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_parse() {
        let names: Vec<&str> = builtin_presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["none", "natural", "glam", "evening"]);
        for preset in builtin_presets() {
            assert!(preset.unknown.is_empty(), "{} has unknown keys", preset.name);
        }
    }

    #[test]
    fn test_none_disables_every_effect() {
        let none = builtin_preset("None").unwrap();
        let updates = none.updates();
        assert_eq!(none.effects(), EffectKind::DRAW_ORDER.to_vec());
        assert_eq!(updates.len(), 7);
        for (update, kind) in updates.iter().zip(EffectKind::DRAW_ORDER) {
            assert_eq!(*update, EffectUpdate::enabled(kind, false));
        }
    }

    #[test]
    fn test_partial_preset_and_unknown_keys() {
        let preset = Preset::from_toml_str(
            r##"
            name = "berry"

            [lipstick]
            enabled = true
            color = "#8E244D"
            feather_radius = 3

            [mascara]
            enabled = true
            "##,
        )
        .unwrap();
        assert_eq!(preset.effects(), vec![EffectKind::Lipstick]);
        assert!(preset.unknown.contains_key("mascara"));
        let lipstick = preset.lipstick.unwrap();
        assert_eq!(lipstick.feather_radius, Some(3.0));
        assert_eq!(lipstick.opacity, None);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        assert!(matches!(Preset::from_toml_str("name = "), Err(PresetError::Parse(_))));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_preset("gothic").is_none());
        assert!(matches!(find_preset("gothic", None), Err(PresetError::NotFound(_))));
    }
}
