use anyhow::{Context, Result};
use maquillage_core::MakeupSettings;
use std::path::{Path, PathBuf};

/// CLI configuration, loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory searched for user presets before the built-ins.
    pub preset_dir: PathBuf,
    /// Inputs whose longer side exceeds this are downscaled before rendering.
    pub max_dimension: u32,
    /// Draw the landmark overlay on every render.
    pub debug_overlay: bool,
}

impl Config {
    /// Load configuration from `MAQUILLAGE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let config_dir = var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".config")
            })
            .join("maquillage");

        Self {
            preset_dir: var("MAQUILLAGE_PRESET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| config_dir.join("presets")),
            max_dimension: parse_or(var("MAQUILLAGE_MAX_DIMENSION"), 2048).max(1),
            debug_overlay: var("MAQUILLAGE_DEBUG_OVERLAY")
                .map(|v| v != "0")
                .unwrap_or(false),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Load full settings from a `.json` or `.toml` file, clamped into range.
pub fn load_settings(path: &Path) -> Result<MakeupSettings> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let settings: MakeupSettings = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&src).with_context(|| format!("parsing {}", path.display()))?
    } else {
        toml::from_str(&src).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(settings.validated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maquillage_core::{BlendMode, Color};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("HOME", "/home/ada")]));
        assert_eq!(config.preset_dir, PathBuf::from("/home/ada/.config/maquillage/presets"));
        assert_eq!(config.max_dimension, 2048);
        assert!(!config.debug_overlay);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MAQUILLAGE_PRESET_DIR", "/srv/presets"),
            ("MAQUILLAGE_MAX_DIMENSION", "1024"),
            ("MAQUILLAGE_DEBUG_OVERLAY", "1"),
        ]));
        assert_eq!(config.preset_dir, PathBuf::from("/srv/presets"));
        assert_eq!(config.max_dimension, 1024);
        assert!(config.debug_overlay);
    }

    #[test]
    fn test_bad_number_falls_back() {
        let config = Config::from_lookup(lookup(&[("MAQUILLAGE_MAX_DIMENSION", "huge")]));
        assert_eq!(config.max_dimension, 2048);
    }

    #[test]
    fn test_load_toml_settings_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.toml");
        std::fs::write(
            &path,
            "[lipstick]\nenabled = true\ncolor = \"#CC3366\"\nopacity = 3.0\nblend_mode = \"soft-light\"\n",
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        assert!(settings.lipstick.enabled);
        assert_eq!(settings.lipstick.color, Color::rgb(0xCC, 0x33, 0x66));
        assert_eq!(settings.lipstick.opacity, 1.0);
        assert_eq!(settings.lipstick.blend_mode, BlendMode::SoftLight);
        assert!(!settings.blush.enabled);
    }

    #[test]
    fn test_load_json_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.json");
        std::fs::write(&path, r#"{"eyeliner": {"enabled": true, "style": "winged"}}"#).unwrap();
        let settings = load_settings(&path).unwrap();
        assert!(settings.eyeliner.enabled);
        assert_eq!(settings.eyeliner.thickness, 2.0);
    }

    #[test]
    fn test_bad_color_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[blush]\ncolor = \"red\"\n").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
