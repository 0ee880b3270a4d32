use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toml::map::Entry;
use tracing::warn;

use crate::components::context_menu::ContextMenuStyle;
use crate::error::{MenuError, Result};

pub const LOCAL_CONFIG_FILE: &str = "menukit.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Delay before a hovered sub-menu opens or a left one closes
    pub sub_menu_timeout_ms: u64,
    /// How far a sub-menu overlaps the row that opened it
    pub submenu_overlap: f32,
    pub style: ContextMenuStyle,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            sub_menu_timeout_ms: 300,
            submenu_overlap: 4.0,
            style: ContextMenuStyle::default(),
        }
    }
}

impl MenuConfig {
    pub fn sub_menu_timeout(&self) -> Duration {
        Duration::from_millis(self.sub_menu_timeout_ms)
    }

    /// Load the layered configuration
    ///
    /// Defaults, then the user file, then `./menukit.toml`. Unreadable or
    /// unparsable layers are skipped with a warning.
    pub fn load() -> Self {
        let mut merged = default_value();

        let layers = [get_user_config_path(), Some(PathBuf::from(LOCAL_CONFIG_FILE))];
        for path in layers.into_iter().flatten() {
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            match content.parse::<toml::Value>() {
                Ok(value) => {
                    merge_value(&mut merged, value);
                    tracing::info!("Loaded menu config from {}", path.display());
                }
                Err(err) => warn!("Failed to parse {}: {err}", path.display()),
            }
        }

        let config = merged
            .try_into()
            .map_err(MenuError::from)
            .and_then(|config: MenuConfig| config.validated());
        config.unwrap_or_else(|err| {
            warn!("Falling back to default menu config: {err}");
            Self::default()
        })
    }

    /// Parse a document and apply it over the defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let overrides: toml::Value = source.parse()?;
        let mut merged = default_value();
        merge_value(&mut merged, overrides);
        let config: MenuConfig = merged.try_into()?;
        config.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MenuError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validated(self) -> Result<Self> {
        let style = &self.style;
        if style.min_width <= 0.0 {
            return Err(MenuError::InvalidConfig(format!(
                "style.min_width must be positive, got {}",
                style.min_width
            )));
        }
        if style.item_height <= 0.0 || style.label_height < 0.0 || style.separator_height < 0.0 {
            return Err(MenuError::InvalidConfig(
                "row heights must not be negative and items need a height".to_string(),
            ));
        }
        if self.submenu_overlap < 0.0 {
            return Err(MenuError::InvalidConfig(format!(
                "submenu_overlap must not be negative, got {}",
                self.submenu_overlap
            )));
        }
        Ok(self)
    }
}

fn default_value() -> toml::Value {
    toml::Value::try_from(MenuConfig::default()).expect("default config is always valid toml")
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn get_user_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;

    let path = config_dir.join("menukit").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = MenuConfig::default();
        assert_eq!(config.sub_menu_timeout(), Duration::from_millis(300));
        assert_eq!(config.submenu_overlap, 4.0);
        assert_eq!(config.style.item_height, 22.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = MenuConfig::from_toml_str(
            r#"
            sub_menu_timeout_ms = 120

            [style]
            min_width = 260.0
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.sub_menu_timeout_ms, 120);
        assert_eq!(config.style.min_width, 260.0);
        assert_eq!(config.style.separator_height, 9.0);
        assert_eq!(config.submenu_overlap, 4.0);
    }

    #[test]
    fn test_config_merge_priority() {
        let mut base = default_value();
        let first: toml::Value = "submenu_overlap = 2.0\n[style]\nitem_height = 30.0"
            .parse()
            .unwrap();
        let second: toml::Value = "[style]\nitem_height = 26.0".parse().unwrap();
        merge_value(&mut base, first);
        merge_value(&mut base, second);

        let config: MenuConfig = base.try_into().unwrap();
        assert_eq!(config.submenu_overlap, 2.0);
        assert_eq!(config.style.item_height, 26.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = MenuConfig::from_toml_str("[style]\nmin_width = 0.0").unwrap_err();
        assert!(matches!(err, MenuError::InvalidConfig(_)));

        let err = MenuConfig::from_toml_str("sub_menu_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, MenuError::Parse(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = MenuConfig::from_file("/nonexistent/menukit.toml").unwrap_err();
        assert!(matches!(err, MenuError::Io { .. }));
    }

    #[test]
    #[serial]
    fn test_user_config_path_with_xdg_config_home() {
        let temp_dir = tempfile::tempdir().unwrap();
        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        assert!(get_user_config_path().is_none());

        let config_dir = temp_dir.path().join("menukit");
        fs::create_dir_all(&config_dir).unwrap();
        let config_file = config_dir.join("config.toml");
        fs::write(&config_file, "sub_menu_timeout_ms = 50").unwrap();

        assert_eq!(get_user_config_path(), Some(config_file));
        assert_eq!(MenuConfig::load().sub_menu_timeout_ms, 50);

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_load_falls_back_on_invalid_user_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let old_xdg = env::var("XDG_CONFIG_HOME").ok();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let config_dir = temp_dir.path().join("menukit");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "[style]\nmin_width = -1.0").unwrap();

        assert_eq!(MenuConfig::load().style.min_width, 200.0);

        if let Some(old) = old_xdg {
            env::set_var("XDG_CONFIG_HOME", old);
        } else {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }
}
