use std::{
    fs, io,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use slash_menu::{ConfigError, DEFAULT_MENU_CONFIG, MenuConfig};
use thiserror::Error;
use tracing::{info, warn};

use crate::{app_actions::AppIO, app_state::INITIAL_NOTE};

pub const SETTINGS_FILE: &str = "settings.ron";
pub const MENU_CONFIG_FILE: &str = "menu.kdl";

/// `settings.ron`, every field is optional:
///
/// ```ron
/// (
///     font: Some("/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc"),
///     note: Some("/home/me/notes/today.md"),
///     window_size: Some((480.0, 560.0)),
/// )
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// Extra font, needed to render text outside of latin/cyrillic/greek.
    pub font: Option<PathBuf>,
    /// File with the text the editor starts with.
    pub note: Option<PathBuf>,
    pub window_size: Option<(f32, f32)>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(slashnote::settings::io))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    #[diagnostic(
        code(slashnote::settings::parse),
        help("settings are a RON struct with optional `font`, `note` and `window_size` fields")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

impl AppSettings {
    pub fn parse(src: &str, path: &Path) -> Result<Self, SettingsError> {
        ron::from_str(src).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub struct RealAppIO {
    config_dir: Option<PathBuf>,
}

impl RealAppIO {
    pub fn new() -> Self {
        let config_dir = directories_next::ProjectDirs::from("app", "", "Slashnote")
            .map(|dirs| dirs.config_dir().to_path_buf());

        if config_dir.is_none() {
            warn!("no home directory found, using built-in settings");
        }

        Self { config_dir }
    }

    #[cfg(test)]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            config_dir: Some(config_dir),
        }
    }

    /// Defaults when there is no settings file.
    pub fn load_settings(&self) -> Result<AppSettings, SettingsError> {
        let Some(path) = self.config_file(SETTINGS_FILE) else {
            return Ok(AppSettings::default());
        };

        match fs::read_to_string(&path) {
            Ok(src) => AppSettings::parse(&src, &path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppSettings::default()),
            Err(source) => Err(SettingsError::Read { path, source }),
        }
    }

    pub fn read_note(&self, settings: &AppSettings) -> String {
        let Some(path) = &settings.note else {
            return INITIAL_NOTE.to_string();
        };

        fs::read_to_string(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "failed to read note: {err}");
            INITIAL_NOTE.to_string()
        })
    }

    pub fn read_font(&self, settings: &AppSettings) -> Option<Vec<u8>> {
        let path = settings.font.as_ref()?;

        fs::read(path)
            .inspect_err(|err| warn!(path = %path.display(), "failed to load font: {err}"))
            .ok()
    }

    fn config_file(&self, name: &str) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join(name))
    }

    fn write_default_menu_config(&self, path: &Path) {
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(path, DEFAULT_MENU_CONFIG));

        match written {
            Ok(()) => info!(path = %path.display(), "wrote default slash menu config"),
            Err(err) => warn!(path = %path.display(), "failed to write default slash menu config: {err}"),
        }
    }
}

impl AppIO for RealAppIO {
    fn load_menu_config(&self) -> Result<MenuConfig, ConfigError> {
        let Some(path) = self.config_file(MENU_CONFIG_FILE) else {
            return Ok(MenuConfig::default());
        };

        match MenuConfig::load(&path)? {
            Some(config) => {
                info!(path = %path.display(), items = config.items.len(), "loaded slash menu config");
                Ok(config)
            }
            None => {
                self.write_default_menu_config(&path);
                Ok(MenuConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    pub fn test_settings_fields_are_optional() {
        let path = Path::new(SETTINGS_FILE);

        assert_eq!(AppSettings::parse("()", path).unwrap(), AppSettings::default());
        assert_eq!(
            AppSettings::parse(r#"(font: Some("/fonts/cjk.ttf"), window_size: Some((400.0, 300.0)))"#, path)
                .unwrap(),
            AppSettings {
                font: Some(PathBuf::from("/fonts/cjk.ttf")),
                note: None,
                window_size: Some((400.0, 300.0)),
            }
        );
        assert!(matches!(
            AppSettings::parse("(fonts: 1)", path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    pub fn test_missing_files_fall_back_to_defaults() {
        let tmp = tempdir().unwrap();
        // not created yet, like on the first start
        let dir = tmp.path().join("Slashnote");
        let io = RealAppIO::with_config_dir(dir.clone());

        assert_eq!(io.load_settings().unwrap(), AppSettings::default());
        assert_eq!(io.read_note(&AppSettings::default()), INITIAL_NOTE);
        assert_eq!(io.read_font(&AppSettings::default()), None);

        assert_eq!(io.load_menu_config().unwrap(), MenuConfig::default());
        // the default config is written out so it can be edited
        assert_eq!(
            fs::read_to_string(dir.join(MENU_CONFIG_FILE)).unwrap(),
            DEFAULT_MENU_CONFIG
        );
    }

    #[test]
    pub fn test_menu_config_is_read_from_config_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MENU_CONFIG_FILE),
            r#"
            item "sig" label="Signature"
            text "sig" "-- me"
            "#,
        )
        .unwrap();

        let config = RealAppIO::with_config_dir(dir.path().to_path_buf())
            .load_menu_config()
            .unwrap();
        assert_eq!(config.items.len(), 1);
        assert_eq!(config.replacements.lookup("sig").unwrap(), "-- me");
    }
}
