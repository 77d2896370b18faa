use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `FOLIO__`) over an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FOLIO")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Load and validate, falling back to defaults. The second value says
    /// why the defaults were used, for the caller to surface once the UI and
    /// logger are up.
    pub fn load_or_default() -> (Self, Option<String>) {
        match Self::load() {
            Ok(settings) => match settings.validate() {
                Ok(()) => (settings, None),
                Err(msg) => (
                    Self::default(),
                    Some(format!("invalid config, using defaults: {msg}")),
                ),
            },
            Err(err) => (
                Self::default(),
                Some(format!("cannot read config, using defaults: {err}")),
            ),
        }
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let has_extension = self
            .library
            .extensions
            .iter()
            .any(|e| !e.trim().trim_start_matches('.').is_empty());
        if !has_extension {
            return Err("library.extensions must name at least one extension".to_string());
        }
        Ok(())
    }

    /// Resolve where the preference store lives: config value, then
    /// `FOLIO_STATE_PATH`, then the XDG state directory.
    pub fn state_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.state.path {
            return Some(p.clone());
        }
        if let Some(p) = env::var_os("FOLIO_STATE_PATH") {
            return Some(PathBuf::from(p));
        }
        default_state_path()
    }
}

/// Resolve the config path from `FOLIO_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FOLIO_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/folio/config.toml`
/// or `~/.config/folio/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("folio").join("config.toml"))
}

/// `$XDG_STATE_HOME/folio/state.toml`, or `~/.local/state/folio/state.toml`.
pub fn default_state_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("folio").join("state.toml"))
}
