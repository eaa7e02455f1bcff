//! Settings loading.
//!
//! Loading flow (later layers win):
//! 1. Compiled [`StockroomSettings::default()`]
//! 2. The JSON settings file, if it exists (`~/.stockroom/settings.json`
//!    unless a path is given)
//! 3. `STOCKROOM_*` environment variables, `__` separating nested keys:
//!    `STOCKROOM_SERVER__PORT=9000` sets `server.port`

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::Result;
use crate::types::StockroomSettings;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "STOCKROOM_";

/// `~/.stockroom`, falling back to `/tmp/.stockroom` without a `HOME`.
pub fn stockroom_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".stockroom")
}

/// Default settings file path.
pub fn settings_path() -> PathBuf {
    stockroom_home().join("settings.json")
}

/// Provider chain for `path`. Public so callers can layer extra providers.
pub fn figment(path: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(StockroomSettings::default()));
    if path.exists() {
        debug!(?path, "loading settings from file");
        figment = figment.merge(Json::file(path));
    } else {
        debug!(?path, "settings file not found, using defaults");
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load and validate settings from the default path.
pub fn load_settings() -> Result<StockroomSettings> {
    load_settings_from_path(&settings_path())
}

/// Load and validate settings from `path`. A missing file is not an error.
pub fn load_settings_from_path(path: &Path) -> Result<StockroomSettings> {
    let settings: StockroomSettings = figment(path).extract()?;
    settings.validate()?;
    Ok(settings)
}

/// Expand a leading `~/` against `HOME`.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
