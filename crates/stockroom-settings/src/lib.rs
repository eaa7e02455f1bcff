//! # stockroom-settings
//!
//! Layered configuration for the Stockroom server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`StockroomSettings::default()`]
//! 2. **Settings file**: `~/.stockroom/settings.json`, or the path given on
//!    the command line
//! 3. **Environment variables**: `STOCKROOM_*` overrides (highest priority)
//!
//! Loaded settings are validated before they are returned, so the server never
//! starts with a zero-sized pool or an unknown log level.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{expand_home, figment, load_settings, load_settings_from_path, settings_path};
pub use types::*;
