//! Last-used quiz configuration, stored as TOML.

use std::path::Path;

use anyhow::{Context, Result};

use mathdrill_core::config::QuizConfig;

/// Read settings from `path`.
///
/// Returns `Ok(None)` when the file does not exist. Unreadable or unparseable
/// files are errors.
pub fn read_settings(path: &Path) -> Result<Option<QuizConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    let config = toml::from_str::<QuizConfig>(&content)
        .with_context(|| format!("failed to parse settings: {}", path.display()))?;
    Ok(Some(config))
}

/// Load settings, falling back to [`QuizConfig::default`].
///
/// A missing file silently yields the defaults. A corrupt file, or one that
/// holds an invalid configuration, logs a warning first.
pub fn load_settings(path: &Path) -> QuizConfig {
    match read_settings(path) {
        Ok(Some(config)) => match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), "saved settings are invalid, using defaults: {e}");
                QuizConfig::default()
            }
        },
        Ok(None) => QuizConfig::default(),
        Err(e) => {
            tracing::warn!("{e:#}; using default settings");
            QuizConfig::default()
        }
    }
}

/// Save `config` to `path`, creating parent directories as needed.
///
/// Invalid configurations are refused so that the file always loads back.
pub fn save_settings(path: &Path, config: &QuizConfig) -> Result<()> {
    config
        .validate()
        .context("refusing to save an invalid configuration")?;
    let content = toml::to_string_pretty(config).context("failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write settings to {}", path.display()))?;
    tracing::debug!(path = %path.display(), "settings saved");
    Ok(())
}
