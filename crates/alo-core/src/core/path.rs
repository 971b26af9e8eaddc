use crate::core::error::{AloError, AloResult};
use std::path::{Path, PathBuf};

/// Get the ALo home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\alo
/// - Linux: ~/.config/alo
/// - macOS: ~/Library/Application Support/alo
pub fn alo_home() -> AloResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| AloError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("alo"))
}

/// Get the config file path (`<alo home>/config.yaml`)
pub fn config_file() -> AloResult<PathBuf> {
    Ok(alo_home()?.join("config.yaml"))
}

/// Create a directory (and its parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> AloResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
