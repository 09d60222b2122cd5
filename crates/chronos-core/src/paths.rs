//! Filesystem locations used by Chronos

use std::path::PathBuf;

use crate::constants;

/// Root config directory (`~/.chronos`), falling back to the working directory
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::layout::CONFIG_DIR_NAME)
}

/// Directory for log files
pub fn logs_dir() -> PathBuf {
    config_dir().join(constants::layout::LOGS_DIR_NAME)
}
