use std::{env, path::PathBuf};

use crate::config::{DEFAULT_SLICECORE_HOME, DEFAULT_STORE_FILENAME};

use super::SLICECORE_HOME_ENV_VAR;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the slicecore home directory.
///
/// Uses the `SLICECORE_HOME` environment variable when it is set and non-empty, and falls back
/// to `~/.slicecore` otherwise.
pub fn get_slicecore_home_path() -> PathBuf {
    match env::var(SLICECORE_HOME_ENV_VAR) {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home),
        _ => {
            tracing::debug!(
                "{} is not set, using default: {}",
                SLICECORE_HOME_ENV_VAR,
                DEFAULT_SLICECORE_HOME.display()
            );
            DEFAULT_SLICECORE_HOME.clone()
        }
    }
}

/// Returns the path of the default slice store file inside the slicecore home directory.
pub fn get_default_store_path() -> PathBuf {
    get_slicecore_home_path().join(DEFAULT_STORE_FILENAME)
}
