//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The directory under the user's home where slicecore keeps its data.
pub const SLICECORE_HOME_DIR: &str = ".slicecore";

/// The environment variable that overrides the slicecore home directory.
pub const SLICECORE_HOME_ENV_VAR: &str = "SLICECORE_HOME";

/// The extension of the backup copy kept next to the store file.
pub const STORE_BACKUP_EXTENSION: &str = "backup";

/// The extension of the temporary file a store snapshot is written to before it replaces the
/// store file.
pub const STORE_TEMP_EXTENSION: &str = "tmp";
