pub const APP_NAME: &str = "cmkit";

/// Project-level configuration file looked up in the source directory.
pub const CONFIG_FILENAME: &str = "cmk.toml";

/// Compiler-invocation database written by CMake with `CMAKE_EXPORT_COMPILE_COMMANDS`.
pub const COMPILE_DB_FILENAME: &str = "compile_commands.json";

pub const DEFAULT_CACHE_DIR: &str = ".cache";
pub const DEFAULT_PROFILE: &str = "default";
pub const WEB_PROFILE: &str = "emscripten";
pub const DEFAULT_SERVE_PORT: u16 = 8000;

pub const CONFIG_ENV: &str = "CMK_CONFIG";
pub const CACHE_DIR_ENV: &str = "CMK_CACHE_DIR";
