//! Well-known names shared across the crate.

pub const APP_NAME: &str = "rbuild";

/// Build-profile document at the project root.
pub const PROFILE_FILENAME: &str = "eas.json";

/// Project-local ignore override. Replaces the built-in defaults when present.
pub const IGNORE_FILENAME: &str = ".easignore";

/// Configuration document inside the config directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Environment variable overriding the configuration document path.
pub const CONFIG_PATH_ENV: &str = "RBUILD_CONFIG";

/// Profile used when the caller does not name one.
pub const DEFAULT_PROFILE: &str = "production";

/// The only platform builds are dispatched for.
pub const TARGET_PLATFORM: &str = "android";

/// `event_type` of the repository dispatch that starts the remote build.
pub const DISPATCH_EVENT_TYPE: &str = "android-build";

pub const USER_AGENT: &str = concat!("rbuild/", env!("CARGO_PKG_VERSION"));
