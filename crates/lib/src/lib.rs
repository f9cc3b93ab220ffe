//! rbuild-lib: remote Android builds for JavaScript mobile projects
//!
//! A build request flows through:
//! - `profile`: resolve a named build profile from `eas.json` into a `BuildSpec`
//! - `command`: derive the Gradle task to run from that spec
//! - `ignore` / `package`: archive the project tree, minus excluded paths
//! - `storage`: upload the archive to blob storage
//! - `ci`: trigger the CI workflow that runs the build
//! - `dispatch`: the pipeline tying these together

pub mod ci;
pub mod command;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod ignore;
pub mod package;
pub mod platform;
pub mod profile;
pub mod storage;
pub mod util;
