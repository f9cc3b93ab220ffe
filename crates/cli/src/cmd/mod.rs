mod build;
mod config;
mod init;
mod package;
mod resolve;
mod status;

pub use build::cmd_build;
pub use config::cmd_config;
pub use init::cmd_init;
pub use package::cmd_package;
pub use resolve::cmd_resolve;
pub use status::cmd_status;
