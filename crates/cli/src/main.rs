//! rbuild: package a mobile project and dispatch a remote Android build.

mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rbuild_lib::consts::DEFAULT_PROFILE;

use crate::output::{OutputFormat, print_error};

/// Remote Android builds for JavaScript mobile projects
#[derive(Parser)]
#[command(name = "rbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Package the project, upload it, and trigger a remote build
  Build {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Build profile from eas.json
    #[arg(short, long, default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Extra exclusion pattern (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Package the project locally without uploading
  Package {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Extra exclusion pattern (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Copy the archive to this file
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// List archived entries
    #[arg(long)]
    list: bool,
  },

  /// Show the build spec and Gradle command a profile resolves to
  Resolve {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Build profile from eas.json
    #[arg(short, long, default_value = DEFAULT_PROFILE)]
    profile: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Show the loaded configuration with secrets masked
  Config {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Write the configuration document
  Init {
    /// Storage API endpoint
    #[arg(long, env = "RBUILD_ENDPOINT")]
    endpoint: String,

    #[arg(long, env = "RBUILD_PROJECT_ID")]
    project_id: String,

    #[arg(long, env = "RBUILD_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "RBUILD_BUCKET_ID")]
    bucket_id: String,

    /// Token allowed to send repository dispatches
    #[arg(long, env = "RBUILD_CI_TOKEN", hide_env_values = true)]
    ci_token: String,

    /// CI repository as owner/name
    #[arg(long, env = "RBUILD_REPO")]
    repo: String,

    /// Replace an existing configuration
    #[arg(short, long)]
    force: bool,
  },

  /// Show where to follow a dispatched build
  Status {
    build_id: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Build {
      path,
      profile,
      ignore,
      output,
    } => cmd::cmd_build(&path, &profile, &ignore, output),
    Commands::Package { path, ignore, out, list } => cmd::cmd_package(&path, &ignore, out.as_deref(), list),
    Commands::Resolve { path, profile, output } => cmd::cmd_resolve(&path, &profile, output),
    Commands::Config { output } => cmd::cmd_config(output),
    Commands::Init {
      endpoint,
      project_id,
      api_key,
      bucket_id,
      ci_token,
      repo,
      force,
    } => cmd::cmd_init(
      rbuild_lib::config::Config {
        endpoint,
        project_id,
        api_key,
        bucket_id,
        ci_token,
        repo,
      },
      force,
    ),
    Commands::Status { build_id, output } => cmd::cmd_status(&build_id, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
