mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{CleanRequest, GlobalArgs, cmd_build, cmd_clean, cmd_config, cmd_info, cmd_install, cmd_run};
use cmkit_lib::consts::DEFAULT_PROFILE;
use output::{ReportFormat, Status, status};

/// cmk - configure, build, install and run CMake projects
#[derive(Parser)]
#[command(name = "cmk")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project source directory (default: current directory)
  #[arg(short = 'C', long, global = true, value_name = "DIR")]
  project_dir: Option<PathBuf>,

  /// Config file (default: <project-dir>/cmk.toml)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Output format for reports
  #[arg(short, long, global = true, value_enum, default_value_t = ReportFormat::Text)]
  output: ReportFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show project paths and per-profile build state
  Info {
    /// Profile to show (default: all profiles)
    profile: Option<String>,
  },

  /// Configure a profile and link compile_commands.json
  Config {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Build a configured profile
  Build {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Configure first if the build directory does not exist
    #[arg(long)]
    auto_config: bool,
  },

  /// Install a built profile
  Install {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Configure, build and install, then run the profile's target
  Run {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Remove build directories and the compile_commands.json link
  Clean {
    /// Only clean this profile's build directory
    profile: Option<String>,
  },

  /// Remove the whole workspace, install directories included
  CleanAll,

  /// Configure the web profile
  ConfigWeb,

  /// Build the web profile
  BuildWeb {
    /// Configure first if the build directory does not exist
    #[arg(long)]
    auto_config: bool,
  },

  /// Configure and build the web profile, then serve it locally
  RunWeb,

  /// Remove the web profile's build directory
  CleanWeb,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let global = GlobalArgs {
    project_dir: cli.project_dir,
    config: cli.config,
    format: cli.output,
  };

  match dispatch(cli.command, &global) {
    Ok(code) => code,
    Err(err) => {
      status(Status::Failed, format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn dispatch(command: Commands, global: &GlobalArgs) -> Result<ExitCode> {
  match command {
    Commands::Info { profile } => cmd_info(global, profile.as_deref()),
    Commands::Config { profile } => cmd_config(&global.load_context()?, &profile),
    Commands::Build { profile, auto_config } => cmd_build(&global.load_context()?, &profile, auto_config),
    Commands::Install { profile } => cmd_install(&global.load_context()?, &profile),
    Commands::Run { profile } => cmd_run(&global.load_context()?, &profile),
    Commands::Clean { profile } => {
      let request = match profile {
        Some(name) => CleanRequest::Profile(name),
        None => CleanRequest::Builds,
      };
      cmd_clean(&global.load_context()?, request, global.format)
    }
    Commands::CleanAll => cmd_clean(&global.load_context()?, CleanRequest::All, global.format),
    Commands::ConfigWeb => {
      let ctx = global.load_context()?;
      let web = ctx.web_profile()?.name().to_string();
      cmd_config(&ctx, &web)
    }
    Commands::BuildWeb { auto_config } => {
      let ctx = global.load_context()?;
      let web = ctx.web_profile()?.name().to_string();
      cmd_build(&ctx, &web, auto_config)
    }
    Commands::RunWeb => {
      let ctx = global.load_context()?;
      let web = ctx.web_profile()?.name().to_string();
      cmd_run(&ctx, &web)
    }
    Commands::CleanWeb => {
      let ctx = global.load_context()?;
      let web = ctx.web_profile()?.name().to_string();
      cmd_clean(&ctx, CleanRequest::Profile(web), global.format)
    }
  }
}
