use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "warship")]
#[command(
    author,
    version,
    about = "Build a Tomcat web archive and deploy it to a Docker host or a kubernetes pod",
    disable_help_flag = true
)]
pub struct Cli {
    /// Deploy service to a docker tomcat volume on selected host (e.g. rc, dev, auto, alpha).
    #[arg(short = 'h', long, env = "WARSHIP_HOST", value_name = "HOST")]
    pub host: Option<String>,

    /// Relative path to a context.xml file. Requires --host.
    #[arg(short = 'c', long, env = "WARSHIP_CONTEXT", value_name = "CONTEXT")]
    pub context: Option<PathBuf>,

    /// Build maven project before deployment.
    #[arg(
        short = 'b',
        long,
        env = "WARSHIP_BUILD",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub build: bool,

    /// Deploy service to a k8s pod. Pod will be selected automatically.
    #[arg(short = 'k', long, env = "WARSHIP_KUBERNETES")]
    pub kubernetes: bool,

    /// Debug mode. Will display paths, file names, etc.
    #[arg(short = 'd', long, env = "WARSHIP_DEBUG")]
    pub debug: bool,

    /// Path to a Warship.toml with deploy settings.
    #[arg(long, env = "WARSHIP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective deploy settings as TOML and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// True when the command line carries nothing but the program name.
pub fn wants_help<I: ExactSizeIterator>(args: I) -> bool {
    args.len() <= 1
}

impl Cli {
    pub fn verbosity(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }
}
