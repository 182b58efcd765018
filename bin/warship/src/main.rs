//! warship builds a Tomcat web archive and ships it to a Docker host or a kubernetes pod.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use cli::Cli;
use warship_deploy::{
    BuildTool, CommandLine, DeployConfig, DeployError, DeployOptions, Deployer, KubectlTransport,
    PromptCredentials, SshTransport, SystemRunner,
};

fn main() -> ExitCode {
    if cli::wants_help(std::env::args_os()) {
        println!("No flags provided. Displaying help message.");
        if let Err(err) = Cli::command().print_help() {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity())
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let workdir = std::env::current_dir()
        .map_err(DeployError::CurrentDir)
        .context("Failed to determine the project directory")?;

    let config = DeployConfig::load(&workdir, cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", config.to_toml().context("Failed to render deploy settings")?);
        return Ok(());
    }

    let options = DeployOptions::validate(
        cli.host.as_deref(),
        cli.context,
        cli.build,
        cli.kubernetes,
        cli.debug,
    )
    .context("Invalid flags")?;

    tracing::debug!(?options, workdir = %workdir.display(), "Starting deployment");

    let build_command =
        CommandLine::from_argv(&config.build_command).ok_or(DeployError::EmptyBuildCommand)?;
    let builder = BuildTool::new(build_command, SystemRunner);
    let hosts = SshTransport::new(PromptCredentials::default(), config.docker.file_mode);
    let pods = KubectlTransport::new(config.kubernetes.kubectl.clone(), SystemRunner);

    let deployer = Deployer::new(config, options, workdir, builder, hosts, pods);
    let report = deployer.deploy().context("Deployment failed")?;

    tracing::info!(destination = %report, "Deployment finished");

    Ok(())
}
