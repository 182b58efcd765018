//! Build tool invocation.

use crate::{
    DeployError,
    error::Result,
    process::{CommandLine, CommandRunner},
};

/// Produces the web archive before it is deployed.
pub trait ArtifactBuilder {
    fn build(&self) -> Result<()>;
}

/// Runs the configured build command with the console attached.
#[derive(Debug, Clone)]
pub struct BuildTool<R> {
    command: CommandLine,
    runner: R,
}

impl<R: CommandRunner> BuildTool<R> {
    pub fn new(command: CommandLine, runner: R) -> Self {
        Self { command, runner }
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }
}

impl<R: CommandRunner> ArtifactBuilder for BuildTool<R> {
    fn build(&self) -> Result<()> {
        tracing::info!(command = %self.command, "Building project...");
        self.runner.run(&self.command).map_err(DeployError::Build)?;
        tracing::info!("Maven build completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::process::CommandError;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail: bool,
    }

    impl CommandRunner for Recorder {
        fn run(&self, cmd: &CommandLine) -> Result<(), CommandError> {
            self.calls.borrow_mut().push(cmd.to_string());
            if self.fail {
                return Err(CommandError::Status {
                    command: cmd.to_string(),
                    status: Some(1),
                    stderr: String::new(),
                });
            }
            Ok(())
        }

        fn capture(&self, _cmd: &CommandLine) -> Result<String, CommandError> {
            unreachable!("the build never captures output")
        }
    }

    #[test]
    fn test_build_runs_command() {
        let runner = Recorder::default();
        let tool = BuildTool::new(CommandLine::new("mvn").args(["clean", "package"]), &runner);
        tool.build().unwrap();
        assert_eq!(*runner.calls.borrow(), vec!["mvn clean package"]);
    }

    #[test]
    fn test_build_failure_is_reported() {
        let runner = Recorder {
            fail: true,
            ..Default::default()
        };
        let tool = BuildTool::new(CommandLine::new("mvn").arg("package"), &runner);
        let err = tool.build().unwrap_err();
        assert!(matches!(
            err,
            DeployError::Build(CommandError::Status { status: Some(1), .. })
        ));
    }
}
