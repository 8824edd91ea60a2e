//! Runner that delegates each iteration to an external command

use std::process::{Command, Output};

use anyhow::{bail, Context};
use tracing::debug;

use super::{ExperimentRunner, RunOutcome};
use crate::experiment::Experiment;

/// Runs an operator-supplied program once per iteration.
///
/// Arguments may contain `{host_version}`, `{host_url}`,
/// `{container_version}`, `{container_url}` and `{implementation}`; the same
/// values are exported as `MPI_MATRIX_HOST_VERSION`, `MPI_MATRIX_HOST_URL`,
/// `MPI_MATRIX_CONTAINER_VERSION`, `MPI_MATRIX_CONTAINER_URL` and
/// `MPI_MATRIX_IMPLEMENTATION`.
///
/// Exit code 0 passes, any other exit code fails. Failing to spawn the
/// program, or the program dying from a signal, is an infrastructure error.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    /// Create a runner for `program args...`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn substitutions(experiment: &Experiment) -> [(&'static str, String); 5] {
        [
            ("host_version", experiment.host().version().to_string()),
            ("host_url", experiment.host().location().to_string()),
            ("container_version", experiment.container().version().to_string()),
            ("container_url", experiment.container().location().to_string()),
            (
                "implementation",
                experiment.host().implementation().id().to_string(),
            ),
        ]
    }
}

fn expand(template: &str, values: &[(&'static str, String)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), value)
    })
}

fn last_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
}

fn outcome(output: &Output) -> anyhow::Result<RunOutcome> {
    let stdout = last_line(&output.stdout);
    if output.status.success() {
        return Ok(RunOutcome::pass(stdout.unwrap_or_default()));
    }
    let Some(code) = output.status.code() else {
        bail!("benchmark terminated by a signal ({})", output.status);
    };
    let detail = last_line(&output.stderr).or(stdout).unwrap_or_default();
    Ok(RunOutcome::fail(format!("exit code {code}: {detail}").trim_end().to_string()))
}

impl ExperimentRunner for CommandRunner {
    fn run(&mut self, experiment: &Experiment) -> anyhow::Result<RunOutcome> {
        let values = Self::substitutions(experiment);
        let args: Vec<String> = self.args.iter().map(|arg| expand(arg, &values)).collect();

        let mut command = Command::new(&self.program);
        command.args(&args);
        for (name, value) in &values {
            command.env(format!("MPI_MATRIX_{}", name.to_uppercase()), value);
        }

        debug!(program = %self.program, ?args, "launching benchmark command");
        let output = command
            .output()
            .with_context(|| format!("failed to launch {}", self.program))?;
        outcome(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactDescriptor, Implementation};

    fn experiment() -> Experiment {
        Experiment::new(
            ArtifactDescriptor::new(Implementation::Mpich, "3.2.1", "https://x/mpich-3.2.1.tar.gz"),
            ArtifactDescriptor::new(Implementation::Mpich, "3.3", "https://x/mpich-3.3.tar.gz"),
        )
    }

    #[test]
    fn test_expand_placeholders() {
        let values = CommandRunner::substitutions(&experiment());
        assert_eq!(
            expand("--host={host_version} --ctr={container_version} {implementation}", &values),
            "--host=3.2.1 --ctr=3.3 mpich"
        );
        assert_eq!(expand("{unknown}", &values), "{unknown}");
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line(b"a\nb\n\n  \n"), Some("b".to_string()));
        assert_eq!(last_line(b""), None);
    }

    #[test]
    fn test_missing_program_is_infrastructure_error() {
        let mut runner = CommandRunner::new("/nonexistent/mpi-matrix-benchmark", Vec::new());
        assert!(runner.run(&experiment()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_maps_to_verdict() {
        let mut runner = CommandRunner::new(
            "sh",
            vec![
                "-c".to_string(),
                "echo running {host_version}; [ \"$MPI_MATRIX_CONTAINER_VERSION\" = 3.3 ]"
                    .to_string(),
            ],
        );
        let outcome = runner.run(&experiment()).unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.note, "running 3.2.1");

        let mut failing = CommandRunner::new(
            "sh",
            vec!["-c".to_string(), "echo bad >&2; exit 3".to_string()],
        );
        let outcome = failing.run(&experiment()).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.note, "exit code 3: bad");
    }
}
