//! External command execution.
//!
//! Everything this tool does goes through [`CommandRunner`]: the production
//! implementation shells out to the real CLI tools, tests substitute a
//! scripted fake. Failures never propagate as errors - callers get a
//! [`CommandOutcome::Failed`] and decide how much of the run to abandon.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::logger::Logger;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of asking the runner to execute an external command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The command ran and exited zero. Holds the decoded stdout when JSON
    /// capture was requested, otherwise an empty object.
    Output(Value),
    /// Dry-run suppressed the command; nothing was executed.
    Skipped,
    /// Spawn failure, non-zero exit, undecodable output, or timeout.
    /// Details have already been logged by the runner.
    Failed,
}

impl CommandOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CommandOutcome::Failed)
    }
}

/// Seam between the orchestration and the external CLI tools.
pub trait CommandRunner {
    /// Run `program` with `args`. With `capture_json`, stdout is decoded as
    /// JSON (empty stdout decodes to an empty object). Commands not flagged
    /// `allow_in_dry_run` are logged and skipped while dry-run is active.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        capture_json: bool,
        allow_in_dry_run: bool,
    ) -> CommandOutcome;
}

/// Production runner: synchronous subprocess execution with a bounded wait.
pub struct ExecRunner {
    logger: Logger,
    dry_run: bool,
    timeout: Duration,
}

impl ExecRunner {
    pub fn new(logger: Logger, dry_run: bool) -> Self {
        Self {
            logger,
            dry_run,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait for the child within the timeout, killing it on expiry.
    fn wait_bounded(&self, child: &mut Child, rendered: &str) -> Option<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        self.logger.error(&format!(
                            "Command timed out after {}s: {}",
                            self.timeout.as_secs(),
                            rendered
                        ));
                        return None;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    self.logger
                        .error(&format!("Failed waiting on command: {}: {}", rendered, err));
                    return None;
                }
            }
        }
    }
}

impl CommandRunner for ExecRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        capture_json: bool,
        allow_in_dry_run: bool,
    ) -> CommandOutcome {
        let rendered = render(program, args);

        if self.dry_run && !allow_in_dry_run {
            self.logger.info(&format!("🔍 Would run: {}", rendered));
            return CommandOutcome::Skipped;
        }

        self.logger.debug(&format!("Executing: {}", rendered));

        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                self.logger.error(&format!("Command failed: {}", rendered));
                self.logger.error(&format!("Error details: {}", err));
                return CommandOutcome::Failed;
            }
        };

        // Drain the pipes on their own threads so a chatty child can't
        // block against a full pipe buffer while we poll for exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait_bounded(&mut child, &rendered) {
            Some(status) => status,
            None => return CommandOutcome::Failed,
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            let details = String::from_utf8_lossy(&stderr);
            let details = details.trim();
            self.logger.error(&format!("Command failed: {}", rendered));
            self.logger.error(&format!(
                "Error details: {}",
                if details.is_empty() {
                    "no error output"
                } else {
                    details
                }
            ));
            return CommandOutcome::Failed;
        }

        if !capture_json {
            return CommandOutcome::Output(Value::Object(Default::default()));
        }

        let text = String::from_utf8_lossy(&stdout);
        let text = text.trim();
        if text.is_empty() {
            return CommandOutcome::Output(Value::Object(Default::default()));
        }

        match serde_json::from_str(text) {
            Ok(value) => CommandOutcome::Output(value),
            Err(err) => {
                self.logger
                    .error(&format!("Failed to parse JSON output from: {}", rendered));
                self.logger.error(&format!("Parse error: {}", err));
                CommandOutcome::Failed
            }
        }
    }
}

fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        buf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runner(dry_run: bool) -> ExecRunner {
        ExecRunner::new(Logger::new(false), dry_run)
    }

    #[test]
    fn json_stdout_is_decoded() {
        let outcome = runner(false).run("sh", &["-c", r#"echo '[{"name":"x"}]'"#], true, false);
        assert_eq!(outcome, CommandOutcome::Output(json!([{"name": "x"}])));
    }

    #[test]
    fn empty_stdout_decodes_to_empty_object() {
        let outcome = runner(false).run("sh", &["-c", "true"], true, false);
        assert_eq!(outcome, CommandOutcome::Output(json!({})));
    }

    #[test]
    fn malformed_json_is_a_failure_not_an_empty_result() {
        let outcome = runner(false).run("sh", &["-c", "echo not-json"], true, false);
        assert_eq!(outcome, CommandOutcome::Failed);
    }

    #[test]
    fn nonzero_exit_is_a_failure() {
        let outcome = runner(false).run("sh", &["-c", "echo boom >&2; exit 3"], true, false);
        assert_eq!(outcome, CommandOutcome::Failed);
    }

    #[test]
    fn nonzero_exit_without_stderr_is_still_a_failure() {
        let outcome = runner(false).run("sh", &["-c", "exit 1"], false, false);
        assert_eq!(outcome, CommandOutcome::Failed);
    }

    #[test]
    fn missing_program_is_a_failure() {
        let outcome = runner(false).run("akscreds-no-such-binary", &[], false, false);
        assert_eq!(outcome, CommandOutcome::Failed);
    }

    #[test]
    fn uncaptured_success_returns_an_empty_object() {
        let outcome = runner(false).run("sh", &["-c", "echo ignored"], false, false);
        assert_eq!(outcome, CommandOutcome::Output(json!({})));
    }

    #[test]
    fn dry_run_skips_commands_not_allowed_to_execute() {
        // The command would fail if it actually ran.
        let outcome = runner(true).run("sh", &["-c", "exit 1"], false, false);
        assert_eq!(outcome, CommandOutcome::Skipped);
    }

    #[test]
    fn dry_run_executes_allowed_commands() {
        let outcome = runner(true).run("sh", &["-c", "echo '[]'"], true, true);
        assert_eq!(outcome, CommandOutcome::Output(json!([])));
    }

    #[test]
    fn hung_child_is_killed_at_the_deadline() {
        let runner = runner(false).with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let outcome = runner.run("sh", &["-c", "sleep 30"], false, false);
        assert_eq!(outcome, CommandOutcome::Failed);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
