use crate::artifacts::difftool::error::DifftoolError;
use crate::artifacts::difftool::materializer::FileRole;
use derive_new::new;
use std::path::Path;
use tokio::process::Command;

/// Captured result of one external tool run
#[derive(Debug)]
pub struct InvocationOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Replace the placeholder variables of a tool command line with the
/// staged file paths
pub fn substitute_placeholders(
    template: &str,
    local: &Path,
    remote: &Path,
    merged: &Path,
) -> String {
    template
        .replace("$LOCAL", &local.display().to_string())
        .replace("$REMOTE", &remote.display().to_string())
        .replace("$MERGED", &merged.display().to_string())
}

/// Runs a diff tool command line through the shell
///
/// The staged paths are substituted into the command and exported as
/// `LOCAL`, `REMOTE` and `MERGED` for commands that expect them in the
/// environment instead.
#[derive(new)]
pub struct ToolInvoker<'r> {
    workspace_root: &'r Path,
}

impl ToolInvoker<'_> {
    pub async fn invoke(
        &self,
        command_line: &str,
        local: &Path,
        remote: &Path,
        merged: &Path,
        trust_exit_code: bool,
    ) -> anyhow::Result<InvocationOutcome> {
        let command = substitute_placeholders(command_line, local, remote, merged);

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(self.workspace_root)
            .env(FileRole::Local.env_name(), local)
            .env(FileRole::Remote.env_name(), remote)
            .env(FileRole::Merged.env_name(), merged)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(err) => anyhow::bail!(DifftoolError::ToolExecution {
                message: format!("failed to start external tool '{command}': {err}"),
                stdout: String::new(),
            }),
        };

        let outcome = InvocationOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if trust_exit_code && outcome.exit_code != 0 {
            let mut message = format!(
                "external tool '{command}' exited with code {}",
                outcome.exit_code
            );
            if !outcome.stderr.trim().is_empty() {
                message = format!("{message}: {}", outcome.stderr.trim());
            }

            anyhow::bail!(DifftoolError::ToolExecution {
                message,
                stdout: outcome.stdout,
            });
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_substituted() {
        let command = substitute_placeholders(
            r#"kdiff3 "$LOCAL" "$REMOTE""#,
            Path::new("/tmp/LOCAL_a.txt"),
            Path::new("/dev/null"),
            Path::new("a.txt"),
        );

        assert_eq!(command, r#"kdiff3 "/tmp/LOCAL_a.txt" "/dev/null""#);
    }

    #[test]
    fn test_merged_placeholder_names_the_working_tree_file() {
        let command = substitute_placeholders(
            "meld $LOCAL $MERGED",
            Path::new("/tmp/old"),
            Path::new("/tmp/new"),
            Path::new("src/lib.rs"),
        );

        assert_eq!(command, "meld /tmp/old src/lib.rs");
    }

    #[tokio::test]
    async fn test_invoke_captures_output_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ToolInvoker::new(dir.path());

        let outcome = invoker
            .invoke(
                "printf 'from tool'",
                Path::new("/dev/null"),
                Path::new("/dev/null"),
                Path::new("a.txt"),
                false,
            )
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.stdout, "from tool");
    }

    #[tokio::test]
    async fn test_staged_paths_are_exported_to_the_tool_environment() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ToolInvoker::new(dir.path());

        // ${LOCAL} sidesteps the textual substitution, so only the
        // exported variable can supply the value
        let outcome = invoker
            .invoke(
                r#"printf '%s' "${LOCAL}""#,
                Path::new("/tmp/LOCAL_a.txt"),
                Path::new("/dev/null"),
                Path::new("a.txt"),
                false,
            )
            .await
            .unwrap();

        assert_eq!(outcome.stdout, "/tmp/LOCAL_a.txt");
    }

    #[tokio::test]
    async fn test_tool_runs_in_the_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ToolInvoker::new(dir.path());

        let outcome = invoker
            .invoke(
                "pwd",
                Path::new("/dev/null"),
                Path::new("/dev/null"),
                Path::new("a.txt"),
                false,
            )
            .await
            .unwrap();

        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(outcome.stdout.trim_end(), expected.display().to_string());
    }

    #[tokio::test]
    async fn test_untrusted_failure_reports_the_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ToolInvoker::new(dir.path());

        let outcome = invoker
            .invoke(
                "exit 3",
                Path::new("/dev/null"),
                Path::new("/dev/null"),
                Path::new("a.txt"),
                false,
            )
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, 3);
    }

    #[tokio::test]
    async fn test_trusted_failure_aborts_with_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = ToolInvoker::new(dir.path());

        let result = invoker
            .invoke(
                "printf 'partial'; echo 'boom' >&2; exit 9",
                Path::new("/dev/null"),
                Path::new("/dev/null"),
                Path::new("a.txt"),
                true,
            )
            .await;

        let err = result.unwrap_err();
        match err.downcast_ref::<DifftoolError>() {
            Some(DifftoolError::ToolExecution { message, stdout }) => {
                assert!(message.contains("exited with code 9"));
                assert!(message.contains("boom"));
                assert_eq!(stdout, "partial");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
