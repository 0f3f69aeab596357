use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Run a command with extra environment variables and a timeout, returning
/// raw stdout bytes.
pub async fn run_command_with_env(
    cmd: &str,
    args: &[String],
    envs: &[(String, String)],
    timeout: Duration,
) -> Result<Vec<u8>> {
    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new(cmd)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true)
            .output(),
    )
    .await
    .context(format!("Command `{}` timed out", cmd))?
    .context(format!("Failed to execute `{}`", cmd))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "`{}` exited with {}: {}",
            cmd,
            output.status,
            stderr.trim()
        );
    }

    Ok(output.stdout)
}

/// Check if a binary exists in PATH. Returns the full path if found.
pub fn which(binary: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(binary))
            .find(|p| p.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn which_finds_existing_binary() {
        assert!(which("sh").is_some());
    }

    #[test]
    fn which_returns_none_for_nonexistent() {
        assert!(which("totally_nonexistent_binary_xyz").is_none());
    }

    #[tokio::test]
    async fn run_command_echo() {
        let result =
            run_command_with_env("echo", &args(&["hello"]), &[], Duration::from_secs(5)).await;
        assert_eq!(result.unwrap(), b"hello\n");
    }

    #[tokio::test]
    async fn run_command_failure() {
        let err = run_command_with_env("false", &[], &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[tokio::test]
    async fn run_command_passes_env() {
        let envs = vec![("COSTDIGEST_TEST_VAR".to_string(), "xyz".to_string())];
        let out = run_command_with_env(
            "sh",
            &args(&["-c", "printf %s \"$COSTDIGEST_TEST_VAR\""]),
            &envs,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(out, b"xyz");
    }

    #[tokio::test]
    async fn run_command_times_out() {
        let err = run_command_with_env("sleep", &args(&["5"]), &[], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
