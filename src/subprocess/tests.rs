use super::*;
use std::time::Duration;

fn sh(script: &str) -> ProcessCommand {
    let mut builder = ProcessBuilder::new("sh", std::env::temp_dir());
    builder.set_arguments(["-c", script]);
    builder.get_process()
}

#[tokio::test]
async fn test_production_runner_success() {
    let runner = TokioProcessRunner;
    let mut builder = ProcessBuilder::new("echo", std::env::temp_dir());
    builder.set_arguments(["hello world"]);

    let output = runner.run(builder.get_process()).await.unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout.trim(), "hello world");
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn test_production_runner_failure() {
    let runner = TokioProcessRunner;
    let output = runner
        .run(sh("echo 'no playbook' >&2; exit 4"))
        .await
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(output.stderr.trim(), "no playbook");
}

#[tokio::test]
async fn test_production_runner_command_not_found() {
    let runner = TokioProcessRunner;
    let command =
        ProcessBuilder::new("nonexistent-command-12345", std::env::temp_dir()).get_process();

    let result = runner.run(command).await;
    assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
}

#[tokio::test]
async fn test_production_runner_timeout() {
    let runner = TokioProcessRunner;
    let mut command = sh("sleep 5");
    command.timeout = Some(Duration::from_millis(100));

    let started = std::time::Instant::now();
    let result = runner.run(command).await;
    assert!(matches!(result, Err(ProcessError::Timeout { .. })));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_env_overrides_layer_on_inherited_env() {
    let runner = TokioProcessRunner;
    let mut builder = ProcessBuilder::new("sh", std::env::temp_dir());
    builder
        .set_arguments(["-c", "echo \"$ANSIBLE_NOCOWS:${PATH:+has-path}\""])
        .set_env("ANSIBLE_NOCOWS", 1);

    let output = runner.run(builder.get_process()).await.unwrap();
    assert_eq!(output.stdout.trim(), "1:has-path");
}

#[tokio::test]
async fn test_working_dir_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TokioProcessRunner;
    let builder = ProcessBuilder::new("pwd", dir.path());

    let output = runner.run(builder.get_process()).await.unwrap();
    let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
    assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
}

#[tokio::test]
async fn test_mock_runner_basic() {
    let mock = MockProcessRunner::new();

    mock.expect_command("ansible-galaxy")
        .with_args(|args| args == &["list"])
        .returns_stdout("- geerlingguy.docker, 6.1.0\n")
        .returns_success()
        .finish();

    let mut builder = ProcessBuilder::new("ansible-galaxy", "/tmp");
    builder.set_arguments(["list"]);
    let output = mock.run(builder.get_process()).await.unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, "- geerlingguy.docker, 6.1.0\n");
    assert!(mock.verify_called("ansible-galaxy", 1));
}

#[tokio::test]
async fn test_mock_runner_multiple_calls() {
    let mock = MockProcessRunner::new();

    mock.expect_command("ansible-playbook")
        .returns_success()
        .times(2)
        .finish();

    let command = ProcessBuilder::new("ansible-playbook", "/tmp").get_process();
    assert!(mock.run(command.clone()).await.is_ok());
    assert!(mock.run(command.clone()).await.is_ok());
    assert!(matches!(
        mock.run(command).await,
        Err(ProcessError::MockExpectationNotMet(_))
    ));
}

#[tokio::test]
async fn test_mock_runner_unexpected_command() {
    let mock = MockProcessRunner::new();
    let command = ProcessBuilder::new("ansible-playbook", "/tmp").get_process();

    assert!(matches!(
        mock.run(command).await,
        Err(ProcessError::MockExpectationNotMet(_))
    ));
    assert_eq!(mock.get_call_history().len(), 1);
}

#[tokio::test]
async fn test_mock_runner_reset_clears_expectations_and_history() {
    let mock = MockProcessRunner::new();
    mock.expect_command("ansible-galaxy")
        .returns_stdout("- geerlingguy.docker, 7.4.1")
        .finish();

    let command = ProcessBuilder::new("ansible-galaxy", "/tmp").get_process();
    assert!(mock.run(command.clone()).await.is_ok());

    mock.reset();
    assert!(mock.get_call_history().is_empty());
    assert!(mock.last_call().is_none());
    assert!(matches!(
        mock.run(command).await,
        Err(ProcessError::MockExpectationNotMet(_))
    ));
}

#[derive(Clone, Default)]
struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn test_command_line_logged_with_env_prefix() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut builder = ProcessBuilder::new("echo", std::env::temp_dir());
    builder
        .set_arguments(["site.yml"])
        .set_env("ANSIBLE_STDOUT_CALLBACK", "json")
        .set_env("ANSIBLE_NOCOWS", 1);

    TokioProcessRunner.run(builder.get_process()).await.unwrap();

    assert!(logs
        .contents()
        .contains("Executing: ANSIBLE_NOCOWS='1' ANSIBLE_STDOUT_CALLBACK='json' echo site.yml"));
}
