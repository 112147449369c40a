use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("timeline-relay").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("check")));
}

#[test]
fn missing_config_exits_non_zero() {
    let mut cmd = Command::cargo_bin("timeline-relay").expect("Binary exists");
    cmd.arg("run")
        .arg("--config")
        .arg("/definitely/not/here/config.json")
        .env_remove("CONFIG")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn config_path_falls_back_to_env_var() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), b"{ this is not json").expect("Writing temp config failed");

    let mut cmd = Command::cargo_bin("timeline-relay").expect("Binary exists");
    cmd.arg("check")
        .env("CONFIG", config.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config JSON"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use timeline_relay::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Check {
            config: Some(std::path::PathBuf::from("dummy.json")),
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "dummy config does not exist");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
