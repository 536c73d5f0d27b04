//! Daemon lifecycle specs
//!
//! Verify startup, readiness, and shutdown of the simwardd binary.

use crate::prelude::*;

#[test]
fn rejects_a_missing_config_argument() {
    let output = assert_cmd::Command::cargo_bin("simwardd")
        .expect("binary exists")
        .output()
        .expect("run simwardd");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: simwardd"), "stderr: {stderr}");
}

#[test]
fn fails_when_the_config_file_is_missing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing = dir.path().join("absent.toml");

    let output = assert_cmd::Command::cargo_bin("simwardd")
        .expect("binary exists")
        .arg(&missing)
        .output()
        .expect("run simwardd");

    assert!(!output.status.success());
    // Startup errors land in the log file next to the config path
    let log_path = dir.path().join("absent.log");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read_to_string(&log_path)
            .map(|log| log.contains("failed to start daemon"))
            .unwrap_or(false)
    }));
}

#[test]
fn reports_ready_and_creates_the_admin_socket() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();

    assert!(deploy.socket_path().exists());

    let status = daemon.shutdown(&deploy.socket_path());
    assert!(status.success());
}

#[test]
fn shutdown_request_removes_the_socket() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();

    let status = daemon.shutdown(&deploy.socket_path());

    assert!(status.success());
    assert!(wait_for(SPEC_WAIT_MAX_MS, || !deploy.socket_path().exists()));
}

#[test]
fn writes_a_log_file_next_to_the_config() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();
    daemon.shutdown(&deploy.socket_path());

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        deploy.log_contents().contains("configuration loaded")
    }));
}
