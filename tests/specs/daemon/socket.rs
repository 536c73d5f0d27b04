//! Admin socket specs
//!
//! Drive the wire protocol end to end against a running daemon.

use crate::prelude::*;

#[test]
fn ping_answers_pong() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();

    let response = request(&deploy.socket_path(), json!({"type": "ping"}));
    assert_eq!(response["type"], "pong");

    daemon.shutdown(&deploy.socket_path());
}

#[test]
fn status_lists_configured_instances() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();

    let response = request(&deploy.socket_path(), json!({"type": "status"}));
    assert_eq!(response["type"], "instances");
    let instances = response["instances"].as_array().expect("instances array");
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0]["name"], "alpha");
    assert_eq!(instances[0]["status"], "unregistered");

    daemon.shutdown(&deploy.socket_path());
}

#[test]
fn status_reflects_a_process_report() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();
    let socket = deploy.socket_path();

    let response = request(
        &socket,
        json!({
            "type": "report",
            "report": {
                "name": "alpha",
                "status": "running",
                "mission_time_secs": 90,
                "populated": true
            }
        }),
    );
    assert_eq!(response["type"], "ok");

    let response = request(&socket, json!({"type": "status"}));
    let instances = response["instances"].as_array().expect("instances array");
    assert_eq!(instances[0]["status"], "running");
    assert_eq!(instances[0]["mission_time_secs"], 90);
    assert_eq!(instances[0]["populated"], true);

    daemon.shutdown(&socket);
}

#[test]
fn maintenance_round_trips_over_the_socket() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();
    let socket = deploy.socket_path();

    let response = request(&socket, json!({"type": "set_maintenance", "instance": "alpha"}));
    assert_eq!(response["type"], "ok");

    let response = request(&socket, json!({"type": "status"}));
    let instances = response["instances"].as_array().expect("instances array");
    assert_eq!(instances[0]["maintenance"], true);

    let response = request(&socket, json!({"type": "clear_maintenance", "instance": "alpha"}));
    assert_eq!(response["type"], "maintenance_cleared");
    assert_eq!(response["was_set"], true);

    daemon.shutdown(&socket);
}

#[test]
fn unknown_instances_report_an_error() {
    let deploy = Deployment::single_instance();
    let daemon = deploy.spawn_daemon();

    let response = request(
        &deploy.socket_path(),
        json!({"type": "set_maintenance", "instance": "ghost"}),
    );
    assert_eq!(response["type"], "error");
    let message = response["message"].as_str().expect("error message");
    assert!(message.contains("ghost"), "message: {message}");

    daemon.shutdown(&deploy.socket_path());
}
