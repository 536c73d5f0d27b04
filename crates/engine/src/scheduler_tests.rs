// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::test_support::scheduler_with;
use simward_adapters::ServerCall;
use simward_core::{
    ConfigFile, DeferredAction, InstanceConfig, InstanceStatus, MissionData, Preset, ScheduleRule,
    StatusReport,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

fn rule(window: &str, days: &str) -> ScheduleRule {
    ScheduleRule {
        window: window.parse().unwrap(),
        days: days.parse().unwrap(),
    }
}

fn config_with_schedule(rules: Vec<ScheduleRule>) -> ConfigFile {
    let mut config = ConfigFile::default();
    config.instances.insert(
        "alpha".to_string(),
        InstanceConfig {
            schedule: rules,
            ..InstanceConfig::default()
        },
    );
    config
}

fn report(status: InstanceStatus, populated: bool) -> StatusReport {
    StatusReport {
        name: "alpha".to_string(),
        status,
        mission_time_secs: 0,
        populated,
    }
}

/// Let spawned transition tasks run to completion under paused time
async fn drain_tasks() {
    tokio::time::sleep(Duration::from_secs(60)).await;
}

#[tokio::test(start_paused = true)]
async fn new_registers_every_configured_instance() {
    let (sched, _fakes) = scheduler_with(config_with_schedule(vec![]));
    assert_eq!(sched.registry().names(), vec!["alpha".to_string()]);
    assert_eq!(
        sched.registry().get("alpha").unwrap().status,
        InstanceStatus::Unregistered
    );
}

#[tokio::test(start_paused = true)]
async fn tick_launches_a_shut_down_instance_in_an_up_window() {
    // Frozen clock sits at Monday 09:00
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "YYYYYNN")]));
    sched.report_status(report(InstanceStatus::Shutdown, false));

    sched.tick().await;
    drain_tasks().await;

    assert_eq!(
        fakes.server.calls(),
        vec![ServerCall::Launch {
            instance: "alpha".to_string()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn tick_shuts_down_a_running_instance_in_a_down_window() {
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "NNNNNNN")]));
    sched.report_status(report(InstanceStatus::Running, false));

    sched.tick().await;
    drain_tasks().await;

    assert!(fakes.server.calls().contains(&ServerCall::Terminate {
        instance: "alpha".to_string()
    }));
}

#[tokio::test(start_paused = true)]
async fn tick_skips_an_unreported_instance() {
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "YYYYYYY")]));

    sched.tick().await;
    drain_tasks().await;

    assert!(fakes.server.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn tick_respects_the_maintenance_override() {
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "YYYYYYY")]));
    sched.report_status(report(InstanceStatus::Shutdown, false));
    sched.registry().set_maintenance("alpha");

    sched.tick().await;
    drain_tasks().await;

    assert!(fakes.server.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn tick_does_not_stack_transitions_on_a_pending_instance() {
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "YYYYYYY")]));
    sched.report_status(report(InstanceStatus::Shutdown, false));
    assert!(sched.registry().begin_transition("alpha"));

    sched.tick().await;
    drain_tasks().await;

    assert!(fakes.server.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn consecutive_ticks_issue_a_single_launch() {
    let (sched, fakes) = scheduler_with(config_with_schedule(vec![rule("08:00-20:00", "YYYYYYY")]));
    sched.report_status(report(InstanceStatus::Shutdown, false));

    sched.tick().await;
    drain_tasks().await;
    // No status report arrived yet; the guard must hold the next tick off
    sched.tick().await;
    drain_tasks().await;

    let launches = fakes
        .server
        .calls()
        .into_iter()
        .filter(|c| matches!(c, ServerCall::Launch { .. }))
        .count();
    assert_eq!(launches, 1);
}

#[tokio::test(start_paused = true)]
async fn tick_runs_a_deferred_preset_once_the_instance_empties() {
    let path = PathBuf::from("/missions/alpha.json");
    let mut presets = BTreeMap::new();
    presets.insert(
        "winter".to_string(),
        Preset {
            temperature: Some(-10),
            ..Preset::default()
        },
    );
    let mut config = ConfigFile::default();
    config.instances.insert(
        "alpha".to_string(),
        InstanceConfig {
            presets,
            mission: Some(path.clone()),
            ..InstanceConfig::default()
        },
    );
    let (sched, fakes) = scheduler_with(config);
    fakes.missions.insert(&path, MissionData::default());
    sched.report_status(report(InstanceStatus::Running, true));
    sched.registry().set_deferred(
        "alpha",
        DeferredAction::ApplyPreset {
            preset: "winter".to_string(),
        },
    );

    // Still occupied: nothing happens
    sched.tick().await;
    drain_tasks().await;
    assert_eq!(fakes.missions.save_count(&path), 0);

    sched.report_status(report(InstanceStatus::Running, false));
    sched.tick().await;
    drain_tasks().await;

    assert_eq!(fakes.missions.save_count(&path), 1);
    assert_eq!(fakes.missions.get(&path).unwrap().temperature, -10);
    assert!(sched.registry().get("alpha").unwrap().deferred.is_none());
}

#[tokio::test(start_paused = true)]
async fn affinity_tick_pins_a_running_instance() {
    let mut config = ConfigFile::default();
    config.instances.insert(
        "alpha".to_string(),
        InstanceConfig {
            affinity: Some(vec![2, 3]),
            endpoint: Some(simward_core::EndpointConfig {
                addr: "127.0.0.1:10308".parse().unwrap(),
                command: "simserver".to_string(),
                args: Vec::new(),
                cwd: None,
                process_name: Some("simserver".to_string()),
                extension_commands: BTreeMap::new(),
            }),
            ..InstanceConfig::default()
        },
    );
    let (sched, fakes) = scheduler_with(config);
    fakes.process.set_pid("simserver", 4242);
    sched.report_status(report(InstanceStatus::Running, false));

    sched.affinity_tick().await;

    assert!(fakes
        .process
        .calls()
        .contains(&simward_adapters::ProcessCall::SetAffinity {
            pid: 4242,
            cores: vec![2, 3]
        }));
    // PID is cached for the next round
    assert_eq!(sched.registry().get("alpha").unwrap().pid, Some(4242));
}

#[tokio::test(start_paused = true)]
async fn affinity_tick_skips_instances_that_are_not_running() {
    let mut config = ConfigFile::default();
    config.instances.insert(
        "alpha".to_string(),
        InstanceConfig {
            affinity: Some(vec![0]),
            ..InstanceConfig::default()
        },
    );
    let (sched, fakes) = scheduler_with(config);
    sched.report_status(report(InstanceStatus::Shutdown, false));

    sched.affinity_tick().await;

    assert!(fakes.process.calls().is_empty());
}
