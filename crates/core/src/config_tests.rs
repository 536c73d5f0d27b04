// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = r#"
interval = "60s"
message_timeout = 20

[instances.main]
populated = false
extensions = ["voice-relay"]
affinity = [2, 3]
mission = "/srv/main/mission.json"
reset = ["loadMission 1", "clearStatics"]

[[instances.main.schedule]]
window = "08:00-20:00"
days = "YYYYYNN"

[[instances.main.schedule]]
window = "20:00-08:00"
days = "NNNNNNN"

[instances.main.warn]
times = [600, 300, 60]
text = "!!! Server will {what} in {when} !!!"

[instances.main.restart]
method = "restart"
mission_time = 480
populated = false

[[instances.main.restart.settings]]
window = "06:00-18:00"
preset = "clear-day"

[[instances.main.restart.settings]]
window = "18:00-06:00"
preset = "stormy-night"

[instances.main.presets.clear-day]
start_time = 28800
date = "2024-06-21"
temperature = 22
clouds = "Clear"
qnh = 760

[instances.main.presets.stormy-night]
start_time = 72000
temperature = 9
clouds = "OvercastAndRain"
ground_turbulence = 30

[instances.main.endpoint]
addr = "127.0.0.1:10308"
command = "/opt/sim/bin/server"
args = ["--instance", "main"]
process_name = "sim-server"
"#;

#[test]
fn sample_config_parses() {
    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
    assert_eq!(config.interval, Duration::from_secs(60));
    assert_eq!(config.message_timeout, 20);

    let main = &config.instances["main"];
    assert!(!main.populated);
    assert_eq!(main.schedule.len(), 2);
    assert_eq!(main.extensions, vec!["voice-relay"]);
    assert_eq!(main.affinity.as_deref(), Some(&[2usize, 3][..]));
    assert_eq!(main.warn_times(), &[600, 300, 60]);
    assert_eq!(
        main.reset.as_ref().unwrap().commands(),
        vec!["loadMission 1", "clearStatics"]
    );
}

#[test]
fn restart_settings_parse_as_window_rules() {
    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
    let restart = config.instances["main"].restart.as_ref().unwrap();
    assert_eq!(restart.method, RestartMethod::Restart);
    assert_eq!(restart.mission_time, Some(480));
    assert!(!restart.populated);
    match restart.settings.as_ref().unwrap() {
        RestartSettings::ByWindow(rules) => {
            assert_eq!(rules.len(), 2);
            assert_eq!(rules[0].preset, "clear-day");
            assert_eq!(rules[1].preset, "stormy-night");
        }
        other => panic!("expected windowed settings, got {:?}", other),
    }
}

#[test]
fn restart_settings_parse_as_random_list() {
    let config: ConfigFile = toml::from_str(
        r#"
[instances.alt]
[instances.alt.restart]
method = "rotate"
local_times = ["04:00-04:30"]
settings = ["summer", "winter"]
"#,
    )
    .unwrap();
    let restart = config.instances["alt"].restart.as_ref().unwrap();
    assert_eq!(restart.method, RestartMethod::Rotate);
    assert_eq!(restart.local_times.len(), 1);
    // populated defaults to true
    assert!(restart.populated);
    match restart.settings.as_ref().unwrap() {
        RestartSettings::Random(names) => assert_eq!(names, &["summer", "winter"]),
        other => panic!("expected random settings, got {:?}", other),
    }
}

#[test]
fn presets_are_sparse() {
    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
    let preset = &config.instances["main"].presets["stormy-night"];
    assert_eq!(preset.start_time, Some(72000));
    assert_eq!(preset.ground_turbulence, Some(30));
    assert!(preset.date.is_none());
    assert!(preset.qnh.is_none());
    assert!(preset.wind.is_none());
}

#[test]
fn reset_accepts_a_single_command() {
    let config: ConfigFile = toml::from_str(
        r#"
[instances.solo]
reset = "loadMission 1"
"#,
    )
    .unwrap();
    assert_eq!(
        config.instances["solo"].reset.as_ref().unwrap().commands(),
        vec!["loadMission 1"]
    );
}

#[test]
fn defaults_apply_to_empty_file() {
    let config: ConfigFile = toml::from_str("").unwrap();
    assert_eq!(config.interval, Duration::from_secs(60));
    assert_eq!(config.affinity_interval, Duration::from_secs(300));
    assert_eq!(config.message_timeout, 15);
    assert!(config.instances.is_empty());
}

#[test]
fn config_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simward.toml");

    let config: ConfigFile = toml::from_str(SAMPLE).unwrap();
    config.save(&path).unwrap();
    let reloaded = ConfigFile::load(&path).unwrap();

    assert_eq!(reloaded.instances["main"], config.instances["main"]);
    assert_eq!(reloaded.message_timeout, config.message_timeout);
}

#[test]
fn load_missing_file_is_a_read_error() {
    let err = ConfigFile::load(Path::new("/nonexistent/simward.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
