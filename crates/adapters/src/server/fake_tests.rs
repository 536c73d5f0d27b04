// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_records_calls_in_order() {
    let link = FakeServerLink::new();
    link.notify_mission_end("alpha").await.unwrap();
    link.notify_shutdown("alpha").await.unwrap();
    link.terminate("alpha").await.unwrap();

    assert_eq!(
        link.calls(),
        vec![
            ServerCall::NotifyMissionEnd {
                instance: "alpha".to_string()
            },
            ServerCall::NotifyShutdown {
                instance: "alpha".to_string()
            },
            ServerCall::Terminate {
                instance: "alpha".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn extensions_track_running_state() {
    let link = FakeServerLink::new();
    assert!(!link.extension_running("alpha", "voice").await.unwrap());

    link.start_extension("alpha", "voice").await.unwrap();
    assert!(link.extension_running("alpha", "voice").await.unwrap());

    link.stop_extension("alpha", "voice").await.unwrap();
    assert!(!link.extension_running("alpha", "voice").await.unwrap());
}

#[tokio::test]
async fn injected_launch_failure_surfaces() {
    let link = FakeServerLink::new();
    link.fail_next_launch();
    let err = link.launch("alpha").await.unwrap_err();
    assert!(matches!(err, ServerError::LaunchFailed { .. }));
    assert!(link.calls().is_empty());
}

#[tokio::test]
async fn popup_count_filters_by_instance() {
    let link = FakeServerLink::new();
    link.send_popup("alpha", "soon", "all", 15).await.unwrap();
    link.send_popup("beta", "soon", "all", 15).await.unwrap();
    link.send_popup("alpha", "now", "all", 15).await.unwrap();
    assert_eq!(link.popup_count("alpha"), 2);
    assert_eq!(link.popup_count("beta"), 1);
}
