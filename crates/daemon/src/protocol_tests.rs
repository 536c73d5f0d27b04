// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::SetPreset {
        instance: "alpha".to_string(),
        preset: "winter".to_string(),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_report() {
    let request = Request::Report {
        report: StatusReport {
            name: "alpha".to_string(),
            status: InstanceStatus::Running,
            mission_time_secs: 1800,
            populated: true,
        },
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Instances {
        instances: vec![InstanceSummary {
            name: "alpha".to_string(),
            status: InstanceStatus::Paused,
            populated: false,
            maintenance: true,
            restart_pending: false,
            mission_time_secs: 90,
        }],
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn add_preset_overwrite_defaults_to_false() {
    let decoded: Request =
        decode(br#"{"type":"add_preset","instance":"alpha","preset":"summer"}"#)
            .expect("decode failed");
    assert_eq!(
        decoded,
        Request::AddPreset {
            instance: "alpha".to_string(),
            preset: "summer".to_string(),
            overwrite: false,
        }
    );
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Ok).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds a 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&u32::MAX.to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);

    let err = read_message(&mut cursor).await.expect_err("should reject");
    assert!(matches!(err, ProtocolError::TooLarge(_)));
}

#[tokio::test]
async fn closed_connection_reads_as_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let err = read_message(&mut cursor).await.expect_err("should fail");
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}
