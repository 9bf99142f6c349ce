//! Integration tests for intake-store
//!
//! These tests drive the conversation log through its public API, the way
//! the pipeline does.

use chrono::Utc;
use intake_domain::traits::{ConversationLog, KeyValueStore};
use intake_domain::{ConversationId, LogEvent, Stage};
use intake_store::{MemoryBackend, RedisBackend, RedisSettings, SharedLog};
use serde_json::{json, Value};

fn sample_events() -> Vec<LogEvent> {
    vec![
        LogEvent::new(
            Stage::RequestReceived,
            "RECEIVED",
            json!({"input_source_type": "raw_string", "input_identifier": "hello..."}),
        ),
        LogEvent::new(Stage::FormatDetermined, "Text", json!({"format": "Text"})),
        LogEvent::new(Stage::IntentDetermined, "Other", json!({"intent": "Other"})),
        LogEvent::new(Stage::ProcessingResult, "Processed", json!({"anomalies": []})),
    ]
}

#[test]
fn test_append_then_read_n_events() {
    let log = SharedLog::connect(MemoryBackend::new());
    let id = ConversationId::new();
    let before = Utc::now();

    for event in sample_events() {
        log.append(&id, event);
    }

    let history = log.read(&id);
    assert_eq!(history.len(), 4);

    let stages: Vec<_> = history.iter().map(|e| e.event.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::RequestReceived,
            Stage::FormatDetermined,
            Stage::IntentDetermined,
            Stage::ProcessingResult,
        ]
    );
    assert!(history.iter().all(|e| e.timestamp >= before));
}

#[test]
fn test_conversations_are_isolated() {
    let log = SharedLog::connect(MemoryBackend::new());
    let first = ConversationId::new();
    let second = ConversationId::new();

    log.append(&first, LogEvent::new(Stage::RequestReceived, "one", Value::Null));
    log.append(&second, LogEvent::new(Stage::RequestReceived, "two", Value::Null));
    log.append(&second, LogEvent::new(Stage::FormatDetermined, "three", Value::Null));

    assert_eq!(log.read(&first).len(), 1);
    assert_eq!(log.read(&second).len(), 2);
}

#[test]
fn test_stored_layout() {
    let backend = MemoryBackend::new();
    let log = SharedLog::connect(backend.clone());
    let id = ConversationId::new();

    log.append(&id, LogEvent::new(Stage::RequestReceived, "RECEIVED", json!({"k": 1})));

    let raw = backend
        .get(&format!("conversation:{}", id))
        .unwrap()
        .expect("history should be stored under conversation:<id>");
    let stored: Value = serde_json::from_str(&raw).unwrap();

    let entries = stored.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["stage"], "request_received");
    assert_eq!(entries[0]["status"], "RECEIVED");
    assert_eq!(entries[0]["payload"]["k"], 1);
    assert!(entries[0]["timestamp"].is_string());
}

#[test]
fn test_log_through_reference() {
    let log = SharedLog::connect(MemoryBackend::new());
    let id = ConversationId::new();

    fn record(log: impl ConversationLog, id: &ConversationId) {
        log.append(id, LogEvent::new(Stage::RequestReceived, "RECEIVED", Value::Null));
    }

    record(&log, &id);
    record(&log, &id);
    assert_eq!(log.read(&id).len(), 2);
}

#[test]
fn test_unreadable_history_does_not_block_appends() {
    let backend = MemoryBackend::new();
    let id = ConversationId::new();
    backend.insert_unreadable(&id.storage_key());

    let log = SharedLog::connect(backend);
    for event in sample_events() {
        log.append(&id, event);
    }
    assert_eq!(log.read(&id).len(), 4);
}

#[test]
fn test_unreachable_redis_degrades() {
    let settings = RedisSettings {
        host: "127.0.0.1".to_string(),
        port: 1,
    };
    let log = SharedLog::connect(RedisBackend::open(&settings).unwrap());
    assert!(!log.is_available());

    let id = ConversationId::new();
    log.append(&id, LogEvent::new(Stage::RequestReceived, "RECEIVED", Value::Null));
    assert!(log.read(&id).is_empty());
}

// Requires a Redis server (INTAKE_REDIS_HOST / INTAKE_REDIS_PORT)
#[test]
#[ignore]
fn test_redis_round_trip() {
    let settings = RedisSettings::default().with_env_overrides();
    let log = SharedLog::connect(RedisBackend::open(&settings).unwrap());
    assert!(log.is_available());

    let id = ConversationId::new();
    for event in sample_events() {
        log.append(&id, event);
    }
    assert_eq!(log.read(&id).len(), 4);
}

// Requires a Redis server (INTAKE_REDIS_HOST / INTAKE_REDIS_PORT)
#[test]
#[ignore]
fn test_redis_overwrites_corrupt_history() {
    let settings = RedisSettings::default().with_env_overrides();
    let mut conn = redis::Client::open(settings.url())
        .unwrap()
        .get_connection()
        .unwrap();
    let log = SharedLog::connect(RedisBackend::open(&settings).unwrap());

    let binary = ConversationId::new();
    let _: () = redis::cmd("SET")
        .arg(binary.storage_key())
        .arg(&[0xffu8, 0xfe][..])
        .query(&mut conn)
        .unwrap();

    let listed = ConversationId::new();
    let _: () = redis::cmd("RPUSH")
        .arg(listed.storage_key())
        .arg("not a string key")
        .query(&mut conn)
        .unwrap();

    for id in [&binary, &listed] {
        log.append(id, LogEvent::new(Stage::RequestReceived, "RECEIVED", Value::Null));
        assert_eq!(log.read(id).len(), 1);
    }
}
