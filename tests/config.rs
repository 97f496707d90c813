use std::time::Duration;

use rephrase::error::Error;
use rephrase::pipeline::config::{CheckpointPolicy, PipelineConfig};

#[test]
fn defaults_match_the_documented_values() {
    let config = PipelineConfig::default();
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.max_requests_before_pause, 180);
    assert_eq!(config.delay_between_batches, Duration::from_secs(5));
    assert_eq!(config.long_pause_duration, Duration::from_secs(60));
    assert_eq!(config.retries, 1);
    assert_eq!(config.intermediate_language, "fr");
    assert_eq!(config.sample_size, None);
    assert_eq!(config.checkpoint_policy, CheckpointPolicy::EveryBatch);
    assert!(config.validate().is_ok());
}

#[test]
fn json_overrides_only_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "batch_size": 25,
            "delay_between_batches": 6,
            "long_pause_duration": 0.5,
            "intermediate_language": "de",
            "sample_size": 10000,
            "checkpoint_policy": "at_pause"
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.batch_size, 25);
    assert_eq!(config.delay_between_batches, Duration::from_secs(6));
    assert_eq!(config.long_pause_duration, Duration::from_millis(500));
    assert_eq!(config.intermediate_language, "de");
    assert_eq!(config.sample_size, Some(10_000));
    assert_eq!(config.checkpoint_policy, CheckpointPolicy::AtPause);
    assert_eq!(config.max_requests_before_pause, 180);
}

#[test]
fn unreadable_json_is_invalid_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ batch_size: ").unwrap();

    let err = PipelineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }), "{err}");
}

#[test]
fn negative_durations_are_rejected() {
    let err = serde_json::from_str::<PipelineConfig>(r#"{"retry_delay": -1}"#).unwrap_err();
    assert!(err.to_string().contains("negative") || err.is_data(), "{err}");
}

#[test]
fn validate_rejects_degenerate_values() {
    let cases = [
        PipelineConfig::default().batch_size(0),
        PipelineConfig::default().retries(0),
        PipelineConfig::default().max_requests_before_pause(0),
        PipelineConfig::default().cache_capacity(0),
        PipelineConfig::default().intermediate_language(" "),
    ];
    for config in cases {
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }), "{err}");
    }
}

#[test]
fn without_delays_zeroes_every_sleep() {
    let config = PipelineConfig::default().without_delays();
    assert!(config.delay_between_batches.is_zero());
    assert!(config.long_pause_duration.is_zero());
    assert!(config.retry_delay.is_zero());
}
