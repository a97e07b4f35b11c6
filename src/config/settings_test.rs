// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;

#[test]
fn test_defaults_load_without_files() {
    let settings = Settings::with_defaults().expect("defaults should deserialize");

    assert_eq!(settings.scheduler.worker_slots, 5);
    assert_eq!(settings.pipeline.batch_size, 500);
    assert_eq!(settings.pipeline.throttle_every, 5000);
    assert_eq!(settings.pipeline.max_retries, 3);
    assert_eq!(settings.matcher.sample_size, 20);
    assert_eq!(settings.matcher.min_score_policy, "lenient");
    assert_eq!(settings.notification.sink, "log");
    assert!(settings.notification.webhook_url.is_none());
    assert!(!settings.metrics.enabled);
}

#[test]
fn test_pipeline_settings_convert_to_persistence_options() {
    let settings = Settings::with_defaults().unwrap();
    let options = PersistenceOptions::from(&settings.pipeline);

    assert_eq!(options.batch_size, 500);
    assert_eq!(options.throttle_pause, Duration::from_millis(1000));
    assert_eq!(options.retry_backoff, Duration::from_millis(2000));
    assert!(options.score_drops);
}

#[test]
fn test_matcher_settings_policy_parsing() {
    let strict = MatcherSettings {
        sample_size: 5,
        min_score_policy: "STRICT".to_string(),
    };
    assert_eq!(
        MatcherOptions::from(&strict).min_score_policy,
        MinScorePolicy::Strict
    );

    let unknown = MatcherSettings {
        sample_size: 0,
        min_score_policy: "whatever".to_string(),
    };
    let options = MatcherOptions::from(&unknown);
    assert_eq!(options.min_score_policy, MinScorePolicy::Lenient);
    assert_eq!(options.sample_size, 1);
}
