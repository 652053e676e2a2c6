// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use super::{AnalyticsConfig, AnalyticsTarget};
use appcenter_client_common::Target;
use appcenter_client_common::backend::{MockAnalytics, MockAppCenter};
use appcenter_client_common::error::InitError;
use appcenter_client_common::layout::Layout;
use appcenter_client_common::properties::ContextProperty;
use appcenter_client_common::service_type::ServiceType;
use appcenter_log_primitives::{LogLevel, Properties};
use appcenter_test_helpers::{error_event, event};
use assert_matches::assert_matches;
use mockall::predicate::eq;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

type TrackedEvents = Arc<Mutex<Vec<(String, Properties)>>>;

fn configured_app_center() -> MockAppCenter {
  let mut app_center = MockAppCenter::new();
  app_center.expect_configured().return_const(true);
  app_center
}

fn recording_analytics() -> (MockAnalytics, TrackedEvents) {
  let tracked = TrackedEvents::default();
  let mut analytics = MockAnalytics::new();
  analytics.expect_is_enabled().returning(|| Ok(true));
  let captured = tracked.clone();
  analytics
    .expect_track_event()
    .returning(move |name, properties| {
      captured
        .lock()
        .push((name.to_string(), properties.clone()));
    });
  (analytics, tracked)
}

fn target(config: AnalyticsConfig) -> (AnalyticsTarget, TrackedEvents) {
  let (analytics, tracked) = recording_analytics();
  let target = AnalyticsTarget::new(
    "analytics",
    config,
    Arc::new(configured_app_center()),
    Arc::new(analytics),
  );
  target.initialize().unwrap();
  (target, tracked)
}

#[test]
fn tracks_event_without_properties() {
  let mut app_center = MockAppCenter::new();
  app_center.expect_configured().times(1).return_const(false);
  app_center.expect_start().never();

  let mut analytics = MockAnalytics::new();
  analytics
    .expect_is_enabled()
    .times(1)
    .returning(|| Ok(false));
  analytics
    .expect_set_enabled()
    .with(eq(true))
    .times(1)
    .returning(|_| Ok(()));
  analytics
    .expect_track_event()
    .withf(|name, properties| name == "Test message" && properties.is_empty())
    .times(1)
    .return_const(());

  let target = AnalyticsTarget::new(
    "analytics",
    AnalyticsConfig::default(),
    Arc::new(app_center),
    Arc::new(analytics),
  );
  target.initialize().unwrap();
  target.write(&event(LogLevel::Info, "Test message"));
}

#[test]
fn starts_backend_with_configured_services() {
  let mut app_center = MockAppCenter::new();
  app_center.expect_configured().return_const(false);
  app_center
    .expect_start()
    .withf(|secret, services| {
      secret == "secret" && services == [ServiceType::Analytics, ServiceType::Crashes]
    })
    .times(1)
    .returning(|_, _| Ok(()));
  app_center
    .expect_set_user_id()
    .withf(|user_id| user_id == "user-1")
    .times(1)
    .returning(|_| Ok(()));

  let mut analytics = MockAnalytics::new();
  analytics.expect_is_enabled().returning(|| Ok(true));
  analytics.expect_set_enabled().never();

  let config: AnalyticsConfig = serde_yaml::from_str(
    r"
app_secret: secret
service_types_string: Microsoft.AppCenter.Analytics.Analytics, Crashes
user_id: user-1
",
  )
  .unwrap();

  AnalyticsTarget::new("analytics", config, Arc::new(app_center), Arc::new(analytics))
    .initialize()
    .unwrap();
}

#[test]
fn enable_failure_is_returned() {
  let mut analytics = MockAnalytics::new();
  analytics
    .expect_is_enabled()
    .returning(|| Err(anyhow::anyhow!("not started")));

  let target = AnalyticsTarget::new(
    "analytics",
    AnalyticsConfig::default(),
    Arc::new(configured_app_center()),
    Arc::new(analytics),
  );
  assert_matches!(
    target.initialize(),
    Err(InitError::Enable {
      service: ServiceType::Analytics,
      ..
    })
  );
}

#[test]
fn event_properties_are_included() {
  let (target, tracked) = target(AnalyticsConfig::default());

  target.write(
    &event(LogLevel::Info, "Purchase")
      .with_property("item", "book")
      .with_property("price", "12"),
  );

  assert_eq!(
    vec![(
      "Purchase".to_string(),
      Properties::from([
        ("item".to_string(), "book".to_string()),
        ("price".to_string(), "12".to_string()),
      ])
    )],
    *tracked.lock()
  );
}

#[test]
fn context_properties_without_event_properties() {
  let mut config = AnalyticsConfig::default();
  config.properties.include_event_properties = false;
  config.properties.context_properties = vec![
    ContextProperty::new("level", "${level}".parse().unwrap()),
    ContextProperty::new("error", "${exception:format=type}".parse().unwrap()),
  ];
  let (target, tracked) = target(config);

  target.write(&event(LogLevel::Warn, "Low disk").with_property("free", "1%"));

  assert_eq!(
    vec![(
      "Low disk".to_string(),
      Properties::from([("level".to_string(), "Warn".to_string())])
    )],
    *tracked.lock()
  );
}

#[test]
fn prefix_filter_ignores_case() {
  let (target, tracked) = target(AnalyticsConfig {
    track_only_if_message_starts_with: Some("[Track]".to_string()),
    ..Default::default()
  });

  target.write(&event(LogLevel::Info, "[track] opened settings"));
  target.write(&event(LogLevel::Info, "opened settings [Track]"));
  target.write(&event(LogLevel::Info, "[TRACK]closed settings"));

  let names: Vec<_> = tracked.lock().iter().map(|(name, _)| name.clone()).collect();
  assert_eq!(
    vec!["[track] opened settings", "[TRACK]closed settings"],
    names
  );
}

#[test]
fn blank_name_falls_back() {
  let (target, tracked) = target(AnalyticsConfig {
    layout: "${event-properties:item=name}".parse().unwrap(),
    ..Default::default()
  });

  target.write(&error_event("failed", "IoError", "broken pipe"));
  target.write(&event(LogLevel::Info, "no name"));
  target.write(&event(LogLevel::Info, "named").with_property("name", "Checkout"));

  let names: Vec<_> = tracked.lock().iter().map(|(name, _)| name.clone()).collect();
  assert_eq!(
    vec!["IoError", AnalyticsTarget::FALLBACK_EVENT_NAME, "Checkout"],
    names
  );
}

#[test]
fn whitespace_name_falls_back() {
  let (target, tracked) = target(AnalyticsConfig {
    layout: Layout::literal("  "),
    ..Default::default()
  });

  target.write(&event(LogLevel::Info, "ignored"));

  assert_eq!(
    AnalyticsTarget::FALLBACK_EVENT_NAME,
    tracked.lock()[0].0
  );
}

#[test]
fn config_defaults() {
  let config: AnalyticsConfig = serde_yaml::from_str("{}").unwrap();
  assert_eq!(AnalyticsConfig::default(), config);
  assert_eq!("${message}", config.layout.to_string());
  assert!(config.properties.include_event_properties);

  let config: AnalyticsConfig = serde_yaml::from_str(
    r#"
layout: "${level}: ${message}"
include_event_properties: false
context_properties:
  - name: logger
    layout: "${logger}"
"#,
  )
  .unwrap();
  assert_eq!("${level}: ${message}", config.layout.to_string());
  assert!(!config.properties.include_event_properties);
  assert_eq!(1, config.properties.context_properties.len());
}
