// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#![deny(
  clippy::expect_used,
  clippy::panic,
  clippy::todo,
  clippy::unimplemented,
  clippy::unreachable,
  clippy::unwrap_used
)]

#[cfg(test)]
#[path = "./lib_test.rs"]
mod tests;

use appcenter_client_common::Target;
use appcenter_client_common::backend::{Analytics, AppCenter};
use appcenter_client_common::config::BackendConfig;
use appcenter_client_common::error::InitError;
use appcenter_client_common::layout::Layout;
use appcenter_client_common::lifecycle::{apply_identity, ensure_enabled, start_backend};
use appcenter_client_common::properties::PropertyConfig;
use appcenter_client_common::service_type::ServiceType;
use appcenter_log_primitives::LogEvent;
use std::sync::Arc;

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  appcenter_test_helpers::test_global_init();
}

//
// AnalyticsConfig
//

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
  #[serde(flatten)]
  pub backend: BackendConfig,

  #[serde(flatten)]
  pub properties: PropertyConfig,

  /// Renders the event name. The backend truncates names longer than 256 characters.
  pub layout: Layout,

  /// Only track events whose message starts with this prefix, e.g. "[Track]". Matching ignores
  /// case.
  pub track_only_if_message_starts_with: Option<String>,
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      backend: BackendConfig::default(),
      properties: PropertyConfig::default(),
      layout: Layout::message(),
      track_only_if_message_starts_with: None,
    }
  }
}

//
// AnalyticsTarget
//

/// Tracks log events as analytics events.
pub struct AnalyticsTarget {
  name: String,
  config: AnalyticsConfig,
  app_center: Arc<dyn AppCenter>,
  analytics: Arc<dyn Analytics>,
}

impl AnalyticsTarget {
  /// The event name used when neither the layout nor the event's error provide one. The backend
  /// discards events with an empty name.
  pub const FALLBACK_EVENT_NAME: &'static str = "AnalyticsTarget";

  #[must_use]
  pub fn new(
    name: impl Into<String>,
    config: AnalyticsConfig,
    app_center: Arc<dyn AppCenter>,
    analytics: Arc<dyn Analytics>,
  ) -> Self {
    Self {
      name: name.into(),
      config,
      app_center,
      analytics,
    }
  }

  fn should_track(&self, event: &LogEvent) -> bool {
    self
      .config
      .track_only_if_message_starts_with
      .as_deref()
      .is_none_or(|prefix| {
        event
          .message
          .to_lowercase()
          .starts_with(&prefix.to_lowercase())
      })
  }

  fn event_name(&self, event: &LogEvent) -> String {
    let name = self.config.layout.render(event);
    if !name.trim().is_empty() {
      return name;
    }

    event.error.as_ref().map_or_else(
      || Self::FALLBACK_EVENT_NAME.to_string(),
      |error| error.type_name.clone(),
    )
  }
}

impl Target for AnalyticsTarget {
  fn name(&self) -> &str {
    &self.name
  }

  fn initialize(&self) -> Result<(), InitError> {
    start_backend(
      &self.name,
      self.app_center.as_ref(),
      &self.config.backend,
      ServiceType::Analytics,
      || {},
    )?;

    ensure_enabled(
      &self.name,
      ServiceType::Analytics,
      || self.analytics.is_enabled(),
      |enabled| self.analytics.set_enabled(enabled),
    )?;

    apply_identity(&self.name, self.app_center.as_ref(), &self.config.backend)
  }

  fn write(&self, event: &LogEvent) {
    if !self.should_track(event) {
      log::trace!("{}: message does not start with the tracking prefix", self.name);
      return;
    }

    let name = self.event_name(event);
    let properties = self.config.properties.build(&self.name, event);
    self.analytics.track_event(&name, &properties);
  }
}
