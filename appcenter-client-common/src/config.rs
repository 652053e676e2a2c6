// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::layout::Layout;
use crate::service_type::{ServiceType, parse_service_types};
use appcenter_log_primitives::LogEvent;

//
// BackendConfig
//

/// Settings consumed once when a target initializes the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct BackendConfig {
  /// The app secret used to start the backend, e.g. "android={secret};ios={secret}". If no
  /// secret is configured the backend is not started by the target and must be started by the
  /// application before any event is written.
  pub app_secret: Option<Layout>,

  /// Services to start. Takes precedence over `service_types_string`.
  pub service_types: Vec<ServiceType>,

  /// Comma separated service names, e.g. "Analytics, Crashes".
  pub service_types_string: Option<Layout>,

  pub user_id: Option<Layout>,

  /// Base URL (scheme, authority and port) of the backend, e.g. "http://nginx:8080".
  pub log_url: Option<Layout>,

  /// Two letter ISO country code.
  pub country_code: Option<Layout>,
}

impl BackendConfig {
  /// Resolves the services to start, falling back to `default` when none are configured.
  #[must_use]
  pub fn resolve_service_types(&self, default: ServiceType) -> Vec<ServiceType> {
    if !self.service_types.is_empty() {
      return self.service_types.clone();
    }

    let services = self
      .service_types_string
      .as_ref()
      .map(|layout| layout.render(&LogEvent::empty()))
      .unwrap_or_default();
    parse_service_types(&services, default)
  }
}
