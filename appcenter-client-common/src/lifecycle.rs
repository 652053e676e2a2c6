// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./lifecycle_test.rs"]
mod tests;

use crate::backend::AppCenter;
use crate::config::BackendConfig;
use crate::error::InitError;
use crate::layout::{Layout, render_optional};
use crate::service_type::ServiceType;
use appcenter_log_primitives::LogEvent;
use itertools::Itertools as _;

/// Starts the backend unless it was already started in this process. `before_start` runs right
/// before the start call, which is the only point where start-time hooks can be registered.
///
/// Returns whether this call started the backend.
pub fn start_backend(
  target: &str,
  app_center: &dyn AppCenter,
  config: &BackendConfig,
  default_service: ServiceType,
  before_start: impl FnOnce(),
) -> Result<bool, InitError> {
  if app_center.configured() {
    return Ok(false);
  }

  let app_secret = render_optional(config.app_secret.as_ref(), &LogEvent::empty());
  if app_secret.is_empty() {
    log::debug!("{target}: app secret is not configured, not starting the backend");
    return Ok(false);
  }

  let services = config.resolve_service_types(default_service);
  before_start();

  log::debug!("{target}: starting service types [{}]", services.iter().join(", "));
  app_center
    .start(&app_secret, &services)
    .map_err(|source| {
      log::error!("{target}: failed to start the backend: {source}");
      InitError::Start {
        target: target.to_string(),
        source,
      }
    })?;

  Ok(true)
}

/// Enables the service if the backend reports it as disabled.
pub fn ensure_enabled(
  target: &str,
  service: ServiceType,
  is_enabled: impl FnOnce() -> anyhow::Result<bool>,
  set_enabled: impl FnOnce(bool) -> anyhow::Result<()>,
) -> Result<(), InitError> {
  let result = is_enabled().and_then(|enabled| {
    if enabled {
      Ok(())
    } else {
      set_enabled(true)
    }
  });

  result.map_err(|source| {
    log::error!("{target}: failed to enable {service}: {source}");
    InitError::Enable {
      target: target.to_string(),
      service,
      source,
    }
  })
}

/// Applies the user id, log URL and country code settings that render to a non-empty value.
pub fn apply_identity(
  target: &str,
  app_center: &dyn AppCenter,
  config: &BackendConfig,
) -> Result<(), InitError> {
  let event = LogEvent::empty();
  let apply = |setting: &'static str,
               layout: Option<&Layout>,
               set: &dyn Fn(&str) -> anyhow::Result<()>| {
    let value = render_optional(layout, &event);
    if value.is_empty() {
      return Ok(());
    }

    set(&value).map_err(|source| InitError::Identity {
      target: target.to_string(),
      setting,
      source,
    })
  };

  apply("user id", config.user_id.as_ref(), &|v| app_center.set_user_id(v))?;
  apply("log url", config.log_url.as_ref(), &|v| app_center.set_log_url(v))?;
  apply("country code", config.country_code.as_ref(), &|v| {
    app_center.set_country_code(v)
  })
}
