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

//! An in-process backend which records what it is asked to send instead of sending it. Limits
//! are enforced the way the hosted backend enforces them, so the recordings show what would
//! actually arrive.

#[cfg(test)]
#[path = "./lib_test.rs"]
mod tests;

mod limits;

use appcenter_client_common::backend::{
  Analytics,
  AppCenter,
  CrashCallbacks,
  Crashes,
  ErrorAttachment,
  ErrorReport,
};
use appcenter_client_common::service_type::ServiceType;
use appcenter_log_primitives::{ErrorInfo, Properties};
use limits::{limit_attachments, limit_event_name, limit_properties};
use parking_lot::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  appcenter_test_helpers::test_global_init();
}

//
// LocalBackendError
//

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LocalBackendError {
  #[error("the backend has already been configured")]
  AlreadyConfigured,

  #[error("an app secret is required to start the backend")]
  MissingAppSecret,

  #[error("{0} has not been started")]
  NotStarted(ServiceType),
}

//
// Recordings
//

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackedEvent {
  pub name: String,
  pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TrackedError {
  pub id: Uuid,
  #[serde(with = "time::serde::rfc3339")]
  pub timestamp: OffsetDateTime,
  pub error: ErrorInfo,
  pub properties: Properties,
  pub attachments: Vec<ErrorAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CrashRecord {
  pub report: ErrorReport,
  #[serde(with = "time::serde::rfc3339")]
  pub timestamp: OffsetDateTime,
  /// Whether the crash callbacks allowed the report to be processed.
  pub processed: bool,
  pub attachments: Vec<ErrorAttachment>,
}

/// Everything the backend has been asked to do so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Recordings {
  pub services: Vec<ServiceType>,
  pub user_id: Option<String>,
  pub log_url: Option<String>,
  pub country_code: Option<String>,
  pub events: Vec<TrackedEvent>,
  pub errors: Vec<TrackedError>,
  pub crashes: Vec<CrashRecord>,
}

//
// State
//

#[derive(Default)]
struct State {
  configured: bool,
  analytics_enabled: bool,
  crashes_enabled: bool,
  callbacks: Option<CrashCallbacks>,
  recordings: Recordings,
}

impl State {
  fn is_started(&self, service: ServiceType) -> bool {
    self.recordings.services.contains(&service)
  }

  fn is_enabled(&self, service: ServiceType) -> bool {
    self.is_started(service)
      && match service {
        ServiceType::Analytics => self.analytics_enabled,
        ServiceType::Crashes => self.crashes_enabled,
      }
  }

  fn set_enabled(&mut self, service: ServiceType, enabled: bool) -> Result<(), LocalBackendError> {
    if !self.is_started(service) {
      return Err(LocalBackendError::NotStarted(service));
    }

    match service {
      ServiceType::Analytics => self.analytics_enabled = enabled,
      ServiceType::Crashes => self.crashes_enabled = enabled,
    }
    Ok(())
  }
}

//
// LocalBackend
//

#[derive(Default)]
pub struct LocalBackend {
  state: Mutex<State>,
}

impl LocalBackend {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn recordings(&self) -> Recordings {
    self.state.lock().recordings.clone()
  }

  /// Simulates a crash reported on the next launch, running the installed crash callbacks.
  /// Returns the id of the report, or `None` if crash reporting is not active.
  pub fn simulate_crash(&self, error: ErrorInfo) -> Option<String> {
    let callbacks = {
      let state = self.state.lock();
      if !state.is_enabled(ServiceType::Crashes) {
        log::debug!("crash dropped, {} is not active", ServiceType::Crashes);
        return None;
      }
      state.callbacks.clone()
    };

    let report = ErrorReport {
      id: Uuid::new_v4().to_string(),
      error,
    };

    // The callbacks read files, so they run without holding the lock.
    let (processed, attachments) = match callbacks {
      Some(callbacks) if !callbacks.should_process_report => (false, vec![]),
      Some(callbacks) => (
        true,
        limit_attachments((callbacks.error_attachments)(&report)),
      ),
      None => (true, vec![]),
    };

    let id = report.id.clone();
    self.state.lock().recordings.crashes.push(CrashRecord {
      report,
      timestamp: OffsetDateTime::now_utc(),
      processed,
      attachments,
    });
    Some(id)
  }
}

impl AppCenter for LocalBackend {
  fn configured(&self) -> bool {
    self.state.lock().configured
  }

  fn start(&self, app_secret: &str, services: &[ServiceType]) -> anyhow::Result<()> {
    let mut state = self.state.lock();
    if state.configured {
      return Err(LocalBackendError::AlreadyConfigured.into());
    }
    if app_secret.trim().is_empty() {
      return Err(LocalBackendError::MissingAppSecret.into());
    }

    for service in services {
      if !state.recordings.services.contains(service) {
        state.recordings.services.push(*service);
      }
    }
    state.configured = true;
    state.analytics_enabled = true;
    state.crashes_enabled = true;
    log::debug!("local backend started with {:?}", state.recordings.services);
    Ok(())
  }

  fn set_user_id(&self, user_id: &str) -> anyhow::Result<()> {
    self.state.lock().recordings.user_id = Some(user_id.to_string());
    Ok(())
  }

  fn set_log_url(&self, log_url: &str) -> anyhow::Result<()> {
    self.state.lock().recordings.log_url = Some(log_url.to_string());
    Ok(())
  }

  fn set_country_code(&self, country_code: &str) -> anyhow::Result<()> {
    self.state.lock().recordings.country_code = Some(country_code.to_string());
    Ok(())
  }
}

impl Analytics for LocalBackend {
  fn is_enabled(&self) -> anyhow::Result<bool> {
    Ok(self.state.lock().is_enabled(ServiceType::Analytics))
  }

  fn set_enabled(&self, enabled: bool) -> anyhow::Result<()> {
    self
      .state
      .lock()
      .set_enabled(ServiceType::Analytics, enabled)?;
    Ok(())
  }

  fn track_event(&self, name: &str, properties: &Properties) {
    let mut state = self.state.lock();
    if !state.is_enabled(ServiceType::Analytics) {
      log::debug!("event {name:?} dropped, {} is not active", ServiceType::Analytics);
      return;
    }

    let Some(name) = limit_event_name(name) else {
      return;
    };
    let properties = limit_properties(properties);
    state
      .recordings
      .events
      .push(TrackedEvent { name, properties });
  }
}

impl Crashes for LocalBackend {
  fn is_enabled(&self) -> anyhow::Result<bool> {
    Ok(self.state.lock().is_enabled(ServiceType::Crashes))
  }

  fn set_enabled(&self, enabled: bool) -> anyhow::Result<()> {
    self
      .state
      .lock()
      .set_enabled(ServiceType::Crashes, enabled)?;
    Ok(())
  }

  fn set_callbacks(&self, callbacks: CrashCallbacks) {
    self.state.lock().callbacks = Some(callbacks);
  }

  fn track_error(
    &self,
    error: &ErrorInfo,
    properties: &Properties,
    attachments: Vec<ErrorAttachment>,
  ) {
    if !self.state.lock().is_enabled(ServiceType::Crashes) {
      log::debug!("error {error} dropped, {} is not active", ServiceType::Crashes);
      return;
    }

    // Compressing attachments can take a while, don't hold the lock for it.
    let attachments = limit_attachments(attachments);
    let tracked = TrackedError {
      id: Uuid::new_v4(),
      timestamp: OffsetDateTime::now_utc(),
      error: error.clone(),
      properties: limit_properties(properties),
      attachments,
    };
    self.state.lock().recordings.errors.push(tracked);
  }
}
