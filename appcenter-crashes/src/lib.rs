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

pub mod flush;

use appcenter_attachments::AttachmentCollector;
use appcenter_client_common::Target;
use appcenter_client_common::backend::{AppCenter, CrashCallbacks, Crashes, ErrorAttachment};
use appcenter_client_common::config::BackendConfig;
use appcenter_client_common::error::InitError;
use appcenter_client_common::file_system::{FileSystem, RealFileSystem};
use appcenter_client_common::layout::{Layout, render_optional};
use appcenter_client_common::lifecycle::{apply_identity, ensure_enabled, start_backend};
use appcenter_client_common::properties::PropertyConfig;
use appcenter_client_common::service_type::ServiceType;
use appcenter_log_primitives::{ErrorInfo, LogEvent, LogLevel, MAX_ATTACHMENT_COUNT};
use flush::{Flusher, default_flusher};
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  appcenter_test_helpers::test_global_init();
}

//
// CrashesConfig
//

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct CrashesConfig {
  #[serde(flatten)]
  pub backend: BackendConfig,

  #[serde(flatten)]
  pub properties: PropertyConfig,

  /// Events at or above this level that carry no error are reported as errors carrying the event
  /// message.
  pub wrap_error_from_level: Option<LogLevel>,

  /// Directory whose files are attached to every reported error, searched recursively.
  pub attachments_directory: Option<Layout>,

  /// Glob matched against file names in the attachments directory. Defaults to "*".
  pub attachments_file_pattern: Option<Layout>,

  /// Flush the logging pipeline for at most this long before attaching files. Zero or unset
  /// disables the flush.
  pub flush_timeout_ms: Option<u64>,
}

impl CrashesConfig {
  #[must_use]
  pub fn flush_timeout(&self) -> Option<Duration> {
    self
      .flush_timeout_ms
      .filter(|timeout| *timeout > 0)
      .map(Duration::from_millis)
  }
}

//
// AttachmentSource
//

// Everything needed to gather attachments for an error. Shared with the crash callbacks, which the
// backend may invoke from any thread.
#[derive(Clone)]
struct AttachmentSource {
  target: String,
  collector: AttachmentCollector,
  directory: Option<Layout>,
  pattern: Option<Layout>,
  flush_timeout: Option<Duration>,
  flusher: Flusher,
}

impl AttachmentSource {
  fn collect(&self, event: &LogEvent) -> Vec<ErrorAttachment> {
    let directory = render_optional(self.directory.as_ref(), event);
    if directory.is_empty() {
      return vec![];
    }

    let pattern = render_optional(self.pattern.as_ref(), event);
    let scan = self.collector.scan(&directory, &pattern);
    if scan.is_empty() {
      return vec![];
    }

    // Sinks writing into the attachment directory may still buffer the lines leading up to the
    // error.
    if let Some(timeout) = self.flush_timeout {
      (self.flusher)(timeout);
    }

    if scan.len() > MAX_ATTACHMENT_COUNT {
      log::debug!(
        "{}: {} files matched, attaching the first {MAX_ATTACHMENT_COUNT}",
        self.target,
        scan.len()
      );
    }

    scan
      .into_attachments()
      .take(MAX_ATTACHMENT_COUNT)
      .collect()
  }
}

//
// CrashesTarget
//

/// Reports log events carrying errors as handled errors, with the files of a directory attached.
pub struct CrashesTarget {
  name: String,
  backend: BackendConfig,
  properties: PropertyConfig,
  wrap_error_from_level: Option<LogLevel>,
  attachments: AttachmentSource,
  app_center: Arc<dyn AppCenter>,
  crashes: Arc<dyn Crashes>,
}

impl CrashesTarget {
  /// The logger of the event attachments are rendered against when the backend asks for the
  /// attachments of a crash report.
  pub const CALLBACK_LOGGER: &'static str = "CrashesTarget";
  pub const CALLBACK_MESSAGE: &'static str = "GetErrorAttachments";

  #[must_use]
  pub fn new(
    name: impl Into<String>,
    config: CrashesConfig,
    app_center: Arc<dyn AppCenter>,
    crashes: Arc<dyn Crashes>,
  ) -> Self {
    let name = name.into();
    let flush_timeout = config.flush_timeout();
    Self {
      attachments: AttachmentSource {
        target: name.clone(),
        collector: AttachmentCollector::new(Arc::new(RealFileSystem)),
        directory: config.attachments_directory,
        pattern: config.attachments_file_pattern,
        flush_timeout,
        flusher: default_flusher(),
      },
      name,
      backend: config.backend,
      properties: config.properties,
      wrap_error_from_level: config.wrap_error_from_level,
      app_center,
      crashes,
    }
  }

  #[must_use]
  pub fn with_file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
    self.attachments.collector = AttachmentCollector::new(file_system);
    self
  }

  #[must_use]
  pub fn with_flusher(mut self, flusher: Flusher) -> Self {
    self.attachments.flusher = flusher;
    self
  }

  fn crash_callbacks(&self) -> CrashCallbacks {
    let attachments = self.attachments.clone();
    CrashCallbacks {
      should_process_report: true,
      should_await_user_confirmation: false,
      error_attachments: Arc::new(move |_report| {
        attachments.collect(&LogEvent::new(
          LogLevel::Error,
          Self::CALLBACK_LOGGER,
          Self::CALLBACK_MESSAGE,
        ))
      }),
    }
  }

  fn track_error(&self, event: &LogEvent, error: &ErrorInfo) {
    let attachments = self.attachments.collect(event);
    let properties = self.properties.build(&self.name, event);
    self.crashes.track_error(error, &properties, attachments);
  }
}

impl Target for CrashesTarget {
  fn name(&self) -> &str {
    &self.name
  }

  fn initialize(&self) -> Result<(), InitError> {
    start_backend(
      &self.name,
      self.app_center.as_ref(),
      &self.backend,
      ServiceType::Crashes,
      || self.crashes.set_callbacks(self.crash_callbacks()),
    )?;

    ensure_enabled(
      &self.name,
      ServiceType::Crashes,
      || self.crashes.is_enabled(),
      |enabled| self.crashes.set_enabled(enabled),
    )?;

    apply_identity(&self.name, self.app_center.as_ref(), &self.backend)
  }

  fn write(&self, event: &LogEvent) {
    if let Some(error) = &event.error {
      self.track_error(event, error);
    } else if self
      .wrap_error_from_level
      .is_some_and(|level| event.level >= level)
    {
      self.track_error(event, &ErrorInfo::from_log_event(&event.message));
    }
  }
}
