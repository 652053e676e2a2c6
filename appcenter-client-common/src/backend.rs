// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

//! Capabilities of the telemetry backend. The backend SDK is process global and can only be
//! started once; modelling it as traits keeps that lifecycle out of the targets and allows
//! substituting test doubles.

use crate::service_type::ServiceType;
use appcenter_log_primitives::{ErrorInfo, Properties};
use std::sync::Arc;

//
// AttachmentContent
//

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttachmentContent {
  Text(String),
  Binary { data: Vec<u8>, content_type: String },
}

//
// ErrorAttachment
//

/// A named payload attached to an error report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorAttachment {
  pub file_name: String,
  pub content: AttachmentContent,
}

impl ErrorAttachment {
  pub const TEXT_CONTENT_TYPE: &'static str = "text/plain";

  #[must_use]
  pub fn text(text: impl Into<String>, file_name: impl Into<String>) -> Self {
    Self {
      file_name: file_name.into(),
      content: AttachmentContent::Text(text.into()),
    }
  }

  #[must_use]
  pub fn binary(
    data: Vec<u8>,
    file_name: impl Into<String>,
    content_type: impl Into<String>,
  ) -> Self {
    Self {
      file_name: file_name.into(),
      content: AttachmentContent::Binary {
        data,
        content_type: content_type.into(),
      },
    }
  }

  #[must_use]
  pub fn content_type(&self) -> &str {
    match &self.content {
      AttachmentContent::Text(_) => Self::TEXT_CONTENT_TYPE,
      AttachmentContent::Binary { content_type, .. } => content_type,
    }
  }

  /// The raw bytes that will be sent.
  #[must_use]
  pub fn data(&self) -> &[u8] {
    match &self.content {
      AttachmentContent::Text(text) => text.as_bytes(),
      AttachmentContent::Binary { data, .. } => data,
    }
  }

  #[must_use]
  pub const fn is_text(&self) -> bool {
    matches!(self.content, AttachmentContent::Text(_))
  }
}

//
// ErrorReport
//

/// A crash report about to be sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorReport {
  pub id: String,
  pub error: ErrorInfo,
}

pub type ErrorAttachmentsCallback = Arc<dyn Fn(&ErrorReport) -> Vec<ErrorAttachment> + Send + Sync>;

//
// CrashCallbacks
//

/// Hooks the backend consults when it processes a crash report.
#[derive(Clone)]
pub struct CrashCallbacks {
  pub should_process_report: bool,
  pub should_await_user_confirmation: bool,
  pub error_attachments: ErrorAttachmentsCallback,
}

//
// AppCenter
//

/// Process wide lifecycle and identity of the backend.
#[mockall::automock]
pub trait AppCenter: Send + Sync {
  /// Whether the backend has already been started in this process.
  fn configured(&self) -> bool;

  fn start(&self, app_secret: &str, services: &[ServiceType]) -> anyhow::Result<()>;

  fn set_user_id(&self, user_id: &str) -> anyhow::Result<()>;

  /// Sets the base URL (scheme, authority and port) used to reach the backend.
  fn set_log_url(&self, log_url: &str) -> anyhow::Result<()>;

  /// Sets the two letter ISO country code sent to the backend.
  fn set_country_code(&self, country_code: &str) -> anyhow::Result<()>;
}

//
// Analytics
//

#[mockall::automock]
pub trait Analytics: Send + Sync {
  fn is_enabled(&self) -> anyhow::Result<bool>;

  fn set_enabled(&self, enabled: bool) -> anyhow::Result<()>;

  fn track_event(&self, name: &str, properties: &Properties);
}

//
// Crashes
//

#[mockall::automock]
pub trait Crashes: Send + Sync {
  fn is_enabled(&self) -> anyhow::Result<bool>;

  fn set_enabled(&self, enabled: bool) -> anyhow::Result<()>;

  fn set_callbacks(&self, callbacks: CrashCallbacks);

  fn track_error(
    &self,
    error: &ErrorInfo,
    properties: &Properties,
    attachments: Vec<ErrorAttachment>,
  );
}
