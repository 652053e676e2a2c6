// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./commands_test.rs"]
mod tests;

use crate::config::TargetsConfig;
use appcenter_analytics::AnalyticsTarget;
use appcenter_attachments::AttachmentCollector;
use appcenter_client_common::backend::{AttachmentContent, ErrorAttachment};
use appcenter_client_common::file_system::RealFileSystem;
use appcenter_crashes::CrashesTarget;
use appcenter_local_backend::{LocalBackend, Recordings};
use appcenter_log::TargetLogger;
use appcenter_log_primitives::{ErrorInfo, LogEvent};
use std::sync::Arc;

//
// AttachmentSummary
//

#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct AttachmentSummary {
  pub name: String,
  pub kind: &'static str,
  pub content_type: String,
  pub size: usize,
}

impl From<&ErrorAttachment> for AttachmentSummary {
  fn from(attachment: &ErrorAttachment) -> Self {
    Self {
      name: attachment.file_name.clone(),
      kind: match attachment.content {
        AttachmentContent::Text(_) => "text",
        AttachmentContent::Binary { .. } => "binary",
      },
      content_type: attachment.content_type().to_string(),
      size: attachment.data().len(),
    }
  }
}

/// Collects every file of the directory matching the pattern.
#[must_use]
pub fn collect(directory: &str, pattern: &str) -> Vec<AttachmentSummary> {
  AttachmentCollector::new(Arc::new(RealFileSystem))
    .collect(directory, pattern)
    .map(|attachment| AttachmentSummary::from(&attachment))
    .collect()
}

//
// Emit
//

/// What to write through the configured targets.
pub struct Emit {
  pub event: LogEvent,
  pub simulate_crash: Option<String>,
}

impl Emit {
  #[must_use]
  pub fn new(event: LogEvent) -> Self {
    Self {
      event,
      simulate_crash: None,
    }
  }

  /// Initializes the configured targets over a fresh local backend, writes the event and returns
  /// what the backend recorded.
  pub fn run(self, config: &TargetsConfig) -> anyhow::Result<Recordings> {
    let backend = Arc::new(LocalBackend::new());

    // The crashes target goes first so that it is the one starting the backend and installing the
    // crash callbacks.
    let mut builder = TargetLogger::builder();
    if let Some(crashes) = &config.crashes {
      builder = builder.target(Arc::new(CrashesTarget::new(
        "crashes",
        crashes.clone(),
        backend.clone(),
        backend.clone(),
      )));
    }
    if let Some(analytics) = &config.analytics {
      builder = builder.target(Arc::new(AnalyticsTarget::new(
        "analytics",
        analytics.clone(),
        backend.clone(),
        backend.clone(),
      )));
    }
    let logger = builder.build()?;

    if config
      .min_level
      .is_none_or(|min_level| self.event.level >= min_level)
    {
      logger.dispatch(&self.event);
    } else {
      log::debug!("{} event below the minimum level", self.event.level);
    }
    log::Log::flush(&logger);

    if let Some(message) = self.simulate_crash {
      backend.simulate_crash(ErrorInfo::new(ErrorInfo::DYN_ERROR, message));
    }

    Ok(backend.recordings())
  }
}
