// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use appcenter_log::InternalLogger;
use appcenter_log_primitives::{ErrorInfo, LogEvent, LogLevel};

pub mod file_system;

pub fn test_global_init() {
  InternalLogger::initialize(None);

  // Library code logs through the `log` facade. Outside of a `TargetLogger` nothing forwards
  // those records to tracing, so do it here to see them in test output.
  let _ignored = tracing_log::LogTracer::init();
}

/// An error level event carrying an error, as emitted by `log::error!(error = ...; "message")`.
#[must_use]
pub fn error_event(message: &str, error_type: &str, error_message: &str) -> LogEvent {
  LogEvent::new(LogLevel::Error, "test", message).with_error(ErrorInfo::new(error_type, error_message))
}

#[must_use]
pub fn event(level: LogLevel, message: &str) -> LogEvent {
  LogEvent::new(level, "test", message)
}
