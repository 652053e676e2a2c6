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

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

// Limits documented by the telemetry backend. The targets stay under these but only the
// destination enforces them.

/// Maximum length of an analytics event name.
pub const MAX_EVENT_NAME_LENGTH: usize = 256;

/// Maximum number of properties attached to an event or an error.
pub const MAX_PROPERTY_COUNT: usize = 20;

/// Maximum length of a property key or value.
pub const MAX_PROPERTY_LENGTH: usize = 125;

/// Maximum number of attachments per error report.
pub const MAX_ATTACHMENT_COUNT: usize = 10;

/// Maximum size of a single attachment after compression.
pub const MAX_ATTACHMENT_SIZE: usize = 1024 * 1024;

/// The properties sent along with a tracked event or error.
pub type Properties = BTreeMap<String, String>;

//
// LogLevel
//

/// Severity of a log event. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
  Fatal,
}

impl LogLevel {
  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Trace => "Trace",
      Self::Debug => "Debug",
      Self::Info => "Info",
      Self::Warn => "Warn",
      Self::Error => "Error",
      Self::Fatal => "Fatal",
    }
  }
}

impl Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<log::Level> for LogLevel {
  fn from(level: log::Level) -> Self {
    match level {
      log::Level::Error => Self::Error,
      log::Level::Warn => Self::Warn,
      log::Level::Info => Self::Info,
      log::Level::Debug => Self::Debug,
      log::Level::Trace => Self::Trace,
    }
  }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown log level: {0:?}")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
  type Err = ParseLogLevelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "trace" => Ok(Self::Trace),
      "debug" => Ok(Self::Debug),
      "info" => Ok(Self::Info),
      "warn" | "warning" => Ok(Self::Warn),
      "error" => Ok(Self::Error),
      "fatal" | "critical" => Ok(Self::Fatal),
      _ => Err(ParseLogLevelError(s.to_string())),
    }
  }
}

impl TryFrom<String> for LogLevel {
  type Error = ParseLogLevelError;

  fn try_from(value: String) -> Result<Self, ParseLogLevelError> {
    value.parse()
  }
}

//
// ErrorInfo
//

/// An owned description of an error attached to a log event. Errors in Rust can be neither cloned
/// nor inspected for their concrete type once erased, so the relevant parts are captured eagerly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorInfo {
  pub type_name: String,
  pub message: String,
  /// Messages of the chain of underlying causes, outermost first.
  pub sources: Vec<String>,
}

impl ErrorInfo {
  /// Type name used for errors synthesized from a log event that did not carry one.
  pub const LOG_EVENT_ERROR: &'static str = "LogEventError";

  /// Type name used for errors received as `dyn Error`, whose concrete type is unknown.
  pub const DYN_ERROR: &'static str = "Error";

  #[must_use]
  pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      type_name: type_name.into(),
      message: message.into(),
      sources: vec![],
    }
  }

  /// Captures a concrete error along with its source chain.
  #[must_use]
  pub fn from_error<E: std::error::Error + 'static>(error: &E) -> Self {
    let mut info = Self::from_dyn_error(error);
    info.type_name = std::any::type_name::<E>().to_string();
    info
  }

  /// Captures a type-erased error along with its source chain.
  #[must_use]
  pub fn from_dyn_error(error: &(dyn std::error::Error + 'static)) -> Self {
    let mut sources = vec![];
    let mut current = error.source();
    while let Some(source) = current {
      sources.push(source.to_string());
      current = source.source();
    }

    Self {
      type_name: Self::DYN_ERROR.to_string(),
      message: error.to_string(),
      sources,
    }
  }

  /// Wraps the message of a log event that should be reported as an error.
  #[must_use]
  pub fn from_log_event(message: &str) -> Self {
    Self::new(Self::LOG_EVENT_ERROR, message)
  }
}

impl Display for ErrorInfo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}: {}", self.type_name, self.message)?;
    for source in &self.sources {
      write!(f, " ---> {source}")?;
    }
    Ok(())
  }
}

//
// LogEvent
//

/// A single log event handed to the targets. The message is already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
  pub level: LogLevel,
  pub logger: String,
  pub message: String,
  pub error: Option<ErrorInfo>,
  /// Structured properties in the order they were supplied.
  pub properties: Vec<(String, String)>,
}

impl LogEvent {
  #[must_use]
  pub fn new(level: LogLevel, logger: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      level,
      logger: logger.into(),
      message: message.into(),
      error: None,
      properties: vec![],
    }
  }

  /// An event with no content, used to render configuration that does not depend on an event.
  #[must_use]
  pub fn empty() -> Self {
    Self::new(LogLevel::Trace, "", "")
  }

  #[must_use]
  pub fn with_error(mut self, error: ErrorInfo) -> Self {
    self.error = Some(error);
    self
  }

  #[must_use]
  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.properties.push((key.into(), value.into()));
    self
  }

  /// Returns the last value supplied for the given property.
  #[must_use]
  pub fn property(&self, key: &str) -> Option<&str> {
    self
      .properties
      .iter()
      .rev()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  #[must_use]
  pub fn has_properties(&self) -> bool {
    !self.properties.is_empty()
  }
}
