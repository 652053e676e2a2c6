// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./target_logger_test.rs"]
mod tests;

use appcenter_client_common::Target;
use appcenter_client_common::error::InitError;
use appcenter_log_primitives::{ErrorInfo, LogEvent, LogLevel};
use log::kv::{Key, Value, VisitSource};
use log::{LevelFilter, Log, Metadata, Record};
use std::sync::Arc;

// Records from this family of crates are diagnostics about the targets themselves. Writing them
// to the targets would recurse.
const INTERNAL_TARGET_PREFIX: &str = "appcenter_";

fn is_internal(target: &str) -> bool {
  target.starts_with(INTERNAL_TARGET_PREFIX)
}

//
// PropertyVisitor
//

// Collects the key/values of a record. The first value holding an error becomes the event's error,
// everything else is kept as a property in the order it was supplied.
struct PropertyVisitor<'a> {
  properties: &'a mut Vec<(String, String)>,
  error: &'a mut Option<ErrorInfo>,
}

impl<'kvs> VisitSource<'kvs> for PropertyVisitor<'_> {
  fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), log::kv::Error> {
    if self.error.is_none()
      && let Some(error) = value.to_borrowed_error()
    {
      *self.error = Some(ErrorInfo::from_dyn_error(error));
      return Ok(());
    }

    self
      .properties
      .push((key.as_str().to_string(), value.to_string()));
    Ok(())
  }
}

fn event_from_record(record: &Record<'_>) -> LogEvent {
  let mut properties = vec![];
  let mut error = None;
  let mut visitor = PropertyVisitor {
    properties: &mut properties,
    error: &mut error,
  };
  if let Err(e) = record.key_values().visit(&mut visitor) {
    log::debug!("failed to read key/values of record: {e}");
  }

  LogEvent {
    level: LogLevel::from(record.level()),
    logger: record.target().to_string(),
    message: record.args().to_string(),
    error,
    properties,
  }
}

//
// TargetLoggerBuilder
//

#[derive(Default)]
pub struct TargetLoggerBuilder {
  targets: Vec<Arc<dyn Target>>,
  min_level: Option<LevelFilter>,
  internal_level: Option<LevelFilter>,
}

impl TargetLoggerBuilder {
  #[must_use]
  pub fn target(mut self, target: Arc<dyn Target>) -> Self {
    self.targets.push(target);
    self
  }

  /// The minimum level of records written to the targets. Defaults to info.
  #[must_use]
  pub const fn min_level(mut self, level: LevelFilter) -> Self {
    self.min_level = Some(level);
    self
  }

  /// The minimum level of internal diagnostics forwarded to tracing. Defaults to info.
  #[must_use]
  pub const fn internal_level(mut self, level: LevelFilter) -> Self {
    self.internal_level = Some(level);
    self
  }

  /// Initializes every target in order. The first failure is returned and the remaining targets
  /// are left uninitialized.
  pub fn build(self) -> Result<TargetLogger, InitError> {
    for target in &self.targets {
      target.initialize()?;
      log::debug!("initialized target {:?}", target.name());
    }

    Ok(TargetLogger {
      targets: self.targets,
      min_level: self.min_level.unwrap_or(LevelFilter::Info),
      internal_level: self.internal_level.unwrap_or(LevelFilter::Info),
    })
  }
}

//
// TargetLogger
//

/// Bridges the `log` facade to a set of initialized targets.
pub struct TargetLogger {
  targets: Vec<Arc<dyn Target>>,
  min_level: LevelFilter,
  internal_level: LevelFilter,
}

impl TargetLogger {
  #[must_use]
  pub fn builder() -> TargetLoggerBuilder {
    TargetLoggerBuilder::default()
  }

  /// Writes an event to every target.
  pub fn dispatch(&self, event: &LogEvent) {
    for target in &self.targets {
      target.write(event);
    }
  }

  /// Registers the logger as the global `log` logger.
  pub fn install(self) -> Result<(), log::SetLoggerError> {
    let max_level = self.min_level.max(self.internal_level);
    log::set_boxed_logger(Box::new(self))?;
    log::set_max_level(max_level);
    Ok(())
  }
}

impl Log for TargetLogger {
  fn enabled(&self, metadata: &Metadata<'_>) -> bool {
    if is_internal(metadata.target()) {
      metadata.level() <= self.internal_level
    } else {
      metadata.level() <= self.min_level
    }
  }

  fn log(&self, record: &Record<'_>) {
    if !self.enabled(record.metadata()) {
      return;
    }

    if is_internal(record.target()) {
      let _ignored = tracing_log::format_trace(record);
      return;
    }

    self.dispatch(&event_from_record(record));
  }

  fn flush(&self) {
    for target in &self.targets {
      target.flush();
    }
  }
}
