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

use appcenter_log_primitives::LogEvent;
use error::InitError;

pub mod backend;
pub mod config;
pub mod error;
pub mod file_system;
pub mod layout;
pub mod lifecycle;
pub mod properties;
pub mod service_type;
pub mod zlib;

//
// Target
//

/// A sink that log events are written to once the logging pipeline has rendered them.
#[mockall::automock]
pub trait Target: Send + Sync {
  /// The configured name of the target, used in diagnostics.
  fn name(&self) -> &str;

  /// Prepares the target and the backend it writes to. Must be called before the first write.
  fn initialize(&self) -> Result<(), InitError>;

  fn write(&self, event: &LogEvent);

  /// Flushes anything buffered by the target.
  fn flush(&self) {}
}
