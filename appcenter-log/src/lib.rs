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

pub mod target_logger;

pub use target_logger::{TargetLogger, TargetLoggerBuilder};

use parking_lot::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle as ReloadHandle;
use tracing_subscriber::{EnvFilter, Registry};

const DEFAULT_FILTER_RULES: &str = "info";

//
// InternalLogger
//

// Diagnostics emitted by the targets themselves. These go to stderr through tracing rather than
// through the `log` facade, which is owned by the `TargetLogger` once installed.
pub struct InternalLogger {
  handle: Mutex<Option<ReloadHandle<EnvFilter, Registry>>>,
}

impl InternalLogger {
  const fn new() -> Self {
    Self {
      handle: parking_lot::const_mutex(None),
    }
  }

  // Get the static instance of the logger.
  fn get() -> &'static Self {
    static LOGGER: InternalLogger = InternalLogger::new();

    &LOGGER
  }

  // Initialize the internal logger with the provided filter, falling back to RUST_LOG. Only the
  // first call has an effect.
  pub fn initialize(filter: Option<&str>) {
    // Gate ANSI on whether APPCENTER_LOG_ANSI is set. Log output usually ends up in a device log
    // where escape sequences are noise.
    let stderr = tracing_subscriber::fmt::layer()
      .with_writer(std::io::stderr)
      .with_ansi(std::env::var("APPCENTER_LOG_ANSI").is_ok())
      .with_line_number(true)
      .with_thread_ids(true)
      .compact();

    let filter = EnvFilter::new(filter.map_or_else(
      || std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER_RULES.to_string()),
      ToString::to_string,
    ));

    let (filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let mut handle = Self::get().handle.lock();
    if handle.is_some() {
      return;
    }

    if tracing::subscriber::set_global_default(Registry::default().with(filter).with(stderr))
      .is_err()
    {
      return;
    }

    *handle = Some(reload_handle);
  }

  // Swap in a new filter, e.g. "debug" or "appcenter_crashes=trace".
  pub fn swap(new_filter: &str) -> anyhow::Result<()> {
    let handle = Self::get().handle.lock();
    let Some(handle) = handle.as_ref() else {
      anyhow::bail!("internal logger is not initialized");
    };

    handle.reload(EnvFilter::new(new_filter))?;
    Ok(())
  }
}
