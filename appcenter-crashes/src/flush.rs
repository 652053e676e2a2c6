// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./flush_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

/// Flushes the logging pipeline, waiting at most the given timeout.
pub type Flusher = Arc<dyn Fn(Duration) + Send + Sync>;

/// Flushes the global `log` logger so that file based sinks have written everything before their
/// files are attached.
pub fn flush_global_logger(timeout: Duration) {
  flush_with(timeout, || log::logger().flush());
}

/// Runs `flush` on a helper thread and waits at most `timeout` for it to finish. A flush that
/// does not complete in time is abandoned. Returns whether the flush completed.
pub fn flush_with(timeout: Duration, flush: impl FnOnce() + Send + 'static) -> bool {
  let (tx, rx) = mpsc::channel();
  let spawned = std::thread::Builder::new()
    .name("appcenter-flush".to_string())
    .spawn(move || {
      flush();
      let _ignored = tx.send(());
    });

  if let Err(e) = spawned {
    log::warn!("failed to spawn flush thread: {e}");
    return false;
  }

  if rx.recv_timeout(timeout).is_err() {
    log::debug!("log flush did not complete within {timeout:?}");
    return false;
  }

  true
}

#[must_use]
pub fn default_flusher() -> Flusher {
  Arc::new(flush_global_logger)
}
