// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::service_type::ServiceType;

//
// InitError
//

/// Failures while initializing a target. Without a started and enabled backend no further calls
/// can succeed, so these are surfaced to whoever wires up the target.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
  #[error("{target}: failed to start the telemetry backend: {source}")]
  Start {
    target: String,
    #[source]
    source: anyhow::Error,
  },

  #[error("{target}: failed to enable {service}: {source}")]
  Enable {
    target: String,
    service: ServiceType,
    #[source]
    source: anyhow::Error,
  },

  #[error("{target}: failed to set {setting}: {source}")]
  Identity {
    target: String,
    setting: &'static str,
    #[source]
    source: anyhow::Error,
  },
}

//
// LayoutError
//

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
  #[error("unterminated token starting at offset {0}")]
  Unterminated(usize),

  #[error("unknown layout renderer: {0:?}")]
  UnknownRenderer(String),

  #[error("layout renderer {renderer:?} requires option {option:?}")]
  MissingOption {
    renderer: String,
    option: &'static str,
  },
}
