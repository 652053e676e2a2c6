// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use anyhow::Context as _;
use appcenter_analytics::AnalyticsConfig;
use appcenter_crashes::CrashesConfig;
use appcenter_log_primitives::LogLevel;
use std::path::Path;

//
// TargetsConfig
//

/// The targets to write events to, e.g.
///
/// ```yaml
/// min_level: info
/// crashes:
///   app_secret: "ios=..."
///   service_types: [Analytics, Crashes]
///   wrap_error_from_level: error
///   attachments_directory: /var/log/app
/// analytics:
///   track_only_if_message_starts_with: "[Track]"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
  /// Events below this level are not written to any target.
  pub min_level: Option<LogLevel>,
  pub analytics: Option<AnalyticsConfig>,
  pub crashes: Option<CrashesConfig>,
}

impl TargetsConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let contents =
      std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Self::parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
  }

  pub fn parse(contents: &str) -> anyhow::Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }
}
