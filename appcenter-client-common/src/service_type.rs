// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./service_type_test.rs"]
mod tests;

use std::fmt::Display;

//
// ServiceType
//

/// A backend service that can be started. The backend can only be started once per process, so
/// every service needed during the lifetime of the process must be passed to that single start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ServiceType {
  Analytics,
  Crashes,
}

impl ServiceType {
  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Analytics => "Analytics",
      Self::Crashes => "Crashes",
    }
  }

  // Matches by suffix so that both "Crashes" and fully qualified names such as
  // "Vendor.Sdk.Crashes" resolve.
  fn from_name(name: &str) -> Option<Self> {
    let name = name.to_ascii_lowercase();
    [Self::Analytics, Self::Crashes]
      .into_iter()
      .find(|service| name.ends_with(&service.as_str().to_ascii_lowercase()))
  }
}

impl Display for ServiceType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Resolves a comma separated list of service names. Unknown names are ignored and duplicates are
/// dropped. Falls back to `default` when nothing resolves.
#[must_use]
pub fn parse_service_types(value: &str, default: ServiceType) -> Vec<ServiceType> {
  let mut services = vec![];
  for service in value
    .split(',')
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .filter_map(|name| {
      let service = ServiceType::from_name(name);
      if service.is_none() {
        log::debug!("ignoring unknown service type {name:?}");
      }
      service
    })
  {
    if !services.contains(&service) {
      services.push(service);
    }
  }

  if services.is_empty() {
    services.push(default);
  }

  services
}
