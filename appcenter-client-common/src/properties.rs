// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./properties_test.rs"]
mod tests;

use crate::layout::Layout;
use appcenter_log_primitives::{LogEvent, MAX_PROPERTY_COUNT, Properties};

//
// ContextProperty
//

/// A named property rendered from a layout for every event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ContextProperty {
  pub name: String,
  pub layout: Layout,
  #[serde(default)]
  pub include_empty_value: bool,
}

impl ContextProperty {
  #[must_use]
  pub fn new(name: impl Into<String>, layout: Layout) -> Self {
    Self {
      name: name.into(),
      layout,
      include_empty_value: false,
    }
  }
}

//
// PropertySelection
//

/// Which properties are sent for a particular event.
#[derive(Debug, PartialEq, Eq)]
pub enum PropertySelection<'a> {
  /// Everything the event carries, plus the context properties.
  AllProperties,
  /// Only the explicitly configured context properties.
  Configured(&'a [ContextProperty]),
  Empty,
}

//
// PropertyConfig
//

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
  pub include_event_properties: bool,
  pub context_properties: Vec<ContextProperty>,
}

impl Default for PropertyConfig {
  fn default() -> Self {
    Self {
      include_event_properties: true,
      context_properties: vec![],
    }
  }
}

impl PropertyConfig {
  #[must_use]
  pub fn select(&self, event: &LogEvent) -> PropertySelection<'_> {
    if self.include_event_properties && event.has_properties() {
      PropertySelection::AllProperties
    } else if !self.context_properties.is_empty() {
      PropertySelection::Configured(&self.context_properties)
    } else {
      PropertySelection::Empty
    }
  }

  /// Builds the properties sent along with the event. The backend accepts a bounded number of
  /// properties and silently truncates the rest, so oversized bags are only flagged here.
  #[must_use]
  pub fn build(&self, target: &str, event: &LogEvent) -> Properties {
    let properties = match self.select(event) {
      PropertySelection::AllProperties => {
        let mut properties: Properties = event.properties.iter().cloned().collect();
        for property in &self.context_properties {
          if property.name.is_empty() || properties.contains_key(&property.name) {
            continue;
          }

          let value = property.layout.render(event);
          if value.is_empty() && !property.include_empty_value {
            continue;
          }

          properties.insert(property.name.clone(), value);
        }
        properties
      },
      PropertySelection::Configured(context_properties) => {
        render_context_properties(context_properties, event)
      },
      PropertySelection::Empty => Properties::new(),
    };

    if properties.len() > MAX_PROPERTY_COUNT {
      log::warn!(
        "{target}: event has {} properties, only {MAX_PROPERTY_COUNT} will be kept by the backend",
        properties.len()
      );
    }

    properties
  }
}

// Keys are case insensitive: a later property replaces an earlier one whose key only differs in
// case.
fn render_context_properties(context_properties: &[ContextProperty], event: &LogEvent) -> Properties {
  let mut properties = Properties::new();
  for property in context_properties {
    if property.name.is_empty() {
      continue;
    }

    let value = property.layout.render(event);
    if value.is_empty() && !property.include_empty_value {
      continue;
    }

    properties.retain(|key, _| !key.eq_ignore_ascii_case(&property.name));
    properties.insert(property.name.clone(), value);
  }
  properties
}
