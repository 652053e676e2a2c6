// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./layout_test.rs"]
mod tests;

use crate::error::LayoutError;
use appcenter_log_primitives::LogEvent;
use std::fmt::Display;
use std::str::FromStr;

//
// Renderer
//

#[derive(Debug, Clone, PartialEq, Eq)]
enum Renderer {
  Message,
  Level,
  Logger,
  ErrorType,
  ErrorMessage,
  Error,
  Property(String),
  Environment(String),
}

impl Renderer {
  fn parse(token: &str) -> Result<Self, LayoutError> {
    let mut parts = token.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let options: Vec<(&str, &str)> = parts
      .filter_map(|option| option.split_once('='))
      .map(|(key, value)| (key.trim(), value.trim()))
      .collect();
    let option = |key: &'static str| {
      options
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
    };
    let required = |key: &'static str| {
      option(key)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| LayoutError::MissingOption {
          renderer: name.to_string(),
          option: key,
        })
    };

    match name.to_ascii_lowercase().as_str() {
      "message" => Ok(Self::Message),
      "level" => Ok(Self::Level),
      "logger" => Ok(Self::Logger),
      "exception" | "error" => match option("format").map(str::to_ascii_lowercase).as_deref() {
        Some("type") => Ok(Self::ErrorType),
        Some("message") => Ok(Self::ErrorMessage),
        None | Some("tostring") => Ok(Self::Error),
        Some(_) => Err(LayoutError::UnknownRenderer(token.to_string())),
      },
      "event-properties" | "event-property" => Ok(Self::Property(required("item")?)),
      "environment" => Ok(Self::Environment(required("variable")?)),
      _ => Err(LayoutError::UnknownRenderer(token.to_string())),
    }
  }

  fn render(&self, event: &LogEvent, output: &mut String) {
    match self {
      Self::Message => output.push_str(&event.message),
      Self::Level => output.push_str(event.level.as_str()),
      Self::Logger => output.push_str(&event.logger),
      Self::ErrorType => {
        if let Some(error) = &event.error {
          output.push_str(&error.type_name);
        }
      },
      Self::ErrorMessage => {
        if let Some(error) = &event.error {
          output.push_str(&error.message);
        }
      },
      Self::Error => {
        if let Some(error) = &event.error {
          output.push_str(&error.to_string());
        }
      },
      Self::Property(name) => {
        if let Some(value) = event.property(name) {
          output.push_str(value);
        }
      },
      Self::Environment(variable) => {
        if let Ok(value) = std::env::var(variable) {
          output.push_str(&value);
        }
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
  Literal(String),
  Renderer(Renderer),
}

//
// Layout
//

/// A template rendered against a log event: literal text with `${name}` or
/// `${name:option=value}` tokens in between.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct Layout {
  text: String,
  segments: Vec<Segment>,
}

impl Layout {
  /// A layout that renders to the given text without interpreting any tokens.
  #[must_use]
  pub fn literal(text: impl Into<String>) -> Self {
    let text = text.into();
    Self {
      segments: vec![Segment::Literal(text.clone())],
      text,
    }
  }

  /// The `${message}` layout.
  #[must_use]
  pub fn message() -> Self {
    Self {
      text: "${message}".to_string(),
      segments: vec![Segment::Renderer(Renderer::Message)],
    }
  }

  #[must_use]
  pub fn render(&self, event: &LogEvent) -> String {
    let mut output = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => output.push_str(text),
        Segment::Renderer(renderer) => renderer.render(event, &mut output),
      }
    }
    output
  }
}

impl Default for Layout {
  fn default() -> Self {
    Self::literal("")
  }
}

impl FromStr for Layout {
  type Err = LayoutError;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let mut segments = vec![];
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find("${") {
      if start > 0 {
        segments.push(Segment::Literal(rest[.. start].to_string()));
      }

      let token_start = start + 2;
      let Some(length) = rest[token_start ..].find('}') else {
        return Err(LayoutError::Unterminated(offset + start));
      };

      segments.push(Segment::Renderer(Renderer::parse(
        &rest[token_start .. token_start + length],
      )?));

      let consumed = token_start + length + 1;
      offset += consumed;
      rest = &rest[consumed ..];
    }

    if !rest.is_empty() {
      segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(Self {
      text: text.to_string(),
      segments,
    })
  }
}

impl TryFrom<String> for Layout {
  type Error = LayoutError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl Display for Layout {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.text)
  }
}

/// Renders an optional layout, treating an absent layout as empty.
#[must_use]
pub fn render_optional(layout: Option<&Layout>, event: &LogEvent) -> String {
  layout.map(|layout| layout.render(event)).unwrap_or_default()
}
