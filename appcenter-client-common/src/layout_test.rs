// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use super::Layout;
use crate::error::LayoutError;
use appcenter_log_primitives::{ErrorInfo, LogEvent, LogLevel};
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

fn event() -> LogEvent {
  LogEvent::new(LogLevel::Warn, "app::network", "connection lost")
    .with_property("host", "example.com")
    .with_error(ErrorInfo::new("IoError", "broken pipe"))
}

#[test]
fn literal_text() {
  let layout: Layout = "plain text".parse().unwrap();
  assert_eq!("plain text", layout.render(&event()));
  assert_eq!("plain text", layout.to_string());
}

#[test]
fn mixed_tokens() {
  let layout: Layout = "[${level}] ${logger}: ${message} (${event-properties:item=host})"
    .parse()
    .unwrap();
  assert_eq!(
    "[Warn] app::network: connection lost (example.com)",
    layout.render(&event())
  );
}

#[test]
fn error_formats() {
  let render = |text: &str| text.parse::<Layout>().unwrap().render(&event());

  assert_eq!("IoError", render("${exception:format=type}"));
  assert_eq!("broken pipe", render("${exception:format=message}"));
  assert_eq!("IoError: broken pipe", render("${error}"));
  assert_eq!(
    "",
    "${exception:format=type}"
      .parse::<Layout>()
      .unwrap()
      .render(&LogEvent::empty())
  );
}

#[test]
fn missing_property_renders_empty() {
  let layout: Layout = "x${event-properties:item=missing}y".parse().unwrap();
  assert_eq!("xy", layout.render(&event()));
}

#[test]
fn environment_variable() {
  let layout: Layout = "${environment:variable=APPCENTER_LAYOUT_TEST_UNSET}".parse().unwrap();
  assert_eq!("", layout.render(&event()));

  let layout: Layout = "${environment:variable=PATH}".parse().unwrap();
  assert_eq!(std::env::var("PATH").unwrap_or_default(), layout.render(&event()));
}

#[test]
fn parse_errors() {
  assert_matches!(
    "abc ${message".parse::<Layout>(),
    Err(LayoutError::Unterminated(4))
  );
  assert_matches!(
    "${date}".parse::<Layout>(),
    Err(LayoutError::UnknownRenderer(name)) if name == "date"
  );
  assert_matches!(
    "${event-properties}".parse::<Layout>(),
    Err(LayoutError::MissingOption { option: "item", .. })
  );
}

#[test]
fn message_layout() {
  assert_eq!("connection lost", Layout::message().render(&event()));
  assert_eq!(Layout::message(), "${message}".parse().unwrap());
  assert_eq!("${x}", Layout::literal("${x}").render(&event()));
}

#[test]
fn deserialize() {
  let layout: Layout = serde_yaml::from_str("\"${message}!\"").unwrap();
  assert_eq!("connection lost!", layout.render(&event()));
  assert!(serde_yaml::from_str::<Layout>("\"${nope}\"").is_err());
}
