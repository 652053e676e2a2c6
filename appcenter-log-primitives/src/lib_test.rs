// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::{ErrorInfo, LogEvent, LogLevel};
use pretty_assertions::assert_eq;

#[derive(thiserror::Error, Debug)]
#[error("outer failure")]
struct OuterError {
  #[source]
  inner: std::io::Error,
}

#[test]
fn level_ordering() {
  assert!(LogLevel::Trace < LogLevel::Debug);
  assert!(LogLevel::Warn < LogLevel::Error);
  assert!(LogLevel::Error < LogLevel::Fatal);
  assert_eq!(LogLevel::Warn, log::Level::Warn.into());
}

#[test]
fn level_parsing() {
  assert_eq!(Ok(LogLevel::Warn), "Warning".parse());
  assert_eq!(Ok(LogLevel::Error), " error ".parse());
  assert_eq!(Ok(LogLevel::Fatal), "FATAL".parse());
  assert!("loud".parse::<LogLevel>().is_err());
  assert_eq!(Ok(LogLevel::Debug), LogLevel::try_from("debug".to_string()));
  assert!(LogLevel::try_from(String::new()).is_err());

  let level: LogLevel = serde_yaml::from_str("Info").unwrap();
  assert_eq!(LogLevel::Info, level);
}

#[test]
fn error_info_captures_source_chain() {
  let error = OuterError {
    inner: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
  };

  let info = ErrorInfo::from_error(&error);
  assert!(info.type_name.ends_with("OuterError"));
  assert_eq!("outer failure", info.message);
  assert_eq!(vec!["access denied".to_string()], info.sources);
  assert!(info.to_string().ends_with("outer failure ---> access denied"));

  let info = ErrorInfo::from_dyn_error(&error);
  assert_eq!(ErrorInfo::DYN_ERROR, info.type_name);
}

#[test]
fn property_lookup_prefers_last_value() {
  let event = LogEvent::new(LogLevel::Info, "test", "hello")
    .with_property("a", "1")
    .with_property("a", "2");

  assert!(event.has_properties());
  assert_eq!(Some("2"), event.property("a"));
  assert_eq!(None, event.property("b"));
  assert!(!LogEvent::empty().has_properties());
}
