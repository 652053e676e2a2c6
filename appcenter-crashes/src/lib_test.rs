// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use super::{CrashesConfig, CrashesTarget};
use appcenter_client_common::Target;
use appcenter_client_common::backend::{
  CrashCallbacks,
  ErrorAttachment,
  ErrorReport,
  MockAppCenter,
  MockCrashes,
};
use appcenter_client_common::config::BackendConfig;
use appcenter_client_common::layout::Layout;
use appcenter_client_common::properties::ContextProperty;
use appcenter_client_common::service_type::ServiceType;
use appcenter_log_primitives::{ErrorInfo, LogLevel, Properties};
use appcenter_test_helpers::file_system::TestFileSystem;
use appcenter_test_helpers::{error_event, event};
use mockall::predicate::eq;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedError {
  error: ErrorInfo,
  properties: Properties,
  attachments: Vec<ErrorAttachment>,
}

//
// Setup
//

struct Setup {
  file_system: Arc<TestFileSystem>,
  tracked: Arc<Mutex<Vec<TrackedError>>>,
  flushes: Arc<Mutex<Vec<Duration>>>,
}

impl Setup {
  fn new() -> Self {
    Self {
      file_system: Arc::new(TestFileSystem::new()),
      tracked: Arc::default(),
      flushes: Arc::default(),
    }
  }

  fn config(&self) -> CrashesConfig {
    CrashesConfig {
      attachments_directory: Some(Layout::literal(self.file_system.path_str())),
      ..Default::default()
    }
  }

  fn target(&self, config: CrashesConfig) -> CrashesTarget {
    let mut app_center = MockAppCenter::new();
    app_center.expect_configured().return_const(true);

    let mut crashes = MockCrashes::new();
    crashes.expect_is_enabled().returning(|| Ok(true));
    crashes.expect_set_callbacks().never();
    let tracked = self.tracked.clone();
    crashes
      .expect_track_error()
      .returning(move |error, properties, attachments| {
        tracked.lock().push(TrackedError {
          error: error.clone(),
          properties: properties.clone(),
          attachments,
        });
      });

    let flushes = self.flushes.clone();
    let target = CrashesTarget::new("crashes", config, Arc::new(app_center), Arc::new(crashes))
      .with_file_system(self.file_system.clone())
      .with_flusher(Arc::new(move |timeout| flushes.lock().push(timeout)));
    target.initialize().unwrap();
    target
  }

  fn tracked(&self) -> Vec<TrackedError> {
    self.tracked.lock().clone()
  }
}

#[test]
fn tracks_error_without_properties() {
  let mut app_center = MockAppCenter::new();
  app_center.expect_configured().times(1).return_const(false);
  app_center.expect_start().never();

  let mut crashes = MockCrashes::new();
  crashes.expect_is_enabled().times(1).returning(|| Ok(false));
  crashes
    .expect_set_enabled()
    .with(eq(true))
    .times(1)
    .returning(|_| Ok(()));
  crashes.expect_set_callbacks().never();
  crashes
    .expect_track_error()
    .withf(|error, properties, attachments| {
      *error == ErrorInfo::new("InvalidOperation", "Test exception message")
        && properties.is_empty()
        && attachments.is_empty()
    })
    .times(1)
    .return_const(());

  let target = CrashesTarget::new(
    "crashes",
    CrashesConfig::default(),
    Arc::new(app_center),
    Arc::new(crashes),
  );
  target.initialize().unwrap();
  target.write(&error_event(
    "Test message",
    "InvalidOperation",
    "Test exception message",
  ));
}

#[test]
fn tracks_error_with_context_properties() {
  let setup = Setup::new();
  let mut config = CrashesConfig::default();
  config.properties.context_properties = vec![
    ContextProperty::new("error.Type", "${exception:format=type}".parse().unwrap()),
    ContextProperty::new("error.Message", "${exception:format=message}".parse().unwrap()),
  ];
  let target = setup.target(config);

  target.write(&error_event(
    "Test message",
    "InvalidOperation",
    "Test exception message",
  ));

  assert_eq!(
    vec![TrackedError {
      error: ErrorInfo::new("InvalidOperation", "Test exception message"),
      properties: Properties::from([
        ("error.Message".to_string(), "Test exception message".to_string()),
        ("error.Type".to_string(), "InvalidOperation".to_string()),
      ]),
      attachments: vec![],
    }],
    setup.tracked()
  );
}

#[test]
fn events_without_error_are_ignored_by_default() {
  let setup = Setup::new();
  let target = setup.target(CrashesConfig::default());

  target.write(&event(LogLevel::Fatal, "shutting down"));

  assert!(setup.tracked().is_empty());
}

#[test]
fn wraps_events_at_or_above_level() {
  let setup = Setup::new();
  let target = setup.target(CrashesConfig {
    wrap_error_from_level: Some(LogLevel::Warn),
    ..Default::default()
  });

  target.write(&event(LogLevel::Info, "info"));
  target.write(&event(LogLevel::Warn, "warn"));
  target.write(&event(LogLevel::Error, "error"));
  target.write(&error_event("with error", "IoError", "broken pipe"));

  let errors: Vec<_> = setup
    .tracked()
    .into_iter()
    .map(|tracked| tracked.error)
    .collect();
  assert_eq!(
    vec![
      ErrorInfo::new(ErrorInfo::LOG_EVENT_ERROR, "warn"),
      ErrorInfo::new(ErrorInfo::LOG_EVENT_ERROR, "error"),
      ErrorInfo::new("IoError", "broken pipe"),
    ],
    errors
  );
}

#[test]
fn attaches_at_most_ten_files() {
  let setup = Setup::new();
  for i in 0 .. 12 {
    setup.file_system.write(format!("{i:02}.log"), format!("line {i}"));
  }
  let target = setup.target(setup.config());

  target.write(&error_event("failed", "IoError", "broken pipe"));

  let tracked = setup.tracked();
  assert_eq!(1, tracked.len());
  let names: Vec<_> = tracked[0]
    .attachments
    .iter()
    .map(|attachment| attachment.file_name.clone())
    .collect();
  assert_eq!(
    (0 .. 10).map(|i| format!("{i:02}.log")).collect::<Vec<_>>(),
    names
  );
  assert_eq!(10, setup.file_system.reads().len());
}

#[test]
fn attachment_pattern_is_rendered_with_the_event() {
  let setup = Setup::new();
  setup.file_system.write("app.log", "app");
  setup.file_system.write("sync.log", "sync");
  let target = setup.target(CrashesConfig {
    attachments_file_pattern: Some("${logger}.log".parse().unwrap()),
    ..setup.config()
  });

  let mut failed = error_event("failed", "IoError", "broken pipe");
  failed.logger = "sync".to_string();
  target.write(&failed);

  assert_eq!(
    vec![ErrorAttachment::text("sync", "sync.log")],
    setup.tracked()[0].attachments
  );
}

#[test]
fn flushes_only_when_files_exist() {
  let setup = Setup::new();
  let target = setup.target(CrashesConfig {
    flush_timeout_ms: Some(250),
    ..setup.config()
  });

  target.write(&error_event("failed", "IoError", "broken pipe"));
  assert!(setup.flushes.lock().is_empty());

  setup.file_system.write("app.log", "app");
  target.write(&error_event("failed", "IoError", "broken pipe"));
  assert_eq!(vec![Duration::from_millis(250)], *setup.flushes.lock());
}

#[test]
fn zero_timeout_disables_flush() {
  let setup = Setup::new();
  setup.file_system.write("app.log", "app");
  let target = setup.target(CrashesConfig {
    flush_timeout_ms: Some(0),
    ..setup.config()
  });

  target.write(&error_event("failed", "IoError", "broken pipe"));

  assert!(setup.flushes.lock().is_empty());
  assert_eq!(1, setup.tracked()[0].attachments.len());
}

#[test]
fn installs_crash_callbacks_when_starting() {
  let setup = Setup::new();
  setup.file_system.write("CrashesTarget.log", "crash context");
  setup.file_system.write("other.log", "other");

  let mut app_center = MockAppCenter::new();
  app_center.expect_configured().return_const(false);
  app_center
    .expect_start()
    .withf(|secret, services| {
      secret == "secret" && services == [ServiceType::Crashes]
    })
    .times(1)
    .returning(|_, _| Ok(()));

  let callbacks: Arc<Mutex<Option<CrashCallbacks>>> = Arc::default();
  let mut crashes = MockCrashes::new();
  crashes.expect_is_enabled().returning(|| Ok(true));
  let installed = callbacks.clone();
  crashes
    .expect_set_callbacks()
    .times(1)
    .returning(move |callbacks| *installed.lock() = Some(callbacks));

  let target = CrashesTarget::new(
    "crashes",
    CrashesConfig {
      attachments_file_pattern: Some("${logger}.log".parse().unwrap()),
      backend: BackendConfig {
        app_secret: Some(Layout::literal("secret")),
        ..Default::default()
      },
      ..setup.config()
    },
    Arc::new(app_center),
    Arc::new(crashes),
  )
  .with_file_system(setup.file_system.clone());
  target.initialize().unwrap();

  let callbacks = callbacks.lock().clone().unwrap();
  assert!(callbacks.should_process_report);
  assert!(!callbacks.should_await_user_confirmation);
  assert_eq!(
    vec![ErrorAttachment::text("crash context", "CrashesTarget.log")],
    (callbacks.error_attachments)(&ErrorReport {
      id: "report".to_string(),
      error: ErrorInfo::new("Panic", "index out of bounds"),
    })
  );
}

#[test]
fn config_from_yaml() {
  let config: CrashesConfig = serde_yaml::from_str(
    r#"
app_secret: "ios=abc"
wrap_error_from_level: warning
attachments_directory: /var/log/app
attachments_file_pattern: "*.log"
flush_timeout_ms: 500
"#,
  )
  .unwrap();

  assert_eq!(Some(LogLevel::Warn), config.wrap_error_from_level);
  assert_eq!(
    "/var/log/app",
    config.attachments_directory.as_ref().unwrap().to_string()
  );
  assert_eq!(Some(Duration::from_millis(500)), config.flush_timeout());
  assert_eq!(None, CrashesConfig::default().flush_timeout());
}
