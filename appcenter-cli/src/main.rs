// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use crate::cli::{Command, FieldPairs, Options};
use appcenter_cli::commands::{Emit, collect};
use appcenter_cli::config::TargetsConfig;
use appcenter_log::InternalLogger;
use appcenter_log_primitives::{ErrorInfo, LogEvent};
use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
  let args = Options::parse();

  // Diagnostics go to stderr, leaving stdout to the JSON output.
  InternalLogger::initialize(args.log_filter.as_deref());
  let _ignored = tracing_log::LogTracer::init();

  match args.command {
    Command::Collect(cmd) => {
      for summary in collect(&cmd.directory, &cmd.pattern) {
        println!("{}", serde_json::to_string(&summary)?);
      }
    },
    Command::Emit(cmd) => {
      let config = TargetsConfig::load(&cmd.config)?;

      let mut event = LogEvent::new(cmd.level.into(), "appcenter-cli", cmd.message);
      event.properties = FieldPairs(cmd.field).into();
      if let Some(message) = cmd.error {
        event = event.with_error(ErrorInfo::new(ErrorInfo::DYN_ERROR, message));
      }

      let recordings = Emit {
        event,
        simulate_crash: cmd.simulate_crash,
      }
      .run(&config)?;
      println!("{}", serde_json::to_string_pretty(&recordings)?);
    },
  }

  Ok(())
}
