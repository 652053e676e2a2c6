// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use appcenter_log_primitives::LogLevel;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum CliLogLevel {
  Trace,
  Debug,
  Info,
  Warn,
  Error,
  Fatal,
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Options {
  /// Filter for internal diagnostics, e.g. "debug" or "appcenter_crashes=trace"
  #[clap(env = "APPCENTER_LOG", long, required = false)]
  pub log_filter: Option<String>,

  /// Command to run
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Collect the files of a directory as error attachments and print one JSON line per file
  Collect(CollectCommand),

  /// Write an event through the configured targets into a local backend and print what it
  /// recorded
  Emit(EmitCommand),
}

#[derive(Args, Debug)]
pub struct CollectCommand {
  /// Directory to collect, searched recursively
  #[clap(long)]
  pub directory: String,

  /// Glob matched against file names. Empty matches every file
  #[clap(long, required = false, default_value = "")]
  pub pattern: String,
}

#[derive(Args, Debug)]
pub struct EmitCommand {
  /// YAML file configuring the targets
  #[clap(long)]
  pub config: PathBuf,

  /// Severity level of the event
  #[clap(long, required = false, value_enum, default_value = "info")]
  pub level: CliLogLevel,

  /// Additional field(s) to send with the event
  #[clap(long, num_args=2, value_names=["key", "value"], action=ArgAction::Append)]
  pub field: Vec<String>,

  /// Attach an error with this message to the event
  #[clap(long)]
  pub error: Option<String>,

  /// After writing the event, simulate a crash with this message
  #[clap(long)]
  pub simulate_crash: Option<String>,

  /// Event message
  #[clap(long)]
  pub message: String,
}

impl From<CliLogLevel> for LogLevel {
  fn from(value: CliLogLevel) -> Self {
    match value {
      CliLogLevel::Trace => Self::Trace,
      CliLogLevel::Debug => Self::Debug,
      CliLogLevel::Info => Self::Info,
      CliLogLevel::Warn => Self::Warn,
      CliLogLevel::Error => Self::Error,
      CliLogLevel::Fatal => Self::Fatal,
    }
  }
}

pub struct FieldPairs(pub Vec<String>);
impl From<FieldPairs> for Vec<(String, String)> {
  fn from(value: FieldPairs) -> Self {
    value
      .0
      .chunks_exact(2)
      .map(|pair| (pair[0].clone(), pair[1].clone()))
      .collect()
  }
}
