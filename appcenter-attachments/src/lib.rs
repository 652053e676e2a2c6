// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#![deny(
  clippy::expect_used,
  clippy::panic,
  clippy::todo,
  clippy::unimplemented,
  clippy::unreachable,
  clippy::unwrap_used
)]

#[cfg(test)]
#[path = "./collector_test.rs"]
mod tests;

pub mod mime;

use appcenter_client_common::backend::ErrorAttachment;
use appcenter_client_common::file_system::FileSystem;
use mime::{AttachmentSpec, classify};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(test)]
#[ctor::ctor]
fn test_global_init() {
  appcenter_test_helpers::test_global_init();
}

const MATCH_ALL_PATTERN: &str = "*";

//
// CollectedFile
//

/// The raw content of a matched file along with its classification.
#[derive(Debug)]
pub struct CollectedFile {
  pub name: String,
  pub path: PathBuf,
  pub content: Vec<u8>,
  pub mime_type: &'static str,
  pub is_text: bool,
}

impl CollectedFile {
  fn read(file_system: &dyn FileSystem, path: PathBuf) -> anyhow::Result<Self> {
    let content = file_system.read_file(&path)?;
    let spec: &AttachmentSpec = classify(&path);

    Ok(Self {
      name: file_name(&path),
      path,
      content,
      mime_type: spec.mime_type,
      is_text: spec.is_text,
    })
  }

  /// Converts the file into an attachment. Text files must be valid UTF-8.
  pub fn into_attachment(self) -> anyhow::Result<ErrorAttachment> {
    if self.is_text {
      let text = String::from_utf8(self.content)?;
      Ok(ErrorAttachment::text(text, self.name))
    } else {
      Ok(ErrorAttachment::binary(
        self.content,
        self.name,
        self.mime_type,
      ))
    }
  }
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// The attachment sent in place of a file that could not be collected. The message names the
/// absolute path of the file, resolved against the working directory when relative.
fn diagnostic_attachment(path: &Path, error: &anyhow::Error) -> ErrorAttachment {
  let full_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
  ErrorAttachment::text(
    format!(
      "collecting attachment for file '{}' failed: {error:#}",
      full_path.display()
    ),
    file_name(path),
  )
}

//
// Scan
//

/// The files matched in an attachment directory. No file has been read yet.
pub struct Scan {
  file_system: Arc<dyn FileSystem>,
  files: Vec<PathBuf>,
}

impl Scan {
  fn empty(file_system: Arc<dyn FileSystem>) -> Self {
    Self {
      file_system,
      files: vec![],
    }
  }

  #[must_use]
  pub fn files(&self) -> &[PathBuf] {
    &self.files
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.files.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Reads the matched files lazily, one per call to `next`.
  #[must_use]
  pub fn into_attachments(self) -> Attachments {
    Attachments {
      file_system: self.file_system,
      files: self.files.into_iter(),
    }
  }
}

//
// Attachments
//

/// Lazily reads each matched file into an attachment. A file that cannot be read or decoded is
/// replaced by a text attachment describing the failure, so every matched file produces exactly
/// one attachment.
pub struct Attachments {
  file_system: Arc<dyn FileSystem>,
  files: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Attachments {
  type Item = ErrorAttachment;

  fn next(&mut self) -> Option<Self::Item> {
    let path = self.files.next()?;
    log::debug!("attaching {path:?}");

    let attachment = CollectedFile::read(self.file_system.as_ref(), path.clone())
      .and_then(CollectedFile::into_attachment)
      .unwrap_or_else(|e| {
        log::warn!("failed to attach {path:?}: {e}");
        diagnostic_attachment(&path, &e)
      });

    Some(attachment)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.files.size_hint()
  }
}

impl ExactSizeIterator for Attachments {}

//
// AttachmentCollector
//

/// Collects the files of a directory as error report attachments.
///
/// The collector does not bound the number or size of attachments. Callers cap the sequence
/// before handing it to the backend, which drops oversized attachments itself.
#[derive(Clone)]
pub struct AttachmentCollector {
  file_system: Arc<dyn FileSystem>,
}

impl AttachmentCollector {
  #[must_use]
  pub fn new(file_system: Arc<dyn FileSystem>) -> Self {
    Self { file_system }
  }

  /// Finds the files below `directory` whose name matches the glob `pattern`, descending into
  /// subdirectories. An empty pattern matches every file. A missing directory or an invalid
  /// pattern results in an empty scan.
  #[must_use]
  pub fn scan(&self, directory: &str, pattern: &str) -> Scan {
    let directory = directory.trim();
    if directory.is_empty() {
      log::debug!("no attachment directory configured");
      return Scan::empty(self.file_system.clone());
    }

    let directory = Path::new(directory);
    if !self.file_system.is_dir(directory) {
      log::debug!("attachment directory does not exist: {directory:?}");
      return Scan::empty(self.file_system.clone());
    }

    let pattern = match pattern.trim() {
      "" => MATCH_ALL_PATTERN,
      pattern => pattern,
    };
    let pattern = match glob::Pattern::new(pattern) {
      Ok(pattern) => pattern,
      Err(e) => {
        log::warn!("invalid attachment file pattern {pattern:?}: {e}");
        return Scan::empty(self.file_system.clone());
      },
    };

    let files = self
      .file_system
      .list_files_recursive(directory)
      .into_iter()
      .filter(|path| pattern.matches(&file_name(path)))
      .collect();

    Scan {
      file_system: self.file_system.clone(),
      files,
    }
  }

  /// Scans the directory and lazily produces one attachment per matched file.
  #[must_use]
  pub fn collect(&self, directory: &str, pattern: &str) -> Attachments {
    self.scan(directory, pattern).into_attachments()
  }
}
