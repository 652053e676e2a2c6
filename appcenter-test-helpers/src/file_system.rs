// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use appcenter_client_common::file_system::{FileSystem, RealFileSystem};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

//
// TestFileSystem
//

/// A filesystem rooted in a temporary directory which records reads and can be told to fail
/// reading specific files, e.g. to simulate a permission error.
pub struct TestFileSystem {
  directory: tempfile::TempDir,
  failing_reads: Mutex<HashSet<PathBuf>>,
  reads: Mutex<Vec<PathBuf>>,
}

impl Default for TestFileSystem {
  fn default() -> Self {
    Self::new()
  }
}

impl TestFileSystem {
  #[must_use]
  pub fn new() -> Self {
    Self {
      directory: tempfile::tempdir().unwrap(),
      failing_reads: Mutex::new(HashSet::new()),
      reads: Mutex::new(vec![]),
    }
  }

  /// The root of the temporary directory.
  #[must_use]
  pub fn path(&self) -> &Path {
    self.directory.path()
  }

  /// The root of the temporary directory as a string, the way it would be configured.
  #[must_use]
  pub fn path_str(&self) -> String {
    self.directory.path().to_string_lossy().into_owned()
  }

  /// Writes a file relative to the root, creating parent directories as needed.
  pub fn write(&self, relative: impl AsRef<Path>, data: impl AsRef<[u8]>) -> PathBuf {
    let path = self.directory.path().join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, data).unwrap();
    path
  }

  /// Makes reads of the file relative to the root fail with a permission error.
  pub fn fail_reads(&self, relative: impl AsRef<Path>) {
    self
      .failing_reads
      .lock()
      .insert(self.directory.path().join(relative));
  }

  /// The files read so far, in order.
  #[must_use]
  pub fn reads(&self) -> Vec<PathBuf> {
    self.reads.lock().clone()
  }
}

impl FileSystem for TestFileSystem {
  fn is_dir(&self, path: &Path) -> bool {
    RealFileSystem.is_dir(path)
  }

  fn list_files_recursive(&self, directory: &Path) -> Vec<PathBuf> {
    RealFileSystem.list_files_recursive(directory)
  }

  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
    self.reads.lock().push(path.to_path_buf());

    if self.failing_reads.lock().contains(path) {
      return Err(
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied").into(),
      );
    }

    RealFileSystem.read_file(path)
  }
}
