// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

#[cfg(test)]
#[path = "./file_system_test.rs"]
mod tests;

use std::path::{Path, PathBuf};

//
// FileSystem
//

/// The parts of the filesystem used to collect attachments. This allows for mocking and injecting
/// failures that are hard to reproduce on a real filesystem.
#[mockall::automock]
pub trait FileSystem: Send + Sync {
  fn is_dir(&self, path: &Path) -> bool;

  /// Lists all files below `directory`, descending into subdirectories. Symbolic links are
  /// followed, so a link to a file is listed under the link's path. Entries are sorted by file
  /// name within each directory. Entries that cannot be read, including link loops, are skipped.
  fn list_files_recursive(&self, directory: &Path) -> Vec<PathBuf>;

  /// Reads the full content of the file. The file is closed before returning.
  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>>;
}

//
// RealFileSystem
//

/// The real filesystem implementation which delegates to `std::fs`.
#[derive(Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
  fn is_dir(&self, path: &Path) -> bool {
    path.is_dir()
  }

  fn list_files_recursive(&self, directory: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(directory)
      .min_depth(1)
      .follow_links(true)
      .sort_by_file_name()
      .into_iter()
      .filter_map(|entry| {
        entry
          .inspect_err(|e| log::warn!("skipping unreadable entry below {directory:?}: {e}"))
          .ok()
      })
      .filter(|entry| entry.file_type().is_file())
      .map(walkdir::DirEntry::into_path)
      .collect()
  }

  fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
  }
}
