// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use super::{FileSystem, RealFileSystem};
use pretty_assertions::assert_eq;

#[test]
fn lists_files_recursively_in_name_order() {
  let directory = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(directory.path().join("b/nested")).unwrap();
  std::fs::write(directory.path().join("c.log"), b"c").unwrap();
  std::fs::write(directory.path().join("a.log"), b"a").unwrap();
  std::fs::write(directory.path().join("b/nested/d.txt"), b"d").unwrap();

  let files = RealFileSystem.list_files_recursive(directory.path());
  assert_eq!(
    vec![
      directory.path().join("a.log"),
      directory.path().join("b/nested/d.txt"),
      directory.path().join("c.log"),
    ],
    files
  );
}

#[test]
fn missing_directory() {
  let directory = tempfile::tempdir().unwrap();
  let missing = directory.path().join("missing");

  assert!(RealFileSystem.is_dir(directory.path()));
  assert!(!RealFileSystem.is_dir(&missing));
  assert!(RealFileSystem.list_files_recursive(&missing).is_empty());
  assert!(RealFileSystem.read_file(&missing).is_err());
}

#[test]
fn reads_content() {
  let directory = tempfile::tempdir().unwrap();
  let path = directory.path().join("a.bin");
  std::fs::write(&path, [0_u8, 1, 2]).unwrap();

  assert_eq!(vec![0_u8, 1, 2], RealFileSystem.read_file(&path).unwrap());
}

#[cfg(unix)]
#[test]
fn follows_symlinks() {
  let directory = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(directory.path().join("real")).unwrap();
  std::fs::write(directory.path().join("real/app-2026.log"), b"today").unwrap();
  std::os::unix::fs::symlink(
    directory.path().join("real/app-2026.log"),
    directory.path().join("current.log"),
  )
  .unwrap();
  std::os::unix::fs::symlink(directory.path().join("real"), directory.path().join("linked"))
    .unwrap();

  let files = RealFileSystem.list_files_recursive(directory.path());
  assert_eq!(
    vec![
      directory.path().join("current.log"),
      directory.path().join("linked/app-2026.log"),
      directory.path().join("real/app-2026.log"),
    ],
    files
  );
  assert_eq!(
    b"today".to_vec(),
    RealFileSystem.read_file(&files[0]).unwrap()
  );
}

#[cfg(unix)]
#[test]
fn symlink_loop_is_skipped() {
  let directory = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(directory.path().join("nested")).unwrap();
  std::fs::write(directory.path().join("nested/a.log"), b"a").unwrap();
  std::os::unix::fs::symlink(directory.path(), directory.path().join("nested/loop")).unwrap();

  assert_eq!(
    vec![directory.path().join("nested/a.log")],
    RealFileSystem.list_files_recursive(directory.path())
  );
}
