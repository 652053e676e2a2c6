// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use std::path::Path;

//
// AttachmentSpec
//

/// How files with a given extension are attached.
#[derive(Debug, PartialEq, Eq)]
pub struct AttachmentSpec {
  /// The file extension including the leading dot, or `*` for the fallback rule.
  pub extension: &'static str,
  pub mime_type: &'static str,
  pub is_text: bool,
}

/// Used for any file not matched by `ATTACHMENT_SPECS`.
pub static DEFAULT_ATTACHMENT_SPEC: AttachmentSpec = AttachmentSpec {
  extension: "*",
  mime_type: "application/octet-stream",
  is_text: false,
};

/// Scanned in order, the first matching extension wins.
pub static ATTACHMENT_SPECS: &[AttachmentSpec] = &[
  AttachmentSpec {
    extension: ".txt",
    mime_type: "text/plain",
    is_text: true,
  },
  AttachmentSpec {
    extension: ".log",
    mime_type: "text/plain",
    is_text: true,
  },
  AttachmentSpec {
    extension: ".zip",
    mime_type: "application/zip",
    is_text: false,
  },
  AttachmentSpec {
    extension: ".gz",
    mime_type: "application/x-zip-compressed",
    is_text: false,
  },
  AttachmentSpec {
    extension: ".rar",
    mime_type: "application/x-rar-compressed",
    is_text: false,
  },
];

/// Classifies a file by its extension, compared ASCII case-insensitively.
#[must_use]
pub fn classify(path: &Path) -> &'static AttachmentSpec {
  let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
    return &DEFAULT_ATTACHMENT_SPEC;
  };

  ATTACHMENT_SPECS
    .iter()
    .find(|spec| {
      spec
        .extension
        .strip_prefix('.')
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
    })
    .unwrap_or(&DEFAULT_ATTACHMENT_SPEC)
}
