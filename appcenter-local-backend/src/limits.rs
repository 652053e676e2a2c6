// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use appcenter_client_common::backend::ErrorAttachment;
use appcenter_client_common::zlib::compressed_len;
use appcenter_log_primitives::{
  MAX_ATTACHMENT_COUNT,
  MAX_ATTACHMENT_SIZE,
  MAX_EVENT_NAME_LENGTH,
  MAX_PROPERTY_COUNT,
  MAX_PROPERTY_LENGTH,
  Properties,
};
use std::collections::btree_map::Entry;

// Lengths are counted in characters.
fn truncate(value: &str, max: usize) -> String {
  match value.char_indices().nth(max) {
    Some((end, _)) => value[.. end].to_string(),
    None => value.to_string(),
  }
}

/// Validates an event name. Empty names are rejected, long names truncated.
pub fn limit_event_name(name: &str) -> Option<String> {
  if name.is_empty() {
    log::warn!("event name cannot be empty, event dropped");
    return None;
  }

  let limited = truncate(name, MAX_EVENT_NAME_LENGTH);
  if limited.len() < name.len() {
    log::debug!("event name {name:?} truncated to {MAX_EVENT_NAME_LENGTH} characters");
  }
  Some(limited)
}

/// Drops properties with an empty key, truncates keys and values and keeps at most
/// `MAX_PROPERTY_COUNT` properties. When two keys truncate to the same key the first one in key
/// order is kept.
pub fn limit_properties(properties: &Properties) -> Properties {
  let mut limited = Properties::new();
  for (key, value) in properties {
    if key.is_empty() {
      log::debug!("property with an empty key dropped");
      continue;
    }

    if limited.len() == MAX_PROPERTY_COUNT {
      log::warn!(
        "{} properties supplied, only the first {MAX_PROPERTY_COUNT} are kept",
        properties.len()
      );
      break;
    }

    match limited.entry(truncate(key, MAX_PROPERTY_LENGTH)) {
      Entry::Vacant(entry) => {
        entry.insert(truncate(value, MAX_PROPERTY_LENGTH));
      },
      Entry::Occupied(entry) => {
        log::debug!(
          "property {key:?} dropped, its truncated key collides with {:?}",
          entry.key()
        );
      },
    }
  }
  limited
}

/// Keeps the first `MAX_ATTACHMENT_COUNT` attachments, dropping any whose compressed size exceeds
/// `MAX_ATTACHMENT_SIZE`.
pub fn limit_attachments(attachments: Vec<ErrorAttachment>) -> Vec<ErrorAttachment> {
  if attachments.len() > MAX_ATTACHMENT_COUNT {
    log::debug!(
      "{} attachments supplied, only the first {MAX_ATTACHMENT_COUNT} are kept",
      attachments.len()
    );
  }

  attachments
    .into_iter()
    .take(MAX_ATTACHMENT_COUNT)
    .filter(|attachment| match compressed_len(attachment.data()) {
      Ok(size) if size <= MAX_ATTACHMENT_SIZE => true,
      Ok(size) => {
        log::warn!(
          "attachment {:?} is {size} bytes compressed, over the limit of {MAX_ATTACHMENT_SIZE}",
          attachment.file_name
        );
        false
      },
      Err(e) => {
        log::warn!("failed to compress attachment {:?}: {e}", attachment.file_name);
        false
      },
    })
    .collect()
}
