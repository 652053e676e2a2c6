// shared-core - bitdrift's common client/server libraries
// Copyright Bitdrift, Inc. All rights reserved.
//
// Use of this source code is governed by a source available license that can be found in the
// LICENSE file or at:
// https://polyformproject.org/wp-content/uploads/2020/06/PolyForm-Shield-1.0.0.txt

use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write as _;

// zlib has 10 compression levels (0-9). Level 5 is the balance between compression speed and
// ratio used on mobile devices.
pub const DEFAULT_MOBILE_ZLIB_COMPRESSION_LEVEL: u32 = 5;

/// Returns the size of the payload once compressed the way the backend transmits it.
pub fn compressed_len(data: &[u8]) -> std::io::Result<usize> {
  let mut encoder = ZlibEncoder::new(
    Vec::new(),
    Compression::new(DEFAULT_MOBILE_ZLIB_COMPRESSION_LEVEL),
  );
  encoder.write_all(data)?;
  Ok(encoder.finish()?.len())
}
