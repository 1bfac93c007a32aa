// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Lesser General Public License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

use crate::utils::{validate_binary_len, validate_string_len};
use crate::EncodeError;

/// Write a length-prefixed UTF-8 string: a two-byte big-endian length
/// followed by the raw bytes. Empty strings legally encode as `0x00 0x00`.
///
/// # Errors
///
/// Returns [`EncodeError::StringTooLong`] if `s` is longer than 65,535 bytes.
pub fn write_string(s: &str, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    validate_string_len(s)?;
    #[allow(clippy::cast_possible_truncation)]
    let len = s.len() as u16;
    buf.write_u16::<BigEndian>(len)?;
    buf.write_all(s.as_bytes())?;
    Ok(())
}

/// Write a length-prefixed binary field: a two-byte big-endian length
/// followed by the raw bytes.
///
/// # Errors
///
/// Returns [`EncodeError::StringTooLong`] if `data` is longer than 65,535 bytes.
pub fn write_binary(data: &[u8], buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    validate_binary_len(data)?;
    #[allow(clippy::cast_possible_truncation)]
    let len = data.len() as u16;
    buf.write_u16::<BigEndian>(len)?;
    buf.write_all(data)?;
    Ok(())
}
