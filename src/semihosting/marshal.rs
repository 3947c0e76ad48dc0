/*!
 * Address-Space Marshaller
 * Moves byte ranges, strings and word blocks across the target/host boundary
 *
 * Every routine takes the memory-access capability explicitly, so the same
 * code serves real target memory and local scratch buffers.
 */

use std::ffi::OsString;
use std::path::PathBuf;

use crate::core::errors::MarshalError;
use crate::core::limits::MAX_STRING_ARGUMENT;
use crate::core::types::{MarshalResult, TargetAddr, TARGET_NULL};
use crate::target::MemoryAccess;

/// A string living in target memory; `len` excludes the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetString {
    pub addr: TargetAddr,
    pub len: u32,
}

impl TargetString {
    pub const fn new(addr: TargetAddr, len: u32) -> Self {
        Self { addr, len }
    }

    /// Length on the wire, terminator included
    pub const fn wire_len(&self) -> u32 {
        self.len.wrapping_add(1)
    }
}

/// Copy `len` bytes out of target memory
pub fn read_bytes(
    access: &mut MemoryAccess<'_>,
    addr: TargetAddr,
    len: usize,
) -> MarshalResult<Vec<u8>> {
    if addr == TARGET_NULL {
        return Err(MarshalError::NullAddress);
    }
    let mut buffer = vec![0u8; len];
    access.read(&mut buffer, addr)?;
    Ok(buffer)
}

/// Copy `bytes` into target memory
pub fn write_bytes(
    access: &mut MemoryAccess<'_>,
    addr: TargetAddr,
    bytes: &[u8],
) -> MarshalResult<()> {
    if addr == TARGET_NULL {
        return Err(MarshalError::NullAddress);
    }
    access.write(addr, bytes)
}

/// Read a declared-length string; null and empty strings are rejected
pub fn read_string(
    access: &mut MemoryAccess<'_>,
    string: TargetString,
) -> MarshalResult<Vec<u8>> {
    if string.addr == TARGET_NULL {
        return Err(MarshalError::NullAddress);
    }
    if string.len == 0 {
        return Err(MarshalError::ZeroLength(string.addr));
    }
    if string.len > MAX_STRING_ARGUMENT {
        return Err(MarshalError::TooLong {
            addr: string.addr,
            len: string.len,
            limit: MAX_STRING_ARGUMENT,
        });
    }
    read_bytes(access, string.addr, string.len as usize)
}

/// Read a declared-length string as a host path
pub fn read_path(access: &mut MemoryAccess<'_>, string: TargetString) -> MarshalResult<PathBuf> {
    let bytes = read_string(access, string)?;
    Ok(PathBuf::from(bytes_to_os_string(bytes)))
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    OsString::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scan for a NUL terminator and return the string length
pub fn string_length(
    access: &mut MemoryAccess<'_>,
    addr: TargetAddr,
    limit: u32,
) -> MarshalResult<u32> {
    if addr == TARGET_NULL {
        return Err(MarshalError::NullAddress);
    }
    for offset in 0..limit {
        if access.read_u8(addr.wrapping_add(offset))? == 0 {
            return Ok(offset);
        }
    }
    Err(MarshalError::Unterminated { addr, limit })
}

/// Write little-endian words (the target's word order)
pub fn write_words(
    access: &mut MemoryAccess<'_>,
    addr: TargetAddr,
    words: &[u32],
) -> MarshalResult<()> {
    let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
    write_bytes(access, addr, &bytes)
}

/// Big-endian u64 field of a front-end structure
pub fn be_u64(buffer: &[u8], offset: usize) -> Option<u64> {
    let bytes = buffer.get(offset..offset + 8)?;
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    Some(u64::from_be_bytes(word))
}
