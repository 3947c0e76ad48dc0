/*!
 * Memory Access Capability
 * Routes reads/writes either to real target memory or to a local scratch buffer
 *
 * A relayed call that must fill a host-side structure hands the front-end a
 * pseudo address; memory packets arriving during the wait are then served by
 * the scratch buffer. The route lives in the capability value, so dropping it
 * is all it takes to go back to real memory.
 */

use crate::core::errors::MarshalError;
use crate::core::types::{MarshalResult, TargetAddr};

use super::Target;

/// Fixed-size host buffer mapped at a pseudo target address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchBuffer {
    base: TargetAddr,
    bytes: Vec<u8>,
}

impl ScratchBuffer {
    /// Create a buffer of `size` bytes, pre-filled with `fill`
    pub fn new(base: TargetAddr, size: usize, fill: u8) -> Self {
        Self {
            base,
            bytes: vec![fill; size],
        }
    }

    pub fn base(&self) -> TargetAddr {
        self.base
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn range(&self, addr: TargetAddr, len: usize) -> MarshalResult<std::ops::Range<usize>> {
        let overflow = MarshalError::ScratchOverflow { addr, len };
        let start = addr.checked_sub(self.base).ok_or(overflow.clone())? as usize;
        let end = start.checked_add(len).ok_or(overflow.clone())?;
        if end > self.bytes.len() {
            return Err(overflow);
        }
        Ok(start..end)
    }
}

enum Route<'a> {
    Target,
    Scratch(&'a mut ScratchBuffer),
}

/// Memory-access capability passed explicitly to every marshalling routine
pub struct MemoryAccess<'a> {
    target: &'a mut dyn Target,
    route: Route<'a>,
}

impl<'a> MemoryAccess<'a> {
    /// Access real target memory
    pub fn target(target: &'a mut dyn Target) -> Self {
        Self {
            target,
            route: Route::Target,
        }
    }

    /// Serve memory accesses from `scratch`; registers still reach the target
    pub fn scratch(target: &'a mut dyn Target, scratch: &'a mut ScratchBuffer) -> Self {
        Self {
            target,
            route: Route::Scratch(scratch),
        }
    }

    pub fn is_redirected(&self) -> bool {
        matches!(self.route, Route::Scratch(_))
    }

    pub fn read(&mut self, dest: &mut [u8], src: TargetAddr) -> MarshalResult<()> {
        match &mut self.route {
            Route::Target => {
                self.target.read_memory(dest, src);
                if self.target.check_error() {
                    return Err(MarshalError::Fault {
                        addr: src,
                        len: dest.len(),
                    });
                }
                Ok(())
            }
            Route::Scratch(scratch) => {
                let range = scratch.range(src, dest.len())?;
                dest.copy_from_slice(&scratch.bytes[range]);
                Ok(())
            }
        }
    }

    pub fn write(&mut self, dest: TargetAddr, src: &[u8]) -> MarshalResult<()> {
        match &mut self.route {
            Route::Target => {
                self.target.write_memory(dest, src);
                if self.target.check_error() {
                    return Err(MarshalError::Fault {
                        addr: dest,
                        len: src.len(),
                    });
                }
                Ok(())
            }
            Route::Scratch(scratch) => {
                let range = scratch.range(dest, src.len())?;
                scratch.bytes[range].copy_from_slice(src);
                Ok(())
            }
        }
    }

    pub fn read_u8(&mut self, src: TargetAddr) -> MarshalResult<u8> {
        let mut byte = [0u8; 1];
        self.read(&mut byte, src)?;
        Ok(byte[0])
    }
}
