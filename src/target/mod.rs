/*!
 * Target Abstraction
 * Interface to the halted target consumed by the relay
 *
 * Register/memory access, halt/resume control and the per-target data the
 * call convention exposes (command line, heap bounds) are provided by the
 * surrounding debugger; the relay only drives them.
 */

mod memory;

pub use memory::{MemoryAccess, ScratchBuffer};

use serde::{Deserialize, Serialize};

use crate::core::types::TargetAddr;

/// Heap and stack bounds reported by the heapinfo call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapInfo {
    pub heap_base: u32,
    pub heap_limit: u32,
    pub stack_base: u32,
    pub stack_limit: u32,
}

impl HeapInfo {
    /// Words in target order, as newlib's crt0 expects them
    pub fn to_words(self) -> [u32; 4] {
        [
            self.heap_base,
            self.heap_limit,
            self.stack_base,
            self.stack_limit,
        ]
    }
}

/// A halted target as seen by the relay
///
/// Memory accessors report failure through the side-channel flag read by
/// [`Target::check_error`], which clears it.
pub trait Target {
    fn read_register(&mut self, index: u32) -> u32;

    fn write_register(&mut self, index: u32, value: u32);

    fn read_memory(&mut self, dest: &mut [u8], src: TargetAddr);

    fn write_memory(&mut self, dest: TargetAddr, src: &[u8]);

    /// Return and clear the memory-access error flag
    fn check_error(&mut self) -> bool;

    /// Resume the target; `step` resumes in single-step halt mode
    fn halt_resume(&mut self, step: bool);

    /// Print a line on the front-end's console
    fn console_print(&mut self, text: &str);

    /// Command line handed to the target program
    fn cmdline(&self) -> &str;

    fn heapinfo(&self) -> HeapInfo;
}
