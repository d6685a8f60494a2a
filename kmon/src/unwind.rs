//! The frame-pointer stack unwinder behind `backtrace`.
//!
//! Every call frame on this machine stores the caller's frame pointer at
//! its base, the return address one word above it and the first arguments
//! above that:
//!
//! ```text
//! fp + 28  ┆ ...          ┆
//! fp + 8   │ arg words    │  five slots reported per frame
//! fp + 4   │ return addr  │
//! fp + 0   │ caller's fp  │  ← fp
//! ```
//!
//! That convention links the frames into a chain walkable without any
//! unwind tables: load `*fp` to reach the caller. The chain ends at a null
//! frame pointer in the outermost frame.

use crate::memory::MemoryRead;
use kmon_addresses::{VirtualAddress, WORD_SIZE};

/// Argument words reported per frame.
pub const ARG_SLOTS: usize = 5;

/// Default cap on walked frames.
///
/// A corrupted or cyclic frame-pointer chain never reaches the null
/// terminator; the cap turns that into a truncated backtrace instead of a
/// hang.
pub const DEFAULT_BACKTRACE_LIMIT: usize = 64;

/// Register snapshot captured when the kernel dropped into the monitor.
///
/// Read-only input; the unwinder only consumes the saved frame pointer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[allow(missing_docs)]
pub struct TrapframeSnapshot {
    pub eax: u32,
    pub ecx: u32,
    pub edx: u32,
    pub ebx: u32,
    pub esp: u32,
    pub ebp: u32,
    pub esi: u32,
    pub edi: u32,
    pub eip: u32,
    pub eflags: u32,
}

impl TrapframeSnapshot {
    /// The saved frame pointer, the unwinder's starting point.
    #[must_use]
    pub const fn frame_pointer(&self) -> VirtualAddress {
        VirtualAddress::new(self.ebp)
    }
}

/// One reconstructed call frame.
///
/// Ephemeral: rebuilt from memory at the frame-pointer address on every
/// iteration, never stored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StackFrame {
    /// Base of the frame.
    pub frame_pointer: VirtualAddress,
    /// Saved return address (`fp[1]`).
    pub return_address: VirtualAddress,
    /// The first [`ARG_SLOTS`] argument words (`fp[2..]`).
    pub args: [u32; ARG_SLOTS],
}

/// Cursor over the linked frame-pointer chain.
///
/// A lazy, finite iterator: frames are read one at a time, caller to
/// outermost, until the chain reaches a null frame pointer or the injected
/// iteration bound runs out.
pub struct FrameWalker<'a> {
    mem: &'a dyn MemoryRead,
    fp: VirtualAddress,
    remaining: usize,
}

impl<'a> FrameWalker<'a> {
    /// Start walking at `fp`, yielding at most `limit` frames.
    #[must_use]
    pub fn new(mem: &'a dyn MemoryRead, fp: VirtualAddress, limit: usize) -> Self {
        Self {
            mem,
            fp,
            remaining: limit,
        }
    }
}

impl Iterator for FrameWalker<'_> {
    type Item = StackFrame;

    fn next(&mut self) -> Option<StackFrame> {
        if self.fp.is_null() || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let fp = self.fp;
        let return_address = VirtualAddress::new(self.mem.read_word(fp.wrapping_add(WORD_SIZE)));
        let mut args = [0u32; ARG_SLOTS];
        for (i, slot) in args.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let offset = WORD_SIZE * (2 + i as u32);
            *slot = self.mem.read_word(fp.wrapping_add(offset));
        }

        // Advance to the caller: its frame pointer is the first saved word.
        self.fp = VirtualAddress::new(self.mem.read_word(fp));
        Some(StackFrame {
            frame_pointer: fp,
            return_address,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Sparse word-addressed memory for synthetic frame chains.
    struct WordMemory(HashMap<u32, u32>);

    impl WordMemory {
        fn new() -> Self {
            Self(HashMap::new())
        }

        /// Lay down one frame at `fp`.
        fn frame(&mut self, fp: u32, caller_fp: u32, ra: u32, args: [u32; ARG_SLOTS]) {
            self.0.insert(fp, caller_fp);
            self.0.insert(fp + 4, ra);
            for (i, a) in args.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                self.0.insert(fp + 8 + 4 * i as u32, *a);
            }
        }
    }

    impl MemoryRead for WordMemory {
        fn read_word(&self, va: VirtualAddress) -> u32 {
            self.0[&va.as_u32()]
        }
    }

    #[test]
    fn walks_chain_to_null_terminator() {
        let mut mem = WordMemory::new();
        mem.frame(0x7000, 0x7040, 0xF010_0A62, [1, 2, 3, 4, 5]);
        mem.frame(0x7040, 0x7080, 0xF010_0123, [6, 7, 8, 9, 10]);
        mem.frame(0x7080, 0, 0xF010_000C, [0, 0, 0, 0, 0]);

        let frames: Vec<_> = FrameWalker::new(
            &mem,
            VirtualAddress::new(0x7000),
            DEFAULT_BACKTRACE_LIMIT,
        )
        .collect();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].frame_pointer.as_u32(), 0x7000);
        assert_eq!(frames[0].return_address.as_u32(), 0xF010_0A62);
        assert_eq!(frames[0].args, [1, 2, 3, 4, 5]);
        assert_eq!(frames[1].frame_pointer.as_u32(), 0x7040);
        assert_eq!(frames[1].args, [6, 7, 8, 9, 10]);
        assert_eq!(frames[2].frame_pointer.as_u32(), 0x7080);
    }

    #[test]
    fn null_start_yields_nothing() {
        let mem = WordMemory::new();
        assert_eq!(
            FrameWalker::new(&mem, VirtualAddress::NULL, DEFAULT_BACKTRACE_LIMIT).count(),
            0
        );
    }

    #[test]
    fn cyclic_chain_stops_at_bound() {
        let mut mem = WordMemory::new();
        // Self-referential frame: *fp == fp.
        mem.frame(0x7000, 0x7000, 0xF010_0A62, [0; ARG_SLOTS]);

        let count = FrameWalker::new(&mem, VirtualAddress::new(0x7000), 8).count();
        assert_eq!(count, 8);
    }
}
