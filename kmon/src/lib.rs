//! # kmon — an interactive kernel monitor
//!
//! A debugging console embedded in the kernel: inspect and mutate the live
//! virtual-memory state of the machine and unwind the call stack at a
//! fault point.
//!
//! ## Commands
//!
//! | Command | Effect |
//! |---|---|
//! | `help` | list registered commands |
//! | `kerninfo` | kernel image symbol addresses and footprint |
//! | `showmappings <start> <end>` | per-page mapping table with permission flags |
//! | `modify <va> <c\|s> <P\|U\|W>` | clear/set one permission bit in place |
//! | `dump <start> <end> <P\|V>` | raw word dump over a physical or virtual range |
//! | `backtrace` | frame-pointer backtrace with symbol resolution |
//!
//! ## Structure
//!
//! The monitor borrows everything: the page-table root (walked through
//! `kmon-vmem`), raw memory (via [`MemoryRead`]), debug symbols (via
//! [`SymbolResolver`]) and console input (via [`LineReader`]). It holds no
//! state between commands and performs no allocation; the only mutation it
//! ever issues is the single-entry permission patch of `modify`.
//!
//! One command runs to completion before the next line is read. There is
//! no locking discipline around the inspected structures: the monitor
//! assumes the rest of the system is halted while it is active.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod command;
mod console;
mod dump;
mod error;
mod memory;
mod monitor;
mod patch;
mod report;
mod symbols;
mod unwind;

pub use command::{COMMANDS, CommandDescriptor, CommandId};
pub use console::{Flow, LineReader};
pub use dump::{DumpOrigin, dump};
pub use error::MonitorError;
pub use memory::{DirectMapper, KernelMemory, MemoryRead};
pub use monitor::Monitor;
pub use patch::{PatchOp, PermissionBit, patch};
pub use report::{PAGE_COUNT_MASK, report};
pub use symbols::{NoSymbols, SymbolInfo, SymbolResolver};
pub use unwind::{
    ARG_SLOTS, DEFAULT_BACKTRACE_LIMIT, FrameWalker, StackFrame, TrapframeSnapshot,
};
