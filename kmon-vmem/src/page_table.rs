//! # Memory Page Tables
//!
//! Typed wrappers for the two paging levels:
//!
//! - [`pd`]: the Page Directory (root level, VA bits `[31:22]`).
//! - [`pt`]: the Page Table (leaf level, VA bits `[21:12]`).

pub mod pd;
pub mod pt;

pub use pd::{PageDirectory, PdEntry, PdIndex};
pub use pt::{PageTable, PtEntry, PtIndex};

use kmon_addresses::VirtualAddress;

/// Number of entries in each table level (2¹⁰ four-byte entries per 4 KiB).
pub const ENTRY_COUNT: usize = 1024;

/// Split a virtual address into its directory and table indices.
#[inline]
#[must_use]
pub const fn split_indices(va: VirtualAddress) -> (PdIndex, PtIndex) {
    (PdIndex::from(va), PtIndex::from(va))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_ok() {
        let va = VirtualAddress::new(0xF012_3456);
        let (pd, pt) = split_indices(va);
        assert_eq!(pd.as_usize(), 0xF012_3456 >> 22);
        assert_eq!(pt.as_usize(), (0xF012_3456 >> 12) & 0x3FF);
        assert!(pd.as_usize() < ENTRY_COUNT);
        assert!(pt.as_usize() < ENTRY_COUNT);
    }
}
