//! # Page Directory (root level)
//!
//! This module models the root paging level:
//!
//! - [`PdIndex`]: index type for virtual-address bits `[31:22]`.
//! - [`PdEntry`]: a PDE pointing at a Page Table (no large pages here).
//! - [`PageDirectory`]: a 4 KiB-aligned array of 1024 PDEs.
//!
//! ## Invariants & Notes
//!
//! - [`PageDirectory`] is 4 KiB-aligned and contains exactly 1024 entries.
//! - Raw constructors do not validate consistency; prefer typed helpers.
//! - After modifying active mappings, the caller must perform any required
//!   TLB maintenance.

use crate::PageEntryBits;
use crate::page_table::ENTRY_COUNT;
use kmon_addresses::{PhysicalPage, VirtualAddress};

/// Index into the Page Directory (derived from VA bits `[31:22]`).
///
/// Strongly typed to avoid mixing with the table level. Range is `0..1024`
/// (checked in debug builds).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PdIndex(u16);

/// A single Page Directory entry (PDE).
///
/// A present PDE points at exactly one 4 KiB-aligned
/// [`PageTable`](crate::PageTable); the page-size bit stays clear on this
/// machine.
#[doc(alias = "PDE")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct PdEntry(PageEntryBits);

/// The Page Directory: 1024 entries, 4 KiB-aligned.
#[doc(alias = "PD")]
#[repr(C, align(4096))]
pub struct PageDirectory {
    entries: [PdEntry; ENTRY_COUNT],
}

impl PdIndex {
    /// Build an index from a virtual address (extracts bits `[31:22]`).
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new((va.as_u32() >> 22) as u16)
    }

    /// Construct from a raw `u16`.
    ///
    /// ### Debug assertions
    /// - Asserts `v < 1024` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!((v as usize) < ENTRY_COUNT);
        Self(v)
    }

    /// Return the index as `usize` for table access.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl PdEntry {
    /// Create a zero (non-present) entry.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(PageEntryBits::new())
    }

    /// Return `true` if the entry is marked present.
    #[inline]
    #[must_use]
    pub const fn is_present(self) -> bool {
        self.0.present()
    }

    /// Expose the underlying bitfield for inspection.
    #[inline]
    #[must_use]
    pub const fn flags(self) -> PageEntryBits {
        self.0
    }

    /// If present, return the page-table frame this entry points at.
    #[inline]
    #[must_use]
    pub const fn next_table(self) -> Option<PhysicalPage> {
        if self.0.present() {
            Some(self.0.physical_page())
        } else {
            None
        }
    }

    /// Create a present PDE pointing at `table` with the given flags.
    ///
    /// Forces `present=1` and clears the page-size bit; the table base must
    /// be 4 KiB-aligned.
    #[inline]
    #[must_use]
    pub const fn present_next_with(flags: PageEntryBits, table: PhysicalPage) -> Self {
        Self(
            flags
                .with_present(true)
                .with_pat(false)
                .with_physical_page(table),
        )
    }

    /// Return the raw 32-bit value (flags + address).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0.into_bits()
    }

    /// Construct from a raw 32-bit value. No validation is performed.
    #[inline]
    #[must_use]
    pub const fn from_raw(v: u32) -> Self {
        Self(PageEntryBits::from_bits(v))
    }
}

impl PageDirectory {
    /// Create a fully zeroed Page Directory (all entries non-present).
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [PdEntry::zero(); ENTRY_COUNT],
        }
    }

    /// Read the entry at `i`.
    ///
    /// Plain load; does not imply any TLB synchronization.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: PdIndex) -> PdEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    ///
    /// Caller must handle any required TLB invalidation when changing
    /// active mappings.
    #[inline]
    pub const fn set(&mut self, i: PdIndex, e: PdEntry) {
        self.entries[i.as_usize()] = e;
    }

    /// Derive the directory index from a virtual address.
    #[inline]
    #[must_use]
    pub const fn index_of(va: VirtualAddress) -> PdIndex {
        PdIndex::from(va)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kmon_addresses::PhysicalAddress;

    #[test]
    fn pde_next_table() {
        let pt = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        let e = PdEntry::present_next_with(PageEntryBits::new_common_rw(), pt);
        assert!(e.is_present());
        assert_eq!(e.next_table().unwrap().base().as_u32(), 0x0030_0000);
        assert!(!e.flags().pat(), "page-size bit must stay clear");
        assert!(PdEntry::zero().next_table().is_none());
    }
}
