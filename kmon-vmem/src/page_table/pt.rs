//! # Page Table (leaf level)
//!
//! This module models the leaf paging level:
//!
//! - [`PtIndex`]: index type for virtual-address bits `[21:12]`.
//! - [`PtEntry`]: a PTE; every present entry maps one 4 KiB page.
//! - [`PageTable`]: a 4 KiB-aligned array of 1024 PTEs.
//!
//! ## Semantics
//!
//! - A PT does **not** point to another table. Every present entry maps a
//!   4 KiB frame whose base must be page-aligned (hardware requirement).
//! - A non-present entry keeps its remaining bits; the monitor relies on
//!   that to inspect and patch permission bits of unmapped pages.

use crate::PageEntryBits;
use crate::page_table::ENTRY_COUNT;
use kmon_addresses::{PhysicalPage, VirtualAddress};

/// Index into the Page Table (derived from VA bits `[21:12]`).
///
/// Strongly typed to avoid mixing with the directory level. Range is
/// `0..1024` (checked in debug builds).
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PtIndex(u16);

/// A single Page Table entry (PTE).
///
/// All permission/cache/present bits live inside the inner
/// [`PageEntryBits`].
#[doc(alias = "PTE")]
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct PtEntry(PageEntryBits);

/// The Page Table: 1024 entries, 4 KiB-aligned.
#[doc(alias = "PT")]
#[repr(C, align(4096))]
pub struct PageTable {
    entries: [PtEntry; ENTRY_COUNT],
}

impl PtIndex {
    /// Build an index from a virtual address (extracts bits `[21:12]`).
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new(((va.as_u32() >> 12) & 0x3FF) as u16)
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

impl PtEntry {
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

    /// Expose the underlying bitfield for inspection and flag rendering.
    #[inline]
    #[must_use]
    pub const fn flags(self) -> PageEntryBits {
        self.0
    }

    /// Replace the flag bits, keeping the frame base untouched.
    #[inline]
    #[must_use]
    pub const fn with_flags(self, flags: PageEntryBits) -> Self {
        Self(flags.with_physical_page(self.0.physical_page()))
    }

    /// If present, return the mapped 4 KiB frame and the entry's flags.
    #[inline]
    #[must_use]
    pub const fn page(self) -> Option<(PhysicalPage, PageEntryBits)> {
        if self.0.present() {
            Some((self.0.physical_page(), self.0))
        } else {
            None
        }
    }

    /// Create a present leaf PTE mapping `page` with the given flags.
    #[inline]
    #[must_use]
    pub const fn present_leaf_with(flags: PageEntryBits, page: PhysicalPage) -> Self {
        Self(flags.with_present(true).with_physical_page(page))
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

impl PageTable {
    /// Create a fully zeroed Page Table (all entries non-present).
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            entries: [PtEntry::zero(); ENTRY_COUNT],
        }
    }

    /// Read the entry at `i`.
    ///
    /// Plain load; does not imply any TLB synchronization.
    #[inline]
    #[must_use]
    pub const fn get(&self, i: PtIndex) -> PtEntry {
        self.entries[i.as_usize()]
    }

    /// Write the entry at `i`.
    ///
    /// Caller must handle any required TLB invalidation when changing
    /// active mappings.
    #[inline]
    pub const fn set(&mut self, i: PtIndex, e: PtEntry) {
        self.entries[i.as_usize()] = e;
    }

    /// Borrow the entry slot at `i`.
    ///
    /// Used by the address-space walk to hand out an entry location.
    #[inline]
    #[must_use]
    pub const fn entry_mut(&mut self, i: PtIndex) -> &mut PtEntry {
        &mut self.entries[i.as_usize()]
    }

    /// Derive the table index from a virtual address.
    #[inline]
    #[must_use]
    pub const fn index_of(va: VirtualAddress) -> PtIndex {
        PtIndex::from(va)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use kmon_addresses::PhysicalAddress;

    #[test]
    fn pte_leaf() {
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x5555_0000));
        let e = PtEntry::present_leaf_with(PageEntryBits::new_user_ro(), frame);
        let (p, fl) = e.page().unwrap();
        assert_eq!(p.base().as_u32(), 0x5555_0000);
        assert!(fl.user());
        assert!(!fl.writable());
        assert!(PtEntry::zero().page().is_none());
    }

    #[test]
    fn with_flags_keeps_frame() {
        let frame = PhysicalPage::from_addr(PhysicalAddress::new(0x0001_0000));
        let e = PtEntry::present_leaf_with(PageEntryBits::new_user_rw(), frame);
        let e = e.with_flags(e.flags().with_writable(false));
        assert_eq!(e.flags().physical_page(), frame);
        assert!(!e.flags().writable());
        assert!(e.is_present());
    }
}
