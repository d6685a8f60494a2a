//! # Address Space (page-directory rooted)
//!
//! Strongly-typed helpers to inspect a **single** live virtual address
//! space (tree rooted at a page directory). This complements the typed
//! paging layers ([`PageDirectory`], [`PageTable`]).
//!
//! ## Highlights
//!
//! - [`AddressSpace::walk`] locates the leaf entry for a virtual address
//!   without ever allocating a missing page table.
//! - [`AddressSpace::translate`] classifies an address as mapped,
//!   not-present or unmapped, surfacing the entry location where one
//!   exists.
//! - [`AddressSpace::query`] translates a VA to its PA if mapped.
//!
//! ## Design
//!
//! - The walk is read-only: it follows the directory pointer down to the
//!   one leaf it needs and touches nothing else, so it is safe to interleave
//!   with a patch on a *different* address.
//! - [`PteSlot`] is the only mutation channel. It offers whole-word
//!   volatile read/write of one entry instead of leaking a raw mutable
//!   reference across components; a store is observed atomically by any
//!   subsequent walk.
//! - Keeps `unsafe` confined to mapping a physical frame to a typed table
//!   through the [`PhysMapper`].

use crate::page_table::{PageDirectory, PageTable, PdIndex, PtEntry, PtIndex};
use crate::PhysMapper;
use core::ptr::NonNull;
use kmon_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};

/// Handle to a single, concrete address space.
pub struct AddressSpace<'m, M: PhysMapper> {
    root: PhysicalPage, // page-directory frame
    mapper: &'m M,
}

/// The location of one leaf page-table entry.
///
/// Value-semantics access to a live entry: read the whole word, compute the
/// new value, write the whole word back. No reference to the entry escapes.
#[derive(Copy, Clone, Debug)]
pub struct PteSlot {
    ptr: NonNull<PtEntry>,
}

impl PteSlot {
    pub(crate) fn new(entry: &mut PtEntry) -> Self {
        Self {
            ptr: NonNull::from(entry),
        }
    }

    /// Load the entry value.
    #[inline]
    #[must_use]
    pub fn read(&self) -> PtEntry {
        // SAFETY: the slot was derived from a live page table via the
        // PhysMapper contract; the table outlives the monitor command.
        unsafe { self.ptr.as_ptr().read_volatile() }
    }

    /// Store a new entry value as a single whole-word write.
    ///
    /// Caller must handle any required TLB invalidation when changing
    /// active mappings.
    #[inline]
    pub fn write(&self, e: PtEntry) {
        // SAFETY: see `read`.
        unsafe { self.ptr.as_ptr().write_volatile(e) }
    }
}

/// Outcome of translating one virtual address.
#[derive(Debug)]
pub enum Translation {
    /// The page is present; `frame` backs it.
    Mapped {
        /// Location of the leaf entry.
        entry: PteSlot,
        /// The physical frame the page maps to.
        frame: PhysicalPage,
    },
    /// A leaf entry exists but its present flag is clear.
    ///
    /// The entry location is still surfaced so permission bits of an
    /// unmapped page remain inspectable and patchable.
    NotPresent {
        /// Location of the leaf entry.
        entry: PteSlot,
    },
    /// No page table covers this address at all.
    Unmapped,
}

impl<'m, M: PhysMapper> AddressSpace<'m, M> {
    /// Construct from a known page-directory frame.
    #[inline]
    pub const fn from_root(mapper: &'m M, root: PhysicalPage) -> Self {
        Self { root, mapper }
    }

    /// Physical page of the page directory.
    #[inline]
    #[must_use]
    pub const fn root_page(&self) -> PhysicalPage {
        self.root
    }

    /// Borrow the [`PageDirectory`] as a typed table.
    #[inline]
    fn pd_mut(&self) -> &mut PageDirectory {
        // SAFETY: the root frame holds the live page directory per the
        // constructor contract.
        unsafe { self.mapper.phys_to_mut(self.root.base()) }
    }

    /// Borrow a [`PageTable`] in the given frame.
    #[inline]
    fn pt_mut(&self, page: PhysicalPage) -> &mut PageTable {
        // SAFETY: `page` came out of a present directory entry, which per
        // the paging invariants points at a page table.
        unsafe { self.mapper.phys_to_mut(page.base()) }
    }

    /// Locate the leaf entry for `va`, if its page table exists.
    ///
    /// This is a pure walk: a missing page table yields `None` and is never
    /// allocated.
    #[must_use]
    pub fn walk(&self, va: VirtualAddress) -> Option<PteSlot> {
        let pd = self.pd_mut();
        let pt_page = pd.get(PdIndex::from(va)).next_table()?;
        let pt = self.pt_mut(pt_page);
        Some(PteSlot::new(pt.entry_mut(PtIndex::from(va))))
    }

    /// Translate `va`, classifying the result.
    ///
    /// Side-effect free; reads exactly one directory entry and (when the
    /// table exists) one leaf entry.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Translation {
        let Some(entry) = self.walk(va) else {
            return Translation::Unmapped;
        };
        match entry.read().page() {
            Some((frame, _)) => Translation::Mapped { entry, frame },
            None => Translation::NotPresent { entry },
        }
    }

    /// Translate a [`VirtualAddress`] to a [`PhysicalAddress`] if mapped.
    #[must_use]
    pub fn query(&self, va: VirtualAddress) -> Option<PhysicalAddress> {
        match self.translate(va) {
            Translation::Mapped { frame, .. } => Some(frame.base() + va.page_offset()),
            Translation::NotPresent { .. } | Translation::Unmapped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_table::{PdEntry, PtEntry};
    use crate::PageEntryBits;

    /// A 4 KiB-aligned raw frame. We use this as our "physical RAM" backing
    /// store in tests.
    #[repr(align(4096))]
    struct Aligned4K([u8; 4096]);

    impl Aligned4K {
        fn new_zeroed() -> Self {
            Self([0u8; 4096])
        }
    }

    /// A tiny in-memory "RAM": physical addresses are simple byte offsets
    /// from 0, frame `i` lives at `i * 4096`.
    ///
    /// This is *only* for tests. Real mappers must honor whatever direct
    /// mapping the kernel set up.
    struct TestPhys {
        frames: Vec<Aligned4K>,
    }

    impl TestPhys {
        fn with_frames(n: usize) -> Self {
            let mut v = Vec::with_capacity(n);
            for _ in 0..n {
                v.push(Aligned4K::new_zeroed());
            }
            Self { frames: v }
        }
    }

    impl PhysMapper for TestPhys {
        unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
            let idx = (pa.as_u32() >> 12) as usize;
            let off = (pa.as_u32() & 0xfff) as usize;
            // For page tables we expect offset==0; catch misuse in tests.
            debug_assert_eq!(off, 0);

            // SAFETY: the caller promises `T` matches the bytes in the frame.
            unsafe { &mut *(&raw const self.frames[idx] as *mut T) }
        }
    }

    /// Root directory in frame 0, one page table in frame 1, and `va`
    /// mapped to `pa` with the given leaf flags.
    fn space_with_mapping(
        phys: &TestPhys,
        va: VirtualAddress,
        pa: PhysicalAddress,
        leaf: PageEntryBits,
    ) -> AddressSpace<'_, TestPhys> {
        let root = PhysicalPage::from_addr(PhysicalAddress::new(0));
        let pt_page = PhysicalPage::from_addr(PhysicalAddress::new(0x1000));

        let pd: &mut PageDirectory = unsafe { phys.phys_to_mut(root.base()) };
        pd.set(
            PdIndex::from(va),
            PdEntry::present_next_with(PageEntryBits::new_common_rw(), pt_page),
        );

        let pt: &mut PageTable = unsafe { phys.phys_to_mut(pt_page.base()) };
        pt.set(
            PtIndex::from(va),
            PtEntry::present_leaf_with(leaf, PhysicalPage::from_addr(pa)),
        );

        AddressSpace::from_root(phys, root)
    }

    #[test]
    fn translate_mapped() {
        let phys = TestPhys::with_frames(8);
        let va = VirtualAddress::new(0x0000_1000);
        let pa = PhysicalAddress::new(0x0000_5000);
        let space = space_with_mapping(&phys, va, pa, PageEntryBits::new_user_rw());

        match space.translate(va) {
            Translation::Mapped { frame, .. } => assert_eq!(frame.base(), pa),
            other => panic!("expected Mapped, got {other:?}"),
        }
        assert_eq!(
            space.query(va.wrapping_add(0x123)),
            Some(PhysicalAddress::new(0x0000_5123))
        );
    }

    #[test]
    fn translate_unmapped_without_table() {
        let phys = TestPhys::with_frames(8);
        let root = PhysicalPage::from_addr(PhysicalAddress::new(0));
        let space = AddressSpace::from_root(&phys, root);

        let va = VirtualAddress::new(0x0040_0000);
        assert!(matches!(space.translate(va), Translation::Unmapped));
        assert!(space.walk(va).is_none());
        assert_eq!(space.query(va), None);
    }

    #[test]
    fn translate_not_present_surfaces_entry() {
        let phys = TestPhys::with_frames(8);
        let va = VirtualAddress::new(0x0000_2000);
        let space = space_with_mapping(
            &phys,
            // Map a *different* page so the table exists but `va`'s entry
            // stays zero.
            VirtualAddress::new(0x0000_1000),
            PhysicalAddress::new(0x0000_5000),
            PageEntryBits::new_user_rw(),
        );

        match space.translate(va) {
            Translation::NotPresent { entry } => {
                assert!(!entry.read().is_present());
            }
            other => panic!("expected NotPresent, got {other:?}"),
        }
        assert_eq!(space.query(va), None);
    }

    #[test]
    fn slot_write_observed_by_next_translate() {
        let phys = TestPhys::with_frames(8);
        let va = VirtualAddress::new(0x0000_1000);
        let pa = PhysicalAddress::new(0x0000_5000);
        let space = space_with_mapping(&phys, va, pa, PageEntryBits::new_user_rw());

        let Translation::Mapped { entry, .. } = space.translate(va) else {
            panic!("expected Mapped");
        };
        let e = entry.read();
        entry.write(e.with_flags(e.flags().with_present(false)));

        match space.translate(va) {
            Translation::NotPresent { entry } => {
                // Frame base and the other flags must have survived.
                let survived = entry.read();
                assert_eq!(survived.flags().physical_page().base(), pa);
                assert!(survived.flags().writable());
                assert!(survived.flags().user());
            }
            other => panic!("expected NotPresent, got {other:?}"),
        }
    }
}
