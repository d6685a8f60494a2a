use bitfield_struct::bitfield;
use kmon_addresses::{PhysicalAddress, PhysicalPage};

/// A single 32-bit page-table entry in its raw bitfield form.
///
/// Both paging levels share this layout: a page directory entry (PDE) holds
/// the base of a page table, a page table entry (PTE) holds the base of a
/// mapped 4 KiB frame. The flag bits and the frame field are independently
/// settable; updating one never disturbs the other.
///
/// ### Bit layout
///
/// | Bits  | Name / Mnemonic | Meaning |
/// |-------|-----------------|----------|
/// | 0     | `P` (present)   | Valid entry if set |
/// | 1     | `RW`            | Writable if set |
/// | 2     | `US`            | User-mode accessible if set |
/// | 3     | `PWT`           | Write-through caching |
/// | 4     | `PCD`           | Disable caching |
/// | 5     | `A`             | Accessed |
/// | 6     | `D`             | Dirty (leaf only) |
/// | 7     | `PAT`/`PS`      | PAT selector in a PTE; page-size in a PDE, always 0 here |
/// | 8     | `G`             | Global (leaf only) |
/// | 9–11  | OS avail        | Reserved for OS use |
/// | 12–31 | `addr`          | Physical frame bits [31:12] |
///
/// ### Example
/// ```rust
/// # use kmon_addresses::{PhysicalAddress, PhysicalPage};
/// # use kmon_vmem::PageEntryBits;
/// let mut e = PageEntryBits::new();
/// e.set_present(true);
/// e.set_writable(true);
/// e.set_physical_page(PhysicalPage::from_addr(PhysicalAddress::new(0x0015_4000)));
/// assert!(e.present());
/// assert_eq!(e.physical_page().base().as_u32(), 0x0015_4000);
/// ```
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct PageEntryBits {
    /// Present (P, bit 0).
    ///
    /// Set if the entry points to a valid page table (PDE) or mapped frame
    /// (PTE). Clear implies a not-present entry; the remaining bits are
    /// preserved and stay inspectable.
    pub present: bool,

    /// Writable (RW, bit 1).
    ///
    /// Set to allow writes; clear for read-only, subject to CR0.WP behavior
    /// in supervisor mode.
    pub writable: bool,

    /// User/Supervisor (US, bit 2).
    ///
    /// Set to allow user-mode access; clear restricts to supervisor only.
    pub user: bool,

    /// Page Write-Through (PWT, bit 3).
    pub write_through: bool,

    /// Page Cache Disable (PCD, bit 4).
    pub cache_disable: bool,

    /// Accessed (A, bit 5).
    ///
    /// Set by the CPU on first access through this entry. Not a permission
    /// bit; software may clear it to track usage.
    pub accessed: bool,

    /// Dirty (D, bit 6) — **leaf only**.
    ///
    /// Set by the CPU on first write through a PTE. Ignored in a PDE.
    pub dirty: bool,

    /// PAT selector (bit 7) in a PTE; the page-size bit in a PDE.
    ///
    /// This machine runs without large pages, so the bit must be clear in
    /// every directory entry.
    pub pat: bool,

    /// Global (G, bit 8) — **leaf only**.
    ///
    /// When set on a PTE, the TLB entry survives address-space switches
    /// unless explicitly invalidated.
    pub global: bool,

    /// OS-available (bits 9..=11). Hardware does not interpret these.
    #[bits(3)]
    pub os_available: u8,

    /// Physical address bits [31:12] (bits 12..=31).
    ///
    /// Stores the page-aligned base without the low 12 bits. Reconstruct
    /// the full physical address as `(bits << 12)`.
    #[bits(20)]
    frame: u32,
}

impl PageEntryBits {
    /// Set the page-aligned physical base address.
    #[inline]
    pub const fn set_physical_page(&mut self, page: PhysicalPage) {
        self.set_frame(page.base().as_u32() >> 12);
    }

    /// Builder form of [`set_physical_page`](Self::set_physical_page).
    #[inline]
    #[must_use]
    pub const fn with_physical_page(mut self, page: PhysicalPage) -> Self {
        self.set_physical_page(page);
        self
    }

    /// The page-aligned physical base address stored in the entry.
    #[inline]
    #[must_use]
    pub const fn physical_page(&self) -> PhysicalPage {
        PhysicalPage::from_addr(PhysicalAddress::new(self.frame() << 12))
    }

    /// Supervisor read/write flags, the common non-leaf form.
    #[inline]
    #[must_use]
    pub const fn new_common_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_user(false)
    }

    /// Present, user-accessible, read-only flags.
    #[inline]
    #[must_use]
    pub const fn new_user_ro() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(false)
            .with_user(true)
    }

    /// Present, user-accessible, writable flags.
    #[inline]
    #[must_use]
    pub const fn new_user_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_user(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_and_flags_are_independent() {
        let page = PhysicalPage::from_addr(PhysicalAddress::new(0x0030_0000));
        let e = PageEntryBits::new_user_rw().with_physical_page(page);
        assert_eq!(e.physical_page().base().as_u32(), 0x0030_0000);

        let cleared = e.with_writable(false);
        assert_eq!(cleared.physical_page(), e.physical_page());
        assert!(cleared.present());
        assert!(cleared.user());
        assert!(!cleared.writable());
        // Exactly one bit differs.
        assert_eq!(u32::from(e) ^ u32::from(cleared), 1 << 1);
    }
}
