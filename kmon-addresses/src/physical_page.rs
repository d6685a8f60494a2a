use crate::{PAGE_SHIFT, PAGE_SIZE, PhysicalAddress, align_down};

/// The page-aligned base address of one physical 4 KiB frame.
///
/// This doubles as the frame descriptor the monitor reports for a mapping:
/// the base identifies the frame, [`number`](Self::number) is its index in
/// physical memory. The monitor only ever *looks up* frames; it never owns
/// or frees them.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage(PhysicalAddress);

impl PhysicalPage {
    /// Build a page from any address inside it (rounds down to the base).
    #[must_use]
    pub const fn from_addr(addr: PhysicalAddress) -> Self {
        Self(PhysicalAddress::new(align_down(addr.as_u32(), PAGE_SIZE)))
    }

    /// The page base address (always 4 KiB aligned).
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.0
    }

    /// The physical frame number (`base >> 12`).
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0.as_u32() >> PAGE_SHIFT
    }
}

impl core::fmt::Display for PhysicalPage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for PhysicalPage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:08x} (frame #{})", self.0.as_u32(), self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_base() {
        let page = PhysicalPage::from_addr(PhysicalAddress::new(0x0015_4abc));
        assert_eq!(page.base().as_u32(), 0x0015_4000);
        assert_eq!(page.number(), 0x154);
    }
}
