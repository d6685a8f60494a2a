use crate::memory::KERNEL_BASE;
use kmon_addresses::{PhysicalAddress, VirtualAddress, align_up};

/// Link-time symbol addresses of the kernel image.
///
/// The embedding kernel fills this in once from its linker symbols; the
/// monitor only reads it to answer `kerninfo`. All virtual symbols live in
/// the high half, so their physical counterpart is `virt - KERNEL_BASE`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KernelImage {
    /// Physical address of the first loaded byte.
    pub start: PhysicalAddress,
    /// Virtual address of the kernel entry point.
    pub entry: VirtualAddress,
    /// Virtual end of the text segment.
    pub etext: VirtualAddress,
    /// Virtual end of the initialized-data segment.
    pub edata: VirtualAddress,
    /// Virtual end of the image (bss included).
    pub end: VirtualAddress,
}

impl KernelImage {
    /// The physical alias of a high-half virtual symbol.
    #[must_use]
    pub const fn phys_of(va: VirtualAddress) -> PhysicalAddress {
        PhysicalAddress::new(va.as_u32().wrapping_sub(KERNEL_BASE))
    }

    /// Executable footprint in whole KiB, `entry` through `end` rounded up.
    #[must_use]
    pub const fn footprint_kib(&self) -> u32 {
        align_up(self.end.as_u32().wrapping_sub(self.entry.as_u32()), 1024) / 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> KernelImage {
        KernelImage {
            start: PhysicalAddress::new(0x0010_000c),
            entry: VirtualAddress::new(0xF010_000c),
            etext: VirtualAddress::new(0xF010_1871),
            edata: VirtualAddress::new(0xF011_2300),
            end: VirtualAddress::new(0xF011_2944),
        }
    }

    #[test]
    fn phys_alias() {
        assert_eq!(
            KernelImage::phys_of(image().etext),
            PhysicalAddress::new(0x0010_1871)
        );
    }

    #[test]
    fn footprint_rounds_up_to_kib() {
        // 0xF0112944 - 0xF010000c = 0x12938 = 76088 bytes -> 75 KiB rounded up.
        assert_eq!(image().footprint_kib(), 75);
    }
}
