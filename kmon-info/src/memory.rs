//! # Memory Layout

use kmon_addresses::PAGE_SIZE;

/// Base of the kernel's virtual address range.
///
/// Everything at and above [`KERNEL_BASE`] is the direct-mapped view of
/// physical memory: virtual address `KERNEL_BASE + pa` resolves to physical
/// address `pa` for the first [`DIRECT_MAP_BYTES`] of RAM.
///
/// # Kernel Build
/// This information is sourced by the kernel's linker script; the monitor
/// treats it as a fixed property of the machine.
pub const KERNEL_BASE: u32 = 0xF000_0000;

/// Size of the direct-mapped physical window starting at [`KERNEL_BASE`].
///
/// Physical addresses beyond this window have no direct-mapped virtual
/// alias; dumping them through the physical-origin path is undefined.
pub const DIRECT_MAP_BYTES: u32 = 0x1000_0000; // 256 MiB

const _: () = {
    assert!(KERNEL_BASE.is_multiple_of(PAGE_SIZE));
    assert!(DIRECT_MAP_BYTES.is_multiple_of(PAGE_SIZE));
    // The window must fit between KERNEL_BASE and the top of the address space.
    assert!(KERNEL_BASE.checked_add(DIRECT_MAP_BYTES - 1).is_some());
};
