//! Raw memory access seams.
//!
//! The dumper and the unwinder read live memory at virtual addresses; the
//! page-table walk reads table frames at physical addresses. Both go
//! through small traits so tests can substitute an in-memory machine.

use kmon_addresses::{PhysicalAddress, VirtualAddress};
use kmon_info::memory::KERNEL_BASE;
use kmon_vmem::PhysMapper;

/// Word-granular reads from the live virtual address space.
///
/// These are raw diagnostic loads: reading through an unmapped address
/// faults the kernel. That is the accepted risk of a low-level inspection
/// tool and is deliberately not masked here.
pub trait MemoryRead {
    /// Read one machine word at `va`.
    fn read_word(&self, va: VirtualAddress) -> u32;
}

/// [`MemoryRead`] over the kernel's own address space.
pub struct KernelMemory;

impl MemoryRead for KernelMemory {
    fn read_word(&self, va: VirtualAddress) -> u32 {
        // SAFETY: inherently unchecked; see the trait contract.
        unsafe { core::ptr::read_volatile(va.as_u32() as usize as *const u32) }
    }
}

/// A physical→virtual translator that views physical memory through the
/// direct-mapped window.
///
/// Given a physical address `pa`, returns `&mut T` at virtual address
/// `KERNEL_BASE + pa`. All dereferences are unsafe by nature.
pub struct DirectMapper;

impl PhysMapper for DirectMapper {
    /// Convert a physical address to a mutable reference via the direct map.
    ///
    /// # Safety
    /// - The direct map must cover the entire `T` region at `pa`.
    /// - `pa` must point to valid, uniquely-borrowed memory for `T`.
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        let va = KERNEL_BASE.wrapping_add(pa.as_u32()) as usize as *mut T;
        // SAFETY: forwarded from the caller per the trait contract.
        unsafe { &mut *va }
    }
}
