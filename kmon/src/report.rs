//! The mapping reporter behind `showmappings`.

use core::fmt;
use kmon_addresses::{PAGE_SHIFT, PAGE_SIZE, VirtualAddress};
use kmon_vmem::{AddressSpace, PhysMapper, Translation};
use log::warn;

/// Safety clamp on the number of report rows (24 bits).
///
/// Malformed input (for example a start address above the end address) can
/// produce a page count close to 2³²; the clamp bounds the damage. Callers
/// must not rely on the wraparound.
pub const PAGE_COUNT_MASK: u32 = 0x00FF_FFFF;

const fn flag(set: bool) -> char {
    if set { '1' } else { '0' }
}

/// Print one mapping row per page of `[start, end)`.
///
/// Rows come out in strictly increasing virtual-address order, one per
/// page, no gaps. A page whose leaf entry is missing or not present gets
/// the `None` placeholder row.
///
/// # Errors
/// Only if the output sink rejects a write.
pub fn report<M: PhysMapper, W: fmt::Write + ?Sized>(
    space: &AddressSpace<'_, M>,
    start: VirtualAddress,
    end: VirtualAddress,
    out: &mut W,
) -> fmt::Result {
    let span_pages = end.wrapping_sub(start) >> PAGE_SHIFT;
    let count = span_pages & PAGE_COUNT_MASK;
    if count != span_pages {
        warn!("page count 0x{span_pages:x} clamped to 0x{count:x}");
    }

    writeln!(out, "     VADDR       PADDR  PTE_U  PTE_W  PTE_P")?;
    for i in 0..count {
        let va = start.wrapping_add(i.wrapping_mul(PAGE_SIZE));
        match space.translate(va) {
            Translation::Mapped { entry, frame } => {
                let flags = entry.read().flags();
                writeln!(
                    out,
                    "{va}  {base}      {u}      {w}      {p}",
                    base = frame.base(),
                    u = flag(flags.user()),
                    w = flag(flags.writable()),
                    p = flag(flags.present()),
                )?;
            }
            Translation::NotPresent { .. } | Translation::Unmapped => {
                writeln!(out, "{va}        None   None   None   None")?;
            }
        }
    }
    Ok(())
}
