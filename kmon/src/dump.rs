//! The raw memory dumper behind `dump`.

use crate::MonitorError;
use crate::memory::MemoryRead;
use core::fmt;
use kmon_addresses::{VirtualAddress, WORD_SHIFT, WORD_SIZE, align_up};
use kmon_info::memory::{DIRECT_MAP_BYTES, KERNEL_BASE};
use log::warn;

/// How the dump range is interpreted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DumpOrigin {
    /// `P` — endpoints are physical; relocated through the direct map.
    Physical,
    /// `V` — endpoints are virtual, used as given.
    Virtual,
}

impl DumpOrigin {
    /// Parse the origin token.
    ///
    /// # Errors
    /// [`MonitorError::InvalidOrigin`] for anything but `P` or `V`.
    pub fn from_token(token: &str) -> Result<Self, MonitorError> {
        match token {
            "P" => Ok(Self::Physical),
            "V" => Ok(Self::Virtual),
            _ => Err(MonitorError::InvalidOrigin),
        }
    }
}

/// Dump the raw word values of `[start, end)`.
///
/// Physical endpoints are first shifted into the direct-mapped view
/// (`va = KERNEL_BASE + pa`); this assumes the range lies inside the
/// direct-mapped window, and ranges beyond it are undefined — a warning is
/// logged rather than guessing a safe default. Both endpoints are then
/// rounded up to the word size before the word count is computed.
///
/// Every word is a raw load: dumping an unmapped page faults the kernel,
/// which is the accepted risk of this command.
///
/// # Errors
/// Only if the output sink rejects a write.
pub fn dump<W: fmt::Write + ?Sized>(
    mem: &dyn MemoryRead,
    start: u32,
    end: u32,
    origin: DumpOrigin,
    out: &mut W,
) -> fmt::Result {
    let (mut start, mut end) = (start, end);
    if origin == DumpOrigin::Physical {
        if end > DIRECT_MAP_BYTES {
            warn!("physical range 0x{start:08x}..0x{end:08x} leaves the direct-mapped window");
        }
        start = start.wrapping_add(KERNEL_BASE);
        end = end.wrapping_add(KERNEL_BASE);
    }
    let start = align_up(start, WORD_SIZE);
    let end = align_up(end, WORD_SIZE);
    let count = end.wrapping_sub(start) >> WORD_SHIFT;

    writeln!(out, "0x{start:08x}..0x{end:08x}, {count} words")?;
    for i in 0..count {
        let va = VirtualAddress::new(start.wrapping_add(i.wrapping_mul(WORD_SIZE)));
        writeln!(out, "[{va}]: 0x{:08x}", mem.read_word(va))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_tokens() {
        assert_eq!(DumpOrigin::from_token("P").unwrap(), DumpOrigin::Physical);
        assert_eq!(DumpOrigin::from_token("V").unwrap(), DumpOrigin::Virtual);
        assert_eq!(
            DumpOrigin::from_token("p"),
            Err(MonitorError::InvalidOrigin)
        );
        assert_eq!(
            DumpOrigin::from_token("PV"),
            Err(MonitorError::InvalidOrigin)
        );
    }
}
