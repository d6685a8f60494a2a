//! The permission patcher behind `modify`.

use crate::MonitorError;
use kmon_addresses::VirtualAddress;
use kmon_vmem::{AddressSpace, PhysMapper, Translation};
use log::debug;

/// Whether `modify` clears or sets the named bit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PatchOp {
    /// `c` — clear the bit.
    Clear,
    /// `s` — set the bit.
    Set,
}

/// Which permission bit `modify` edits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PermissionBit {
    /// `P` — the present flag.
    Present,
    /// `U` — the user/supervisor flag.
    UserAccessible,
    /// `W` — the writable flag.
    Writable,
}

fn single_char(token: &str) -> Result<char, MonitorError> {
    let mut chars = token.chars();
    let first = chars.next().ok_or(MonitorError::UnknownOption('?'))?;
    if chars.next().is_some() {
        return Err(MonitorError::UnknownOption(first));
    }
    Ok(first)
}

impl PatchOp {
    /// Parse the single-character operation token.
    ///
    /// # Errors
    /// [`MonitorError::UnknownOption`] for anything but `c` or `s`.
    pub fn from_token(token: &str) -> Result<Self, MonitorError> {
        match single_char(token)? {
            'c' => Ok(Self::Clear),
            's' => Ok(Self::Set),
            other => Err(MonitorError::UnknownOption(other)),
        }
    }
}

impl PermissionBit {
    /// Parse the single-character permission-bit token.
    ///
    /// # Errors
    /// [`MonitorError::UnknownOption`] for anything but `P`, `U` or `W`.
    pub fn from_token(token: &str) -> Result<Self, MonitorError> {
        match single_char(token)? {
            'P' => Ok(Self::Present),
            'U' => Ok(Self::UserAccessible),
            'W' => Ok(Self::Writable),
            other => Err(MonitorError::UnknownOption(other)),
        }
    }
}

/// Set or clear exactly one permission bit on the leaf entry for `va`.
///
/// The update is a read of the whole entry, a single-bit change and one
/// whole-word store; every other bit — the frame base included — is left
/// byte-for-byte unchanged. This mutates live, externally-owned kernel
/// state in place: there is no rollback, and the next access to the page
/// may newly fault or newly succeed.
///
/// A leaf entry whose present flag is clear is still patchable; only a
/// missing page table means there is no entry to edit.
///
/// # Errors
/// [`MonitorError::EntryNotFound`] when no page table covers `va`.
pub fn patch<M: PhysMapper>(
    space: &AddressSpace<'_, M>,
    va: VirtualAddress,
    op: PatchOp,
    bit: PermissionBit,
) -> Result<(), MonitorError> {
    let slot = match space.translate(va) {
        Translation::Mapped { entry, .. } | Translation::NotPresent { entry } => entry,
        Translation::Unmapped => return Err(MonitorError::EntryNotFound),
    };

    let old = slot.read();
    let set = op == PatchOp::Set;
    let flags = match bit {
        PermissionBit::Present => old.flags().with_present(set),
        PermissionBit::UserAccessible => old.flags().with_user(set),
        PermissionBit::Writable => old.flags().with_writable(set),
    };
    let new = old.with_flags(flags);
    debug!(
        "pte for {va}: 0x{old:08x} -> 0x{new:08x}",
        old = old.raw(),
        new = new.raw()
    );
    slot.write(new);
    Ok(())
}
