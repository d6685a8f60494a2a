//! The debug-symbol seam used by the backtrace renderer.

use kmon_addresses::VirtualAddress;

/// Source-level debug information for one program-counter value.
///
/// Names point into the kernel's static symbol tables; `name_len` is the
/// resolver-reported length to display (symbol tables store names embedded
/// in longer strings). The monitor only ever uses this record to compute
/// and print the byte offset of a return address inside its function.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SymbolInfo {
    /// Source file containing the address.
    pub file: &'static str,
    /// Source line within that file.
    pub line: u32,
    /// Name of the enclosing function.
    pub name: &'static str,
    /// Length of the name to display.
    pub name_len: usize,
    /// Address of the first instruction of the function.
    pub addr: VirtualAddress,
}

impl SymbolInfo {
    /// The sentinel record for an address no table covers.
    #[must_use]
    pub const fn unknown(pc: VirtualAddress) -> Self {
        Self {
            file: "<unknown>",
            line: 0,
            name: "<unknown>",
            name_len: 9,
            addr: pc,
        }
    }

    /// The function name truncated to its reported length.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        self.name
            .get(..self.name_len.min(self.name.len()))
            .unwrap_or(self.name)
    }
}

/// Translates a code address into source-level debug information.
///
/// Loading and indexing the kernel's symbol tables is the embedding
/// kernel's business; the monitor only issues point queries. Resolvers
/// return the [`SymbolInfo::unknown`] sentinel instead of failing.
pub trait SymbolResolver {
    /// Resolve `pc` to its enclosing function and source position.
    fn resolve(&self, pc: VirtualAddress) -> SymbolInfo;
}

/// Resolver used when no symbol table was loaded.
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn resolve(&self, pc: VirtualAddress) -> SymbolInfo {
        SymbolInfo::unknown(pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sentinel() {
        let pc = VirtualAddress::new(0xF010_1234);
        let info = NoSymbols.resolve(pc);
        assert_eq!(info.display_name(), "<unknown>");
        assert_eq!(info.addr, pc);
        assert_eq!(info.line, 0);
    }

    #[test]
    fn display_name_truncates() {
        let info = SymbolInfo {
            file: "kern/init.c",
            line: 44,
            name: "i386_init:other_junk",
            name_len: 9,
            addr: VirtualAddress::new(0xF010_0040),
        };
        assert_eq!(info.display_name(), "i386_init");
    }
}
