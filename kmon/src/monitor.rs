//! The monitor: command dispatch over a live machine.

use crate::command::{COMMANDS, CommandId};
use crate::console::{Flow, LineReader, MAX_ARGS, parse_hex, tokenize};
use crate::error::MonitorError;
use crate::memory::MemoryRead;
use crate::symbols::SymbolResolver;
use crate::unwind::{DEFAULT_BACKTRACE_LIMIT, FrameWalker, TrapframeSnapshot};
use crate::{dump, patch, report};
use core::fmt;
use kmon_addresses::VirtualAddress;
use kmon_info::KernelImage;
use kmon_vmem::{AddressSpace, PhysMapper};

/// The interactive kernel monitor.
///
/// Borrows everything it inspects — the page-table root, raw memory, the
/// symbol tables, the kernel image record and an optional trapframe — and
/// keeps no state of its own between commands. Each command is a single
/// synchronous request/response cycle; the only mutation the monitor ever
/// performs is the permission patch of `modify`.
pub struct Monitor<'ctx, M: PhysMapper> {
    space: AddressSpace<'ctx, M>,
    mem: &'ctx dyn MemoryRead,
    symbols: &'ctx dyn SymbolResolver,
    image: &'ctx KernelImage,
    trapframe: Option<&'ctx TrapframeSnapshot>,
    backtrace_limit: usize,
}

impl<'ctx, M: PhysMapper> Monitor<'ctx, M> {
    /// Assemble a monitor over the given machine state.
    pub fn new(
        space: AddressSpace<'ctx, M>,
        mem: &'ctx dyn MemoryRead,
        symbols: &'ctx dyn SymbolResolver,
        image: &'ctx KernelImage,
    ) -> Self {
        Self {
            space,
            mem,
            symbols,
            image,
            trapframe: None,
            backtrace_limit: DEFAULT_BACKTRACE_LIMIT,
        }
    }

    /// Attach the register snapshot captured at the fault point.
    #[must_use]
    pub const fn with_trapframe(mut self, trapframe: &'ctx TrapframeSnapshot) -> Self {
        self.trapframe = Some(trapframe);
        self
    }

    /// Override the backtrace frame cap.
    #[must_use]
    pub const fn with_backtrace_limit(mut self, limit: usize) -> Self {
        self.backtrace_limit = limit;
        self
    }

    /// The interactive loop: read a line, run it, repeat.
    ///
    /// Ends when the line reader signals end of input or a handler returns
    /// [`Flow::Exit`]. User-input errors are printed and the loop
    /// continues.
    ///
    /// # Errors
    /// Only if the output sink rejects a write.
    pub fn run<R, W>(&self, reader: &mut R, out: &mut W) -> fmt::Result
    where
        R: LineReader + ?Sized,
        W: fmt::Write + ?Sized,
    {
        writeln!(out, "Welcome to the kmon kernel monitor!")?;
        writeln!(out, "Type 'help' for a list of commands.")?;

        while let Some(line) = reader.read_line("K> ") {
            match self.dispatch(line, out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(MonitorError::Output(e)) => return Err(e),
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        Ok(())
    }

    /// Tokenize one input line and run the named command.
    fn dispatch<W: fmt::Write + ?Sized>(
        &self,
        line: &str,
        out: &mut W,
    ) -> Result<Flow, MonitorError> {
        let mut argv = [""; MAX_ARGS];
        let argc = tokenize(line, &mut argv)?;
        if argc == 0 {
            return Ok(Flow::Continue);
        }

        match CommandId::from_name(argv[0]) {
            Ok(id) => self.exec(id, &argv[1..argc], out),
            Err(MonitorError::UnknownCommand) => {
                writeln!(out, "Unknown command '{}'", argv[0])?;
                Ok(Flow::Continue)
            }
            Err(e) => Err(e),
        }
    }

    fn exec<W: fmt::Write + ?Sized>(
        &self,
        id: CommandId,
        args: &[&str],
        out: &mut W,
    ) -> Result<Flow, MonitorError> {
        match id {
            CommandId::Help => self.cmd_help(out),
            CommandId::KernelInfo => self.cmd_kerninfo(out),
            CommandId::ShowMappings => self.cmd_showmappings(args, out),
            CommandId::Modify => self.cmd_modify(args),
            CommandId::Dump => self.cmd_dump(args, out),
            CommandId::Backtrace => self.cmd_backtrace(out),
        }
    }

    fn cmd_help<W: fmt::Write + ?Sized>(&self, out: &mut W) -> Result<Flow, MonitorError> {
        for command in COMMANDS {
            writeln!(out, "{} - {}", command.name, command.description)?;
        }
        Ok(Flow::Continue)
    }

    fn cmd_kerninfo<W: fmt::Write + ?Sized>(&self, out: &mut W) -> Result<Flow, MonitorError> {
        let image = self.image;
        writeln!(out, "Special kernel symbols:")?;
        writeln!(out, "  _start {} (phys)", image.start)?;
        for (name, va) in [
            ("entry", image.entry),
            ("etext", image.etext),
            ("edata", image.edata),
            ("end  ", image.end),
        ] {
            writeln!(
                out,
                "  {name}  {va} (virt)  {pa} (phys)",
                pa = KernelImage::phys_of(va)
            )?;
        }
        writeln!(
            out,
            "Kernel executable memory footprint: {}KB",
            image.footprint_kib()
        )?;
        Ok(Flow::Continue)
    }

    fn cmd_showmappings<W: fmt::Write + ?Sized>(
        &self,
        args: &[&str],
        out: &mut W,
    ) -> Result<Flow, MonitorError> {
        if args.len() < 2 {
            return Err(MonitorError::InsufficientArguments);
        }
        let start = VirtualAddress::new(parse_hex(args[0])?);
        let end = VirtualAddress::new(parse_hex(args[1])?);
        report::report(&self.space, start, end, out)?;
        Ok(Flow::Continue)
    }

    fn cmd_modify(&self, args: &[&str]) -> Result<Flow, MonitorError> {
        if args.len() < 3 {
            return Err(MonitorError::InsufficientArguments);
        }
        let va = VirtualAddress::new(parse_hex(args[0])?);
        let op = patch::PatchOp::from_token(args[1])?;
        let bit = patch::PermissionBit::from_token(args[2])?;
        patch::patch(&self.space, va, op, bit)?;
        Ok(Flow::Continue)
    }

    fn cmd_dump<W: fmt::Write + ?Sized>(
        &self,
        args: &[&str],
        out: &mut W,
    ) -> Result<Flow, MonitorError> {
        if args.len() < 3 {
            return Err(MonitorError::InsufficientArguments);
        }
        let start = parse_hex(args[0])?;
        let end = parse_hex(args[1])?;
        let origin = dump::DumpOrigin::from_token(args[2])?;
        dump::dump(self.mem, start, end, origin, out)?;
        Ok(Flow::Continue)
    }

    fn cmd_backtrace<W: fmt::Write + ?Sized>(&self, out: &mut W) -> Result<Flow, MonitorError> {
        writeln!(out, "Stack backtrace:")?;
        let Some(trapframe) = self.trapframe else {
            writeln!(out, "  no trapframe; backtrace unavailable")?;
            return Ok(Flow::Continue);
        };

        let walker = FrameWalker::new(self.mem, trapframe.frame_pointer(), self.backtrace_limit);
        for frame in walker {
            write!(
                out,
                "  ebp {}  eip {}  args",
                frame.frame_pointer, frame.return_address
            )?;
            for arg in frame.args {
                write!(out, " 0x{arg:08x}")?;
            }
            writeln!(out)?;

            let info = self.symbols.resolve(frame.return_address);
            writeln!(
                out,
                "         {}:{}: {}+{}",
                info.file,
                info.line,
                info.display_name(),
                frame.return_address.wrapping_sub(info.addr)
            )?;
        }
        Ok(Flow::Continue)
    }
}
