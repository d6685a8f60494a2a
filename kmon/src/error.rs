use core::fmt;
use thiserror::Error;

/// Everything a monitor command can report to the user.
///
/// All variants are user-input errors: the console loop prints them and
/// keeps running; none are fatal to the monitor. Genuine memory faults
/// raised by dumping or unwinding through unmapped memory are handled (if
/// at all) by the surrounding kernel fault path, not here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    /// A command was given fewer arguments than it needs.
    #[error("not enough arguments")]
    InsufficientArguments,

    /// An address argument was not parsable as hexadecimal.
    #[error("expected a hexadecimal address")]
    InvalidAddress,

    /// The dump origin token was neither `P` nor `V`.
    #[error("dump origin must be 'P' or 'V'")]
    InvalidOrigin,

    /// An operation or permission-bit token was not recognized.
    #[error("unknown option '{0}'")]
    UnknownOption(char),

    /// No page-table entry exists for the address, so there is nothing to
    /// patch.
    #[error("no page-table entry maps that address")]
    EntryNotFound,

    /// The command name matched nothing in the command table.
    #[error("unknown command")]
    UnknownCommand,

    /// The line held more tokens than the argument buffer.
    #[error("too many arguments")]
    TooManyArguments,

    /// The output sink rejected a write.
    #[error("console output failed")]
    Output(#[from] fmt::Error),
}
