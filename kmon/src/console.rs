//! Console-side plumbing: the line-input seam, the argument tokenizer and
//! the loop-control type shared by all command handlers.

use crate::MonitorError;

/// Blocking line input from the console device.
///
/// The monitor core does not read hardware; the embedding kernel supplies
/// whatever device backs the console. Returning `None` signals end of
/// input and ends the monitor loop.
pub trait LineReader {
    /// Display `prompt` and block until one line is available.
    fn read_line(&mut self, prompt: &str) -> Option<&str>;
}

/// What the console loop should do after a command handler returns.
///
/// Handlers report user-facing errors through `Err(MonitorError)` — those
/// are printed and the loop continues. `Exit` is the only way a handler
/// terminates the console.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Leave the monitor loop.
    Exit,
}

/// Upper bound on whitespace-separated tokens per line.
pub(crate) const MAX_ARGS: usize = 16;

/// Split `line` into whitespace-separated tokens.
///
/// Fills `argv` in order and returns the token count.
pub(crate) fn tokenize<'l>(
    line: &'l str,
    argv: &mut [&'l str; MAX_ARGS],
) -> Result<usize, MonitorError> {
    let mut argc = 0;
    for token in line.split_ascii_whitespace() {
        if argc == MAX_ARGS {
            return Err(MonitorError::TooManyArguments);
        }
        argv[argc] = token;
        argc += 1;
    }
    Ok(argc)
}

/// Parse a hexadecimal address token, `0x`/`0X` prefix optional.
pub(crate) fn parse_hex(token: &str) -> Result<u32, MonitorError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).map_err(|_| MonitorError::InvalidAddress)
}
