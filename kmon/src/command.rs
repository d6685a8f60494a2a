use crate::MonitorError;

/// Identifier of a registered monitor command.
///
/// Dispatch is a match on this enum rather than a stored function pointer;
/// the table below only maps names to identifiers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommandId {
    Help,
    KernelInfo,
    ShowMappings,
    Modify,
    Dump,
    Backtrace,
}

/// One row of the command table.
#[derive(Debug)]
pub struct CommandDescriptor {
    /// The name typed at the prompt.
    pub name: &'static str,
    /// One-line description shown by `help`.
    pub description: &'static str,
    /// The dispatch identifier.
    pub id: CommandId,
}

/// The registered commands.
///
/// Static and immutable for the life of the process; the console borrows
/// it, nothing ever mutates it.
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        description: "Display this list of commands",
        id: CommandId::Help,
    },
    CommandDescriptor {
        name: "kerninfo",
        description: "Display information about the kernel",
        id: CommandId::KernelInfo,
    },
    CommandDescriptor {
        name: "showmappings",
        description: "Display physical page mappings",
        id: CommandId::ShowMappings,
    },
    CommandDescriptor {
        name: "modify",
        description: "Modify permission bits",
        id: CommandId::Modify,
    },
    CommandDescriptor {
        name: "dump",
        description: "Dump the contents of a VA/PA address range",
        id: CommandId::Dump,
    },
    CommandDescriptor {
        name: "backtrace",
        description: "Display a stack backtrace",
        id: CommandId::Backtrace,
    },
];

impl CommandId {
    /// Look a command up by its name.
    ///
    /// # Errors
    /// [`MonitorError::UnknownCommand`] when the name matches nothing.
    pub fn from_name(name: &str) -> Result<Self, MonitorError> {
        COMMANDS
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or(MonitorError::UnknownCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(
            CommandId::from_name("showmappings").unwrap(),
            CommandId::ShowMappings
        );
        assert_eq!(
            CommandId::from_name("mappings"),
            Err(MonitorError::UnknownCommand)
        );
    }

    #[test]
    fn table_names_are_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
