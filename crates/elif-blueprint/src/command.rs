//! Per-field injection commands issued by policies

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Override flag altering how one field is injected during one construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Command {
    /// Leave the field at its zero value
    SkipInjection,
    /// Ignore the value already set on the seed
    SkipReferenceInjection,
    /// Do not fall back to the blueprint default or synthesize models
    SkipBlueprintInjection,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SkipInjection => write!(f, "SKIP_INJECTION"),
            Command::SkipReferenceInjection => write!(f, "SKIP_REFERENCE_INJECTION"),
            Command::SkipBlueprintInjection => write!(f, "SKIP_BLUEPRINT_INJECTION"),
        }
    }
}

pub type CommandSet = BTreeSet<Command>;

/// Commands accumulated per field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: HashMap<String, CommandSet>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command for a field, builder style
    pub fn with(mut self, field: impl Into<String>, command: Command) -> Self {
        self.add(field, command);
        self
    }

    pub fn add(&mut self, field: impl Into<String>, command: Command) {
        self.commands.entry(field.into()).or_default().insert(command);
    }

    pub fn extend(&mut self, field: impl Into<String>, commands: impl IntoIterator<Item = Command>) {
        self.commands.entry(field.into()).or_default().extend(commands);
    }

    /// Merge another table additively into this one
    pub fn merge(&mut self, other: CommandTable) {
        for (field, commands) in other.commands {
            self.extend(field, commands);
        }
    }

    pub fn get(&self, field: &str) -> Option<&CommandSet> {
        self.commands.get(field)
    }

    pub fn contains(&self, field: &str, command: Command) -> bool {
        self.commands
            .get(field)
            .is_some_and(|commands| commands.contains(&command))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.values().all(BTreeSet::is_empty)
    }
}

impl FromIterator<(String, Command)> for CommandTable {
    fn from_iter<I: IntoIterator<Item = (String, Command)>>(iter: I) -> Self {
        let mut table = CommandTable::new();
        for (field, command) in iter {
            table.add(field, command);
        }
        table
    }
}
