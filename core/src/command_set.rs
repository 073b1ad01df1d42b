//! The working set of commands built up during resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::command::{Command, CommandLevel};

/// Commands partitioned by [`CommandLevel`].
///
/// A command lives in the tier of its level, so it can appear in at most one
/// tier. Each tier iterates in name order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vk_dispatch_core::{Command, CommandLevel, CommandSet};
///
/// let mut set = CommandSet::new();
/// set.add(Arc::new(Command::new("vkCmdDraw", CommandLevel::Device)));
/// set.add(Arc::new(Command::new("vkCreateInstance", CommandLevel::Global)));
/// assert_eq!(set.len(), 2);
/// assert!(set.remove_named("vkCmdDraw"));
/// assert!(set.device_commands().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    tiers: [BTreeSet<Arc<Command>>; 3],
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `command` to its tier. Returns `false` when already present.
    pub fn add(&mut self, command: Arc<Command>) -> bool {
        self.tiers[command.level().index()].insert(command)
    }

    /// Removes `command`. Removing an absent command is a no-op.
    pub fn remove(&mut self, command: &Command) -> bool {
        self.tiers[command.level().index()].remove(command)
    }

    /// Removes the command called `name` from whichever tier holds it.
    pub fn remove_named(&mut self, name: &str) -> bool {
        match self.find(name).cloned() {
            Some(command) => self.remove(&command),
            None => false,
        }
    }

    pub fn find(&self, name: &str) -> Option<&Arc<Command>> {
        self.iter().find(|command| command.name() == name)
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.tiers[command.level().index()].contains(command)
    }

    pub fn contains_named(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn tier(&self, level: CommandLevel) -> &BTreeSet<Arc<Command>> {
        &self.tiers[level.index()]
    }

    pub fn global_commands(&self) -> &BTreeSet<Arc<Command>> {
        self.tier(CommandLevel::Global)
    }

    pub fn instance_commands(&self) -> &BTreeSet<Arc<Command>> {
        self.tier(CommandLevel::Instance)
    }

    pub fn device_commands(&self) -> &BTreeSet<Arc<Command>> {
        self.tier(CommandLevel::Device)
    }

    /// Total over all tiers.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(BTreeSet::is_empty)
    }

    /// Every command, global tier first, then instance, then device.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.tiers.iter().flatten()
    }
}

impl Extend<Arc<Command>> for CommandSet {
    fn extend<I: IntoIterator<Item = Arc<Command>>>(&mut self, iter: I) {
        for command in iter {
            self.add(command);
        }
    }
}

impl FromIterator<Arc<Command>> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Arc<Command>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}
