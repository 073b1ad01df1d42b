//! Command catalog construction.
//!
//! Building happens in two passes. [`CommandIndex::new`] indexes every raw
//! entry by name and settles duplicate names by API. [`CommandIndex::resolve`]
//! then turns one entry into a [`Command`], following alias chains through
//! the index. Resolution of separate entries is independent, so callers may
//! run it in parallel and collect into a [`CommandCatalog`].

use std::collections::btree_map;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::command::{ClassificationRules, Command};
use crate::error::{ModelError, Result};
use crate::raw::RawCommand;

/// Name index over raw command entries.
#[derive(Debug)]
pub struct CommandIndex<'a> {
    entries: Vec<&'a RawCommand>,
    by_name: HashMap<&'a str, usize>,
    rules: &'a ClassificationRules,
}

impl<'a> CommandIndex<'a> {
    /// Indexes `raw` for the given API.
    ///
    /// When two entries share a name, an entry whose `api` list contains
    /// `api` replaces one that does not. Two entries with no `api`
    /// restriction at all are a [`ModelError::DuplicateCommand`].
    pub fn new(
        raw: &'a [RawCommand],
        api: &str,
        rules: &'a ClassificationRules,
    ) -> Result<Self> {
        let mut entries: Vec<&'a RawCommand> = Vec::with_capacity(raw.len());
        let mut by_name = HashMap::with_capacity(raw.len());

        for entry in raw {
            let name = entry.name.as_deref().ok_or(ModelError::MissingCommandName)?;
            match by_name.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());
                    entries.push(entry);
                }
                Entry::Occupied(slot) => {
                    let current = entries[*slot.get()];
                    if entry.supports_api(api) && !current.supports_api(api) {
                        entries[*slot.get()] = entry;
                    } else if entry.apis.is_none() && current.apis.is_none() {
                        return Err(ModelError::DuplicateCommand(name.to_string()));
                    }
                }
            }
        }

        Ok(Self {
            entries,
            by_name,
            rules,
        })
    }

    /// Retained entries in document order.
    pub fn entries(&self) -> &[&'a RawCommand] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&'a RawCommand> {
        self.by_name.get(name).map(|&index| self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves one entry into a [`Command`].
    ///
    /// Checks run in this order: alias target exists, namespace prefix,
    /// level classification against the signature-bearing entry.
    pub fn resolve(&self, entry: &'a RawCommand) -> Result<Command> {
        let name = entry.name.as_deref().ok_or(ModelError::MissingCommandName)?;
        let signature = self.signature_of(name, entry)?;

        if !self.rules.has_namespace(name) {
            return Err(ModelError::MissingNamespace {
                name: name.to_string(),
                prefix: self.rules.namespace_prefix.clone(),
            });
        }

        let level = self
            .rules
            .classify(name, signature.first_param_type.as_deref())?;
        Ok(Command::new(name, level))
    }

    /// Follows the alias chain from `entry` to the entry that carries a
    /// parameter list.
    fn signature_of(&self, name: &str, entry: &'a RawCommand) -> Result<&'a RawCommand> {
        let mut visited = HashSet::from([name]);
        let mut current = entry;
        let mut current_name = name;

        while let Some(target) = current.alias.as_deref() {
            if !visited.insert(target) {
                return Err(ModelError::AliasCycle(target.to_string()));
            }
            current = self
                .get(target)
                .ok_or_else(|| ModelError::MissingAliasTarget {
                    alias: current_name.to_string(),
                    target: target.to_string(),
                })?;
            current_name = target;
        }

        Ok(current)
    }
}

/// Every resolved command of a document, keyed by name.
///
/// Commands are shared: requirements and command sets hold [`Arc`] handles
/// into the catalog.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: BTreeMap<String, Arc<Command>>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes and resolves `raw` sequentially.
    ///
    /// # Examples
    ///
    /// ```
    /// use vk_dispatch_core::raw::RawCommand;
    /// use vk_dispatch_core::{ClassificationRules, CommandCatalog, CommandLevel};
    ///
    /// let raw = vec![
    ///     RawCommand::aliased("vkResetQueryPoolEXT", "vkResetQueryPool"),
    ///     RawCommand::declared("vkResetQueryPool", Some("VkDevice")),
    /// ];
    /// let catalog =
    ///     CommandCatalog::build(&raw, "vulkan", &ClassificationRules::default()).unwrap();
    /// assert_eq!(
    ///     catalog.get("vkResetQueryPoolEXT").unwrap().level(),
    ///     CommandLevel::Device
    /// );
    /// ```
    pub fn build(raw: &[RawCommand], api: &str, rules: &ClassificationRules) -> Result<Self> {
        let index = CommandIndex::new(raw, api, rules)?;
        let commands = index
            .entries()
            .iter()
            .map(|&entry| index.resolve(entry))
            .collect::<Result<Vec<_>>>()?;
        Self::from_commands(commands)
    }

    /// Builds a catalog from already-resolved commands.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Result<Self> {
        let mut catalog = Self::new();
        for command in commands {
            catalog.register(command)?;
        }
        Ok(catalog)
    }

    /// Adds a command, rejecting a second command with the same name.
    pub fn register(&mut self, command: Command) -> Result<Arc<Command>> {
        match self.commands.entry(command.name().to_string()) {
            btree_map::Entry::Occupied(_) => {
                Err(ModelError::DuplicateCommand(command.name().to_string()))
            }
            btree_map::Entry::Vacant(slot) => {
                Ok(Arc::clone(slot.insert(Arc::new(command))))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.values()
    }
}
