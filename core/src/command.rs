//! Commands and their dispatch level.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Which dispatch table a command is loaded through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandLevel {
    /// Loadable before any instance exists.
    Global,
    /// Dispatched through an instance or physical device.
    Instance,
    /// Dispatched through a device or one of its children.
    Device,
}

impl CommandLevel {
    pub const ALL: [CommandLevel; 3] = [Self::Global, Self::Instance, Self::Device];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Global => 0,
            Self::Instance => 1,
            Self::Device => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Instance => "instance",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for CommandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Instance => write!(f, "Instance"),
            Self::Device => write!(f, "Device"),
        }
    }
}

/// A resolved command: a name and the level it dispatches at.
///
/// Identity, hashing and ordering use the name only.
///
/// # Examples
///
/// ```
/// use vk_dispatch_core::{Command, CommandLevel};
///
/// let a = Command::new("vkCreateDevice", CommandLevel::Instance);
/// let b = Command::new("vkCmdDraw", CommandLevel::Device);
/// assert!(b < a);
/// assert_eq!(a.to_string(), "vkCreateDevice");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    name: String,
    level: CommandLevel,
}

impl Command {
    pub fn new(name: impl Into<String>, level: CommandLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> CommandLevel {
        self.level
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Command {}

impl Hash for Command {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Command {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Command {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Inputs to command level classification.
///
/// The three levels are fixed; the name and handle sets feeding them are
/// configurable. Defaults match the Vulkan loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Prefix every command name must carry.
    pub namespace_prefix: String,
    /// Commands loadable without an instance.
    pub global_commands: BTreeSet<String>,
    /// First-parameter handle types that make a command instance-level.
    pub instance_handles: BTreeSet<String>,
    /// First-parameter handle types that make a command device-level.
    pub device_handles: BTreeSet<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        let set = |names: &[&str]| names.iter().map(|name| name.to_string()).collect();
        Self {
            namespace_prefix: "vk".to_string(),
            global_commands: set(&[
                "vkEnumerateInstanceVersion",
                "vkEnumerateInstanceExtensionProperties",
                "vkEnumerateInstanceLayerProperties",
                "vkCreateInstance",
                "vkGetInstanceProcAddr",
            ]),
            instance_handles: set(&["VkInstance", "VkPhysicalDevice"]),
            device_handles: set(&["VkDevice", "VkCommandBuffer", "VkQueue"]),
        }
    }
}

impl ClassificationRules {
    pub fn has_namespace(&self, name: &str) -> bool {
        name.starts_with(&self.namespace_prefix)
    }

    /// Determines the level of `name` given its first parameter's type.
    ///
    /// The global allow-list is checked first, then the instance and device
    /// handle sets.
    ///
    /// # Errors
    ///
    /// [`ModelError::UndeterminedLevel`] when the command is not global and
    /// its first parameter type (if any) is in neither handle set.
    ///
    /// # Examples
    ///
    /// ```
    /// use vk_dispatch_core::{ClassificationRules, CommandLevel};
    ///
    /// let rules = ClassificationRules::default();
    /// assert_eq!(
    ///     rules.classify("vkCreateInstance", None).unwrap(),
    ///     CommandLevel::Global
    /// );
    /// assert_eq!(
    ///     rules.classify("vkQueueSubmit", Some("VkQueue")).unwrap(),
    ///     CommandLevel::Device
    /// );
    /// assert!(rules.classify("vkFrob", Some("GLuint")).is_err());
    /// ```
    pub fn classify(&self, name: &str, first_param_type: Option<&str>) -> Result<CommandLevel> {
        if self.global_commands.contains(name) {
            return Ok(CommandLevel::Global);
        }
        match first_param_type {
            Some(ty) if self.instance_handles.contains(ty) => Ok(CommandLevel::Instance),
            Some(ty) if self.device_handles.contains(ty) => Ok(CommandLevel::Device),
            _ => Err(ModelError::UndeterminedLevel {
                name: name.to_string(),
                owner: first_param_type.map(str::to_string),
            }),
        }
    }
}
