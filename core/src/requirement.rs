//! Conditionally gated bundles of commands.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::CommandCatalog;
use crate::command::Command;
use crate::error::{ModelError, Result};
use crate::expr::DependencyExpr;
use crate::raw::RawRequirement;

/// A `<require>` block: commands contributed when `dependency` holds.
#[derive(Debug, Clone)]
pub struct Requirement {
    commands: BTreeSet<Arc<Command>>,
    dependency: String,
    expression: DependencyExpr,
    apis: Option<BTreeSet<String>>,
}

impl Requirement {
    /// Builds a requirement owned by `feature`, resolving each command name
    /// through `catalog`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownCommand`] when a name is not in the catalog and
    /// [`ModelError::MalformedExpression`] when `dependency` does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use vk_dispatch_core::{Command, CommandCatalog, CommandLevel, Requirement};
    ///
    /// let catalog = CommandCatalog::from_commands([
    ///     Command::new("vkCmdSetDepthBias2EXT", CommandLevel::Device),
    /// ])
    /// .unwrap();
    /// let requirement = Requirement::new(
    ///     "VK_EXT_depth_bias_control",
    ///     ["vkCmdSetDepthBias2EXT"],
    ///     "VK_KHR_dynamic_rendering,VK_VERSION_1_3",
    ///     &catalog,
    /// )
    /// .unwrap();
    ///
    /// let active: BTreeSet<String> = ["VK_VERSION_1_3".to_string()].into();
    /// assert!(requirement.is_satisfied(&active));
    /// assert_eq!(
    ///     requirement.to_header_guard(),
    ///     "defined(VK_KHR_dynamic_rendering) || defined(VK_VERSION_1_3)"
    /// );
    /// ```
    pub fn new<I, S>(
        feature: &str,
        commands: I,
        dependency: &str,
        catalog: &CommandCatalog,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let commands = commands
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                catalog
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ModelError::UnknownCommand {
                        feature: feature.to_string(),
                        command: name.to_string(),
                    })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        let expression =
            DependencyExpr::parse(dependency).map_err(|source| ModelError::MalformedExpression {
                expression: dependency.to_string(),
                source,
            })?;

        Ok(Self {
            commands,
            dependency: dependency.to_string(),
            expression,
            apis: None,
        })
    }

    pub(crate) fn from_raw(
        feature: &str,
        raw: &RawRequirement,
        catalog: &CommandCatalog,
    ) -> Result<Self> {
        let requirement = Self::new(
            feature,
            &raw.commands,
            raw.depends.as_deref().unwrap_or_default(),
            catalog,
        )?;
        Ok(match &raw.apis {
            Some(apis) => requirement.restricted_to(apis.iter().cloned()),
            None => requirement,
        })
    }

    /// Limits the requirement to the listed APIs.
    pub fn restricted_to(mut self, apis: impl IntoIterator<Item = String>) -> Self {
        self.apis = Some(apis.into_iter().collect());
        self
    }

    pub fn commands(&self) -> &BTreeSet<Arc<Command>> {
        &self.commands
    }

    /// Raw dependency text; empty when unconditional.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn expression(&self) -> &DependencyExpr {
        &self.expression
    }

    pub fn is_unconditional(&self) -> bool {
        self.expression.is_always()
    }

    /// Whether this block applies when generating for `api`.
    pub fn applies_to(&self, api: &str) -> bool {
        self.apis.as_ref().is_none_or(|apis| apis.contains(api))
    }

    pub fn is_satisfied(&self, active: &BTreeSet<String>) -> bool {
        self.expression.is_satisfied_by(active)
    }

    pub fn to_header_guard(&self) -> String {
        self.expression.to_guard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandLevel;

    fn catalog() -> CommandCatalog {
        CommandCatalog::from_commands([
            Command::new("vkResetQueryPool", CommandLevel::Device),
            Command::new("vkResetQueryPoolEXT", CommandLevel::Device),
        ])
        .unwrap()
    }

    #[test]
    fn test_unconditional_requirement() {
        let requirement =
            Requirement::new("VK_VERSION_1_2", ["vkResetQueryPool"], "", &catalog()).unwrap();
        assert!(requirement.is_unconditional());
        assert!(requirement.is_satisfied(&BTreeSet::new()));
        assert_eq!(requirement.to_header_guard(), "");
        assert_eq!(requirement.commands().len(), 1);
    }

    #[test]
    fn test_unknown_command_fails() {
        let err = Requirement::new("VK_EXT_x", ["vkMissing"], "", &catalog()).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownCommand {
                feature: "VK_EXT_x".to_string(),
                command: "vkMissing".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_dependency_fails() {
        let err =
            Requirement::new("VK_EXT_x", ["vkResetQueryPool"], "(A,B", &catalog()).unwrap_err();
        assert!(matches!(err, ModelError::MalformedExpression { .. }));
        assert!(err.to_string().contains("(A,B"));
    }

    #[test]
    fn test_dependency_gates_satisfaction() {
        let requirement = Requirement::new(
            "VK_EXT_host_query_reset",
            ["vkResetQueryPoolEXT"],
            "VK_KHR_get_physical_device_properties2,VK_VERSION_1_1",
            &catalog(),
        )
        .unwrap();
        assert!(!requirement.is_satisfied(&["VK_VERSION_1_0".to_string()].into()));
        assert!(requirement.is_satisfied(&["VK_VERSION_1_1".to_string()].into()));
    }

    #[test]
    fn test_from_raw_carries_api_restriction() {
        let raw = RawRequirement {
            depends: None,
            apis: Some(vec!["vulkansc".to_string()]),
            commands: vec!["vkResetQueryPool".to_string()],
        };
        let requirement = Requirement::from_raw("VK_VERSION_1_2", &raw, &catalog()).unwrap();
        assert!(requirement.applies_to("vulkansc"));
        assert!(!requirement.applies_to("vulkan"));

        let open = Requirement::from_raw("VK_VERSION_1_2", &RawRequirement::default(), &catalog())
            .unwrap();
        assert!(open.applies_to("vulkan"));
        assert!(open.commands().is_empty());
    }
}
