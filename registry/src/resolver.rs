//! Resolution of a feature selection into a command set.
//!
//! Resolution runs in a fixed order:
//!
//! 1. Selection sets each feature's enabled flag from the [`Selection`].
//! 2. Enabled core versions add the commands of every satisfied requirement.
//! 3. Enabled extensions do the same.
//! 4. Every enabled feature applies its removals.
//!
//! Removals run after all additions, so a command removed by one feature
//! stays removed even if another feature requires it.

use std::collections::BTreeSet;

use tracing::{debug, info};
use vk_dispatch_core::{CommandSet, Feature, Selection};

use crate::diagnostics::Diagnostic;
use crate::error::ResolveError;
use crate::specification::Specification;

/// The output of a successful resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Final commands, partitioned by level.
    pub commands: CommandSet,
    /// Names of every enabled core version and extension.
    pub enabled: BTreeSet<String>,
    /// Everything that happened along the way, in order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_warning())
    }
}

/// Applies a [`Selection`] to a [`Specification`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    selection: Selection,
}

impl Resolver {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Sets every feature's enabled flag from the selection.
    ///
    /// Returns one enabled or disabled diagnostic per feature. No dependency
    /// is checked here.
    pub fn select(&self, specification: &mut Specification) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for feature in specification.all_features_mut() {
            let diagnostic = match self.selection.exclusion(feature) {
                None => {
                    feature.enable();
                    Diagnostic::FeatureEnabled {
                        feature: feature.name().to_string(),
                        kind: feature.kind(),
                        version: feature.version(),
                    }
                }
                Some(reason) => {
                    feature.disable();
                    Diagnostic::FeatureDisabled {
                        feature: feature.name().to_string(),
                        kind: feature.kind(),
                        reason,
                    }
                }
            };
            record(&mut diagnostics, diagnostic);
        }
        diagnostics
    }

    /// Selects features and resolves the final command set.
    ///
    /// # Errors
    ///
    /// [`ResolveError::ApiMismatch`] when the selection's API is not the one
    /// `specification` was loaded for, and
    /// [`ResolveError::UnsatisfiedDependency`] when an enabled feature's own
    /// dependency does not hold. Nothing partial is returned.
    pub fn resolve(&self, specification: &mut Specification) -> Result<Resolution, ResolveError> {
        if self.selection.api != specification.api() {
            return Err(ResolveError::ApiMismatch {
                selected: self.selection.api.clone(),
                loaded: specification.api().to_string(),
            });
        }
        let mut diagnostics = self.select(specification);
        let specification = &*specification;
        let enabled = specification.enabled_names();
        let mut commands = CommandSet::new();

        let core = enabled_in(specification.features().values());
        let extensions = enabled_in(specification.extensions().values());

        for feature in core.iter().chain(&extensions) {
            self.add_feature(feature, &enabled, &mut commands, &mut diagnostics)?;
        }

        for feature in core.iter().chain(&extensions) {
            for name in feature.removals() {
                if commands.remove_named(name) {
                    record(
                        &mut diagnostics,
                        Diagnostic::CommandRemoved {
                            feature: feature.name().to_string(),
                            command: name.clone(),
                        },
                    );
                }
            }
        }

        info!(
            global = commands.global_commands().len(),
            instance = commands.instance_commands().len(),
            device = commands.device_commands().len(),
            enabled = enabled.len(),
            "resolved command set"
        );

        Ok(Resolution {
            commands,
            enabled,
            diagnostics,
        })
    }

    fn add_feature(
        &self,
        feature: &Feature,
        enabled: &BTreeSet<String>,
        commands: &mut CommandSet,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), ResolveError> {
        if let Some(replacement) = feature.deprecated_by() {
            record(
                diagnostics,
                Diagnostic::DeprecatedFeature {
                    feature: feature.name().to_string(),
                    deprecated_by: replacement.to_string(),
                },
            );
        }

        if !feature.is_satisfied(enabled) {
            return Err(ResolveError::UnsatisfiedDependency {
                feature: feature.name().to_string(),
                kind: feature.kind(),
                dependency: feature.dependency().to_string(),
            });
        }

        for requirement in feature
            .requirements()
            .iter()
            .filter(|requirement| requirement.applies_to(&self.selection.api))
        {
            if requirement.is_satisfied(enabled) {
                for command in requirement.commands() {
                    if commands.add(command.clone()) {
                        debug!(
                            feature = feature.name(),
                            command = command.name(),
                            level = %command.level(),
                            "added command"
                        );
                    }
                }
            } else {
                record(
                    diagnostics,
                    Diagnostic::RequirementSkipped {
                        feature: feature.name().to_string(),
                        dependency: requirement.dependency().to_string(),
                        commands: requirement.commands().len(),
                    },
                );
            }
        }
        Ok(())
    }
}

fn enabled_in<'a>(features: impl Iterator<Item = &'a Feature>) -> Vec<&'a Feature> {
    features.filter(|feature| feature.is_enabled()).collect()
}

fn record(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    diagnostic.log();
    diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_dispatch_core::{ClassificationRules, ExtensionSelection, VersionCeiling};

    const REMOVALS: &str = r#"<registry>
    <commands>
        <command>
            <proto><type>void</type> <name>vkCmdA</name></proto>
            <param><type>VkCommandBuffer</type> <name>cb</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkCmdB</name></proto>
            <param><type>VkCommandBuffer</type> <name>cb</name></param>
        </command>
    </commands>
    <feature api="vulkan,vulkansc" name="VK_VERSION_1_0" number="1.0">
        <require><command name="vkCmdA"/><command name="vkCmdB"/></require>
        <require api="vulkansc" depends="VK_VERSION_9_9"><command name="vkCmdB"/></require>
    </feature>
    <feature api="vulkansc" name="VKSC_VERSION_1_0" number="1.0" depends="VK_VERSION_1_0">
        <remove><command name="vkCmdB"/><command name="vkCmdMissing"/></remove>
    </feature>
    <extensions>
        <extension name="VK_EXT_b" supported="vulkan,vulkansc">
            <require><command name="vkCmdB"/></require>
        </extension>
    </extensions>
    <types><type>#define <name>VK_HEADER_VERSION</name> 1</type></types>
</registry>"#;

    fn load(api: &str) -> Specification {
        Specification::from_xml(REMOVALS, api, &ClassificationRules::default()).unwrap()
    }

    #[test]
    fn test_removal_wins_over_later_addition() {
        let mut spec = load("vulkansc");
        let resolution = Resolver::new(Selection::new("vulkansc"))
            .resolve(&mut spec)
            .unwrap();

        assert!(resolution.commands.contains_named("vkCmdA"));
        assert!(!resolution.commands.contains_named("vkCmdB"));
        assert!(resolution.diagnostics.contains(&Diagnostic::CommandRemoved {
            feature: "VKSC_VERSION_1_0".to_string(),
            command: "vkCmdB".to_string(),
        }));
    }

    #[test]
    fn test_removals_of_other_api_do_not_apply() {
        let mut spec = load("vulkan");
        let resolution = Resolver::default().resolve(&mut spec).unwrap();
        assert!(resolution.commands.contains_named("vkCmdB"));
        assert!(!resolution.enabled.contains("VKSC_VERSION_1_0"));
    }

    #[test]
    fn test_requirement_for_other_api_is_ignored() {
        let mut spec = load("vulkan");
        let resolution = Resolver::default().resolve(&mut spec).unwrap();
        assert!(
            !resolution
                .diagnostics
                .iter()
                .any(|diagnostic| matches!(diagnostic, Diagnostic::RequirementSkipped { .. }))
        );
    }

    #[test]
    fn test_resolve_rejects_other_api() {
        let mut spec = load("vulkansc");
        let error = Resolver::new(Selection::new("vulkan"))
            .resolve(&mut spec)
            .unwrap_err();
        assert_eq!(
            error,
            ResolveError::ApiMismatch {
                selected: "vulkan".to_string(),
                loaded: "vulkansc".to_string(),
            }
        );
        assert!(spec.enabled_names().is_empty());
    }

    #[test]
    fn test_select_reports_every_feature() {
        let mut spec = load("vulkan");
        let selection = Selection::default()
            .with_api_version(VersionCeiling::Latest)
            .with_extensions(ExtensionSelection::named(Vec::<String>::new()));
        let diagnostics = Resolver::new(selection).select(&mut spec);
        assert_eq!(diagnostics.len(), 3);
        assert!(spec.features()["VK_VERSION_1_0"].is_enabled());
        assert!(!spec.features()["VKSC_VERSION_1_0"].is_enabled());
        assert!(!spec.extensions()["VK_EXT_b"].is_enabled());
    }

    #[test]
    fn test_reselecting_clears_previous_flags() {
        let mut spec = load("vulkan");
        Resolver::default().select(&mut spec);
        assert!(spec.extensions()["VK_EXT_b"].is_enabled());

        let narrow =
            Selection::default().with_extensions(ExtensionSelection::named(["VK_EXT_other"]));
        Resolver::new(narrow).select(&mut spec);
        assert!(!spec.extensions()["VK_EXT_b"].is_enabled());
    }
}
