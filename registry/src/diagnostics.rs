//! Diagnostics produced while selecting and resolving features.
//!
//! The resolver returns these as data and also logs each one at `debug`
//! level. Callers decide how warnings are surfaced.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vk_dispatch_core::{ApiVersion, Exclusion, FeatureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// One event from a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    FeatureEnabled {
        feature: String,
        kind: FeatureKind,
        version: ApiVersion,
    },
    FeatureDisabled {
        feature: String,
        kind: FeatureKind,
        reason: Exclusion,
    },
    DeprecatedFeature {
        feature: String,
        deprecated_by: String,
    },
    /// A requirement block whose dependency did not hold. `commands` is the
    /// number of commands it would have contributed.
    RequirementSkipped {
        feature: String,
        dependency: String,
        commands: usize,
    },
    CommandRemoved {
        feature: String,
        command: String,
    },
}

impl Diagnostic {
    /// Deprecations and skipped requirements that drop commands are
    /// warnings; everything else is informational.
    pub fn severity(&self) -> Severity {
        match self {
            Self::DeprecatedFeature { .. } => Severity::Warning,
            Self::RequirementSkipped { commands, .. } if *commands > 0 => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    /// The feature the event is about.
    pub fn feature(&self) -> &str {
        match self {
            Self::FeatureEnabled { feature, .. }
            | Self::FeatureDisabled { feature, .. }
            | Self::DeprecatedFeature { feature, .. }
            | Self::RequirementSkipped { feature, .. }
            | Self::CommandRemoved { feature, .. } => feature,
        }
    }

    pub(crate) fn log(&self) {
        debug!(
            feature = self.feature(),
            severity = %self.severity(),
            "{}",
            self
        );
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureEnabled {
                feature,
                kind,
                version,
            } => write!(f, "enabled {kind} \"{feature}\" v{version}"),
            Self::FeatureDisabled {
                feature,
                kind,
                reason,
            } => write!(f, "disabled {kind} \"{feature}\" ({reason})"),
            Self::DeprecatedFeature {
                feature,
                deprecated_by,
            } => write!(
                f,
                "the feature \"{feature}\" is deprecated by \"{deprecated_by}\""
            ),
            Self::RequirementSkipped {
                feature,
                dependency,
                ..
            } => write!(
                f,
                "in \"{feature}\", a requirement was disabled because its dependency (\"{dependency}\") was not satisfied"
            ),
            Self::CommandRemoved { feature, command } => {
                write!(f, "\"{feature}\" removed the command \"{command}\"")
            }
        }
    }
}
