//! Core versions and extensions.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::CommandCatalog;
use crate::command::Command;
use crate::error::{ModelError, Result};
use crate::expr::DependencyExpr;
use crate::raw::{FeatureShape, RawFeature};
use crate::requirement::Requirement;
use crate::version::ApiVersion;

/// Which document shape a feature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    CoreVersion,
    Extension,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoreVersion => write!(f, "core version"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// A core API version or an extension: the unit callers select.
///
/// Everything except the enabled flag is fixed at construction. The flag
/// starts cleared and is set by the resolver.
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    kind: FeatureKind,
    version: ApiVersion,
    supported_apis: BTreeSet<String>,
    dependency: String,
    expression: DependencyExpr,
    deprecated_by: Option<String>,
    requirements: Vec<Requirement>,
    removals: BTreeSet<String>,
    enabled: bool,
}

impl Feature {
    /// Builds a feature from a raw entry, resolving requirement commands
    /// through `catalog`.
    ///
    /// Core versions take their version from the `number` attribute, which
    /// must be present. Extensions read their spec version as `"<n>.0"` and
    /// fall back to `0.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vk_dispatch_core::raw::{FeatureShape, RawFeature};
    /// use vk_dispatch_core::{ApiVersion, CommandCatalog, Feature};
    ///
    /// let mut raw = RawFeature::new(
    ///     "VK_KHR_surface",
    ///     FeatureShape::Extension { spec_version: Some("25".to_string()) },
    /// );
    /// raw.apis = vec!["vulkan".to_string()];
    ///
    /// let feature = Feature::from_raw(&raw, &CommandCatalog::new()).unwrap();
    /// assert_eq!(feature.version(), ApiVersion::new(25, 0));
    /// assert!(feature.supports("vulkan"));
    /// assert!(!feature.is_enabled());
    /// assert_eq!(feature.to_header_guard(), "defined(VK_KHR_surface)");
    /// ```
    pub fn from_raw(raw: &RawFeature, catalog: &CommandCatalog) -> Result<Self> {
        let version = match &raw.shape {
            FeatureShape::CoreVersion { number } => ApiVersion::parse_optional(number.as_deref())?,
            FeatureShape::Extension { spec_version } => match spec_version.as_deref() {
                Some(value) => ApiVersion::parse(&format!("{}.0", value.trim()))?,
                None => ApiVersion::default(),
            },
        };

        let dependency = raw.depends.clone().unwrap_or_default();
        let expression =
            DependencyExpr::parse(&dependency).map_err(|source| ModelError::MalformedExpression {
                expression: dependency.clone(),
                source,
            })?;

        let requirements = raw
            .requires
            .iter()
            .map(|requirement| Requirement::from_raw(&raw.name, requirement, catalog))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: raw.name.clone(),
            kind: raw.shape.kind(),
            version,
            supported_apis: raw.apis.iter().cloned().collect(),
            dependency,
            expression,
            deprecated_by: raw.deprecated_by.clone(),
            requirements,
            removals: raw.removes.iter().cloned().collect(),
            enabled: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn supported_apis(&self) -> &BTreeSet<String> {
        &self.supported_apis
    }

    pub fn supports(&self, api: &str) -> bool {
        self.supported_apis.contains(api)
    }

    /// The feature's own dependency text; empty when it has none.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn expression(&self) -> &DependencyExpr {
        &self.expression
    }

    pub fn deprecated_by(&self) -> Option<&str> {
        self.deprecated_by.as_deref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated_by.is_some()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Command names this feature removes once every addition is done.
    pub fn removals(&self) -> &BTreeSet<String> {
        &self.removals
    }

    /// Every command any requirement of this feature can contribute.
    pub fn commands(&self) -> BTreeSet<Arc<Command>> {
        self.requirements
            .iter()
            .flat_map(|requirement| requirement.commands().iter().cloned())
            .collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Evaluates the feature-level dependency only. Requirement
    /// dependencies are checked separately.
    pub fn is_satisfied(&self, active: &BTreeSet<String>) -> bool {
        self.expression.is_satisfied_by(active)
    }

    /// Guard for the feature's dependency alone.
    pub fn dependency_guard(&self) -> String {
        self.expression.to_guard()
    }

    /// `defined(NAME)`, ANDed with the dependency guard when there is one.
    ///
    /// ```
    /// use vk_dispatch_core::raw::{FeatureShape, RawFeature};
    /// use vk_dispatch_core::{CommandCatalog, Feature};
    ///
    /// let mut raw = RawFeature::new(
    ///     "VK_EXT_host_query_reset",
    ///     FeatureShape::Extension { spec_version: None },
    /// );
    /// raw.depends = Some("VK_KHR_get_physical_device_properties2,VK_VERSION_1_1".to_string());
    /// let feature = Feature::from_raw(&raw, &CommandCatalog::new()).unwrap();
    /// assert_eq!(
    ///     feature.to_header_guard(),
    ///     "defined(VK_EXT_host_query_reset) && \
    ///      (defined(VK_KHR_get_physical_device_properties2) || defined(VK_VERSION_1_1))"
    /// );
    /// ```
    pub fn to_header_guard(&self) -> String {
        let own = format!("defined({})", self.name);
        if self.expression.is_always() {
            own
        } else {
            format!("{own} && {}", self.expression.to_nested_guard())
        }
    }
}
