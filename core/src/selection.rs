//! Selection policy: which features a caller asked for.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::feature::{Feature, FeatureKind};
use crate::version::ApiVersion;

/// Highest core version to enable.
///
/// ```
/// use vk_dispatch_core::{ApiVersion, VersionCeiling};
///
/// let ceiling: VersionCeiling = "1.1".parse().unwrap();
/// assert!(ceiling.admits(ApiVersion::new(1, 1)));
/// assert!(!ceiling.admits(ApiVersion::new(1, 2)));
/// assert!("latest".parse::<VersionCeiling>().unwrap().admits(ApiVersion::new(9, 9)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionCeiling {
    #[default]
    Latest,
    AtMost(ApiVersion),
}

impl VersionCeiling {
    pub fn admits(&self, version: ApiVersion) -> bool {
        match self {
            Self::Latest => true,
            Self::AtMost(ceiling) => version <= *ceiling,
        }
    }
}

impl fmt::Display for VersionCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::AtMost(version) => write!(f, "{version}"),
        }
    }
}

impl FromStr for VersionCeiling {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("latest") {
            Ok(Self::Latest)
        } else {
            ApiVersion::parse(s).map(Self::AtMost)
        }
    }
}

impl TryFrom<String> for VersionCeiling {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionCeiling> for String {
    fn from(value: VersionCeiling) -> Self {
        value.to_string()
    }
}

/// Which extensions to enable.
///
/// Serialized as a list of names, where a list containing `all` means
/// every extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum ExtensionSelection {
    #[default]
    All,
    Named(BTreeSet<String>),
}

impl ExtensionSelection {
    /// Parses a comma separated list.
    ///
    /// Quote characters are stripped, empty entries skipped, and the
    /// presence of `all` anywhere selects every extension.
    ///
    /// ```
    /// use vk_dispatch_core::ExtensionSelection;
    ///
    /// assert_eq!(
    ///     ExtensionSelection::parse_list("'VK_KHR_surface', ,\"VK_KHR_swapchain\""),
    ///     ExtensionSelection::named(["VK_KHR_surface", "VK_KHR_swapchain"])
    /// );
    /// assert_eq!(ExtensionSelection::parse_list("VK_KHR_surface,all"), ExtensionSelection::All);
    /// ```
    pub fn parse_list(text: &str) -> Self {
        text.split(',')
            .map(|item| item.replace(['"', '\''], "").trim().to_string())
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .into()
    }

    /// Like [`parse_list`](Self::parse_list); an absent list selects nothing.
    pub fn parse_optional(text: Option<&str>) -> Self {
        text.map_or_else(|| Self::Named(BTreeSet::new()), Self::parse_list)
    }

    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(name),
        }
    }
}

impl From<Vec<String>> for ExtensionSelection {
    fn from(names: Vec<String>) -> Self {
        if names.iter().any(|name| name == "all") {
            Self::All
        } else {
            Self::Named(names.into_iter().collect())
        }
    }
}

impl From<ExtensionSelection> for Vec<String> {
    fn from(selection: ExtensionSelection) -> Self {
        match selection {
            ExtensionSelection::All => vec!["all".to_string()],
            ExtensionSelection::Named(names) => names.into_iter().collect(),
        }
    }
}

impl fmt::Display for ExtensionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Named(names) if names.is_empty() => write!(f, "none"),
            Self::Named(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

/// Why a selection leaves a feature disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// The feature does not list the selected API.
    UnsupportedApi,
    /// The core version is above the requested ceiling.
    AboveCeiling,
    /// The extension was not requested.
    NotRequested,
    /// The extension is deprecated and deprecated features are off.
    Deprecated,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedApi => write!(f, "API not supported"),
            Self::AboveCeiling => write!(f, "above requested version"),
            Self::NotRequested => write!(f, "not requested"),
            Self::Deprecated => write!(f, "deprecated"),
        }
    }
}

/// The full selection policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub api: String,
    pub api_version: VersionCeiling,
    pub extensions: ExtensionSelection,
    pub allow_deprecated: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            api: "vulkan".to_string(),
            api_version: VersionCeiling::Latest,
            extensions: ExtensionSelection::All,
            allow_deprecated: true,
        }
    }
}

impl Selection {
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            ..Self::default()
        }
    }

    pub fn with_api_version(mut self, ceiling: VersionCeiling) -> Self {
        self.api_version = ceiling;
        self
    }

    pub fn with_extensions(mut self, extensions: ExtensionSelection) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_deprecated(mut self, allow: bool) -> Self {
        self.allow_deprecated = allow;
        self
    }

    /// The first reason `feature` is excluded, or `None` if it is selected.
    pub fn exclusion(&self, feature: &Feature) -> Option<Exclusion> {
        if !feature.supports(&self.api) {
            return Some(Exclusion::UnsupportedApi);
        }
        match feature.kind() {
            FeatureKind::CoreVersion if !self.api_version.admits(feature.version()) => {
                Some(Exclusion::AboveCeiling)
            }
            FeatureKind::CoreVersion => None,
            FeatureKind::Extension if !self.extensions.contains(feature.name()) => {
                Some(Exclusion::NotRequested)
            }
            FeatureKind::Extension if feature.is_deprecated() && !self.allow_deprecated => {
                Some(Exclusion::Deprecated)
            }
            FeatureKind::Extension => None,
        }
    }

    pub fn admits(&self, feature: &Feature) -> bool {
        self.exclusion(feature).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CommandCatalog;
    use crate::raw::{FeatureShape, RawFeature};

    fn feature(name: &str, shape: FeatureShape, apis: &[&str], deprecated: bool) -> Feature {
        let mut raw = RawFeature::new(name, shape);
        raw.apis = apis.iter().map(|api| api.to_string()).collect();
        if deprecated {
            raw.deprecated_by = Some("VK_KHR_replacement".to_string());
        }
        Feature::from_raw(&raw, &CommandCatalog::new()).unwrap()
    }

    fn core(name: &str, number: &str) -> Feature {
        feature(
            name,
            FeatureShape::CoreVersion {
                number: Some(number.to_string()),
            },
            &["vulkan"],
            false,
        )
    }

    fn extension(name: &str, deprecated: bool) -> Feature {
        feature(name, FeatureShape::Extension { spec_version: None }, &["vulkan"], deprecated)
    }

    #[test]
    fn test_default_selection() {
        let selection = Selection::default();
        assert_eq!(selection.api, "vulkan");
        assert_eq!(selection.api_version, VersionCeiling::Latest);
        assert_eq!(selection.extensions, ExtensionSelection::All);
        assert!(selection.allow_deprecated);
    }

    #[test]
    fn test_core_version_ceiling() {
        let selection = Selection::default().with_api_version("1.1".parse().unwrap());
        assert!(selection.admits(&core("VK_VERSION_1_0", "1.0")));
        assert!(selection.admits(&core("VK_VERSION_1_1", "1.1")));
        assert_eq!(
            selection.exclusion(&core("VK_VERSION_1_2", "1.2")),
            Some(Exclusion::AboveCeiling)
        );
    }

    #[test]
    fn test_unsupported_api_is_excluded() {
        let selection = Selection::new("vulkansc");
        assert_eq!(
            selection.exclusion(&core("VK_VERSION_1_0", "1.0")),
            Some(Exclusion::UnsupportedApi)
        );
    }

    #[test]
    fn test_named_extensions() {
        let selection =
            Selection::default().with_extensions(ExtensionSelection::named(["VK_KHR_surface"]));
        assert!(selection.admits(&extension("VK_KHR_surface", false)));
        assert_eq!(
            selection.exclusion(&extension("VK_KHR_swapchain", false)),
            Some(Exclusion::NotRequested)
        );
    }

    #[test]
    fn test_deprecated_extensions() {
        let old = extension("VK_EXT_old", true);
        assert!(Selection::default().admits(&old));
        assert_eq!(
            Selection::default().with_deprecated(false).exclusion(&old),
            Some(Exclusion::Deprecated)
        );
    }

    #[test]
    fn test_ceiling_does_not_affect_extensions() {
        let selection = Selection::default().with_api_version("1.0".parse().unwrap());
        let mut raw = RawFeature::new(
            "VK_KHR_surface",
            FeatureShape::Extension {
                spec_version: Some("25".to_string()),
            },
        );
        raw.apis = vec!["vulkan".to_string()];
        let surface = Feature::from_raw(&raw, &CommandCatalog::new()).unwrap();
        assert!(selection.admits(&surface));
    }

    #[test]
    fn test_parse_optional_absent_selects_nothing() {
        let selection = ExtensionSelection::parse_optional(None);
        assert_eq!(selection, ExtensionSelection::Named(BTreeSet::new()));
        assert!(!selection.contains("VK_KHR_surface"));
        assert_eq!(selection.to_string(), "none");
    }

    #[test]
    fn test_parse_list_skips_empty_entries() {
        assert_eq!(
            ExtensionSelection::parse_list(",,"),
            ExtensionSelection::Named(BTreeSet::new())
        );
        assert_eq!(ExtensionSelection::parse_list("\"all\""), ExtensionSelection::All);
    }

    #[test]
    fn test_ceiling_parsing() {
        assert_eq!("latest".parse::<VersionCeiling>().unwrap(), VersionCeiling::Latest);
        assert_eq!(
            "1.3".parse::<VersionCeiling>().unwrap(),
            VersionCeiling::AtMost(ApiVersion::new(1, 3))
        );
        assert!("newest".parse::<VersionCeiling>().is_err());
        assert_eq!(VersionCeiling::AtMost(ApiVersion::new(1, 2)).to_string(), "1.2");
    }

    #[test]
    fn test_selection_serde() {
        let selection: Selection = serde_json::from_str(
            r#"{"api_version": "1.2", "extensions": ["VK_KHR_surface"], "allow_deprecated": false}"#,
        )
        .unwrap();
        assert_eq!(selection.api, "vulkan");
        assert_eq!(selection.api_version, VersionCeiling::AtMost(ApiVersion::new(1, 2)));
        assert!(selection.extensions.contains("VK_KHR_surface"));
        assert!(!selection.allow_deprecated);

        let json = serde_json::to_value(Selection::default()).unwrap();
        assert_eq!(json["api_version"], "latest");
        assert_eq!(json["extensions"], serde_json::json!(["all"]));
    }
}
