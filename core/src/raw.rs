//! Document-independent raw entries.
//!
//! A reader collects every entry into these types first; the model is then
//! built from the complete set, so aliases and requirement command lists may
//! refer forward to entries declared later in the document.

use crate::feature::FeatureKind;

/// A `<command>` entry before alias resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommand {
    pub name: Option<String>,
    /// Name of the aliased command, when this entry is an alias.
    pub alias: Option<String>,
    /// Type of the first declared parameter.
    pub first_param_type: Option<String>,
    /// APIs this entry is restricted to. `None` means every API.
    pub apis: Option<Vec<String>>,
}

impl RawCommand {
    /// A command declared with its own signature.
    pub fn declared(name: impl Into<String>, first_param_type: Option<&str>) -> Self {
        Self {
            name: Some(name.into()),
            first_param_type: first_param_type.map(str::to_string),
            ..Self::default()
        }
    }

    /// A command declared as an alias of `target`.
    pub fn aliased(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            alias: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn with_apis(mut self, apis: Vec<String>) -> Self {
        self.apis = Some(apis);
        self
    }

    pub fn supports_api(&self, api: &str) -> bool {
        self.apis
            .as_ref()
            .is_some_and(|apis| apis.iter().any(|candidate| candidate == api))
    }
}

/// The two document shapes a feature is declared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureShape {
    /// `<feature number="1.3">`
    CoreVersion { number: Option<String> },
    /// `<extension>` with an optional `*_SPEC_VERSION` value.
    Extension { spec_version: Option<String> },
}

impl FeatureShape {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::CoreVersion { .. } => FeatureKind::CoreVersion,
            Self::Extension { .. } => FeatureKind::Extension,
        }
    }
}

/// A `<require>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequirement {
    pub depends: Option<String>,
    pub apis: Option<Vec<String>>,
    pub commands: Vec<String>,
}

/// A `<feature>` or `<extension>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeature {
    pub name: String,
    pub shape: FeatureShape,
    pub apis: Vec<String>,
    pub depends: Option<String>,
    pub deprecated_by: Option<String>,
    pub requires: Vec<RawRequirement>,
    pub removes: Vec<String>,
}

impl RawFeature {
    pub fn new(name: impl Into<String>, shape: FeatureShape) -> Self {
        Self {
            name: name.into(),
            shape,
            apis: Vec::new(),
            depends: None,
            deprecated_by: None,
            requires: Vec::new(),
            removes: Vec::new(),
        }
    }
}

/// Splits a comma separated attribute value, trimming and dropping empties.
///
/// ```
/// use vk_dispatch_core::raw::split_list;
///
/// assert_eq!(split_list("vulkan, vulkansc,"), vec!["vulkan", "vulkansc"]);
/// ```
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
