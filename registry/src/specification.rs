//! The parsed registry: commands, core versions and extensions.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use vk_dispatch_core::raw::RawFeature;
use vk_dispatch_core::{
    ClassificationRules, Command, CommandCatalog, CommandIndex, Feature, ModelError,
};

use crate::document::RegistryDocument;
use crate::error::{RegistryError, Result};
use crate::locate::{locate_specification, require_file};

/// A registry document built into the model for one API.
///
/// Construction leaves every feature disabled; the
/// [`Resolver`](crate::Resolver) sets the flags.
#[derive(Debug, Clone)]
pub struct Specification {
    path: Option<PathBuf>,
    api: String,
    header_version: u32,
    commands: CommandCatalog,
    features: BTreeMap<String, Feature>,
    extensions: BTreeMap<String, Feature>,
}

impl Specification {
    /// Builds the model from raw entries.
    ///
    /// Commands are resolved first, in parallel, and collected into the
    /// catalog before any feature is built; features then resolve their
    /// requirement command names against the complete catalog.
    pub fn from_document(
        document: &RegistryDocument,
        api: &str,
        rules: &ClassificationRules,
    ) -> Result<Self> {
        let index = CommandIndex::new(&document.commands, api, rules)?;
        let resolved = index
            .entries()
            .par_iter()
            .map(|&entry| index.resolve(entry))
            .collect::<std::result::Result<Vec<Command>, ModelError>>()?;
        let commands = CommandCatalog::from_commands(resolved)?;
        debug!(count = commands.len(), "resolved commands");

        let features = build_features(&document.features, &commands)?;
        let extensions = build_features(&document.extensions, &commands)?;
        debug!(
            features = features.len(),
            extensions = extensions.len(),
            "built features"
        );

        let header_version = document
            .header_version(api)
            .ok_or(RegistryError::MissingHeaderVersion)?;

        Ok(Self {
            path: None,
            api: api.to_string(),
            header_version,
            commands,
            features,
            extensions,
        })
    }

    /// Parses registry XML text and builds the model.
    pub fn from_xml(text: &str, api: &str, rules: &ClassificationRules) -> Result<Self> {
        let document = RegistryDocument::parse(text)?;
        Self::from_document(&document, api, rules)
    }

    /// Reads and builds the registry at `path`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotAFile`] when `path` is missing or not a regular
    /// file, plus everything [`from_xml`](Self::from_xml) can return.
    pub fn load(path: impl AsRef<Path>, api: &str, rules: &ClassificationRules) -> Result<Self> {
        let path = path.as_ref();
        require_file(path)?;
        let text = std::fs::read_to_string(path)?;
        let mut specification = Self::from_xml(&text, api, rules)?;
        info!(
            path = %path.display(),
            header_version = specification.header_version,
            "loaded Vulkan specification"
        );
        specification.path = Some(path.to_path_buf());
        Ok(specification)
    }

    /// Loads from `path` when given, otherwise from the first registry
    /// found by [`locate_specification`].
    pub fn load_or_locate(
        path: Option<&Path>,
        api: &str,
        rules: &ClassificationRules,
    ) -> Result<Self> {
        match path {
            Some(path) => Self::load(path, api, rules),
            None => Self::load(locate_specification()?, api, rules),
        }
    }

    /// The file this specification was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// The `VK_HEADER_VERSION` of the document.
    pub fn header_version(&self) -> u32 {
        self.header_version
    }

    pub fn commands(&self) -> &CommandCatalog {
        &self.commands
    }

    /// Core versions keyed by name.
    pub fn features(&self) -> &BTreeMap<String, Feature> {
        &self.features
    }

    /// Extensions keyed by name.
    pub fn extensions(&self) -> &BTreeMap<String, Feature> {
        &self.extensions
    }

    /// Looks a name up among core versions, then extensions.
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features
            .get(name)
            .or_else(|| self.extensions.get(name))
    }

    /// Core versions then extensions.
    pub fn all_features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values().chain(self.extensions.values())
    }

    pub(crate) fn all_features_mut(&mut self) -> impl Iterator<Item = &mut Feature> {
        self.features
            .values_mut()
            .chain(self.extensions.values_mut())
    }

    /// Names of every enabled core version and extension.
    pub fn enabled_names(&self) -> BTreeSet<String> {
        self.all_features()
            .filter(|feature| feature.is_enabled())
            .map(|feature| feature.name().to_string())
            .collect()
    }
}

fn build_features(
    raw: &[RawFeature],
    catalog: &CommandCatalog,
) -> Result<BTreeMap<String, Feature>> {
    let built = raw
        .par_iter()
        .map(|entry| Feature::from_raw(entry, catalog))
        .collect::<std::result::Result<Vec<_>, ModelError>>()?;

    let mut features = BTreeMap::new();
    for feature in built {
        let name = feature.name().to_string();
        if features.insert(name.clone(), feature).is_some() {
            warn!(feature = %name, "duplicate feature definition; keeping the last one");
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_dispatch_core::CommandLevel;

    const MINIMAL: &str = r#"<registry>
    <commands>
        <command>
            <proto><type>PFN_vkVoidFunction</type> <name>vkGetInstanceProcAddr</name></proto>
            <param optional="true"><type>VkInstance</type> <name>instance</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkCmdDraw</name></proto>
            <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
        </command>
    </commands>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require><command name="vkGetInstanceProcAddr"/></require>
    </feature>
    <extensions>
        <extension name="VK_EXT_draw" supported="vulkan">
            <require><command name="vkCmdDraw"/></require>
        </extension>
    </extensions>
    <types>
        <type category="define">#define <name>VK_HEADER_VERSION</name> 7</type>
    </types>
</registry>"#;

    fn rules() -> ClassificationRules {
        ClassificationRules::default()
    }

    #[test]
    fn test_from_xml_builds_everything_disabled() {
        let spec = Specification::from_xml(MINIMAL, "vulkan", &rules()).unwrap();
        assert_eq!(spec.header_version(), 7);
        assert_eq!(spec.api(), "vulkan");
        assert_eq!(spec.path(), None);
        assert_eq!(spec.commands().len(), 2);
        assert_eq!(
            spec.commands().get("vkCmdDraw").unwrap().level(),
            CommandLevel::Device
        );
        assert!(spec.features().contains_key("VK_VERSION_1_0"));
        assert!(spec.extensions().contains_key("VK_EXT_draw"));
        assert!(spec.all_features().all(|feature| !feature.is_enabled()));
        assert!(spec.enabled_names().is_empty());
    }

    #[test]
    fn test_feature_lookup_spans_both_maps() {
        let spec = Specification::from_xml(MINIMAL, "vulkan", &rules()).unwrap();
        assert!(spec.feature("VK_VERSION_1_0").is_some());
        assert!(spec.feature("VK_EXT_draw").is_some());
        assert!(spec.feature("VK_EXT_missing").is_none());
    }

    #[test]
    fn test_missing_header_version_fails() {
        let xml = MINIMAL.replace("VK_HEADER_VERSION", "VK_SOMETHING_ELSE");
        assert!(matches!(
            Specification::from_xml(&xml, "vulkan", &rules()),
            Err(RegistryError::MissingHeaderVersion)
        ));
    }

    #[test]
    fn test_unknown_requirement_command_fails() {
        let xml = MINIMAL.replace(
            r#"<command name="vkCmdDraw"/>"#,
            r#"<command name="vkCmdDrawMissing"/>"#,
        );
        assert!(matches!(
            Specification::from_xml(&xml, "vulkan", &rules()),
            Err(RegistryError::Model(ModelError::UnknownCommand { .. }))
        ));
    }

    #[test]
    fn test_load_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vk.xml");
        std::fs::write(&path, MINIMAL).unwrap();

        let spec = Specification::load(&path, "vulkan", &rules()).unwrap();
        assert_eq!(spec.path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_rejects_directory_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Specification::load(dir.path(), "vulkan", &rules()),
            Err(RegistryError::NotAFile(_))
        ));
        assert!(matches!(
            Specification::load(dir.path().join("nope.xml"), "vulkan", &rules()),
            Err(RegistryError::NotAFile(_))
        ));
    }
}
