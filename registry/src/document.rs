//! XML reader for `vk.xml`.
//!
//! Walks the `<registry>` element once and collects raw entries. Nothing is
//! resolved here: aliases, requirement command names and dependency
//! expressions stay as text until [`Specification`](crate::Specification)
//! builds the model from the complete set.

use roxmltree::{Document, Node};
use tracing::debug;
use vk_dispatch_core::raw::{FeatureShape, RawCommand, RawFeature, RawRequirement, split_list};

use crate::error::{RegistryError, Result};

const HEADER_VERSION_DEFINE: &str = "VK_HEADER_VERSION";

/// A `VK_HEADER_VERSION` define, optionally restricted to some APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderVersion {
    pub apis: Option<Vec<String>>,
    pub value: u32,
}

/// Raw entries read from one registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryDocument {
    pub commands: Vec<RawCommand>,
    pub features: Vec<RawFeature>,
    pub extensions: Vec<RawFeature>,
    pub header_versions: Vec<HeaderVersion>,
}

impl RegistryDocument {
    /// Parses registry XML text.
    ///
    /// Top-level elements other than `<commands>`, `<feature>`,
    /// `<extensions>` and `<types>` are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let doc = Document::parse(text)?;
        let mut document = Self::default();

        for node in doc.root_element().children().filter(Node::is_element) {
            match node.tag_name().name() {
                "commands" => {
                    for command in elements(node, "command") {
                        document.commands.push(read_command(command)?);
                    }
                }
                "feature" => document.features.push(read_feature(node)?),
                "extensions" => {
                    for extension in node.children().filter(Node::is_element) {
                        document.extensions.push(read_feature(extension)?);
                    }
                }
                "types" => {
                    for ty in elements(node, "type") {
                        if let Some(version) = read_header_version(ty)? {
                            document.header_versions.push(version);
                        }
                    }
                }
                _ => {}
            }
        }

        debug!(
            commands = document.commands.len(),
            features = document.features.len(),
            extensions = document.extensions.len(),
            "read registry document"
        );
        Ok(document)
    }

    /// The header version for `api`.
    ///
    /// A define restricted to `api` wins over an unrestricted one; failing
    /// both, the first define in the document is used.
    pub fn header_version(&self, api: &str) -> Option<u32> {
        let for_api = self.header_versions.iter().find(|version| {
            version
                .apis
                .as_ref()
                .is_some_and(|apis| apis.iter().any(|candidate| candidate == api))
        });
        let unrestricted = || self.header_versions.iter().find(|version| version.apis.is_none());
        for_api
            .or_else(unrestricted)
            .or_else(|| self.header_versions.first())
            .map(|version| version.value)
    }
}

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str> {
    node.attribute(attribute)
        .ok_or_else(|| RegistryError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

fn api_list(node: Node<'_, '_>) -> Option<Vec<String>> {
    node.attribute("api").map(split_list)
}

fn read_command(node: Node<'_, '_>) -> Result<RawCommand> {
    let command = match node.attribute("alias") {
        Some(target) => RawCommand {
            name: node.attribute("name").map(str::to_string),
            alias: Some(target.to_string()),
            ..RawCommand::default()
        },
        None => {
            let name = node
                .children()
                .find(|child| child.has_tag_name("proto"))
                .and_then(|proto| child_text(proto, "name"));
            let first_param_type = node
                .children()
                .find(|child| child.has_tag_name("param"))
                .and_then(|param| child_text(param, "type"));
            RawCommand {
                name: name.map(str::to_string),
                first_param_type: first_param_type.map(str::to_string),
                ..RawCommand::default()
            }
        }
    };

    Ok(RawCommand {
        apis: api_list(node),
        ..command
    })
}

fn read_feature(node: Node<'_, '_>) -> Result<RawFeature> {
    let tag = node.tag_name().name();
    if tag != "feature" && tag != "extension" {
        return Err(RegistryError::UnrecognizedTag(tag.to_string()));
    }

    let name = required_attribute(node, "name")?;
    let (shape, apis) = match tag {
        "feature" => (
            FeatureShape::CoreVersion {
                number: node.attribute("number").map(str::to_string),
            },
            required_attribute(node, "api")?,
        ),
        "extension" => (
            FeatureShape::Extension {
                spec_version: spec_version(node, name).map(str::to_string),
            },
            required_attribute(node, "supported")?,
        ),
        other => return Err(RegistryError::UnrecognizedTag(other.to_string())),
    };

    let mut feature = RawFeature::new(name, shape);
    feature.apis = split_list(apis);
    feature.depends = node.attribute("depends").map(str::to_string);
    feature.deprecated_by = node.attribute("deprecatedby").map(str::to_string);

    for block in elements(node, "require") {
        let commands = elements(block, "command")
            .map(|command| required_attribute(command, "name").map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        feature.requires.push(RawRequirement {
            depends: block.attribute("depends").map(str::to_string),
            apis: api_list(block),
            commands,
        });
    }

    for block in elements(node, "remove") {
        for command in elements(block, "command") {
            feature
                .removes
                .push(required_attribute(command, "name")?.to_string());
        }
    }

    Ok(feature)
}

/// `require/enum[@name = UPPER(name) + "_SPEC_VERSION"]/@value`
fn spec_version<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    let wanted = format!("{}_SPEC_VERSION", name.to_uppercase());
    elements(node, "require")
        .flat_map(|block| elements(block, "enum"))
        .find(|item| item.attribute("name") == Some(wanted.as_str()))
        .and_then(|item| item.attribute("value"))
}

/// Reads `<type>... <name>VK_HEADER_VERSION</name> 290</type>`.
fn read_header_version(node: Node<'_, '_>) -> Result<Option<HeaderVersion>> {
    let Some(name) = node
        .children()
        .find(|child| child.has_tag_name("name") && child.text() == Some(HEADER_VERSION_DEFINE))
    else {
        return Ok(None);
    };

    let text = name.tail().unwrap_or_default().trim();
    let value = text
        .parse()
        .map_err(|_| RegistryError::InvalidHeaderVersion(text.to_string()))?;
    Ok(Some(HeaderVersion {
        apis: api_list(node),
        value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
    <comment>ignored</comment>
    <types>
        <type category="include" name="vk_platform"/>
        <type api="vulkan" category="define">// Version of this file
#define <name>VK_HEADER_VERSION</name> 290</type>
        <type api="vulkansc" category="define">// Version of this file
#define <name>VK_HEADER_VERSION</name> 15</type>
    </types>
    <commands>
        <command api="vulkan">
            <proto><type>void</type> <name>vkCmdDraw</name></proto>
            <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
        </command>
        <command name="vkCmdDrawKHR" alias="vkCmdDraw"/>
        <command>
            <proto><type>VkResult</type> <name>vkEnumerateInstanceVersion</name></proto>
        </command>
    </commands>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <type name="VkInstance"/>
            <command name="vkCmdDraw"/>
        </require>
        <remove>
            <command name="vkCmdDrawKHR"/>
        </remove>
    </feature>
    <extensions>
        <extension name="VK_KHR_draw" supported="vulkan,vulkansc" depends="VK_VERSION_1_1" deprecatedby="VK_VERSION_1_2">
            <require api="vulkansc" depends="VK_KHR_other">
                <enum value="3" name="VK_KHR_DRAW_SPEC_VERSION"/>
                <command name="vkCmdDrawKHR"/>
            </require>
        </extension>
    </extensions>
</registry>"#;

    #[test]
    fn test_reads_commands() {
        let document = RegistryDocument::parse(SMALL).unwrap();
        assert_eq!(document.commands.len(), 3);

        let draw = &document.commands[0];
        assert_eq!(draw.name.as_deref(), Some("vkCmdDraw"));
        assert_eq!(draw.first_param_type.as_deref(), Some("VkCommandBuffer"));
        assert_eq!(draw.apis, Some(vec!["vulkan".to_string()]));

        let alias = &document.commands[1];
        assert_eq!(alias.name.as_deref(), Some("vkCmdDrawKHR"));
        assert_eq!(alias.alias.as_deref(), Some("vkCmdDraw"));
        assert_eq!(alias.first_param_type, None);

        assert_eq!(document.commands[2].first_param_type, None);
    }

    #[test]
    fn test_reads_core_feature() {
        let document = RegistryDocument::parse(SMALL).unwrap();
        let feature = &document.features[0];
        assert_eq!(feature.name, "VK_VERSION_1_0");
        assert_eq!(
            feature.shape,
            FeatureShape::CoreVersion {
                number: Some("1.0".to_string())
            }
        );
        assert_eq!(feature.requires[0].commands, vec!["vkCmdDraw"]);
        assert_eq!(feature.removes, vec!["vkCmdDrawKHR"]);
    }

    #[test]
    fn test_reads_extension() {
        let document = RegistryDocument::parse(SMALL).unwrap();
        let extension = &document.extensions[0];
        assert_eq!(extension.apis, vec!["vulkan", "vulkansc"]);
        assert_eq!(
            extension.shape,
            FeatureShape::Extension {
                spec_version: Some("3".to_string())
            }
        );
        assert_eq!(extension.depends.as_deref(), Some("VK_VERSION_1_1"));
        assert_eq!(extension.deprecated_by.as_deref(), Some("VK_VERSION_1_2"));

        let requirement = &extension.requires[0];
        assert_eq!(requirement.depends.as_deref(), Some("VK_KHR_other"));
        assert_eq!(requirement.apis, Some(vec!["vulkansc".to_string()]));
        assert_eq!(requirement.commands, vec!["vkCmdDrawKHR"]);
    }

    #[test]
    fn test_header_version_prefers_api_match() {
        let document = RegistryDocument::parse(SMALL).unwrap();
        assert_eq!(document.header_version("vulkan"), Some(290));
        assert_eq!(document.header_version("vulkansc"), Some(15));
        assert_eq!(document.header_version("openxr"), Some(290));
    }

    #[test]
    fn test_missing_header_version() {
        let document = RegistryDocument::parse("<registry><types/></registry>").unwrap();
        assert_eq!(document.header_version("vulkan"), None);
    }

    #[test]
    fn test_invalid_header_version() {
        let xml = "<registry><types><type>#define <name>VK_HEADER_VERSION</name> soon</type></types></registry>";
        assert!(matches!(
            RegistryDocument::parse(xml),
            Err(RegistryError::InvalidHeaderVersion(value)) if value == "soon"
        ));
    }

    #[test]
    fn test_unrecognized_extension_tag() {
        let xml = r#"<registry><extensions><command name="vkFoo"/></extensions></registry>"#;
        assert!(matches!(
            RegistryDocument::parse(xml),
            Err(RegistryError::UnrecognizedTag(tag)) if tag == "command"
        ));
    }

    #[test]
    fn test_missing_feature_api() {
        let xml = r#"<registry><feature name="VK_VERSION_1_0" number="1.0"/></registry>"#;
        assert!(matches!(
            RegistryDocument::parse(xml),
            Err(RegistryError::MissingAttribute { attribute: "api", .. })
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            RegistryDocument::parse("<registry><commands></registry>"),
            Err(RegistryError::Xml(_))
        ));
    }
}
