//! Resolution reports and their output formats.

use serde::{Deserialize, Serialize};
use vk_dispatch_core::{ApiVersion, CommandLevel, CommandSet, Feature, FeatureKind, Selection};

use crate::diagnostics::Diagnostic;
use crate::resolver::Resolution;
use crate::specification::Specification;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
    Table,
    /// C header with one X-macro list per command level.
    Header,
}

/// Per-feature metadata for generated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub name: String,
    pub kind: FeatureKind,
    pub version: ApiVersion,
    pub supported_apis: Vec<String>,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_by: Option<String>,
    /// Dependency expression text; empty when unconditional.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dependency: String,
    pub header_guard: String,
}

impl FeatureReport {
    pub fn from_feature(feature: &Feature) -> Self {
        Self {
            name: feature.name().to_string(),
            kind: feature.kind(),
            version: feature.version(),
            supported_apis: feature.supported_apis().iter().cloned().collect(),
            enabled: feature.is_enabled(),
            deprecated_by: feature.deprecated_by().map(str::to_string),
            dependency: feature.dependency().to_string(),
            header_guard: feature.to_header_guard(),
        }
    }
}

/// Reports for every core version then every extension of `specification`.
pub fn list_features(specification: &Specification) -> Vec<FeatureReport> {
    specification
        .all_features()
        .map(FeatureReport::from_feature)
        .collect()
}

/// Command names per level, each sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTiers {
    pub global: Vec<String>,
    pub instance: Vec<String>,
    pub device: Vec<String>,
}

impl CommandTiers {
    pub fn from_set(commands: &CommandSet) -> Self {
        let names = |level: CommandLevel| -> Vec<String> {
            commands
                .tier(level)
                .iter()
                .map(|command| command.name().to_string())
                .collect()
        };
        Self {
            global: names(CommandLevel::Global),
            instance: names(CommandLevel::Instance),
            device: names(CommandLevel::Device),
        }
    }

    pub fn tier(&self, level: CommandLevel) -> &[String] {
        match level {
            CommandLevel::Global => &self.global,
            CommandLevel::Instance => &self.instance,
            CommandLevel::Device => &self.device,
        }
    }

    pub fn total(&self) -> usize {
        self.global.len() + self.instance.len() + self.device.len()
    }
}

/// Serializable snapshot of one resolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub generated_at: String,
    pub header_version: u32,
    pub api: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_path: Option<String>,
    pub selection: Selection,
    pub features: Vec<FeatureReport>,
    pub extensions: Vec<FeatureReport>,
    pub commands: CommandTiers,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolutionReport {
    pub fn new(
        specification: &Specification,
        selection: &Selection,
        resolution: &Resolution,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            header_version: specification.header_version(),
            api: specification.api().to_string(),
            specification_path: specification
                .path()
                .map(|path| path.display().to_string()),
            selection: selection.clone(),
            features: specification
                .features()
                .values()
                .map(FeatureReport::from_feature)
                .collect(),
            extensions: specification
                .extensions()
                .values()
                .map(FeatureReport::from_feature)
                .collect(),
            commands: CommandTiers::from_set(&resolution.commands),
            diagnostics: resolution.diagnostics.clone(),
        }
    }

    /// Replaces the generation timestamp, for reproducible output.
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    pub fn enabled_features(&self) -> impl Iterator<Item = &FeatureReport> {
        self.features
            .iter()
            .chain(&self.extensions)
            .filter(|feature| feature.enabled)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|diagnostic| diagnostic.is_warning())
    }
}

/// Formats a resolution report in the requested output format.
pub fn format_report(report: &ResolutionReport, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(report_to_markdown(report)),
        OutputFormat::Table => Ok(report_to_table(report)),
        OutputFormat::Header => Ok(report_to_header(report)),
    }
}

/// Formats a feature listing in the requested output format.
///
/// The header format only applies to resolution reports.
pub fn format_features(features: &[FeatureReport], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(features)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(features).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(features_to_markdown(features)),
        OutputFormat::Table => Ok(features_to_table(features)),
        OutputFormat::Header => {
            Err("the header format is only available for resolved command sets".to_string())
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn report_to_markdown(report: &ResolutionReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("# Dispatch Table: {}\n\n", report.api));
    out.push_str(&format!("- **Header Version:** {}\n", report.header_version));
    out.push_str(&format!("- **API Version:** {}\n", report.selection.api_version));
    out.push_str(&format!("- **Extensions:** {}\n", report.selection.extensions));
    out.push_str(&format!(
        "- **Deprecated Allowed:** {}\n",
        yes_no(report.selection.allow_deprecated)
    ));
    if let Some(ref path) = report.specification_path {
        out.push_str(&format!("- **Specification:** `{path}`\n"));
    }
    out.push_str(&format!("- **Generated:** {}\n", report.generated_at));

    let enabled: Vec<&FeatureReport> = report.enabled_features().collect();
    if !enabled.is_empty() {
        out.push_str("\n## Enabled Features\n\n");
        out.push_str("| Feature | Kind | Version | Guard |\n");
        out.push_str("|---------|------|---------|-------|\n");
        for feature in enabled {
            out.push_str(&format!(
                "| `{}` | {} | {} | `{}` |\n",
                feature.name, feature.kind, feature.version, feature.header_guard
            ));
        }
    }

    for level in CommandLevel::ALL {
        let names = report.commands.tier(level);
        out.push_str(&format!("\n## {level} Commands ({})\n\n", names.len()));
        for name in names {
            out.push_str(&format!("- `{name}`\n"));
        }
    }

    let warnings: Vec<&Diagnostic> = report.warnings().collect();
    if !warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for warning in warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }

    out
}

fn report_to_table(report: &ResolutionReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "API: {}  Header Version: {}  Commands: {}\n",
        report.api,
        report.header_version,
        report.commands.total()
    ));

    let enabled: Vec<&FeatureReport> = report.enabled_features().collect();
    if !enabled.is_empty() {
        out.push_str("\nFeatures:\n");
        let max_name = enabled
            .iter()
            .map(|feature| feature.name.len())
            .max()
            .unwrap_or(4);
        for feature in enabled {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                feature.name,
                feature.version,
                width = max_name
            ));
        }
    }

    for level in CommandLevel::ALL {
        let names = report.commands.tier(level);
        out.push_str(&format!("\n{level} ({}):\n", names.len()));
        for name in names {
            out.push_str(&format!("  {name}\n"));
        }
    }

    out
}

fn report_to_header(report: &ResolutionReport) -> String {
    let mut out = String::new();

    out.push_str("/* Generated by dispatch-table-generator. Do not edit. */\n");
    out.push_str(&format!(
        "/* API: {}, API version: {}, extensions: {} */\n",
        report.api, report.selection.api_version, report.selection.extensions
    ));
    out.push_str("\n#ifndef VK_DISPATCH_COMMANDS_H\n#define VK_DISPATCH_COMMANDS_H\n\n");
    out.push_str(&format!(
        "#define VK_DISPATCH_HEADER_VERSION {}\n\n",
        report.header_version
    ));

    for feature in report.enabled_features() {
        out.push_str(&format!("/* {}: {} */\n", feature.name, feature.header_guard));
    }

    for level in CommandLevel::ALL {
        let macro_name = format!("VK_DISPATCH_{}_COMMANDS", level.as_str().to_uppercase());
        let names = report.commands.tier(level);
        out.push('\n');
        if names.is_empty() {
            out.push_str(&format!("#define {macro_name}(X)\n"));
            continue;
        }
        out.push_str(&format!("#define {macro_name}(X) \\\n"));
        for (index, name) in names.iter().enumerate() {
            if index + 1 == names.len() {
                out.push_str(&format!("    X({name})\n"));
            } else {
                out.push_str(&format!("    X({name}) \\\n"));
            }
        }
    }

    out.push_str("\n#endif /* VK_DISPATCH_COMMANDS_H */\n");
    out
}

fn features_to_markdown(features: &[FeatureReport]) -> String {
    let mut out = String::new();

    out.push_str("| Feature | Kind | Version | Enabled | Deprecated By | Guard |\n");
    out.push_str("|---------|------|---------|---------|---------------|-------|\n");
    for feature in features {
        let deprecated_by = feature.deprecated_by.as_deref().unwrap_or("");
        out.push_str(&format!(
            "| `{}` | {} | {} | {} | {deprecated_by} | `{}` |\n",
            feature.name,
            feature.kind,
            feature.version,
            yes_no(feature.enabled),
            feature.header_guard
        ));
    }

    out
}

fn features_to_table(features: &[FeatureReport]) -> String {
    let mut out = String::new();

    let max_name = features
        .iter()
        .map(|feature| feature.name.len())
        .max()
        .unwrap_or(4);

    for feature in features {
        let marker = if feature.enabled { "+" } else { "-" };
        out.push_str(&format!(
            "{marker} {:<width$}  {:<6}  {}",
            feature.name,
            feature.version.to_string(),
            feature.header_guard,
            width = max_name
        ));
        if let Some(ref replacement) = feature.deprecated_by {
            out.push_str(&format!("  (deprecated by {replacement})"));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use vk_dispatch_core::{ClassificationRules, ExtensionSelection};

    const REGISTRY: &str = r#"<registry>
    <commands>
        <command>
            <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
            <param><type>VkInstanceCreateInfo</type> <name>pCreateInfo</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkDestroyInstance</name></proto>
            <param><type>VkInstance</type> <name>instance</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkCmdDraw</name></proto>
            <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkCmdDebugMarkerEXT</name></proto>
            <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
        </command>
    </commands>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <command name="vkCreateInstance"/>
            <command name="vkDestroyInstance"/>
            <command name="vkCmdDraw"/>
        </require>
    </feature>
    <extensions>
        <extension name="VK_EXT_debug_marker" supported="vulkan" depends="VK_VERSION_1_0" deprecatedby="VK_EXT_debug_utils">
            <require>
                <enum value="4" name="VK_EXT_DEBUG_MARKER_SPEC_VERSION"/>
                <command name="vkCmdDebugMarkerEXT"/>
            </require>
        </extension>
    </extensions>
    <types><type category="define">#define <name>VK_HEADER_VERSION</name> 42</type></types>
</registry>"#;

    fn report(selection: Selection) -> ResolutionReport {
        let mut spec =
            Specification::from_xml(REGISTRY, "vulkan", &ClassificationRules::default()).unwrap();
        let resolution = Resolver::new(selection.clone()).resolve(&mut spec).unwrap();
        ResolutionReport::new(&spec, &selection, &resolution)
            .with_generated_at("2026-01-01T00:00:00+00:00")
    }

    #[test]
    fn test_report_snapshot() {
        let report = report(Selection::default());
        assert_eq!(report.header_version, 42);
        assert_eq!(report.api, "vulkan");
        assert_eq!(report.specification_path, None);
        assert_eq!(report.commands.global, vec!["vkCreateInstance"]);
        assert_eq!(report.commands.instance, vec!["vkDestroyInstance"]);
        assert_eq!(
            report.commands.device,
            vec!["vkCmdDebugMarkerEXT", "vkCmdDraw"]
        );
        assert_eq!(report.commands.total(), 4);

        let marker = &report.extensions[0];
        assert!(marker.enabled);
        assert_eq!(marker.version, ApiVersion::new(4, 0));
        assert_eq!(marker.deprecated_by.as_deref(), Some("VK_EXT_debug_utils"));
        assert_eq!(
            marker.header_guard,
            "defined(VK_EXT_debug_marker) && defined(VK_VERSION_1_0)"
        );
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let report = report(Selection::default());
        let json = format_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["header_version"], 42);
        assert_eq!(value["selection"]["api_version"], "latest");
        assert_eq!(value["selection"]["extensions"][0], "all");
        assert_eq!(value["extensions"][0]["kind"], "extension");
        assert!(value.get("specification_path").is_none());

        let back: ResolutionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_yaml_output() {
        let yaml = format_report(&report(Selection::default()), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("header_version: 42"));
        assert!(yaml.contains("- vkCmdDraw"));
    }

    #[test]
    fn test_header_output() {
        let header = format_report(&report(Selection::default()), OutputFormat::Header).unwrap();
        assert!(header.contains("/* API: vulkan, API version: latest, extensions: all */\n"));
        assert!(header.contains("#define VK_DISPATCH_HEADER_VERSION 42\n\n/* "));
        assert!(
            header.contains("#define VK_DISPATCH_GLOBAL_COMMANDS(X) \\\n    X(vkCreateInstance)\n")
        );
        assert!(header.contains(
            "#define VK_DISPATCH_DEVICE_COMMANDS(X) \\\n    X(vkCmdDebugMarkerEXT) \\\n    X(vkCmdDraw)\n"
        ));
        assert!(header.contains("/* VK_VERSION_1_0: defined(VK_VERSION_1_0) */"));
        assert!(header.trim_end().ends_with("#endif /* VK_DISPATCH_COMMANDS_H */"));
    }

    #[test]
    fn test_header_output_with_empty_tier() {
        let selection = Selection::default().with_deprecated(false);
        let mut report = report(selection);
        report.commands.global.clear();
        let header = format_report(&report, OutputFormat::Header).unwrap();
        assert!(header.contains("#define VK_DISPATCH_GLOBAL_COMMANDS(X)\n"));
        assert!(!header.contains("vkCmdDebugMarkerEXT"));
    }

    #[test]
    fn test_markdown_lists_tiers_and_warnings() {
        let markdown =
            format_report(&report(Selection::default()), OutputFormat::Markdown).unwrap();
        assert!(markdown.starts_with("# Dispatch Table: vulkan"));
        assert!(markdown.contains("## Device Commands (2)"));
        assert!(markdown.contains("- `vkCmdDraw`"));
        assert!(markdown.contains("## Warnings"));
        assert!(markdown.contains("VK_EXT_debug_utils"));
    }

    #[test]
    fn test_table_output() {
        let selection =
            Selection::default().with_extensions(ExtensionSelection::named(Vec::<String>::new()));
        let table = format_report(&report(selection), OutputFormat::Table).unwrap();
        assert!(table.starts_with("API: vulkan  Header Version: 42  Commands: 3"));
        assert!(table.contains("Instance (1):\n  vkDestroyInstance\n"));
        assert!(!table.contains("VK_EXT_debug_marker"));
    }

    #[test]
    fn test_feature_listing_formats() {
        let mut spec =
            Specification::from_xml(REGISTRY, "vulkan", &ClassificationRules::default()).unwrap();
        Resolver::default().select(&mut spec);
        let features = list_features(&spec);
        assert_eq!(features.len(), 2);

        let table = format_features(&features, OutputFormat::Table).unwrap();
        assert!(table.contains("+ VK_VERSION_1_0"));
        assert!(table.contains("(deprecated by VK_EXT_debug_utils)"));

        let markdown = format_features(&features, OutputFormat::Markdown).unwrap();
        assert!(
            markdown.contains("| `VK_EXT_debug_marker` | extension | 4.0 | yes | VK_EXT_debug_utils |")
        );

        assert!(format_features(&features, OutputFormat::Header).is_err());
    }
}
