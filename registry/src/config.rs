//! Generator configuration.
//!
//! A YAML file that pins the selection, classification rules, registry
//! location and output format, so a build does not need to repeat them on
//! every command line. Every field is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! specification_path: /opt/vulkan/share/vulkan/registry/vk.xml
//! format: header
//! selection:
//!   api: vulkan
//!   api_version: "1.3"
//!   extensions:
//!     - VK_KHR_surface
//!     - VK_KHR_swapchain
//!   allow_deprecated: false
//! rules:
//!   device_handles: [VkDevice, VkCommandBuffer, VkQueue]
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vk_dispatch_core::{ClassificationRules, Selection};

use crate::error::Result;
use crate::output::OutputFormat;

/// Settings for a generator run.
///
/// # Examples
///
/// ```
/// use vk_dispatch_registry::{GeneratorConfig, OutputFormat};
///
/// let config: GeneratorConfig = serde_yaml::from_str("format: markdown").unwrap();
/// assert_eq!(config.format, Some(OutputFormat::Markdown));
/// assert_eq!(config.selection.api, "vulkan");
/// assert!(config.selection.allow_deprecated);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Which API, version ceiling and extensions to enable.
    pub selection: Selection,
    /// Command level classification inputs.
    pub rules: ClassificationRules,
    /// Registry file; searched for when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification_path: Option<PathBuf>,
    /// Report format; `json` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file, or JSON when the file name
    /// ends in `.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::RegistryError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::RegistryError::Yaml) /
    /// [`Json`](crate::RegistryError::Json) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        Ok(config)
    }

    /// Saves the configuration, choosing the format like [`load`](Self::load).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}
