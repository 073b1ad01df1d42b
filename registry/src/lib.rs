//! Vulkan registry loading and command set resolution.
//!
//! This crate reads the Vulkan XML registry (`vk.xml`) into the model types of
//! [`vk_dispatch_core`], applies a feature [`Selection`], and produces the
//! final command set partitioned by dispatch level.
//!
//! # Main entry points
//!
//! - [`Specification::load`] and [`Specification::from_xml`] build the model
//!   for one API. Every feature starts disabled.
//! - [`Resolver::resolve`] selects features, validates their dependencies and
//!   returns a [`Resolution`].
//! - [`ResolutionReport`] and [`format_report`] turn a resolution into JSON,
//!   YAML, Markdown, a plain table or a C header.
//! - [`locate_specification`] finds `vk.xml` in the usual install locations.
//!
//! # Example
//!
//! ```
//! use vk_dispatch_core::{ClassificationRules, ExtensionSelection, Selection};
//! use vk_dispatch_registry::{Resolver, Specification};
//!
//! let xml = r#"<registry>
//!     <commands>
//!         <command>
//!             <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
//!             <param><type>VkInstanceCreateInfo</type> <name>pCreateInfo</name></param>
//!         </command>
//!         <command>
//!             <proto><type>void</type> <name>vkDestroySurfaceKHR</name></proto>
//!             <param><type>VkInstance</type> <name>instance</name></param>
//!         </command>
//!     </commands>
//!     <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
//!         <require><command name="vkCreateInstance"/></require>
//!     </feature>
//!     <extensions>
//!         <extension name="VK_KHR_surface" supported="vulkan">
//!             <require><command name="vkDestroySurfaceKHR"/></require>
//!         </extension>
//!     </extensions>
//!     <types><type>#define <name>VK_HEADER_VERSION</name> 1</type></types>
//! </registry>"#;
//!
//! let mut spec = Specification::from_xml(xml, "vulkan", &ClassificationRules::default()).unwrap();
//! let selection =
//!     Selection::default().with_extensions(ExtensionSelection::named(["VK_KHR_surface"]));
//! let resolution = Resolver::new(selection).resolve(&mut spec).unwrap();
//!
//! assert!(resolution.commands.contains_named("vkCreateInstance"));
//! assert_eq!(resolution.commands.instance_commands().len(), 1);
//! ```

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod locate;
pub mod output;
pub mod resolver;
pub mod specification;

pub use config::GeneratorConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use document::{HeaderVersion, RegistryDocument};
pub use error::{RegistryError, ResolveError, Result};
pub use locate::{locate_specification, search_paths};
pub use output::{
    CommandTiers, FeatureReport, OutputFormat, ResolutionReport, format_features, format_report,
    list_features,
};
pub use resolver::{Resolution, Resolver};
pub use specification::Specification;
