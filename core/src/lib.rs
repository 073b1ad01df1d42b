//! Model of the Vulkan API registry for dispatch table generation.
//!
//! This crate holds everything needed to decide which commands a loader
//! dispatch table must contain, without performing any I/O:
//!
//! - [`ApiVersion`]: `major.minor` versions as written in the registry.
//! - [`Command`] and [`CommandLevel`]: commands tagged with the dispatch
//!   table (global, instance or device) they load through.
//! - [`CommandCatalog`]: every command of a document, built from
//!   [`raw::RawCommand`] entries with alias resolution.
//! - [`DependencyExpr`]: the `+`/`,` dependency grammar, evaluated against
//!   active feature names or compiled to preprocessor guards.
//! - [`Requirement`] and [`Feature`]: core versions and extensions with
//!   their gated command bundles.
//! - [`Selection`]: which API, version ceiling and extensions the caller
//!   asked for.
//! - [`CommandSet`]: the per-level result of resolution.
//!
//! Reading the XML document and running the resolver live in the
//! `vk-dispatch-registry` crate.
//!
//! # Example
//!
//! ```
//! use vk_dispatch_core::raw::{FeatureShape, RawCommand, RawFeature, RawRequirement};
//! use vk_dispatch_core::*;
//!
//! let raw_commands = vec![
//!     RawCommand::declared("vkCreateInstance", Some("VkInstanceCreateInfo")),
//!     RawCommand::declared("vkResetQueryPool", Some("VkDevice")),
//!     RawCommand::aliased("vkResetQueryPoolEXT", "vkResetQueryPool"),
//! ];
//! let catalog =
//!     CommandCatalog::build(&raw_commands, "vulkan", &ClassificationRules::default()).unwrap();
//!
//! let mut raw = RawFeature::new(
//!     "VK_EXT_host_query_reset",
//!     FeatureShape::Extension { spec_version: Some("1".to_string()) },
//! );
//! raw.apis = vec!["vulkan".to_string()];
//! raw.depends = Some("VK_KHR_get_physical_device_properties2,VK_VERSION_1_1".to_string());
//! raw.requires.push(RawRequirement {
//!     commands: vec!["vkResetQueryPoolEXT".to_string()],
//!     ..RawRequirement::default()
//! });
//!
//! let feature = Feature::from_raw(&raw, &catalog).unwrap();
//! assert!(Selection::default().admits(&feature));
//! assert_eq!(feature.version(), ApiVersion::new(1, 0));
//! assert_eq!(
//!     feature.dependency_guard(),
//!     "defined(VK_KHR_get_physical_device_properties2) || defined(VK_VERSION_1_1)"
//! );
//!
//! let commands: CommandSet = feature.commands().into_iter().collect();
//! assert_eq!(commands.device_commands().len(), 1);
//! ```

mod catalog;
mod command;
mod command_set;
mod error;
pub mod expr;
mod feature;
pub mod raw;
mod requirement;
mod selection;
mod version;

pub use catalog::{CommandCatalog, CommandIndex};
pub use command::{ClassificationRules, Command, CommandLevel};
pub use command_set::CommandSet;
pub use error::{ExprError, ModelError, Result};
pub use expr::DependencyExpr;
pub use feature::{Feature, FeatureKind};
pub use requirement::Requirement;
pub use selection::{Exclusion, ExtensionSelection, Selection, VersionCeiling};
pub use version::ApiVersion;
