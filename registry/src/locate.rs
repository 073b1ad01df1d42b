//! Locating `vk.xml` in the usual SDK and system install locations.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RegistryError, Result};

/// Location of the registry below an install prefix.
pub const REGISTRY_SUBPATH: &str = "share/vulkan/registry/vk.xml";

/// Candidate registry paths for this platform, in search order.
///
/// `$VULKAN_SDK` first; then `$VULKAN_SDK_PATH` on Windows, or
/// `$HOME/.local`, `/usr/local` and `/usr` elsewhere.
pub fn search_paths() -> Vec<PathBuf> {
    search_paths_with(|key| std::env::var_os(key), cfg!(windows))
}

fn search_paths_with(env: impl Fn(&str) -> Option<OsString>, windows: bool) -> Vec<PathBuf> {
    let mut prefixes = Vec::new();
    if let Some(sdk) = env("VULKAN_SDK") {
        prefixes.push(PathBuf::from(sdk));
    }
    if windows {
        if let Some(sdk) = env("VULKAN_SDK_PATH") {
            prefixes.push(PathBuf::from(sdk));
        }
    } else {
        if let Some(home) = env("HOME") {
            prefixes.push(PathBuf::from(home).join(".local"));
        }
        prefixes.push(PathBuf::from("/usr/local"));
        prefixes.push(PathBuf::from("/usr"));
    }
    prefixes
        .into_iter()
        .map(|prefix| prefix.join(REGISTRY_SUBPATH))
        .collect()
}

/// Returns the first search path holding a regular file.
///
/// # Errors
///
/// [`RegistryError::SpecificationNotFound`] when none does.
pub fn locate_specification() -> Result<PathBuf> {
    locate_in(&search_paths())
}

/// Like [`locate_specification`] over an explicit candidate list.
pub fn locate_in(candidates: &[PathBuf]) -> Result<PathBuf> {
    for candidate in candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found registry");
            return Ok(candidate.clone());
        }
        debug!(path = %candidate.display(), "no registry");
    }
    Err(RegistryError::SpecificationNotFound)
}

/// Ensures `path` exists and is a regular file.
pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RegistryError::NotAFile(path.to_path_buf()))
    }
}
