//! `major.minor` version numbers as written in the registry.
//!
//! These are the `X.Y` strings found on `<feature number="...">` and derived
//! from extension spec versions. They are not the packed integer encoding
//! used by `VK_MAKE_API_VERSION`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.(\d+)").expect("version regex"));

/// A comparable `(major, minor)` pair.
///
/// Parsing only looks at the leading `X.Y`; anything after it is ignored,
/// so `"1.2.Ax"` is version 1.2 while `"Ax.1.2"` is rejected.
///
/// # Examples
///
/// ```
/// use vk_dispatch_core::ApiVersion;
///
/// let v = ApiVersion::parse("6.3-alpha").unwrap();
/// assert_eq!((v.major(), v.minor()), (6, 3));
/// assert!(v > ApiVersion::new(1, 3));
/// assert_eq!(v.to_string(), "6.3");
/// assert!(ApiVersion::parse("Frog").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    major: u32,
    minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses the leading `X.Y` of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidVersion`] when `text` does not start with
    /// two dot-separated integers, or when either does not fit in a `u32`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ModelError::InvalidVersion(text.to_string());
        let caps = VERSION_PREFIX.captures(text).ok_or_else(invalid)?;
        let major = caps[1].parse().map_err(|_| invalid())?;
        let minor = caps[2].parse().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }

    /// Like [`parse`](Self::parse), treating an absent value as an error.
    pub fn parse_optional(text: Option<&str>) -> Result<Self> {
        match text {
            Some(text) => Self::parse(text),
            None => Err(ModelError::InvalidVersion("None".to_string())),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Three-way comparison on `(major, minor)`.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(value: ApiVersion) -> Self {
        value.to_string()
    }
}
