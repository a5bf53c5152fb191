//! Version and platform value types
//!
//! Browser and driver releases are identified by four dot-separated
//! numeric components ("120.0.6099.109"). Comparing those as strings is
//! how the original tooling grew version-matching bugs, so the parsed
//! form is the only thing the resolver ever compares.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// A fully-qualified release version: `major.minor.build.patch`.
///
/// Ordering is lexicographic over the four components, which is exactly
/// the derive order below. Two versions are equal iff all four match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub fn new(major: u32, minor: u32, build: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            build,
            patch,
        }
    }

    /// Whether `other` belongs to the same major release line.
    pub fn same_major(&self, other: &VersionTriple) -> bool {
        self.major == other.major
    }
}

impl FromStr for VersionTriple {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DriverError::Version {
            input: s.to_string(),
        };

        let mut components = s.split('.');
        let mut next = || -> Result<u32, DriverError> {
            components
                .next()
                .ok_or_else(invalid)?
                .parse::<u32>()
                .map_err(|_| invalid())
        };

        let version = VersionTriple::new(next()?, next()?, next()?, next()?);

        // Exactly four components; "1.2.3.4.5" is not a release version.
        if components.next().is_some() {
            return Err(invalid());
        }

        Ok(version)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.patch
        )
    }
}

/// Platform identifiers used by the driver catalog.
///
/// These are the identifiers the catalog service publishes download
/// entries under; `Display`/`FromStr` and the serde representation all
/// use the same strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Linux64,
    MacArm64,
    MacX64,
    Win32,
    Win64,
}

impl Platform {
    /// Catalog identifier for this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux64 => "linux64",
            Platform::MacArm64 => "mac-arm64",
            Platform::MacX64 => "mac-x64",
            Platform::Win32 => "win32",
            Platform::Win64 => "win64",
        }
    }

    /// Map the compile-time target to a catalog platform.
    ///
    /// Returns `None` on targets the catalog does not publish for; the
    /// resolver itself never calls this, it exists so callers can supply
    /// a sensible default.
    pub fn current() -> Option<Platform> {
        if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
            Some(Platform::MacArm64)
        } else if cfg!(all(target_os = "macos", target_arch = "x86_64")) {
            Some(Platform::MacX64)
        } else if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
            Some(Platform::Linux64)
        } else if cfg!(all(target_os = "windows", target_arch = "x86_64")) {
            Some(Platform::Win64)
        } else if cfg!(all(target_os = "windows", target_arch = "x86")) {
            Some(Platform::Win32)
        } else {
            None
        }
    }

    /// All known platform identifiers, for help text and error messages.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Linux64,
            Platform::MacArm64,
            Platform::MacX64,
            Platform::Win32,
            Platform::Win64,
        ]
    }
}

impl FromStr for Platform {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux64" => Ok(Platform::Linux64),
            "mac-arm64" => Ok(Platform::MacArm64),
            "mac-x64" => Ok(Platform::MacX64),
            "win32" => Ok(Platform::Win32),
            "win64" => Ok(Platform::Win64),
            _ => Err(DriverError::Platform {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
