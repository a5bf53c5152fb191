//! Driver provisioning error types with clear, actionable messages
//!
//! Every failure in the fetch/resolve/install pipeline surfaces as one of
//! these kinds. Callers are expected to catch them at the boundary and
//! degrade to manual-installation guidance; nothing here should ever be
//! the reason a larger bootstrap aborts.

use std::path::PathBuf;
use thiserror::Error;

use crate::version::Platform;

/// Boxed source for errors that can originate from more than one library.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Driver provisioning errors
#[derive(Error, Debug)]
pub enum DriverError {
    /// A version string was not four dot-separated numbers
    #[error("Invalid version string '{input}'.\n\nExpected four dot-separated numeric components, e.g. 120.0.6099.109")]
    Version { input: String },

    /// A platform identifier was not one the catalog publishes
    #[error("Unknown platform '{input}'.\n\nKnown platforms: linux64, mac-arm64, mac-x64, win32, win64")]
    Platform { input: String },

    /// The catalog endpoint was unreachable or returned unparsable content
    #[error("Failed to fetch driver catalog from {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No catalog entry shares the target's major version line
    #[error("No driver release matches browser major version {major}.\n\nThe browser may be newer than the latest published driver; check the catalog for a {major}.x release.")]
    NoCandidateVersion { major: u32 },

    /// The resolved version exists but offers no download for this platform
    #[error("Driver version {version} has no download for platform '{platform}'")]
    NoPlatformUrl { version: String, platform: Platform },

    /// Fetching the driver archive did not complete successfully
    #[error("Failed to download driver archive from {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The archive was corrupt or did not contain the expected binary
    #[error("Driver archive problem: {message}")]
    Archive {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The install move could not complete (permissions, missing home, ...)
    #[error("Filesystem operation failed at {path}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DriverError {
    /// A short stable label for the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DriverError::Version { .. } => "version",
            DriverError::Platform { .. } => "platform",
            DriverError::Network { .. } => "network",
            DriverError::NoCandidateVersion { .. } => "no-candidate-version",
            DriverError::NoPlatformUrl { .. } => "no-platform-url",
            DriverError::Download { .. } => "download",
            DriverError::Archive { .. } => "archive",
            DriverError::Filesystem { .. } => "filesystem",
        }
    }
}
