//! Driver catalog - version resolution and installation
//!
//! This module finds and installs the browser-automation driver binary
//! that best matches a locally detected browser version.
//!
//! # Architecture
//!
//! ```text
//! Catalog endpoint (JSON)
//!     │
//!     ├── versions[].version            ← release versions
//!     └── versions[].downloads.driver   ← per-platform archive URLs
//!            │
//!            ▼
//!     resolve_version / resolve_download_url
//!            │
//!            ▼
//!     Installer                         ← download, unpack, install
//!            │
//!            ▼
//!     ~/.local/bin/<driver>  or  /usr/local/bin/<driver>
//! ```
//!
//! The pipeline holds no state between steps and nothing is cached; the
//! catalog is fetched fresh on every run and discarded afterwards.

mod fetch;
mod index;
mod installer;

pub use fetch::DEFAULT_CATALOG_URL;
pub use index::{Catalog, CatalogEntry, DownloadTarget, Downloads};
pub use installer::{install_dir, Installer, DEFAULT_BINARY_NAME, SYSTEM_BIN_DIR};

use std::path::{Path, PathBuf};

use crate::error::DriverError;
use crate::version::{Platform, VersionTriple};

#[cfg(test)]
mod tests;

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// The driver version that was installed.
    pub version: VersionTriple,

    /// Version string as published in the catalog.
    pub version_string: String,

    /// Where the archive came from.
    pub url: String,

    /// Installed binary path.
    pub path: PathBuf,
}

/// Run the full pipeline: fetch the catalog, resolve the best driver
/// version for `target`, resolve its download URL for `platform`, and
/// install the binary into `dest_dir`.
///
/// Each step's empty result becomes its structured error; nothing is
/// swallowed and nothing panics. Callers treat any error as non-fatal
/// and fall back to manual-installation guidance.
pub async fn provision(
    catalog_url: &str,
    target: VersionTriple,
    platform: Platform,
    dest_dir: &Path,
    binary_name: &str,
) -> Result<Provisioned, DriverError> {
    let catalog = Catalog::fetch(catalog_url).await?;

    let entry = catalog
        .resolve_version(target)
        .ok_or(DriverError::NoCandidateVersion {
            major: target.major,
        })?;

    let version: VersionTriple = entry.version.parse()?;

    let url = catalog
        .resolve_download_url(version, platform)
        .ok_or_else(|| DriverError::NoPlatformUrl {
            version: entry.version.clone(),
            platform,
        })?
        .to_string();

    tracing::info!(
        browser = %target,
        driver = %version,
        platform = %platform,
        "Resolved driver version"
    );

    let version_string = entry.version.clone();
    let installer = Installer::for_binary(binary_name);
    let path = installer.install(&url, dest_dir).await?;

    Ok(Provisioned {
        version,
        version_string,
        url,
        path,
    })
}
