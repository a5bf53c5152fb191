//! Driver installation from the catalog
//!
//! Downloads a driver archive, unpacks it into a scoped staging
//! directory, locates the executable wherever the archive nested it,
//! and moves it into the requested bin directory. The staging directory
//! is removed on every exit path, success or failure.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::fetch::http_client;
use crate::error::{BoxedSource, DriverError};

/// Default driver binary name.
pub const DEFAULT_BINARY_NAME: &str = "chromedriver";

/// System-wide install target when the per-user bin dir is not wanted.
pub const SYSTEM_BIN_DIR: &str = "/usr/local/bin";

/// Resolve the install directory for a driver binary.
///
/// `use_local_bin` selects `~/.local/bin` (created on demand, no
/// elevated privileges needed); otherwise the fixed system-wide bin
/// directory is used as-is and the final move may fail on permissions.
pub fn install_dir(use_local_bin: bool) -> Result<PathBuf, DriverError> {
    if use_local_bin {
        dirs::home_dir()
            .map(|home| home.join(".local").join("bin"))
            .ok_or_else(|| DriverError::Filesystem {
                path: PathBuf::from("~/.local/bin"),
                source: std::io::Error::other("could not determine home directory"),
            })
    } else {
        Ok(PathBuf::from(SYSTEM_BIN_DIR))
    }
}

/// Installer for driver binaries
pub struct Installer {
    binary_name: String,
    staging_parent: Option<PathBuf>,
}

impl Installer {
    /// Create an installer for the default driver binary.
    pub fn new() -> Self {
        Self::for_binary(DEFAULT_BINARY_NAME)
    }

    /// Create an installer that looks for a specific binary name inside
    /// downloaded archives.
    pub fn for_binary(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            staging_parent: None,
        }
    }

    /// Stage extraction under a specific parent directory instead of the
    /// system temp dir. Tests use this to observe cleanup.
    pub fn with_staging_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(parent.into());
        self
    }

    /// Whether the driver binary already exists in `dest_dir`.
    ///
    /// Re-run idempotency lives with the caller: checking this before
    /// [`Installer::install`] makes a repeat run a no-op.
    pub fn is_installed(&self, dest_dir: &Path) -> bool {
        dest_dir.join(&self.binary_name).exists()
    }

    /// Download the archive at `url` and install the driver binary into
    /// `dest_dir`, returning the installed path.
    pub async fn install(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, DriverError> {
        let download = |source: reqwest::Error| DriverError::Download {
            url: url.to_string(),
            source,
        };

        tracing::info!(url, "Downloading driver archive");

        let client = http_client().map_err(download)?;
        let bytes = client
            .get(url)
            .send()
            .await
            .map_err(download)?
            .error_for_status()
            .map_err(download)?
            .bytes()
            .await
            .map_err(download)?;

        self.install_from_bytes(&bytes, dest_dir)
    }

    /// Unpack an already-downloaded archive and install the binary.
    pub fn install_from_bytes(&self, bytes: &[u8], dest_dir: &Path) -> Result<PathBuf, DriverError> {
        // The TempDir guard owns the staging tree; dropping it on any
        // path out of this function removes the whole directory.
        let staging = self.staging_dir()?;

        let extracted = self.unpack_and_locate(bytes, staging.path())?;

        std::fs::create_dir_all(dest_dir).map_err(|source| DriverError::Filesystem {
            path: dest_dir.to_path_buf(),
            source,
        })?;

        let dest = dest_dir.join(&self.binary_name);

        // Staging lives in the temp filesystem, so a plain rename may
        // cross devices; copy instead and let the guard reap the source.
        std::fs::copy(&extracted, &dest).map_err(|source| DriverError::Filesystem {
            path: dest.clone(),
            source,
        })?;

        mark_executable(&dest)?;
        clear_quarantine(&dest);

        tracing::info!(path = %dest.display(), "Installed driver binary");
        Ok(dest)
    }

    fn staging_dir(&self) -> Result<tempfile::TempDir, DriverError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("drover-");
            b
        };

        let result = match &self.staging_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };

        result.map_err(|source| DriverError::Filesystem {
            path: self
                .staging_parent
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            source,
        })
    }

    /// Extract the zip into `dir` and find the driver binary by name.
    ///
    /// Archives nest the binary inside an arbitrarily named top-level
    /// folder, so this searches the whole extracted tree instead of
    /// assuming a fixed path.
    fn unpack_and_locate(&self, bytes: &[u8], dir: &Path) -> Result<PathBuf, DriverError> {
        let archive_err = |message: String, source: Option<BoxedSource>| DriverError::Archive {
            message,
            source,
        };

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| archive_err("archive is not a readable zip file".to_string(), Some(Box::new(e))))?;

        archive
            .extract(dir)
            .map_err(|e| archive_err("failed to extract archive".to_string(), Some(Box::new(e))))?;

        let windows_name = format!("{}.exe", self.binary_name);

        for entry in WalkDir::new(dir) {
            let entry = entry
                .map_err(|e| archive_err("failed to scan extracted archive".to_string(), Some(Box::new(e))))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if name == self.binary_name || name == windows_name {
                tracing::debug!(path = %entry.path().display(), "Located driver binary in archive");
                return Ok(entry.path().to_path_buf());
            }
        }

        Err(archive_err(
            format!("no executable named '{}' found in archive", self.binary_name),
            None,
        ))
    }
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), DriverError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|source| {
        DriverError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), DriverError> {
    Ok(())
}

/// Remove the macOS quarantine attribute from a downloaded binary.
///
/// Gatekeeper blocks freshly downloaded executables until the attribute
/// is cleared. Failure is non-fatal: the attribute may not exist, or the
/// OS may not support it at all.
#[cfg(target_os = "macos")]
fn clear_quarantine(path: &Path) {
    match std::process::Command::new("xattr")
        .args(["-d", "com.apple.quarantine"])
        .arg(path)
        .output()
    {
        Ok(output) if !output.status.success() => {
            tracing::debug!(path = %path.display(), "No quarantine attribute to clear");
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Could not invoke xattr");
        }
        _ => {
            tracing::debug!(path = %path.display(), "Cleared quarantine attribute");
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn clear_quarantine(_path: &Path) {}
