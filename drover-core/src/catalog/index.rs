//! Catalog document parsing and version resolution
//!
//! The catalog is a JSON document with a top-level `versions` array;
//! each element carries a `version` string and per-platform download
//! URLs under `downloads.driver`. The order of entries is whatever the
//! service returned; it is not guaranteed sorted.

use serde::{Deserialize, Serialize};

use crate::version::{Platform, VersionTriple};

/// The full driver release catalog, as returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// All known releases, in service order.
    #[serde(default)]
    pub versions: Vec<CatalogEntry>,
}

/// One release in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Version string as published ("120.0.6099.109").
    pub version: String,

    /// Per-artifact download lists.
    #[serde(default)]
    pub downloads: Downloads,
}

/// Download lists keyed by artifact kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Downloads {
    /// Driver binary downloads. The live service publishes this list
    /// under the artifact's own name, hence the alias.
    #[serde(default, alias = "chromedriver")]
    pub driver: Vec<DownloadTarget>,
}

/// A single downloadable artifact for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTarget {
    /// Catalog platform identifier ("mac-arm64", "linux64", ...).
    pub platform: String,

    /// Direct download URL for the archive.
    pub url: String,
}

impl CatalogEntry {
    /// Parsed form of the version string, if it is well-formed.
    ///
    /// Entries whose version does not parse are never resolution
    /// candidates; they are skipped rather than failing the whole run.
    pub fn version_triple(&self) -> Option<VersionTriple> {
        self.version.parse().ok()
    }

    /// Whether this release ships a driver artifact at all.
    pub fn has_driver(&self) -> bool {
        !self.downloads.driver.is_empty()
    }

    /// Driver download URL for a specific platform.
    pub fn driver_url_for(&self, platform: Platform) -> Option<&str> {
        self.downloads
            .driver
            .iter()
            .find(|d| d.platform == platform.as_str())
            .map(|d| d.url.as_str())
    }
}

impl Catalog {
    /// Parse a catalog from its JSON representation.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Pick the driver version to install for a detected browser version.
    ///
    /// Policy, in order:
    /// 1. An exact version match with a driver download wins outright.
    /// 2. Otherwise candidates are the entries sharing `target`'s major
    ///    component that ship a driver. No candidates means `None`.
    /// 3. Among candidates, take the greatest version `<= target`
    ///    (closest release not exceeding the browser).
    /// 4. If every candidate exceeds the target, take the smallest
    ///    candidate — lowest overshoot beats refusing to install.
    ///
    /// Duplicate versions in the catalog tie-break to the first
    /// occurrence in service order.
    pub fn resolve_version(&self, target: VersionTriple) -> Option<&CatalogEntry> {
        if let Some(exact) = self
            .versions
            .iter()
            .find(|e| e.has_driver() && e.version_triple() == Some(target))
        {
            tracing::debug!(version = %exact.version, "Resolved exact driver version match");
            return Some(exact);
        }

        let mut candidates: Vec<(VersionTriple, &CatalogEntry)> = self
            .versions
            .iter()
            .filter(|e| e.has_driver())
            .filter_map(|e| e.version_triple().map(|v| (v, e)))
            .filter(|(v, _)| v.same_major(&target))
            .collect();

        if candidates.is_empty() {
            tracing::debug!(major = target.major, "No same-major driver versions in catalog");
            return None;
        }

        // Stable sort keeps duplicates in catalog order, so the scans
        // below land on the first occurrence.
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        if let Some(&(version, entry)) = candidates.iter().find(|(v, _)| *v <= target) {
            tracing::debug!(version = %version, target = %target, "Resolved closest driver version below target");
            return Some(entry);
        }

        // Every candidate is newer than the browser; settle for the
        // lowest overshoot.
        let smallest = candidates.last().map(|(v, _)| *v)?;
        let &(version, entry) = candidates.iter().find(|(v, _)| *v == smallest)?;
        tracing::debug!(version = %version, target = %target, "All candidates exceed target; using lowest overshoot");
        Some(entry)
    }

    /// Download URL for an exact version on a given platform.
    ///
    /// `None` when no entry matches the version exactly, or the matching
    /// entry has no driver download for `platform`.
    pub fn resolve_download_url(&self, version: VersionTriple, platform: Platform) -> Option<&str> {
        self.versions
            .iter()
            .find(|e| e.version_triple() == Some(version))
            .and_then(|e| e.driver_url_for(platform))
    }
}

#[cfg(test)]
mod index_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(version: &str, platforms: &[&str]) -> CatalogEntry {
        CatalogEntry {
            version: version.to_string(),
            downloads: Downloads {
                driver: platforms
                    .iter()
                    .map(|p| DownloadTarget {
                        platform: p.to_string(),
                        url: format!("https://dl.example.com/{version}/{p}/driver.zip"),
                    })
                    .collect(),
            },
        }
    }

    fn catalog(entries: Vec<CatalogEntry>) -> Catalog {
        Catalog { versions: entries }
    }

    fn resolve(catalog: &Catalog, target: &str) -> Option<String> {
        catalog
            .resolve_version(target.parse().unwrap())
            .map(|e| e.version.clone())
    }

    #[test]
    fn test_exact_match_takes_precedence() {
        let catalog = catalog(vec![
            entry("1.2.3.0", &["linux64"]),
            entry("1.2.3.4", &["linux64"]),
            entry("1.2.4.0", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "1.2.3.4"), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn test_exact_version_without_driver_is_not_a_match() {
        // The 2.0.0.0 entry exists but ships no driver, so resolution
        // falls through to the same-major policy.
        let catalog = catalog(vec![
            entry("2.0.0.0", &[]),
            entry("1.9.0.0", &["linux64"]),
            entry("2.0.0.1", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "2.0.0.0"), Some("2.0.0.1".to_string()));
    }

    #[test]
    fn test_closest_below_among_same_major() {
        let catalog = catalog(vec![
            entry("1.2.3.4", &["linux64"]),
            entry("1.2.3.0", &["linux64"]),
            entry("1.2.4.0", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "1.2.3.9"), Some("1.2.3.4".to_string()));
    }

    #[test]
    fn test_overshoot_falls_back_to_smallest_candidate() {
        let catalog = catalog(vec![
            entry("2.1.0.0", &["linux64"]),
            entry("2.0.0.1", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "2.0.0.0"), Some("2.0.0.1".to_string()));
    }

    #[test]
    fn test_no_same_major_candidates_is_none() {
        let catalog = catalog(vec![
            entry("119.0.6045.105", &["linux64"]),
            entry("121.0.6167.85", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "120.0.6099.109"), None);
    }

    #[test]
    fn test_resolved_version_shares_target_major() {
        let catalog = catalog(vec![
            entry("120.0.6099.71", &["linux64"]),
            entry("121.0.6167.85", &["linux64"]),
            entry("119.0.6045.105", &["linux64"]),
        ]);

        let resolved = catalog
            .resolve_version("120.0.7000.0".parse().unwrap())
            .unwrap();
        assert_eq!(resolved.version, "120.0.6099.71");
    }

    #[test]
    fn test_duplicate_versions_tie_break_to_first_occurrence() {
        let first = CatalogEntry {
            version: "5.0.0.1".to_string(),
            downloads: Downloads {
                driver: vec![DownloadTarget {
                    platform: "linux64".to_string(),
                    url: "https://dl.example.com/first.zip".to_string(),
                }],
            },
        };
        let second = CatalogEntry {
            version: "5.0.0.1".to_string(),
            downloads: Downloads {
                driver: vec![DownloadTarget {
                    platform: "linux64".to_string(),
                    url: "https://dl.example.com/second.zip".to_string(),
                }],
            },
        };

        // Closest-below tier.
        let catalog_below = catalog(vec![first.clone(), second.clone()]);
        let resolved = catalog_below
            .resolve_version("5.0.0.9".parse().unwrap())
            .unwrap();
        assert_eq!(resolved.downloads.driver[0].url, "https://dl.example.com/first.zip");

        // Overshoot tier.
        let resolved = catalog_below
            .resolve_version("5.0.0.0".parse().unwrap())
            .unwrap();
        assert_eq!(resolved.downloads.driver[0].url, "https://dl.example.com/first.zip");
    }

    #[test]
    fn test_unparsable_versions_are_skipped() {
        let catalog = catalog(vec![
            entry("not-a-version", &["linux64"]),
            entry("3.0.0.0", &["linux64"]),
        ]);

        assert_eq!(resolve(&catalog, "3.0.5.0"), Some("3.0.0.0".to_string()));
    }

    #[test]
    fn test_resolve_download_url_exact_platform() {
        let catalog = catalog(vec![entry("120.0.6099.109", &["linux64", "mac-arm64"])]);
        let version = "120.0.6099.109".parse().unwrap();

        let url = catalog
            .resolve_download_url(version, Platform::MacArm64)
            .unwrap();
        assert_eq!(
            url,
            "https://dl.example.com/120.0.6099.109/mac-arm64/driver.zip"
        );
    }

    #[test]
    fn test_resolve_download_url_missing_platform_is_none() {
        let catalog = catalog(vec![entry("120.0.6099.109", &["linux64"])]);
        let version = "120.0.6099.109".parse().unwrap();

        assert!(catalog.resolve_download_url(version, Platform::Win64).is_none());
    }

    #[test]
    fn test_resolve_download_url_requires_exact_version() {
        let catalog = catalog(vec![entry("120.0.6099.109", &["linux64"])]);
        let near_miss = "120.0.6099.108".parse().unwrap();

        assert!(catalog.resolve_download_url(near_miss, Platform::Linux64).is_none());
    }
}
