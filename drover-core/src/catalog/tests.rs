//! Integration tests for the catalog module

#[cfg(test)]
mod integration_tests {
    use crate::catalog::Catalog;
    use crate::version::{Platform, VersionTriple};

    /// Catalog JSON in the exact shape the remote service returns: a
    /// top-level `versions` array with `version` strings and
    /// `downloads.driver` platform/url pairs.
    fn sample_catalog_json() -> &'static str {
        r#"{
  "timestamp": "2024-01-10T00:08:48.036Z",
  "versions": [
    {
      "version": "120.0.6099.71",
      "downloads": {
        "driver": [
          { "platform": "linux64", "url": "https://dl.example.com/120.0.6099.71/linux64/driver.zip" },
          { "platform": "mac-arm64", "url": "https://dl.example.com/120.0.6099.71/mac-arm64/driver.zip" },
          { "platform": "mac-x64", "url": "https://dl.example.com/120.0.6099.71/mac-x64/driver.zip" }
        ]
      }
    },
    {
      "version": "120.0.6099.109",
      "downloads": {
        "driver": [
          { "platform": "linux64", "url": "https://dl.example.com/120.0.6099.109/linux64/driver.zip" },
          { "platform": "mac-arm64", "url": "https://dl.example.com/120.0.6099.109/mac-arm64/driver.zip" }
        ]
      }
    },
    {
      "version": "121.0.6167.85",
      "downloads": {
        "driver": [
          { "platform": "linux64", "url": "https://dl.example.com/121.0.6167.85/linux64/driver.zip" }
        ]
      }
    },
    {
      "version": "122.0.6261.0",
      "downloads": {}
    }
  ]
}"#
    }

    #[test]
    fn test_parse_service_shaped_document() {
        let catalog = Catalog::from_json(sample_catalog_json()).unwrap();

        assert_eq!(catalog.versions.len(), 4);
        assert!(catalog.versions[0].has_driver());
        assert!(!catalog.versions[3].has_driver());

        // Unknown top-level fields like `timestamp` are ignored.
        assert_eq!(catalog.versions[1].version, "120.0.6099.109");
    }

    #[test]
    fn test_parse_live_service_key_alias() {
        // The live endpoint publishes the driver list under the
        // artifact's own name rather than "driver".
        let json = r#"{
  "versions": [
    {
      "version": "120.0.6099.109",
      "downloads": {
        "chromedriver": [
          { "platform": "linux64", "url": "https://dl.example.com/d.zip" }
        ]
      }
    }
  ]
}"#;

        let catalog = Catalog::from_json(json).unwrap();
        assert!(catalog.versions[0].has_driver());
    }

    #[test]
    fn test_end_to_end_resolution() {
        let catalog = Catalog::from_json(sample_catalog_json()).unwrap();

        // Browser slightly newer than any published 120.x driver:
        // closest-below wins.
        let target: VersionTriple = "120.0.6099.130".parse().unwrap();
        let entry = catalog.resolve_version(target).unwrap();
        assert_eq!(entry.version, "120.0.6099.109");

        let version = entry.version.parse().unwrap();
        let url = catalog
            .resolve_download_url(version, Platform::Linux64)
            .unwrap();
        assert_eq!(
            url,
            "https://dl.example.com/120.0.6099.109/linux64/driver.zip"
        );

        // Same version has no mac-x64 artifact.
        assert!(catalog
            .resolve_download_url(version, Platform::MacX64)
            .is_none());
    }

    #[test]
    fn test_entry_without_driver_yields_no_candidates() {
        let catalog = Catalog::from_json(sample_catalog_json()).unwrap();

        // 122.x exists in the catalog but ships no driver artifact.
        let target: VersionTriple = "122.0.6261.0".parse().unwrap();
        assert!(catalog.resolve_version(target).is_none());
    }

    #[test]
    fn test_catalog_serializes_with_canonical_driver_key() {
        let catalog = Catalog::from_json(sample_catalog_json()).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();

        let first = &value["versions"][0];
        assert!(first["version"].is_string());
        assert!(first["downloads"]["driver"].is_array());
        assert!(first["downloads"]["driver"][0]["platform"].is_string());
        assert!(first["downloads"]["driver"][0]["url"].is_string());
    }
}
