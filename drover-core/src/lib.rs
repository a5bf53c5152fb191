//! Drover library exports

pub mod catalog;
pub mod error;
pub mod version;

pub use catalog::{provision, Catalog, Installer, Provisioned};
pub use error::DriverError;
pub use version::{Platform, VersionTriple};
