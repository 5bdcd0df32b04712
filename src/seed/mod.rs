//! Seeding pipeline
//!
//! Format readers, the directory importer, and the controller that decides
//! whether an import runs at all.

pub mod controller;
pub mod formats;
pub mod importer;
pub mod properties;

pub use controller::*;
pub use formats::{ConfigProperties, FileFormat, FormatResolver};
pub use importer::{import_directory, ImportReport};
