//! Compilation front-ends

mod manifest;

pub use manifest::{parse_manifest, ManifestFrontend, MANIFEST_SUFFIX};
